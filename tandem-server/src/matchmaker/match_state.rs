use std::collections::{HashMap, VecDeque};

use tandem_core::{ConnectionId, Role};

/// Something a connection has to be told after a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Notice {
    Waiting {
        to: ConnectionId,
    },
    Paired {
        to: ConnectionId,
        partner: ConnectionId,
        role: Role,
    },
    PartnerLeft {
        to: ConnectionId,
    },
}

/// Waiting queue plus partner table.
///
/// Only the matchmaker actor owns one of these, so every method runs to completion
/// before any other request is looked at.
#[derive(Debug, Default)]
pub(crate) struct MatchState {
    queue: VecDeque<ConnectionId>,
    partners: HashMap<ConnectionId, ConnectionId>,
}

impl MatchState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn partner_of(&self, id: &ConnectionId) -> Option<ConnectionId> {
        self.partners.get(id).copied()
    }

    pub(crate) fn waiting_len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn pair_count(&self) -> usize {
        self.partners.len() / 2
    }

    /// Pair `id` with the oldest live waiter, or queue it.
    ///
    /// A connection that already has a partner is left untouched.
    pub(crate) fn request_match<F>(&mut self, id: ConnectionId, is_live: F) -> Vec<Notice>
    where
        F: Fn(&ConnectionId) -> bool,
    {
        if self.partners.contains_key(&id) {
            return Vec::new();
        }

        self.queue.retain(|queued| *queued != id && is_live(queued));

        match self.queue.pop_front() {
            Some(partner) => {
                self.partners.insert(id, partner);
                self.partners.insert(partner, id);

                vec![
                    Notice::Paired {
                        to: id,
                        partner,
                        role: Role::Initiator,
                    },
                    Notice::Paired {
                        to: partner,
                        partner: id,
                        role: Role::Responder,
                    },
                ]
            }
            None => {
                self.queue.push_back(id);
                vec![Notice::Waiting { to: id }]
            }
        }
    }

    /// Break up the pair `id` belongs to, telling the other side.
    pub(crate) fn release_partner(&mut self, id: ConnectionId) -> Vec<Notice> {
        let Some(partner) = self.partners.remove(&id) else {
            return Vec::new();
        };
        self.partners.remove(&partner);

        vec![Notice::PartnerLeft { to: partner }]
    }

    /// Skip: drop the current partner and go to the back of the queue.
    pub(crate) fn requeue(&mut self, id: ConnectionId) -> Vec<Notice> {
        let mut notices = self.release_partner(id);

        self.queue.retain(|queued| *queued != id);
        self.queue.push_back(id);
        notices.push(Notice::Waiting { to: id });

        notices
    }

    /// Stop: drop the current partner and leave the queue without re-entering it.
    pub(crate) fn leave(&mut self, id: ConnectionId) -> Vec<Notice> {
        self.queue.retain(|queued| *queued != id);
        self.release_partner(id)
    }

    pub(crate) fn disconnect(&mut self, id: ConnectionId) -> Vec<Notice> {
        self.leave(id)
    }
}
