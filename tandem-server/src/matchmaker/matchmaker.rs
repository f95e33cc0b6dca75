use std::sync::Arc;

use tandem_core::{ConnectionId, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::matchmaker::match_command::{MatchCommand, MatchStats};
use crate::matchmaker::match_state::{MatchState, Notice};
use crate::signaling::SignalingOutput;

/// The single owner of the waiting queue and partner table.
///
/// Commands are handled one at a time, which is what makes "pop the queue head and pair"
/// indivisible for every connection.
pub struct Matchmaker {
    state: MatchState,
    command_rx: mpsc::Receiver<MatchCommand>,
    output: Arc<dyn SignalingOutput>,
    max_chat_len: usize,
}

impl Matchmaker {
    pub fn new(
        command_rx: mpsc::Receiver<MatchCommand>,
        output: Arc<dyn SignalingOutput>,
        max_chat_len: usize,
    ) -> Self {
        Self {
            state: MatchState::new(),
            command_rx,
            output,
            max_chat_len,
        }
    }

    pub async fn run(mut self) {
        info!("Matchmaker started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Matchmaker stopped.");
    }

    async fn handle_command(&mut self, cmd: MatchCommand) {
        match cmd {
            MatchCommand::Find { id } => {
                let output = &self.output;
                let notices = self.state.request_match(id, |queued| output.is_live(queued));
                if notices.is_empty() {
                    debug!("Ignoring find from {} (already paired)", id);
                }
                self.deliver(notices).await;
            }

            MatchCommand::Skip { id } => {
                info!("{} skipped", id);
                let notices = self.state.requeue(id);
                self.deliver(notices).await;
            }

            MatchCommand::Stop { id } => {
                info!("{} stopped searching", id);
                let notices = self.state.leave(id);
                self.deliver(notices).await;
            }

            MatchCommand::Chat { from, text } => self.forward_chat(from, text).await,

            MatchCommand::Disconnect { id } => {
                let notices = self.state.disconnect(id);
                self.deliver(notices).await;
            }

            MatchCommand::Stats { reply } => {
                let _ = reply.send(MatchStats {
                    waiting: self.state.waiting_len(),
                    pairs: self.state.pair_count(),
                });
            }
        }
    }

    async fn forward_chat(&self, from: ConnectionId, text: String) {
        let Some(partner) = self.state.partner_of(&from) else {
            debug!("Dropping chat from unpaired {}", from);
            return;
        };
        if text.trim().is_empty() {
            return;
        }

        let text = match text.char_indices().nth(self.max_chat_len) {
            Some((cut, _)) => text[..cut].to_owned(),
            None => text,
        };
        self.output
            .send(partner, ServerMessage::Chat { text })
            .await;
    }

    async fn deliver(&self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::Waiting { to } => {
                    info!("{} added to queue", to);
                    self.output.send(to, ServerMessage::Waiting).await;
                }
                Notice::Paired { to, partner, role } => {
                    if role.is_initiator() {
                        info!("Match: {} <--> {}", to, partner);
                    }
                    self.output
                        .send(to, ServerMessage::Paired { partner, role })
                        .await;
                }
                Notice::PartnerLeft { to } => {
                    info!("Telling {} its partner left", to);
                    self.output.send(to, ServerMessage::PartnerLeft).await;
                }
            }
        }
    }
}
