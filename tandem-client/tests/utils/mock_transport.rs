use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tandem_client::{
    PeerTransport, SdpKind, TransportError, TransportEvent, TransportEvents, TransportFactory,
};
use tandem_core::{IceCandidate, IceServerConfig};

/// One call made on a mock transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Open(String),
    CreateOffer,
    SetRemote(SdpKind, String),
    CreateAnswer,
    AddCandidate(String),
    Close,
}

/// Scripted outcomes for every transport a factory opens.
#[derive(Debug, Clone)]
pub struct MockBehavior {
    pub fail_open: bool,
    pub reject_remote_description: bool,
    /// Emit a remote track once both descriptions are in place.
    pub auto_connect: bool,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            fail_open: false,
            reject_remote_description: false,
            auto_connect: true,
        }
    }
}

type CallLog = Arc<Mutex<Vec<(usize, MockCall)>>>;

/// Mock TransportFactory. Transports are numbered in the order they were opened.
#[derive(Clone, Default)]
pub struct MockTransportFactory {
    behavior: MockBehavior,
    calls: CallLog,
    events: Arc<Mutex<Vec<TransportEvents<String>>>>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Calls made on transport `index`, in order.
    pub fn calls_on(&self, index: usize) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Fire an event from transport `index`, even if it has been closed since.
    pub fn emit(&self, index: usize, event: TransportEvent<String>) {
        let events = self.events.lock().unwrap()[index].clone();
        events.emit(event);
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    type Local = String;
    type Remote = String;
    type Transport = MockTransport;

    async fn open(
        &self,
        local: &String,
        _ice_servers: &[IceServerConfig],
        events: TransportEvents<String>,
    ) -> Result<MockTransport, TransportError> {
        if self.behavior.fail_open {
            return Err(TransportError::Failed("no route".into()));
        }

        let index = {
            let mut all = self.events.lock().unwrap();
            all.push(events.clone());
            all.len() - 1
        };
        self.calls
            .lock()
            .unwrap()
            .push((index, MockCall::Open(local.clone())));

        Ok(MockTransport {
            index,
            behavior: self.behavior.clone(),
            calls: self.calls.clone(),
            events,
            local_set: AtomicBool::new(false),
            remote_set: AtomicBool::new(false),
        })
    }
}

pub struct MockTransport {
    index: usize,
    behavior: MockBehavior,
    calls: CallLog,
    events: TransportEvents<String>,
    local_set: AtomicBool,
    remote_set: AtomicBool,
}

impl MockTransport {
    fn record(&self, call: MockCall) {
        tracing::debug!("[MockTransport {}] {:?}", self.index, call);
        self.calls.lock().unwrap().push((self.index, call));
    }

    fn maybe_connect(&self) {
        if self.behavior.auto_connect
            && self.local_set.load(Ordering::SeqCst)
            && self.remote_set.load(Ordering::SeqCst)
        {
            self.events
                .emit(TransportEvent::RemoteTrack(format!("track-{}", self.index)));
        }
    }
}

#[async_trait]
impl PeerTransport for MockTransport {
    async fn create_offer(&self) -> Result<String, TransportError> {
        self.record(MockCall::CreateOffer);
        self.local_set.store(true, Ordering::SeqCst);
        Ok(format!("offer-{}", self.index))
    }

    async fn set_remote_description(
        &self,
        kind: SdpKind,
        sdp: String,
    ) -> Result<(), TransportError> {
        if self.behavior.reject_remote_description {
            return Err(TransportError::Failed("malformed sdp".into()));
        }
        self.record(MockCall::SetRemote(kind, sdp));
        self.remote_set.store(true, Ordering::SeqCst);
        self.maybe_connect();
        Ok(())
    }

    async fn create_answer(&self) -> Result<String, TransportError> {
        self.record(MockCall::CreateAnswer);
        self.local_set.store(true, Ordering::SeqCst);
        self.maybe_connect();
        Ok(format!("answer-{}", self.index))
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError> {
        self.record(MockCall::AddCandidate(candidate.candidate));
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.record(MockCall::Close);
        Ok(())
    }
}
