use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tandem_core::{IceCandidate, IceServerConfig};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

use crate::error::TransportError;
use crate::rtc::LocalTracks;
use crate::transport::{
    PeerTransport, SdpKind, TransportEvent, TransportEvents, TransportFactory, TransportState,
};

/// Opens one `RTCPeerConnection` per pairing.
#[derive(Debug, Default, Clone)]
pub struct RtcTransportFactory;

impl RtcTransportFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    type Local = LocalTracks;
    type Remote = Arc<TrackRemote>;
    type Transport = RtcTransport;

    async fn open(
        &self,
        local: &LocalTracks,
        ice_servers: &[IceServerConfig],
        events: TransportEvents<Arc<TrackRemote>>,
    ) -> Result<RtcTransport, TransportError> {
        let peer_connection = new_peer_connection(ice_servers)
            .await
            .map_err(|e| TransportError::Failed(format!("{:#}", e)))?;

        for track in local.tracks() {
            let sender = peer_connection
                .add_track(track as Arc<dyn TrackLocal + Send + Sync>)
                .await?;

            // RTCP has to be drained for the interceptors to work.
            tokio::spawn(async move {
                let mut rtcp_buf = vec![0u8; 1500];
                while sender.read(&mut rtcp_buf).await.is_ok() {}
            });
        }

        register_callbacks(&peer_connection, events);

        Ok(RtcTransport { peer_connection })
    }
}

async fn new_peer_connection(ice_servers: &[IceServerConfig]) -> anyhow::Result<Arc<RTCPeerConnection>> {
    let mut m = MediaEngine::default();
    m.register_default_codecs()
        .context("Failed to register codecs")?;
    let registry = register_default_interceptors(Registry::new(), &mut m)
        .context("Failed to register interceptors")?;

    let api = APIBuilder::new()
        .with_media_engine(m)
        .with_interceptor_registry(registry)
        .build();

    let rtc_config = RTCConfiguration {
        ice_servers: ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
            })
            .collect(),
        ..Default::default()
    };

    let peer_connection = api
        .new_peer_connection(rtc_config)
        .await
        .context("Failed to create peer connection")?;
    Ok(Arc::new(peer_connection))
}

fn register_callbacks(peer_connection: &RTCPeerConnection, events: TransportEvents<Arc<TrackRemote>>) {
    let state_events = events.clone();
    peer_connection.on_peer_connection_state_change(Box::new(
        move |s: RTCPeerConnectionState| {
            let events = state_events.clone();

            Box::pin(async move {
                info!("Peer connection state changed: {}", s);
                let state = match s {
                    RTCPeerConnectionState::Connecting => TransportState::Connecting,
                    RTCPeerConnectionState::Connected => TransportState::Connected,
                    RTCPeerConnectionState::Disconnected => TransportState::Disconnected,
                    RTCPeerConnectionState::Failed => TransportState::Failed,
                    RTCPeerConnectionState::Closed => TransportState::Closed,
                    _ => TransportState::New,
                };
                events.emit(TransportEvent::StateChanged(state));
            })
        },
    ));

    let ice_events = events.clone();
    peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
        let events = ice_events.clone();

        Box::pin(async move {
            let Some(candidate) = c else { return };
            let Ok(init) = candidate.to_json() else {
                return;
            };
            events.emit(TransportEvent::LocalCandidate(IceCandidate {
                candidate: init.candidate,
                sdp_mid: init.sdp_mid,
                sdp_m_line_index: init.sdp_mline_index,
            }));
        })
    }));

    peer_connection.on_track(Box::new(
        move |track: Arc<TrackRemote>,
              _receiver: Arc<RTCRtpReceiver>,
              _transceiver: Arc<RTCRtpTransceiver>| {
            let events = events.clone();

            Box::pin(async move {
                debug!("Remote {} track {}", track.kind(), track.id());
                events.emit(TransportEvent::RemoteTrack(track));
            })
        },
    ));
}

pub struct RtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn create_offer(&self) -> Result<String, TransportError> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    async fn set_remote_description(
        &self,
        kind: SdpKind,
        sdp: String,
    ) -> Result<(), TransportError> {
        let desc = match kind {
            SdpKind::Offer => RTCSessionDescription::offer(sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(sdp)?,
        };
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn create_answer(&self) -> Result<String, TransportError> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError> {
        self.peer_connection
            .add_ice_candidate(RTCIceCandidateInit {
                candidate: candidate.candidate,
                sdp_mid: candidate.sdp_mid,
                sdp_mline_index: candidate.sdp_m_line_index,
                username_fragment: None,
            })
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
