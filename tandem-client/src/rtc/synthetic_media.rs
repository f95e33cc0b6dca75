use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

use crate::error::MediaError;
use crate::transport::MediaDevice;

const STREAM_ID: &str = "tandem";
const AUDIO_FRAME: Duration = Duration::from_millis(20);
const VIDEO_FRAME: Duration = Duration::from_millis(33);
/// An Opus frame that decodes to silence.
const OPUS_SILENCE: [u8; 3] = [0xf8, 0xff, 0xfe];

/// The local audio and video tracks, shared by every transport of a client.
#[derive(Clone)]
pub struct LocalTracks {
    pub audio: Arc<TrackLocalStaticSample>,
    pub video: Arc<TrackLocalStaticSample>,
}

impl LocalTracks {
    pub fn tracks(&self) -> [Arc<TrackLocalStaticSample>; 2] {
        [self.audio.clone(), self.video.clone()]
    }
}

/// Headless media device: sends silence and blank frames, counts what arrives.
#[derive(Debug, Default)]
pub struct SyntheticMedia {
    received_packets: Arc<AtomicU64>,
    remote_tracks: AtomicUsize,
}

impl SyntheticMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// RTP packets received from every partner so far.
    pub fn received_packets(&self) -> u64 {
        self.received_packets.load(Ordering::Relaxed)
    }

    pub fn remote_tracks(&self) -> usize {
        self.remote_tracks.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl MediaDevice for SyntheticMedia {
    type Local = LocalTracks;
    type Remote = Arc<TrackRemote>;

    async fn acquire(&self) -> Result<LocalTracks, MediaError> {
        let audio = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                sdp_fmtp_line: "minptime=10;useinbandfec=1".to_owned(),
                rtcp_feedback: vec![],
            },
            "audio".to_owned(),
            STREAM_ID.to_owned(),
        ));
        let video = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
            "video".to_owned(),
            STREAM_ID.to_owned(),
        ));

        tokio::spawn(pump(
            Arc::downgrade(&audio),
            Bytes::from_static(&OPUS_SILENCE),
            AUDIO_FRAME,
        ));
        tokio::spawn(pump(
            Arc::downgrade(&video),
            Bytes::from_static(&[0u8; 10]),
            VIDEO_FRAME,
        ));

        Ok(LocalTracks { audio, video })
    }

    fn attach_remote(&self, track: Arc<TrackRemote>) {
        let attached = self.remote_tracks.fetch_add(1, Ordering::Relaxed) + 1;
        info!("Receiving remote {} ({} track(s))", track.kind(), attached);

        let received = self.received_packets.clone();
        tokio::spawn(async move {
            while track.read_rtp().await.is_ok() {
                received.fetch_add(1, Ordering::Relaxed);
            }
            debug!("Remote track {} ended", track.id());
        });
    }

    fn detach_remote(&self) {
        self.remote_tracks.store(0, Ordering::Relaxed);
    }
}

/// Writes `frame` every `interval` until the track is dropped by everyone else.
async fn pump(track: Weak<TrackLocalStaticSample>, frame: Bytes, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        let Some(track) = track.upgrade() else { break };

        let sample = Sample {
            data: frame.clone(),
            duration: interval,
            ..Default::default()
        };
        if let Err(e) = track.write_sample(&sample).await {
            debug!("Sample write failed: {}", e);
        }
    }
}
