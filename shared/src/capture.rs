use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::detection::{ClassifierReply, Detection};
use crate::error::CaptureError;
use crate::mode::ModeId;
use crate::session::SessionState;

pub const JPEG_QUALITY: u8 = 95;

/// One still video frame at its native size, RGBA8 row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Frame {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CaptureError> {
        if width == 0 || height == 0 {
            return Err(CaptureError::Encode("frame has no pixels".into()));
        }
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(CaptureError::Encode(format!(
                "expected {} bytes for a {}x{} frame, got {}",
                expected,
                width,
                height,
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Encodes the frame as JPEG without scaling. Alpha is dropped.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, CaptureError> {
        let rgb: Vec<u8> = self
            .rgba
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        let image = RgbImage::from_raw(self.width, self.height, rgb)
            .ok_or_else(|| CaptureError::Encode("frame buffer size mismatch".into()))?;

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, quality)
            .encode_image(&image)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
        if jpeg.is_empty() {
            return Err(CaptureError::Encode("encoder produced no data".into()));
        }
        Ok(jpeg)
    }
}

/// Where still frames come from, i.e. the live `<video>` element.
pub trait FrameSource {
    fn frame_available(&self) -> bool;

    fn snapshot(&self) -> Result<Frame, CaptureError>;
}

/// Transport to the remote classifier's `/predict/{mode}` endpoint.
/// Transport failures are reported as [`CaptureError::Network`].
#[allow(async_fn_in_trait)]
pub trait Classifier {
    async fn submit(&self, mode: ModeId, jpeg: Vec<u8>) -> Result<ClassifierReply, CaptureError>;
}

/// Identifies one capture and the mode it was taken under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTicket {
    id: u64,
    mode: ModeId,
}

impl CaptureTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn mode(&self) -> ModeId {
        self.mode
    }
}

/// A frozen, encoded frame waiting to be sent.
#[derive(Debug)]
pub struct CaptureRequest {
    ticket: CaptureTicket,
    payload: Result<Vec<u8>, CaptureError>,
}

impl CaptureRequest {
    pub fn ticket(&self) -> CaptureTicket {
        self.ticket
    }

    /// Performs the round trip. A frame that failed to encode never reaches
    /// the classifier and fails the capture the same way a network error does.
    pub async fn send<C: Classifier>(self, classifier: &C) -> CaptureReport {
        let outcome = match self.payload {
            Ok(jpeg) => match classifier.submit(self.ticket.mode, jpeg).await {
                Ok(reply) => reply.into_detections(),
                Err(err) => Err(err),
            },
            Err(err) => Err(err),
        };
        CaptureReport {
            ticket: self.ticket,
            outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureReport {
    pub ticket: CaptureTicket,
    pub outcome: Result<Vec<Detection>, CaptureError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    /// Nothing captured yet, or the last result was superseded.
    Idle,
    Capturing {
        mode: ModeId,
    },
    /// An empty list means the classifier saw nothing.
    Success {
        mode: ModeId,
        detections: Vec<Detection>,
    },
    Failed {
        mode: ModeId,
        error: CaptureError,
    },
}

impl CaptureState {
    /// Text shown in place of detection bars, if any. `Idle` shows nothing,
    /// which keeps it apart from a capture that found nothing.
    pub fn message(&self) -> Option<String> {
        match self {
            CaptureState::Idle => None,
            CaptureState::Capturing { mode } => {
                Some(format!("Analyzing frame in {}...", mode.mode().name))
            }
            CaptureState::Success { detections, .. } if detections.is_empty() => {
                Some("No objects detected".to_string())
            }
            CaptureState::Success { .. } => None,
            CaptureState::Failed { error, .. } => Some(error.to_string()),
        }
    }
}

/// Turns one live frame into one classification result, one at a time.
#[derive(Debug)]
pub struct CapturePipeline {
    state: CaptureState,
    last_id: u64,
    in_flight: Option<u64>,
}

impl Default for CapturePipeline {
    fn default() -> Self {
        Self {
            state: CaptureState::Idle,
            last_id: 0,
            in_flight: None,
        }
    }
}

impl CapturePipeline {
    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_capturing(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Freezes and encodes a frame when every precondition holds; otherwise
    /// nothing happens and `None` is returned.
    pub fn begin<F: FrameSource>(
        &mut self,
        session: &SessionState,
        camera_live: bool,
        frames: &F,
    ) -> Option<CaptureRequest> {
        let Some(mode) = session.active_mode else {
            log::debug!("capture ignored: no mode selected");
            return None;
        };
        if !session.camera_active || !camera_live {
            log::debug!("capture ignored: camera inactive");
            return None;
        }
        if !frames.frame_available() {
            log::debug!("capture ignored: no video frame yet");
            return None;
        }
        if let Some(id) = self.in_flight {
            log::debug!("capture ignored: capture #{} still pending", id);
            return None;
        }

        self.last_id += 1;
        let ticket = CaptureTicket {
            id: self.last_id,
            mode,
        };
        self.in_flight = Some(ticket.id);
        self.state = CaptureState::Capturing { mode };

        let payload = frames
            .snapshot()
            .and_then(|frame| frame.encode_jpeg(JPEG_QUALITY));
        log::info!("capture #{} started in {} mode", ticket.id, mode);

        Some(CaptureRequest { ticket, payload })
    }

    /// Applies a finished round trip. Reports for captures that are no longer
    /// pending are dropped and `false` is returned.
    pub fn complete(&mut self, report: CaptureReport) -> bool {
        if self.in_flight != Some(report.ticket.id) {
            log::debug!("discarding result of capture #{}", report.ticket.id);
            return false;
        }
        self.in_flight = None;

        let mode = report.ticket.mode;
        self.state = match report.outcome {
            Ok(detections) => {
                log::info!(
                    "capture #{} in {} mode: {} detection(s)",
                    report.ticket.id,
                    mode,
                    detections.len()
                );
                CaptureState::Success { mode, detections }
            }
            Err(error) => {
                log::warn!("capture #{} in {} mode failed: {}", report.ticket.id, mode, error);
                CaptureState::Failed { mode, error }
            }
        };
        true
    }

    /// Drops a settled result. A pending capture is left alone.
    pub fn clear_result(&mut self) {
        if self.in_flight.is_none() {
            self.state = CaptureState::Idle;
        }
    }

    /// Drops both the result and any pending capture.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.state = CaptureState::Idle;
    }
}
