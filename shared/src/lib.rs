//! Capture-and-analysis session core shared by the browser app and the gateway.

pub mod camera;
pub mod capture;
pub mod detection;
pub mod error;
pub mod mode;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use camera::{
    Activation, ActivationTicket, CameraConstraints, CameraResource, CameraStatus, FacingMode,
    MediaDevices, StreamHandle,
};
pub use capture::{
    CapturePipeline, CaptureReport, CaptureRequest, CaptureState, CaptureTicket, Classifier,
    Frame, FrameSource, JPEG_QUALITY,
};
pub use detection::{error_message, parse_detections, ClassifierReply, Detection};
pub use error::{CameraError, CaptureError, SessionError};
pub use mode::{Mode, ModeId, ModeRegistry};
pub use session::{SessionController, SessionState};
