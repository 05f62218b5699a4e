/// Camera acquisition failures. The display text is what the camera panel shows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("Camera permission denied. Please check permissions.")]
    PermissionDenied,
    #[error("No camera device found.")]
    NoDevice,
    #[error("Camera is in use by another application.")]
    DeviceBusy,
    #[error("Unable to access camera: {0}")]
    Other(String),
}

impl CameraError {
    /// Maps a browser `DOMException` name from `getUserMedia` to a camera error.
    pub fn from_dom_exception(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => Self::PermissionDenied,
            "NotFoundError" | "DevicesNotFoundError" | "OverconstrainedError" => Self::NoDevice,
            "NotReadableError" | "TrackStartError" | "AbortError" => Self::DeviceBusy,
            _ if message.is_empty() => Self::Other(name.to_string()),
            _ => Self::Other(message.to_string()),
        }
    }
}

/// Everything that can go wrong between freezing a frame and reading the
/// classifier's answer. The display text is shown verbatim in place of results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Could not encode frame: {0}")]
    Encode(String),
    #[error("{0}")]
    Server(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("A user name is required")]
    EmptyUser,
    #[error("Already logged in as {0}")]
    AlreadyLoggedIn(String),
}
