use serde_json::{json, Value};

use crate::error::CameraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    User,
    Environment,
}

impl FacingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

/// Preferences handed to the device when a stream is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: Option<FacingMode>,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            facing_mode: Some(FacingMode::Environment),
        }
    }
}

impl CameraConstraints {
    /// The `video` member of a `getUserMedia` constraints object.
    pub fn to_video_json(&self) -> Value {
        let mut video = json!({
            "width": { "ideal": self.ideal_width },
            "height": { "ideal": self.ideal_height },
        });
        if let Some(facing) = self.facing_mode {
            video["facingMode"] = Value::from(facing.as_str());
        }
        video
    }
}

/// A granted device stream. Dropping the handle does not stop it; `stop` must.
pub trait StreamHandle {
    /// Stops every track of the stream.
    fn stop(&mut self);
}

/// Source of device streams, i.e. the browser's `navigator.mediaDevices`.
#[allow(async_fn_in_trait)]
pub trait MediaDevices {
    type Stream: StreamHandle;

    async fn get_user_media(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Self::Stream, CameraError>;
}

/// Issued by [`CameraResource::begin_activation`]; must be handed back with
/// the acquisition result. A ticket from an older generation is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationTicket {
    generation: u64,
    constraints: CameraConstraints,
}

impl ActivationTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn constraints(&self) -> &CameraConstraints {
        &self.constraints
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Live,
    Failed(CameraError),
    /// The acquisition was superseded; any granted stream was stopped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraStatus {
    Inactive,
    Acquiring,
    Live,
    Failed,
}

enum Slot<S> {
    Inactive,
    Acquiring,
    Live(S),
    Failed(CameraError),
}

/// Single owner of the camera stream.
pub struct CameraResource<S: StreamHandle> {
    slot: Slot<S>,
    generation: u64,
    constraints: CameraConstraints,
}

impl<S: StreamHandle> Default for CameraResource<S> {
    fn default() -> Self {
        Self::new(CameraConstraints::default())
    }
}

impl<S: StreamHandle> CameraResource<S> {
    pub fn new(constraints: CameraConstraints) -> Self {
        Self {
            slot: Slot::Inactive,
            generation: 0,
            constraints,
        }
    }

    pub fn status(&self) -> CameraStatus {
        match self.slot {
            Slot::Inactive => CameraStatus::Inactive,
            Slot::Acquiring => CameraStatus::Acquiring,
            Slot::Live(_) => CameraStatus::Live,
            Slot::Failed(_) => CameraStatus::Failed,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.slot, Slot::Live(_))
    }

    pub fn stream(&self) -> Option<&S> {
        match &self.slot {
            Slot::Live(stream) => Some(stream),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CameraError> {
        match &self.slot {
            Slot::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts a new acquisition. A live stream is released first, and any
    /// acquisition still pending is invalidated.
    pub fn begin_activation(&mut self) -> ActivationTicket {
        self.release();
        self.generation = self.generation.wrapping_add(1);
        self.slot = Slot::Acquiring;
        log::info!("camera acquisition #{} started", self.generation);
        ActivationTicket {
            generation: self.generation,
            constraints: self.constraints,
        }
    }

    pub fn complete_activation(
        &mut self,
        ticket: ActivationTicket,
        result: Result<S, CameraError>,
    ) -> Activation {
        if ticket.generation != self.generation || !matches!(self.slot, Slot::Acquiring) {
            if let Ok(mut stream) = result {
                stream.stop();
            }
            log::debug!(
                "discarding stale camera acquisition #{} (current #{})",
                ticket.generation,
                self.generation
            );
            return Activation::Stale;
        }

        match result {
            Ok(stream) => {
                self.slot = Slot::Live(stream);
                log::info!("camera acquisition #{} live", ticket.generation);
                Activation::Live
            }
            Err(err) => {
                log::warn!("camera acquisition #{} failed: {}", ticket.generation, err);
                self.slot = Slot::Failed(err.clone());
                Activation::Failed(err)
            }
        }
    }

    /// Acquires a stream in one step when the caller holds the resource
    /// across the device request.
    pub async fn activate<D>(&mut self, devices: &D) -> Result<&S, CameraError>
    where
        D: MediaDevices<Stream = S>,
    {
        let ticket = self.begin_activation();
        let result = devices.get_user_media(ticket.constraints()).await;
        match self.complete_activation(ticket, result) {
            Activation::Failed(err) => Err(err),
            Activation::Live | Activation::Stale => self
                .stream()
                .ok_or_else(|| CameraError::Other("camera stream was released".into())),
        }
    }

    /// Stops the stream and forgets any pending acquisition. Idempotent.
    pub fn deactivate(&mut self) {
        if matches!(self.slot, Slot::Inactive) {
            return;
        }
        self.release();
        self.generation = self.generation.wrapping_add(1);
        self.slot = Slot::Inactive;
        log::info!("camera deactivated");
    }

    fn release(&mut self) {
        if let Slot::Live(stream) = &mut self.slot {
            stream.stop();
        }
        self.slot = Slot::Inactive;
    }
}

impl<S: StreamHandle> Drop for CameraResource<S> {
    fn drop(&mut self) {
        self.release();
    }
}
