use crate::camera::{
    Activation, ActivationTicket, CameraConstraints, CameraResource, CameraStatus, MediaDevices,
    StreamHandle,
};
use crate::capture::{
    CapturePipeline, CaptureReport, CaptureRequest, CaptureState, Classifier, FrameSource,
};
use crate::error::{CameraError, SessionError};
use crate::mode::{Mode, ModeId, ModeRegistry};

/// Flags owned by the session. All fields are empty/false outside a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub logged_in: bool,
    pub user: String,
    pub active_mode: Option<ModeId>,
    pub camera_active: bool,
}

/// Top-level orchestrator: owns the session flags, the camera and the
/// capture pipeline and keeps them consistent with each other.
///
/// Transitions are synchronous. Work that has to wait on the device or the
/// network is handed out as a ticket/request and reported back through
/// [`SessionController::camera_acquired`] and
/// [`SessionController::capture_finished`].
pub struct SessionController<S: StreamHandle> {
    state: SessionState,
    camera: CameraResource<S>,
    pipeline: CapturePipeline,
}

impl<S: StreamHandle> Default for SessionController<S> {
    fn default() -> Self {
        Self::new(CameraConstraints::default())
    }
}

impl<S: StreamHandle> SessionController<S> {
    pub fn new(constraints: CameraConstraints) -> Self {
        Self {
            state: SessionState::default(),
            camera: CameraResource::new(constraints),
            pipeline: CapturePipeline::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn camera(&self) -> &CameraResource<S> {
        &self.camera
    }

    pub fn capture_state(&self) -> &CaptureState {
        self.pipeline.state()
    }

    pub fn is_capturing(&self) -> bool {
        self.pipeline.is_capturing()
    }

    pub fn active_mode(&self) -> Option<&'static Mode> {
        self.state.active_mode.map(ModeId::mode)
    }

    /// Starts a session. The camera is switched on immediately; the returned
    /// ticket must be completed with the device's answer.
    pub fn login(&mut self, user: &str) -> Result<ActivationTicket, SessionError> {
        if self.state.logged_in {
            return Err(SessionError::AlreadyLoggedIn(self.state.user.clone()));
        }
        let user = user.trim();
        if user.is_empty() {
            return Err(SessionError::EmptyUser);
        }

        self.state = SessionState {
            logged_in: true,
            user: user.to_string(),
            active_mode: None,
            camera_active: true,
        };
        log::info!("session started for {}", user);
        Ok(self.camera.begin_activation())
    }

    pub fn logout(&mut self) {
        if self.state.logged_in {
            log::info!("session ended for {}", self.state.user);
        }
        self.state = SessionState::default();
        self.camera.deactivate();
        self.pipeline.reset();
    }

    /// Records the mode the next capture will use. A settled result from
    /// another mode is dropped; a pending capture keeps its own mode.
    pub fn select_mode(&mut self, id: &str) -> Option<&'static Mode> {
        if !self.state.logged_in {
            log::debug!("mode selection ignored: not logged in");
            return None;
        }
        let Some(mode) = ModeRegistry::find_mode(id) else {
            log::warn!("unknown mode {:?}", id);
            return None;
        };
        if self.state.active_mode != Some(mode.id) {
            self.state.active_mode = Some(mode.id);
            self.pipeline.clear_result();
            log::info!("mode set to {}", mode.id);
        }
        Some(mode)
    }

    /// Owner of the camera flag. Switching on hands out a ticket unless the
    /// camera is already running; switching off tears the stream down and
    /// discards any capture.
    pub fn set_camera_active(&mut self, active: bool) -> Option<ActivationTicket> {
        if !active {
            self.state.camera_active = false;
            self.camera.deactivate();
            self.pipeline.reset();
            return None;
        }
        if !self.state.logged_in {
            log::debug!("camera activation ignored: not logged in");
            return None;
        }
        let running = matches!(
            self.camera.status(),
            CameraStatus::Live | CameraStatus::Acquiring
        );
        if self.state.camera_active && running {
            return None;
        }
        self.state.camera_active = true;
        Some(self.camera.begin_activation())
    }

    /// User-triggered retry after a failed acquisition.
    pub fn retry_camera(&mut self) -> Option<ActivationTicket> {
        self.set_camera_active(true)
    }

    pub fn camera_acquired(
        &mut self,
        ticket: ActivationTicket,
        result: Result<S, CameraError>,
    ) -> Activation {
        let activation = self.camera.complete_activation(ticket, result);
        if let Activation::Failed(_) = activation {
            self.state.camera_active = false;
        }
        activation
    }

    /// Acquires the stream for `ticket` while holding the controller.
    pub async fn acquire_camera<D>(&mut self, devices: &D, ticket: ActivationTicket) -> Activation
    where
        D: MediaDevices<Stream = S>,
    {
        let result = devices.get_user_media(ticket.constraints()).await;
        self.camera_acquired(ticket, result)
    }

    /// Whether the capture trigger should be enabled.
    pub fn can_capture(&self) -> bool {
        self.state.camera_active
            && self.camera.is_live()
            && self.state.active_mode.is_some()
            && !self.pipeline.is_capturing()
    }

    pub fn begin_capture<F: FrameSource>(&mut self, frames: &F) -> Option<CaptureRequest> {
        self.pipeline
            .begin(&self.state, self.camera.is_live(), frames)
    }

    /// Applies a capture result unless the session or camera ended meanwhile.
    pub fn capture_finished(&mut self, report: CaptureReport) -> bool {
        if !self.state.logged_in || !self.state.camera_active {
            log::debug!("discarding capture #{}: session changed", report.ticket.id());
            return false;
        }
        self.pipeline.complete(report)
    }

    /// Runs one capture from trigger to result while holding the controller.
    /// Returns whether a result was recorded.
    pub async fn capture<F, C>(&mut self, frames: &F, classifier: &C) -> bool
    where
        F: FrameSource,
        C: Classifier,
    {
        let Some(request) = self.begin_capture(frames) else {
            return false;
        };
        let report = request.send(classifier).await;
        self.capture_finished(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDevices, FakeStream, ScriptedClassifier, StillFrames};
    use crate::{CaptureError, Detection};
    use futures::executor::block_on;

    fn live_session(devices: &FakeDevices, user: &str) -> SessionController<FakeStream> {
        let mut session = SessionController::default();
        let ticket = session.login(user).unwrap();
        assert_eq!(block_on(session.acquire_camera(devices, ticket)), Activation::Live);
        session
    }

    #[test]
    fn test_login_starts_camera() {
        let mut session: SessionController<FakeStream> = SessionController::default();
        let ticket = session.login("  alice ").unwrap();

        assert!(session.state().logged_in);
        assert_eq!(session.state().user, "alice");
        assert!(session.state().camera_active);
        assert_eq!(session.camera().status(), CameraStatus::Acquiring);
        assert_eq!(ticket.generation(), session.camera().generation());
    }

    #[test]
    fn test_login_validation() {
        let mut session: SessionController<FakeStream> = SessionController::default();
        assert_eq!(session.login("   "), Err(SessionError::EmptyUser));
        assert_eq!(session.state(), &SessionState::default());

        session.login("alice").unwrap();
        assert_eq!(
            session.login("bob"),
            Err(SessionError::AlreadyLoggedIn("alice".into()))
        );
    }

    #[test]
    fn test_logout_resets_everything() {
        let devices = FakeDevices::granting();
        let classifier = ScriptedClassifier::detections(
            r#"{"detections":[{"label":"apple","confidence":0.92}]}"#,
        );
        let mut session = live_session(&devices, "alice");
        session.select_mode("food").unwrap();
        assert!(block_on(session.capture(&StillFrames::ready(), &classifier)));

        session.logout();

        assert_eq!(session.state(), &SessionState::default());
        assert!(session.active_mode().is_none());
        assert_eq!(session.camera().status(), CameraStatus::Inactive);
        assert_eq!(session.capture_state(), &CaptureState::Idle);
        assert_eq!(devices.live_streams(), 0);
    }

    #[test]
    fn test_logout_while_acquiring_stops_late_stream() {
        let devices = FakeDevices::granting();
        let mut session = SessionController::default();
        let ticket = session.login("alice").unwrap();
        session.logout();

        assert_eq!(block_on(session.acquire_camera(&devices, ticket)), Activation::Stale);
        assert_eq!(devices.live_streams(), 0);
        assert!(!session.state().camera_active);
    }

    #[test]
    fn test_food_capture_scenario() {
        let devices = FakeDevices::granting();
        let classifier = ScriptedClassifier::detections(
            r#"{"detections":[{"label":"apple","confidence":0.92}]}"#,
        );
        let mut session = live_session(&devices, "alice");
        assert_eq!(session.select_mode("food").unwrap().name, "Food Mode");

        assert!(block_on(session.capture(&StillFrames::ready(), &classifier)));

        match session.capture_state() {
            CaptureState::Success { mode, detections } => {
                assert_eq!(*mode, ModeId::Food);
                assert_eq!(detections.len(), 1);
                assert_eq!(detections[0].label, "apple");
                assert_eq!(detections[0].percent(), 92);
            }
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(classifier.calls(), 1);
        assert_eq!(classifier.last_mode(), Some(ModeId::Food));
    }

    #[test]
    fn test_server_error_message_is_shown_verbatim() {
        let devices = FakeDevices::granting();
        let classifier = ScriptedClassifier::status(500, r#"{"error":"model unavailable"}"#);
        let mut session = live_session(&devices, "alice");
        session.select_mode("driving");

        block_on(session.capture(&StillFrames::ready(), &classifier));

        match session.capture_state() {
            CaptureState::Failed { error, .. } => assert_eq!(error.to_string(), "model unavailable"),
            other => panic!("unexpected state {:?}", other),
        }
        assert!(!session.is_capturing());
    }

    #[test]
    fn test_empty_detections_differ_from_no_capture() {
        let devices = FakeDevices::granting();
        let classifier = ScriptedClassifier::detections(r#"{"detections":[]}"#);
        let mut session = live_session(&devices, "alice");
        session.select_mode("art");
        assert_eq!(session.capture_state(), &CaptureState::Idle);

        block_on(session.capture(&StillFrames::ready(), &classifier));

        assert_eq!(
            session.capture_state(),
            &CaptureState::Success {
                mode: ModeId::Art,
                detections: Vec::<Detection>::new()
            }
        );
    }

    #[test]
    fn test_guarded_captures_issue_no_request() {
        let devices = FakeDevices::granting();
        let classifier = ScriptedClassifier::detections(r#"{"detections":[]}"#);

        // no mode
        let mut session = live_session(&devices, "alice");
        assert!(!block_on(session.capture(&StillFrames::ready(), &classifier)));

        // no frame
        session.select_mode("food");
        assert!(!block_on(session.capture(&StillFrames::empty(), &classifier)));

        // camera inactive
        session.set_camera_active(false);
        assert!(!block_on(session.capture(&StillFrames::ready(), &classifier)));

        assert_eq!(classifier.calls(), 0);
        assert_eq!(session.capture_state(), &CaptureState::Idle);
    }

    #[test]
    fn test_second_trigger_while_pending_is_ignored() {
        let devices = FakeDevices::granting();
        let classifier = ScriptedClassifier::detections(r#"{"detections":[]}"#);
        let frames = StillFrames::ready();
        let mut session = live_session(&devices, "alice");
        session.select_mode("shopping");

        let first = session.begin_capture(&frames).unwrap();
        assert!(!session.can_capture());
        assert!(session.begin_capture(&frames).is_none());

        assert!(session.capture_finished(block_on(first.send(&classifier))));
        assert_eq!(classifier.calls(), 1);
        assert!(session.can_capture());
    }

    #[test]
    fn test_result_is_attributed_to_capture_mode() {
        let devices = FakeDevices::granting();
        let classifier = ScriptedClassifier::detections(
            r#"{"detections":[{"label":"stop sign","confidence":0.7}]}"#,
        );
        let frames = StillFrames::ready();
        let mut session = live_session(&devices, "alice");
        session.select_mode("driving");

        let request = session.begin_capture(&frames).unwrap();
        session.select_mode("art");
        assert!(session.is_capturing());
        assert!(session.capture_finished(block_on(request.send(&classifier))));

        assert!(matches!(
            session.capture_state(),
            CaptureState::Success {
                mode: ModeId::Driving,
                ..
            }
        ));
        assert_eq!(session.state().active_mode, Some(ModeId::Art));

        session.select_mode("wiring");
        assert_eq!(session.capture_state(), &CaptureState::Idle);
    }

    #[test]
    fn test_result_after_logout_or_camera_off_is_discarded() {
        let devices = FakeDevices::granting();
        let classifier = ScriptedClassifier::detections(r#"{"detections":[]}"#);
        let frames = StillFrames::ready();

        let mut session = live_session(&devices, "alice");
        session.select_mode("food");
        let request = session.begin_capture(&frames).unwrap();
        session.logout();
        assert!(!session.capture_finished(block_on(request.send(&classifier))));
        assert_eq!(session.capture_state(), &CaptureState::Idle);

        let mut session = live_session(&devices, "bob");
        session.select_mode("food");
        let request = session.begin_capture(&frames).unwrap();
        session.set_camera_active(false);
        assert!(!session.capture_finished(block_on(request.send(&classifier))));
        assert_eq!(session.capture_state(), &CaptureState::Idle);
    }

    #[test]
    fn test_denied_camera_then_retry() {
        let denied = FakeDevices::failing(CameraError::PermissionDenied);
        let mut session = SessionController::default();
        let ticket = session.login("alice").unwrap();
        session.select_mode("food");

        assert_eq!(
            block_on(session.acquire_camera(&denied, ticket)),
            Activation::Failed(CameraError::PermissionDenied)
        );
        assert_eq!(session.camera().status(), CameraStatus::Failed);
        assert!(!session.state().camera_active);
        assert!(session.state().logged_in);
        assert!(!session.can_capture());
        assert!(session.begin_capture(&StillFrames::ready()).is_none());

        let granted = FakeDevices::granting();
        let retry = session.retry_camera().unwrap();
        assert_eq!(block_on(session.acquire_camera(&granted, retry)), Activation::Live);
        assert_eq!(denied.requests(), 1);
        assert_eq!(granted.requests(), 1);
        assert!(session.state().camera_active);
        assert!(session.can_capture());
    }

    #[test]
    fn test_camera_toggle_is_idempotent() {
        let devices = FakeDevices::granting();
        let mut session = live_session(&devices, "alice");

        assert!(session.set_camera_active(true).is_none());
        session.set_camera_active(false);
        session.set_camera_active(false);
        assert_eq!(devices.stop_calls(), 1);
        assert_eq!(session.camera().status(), CameraStatus::Inactive);

        let ticket = session.set_camera_active(true).unwrap();
        assert_eq!(block_on(session.acquire_camera(&devices, ticket)), Activation::Live);
        assert_eq!(devices.live_streams(), 1);
    }

    #[test]
    fn test_mode_selection_requires_session_and_known_id() {
        let mut session: SessionController<FakeStream> = SessionController::default();
        assert!(session.select_mode("food").is_none());
        assert!(session.state().active_mode.is_none());

        session.login("alice").unwrap();
        assert!(session.select_mode("laundry").is_none());
        assert!(session.state().active_mode.is_none());
        assert_eq!(session.select_mode("wiring").unwrap().id, ModeId::Wiring);
    }

    #[test]
    fn test_transport_errors_keep_session() {
        let devices = FakeDevices::granting();
        let classifier = ScriptedClassifier::transport_error(CaptureError::Network(
            "Failed to fetch".into(),
        ));
        let mut session = live_session(&devices, "alice");
        session.select_mode("food");

        assert!(block_on(session.capture(&StillFrames::ready(), &classifier)));
        assert!(matches!(
            session.capture_state(),
            CaptureState::Failed { .. }
        ));
        assert!(session.state().logged_in);
        assert!(session.can_capture());
    }
}
