//! In-memory stand-ins for the browser and the classifier.

use std::cell::Cell;
use std::rc::Rc;

use crate::camera::{CameraConstraints, MediaDevices, StreamHandle};
use crate::capture::{Classifier, Frame, FrameSource};
use crate::detection::ClassifierReply;
use crate::error::{CameraError, CaptureError};
use crate::mode::ModeId;

#[derive(Default, Debug)]
struct Counters {
    requests: Cell<usize>,
    live: Cell<usize>,
    stops: Cell<usize>,
}

#[derive(Debug)]
pub struct FakeStream {
    counters: Rc<Counters>,
    stopped: bool,
}

impl StreamHandle for FakeStream {
    fn stop(&mut self) {
        self.counters.stops.set(self.counters.stops.get() + 1);
        if !self.stopped {
            self.stopped = true;
            self.counters.live.set(self.counters.live.get() - 1);
        }
    }
}

pub struct FakeDevices {
    denial: Option<CameraError>,
    counters: Rc<Counters>,
}

impl FakeDevices {
    pub fn granting() -> Self {
        Self {
            denial: None,
            counters: Rc::default(),
        }
    }

    pub fn failing(err: CameraError) -> Self {
        Self {
            denial: Some(err),
            counters: Rc::default(),
        }
    }

    pub fn requests(&self) -> usize {
        self.counters.requests.get()
    }

    /// Streams granted and not yet stopped.
    pub fn live_streams(&self) -> usize {
        self.counters.live.get()
    }

    pub fn stop_calls(&self) -> usize {
        self.counters.stops.get()
    }
}

impl MediaDevices for FakeDevices {
    type Stream = FakeStream;

    async fn get_user_media(
        &self,
        _constraints: &CameraConstraints,
    ) -> Result<FakeStream, CameraError> {
        self.counters.requests.set(self.counters.requests.get() + 1);
        if let Some(err) = &self.denial {
            return Err(err.clone());
        }
        self.counters.live.set(self.counters.live.get() + 1);
        Ok(FakeStream {
            counters: Rc::clone(&self.counters),
            stopped: false,
        })
    }
}

pub enum StillFrames {
    Ready,
    Empty,
    Broken,
}

impl StillFrames {
    pub fn ready() -> Self {
        Self::Ready
    }

    /// The video element has not produced a frame yet.
    pub fn empty() -> Self {
        Self::Empty
    }

    /// A frame is reported but its pixels cannot be read back.
    pub fn broken() -> Self {
        Self::Broken
    }
}

impl FrameSource for StillFrames {
    fn frame_available(&self) -> bool {
        !matches!(self, Self::Empty)
    }

    fn snapshot(&self) -> Result<Frame, CaptureError> {
        match self {
            Self::Ready => Frame::from_rgba(8, 6, vec![128; 8 * 6 * 4]),
            Self::Empty | Self::Broken => Frame::from_rgba(8, 6, Vec::new()),
        }
    }
}

pub struct ScriptedClassifier {
    reply: Result<ClassifierReply, CaptureError>,
    calls: Cell<usize>,
    last_mode: Cell<Option<ModeId>>,
}

impl ScriptedClassifier {
    pub fn detections(body: &str) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self::with_reply(Ok(ClassifierReply::new(status, body)))
    }

    pub fn transport_error(err: CaptureError) -> Self {
        Self::with_reply(Err(err))
    }

    fn with_reply(reply: Result<ClassifierReply, CaptureError>) -> Self {
        Self {
            reply,
            calls: Cell::new(0),
            last_mode: Cell::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_mode(&self) -> Option<ModeId> {
        self.last_mode.get()
    }
}

impl Classifier for ScriptedClassifier {
    async fn submit(&self, mode: ModeId, jpeg: Vec<u8>) -> Result<ClassifierReply, CaptureError> {
        assert!(!jpeg.is_empty(), "classifier received an empty upload");
        self.calls.set(self.calls.get() + 1);
        self.last_mode.set(Some(mode));
        self.reply.clone()
    }
}
