use js_sys::JSON;
use shared::{
    CameraConstraints, CameraError, CaptureError, Frame, FrameSource, MediaDevices, StreamHandle,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, DomException, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};
use yew::NodeRef;

// HTMLMediaElement.HAVE_CURRENT_DATA
const HAVE_CURRENT_DATA: u16 = 2;

/// A `MediaStream` granted by `getUserMedia`.
pub struct WebStream(MediaStream);

impl WebStream {
    pub fn media_stream(&self) -> &MediaStream {
        &self.0
    }
}

impl StreamHandle for WebStream {
    fn stop(&mut self) {
        for track in self.0.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

/// `navigator.mediaDevices`
pub struct BrowserMediaDevices;

impl MediaDevices for BrowserMediaDevices {
    type Stream = WebStream;

    async fn get_user_media(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<WebStream, CameraError> {
        let window =
            web_sys::window().ok_or_else(|| CameraError::Other("no global `window`".into()))?;
        let devices = window.navigator().media_devices().map_err(camera_error)?;

        let video = JSON::parse(&constraints.to_video_json().to_string()).map_err(camera_error)?;
        let request = MediaStreamConstraints::new();
        request.set_audio(&JsValue::FALSE);
        request.set_video(&video);

        let promise = devices
            .get_user_media_with_constraints(&request)
            .map_err(camera_error)?;
        let stream = JsFuture::from(promise).await.map_err(camera_error)?;
        stream
            .dyn_into::<MediaStream>()
            .map(WebStream)
            .map_err(camera_error)
    }
}

fn camera_error(err: JsValue) -> CameraError {
    match err.dyn_ref::<DomException>() {
        Some(exception) => CameraError::from_dom_exception(&exception.name(), &exception.message()),
        None => CameraError::Other(js_error_message(&err)),
    }
}

pub fn js_error_message(err: &JsValue) -> String {
    if let Some(exception) = err.dyn_ref::<DomException>() {
        return exception.message();
    }
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

/// Points the `<video>` element at the live stream, or detaches it.
pub fn sync_video(node: &NodeRef, stream: Option<&WebStream>) {
    let Some(video) = node.cast::<HtmlVideoElement>() else {
        return;
    };
    let wanted = stream.map(WebStream::media_stream);
    if video.src_object().as_ref() != wanted {
        video.set_src_object(wanted);
    }
}

/// Reads stills from the `<video>` element through an offscreen canvas.
pub struct VideoFrameSource {
    video: Option<HtmlVideoElement>,
}

impl VideoFrameSource {
    pub fn new(node: &NodeRef) -> Self {
        Self {
            video: node.cast::<HtmlVideoElement>(),
        }
    }
}

impl FrameSource for VideoFrameSource {
    fn frame_available(&self) -> bool {
        self.video.as_ref().is_some_and(|video| {
            video.ready_state() >= HAVE_CURRENT_DATA
                && video.video_width() > 0
                && video.video_height() > 0
        })
    }

    fn snapshot(&self) -> Result<Frame, CaptureError> {
        let video = self
            .video
            .as_ref()
            .ok_or_else(|| CaptureError::Encode("video element is gone".into()))?;
        let (width, height) = (video.video_width(), video.video_height());

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| CaptureError::Encode("no document".into()))?;
        let canvas = document
            .create_element("canvas")
            .map_err(encode_error)?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| CaptureError::Encode("canvas unsupported".into()))?;
        canvas.set_width(width);
        canvas.set_height(height);

        let context = canvas
            .get_context("2d")
            .map_err(encode_error)?
            .ok_or_else(|| CaptureError::Encode("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| CaptureError::Encode("2d context unavailable".into()))?;
        context
            .draw_image_with_html_video_element(video, 0.0, 0.0)
            .map_err(encode_error)?;
        let pixels = context
            .get_image_data(0.0, 0.0, width as f64, height as f64)
            .map_err(encode_error)?;

        Frame::from_rgba(width, height, pixels.data().0)
    }
}

fn encode_error(err: JsValue) -> CaptureError {
    CaptureError::Encode(js_error_message(&err))
}
