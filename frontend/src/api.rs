use gloo_net::http::Request;
use js_sys::{Array, Uint8Array};
use shared::{CaptureError, ClassifierReply, Classifier, ModeId};
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, FormData};

use crate::media::js_error_message;

/// Talks to `POST {base}/predict/{mode}`. An empty base means same origin,
/// i.e. the gateway that served the app.
#[derive(Clone, PartialEq)]
pub struct HttpClassifier {
    base_url: String,
}

impl HttpClassifier {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL baked in at build time through `CLASSIFIER_BASE_URL`.
    pub fn from_build_env() -> Self {
        Self::new(option_env!("CLASSIFIER_BASE_URL").unwrap_or(""))
    }

    pub fn endpoint(&self, mode: ModeId) -> String {
        format!("{}/predict/{}", self.base_url, mode)
    }
}

impl Classifier for HttpClassifier {
    async fn submit(&self, mode: ModeId, jpeg: Vec<u8>) -> Result<ClassifierReply, CaptureError> {
        let form = upload_form(&jpeg).map_err(|e| CaptureError::Encode(js_error_message(&e)))?;

        let response = Request::post(&self.endpoint(mode))
            .body(form)
            .map_err(|e| CaptureError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| CaptureError::Network(e.to_string()))?;

        let status = response.status();
        let reply = ClassifierReply::from_body_read(status, response.text().await)?;
        gloo_console::debug!("API response:", status, &reply.body);

        Ok(reply)
    }
}

fn upload_form(jpeg: &[u8]) -> Result<FormData, JsValue> {
    let parts = Array::of1(&Uint8Array::from(jpeg));
    let options = BlobPropertyBag::new();
    options.set_type("image/jpeg");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;

    let form = FormData::new()?;
    form.append_with_blob_and_filename("file", &blob, "capture.jpg")?;
    Ok(form)
}
