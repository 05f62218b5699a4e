use std::time::Duration;

use reqwest::multipart::{Form, Part};
use shared::ModeId;
use url::Url;

use crate::error::GatewayError;

/// An image received from the browser, ready to be passed on.
#[derive(Debug)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

/// The classifier's answer, relayed byte for byte.
#[derive(Debug)]
pub struct Relayed {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Relayed {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client for the upstream classification service.
#[derive(Clone)]
pub struct ClassifierClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ClassifierClient {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn predict_url(&self, mode: ModeId) -> String {
        format!(
            "{}/predict/{}",
            self.base_url.as_str().trim_end_matches('/'),
            mode
        )
    }

    pub async fn forward(&self, mode: ModeId, upload: Upload) -> Result<Relayed, GatewayError> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(&upload.content_type)
            .map_err(|e| GatewayError::Multipart(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.predict_url(mode))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Upstream(e.to_string()))?;

        Ok(Relayed {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_url_is_mode_scoped() {
        let client = ClassifierClient::new(
            Url::parse("http://localhost:5001").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            client.predict_url(ModeId::Food),
            "http://localhost:5001/predict/food"
        );

        let nested = ClassifierClient::new(
            Url::parse("https://vision.example.com/api/").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(
            nested.predict_url(ModeId::Wiring),
            "https://vision.example.com/api/predict/wiring"
        );
    }
}
