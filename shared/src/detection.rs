use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CaptureError;

/// One classifier output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence: clamp_confidence(confidence),
        }
    }

    /// Confidence as a whole percentage, e.g. `0.92` -> `92`.
    pub fn percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}%", self.label, self.percent())
    }
}

fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Deserialize)]
struct WireDetection {
    #[serde(alias = "color", alias = "class")]
    label: String,
    confidence: f32,
}

// Shapes the classifier has answered with over time. `detections` is canonical.
#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionBody {
    Detections {
        detections: Vec<WireDetection>,
    },
    Legacy {
        prediction: String,
        #[serde(default)]
        confidence: Option<f32>,
    },
    Summary {
        result: String,
    },
    Other(Map<String, Value>),
}

impl PredictionBody {
    fn normalize(self) -> Result<Vec<Detection>, CaptureError> {
        match self {
            PredictionBody::Detections { detections } => Ok(detections
                .into_iter()
                .map(|wire| Detection::new(wire.label, wire.confidence))
                .collect()),
            PredictionBody::Legacy {
                prediction,
                confidence,
            } => {
                // an explicit zero is the "nothing found" sentinel; no score means certain
                let detection = Detection::new(prediction.trim(), confidence.unwrap_or(1.0));
                if detection.label.is_empty() || detection.confidence == 0.0 {
                    Ok(Vec::new())
                } else {
                    Ok(vec![detection])
                }
            }
            PredictionBody::Summary { result } if result.trim().is_empty() => Ok(Vec::new()),
            PredictionBody::Summary { result } => Ok(vec![Detection::new(result.trim(), 1.0)]),
            PredictionBody::Other(fields) => match fields.get("detections") {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(other) => Err(CaptureError::Decode(format!(
                    "malformed detections: {}",
                    other
                ))),
            },
        }
    }
}

/// Decodes a successful classifier body into the canonical detection list.
pub fn parse_detections(body: &str) -> Result<Vec<Detection>, CaptureError> {
    let parsed: PredictionBody =
        serde_json::from_str(body).map_err(|e| CaptureError::Decode(e.to_string()))?;
    parsed.normalize()
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Best available message for a non-success response: the server's `error`
/// field when present, otherwise one derived from the status code.
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status))
}

/// Raw answer from the classifier transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierReply {
    pub status: u16,
    pub body: String,
}

impl ClassifierReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Builds a reply from a body read that may have failed. A successful
    /// status with an unreadable body is a network failure; for an error
    /// status the status-derived message is still available.
    pub fn from_body_read<E: fmt::Display>(
        status: u16,
        body: Result<String, E>,
    ) -> Result<Self, CaptureError> {
        match body {
            Ok(body) => Ok(Self::new(status, body)),
            Err(e) if (200..300).contains(&status) => Err(CaptureError::Network(e.to_string())),
            Err(e) => {
                log::warn!("could not read body of HTTP {} reply: {}", status, e);
                Ok(Self::new(status, String::new()))
            }
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn into_detections(self) -> Result<Vec<Detection>, CaptureError> {
        if self.is_success() {
            parse_detections(&self.body)
        } else {
            Err(CaptureError::Server(error_message(self.status, &self.body)))
        }
    }
}
