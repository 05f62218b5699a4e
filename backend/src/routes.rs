use std::path::Path;

use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use futures::TryStreamExt;
use log::{error, info, warn};
use serde_json::json;
use shared::{parse_detections, ModeRegistry};
use uuid::Uuid;

use crate::classifier::{ClassifierClient, Upload};
use crate::error::GatewayError;

/// Largest image accepted from the browser, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: &Path) {
    cfg.service(web::resource("/predict/{mode}").route(web::post().to(handle_predict)))
        .service(web::resource("/health").route(web::get().to(health)));

    if frontend_dir.is_dir() {
        cfg.service(Files::new("/", frontend_dir).index_file("index.html"));
    } else {
        warn!(
            "Frontend directory {} not found, serving the API only",
            frontend_dir.display()
        );
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn handle_predict(
    path: web::Path<String>,
    payload: Multipart,
    client: web::Data<ClassifierClient>,
    limit: web::Data<UploadLimit>,
) -> HttpResponse {
    let request_id = Uuid::new_v4();
    let mode = path.into_inner();

    let mut response = match relay_prediction(request_id, &mode, payload, &client, limit.0).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                GatewayError::Upstream(_) => error!("[{}] {}", request_id, e),
                _ => warn!("[{}] rejected {} request: {}", request_id, mode, e),
            }
            e.error_response()
        }
    };

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
    }
    response
}

async fn relay_prediction(
    request_id: Uuid,
    mode: &str,
    payload: Multipart,
    client: &ClassifierClient,
    limit: usize,
) -> Result<HttpResponse, GatewayError> {
    let mode = ModeRegistry::find_mode(mode)
        .ok_or_else(|| GatewayError::UnsupportedMode(mode.to_string()))?
        .id;
    let upload = read_image_field(payload, limit).await?;
    info!(
        "[{}] forwarding {} bytes ({}) to classifier in {} mode",
        request_id,
        upload.bytes.len(),
        upload.content_type,
        mode
    );

    let relayed = client.forward(mode, upload).await?;
    if relayed.is_success() {
        match parse_detections(&String::from_utf8_lossy(&relayed.body)) {
            Ok(detections) => info!(
                "[{}] classifier returned {} detection(s)",
                request_id,
                detections.len()
            ),
            Err(e) => warn!("[{}] classifier body not understood: {}", request_id, e),
        }
    } else {
        warn!("[{}] classifier answered {}", request_id, relayed.status);
    }

    let status = StatusCode::from_u16(relayed.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = HttpResponse::build(status);
    if let Some(content_type) = relayed.content_type {
        response.content_type(content_type);
    }
    Ok(response.body(relayed.body))
}

/// Reads the `file` part of a multipart upload.
pub async fn read_image_field(mut payload: Multipart, limit: usize) -> Result<Upload, GatewayError> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| GatewayError::Multipart(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .filter(|name| !name.is_empty())
            .unwrap_or("capture.jpg")
            .to_string();
        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| "image/jpeg".to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| GatewayError::Multipart(e.to_string()))?
        {
            if bytes.len() + chunk.len() > limit {
                return Err(GatewayError::TooLarge);
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(GatewayError::EmptyFile);
        }
        return Ok(Upload {
            bytes,
            filename,
            content_type,
        });
    }

    Err(GatewayError::MissingFile)
}
