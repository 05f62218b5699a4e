use super::super::{Model, Msg};
use crate::api::HttpClassifier;
use crate::media::{BrowserMediaDevices, VideoFrameSource, WebStream};
use shared::{
    Activation, ActivationTicket, CameraError, CaptureReport, CaptureRequest, MediaDevices,
};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

pub fn handle_login(model: &mut Model, ctx: &Context<Model>) -> bool {
    match model.session.login(&model.username) {
        Ok(ticket) => {
            model.username.clear();
            request_camera(ctx, ticket);
            true
        }
        Err(e) => {
            log::warn!("Login ignored: {}", e);
            false
        }
    }
}

pub fn handle_logout(model: &mut Model) -> bool {
    model.session.logout();
    model.mode_menu_open = false;
    true
}

pub fn handle_select_mode(model: &mut Model, id: &str) -> bool {
    model.mode_menu_open = false;
    model.session.select_mode(id);
    true
}

pub fn handle_camera_acquired(
    model: &mut Model,
    ticket: ActivationTicket,
    result: Result<WebStream, CameraError>,
) -> bool {
    match model.session.camera_acquired(ticket, result) {
        Activation::Live => true,
        Activation::Failed(e) => {
            log::error!("Error accessing camera: {}", e);
            model.mode_menu_open = false;
            true
        }
        Activation::Stale => false,
    }
}

pub fn handle_retry_camera(model: &mut Model, ctx: &Context<Model>) -> bool {
    match model.session.retry_camera() {
        Some(ticket) => {
            request_camera(ctx, ticket);
            true
        }
        None => false,
    }
}

pub fn handle_capture(model: &mut Model, ctx: &Context<Model>) -> bool {
    let frames = VideoFrameSource::new(&model.video_ref);
    match model.session.begin_capture(&frames) {
        Some(request) => {
            send_analysis_request(ctx, model.classifier.clone(), request);
            true
        }
        None => false,
    }
}

pub fn handle_capture_finished(model: &mut Model, report: CaptureReport) -> bool {
    model.session.capture_finished(report)
}

fn request_camera(ctx: &Context<Model>, ticket: ActivationTicket) {
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = BrowserMediaDevices
            .get_user_media(ticket.constraints())
            .await;
        link.send_message(Msg::CameraAcquired(ticket, result));
    });
}

fn send_analysis_request(ctx: &Context<Model>, classifier: HttpClassifier, request: CaptureRequest) {
    let link = ctx.link().clone();
    spawn_local(async move {
        let report = request.send(&classifier).await;
        link.send_message(Msg::CaptureFinished(report));
    });
}
