use super::super::Model;
use super::utils::render_error_message;
use shared::{CaptureState, Detection, ModeId};
use yew::prelude::*;

pub fn render_results(model: &Model) -> Html {
    let state = model.session.capture_state();
    let message = state.message().unwrap_or_default();

    match state {
        CaptureState::Idle => html! {},
        CaptureState::Capturing { .. } => html! {
            <div class="results-container pending">
                <i class="fa-solid fa-spinner fa-spin"></i>
                <p>{ message }</p>
            </div>
        },
        CaptureState::Success { mode, detections } if detections.is_empty() => html! {
            <div class="results-container empty">
                { render_result_header(*mode) }
                <p class="no-results-message">{ message }</p>
            </div>
        },
        CaptureState::Success { mode, detections } => html! {
            <div class="results-container">
                { render_result_header(*mode) }
                <div class="result-bars">
                    { for detections.iter().map(render_detection) }
                </div>
            </div>
        },
        CaptureState::Failed { .. } => render_error_message(&message),
    }
}

fn render_result_header(mode: ModeId) -> Html {
    html! {
        <div class="result-header">
            <h2>{ format!("{} results", mode.mode().name) }</h2>
        </div>
    }
}

fn render_detection(detection: &Detection) -> Html {
    let percentage = detection.percent();
    html! {
        <div class="result-item">
            <div class="result-label">{ &detection.label }</div>
            <div class="result-bar-container">
                <div class="result-bar" style={format!("width: {}%", percentage)}></div>
            </div>
            <div class="result-value">{ format!("{}%", percentage) }</div>
        </div>
    }
}
