use super::super::{Model, Msg};
use super::utils::debounce;
use shared::CameraStatus;
use yew::prelude::*;

pub fn render_camera_feed(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link().clone();
    let camera = model.session.camera();

    if let Some(err) = camera.error() {
        return html! {
            <div class="camera-feed camera-error">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p class="error-title">{"Camera Access Error"}</p>
                <p>{ err.to_string() }</p>
                <button class="analyze-btn" onclick={link.callback(|_| Msg::RetryCamera)}>
                    {"Retry"}
                </button>
            </div>
        };
    }

    html! {
        <div class="camera-feed">
            <video
                ref={model.video_ref.clone()}
                class="camera-video"
                autoplay={true}
                playsinline={true}
                muted={true}
            />

            {
                if camera.status() == CameraStatus::Acquiring {
                    html! {
                        <div class="camera-overlay">
                            <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                            <p>{"Initializing Camera..."}</p>
                        </div>
                    }
                } else {
                    html! {}
                }
            }

            {
                match model.session.active_mode() {
                    Some(mode) => html! {
                        <div class="mode-badge">{ format!("{} Mode Active", mode.id) }</div>
                    },
                    None => html! {},
                }
            }

            <div class="camera-indicator">
                {
                    if camera.is_live() {
                        html! { <i class="fa-solid fa-video live" title="Camera on"></i> }
                    } else {
                        html! { <i class="fa-solid fa-video-slash" title="Camera off"></i> }
                    }
                }
            </div>

            <button
                class="analyze-btn capture-btn"
                disabled={!model.session.can_capture()}
                onclick={debounce(300, {
                    let link = link.clone();
                    move || link.send_message(Msg::Capture)
                })}
            >
                { render_capture_button_content(model) }
            </button>
        </div>
    }
}

fn render_capture_button_content(model: &Model) -> Html {
    if model.session.is_capturing() {
        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Processing..."}</> }
    } else {
        html! { <><i class="fa-solid fa-camera"></i>{" Capture & Analyze"}</> }
    }
}
