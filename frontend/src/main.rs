mod api;
mod components;
mod media;

use api::HttpClassifier;
use components::camera_feed::render_camera_feed;
use components::handlers;
use components::header::render_header;
use components::login_panel::render_login_panel;
use components::mode_selector::render_mode_selector;
use components::results::render_results;
use media::{sync_video, WebStream};
use shared::{ActivationTicket, CameraError, CaptureReport, SessionController};
use yew::prelude::*;

// Yew msg components
pub enum Msg {
    // Session
    UsernameChanged(String),
    Login,
    Logout,

    // Modes
    ToggleModeMenu,
    SelectMode(String),

    // Camera
    CameraAcquired(ActivationTicket, Result<WebStream, CameraError>),
    RetryCamera,

    // Analysis
    Capture,
    CaptureFinished(CaptureReport),
}

// Main component
pub struct Model {
    session: SessionController<WebStream>,
    classifier: HttpClassifier,
    username: String,
    mode_menu_open: bool,
    video_ref: NodeRef,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            session: SessionController::default(),
            classifier: HttpClassifier::from_build_env(),
            username: String::new(),
            mode_menu_open: false,
            video_ref: NodeRef::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::UsernameChanged(name) => {
                self.username = name;
                true
            }
            Msg::Login => handlers::handle_login(self, ctx),
            Msg::Logout => handlers::handle_logout(self),

            Msg::ToggleModeMenu => {
                self.mode_menu_open = !self.mode_menu_open && self.session.state().camera_active;
                true
            }
            Msg::SelectMode(id) => handlers::handle_select_mode(self, &id),

            Msg::CameraAcquired(ticket, result) => {
                handlers::handle_camera_acquired(self, ticket, result)
            }
            Msg::RetryCamera => handlers::handle_retry_camera(self, ctx),

            Msg::Capture => handlers::handle_capture(self, ctx),
            Msg::CaptureFinished(report) => handlers::handle_capture_finished(self, report),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        if !self.session.state().logged_in {
            return render_login_panel(self, ctx);
        }

        html! {
            <div class="container">
                { render_header(self, ctx) }

                <main class="main-content">
                    { render_mode_selector(self, ctx) }
                    { render_camera_feed(self, ctx) }
                    { render_results(self) }
                </main>

                <footer class="app-footer">
                    <p>{"IntelliColor | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        sync_video(&self.video_ref, self.session.camera().stream());
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.session.logout();
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
