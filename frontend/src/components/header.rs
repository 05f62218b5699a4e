use super::super::{Model, Msg};
use yew::prelude::*;

/// Renders the application header
pub fn render_header(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-bolt"></i>{" IntelliColor"}</h1>
            <p class="subtitle">{"AI Vision Platform"}</p>
            <div class="session-info">
                <span class="current-user">{ &model.session.state().user }</span>
                <button class="logout-btn" onclick={ctx.link().callback(|_| Msg::Logout)}>
                    <i class="fa-solid fa-right-from-bracket"></i>{" Logout"}
                </button>
            </div>
        </header>
    }
}
