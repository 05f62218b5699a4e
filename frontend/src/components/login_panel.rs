use super::super::{Model, Msg};
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub fn render_login_panel(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();

    let handle_input = link.callback(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::UsernameChanged(input.value())
    });

    let handle_submit = link.callback(|e: SubmitEvent| {
        e.prevent_default();
        Msg::Login
    });

    html! {
        <div class="login-panel">
            <div class="login-card">
                <h1><i class="fa-solid fa-bolt"></i>{" IntelliColor"}</h1>
                <p class="subtitle">{"AI Vision Platform"}</p>
                <form onsubmit={handle_submit}>
                    <label for="username">{"Username"}</label>
                    <input
                        id="username"
                        name="username"
                        type="text"
                        required=true
                        placeholder="Enter your name"
                        value={model.username.clone()}
                        oninput={handle_input}
                    />
                    <button type="submit" class="analyze-btn">{"Start Session"}</button>
                </form>
            </div>
        </div>
    }
}
