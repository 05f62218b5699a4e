use super::super::{Model, Msg};
use shared::{Mode, ModeRegistry};
use yew::prelude::*;

pub fn render_mode_selector(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let active = model.session.state().camera_active;
    let selected = model.session.active_mode();

    html! {
        <div class="mode-selector">
            <button
                class={classes!("mode-toggle", (!active).then_some("disabled"))}
                disabled={!active}
                onclick={link.callback(|_| Msg::ToggleModeMenu)}
            >
                <span class={classes!("mode-dot", selected.is_some().then_some("active"))}></span>
                <div>
                    <p class="mode-name">{ selected.map_or("Select Mode", |mode| mode.name) }</p>
                    {
                        match selected {
                            Some(mode) => html! { <p class="mode-description">{ mode.description }</p> },
                            None => html! {},
                        }
                    }
                </div>
                <i class={classes!("fa-solid", "fa-chevron-down", model.mode_menu_open.then_some("open"))}></i>
            </button>

            {
                if model.mode_menu_open && active {
                    html! {
                        <div class="mode-menu">
                            { for ModeRegistry::list_modes().iter().map(|mode| render_mode_option(mode, selected, ctx)) }
                        </div>
                    }
                } else {
                    html! {}
                }
            }

            { render_mode_status(selected) }
        </div>
    }
}

fn render_mode_option(mode: &'static Mode, selected: Option<&'static Mode>, ctx: &Context<Model>) -> Html {
    let is_selected = selected.is_some_and(|current| current.id == mode.id);
    let id = mode.id.as_str();

    html! {
        <button
            key={id.to_string()}
            class={classes!("mode-option", is_selected.then_some("selected"))}
            onclick={ctx.link().callback(move |_| Msg::SelectMode(id.to_string()))}
        >
            <i class="fa-solid fa-bolt"></i>
            <div>
                <p class="mode-name">{ mode.name }</p>
                <p class="mode-description">{ mode.description }</p>
            </div>
        </button>
    }
}

fn render_mode_status(selected: Option<&'static Mode>) -> Html {
    match selected {
        Some(mode) => html! {
            <div class="mode-status">
                <span class="mode-dot active"></span>
                <span>{ format!("{} Active", mode.name) }</span>
                <p>{ format!("AI model ready for {}", mode.description.to_lowercase()) }</p>
            </div>
        },
        None => html! {},
    }
}
