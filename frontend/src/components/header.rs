use super::super::{Model, Msg, Tab};
use shared::ServiceState;
use yew::prelude::*;

/// Renders the application header with the tab bar and the API status chip
pub fn render_header(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let tab_button = |tab: Tab, icon: &'static str, label: &'static str| {
        html! {
            <button
                class={classes!("tab-btn", (model.tab == tab).then_some("active"))}
                onclick={link.callback(move |_| Msg::SelectTab(tab))}
            >
                <i class={icon}></i>{ format!(" {}", label) }
            </button>
        }
    };

    html! {
        <header class="app-header">
            <div class="header-title">
                <h1><i class="fa-solid fa-square-parking"></i> {" Smart Parking Dashboard"}</h1>
                <p class="subtitle">{"Durée de stationnement, occupation des places et profils utilisateurs"}</p>
            </div>
            { render_status_chip(&model.service) }
            <nav class="tabs">
                { tab_button(Tab::Dashboard, "fa-solid fa-gauge", "Tableau de bord") }
                { tab_button(Tab::ModelTests, "fa-solid fa-flask", "Tests des modèles") }
            </nav>
        </header>
    }
}

fn render_status_chip(state: &ServiceState) -> Html {
    let (class, label) = match state {
        ServiceState::Checking => ("status-chip checking", "Vérification de l'API..."),
        ServiceState::Connected(_) => ("status-chip connected", "API connectée"),
        ServiceState::Degraded(_) => ("status-chip degraded", "Modèles non chargés"),
        ServiceState::Disconnected(_) => ("status-chip disconnected", "API déconnectée"),
    };
    html! { <span class={class}>{ label }</span> }
}

/// Persistent banner for a degraded or unreachable service.
pub fn render_service_banner(model: &Model) -> Html {
    let Some(message) = model.service.banner() else {
        return html! {};
    };
    let (class, icon) = match model.service {
        ServiceState::Degraded(_) => ("service-banner degraded", "fa-solid fa-triangle-exclamation"),
        _ => ("service-banner disconnected", "fa-solid fa-plug-circle-xmark"),
    };
    html! {
        <div class={class} role="alert">
            <i class={icon}></i>
            <p>{ message }</p>
            <p class="banner-hint">{ format!("API : {}", model.config.base_url) }</p>
        </div>
    }
}
