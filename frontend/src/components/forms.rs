use super::super::{Model, Msg};
use super::results::render_prediction;
use super::utils::{debounced_send, render_error_message};
use shared::features::{self, FeatureKind, FeatureSpec, WEEKDAY_NAMES};
use shared::{Endpoint, FormController, ServiceState};
use strum::IntoEnumIterator;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

pub fn render_dashboard(model: &Model, ctx: &Context<Model>) -> Html {
    match &model.service {
        ServiceState::Checking => html! {
            <div class="loading-panel">
                <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                <p>{"Connexion à l'API de prédiction..."}</p>
            </div>
        },
        ServiceState::Connected(_) => html! {
            <div class="dashboard-grid">
                { for Endpoint::iter().filter_map(|endpoint| {
                    model.forms.get(&endpoint).map(|form| render_form_card(ctx, endpoint, form))
                }) }
            </div>
        },
        // the banner already explains what is wrong
        ServiceState::Degraded(_) | ServiceState::Disconnected(_) => html! {
            <p class="no-results-message">{"Les formulaires seront disponibles une fois l'API opérationnelle."}</p>
        },
    }
}

fn render_form_card(ctx: &Context<Model>, endpoint: Endpoint, form: &FormController) -> Html {
    let submit = debounced_send(ctx, move || Msg::Submit(endpoint));
    let missing = form.state.missing();

    html! {
        <section class="form-card" key={endpoint.to_string()}>
            <h2>{ endpoint.label() }</h2>
            <div class="form-fields">
                { for form.state.required().iter().map(|key| {
                    render_field(ctx, endpoint, key, form.state.value(key))
                }) }
            </div>
            if !missing.is_empty() {
                <p class="form-hint">{ format!("Champs manquants : {}", missing.join(", ")) }</p>
            }
            <div class="button-container">
                <button class="analyze-btn" onclick={submit} disabled={!form.can_submit()}>
                    if form.loading {
                        <><i class="fa-solid fa-spinner fa-spin"></i>{" Prédiction..."}</>
                    } else {
                        <><i class="fa-solid fa-wand-magic-sparkles"></i>{" Prédire"}</>
                    }
                </button>
            </div>
            { render_error_message(form.error()) }
            if let Some(prediction) = form.prediction() {
                { render_prediction(prediction, None) }
            }
        </section>
    }
}

fn render_field(ctx: &Context<Model>, endpoint: Endpoint, key: &str, value: Option<f64>) -> Html {
    let spec = features::spec_for(endpoint, key);
    let label = match &spec {
        Some(spec) => spec.label,
        None => features::label_for(key),
    };
    let text = value.map(|v| v.to_string()).unwrap_or_default();

    let owned_key = key.to_string();
    let on_input = ctx.link().callback(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::FieldChanged(endpoint, owned_key.clone(), input.value())
    });
    let owned_key = key.to_string();
    let on_select = ctx.link().callback(move |e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        Msg::FieldChanged(endpoint, owned_key.clone(), select.value())
    });
    let owned_key = key.to_string();
    let on_toggle = ctx.link().callback(move |e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let raw = if input.checked() { "1" } else { "0" };
        Msg::FieldChanged(endpoint, owned_key.clone(), raw.to_string())
    });

    let widget = match spec.as_ref().map(|s| &s.kind) {
        Some(FeatureKind::Select(options)) => html! {
            <select onchange={on_select}>
                { for options.iter().map(|o| html! {
                    <option value={o.value.to_string()} selected={value == Some(o.value)}>{ o.label }</option>
                }) }
            </select>
        },
        Some(FeatureKind::Day) => html! {
            <select onchange={on_select}>
                { for WEEKDAY_NAMES.iter().enumerate().map(|(i, name)| html! {
                    <option value={i.to_string()} selected={value == Some(i as f64)}>{ *name }</option>
                }) }
            </select>
        },
        Some(FeatureKind::Toggle) => html! {
            <input type="checkbox" checked={value == Some(1.0)} onchange={on_toggle} />
        },
        Some(FeatureKind::Slider { min, max, step }) => html! {
            <>
                <input type="range" min={min.to_string()} max={max.to_string()} step={step.to_string()}
                    value={text.clone()} oninput={on_input} />
                <span class="field-value">{ format_with_unit(spec.as_ref(), key, value) }</span>
            </>
        },
        Some(FeatureKind::Number { min, max, step }) => html! {
            <input type="number" min={min.to_string()} max={max.to_string()} step={step.to_string()}
                value={text} oninput={on_input} />
        },
        Some(FeatureKind::TimeOfDay { step }) => html! {
            <>
                <input type="range" min="0" max={features::MINUTES_PER_DAY.to_string()} step={step.to_string()}
                    value={text.clone()} oninput={on_input} />
                <span class="field-value">{ value.map(features::format_minutes).unwrap_or_default() }</span>
            </>
        },
        None => html! {
            <input type="number" value={text} oninput={on_input} />
        },
    };

    html! {
        <label class={classes!("form-field", value.is_none().then_some("missing"))} title={key.to_string()}>
            <span class="field-label">{ label }</span>
            { widget }
        </label>
    }
}

fn format_with_unit(spec: Option<&FeatureSpec>, key: &str, value: Option<f64>) -> String {
    match (spec.and_then(|s| s.unit), value) {
        (Some(unit), Some(v)) => format!("{} {}", v, unit),
        (None, Some(v)) => features::format_value(key, v),
        (_, None) => String::new(),
    }
}
