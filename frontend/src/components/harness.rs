use super::super::{HarnessPanel, Model, Msg};
use super::results::render_prediction;
use super::statistics::render_statistics;
use super::utils::{debounced_send, render_error_message};
use shared::display::{format_probability, ClusterView};
use shared::features;
use shared::{Endpoint, PredictionResponse, Scenario, ServiceState, TestRecord};
use yew::prelude::*;

const PANEL_ORDER: [Endpoint; 3] = [Endpoint::Occupancy, Endpoint::Cluster, Endpoint::Duration];

pub fn render_model_tests(model: &Model, ctx: &Context<Model>) -> Html {
    if !matches!(model.service, ServiceState::Connected(_)) {
        return html! {
            <p class="no-results-message">{"Les tests nécessitent une API opérationnelle."}</p>
        };
    }
    html! {
        <div class="model-tests">
            { for PANEL_ORDER.iter().filter_map(|endpoint| {
                model.panels.get(endpoint).map(|panel| render_panel(ctx, *endpoint, panel, model.config.random_batch_size))
            }) }
        </div>
    }
}

fn render_panel(ctx: &Context<Model>, endpoint: Endpoint, panel: &HarnessPanel, random_size: usize) -> Html {
    let busy = panel.running;
    html! {
        <section class="test-panel" key={endpoint.to_string()}>
            <h2><i class="fa-solid fa-vial"></i>{ format!(" Tests : {}", endpoint.label()) }</h2>

            <div class="scenario-list">
                { for panel.scenarios.iter().enumerate().map(|(i, scenario)| {
                    render_scenario(ctx, endpoint, i, scenario, panel.selected == Some(i), busy)
                }) }
            </div>

            <div class="button-container">
                <button class="analyze-btn" disabled={busy}
                    onclick={debounced_send(ctx, move || Msg::RunAll(endpoint))}>
                    <i class="fa-solid fa-play"></i>{" Tester tous les scénarios"}
                </button>
                if endpoint != Endpoint::Duration {
                    <button class="analyze-btn" disabled={busy}
                        onclick={debounced_send(ctx, move || Msg::RunRandom(endpoint))}>
                        <i class="fa-solid fa-shuffle"></i>{ format!(" Générer {} tests aléatoires", random_size) }
                    </button>
                }
                <button class="analyze-btn secondary" disabled={busy || panel.history.is_empty()}
                    onclick={debounced_send(ctx, move || Msg::ExportCsv(endpoint))}>
                    <i class="fa-solid fa-file-csv"></i>{" Exporter en CSV"}
                </button>
                <button class="analyze-btn danger" disabled={busy || panel.history.is_empty()}
                    onclick={debounced_send(ctx, move || Msg::ClearResults(endpoint))}>
                    <i class="fa-solid fa-trash"></i>{" Effacer"}
                </button>
            </div>

            if let Some(progress) = panel.progress {
                <div class="progress">
                    <div class="progress-bar" style={format!("width: {:.0}%", progress.percent())}></div>
                    <span class="progress-label">{ format!("{} / {}", progress.completed, progress.total) }</span>
                </div>
            }

            { render_error_message(panel.error.as_deref()) }
            if let Some(notice) = &panel.notice {
                <p class="batch-notice"><i class="fa-solid fa-circle-info"></i>{ format!(" {}", notice) }</p>
            }

            if let Some(record) = panel.history.latest() {
                { render_prediction(&record.result, Some(record.scenario_name.as_str())) }
            }

            { render_statistics(endpoint, &panel.stats, panel.history.records()) }
            { render_history(panel.history.records()) }
        </section>
    }
}

fn render_scenario(
    ctx: &Context<Model>,
    endpoint: Endpoint,
    index: usize,
    scenario: &Scenario,
    selected: bool,
    busy: bool,
) -> Html {
    let link = ctx.link();
    html! {
        <div
            class={classes!("scenario-item", selected.then_some("selected"))}
            onclick={link.callback(move |_| Msg::SelectScenario(endpoint, index))}
        >
            <div class="scenario-header">
                <span class="scenario-index">{ (index + 1).to_string() }</span>
                <strong>{ scenario.name.clone() }</strong>
                <button
                    class="analyze-btn small"
                    disabled={busy}
                    onclick={link.callback(move |e: MouseEvent| {
                        e.stop_propagation();
                        Msg::RunScenario(endpoint, index)
                    })}
                >
                    {"Tester"}
                </button>
            </div>
            <p class="scenario-description">{ scenario.description.clone() }</p>
            if selected {
                <ul class="scenario-params">
                    { for scenario.input.iter().map(|(key, value)| html! {
                        <li>
                            <span class="param-label">{ features::label_for(key).to_string() }</span>
                            <span class="param-value">{ features::format_value(key, value) }</span>
                        </li>
                    }) }
                </ul>
            }
        </div>
    }
}

fn summary(record: &TestRecord) -> String {
    match &record.result {
        PredictionResponse::Duration { hours } => format!("{:.2} h", hours),
        PredictionResponse::Occupancy { occupied, probability_occupied, .. } => format!(
            "{} ({})",
            if *occupied { "Occupée" } else { "Libre" },
            format_probability(*probability_occupied)
        ),
        PredictionResponse::Cluster { cluster, confidence, .. } => {
            let view = ClusterView::new(*cluster, *confidence, "");
            format!("{} ({}%)", view.chip_label(), view.confidence_percent())
        }
    }
}

fn render_history(records: &[TestRecord]) -> Html {
    if records.is_empty() {
        return html! {};
    }
    html! {
        <table class="history">
            <thead>
                <tr><th>{"Heure"}</th><th>{"Scénario"}</th><th>{"Résultat"}</th></tr>
            </thead>
            <tbody>
                { for records.iter().map(|record| html! {
                    <tr key={record.id.to_string()}>
                        <td>{ record.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S").to_string() }</td>
                        <td>{ record.scenario_name.clone() }</td>
                        <td>{ summary(record) }</td>
                    </tr>
                }) }
            </tbody>
        </table>
    }
}
