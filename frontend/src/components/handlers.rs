use super::super::{HarnessPanel, Model, Msg};
use super::utils;
use crate::api::HttpClient;
use shared::export;
use shared::form::FormState;
use shared::harness::{run_batch, run_single, TestRecord};
use shared::scenario::random_scenarios;
use shared::service::{bootstrap, RANDOM_BATCH_DELAY_MS};
use shared::{
    ApiConfig, BatchOptions, BatchOutcome, BatchProgress, Endpoint, FormController, HarnessError,
    PredictionResponse, PredictionService, Scenario, ServiceState, TestHistory,
};
use std::time::Duration;
use strum::IntoEnumIterator;
use yew::prelude::*;

pub fn handle_config_loaded(model: &mut Model, ctx: &Context<Model>, config: ApiConfig) -> bool {
    log::info!("prediction service at {}", config.base_url);
    let client = HttpClient::new(config.clone());
    model.config = config;
    model.client = Some(client.clone());

    utils::send_future(ctx, &model.cancel, async move { Msg::ServiceReady(bootstrap(&client).await) });
    false
}

pub fn handle_service_ready(model: &mut Model, state: ServiceState) -> bool {
    if let Some(features) = state.features() {
        model.forms = Endpoint::iter()
            .map(|endpoint| {
                let form = FormState::seeded(endpoint, features.required_for(endpoint));
                (endpoint, FormController::new(form))
            })
            .collect();
    }
    model.service = state;
    true
}

pub fn handle_field_changed(model: &mut Model, endpoint: Endpoint, key: &str, raw: &str) -> bool {
    match model.forms.get_mut(&endpoint) {
        Some(form) => {
            form.state.set_field_text(key, raw);
            true
        }
        None => false,
    }
}

pub fn handle_submit(model: &mut Model, ctx: &Context<Model>, endpoint: Endpoint) -> bool {
    let Some(client) = model.client.clone() else {
        return false;
    };
    let Some(form) = model.forms.get_mut(&endpoint) else {
        return false;
    };
    let Some(input) = form.begin() else {
        log::debug!("{} form not ready: missing {:?}", endpoint, form.state.missing());
        return false;
    };

    utils::send_future(ctx, &model.cancel, async move {
        let result = client.predict(endpoint, &input).await.map_err(|e| {
            log::warn!("{} prediction failed: {}", endpoint, e);
            e.user_message(endpoint)
        });
        Msg::PredictionDone(endpoint, result)
    });
    true
}

pub fn handle_prediction_done(
    model: &mut Model,
    endpoint: Endpoint,
    result: Result<PredictionResponse, String>,
) -> bool {
    match model.forms.get_mut(&endpoint) {
        Some(form) => {
            form.finish(result);
            true
        }
        None => false,
    }
}

pub fn handle_select_scenario(model: &mut Model, endpoint: Endpoint, index: usize) -> bool {
    match model.panels.get_mut(&endpoint) {
        Some(panel) if index < panel.scenarios.len() => {
            panel.selected = Some(index);
            true
        }
        _ => false,
    }
}

/// Panel that can start a run, with the client to run it on.
fn idle_panel(model: &mut Model, endpoint: Endpoint) -> Option<(&mut HarnessPanel, HttpClient)> {
    let client = model.client.clone()?;
    let panel = model.panels.get_mut(&endpoint)?;
    if panel.running {
        return None;
    }
    panel.running = true;
    panel.error = None;
    panel.notice = None;
    Some((panel, client))
}

pub fn handle_run_scenario(model: &mut Model, ctx: &Context<Model>, endpoint: Endpoint, index: usize) -> bool {
    let cancel = model.cancel.clone();
    let Some((panel, client)) = idle_panel(model, endpoint) else {
        return false;
    };
    let Some(scenario) = panel.scenarios.get(index).cloned() else {
        panel.running = false;
        return false;
    };
    panel.selected = Some(index);
    panel.progress = None;

    utils::send_future(ctx, &cancel, async move {
        let result = run_single(&client, endpoint, &scenario)
            .await
            .map_err(|e| e.user_message(endpoint));
        Msg::ScenarioDone(endpoint, result)
    });
    true
}

pub fn handle_scenario_done(model: &mut Model, endpoint: Endpoint, result: Result<TestRecord, String>) -> bool {
    let Some(panel) = model.panels.get_mut(&endpoint) else {
        return false;
    };
    panel.running = false;
    match result {
        Ok(record) => {
            let mut history = panel.history.clone();
            history.push(record);
            panel.set_history(history);
        }
        Err(message) => {
            log::warn!("{} scenario failed: {}", endpoint, message);
            panel.error = Some(message);
        }
    }
    true
}

fn start_batch(
    model: &mut Model,
    ctx: &Context<Model>,
    endpoint: Endpoint,
    scenarios: Vec<Scenario>,
    options: BatchOptions,
) -> bool {
    let cancel = model.cancel.clone();
    let Some((panel, client)) = idle_panel(model, endpoint) else {
        return false;
    };
    panel.progress = Some(BatchProgress { completed: 0, total: scenarios.len() });

    let link = ctx.link().clone();
    let progress_cancel = cancel.clone();
    let batch_cancel = cancel.clone();
    utils::send_future(ctx, &cancel, async move {
        let result = run_batch(&client, endpoint, &scenarios, options, &batch_cancel, |progress| {
            if !progress_cancel.is_cancelled() {
                link.send_message(Msg::Progress(endpoint, progress));
            }
        })
        .await;
        Msg::BatchDone(endpoint, result)
    });
    true
}

pub fn handle_run_all(model: &mut Model, ctx: &Context<Model>, endpoint: Endpoint) -> bool {
    let Some(scenarios) = model.panels.get(&endpoint).map(|p| p.scenarios.clone()) else {
        return false;
    };
    let options = BatchOptions::with_delay(model.config.batch_delay());
    start_batch(model, ctx, endpoint, scenarios, options)
}

pub fn handle_run_random(model: &mut Model, ctx: &Context<Model>, endpoint: Endpoint) -> bool {
    let scenarios = random_scenarios(endpoint, model.config.random_batch_size, &mut rand::thread_rng());
    let options = BatchOptions::with_delay(Duration::from_millis(RANDOM_BATCH_DELAY_MS));
    start_batch(model, ctx, endpoint, scenarios, options)
}

pub fn handle_progress(model: &mut Model, endpoint: Endpoint, progress: BatchProgress) -> bool {
    match model.panels.get_mut(&endpoint) {
        Some(panel) if panel.running => {
            panel.progress = Some(progress);
            true
        }
        _ => false,
    }
}

pub fn handle_batch_done(
    model: &mut Model,
    endpoint: Endpoint,
    result: Result<BatchOutcome, HarnessError>,
) -> bool {
    let Some(panel) = model.panels.get_mut(&endpoint) else {
        return false;
    };
    panel.running = false;
    panel.progress = None;

    match result {
        Ok(outcome) => {
            if !outcome.failures.is_empty() {
                panel.notice = Some(format!(
                    "{} scénario(s) sur {} ont échoué : {}",
                    outcome.failures.len(),
                    outcome.attempted(),
                    outcome
                        .failures
                        .iter()
                        .map(|f| f.scenario_name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
            let mut history = panel.history.clone();
            history.merge_batch(outcome.records);
            panel.set_history(history);
        }
        Err(HarnessError::Cancelled) => {}
        Err(e) => {
            log::error!("{} batch failed: {}", endpoint, e);
            panel.error = Some(e.user_message());
        }
    }
    true
}

pub fn handle_clear_results(model: &mut Model, endpoint: Endpoint) -> bool {
    match model.panels.get_mut(&endpoint) {
        Some(panel) if !panel.running => {
            panel.set_history(TestHistory::new());
            panel.error = None;
            panel.notice = None;
            true
        }
        _ => false,
    }
}

pub fn handle_export_csv(model: &mut Model, endpoint: Endpoint) -> bool {
    let Some(panel) = model.panels.get_mut(&endpoint) else {
        return false;
    };
    if panel.history.is_empty() {
        return false;
    }

    let file_name = export::file_name(chrono::Local::now().date_naive());
    let written = export::export_csv(panel.history.records())
        .map_err(|e| e.to_string())
        .and_then(|csv| utils::download_text(&file_name, "text/csv;charset=utf-8", &csv));
    match written {
        Ok(()) => {
            log::info!("exported {} records to {}", panel.history.len(), file_name);
            false
        }
        Err(e) => {
            log::error!("CSV export failed: {}", e);
            panel.error = Some(format!("Export impossible : {}", e));
            true
        }
    }
}
