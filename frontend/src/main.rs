mod api;
mod components;

use std::collections::BTreeMap;

use shared::harness::TestRecord;
use shared::scenario::fixed_scenarios;
use shared::{
    AggregateStatistics, ApiConfig, BatchOutcome, BatchProgress, CancelToken, Endpoint, FormController,
    HarnessError, PredictionResponse, Scenario, ServiceState, TestHistory,
};
use strum::IntoEnumIterator;
use yew::prelude::*;

use crate::api::HttpClient;
use crate::components::{forms, handlers, harness, header, utils};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tab {
    Dashboard,
    ModelTests,
}

/// State of one "Model tests" panel.
pub struct HarnessPanel {
    pub scenarios: Vec<Scenario>,
    pub history: TestHistory,
    pub stats: AggregateStatistics,
    pub selected: Option<usize>,
    pub running: bool,
    pub progress: Option<BatchProgress>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl HarnessPanel {
    fn new(endpoint: Endpoint) -> Self {
        Self {
            scenarios: fixed_scenarios(endpoint),
            history: TestHistory::new(),
            stats: AggregateStatistics::default(),
            selected: None,
            running: false,
            progress: None,
            error: None,
            notice: None,
        }
    }

    /// Statistics are derived, never edited: every history change rebuilds them.
    pub fn set_history(&mut self, history: TestHistory) {
        self.stats = history.statistics();
        self.history = history;
    }
}

pub enum Msg {
    // Startup
    ConfigLoaded(ApiConfig),
    ServiceReady(ServiceState),

    // Navigation
    SelectTab(Tab),

    // Prediction forms
    FieldChanged(Endpoint, String, String),
    Submit(Endpoint),
    PredictionDone(Endpoint, Result<PredictionResponse, String>),

    // Model tests
    SelectScenario(Endpoint, usize),
    RunScenario(Endpoint, usize),
    ScenarioDone(Endpoint, Result<TestRecord, String>),
    RunAll(Endpoint),
    RunRandom(Endpoint),
    Progress(Endpoint, BatchProgress),
    BatchDone(Endpoint, Result<BatchOutcome, HarnessError>),
    ClearResults(Endpoint),
    ExportCsv(Endpoint),
}

pub struct Model {
    pub config: ApiConfig,
    pub client: Option<HttpClient>,
    pub service: ServiceState,
    pub tab: Tab,
    pub forms: BTreeMap<Endpoint, FormController>,
    pub panels: BTreeMap<Endpoint, HarnessPanel>,
    pub cancel: CancelToken,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let model = Self {
            config: ApiConfig::default(),
            client: None,
            service: ServiceState::Checking,
            tab: Tab::Dashboard,
            forms: BTreeMap::new(),
            panels: Endpoint::iter().map(|e| (e, HarnessPanel::new(e))).collect(),
            cancel: CancelToken::new(),
        };

        utils::send_future(ctx, &model.cancel, async { Msg::ConfigLoaded(api::load_config().await) });

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // Startup
            Msg::ConfigLoaded(config) => handlers::handle_config_loaded(self, ctx, config),
            Msg::ServiceReady(state) => handlers::handle_service_ready(self, state),

            // Navigation
            Msg::SelectTab(tab) => {
                let changed = self.tab != tab;
                self.tab = tab;
                changed
            }

            // Prediction forms
            Msg::FieldChanged(endpoint, key, raw) => handlers::handle_field_changed(self, endpoint, &key, &raw),
            Msg::Submit(endpoint) => handlers::handle_submit(self, ctx, endpoint),
            Msg::PredictionDone(endpoint, result) => handlers::handle_prediction_done(self, endpoint, result),

            // Model tests
            Msg::SelectScenario(endpoint, index) => handlers::handle_select_scenario(self, endpoint, index),
            Msg::RunScenario(endpoint, index) => handlers::handle_run_scenario(self, ctx, endpoint, index),
            Msg::ScenarioDone(endpoint, result) => handlers::handle_scenario_done(self, endpoint, result),
            Msg::RunAll(endpoint) => handlers::handle_run_all(self, ctx, endpoint),
            Msg::RunRandom(endpoint) => handlers::handle_run_random(self, ctx, endpoint),
            Msg::Progress(endpoint, progress) => handlers::handle_progress(self, endpoint, progress),
            Msg::BatchDone(endpoint, result) => handlers::handle_batch_done(self, endpoint, result),
            Msg::ClearResults(endpoint) => handlers::handle_clear_results(self, endpoint),
            Msg::ExportCsv(endpoint) => handlers::handle_export_csv(self, endpoint),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { header::render_header(self, ctx) }
                { header::render_service_banner(self) }

                <main class="main-content">
                {
                    match self.tab {
                        Tab::Dashboard => forms::render_dashboard(self, ctx),
                        Tab::ModelTests => harness::render_model_tests(self, ctx),
                    }
                }
                </main>

                <footer class="app-footer">
                    <p>{"Smart Parking Dashboard | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.cancel.cancel();
        if let Some(client) = &self.client {
            client.abort();
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Dashboard starting...");
    yew::Renderer::<Model>::new().render();
}
