use shared::display::{ClusterView, DurationView, OccupancyView, ResultView};
use shared::PredictionResponse;
use yew::prelude::*;

pub fn render_prediction(prediction: &PredictionResponse, scenario: Option<&str>) -> Html {
    let body = match ResultView::from(prediction) {
        ResultView::Duration(view) => render_duration(&view),
        ResultView::Occupancy(view) => render_occupancy(&view),
        ResultView::Cluster(view) => render_cluster(&view),
    };

    html! {
        <div class="results-container">
            if let Some(name) = scenario {
                <p class="result-scenario">{ name }</p>
            }
            { body }
        </div>
    }
}

fn render_duration(view: &DurationView) -> Html {
    let color = view.color();
    html! {
        <>
            <div class="result-header">
                <h2><i class="fa-solid fa-clock" style={format!("color: {}", color)}></i>{" Durée prévue"}</h2>
            </div>
            <div class="duration-value">
                <div class="duration-clock" style={format!("color: {}", color)}>{ view.clock() }</div>
                <div class="duration-decimal">{ view.decimal() }</div>
            </div>
            <div class="duration-scale">
                <div class="scale-gradient"></div>
                <div class="scale-marker"
                    style={format!("left: {:.1}%; background-color: {}", view.scale_position(), color)}></div>
                <div class="scale-labels">
                    <span>{"Courte (1h)"}</span>
                    <span>{"Moyenne (3h)"}</span>
                    <span>{"Longue (8h+)"}</span>
                </div>
            </div>
            <p class="interpretation">{ view.interpretation() }</p>
        </>
    }
}

fn render_occupancy(view: &OccupancyView) -> Html {
    html! {
        <>
            <div class={classes!("result-header", if view.occupied { "occupied" } else { "free" })}>
                <h2>
                    if view.occupied {
                        <i class="fa-solid fa-circle-xmark"></i>
                    } else {
                        <i class="fa-solid fa-circle-check"></i>
                    }
                    { format!(" {}", view.title()) }
                </h2>
                <div class="confidence-meter">
                    <div class="meter-label">{"Probabilité d'occupation :"}</div>
                    <div class="meter">
                        <div class="meter-fill" style={format!("width: {:.1}%", view.bar_percent())}></div>
                    </div>
                    <div class="meter-value">{ view.probability_text() }</div>
                </div>
            </div>
            <p class="interpretation">{ view.interpretation() }</p>
        </>
    }
}

fn render_cluster(view: &ClusterView) -> Html {
    let color = view.color();
    html! {
        <>
            <div class="result-header">
                <span class="cluster-chip" style={format!("background-color: {}", color)}>{ view.chip_label() }</span>
                <div class="confidence-meter">
                    <div class="meter-label">{"Confiance :"}</div>
                    <div class="meter">
                        <div class="meter-fill"
                            style={format!("width: {}%; background-color: {}", view.confidence_percent(), color)}></div>
                    </div>
                    <div class="meter-value">{ format!("{}%", view.confidence_percent()) }</div>
                </div>
            </div>
            if let Some(profile) = view.profile() {
                <>
                <p class="cluster-description">{ profile.description }</p>
                <div class="result-bars">
                    { for profile.characteristics.iter().map(|(label, value)| html! {
                        <div class="result-item">
                            <div class="result-label">{ *label }</div>
                            <div class="result-value">{ *value }</div>
                        </div>
                    }) }
                </div>
                </>
            }
        </>
    }
}
