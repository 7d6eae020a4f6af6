use shared::charts::{self, BarGroup, BarPoint, PieSlice, SampleRow, Series};
use shared::display::{format_probability, DurationView};
use shared::stats::AggregateStatistics;
use shared::{Endpoint, TestRecord};
use yew::prelude::*;

pub fn render_statistics(endpoint: Endpoint, stats: &AggregateStatistics, records: &[TestRecord]) -> Html {
    match endpoint {
        Endpoint::Occupancy => render_occupancy_stats(stats, records),
        Endpoint::Duration => render_duration_stats(stats),
        Endpoint::Cluster => render_cluster_stats(stats),
    }
}

fn stat_card(label: &str, value: String) -> Html {
    html! {
        <div class="stat-card">
            <div class="stat-value">{ value }</div>
            <div class="stat-label">{ label.to_string() }</div>
        </div>
    }
}

fn render_occupancy_stats(stats: &AggregateStatistics, records: &[TestRecord]) -> Html {
    let s = &stats.occupancy;
    if s.count == 0 {
        return html! {};
    }
    html! {
        <div class="statistics">
            <h3>{"Statistiques"}</h3>
            <div class="stat-cards">
                { stat_card("Tests", s.count.to_string()) }
                { stat_card("Occupées", s.predicted_occupied.to_string()) }
                { stat_card("Libres", s.predicted_free.to_string()) }
                { stat_card("Probabilité moyenne", format_probability(s.avg_probability)) }
                { stat_card("Min / Max", format!("{} / {}", format_probability(s.min_probability), format_probability(s.max_probability))) }
                { stat_card("Confiance moyenne", format_probability(s.avg_confidence)) }
                { stat_card("Prédictions confiantes", format_probability(s.confident_share)) }
            </div>
            <div class="charts">
                { render_pie("Répartition des prédictions", &charts::occupancy_split(s)) }
                { render_grouped_bars("Par jour de la semaine", &charts::occupancy_by_weekday(records), &charts::occupancy_series()) }
                { render_grouped_bars("Par heure d'arrivée", &charts::occupancy_by_hour(records), &charts::occupancy_series()) }
            </div>
            { render_samples(&charts::occupancy_sample_rows(s)) }
        </div>
    }
}

fn render_duration_stats(stats: &AggregateStatistics) -> Html {
    let s = &stats.duration;
    if s.count == 0 {
        return html! {};
    }
    html! {
        <div class="statistics">
            <h3>{"Statistiques"}</h3>
            <div class="stat-cards">
                { stat_card("Tests", s.count.to_string()) }
                { stat_card("Durée moyenne", DurationView::new(s.avg_duration).clock()) }
                { stat_card("Durée minimale", DurationView::new(s.min_duration).clock()) }
                { stat_card("Durée maximale", DurationView::new(s.max_duration).clock()) }
            </div>
            <div class="charts">
                { render_bars("Durées prédites", &charts::duration_bars(s)) }
            </div>
            { render_samples(&charts::duration_sample_rows(s)) }
        </div>
    }
}

fn render_cluster_stats(stats: &AggregateStatistics) -> Html {
    let s = &stats.cluster;
    if s.count == 0 {
        return html! {};
    }
    html! {
        <div class="statistics">
            <h3>{"Statistiques"}</h3>
            <div class="stat-cards">
                { stat_card("Tests", s.count.to_string()) }
                { stat_card("Confiance moyenne", format_probability(s.avg_confidence)) }
            </div>
            <div class="charts">
                { render_pie("Distribution des clusters", &charts::cluster_distribution(s)) }
                { render_grouped_bars(
                    "Analyse des caractéristiques par cluster",
                    &charts::cluster_feature_means(s),
                    &charts::cluster_series(),
                ) }
            </div>
        </div>
    }
}

fn render_pie(title: &str, slices: &[PieSlice]) -> Html {
    let mut start = 0.0;
    let stops: Vec<String> = (0..slices.len())
        .map(|i| {
            let end = start + charts::share(slices, i) * 100.0;
            let stop = format!("{} {:.2}% {:.2}%", slices[i].color, start, end);
            start = end;
            stop
        })
        .collect();
    let background = if start > 0.0 {
        format!("background: conic-gradient({})", stops.join(", "))
    } else {
        "background: #e0e0e0".to_string()
    };

    html! {
        <figure class="chart pie-chart">
            <figcaption>{ title.to_string() }</figcaption>
            <div class="pie" style={background}></div>
            <ul class="legend">
                { for slices.iter().enumerate().map(|(i, slice)| html! {
                    <li>
                        <span class="swatch" style={format!("background-color: {}", slice.color)}></span>
                        { format!("{} : {} ({})", slice.label, slice.value, format_probability(charts::share(slices, i))) }
                    </li>
                }) }
            </ul>
        </figure>
    }
}

fn render_bars(title: &str, points: &[BarPoint]) -> Html {
    let max = points.iter().map(|p| p.value).fold(0.0, f64::max);
    html! {
        <figure class="chart bar-chart">
            <figcaption>{ title.to_string() }</figcaption>
            <div class="bars">
                { for points.iter().map(|p| {
                    let height = if max > 0.0 { p.value / max * 100.0 } else { 0.0 };
                    html! {
                        <div class="bar-column" title={format!("{} : {:.2}", p.label, p.value)}>
                            <div class="bar" style={format!("height: {:.1}%; background-color: {}", height, p.color)}></div>
                            <span class="bar-label">{ p.label.clone() }</span>
                        </div>
                    }
                }) }
            </div>
        </figure>
    }
}

fn render_grouped_bars(title: &str, groups: &[BarGroup], series: &[Series]) -> Html {
    if groups.is_empty() {
        return html! {};
    }
    let max = groups
        .iter()
        .flat_map(|g| g.values.iter().copied())
        .fold(0.0, f64::max);
    html! {
        <figure class="chart grouped-bar-chart">
            <figcaption>{ title.to_string() }</figcaption>
            <div class="bars">
                { for groups.iter().map(|group| html! {
                    <div class="bar-group">
                        <div class="bar-set">
                            { for group.values.iter().zip(series).map(|(value, s)| {
                                let height = if max > 0.0 { value / max * 100.0 } else { 0.0 };
                                html! {
                                    <div class="bar" title={format!("{} : {:.2}", s.label, value)}
                                        style={format!("height: {:.1}%; background-color: {}", height, s.color)}></div>
                                }
                            }) }
                        </div>
                        <span class="bar-label">{ group.label.clone() }</span>
                    </div>
                }) }
            </div>
            <ul class="legend">
                { for series.iter().map(|s| html! {
                    <li>
                        <span class="swatch" style={format!("background-color: {}", s.color)}></span>
                        { s.label.clone() }
                    </li>
                }) }
            </ul>
        </figure>
    }
}

fn render_samples(rows: &[SampleRow]) -> Html {
    if rows.is_empty() {
        return html! {};
    }
    html! {
        <table class="samples">
            <thead>
                <tr><th>{"Scénario"}</th><th>{"Prédiction"}</th><th>{"Détail"}</th></tr>
            </thead>
            <tbody>
                { for rows.iter().map(|row| html! {
                    <tr>
                        <td>{ row.scenario.clone() }</td>
                        <td>{ row.prediction.clone() }</td>
                        <td>{ row.detail.clone() }</td>
                    </tr>
                }) }
            </tbody>
        </table>
    }
}
