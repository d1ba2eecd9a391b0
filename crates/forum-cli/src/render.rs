//! Terminal tables

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use forum_core::{AggregatedResult, NewsArticle, PricePoint, Report, Ticker};
use forum_engine::ForumEngine;
use forum_utils::AppConfig;
use serde_json::Value;
use std::collections::BTreeMap;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{f:.2}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

pub fn price_table(ticker: &Ticker, points: &[PricePoint]) -> Table {
    let mut table = table(vec!["Date", ticker.as_str()]);
    for point in points {
        table.add_row(vec![
            point.timestamp.format("%Y-%m-%d").to_string(),
            format!("{:.2}", point.price),
        ]);
    }
    table
}

pub fn news_table(articles: &[NewsArticle]) -> Table {
    let mut table = table(vec!["Published", "Source", "Headline"]);
    for article in articles {
        table.add_row(vec![
            article.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            article.source.clone(),
            article.headline.clone(),
        ]);
    }
    table
}

pub fn index_table(indexes: &BTreeMap<String, f64>) -> Table {
    let mut table = table(vec!["Index", "Value"]);
    for (name, value) in indexes {
        table.add_row(vec![name.clone(), format!("{value:.2}")]);
    }
    table
}

pub fn report_table(report: &Report) -> Table {
    let tickers: Vec<&str> = report.source.tickers.iter().map(Ticker::as_str).collect();
    let mut table = table(vec!["Field", "Value"]);
    table
        .add_row(vec!["id".to_string(), report.id.clone()])
        .add_row(vec!["generated_at".to_string(), report.generated_at.to_rfc3339()])
        .add_row(vec!["query".to_string(), report.source.raw_text.clone()])
        .add_row(vec!["tickers".to_string(), tickers.join(", ")])
        .add_row(vec!["fingerprint".to_string(), report.source.fingerprint.clone()]);
    table
}

pub fn status_table(engine: &ForumEngine, app: &AppConfig, offline: bool, live_news: bool) -> Table {
    let config = engine.config();
    let news = match (offline, live_news) {
        (true, _) => "sample",
        (false, true) => "finnhub",
        (false, false) => "sample (FINNHUB_API_KEY not set)",
    };
    let mut table = table(vec!["Setting", "Value"]);
    table
        .add_row(vec!["version", env!("CARGO_PKG_VERSION")])
        .add_row(vec!["environment", app.environment.as_str()])
        .add_row(vec!["prices", if offline { "sample" } else { "yahoo" }])
        .add_row(vec!["news", news]);
    table
        .add_row(vec!["stages".to_string(), engine.stage_names().join(" -> ")])
        .add_row(vec![
            "request budget".to_string(),
            format!("{} ms", config.request_timeout.as_millis()),
        ])
        .add_row(vec![
            "fetch / derive".to_string(),
            format!(
                "{} ms / {} ms",
                config.fetch_budget().as_millis(),
                config.derive_budget().as_millis()
            ),
        ])
        .add_row(vec![
            "execution".to_string(),
            format!("{:?}", config.execution).to_lowercase(),
        ])
        .add_row(vec!["reports".to_string(), app.reports_dir.display().to_string()])
        .add_row(vec!["profiles".to_string(), app.profiles_dir.display().to_string()]);
    table
}

/// Human-readable rendering of one pipeline result
pub fn print_result(result: &AggregatedResult) {
    let query = result.query();
    let tickers: Vec<&str> = query.resolved_entities().iter().map(Ticker::as_str).collect();
    println!(
        "Request {} | intent {} | {} | {}",
        result.request_id,
        query.intent_tag().as_str(),
        query.time_range().label(),
        if tickers.is_empty() { "market".to_string() } else { tickers.join(", ") }
    );

    for data in &result.analysis().tables {
        let header: Vec<&str> = data.columns.iter().map(String::as_str).collect();
        let mut rendered = table(header);
        for row in &data.rows {
            rendered.add_row(row.iter().map(cell).collect::<Vec<_>>());
        }
        println!("{}\n{rendered}", data.title);
    }

    if !result.analysis().media_artifacts.is_empty() {
        let ids: Vec<&str> = result
            .analysis()
            .media_artifacts
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        println!("Charts: {}", ids.join(", "));
    }

    let mut insights = table(vec!["Category", "Confidence", "Finding", "Evidence"]);
    for insight in &result.insights {
        let evidence: Vec<&str> = insight
            .supporting_evidence
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        insights.add_row(vec![
            insight.category.as_str().to_string(),
            format!("{:.0}%", insight.confidence * 100.0),
            insight.statement.clone(),
            evidence.join(", "),
        ]);
    }
    println!("Insights\n{insights}");

    if !result.partial_failures.is_empty() {
        let mut failures = table(vec!["Stage", "Reason"]);
        for failure in &result.partial_failures {
            failures.add_row(vec![failure.stage.as_str().to_string(), failure.reason.clone()]);
        }
        println!("Partial failures\n{failures}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_formatting() {
        assert_eq!(cell(&json!(null)), "-");
        assert_eq!(cell(&json!("AAPL")), "AAPL");
        assert_eq!(cell(&json!(12)), "12");
        assert_eq!(cell(&json!(1.23456)), "1.23");
    }

    #[test]
    fn test_index_table_lists_every_index() {
        let indexes = BTreeMap::from([("Nasdaq".to_string(), 16300.0), ("S&P 500".to_string(), 5200.5)]);
        let rendered = index_table(&indexes).to_string();
        assert!(rendered.contains("Nasdaq"));
        assert!(rendered.contains("5200.50"));
    }
}
