//! Report agent: renders an HTML report from caller-supplied fields

use chrono::{DateTime, Utc};
use forum_core::{
    AnalysisResult, Error, Insight, QueryData, Report, ReportRequest, ReportSource, ReportStage,
    Result, RiskTolerance, StageKind, UserProfile,
};
use minijinja::Environment;
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

const TEMPLATE_NAME: &str = "report.html";
const TEMPLATE: &str = include_str!("../../templates/report.html");

#[derive(Serialize)]
struct QueryView<'a> {
    raw_text: &'a str,
    intent: &'static str,
    window: String,
    tickers: Vec<&'a str>,
}

#[derive(Serialize)]
struct NewsView<'a> {
    headline: &'a str,
    source: &'a str,
    date: String,
}

#[derive(Serialize)]
struct TickerView<'a> {
    ticker: &'a str,
    points: usize,
    last: Option<f64>,
    news: Vec<NewsView<'a>>,
}

#[derive(Serialize)]
struct ChartView<'a> {
    id: &'a str,
    kind: Value,
    title: String,
}

#[derive(Serialize)]
struct TableView<'a> {
    id: &'a str,
    title: &'a str,
    columns: &'a [String],
    rows: Vec<Vec<String>>,
}

#[derive(Serialize)]
struct InsightView<'a> {
    category: &'static str,
    statement: &'a str,
    confidence: u32,
    evidence: Vec<&'a str>,
}

#[derive(Serialize)]
struct ProfileView<'a> {
    id: &'a str,
    risk_tolerance: &'static str,
    note: &'static str,
}

#[derive(Serialize)]
struct ReportView<'a> {
    query: QueryView<'a>,
    tickers: Vec<TickerView<'a>>,
    market_news: Vec<NewsView<'a>>,
    charts: Vec<ChartView<'a>>,
    tables: Vec<TableView<'a>>,
    insights: Vec<InsightView<'a>>,
    profile: Option<ProfileView<'a>>,
    gaps: Vec<String>,
    fingerprint: &'a str,
}

fn news_view(item: &forum_core::NewsItem) -> NewsView<'_> {
    NewsView {
        headline: &item.headline,
        source: &item.source,
        date: item.timestamp.format("%Y-%m-%d").to_string(),
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn profile_note(risk: RiskTolerance) -> &'static str {
    match risk {
        RiskTolerance::Conservative => {
            "Capital preservation comes first; read the risk findings before the trend."
        }
        RiskTolerance::Moderate => "Upside and volatility are weighed evenly.",
        RiskTolerance::Aggressive => {
            "Higher volatility is acceptable; momentum findings deserve attention."
        }
    }
}

/// Report identifier: UTC timestamp plus a random suffix
pub fn report_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("report_{}_{}", now.format("%Y%m%d_%H%M%S"), &suffix[..8])
}

/// Content hash over the three composed inputs
pub fn fingerprint(
    query_data: &QueryData,
    analysis_results: &AnalysisResult,
    insights: &[Insight],
) -> Result<String> {
    let canonical = serde_json::to_vec(&json!({
        "query_data": query_data,
        "analysis_results": analysis_results,
        "insights": insights,
    }))?;
    Ok(blake3::hash(&canonical).to_hex().to_string())
}

/// Composes HTML reports with a MiniJinja template
pub struct ReportAgent {
    env: Environment<'static>,
}

impl std::fmt::Debug for ReportAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportAgent")
            .field("template", &TEMPLATE_NAME)
            .finish()
    }
}

impl ReportAgent {
    /// Create the agent with the bundled report template
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        // The .html name turns on HTML auto-escaping
        env.add_template(TEMPLATE_NAME, TEMPLATE)
            .map_err(|e| Self::render_error(&e))?;
        Ok(Self { env })
    }

    fn render_error(e: &minijinja::Error) -> Error {
        Error::Derivation {
            stage: StageKind::Report,
            reason: e.to_string(),
        }
    }

    /// Compose from a parsed [`ReportRequest`]
    pub fn compose_request(&self, request: &ReportRequest) -> Result<Report> {
        self.compose(
            request.query_data.as_ref(),
            request.analysis_results.as_ref(),
            request.insights.as_deref(),
            request.user_profile.as_ref(),
        )
    }

    /// Caller-supplied insights bypass `Insight::new`, so re-check them here
    fn validate_insights(
        query_data: &QueryData,
        analysis_results: &AnalysisResult,
        insights: &[Insight],
    ) -> Result<()> {
        for (index, insight) in insights.iter().enumerate() {
            if !(0.0..=1.0).contains(&insight.confidence) {
                return Err(Error::InvalidInput(format!(
                    "insight {index} has confidence {} outside 0..=1",
                    insight.confidence
                )));
            }
            if let Some(evidence) = insight
                .supporting_evidence
                .iter()
                .find(|e| !e.resolves_in(&query_data.dataset, Some(analysis_results)))
            {
                return Err(Error::InvalidInput(format!(
                    "insight {index} cites unknown {:?} '{}'",
                    evidence.kind, evidence.id
                )));
            }
        }
        Ok(())
    }

    fn render(
        &self,
        query_data: &QueryData,
        analysis_results: &AnalysisResult,
        insights: &[Insight],
        profile: Option<&UserProfile>,
        fingerprint: &str,
    ) -> Result<String> {
        let query = &query_data.query;
        let dataset = &query_data.dataset;

        let view = ReportView {
            query: QueryView {
                raw_text: query.raw_text(),
                intent: query.intent_tag().as_str(),
                window: query.time_range().label(),
                tickers: query.resolved_entities().iter().map(|t| t.as_str()).collect(),
            },
            tickers: dataset
                .entries
                .iter()
                .map(|entry| TickerView {
                    ticker: entry.ticker.as_str(),
                    points: entry.points.len(),
                    last: entry.usable_points().last().map(|p| p.price),
                    news: entry.news.iter().map(news_view).collect(),
                })
                .collect(),
            market_news: dataset.market_news.iter().map(news_view).collect(),
            charts: analysis_results
                .media_artifacts
                .iter()
                .map(|artifact| ChartView {
                    id: &artifact.id,
                    kind: serde_json::to_value(artifact.kind).unwrap_or(Value::Null),
                    title: artifact
                        .spec
                        .get("title")
                        .and_then(Value::as_str)
                        .unwrap_or(&artifact.id)
                        .to_string(),
                })
                .collect(),
            tables: analysis_results
                .tables
                .iter()
                .map(|table| TableView {
                    id: &table.id,
                    title: &table.title,
                    columns: &table.columns,
                    rows: table
                        .rows
                        .iter()
                        .map(|row| row.iter().map(cell).collect())
                        .collect(),
                })
                .collect(),
            insights: insights
                .iter()
                .map(|insight| InsightView {
                    category: insight.category.as_str(),
                    statement: &insight.statement,
                    confidence: (insight.confidence * 100.0).round() as u32,
                    evidence: insight
                        .supporting_evidence
                        .iter()
                        .map(|e| e.id.as_str())
                        .collect(),
                })
                .collect(),
            profile: profile.map(|p| ProfileView {
                id: &p.id,
                risk_tolerance: p.risk_tolerance.as_str(),
                note: profile_note(p.risk_tolerance),
            }),
            gaps: dataset.gaps.iter().map(forum_core::DataGap::describe).collect(),
            fingerprint,
        };

        self.env
            .get_template(TEMPLATE_NAME)
            .and_then(|template| template.render(&view))
            .map_err(|e| Self::render_error(&e))
    }
}

impl ReportStage for ReportAgent {
    fn compose(
        &self,
        query_data: Option<&QueryData>,
        analysis_results: Option<&AnalysisResult>,
        insights: Option<&[Insight]>,
        profile: Option<&UserProfile>,
    ) -> Result<Report> {
        let (Some(query_data), Some(analysis_results), Some(insights)) =
            (query_data, analysis_results, insights)
        else {
            let missing = [
                ("query_data", query_data.is_none()),
                ("analysis_results", analysis_results.is_none()),
                ("insights", insights.is_none()),
            ]
            .into_iter()
            .filter(|(_, absent)| *absent)
            .map(|(name, _)| name.to_string())
            .collect();
            return Err(Error::IncompleteInput { missing });
        };

        Self::validate_insights(query_data, analysis_results, insights)?;

        let fingerprint = fingerprint(query_data, analysis_results, insights)?;
        let rendered_body =
            self.render(query_data, analysis_results, insights, profile, &fingerprint)?;

        let generated_at = Utc::now();
        let report = Report {
            id: report_id(generated_at),
            rendered_body,
            generated_at,
            source: ReportSource {
                raw_text: query_data.query.raw_text().to_string(),
                tickers: query_data.query.resolved_entities().to_vec(),
                fingerprint,
            },
        };

        tracing::debug!(report_id = %report.id, bytes = report.rendered_body.len(), "Report composed");

        Ok(report)
    }

    fn name(&self) -> &str {
        "report-agent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use forum_core::{
        EvidenceRef, InsightCategory, IntentTag, MarketDataset, NewsItem, PricePoint, Query,
        Ticker, TickerData, TimeRange,
    };

    fn query_data() -> QueryData {
        let ticker = Ticker::new("AAPL");
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap();
        QueryData {
            query: Query::new(
                "AAPL trend last 30 days",
                vec![ticker.clone()],
                TimeRange::explicit(30),
                IntentTag::Trend,
            ),
            dataset: MarketDataset {
                entries: vec![TickerData {
                    ticker,
                    points: (0..30)
                        .map(|i| {
                            PricePoint::new(start + chrono::Duration::days(i), 180.0 + i as f64)
                        })
                        .collect(),
                    news: vec![NewsItem {
                        id: "AAPL:news:0".to_string(),
                        headline: "Apple <b>beats</b> estimates".to_string(),
                        source: "wire".to_string(),
                        timestamp: start,
                    }],
                }],
                ..Default::default()
            },
        }
    }

    fn insights() -> Vec<Insight> {
        vec![
            Insight::new(InsightCategory::Trend, "AAPL rose 16.11%", 0.9)
                .with_subject(Ticker::new("AAPL"))
                .with_evidence(EvidenceRef::series(&Ticker::new("AAPL"))),
            Insight::new(InsightCategory::News, "1 recent headline", 0.4)
                .with_evidence(EvidenceRef::news("AAPL:news:0")),
        ]
    }

    #[test]
    fn test_compose_references_ticker() {
        let agent = ReportAgent::new().unwrap();
        let report = agent
            .compose(
                Some(&query_data()),
                Some(&AnalysisResult::default()),
                Some(&insights()),
                None,
            )
            .unwrap();

        assert!(report.rendered_body.contains("AAPL"));
        assert!(report.rendered_body.contains("AAPL rose 16.11%"));
        assert!(report.id.starts_with("report_"));
        assert_eq!(report.id.len(), "report_20240601_200000_".len() + 8);
        assert_eq!(report.source.tickers, vec![Ticker::new("AAPL")]);
        assert_eq!(report.source.fingerprint.len(), 64);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let agent = ReportAgent::new().unwrap();
        let compose = || {
            agent
                .compose(
                    Some(&query_data()),
                    Some(&AnalysisResult::default()),
                    Some(&insights()),
                    None,
                )
                .unwrap()
        };
        let first = compose();
        let second = compose();

        assert_eq!(first.rendered_body, second.rendered_body);
        assert_eq!(first.source, second.source);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_every_missing_combination() {
        let agent = ReportAgent::new().unwrap();
        let data = query_data();
        let analysis = AnalysisResult::default();
        let found = insights();

        for mask in 0u8..7 {
            let q = (mask & 1 != 0).then_some(&data);
            let a = (mask & 2 != 0).then_some(&analysis);
            let i = (mask & 4 != 0).then_some(found.as_slice());

            let err = agent.compose(q, a, i, None).unwrap_err();
            let Error::IncompleteInput { missing } = err else {
                panic!("expected IncompleteInput for mask {mask}");
            };
            assert_eq!(missing.contains(&"query_data".to_string()), q.is_none());
            assert_eq!(missing.contains(&"analysis_results".to_string()), a.is_none());
            assert_eq!(missing.contains(&"insights".to_string()), i.is_none());
        }
    }

    #[test]
    fn test_output_is_escaped() {
        let agent = ReportAgent::new().unwrap();
        let report = agent
            .compose(
                Some(&query_data()),
                Some(&AnalysisResult::default()),
                Some(&insights()),
                None,
            )
            .unwrap();
        assert!(report.rendered_body.contains("Apple &lt;b&gt;beats"));
        assert!(!report.rendered_body.contains("<b>beats"));
    }

    #[test]
    fn test_dangling_evidence_rejected() {
        let agent = ReportAgent::new().unwrap();
        let bad = vec![
            Insight::new(InsightCategory::Trend, "x", 0.5)
                .with_evidence(EvidenceRef::artifact("chart:AAPL:price")),
        ];
        let err = agent
            .compose(
                Some(&query_data()),
                Some(&AnalysisResult::default()),
                Some(&bad),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let agent = ReportAgent::new().unwrap();
        let mut request = ReportRequest::from_json(json!({
            "query_data": query_data(),
            "analysis_results": AnalysisResult::default(),
            "insights": [Insight::new(InsightCategory::Trend, "AAPL rose", 0.8)],
        }))
        .unwrap();
        assert!(agent.compose_request(&request).is_ok());

        for confidence in [7.5, -0.1, f64::NAN] {
            if let Some(insights) = request.insights.as_mut() {
                insights[0].confidence = confidence;
            }
            let err = agent.compose_request(&request).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "confidence {confidence} accepted");
        }
    }

    #[test]
    fn test_profile_notes() {
        let agent = ReportAgent::new().unwrap();
        let profile = UserProfile::new("alice").with_risk_tolerance(RiskTolerance::Conservative);
        let report = agent
            .compose(
                Some(&query_data()),
                Some(&AnalysisResult::default()),
                Some(&[][..]),
                Some(&profile),
            )
            .unwrap();

        assert!(report.rendered_body.contains("For alice"));
        assert!(report.rendered_body.contains("Capital preservation"));
        assert!(report.rendered_body.contains("No insights could be derived"));
    }

    #[test]
    fn test_compose_request() {
        let agent = ReportAgent::new().unwrap();
        let request = ReportRequest {
            query_data: Some(query_data()),
            analysis_results: None,
            insights: Some(insights()),
            user_profile: None,
        };
        let err = agent.compose_request(&request).unwrap_err();
        assert_eq!(err.to_string(), "Incomplete input: missing analysis_results");
    }
}
