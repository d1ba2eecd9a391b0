//! Media agent: chart specifications and summary tables

use async_trait::async_trait;
use forum_core::{
    AnalysisResult, ArtifactKind, Error, MarketDataset, MediaArtifact, MediaStage, PricePoint,
    Result, Table, TickerData,
};
use serde_json::{Value, json};
use ta::Next;
use ta::indicators::SimpleMovingAverage;

/// Period of the moving average overlaid on price charts
pub const SMA_PERIOD: usize = 5;

pub const SUMMARY_TABLE_ID: &str = "table:summary";
pub const INDEXES_TABLE_ID: &str = "table:indexes";
pub const COMPARISON_CHART_ID: &str = "chart:comparison";

/// Chart id for one ticker's price chart
pub fn price_chart_id(ticker: &str) -> String {
    format!("chart:{ticker}:price")
}

/// Rounds to two decimals for display values
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derives charts and tables from a dataset without any I/O
#[derive(Debug, Clone, Default)]
pub struct MediaAgent {}

impl MediaAgent {
    pub fn new() -> Self {
        Self {}
    }

    fn line_chart(entry: &TickerData, points: &[&PricePoint]) -> Result<MediaArtifact> {
        let timestamps: Vec<String> = points.iter().map(|p| p.timestamp.to_rfc3339()).collect();
        let closes: Vec<f64> = points.iter().map(|p| p.price).collect();

        let mut series = vec![json!({ "name": "close", "values": closes })];

        if closes.len() >= SMA_PERIOD {
            let mut sma = SimpleMovingAverage::new(SMA_PERIOD)
                .map_err(|e| Error::InsufficientData(e.to_string()))?;
            let values: Vec<Value> = closes
                .iter()
                .enumerate()
                .map(|(i, &close)| {
                    let value = sma.next(close);
                    if i + 1 >= SMA_PERIOD {
                        json!(round2(value))
                    } else {
                        Value::Null
                    }
                })
                .collect();
            series.push(json!({ "name": format!("sma_{SMA_PERIOD}"), "values": values }));
        }

        Ok(MediaArtifact {
            id: price_chart_id(entry.ticker.as_str()),
            kind: ArtifactKind::LineChart,
            spec: json!({
                "title": format!("{} price", entry.ticker),
                "ticker": entry.ticker,
                "x": timestamps,
                "series": series,
                "y_label": "price",
            }),
        })
    }

    /// Every series rebased to 100 at its first usable point
    fn comparison_chart(usable: &[(&TickerData, Vec<&PricePoint>)]) -> MediaArtifact {
        let series: Vec<Value> = usable
            .iter()
            .map(|(entry, points)| {
                let base = points.first().map_or(1.0, |p| p.price);
                let values: Vec<Value> = points
                    .iter()
                    .map(|p| {
                        json!({
                            "timestamp": p.timestamp.to_rfc3339(),
                            "value": round2(p.price / base * 100.0),
                        })
                    })
                    .collect();
                json!({ "name": entry.ticker, "values": values })
            })
            .collect();

        MediaArtifact {
            id: COMPARISON_CHART_ID.to_string(),
            kind: ArtifactKind::ComparisonChart,
            spec: json!({
                "title": "Relative performance",
                "series": series,
                "y_label": "indexed to 100",
            }),
        }
    }

    fn summary_table(usable: &[(&TickerData, Vec<&PricePoint>)]) -> Table {
        let rows = usable
            .iter()
            .filter_map(|(entry, points)| {
                let first = points.first()?.price;
                let last = points.last()?.price;
                let high = points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
                let low = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
                Some(vec![
                    json!(entry.ticker),
                    json!(round2(first)),
                    json!(round2(last)),
                    json!(round2((last - first) / first * 100.0)),
                    json!(round2(high)),
                    json!(round2(low)),
                    json!(points.len()),
                ])
            })
            .collect();

        Table {
            id: SUMMARY_TABLE_ID.to_string(),
            title: "Price summary".to_string(),
            columns: ["ticker", "first", "last", "change_pct", "high", "low", "points"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            rows,
        }
    }

    fn indexes_table(dataset: &MarketDataset) -> Table {
        Table {
            id: INDEXES_TABLE_ID.to_string(),
            title: "Market indexes".to_string(),
            columns: vec!["index".to_string(), "value".to_string()],
            rows: dataset
                .indexes
                .iter()
                .filter(|(_, value)| value.is_finite())
                .map(|(name, value)| vec![json!(name), json!(round2(*value))])
                .collect(),
        }
    }
}

#[async_trait]
impl MediaStage for MediaAgent {
    async fn derive(&self, dataset: &MarketDataset) -> Result<AnalysisResult> {
        let usable: Vec<(&TickerData, Vec<&PricePoint>)> = dataset
            .entries
            .iter()
            .map(|entry| (entry, entry.usable_points().collect::<Vec<_>>()))
            .filter(|(_, points)| !points.is_empty())
            .collect();
        let has_indexes = dataset.indexes.values().any(|v| v.is_finite());

        if usable.is_empty() && !has_indexes {
            return Err(Error::InsufficientData(format!(
                "no usable price points among {} series",
                dataset.entries.len()
            )));
        }

        let mut result = AnalysisResult::default();

        for (entry, points) in &usable {
            result.media_artifacts.push(Self::line_chart(entry, points)?);
        }
        if usable.len() >= 2 {
            result.media_artifacts.push(Self::comparison_chart(&usable));
        }
        if !usable.is_empty() {
            result.tables.push(Self::summary_table(&usable));
        }
        if has_indexes {
            result.tables.push(Self::indexes_table(dataset));
        }

        tracing::debug!(
            artifacts = result.media_artifacts.len(),
            tables = result.tables.len(),
            "Media derived"
        );

        Ok(result)
    }

    fn name(&self) -> &str {
        "media-agent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use forum_core::Ticker;

    fn entry(ticker: &str, prices: &[f64]) -> TickerData {
        let start = Utc::now() - Duration::days(prices.len() as i64);
        TickerData {
            ticker: Ticker::new(ticker),
            points: prices
                .iter()
                .enumerate()
                .map(|(i, &p)| PricePoint::new(start + Duration::days(i as i64), p))
                .collect(),
            news: vec![],
        }
    }

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[tokio::test]
    async fn test_single_series() {
        let dataset = MarketDataset {
            entries: vec![entry("AAPL", &rising(30))],
            ..Default::default()
        };
        let result = MediaAgent::new().derive(&dataset).await.unwrap();

        let chart = result.artifact("chart:AAPL:price").unwrap();
        assert_eq!(chart.kind, ArtifactKind::LineChart);
        assert_eq!(chart.spec["series"][0]["values"].as_array().unwrap().len(), 30);
        assert_eq!(chart.spec["series"][1]["name"], "sma_5");
        assert!(chart.spec["series"][1]["values"][3].is_null());
        assert_eq!(chart.spec["series"][1]["values"][4], json!(102.0));

        assert!(result.artifact(COMPARISON_CHART_ID).is_none());
        let summary = result.table(SUMMARY_TABLE_ID).unwrap();
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0][3], json!(29.0));
    }

    #[tokio::test]
    async fn test_short_series_has_no_overlay() {
        let dataset = MarketDataset {
            entries: vec![entry("AAPL", &rising(3))],
            ..Default::default()
        };
        let result = MediaAgent::new().derive(&dataset).await.unwrap();
        let chart = result.artifact("chart:AAPL:price").unwrap();
        assert_eq!(chart.spec["series"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_comparison_chart() {
        let dataset = MarketDataset {
            entries: vec![entry("AAPL", &rising(10)), entry("MSFT", &[50.0, 55.0])],
            ..Default::default()
        };
        let result = MediaAgent::new().derive(&dataset).await.unwrap();

        let comparison = result.artifact(COMPARISON_CHART_ID).unwrap();
        assert_eq!(comparison.kind, ArtifactKind::ComparisonChart);
        assert_eq!(comparison.spec["series"][1]["values"][1]["value"], json!(110.0));
        assert_eq!(result.table(SUMMARY_TABLE_ID).unwrap().rows.len(), 2);
    }

    #[tokio::test]
    async fn test_unusable_points_skipped() {
        let dataset = MarketDataset {
            entries: vec![
                entry("AAPL", &[100.0, f64::NAN, 102.0]),
                entry("BAD", &[0.0, -1.0]),
            ],
            ..Default::default()
        };
        let result = MediaAgent::new().derive(&dataset).await.unwrap();

        assert!(result.artifact("chart:BAD:price").is_none());
        let chart = result.artifact("chart:AAPL:price").unwrap();
        assert_eq!(chart.spec["x"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_no_usable_points() {
        let dataset = MarketDataset {
            entries: vec![entry("AAPL", &[f64::NAN, 0.0])],
            ..Default::default()
        };
        let err = MediaAgent::new().derive(&dataset).await.unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }

    #[tokio::test]
    async fn test_indexes_only() {
        let mut dataset = MarketDataset::default();
        dataset.indexes.insert("Nasdaq".to_string(), 16_300.0);

        let result = MediaAgent::new().derive(&dataset).await.unwrap();
        assert!(result.media_artifacts.is_empty());
        assert_eq!(result.table(INDEXES_TABLE_ID).unwrap().rows.len(), 1);
    }
}
