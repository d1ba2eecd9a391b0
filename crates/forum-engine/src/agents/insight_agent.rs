//! Insight agent: findings with confidence and evidence references

use async_trait::async_trait;
use forum_core::{
    AnalysisResult, EvidenceRef, Insight, InsightCategory, InsightStage, MarketDataset, NewsItem,
    Result, TickerData,
};
use ta::Next;
use ta::indicators::RelativeStrengthIndex;

use super::media_agent::{COMPARISON_CHART_ID, INDEXES_TABLE_ID, SUMMARY_TABLE_ID, price_chart_id};

pub const RSI_PERIOD: usize = 14;

const MIN_TREND_POINTS: usize = 2;
const MIN_RISK_POINTS: usize = 3;
const MIN_MOMENTUM_POINTS: usize = RSI_PERIOD + 1;
const MAX_NEWS_EVIDENCE: usize = 3;

/// Percent moves smaller than this are reported as flat
const FLAT_THRESHOLD_PCT: f64 = 1.0;

/// Confidence that grows with the sample size and saturates at `full`
fn sample_confidence(samples: usize, full: usize) -> f64 {
    let coverage = (samples as f64 / full as f64).min(1.0);
    0.35 + 0.55 * coverage
}

fn percent_change(first: f64, last: f64) -> f64 {
    (last - first) / first * 100.0
}

fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Derives findings from the dataset and, when present, the media output
#[derive(Debug, Clone, Default)]
pub struct InsightAgent {}

impl InsightAgent {
    pub fn new() -> Self {
        Self {}
    }

    /// Attach an analysis reference only when the analysis actually carries it
    fn cite(
        insight: Insight,
        analysis: Option<&AnalysisResult>,
        artifact: Option<&str>,
        table: Option<&str>,
    ) -> Insight {
        let Some(analysis) = analysis else {
            return insight;
        };
        let mut insight = insight;
        if let Some(id) = artifact.filter(|id| analysis.artifact(id).is_some()) {
            insight = insight.with_evidence(EvidenceRef::artifact(id));
        }
        if let Some(id) = table.filter(|id| analysis.table(id).is_some()) {
            insight = insight.with_evidence(EvidenceRef::table(id));
        }
        insight
    }

    fn trend(entry: &TickerData, prices: &[f64], analysis: Option<&AnalysisResult>) -> Option<Insight> {
        if prices.len() < MIN_TREND_POINTS {
            return None;
        }
        let first = *prices.first()?;
        let last = *prices.last()?;
        let change = percent_change(first, last);
        let direction = if change > FLAT_THRESHOLD_PCT {
            "rose"
        } else if change < -FLAT_THRESHOLD_PCT {
            "fell"
        } else {
            "traded flat"
        };

        let statement = format!(
            "{} {direction} {:.2}% across {} observations ({first:.2} to {last:.2})",
            entry.ticker,
            change.abs(),
            prices.len(),
        );
        let insight = Insight::new(
            InsightCategory::Trend,
            statement,
            sample_confidence(prices.len(), 30),
        )
        .with_subject(entry.ticker.clone())
        .with_evidence(EvidenceRef::series(&entry.ticker));

        let chart = price_chart_id(entry.ticker.as_str());
        Some(Self::cite(insight, analysis, Some(&chart), Some(SUMMARY_TABLE_ID)))
    }

    fn risk(entry: &TickerData, prices: &[f64]) -> Option<Insight> {
        if prices.len() < MIN_RISK_POINTS {
            return None;
        }
        let returns: Vec<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let daily = std_dev(&returns) * 100.0;
        if !daily.is_finite() {
            return None;
        }
        let annualised = daily * 252.0_f64.sqrt();
        let level = if daily < 1.5 {
            "low"
        } else if daily < 3.0 {
            "moderate"
        } else {
            "high"
        };

        let statement = format!(
            "{} shows {level} volatility: {daily:.2}% daily, about {annualised:.1}% annualised",
            entry.ticker
        );
        Some(
            Insight::new(
                InsightCategory::Risk,
                statement,
                sample_confidence(returns.len(), 60),
            )
            .with_subject(entry.ticker.clone())
            .with_evidence(EvidenceRef::series(&entry.ticker)),
        )
    }

    fn momentum(entry: &TickerData, prices: &[f64]) -> Option<Insight> {
        if prices.len() < MIN_MOMENTUM_POINTS {
            return None;
        }
        let mut rsi = RelativeStrengthIndex::new(RSI_PERIOD).ok()?;
        let value = prices.iter().fold(0.0, |_, &price| rsi.next(price));
        let reading = if value >= 70.0 {
            "overbought"
        } else if value <= 30.0 {
            "oversold"
        } else {
            "neutral"
        };

        let statement = format!(
            "{} {RSI_PERIOD}-period RSI is {value:.1}, a {reading} reading",
            entry.ticker
        );
        Some(
            Insight::new(
                InsightCategory::Momentum,
                statement,
                sample_confidence(prices.len() - RSI_PERIOD, 30),
            )
            .with_subject(entry.ticker.clone())
            .with_evidence(EvidenceRef::series(&entry.ticker)),
        )
    }

    fn news(subject: Option<&TickerData>, items: &[NewsItem]) -> Option<Insight> {
        let latest = items.iter().max_by_key(|n| n.timestamp)?;
        let about = subject.map_or_else(|| "the market".to_string(), |e| e.ticker.to_string());
        let statement = format!(
            "{} recent headline(s) about {about}; latest: \"{}\" ({})",
            items.len(),
            latest.headline,
            latest.source,
        );

        let mut insight = Insight::new(
            InsightCategory::News,
            statement,
            sample_confidence(items.len(), 5),
        );
        if let Some(entry) = subject {
            insight = insight.with_subject(entry.ticker.clone());
        }
        Some(
            items
                .iter()
                .take(MAX_NEWS_EVIDENCE)
                .fold(insight, |insight, item| {
                    insight.with_evidence(EvidenceRef::news(&item.id))
                }),
        )
    }

    fn comparison(
        usable: &[(&TickerData, Vec<f64>)],
        analysis: Option<&AnalysisResult>,
    ) -> Option<Insight> {
        let changes: Vec<(&TickerData, f64, usize)> = usable
            .iter()
            .filter(|(_, prices)| prices.len() >= MIN_TREND_POINTS)
            .filter_map(|(entry, prices)| {
                Some((
                    *entry,
                    percent_change(*prices.first()?, *prices.last()?),
                    prices.len(),
                ))
            })
            .collect();
        if changes.len() < 2 {
            return None;
        }

        let best = changes.iter().max_by(|a, b| a.1.total_cmp(&b.1))?;
        let worst = changes.iter().min_by(|a, b| a.1.total_cmp(&b.1))?;
        let samples = changes.iter().map(|c| c.2).min().unwrap_or_default();

        let statement = format!(
            "{} led with {:+.2}% while {} lagged at {:+.2}% over the same window",
            best.0.ticker, best.1, worst.0.ticker, worst.1
        );
        let insight = changes.iter().fold(
            Insight::new(
                InsightCategory::Comparison,
                statement,
                sample_confidence(samples, 30),
            ),
            |insight, (entry, _, _)| insight.with_evidence(EvidenceRef::series(&entry.ticker)),
        );
        Some(Self::cite(
            insight,
            analysis,
            Some(COMPARISON_CHART_ID),
            Some(SUMMARY_TABLE_ID),
        ))
    }

    fn market(dataset: &MarketDataset, analysis: Option<&AnalysisResult>) -> Option<Insight> {
        let levels: Vec<(&String, &f64)> = dataset
            .indexes
            .iter()
            .filter(|(_, value)| value.is_finite())
            .collect();
        if levels.is_empty() {
            return None;
        }

        let summary: Vec<String> = levels
            .iter()
            .map(|(name, value)| format!("{name} at {value:.2}"))
            .collect();
        let insight = levels.iter().fold(
            Insight::new(
                InsightCategory::Market,
                format!("Market backdrop: {}", summary.join(", ")),
                0.5,
            ),
            |insight, (name, _)| insight.with_evidence(EvidenceRef::index(name.as_str())),
        );
        Some(Self::cite(insight, analysis, None, Some(INDEXES_TABLE_ID)))
    }
}

#[async_trait]
impl InsightStage for InsightAgent {
    async fn derive(
        &self,
        dataset: &MarketDataset,
        analysis: Option<&AnalysisResult>,
    ) -> Result<Vec<Insight>> {
        let usable: Vec<(&TickerData, Vec<f64>)> = dataset
            .entries
            .iter()
            .map(|entry| (entry, entry.usable_prices()))
            .collect();

        let mut insights = Vec::new();
        for (entry, prices) in &usable {
            insights.extend(Self::trend(entry, prices, analysis));
            insights.extend(Self::risk(entry, prices));
            insights.extend(Self::momentum(entry, prices));
            insights.extend(Self::news(Some(*entry), &entry.news));
        }
        insights.extend(Self::news(None, &dataset.market_news));
        insights.extend(Self::comparison(&usable, analysis));
        insights.extend(Self::market(dataset, analysis));

        tracing::debug!(count = insights.len(), "Insights derived");

        Ok(insights)
    }

    fn name(&self) -> &str {
        "insight-agent"
    }
}
