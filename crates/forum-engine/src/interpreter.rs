//! Keyword interpreter turning raw text into a structured query
//!
//! Rule-based and deterministic: intent comes from keyword tables, entities
//! from ticker-shaped tokens and company-name aliases, the time range from
//! `N day/week/month/year` phrases in English or Chinese.

use forum_core::{Error, IntentTag, Query, QueryInterpreter, Result, Ticker, TimeRange, UserProfile};
use regex::Regex;
use std::sync::LazyLock;

use crate::config::ForumConfig;

/// Profile preference consulted when the text names no time range
pub const LOOKBACK_PREFERENCE: &str = "default_lookback_days";

const MAX_LOOKBACK_DAYS: u32 = 3650;

/// Keywords for intent classification (English)
mod keywords_en {
    pub const TREND: &[&str] = &[
        "trend",
        "performance",
        "perform",
        "moving average",
        "momentum",
        "direction",
        "outlook",
        "chart",
        "rally",
        "movement",
    ];

    pub const RISK: &[&str] = &[
        "risk",
        "volatility",
        "volatile",
        "drawdown",
        "downside",
        "safe",
        "beta",
    ];

    pub const COMPARISON: &[&str] = &["compare", "comparison", "versus", " vs ", " vs.", "better than"];

    pub const NEWS: &[&str] = &["news", "headline", "sentiment", "announcement", "event"];

    pub const PRICE: &[&str] = &["price", "quote", "how much", "trading at", "cost"];
}

/// Keywords for intent classification (Chinese)
mod keywords_zh {
    pub const TREND: &[&str] = &["趋势", "走势", "表现", "均线", "动量", "行情"];

    pub const RISK: &[&str] = &["风险", "波动", "回撤", "安全"];

    pub const COMPARISON: &[&str] = &["比较", "对比", "哪个好", "哪只"];

    pub const NEWS: &[&str] = &["新闻", "消息", "舆情", "公告", "情绪"];

    pub const PRICE: &[&str] = &["价格", "股价", "报价", "多少钱", "现价"];
}

/// Upper-case tokens that look like tickers but are not
///
/// Covers market jargon and the short English words that appear when a
/// query is typed in capitals; intent keywords are excluded separately.
const STOP_WORDS: &[&str] = &[
    "A", "I", "AN", "AND", "OR", "THE", "VS", "US", "USD", "ETF", "CEO", "CFO", "GDP", "CPI",
    "RSI", "MACD", "SMA", "EMA", "EPS", "PE", "IPO", "AI", "OK", "YTD", "Q", "FED", "WHAT",
    "IS", "ARE", "WAS", "FOR", "HOW", "WHY", "WHEN", "WHICH", "WHO", "DOING", "DO", "DOES",
    "DID", "THIS", "THAT", "THESE", "THOSE", "OF", "IN", "ON", "TO", "AT", "BY", "WITH",
    "ABOUT", "ME", "MY", "SHOW", "TELL", "GIVE", "IT", "ITS", "BE", "BEEN", "CAN", "WILL",
    "NOT", "ALL", "ANY", "FROM", "OUT", "UP", "DOWN", "OVER", "THAN", "NOW", "TODAY", "LAST",
    "PAST", "NEXT", "DAY", "DAYS", "WEEK", "WEEKS", "MONTH", "YEAR", "YEARS", "STOCK",
    "SHARE", "BUY", "SELL", "HOLD", "GOOD", "BAD", "BEST", "WORST", "SO", "IF", "AS", "VERY",
    "MUCH", "MANY", "MORE", "MOST", "LESS", "GOING", "LOOK", "LIKE", "SHALL", "MAY",
];

/// Company names resolved to their primary listing
const ALIASES: &[(&str, &str)] = &[
    ("apple", "AAPL"),
    ("苹果", "AAPL"),
    ("microsoft", "MSFT"),
    ("微软", "MSFT"),
    ("google", "GOOGL"),
    ("alphabet", "GOOGL"),
    ("谷歌", "GOOGL"),
    ("amazon", "AMZN"),
    ("亚马逊", "AMZN"),
    ("tesla", "TSLA"),
    ("特斯拉", "TSLA"),
    ("nvidia", "NVDA"),
    ("英伟达", "NVDA"),
    ("facebook", "META"),
    ("netflix", "NFLX"),
    ("奈飞", "NFLX"),
    ("alibaba", "BABA"),
    ("阿里巴巴", "BABA"),
];

static TICKER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z]{1,5}(?:\.[A-Z]{1,2})?").expect("ticker pattern is valid"));

static NUMERIC_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,4})\s*-?\s*(days?|weeks?|months?|quarters?|years?|天|日|周|星期|个月|月|季度|年)")
        .expect("numeric range pattern is valid")
});

static WORD_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:last|past|this|previous)\s+(week|month|quarter|year)\b")
        .expect("word range pattern is valid")
});

const CHINESE_RANGES: &[(&str, u32)] = &[
    ("一周", 7),
    ("一个月", 30),
    ("一季度", 90),
    ("半年", 180),
    ("一年", 365),
];

/// Rule-based query interpreter
#[derive(Debug, Clone)]
pub struct KeywordInterpreter {
    default_lookback_days: u32,
    max_entities: usize,
}

impl Default for KeywordInterpreter {
    fn default() -> Self {
        Self::from_config(&ForumConfig::default())
    }
}

impl KeywordInterpreter {
    /// Create an interpreter with default limits
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ForumConfig) -> Self {
        Self {
            default_lookback_days: config.default_lookback_days,
            max_entities: config.max_entities,
        }
    }

    /// Classify the intent of a query given how many entities it names
    pub fn classify(&self, text: &str, entity_count: usize) -> IntentTag {
        let lower = format!(" {} ", text.to_lowercase());

        if Self::matches_any(&lower, keywords_en::COMPARISON)
            || Self::matches_any(&lower, keywords_zh::COMPARISON)
        {
            return IntentTag::Comparison;
        }
        if Self::matches_any(&lower, keywords_en::RISK) || Self::matches_any(&lower, keywords_zh::RISK)
        {
            return IntentTag::Risk;
        }
        if Self::matches_any(&lower, keywords_en::TREND)
            || Self::matches_any(&lower, keywords_zh::TREND)
        {
            return IntentTag::Trend;
        }
        if Self::matches_any(&lower, keywords_en::NEWS) || Self::matches_any(&lower, keywords_zh::NEWS)
        {
            return IntentTag::News;
        }
        if Self::matches_any(&lower, keywords_en::PRICE)
            || Self::matches_any(&lower, keywords_zh::PRICE)
        {
            return IntentTag::Price;
        }
        if entity_count >= 2 {
            return IntentTag::Comparison;
        }
        IntentTag::General
    }

    /// Check if text contains any of the keywords
    fn matches_any(text: &str, keywords: &[&str]) -> bool {
        keywords.iter().any(|kw| text.contains(kw))
    }

    fn is_stop_word(token: &str) -> bool {
        if STOP_WORDS.contains(&token) {
            return true;
        }
        let lower = token.to_lowercase();
        [
            keywords_en::TREND,
            keywords_en::RISK,
            keywords_en::COMPARISON,
            keywords_en::NEWS,
            keywords_en::PRICE,
        ]
        .iter()
        .any(|table| table.iter().any(|kw| kw.trim() == lower))
    }

    /// Extract entities in order of first appearance
    pub fn extract_entities(&self, text: &str) -> Vec<Ticker> {
        let mut found: Vec<(usize, Ticker)> = Vec::new();

        for m in TICKER_TOKEN.find_iter(text) {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            // `S&P`, `AT&T`: pieces joined by `&` are names, not separate symbols
            let joined = |c: char| c.is_ascii_alphanumeric() || c == '&';
            let isolated = !before.is_some_and(joined) && !after.is_some_and(joined);
            if isolated && !Self::is_stop_word(m.as_str()) {
                found.push((m.start(), Ticker::new(m.as_str())));
            }
        }

        let lower = text.to_lowercase();
        for (alias, symbol) in ALIASES {
            if let Some(pos) = lower.find(alias) {
                found.push((pos, Ticker::new(symbol)));
            }
        }

        found.sort_by_key(|(pos, _)| *pos);

        let mut entities: Vec<Ticker> = Vec::new();
        for (_, ticker) in found {
            if !entities.contains(&ticker) {
                entities.push(ticker);
            }
        }
        entities.truncate(self.max_entities);
        entities
    }

    /// Extract an explicit lookback in days, if the text states one
    pub fn extract_lookback(&self, text: &str) -> Option<u32> {
        if let Some(caps) = NUMERIC_RANGE.captures(text) {
            let amount: u32 = caps[1].parse().ok()?;
            let days = amount.saturating_mul(Self::unit_days(&caps[2]));
            return (days > 0).then(|| days.min(MAX_LOOKBACK_DAYS));
        }

        if let Some(caps) = WORD_RANGE.captures(text) {
            return Some(Self::unit_days(&caps[1]));
        }

        CHINESE_RANGES
            .iter()
            .find(|(phrase, _)| text.contains(phrase))
            .map(|(_, days)| *days)
    }

    fn unit_days(unit: &str) -> u32 {
        let unit = unit.to_lowercase();
        if unit.starts_with("week") || unit == "周" || unit == "星期" {
            7
        } else if unit.starts_with("month") || unit == "个月" || unit == "月" {
            30
        } else if unit.starts_with("quarter") || unit == "季度" {
            90
        } else if unit.starts_with("year") || unit == "年" {
            365
        } else {
            1
        }
    }
}

impl QueryInterpreter for KeywordInterpreter {
    fn interpret(&self, raw_text: &str, profile: Option<&UserProfile>) -> Result<Query> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(Error::MalformedQuery("query text is empty".to_string()));
        }
        if !text.chars().any(char::is_alphanumeric) {
            return Err(Error::MalformedQuery(format!(
                "nothing to interpret in {raw_text:?}"
            )));
        }

        let entities = self.extract_entities(text);
        let time_range = match self.extract_lookback(text) {
            Some(days) => TimeRange::explicit(days),
            None => {
                let days = profile
                    .and_then(|p| p.preference_u32(LOOKBACK_PREFERENCE))
                    .filter(|d| *d > 0)
                    .map_or(self.default_lookback_days, |d| d.min(MAX_LOOKBACK_DAYS));
                TimeRange::implied(days)
            }
        };
        let intent = self.classify(text, entities.len());

        tracing::debug!(
            intent = intent.as_str(),
            entities = ?entities,
            lookback_days = time_range.lookback_days,
            "Interpreted query"
        );

        Ok(Query::new(raw_text, entities, time_range, intent))
    }

    fn name(&self) -> &str {
        "keyword-interpreter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trend_query() {
        let interpreter = KeywordInterpreter::new();
        let query = interpreter.interpret("AAPL trend last 30 days", None).unwrap();

        assert_eq!(query.raw_text(), "AAPL trend last 30 days");
        assert_eq!(query.resolved_entities(), &[Ticker::new("AAPL")]);
        assert_eq!(query.time_range(), TimeRange::explicit(30));
        assert_eq!(query.intent_tag(), IntentTag::Trend);
    }

    #[test]
    fn test_empty_and_unparseable_are_malformed() {
        let interpreter = KeywordInterpreter::new();
        for text in ["", "   ", "?!", "..."] {
            let err = interpreter.interpret(text, None).unwrap_err();
            assert!(matches!(err, Error::MalformedQuery(_)), "{text:?}");
        }
    }

    #[test]
    fn test_no_subject_degrades_gracefully() {
        let interpreter = KeywordInterpreter::new();
        let query = interpreter.interpret("how is the market doing", None).unwrap();

        assert!(query.has_no_subject());
        assert_eq!(query.intent_tag(), IntentTag::General);
        assert_eq!(query.time_range(), TimeRange::implied(30));
    }

    #[test]
    fn test_entities_keep_order_and_dedupe() {
        let interpreter = KeywordInterpreter::new();
        let entities = interpreter.extract_entities("MSFT or apple? Compare MSFT with AAPL");
        assert_eq!(entities, vec![Ticker::new("MSFT"), Ticker::new("AAPL")]);
    }

    #[test]
    fn test_chinese_query() {
        let interpreter = KeywordInterpreter::new();
        let query = interpreter.interpret("特斯拉最近3个月的走势", None).unwrap();

        assert_eq!(query.resolved_entities(), &[Ticker::new("TSLA")]);
        assert_eq!(query.time_range().lookback_days, 90);
        assert_eq!(query.intent_tag(), IntentTag::Trend);
    }

    #[test]
    fn test_ticker_adjacent_to_cjk() {
        let interpreter = KeywordInterpreter::new();
        assert_eq!(interpreter.extract_entities("AAPL股价多少"), vec![Ticker::new("AAPL")]);
        assert_eq!(interpreter.classify("AAPL股价多少", 1), IntentTag::Price);
    }

    #[test]
    fn test_stop_words_ignored() {
        let interpreter = KeywordInterpreter::new();
        let entities = interpreter.extract_entities("I think the RSI of NVDA and the CPI matter");
        assert_eq!(entities, vec![Ticker::new("NVDA")]);
    }

    #[test]
    fn test_ampersand_names_are_not_tickers() {
        let interpreter = KeywordInterpreter::new();
        let query = interpreter.interpret("how is the S&P 500 doing", None).unwrap();
        assert!(query.has_no_subject());
        assert_eq!(query.intent_tag(), IntentTag::General);

        assert_eq!(interpreter.extract_entities("AT&T vs VZ"), vec![Ticker::new("VZ")]);
    }

    #[test]
    fn test_upper_case_query() {
        let interpreter = KeywordInterpreter::new();
        let query = interpreter.interpret("WHAT IS THE TREND FOR AAPL", None).unwrap();
        assert_eq!(query.resolved_entities(), &[Ticker::new("AAPL")]);
        assert_eq!(query.intent_tag(), IntentTag::Trend);

        let config = ForumConfig {
            max_entities: 2,
            ..Default::default()
        };
        let interpreter = KeywordInterpreter::from_config(&config);
        let entities = interpreter.extract_entities("HOW IS TSLA DOING THIS WEEK VS NVDA");
        assert_eq!(entities, vec![Ticker::new("TSLA"), Ticker::new("NVDA")]);
    }

    #[test]
    fn test_entity_limit() {
        let config = ForumConfig {
            max_entities: 2,
            ..Default::default()
        };
        let interpreter = KeywordInterpreter::from_config(&config);
        let entities = interpreter.extract_entities("AAPL MSFT GOOGL AMZN");
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_two_entities_imply_comparison() {
        let interpreter = KeywordInterpreter::new();
        let query = interpreter.interpret("AAPL MSFT", None).unwrap();
        assert_eq!(query.intent_tag(), IntentTag::Comparison);

        let query = interpreter.interpret("risk of AAPL and MSFT", None).unwrap();
        assert_eq!(query.intent_tag(), IntentTag::Risk);
    }

    #[test]
    fn test_lookback_phrases() {
        let interpreter = KeywordInterpreter::new();
        assert_eq!(interpreter.extract_lookback("past 2 weeks"), Some(14));
        assert_eq!(interpreter.extract_lookback("over the last year"), Some(365));
        assert_eq!(interpreter.extract_lookback("近一年"), Some(365));
        assert_eq!(interpreter.extract_lookback("9999 years"), Some(MAX_LOOKBACK_DAYS));
        assert_eq!(interpreter.extract_lookback("0 days"), None);
        assert_eq!(interpreter.extract_lookback("AAPL"), None);
    }

    #[test]
    fn test_profile_lookback_preference() {
        let interpreter = KeywordInterpreter::new();
        let profile = UserProfile::new("u1").with_preference(LOOKBACK_PREFERENCE, json!(90));

        let query = interpreter.interpret("NVDA outlook", Some(&profile)).unwrap();
        assert_eq!(query.time_range(), TimeRange::implied(90));

        let query = interpreter.interpret("NVDA outlook 10 days", Some(&profile)).unwrap();
        assert_eq!(query.time_range(), TimeRange::explicit(10));
    }

    #[test]
    fn test_deterministic() {
        let interpreter = KeywordInterpreter::new();
        let a = interpreter.interpret("compare TSLA vs NVDA past month", None).unwrap();
        let b = interpreter.interpret("compare TSLA vs NVDA past month", None).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.intent_tag(), IntentTag::Comparison);
    }
}
