//! User profile snapshot used to personalise a request

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::query::Query;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskTolerance {
    /// Parse the loose labels clients send
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "conservative" | "low" | "保守" | "低" => Some(Self::Conservative),
            "moderate" | "medium" | "balanced" | "稳健" | "中" => Some(Self::Moderate),
            "aggressive" | "high" | "激进" | "高" => Some(Self::Aggressive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }
}

/// Read-only snapshot of a user's profile for one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub preferences: BTreeMap<String, Value>,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
    #[serde(default)]
    pub history: Vec<Query>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_risk_tolerance(mut self, risk_tolerance: RiskTolerance) -> Self {
        self.risk_tolerance = risk_tolerance;
        self
    }

    pub fn with_preference(mut self, key: impl Into<String>, value: Value) -> Self {
        self.preferences.insert(key.into(), value);
        self
    }

    pub fn preference(&self, key: &str) -> Option<&Value> {
        self.preferences.get(key)
    }

    /// Integer preference, accepting numbers and numeric strings
    pub fn preference_u32(&self, key: &str) -> Option<u32> {
        match self.preferences.get(key)? {
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Build a profile from arbitrary client JSON
    ///
    /// Known keys are typed; every other top-level key is kept as a preference.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::InvalidInput(
                "user profile must be a JSON object".to_string(),
            ));
        };
        Ok(Self::from_map(map))
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let mut profile = Self::default();

        for (key, value) in map {
            match key.as_str() {
                "id" | "user_id" => match value {
                    Value::String(s) => profile.id = s,
                    Value::Number(n) => profile.id = n.to_string(),
                    other => {
                        profile.preferences.insert(key, other);
                    }
                },
                "preferences" => match value {
                    Value::Object(prefs) => profile.preferences.extend(prefs),
                    other => {
                        profile.preferences.insert(key, other);
                    }
                },
                "risk_tolerance" | "risk_preference" => {
                    match value.as_str().and_then(RiskTolerance::parse) {
                        Some(risk) => profile.risk_tolerance = risk,
                        None => {
                            profile.preferences.insert(key, value);
                        }
                    }
                }
                "history" => match serde_json::from_value::<Vec<Query>>(value.clone()) {
                    Ok(history) => profile.history = history,
                    Err(_) => {
                        profile.preferences.insert(key, value);
                    }
                },
                _ => {
                    profile.preferences.insert(key, value);
                }
            }
        }

        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_profile_parsing() {
        let profile = UserProfile::from_value(json!({
            "user_id": 42,
            "risk_preference": "high",
            "investment_horizon": "long",
            "preferences": { "default_lookback_days": "90" }
        }))
        .unwrap();

        assert_eq!(profile.id, "42");
        assert_eq!(profile.risk_tolerance, RiskTolerance::Aggressive);
        assert_eq!(profile.preference("investment_horizon"), Some(&json!("long")));
        assert_eq!(profile.preference_u32("default_lookback_days"), Some(90));
    }

    #[test]
    fn test_unknown_risk_label_kept_as_preference() {
        let profile = UserProfile::from_value(json!({ "risk_tolerance": "yolo" })).unwrap();
        assert_eq!(profile.risk_tolerance, RiskTolerance::Moderate);
        assert_eq!(profile.preference("risk_tolerance"), Some(&json!("yolo")));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = UserProfile::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_typed_round_trip_is_lenient_compatible() {
        let profile = UserProfile::new("u1")
            .with_risk_tolerance(RiskTolerance::Conservative)
            .with_preference("lang", json!("zh"));
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(UserProfile::from_value(value).unwrap(), profile);
    }
}
