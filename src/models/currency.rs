use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Currencies offered for charting, with their display names
const CATALOG: [(&str, &str); 12] = [
    ("USD", "United States Dollar"),
    ("EUR", "Eurozone Euro"),
    ("GBP", "United Kingdom Pound"),
    ("JPY", "Japan Yen"),
    ("CAD", "Canada Dollar"),
    ("AUD", "Australia Dollar"),
    ("INR", "India Rupee"),
    ("CNY", "China Yuan"),
    ("CHF", "Switzerland Franc"),
    ("ZAR", "South Africa Rand"),
    ("PHP", "Philippine Peso"),
    ("TRY", "Turkish Lira"),
];

/// Read-only table of currency code to display name
#[derive(Debug, Clone)]
pub struct CurrencyCatalog {
    names: HashMap<&'static str, &'static str>,
}

impl Default for CurrencyCatalog {
    fn default() -> Self {
        Self {
            names: CATALOG.into_iter().collect(),
        }
    }
}

impl CurrencyCatalog {
    /// Display name for `code`, the code itself when unknown
    pub fn display_name<'a>(&self, code: &'a str) -> &'a str {
        match self.names.get(code) {
            Some(name) => *name,
            None => code,
        }
    }
    pub fn label(&self, code: &str) -> String {
        format!("{} ({code})", self.display_name(code))
    }
    #[cfg(test)]
    pub fn contains(&self, code: &str) -> bool {
        self.names.contains_key(code)
    }
    /// Entries in their declared order
    pub fn entries(&self) -> Vec<CatalogEntry> {
        CATALOG
            .iter()
            .map(|(code, name)| CatalogEntry {
                code: code.to_string(),
                name: name.to_string(),
                label: format!("{name} ({code})"),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
    pub label: String,
}

/// Body of `GET {api_base}/{BASE}`
#[derive(Debug, Deserialize)]
pub struct RatesResponse {
    pub result: Option<String>,
    #[serde(rename = "error-type")]
    pub error_type: Option<String>,
    pub base_code: Option<String>,
    pub rates: Option<BTreeMap<String, f64>>,
}

/// One fetched rate table, never merged with earlier ones
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RateSnapshot {
    pub base: String,
    pub fetched_at: DateTime<Utc>,
    pub rates: BTreeMap<String, f64>,
}

impl RateSnapshot {
    /// Keeps only positive, finite rates
    pub fn new(base: impl Into<String>, rates: BTreeMap<String, f64>) -> Self {
        let base = base.into();
        let rates = rates
            .into_iter()
            .filter(|(code, rate)| {
                let valid = rate.is_finite() && *rate > 0.0;
                if !valid {
                    tracing::warn!("Dropping invalid rate {rate} for {code} under {base}");
                }
                valid
            })
            .collect();
        Self {
            base,
            fetched_at: Utc::now(),
            rates,
        }
    }
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }
    pub fn len(&self) -> usize {
        self.rates.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_code_falls_back_to_code() {
        let catalog = CurrencyCatalog::default();
        assert_eq!(catalog.display_name("XYZ"), "XYZ");
        assert_eq!(catalog.label("XYZ"), "XYZ (XYZ)");
        assert!(!catalog.contains("XYZ"));
    }

    #[test]
    fn test_known_code_label() {
        let catalog = CurrencyCatalog::default();
        assert_eq!(catalog.display_name("JPY"), "Japan Yen");
        assert_eq!(catalog.label("EUR"), "Eurozone Euro (EUR)");
        assert_eq!(catalog.entries().len(), 12);
        assert_eq!(catalog.entries()[0].code, "USD");
    }

    #[test]
    fn test_snapshot_drops_invalid_rates() {
        let rates = BTreeMap::from([
            ("EUR".to_string(), 0.9),
            ("BAD".to_string(), 0.0),
            ("NEG".to_string(), -1.0),
        ]);
        let snapshot = RateSnapshot::new("USD", rates);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.rate("EUR"), Some(0.9));
        assert_eq!(snapshot.rate("BAD"), None);
    }

    #[test]
    fn test_response_deserializes_upstream_shape() -> anyhow::Result<()> {
        let body = r#"{"result":"success","base_code":"USD","rates":{"USD":1,"EUR":0.9}}"#;
        let response: RatesResponse = serde_json::from_str(body)?;
        assert_eq!(response.base_code.as_deref(), Some("USD"));
        assert_eq!(response.rates.unwrap_or_default().get("USD"), Some(&1.0));
        let body = r#"{"result":"error","error-type":"unsupported-code"}"#;
        let response: RatesResponse = serde_json::from_str(body)?;
        assert_eq!(response.error_type.as_deref(), Some("unsupported-code"));
        assert!(response.rates.is_none());
        Ok(())
    }
}
