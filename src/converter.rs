use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::currency_service::RateFetcher;
use crate::utils::{format_amount, format_decimal, round2};

/// Raw converter inputs, any of which may be missing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversionRequest {
    pub base: Option<String>,
    pub target: Option<String>,
    pub amount: Option<String>,
}

/// Validated converter inputs
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionInput {
    pub base: String,
    pub target: String,
    pub amount: f64,
}

impl ConversionRequest {
    /// `None` when a currency is blank or the amount is missing, zero or not a number
    pub fn validate(&self) -> Option<ConversionInput> {
        let base = non_blank(self.base.as_deref())?;
        let target = non_blank(self.target.as_deref())?;
        let amount = self
            .amount
            .as_deref()
            .and_then(|a| a.trim().parse::<f64>().ok())
            .filter(|a| a.is_finite() && *a != 0.0)?;
        Some(ConversionInput {
            base,
            target,
            amount,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Conversion {
    Incomplete,
    Converted {
        base: String,
        target: String,
        amount: f64,
        converted: f64,
    },
    RateUnavailable,
    Failed(String),
}

impl Conversion {
    pub fn converted(&self) -> Option<f64> {
        match self {
            Conversion::Converted { converted, .. } => Some(*converted),
            _ => None,
        }
    }
}

impl Display for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conversion::Incomplete => write!(f, "Please select currencies and enter an amount."),
            Conversion::Converted {
                base,
                target,
                amount,
                converted,
            } if base == target => write!(
                f,
                "{a} {base} = {c} {target}",
                a = format_amount(*amount),
                c = format_amount(*converted)
            ),
            Conversion::Converted {
                base,
                target,
                amount,
                converted,
            } => write!(
                f,
                "{a} {base} = {c} {target}",
                a = format_amount(*amount),
                c = format_decimal(*converted)
            ),
            Conversion::RateUnavailable => write!(f, "Conversion rate not available."),
            Conversion::Failed(reason) => write!(f, "Error converting currency: {reason}"),
        }
    }
}

/// Converts with an already known rate of `target` under `base`.
/// Same currency returns the amount untouched and ignores `rate`.
pub fn convert(input: &ConversionInput, rate: Option<f64>) -> Conversion {
    if input.base == input.target {
        return Conversion::Converted {
            base: input.base.clone(),
            target: input.target.clone(),
            amount: input.amount,
            converted: input.amount,
        };
    }
    match rate.filter(|r| r.is_finite() && *r > 0.0) {
        Some(rate) => Conversion::Converted {
            base: input.base.clone(),
            target: input.target.clone(),
            amount: input.amount,
            converted: round2(input.amount * rate),
        },
        None => Conversion::RateUnavailable,
    }
}

/// Validates the request and fetches the unperturbed `base` table when needed
pub async fn convert_with(fetcher: &dyn RateFetcher, request: &ConversionRequest) -> Conversion {
    let Some(input) = request.validate() else {
        return Conversion::Incomplete;
    };
    if input.base == input.target {
        return convert(&input, None);
    }
    match fetcher.fetch(&input.base).await {
        Ok(snapshot) => convert(&input, snapshot.rate(&input.target)),
        Err(e) => {
            tracing::error!("Conversion {} -> {} failed: {e}", input.base, input.target);
            Conversion::Failed(e.to_string())
        }
    }
}

/// Converter output as served to clients
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConversionView {
    pub message: String,
    pub converted: Option<f64>,
}

impl From<Conversion> for ConversionView {
    fn from(conversion: Conversion) -> Self {
        Self {
            message: conversion.to_string(),
            converted: conversion.converted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RateSnapshot;
    use crate::{AppError, Result};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    fn request(base: &str, target: &str, amount: &str) -> ConversionRequest {
        ConversionRequest {
            base: Some(base.to_string()),
            target: Some(target.to_string()),
            amount: Some(amount.to_string()),
        }
    }

    struct FixedRates(Option<BTreeMap<String, f64>>);

    #[async_trait]
    impl RateFetcher for FixedRates {
        async fn fetch(&self, base: &str) -> Result<RateSnapshot> {
            match &self.0 {
                Some(rates) => Ok(RateSnapshot::new(base, rates.clone())),
                None => Err(AppError::ReqwestError("connection refused".to_string())),
            }
        }
    }

    #[test]
    fn test_same_currency_returns_amount_verbatim() {
        for amount in [0.01, 1.0, 12.345, 100.0, 99_999.999] {
            let input = ConversionInput {
                base: "USD".into(),
                target: "USD".into(),
                amount,
            };
            let result = convert(&input, Some(0.5));
            assert_eq!(result.converted(), Some(amount));
        }
        let input = request("USD", "USD", "100").validate().unwrap();
        assert_eq!(convert(&input, None).to_string(), "100 USD = 100 USD");
    }

    #[test]
    fn test_converted_value_is_rounded_product() {
        for (amount, rate) in [(100.0, 0.9), (3.0, 1.23456), (12.5, 150.0375), (0.7, 0.333)] {
            let input = ConversionInput {
                base: "USD".into(),
                target: "EUR".into(),
                amount,
            };
            assert_eq!(
                convert(&input, Some(rate)).converted(),
                Some(round2(amount * rate))
            );
        }
    }

    #[test]
    fn test_usd_to_eur_message() {
        let input = request("USD", "EUR", "100").validate().unwrap();
        assert_eq!(
            convert(&input, Some(0.9)).to_string(),
            "100 USD = 90.0 EUR"
        );
    }

    #[test]
    fn test_half_cent_products_round_like_the_dashboard() {
        for (amount, rate, expected) in [
            ("1", 0.125, "1 USD = 0.12 EUR"),
            ("3", 0.005, "3 USD = 0.01 EUR"),
            ("10", 0.9125, "10 USD = 9.12 EUR"),
        ] {
            let input = request("USD", "EUR", amount).validate().unwrap();
            assert_eq!(convert(&input, Some(rate)).to_string(), expected);
        }
    }

    #[test]
    fn test_incomplete_inputs() {
        assert!(ConversionRequest::default().validate().is_none());
        assert!(request("USD", "", "100").validate().is_none());
        assert!(request("USD", "EUR", "0").validate().is_none());
        assert!(request("USD", "EUR", "lots").validate().is_none());
        assert_eq!(
            Conversion::Incomplete.to_string(),
            "Please select currencies and enter an amount."
        );
    }

    #[test]
    fn test_missing_rate() {
        let input = request("USD", "XYZ", "10").validate().unwrap();
        assert_eq!(convert(&input, None), Conversion::RateUnavailable);
        assert_eq!(
            Conversion::RateUnavailable.to_string(),
            "Conversion rate not available."
        );
    }

    #[tokio::test]
    async fn test_convert_with_fetcher() {
        let fetcher = FixedRates(Some(BTreeMap::from([("EUR".to_string(), 0.9)])));
        let result = convert_with(&fetcher, &request("usd", "eur", "100")).await;
        assert_eq!(result.to_string(), "100 USD = 90.0 EUR");
        let result = convert_with(&fetcher, &request("USD", "JPY", "100")).await;
        assert_eq!(result, Conversion::RateUnavailable);
        let result = convert_with(&fetcher, &ConversionRequest::default()).await;
        assert_eq!(result, Conversion::Incomplete);
    }

    #[tokio::test]
    async fn test_convert_with_failing_fetcher() {
        let fetcher = FixedRates(None);
        let result = convert_with(&fetcher, &request("USD", "EUR", "5")).await;
        assert_eq!(
            result.to_string(),
            "Error converting currency: connection refused"
        );
        let view = ConversionView::from(result);
        assert!(view.converted.is_none());
        let same = convert_with(&fetcher, &request("EUR", "EUR", "5")).await;
        assert_eq!(same.to_string(), "5 EUR = 5 EUR");
    }
}
