use crate::{
    models::{RateSnapshot, RatesResponse},
    AppError, Result,
};
use async_trait::async_trait;
use rand::Rng;
use reqwest::Url;
use tracing::instrument;

/// Half-width of the synthetic noise added to every rate
pub const PERTURBATION: f64 = 0.05;

/// Source of rate tables keyed by base currency
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch(&self, base: &str) -> Result<RateSnapshot>;
}

/// Queries `GET {api_base}/{BASE}` once per call: no retry, no backoff.
pub struct HttpRateFetcher {
    client: reqwest::Client,
    api_base: Url,
}

impl HttpRateFetcher {
    pub fn new(api_base: &str) -> Result<Self> {
        let api_base = Url::parse(api_base)
            .map_err(|e| AppError::ConfigError(format!("invalid api base {api_base:?}: {e}")))?;
        if api_base.cannot_be_a_base() {
            return Err(AppError::ConfigError(format!(
                "api base {api_base} cannot carry a path"
            )));
        }
        let client = reqwest::Client::builder().gzip(true).build()?;
        Ok(Self { client, api_base })
    }
    fn endpoint(&self, base: &str) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(base);
        }
        url
    }
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    #[instrument(name = "fetching rates", skip(self))]
    async fn fetch(&self, base: &str) -> Result<RateSnapshot> {
        let url = self.endpoint(base);
        tracing::debug!("Requesting {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            if let Some(kind) = serde_json::from_slice::<RatesResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.error_type)
            {
                tracing::error!("Upstream rejected rate request for {base} ({status}): {kind}");
                return Err(AppError::UpstreamError(kind));
            }
            tracing::error!("Rate request for {base} failed with status {status}");
            return Err(AppError::StatusError(status.as_u16()));
        }
        let parsed: RatesResponse = serde_json::from_slice(&body)?;
        if parsed.result.as_deref() == Some("error") {
            let kind = parsed.error_type.unwrap_or_else(|| "unknown".to_string());
            tracing::error!("Upstream rejected rate request for {base}: {kind}");
            return Err(AppError::UpstreamError(kind));
        }
        let Some(rates) = parsed.rates else {
            return Err(AppError::MalformedBody(
                "response has no `rates` field".to_string(),
            ));
        };
        let snapshot = RateSnapshot::new(parsed.base_code.unwrap_or_else(|| base.to_string()), rates);
        tracing::debug!("Received {} rates for {base}", snapshot.len());
        Ok(snapshot)
    }
}

/// `rate` plus an independent uniform draw from `[-PERTURBATION, PERTURBATION]`
pub fn perturb<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> f64 {
    rate + rng.gen_range(-PERTURBATION..=PERTURBATION)
}

impl RateSnapshot {
    /// A copy with every rate perturbed independently
    pub fn perturbed<R: Rng + ?Sized>(&self, rng: &mut R) -> RateSnapshot {
        RateSnapshot {
            base: self.base.clone(),
            fetched_at: self.fetched_at,
            rates: self
                .rates
                .iter()
                .map(|(code, rate)| (code.clone(), perturb(*rate, rng)))
                .collect(),
        }
    }
}
