use crate::app::ports::BackendPort;
use crate::config::ApiConfig;
use crate::domain::{AdoptionPage, Facility, FacilityDetail, SearchResults};
use crate::error::{PetmapError, Result};
use crate::infra::wire::{self, ChatReply};
use crate::metrics::FetchMetrics;
use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Reqwest-backed client for the locator backend.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = self.endpoint(path);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        let payload = response.json::<Value>().await?;
        Ok(payload)
    }

    async fn fetch_district(&self, gu: &str) -> Result<Vec<Facility>> {
        let payload = self.get_json("/api/facilities", &[("gu", gu)]).await?;
        let (facilities, dropped) = wire::decode_facilities(&payload)?;
        FetchMetrics::record_dropped_records(dropped);
        info!(gu, count = facilities.len(), dropped, "facilities fetched");
        Ok(facilities)
    }
}

#[async_trait]
impl BackendPort for BackendClient {
    async fn facilities_by_district(&self, gu: &str) -> Result<Vec<Facility>> {
        let started = Instant::now();
        let outcome = self.fetch_district(gu).await;
        match &outcome {
            Ok(facilities) => {
                FetchMetrics::record_success(facilities.len(), started.elapsed().as_secs_f64())
            }
            Err(_) => FetchMetrics::record_failure(),
        }
        outcome
    }

    async fn facility_detail(&self, id: &str) -> Result<FacilityDetail> {
        let payload = self.get_json("/api/facility/detail", &[("id", id)]).await?;
        let detail: FacilityDetail = serde_json::from_value(payload)?;
        Ok(detail)
    }

    async fn search(&self, query: &str) -> Result<SearchResults> {
        let payload = self.get_json("/api/search", &[("q", query)]).await?;
        let results: SearchResults = serde_json::from_value(payload)?;
        Ok(results)
    }

    async fn adoption_page(&self, start: u32, end: u32) -> Result<AdoptionPage> {
        let url = self.endpoint("/api/animals");
        let response = self
            .client
            .get(&url)
            .query(&[("start", start.to_string()), ("end", end.to_string())])
            .send()
            .await?
            .error_for_status()?;
        let page = response.json::<AdoptionPage>().await?;
        Ok(page)
    }

    async fn ask(&self, message: &str) -> Result<String> {
        let url = self.endpoint("/api/chat");
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await?;

        // The relay reports problems as an error body with a non-2xx status
        let status = response.status();
        if !status.is_success() {
            return match response.json::<ChatReply>().await {
                Ok(reply) => reply.into_message(),
                Err(_) => Err(PetmapError::Api {
                    message: format!("chat relay failed with status {}", status),
                }),
            };
        }

        let reply = response.json::<ChatReply>().await?;
        reply.into_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_without_double_slashes() {
        let client = BackendClient::new(&ApiConfig {
            base_url: "http://localhost:5001/".to_string(),
            timeout_seconds: 5,
        })
        .unwrap();

        assert_eq!(
            client.endpoint("/api/facilities"),
            "http://localhost:5001/api/facilities"
        );
    }
}
