//! Thin client for the Yelp Fusion business search endpoint.
//!
//! See <https://docs.developer.yelp.com/reference/v3_business_search>.

use crate::utils::error::{EtlError, Result};
use crate::utils::logger::mask_api_key;
use crate::utils::validation::{validate_non_empty_string, validate_url};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub const SEARCH_API_URL: &str = "https://api.yelp.com/v3/businesses/search";

/// Search criteria accepted by the endpoint. `None` values are never sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub term: Option<String>,
    /// Comma separated category aliases, e.g. `vegan,vegetarian,sushi`.
    pub categories: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<u32>,
    /// Meters; the API caps this at 40000.
    pub radius: Option<u32>,
    pub offset: Option<u32>,
    pub price: Option<String>,
    pub open_now: Option<bool>,
    pub locale: Option<String>,
    pub attributes: Option<String>,
}

impl SearchParams {
    /// A non-blank `location`, or both coordinates.
    pub fn has_location(&self) -> bool {
        let has_text = self
            .location
            .as_deref()
            .is_some_and(|location| !location.trim().is_empty());
        has_text || (self.latitude.is_some() && self.longitude.is_some())
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let candidates = [
            ("location", self.location.clone()),
            ("latitude", self.latitude.map(|v| v.to_string())),
            ("longitude", self.longitude.map(|v| v.to_string())),
            ("term", self.term.clone()),
            ("categories", self.categories.clone()),
            ("sort_by", self.sort_by.clone()),
            ("limit", self.limit.map(|v| v.to_string())),
            ("radius", self.radius.map(|v| v.to_string())),
            ("offset", self.offset.map(|v| v.to_string())),
            ("price", self.price.clone()),
            ("open_now", self.open_now.map(|v| v.to_string())),
            ("locale", self.locale.clone()),
            ("attributes", self.attributes.clone()),
        ];

        candidates
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }
}

/// Owns one pooled HTTP session. The session is released when the client is
/// closed or dropped, whichever comes first.
pub struct YelpClient {
    session: Client,
    endpoint: String,
    auth_header: String,
}

impl YelpClient {
    pub fn new(api_key: &str, timeout: Option<Duration>) -> Result<Self> {
        Self::with_endpoint(api_key, timeout, SEARCH_API_URL)
    }

    pub fn with_endpoint(api_key: &str, timeout: Option<Duration>, endpoint: &str) -> Result<Self> {
        validate_non_empty_string("API_KEY", api_key)?;
        validate_url("api_endpoint", endpoint)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let session = builder.build()?;

        tracing::debug!(
            "Opened Yelp API session for {} (key {}, timeout {:?})",
            endpoint,
            mask_api_key(api_key),
            timeout
        );

        Ok(Self {
            session,
            endpoint: endpoint.to_string(),
            auth_header: format!("Bearer {}", api_key),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn search(&self, params: &SearchParams) -> Result<Value> {
        if !params.has_location() {
            return Err(EtlError::InvalidParameters {
                message: "A valid location (parameter \"location\") or latitude/longitude \
                          combination (parameters \"latitude\" and \"longitude\") must be provided"
                    .to_string(),
            });
        }

        self.query(&params.query_pairs()).await
    }

    async fn query(&self, parameters: &[(&'static str, String)]) -> Result<Value> {
        tracing::debug!("Sending request to Yelp API with params: {:?}", parameters);

        let response = self
            .session
            .get(&self.endpoint)
            .header(AUTHORIZATION, &self.auth_header)
            .query(parameters)
            .send()
            .await?;

        tracing::debug!("Yelp API response status: {}", response.status());
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let json: Value = serde_json::from_str(&body).map_err(|e| EtlError::MalformedResponse {
            message: e.to_string(),
        })?;

        if let Some(error) = json.get("error") {
            let code = error["code"].as_str().unwrap_or("UNKNOWN").to_string();
            let description = error["description"]
                .as_str()
                .unwrap_or("No description provided")
                .to_string();
            tracing::warn!("Yelp API error: {}: {}", code, description);
            return Err(EtlError::RemoteApiError { code, description });
        }

        Ok(json)
    }

    /// Ends the session now instead of at end of scope. Release happens in `Drop`.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for YelpClient {
    fn drop(&mut self) {
        tracing::debug!("Releasing Yelp API session for {}", self.endpoint);
    }
}
