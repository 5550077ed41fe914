//! The Pulse REST client.

use std::collections::BTreeMap;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::dto::{
    AlertDto, ClassifiedDto, CreateAlertRequest, CreateNewsRequest, NewsDto, UserDto,
};
use crate::envelope::{ApiResponse, Page};
use crate::error::{ApiError, Result};
use crate::token::{AuthTokens, TokenStore};

/// Header carrying the deduplication key for replayed creates.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Typed client over the Pulse REST API.
///
/// Cheap to clone; the underlying `reqwest::Client` and [`TokenStore`] are
/// shared.
#[derive(Clone)]
pub struct PulseApi {
    http: Client,
    base_url: String,
    tokens: TokenStore,
}

impl PulseApi {
    /// Build a client from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens: TokenStore::new(),
        })
    }

    /// Handle to the shared token store.
    pub fn tokens(&self) -> TokenStore {
        self.tokens.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the bearer token when one is stored; otherwise the request goes
    /// out unauthenticated.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.access_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Pre-check the HTTP status, then decode the envelope.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        Ok(response.json::<ApiResponse<T>>().await?)
    }

    async fn get_enveloped<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>> {
        let response = self
            .authorize(self.http.get(self.url(path)).query(query))
            .send()
            .await?;
        Self::decode(response).await
    }

    // ------------------------------------------------------------------
    // News
    // ------------------------------------------------------------------

    /// `GET /news?page&limit&category`
    pub async fn get_news(
        &self,
        page: u32,
        limit: u32,
        category: Option<&str>,
    ) -> Result<Page<NewsDto>> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        self.get_enveloped("news", &query).await?.into_data()
    }

    /// `GET /news/{id}`
    pub async fn get_news_by_id(&self, id: &str) -> Result<NewsDto> {
        self.get_enveloped(&format!("news/{id}"), &[]).await?.into_data()
    }

    /// `POST /news`
    pub async fn create_news(
        &self,
        request: &CreateNewsRequest,
        idempotency_key: Option<&str>,
    ) -> Result<NewsDto> {
        let mut builder = self.http.post(self.url("news")).json(request);
        if let Some(key) = idempotency_key {
            builder = builder.header(IDEMPOTENCY_HEADER, key);
        }
        let response = self.authorize(builder).send().await?;
        Self::decode(response).await?.into_data()
    }

    /// `DELETE /news/{id}`
    pub async fn delete_news(&self, id: &str) -> Result<()> {
        let response = self
            .authorize(self.http.delete(self.url(&format!("news/{id}"))))
            .send()
            .await?;
        Self::decode::<serde_json::Value>(response).await?.into_ack()
    }

    /// `POST /news/{id}/like`
    pub async fn like_news(&self, id: &str) -> Result<()> {
        let response = self
            .authorize(self.http.post(self.url(&format!("news/{id}/like"))))
            .send()
            .await?;
        Self::decode::<serde_json::Value>(response).await?.into_ack()
    }

    // ------------------------------------------------------------------
    // Alerts
    // ------------------------------------------------------------------

    /// `GET /alerts?page&limit&active_only`
    pub async fn get_alerts(
        &self,
        page: u32,
        limit: u32,
        active_only: bool,
    ) -> Result<Page<AlertDto>> {
        let query = [
            ("page", page.to_string()),
            ("limit", limit.to_string()),
            ("active_only", active_only.to_string()),
        ];
        self.get_enveloped("alerts", &query).await?.into_data()
    }

    /// `GET /alerts/{id}`
    pub async fn get_alert_by_id(&self, id: &str) -> Result<AlertDto> {
        self.get_enveloped(&format!("alerts/{id}"), &[]).await?.into_data()
    }

    /// `POST /alerts`
    pub async fn create_alert(
        &self,
        request: &CreateAlertRequest,
        idempotency_key: Option<&str>,
    ) -> Result<AlertDto> {
        let mut builder = self.http.post(self.url("alerts")).json(request);
        if let Some(key) = idempotency_key {
            builder = builder.header(IDEMPOTENCY_HEADER, key);
        }
        let response = self.authorize(builder).send().await?;
        Self::decode(response).await?.into_data()
    }

    /// `GET /alerts/nearby?latitude&longitude&radius`
    pub async fn get_nearby_alerts(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: u32,
    ) -> Result<Vec<AlertDto>> {
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("radius", radius_km.to_string()),
        ];
        self.get_enveloped("alerts/nearby", &query).await?.into_data()
    }

    // ------------------------------------------------------------------
    // Classifieds
    // ------------------------------------------------------------------

    /// `GET /classifieds?page&limit&category`
    pub async fn get_classifieds(
        &self,
        page: u32,
        limit: u32,
        category: Option<&str>,
    ) -> Result<Page<ClassifiedDto>> {
        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        self.get_enveloped("classifieds", &query).await?.into_data()
    }

    /// `GET /classifieds/{id}`
    pub async fn get_classified_by_id(&self, id: &str) -> Result<ClassifiedDto> {
        self.get_enveloped(&format!("classifieds/{id}"), &[]).await?.into_data()
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// `GET /users/me`
    pub async fn get_current_user(&self) -> Result<UserDto> {
        self.get_enveloped("users/me", &[]).await?.into_data()
    }

    /// `GET /users/{id}`
    pub async fn get_user_by_id(&self, id: &str) -> Result<UserDto> {
        self.get_enveloped(&format!("users/{id}"), &[]).await?.into_data()
    }

    /// `PUT /users/me` -- partial-field map, only the provided keys change.
    pub async fn update_profile(&self, updates: &BTreeMap<String, String>) -> Result<UserDto> {
        let response = self
            .authorize(self.http.put(self.url("users/me")).json(updates))
            .send()
            .await?;
        Self::decode(response).await?.into_data()
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// `POST /auth/refresh` -- exchange the refresh token for a new pair.
    /// The stored pair is replaced on success.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens> {
        let body = BTreeMap::from([("refresh_token".to_string(), refresh_token.to_string())]);
        let response = self.http.post(self.url("auth/refresh")).json(&body).send().await?;
        let tokens: AuthTokens = Self::decode(response).await?.into_data()?;
        self.tokens.set(tokens.clone());
        tracing::info!("auth tokens refreshed");
        Ok(tokens)
    }

    // ------------------------------------------------------------------
    // Wallet (placeholder surface)
    // ------------------------------------------------------------------

    /// `GET /wallet/balance`
    pub async fn get_token_balance(&self) -> Result<i64> {
        self.get_enveloped("wallet/balance", &[]).await?.into_data()
    }

    /// `GET /wallet/transactions?page&limit` -- untyped records.
    pub async fn get_transactions(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<Page<serde_json::Value>> {
        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        self.get_enveloped("wallet/transactions", &query)
            .await?
            .into_data()
    }
}
