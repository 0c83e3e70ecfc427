//! Request/response contract with the remote item service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::ItemId,
    protocol::{Item, ItemPage, ItemPayload},
};
use tracing::debug;

use crate::error::GatewayError;

pub const ITEMS_ROUTE: &str = "/api/v1/items";

#[async_trait]
pub trait ItemGateway: Send + Sync {
    async fn list(&self, page: u32, size: u32) -> Result<ItemPage, GatewayError>;
    async fn create(&self, payload: &ItemPayload) -> Result<Item, GatewayError>;
    async fn update(&self, id: ItemId, payload: &ItemPayload) -> Result<Item, GatewayError>;
    async fn delete(&self, id: ItemId) -> Result<(), GatewayError>;
    async fn get(&self, id: ItemId) -> Result<Item, GatewayError>;
}

/// [`ItemGateway`] backed by the service's JSON HTTP API.
pub struct HttpItemGateway {
    http: Client,
    api_base: String,
}

impl HttpItemGateway {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_base)
    }

    pub fn with_timeout(api_base: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, api_base))
    }

    pub fn with_client(http: Client, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { http, api_base }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn items_url(&self) -> String {
        format!("{}{ITEMS_ROUTE}", self.api_base)
    }

    fn item_url(&self, id: ItemId) -> String {
        format!("{}{ITEMS_ROUTE}/{}", self.api_base, id.0)
    }
}

async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .map_err(|err| GatewayError::Transport(err.to_string()))?;
    debug!(status = status.as_u16(), "items: error response from service");
    Err(GatewayError::from_response_body(status.as_u16(), &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let response = ensure_success(response).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|err| GatewayError::Transport(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| GatewayError::Decode(err.to_string()))
}

#[async_trait]
impl ItemGateway for HttpItemGateway {
    async fn list(&self, page: u32, size: u32) -> Result<ItemPage, GatewayError> {
        let response = self
            .http
            .get(self.items_url())
            .query(&[("page", page), ("size", size)])
            .send()
            .await?;
        read_json(response).await
    }

    async fn create(&self, payload: &ItemPayload) -> Result<Item, GatewayError> {
        let response = self.http.post(self.items_url()).json(payload).send().await?;
        read_json(response).await
    }

    async fn update(&self, id: ItemId, payload: &ItemPayload) -> Result<Item, GatewayError> {
        let response = self.http.put(self.item_url(id)).json(payload).send().await?;
        read_json(response).await
    }

    async fn delete(&self, id: ItemId) -> Result<(), GatewayError> {
        let response = self.http.delete(self.item_url(id)).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn get(&self, id: ItemId) -> Result<Item, GatewayError> {
        let response = self.http.get(self.item_url(id)).send().await?;
        read_json(response).await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
