//! Typed calls against the Shelfwise HTTP API.

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use shelfwise_core::{ItemId, ShelfId};
use shelfwise_inventory::{AdjustQuantity, Item, MoveItem, Shelf, UpdateShelf, Warehouse};

use crate::error::ClientError;

/// A shelf as listed under the default warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfSnapshot {
    #[serde(flatten)]
    pub shelf: Shelf,
    #[serde(default)]
    pub item_count: usize,
}

/// The default warehouse and its shelves, as the floor plan renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseSnapshot {
    #[serde(flatten)]
    pub warehouse: Warehouse,
    pub shelves: Vec<ShelfSnapshot>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// The calls the optimistic cache needs; [`ApiClient`] is the real one.
#[async_trait::async_trait]
pub trait ShelfApi: Send + Sync {
    async fn default_warehouse(&self) -> Result<WarehouseSnapshot, ClientError>;
    async fn update_shelf(&self, id: ShelfId, patch: &UpdateShelf) -> Result<Shelf, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// `{base}/api/{segments...}`, each segment percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::from_response(status.as_u16(), &body));
        }
        let envelope: Envelope<T> = resp.json().await?;
        Ok(envelope.data)
    }

    /// True when `/api/health` answers 200.
    pub async fn check_connectivity(&self) -> bool {
        let url = match self.endpoint(&["health"]) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(error = %e, "health check skipped");
                return false;
            }
        };
        match self.http.get(url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "health check failed");
                false
            }
        }
    }

    pub async fn list_shelves(&self) -> Result<Vec<Shelf>, ClientError> {
        let resp = self.http.get(self.endpoint(&["shelves"])?).send().await?;
        Self::read(resp).await
    }

    pub async fn item_by_sku(&self, sku: &str) -> Result<Item, ClientError> {
        let resp = self.http.get(self.endpoint(&["items", "sku", sku])?).send().await?;
        Self::read(resp).await
    }

    pub async fn adjust_item_quantity(&self, id: ItemId, adjustment: i64) -> Result<Item, ClientError> {
        let resp = self
            .http
            .post(self.endpoint(&["items", &id.to_string(), "adjust-quantity"])?)
            .json(&AdjustQuantity { adjustment })
            .send()
            .await?;
        Self::read(resp).await
    }

    /// Returns the item holding the moved stock on the target shelf.
    pub async fn move_item(&self, id: ItemId, input: &MoveItem) -> Result<Item, ClientError> {
        let resp = self
            .http
            .post(self.endpoint(&["items", &id.to_string(), "move"])?)
            .json(input)
            .send()
            .await?;
        Self::read(resp).await
    }
}

#[async_trait::async_trait]
impl ShelfApi for ApiClient {
    async fn default_warehouse(&self) -> Result<WarehouseSnapshot, ClientError> {
        let resp = self.http.get(self.endpoint(&["warehouse"])?).send().await?;
        Self::read(resp).await
    }

    async fn update_shelf(&self, id: ShelfId, patch: &UpdateShelf) -> Result<Shelf, ClientError> {
        let resp = self
            .http
            .patch(self.endpoint(&["shelves", &id.to_string()])?)
            .json(patch)
            .send()
            .await?;
        Self::read(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sku_travels_as_a_single_path_segment() {
        let client = ApiClient::new("http://localhost:8080/");
        let url = client.endpoint(&["items", "sku", "A/B?C#D 1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/items/sku/A%2FB%3FC%23D%201");
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let client = ApiClient::new("http://proxy.local/shelfwise");
        let url = client.endpoint(&["health"]).unwrap();
        assert_eq!(url.as_str(), "http://proxy.local/shelfwise/api/health");
    }

    #[test]
    fn unparsable_base_url_is_reported() {
        let client = ApiClient::new("not a url");
        assert!(matches!(client.endpoint(&["health"]), Err(ClientError::InvalidUrl(_))));
    }
}
