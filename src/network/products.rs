//! Product endpoints (`/produtos`)

use crate::error::ApiResult;
use crate::models::Product;
use crate::network::client::ApiClient;

pub async fn list_products(api: &ApiClient) -> ApiResult<Vec<Product>> {
    api.get("/produtos")
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to list products"))
}
