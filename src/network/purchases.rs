//! Purchase endpoints (`/compras`)

use crate::error::ApiResult;
use crate::models::{Purchase, PurchasePayload, PurchaseStatus, StatusUpdate};
use crate::network::client::ApiClient;

pub async fn list_purchases(api: &ApiClient) -> ApiResult<Vec<Purchase>> {
    api.get("/compras")
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to list purchases"))
}

pub async fn get_purchase(api: &ApiClient, id: u64) -> ApiResult<Purchase> {
    api.get(&format!("/compras/{}", id))
        .await
        .inspect_err(|e| tracing::error!(id, error = %e, "Failed to fetch purchase"))
}

pub async fn create_purchase(api: &ApiClient, payload: &PurchasePayload) -> ApiResult<Purchase> {
    api.post("/compras", payload)
        .await
        .inspect_err(|e| tracing::error!(client_id = payload.client_id, error = %e, "Failed to create purchase"))
}

pub async fn update_purchase(api: &ApiClient, id: u64, payload: &PurchasePayload) -> ApiResult<Purchase> {
    api.put(&format!("/compras/{}", id), payload)
        .await
        .inspect_err(|e| tracing::error!(id, error = %e, "Failed to update purchase"))
}

pub async fn update_status(api: &ApiClient, id: u64, status: PurchaseStatus) -> ApiResult<Purchase> {
    tracing::info!(id, status = %status, "Updating purchase status");
    let body = StatusUpdate { status };
    api.put(&format!("/compras/{}/status", id), &body)
        .await
        .inspect_err(|e| tracing::error!(id, error = %e, "Failed to update purchase status"))
}
