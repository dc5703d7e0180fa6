//! Customer endpoints (`/clientes`)

use crate::error::ApiResult;
use crate::models::Client;
use crate::network::client::ApiClient;

pub async fn list_clients(api: &ApiClient) -> ApiResult<Vec<Client>> {
    api.get("/clientes")
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to list clients"))
}

pub async fn get_client(api: &ApiClient, id: u64) -> ApiResult<Client> {
    api.get(&format!("/clientes/{}", id))
        .await
        .inspect_err(|e| tracing::error!(id, error = %e, "Failed to fetch client"))
}

pub async fn create_client(api: &ApiClient, client: &Client) -> ApiResult<Client> {
    api.post("/clientes", client)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to create client"))
}

pub async fn update_client(api: &ApiClient, id: u64, client: &Client) -> ApiResult<Client> {
    api.put(&format!("/clientes/{}", id), client)
        .await
        .inspect_err(|e| tracing::error!(id, error = %e, "Failed to update client"))
}

/// Toggles the active flag server-side; the body is whatever the backend echoes
pub async fn deactivate_client(api: &ApiClient, id: u64) -> ApiResult<serde_json::Value> {
    api.delete(&format!("/clientes/{}", id))
        .await
        .inspect_err(|e| tracing::error!(id, error = %e, "Failed to deactivate client"))
}
