//! Melhor Envio endpoints proxied by the backend: wallet, PIX, labels, tracking

use crate::constants::carrier_paths;
use crate::error::ApiResult;
use crate::models::{LabelOrders, PixCharge, PrintResult, TrackingRefresh, WalletBalance};
use crate::network::client::ApiClient;

pub async fn wallet_balance(api: &ApiClient) -> ApiResult<WalletBalance> {
    api.get(carrier_paths::BALANCE)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to load carrier balance"))
}

pub async fn pix_charge(api: &ApiClient) -> ApiResult<PixCharge> {
    api.get(carrier_paths::PIX_CHARGE)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to generate PIX charge"))
}

pub async fn buy_labels(api: &ApiClient) -> ApiResult<serde_json::Value> {
    tracing::info!("Buying cart labels");
    api.get(carrier_paths::BUY_LABELS)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to buy labels"))
}

pub async fn generate_labels(api: &ApiClient, label_codes: &[String]) -> ApiResult<serde_json::Value> {
    tracing::info!(count = label_codes.len(), "Generating labels");
    let body = LabelOrders { orders: label_codes.to_vec() };
    api.post(carrier_paths::GENERATE_LABELS, &body)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to generate labels"))
}

pub async fn print_labels(api: &ApiClient, label_codes: &[String]) -> ApiResult<PrintResult> {
    tracing::info!(count = label_codes.len(), "Requesting label print URL");
    let body = LabelOrders { orders: label_codes.to_vec() };
    api.post(carrier_paths::PRINT_LABELS, &body)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to print labels"))
}

pub async fn refresh_tracking(api: &ApiClient) -> ApiResult<TrackingRefresh> {
    let result: TrackingRefresh = api
        .get(carrier_paths::REFRESH_TRACKING)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to refresh tracking codes"))?;
    if result.success {
        tracing::info!("Tracking codes refreshed");
    } else {
        tracing::warn!("Backend reported tracking refresh without success");
    }
    Ok(result)
}
