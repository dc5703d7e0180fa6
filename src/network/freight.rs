//! Freight quote endpoint (`/frete/calcular`)

use crate::error::{ApiError, ApiResult};
use crate::models::{normalize_cep, FreightQuote, QuoteRequest};
use crate::network::client::ApiClient;

/// Quote freight options; the CEP is normalized and items validated first
pub async fn quote_freight(api: &ApiClient, request: &QuoteRequest) -> ApiResult<FreightQuote> {
    let request = validate_quote(request)?;
    tracing::info!(cep = %request.destination_cep, items = request.items.len(), "Quoting freight");
    api.post("/frete/calcular", &request)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to quote freight"))
}

pub fn validate_quote(request: &QuoteRequest) -> ApiResult<QuoteRequest> {
    let cep = normalize_cep(&request.destination_cep).ok_or_else(|| {
        ApiError::InvalidInput(String::from(
            "Destination CEP must have 8 digits",
        ))
    })?;
    if request.items.is_empty() {
        return Err(ApiError::InvalidInput(String::from("Add at least one item to quote")));
    }
    if request.items.iter().any(|item| item.quantity == 0) {
        return Err(ApiError::InvalidInput(String::from("Item quantities must be positive")));
    }
    Ok(QuoteRequest {
        destination_cep: cep,
        items: request.items.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuoteItem;

    fn item(product_id: u64, quantity: u32) -> QuoteItem {
        QuoteItem { product_id, quantity }
    }

    #[test]
    fn test_validate_quote_normalizes_cep() {
        let req = QuoteRequest {
            destination_cep: "55190-052".into(),
            items: vec![item(1, 2)],
        };
        assert_eq!(validate_quote(&req).unwrap().destination_cep, "55190052");
    }

    #[test]
    fn test_validate_quote_rejects_bad_input() {
        let short_cep = QuoteRequest { destination_cep: "5519".into(), items: vec![item(1, 1)] };
        let no_items = QuoteRequest { destination_cep: "55190052".into(), items: vec![] };
        let zero_qty = QuoteRequest { destination_cep: "55190052".into(), items: vec![item(1, 0)] };
        assert!(matches!(validate_quote(&short_cep), Err(ApiError::InvalidInput(_))));
        assert!(matches!(validate_quote(&no_items), Err(ApiError::InvalidInput(_))));
        assert!(matches!(validate_quote(&zero_qty), Err(ApiError::InvalidInput(_))));
    }
}
