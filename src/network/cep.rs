//! ViaCEP postal code lookup, called directly (not through the backend)

use crate::error::{ApiError, ApiResult};
use crate::models::{normalize_cep, CepLookup};
use crate::network::client::ApiClient;

/// Look up an address by CEP. `Ok` with `not_found` set means ViaCEP
/// answered but has no such code.
pub async fn lookup_cep(api: &ApiClient, cep: &str) -> ApiResult<CepLookup> {
    let cep = normalize_cep(cep)
        .ok_or_else(|| ApiError::InvalidInput(String::from("CEP must have 8 digits")))?;
    let lookup: CepLookup = api
        .get_external(&api.cep_url(&cep))
        .await
        .inspect_err(|e| tracing::error!(cep = %cep, error = %e, "CEP lookup failed"))?;
    if lookup.not_found {
        tracing::warn!(cep = %cep, "CEP not found");
    }
    Ok(lookup)
}
