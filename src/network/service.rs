//! Service seam over every backend operation.
//!
//! Workflow and payment code is written against [`CrmApi`] so it can run
//! against the real [`ApiClient`] or a scripted double in tests.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{
    CepLookup, Client, FreightQuote, PixCharge, PrintResult, Product, Purchase, PurchasePayload,
    PurchaseStatus, QuoteRequest, TrackingRefresh, WalletBalance,
};
use crate::network::client::ApiClient;
use crate::network::{carrier, cep, clients, freight, products, purchases};

#[async_trait]
pub trait CrmApi: Send + Sync {
    // Clients
    async fn list_clients(&self) -> ApiResult<Vec<Client>>;
    async fn get_client(&self, id: u64) -> ApiResult<Client>;
    async fn create_client(&self, client: &Client) -> ApiResult<Client>;
    async fn update_client(&self, id: u64, client: &Client) -> ApiResult<Client>;
    async fn deactivate_client(&self, id: u64) -> ApiResult<()>;

    // Purchases
    async fn list_purchases(&self) -> ApiResult<Vec<Purchase>>;
    async fn get_purchase(&self, id: u64) -> ApiResult<Purchase>;
    async fn create_purchase(&self, payload: &PurchasePayload) -> ApiResult<Purchase>;
    async fn update_purchase(&self, id: u64, payload: &PurchasePayload) -> ApiResult<Purchase>;
    async fn update_status(&self, id: u64, status: PurchaseStatus) -> ApiResult<Purchase>;

    // Catalog and freight
    async fn list_products(&self) -> ApiResult<Vec<Product>>;
    async fn quote_freight(&self, request: &QuoteRequest) -> ApiResult<FreightQuote>;
    async fn lookup_cep(&self, cep: &str) -> ApiResult<CepLookup>;

    // Melhor Envio
    async fn wallet_balance(&self) -> ApiResult<WalletBalance>;
    async fn pix_charge(&self) -> ApiResult<PixCharge>;
    async fn buy_labels(&self) -> ApiResult<()>;
    async fn generate_labels(&self, label_codes: &[String]) -> ApiResult<()>;
    async fn print_labels(&self, label_codes: &[String]) -> ApiResult<PrintResult>;
    async fn refresh_tracking(&self) -> ApiResult<TrackingRefresh>;
}

#[async_trait]
impl CrmApi for ApiClient {
    async fn list_clients(&self) -> ApiResult<Vec<Client>> {
        clients::list_clients(self).await
    }

    async fn get_client(&self, id: u64) -> ApiResult<Client> {
        clients::get_client(self, id).await
    }

    async fn create_client(&self, client: &Client) -> ApiResult<Client> {
        clients::create_client(self, client).await
    }

    async fn update_client(&self, id: u64, client: &Client) -> ApiResult<Client> {
        clients::update_client(self, id, client).await
    }

    async fn deactivate_client(&self, id: u64) -> ApiResult<()> {
        clients::deactivate_client(self, id).await.map(|_| ())
    }

    async fn list_purchases(&self) -> ApiResult<Vec<Purchase>> {
        purchases::list_purchases(self).await
    }

    async fn get_purchase(&self, id: u64) -> ApiResult<Purchase> {
        purchases::get_purchase(self, id).await
    }

    async fn create_purchase(&self, payload: &PurchasePayload) -> ApiResult<Purchase> {
        purchases::create_purchase(self, payload).await
    }

    async fn update_purchase(&self, id: u64, payload: &PurchasePayload) -> ApiResult<Purchase> {
        purchases::update_purchase(self, id, payload).await
    }

    async fn update_status(&self, id: u64, status: PurchaseStatus) -> ApiResult<Purchase> {
        purchases::update_status(self, id, status).await
    }

    async fn list_products(&self) -> ApiResult<Vec<Product>> {
        products::list_products(self).await
    }

    async fn quote_freight(&self, request: &QuoteRequest) -> ApiResult<FreightQuote> {
        freight::quote_freight(self, request).await
    }

    async fn lookup_cep(&self, cep: &str) -> ApiResult<CepLookup> {
        cep::lookup_cep(self, cep).await
    }

    async fn wallet_balance(&self) -> ApiResult<WalletBalance> {
        carrier::wallet_balance(self).await
    }

    async fn pix_charge(&self) -> ApiResult<PixCharge> {
        carrier::pix_charge(self).await
    }

    async fn buy_labels(&self) -> ApiResult<()> {
        carrier::buy_labels(self).await.map(|_| ())
    }

    async fn generate_labels(&self, label_codes: &[String]) -> ApiResult<()> {
        carrier::generate_labels(self, label_codes).await.map(|_| ())
    }

    async fn print_labels(&self, label_codes: &[String]) -> ApiResult<PrintResult> {
        carrier::print_labels(self, label_codes).await
    }

    async fn refresh_tracking(&self) -> ApiResult<TrackingRefresh> {
        carrier::refresh_tracking(self).await
    }
}
