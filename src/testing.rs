//! Test doubles shared by the unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    CepLookup, Client, ClientSummary, FreightQuote, PixCharge, PrintResult, Product, Purchase,
    PurchaseFreight, PurchasePayload, PurchaseStatus, QuoteRequest, TrackingRefresh, WalletBalance,
};
use crate::network::service::CrmApi;

/// Build a purchase with an optional (name, cpf) client and label code
pub fn purchase(id: u64, status: &str, client: Option<(&str, &str)>, label: Option<&str>) -> Purchase {
    Purchase {
        id,
        client_id: Some(id * 10),
        client: client.map(|(name, document)| ClientSummary {
            id: Some(id * 10),
            name: name.to_string(),
            document: document.to_string(),
        }),
        purchased_at: None,
        items: Vec::new(),
        total: 100.0,
        status: PurchaseStatus::from(status),
        freight: label.map(|code| PurchaseFreight {
            label_code: Some(code.to_string()),
            ..PurchaseFreight::default()
        }),
    }
}

pub fn wallet(balance: f64, cart_total: f64) -> WalletBalance {
    WalletBalance { balance, cart_total }
}

/// Calls recorded by [`MockApi`]
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    ListClients,
    DeactivateClient(u64),
    ListPurchases,
    UpdateStatus(u64, PurchaseStatus),
    CreatePurchase(u64),
    ListProducts,
    QuoteFreight(String),
    LookupCep(String),
    WalletBalance,
    PixCharge,
    BuyLabels,
    GenerateLabels(Vec<String>),
    PrintLabels(Vec<String>),
    RefreshTracking,
    Other(&'static str),
}

/// Scripted backend. Balance answers are consumed in order; the last one
/// repeats once the script runs out.
#[derive(Default)]
pub struct MockApi {
    pub purchases: Mutex<Vec<Purchase>>,
    balances: Mutex<VecDeque<Result<WalletBalance, String>>>,
    last_balance: Mutex<WalletBalance>,
    fail_status_updates: Mutex<bool>,
    calls: Mutex<Vec<Call>>,
}

impl MockApi {
    pub fn with_purchases(purchases: Vec<Purchase>) -> Self {
        let api = MockApi::default();
        *api.purchases.lock().unwrap() = purchases;
        api
    }

    pub fn script_balances(&self, script: Vec<Result<WalletBalance, String>>) {
        *self.balances.lock().unwrap() = script.into();
    }

    pub fn fail_status_updates(&self) {
        *self.fail_status_updates.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CrmApi for MockApi {
    async fn list_clients(&self) -> ApiResult<Vec<Client>> {
        self.record(Call::ListClients);
        Ok(Vec::new())
    }

    async fn get_client(&self, _id: u64) -> ApiResult<Client> {
        self.record(Call::Other("get_client"));
        Ok(Client::default())
    }

    async fn create_client(&self, client: &Client) -> ApiResult<Client> {
        self.record(Call::Other("create_client"));
        Ok(Client { id: Some(99), ..client.clone() })
    }

    async fn update_client(&self, id: u64, client: &Client) -> ApiResult<Client> {
        self.record(Call::Other("update_client"));
        Ok(Client { id: Some(id), ..client.clone() })
    }

    async fn deactivate_client(&self, id: u64) -> ApiResult<()> {
        self.record(Call::DeactivateClient(id));
        Ok(())
    }

    async fn list_purchases(&self) -> ApiResult<Vec<Purchase>> {
        self.record(Call::ListPurchases);
        Ok(self.purchases.lock().unwrap().clone())
    }

    async fn get_purchase(&self, id: u64) -> ApiResult<Purchase> {
        self.record(Call::Other("get_purchase"));
        self.purchases
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(ApiError::Status { status: 404, body: "not found".into() })
    }

    async fn create_purchase(&self, payload: &PurchasePayload) -> ApiResult<Purchase> {
        self.record(Call::CreatePurchase(payload.client_id));
        let mut created = purchase(500, "Pendente", None, None);
        created.client_id = Some(payload.client_id);
        created.total = payload.total;
        Ok(created)
    }

    async fn update_purchase(&self, id: u64, _payload: &PurchasePayload) -> ApiResult<Purchase> {
        self.record(Call::Other("update_purchase"));
        self.get_purchase(id).await
    }

    async fn update_status(&self, id: u64, status: PurchaseStatus) -> ApiResult<Purchase> {
        self.record(Call::UpdateStatus(id, status.clone()));
        if *self.fail_status_updates.lock().unwrap() {
            return Err(ApiError::Status { status: 500, body: "boom".into() });
        }
        let mut purchases = self.purchases.lock().unwrap();
        let target = purchases
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ApiError::Status { status: 404, body: "not found".into() })?;
        target.status = status;
        Ok(target.clone())
    }

    async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.record(Call::ListProducts);
        Ok(Vec::new())
    }

    async fn quote_freight(&self, request: &QuoteRequest) -> ApiResult<FreightQuote> {
        self.record(Call::QuoteFreight(request.destination_cep.clone()));
        Ok(FreightQuote::default())
    }

    async fn lookup_cep(&self, cep: &str) -> ApiResult<CepLookup> {
        self.record(Call::LookupCep(cep.to_string()));
        Ok(CepLookup::default())
    }

    async fn wallet_balance(&self) -> ApiResult<WalletBalance> {
        self.record(Call::WalletBalance);
        let next = self.balances.lock().unwrap().pop_front();
        match next {
            Some(Ok(balance)) => {
                *self.last_balance.lock().unwrap() = balance.clone();
                Ok(balance)
            }
            Some(Err(message)) => Err(ApiError::Transport(message)),
            None => Ok(self.last_balance.lock().unwrap().clone()),
        }
    }

    async fn pix_charge(&self) -> ApiResult<PixCharge> {
        self.record(Call::PixCharge);
        Ok(PixCharge {
            amount: 50.0,
            qr_code_url: "https://example.test/qr.png".into(),
            copy_paste_code: "00020126PIX".into(),
        })
    }

    async fn buy_labels(&self) -> ApiResult<()> {
        self.record(Call::BuyLabels);
        Ok(())
    }

    async fn generate_labels(&self, label_codes: &[String]) -> ApiResult<()> {
        self.record(Call::GenerateLabels(label_codes.to_vec()));
        Ok(())
    }

    async fn print_labels(&self, label_codes: &[String]) -> ApiResult<PrintResult> {
        self.record(Call::PrintLabels(label_codes.to_vec()));
        Ok(PrintResult { url: "https://example.test/labels.pdf".into() })
    }

    async fn refresh_tracking(&self) -> ApiResult<TrackingRefresh> {
        self.record(Call::RefreshTracking);
        Ok(TrackingRefresh { success: true })
    }
}
