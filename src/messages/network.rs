//! Network messages - communication between App and Network layers

use crate::models::{
    CepLookup, Client, FreightQuote, Product, Purchase, PurchasePayload, QuoteRequest,
    WalletBalance,
};
use crate::payment::{PaymentEvent, PaymentOutcome};
use crate::workflow::LabelPlan;

/// Where a freight quote result should land
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuoteTarget {
    Calculator,
    Draft,
}

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCommand {
    LoadPurchases,
    LoadClients,
    LoadProducts,
    LoadBalance,

    // Purchase status workflow
    MarkPaid(Purchase),
    Cancel(Purchase),
    GenerateLabel(Purchase),
    GenerateLabels(LabelPlan),
    PrintLabels(LabelPlan),
    RefreshTracking,

    /// Pay the label cart, issuing a PIX and waiting if the balance is short
    StartPayment { label_codes: Vec<String> },
    /// Stop waiting for a PIX payment
    StopPayment,

    // Clients
    SaveClient(Client),
    DeactivateClient(u64),
    LookupCep(String),

    // Purchases and freight
    QuoteFreight { request: QuoteRequest, target: QuoteTarget },
    CreatePurchase(PurchasePayload),
    UpdatePurchase { id: u64, payload: PurchasePayload },

    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    PurchasesLoaded(Vec<Purchase>),
    ClientsLoaded(Vec<Client>),
    ProductsLoaded(Vec<Product>),
    BalanceLoaded(WalletBalance),

    /// A status change (or edit) came back from the backend
    PurchaseUpdated { purchase: Purchase, message: String },
    /// Status moved but the carrier has no label code for it yet
    LabelCodeMissing { purchase: Purchase },
    LabelsGenerated { count: usize },
    LabelsPrinted { url: String },
    PurchaseCreated(Purchase),

    ClientSaved { client: Client, created: bool },
    ClientDeactivated(u64),
    CepLooked(CepLookup),
    /// ViaCEP answered `erro: true`
    CepNotFound(String),

    FreightQuoted { quote: FreightQuote, target: QuoteTarget },

    Payment(PaymentEvent),
    PaymentFinished(PaymentOutcome),
    /// The payment task stopped on a backend error
    PaymentFailed(String),

    /// Something the operator should know that did not fail
    Warning(String),
    Error {
        message: String,
        /// Purchase whose pending action failed, if any
        purchase_id: Option<u64>,
    },
}

impl NetworkResponse {
    pub fn error(message: impl Into<String>) -> Self {
        NetworkResponse::Error {
            message: message.into(),
            purchase_id: None,
        }
    }

    /// Purchase id this response settles, if it settles one
    pub fn purchase_id(&self) -> Option<u64> {
        match self {
            NetworkResponse::PurchaseUpdated { purchase, .. } => Some(purchase.id),
            NetworkResponse::LabelCodeMissing { purchase } => Some(purchase.id),
            NetworkResponse::Error { purchase_id, .. } => *purchase_id,
            _ => None,
        }
    }
}
