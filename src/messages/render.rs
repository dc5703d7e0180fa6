//! Render state - data structure sent from App layer to UI for rendering

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::app::state::{ClientForm, FreightForm, PaymentView, Popup, StatusMessage, TextField};
use crate::draft::PurchaseDraft;
use crate::filter::ClientStats;
use crate::messages::ui_events::{AppTab, InputMode};
use crate::models::{Client, Product, Purchase, WalletBalance};
use crate::storage::Theme;

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub active_tab: AppTab,
    pub input_mode: InputMode,
    pub popup: Option<Popup>,
    pub status: Option<StatusMessage>,

    // Purchases (already filtered)
    pub purchases: Vec<Purchase>,
    pub purchase_total: usize,
    pub purchase_counts: Vec<(String, usize)>,
    pub purchase_filter_label: String,
    pub search: TextField,
    pub purchase_cursor: usize,
    pub selected: HashSet<u64>,
    pub expanded: Option<u64>,
    pub pending: HashSet<u64>,
    pub loading_purchases: bool,
    pub loaded_at: Option<DateTime<Utc>>,
    pub last_print_url: Option<String>,

    // Wallet and PIX
    pub wallet: Option<WalletBalance>,
    pub payment: PaymentView,

    // Clients (already filtered)
    pub clients: Vec<Client>,
    pub client_stats: ClientStats,
    pub client_filter_label: &'static str,
    pub client_search: TextField,
    pub client_cursor: usize,
    pub client_form: Option<ClientForm>,

    // Products and drafts
    pub products: Vec<Product>,
    pub product_cursor: usize,
    pub draft: Option<PurchaseDraft>,
    pub draft_line_cursor: usize,

    pub freight: FreightForm,

    // Settings
    pub settings_url: TextField,
    pub theme: Theme,
    pub config_dir: String,
}
