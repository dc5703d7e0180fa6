//! App state - pure data structure with no network I/O

use std::collections::HashSet;

use crate::draft::PurchaseDraft;
use crate::filter::{ClientFilter, PurchaseFilter};
use crate::messages::ui_events::{AppTab, InputMode};
use crate::messages::RenderState;
use crate::models::{Address, Client, FreightQuote, PixCharge, Product, WalletBalance};
use crate::storage::Storage;
use crate::store::PurchaseStore;

/// Single-line text input with a byte cursor
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextField {
    pub value: String,
    pub cursor: usize,
}

impl TextField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        TextField {
            cursor: value.len(),
            value,
        }
    }

    pub fn insert(&mut self, c: char) {
        if self.cursor <= self.value.len() {
            self.value.insert(self.cursor, c);
            self.cursor += c.len_utf8();
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.value[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.value.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.value[..self.cursor]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn right(&mut self) {
        if self.cursor < self.value.len() {
            self.cursor = self.value[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.value.len());
        }
    }

    pub fn set(&mut self, value: impl Into<String>) {
        *self = TextField::new(value);
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
}

/// Popups drawn over the active tab
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Popup {
    Help,
    ConfirmCancel(u64),
    ConfirmDeactivate(u64),
    ClientForm,
    PurchaseDraft,
}

/// Fields of the client form, in tab order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientField {
    Name,
    Email,
    Phone,
    Document,
    Cep,
    Street,
    Number,
    Complement,
    Neighborhood,
    City,
    State,
}

impl ClientField {
    pub const ALL: [ClientField; 11] = [
        ClientField::Name,
        ClientField::Email,
        ClientField::Phone,
        ClientField::Document,
        ClientField::Cep,
        ClientField::Street,
        ClientField::Number,
        ClientField::Complement,
        ClientField::Neighborhood,
        ClientField::City,
        ClientField::State,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ClientField::Name => "Nome",
            ClientField::Email => "Email",
            ClientField::Phone => "Telefone",
            ClientField::Document => "CPF",
            ClientField::Cep => "CEP",
            ClientField::Street => "Logradouro",
            ClientField::Number => "Número",
            ClientField::Complement => "Complemento",
            ClientField::Neighborhood => "Bairro",
            ClientField::City => "Cidade",
            ClientField::State => "UF",
        }
    }

    fn index(&self) -> usize {
        ClientField::ALL
            .iter()
            .position(|f| f == self)
            .unwrap_or(0)
    }

    pub fn next(&self) -> ClientField {
        ClientField::ALL[(self.index() + 1) % ClientField::ALL.len()]
    }

    pub fn prev(&self) -> ClientField {
        let len = ClientField::ALL.len();
        ClientField::ALL[(self.index() + len - 1) % len]
    }
}

/// Client being created or edited
#[derive(Clone, Debug, PartialEq)]
pub struct ClientForm {
    /// Record the form started from; keeps ids and the active flag
    pub original: Client,
    pub fields: Vec<TextField>,
    pub focus: ClientField,
    pub looking_up_cep: bool,
}

impl ClientForm {
    pub fn new(client: Client) -> Self {
        let a = &client.address;
        let values = [
            client.name.as_str(),
            client.email.as_str(),
            client.phone.as_str(),
            client.document.as_str(),
            a.cep.as_str(),
            a.street.as_str(),
            a.number.as_str(),
            a.complement.as_str(),
            a.neighborhood.as_str(),
            a.city.as_str(),
            a.state.as_str(),
        ];
        let fields = values.into_iter().map(TextField::new).collect();
        ClientForm {
            original: client,
            fields,
            focus: ClientField::Name,
            looking_up_cep: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.original.id.is_none()
    }

    pub fn field(&self, field: ClientField) -> &TextField {
        &self.fields[field.index()]
    }

    pub fn field_mut(&mut self, field: ClientField) -> &mut TextField {
        &mut self.fields[field.index()]
    }

    pub fn value(&self, field: ClientField) -> String {
        self.field(field).value.trim().to_string()
    }

    pub fn focused_mut(&mut self) -> &mut TextField {
        let focus = self.focus;
        self.field_mut(focus)
    }

    pub fn to_client(&self) -> Client {
        Client {
            id: self.original.id,
            name: self.value(ClientField::Name),
            email: self.value(ClientField::Email),
            phone: self.value(ClientField::Phone),
            document: self.value(ClientField::Document),
            active: self.original.active,
            address: Address {
                cep: self.value(ClientField::Cep),
                street: self.value(ClientField::Street),
                number: self.value(ClientField::Number),
                complement: self.value(ClientField::Complement),
                neighborhood: self.value(ClientField::Neighborhood),
                city: self.value(ClientField::City),
                state: self.value(ClientField::State),
                ..self.original.address.clone()
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FreightField {
    #[default]
    Cep,
    Items,
}

/// Standalone freight calculator
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FreightForm {
    pub cep: TextField,
    pub items: TextField,
    pub focus: FreightField,
    pub result: Option<FreightQuote>,
    pub loading: bool,
}

impl FreightForm {
    pub fn focused_mut(&mut self) -> &mut TextField {
        match self.focus {
            FreightField::Cep => &mut self.cep,
            FreightField::Items => &mut self.items,
        }
    }
}

/// PIX payment progress shown on the purchases tab
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaymentView {
    pub active: bool,
    pub pix: Option<PixCharge>,
    pub attempts: u32,
    pub last_error: Option<String>,
}

/// Main application state
pub struct AppState {
    pub active_tab: AppTab,
    pub input_mode: InputMode,
    pub popup: Option<Popup>,
    pub status: Option<StatusMessage>,

    // Purchases
    pub store: PurchaseStore,
    pub purchase_filter: PurchaseFilter,
    pub search: TextField,
    pub purchase_cursor: usize,
    pub selected: HashSet<u64>,
    pub expanded: Option<u64>,
    /// Purchases waiting for a status response
    pub pending: HashSet<u64>,
    pub loading_purchases: bool,
    pub last_print_url: Option<String>,

    // Carrier wallet
    pub wallet: Option<WalletBalance>,
    pub payment: PaymentView,

    // Clients
    pub clients: Vec<Client>,
    pub client_filter: ClientFilter,
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
    pub storage: Storage,
    pub settings_url: TextField,
}

impl AppState {
    pub fn new(storage: Storage) -> Self {
        let settings_url = TextField::new(storage.settings.api_base_url.clone());
        AppState {
            active_tab: AppTab::Purchases,
            input_mode: InputMode::Normal,
            popup: None,
            status: None,
            store: PurchaseStore::new(),
            purchase_filter: PurchaseFilter::default(),
            search: TextField::default(),
            purchase_cursor: 0,
            selected: HashSet::new(),
            expanded: None,
            pending: HashSet::new(),
            loading_purchases: false,
            last_print_url: None,
            wallet: None,
            payment: PaymentView::default(),
            clients: Vec::new(),
            client_filter: ClientFilter::default(),
            client_search: TextField::default(),
            client_cursor: 0,
            client_form: None,
            products: Vec::new(),
            product_cursor: 0,
            draft: None,
            draft_line_cursor: 0,
            freight: FreightForm::default(),
            storage,
            settings_url,
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        let text = text.into();
        match kind {
            StatusKind::Error => tracing::warn!(message = %text, "Status error"),
            _ => tracing::debug!(message = %text, "Status"),
        }
        self.status = Some(StatusMessage { text, kind });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Info, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Success, text);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.set_status(StatusKind::Error, text);
    }

    /// Ids of the purchases shown with the current filter
    pub fn visible_purchase_ids(&self) -> Vec<u64> {
        self.store
            .filtered(&self.purchase_filter)
            .iter()
            .map(|p| p.id)
            .collect()
    }

    pub fn current_purchase_id(&self) -> Option<u64> {
        self.visible_purchase_ids().get(self.purchase_cursor).copied()
    }

    pub fn visible_clients(&self) -> Vec<&Client> {
        self.client_filter.apply(&self.clients)
    }

    pub fn current_client(&self) -> Option<&Client> {
        self.visible_clients().get(self.client_cursor).copied()
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let purchases = self
            .store
            .filtered(&self.purchase_filter)
            .into_iter()
            .cloned()
            .collect();
        let clients = self.visible_clients().into_iter().cloned().collect();
        let counts = self
            .store
            .counts()
            .into_iter()
            .map(|(status, n)| (status.to_string(), n))
            .collect();

        RenderState {
            active_tab: self.active_tab,
            input_mode: self.input_mode,
            popup: self.popup,
            status: self.status.clone(),
            purchases,
            purchase_total: self.store.len(),
            purchase_counts: counts,
            purchase_filter_label: self.purchase_filter.status.label().to_string(),
            search: self.search.clone(),
            purchase_cursor: self.purchase_cursor,
            selected: self.selected.clone(),
            expanded: self.expanded,
            pending: self.pending.clone(),
            loading_purchases: self.loading_purchases,
            loaded_at: self.store.loaded_at(),
            last_print_url: self.last_print_url.clone(),
            wallet: self.wallet.clone(),
            payment: self.payment.clone(),
            clients,
            client_stats: crate::filter::client_stats(&self.clients, &self.client_filter),
            client_filter_label: self.client_filter.active.label(),
            client_search: self.client_search.clone(),
            client_cursor: self.client_cursor,
            client_form: self.client_form.clone(),
            products: self.products.clone(),
            product_cursor: self.product_cursor,
            draft: self.draft.clone(),
            draft_line_cursor: self.draft_line_cursor,
            freight: self.freight.clone(),
            settings_url: self.settings_url.clone(),
            theme: self.storage.settings.theme,
            config_dir: self.storage.config_dir().display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_editing_handles_multibyte() {
        let mut field = TextField::new("São");
        field.backspace();
        assert_eq!(field.as_str(), "Sã");
        field.left();
        field.insert('x');
        assert_eq!(field.as_str(), "Sxã");
        field.right();
        field.insert('o');
        assert_eq!(field.as_str(), "Sxão");
    }

    #[test]
    fn test_client_field_cycles() {
        assert_eq!(ClientField::Name.next(), ClientField::Email);
        assert_eq!(ClientField::State.next(), ClientField::Name);
        assert_eq!(ClientField::Name.prev(), ClientField::State);
    }

    #[test]
    fn test_client_form_round_trips_client() {
        let client = Client {
            id: Some(3),
            name: "Ana".into(),
            active: false,
            address: Address {
                id: Some(8),
                cep: "55190052".into(),
                city: "Recife".into(),
                ..Address::default()
            },
            ..Client::default()
        };
        let mut form = ClientForm::new(client.clone());
        form.field_mut(ClientField::Name).set(" Ana Lima ");

        let edited = form.to_client();
        assert_eq!(edited.name, "Ana Lima");
        assert_eq!(edited.id, Some(3));
        assert!(!edited.active);
        assert_eq!(edited.address.id, Some(8));
        assert_eq!(edited.address.city, "Recife");
    }
}
