//! Command handlers - business logic for processing UI events and responses

use crate::app::state::{AppState, ClientField, ClientForm, FreightField, PaymentView, Popup};
use crate::constants::APP_NAME;
use crate::draft::{parse_quote_items, PurchaseDraft};
use crate::messages::network::QuoteTarget;
use crate::messages::ui_events::{AppTab, InputMode};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{normalize_cep, Client, PurchaseStatus, QuoteRequest};
use crate::payment::{PaymentEvent, PaymentOutcome};
use crate::workflow::{plan_label_generation, plan_label_printing};

impl AppState {
    /// Requests issued once at startup
    pub fn initial_commands(&mut self) -> Vec<NetworkCommand> {
        self.loading_purchases = true;
        self.info(format!("{} connecting to {}", APP_NAME, self.storage.api_base_url()));
        vec![
            NetworkCommand::LoadPurchases,
            NetworkCommand::LoadClients,
            NetworkCommand::LoadProducts,
            NetworkCommand::LoadBalance,
        ]
    }

    // ========================
    // Navigation
    // ========================

    pub fn switch_tab(&mut self, tab: AppTab) {
        self.active_tab = tab;
        self.input_mode = InputMode::Normal;
    }

    pub fn next_tab(&mut self) {
        self.switch_tab(self.active_tab.next());
    }

    pub fn move_up(&mut self) {
        if self.popup == Some(Popup::PurchaseDraft) {
            self.product_cursor = self.product_cursor.saturating_sub(1);
            return;
        }
        match self.active_tab {
            AppTab::Purchases => self.purchase_cursor = self.purchase_cursor.saturating_sub(1),
            AppTab::Clients => self.client_cursor = self.client_cursor.saturating_sub(1),
            AppTab::Products => self.product_cursor = self.product_cursor.saturating_sub(1),
            _ => {}
        }
    }

    pub fn move_down(&mut self) {
        if self.popup == Some(Popup::PurchaseDraft) {
            self.product_cursor = step_down(self.product_cursor, self.products.len());
            return;
        }
        match self.active_tab {
            AppTab::Purchases => {
                let len = self.visible_purchase_ids().len();
                self.purchase_cursor = step_down(self.purchase_cursor, len);
            }
            AppTab::Clients => {
                let len = self.visible_clients().len();
                self.client_cursor = step_down(self.client_cursor, len);
            }
            AppTab::Products => {
                self.product_cursor = step_down(self.product_cursor, self.products.len());
            }
            _ => {}
        }
    }

    fn clamp_cursors(&mut self) {
        let purchases = self.visible_purchase_ids().len();
        self.purchase_cursor = self.purchase_cursor.min(purchases.saturating_sub(1));
        let clients = self.visible_clients().len();
        self.client_cursor = self.client_cursor.min(clients.saturating_sub(1));
        self.product_cursor = self.product_cursor.min(self.products.len().saturating_sub(1));
    }

    // ========================
    // Input editing
    // ========================

    pub fn start_editing(&mut self) {
        self.input_mode = InputMode::Editing;
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn enter_char(&mut self, c: char) {
        if self.popup == Some(Popup::ClientForm) {
            if let Some(form) = self.client_form.as_mut() {
                form.focused_mut().insert(c);
            }
            return;
        }
        match self.active_tab {
            AppTab::Purchases => {
                self.search.insert(c);
                self.sync_search();
            }
            AppTab::Clients => {
                self.client_search.insert(c);
                self.sync_search();
            }
            AppTab::Freight => self.freight.focused_mut().insert(c),
            AppTab::Settings => self.settings_url.insert(c),
            AppTab::Products => {}
        }
    }

    pub fn delete_char(&mut self) {
        if self.popup == Some(Popup::ClientForm) {
            if let Some(form) = self.client_form.as_mut() {
                form.focused_mut().backspace();
            }
            return;
        }
        match self.active_tab {
            AppTab::Purchases => {
                self.search.backspace();
                self.sync_search();
            }
            AppTab::Clients => {
                self.client_search.backspace();
                self.sync_search();
            }
            AppTab::Freight => self.freight.focused_mut().backspace(),
            AppTab::Settings => self.settings_url.backspace(),
            AppTab::Products => {}
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(field) = self.focused_field() {
            field.left();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(field) = self.focused_field() {
            field.right();
        }
    }

    fn focused_field(&mut self) -> Option<&mut crate::app::state::TextField> {
        if self.popup == Some(Popup::ClientForm) {
            return self.client_form.as_mut().map(ClientForm::focused_mut);
        }
        match self.active_tab {
            AppTab::Purchases => Some(&mut self.search),
            AppTab::Clients => Some(&mut self.client_search),
            AppTab::Freight => Some(self.freight.focused_mut()),
            AppTab::Settings => Some(&mut self.settings_url),
            AppTab::Products => None,
        }
    }

    fn sync_search(&mut self) {
        self.purchase_filter.query = self.search.value.clone();
        self.client_filter.query = self.client_search.value.clone();
        self.clamp_cursors();
    }

    /// Tab / Shift+Tab inside forms. Leaving the CEP field triggers a lookup.
    pub fn next_field(&mut self, forward: bool) -> Option<NetworkCommand> {
        if self.popup == Some(Popup::ClientForm) {
            let form = self.client_form.as_mut()?;
            let leaving = form.focus;
            form.focus = if forward { leaving.next() } else { leaving.prev() };
            if leaving == ClientField::Cep {
                return self.commit_cep();
            }
            return None;
        }
        if self.active_tab == AppTab::Freight {
            self.freight.focus = match self.freight.focus {
                FreightField::Cep => FreightField::Items,
                FreightField::Items => FreightField::Cep,
            };
        }
        None
    }

    // ========================
    // Purchases
    // ========================

    pub fn cycle_status_filter(&mut self) {
        self.purchase_filter.status = self.purchase_filter.status.next();
        self.purchase_cursor = 0;
        self.info(format!("Filter: {}", self.purchase_filter.status.label()));
    }

    pub fn toggle_select(&mut self) {
        if let Some(id) = self.current_purchase_id() {
            if !self.selected.remove(&id) {
                self.selected.insert(id);
            }
        }
    }

    /// Select every visible purchase, or clear them if all are already selected
    pub fn toggle_select_all(&mut self) {
        let visible = self.visible_purchase_ids();
        if visible.iter().all(|id| self.selected.contains(id)) {
            for id in &visible {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(visible);
        }
    }

    pub fn toggle_expand(&mut self) {
        let current = self.current_purchase_id();
        self.expanded = if self.expanded == current { None } else { current };
    }

    /// Current purchase, unless it already has a status request in flight
    fn actionable_purchase(&mut self) -> Option<crate::models::Purchase> {
        let id = self.current_purchase_id()?;
        if self.pending.contains(&id) {
            self.warn(format!("Purchase #{} is still being updated", id));
            return None;
        }
        self.store.get(id).cloned()
    }

    pub fn mark_paid(&mut self) -> Option<NetworkCommand> {
        let purchase = self.actionable_purchase()?;
        self.pending.insert(purchase.id);
        self.info(format!("Marking purchase #{} as paid...", purchase.id));
        Some(NetworkCommand::MarkPaid(purchase))
    }

    pub fn request_cancel(&mut self) {
        if let Some(purchase) = self.actionable_purchase() {
            if purchase.status.is_terminal() {
                self.warn(format!("Purchase #{} is already {}", purchase.id, purchase.status));
            } else {
                self.popup = Some(Popup::ConfirmCancel(purchase.id));
            }
        }
    }

    pub fn generate_label(&mut self) -> Option<NetworkCommand> {
        let purchase = self.actionable_purchase()?;
        self.pending.insert(purchase.id);
        self.info(format!("Requesting label for purchase #{}...", purchase.id));
        Some(NetworkCommand::GenerateLabel(purchase))
    }

    pub fn generate_labels(&mut self) -> Option<NetworkCommand> {
        match plan_label_generation(self.store.all(), &self.selected) {
            Ok(plan) => {
                self.info(format!("Generating {} label(s)...", plan.label_codes.len()));
                Some(NetworkCommand::GenerateLabels(plan))
            }
            Err(e) => {
                self.warn(e.to_string());
                None
            }
        }
    }

    pub fn print_labels(&mut self) -> Option<NetworkCommand> {
        match plan_label_printing(self.store.all(), &self.selected) {
            Ok(plan) => {
                self.info(format!("Requesting print of {} label(s)...", plan.label_codes.len()));
                Some(NetworkCommand::PrintLabels(plan))
            }
            Err(e) => {
                self.warn(e.to_string());
                None
            }
        }
    }

    /// Pay the label cart. The eligible selection is generated after
    /// funding; with nothing selected the whole cart is.
    pub fn start_payment(&mut self) -> Option<NetworkCommand> {
        if self.payment.active {
            self.warn("Already waiting for a PIX payment");
            return None;
        }
        let label_codes = plan_label_generation(self.store.all(), &self.selected)
            .map(|plan| plan.label_codes)
            .unwrap_or_default();
        self.payment = PaymentView {
            active: true,
            ..PaymentView::default()
        };
        self.info("Checking wallet balance...");
        Some(NetworkCommand::StartPayment { label_codes })
    }

    pub fn stop_payment(&mut self) -> Option<NetworkCommand> {
        if !self.payment.active {
            return None;
        }
        self.info("Stopping PIX wait...");
        Some(NetworkCommand::StopPayment)
    }

    pub fn refresh_tracking(&mut self) -> Option<NetworkCommand> {
        self.loading_purchases = true;
        self.info("Refreshing tracking codes...");
        Some(NetworkCommand::RefreshTracking)
    }

    pub fn edit_purchase(&mut self) {
        let Some(purchase) = self.actionable_purchase() else {
            return;
        };
        let cep = purchase
            .client_id
            .and_then(|id| self.clients.iter().find(|c| c.id == Some(id)))
            .map(|c| c.address.cep.clone())
            .unwrap_or_default();
        match PurchaseDraft::from_purchase(&purchase, cep) {
            Some(draft) => {
                self.draft = Some(draft);
                self.popup = Some(Popup::PurchaseDraft);
            }
            None => self.warn(format!("Purchase #{} has no client to edit against", purchase.id)),
        }
    }

    pub fn reload(&mut self) -> Vec<NetworkCommand> {
        match self.active_tab {
            AppTab::Clients => vec![NetworkCommand::LoadClients],
            AppTab::Products => vec![NetworkCommand::LoadProducts],
            _ => {
                self.loading_purchases = true;
                vec![NetworkCommand::LoadPurchases, NetworkCommand::LoadBalance]
            }
        }
    }

    // ========================
    // Clients
    // ========================

    pub fn cycle_active_filter(&mut self) {
        self.client_filter.active = self.client_filter.active.next();
        self.client_cursor = 0;
    }

    pub fn new_client(&mut self) {
        self.client_form = Some(ClientForm::new(Client::default()));
        self.popup = Some(Popup::ClientForm);
    }

    pub fn edit_client(&mut self) {
        if let Some(client) = self.current_client().cloned() {
            self.client_form = Some(ClientForm::new(client));
            self.popup = Some(Popup::ClientForm);
        }
    }

    pub fn request_deactivate(&mut self) {
        if let Some(id) = self.current_client().and_then(|c| c.id) {
            self.popup = Some(Popup::ConfirmDeactivate(id));
        }
    }

    /// Look up the form's CEP when it has exactly 8 digits
    fn commit_cep(&mut self) -> Option<NetworkCommand> {
        let form = self.client_form.as_mut()?;
        let raw = form.value(ClientField::Cep);
        if raw.is_empty() {
            return None;
        }
        match normalize_cep(&raw) {
            Some(cep) => {
                form.field_mut(ClientField::Cep).set(cep.clone());
                form.looking_up_cep = true;
                Some(NetworkCommand::LookupCep(cep))
            }
            None => {
                self.warn("CEP must have 8 digits");
                None
            }
        }
    }

    pub fn submit_client(&mut self) -> Option<NetworkCommand> {
        let form = self.client_form.as_ref()?;
        if form.focus == ClientField::Cep {
            return self.commit_cep();
        }
        let client = form.to_client();
        if client.name.is_empty() {
            self.warn("Client name is required");
            return None;
        }
        self.info(format!("Saving {}...", client.name));
        Some(NetworkCommand::SaveClient(client))
    }

    /// Open a draft for the client under the cursor
    pub fn new_purchase(&mut self) {
        let Some(client) = self.current_client().cloned() else {
            return;
        };
        let Some(id) = client.id else {
            return;
        };
        let mut draft = PurchaseDraft::new(id, client.name.clone(), client.address.cep.clone());
        draft.shipping_address_id = client.address.id;
        self.draft = Some(draft);
        self.draft_line_cursor = 0;
        self.popup = Some(Popup::PurchaseDraft);
    }

    // ========================
    // Purchase draft
    // ========================

    pub fn draft_add(&mut self) {
        let Some(product) = self.products.get(self.product_cursor).cloned() else {
            self.warn("No products loaded");
            return;
        };
        if let Some(draft) = self.draft.as_mut() {
            draft.add(&product);
        }
    }

    pub fn draft_remove(&mut self) {
        let Some(product_id) = self.products.get(self.product_cursor).map(|p| p.id) else {
            return;
        };
        if let Some(draft) = self.draft.as_mut() {
            draft.remove(product_id);
        }
    }

    pub fn draft_quote(&mut self) -> Option<NetworkCommand> {
        let draft = self.draft.as_ref()?;
        if draft.lines.is_empty() {
            self.warn("Add products before quoting freight");
            return None;
        }
        if normalize_cep(&draft.cep).is_none() {
            self.warn("Client has no valid CEP for a freight quote");
            return None;
        }
        let request = draft.quote_request();
        self.info("Quoting freight...");
        Some(NetworkCommand::QuoteFreight {
            request,
            target: QuoteTarget::Draft,
        })
    }

    pub fn draft_next_option(&mut self) {
        if let Some(draft) = self.draft.as_mut() {
            draft.next_option();
        }
    }

    pub fn submit_draft(&mut self) -> Option<NetworkCommand> {
        let draft = self.draft.as_ref()?;
        let editing = draft.editing;
        match draft.payload() {
            Ok(payload) => {
                self.info("Saving purchase...");
                Some(match editing {
                    Some(id) => NetworkCommand::UpdatePurchase { id, payload },
                    None => NetworkCommand::CreatePurchase(payload),
                })
            }
            Err(message) => {
                self.warn(message);
                None
            }
        }
    }

    // ========================
    // Freight calculator
    // ========================

    pub fn quote_freight(&mut self) -> Option<NetworkCommand> {
        self.input_mode = InputMode::Normal;
        let Some(cep) = normalize_cep(self.freight.cep.as_str()) else {
            self.warn("Destination CEP must have 8 digits");
            return None;
        };
        let items = match parse_quote_items(self.freight.items.as_str()) {
            Ok(items) => items,
            Err(message) => {
                self.warn(message);
                return None;
            }
        };
        self.freight.loading = true;
        self.freight.result = None;
        Some(NetworkCommand::QuoteFreight {
            request: QuoteRequest {
                destination_cep: cep,
                items,
            },
            target: QuoteTarget::Calculator,
        })
    }

    // ========================
    // Settings
    // ========================

    pub fn cycle_theme(&mut self) {
        self.storage.settings.theme = self.storage.settings.theme.next();
    }

    pub fn save_settings(&mut self) {
        self.input_mode = InputMode::Normal;
        let url = self.settings_url.as_str().trim().to_string();
        if url.is_empty() {
            self.warn("API URL cannot be empty");
            return;
        }
        self.storage.settings.api_base_url = url;
        match self.storage.save() {
            Ok(()) => self.success("Settings saved; the API URL applies on next start"),
            Err(e) => self.error(format!("Could not save settings: {}", e)),
        }
    }

    // ========================
    // Popups
    // ========================

    pub fn toggle_help(&mut self) {
        self.popup = match self.popup {
            Some(Popup::Help) => None,
            None => Some(Popup::Help),
            other => other,
        };
    }

    pub fn confirm(&mut self) -> Option<NetworkCommand> {
        match self.popup.take()? {
            Popup::ConfirmCancel(id) => {
                if self.pending.contains(&id) {
                    return None;
                }
                let purchase = self.store.get(id)?.clone();
                self.pending.insert(id);
                self.info(format!("Cancelling purchase #{}...", id));
                Some(NetworkCommand::Cancel(purchase))
            }
            Popup::ConfirmDeactivate(id) => Some(NetworkCommand::DeactivateClient(id)),
            other => {
                self.popup = Some(other);
                None
            }
        }
    }

    pub fn dismiss(&mut self) {
        match self.popup.take() {
            Some(Popup::ClientForm) => self.client_form = None,
            Some(Popup::PurchaseDraft) => self.draft = None,
            _ => {}
        }
    }

    // ========================
    // Network responses
    // ========================

    /// Apply a response; returns follow-up requests
    pub fn handle_response(&mut self, response: NetworkResponse) -> Vec<NetworkCommand> {
        if let Some(id) = response.purchase_id() {
            self.pending.remove(&id);
        }

        match response {
            NetworkResponse::PurchasesLoaded(list) => {
                self.store.replace_all(list);
                self.store.retain_known(&mut self.selected);
                if let Some(id) = self.expanded {
                    if self.store.get(id).is_none() {
                        self.expanded = None;
                    }
                }
                self.loading_purchases = false;
                self.clamp_cursors();
            }
            NetworkResponse::ClientsLoaded(list) => {
                self.clients = list;
                self.clamp_cursors();
            }
            NetworkResponse::ProductsLoaded(list) => {
                self.products = list;
                self.clamp_cursors();
            }
            NetworkResponse::BalanceLoaded(wallet) => self.wallet = Some(wallet),

            NetworkResponse::PurchaseUpdated { purchase, message } => {
                if self.draft.as_ref().and_then(|d| d.editing) == Some(purchase.id) {
                    self.draft = None;
                    self.popup = None;
                }
                let newly_paid = purchase.status == PurchaseStatus::Pago
                    && self.store.get(purchase.id).map(|p| &p.status) != Some(&PurchaseStatus::Pago);
                self.store.upsert(purchase);
                self.success(message);
                if newly_paid {
                    return vec![NetworkCommand::LoadBalance];
                }
            }
            NetworkResponse::LabelCodeMissing { purchase } => {
                let id = purchase.id;
                self.store.upsert(purchase);
                self.warn(format!(
                    "Purchase #{} is waiting for a label but has no label code yet",
                    id
                ));
            }
            NetworkResponse::LabelsGenerated { count } => {
                self.success(format!("{} label(s) sent for generation", count));
                return vec![NetworkCommand::LoadPurchases];
            }
            NetworkResponse::LabelsPrinted { url } => {
                self.success(format!("Labels ready: {}", url));
                self.last_print_url = Some(url);
            }
            NetworkResponse::PurchaseCreated(purchase) => {
                let id = purchase.id;
                self.store.upsert(purchase);
                self.draft = None;
                self.popup = None;
                self.success(format!("Purchase #{} created", id));
            }

            NetworkResponse::ClientSaved { client, created } => {
                let name = client.name.clone();
                match self.clients.iter_mut().find(|c| c.id.is_some() && c.id == client.id) {
                    Some(existing) => *existing = client,
                    None => self.clients.push(client),
                }
                self.client_form = None;
                self.popup = None;
                if created {
                    self.success(format!("{} created; press c to start a purchase", name));
                } else {
                    self.success(format!("{} updated", name));
                }
            }
            NetworkResponse::ClientDeactivated(id) => {
                if let Some(client) = self.clients.iter_mut().find(|c| c.id == Some(id)) {
                    client.active = !client.active;
                }
                self.success(format!("Client #{} status changed", id));
                self.clamp_cursors();
                return vec![NetworkCommand::LoadClients];
            }
            NetworkResponse::CepLooked(lookup) => {
                if let Some(form) = self.client_form.as_mut() {
                    form.looking_up_cep = false;
                    let mut address = form.to_client().address;
                    lookup.apply_to(&mut address);
                    form.field_mut(ClientField::Street).set(address.street);
                    form.field_mut(ClientField::Neighborhood).set(address.neighborhood);
                    form.field_mut(ClientField::City).set(address.city);
                    form.field_mut(ClientField::State).set(address.state);
                    form.focus = ClientField::Number;
                }
            }
            NetworkResponse::CepNotFound(cep) => {
                if let Some(form) = self.client_form.as_mut() {
                    form.looking_up_cep = false;
                    for field in [
                        ClientField::Street,
                        ClientField::Neighborhood,
                        ClientField::City,
                        ClientField::State,
                    ] {
                        form.field_mut(field).set("");
                    }
                }
                self.warn(format!("CEP {} not found", cep));
            }

            NetworkResponse::FreightQuoted { quote, target } => match target {
                QuoteTarget::Calculator => {
                    self.freight.loading = false;
                    self.success(format!("{} freight option(s)", quote.options.len()));
                    self.freight.result = Some(quote);
                }
                QuoteTarget::Draft => {
                    if quote.options.is_empty() {
                        self.warn("No freight options for this client");
                    }
                    if let Some(draft) = self.draft.as_mut() {
                        draft.set_quote(quote);
                    }
                }
            },

            NetworkResponse::Payment(event) => self.apply_payment_event(event),
            NetworkResponse::PaymentFinished(outcome) => return self.finish_payment(outcome),
            NetworkResponse::PaymentFailed(message) => {
                self.payment.active = false;
                self.error(format!("Payment failed: {}", message));
            }

            NetworkResponse::Warning(message) => {
                self.freight.loading = false;
                self.warn(message);
            }
            NetworkResponse::Error { message, .. } => {
                self.loading_purchases = false;
                self.freight.loading = false;
                if let Some(form) = self.client_form.as_mut() {
                    form.looking_up_cep = false;
                }
                self.error(message);
            }
        }
        Vec::new()
    }

    fn apply_payment_event(&mut self, event: PaymentEvent) {
        match event {
            PaymentEvent::Balance(wallet) => self.wallet = Some(wallet),
            PaymentEvent::PixIssued(pix) => {
                self.info(format!(
                    "PIX of {} issued; waiting for the balance (Esc stops)",
                    crate::ui::format_brl(pix.amount)
                ));
                self.payment.pix = Some(pix);
            }
            PaymentEvent::Tick { attempt, wallet } => {
                self.payment.attempts = attempt;
                self.payment.last_error = None;
                self.wallet = Some(wallet);
            }
            PaymentEvent::TickFailed { attempt, message } => {
                self.payment.attempts = attempt;
                self.payment.last_error = Some(message);
            }
            PaymentEvent::Settling => self.info("Balance covers the cart; buying labels..."),
        }
    }

    fn finish_payment(&mut self, outcome: PaymentOutcome) -> Vec<NetworkCommand> {
        self.payment.active = false;
        match outcome {
            PaymentOutcome::NothingToPay => {
                self.info("Label cart is empty");
                Vec::new()
            }
            PaymentOutcome::Funded { .. } => {
                self.payment.pix = None;
                self.success("Labels bought and sent for generation");
                self.loading_purchases = true;
                vec![NetworkCommand::LoadPurchases, NetworkCommand::LoadBalance]
            }
            PaymentOutcome::Cancelled { attempts } => {
                self.payment.pix = None;
                self.info(format!("Stopped waiting for PIX after {} check(s)", attempts));
                Vec::new()
            }
            PaymentOutcome::Exhausted { attempts } => {
                self.warn(format!(
                    "PIX not detected after {} checks; press $ to check again",
                    attempts
                ));
                Vec::new()
            }
        }
    }
}

fn step_down(cursor: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (cursor + 1).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CepLookup, PurchaseStatus};
    use crate::storage::Storage;
    use crate::testing::{purchase, wallet};
    use tempfile::TempDir;

    fn state() -> (AppState, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new(Storage::at(dir.path()));
        state.handle_response(NetworkResponse::PurchasesLoaded(vec![
            purchase(3, "Pago", Some(("Ana", "111")), Some("ME3")),
            purchase(2, "Pendente", Some(("Bia", "222")), None),
            purchase(1, "Etiqueta PDF Gerada", Some(("Caio", "333")), Some("ME1")),
        ]));
        (state, dir)
    }

    #[test]
    fn test_pending_purchase_refuses_second_action() {
        let (mut state, _dir) = state();
        state.purchase_cursor = 1;

        assert!(matches!(state.mark_paid(), Some(NetworkCommand::MarkPaid(p)) if p.id == 2));
        assert!(state.mark_paid().is_none());
        assert!(state.generate_label().is_none());

        state.handle_response(NetworkResponse::PurchaseUpdated {
            purchase: purchase(2, "Pago", None, None),
            message: "ok".into(),
        });
        assert!(state.pending.is_empty());
        assert_eq!(state.store.get(2).unwrap().status, PurchaseStatus::Pago);
    }

    #[test]
    fn test_failed_update_clears_pending() {
        let (mut state, _dir) = state();
        state.purchase_cursor = 1;
        state.mark_paid();
        state.handle_response(NetworkResponse::Error {
            message: "boom".into(),
            purchase_id: Some(2),
        });
        assert!(state.pending.is_empty());
        assert_eq!(state.status.as_ref().unwrap().text, "boom");
    }

    #[test]
    fn test_cancel_needs_confirmation() {
        let (mut state, _dir) = state();
        state.request_cancel();
        assert_eq!(state.popup, Some(Popup::ConfirmCancel(3)));

        state.dismiss();
        assert!(state.popup.is_none());
        assert!(state.pending.is_empty());

        state.request_cancel();
        assert!(matches!(state.confirm(), Some(NetworkCommand::Cancel(p)) if p.id == 3));
        assert!(state.pending.contains(&3));
    }

    #[test]
    fn test_batch_without_eligible_selection_sends_nothing() {
        let (mut state, _dir) = state();
        state.selected.insert(2);
        assert!(state.generate_labels().is_none());
        assert!(state.print_labels().is_none());

        state.selected.insert(1);
        match state.print_labels() {
            Some(NetworkCommand::PrintLabels(plan)) => assert_eq!(plan.label_codes, vec!["ME1"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_search_filters_and_clamps_cursor() {
        let (mut state, _dir) = state();
        state.purchase_cursor = 2;
        state.switch_tab(AppTab::Purchases);
        state.start_editing();
        for c in "bia".chars() {
            state.enter_char(c);
        }
        assert_eq!(state.visible_purchase_ids(), vec![2]);
        assert_eq!(state.purchase_cursor, 0);
    }

    #[test]
    fn test_reload_drops_vanished_selection() {
        let (mut state, _dir) = state();
        state.selected.extend([1, 3]);
        state.handle_response(NetworkResponse::PurchasesLoaded(vec![purchase(3, "Pago", None, None)]));
        assert_eq!(state.selected.len(), 1);
        assert!(state.selected.contains(&3));
    }

    #[test]
    fn test_payment_lifecycle_refreshes_after_funding() {
        let (mut state, _dir) = state();
        state.selected.insert(3);

        match state.start_payment() {
            Some(NetworkCommand::StartPayment { label_codes }) => assert_eq!(label_codes, vec!["ME3"]),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(state.start_payment().is_none());

        state.handle_response(NetworkResponse::Payment(PaymentEvent::Tick {
            attempt: 2,
            wallet: wallet(10.0, 50.0),
        }));
        assert_eq!(state.payment.attempts, 2);

        let follow_up = state.handle_response(NetworkResponse::PaymentFinished(PaymentOutcome::Funded {
            attempts: 3,
        }));
        assert!(!state.payment.active);
        assert!(follow_up.contains(&NetworkCommand::LoadPurchases));
        assert!(follow_up.contains(&NetworkCommand::LoadBalance));
    }

    #[test]
    fn test_marking_paid_refreshes_balance() {
        let (mut state, _dir) = state();
        state.purchase_cursor = 1;
        state.mark_paid();

        let follow_up = state.handle_response(NetworkResponse::PurchaseUpdated {
            purchase: purchase(2, "Pago", None, None),
            message: "Purchase #2 marked as paid".into(),
        });
        assert_eq!(follow_up, vec![NetworkCommand::LoadBalance]);

        let follow_up = state.handle_response(NetworkResponse::PurchaseUpdated {
            purchase: purchase(3, "Cancelado", None, None),
            message: "Purchase #3 cancelled".into(),
        });
        assert!(follow_up.is_empty());
    }

    #[test]
    fn test_bare_status_reply_keeps_label_and_client() {
        let (mut state, _dir) = state();
        state.handle_response(NetworkResponse::PurchaseUpdated {
            purchase: purchase(3, "Aguardando Etiqueta", None, None),
            message: "ok".into(),
        });

        let stored = state.store.get(3).unwrap();
        assert_eq!(stored.status, PurchaseStatus::AguardandoEtiqueta);
        assert_eq!(stored.client_name(), Some("Ana"));
        assert_eq!(stored.label_code(), Some("ME3"));

        state.selected.insert(3);
        match state.generate_labels() {
            Some(NetworkCommand::GenerateLabels(plan)) => assert_eq!(plan.label_codes, vec!["ME3"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_stop_payment_only_when_active() {
        let (mut state, _dir) = state();
        assert!(state.stop_payment().is_none());
        state.start_payment();
        assert!(matches!(state.stop_payment(), Some(NetworkCommand::StopPayment)));
    }

    #[test]
    fn test_cep_lookup_fills_and_not_found_clears() {
        let (mut state, _dir) = state();
        state.new_client();
        let form = state.client_form.as_mut().unwrap();
        form.focus = ClientField::Cep;
        for c in "55190-052".chars() {
            form.focused_mut().insert(c);
        }

        assert!(matches!(state.next_field(true), Some(NetworkCommand::LookupCep(cep)) if cep == "55190052"));

        state.handle_response(NetworkResponse::CepLooked(CepLookup {
            cep: "55190-052".into(),
            street: "Rua A".into(),
            neighborhood: "Centro".into(),
            city: "Santa Cruz do Capibaribe".into(),
            state: "PE".into(),
            not_found: false,
        }));
        let form = state.client_form.as_ref().unwrap();
        assert_eq!(form.value(ClientField::City), "Santa Cruz do Capibaribe");
        assert_eq!(form.focus, ClientField::Number);

        state.handle_response(NetworkResponse::CepNotFound("55190052".into()));
        let form = state.client_form.as_ref().unwrap();
        assert_eq!(form.value(ClientField::City), "");
        assert_eq!(form.value(ClientField::Street), "");
    }

    #[test]
    fn test_submit_client_requires_name() {
        let (mut state, _dir) = state();
        state.new_client();
        assert!(state.submit_client().is_none());

        let form = state.client_form.as_mut().unwrap();
        form.field_mut(ClientField::Name).set("Dora");
        assert!(matches!(state.submit_client(), Some(NetworkCommand::SaveClient(c)) if c.name == "Dora"));

        state.handle_response(NetworkResponse::ClientSaved {
            client: Client {
                id: Some(40),
                name: "Dora".into(),
                ..Client::default()
            },
            created: true,
        });
        assert!(state.popup.is_none());
        assert_eq!(state.clients.len(), 1);
    }

    #[test]
    fn test_freight_calculator_validates_before_sending() {
        let (mut state, _dir) = state();
        state.freight.cep.set("5519");
        state.freight.items.set("1:2");
        assert!(state.quote_freight().is_none());

        state.freight.cep.set("55190-052");
        match state.quote_freight() {
            Some(NetworkCommand::QuoteFreight { request, target }) => {
                assert_eq!(request.destination_cep, "55190052");
                assert_eq!(request.items.len(), 1);
                assert_eq!(target, QuoteTarget::Calculator);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_save_settings_persists() {
        let (mut state, dir) = state();
        state.settings_url.set("http://192.168.0.10:3000");
        state.cycle_theme();
        state.save_settings();

        let reloaded = Storage::at(dir.path());
        assert_eq!(reloaded.settings.api_base_url, "http://192.168.0.10:3000");
        assert_eq!(reloaded.settings.theme, crate::storage::Theme::PinkLight);
    }
}
