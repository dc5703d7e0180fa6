//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            network_tx,
            render_tx,
        }
    }

    fn send(&self, cmd: Option<NetworkCommand>) {
        if let Some(cmd) = cmd {
            let _ = self.network_tx.send(cmd);
        }
    }

    fn send_all(&self, cmds: Vec<NetworkCommand>) {
        for cmd in cmds {
            let _ = self.network_tx.send(cmd);
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        let initial = self.state.initial_commands();
        self.send_all(initial);

        // Send initial render state
        let _ = self.render_tx.send(self.state.to_render_state());

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    let follow_up = self.state.handle_response(response);
                    self.send_all(follow_up);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        match event {
            // Tab switching
            UiEvent::SwitchTab(tab) => self.state.switch_tab(tab),
            UiEvent::NextTab => self.state.next_tab(),

            UiEvent::Up => self.state.move_up(),
            UiEvent::Down => self.state.move_down(),

            // Input editing
            UiEvent::StartEditing => self.state.start_editing(),
            UiEvent::StopEditing => self.state.stop_editing(),
            UiEvent::CharInput(c) => self.state.enter_char(c),
            UiEvent::Backspace => self.state.delete_char(),
            UiEvent::CursorLeft => self.state.move_cursor_left(),
            UiEvent::CursorRight => self.state.move_cursor_right(),
            UiEvent::NextField => {
                let cmd = self.state.next_field(true);
                self.send(cmd);
            }
            UiEvent::PrevField => {
                let cmd = self.state.next_field(false);
                self.send(cmd);
            }

            // Purchases
            UiEvent::CycleStatusFilter => self.state.cycle_status_filter(),
            UiEvent::ToggleSelect => self.state.toggle_select(),
            UiEvent::ToggleSelectAll => self.state.toggle_select_all(),
            UiEvent::ToggleExpand => self.state.toggle_expand(),
            UiEvent::MarkPaid => {
                let cmd = self.state.mark_paid();
                self.send(cmd);
            }
            UiEvent::RequestCancel => self.state.request_cancel(),
            UiEvent::GenerateLabel => {
                let cmd = self.state.generate_label();
                self.send(cmd);
            }
            UiEvent::GenerateLabels => {
                let cmd = self.state.generate_labels();
                self.send(cmd);
            }
            UiEvent::PrintLabels => {
                let cmd = self.state.print_labels();
                self.send(cmd);
            }
            UiEvent::StartPayment => {
                let cmd = self.state.start_payment();
                self.send(cmd);
            }
            UiEvent::StopPayment => {
                let cmd = self.state.stop_payment();
                self.send(cmd);
            }
            UiEvent::RefreshTracking => {
                let cmd = self.state.refresh_tracking();
                self.send(cmd);
            }
            UiEvent::EditPurchase => self.state.edit_purchase(),
            UiEvent::Reload => {
                let cmds = self.state.reload();
                self.send_all(cmds);
            }

            // Clients
            UiEvent::CycleActiveFilter => self.state.cycle_active_filter(),
            UiEvent::NewClient => self.state.new_client(),
            UiEvent::EditClient => self.state.edit_client(),
            UiEvent::RequestDeactivate => self.state.request_deactivate(),
            UiEvent::NewPurchase => self.state.new_purchase(),

            // Forms
            UiEvent::Submit => {
                let cmd = match self.state.popup {
                    Some(crate::app::state::Popup::ClientForm) => self.state.submit_client(),
                    Some(crate::app::state::Popup::PurchaseDraft) => self.state.submit_draft(),
                    _ => None,
                };
                self.send(cmd);
            }
            UiEvent::DraftAdd => self.state.draft_add(),
            UiEvent::DraftRemove => self.state.draft_remove(),
            UiEvent::DraftQuote => {
                let cmd = self.state.draft_quote();
                self.send(cmd);
            }
            UiEvent::DraftNextOption => self.state.draft_next_option(),

            // Freight
            UiEvent::QuoteFreight => {
                let cmd = self.state.quote_freight();
                self.send(cmd);
            }

            // Settings
            UiEvent::CycleTheme => self.state.cycle_theme(),
            UiEvent::SaveSettings => self.state.save_settings(),

            // Popups
            UiEvent::Confirm => {
                let cmd = self.state.confirm();
                self.send(cmd);
            }
            UiEvent::Dismiss => self.state.dismiss(),
            UiEvent::ToggleHelp => self.state.toggle_help(),

            // System
            UiEvent::Quit => return true,
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::testing::purchase;

    #[tokio::test]
    async fn test_startup_loads_everything_and_quit_shuts_network_down() {
        let dir = tempfile::tempdir().unwrap();
        let (net_tx, mut net_rx) = mpsc::unbounded_channel();
        let (render_tx, mut render_rx) = mpsc::unbounded_channel();
        let (ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (_resp_tx, resp_rx) = mpsc::unbounded_channel();

        let actor = AppActor::new(AppState::new(Storage::at(dir.path())), net_tx, render_tx);
        let handle = tokio::spawn(actor.run(ui_rx, resp_rx));

        ui_tx.send(UiEvent::Quit).unwrap();
        handle.await.unwrap();

        let mut sent = Vec::new();
        while let Ok(cmd) = net_rx.try_recv() {
            sent.push(cmd);
        }
        assert_eq!(
            sent,
            vec![
                NetworkCommand::LoadPurchases,
                NetworkCommand::LoadClients,
                NetworkCommand::LoadProducts,
                NetworkCommand::LoadBalance,
                NetworkCommand::Shutdown,
            ]
        );
        assert!(render_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_response_is_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let (net_tx, _net_rx) = mpsc::unbounded_channel();
        let (render_tx, mut render_rx) = mpsc::unbounded_channel();
        let (_ui_tx, ui_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = mpsc::unbounded_channel();

        let actor = AppActor::new(AppState::new(Storage::at(dir.path())), net_tx, render_tx);
        tokio::spawn(actor.run(ui_rx, resp_rx));

        resp_tx
            .send(NetworkResponse::PurchasesLoaded(vec![purchase(1, "Pago", None, None)]))
            .unwrap();

        let _initial = render_rx.recv().await.unwrap();
        let state = render_rx.recv().await.unwrap();
        assert_eq!(state.purchases.len(), 1);
        assert_eq!(state.purchase_total, 1);
        assert!(!state.loading_purchases);
    }
}
