//! Network actor - runs backend calls in the Tokio async runtime

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::messages::network::QuoteTarget;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::Client;
use crate::network::freight::validate_quote;
use crate::network::service::CrmApi;
use crate::payment::{run_payment, PaymentError, PollConfig};
use crate::workflow::{self, LabelOutcome};

/// Network actor that turns commands into backend calls
pub struct NetworkActor {
    api: Arc<dyn CrmApi>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
    poll_config: PollConfig,
    /// Cancel handle of the running PIX wait, if any
    payment_cancel: Option<oneshot::Sender<()>>,
}

impl NetworkActor {
    pub fn new(api: Arc<dyn CrmApi>, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            api,
            response_tx,
            active_requests: JoinSet::new(),
            poll_config: PollConfig::default(),
            payment_cancel: None,
        }
    }

    pub fn with_poll_config(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    /// The payment task drops its receiver when it ends
    fn payment_running(&self) -> bool {
        self.payment_cancel
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Spawn a request task with its own handle to the API and response channel
    fn spawn<F, Fut>(&mut self, task: F)
    where
        F: FnOnce(Arc<dyn CrmApi>, mpsc::UnboundedSender<NetworkResponse>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let fut = task(self.api.clone(), self.response_tx.clone());
        self.active_requests.spawn(fut);
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Shutdown) | None => {
                            if let Some(cancel) = self.payment_cancel.take() {
                                let _ = cancel.send(());
                            }
                            break;
                        }
                        Some(cmd) => self.handle(cmd),
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }

    fn handle(&mut self, cmd: NetworkCommand) {
        match cmd {
            NetworkCommand::LoadPurchases => self.spawn(|api, tx| async move {
                tracing::info!("Loading purchases");
                let response = match api.list_purchases().await {
                    Ok(list) => NetworkResponse::PurchasesLoaded(list),
                    Err(e) => NetworkResponse::error(format!("Could not load purchases: {}", e)),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::LoadClients => self.spawn(|api, tx| async move {
                let response = match api.list_clients().await {
                    Ok(list) => NetworkResponse::ClientsLoaded(list),
                    Err(e) => NetworkResponse::error(format!("Could not load clients: {}", e)),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::LoadProducts => self.spawn(|api, tx| async move {
                let response = match api.list_products().await {
                    Ok(list) => NetworkResponse::ProductsLoaded(list),
                    Err(e) => NetworkResponse::error(format!("Could not load products: {}", e)),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::LoadBalance => self.spawn(|api, tx| async move {
                let response = match api.wallet_balance().await {
                    Ok(wallet) => NetworkResponse::BalanceLoaded(wallet),
                    Err(e) => NetworkResponse::error(format!("Could not load wallet balance: {}", e)),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::MarkPaid(purchase) => self.spawn(|api, tx| async move {
                let response = match workflow::mark_as_paid(api.as_ref(), &purchase).await {
                    Ok(updated) => NetworkResponse::PurchaseUpdated {
                        message: format!("Purchase #{} marked as paid", updated.id),
                        purchase: updated,
                    },
                    Err(e) => NetworkResponse::Error {
                        message: e.to_string(),
                        purchase_id: Some(purchase.id),
                    },
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::Cancel(purchase) => self.spawn(|api, tx| async move {
                let response = match workflow::cancel(api.as_ref(), &purchase).await {
                    Ok(updated) => NetworkResponse::PurchaseUpdated {
                        message: format!("Purchase #{} cancelled", updated.id),
                        purchase: updated,
                    },
                    Err(e) => NetworkResponse::Error {
                        message: e.to_string(),
                        purchase_id: Some(purchase.id),
                    },
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::GenerateLabel(purchase) => self.spawn(|api, tx| async move {
                let response = match workflow::generate_label_for_one(api.as_ref(), &purchase).await {
                    Ok(LabelOutcome::Generated { purchase, label_code }) => {
                        NetworkResponse::PurchaseUpdated {
                            message: format!("Label {} requested for purchase #{}", label_code, purchase.id),
                            purchase,
                        }
                    }
                    Ok(LabelOutcome::MissingLabelCode { purchase }) => {
                        NetworkResponse::LabelCodeMissing { purchase }
                    }
                    Err(e) => NetworkResponse::Error {
                        message: e.to_string(),
                        purchase_id: Some(purchase.id),
                    },
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::GenerateLabels(plan) => self.spawn(|api, tx| async move {
                let response = match workflow::generate_labels_batch(api.as_ref(), &plan).await {
                    Ok(()) => NetworkResponse::LabelsGenerated {
                        count: plan.label_codes.len(),
                    },
                    Err(e) => NetworkResponse::error(e.to_string()),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::PrintLabels(plan) => self.spawn(|api, tx| async move {
                let response = match workflow::print_labels_batch(api.as_ref(), &plan).await {
                    Ok(result) => NetworkResponse::LabelsPrinted { url: result.url },
                    Err(e) => NetworkResponse::error(e.to_string()),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::RefreshTracking => self.spawn(|api, tx| async move {
                let response = match workflow::refresh_tracking(api.as_ref()).await {
                    Ok(list) => NetworkResponse::PurchasesLoaded(list),
                    Err(e) => NetworkResponse::error(format!("Tracking refresh failed: {}", e)),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::StartPayment { label_codes } => self.start_payment(label_codes),

            NetworkCommand::StopPayment => {
                if let Some(cancel) = self.payment_cancel.take() {
                    tracing::info!("Stopping PIX wait");
                    let _ = cancel.send(());
                }
            }

            NetworkCommand::SaveClient(client) => self.spawn(|api, tx| async move {
                let result = match client.id {
                    Some(id) => api.update_client(id, &client).await.map(|c| (c, false)),
                    None => api.create_client(&client).await.map(|c| (c, true)),
                };
                let response = match result {
                    Ok((saved, created)) => NetworkResponse::ClientSaved {
                        client: merge_saved(saved, &client),
                        created,
                    },
                    Err(e) => NetworkResponse::error(format!("Could not save client: {}", e)),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::DeactivateClient(id) => self.spawn(|api, tx| async move {
                let response = match api.deactivate_client(id).await {
                    Ok(()) => NetworkResponse::ClientDeactivated(id),
                    Err(e) => NetworkResponse::error(format!("Could not deactivate client #{}: {}", id, e)),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::LookupCep(cep) => self.spawn(|api, tx| async move {
                let response = match api.lookup_cep(&cep).await {
                    Ok(lookup) if lookup.not_found => NetworkResponse::CepNotFound(cep),
                    Ok(lookup) => NetworkResponse::CepLooked(lookup),
                    Err(e) => NetworkResponse::error(format!("CEP lookup failed: {}", e)),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::QuoteFreight { request, target } => self.spawn(|api, tx| async move {
                if let Err(e) = validate_quote(&request) {
                    let _ = tx.send(NetworkResponse::error(e.to_string()));
                    return;
                }
                let response = match api.quote_freight(&request).await {
                    Ok(quote) if quote.options.is_empty() && target == QuoteTarget::Calculator => {
                        NetworkResponse::Warning(String::from("No freight options for this destination"))
                    }
                    Ok(quote) => NetworkResponse::FreightQuoted { quote, target },
                    Err(e) => NetworkResponse::error(format!("Freight quote failed: {}", e)),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::CreatePurchase(payload) => self.spawn(|api, tx| async move {
                let response = match api.create_purchase(&payload).await {
                    Ok(purchase) => NetworkResponse::PurchaseCreated(purchase),
                    Err(e) => NetworkResponse::error(format!("Could not create purchase: {}", e)),
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::UpdatePurchase { id, payload } => self.spawn(|api, tx| async move {
                let response = match api.update_purchase(id, &payload).await {
                    Ok(purchase) => NetworkResponse::PurchaseUpdated {
                        message: format!("Purchase #{} updated", purchase.id),
                        purchase,
                    },
                    Err(e) => NetworkResponse::Error {
                        message: format!("Could not update purchase #{}: {}", id, e),
                        purchase_id: Some(id),
                    },
                };
                let _ = tx.send(response);
            }),

            NetworkCommand::Shutdown => {}
        }
    }

    fn start_payment(&mut self, label_codes: Vec<String>) {
        if self.payment_running() {
            let _ = self
                .response_tx
                .send(NetworkResponse::error(PaymentError::AlreadyRunning.to_string()));
            return;
        }

        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.payment_cancel = Some(cancel_tx);
        let config = self.poll_config.clone();

        self.spawn(|api, tx| async move {
            let (event_tx, mut event_rx) = mpsc::unbounded_channel();
            let forward_tx = tx.clone();
            let forwarder = tokio::spawn(async move {
                while let Some(event) = event_rx.recv().await {
                    let _ = forward_tx.send(NetworkResponse::Payment(event));
                }
            });

            let result = run_payment(api.as_ref(), &config, &label_codes, &event_tx, cancel_rx).await;
            drop(event_tx);
            let _ = forwarder.await;

            let response = match result {
                Ok(outcome) => NetworkResponse::PaymentFinished(outcome),
                Err(e) => NetworkResponse::PaymentFailed(e.to_string()),
            };
            let _ = tx.send(response);
        });
    }
}

/// Some backends answer a save with a bare `{id}`; keep the submitted fields
fn merge_saved(saved: Client, submitted: &Client) -> Client {
    if saved.name.is_empty() {
        Client {
            id: saved.id.or(submitted.id),
            ..submitted.clone()
        }
    } else {
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::{PaymentEvent, PaymentOutcome};
    use crate::testing::{purchase, wallet, Call, MockApi};
    use std::time::Duration;

    fn start(api: Arc<MockApi>) -> (
        mpsc::UnboundedSender<NetworkCommand>,
        mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = mpsc::unbounded_channel();
        let actor = NetworkActor::new(api, resp_tx).with_poll_config(PollConfig {
            interval: Duration::from_secs(5),
            max_attempts: 10,
        });
        tokio::spawn(actor.run(cmd_rx));
        (cmd_tx, resp_rx)
    }

    #[tokio::test]
    async fn test_mark_paid_returns_updated_purchase() {
        let api = Arc::new(MockApi::with_purchases(vec![purchase(4, "Pendente", None, None)]));
        let (cmd_tx, mut resp_rx) = start(api.clone());

        cmd_tx
            .send(NetworkCommand::MarkPaid(purchase(4, "Pendente", None, None)))
            .unwrap();

        match resp_rx.recv().await.unwrap() {
            NetworkResponse::PurchaseUpdated { purchase, .. } => {
                assert_eq!(purchase.id, 4);
                assert_eq!(purchase.status, crate::models::PurchaseStatus::Pago);
            }
            other => panic!("unexpected response: {:?}", other),
        }
        let _ = cmd_tx.send(NetworkCommand::Shutdown);
    }

    #[tokio::test]
    async fn test_failed_status_update_reports_purchase_id() {
        let api = Arc::new(MockApi::with_purchases(vec![purchase(4, "Pendente", None, None)]));
        api.fail_status_updates();
        let (cmd_tx, mut resp_rx) = start(api.clone());

        cmd_tx
            .send(NetworkCommand::Cancel(purchase(4, "Pendente", None, None)))
            .unwrap();

        let response = resp_rx.recv().await.unwrap();
        assert!(matches!(response, NetworkResponse::Error { .. }));
        assert_eq!(response.purchase_id(), Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_payment_is_refused_while_first_waits() {
        let api = Arc::new(MockApi::default());
        api.script_balances(vec![Ok(wallet(0.0, 30.0))]);
        let (cmd_tx, mut resp_rx) = start(api.clone());

        cmd_tx.send(NetworkCommand::StartPayment { label_codes: vec![] }).unwrap();
        assert!(matches!(
            resp_rx.recv().await.unwrap(),
            NetworkResponse::Payment(PaymentEvent::Balance(_))
        ));
        assert!(matches!(
            resp_rx.recv().await.unwrap(),
            NetworkResponse::Payment(PaymentEvent::PixIssued(_))
        ));

        cmd_tx.send(NetworkCommand::StartPayment { label_codes: vec![] }).unwrap();
        loop {
            match resp_rx.recv().await.unwrap() {
                NetworkResponse::Error { message, .. } => {
                    assert!(message.contains("already"));
                    break;
                }
                NetworkResponse::Payment(_) => continue,
                other => panic!("unexpected response: {:?}", other),
            }
        }

        cmd_tx.send(NetworkCommand::StopPayment).unwrap();
        loop {
            if let NetworkResponse::PaymentFinished(outcome) = resp_rx.recv().await.unwrap() {
                assert!(matches!(outcome, PaymentOutcome::Cancelled { .. }));
                break;
            }
        }
        assert_eq!(api.count(&Call::PixCharge), 1);
        assert_eq!(api.count(&Call::BuyLabels), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_events_arrive_before_outcome() {
        let api = Arc::new(MockApi::default());
        api.script_balances(vec![Ok(wallet(0.0, 30.0)), Ok(wallet(40.0, 30.0))]);
        let (cmd_tx, mut resp_rx) = start(api.clone());

        cmd_tx
            .send(NetworkCommand::StartPayment {
                label_codes: vec!["ME1".into()],
            })
            .unwrap();

        let mut saw_settling = false;
        loop {
            match resp_rx.recv().await.unwrap() {
                NetworkResponse::Payment(PaymentEvent::Settling) => saw_settling = true,
                NetworkResponse::PaymentFinished(outcome) => {
                    assert_eq!(outcome, PaymentOutcome::Funded { attempts: 1 });
                    break;
                }
                _ => {}
            }
        }
        assert!(saw_settling);
        assert_eq!(api.count(&Call::GenerateLabels(vec!["ME1".into()])), 1);
    }

    #[test]
    fn test_merge_saved_keeps_submitted_fields_for_bare_answers() {
        let submitted = Client {
            name: "Ana".into(),
            ..Client::default()
        };
        let saved = Client {
            id: Some(12),
            ..Client::default()
        };
        let merged = merge_saved(saved, &submitted);
        assert_eq!(merged.id, Some(12));
        assert_eq!(merged.name, "Ana");
    }
}
