//! PIX top-up of the Melhor Envio wallet.
//!
//! When the wallet balance does not cover the label cart, a PIX charge is
//! issued and the balance is polled on a fixed period until it does. The
//! wait is a cancellable task with an attempt ceiling; on success the cart
//! labels are bought and then generated, exactly once.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::constants::{PIX_MAX_ATTEMPTS, PIX_POLL_INTERVAL};
use crate::error::ApiError;
use crate::models::{PixCharge, WalletBalance};
use crate::network::service::CrmApi;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: PIX_POLL_INTERVAL,
            max_attempts: PIX_MAX_ATTEMPTS,
        }
    }
}

/// Progress reported while a payment runs
#[derive(Clone, Debug, PartialEq)]
pub enum PaymentEvent {
    /// Balance fetched before deciding whether a PIX is needed
    Balance(WalletBalance),
    PixIssued(PixCharge),
    Tick { attempt: u32, wallet: WalletBalance },
    TickFailed { attempt: u32, message: String },
    /// Balance covers the cart; buying and generating labels now
    Settling,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Cart is empty
    NothingToPay,
    /// Labels bought and generated. `attempts` is 0 when no wait was needed.
    Funded { attempts: u32 },
    Cancelled { attempts: u32 },
    Exhausted { attempts: u32 },
}

/// End state of a balance wait, before any label call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitOutcome {
    Funded { attempts: u32 },
    Cancelled { attempts: u32 },
    Exhausted { attempts: u32 },
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("A PIX payment is already being watched")]
    AlreadyRunning,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Run a whole payment: check the balance, issue a PIX if short, wait for
/// funds, then buy and generate the labels.
///
/// `label_codes` goes to the generation call; empty means every label the
/// purchase just bought. Dropping or firing `cancel_rx` stops the wait.
pub async fn run_payment<A: CrmApi + ?Sized>(
    api: &A,
    config: &PollConfig,
    label_codes: &[String],
    events: &mpsc::UnboundedSender<PaymentEvent>,
    cancel_rx: oneshot::Receiver<()>,
) -> Result<PaymentOutcome, PaymentError> {
    let wallet = api.wallet_balance().await?;
    let _ = events.send(PaymentEvent::Balance(wallet.clone()));

    if wallet.cart_total <= 0.0 {
        tracing::info!("Label cart is empty, nothing to pay");
        return Ok(PaymentOutcome::NothingToPay);
    }

    if wallet.covers_cart() {
        tracing::info!(balance = wallet.balance, cart = wallet.cart_total, "Balance already covers cart");
        settle(api, label_codes, events).await?;
        return Ok(PaymentOutcome::Funded { attempts: 0 });
    }

    let pix = api.pix_charge().await?;
    tracing::info!(amount = pix.amount, "PIX charge issued, waiting for balance");
    let _ = events.send(PaymentEvent::PixIssued(pix));

    match wait_for_funds(api, config, events, cancel_rx).await {
        WaitOutcome::Funded { attempts } => {
            settle(api, label_codes, events).await?;
            Ok(PaymentOutcome::Funded { attempts })
        }
        WaitOutcome::Cancelled { attempts } => Ok(PaymentOutcome::Cancelled { attempts }),
        WaitOutcome::Exhausted { attempts } => Ok(PaymentOutcome::Exhausted { attempts }),
    }
}

/// Poll the wallet every `config.interval` (first check one period after
/// the call) until the balance covers the cart, the attempt ceiling is hit,
/// or `cancel_rx` resolves.
///
/// A failed balance check counts as an attempt and does not stop the wait.
pub async fn wait_for_funds<A: CrmApi + ?Sized>(
    api: &A,
    config: &PollConfig,
    events: &mpsc::UnboundedSender<PaymentEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> WaitOutcome {
    let mut ticker = interval_at(Instant::now() + config.interval, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut attempts = 0u32;

    while attempts < config.max_attempts {
        tokio::select! {
            biased;
            _ = &mut cancel_rx => {
                tracing::info!(attempts, "Balance wait cancelled");
                return WaitOutcome::Cancelled { attempts };
            }
            _ = ticker.tick() => {}
        }

        attempts += 1;
        let check = tokio::select! {
            biased;
            _ = &mut cancel_rx => {
                tracing::info!(attempts, "Balance wait cancelled during check");
                return WaitOutcome::Cancelled { attempts };
            }
            result = api.wallet_balance() => result,
        };

        match check {
            Ok(wallet) => {
                tracing::debug!(attempt = attempts, balance = wallet.balance, cart = wallet.cart_total, "Balance polled");
                let funded = wallet.covers_cart();
                let _ = events.send(PaymentEvent::Tick { attempt: attempts, wallet });
                if funded {
                    tracing::info!(attempts, "Balance covers cart");
                    return WaitOutcome::Funded { attempts };
                }
            }
            Err(e) => {
                tracing::warn!(attempt = attempts, error = %e, "Balance check failed");
                let _ = events.send(PaymentEvent::TickFailed {
                    attempt: attempts,
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::warn!(attempts, "Gave up waiting for PIX payment");
    WaitOutcome::Exhausted { attempts }
}

/// Buy the cart, then generate its labels
async fn settle<A: CrmApi + ?Sized>(
    api: &A,
    label_codes: &[String],
    events: &mpsc::UnboundedSender<PaymentEvent>,
) -> Result<(), ApiError> {
    let _ = events.send(PaymentEvent::Settling);
    api.buy_labels().await?;
    api.generate_labels(label_codes).await?;
    tracing::info!("Cart labels bought and generated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{wallet, Call, MockApi};
    use std::sync::Arc;

    fn config(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(5),
            max_attempts,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_stops_on_first_covering_tick() {
        let api = MockApi::default();
        api.script_balances(vec![Ok(wallet(0.0, 50.0)), Ok(wallet(20.0, 50.0)), Ok(wallet(55.0, 50.0))]);
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = oneshot::channel();
        let started = Instant::now();

        let outcome = wait_for_funds(&api, &config(120), &events_tx, cancel_rx).await;

        assert_eq!(outcome, WaitOutcome::Funded { attempts: 3 });
        assert_eq!(api.count(&Call::WalletBalance), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(15) && elapsed < Duration::from_secs(16));

        let mut ticks = Vec::new();
        while let Ok(event) = events_rx.try_recv() {
            if let PaymentEvent::Tick { attempt, wallet } = event {
                ticks.push((attempt, wallet.balance));
            }
        }
        assert_eq!(ticks, vec![(1, 0.0), (2, 20.0), (3, 55.0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_buys_then_generates_exactly_once() {
        let api = MockApi::default();
        api.script_balances(vec![
            Ok(wallet(0.0, 50.0)),
            Ok(wallet(0.0, 50.0)),
            Ok(wallet(20.0, 50.0)),
            Ok(wallet(55.0, 50.0)),
        ]);
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = oneshot::channel();

        let outcome = run_payment(&api, &config(120), &["ME-1".to_string()], &events_tx, cancel_rx)
            .await
            .unwrap();

        assert_eq!(outcome, PaymentOutcome::Funded { attempts: 3 });
        assert_eq!(
            api.calls(),
            vec![
                Call::WalletBalance,
                Call::PixCharge,
                Call::WalletBalance,
                Call::WalletBalance,
                Call::WalletBalance,
                Call::BuyLabels,
                Call::GenerateLabels(vec!["ME-1".into()]),
            ]
        );

        // nothing keeps ticking once the wait returned
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.count(&Call::WalletBalance), 4);
        assert_eq!(api.count(&Call::BuyLabels), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_skips_pix_when_balance_covers_cart() {
        let api = MockApi::default();
        api.script_balances(vec![Ok(wallet(80.0, 50.0))]);
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = oneshot::channel();

        let outcome = run_payment(&api, &config(120), &[], &events_tx, cancel_rx).await.unwrap();

        assert_eq!(outcome, PaymentOutcome::Funded { attempts: 0 });
        assert_eq!(
            api.calls(),
            vec![Call::WalletBalance, Call::BuyLabels, Call::GenerateLabels(vec![])]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_payment_with_empty_cart_does_nothing() {
        let api = MockApi::default();
        api.script_balances(vec![Ok(wallet(10.0, 0.0))]);
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = oneshot::channel();

        let outcome = run_payment(&api, &config(120), &[], &events_tx, cancel_rx).await.unwrap();

        assert_eq!(outcome, PaymentOutcome::NothingToPay);
        assert_eq!(api.calls(), vec![Call::WalletBalance]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_wait_without_buying() {
        let api = Arc::new(MockApi::default());
        api.script_balances(vec![Ok(wallet(0.0, 50.0))]);
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let task_api = Arc::clone(&api);
        let handle = tokio::spawn(async move {
            run_payment(task_api.as_ref(), &config(120), &[], &events_tx, cancel_rx).await
        });

        tokio::time::sleep(Duration::from_secs(12)).await;
        cancel_tx.send(()).unwrap();
        let outcome = handle.await.unwrap().unwrap();

        assert_eq!(outcome, PaymentOutcome::Cancelled { attempts: 2 });
        assert_eq!(api.count(&Call::BuyLabels), 0);
        assert_eq!(api.count(&Call::WalletBalance), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_cancel_handle_stops_wait() {
        let api = MockApi::default();
        api.script_balances(vec![Ok(wallet(0.0, 50.0))]);
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        drop(cancel_tx);

        let outcome = wait_for_funds(&api, &config(120), &events_tx, cancel_rx).await;

        assert_eq!(outcome, WaitOutcome::Cancelled { attempts: 0 });
        assert!(api.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_ceiling_exhausts() {
        let api = MockApi::default();
        api.script_balances(vec![Ok(wallet(0.0, 50.0))]);
        let (events_tx, _events_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = oneshot::channel();

        let outcome = wait_for_funds(&api, &config(3), &events_tx, cancel_rx).await;

        assert_eq!(outcome, WaitOutcome::Exhausted { attempts: 3 });
        assert_eq!(api.count(&Call::WalletBalance), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_check_counts_and_continues() {
        let api = MockApi::default();
        api.script_balances(vec![Err("connection reset".into()), Ok(wallet(60.0, 50.0))]);
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let (_cancel_tx, cancel_rx) = oneshot::channel();

        let outcome = wait_for_funds(&api, &config(120), &events_tx, cancel_rx).await;

        assert_eq!(outcome, WaitOutcome::Funded { attempts: 2 });
        assert!(matches!(
            events_rx.try_recv(),
            Ok(PaymentEvent::TickFailed { attempt: 1, .. })
        ));
    }
}
