//! # Pink Bella CRM
//!
//! Terminal operator console for the Pink Bella backend.
//!
//! ## Features
//! - Purchases: status workflow (paid, cancel, label), status and text filters, per-status counts
//! - Melhor Envio: wallet balance, PIX top-up with a cancellable wait, label generation and printing
//! - Clients: list, create, edit, deactivate, ViaCEP address lookup
//! - Purchase drafts with freight quotes
//! - Standalone freight calculator
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod constants;
pub mod draft;
pub mod error;
pub mod filter;
pub mod messages;
pub mod models;
pub mod network;
pub mod payment;
pub mod storage;
pub mod store;
pub mod ui;
pub mod workflow;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use error::{ApiError, ApiResult};
pub use messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use models::{Client, Product, Purchase, PurchaseStatus, WalletBalance};
pub use network::{ApiClient, CrmApi, NetworkActor};
pub use store::PurchaseStore;
