//! Network layer - REST calls to the Pink Bella backend and ViaCEP
//!
//! One module per backend controller; [`CrmApi`] is the seam the rest of
//! the crate talks to. The Network actor receives commands and sends back
//! responses.

pub mod actor;
pub mod carrier;
pub mod cep;
pub mod client;
pub mod clients;
pub mod freight;
pub mod products;
pub mod purchases;
pub mod service;

pub use actor::NetworkActor;
pub use client::ApiClient;
pub use service::CrmApi;
