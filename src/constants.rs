//! Application constants
//!
//! Centralized location for endpoint paths and configuration defaults.

use std::time::Duration;

/// Default backend address when no settings file or override exists
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Environment variable overriding the backend address for one session
pub const API_URL_ENV: &str = "BELLA_CRM_API_URL";

/// Public postal code lookup service
pub const VIACEP_URL: &str = "https://viacep.com.br/ws";

/// Request timeout shared by every call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Period between carrier balance checks while waiting for a PIX payment
pub const PIX_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Balance checks before the PIX wait gives up (ten minutes at 5s)
pub const PIX_MAX_ATTEMPTS: u32 = 120;

/// Directory under $HOME holding the settings file
pub const CONFIG_DIR_NAME: &str = ".bella-crm";

/// Log file written next to the working directory
pub const LOG_FILE_NAME: &str = "bella-crm.log";

/// Application name
pub const APP_NAME: &str = "Pink Bella CRM";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Melhor Envio paths exposed by the backend
pub mod carrier_paths {
    pub const BALANCE: &str = "/melhor-envio/saldo-carrinho";
    /// Spelled as the backend deploys it. Fix here if the route is renamed.
    pub const PIX_CHARGE: &str = "/melhor-envio/pix-valor-carinhoo";
    pub const BUY_LABELS: &str = "/melhor-envio/comprar-etiquetas";
    pub const GENERATE_LABELS: &str = "/melhor-envio/etiqueta/gerar";
    pub const PRINT_LABELS: &str = "/melhor-envio/imprimir-etiquetas";
    pub const REFRESH_TRACKING: &str = "/melhor-envio/rastreios/atualizar";
}
