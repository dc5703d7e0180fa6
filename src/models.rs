//! Backend entities as the CRM API serves them.
//!
//! Field names on the wire are the backend's Portuguese names; the Rust side
//! uses English names with serde renames. Decoding is lenient about `null`
//! and about numbers arriving as strings, since the backend serializes
//! numeric columns as text.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

// ========================
// Lenient field decoders
// ========================

/// Accepts a string, a number or null (null becomes empty)
fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let s = lenient_string(d)?;
    Ok(if s.trim().is_empty() { None } else { Some(s) })
}

/// Accepts a number, a numeric string or null (null becomes 0)
fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn lenient_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// `ativo` comes as 1/0; booleans and "1"/"0" are accepted too
fn active_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().map(|v| v != 0).unwrap_or(true),
        Value::String(s) => !matches!(s.trim(), "0" | "false"),
        _ => true,
    })
}

fn serialize_active_flag<S: Serializer>(active: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*active))
}

fn default_true() -> bool {
    true
}

// ========================
// Purchase status
// ========================

/// Lifecycle status of a purchase.
///
/// The backend historically wrote both "Cancelado" and "Cancelada"; both
/// decode to [`PurchaseStatus::Cancelado`] and only "Cancelado" is written.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PurchaseStatus {
    #[default]
    Pendente,
    Pago,
    AguardandoEtiqueta,
    EtiquetaGerada,
    Postado,
    Entregue,
    Cancelado,
    /// A value this client does not know; kept so the list still decodes
    Other(String),
}

impl PurchaseStatus {
    /// Known statuses in lifecycle order
    pub const ALL: [PurchaseStatus; 7] = [
        PurchaseStatus::Pendente,
        PurchaseStatus::Pago,
        PurchaseStatus::AguardandoEtiqueta,
        PurchaseStatus::EtiquetaGerada,
        PurchaseStatus::Postado,
        PurchaseStatus::Entregue,
        PurchaseStatus::Cancelado,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            PurchaseStatus::Pendente => "Pendente",
            PurchaseStatus::Pago => "Pago",
            PurchaseStatus::AguardandoEtiqueta => "Aguardando Etiqueta",
            PurchaseStatus::EtiquetaGerada => "Etiqueta PDF Gerada",
            PurchaseStatus::Postado => "Postado",
            PurchaseStatus::Entregue => "Entregue",
            PurchaseStatus::Cancelado => "Cancelado",
            PurchaseStatus::Other(raw) => raw,
        }
    }

    /// Position in the forward progression; cancellation sits outside it
    pub fn rank(&self) -> Option<u8> {
        match self {
            PurchaseStatus::Pendente => Some(0),
            PurchaseStatus::Pago => Some(1),
            PurchaseStatus::AguardandoEtiqueta => Some(2),
            PurchaseStatus::EtiquetaGerada => Some(3),
            PurchaseStatus::Postado => Some(4),
            PurchaseStatus::Entregue => Some(5),
            PurchaseStatus::Cancelado | PurchaseStatus::Other(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PurchaseStatus::Entregue | PurchaseStatus::Cancelado)
    }

    /// True when moving to `target` goes forward (or cancels a live purchase)
    pub fn can_move_to(&self, target: &PurchaseStatus) -> bool {
        if self.is_terminal() || self == target {
            return false;
        }
        if *target == PurchaseStatus::Cancelado {
            return true;
        }
        match (self.rank(), target.rank()) {
            (Some(from), Some(to)) => to > from,
            (None, Some(_)) => true,
            _ => false,
        }
    }
}

impl From<String> for PurchaseStatus {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "Pendente" => PurchaseStatus::Pendente,
            "Pago" => PurchaseStatus::Pago,
            "Aguardando Etiqueta" => PurchaseStatus::AguardandoEtiqueta,
            "Etiqueta PDF Gerada" => PurchaseStatus::EtiquetaGerada,
            "Postado" => PurchaseStatus::Postado,
            "Entregue" => PurchaseStatus::Entregue,
            "Cancelado" | "Cancelada" => PurchaseStatus::Cancelado,
            _ => PurchaseStatus::Other(raw),
        }
    }
}

impl From<&str> for PurchaseStatus {
    fn from(raw: &str) -> Self {
        PurchaseStatus::from(raw.to_string())
    }
}

impl From<PurchaseStatus> for String {
    fn from(status: PurchaseStatus) -> Self {
        match status {
            PurchaseStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========================
// Clients
// ========================

/// Address embedded in a client (also returned by freight quotes)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub cep: String,
    #[serde(rename = "logradouro", default, deserialize_with = "lenient_string")]
    pub street: String,
    #[serde(rename = "numero", default, deserialize_with = "lenient_string")]
    pub number: String,
    #[serde(rename = "complemento", default, deserialize_with = "lenient_string")]
    pub complement: String,
    #[serde(rename = "bairro", default, deserialize_with = "lenient_string")]
    pub neighborhood: String,
    #[serde(rename = "cidade", default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(rename = "estado", default, deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(rename = "referencia", default, deserialize_with = "lenient_string")]
    pub reference: String,
    #[serde(rename = "tipo_endereco", default, deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default = "default_true")]
    pub is_principal: bool,
}

impl Address {
    /// One-line rendering used by lists and detail panels
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.street.is_empty() {
            if self.number.is_empty() {
                parts.push(self.street.clone());
            } else {
                parts.push(format!("{}, {}", self.street, self.number));
            }
        }
        if !self.neighborhood.is_empty() {
            parts.push(self.neighborhood.clone());
        }
        match (self.city.is_empty(), self.state.is_empty()) {
            (false, false) => parts.push(format!("{} - {}", self.city, self.state)),
            (false, true) => parts.push(self.city.clone()),
            (true, false) => parts.push(self.state.clone()),
            (true, true) => {}
        }
        if !self.cep.is_empty() {
            parts.push(format!("CEP {}", self.cep));
        }
        parts.join(" · ")
    }
}

/// A customer record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "nome", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(rename = "telefone", default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(rename = "cpf", default, deserialize_with = "lenient_string")]
    pub document: String,
    #[serde(
        rename = "ativo",
        default = "default_true",
        deserialize_with = "active_flag",
        serialize_with = "serialize_active_flag"
    )]
    pub active: bool,
    #[serde(rename = "endereco", default, deserialize_with = "nullable_address")]
    pub address: Address,
}

fn nullable_address<'de, D: Deserializer<'de>>(d: D) -> Result<Address, D::Error> {
    Ok(Option::<Address>::deserialize(d)?.unwrap_or_default())
}

impl Default for Client {
    fn default() -> Self {
        Client {
            id: None,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            document: String::new(),
            active: true,
            address: Address::default(),
        }
    }
}

// ========================
// Products
// ========================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(rename = "nome", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "preco", default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(rename = "categoria", default, deserialize_with = "lenient_opt_string")]
    pub category: Option<String>,
}

// ========================
// Purchases
// ========================

/// Client fields the backend embeds in a purchase
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "nome", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "cpf", default, deserialize_with = "lenient_string")]
    pub document: String,
}

/// Product reference some purchase payloads nest inside an item
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(rename = "nome", default, deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(rename = "categoria", default, deserialize_with = "lenient_opt_string")]
    pub category: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseItem {
    #[serde(rename = "produto_id", default)]
    pub product_id: Option<u64>,
    #[serde(rename = "produto", default)]
    pub product: Option<ProductRef>,
    #[serde(rename = "nome", default, deserialize_with = "lenient_opt_string")]
    pub name: Option<String>,
    #[serde(rename = "quantidade", default)]
    pub quantity: u32,
    #[serde(
        rename = "preco_unitario_no_momento_da_compra",
        alias = "preco_unitario_na_compra",
        alias = "preco_unitario",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub unit_price: f64,
}

impl PurchaseItem {
    pub fn product_id(&self) -> Option<u64> {
        self.product_id
            .or_else(|| self.product.as_ref().and_then(|p| p.id))
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.product.as_ref().and_then(|p| p.name.clone()))
            .or_else(|| self.product_id().map(|id| format!("Produto #{}", id)))
            .unwrap_or_else(|| String::from("-"))
    }

    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Shipping details attached to a purchase
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseFreight {
    #[serde(
        rename = "transportadora",
        alias = "nome_transportadora",
        default,
        deserialize_with = "lenient_opt_string"
    )]
    pub carrier: Option<String>,
    #[serde(
        rename = "servico",
        alias = "servico_frete",
        default,
        deserialize_with = "lenient_opt_string"
    )]
    pub service: Option<String>,
    #[serde(
        rename = "valor_frete",
        alias = "preco_frete",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub price: f64,
    #[serde(
        rename = "prazo_dias",
        alias = "prazo_frete_dias",
        alias = "prazo_dias_uteis",
        default,
        deserialize_with = "lenient_opt_u32"
    )]
    pub lead_time_days: Option<u32>,
    #[serde(rename = "codigo_rastreio", default, deserialize_with = "lenient_opt_string")]
    pub tracking_code: Option<String>,
    #[serde(rename = "codigo_etiqueta", default, deserialize_with = "lenient_opt_string")]
    pub label_code: Option<String>,
}

/// A purchase (order) record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: u64,
    #[serde(rename = "cliente_id", default)]
    pub client_id: Option<u64>,
    #[serde(rename = "cliente", default)]
    pub client: Option<ClientSummary>,
    #[serde(rename = "data_compra", default, deserialize_with = "lenient_opt_string")]
    pub purchased_at: Option<String>,
    #[serde(rename = "itens", default, deserialize_with = "nullable_items")]
    pub items: Vec<PurchaseItem>,
    #[serde(rename = "valor_total", default, deserialize_with = "lenient_f64")]
    pub total: f64,
    #[serde(rename = "status_compra", default, deserialize_with = "nullable_status")]
    pub status: PurchaseStatus,
    #[serde(rename = "frete", default)]
    pub freight: Option<PurchaseFreight>,
}

fn nullable_status<'de, D: Deserializer<'de>>(d: D) -> Result<PurchaseStatus, D::Error> {
    Ok(Option::<String>::deserialize(d)?
        .map(PurchaseStatus::from)
        .unwrap_or_default())
}

fn nullable_items<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<PurchaseItem>, D::Error> {
    Ok(Option::<Vec<PurchaseItem>>::deserialize(d)?.unwrap_or_default())
}

impl Purchase {
    pub fn client_name(&self) -> Option<&str> {
        self.client
            .as_ref()
            .map(|c| c.name.as_str())
            .filter(|n| !n.is_empty())
    }

    pub fn client_document(&self) -> Option<&str> {
        self.client
            .as_ref()
            .map(|c| c.document.as_str())
            .filter(|d| !d.is_empty())
    }

    /// Carrier label code, if one has been issued
    pub fn label_code(&self) -> Option<&str> {
        self.freight
            .as_ref()
            .and_then(|f| f.label_code.as_deref())
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    pub fn tracking_code(&self) -> Option<&str> {
        self.freight
            .as_ref()
            .and_then(|f| f.tracking_code.as_deref())
            .filter(|code| !code.is_empty())
    }

    /// Purchase timestamp parsed from the backend's ISO string
    pub fn purchased_at_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let raw = self.purchased_at.as_deref()?;
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .ok()
            .or_else(|| {
                chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}

/// Body of `PUT /compras/:id/status`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: PurchaseStatus,
}

/// One line of a purchase create/update request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseLine {
    #[serde(rename = "produto_id")]
    pub product_id: u64,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "preco_unitario_no_momento_da_compra")]
    pub unit_price: f64,
}

/// Body of `POST /compras` and `PUT /compras/:id`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchasePayload {
    #[serde(rename = "cliente_id")]
    pub client_id: u64,
    #[serde(rename = "endereco_entrega_id", skip_serializing_if = "Option::is_none")]
    pub shipping_address_id: Option<u64>,
    #[serde(rename = "itens")]
    pub items: Vec<PurchaseLine>,
    #[serde(rename = "valor_frete", skip_serializing_if = "Option::is_none")]
    pub freight_price: Option<f64>,
    #[serde(rename = "transportadora", skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(rename = "servico_frete", skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(rename = "prazo_frete_dias", skip_serializing_if = "Option::is_none")]
    pub lead_time_days: Option<u32>,
    #[serde(rename = "valor_total")]
    pub total: f64,
}

// ========================
// Freight
// ========================

/// Item of a freight quote request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    #[serde(rename = "produto_id")]
    pub product_id: u64,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
}

/// Body of `POST /frete/calcular`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(rename = "cepDestino")]
    pub destination_cep: String,
    #[serde(rename = "itens")]
    pub items: Vec<QuoteItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FreightOption {
    #[serde(rename = "nome_transportadora", default, deserialize_with = "lenient_opt_string")]
    pub carrier: Option<String>,
    #[serde(rename = "servico", default, deserialize_with = "lenient_string")]
    pub service: String,
    #[serde(rename = "preco_frete", default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(rename = "prazo_dias_uteis", default, deserialize_with = "lenient_opt_u32")]
    pub lead_time_days: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FreightQuote {
    #[serde(rename = "opcoes_frete", default, deserialize_with = "nullable_options")]
    pub options: Vec<FreightOption>,
    #[serde(rename = "enderecoDestino", default)]
    pub destination: Option<Address>,
}

fn nullable_options<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<FreightOption>, D::Error> {
    Ok(Option::<Vec<FreightOption>>::deserialize(d)?.unwrap_or_default())
}

// ========================
// Melhor Envio
// ========================

/// Carrier wallet balance and the total of labels waiting in the cart
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletBalance {
    #[serde(rename = "saldo", default, deserialize_with = "lenient_f64")]
    pub balance: f64,
    #[serde(rename = "Frete", alias = "frete", default, deserialize_with = "lenient_f64")]
    pub cart_total: f64,
}

impl WalletBalance {
    pub fn covers_cart(&self) -> bool {
        self.balance >= self.cart_total
    }
}

/// PIX charge generated to top up the wallet
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixCharge {
    #[serde(rename = "valor", default, deserialize_with = "lenient_f64")]
    pub amount: f64,
    #[serde(rename = "urlQrCodeImagem", default, deserialize_with = "lenient_string")]
    pub qr_code_url: String,
    #[serde(rename = "codigoParaCopiar", default, deserialize_with = "lenient_string")]
    pub copy_paste_code: String,
}

/// Body of the label generate/print calls
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelOrders {
    pub orders: Vec<String>,
}

/// Result of the print call
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
}

/// Result of the tracking refresh call
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingRefresh {
    #[serde(rename = "sucesso", default)]
    pub success: bool,
}

// ========================
// ViaCEP
// ========================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CepLookup {
    #[serde(default, deserialize_with = "lenient_string")]
    pub cep: String,
    #[serde(rename = "logradouro", default, deserialize_with = "lenient_string")]
    pub street: String,
    #[serde(rename = "bairro", default, deserialize_with = "lenient_string")]
    pub neighborhood: String,
    #[serde(rename = "localidade", default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(rename = "uf", default, deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(rename = "erro", default, deserialize_with = "lookup_error_flag")]
    pub not_found: bool,
}

/// ViaCEP answers `"erro": true` (older deployments send the string "true")
fn lookup_error_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

impl CepLookup {
    /// Copy the looked-up fields into an address, keeping number/complement
    pub fn apply_to(&self, address: &mut Address) {
        address.street = self.street.clone();
        address.neighborhood = self.neighborhood.clone();
        address.city = self.city.clone();
        address.state = self.state.clone();
    }
}

/// Strip everything but digits; returns the CEP only if exactly 8 remain
pub fn normalize_cep(input: &str) -> Option<String> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 8 {
        Some(digits)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cancelada_decodes_as_cancelado() {
        let a: PurchaseStatus = serde_json::from_value(json!("Cancelada")).unwrap();
        let b: PurchaseStatus = serde_json::from_value(json!("Cancelado")).unwrap();
        assert_eq!(a, PurchaseStatus::Cancelado);
        assert_eq!(a, b);
        assert_eq!(serde_json::to_value(&a).unwrap(), json!("Cancelado"));
    }

    #[test]
    fn test_unknown_status_is_kept() {
        let status: PurchaseStatus = serde_json::from_value(json!("Extraviado")).unwrap();
        assert_eq!(status, PurchaseStatus::Other("Extraviado".into()));
        assert_eq!(status.as_str(), "Extraviado");
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("Extraviado"));
    }

    #[test]
    fn test_status_progression() {
        assert!(PurchaseStatus::Pendente.can_move_to(&PurchaseStatus::Pago));
        assert!(PurchaseStatus::Pago.can_move_to(&PurchaseStatus::Cancelado));
        assert!(!PurchaseStatus::Pago.can_move_to(&PurchaseStatus::Pendente));
        assert!(!PurchaseStatus::Cancelado.can_move_to(&PurchaseStatus::Pago));
        assert!(!PurchaseStatus::Entregue.can_move_to(&PurchaseStatus::Cancelado));
    }

    #[test]
    fn test_purchase_decodes_backend_shape() {
        let purchase: Purchase = serde_json::from_value(json!({
            "id": 7,
            "cliente_id": 3,
            "cliente": { "nome": "Ana Souza", "cpf": "123.456.789-00" },
            "data_compra": "2024-05-02T14:30:00.000Z",
            "valor_total": "129.90",
            "status_compra": "Aguardando Etiqueta",
            "itens": [
                { "produto": { "id": 2, "nome": "Vestido" }, "quantidade": 1, "preco_unitario_na_compra": 99.9 }
            ],
            "frete": {
                "transportadora": "Correios",
                "servico": "PAC",
                "valor_frete": 30,
                "prazo_dias": 6,
                "codigo_rastreio": null,
                "codigo_etiqueta": "ME-991"
            }
        }))
        .unwrap();

        assert_eq!(purchase.total, 129.90);
        assert_eq!(purchase.status, PurchaseStatus::AguardandoEtiqueta);
        assert_eq!(purchase.client_name(), Some("Ana Souza"));
        assert_eq!(purchase.label_code(), Some("ME-991"));
        assert_eq!(purchase.tracking_code(), None);
        assert_eq!(purchase.items[0].product_id(), Some(2));
        assert_eq!(purchase.items[0].display_name(), "Vestido");
        assert!(purchase.purchased_at_utc().is_some());
    }

    #[test]
    fn test_blank_label_code_is_absent() {
        let purchase: Purchase = serde_json::from_value(json!({
            "id": 1,
            "status_compra": "Pago",
            "frete": { "codigo_etiqueta": "  " }
        }))
        .unwrap();
        assert_eq!(purchase.label_code(), None);
    }

    #[test]
    fn test_client_active_flag_variants() {
        let inactive: Client = serde_json::from_value(json!({ "id": 1, "nome": "A", "ativo": 0 })).unwrap();
        let active: Client = serde_json::from_value(json!({ "id": 2, "nome": "B", "ativo": true })).unwrap();
        let missing: Client = serde_json::from_value(json!({ "id": 3, "nome": "C", "endereco": null })).unwrap();
        assert!(!inactive.active);
        assert!(active.active);
        assert!(missing.active);
        assert_eq!(serde_json::to_value(&inactive).unwrap()["ativo"], json!(0));
    }

    #[test]
    fn test_wallet_balance_field_names() {
        let wallet: WalletBalance = serde_json::from_value(json!({ "saldo": 12.5, "Frete": 40 })).unwrap();
        assert_eq!(wallet.balance, 12.5);
        assert_eq!(wallet.cart_total, 40.0);
        assert!(!wallet.covers_cart());
    }

    #[test]
    fn test_normalize_cep() {
        assert_eq!(normalize_cep("55190-052"), Some("55190052".into()));
        assert_eq!(normalize_cep("5519005"), None);
        assert_eq!(normalize_cep("551900521"), None);
    }

    #[test]
    fn test_address_summary() {
        let address = Address {
            cep: "01001000".into(),
            street: "Praça da Sé".into(),
            number: "10".into(),
            city: "São Paulo".into(),
            state: "SP".into(),
            ..Address::default()
        };
        assert_eq!(address.summary(), "Praça da Sé, 10 · São Paulo - SP · CEP 01001000");
    }
}
