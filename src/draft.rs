//! Purchase composition: draft lines, freight choice and the request body.

use crate::models::{FreightOption, FreightQuote, Product, Purchase, PurchaseLine, PurchasePayload, QuoteItem, QuoteRequest};

#[derive(Clone, Debug, PartialEq)]
pub struct DraftLine {
    pub product_id: u64,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl DraftLine {
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// A purchase being composed for one client
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PurchaseDraft {
    pub client_id: u64,
    pub client_name: String,
    /// Destination CEP used for freight quotes
    pub cep: String,
    pub shipping_address_id: Option<u64>,
    pub lines: Vec<DraftLine>,
    pub quote: Option<FreightQuote>,
    pub option_index: usize,
    /// Set when the draft edits an existing purchase
    pub editing: Option<u64>,
}

impl PurchaseDraft {
    pub fn new(client_id: u64, client_name: impl Into<String>, cep: impl Into<String>) -> Self {
        PurchaseDraft {
            client_id,
            client_name: client_name.into(),
            cep: cep.into(),
            ..PurchaseDraft::default()
        }
    }

    /// Draft pre-filled from an existing purchase
    pub fn from_purchase(purchase: &Purchase, cep: impl Into<String>) -> Option<Self> {
        let client_id = purchase.client_id.or_else(|| purchase.client.as_ref().and_then(|c| c.id))?;
        let lines = purchase
            .items
            .iter()
            .filter_map(|item| {
                Some(DraftLine {
                    product_id: item.product_id()?,
                    name: item.display_name(),
                    quantity: item.quantity.max(1),
                    unit_price: item.unit_price,
                })
            })
            .collect();
        Some(PurchaseDraft {
            client_id,
            client_name: purchase.client_name().unwrap_or_default().to_string(),
            cep: cep.into(),
            lines,
            editing: Some(purchase.id),
            ..PurchaseDraft::default()
        })
    }

    /// Add one unit of a product, copying its current price
    pub fn add(&mut self, product: &Product) {
        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(DraftLine {
                product_id: product.id,
                name: product.name.clone(),
                quantity: 1,
                unit_price: product.price,
            }),
        }
        self.invalidate_quote();
    }

    /// Remove one unit; the line goes away at zero
    pub fn remove(&mut self, product_id: u64) {
        if let Some(pos) = self.lines.iter().position(|l| l.product_id == product_id) {
            if self.lines[pos].quantity <= 1 {
                self.lines.remove(pos);
            } else {
                self.lines[pos].quantity -= 1;
            }
            self.invalidate_quote();
        }
    }

    fn invalidate_quote(&mut self) {
        self.quote = None;
        self.option_index = 0;
    }

    pub fn set_quote(&mut self, quote: FreightQuote) {
        self.quote = Some(quote);
        self.option_index = 0;
    }

    pub fn next_option(&mut self) {
        if let Some(quote) = &self.quote {
            if !quote.options.is_empty() {
                self.option_index = (self.option_index + 1) % quote.options.len();
            }
        }
    }

    pub fn selected_option(&self) -> Option<&FreightOption> {
        self.quote.as_ref()?.options.get(self.option_index)
    }

    pub fn items_total(&self) -> f64 {
        self.lines.iter().map(DraftLine::subtotal).sum()
    }

    pub fn freight_price(&self) -> f64 {
        self.selected_option().map(|o| o.price).unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.items_total() + self.freight_price()
    }

    pub fn quote_request(&self) -> QuoteRequest {
        QuoteRequest {
            destination_cep: self.cep.clone(),
            items: self
                .lines
                .iter()
                .map(|l| QuoteItem {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }

    pub fn payload(&self) -> Result<PurchasePayload, String> {
        if self.lines.is_empty() {
            return Err(String::from("Add at least one product"));
        }
        let option = self.selected_option();
        Ok(PurchasePayload {
            client_id: self.client_id,
            shipping_address_id: self.shipping_address_id,
            items: self
                .lines
                .iter()
                .map(|l| PurchaseLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
            freight_price: option.map(|o| o.price),
            carrier: option.and_then(|o| o.carrier.clone()),
            service: option.map(|o| o.service.clone()),
            lead_time_days: option.and_then(|o| o.lead_time_days),
            total: round_cents(self.total()),
        })
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parse `produto_id:quantidade` pairs separated by commas or spaces.
/// A bare id means quantity 1.
pub fn parse_quote_items(input: &str) -> Result<Vec<QuoteItem>, String> {
    let mut items = Vec::new();
    for token in input.split([',', ' ', ';']).map(str::trim).filter(|t| !t.is_empty()) {
        let (id, qty) = match token.split_once(':') {
            Some((id, qty)) => (id.trim(), qty.trim()),
            None => (token, "1"),
        };
        let product_id = id
            .parse::<u64>()
            .map_err(|_| format!("Invalid product id '{}'", id))?;
        let quantity = qty
            .parse::<u32>()
            .map_err(|_| format!("Invalid quantity '{}'", qty))?;
        if quantity == 0 {
            return Err(format!("Quantity for product {} must be positive", product_id));
        }
        items.push(QuoteItem { product_id, quantity });
    }
    if items.is_empty() {
        return Err(String::from("Add at least one item as id:quantity"));
    }
    Ok(items)
}
