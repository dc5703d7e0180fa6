//! Client-side filtering of purchases and clients, plus derived counts

use std::collections::BTreeMap;

use crate::models::{Client, Purchase, PurchaseStatus};

/// Status selector of the purchases list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(PurchaseStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: &PurchaseStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StatusFilter::All => "Todos",
            StatusFilter::Only(status) => status.as_str(),
        }
    }

    /// Cycle Todos -> each known status -> Todos
    pub fn next(&self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::Only(PurchaseStatus::ALL[0].clone()),
            StatusFilter::Only(current) => PurchaseStatus::ALL
                .iter()
                .position(|s| s == current)
                .and_then(|i| PurchaseStatus::ALL.get(i + 1))
                .map(|s| StatusFilter::Only(s.clone()))
                .unwrap_or(StatusFilter::All),
        }
    }
}

/// Status plus free-text filter over the purchase list
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PurchaseFilter {
    pub status: StatusFilter,
    pub query: String,
}

impl PurchaseFilter {
    pub fn matches(&self, purchase: &Purchase) -> bool {
        self.status.matches(&purchase.status) && matches_query(purchase, &self.query)
    }

    pub fn apply<'a>(&self, purchases: &'a [Purchase]) -> Vec<&'a Purchase> {
        purchases.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Case-insensitive substring match on client name, client document or id.
/// A blank query matches everything.
pub fn matches_query(purchase: &Purchase, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let name = purchase.client_name().unwrap_or_default().to_lowercase();
    let document = purchase.client_document().unwrap_or_default().to_lowercase();
    name.contains(&needle) || document.contains(&needle) || purchase.id.to_string().contains(&needle)
}

/// Number of purchases per status, for the summary line
pub fn count_by_status(purchases: &[Purchase]) -> BTreeMap<PurchaseStatus, usize> {
    let mut counts = BTreeMap::new();
    for purchase in purchases {
        *counts.entry(purchase.status.clone()).or_insert(0) += 1;
    }
    counts
}

// ========================
// Clients
// ========================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActiveFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl ActiveFilter {
    pub fn matches(&self, client: &Client) -> bool {
        match self {
            ActiveFilter::Active => client.active,
            ActiveFilter::Inactive => !client.active,
            ActiveFilter::All => true,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActiveFilter::Active => "Ativos",
            ActiveFilter::Inactive => "Inativos",
            ActiveFilter::All => "Todos",
        }
    }

    pub fn next(&self) -> ActiveFilter {
        match self {
            ActiveFilter::Active => ActiveFilter::Inactive,
            ActiveFilter::Inactive => ActiveFilter::All,
            ActiveFilter::All => ActiveFilter::Active,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub active: ActiveFilter,
    pub query: String,
}

impl ClientFilter {
    /// Active flag first, then name or CPF containing the query
    pub fn matches(&self, client: &Client) -> bool {
        if !self.active.matches(client) {
            return false;
        }
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        client.name.to_lowercase().contains(&needle) || client.document.to_lowercase().contains(&needle)
    }

    pub fn apply<'a>(&self, clients: &'a [Client]) -> Vec<&'a Client> {
        clients.iter().filter(|c| self.matches(c)).collect()
    }
}

/// Header numbers of the clients screen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub shown: usize,
}

pub fn client_stats(clients: &[Client], filter: &ClientFilter) -> ClientStats {
    let active = clients.iter().filter(|c| c.active).count();
    ClientStats {
        total: clients.len(),
        active,
        inactive: clients.len() - active,
        shown: clients.iter().filter(|c| filter.matches(c)).count(),
    }
}
