//! The single client-side copy of the purchase list.
//!
//! Everything that shows purchases reads from one [`PurchaseStore`]; status
//! changes replace entries by id and reloads replace the whole list.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use crate::filter::{count_by_status, PurchaseFilter};
use crate::models::{Purchase, PurchaseStatus};

#[derive(Clone, Debug, Default)]
pub struct PurchaseStore {
    purchases: Vec<Purchase>,
    loaded_at: Option<DateTime<Utc>>,
}

impl PurchaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, mut purchases: Vec<Purchase>) {
        purchases.sort_by(|a, b| b.id.cmp(&a.id));
        self.purchases = purchases;
        self.loaded_at = Some(Utc::now());
    }

    /// Replace the entry with the same id; unknown ids are inserted.
    /// Returns true when an existing entry was replaced.
    ///
    /// Status replies come back as bare rows, so embedded client, freight
    /// and items the reply leaves out are kept from the stored entry.
    pub fn upsert(&mut self, mut purchase: Purchase) -> bool {
        match self.purchases.iter_mut().find(|p| p.id == purchase.id) {
            Some(existing) => {
                if purchase.client.is_none() {
                    purchase.client = existing.client.take();
                }
                if purchase.freight.is_none() {
                    purchase.freight = existing.freight.take();
                }
                if purchase.items.is_empty() {
                    purchase.items = std::mem::take(&mut existing.items);
                }
                *existing = purchase;
                true
            }
            None => {
                let at = self
                    .purchases
                    .iter()
                    .position(|p| p.id < purchase.id)
                    .unwrap_or(self.purchases.len());
                self.purchases.insert(at, purchase);
                false
            }
        }
    }

    pub fn get(&self, id: u64) -> Option<&Purchase> {
        self.purchases.iter().find(|p| p.id == id)
    }

    pub fn all(&self) -> &[Purchase] {
        &self.purchases
    }

    pub fn len(&self) -> usize {
        self.purchases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.purchases.is_empty()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn filtered(&self, filter: &PurchaseFilter) -> Vec<&Purchase> {
        filter.apply(&self.purchases)
    }

    pub fn counts(&self) -> BTreeMap<PurchaseStatus, usize> {
        count_by_status(&self.purchases)
    }

    /// Drop selected ids that no longer exist after a reload
    pub fn retain_known(&self, selection: &mut HashSet<u64>) {
        selection.retain(|id| self.get(*id).is_some());
    }
}
