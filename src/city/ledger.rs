//! Resource ledger - settlement-wide counters with capacities
//!
//! Amounts stay clamped to `[0, capacity]` after every operation.
//! Additions report what was actually stored; withdrawals are
//! all-or-nothing.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::ResourceKind;

/// A single ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub amount: f32,
    pub capacity: f32,
}

/// Settlement-wide resource accounting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceLedger {
    entries: AHashMap<ResourceKind, LedgerEntry>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource or change its capacity.
    ///
    /// A lowered capacity re-clamps the current amount immediately.
    pub fn set_capacity(&mut self, resource: ResourceKind, capacity: f32) {
        let entry = self.entries.entry(resource).or_insert(LedgerEntry {
            amount: 0.0,
            capacity,
        });
        entry.capacity = capacity.max(0.0);
        entry.amount = entry.amount.min(entry.capacity);
    }

    pub fn get(&self, resource: ResourceKind) -> f32 {
        self.entries.get(&resource).map_or(0.0, |e| e.amount)
    }

    pub fn capacity(&self, resource: ResourceKind) -> f32 {
        self.entries.get(&resource).map_or(0.0, |e| e.capacity)
    }

    /// Add up to `amount`, clamping at capacity.
    ///
    /// Returns the amount actually stored; overflow is discarded. Adding
    /// to an unregistered resource stores nothing.
    pub fn add(&mut self, resource: ResourceKind, amount: f32) -> f32 {
        debug_assert!(amount >= 0.0);
        let Some(entry) = self.entries.get_mut(&resource) else {
            tracing::warn!(resource = resource.name(), "add to unregistered resource discarded");
            return 0.0;
        };
        let space = (entry.capacity - entry.amount).max(0.0);
        let added = amount.min(space);
        entry.amount += added;
        added
    }

    /// All-or-nothing withdrawal of a single resource.
    pub fn consume(&mut self, resource: ResourceKind, amount: f32) -> Result<()> {
        debug_assert!(amount >= 0.0);
        let available = self.get(resource);
        if amount > available {
            return Err(SimError::Insufficient {
                resource,
                needed: amount,
                available,
            });
        }
        if let Some(entry) = self.entries.get_mut(&resource) {
            entry.amount = (entry.amount - amount).max(0.0);
        }
        Ok(())
    }

    /// Clamp-set the current amount of a registered resource
    pub fn set(&mut self, resource: ResourceKind, amount: f32) {
        if let Some(entry) = self.entries.get_mut(&resource) {
            entry.amount = amount.clamp(0.0, entry.capacity);
        }
    }

    /// Read-only affordability check against the current snapshot.
    ///
    /// Duplicate entries for one resource are summed before comparing,
    /// and the first shortfall (in resource order) is reported.
    pub fn check_afford(&self, costs: &[(ResourceKind, f32)]) -> Result<()> {
        let mut needed: AHashMap<ResourceKind, f32> = AHashMap::new();
        for (resource, amount) in costs {
            *needed.entry(*resource).or_default() += amount;
        }
        let mut totals: Vec<(ResourceKind, f32)> = needed.into_iter().collect();
        totals.sort_by_key(|(resource, _)| *resource);

        for (resource, amount) in totals {
            let available = self.get(resource);
            if amount > available {
                return Err(SimError::Insufficient {
                    resource,
                    needed: amount,
                    available,
                });
            }
        }
        Ok(())
    }

    pub fn can_afford(&self, costs: &[(ResourceKind, f32)]) -> bool {
        self.check_afford(costs).is_ok()
    }

    /// Withdraw a whole cost list atomically: either every entry is
    /// consumed or none is.
    pub fn consume_all(&mut self, costs: &[(ResourceKind, f32)]) -> Result<()> {
        self.check_afford(costs)?;
        for (resource, amount) in costs {
            if let Some(entry) = self.entries.get_mut(resource) {
                entry.amount = (entry.amount - amount).max(0.0);
            }
        }
        Ok(())
    }

    /// Entries in resource order, for display and snapshots
    pub fn entries_sorted(&self) -> Vec<(ResourceKind, LedgerEntry)> {
        let mut rows: Vec<(ResourceKind, LedgerEntry)> =
            self.entries.iter().map(|(k, v)| (*k, *v)).collect();
        rows.sort_by_key(|(resource, _)| *resource);
        rows
    }
}
