//! Pull-payment withdrawal ledger
//!
//! Sales never push value to sellers. Every amount owed accumulates in a
//! pending balance and is paid out only when the account withdraws it.
//! `withdraw` resets the balance to zero before the caller attempts the
//! external payout, so a failed or reentrant payout step cannot duplicate
//! a transfer.

use crate::types::{AccountId, Money};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-account pending balance accumulator
///
/// Serialization of concurrent access is provided by the market engine
/// lock that owns this ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutLedger {
    balances: HashMap<AccountId, Money>,
}

impl PayoutLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the account's pending balance
    ///
    /// Accumulates, never overwrites. Crediting zero is a no-op.
    pub fn credit(&mut self, account: &AccountId, amount: Money) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }

        let balance = self.balances.entry(account.clone()).or_insert(0);
        *balance = balance.checked_add(amount).ok_or_else(|| {
            Error::InvalidInput(format!("Pending balance overflow for {account}"))
        })?;

        Ok(())
    }

    /// Apply a batch of credits, all or none
    ///
    /// If any credit fails (overflow), every credit already applied is
    /// undone before the error is returned, so a failed operation leaves
    /// no partial transition. Duplicate accounts in the batch accumulate.
    pub fn credit_all(&mut self, credits: &[(AccountId, Money)]) -> Result<()> {
        for (index, (account, amount)) in credits.iter().enumerate() {
            if let Err(err) = self.credit(account, *amount) {
                for (account, amount) in &credits[..index] {
                    if let Some(balance) = self.balances.get_mut(account) {
                        *balance -= amount;
                    }
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Withdraw the full pending balance
    ///
    /// The balance is reset to zero before the returned amount is handed
    /// to the caller for payout. A zero balance is a no-op, not an error;
    /// the entry persists at zero and re-crediting starts fresh.
    pub fn withdraw(&mut self, account: &AccountId) -> Money {
        match self.balances.get_mut(account) {
            Some(balance) => std::mem::take(balance),
            None => 0,
        }
    }

    /// Current pending balance (zero for unknown accounts)
    pub fn pending(&self, account: &AccountId) -> Money {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Sum of all pending balances
    ///
    /// Used by conservation checks: total pending never exceeds total
    /// ever credited minus total withdrawn.
    pub fn total_pending(&self) -> Money {
        self.balances.values().sum()
    }
}
