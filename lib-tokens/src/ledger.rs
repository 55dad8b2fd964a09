//! Ledger Bookkeeping
//!
//! The ledger holds balances, allowances and total supply and exposes
//! unconditional value moves. It knows nothing about tax, blocklists or
//! holding caps: every policy decision is made before a ledger call is issued.

use std::collections::HashMap;

use lib_types::{Address, Amount};

use crate::errors::{TokenError, TokenResult};

/// Trait for ledger storage operations
///
/// This trait defines the minimal bookkeeping interface the policy layer
/// needs. Implementations must keep `sum(balances) == total_supply` and must
/// leave state untouched when they return an error.
pub trait Ledger {
    /// Balance held by `account` (zero if never credited)
    fn balance_of(&self, account: &Address) -> Amount;

    /// Total supply in circulation
    fn total_supply(&self) -> Amount;

    /// Remaining amount `spender` may move on behalf of `owner`
    fn allowance(&self, owner: &Address, spender: &Address) -> Amount;

    /// Overwrite the allowance of `spender` over `owner`'s balance
    fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount);

    /// Create `amount` new units on `to`
    fn mint(&mut self, to: &Address, amount: Amount) -> TokenResult<()>;

    /// Destroy `amount` units held by `from`
    fn burn(&mut self, from: &Address, amount: Amount) -> TokenResult<()>;

    /// Move `amount` from `from` to `to` with no policy applied
    fn transfer_core(&mut self, from: &Address, to: &Address, amount: Amount) -> TokenResult<()>;
}

/// In-memory ledger backed by hash maps
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts with a non-zero balance
    #[cfg(test)]
    pub(crate) fn holder_count(&self) -> usize {
        self.balances.values().filter(|b| **b > 0).count()
    }

    /// Sum of all balances; equals `total_supply` whenever the ledger is consistent
    pub fn balance_sum(&self) -> Amount {
        self.balances.values().sum()
    }
}

impl Ledger for MemoryLedger {
    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn total_supply(&self) -> Amount {
        self.total_supply
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        if amount == 0 {
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }
    }

    fn mint(&mut self, to: &Address, amount: Amount) -> TokenResult<()> {
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.total_supply = new_supply;
        self.balances.insert(*to, new_balance);
        Ok(())
    }

    fn burn(&mut self, from: &Address, amount: Amount) -> TokenResult<()> {
        let have = self.balance_of(from);
        let new_balance = have
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientBalance { have, need: amount })?;
        let new_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(TokenError::Overflow)?;

        self.balances.insert(*from, new_balance);
        self.total_supply = new_supply;
        Ok(())
    }

    fn transfer_core(&mut self, from: &Address, to: &Address, amount: Amount) -> TokenResult<()> {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }
        if amount == 0 || from == to {
            return Ok(());
        }

        let to_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        // Debit then credit; both values were computed before either write.
        self.balances.insert(*from, from_balance - amount);
        self.balances.insert(*to, to_balance);
        Ok(())
    }
}
