//! Policy Store
//!
//! All configuration that feeds the transfer checkpoint: tax settings, the
//! optional per-wallet holding cap, and per-account flags (blocklist and
//! exemption sets).
//!
//! # Invariants
//!
//! - `min_rate <= rate <= max_rate <= PRECISION` at all times
//! - `destination` is never the zero address
//! - `max_holding_per_wallet` never changes after construction

use std::collections::{HashMap, HashSet};

use lib_types::{Address, Amount, Bps, PRECISION};
use serde::{Deserialize, Serialize};

use crate::errors::{TokenError, TokenResult};

// =============================================================================
// TAX CONFIG
// =============================================================================

/// Transfer tax settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxConfig {
    enabled: bool,
    rate: Bps,
    min_rate: Bps,
    max_rate: Bps,
    destination: Address,
}

/// How a taxed amount splits between the fee destination and the recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxSplit {
    pub fee: Amount,
    pub net: Amount,
}

impl TaxConfig {
    /// Validate and build a tax configuration
    pub fn new(
        enabled: bool,
        rate: Bps,
        min_rate: Bps,
        max_rate: Bps,
        destination: Address,
    ) -> TokenResult<Self> {
        if min_rate > max_rate || rate < min_rate || rate > max_rate || max_rate > PRECISION {
            return Err(TokenError::InvalidRange {
                min: min_rate,
                rate,
                max: max_rate,
            });
        }
        if destination.is_zero() {
            return Err(TokenError::ZeroAddress);
        }

        Ok(Self {
            enabled,
            rate,
            min_rate,
            max_rate,
            destination,
        })
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn rate(&self) -> Bps {
        self.rate
    }

    pub fn min_rate(&self) -> Bps {
        self.min_rate
    }

    pub fn max_rate(&self) -> Bps {
        self.max_rate
    }

    pub fn destination(&self) -> Address {
        self.destination
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Change the rate; fails with `InvalidRange` outside `[min_rate, max_rate]`
    pub(crate) fn set_rate(&mut self, rate: Bps) -> TokenResult<()> {
        if rate < self.min_rate || rate > self.max_rate {
            return Err(TokenError::InvalidRange {
                min: self.min_rate,
                rate,
                max: self.max_rate,
            });
        }
        self.rate = rate;
        Ok(())
    }

    pub(crate) fn set_destination(&mut self, destination: Address) -> TokenResult<()> {
        if destination.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.destination = destination;
        Ok(())
    }

    /// Split `amount` into fee and net at the current rate
    ///
    /// Formula: fee = floor(amount * rate / PRECISION), net = amount - fee.
    /// Evaluated as quotient and remainder parts so it cannot overflow for
    /// any `Amount`.
    pub fn split(&self, amount: Amount) -> TaxSplit {
        let fee = apply_bps(amount, self.rate);
        TaxSplit {
            fee,
            net: amount - fee,
        }
    }
}

/// floor(amount * bps / PRECISION) without intermediate overflow
///
/// `bps` must not exceed `PRECISION`, which keeps the result `<= amount`.
pub fn apply_bps(amount: Amount, bps: Bps) -> Amount {
    let scale = PRECISION as Amount;
    let bps = bps as Amount;
    (amount / scale) * bps + (amount % scale) * bps / scale
}

// =============================================================================
// HOLDING LIMIT
// =============================================================================

/// Maximum balance a non-exempt account may reach through a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HoldingLimit {
    max_holding_per_wallet: Amount,
}

impl HoldingLimit {
    /// Derive the cap as `supply * percent / PRECISION`
    pub fn from_percent(supply: Amount, percent: Bps) -> TokenResult<Self> {
        if percent > PRECISION {
            return Err(TokenError::InvalidHoldingPercent(percent));
        }
        Ok(Self {
            max_holding_per_wallet: apply_bps(supply, percent),
        })
    }

    pub fn max_holding_per_wallet(&self) -> Amount {
        self.max_holding_per_wallet
    }
}

// =============================================================================
// ACCOUNT FLAGS
// =============================================================================

/// Per-account boolean policy flags (all default to false)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountFlag {
    /// Any transfer from or to this account is rejected
    Blocked,
    /// Transfers sent by this account are untaxed
    NotTaxedFrom,
    /// Transfers received by this account are untaxed
    NotTaxedTo,
    /// Transfers sent by this account are taxed even if otherwise exempt
    AlwaysTaxedFrom,
    /// Transfers received by this account are taxed even if otherwise exempt
    AlwaysTaxedTo,
    /// Account may exceed the holding cap
    MaxHoldingExempt,
}

impl AccountFlag {
    pub const ALL: [AccountFlag; 6] = [
        AccountFlag::Blocked,
        AccountFlag::NotTaxedFrom,
        AccountFlag::NotTaxedTo,
        AccountFlag::AlwaysTaxedFrom,
        AccountFlag::AlwaysTaxedTo,
        AccountFlag::MaxHoldingExempt,
    ];
}

/// Flag set: maps each flag to the addresses it is raised for
///
/// An address absent from a flag's set reads as false. Clearing a flag removes
/// the address, so unset and cleared are indistinguishable.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountFlags {
    flags: HashMap<AccountFlag, HashSet<Address>>,
}

impl AccountFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise or clear `flag` for `account`
    pub fn set(&mut self, flag: AccountFlag, account: Address, value: bool) {
        if value {
            self.flags.entry(flag).or_default().insert(account);
        } else if let Some(set) = self.flags.get_mut(&flag) {
            set.remove(&account);
        }
    }

    pub fn get(&self, flag: AccountFlag, account: &Address) -> bool {
        self.flags
            .get(&flag)
            .map(|set| set.contains(account))
            .unwrap_or(false)
    }

    /// All addresses with `flag` raised
    #[cfg(test)]
    pub(crate) fn addresses(&self, flag: AccountFlag) -> impl Iterator<Item = &Address> {
        self.flags
            .get(&flag)
            .map(|set| set.iter())
            .into_iter()
            .flatten()
    }
}

/// Snapshot of every flag for one account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPolicy {
    pub blocked: bool,
    pub not_taxed_from: bool,
    pub not_taxed_to: bool,
    pub always_taxed_from: bool,
    pub always_taxed_to: bool,
    pub max_holding_exempt: bool,
}

// =============================================================================
// POLICY STORE
// =============================================================================

/// Owner of all policy state consulted by the transfer engine
#[derive(Debug, Clone, Serialize)]
pub struct PolicyStore {
    tax: TaxConfig,
    holding_limit: Option<HoldingLimit>,
    flags: AccountFlags,
}

impl PolicyStore {
    pub fn new(tax: TaxConfig, holding_limit: Option<HoldingLimit>) -> Self {
        Self {
            tax,
            holding_limit,
            flags: AccountFlags::new(),
        }
    }

    pub fn tax(&self) -> &TaxConfig {
        &self.tax
    }

    pub(crate) fn tax_mut(&mut self) -> &mut TaxConfig {
        &mut self.tax
    }

    pub fn holding_limit(&self) -> Option<HoldingLimit> {
        self.holding_limit
    }

    /// Cap in base units, if one is enforced
    pub fn max_holding_per_wallet(&self) -> Option<Amount> {
        self.holding_limit.map(|l| l.max_holding_per_wallet())
    }

    pub fn flag(&self, flag: AccountFlag, account: &Address) -> bool {
        self.flags.get(flag, account)
    }

    pub(crate) fn set_flag(&mut self, flag: AccountFlag, account: Address, value: bool) {
        self.flags.set(flag, account, value);
    }

    pub fn flags(&self) -> &AccountFlags {
        &self.flags
    }

    pub fn is_blocked(&self, account: &Address) -> bool {
        self.flag(AccountFlag::Blocked, account)
    }

    pub fn account_policy(&self, account: &Address) -> AccountPolicy {
        AccountPolicy {
            blocked: self.flag(AccountFlag::Blocked, account),
            not_taxed_from: self.flag(AccountFlag::NotTaxedFrom, account),
            not_taxed_to: self.flag(AccountFlag::NotTaxedTo, account),
            always_taxed_from: self.flag(AccountFlag::AlwaysTaxedFrom, account),
            always_taxed_to: self.flag(AccountFlag::AlwaysTaxedTo, account),
            max_holding_exempt: self.flag(AccountFlag::MaxHoldingExempt, account),
        }
    }

    /// Fail with `Blocked` naming the first blocklisted party (sender first)
    pub fn ensure_not_blocked(&self, from: &Address, to: &Address) -> TokenResult<()> {
        if self.is_blocked(from) {
            return Err(TokenError::Blocked(*from));
        }
        if self.is_blocked(to) {
            return Err(TokenError::Blocked(*to));
        }
        Ok(())
    }

    /// Whether a transfer from `from` to `to` skips the tax
    ///
    /// exempt = (!enabled || notTaxedFrom[from] || notTaxedTo[to])
    ///          && !alwaysTaxedFrom[from] && !alwaysTaxedTo[to]
    pub fn is_exempt(&self, from: &Address, to: &Address) -> bool {
        let untaxed = !self.tax.enabled()
            || self.flag(AccountFlag::NotTaxedFrom, from)
            || self.flag(AccountFlag::NotTaxedTo, to);
        let forced = self.flag(AccountFlag::AlwaysTaxedFrom, from)
            || self.flag(AccountFlag::AlwaysTaxedTo, to);
        untaxed && !forced
    }

    /// Fail with `MaxHoldingReached` if crediting `incoming` to `to` would
    /// push its balance past the cap
    pub fn ensure_within_holding_limit(
        &self,
        to: &Address,
        current_balance: Amount,
        incoming: Amount,
    ) -> TokenResult<()> {
        let Some(limit) = self.max_holding_per_wallet() else {
            return Ok(());
        };
        if self.flag(AccountFlag::MaxHoldingExempt, to) {
            return Ok(());
        }

        let would_have = current_balance
            .checked_add(incoming)
            .ok_or(TokenError::Overflow)?;
        if would_have > limit {
            return Err(TokenError::MaxHoldingReached {
                account: *to,
                would_have,
                limit,
            });
        }
        Ok(())
    }
}
