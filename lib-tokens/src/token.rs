//! Tax Token
//!
//! The holder-facing token: metadata, construction, transfers, allowances,
//! burns and read-only queries. Every balance-changing call is routed through
//! the [`TransferPolicyEngine`]; administrative mutators live in
//! [`crate::admin`].

use lib_types::{Address, Amount, Bps};
use serde::{Deserialize, Serialize};

use crate::access::{Ownership, PauseSwitch};
use crate::engine::{ReentrancyGuard, TransferPolicyEngine, TransferResult};
use crate::errors::{TokenError, TokenResult};
use crate::events::{EventLog, TokenEvent};
use crate::ledger::{Ledger, MemoryLedger};
use crate::policy::{AccountFlag, AccountPolicy, HoldingLimit, PolicyStore, TaxConfig};

/// Default number of decimal places
pub const DEFAULT_DECIMALS: u8 = 18;

// =============================================================================
// METADATA & CREATION PARAMETERS
// =============================================================================

/// Immutable metadata (set at creation)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Human-readable token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Number of decimal places (display only)
    pub decimals: u8,
}

/// Parameters for creating a new [`TaxToken`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCreationParams {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub tax_enabled: bool,
    /// Initial tax rate in basis points
    pub tax: Bps,
    pub min_tax: Bps,
    pub max_tax: Bps,
    pub tax_destination: Address,
    /// Per-wallet cap as a share of the initial supply, in basis points
    pub max_holding_percent: Option<Bps>,
    /// Initial supply in whole tokens; scaled by `10^decimals` when minted
    pub initial_supply: Amount,
    pub owner: Address,
}

// =============================================================================
// TAX TOKEN
// =============================================================================

/// Fungible token with policy-gated transfers
#[derive(Debug)]
pub struct TaxToken<L: Ledger = MemoryLedger> {
    pub(crate) metadata: TokenMetadata,
    pub(crate) ownership: Ownership,
    pub(crate) pause: PauseSwitch,
    pub(crate) policy: PolicyStore,
    pub(crate) ledger: L,
    pub(crate) events: EventLog,
    pub(crate) guard: ReentrancyGuard,
}

impl TaxToken<MemoryLedger> {
    /// Create a token over a fresh in-memory ledger
    pub fn new(params: TokenCreationParams) -> TokenResult<Self> {
        Self::with_ledger(params, MemoryLedger::new())
    }
}

impl<L: Ledger> TaxToken<L> {
    /// Create a token over `ledger`
    ///
    /// All parameters are validated before any state is written. On success
    /// the owner is marked not-taxed in both directions and exempt from the
    /// holding cap, and the scaled initial supply is minted to the owner.
    pub fn with_ledger(params: TokenCreationParams, mut ledger: L) -> TokenResult<Self> {
        let tax = TaxConfig::new(
            params.tax_enabled,
            params.tax,
            params.min_tax,
            params.max_tax,
            params.tax_destination,
        )?;
        let ownership = Ownership::new(params.owner)?;

        let scale = 10u128
            .checked_pow(params.decimals as u32)
            .ok_or(TokenError::Overflow)?;
        let minted = params
            .initial_supply
            .checked_mul(scale)
            .ok_or(TokenError::Overflow)?;

        let holding_limit = params
            .max_holding_percent
            .map(|percent| HoldingLimit::from_percent(minted, percent))
            .transpose()?;

        let mut policy = PolicyStore::new(tax, holding_limit);
        policy.set_flag(AccountFlag::NotTaxedFrom, params.owner, true);
        policy.set_flag(AccountFlag::NotTaxedTo, params.owner, true);
        policy.set_flag(AccountFlag::MaxHoldingExempt, params.owner, true);

        ledger.mint(&params.owner, minted)?;

        let mut events = EventLog::new();
        events.emit(TokenEvent::OwnershipTransferred {
            previous: Address::zero(),
            new: params.owner,
        });
        events.emit(TokenEvent::Transfer {
            from: Address::zero(),
            to: params.owner,
            amount: minted,
        });

        tracing::info!(
            name = %params.name,
            symbol = %params.symbol,
            owner = %params.owner,
            supply = %minted,
            tax_enabled = params.tax_enabled,
            rate = params.tax,
            max_holding = ?policy.max_holding_per_wallet(),
            "tax token created"
        );

        Ok(Self {
            metadata: TokenMetadata {
                name: params.name,
                symbol: params.symbol,
                decimals: params.decimals,
            },
            ownership,
            pause: PauseSwitch::default(),
            policy,
            ledger,
            events,
            guard: ReentrancyGuard::new(),
        })
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    /// Transfer `amount` from `caller` to `to`
    pub fn transfer(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<TransferResult> {
        self.pause.ensure_not_paused()?;
        if to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.engine().execute(*caller, *to, amount)
    }

    /// Transfer `amount` from `from` to `to` using `spender`'s allowance
    ///
    /// The allowance is checked for the gross amount up front and consumed
    /// only after the transfer succeeded. An allowance of `Amount::MAX` is
    /// treated as unlimited and never decremented.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> TokenResult<TransferResult> {
        self.pause.ensure_not_paused()?;
        if from.is_zero() || to.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let allowance = self.ensure_allowance(from, spender, amount)?;

        let result = self.engine().execute(*from, *to, amount)?;

        if allowance != Amount::MAX {
            self.ledger.set_allowance(from, spender, allowance - amount);
        }
        Ok(result)
    }

    // =========================================================================
    // Allowances
    // =========================================================================

    /// Set `spender`'s allowance over `caller`'s balance
    pub fn approve(
        &mut self,
        caller: &Address,
        spender: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        if spender.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.ledger.set_allowance(caller, spender, amount);
        self.events.emit(TokenEvent::Approval {
            owner: *caller,
            spender: *spender,
            amount,
        });
        Ok(())
    }

    pub fn increase_allowance(
        &mut self,
        caller: &Address,
        spender: &Address,
        added: Amount,
    ) -> TokenResult<()> {
        let current = self.ledger.allowance(caller, spender);
        let updated = current.checked_add(added).ok_or(TokenError::Overflow)?;
        self.approve(caller, spender, updated)
    }

    pub fn decrease_allowance(
        &mut self,
        caller: &Address,
        spender: &Address,
        subtracted: Amount,
    ) -> TokenResult<()> {
        let current = self.ledger.allowance(caller, spender);
        let updated = current
            .checked_sub(subtracted)
            .ok_or(TokenError::InsufficientAllowance {
                have: current,
                need: subtracted,
            })?;
        self.approve(caller, spender, updated)
    }

    // =========================================================================
    // Burns
    // =========================================================================

    /// Destroy `amount` of `caller`'s balance
    ///
    /// Burns bypass tax and the holding cap but not the blocklist or pause.
    pub fn burn(&mut self, caller: &Address, amount: Amount) -> TokenResult<()> {
        self.pause.ensure_not_paused()?;
        self.burn_unchecked_allowance(caller, amount)
    }

    /// Destroy `amount` of `from`'s balance using `spender`'s allowance
    pub fn burn_from(
        &mut self,
        spender: &Address,
        from: &Address,
        amount: Amount,
    ) -> TokenResult<()> {
        self.pause.ensure_not_paused()?;
        let allowance = self.ensure_allowance(from, spender, amount)?;

        self.burn_unchecked_allowance(from, amount)?;

        if allowance != Amount::MAX {
            self.ledger.set_allowance(from, spender, allowance - amount);
        }
        Ok(())
    }

    fn burn_unchecked_allowance(&mut self, from: &Address, amount: Amount) -> TokenResult<()> {
        let _scope = self.guard.enter()?;

        if self.policy.is_blocked(from) {
            return Err(TokenError::Blocked(*from));
        }
        self.ledger.burn(from, amount)?;
        self.events.emit(TokenEvent::Transfer {
            from: *from,
            to: Address::zero(),
            amount,
        });

        tracing::debug!(from = %from, amount = %amount, "tokens burned");
        Ok(())
    }

    fn ensure_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> TokenResult<Amount> {
        let have = self.ledger.allowance(owner, spender);
        if have < amount {
            return Err(TokenError::InsufficientAllowance { have, need: amount });
        }
        Ok(have)
    }

    fn engine(&mut self) -> TransferPolicyEngine<'_, L> {
        TransferPolicyEngine::new(&self.guard, &self.policy, &mut self.ledger, &mut self.events)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    pub fn total_supply(&self) -> Amount {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.ledger.allowance(owner, spender)
    }

    pub fn owner(&self) -> Address {
        self.ownership.owner()
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    /// Current tax configuration
    pub fn tax_config(&self) -> &TaxConfig {
        self.policy.tax()
    }

    pub fn is_tax_enabled(&self) -> bool {
        self.policy.tax().enabled()
    }

    pub fn tax_rate(&self) -> Bps {
        self.policy.tax().rate()
    }

    pub fn tax_destination(&self) -> Address {
        self.policy.tax().destination()
    }

    /// Per-wallet cap in base units, if one is enforced
    pub fn max_holding_per_wallet(&self) -> Option<Amount> {
        self.policy.max_holding_per_wallet()
    }

    /// Every flag for `account`
    pub fn account_policy(&self, account: &Address) -> AccountPolicy {
        self.policy.account_policy(account)
    }

    pub fn is_blocked(&self, account: &Address) -> bool {
        self.policy.flag(AccountFlag::Blocked, account)
    }

    pub fn is_not_taxed_from(&self, account: &Address) -> bool {
        self.policy.flag(AccountFlag::NotTaxedFrom, account)
    }

    pub fn is_not_taxed_to(&self, account: &Address) -> bool {
        self.policy.flag(AccountFlag::NotTaxedTo, account)
    }

    pub fn is_always_taxed_from(&self, account: &Address) -> bool {
        self.policy.flag(AccountFlag::AlwaysTaxedFrom, account)
    }

    pub fn is_always_taxed_to(&self, account: &Address) -> bool {
        self.policy.flag(AccountFlag::AlwaysTaxedTo, account)
    }

    pub fn is_max_holding_exempt(&self, account: &Address) -> bool {
        self.policy.flag(AccountFlag::MaxHoldingExempt, account)
    }

    pub fn policy(&self) -> &PolicyStore {
        &self.policy
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Events emitted since the last [`TaxToken::take_events`]
    pub fn events(&self) -> &[TokenEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<TokenEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new([b; 32])
    }

    fn params() -> TokenCreationParams {
        TokenCreationParams {
            name: "Test".to_string(),
            symbol: "TST".to_string(),
            decimals: 6,
            tax_enabled: true,
            tax: 100,
            min_tax: 0,
            max_tax: 1_000,
            tax_destination: addr(99),
            max_holding_percent: Some(200),
            initial_supply: 1_000_000,
            owner: addr(1),
        }
    }

    #[test]
    fn test_construction_mints_scaled_supply_to_owner() {
        let token = TaxToken::new(params()).unwrap();

        assert_eq!(token.total_supply(), 1_000_000_000_000);
        assert_eq!(token.balance_of(&addr(1)), 1_000_000_000_000);
        assert_eq!(token.max_holding_per_wallet(), Some(20_000_000_000));
        assert_eq!(token.owner(), addr(1));
        assert_eq!(token.decimals(), 6);
        assert_eq!(
            token.account_policy(&addr(1)),
            AccountPolicy {
                not_taxed_from: true,
                not_taxed_to: true,
                max_holding_exempt: true,
                ..AccountPolicy::default()
            }
        );
    }

    #[test]
    fn test_construction_rejects_invalid_range() {
        let mut p = params();
        p.tax = 2_000;
        assert_eq!(
            TaxToken::new(p).unwrap_err(),
            TokenError::InvalidRange { min: 0, rate: 2_000, max: 1_000 }
        );
    }

    #[test]
    fn test_construction_rejects_zero_addresses() {
        let mut p = params();
        p.tax_destination = Address::zero();
        assert_eq!(TaxToken::new(p).unwrap_err(), TokenError::ZeroAddress);

        let mut p = params();
        p.owner = Address::zero();
        assert_eq!(TaxToken::new(p).unwrap_err(), TokenError::ZeroAddress);
    }

    #[test]
    fn test_construction_rejects_supply_overflow() {
        let mut p = params();
        p.decimals = 18;
        p.initial_supply = Amount::MAX / 10;
        assert_eq!(TaxToken::new(p).unwrap_err(), TokenError::Overflow);
    }

    #[test]
    fn test_without_holding_limit() {
        let mut p = params();
        p.max_holding_percent = None;
        let token = TaxToken::new(p).unwrap();
        assert_eq!(token.max_holding_per_wallet(), None);
    }

    #[test]
    fn test_construction_events() {
        let mut token = TaxToken::new(params()).unwrap();
        let events = token.take_events();
        assert_eq!(
            events,
            vec![
                TokenEvent::OwnershipTransferred { previous: Address::zero(), new: addr(1) },
                TokenEvent::Transfer {
                    from: Address::zero(),
                    to: addr(1),
                    amount: 1_000_000_000_000
                },
            ]
        );
        assert!(token.events().is_empty());
    }

    #[test]
    fn test_transfer_to_zero_address_rejected() {
        let mut token = TaxToken::new(params()).unwrap();
        assert_eq!(
            token.transfer(&addr(1), &Address::zero(), 10),
            Err(TokenError::ZeroAddress)
        );
    }

    #[test]
    fn test_allowance_adjustments() {
        let mut token = TaxToken::new(params()).unwrap();
        token.approve(&addr(1), &addr(2), 100).unwrap();
        token.increase_allowance(&addr(1), &addr(2), 50).unwrap();
        assert_eq!(token.allowance(&addr(1), &addr(2)), 150);

        assert_eq!(
            token.decrease_allowance(&addr(1), &addr(2), 151),
            Err(TokenError::InsufficientAllowance { have: 150, need: 151 })
        );
        token.decrease_allowance(&addr(1), &addr(2), 150).unwrap();
        assert_eq!(token.allowance(&addr(1), &addr(2)), 0);
    }

    #[test]
    fn test_approve_zero_spender_rejected() {
        let mut token = TaxToken::new(params()).unwrap();
        assert_eq!(token.approve(&addr(1), &Address::zero(), 1), Err(TokenError::ZeroAddress));
    }

    #[test]
    fn test_burn_reduces_supply() {
        let mut token = TaxToken::new(params()).unwrap();
        token.burn(&addr(1), 1_000).unwrap();
        assert_eq!(token.total_supply(), 1_000_000_000_000 - 1_000);
        assert_eq!(
            token.events().last(),
            Some(&TokenEvent::Transfer { from: addr(1), to: Address::zero(), amount: 1_000 })
        );
    }

    #[test]
    fn test_burn_from_consumes_allowance() {
        let mut token = TaxToken::new(params()).unwrap();
        token.approve(&addr(1), &addr(2), 500).unwrap();

        assert_eq!(
            token.burn_from(&addr(2), &addr(1), 600),
            Err(TokenError::InsufficientAllowance { have: 500, need: 600 })
        );
        token.burn_from(&addr(2), &addr(1), 200).unwrap();
        assert_eq!(token.allowance(&addr(1), &addr(2)), 300);
    }
}
