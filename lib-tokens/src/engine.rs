//! Transfer Policy Engine
//!
//! The single checkpoint every balance move passes through. Given a transfer
//! request it consults the [`PolicyStore`] and decides whether the transfer is
//! rejected, moved untaxed, or split into a fee leg and a net leg.
//!
//! # Evaluation order
//!
//! 1. **Blocklist**: sender, then recipient
//! 2. **Exemption**: classifies the transfer as exempt or taxed
//! 3. **Exempt path**: holding cap against the gross amount, then one move
//! 4. **Taxed path**: balance pre-check, fee split, holding cap against the
//!    net amount, then the fee move followed by the net move
//!
//! All checks run before the first ledger mutation. The engine never touches
//! balances directly, only through [`Ledger::transfer_core`].

use std::cell::Cell;

use lib_types::{Address, Amount};

use crate::errors::{TokenError, TokenResult};
use crate::events::{EventLog, TokenEvent};
use crate::ledger::Ledger;
use crate::policy::PolicyStore;

// =============================================================================
// REENTRANCY GUARD
// =============================================================================

/// In-progress flag scoped to one `execute` call
///
/// Entering while already entered fails with [`TokenError::Reentrant`]. The
/// flag is released when the returned [`GuardScope`] drops, so every exit
/// path (including `?` early returns) clears it.
#[derive(Debug, Default)]
pub struct ReentrancyGuard {
    entered: Cell<bool>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> TokenResult<GuardScope<'_>> {
        if self.entered.replace(true) {
            return Err(TokenError::Reentrant);
        }
        Ok(GuardScope { guard: self })
    }

    #[cfg(test)]
    pub(crate) fn is_entered(&self) -> bool {
        self.entered.get()
    }
}

/// Held for the duration of one guarded call
#[derive(Debug)]
pub struct GuardScope<'a> {
    guard: &'a ReentrancyGuard,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        self.guard.entered.set(false);
    }
}

// =============================================================================
// TRANSFER RESULT
// =============================================================================

/// Result of a successful transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferResult {
    /// Gross amount debited from the sender
    pub amount: Amount,
    /// Amount credited to the tax destination
    pub fee: Amount,
    /// Amount credited to the recipient
    pub net: Amount,
    /// Whether the taxed path was taken
    pub taxed: bool,
}

impl TransferResult {
    fn exempt(amount: Amount) -> Self {
        Self {
            amount,
            fee: 0,
            net: amount,
            taxed: false,
        }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Borrowed view over the state one transfer needs
pub struct TransferPolicyEngine<'a, L: Ledger + ?Sized> {
    guard: &'a ReentrancyGuard,
    policy: &'a PolicyStore,
    ledger: &'a mut L,
    events: &'a mut EventLog,
}

impl<'a, L: Ledger + ?Sized> TransferPolicyEngine<'a, L> {
    pub fn new(
        guard: &'a ReentrancyGuard,
        policy: &'a PolicyStore,
        ledger: &'a mut L,
        events: &'a mut EventLog,
    ) -> Self {
        Self {
            guard,
            policy,
            ledger,
            events,
        }
    }

    /// Run one transfer through the policy checkpoint
    ///
    /// # Returns
    ///
    /// * `Ok(TransferResult)` - fee/net breakdown of the executed moves
    /// * `Err(TokenError)` - nothing was moved
    pub fn execute(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> TokenResult<TransferResult> {
        let guard = self.guard;
        let _scope = guard.enter()?;

        let result = self.apply(from, to, amount);
        match &result {
            Ok(r) => tracing::debug!(
                %from,
                %to,
                amount = %amount,
                fee = %r.fee,
                net = %r.net,
                taxed = r.taxed,
                "transfer executed"
            ),
            Err(e) => tracing::warn!(%from, %to, amount = %amount, error = %e, "transfer rejected"),
        }
        result
    }

    fn apply(&mut self, from: Address, to: Address, amount: Amount) -> TokenResult<TransferResult> {
        // =====================================================================
        // Step 1: Blocklist
        // =====================================================================
        self.policy.ensure_not_blocked(&from, &to)?;

        // =====================================================================
        // Step 2: Classification
        // =====================================================================
        if self.policy.is_exempt(&from, &to) {
            self.apply_exempt(from, to, amount)
        } else {
            self.apply_taxed(from, to, amount)
        }
    }

    fn apply_exempt(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> TokenResult<TransferResult> {
        self.policy
            .ensure_within_holding_limit(&to, self.ledger.balance_of(&to), amount)?;

        self.ledger.transfer_core(&from, &to, amount)?;
        self.events.emit(TokenEvent::Transfer { from, to, amount });

        Ok(TransferResult::exempt(amount))
    }

    fn apply_taxed(
        &mut self,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> TokenResult<TransferResult> {
        let have = self.ledger.balance_of(&from);
        if amount > have {
            return Err(TokenError::InsufficientBalance { have, need: amount });
        }

        let split = self.policy.tax().split(amount);
        debug_assert_eq!(split.fee + split.net, amount);

        // Capacity is checked against what actually lands on `to`
        self.policy
            .ensure_within_holding_limit(&to, self.ledger.balance_of(&to), split.net)?;

        let destination = self.policy.tax().destination();

        // Zero-value fee legs are skipped: no ledger call, no Transfer event.
        if split.fee > 0 {
            self.ledger.transfer_core(&from, &destination, split.fee)?;
        }

        if let Err(e) = self.ledger.transfer_core(&from, &to, split.net) {
            if split.fee > 0 {
                self.ledger
                    .transfer_core(&destination, &from, split.fee)
                    .map_err(|rollback| {
                        tracing::error!(
                            %from,
                            %destination,
                            fee = %split.fee,
                            error = %rollback,
                            "fee leg rollback failed"
                        );
                        rollback
                    })?;
            }
            return Err(e);
        }

        if split.fee > 0 {
            self.events.emit(TokenEvent::Transfer {
                from,
                to: destination,
                amount: split.fee,
            });
        }
        self.events.emit(TokenEvent::Transfer {
            from,
            to,
            amount: split.net,
        });

        Ok(TransferResult {
            amount,
            fee: split.fee,
            net: split.net,
            taxed: true,
        })
    }
}
