//! Administrative Interface
//!
//! Owner-only mutators of the policy store. Every call first checks the
//! caller against the single owner and fails with `Unauthorized` otherwise.
//! Flag setters are plain writes: setting a flag to its current value is not
//! an error and changes nothing.

use lib_types::{Address, Bps};

use crate::errors::{TokenError, TokenResult};
use crate::events::TokenEvent;
use crate::ledger::Ledger;
use crate::policy::AccountFlag;
use crate::token::TaxToken;

impl<L: Ledger> TaxToken<L> {
    // =========================================================================
    // Tax switch, rate and destination
    // =========================================================================

    pub fn enable_tax(&mut self, caller: &Address) -> TokenResult<()> {
        self.ownership.ensure_owner(caller)?;
        self.policy.tax_mut().set_enabled(true);
        self.events.emit(TokenEvent::TaxEnabled);
        tracing::info!(by = %caller, "tax enabled");
        Ok(())
    }

    pub fn disable_tax(&mut self, caller: &Address) -> TokenResult<()> {
        self.ownership.ensure_owner(caller)?;
        self.policy.tax_mut().set_enabled(false);
        self.events.emit(TokenEvent::TaxDisabled);
        tracing::info!(by = %caller, "tax disabled");
        Ok(())
    }

    /// Set the tax rate; must lie within the construction-time bounds
    pub fn update_tax_rate(&mut self, caller: &Address, new_rate: Bps) -> TokenResult<()> {
        self.ownership.ensure_owner(caller)?;
        let old_rate = self.policy.tax().rate();
        self.policy.tax_mut().set_rate(new_rate)?;
        self.events.emit(TokenEvent::TaxRateUpdated { rate: new_rate });
        tracing::info!(by = %caller, old_rate, new_rate, "tax rate updated");
        Ok(())
    }

    pub fn update_tax_destination(
        &mut self,
        caller: &Address,
        destination: &Address,
    ) -> TokenResult<()> {
        self.ownership.ensure_owner(caller)?;
        self.policy.tax_mut().set_destination(*destination)?;
        self.events.emit(TokenEvent::TaxDestinationUpdated {
            destination: *destination,
        });
        tracing::info!(by = %caller, %destination, "tax destination updated");
        Ok(())
    }

    // =========================================================================
    // Exemption flags
    // =========================================================================

    pub fn set_max_holding_exempt(
        &mut self,
        caller: &Address,
        account: &Address,
        flag: bool,
    ) -> TokenResult<()> {
        self.set_account_flag(caller, AccountFlag::MaxHoldingExempt, account, flag)
    }

    pub fn set_not_taxed_from(
        &mut self,
        caller: &Address,
        account: &Address,
        flag: bool,
    ) -> TokenResult<()> {
        self.set_account_flag(caller, AccountFlag::NotTaxedFrom, account, flag)
    }

    pub fn set_not_taxed_to(
        &mut self,
        caller: &Address,
        account: &Address,
        flag: bool,
    ) -> TokenResult<()> {
        self.set_account_flag(caller, AccountFlag::NotTaxedTo, account, flag)
    }

    pub fn set_always_taxed_from(
        &mut self,
        caller: &Address,
        account: &Address,
        flag: bool,
    ) -> TokenResult<()> {
        self.set_account_flag(caller, AccountFlag::AlwaysTaxedFrom, account, flag)
    }

    pub fn set_always_taxed_to(
        &mut self,
        caller: &Address,
        account: &Address,
        flag: bool,
    ) -> TokenResult<()> {
        self.set_account_flag(caller, AccountFlag::AlwaysTaxedTo, account, flag)
    }

    fn set_account_flag(
        &mut self,
        caller: &Address,
        flag: AccountFlag,
        account: &Address,
        value: bool,
    ) -> TokenResult<()> {
        self.ownership.ensure_owner(caller)?;
        self.policy.set_flag(flag, *account, value);
        tracing::info!(by = %caller, ?flag, %account, value, "account flag set");
        Ok(())
    }

    // =========================================================================
    // Blocklist
    // =========================================================================

    pub fn block_user(&mut self, caller: &Address, account: &Address) -> TokenResult<()> {
        self.ownership.ensure_owner(caller)?;
        if account.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.policy.set_flag(AccountFlag::Blocked, *account, true);
        self.events.emit(TokenEvent::UserBlocked { account: *account });
        tracing::info!(by = %caller, %account, "user blocked");
        Ok(())
    }

    pub fn unblock_user(&mut self, caller: &Address, account: &Address) -> TokenResult<()> {
        self.ownership.ensure_owner(caller)?;
        if account.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        self.policy.set_flag(AccountFlag::Blocked, *account, false);
        self.events.emit(TokenEvent::UserUnblocked { account: *account });
        tracing::info!(by = %caller, %account, "user unblocked");
        Ok(())
    }

    // =========================================================================
    // Ownership & pause
    // =========================================================================

    /// Hand the administrator capability to `new_owner`
    ///
    /// Exemption flags stay with the accounts they were set on; the new owner
    /// gets no implicit exemptions.
    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: &Address) -> TokenResult<()> {
        let previous = self.ownership.transfer_ownership(caller, *new_owner)?;
        self.events.emit(TokenEvent::OwnershipTransferred {
            previous,
            new: *new_owner,
        });
        tracing::info!(%previous, new = %new_owner, "ownership transferred");
        Ok(())
    }

    pub fn pause(&mut self, caller: &Address) -> TokenResult<()> {
        self.ownership.ensure_owner(caller)?;
        self.pause.set(true);
        self.events.emit(TokenEvent::Paused { by: *caller });
        tracing::warn!(by = %caller, "token paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: &Address) -> TokenResult<()> {
        self.ownership.ensure_owner(caller)?;
        self.pause.set(false);
        self.events.emit(TokenEvent::Unpaused { by: *caller });
        tracing::info!(by = %caller, "token unpaused");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::TokenError;
    use crate::events::TokenEvent;
    use crate::token::{TaxToken, TokenCreationParams};
    use lib_types::Address;

    const OWNER: Address = Address::new([1u8; 32]);
    const STRANGER: Address = Address::new([2u8; 32]);

    fn token() -> TaxToken {
        let mut token = TaxToken::new(TokenCreationParams {
            name: "Admin".to_string(),
            symbol: "ADM".to_string(),
            decimals: 0,
            tax_enabled: false,
            tax: 100,
            min_tax: 50,
            max_tax: 500,
            tax_destination: Address::new([99u8; 32]),
            max_holding_percent: None,
            initial_supply: 1_000,
            owner: OWNER,
        })
        .unwrap();
        token.take_events();
        token
    }

    #[test]
    fn test_enable_disable_round_trip() {
        let mut token = token();
        assert!(!token.is_tax_enabled());
        token.enable_tax(&OWNER).unwrap();
        assert!(token.is_tax_enabled());
        token.disable_tax(&OWNER).unwrap();
        assert!(!token.is_tax_enabled());
        assert_eq!(token.take_events(), vec![TokenEvent::TaxEnabled, TokenEvent::TaxDisabled]);
    }

    #[test]
    fn test_update_tax_rate_bounds() {
        let mut token = token();
        assert_eq!(
            token.update_tax_rate(&OWNER, 49),
            Err(TokenError::InvalidRange { min: 50, rate: 49, max: 500 })
        );
        assert_eq!(token.tax_rate(), 100);
        assert!(token.events().is_empty());

        token.update_tax_rate(&OWNER, 500).unwrap();
        assert_eq!(token.tax_rate(), 500);
        assert_eq!(token.events(), &[TokenEvent::TaxRateUpdated { rate: 500 }]);
    }

    #[test]
    fn test_update_tax_destination_rejects_zero() {
        let mut token = token();
        assert_eq!(
            token.update_tax_destination(&OWNER, &Address::zero()),
            Err(TokenError::ZeroAddress)
        );
        token.update_tax_destination(&OWNER, &STRANGER).unwrap();
        assert_eq!(token.tax_destination(), STRANGER);
    }

    #[test]
    fn test_block_and_unblock() {
        let mut token = token();
        assert_eq!(token.block_user(&OWNER, &Address::zero()), Err(TokenError::ZeroAddress));
        assert_eq!(token.unblock_user(&OWNER, &Address::zero()), Err(TokenError::ZeroAddress));

        token.block_user(&OWNER, &STRANGER).unwrap();
        assert!(token.is_blocked(&STRANGER));
        token.unblock_user(&OWNER, &STRANGER).unwrap();
        assert!(!token.is_blocked(&STRANGER));
        assert_eq!(
            token.take_events(),
            vec![
                TokenEvent::UserBlocked { account: STRANGER },
                TokenEvent::UserUnblocked { account: STRANGER },
            ]
        );
    }

    #[test]
    fn test_flag_setters_are_idempotent() {
        let mut token = token();
        token.set_not_taxed_to(&OWNER, &STRANGER, true).unwrap();
        token.set_not_taxed_to(&OWNER, &STRANGER, true).unwrap();
        assert!(token.is_not_taxed_to(&STRANGER));

        token.set_always_taxed_from(&OWNER, &STRANGER, false).unwrap();
        assert!(!token.is_always_taxed_from(&STRANGER));

        // Flag writes emit no events
        assert!(token.events().is_empty());
    }

    #[test]
    fn test_every_admin_call_requires_owner() {
        let mut token = token();
        let denied = TokenError::Unauthorized { caller: STRANGER };
        let target = Address::new([3u8; 32]);

        assert_eq!(token.enable_tax(&STRANGER), Err(denied.clone()));
        assert_eq!(token.disable_tax(&STRANGER), Err(denied.clone()));
        assert_eq!(token.update_tax_rate(&STRANGER, 100), Err(denied.clone()));
        assert_eq!(token.update_tax_destination(&STRANGER, &target), Err(denied.clone()));
        assert_eq!(token.set_max_holding_exempt(&STRANGER, &target, true), Err(denied.clone()));
        assert_eq!(token.set_not_taxed_from(&STRANGER, &target, true), Err(denied.clone()));
        assert_eq!(token.set_not_taxed_to(&STRANGER, &target, true), Err(denied.clone()));
        assert_eq!(token.set_always_taxed_from(&STRANGER, &target, true), Err(denied.clone()));
        assert_eq!(token.set_always_taxed_to(&STRANGER, &target, true), Err(denied.clone()));
        assert_eq!(token.block_user(&STRANGER, &target), Err(denied.clone()));
        assert_eq!(token.unblock_user(&STRANGER, &target), Err(denied.clone()));
        assert_eq!(token.transfer_ownership(&STRANGER, &target), Err(denied.clone()));
        assert_eq!(token.pause(&STRANGER), Err(denied.clone()));
        assert_eq!(token.unpause(&STRANGER), Err(denied));

        assert!(token.events().is_empty());
        assert_eq!(token.account_policy(&target), Default::default());
    }

    #[test]
    fn test_transfer_ownership_moves_capability() {
        let mut token = token();
        token.transfer_ownership(&OWNER, &STRANGER).unwrap();
        assert_eq!(token.owner(), STRANGER);
        assert!(token.enable_tax(&OWNER).is_err());
        assert!(token.enable_tax(&STRANGER).is_ok());
    }
}
