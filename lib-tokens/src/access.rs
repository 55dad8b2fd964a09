//! Access Control
//!
//! A single privileged administrator (the owner) and a pause switch. The owner
//! check is an explicit comparison against the stored owner address, passed in
//! as the `caller` of every administrative operation.

use lib_types::Address;
use serde::{Deserialize, Serialize};

use crate::errors::{TokenError, TokenResult};

/// Single-owner capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ownership {
    owner: Address,
}

impl Ownership {
    /// Create ownership held by `owner` (must not be the zero address)
    pub fn new(owner: Address) -> TokenResult<Self> {
        if owner.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        Ok(Self { owner })
    }

    /// Current owner
    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        self.owner == *caller
    }

    /// Fail with `Unauthorized` unless `caller` holds the capability
    pub fn ensure_owner(&self, caller: &Address) -> TokenResult<()> {
        if !self.is_owner(caller) {
            return Err(TokenError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    /// Hand the capability to `new_owner`, returning the previous owner
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> TokenResult<Address> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TokenError::ZeroAddress);
        }
        let previous = self.owner;
        self.owner = new_owner;
        Ok(previous)
    }
}

/// Emergency stop for holder-initiated balance changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSwitch {
    paused: bool,
}

impl PauseSwitch {
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn ensure_not_paused(&self) -> TokenResult<()> {
        if self.paused {
            return Err(TokenError::Paused);
        }
        Ok(())
    }

    pub fn set(&mut self, paused: bool) {
        self.paused = paused;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_rejects_zero_owner() {
        assert_eq!(Ownership::new(Address::zero()), Err(TokenError::ZeroAddress));
    }

    #[test]
    fn test_ensure_owner() {
        let owner = Address::new([1u8; 32]);
        let stranger = Address::new([2u8; 32]);
        let ownership = Ownership::new(owner).unwrap();

        assert!(ownership.ensure_owner(&owner).is_ok());
        assert_eq!(
            ownership.ensure_owner(&stranger),
            Err(TokenError::Unauthorized { caller: stranger })
        );
    }

    #[test]
    fn test_transfer_ownership() {
        let owner = Address::new([1u8; 32]);
        let next = Address::new([2u8; 32]);
        let mut ownership = Ownership::new(owner).unwrap();

        assert_eq!(
            ownership.transfer_ownership(&owner, Address::zero()),
            Err(TokenError::ZeroAddress)
        );
        assert_eq!(ownership.transfer_ownership(&owner, next), Ok(owner));
        assert_eq!(ownership.owner(), next);

        // Old owner lost the capability
        assert!(ownership.transfer_ownership(&owner, owner).is_err());
    }

    #[test]
    fn test_pause_switch() {
        let mut switch = PauseSwitch::default();
        assert!(switch.ensure_not_paused().is_ok());
        switch.set(true);
        assert_eq!(switch.ensure_not_paused(), Err(TokenError::Paused));
    }
}
