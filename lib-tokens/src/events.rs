//! Token Events
//!
//! Every balance move and every administrative state change emits an event.
//! Events are observational only: they are collected in an [`EventLog`] and
//! handed to the caller after the operation has fully completed.

use lib_types::{Address, Amount, Bps};
use serde::{Deserialize, Serialize};

/// Tax token events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenEvent {
    /// Balance moved (mint uses the zero address as `from`, burn as `to`)
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },

    /// Allowance set
    Approval {
        owner: Address,
        spender: Address,
        amount: Amount,
    },

    /// Transfer tax switched on
    TaxEnabled,

    /// Transfer tax switched off
    TaxDisabled,

    /// Tax rate changed
    TaxRateUpdated { rate: Bps },

    /// Tax destination changed
    TaxDestinationUpdated { destination: Address },

    /// Address added to the blocklist
    UserBlocked { account: Address },

    /// Address removed from the blocklist
    UserUnblocked { account: Address },

    /// Administrator capability moved to a new address
    OwnershipTransferred { previous: Address, new: Address },

    /// Transfers halted
    Paused { by: Address },

    /// Transfers resumed
    Unpaused { by: Address },
}

impl TokenEvent {
    /// Short machine-readable name, used for log fields and indexing
    pub fn kind(&self) -> &'static str {
        match self {
            TokenEvent::Transfer { .. } => "transfer",
            TokenEvent::Approval { .. } => "approval",
            TokenEvent::TaxEnabled => "tax_enabled",
            TokenEvent::TaxDisabled => "tax_disabled",
            TokenEvent::TaxRateUpdated { .. } => "tax_rate_updated",
            TokenEvent::TaxDestinationUpdated { .. } => "tax_destination_updated",
            TokenEvent::UserBlocked { .. } => "user_blocked",
            TokenEvent::UserUnblocked { .. } => "user_unblocked",
            TokenEvent::OwnershipTransferred { .. } => "ownership_transferred",
            TokenEvent::Paused { .. } => "paused",
            TokenEvent::Unpaused { .. } => "unpaused",
        }
    }
}

/// Append-only buffer of emitted events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<TokenEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: TokenEvent) {
        tracing::trace!(kind = event.kind(), "event emitted");
        self.events.push(event);
    }

    /// Events emitted since the last drain
    pub fn events(&self) -> &[TokenEvent] {
        &self.events
    }

    /// Hand all pending events to the caller, leaving the log empty
    pub fn drain(&mut self) -> Vec<TokenEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
