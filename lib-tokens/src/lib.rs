//! Policy-Gated Token Ledger
//!
//! A fungible token whose every transfer passes a single checkpoint that
//! enforces the blocklist, a configurable transfer tax and a per-wallet
//! holding cap.
//!
//! # Key Types
//!
//! - [`TaxToken`]: construction, holder operations, admin operations, queries
//! - [`PolicyStore`]: tax config, holding cap and per-account flags
//! - [`TransferPolicyEngine`]: the transfer checkpoint
//! - [`Ledger`]: unconditional balance bookkeeping ([`MemoryLedger`] in memory)
//!
//! # Execution
//!
//! Every call runs to completion before the next one starts. Events are
//! buffered on the token and drained with [`TaxToken::take_events`].

pub mod access;
pub mod admin;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod policy;
pub mod token;

pub use access::{Ownership, PauseSwitch};
pub use config::{ConfigError, TokenConfig};
pub use engine::{ReentrancyGuard, TransferPolicyEngine, TransferResult};
pub use errors::*;
pub use events::{EventLog, TokenEvent};
pub use ledger::{Ledger, MemoryLedger};
pub use policy::{AccountFlag, AccountPolicy, HoldingLimit, PolicyStore, TaxConfig, TaxSplit};
pub use token::{TaxToken, TokenCreationParams, TokenMetadata, DEFAULT_DECIMALS};
