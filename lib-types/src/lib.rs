//! Tax token ledger primitives.
//! Stable, policy-neutral, behavior-free.
//!
//! Rule: No String identifiers in ledger state. Ever.

pub mod primitives;

pub use primitives::{Address, AddressParseError, Amount, Bps, PRECISION};
