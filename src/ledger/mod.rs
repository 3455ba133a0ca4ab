//! Ledger module: account management, transaction processing, balances,
//! and trial balance reporting

pub mod accounts;
pub mod balance;
pub mod core;
pub mod reports;
pub mod transactions;

pub use accounts::*;
pub use balance::{balance_of, signed_balance};
pub use core::*;
pub use reports::trial_balance;
pub use transactions::*;
