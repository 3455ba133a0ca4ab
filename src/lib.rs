//! # Bookkeeping Core
//!
//! A multi-tenant double-entry bookkeeping core: durable chart-of-accounts
//! and transaction storage behind a trait, derived account balances, trial
//! balance reporting, and business ratio metrics.
//!
//! ## Features
//!
//! - **Double-entry discipline**: every transaction's debit and credit
//!   totals must match; the store enforces this atomically with the insert,
//!   so no write path can smuggle in an unbalanced posting
//! - **Multi-tenant isolation**: every operation is scoped to an opaque
//!   user id; foreign and unknown ids are indistinguishable
//! - **Derived balances**: signed balances per account type's natural side,
//!   computed with exact decimal arithmetic, optionally as of a cutoff date
//! - **Trial balance**: active accounts in their natural debit or credit
//!   columns, with a balanced-totals invariant
//! - **Business ratios**: quick, current, operating cash flow, gross profit
//!   margin, debt-to-equity, and receivable turnover, each `None` when its
//!   denominator is empty
//! - **Storage abstraction**: database-agnostic [`LedgerStore`] trait with
//!   an in-memory implementation for tests and development
//!
//! ## Quick start
//!
//! ```rust
//! use bookkeeping_core::{
//!     patterns, AccountType, Ledger, MemoryStore, NewAccount, UserId,
//! };
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ledger = Ledger::new(MemoryStore::new());
//! let user = UserId::new();
//!
//! let cash = ledger
//!     .create_account(NewAccount::new(user, "Cash", AccountType::Asset, "1000"))
//!     .await?;
//! let sales = ledger
//!     .create_account(NewAccount::new(user, "Sales", AccountType::Revenue, "4000"))
//!     .await?;
//!
//! let sale = patterns::sale(
//!     user,
//!     NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
//!     "First sale",
//!     cash.id,
//!     sales.id,
//!     BigDecimal::from(250),
//! )?;
//! ledger.create_transaction(sale).await?;
//!
//! assert_eq!(
//!     ledger.balance_of(user, cash.id, None).await?,
//!     BigDecimal::from(250),
//! );
//! # Ok(())
//! # }
//! ```

pub mod ledger;
pub mod metrics;
pub mod store;
pub mod sync;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use ledger::*;
pub use metrics::{BusinessMetrics, MetricsConfig, MetricsPeriod};
pub use store::MemoryStore;
pub use sync::{map_external_account_type, AccountingProvider, ExternalAccountRecord, SyncSummary};
pub use traits::*;
pub use types::*;

// Re-export posting patterns for convenience
pub use ledger::transactions::patterns;
