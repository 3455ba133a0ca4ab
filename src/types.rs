//! Core types and data structures for the bookkeeping system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Opaque identifier for the owning user of accounts and transactions.
///
/// Every store query is scoped by this id; a query must never return
/// another user's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier for an [`Account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier for a [`Transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Account types following standard accounting principles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Assets - what the business owns (Cash, Receivables, Inventory, etc.)
    Asset,
    /// Liabilities - what the business owes (Loans, Accounts Payable, etc.)
    Liability,
    /// Equity - owner's interest in the business
    Equity,
    /// Revenue - money earned by the business
    Revenue,
    /// Expenses - costs incurred by the business
    Expense,
}

impl AccountType {
    /// Returns the normal balance side for this account type.
    /// Assets and Expenses normally carry debit balances;
    /// Liabilities, Equity, and Revenue normally carry credit balances.
    pub fn normal_side(&self) -> Side {
        match self {
            AccountType::Asset | AccountType::Expense => Side::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => Side::Credit,
        }
    }
}

/// The two sides of a double-entry posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Debit,
    Credit,
}

/// Lifecycle status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Posted,
    Reconciled,
}

/// Origin of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionSource {
    /// Entered by hand through the caller's UI
    Manual,
    /// Loaded from a file import
    Import,
    /// Pushed in by an external accounting-system sync, tagged with the
    /// vendor name the sync collaborator reports (e.g. "quickbooks")
    External(String),
}

/// A ledger account owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Owning user; all lookups are scoped to this id
    pub user: UserId,
    pub name: String,
    pub account_type: AccountType,
    /// Unique per `(user, account_number)`
    pub account_number: String,
    pub description: String,
    pub is_active: bool,
    /// Classification labels ("current", "cash", "receivable", ...) consumed
    /// by the metrics engine as membership predicates. Assignment of tags is
    /// the caller's concern.
    pub tags: BTreeSet<String>,
    /// Identifier assigned by an external accounting system, when this
    /// account was created or matched by a sync collaborator
    pub external_id: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Account {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// True when the account carries at least one of the given tags.
    pub fn has_any_tag<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        tags.into_iter().any(|t| self.tags.contains(t))
    }
}

/// Input for creating an [`Account`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub user: UserId,
    pub name: String,
    pub account_type: AccountType,
    pub account_number: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub external_id: Option<String>,
}

impl NewAccount {
    pub fn new(
        user: UserId,
        name: impl Into<String>,
        account_type: AccountType,
        account_number: impl Into<String>,
    ) -> Self {
        Self {
            user,
            name: name.into(),
            account_type,
            account_number: account_number.into(),
            description: String::new(),
            tags: BTreeSet::new(),
            external_id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }
}

/// One debit-or-credit line within a transaction.
///
/// Both amounts must be non-negative; conventionally exactly one is nonzero
/// per line, but the model does not enforce that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLine {
    pub account: AccountId,
    pub description: String,
    pub debit_amount: BigDecimal,
    pub credit_amount: BigDecimal,
}

/// Input for one line of a new transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLine {
    pub account: AccountId,
    pub description: String,
    pub debit_amount: BigDecimal,
    pub credit_amount: BigDecimal,
}

impl NewLine {
    /// Create a debit line
    pub fn debit(account: AccountId, amount: BigDecimal) -> Self {
        Self {
            account,
            description: String::new(),
            debit_amount: amount,
            credit_amount: BigDecimal::from(0),
        }
    }

    /// Create a credit line
    pub fn credit(account: AccountId, amount: BigDecimal) -> Self {
        Self {
            account,
            description: String::new(),
            debit_amount: BigDecimal::from(0),
            credit_amount: amount,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A complete double-entry transaction with its insertion-ordered lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user: UserId,
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub status: TransactionStatus,
    pub source: TransactionSource,
    pub lines: Vec<TransactionLine>,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    /// Sum of the debit column across all lines
    pub fn total_debits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.debit_amount).sum()
    }

    /// Sum of the credit column across all lines
    pub fn total_credits(&self) -> BigDecimal {
        self.lines.iter().map(|l| &l.credit_amount).sum()
    }
}

/// Input for creating a [`Transaction`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub user: UserId,
    pub date: NaiveDate,
    pub reference: String,
    pub description: String,
    pub status: TransactionStatus,
    pub source: TransactionSource,
    pub lines: Vec<NewLine>,
}

/// One row of a trial balance report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account: Account,
    /// Positive natural-side balance
    pub debit: BigDecimal,
    /// Absolute value of a negative natural-side balance
    pub credit: BigDecimal,
}

/// Trial balance report: every active account with a nonzero balance,
/// in its natural debit or credit column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalance {
    pub as_of: Option<NaiveDate>,
    pub rows: Vec<TrialBalanceRow>,
    pub total_debits: BigDecimal,
    pub total_credits: BigDecimal,
    /// Debit and credit column totals agree. A false value indicates an
    /// unbalanced posting reached the store through some path that skipped
    /// validation.
    pub is_balanced: bool,
}

/// The six business ratios. A `None` field means the ratio is undefined for
/// this user's ledger (empty denominator), not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BusinessRatios {
    pub quick_ratio: Option<BigDecimal>,
    pub current_ratio: Option<BigDecimal>,
    pub operating_cash_flow_ratio: Option<BigDecimal>,
    /// Percentage, not a plain ratio
    pub gross_profit_margin: Option<BigDecimal>,
    pub debt_to_equity_ratio: Option<BigDecimal>,
    pub accounts_receivable_turnover: Option<BigDecimal>,
}

/// Errors that can occur in the bookkeeping core
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("account number '{account_number}' already exists for this user")]
    DuplicateAccountNumber { account_number: String },
    #[error("account {id} is referenced by transaction lines and cannot be deleted")]
    AccountInUse { id: AccountId },
    #[error("transaction is not balanced: debits = {debits}, credits = {credits}")]
    UnbalancedTransaction {
        debits: BigDecimal,
        credits: BigDecimal,
    },
    /// Unknown id, or an id owned by another user. The two cases are
    /// deliberately indistinguishable to the caller.
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: Uuid },
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    pub fn account_not_found(id: AccountId) -> Self {
        LedgerError::NotFound {
            what: "account",
            id: id.0,
        }
    }

    pub fn transaction_not_found(id: TransactionId) -> Self {
        LedgerError::NotFound {
            what: "transaction",
            id: id.0,
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_sides() {
        assert_eq!(AccountType::Asset.normal_side(), Side::Debit);
        assert_eq!(AccountType::Expense.normal_side(), Side::Debit);
        assert_eq!(AccountType::Liability.normal_side(), Side::Credit);
        assert_eq!(AccountType::Equity.normal_side(), Side::Credit);
        assert_eq!(AccountType::Revenue.normal_side(), Side::Credit);
    }

    #[test]
    fn transaction_totals_sum_columns_independently() {
        let txn = Transaction {
            id: TransactionId::new(),
            user: UserId::new(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            reference: "r1".to_string(),
            description: "split".to_string(),
            status: TransactionStatus::Posted,
            source: TransactionSource::Manual,
            lines: vec![
                TransactionLine {
                    account: AccountId::new(),
                    description: String::new(),
                    debit_amount: BigDecimal::from(70),
                    credit_amount: BigDecimal::from(0),
                },
                TransactionLine {
                    account: AccountId::new(),
                    description: String::new(),
                    debit_amount: BigDecimal::from(30),
                    credit_amount: BigDecimal::from(0),
                },
                TransactionLine {
                    account: AccountId::new(),
                    description: String::new(),
                    debit_amount: BigDecimal::from(0),
                    credit_amount: BigDecimal::from(100),
                },
            ],
            created_at: chrono::Utc::now().naive_utc(),
        };

        assert_eq!(txn.total_debits(), BigDecimal::from(100));
        assert_eq!(txn.total_credits(), BigDecimal::from(100));
    }

    #[test]
    fn has_any_tag_matches_membership() {
        let account = Account {
            id: AccountId::new(),
            user: UserId::new(),
            name: "Cash".to_string(),
            account_type: AccountType::Asset,
            account_number: "1000".to_string(),
            description: String::new(),
            is_active: true,
            tags: ["cash", "current"].iter().map(|s| s.to_string()).collect(),
            external_id: None,
            created_at: chrono::Utc::now().naive_utc(),
        };

        assert!(account.has_tag("cash"));
        assert!(!account.has_tag("inventory"));
        assert!(account.has_any_tag(["inventory", "current"]));
        assert!(!account.has_any_tag(["cogs"]));
    }

    #[test]
    fn not_found_hides_ownership() {
        let id = AccountId::new();
        let unknown = LedgerError::account_not_found(id);
        let foreign = LedgerError::account_not_found(id);
        assert_eq!(unknown.to_string(), foreign.to_string());
    }
}
