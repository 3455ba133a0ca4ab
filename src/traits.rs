//! Storage abstraction for the bookkeeping core
//!
//! Every query is scoped by the owning [`UserId`]; an implementation must
//! treat another user's ids exactly like unknown ids.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::sync::ExternalAccountRecord;
use crate::types::*;

/// Durable storage for accounts, transactions, and their lines.
///
/// Implementations back the core against any engine (PostgreSQL, SQLite,
/// in-memory, ...). Two obligations beyond plain CRUD:
///
/// - `create_transaction` must run its double-entry balance check and the
///   header-plus-lines insert as one atomic unit, so an unbalanced or
///   half-written transaction is never observable, even under concurrent
///   writers. Any failure leaves zero rows from the attempt.
/// - Reads must reflect a consistent snapshot (no partial transactions);
///   strict real-time freshness is not required.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create an account. Fails with [`LedgerError::DuplicateAccountNumber`]
    /// when the user already has an account with this number.
    async fn create_account(&self, spec: NewAccount) -> LedgerResult<Account>;

    /// Get an account by id. `None` for unknown ids and for ids owned by a
    /// different user alike.
    async fn get_account(&self, user: UserId, id: AccountId) -> LedgerResult<Option<Account>>;

    /// List the user's accounts ordered by account number.
    async fn list_accounts(&self, user: UserId, active_only: bool) -> LedgerResult<Vec<Account>>;

    /// Delete an account. Fails with [`LedgerError::AccountInUse`] while any
    /// transaction line references it.
    async fn delete_account(&self, user: UserId, id: AccountId) -> LedgerResult<()>;

    /// Create a transaction and its lines atomically. Fails with
    /// [`LedgerError::UnbalancedTransaction`] when the lines' debit and
    /// credit totals differ, and with [`LedgerError::NotFound`] when a line
    /// references an account that does not exist for this user.
    async fn create_transaction(&self, spec: NewTransaction) -> LedgerResult<Transaction>;

    /// Get a transaction (with its lines) by id, owner-scoped.
    async fn get_transaction(
        &self,
        user: UserId,
        id: TransactionId,
    ) -> LedgerResult<Option<Transaction>>;

    /// Delete a transaction; all its lines are deleted with it.
    async fn delete_transaction(&self, user: UserId, id: TransactionId) -> LedgerResult<()>;

    /// Lines referencing the account whose transaction date is on or before
    /// `as_of` (all lines when `None`), ordered by transaction date then
    /// insertion. Fails with [`LedgerError::NotFound`] for an unknown or
    /// foreign account.
    async fn list_transaction_lines(
        &self,
        user: UserId,
        account: AccountId,
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<Vec<TransactionLine>>;

    /// The user's transactions with dates inside the inclusive range,
    /// ordered by date then insertion.
    async fn list_transactions(
        &self,
        user: UserId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>>;

    /// Insert or update an account from a normalized external-sync record,
    /// matched by `(user, external_id)` first and `(user, account_number)`
    /// second. Used by sync collaborators; never creates duplicates.
    async fn upsert_external_account(
        &self,
        user: UserId,
        record: ExternalAccountRecord,
    ) -> LedgerResult<Account>;
}
