//! Main ledger facade that coordinates accounts, transactions, and reports
//!
//! This is the complete surface the core exposes to presentation and API
//! collaborators; HTTP framing, pagination, and auth live with them.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::ledger::{reports, AccountManager, TransactionManager};
use crate::metrics::{BusinessMetrics, MetricsConfig};
use crate::sync::ExternalAccountRecord;
use crate::traits::LedgerStore;
use crate::types::*;

/// Ledger system orchestrating all bookkeeping operations over one store
pub struct Ledger<S: LedgerStore> {
    accounts: AccountManager<S>,
    transactions: TransactionManager<S>,
    store: S,
}

impl<S: LedgerStore + Clone> Ledger<S> {
    /// Create a new ledger over the given storage backend
    pub fn new(store: S) -> Self {
        Self {
            accounts: AccountManager::new(store.clone()),
            transactions: TransactionManager::new(store.clone()),
            store,
        }
    }

    // Account operations

    /// Create an account; fails on a duplicate `(user, account_number)`
    pub async fn create_account(&self, spec: NewAccount) -> LedgerResult<Account> {
        self.accounts.create_account(spec).await
    }

    pub async fn get_account(
        &self,
        user: UserId,
        id: AccountId,
    ) -> LedgerResult<Option<Account>> {
        self.accounts.get_account(user, id).await
    }

    /// List the user's accounts ordered by account number
    pub async fn list_accounts(
        &self,
        user: UserId,
        active_only: bool,
    ) -> LedgerResult<Vec<Account>> {
        self.accounts.list_accounts(user, active_only).await
    }

    /// Delete an account; blocked while transaction lines reference it
    pub async fn delete_account(&self, user: UserId, id: AccountId) -> LedgerResult<()> {
        self.accounts.delete_account(user, id).await
    }

    /// Upsert an account from an external-sync record
    pub async fn upsert_external_account(
        &self,
        user: UserId,
        record: ExternalAccountRecord,
    ) -> LedgerResult<Account> {
        self.store.upsert_external_account(user, record).await
    }

    // Transaction operations

    /// Create a transaction; the double-entry check runs atomically with
    /// the insert, so a rejected create leaves the ledger unchanged
    pub async fn create_transaction(&self, spec: NewTransaction) -> LedgerResult<Transaction> {
        self.transactions.create_transaction(spec).await
    }

    pub async fn get_transaction(
        &self,
        user: UserId,
        id: TransactionId,
    ) -> LedgerResult<Option<Transaction>> {
        self.transactions.get_transaction(user, id).await
    }

    /// Delete a transaction and, with it, all its lines
    pub async fn delete_transaction(&self, user: UserId, id: TransactionId) -> LedgerResult<()> {
        self.transactions.delete_transaction(user, id).await
    }

    pub async fn list_transactions(
        &self,
        user: UserId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.transactions.list_transactions(user, from, to).await
    }

    /// Lines referencing the account, optionally up to a cutoff date
    pub async fn list_transaction_lines(
        &self,
        user: UserId,
        account: AccountId,
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<Vec<TransactionLine>> {
        self.transactions
            .list_transaction_lines(user, account, as_of)
            .await
    }

    // Balance and reporting operations

    /// Signed balance of an account as of an optional cutoff date
    pub async fn balance_of(
        &self,
        user: UserId,
        account: AccountId,
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<BigDecimal> {
        self.accounts.balance_of(user, account, as_of).await
    }

    /// Trial balance over the user's active accounts
    pub async fn trial_balance(
        &self,
        user: UserId,
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<TrialBalance> {
        reports::trial_balance(&self.store, user, as_of).await
    }

    /// Business metrics engine for one user
    pub fn metrics(&self, user: UserId, config: MetricsConfig) -> BusinessMetrics<'_, S> {
        BusinessMetrics::new(&self.store, user, config)
    }
}
