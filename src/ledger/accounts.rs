//! Account management

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::ledger::balance;
use crate::traits::LedgerStore;
use crate::types::*;

/// Account manager wrapping the store's chart-of-accounts operations
pub struct AccountManager<S: LedgerStore> {
    pub(crate) store: S,
}

impl<S: LedgerStore> AccountManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create an account. The store rejects a duplicate
    /// `(user, account_number)` pair.
    #[instrument(skip(self, spec), fields(user = %spec.user, number = %spec.account_number))]
    pub async fn create_account(&self, spec: NewAccount) -> LedgerResult<Account> {
        if spec.name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "account name cannot be empty".to_string(),
            ));
        }
        if spec.account_number.trim().is_empty() {
            return Err(LedgerError::Validation(
                "account number cannot be empty".to_string(),
            ));
        }

        let account = self.store.create_account(spec).await?;
        debug!(id = %account.id, "account created");
        Ok(account)
    }

    pub async fn get_account(
        &self,
        user: UserId,
        id: AccountId,
    ) -> LedgerResult<Option<Account>> {
        self.store.get_account(user, id).await
    }

    /// Get an account by id, returning an error if not found
    pub async fn get_account_required(
        &self,
        user: UserId,
        id: AccountId,
    ) -> LedgerResult<Account> {
        self.store
            .get_account(user, id)
            .await?
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    /// List the user's accounts, ordered by account number
    pub async fn list_accounts(
        &self,
        user: UserId,
        active_only: bool,
    ) -> LedgerResult<Vec<Account>> {
        self.store.list_accounts(user, active_only).await
    }

    /// Delete an account. Blocked while transaction lines reference it.
    #[instrument(skip(self), fields(user = %user, id = %id))]
    pub async fn delete_account(&self, user: UserId, id: AccountId) -> LedgerResult<()> {
        self.store.delete_account(user, id).await
    }

    /// Signed balance of the account as of an optional cutoff date
    pub async fn balance_of(
        &self,
        user: UserId,
        id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<BigDecimal> {
        let account = self.get_account_required(user, id).await?;
        balance::balance_of(&self.store, user, &account, as_of).await
    }
}
