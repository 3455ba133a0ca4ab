//! In-memory ledger store for testing and development
//!
//! A single `RwLock` over all tables stands in for the storage engine's
//! isolation: every mutation runs under the write lock, so the balance
//! check and the header-plus-lines insert of `create_transaction` are one
//! indivisible unit, and readers always see whole transactions.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

use crate::ledger::transactions::validate_lines;
use crate::sync::ExternalAccountRecord;
use crate::traits::LedgerStore;
use crate::types::*;

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    transactions: HashMap<TransactionId, Transaction>,
    /// Insertion counter, used to keep date-equal transactions in posting
    /// order when listing
    seq: u64,
    order: HashMap<TransactionId, u64>,
}

/// In-memory [`LedgerStore`] implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all data (useful between tests)
    pub fn clear(&self) {
        let mut tables = self.tables.write().unwrap();
        tables.accounts.clear();
        tables.transactions.clear();
        tables.order.clear();
        tables.seq = 0;
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn create_account(&self, spec: NewAccount) -> LedgerResult<Account> {
        let mut tables = self.tables.write().unwrap();

        // Uniqueness is scoped to the owning user; two tenants may both
        // number their cash account "1000".
        let duplicate = tables
            .accounts
            .values()
            .any(|a| a.user == spec.user && a.account_number == spec.account_number);
        if duplicate {
            return Err(LedgerError::DuplicateAccountNumber {
                account_number: spec.account_number,
            });
        }

        let account = Account {
            id: AccountId::new(),
            user: spec.user,
            name: spec.name,
            account_type: spec.account_type,
            account_number: spec.account_number,
            description: spec.description,
            is_active: true,
            tags: spec.tags,
            external_id: spec.external_id,
            created_at: chrono::Utc::now().naive_utc(),
        };
        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, user: UserId, id: AccountId) -> LedgerResult<Option<Account>> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .accounts
            .get(&id)
            .filter(|a| a.user == user)
            .cloned())
    }

    async fn list_accounts(&self, user: UserId, active_only: bool) -> LedgerResult<Vec<Account>> {
        let tables = self.tables.read().unwrap();
        let mut accounts: Vec<Account> = tables
            .accounts
            .values()
            .filter(|a| a.user == user && (!active_only || a.is_active))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.account_number.cmp(&b.account_number));
        Ok(accounts)
    }

    async fn delete_account(&self, user: UserId, id: AccountId) -> LedgerResult<()> {
        let mut tables = self.tables.write().unwrap();

        match tables.accounts.get(&id) {
            Some(a) if a.user == user => {}
            _ => return Err(LedgerError::account_not_found(id)),
        }

        let referenced = tables
            .transactions
            .values()
            .any(|t| t.lines.iter().any(|l| l.account == id));
        if referenced {
            return Err(LedgerError::AccountInUse { id });
        }

        tables.accounts.remove(&id);
        Ok(())
    }

    async fn create_transaction(&self, spec: NewTransaction) -> LedgerResult<Transaction> {
        // One write lock across validation and insert: the unbalanced check
        // and the row writes cannot interleave with another writer, and a
        // failure leaves no rows behind.
        let mut tables = self.tables.write().unwrap();

        for line in &spec.lines {
            let known = tables
                .accounts
                .get(&line.account)
                .is_some_and(|a| a.user == spec.user);
            if !known {
                return Err(LedgerError::account_not_found(line.account));
            }
        }

        validate_lines(&spec.lines)?;

        let transaction = Transaction {
            id: TransactionId::new(),
            user: spec.user,
            date: spec.date,
            reference: spec.reference,
            description: spec.description,
            status: spec.status,
            source: spec.source,
            lines: spec
                .lines
                .into_iter()
                .map(|l| TransactionLine {
                    account: l.account,
                    description: l.description,
                    debit_amount: l.debit_amount,
                    credit_amount: l.credit_amount,
                })
                .collect(),
            created_at: chrono::Utc::now().naive_utc(),
        };

        tables.seq += 1;
        let seq = tables.seq;
        tables.order.insert(transaction.id, seq);
        tables
            .transactions
            .insert(transaction.id, transaction.clone());
        debug!(id = %transaction.id, "transaction stored");
        Ok(transaction)
    }

    async fn get_transaction(
        &self,
        user: UserId,
        id: TransactionId,
    ) -> LedgerResult<Option<Transaction>> {
        let tables = self.tables.read().unwrap();
        Ok(tables
            .transactions
            .get(&id)
            .filter(|t| t.user == user)
            .cloned())
    }

    async fn delete_transaction(&self, user: UserId, id: TransactionId) -> LedgerResult<()> {
        let mut tables = self.tables.write().unwrap();
        match tables.transactions.get(&id) {
            Some(t) if t.user == user => {}
            _ => return Err(LedgerError::transaction_not_found(id)),
        }
        // Lines live inside the transaction, so removing it cascades.
        tables.transactions.remove(&id);
        tables.order.remove(&id);
        Ok(())
    }

    async fn list_transaction_lines(
        &self,
        user: UserId,
        account: AccountId,
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<Vec<TransactionLine>> {
        let tables = self.tables.read().unwrap();

        match tables.accounts.get(&account) {
            Some(a) if a.user == user => {}
            _ => return Err(LedgerError::account_not_found(account)),
        }

        let mut dated: Vec<(NaiveDate, u64, TransactionLine)> = Vec::new();
        for txn in tables.transactions.values() {
            if txn.user != user {
                continue;
            }
            if let Some(cutoff) = as_of {
                if txn.date > cutoff {
                    continue;
                }
            }
            let seq = tables.order.get(&txn.id).copied().unwrap_or(0);
            for line in &txn.lines {
                if line.account == account {
                    dated.push((txn.date, seq, line.clone()));
                }
            }
        }

        dated.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        Ok(dated.into_iter().map(|(_, _, l)| l).collect())
    }

    async fn list_transactions(
        &self,
        user: UserId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        let tables = self.tables.read().unwrap();
        let mut transactions: Vec<(u64, Transaction)> = tables
            .transactions
            .values()
            .filter(|t| {
                t.user == user
                    && from.is_none_or(|d| t.date >= d)
                    && to.is_none_or(|d| t.date <= d)
            })
            .map(|t| (tables.order.get(&t.id).copied().unwrap_or(0), t.clone()))
            .collect();
        transactions.sort_by(|a, b| (a.1.date, a.0).cmp(&(b.1.date, b.0)));
        Ok(transactions.into_iter().map(|(_, t)| t).collect())
    }

    async fn upsert_external_account(
        &self,
        user: UserId,
        record: ExternalAccountRecord,
    ) -> LedgerResult<Account> {
        let mut tables = self.tables.write().unwrap();

        let existing_id = tables
            .accounts
            .values()
            .find(|a| {
                a.user == user
                    && record.external_id.is_some()
                    && a.external_id == record.external_id
            })
            .or_else(|| {
                tables
                    .accounts
                    .values()
                    .find(|a| a.user == user && a.account_number == record.account_number)
            })
            .map(|a| a.id);

        if let Some(id) = existing_id {
            let account = tables.accounts.get_mut(&id).unwrap();
            account.name = record.name;
            account.account_type = record.account_type;
            account.description = record.description;
            if record.external_id.is_some() {
                account.external_id = record.external_id;
            }
            return Ok(account.clone());
        }

        let account = Account {
            id: AccountId::new(),
            user,
            name: record.name,
            account_type: record.account_type,
            account_number: record.account_number,
            description: record.description,
            is_active: true,
            tags: Default::default(),
            external_id: record.external_id,
            created_at: chrono::Utc::now().naive_utc(),
        };
        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn asset_and_revenue(store: &MemoryStore, user: UserId) -> (Account, Account) {
        let cash = store
            .create_account(NewAccount::new(user, "Cash", AccountType::Asset, "1000"))
            .await
            .unwrap();
        let revenue = store
            .create_account(NewAccount::new(user, "Sales", AccountType::Revenue, "4000"))
            .await
            .unwrap();
        (cash, revenue)
    }

    fn posted(
        user: UserId,
        on: NaiveDate,
        debit: AccountId,
        credit: AccountId,
        amount: i64,
    ) -> NewTransaction {
        NewTransaction {
            user,
            date: on,
            reference: String::new(),
            description: "test".to_string(),
            status: TransactionStatus::Posted,
            source: TransactionSource::Manual,
            lines: vec![
                NewLine::debit(debit, BigDecimal::from(amount)),
                NewLine::credit(credit, BigDecimal::from(amount)),
            ],
        }
    }

    #[tokio::test]
    async fn duplicate_account_number_is_per_user() {
        let store = MemoryStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        store
            .create_account(NewAccount::new(alice, "Cash", AccountType::Asset, "1000"))
            .await
            .unwrap();

        let err = store
            .create_account(NewAccount::new(alice, "Cash 2", AccountType::Asset, "1000"))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateAccountNumber { .. }));

        // A different tenant can reuse the number.
        store
            .create_account(NewAccount::new(bob, "Cash", AccountType::Asset, "1000"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unbalanced_create_persists_nothing() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let (cash, revenue) = asset_and_revenue(&store, user).await;

        let spec = NewTransaction {
            user,
            date: date(2024, 1, 1),
            reference: String::new(),
            description: "bad".to_string(),
            status: TransactionStatus::Posted,
            source: TransactionSource::Manual,
            lines: vec![
                NewLine::debit(cash.id, BigDecimal::from(100)),
                NewLine::credit(revenue.id, BigDecimal::from(90)),
            ],
        };
        let err = store.create_transaction(spec).await.unwrap_err();
        assert!(matches!(err, LedgerError::UnbalancedTransaction { .. }));

        assert!(store
            .list_transactions(user, None, None)
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .list_transaction_lines(user, cash.id, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn foreign_account_reference_is_not_found() {
        let store = MemoryStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let (alice_cash, _) = asset_and_revenue(&store, alice).await;
        let bob_sales = store
            .create_account(NewAccount::new(bob, "Sales", AccountType::Revenue, "4000"))
            .await
            .unwrap();

        // Bob cannot post against Alice's account; the error does not reveal
        // that the account exists at all.
        let err = store
            .create_transaction(posted(
                bob,
                date(2024, 1, 1),
                alice_cash.id,
                bob_sales.id,
                50,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_account_protected_while_referenced() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let (cash, revenue) = asset_and_revenue(&store, user).await;

        let txn = store
            .create_transaction(posted(user, date(2024, 1, 1), cash.id, revenue.id, 75))
            .await
            .unwrap();

        let err = store.delete_account(user, cash.id).await.unwrap_err();
        assert!(matches!(err, LedgerError::AccountInUse { .. }));
        let listed = store.list_accounts(user, true).await.unwrap();
        assert!(listed.iter().any(|a| a.id == cash.id));

        // Cascade delete of the transaction frees the account.
        store.delete_transaction(user, txn.id).await.unwrap();
        assert!(store
            .list_transaction_lines(user, cash.id, None)
            .await
            .unwrap()
            .is_empty());
        store.delete_account(user, cash.id).await.unwrap();
    }

    #[tokio::test]
    async fn tenant_isolation_on_reads() {
        let store = MemoryStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        let (cash, revenue) = asset_and_revenue(&store, alice).await;
        store
            .create_transaction(posted(alice, date(2024, 1, 1), cash.id, revenue.id, 10))
            .await
            .unwrap();

        assert!(store.list_accounts(bob, false).await.unwrap().is_empty());
        assert!(store.list_transactions(bob, None, None).await.unwrap().is_empty());
        assert!(store.get_account(bob, cash.id).await.unwrap().is_none());
        assert!(matches!(
            store.list_transaction_lines(bob, cash.id, None).await,
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn lines_filter_by_cutoff_and_keep_order() {
        let store = MemoryStore::new();
        let user = UserId::new();
        let (cash, revenue) = asset_and_revenue(&store, user).await;

        store
            .create_transaction(posted(user, date(2024, 2, 1), cash.id, revenue.id, 200))
            .await
            .unwrap();
        store
            .create_transaction(posted(user, date(2024, 1, 1), cash.id, revenue.id, 100))
            .await
            .unwrap();

        let all = store
            .list_transaction_lines(user, cash.id, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].debit_amount, BigDecimal::from(100));
        assert_eq!(all[1].debit_amount, BigDecimal::from(200));

        let january = store
            .list_transaction_lines(user, cash.id, Some(date(2024, 1, 31)))
            .await
            .unwrap();
        assert_eq!(january.len(), 1);
        assert_eq!(january[0].debit_amount, BigDecimal::from(100));
    }

    #[tokio::test]
    async fn list_accounts_orders_by_number_and_filters_active() {
        let store = MemoryStore::new();
        let user = UserId::new();
        store
            .create_account(NewAccount::new(user, "Sales", AccountType::Revenue, "4000"))
            .await
            .unwrap();
        store
            .create_account(NewAccount::new(user, "Cash", AccountType::Asset, "1000"))
            .await
            .unwrap();

        let accounts = store.list_accounts(user, true).await.unwrap();
        let numbers: Vec<&str> = accounts.iter().map(|a| a.account_number.as_str()).collect();
        assert_eq!(numbers, vec!["1000", "4000"]);
    }

    #[tokio::test]
    async fn upsert_matches_external_id_then_number() {
        let store = MemoryStore::new();
        let user = UserId::new();

        let created = store
            .upsert_external_account(
                user,
                ExternalAccountRecord {
                    name: "Sales".to_string(),
                    account_type: AccountType::Revenue,
                    account_number: "4000".to_string(),
                    description: String::new(),
                    external_id: Some("qb-1".to_string()),
                },
            )
            .await
            .unwrap();

        // Same external id: update in place, even if renamed.
        let renamed = store
            .upsert_external_account(
                user,
                ExternalAccountRecord {
                    name: "Sales Revenue".to_string(),
                    account_type: AccountType::Revenue,
                    account_number: "4000".to_string(),
                    description: "renamed upstream".to_string(),
                    external_id: Some("qb-1".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.id, created.id);
        assert_eq!(renamed.name, "Sales Revenue");

        // No external id: fall back to the account number.
        let by_number = store
            .upsert_external_account(
                user,
                ExternalAccountRecord {
                    name: "Sales Revenue".to_string(),
                    account_type: AccountType::Revenue,
                    account_number: "4000".to_string(),
                    description: String::new(),
                    external_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(by_number.id, created.id);
        assert_eq!(store.list_accounts(user, false).await.unwrap().len(), 1);
    }
}
