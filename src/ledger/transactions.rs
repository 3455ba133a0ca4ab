//! Transaction processing and double-entry validation

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::traits::LedgerStore;
use crate::types::*;

/// Independently summed debit and credit totals of a candidate line set.
pub fn line_totals(lines: &[NewLine]) -> (BigDecimal, BigDecimal) {
    let debits = lines.iter().map(|l| &l.debit_amount).sum();
    let credits = lines.iter().map(|l| &l.credit_amount).sum();
    (debits, credits)
}

/// Double-entry validation of a candidate line set, independent of
/// persistence.
///
/// Accepts iff the set has at least two lines, no negative amount, and its
/// debit and credit totals are exactly equal (decimal comparison, never
/// floating point). [`LedgerStore::create_transaction`] runs this inside its
/// atomic create; callers may also run it up front to pre-check input and
/// re-submit corrected lines.
pub fn validate_lines(lines: &[NewLine]) -> LedgerResult<()> {
    if lines.is_empty() {
        return Err(LedgerError::InvalidTransaction(
            "transaction must have at least one line".to_string(),
        ));
    }

    if lines.len() < 2 {
        return Err(LedgerError::InvalidTransaction(
            "transaction must have at least two lines for double-entry bookkeeping".to_string(),
        ));
    }

    let zero = BigDecimal::from(0);
    for line in lines {
        if line.debit_amount < zero || line.credit_amount < zero {
            return Err(LedgerError::InvalidTransaction(
                "line amounts must not be negative".to_string(),
            ));
        }
    }

    let (debits, credits) = line_totals(lines);
    if debits != credits {
        return Err(LedgerError::UnbalancedTransaction { debits, credits });
    }

    Ok(())
}

/// Transaction manager wrapping the store's transaction operations
pub struct TransactionManager<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> TransactionManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a transaction. The store enforces double-entry balance and
    /// account existence atomically with the insert.
    #[instrument(skip(self, spec), fields(user = %spec.user, reference = %spec.reference))]
    pub async fn create_transaction(&self, spec: NewTransaction) -> LedgerResult<Transaction> {
        let transaction = self.store.create_transaction(spec).await?;
        debug!(id = %transaction.id, lines = transaction.lines.len(), "transaction created");
        Ok(transaction)
    }

    pub async fn get_transaction(
        &self,
        user: UserId,
        id: TransactionId,
    ) -> LedgerResult<Option<Transaction>> {
        self.store.get_transaction(user, id).await
    }

    /// Get a transaction by id, returning an error if not found
    pub async fn get_transaction_required(
        &self,
        user: UserId,
        id: TransactionId,
    ) -> LedgerResult<Transaction> {
        self.store
            .get_transaction(user, id)
            .await?
            .ok_or_else(|| LedgerError::transaction_not_found(id))
    }

    /// Delete a transaction; its lines go with it.
    #[instrument(skip(self), fields(user = %user, id = %id))]
    pub async fn delete_transaction(&self, user: UserId, id: TransactionId) -> LedgerResult<()> {
        self.store.delete_transaction(user, id).await
    }

    pub async fn list_transactions(
        &self,
        user: UserId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> LedgerResult<Vec<Transaction>> {
        self.store.list_transactions(user, from, to).await
    }

    pub async fn list_transaction_lines(
        &self,
        user: UserId,
        account: AccountId,
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<Vec<TransactionLine>> {
        self.store
            .list_transaction_lines(user, account, as_of)
            .await
    }
}

/// Builder for assembling a [`NewTransaction`] line by line
#[derive(Debug)]
pub struct TransactionBuilder {
    spec: NewTransaction,
}

impl TransactionBuilder {
    pub fn new(user: UserId, date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            spec: NewTransaction {
                user,
                date,
                reference: String::new(),
                description: description.into(),
                status: TransactionStatus::Posted,
                source: TransactionSource::Manual,
                lines: Vec::new(),
            },
        }
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.spec.reference = reference.into();
        self
    }

    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.spec.status = status;
        self
    }

    pub fn source(mut self, source: TransactionSource) -> Self {
        self.spec.source = source;
        self
    }

    /// Add a debit line
    pub fn debit(mut self, account: AccountId, amount: BigDecimal) -> Self {
        self.spec.lines.push(NewLine::debit(account, amount));
        self
    }

    /// Add a credit line
    pub fn credit(mut self, account: AccountId, amount: BigDecimal) -> Self {
        self.spec.lines.push(NewLine::credit(account, amount));
        self
    }

    /// Add a custom line
    pub fn line(mut self, line: NewLine) -> Self {
        self.spec.lines.push(line);
        self
    }

    /// Validate the assembled lines and build the spec
    pub fn build(self) -> LedgerResult<NewTransaction> {
        validate_lines(&self.spec.lines)?;
        Ok(self.spec)
    }
}

/// Common two-line posting patterns
pub mod patterns {
    use super::*;

    /// Sale for cash or on account: debit cash/receivables, credit revenue
    pub fn sale(
        user: UserId,
        date: NaiveDate,
        description: impl Into<String>,
        cash_or_receivable: AccountId,
        revenue: AccountId,
        amount: BigDecimal,
    ) -> LedgerResult<NewTransaction> {
        TransactionBuilder::new(user, date, description)
            .debit(cash_or_receivable, amount.clone())
            .credit(revenue, amount)
            .build()
    }

    /// Expense paid in cash: debit expense, credit cash
    pub fn expense_payment(
        user: UserId,
        date: NaiveDate,
        description: impl Into<String>,
        expense: AccountId,
        cash: AccountId,
        amount: BigDecimal,
    ) -> LedgerResult<NewTransaction> {
        TransactionBuilder::new(user, date, description)
            .debit(expense, amount.clone())
            .credit(cash, amount)
            .build()
    }

    /// Owner puts money in: debit cash, credit equity
    pub fn owner_investment(
        user: UserId,
        date: NaiveDate,
        description: impl Into<String>,
        cash: AccountId,
        equity: AccountId,
        amount: BigDecimal,
    ) -> LedgerResult<NewTransaction> {
        TransactionBuilder::new(user, date, description)
            .debit(cash, amount.clone())
            .credit(equity, amount)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn balanced_lines_validate() {
        let a = AccountId::new();
        let b = AccountId::new();
        let lines = vec![
            NewLine::debit(a, BigDecimal::from(100)),
            NewLine::credit(b, BigDecimal::from(100)),
        ];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn unbalanced_lines_are_rejected_with_totals() {
        let lines = vec![
            NewLine::debit(AccountId::new(), BigDecimal::from(100)),
            NewLine::credit(AccountId::new(), BigDecimal::from(90)),
        ];
        match validate_lines(&lines) {
            Err(LedgerError::UnbalancedTransaction { debits, credits }) => {
                assert_eq!(debits, BigDecimal::from(100));
                assert_eq!(credits, BigDecimal::from(90));
            }
            other => panic!("expected UnbalancedTransaction, got {other:?}"),
        }
    }

    #[test]
    fn decimal_amounts_compare_exactly() {
        // Would fail under f64: 0.1 + 0.2 != 0.3
        let lines = vec![
            NewLine::debit(AccountId::new(), "0.1".parse().unwrap()),
            NewLine::debit(AccountId::new(), "0.2".parse().unwrap()),
            NewLine::credit(AccountId::new(), "0.3".parse().unwrap()),
        ];
        assert!(validate_lines(&lines).is_ok());
    }

    #[test]
    fn single_line_is_rejected() {
        let lines = vec![NewLine::debit(AccountId::new(), BigDecimal::from(0))];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn empty_line_set_is_rejected() {
        assert!(matches!(
            validate_lines(&[]),
            Err(LedgerError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let lines = vec![
            NewLine::debit(AccountId::new(), BigDecimal::from(-10)),
            NewLine::credit(AccountId::new(), BigDecimal::from(-10)),
        ];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn builder_validates_at_build() {
        let user = UserId::new();
        let unbalanced = TransactionBuilder::new(user, date(), "bad")
            .debit(AccountId::new(), BigDecimal::from(50))
            .credit(AccountId::new(), BigDecimal::from(40))
            .build();
        assert!(unbalanced.is_err());

        let ok = patterns::sale(
            user,
            date(),
            "sale",
            AccountId::new(),
            AccountId::new(),
            BigDecimal::from(250),
        )
        .unwrap();
        assert_eq!(ok.lines.len(), 2);
        assert_eq!(ok.status, TransactionStatus::Posted);
    }
}
