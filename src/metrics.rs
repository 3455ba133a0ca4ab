//! Business ratio calculations over a user's ledger
//!
//! Every input is an aggregation of signed account balances over the user's
//! *active* accounts, filtered by account type and, where the ratio calls
//! for a subset like "current assets", by classification tags. A ratio with
//! an empty denominator is `None`, never an error, so callers can render
//! "N/A" without failing the whole computation.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::instrument;

use crate::ledger::balance;
use crate::traits::LedgerStore;
use crate::types::*;

/// Tag taxonomy the ratio formulas select account subsets by.
///
/// Injected at construction; the defaults mirror the conventional labels
/// ("cash", "receivable", "inventory", "current", "cogs"). Tag assignment
/// itself is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Asset tags counted as quick (acid-test) assets
    pub quick_asset_tags: BTreeSet<String>,
    /// Asset tags counted as inventory
    pub inventory_tags: BTreeSet<String>,
    /// Asset tags counted as current assets
    pub current_asset_tags: BTreeSet<String>,
    /// Liability tags counted as current liabilities
    pub current_liability_tags: BTreeSet<String>,
    /// Expense tags counted as cost of goods sold
    pub cogs_tags: BTreeSet<String>,
    /// Asset tags treated as cash for the operating-cash-flow aggregation
    pub cash_tags: BTreeSet<String>,
    /// Asset tags treated as accounts receivable
    pub receivable_tags: BTreeSet<String>,
}

fn tag_set(tags: &[&str]) -> BTreeSet<String> {
    tags.iter().map(|t| t.to_string()).collect()
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            quick_asset_tags: tag_set(&["cash", "receivable"]),
            inventory_tags: tag_set(&["inventory"]),
            current_asset_tags: tag_set(&["current"]),
            current_liability_tags: tag_set(&["current"]),
            cogs_tags: tag_set(&["cogs"]),
            cash_tags: tag_set(&["cash"]),
            receivable_tags: tag_set(&["receivable"]),
        }
    }
}

/// Reporting period for the flow-based inputs (operating cash flow, net
/// credit sales, average receivables). Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MetricsPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Business metrics engine, constructed per user
pub struct BusinessMetrics<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
    user: UserId,
    config: MetricsConfig,
}

impl<'a, S: LedgerStore + ?Sized> BusinessMetrics<'a, S> {
    pub fn new(store: &'a S, user: UserId, config: MetricsConfig) -> Self {
        Self {
            store,
            user,
            config,
        }
    }

    /// Quick ratio (acid test): (quick assets − inventory) / current
    /// liabilities. `None` when current liabilities are zero.
    pub async fn quick_ratio(&self) -> LedgerResult<Option<BigDecimal>> {
        let quick_assets = self
            .tagged_balance(AccountType::Asset, Some(&self.config.quick_asset_tags), None)
            .await?;
        let inventory = self
            .tagged_balance(AccountType::Asset, Some(&self.config.inventory_tags), None)
            .await?;
        let current_liabilities = self.current_liabilities().await?;

        Ok(ratio(&(quick_assets - inventory), &current_liabilities))
    }

    /// Current ratio: current assets / current liabilities. `None` when
    /// current liabilities are zero.
    pub async fn current_ratio(&self) -> LedgerResult<Option<BigDecimal>> {
        let current_assets = self
            .tagged_balance(
                AccountType::Asset,
                Some(&self.config.current_asset_tags),
                None,
            )
            .await?;
        let current_liabilities = self.current_liabilities().await?;

        Ok(ratio(&current_assets, &current_liabilities))
    }

    /// Operating cash flow ratio: operating cash flow over the period /
    /// current liabilities. `None` when current liabilities are zero.
    pub async fn operating_cash_flow_ratio(
        &self,
        period: MetricsPeriod,
    ) -> LedgerResult<Option<BigDecimal>> {
        let ocf = self.operating_cash_flow(period).await?;
        let current_liabilities = self.current_liabilities().await?;

        Ok(ratio(&ocf, &current_liabilities))
    }

    /// Gross profit margin as a percentage: (revenue − COGS) / revenue × 100.
    /// `None` when revenue is zero.
    pub async fn gross_profit_margin(&self) -> LedgerResult<Option<BigDecimal>> {
        let revenue = self.tagged_balance(AccountType::Revenue, None, None).await?;
        let cogs = self
            .tagged_balance(AccountType::Expense, Some(&self.config.cogs_tags), None)
            .await?;

        Ok(ratio(&(revenue.clone() - cogs), &revenue).map(|r| r * BigDecimal::from(100)))
    }

    /// Debt-to-equity ratio: total liabilities / total equity. `None` when
    /// total equity is zero.
    pub async fn debt_to_equity_ratio(&self) -> LedgerResult<Option<BigDecimal>> {
        let liabilities = self
            .tagged_balance(AccountType::Liability, None, None)
            .await?;
        let equity = self.tagged_balance(AccountType::Equity, None, None).await?;

        Ok(ratio(&liabilities, &equity))
    }

    /// Accounts-receivable turnover: net credit sales over the period /
    /// average receivables over the period. `None` when the average is zero.
    pub async fn accounts_receivable_turnover(
        &self,
        period: MetricsPeriod,
    ) -> LedgerResult<Option<BigDecimal>> {
        let net_credit_sales = self.net_credit_sales(period).await?;
        let avg_receivables = self.average_receivables(period).await?;

        Ok(ratio(&net_credit_sales, &avg_receivables))
    }

    /// Compute all six ratios. Individual `None` values mean "undefined for
    /// this ledger", not failure.
    #[instrument(skip(self), fields(user = %self.user))]
    pub async fn compute_all(&self, period: MetricsPeriod) -> LedgerResult<BusinessRatios> {
        Ok(BusinessRatios {
            quick_ratio: self.quick_ratio().await?,
            current_ratio: self.current_ratio().await?,
            operating_cash_flow_ratio: self.operating_cash_flow_ratio(period).await?,
            gross_profit_margin: self.gross_profit_margin().await?,
            debt_to_equity_ratio: self.debt_to_equity_ratio().await?,
            accounts_receivable_turnover: self.accounts_receivable_turnover(period).await?,
        })
    }

    /// Net movement of cash-tagged asset accounts over the period, counting
    /// only posted or reconciled transactions: Σ(debits − credits) on their
    /// lines. Pending entries have not moved cash yet.
    pub async fn operating_cash_flow(&self, period: MetricsPeriod) -> LedgerResult<BigDecimal> {
        let cash_accounts = self
            .tagged_account_ids(AccountType::Asset, &self.config.cash_tags)
            .await?;

        let transactions = self
            .store
            .list_transactions(self.user, Some(period.start), Some(period.end))
            .await?;

        let mut flow = BigDecimal::from(0);
        for txn in transactions.iter().filter(|t| is_effective(t.status)) {
            for line in &txn.lines {
                if cash_accounts.contains(&line.account) {
                    flow += &line.debit_amount - &line.credit_amount;
                }
            }
        }

        Ok(flow)
    }

    /// Credits posted to revenue accounts over the period by transactions
    /// that also debit a receivable-tagged account, i.e. sales made on
    /// account rather than settled in cash.
    pub async fn net_credit_sales(&self, period: MetricsPeriod) -> LedgerResult<BigDecimal> {
        let receivable_accounts = self
            .tagged_account_ids(AccountType::Asset, &self.config.receivable_tags)
            .await?;
        let revenue_accounts: HashSet<AccountId> = self
            .store
            .list_accounts(self.user, true)
            .await?
            .into_iter()
            .filter(|a| a.account_type == AccountType::Revenue)
            .map(|a| a.id)
            .collect();

        let transactions = self
            .store
            .list_transactions(self.user, Some(period.start), Some(period.end))
            .await?;

        let zero = BigDecimal::from(0);
        let mut sales = BigDecimal::from(0);
        for txn in transactions.iter().filter(|t| is_effective(t.status)) {
            let on_account = txn.lines.iter().any(|l| {
                receivable_accounts.contains(&l.account) && l.debit_amount > zero
            });
            if !on_account {
                continue;
            }
            for line in &txn.lines {
                if revenue_accounts.contains(&line.account) {
                    sales += &line.credit_amount;
                }
            }
        }

        Ok(sales)
    }

    /// Mean of the receivable-tagged balance at the period's start and end.
    pub async fn average_receivables(&self, period: MetricsPeriod) -> LedgerResult<BigDecimal> {
        let opening = self
            .tagged_balance(
                AccountType::Asset,
                Some(&self.config.receivable_tags),
                Some(period.start),
            )
            .await?;
        let closing = self
            .tagged_balance(
                AccountType::Asset,
                Some(&self.config.receivable_tags),
                Some(period.end),
            )
            .await?;

        Ok((opening + closing) / BigDecimal::from(2))
    }

    async fn current_liabilities(&self) -> LedgerResult<BigDecimal> {
        self.tagged_balance(
            AccountType::Liability,
            Some(&self.config.current_liability_tags),
            None,
        )
        .await
    }

    /// Sum of signed balances over active accounts of the given type,
    /// restricted to accounts carrying at least one of `tags` when given.
    async fn tagged_balance(
        &self,
        account_type: AccountType,
        tags: Option<&BTreeSet<String>>,
        as_of: Option<NaiveDate>,
    ) -> LedgerResult<BigDecimal> {
        let accounts = self.store.list_accounts(self.user, true).await?;

        let mut total = BigDecimal::from(0);
        for account in accounts {
            if account.account_type != account_type {
                continue;
            }
            if let Some(tags) = tags {
                if !account.has_any_tag(tags.iter().map(|t| t.as_str())) {
                    continue;
                }
            }
            total += balance::balance_of(self.store, self.user, &account, as_of).await?;
        }

        Ok(total)
    }

    async fn tagged_account_ids(
        &self,
        account_type: AccountType,
        tags: &BTreeSet<String>,
    ) -> LedgerResult<HashSet<AccountId>> {
        Ok(self
            .store
            .list_accounts(self.user, true)
            .await?
            .into_iter()
            .filter(|a| {
                a.account_type == account_type
                    && a.has_any_tag(tags.iter().map(|t| t.as_str()))
            })
            .map(|a| a.id)
            .collect())
    }
}

/// Transactions that have taken effect for flow-based inputs
fn is_effective(status: TransactionStatus) -> bool {
    matches!(
        status,
        TransactionStatus::Posted | TransactionStatus::Reconciled
    )
}

/// Exact decimal division; `None` for an empty denominator.
fn ratio(numerator: &BigDecimal, denominator: &BigDecimal) -> Option<BigDecimal> {
    if *denominator == BigDecimal::from(0) {
        None
    } else {
        Some(numerator / denominator)
    }
}
