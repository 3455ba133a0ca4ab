//! Trial balance reporting

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::instrument;

use crate::ledger::balance;
use crate::traits::LedgerStore;
use crate::types::*;

/// Generate the trial balance for a user's active accounts as of an optional
/// cutoff date.
///
/// Accounts with an exactly zero balance are skipped. A positive balance
/// lands in the account's natural column; a negative balance is reported as
/// its absolute value in the opposite column, so an overdrawn debit-normal
/// account correctly shows up as a credit. With only balanced postings in
/// the store the two column totals agree. Rows follow the account-number
/// ordering of [`LedgerStore::list_accounts`]; re-running against unchanged
/// data yields an identical report.
#[instrument(skip(store), fields(user = %user))]
pub async fn trial_balance<S>(
    store: &S,
    user: UserId,
    as_of: Option<NaiveDate>,
) -> LedgerResult<TrialBalance>
where
    S: LedgerStore + ?Sized,
{
    let accounts = store.list_accounts(user, true).await?;

    let zero = BigDecimal::from(0);
    let mut rows = Vec::new();
    let mut total_debits = BigDecimal::from(0);
    let mut total_credits = BigDecimal::from(0);

    for account in accounts {
        let bal = balance::balance_of(store, user, &account, as_of).await?;
        if bal == zero {
            continue;
        }

        let natural = account.account_type.normal_side();
        let (debit, credit) = match (natural, bal > zero) {
            (Side::Debit, true) => (bal, zero.clone()),
            (Side::Debit, false) => (zero.clone(), bal.abs()),
            (Side::Credit, true) => (zero.clone(), bal),
            (Side::Credit, false) => (bal.abs(), zero.clone()),
        };

        total_debits += &debit;
        total_credits += &credit;
        rows.push(TrialBalanceRow {
            account,
            debit,
            credit,
        });
    }

    let is_balanced = total_debits == total_credits;

    Ok(TrialBalance {
        as_of,
        rows,
        total_debits,
        total_credits,
        is_balanced,
    })
}
