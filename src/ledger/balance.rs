//! Account balance derivation
//!
//! Balances are never stored; they are summed from transaction lines on
//! demand, with exact decimal arithmetic throughout.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::traits::LedgerStore;
use crate::types::*;

/// Apply the sign convention for an account type to independently summed
/// debit and credit columns.
///
/// Debit-normal accounts (Asset, Expense): debits − credits.
/// Credit-normal accounts (Liability, Equity, Revenue): credits − debits.
pub fn signed_balance(
    account_type: AccountType,
    debits: &BigDecimal,
    credits: &BigDecimal,
) -> BigDecimal {
    match account_type.normal_side() {
        Side::Debit => debits - credits,
        Side::Credit => credits - debits,
    }
}

/// Sum an account's lines as of an optional cutoff date and apply its sign
/// convention. An account with no lines has a balance of zero.
pub async fn balance_of<S>(
    store: &S,
    user: UserId,
    account: &Account,
    as_of: Option<NaiveDate>,
) -> LedgerResult<BigDecimal>
where
    S: LedgerStore + ?Sized,
{
    let lines = store
        .list_transaction_lines(user, account.id, as_of)
        .await?;

    let debits: BigDecimal = lines.iter().map(|l| &l.debit_amount).sum();
    let credits: BigDecimal = lines.iter().map(|l| &l.credit_amount).sum();

    Ok(signed_balance(account.account_type, &debits, &credits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debit_normal_convention() {
        let balance = signed_balance(
            AccountType::Asset,
            &BigDecimal::from(500),
            &BigDecimal::from(120),
        );
        assert_eq!(balance, BigDecimal::from(380));
    }

    #[test]
    fn credit_normal_convention() {
        let balance = signed_balance(
            AccountType::Liability,
            &BigDecimal::from(120),
            &BigDecimal::from(500),
        );
        assert_eq!(balance, BigDecimal::from(380));
    }

    #[test]
    fn overdrawn_debit_normal_goes_negative() {
        let balance = signed_balance(
            AccountType::Asset,
            &BigDecimal::from(100),
            &BigDecimal::from(250),
        );
        assert_eq!(balance, BigDecimal::from(-150));
    }

    #[test]
    fn exact_decimal_sums() {
        // 0.1 + 0.2 must equal 0.3 exactly, which rules out binary floats.
        let debits: BigDecimal = "0.1".parse::<BigDecimal>().unwrap()
            + "0.2".parse::<BigDecimal>().unwrap();
        let balance = signed_balance(AccountType::Expense, &debits, &BigDecimal::from(0));
        assert_eq!(balance, "0.3".parse::<BigDecimal>().unwrap());
    }
}
