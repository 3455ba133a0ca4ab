//! Basic ledger usage example

use bigdecimal::BigDecimal;
use bookkeeping_core::{
    patterns, AccountType, Ledger, MemoryStore, MetricsConfig, MetricsPeriod, NewAccount,
    TransactionBuilder, UserId,
};
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧾 Bookkeeping Core - Basic Ledger Example\n");

    let ledger = Ledger::new(MemoryStore::new());
    let user = UserId::new();

    // 1. Set up a small chart of accounts
    println!("📊 Setting up Chart of Accounts...");
    let cash = ledger
        .create_account(
            NewAccount::new(user, "Cash", AccountType::Asset, "1000")
                .tag("cash")
                .tag("current"),
        )
        .await?;
    let receivable = ledger
        .create_account(
            NewAccount::new(user, "Accounts Receivable", AccountType::Asset, "1200")
                .tag("receivable")
                .tag("current"),
        )
        .await?;
    let payable = ledger
        .create_account(
            NewAccount::new(user, "Accounts Payable", AccountType::Liability, "2000")
                .tag("current"),
        )
        .await?;
    let equity = ledger
        .create_account(NewAccount::new(
            user,
            "Owner's Equity",
            AccountType::Equity,
            "3000",
        ))
        .await?;
    let revenue = ledger
        .create_account(NewAccount::new(
            user,
            "Sales Revenue",
            AccountType::Revenue,
            "4000",
        ))
        .await?;
    let rent = ledger
        .create_account(NewAccount::new(
            user,
            "Rent Expense",
            AccountType::Expense,
            "6000",
        ))
        .await?;

    for account in ledger.list_accounts(user, true).await? {
        println!(
            "  ✓ {} - {} ({:?})",
            account.account_number, account.name, account.account_type
        );
    }
    println!();

    // 2. Record some business transactions
    println!("💰 Recording Business Transactions...\n");

    let investment = patterns::owner_investment(
        user,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        "Initial owner investment",
        cash.id,
        equity.id,
        BigDecimal::from(50_000),
    )?;
    ledger.create_transaction(investment).await?;
    println!("  ✓ Recorded: Owner investment of 50,000");

    let credit_sale = patterns::sale(
        user,
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        "Invoice #1001",
        receivable.id,
        revenue.id,
        BigDecimal::from(12_000),
    )?;
    ledger.create_transaction(credit_sale).await?;
    println!("  ✓ Recorded: Credit sale of 12,000");

    let supplies = TransactionBuilder::new(
        user,
        NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
        "Office supplies on account",
    )
    .reference("PO-17")
    .debit(rent.id, BigDecimal::from(3_000))
    .credit(payable.id, BigDecimal::from(3_000))
    .build()?;
    ledger.create_transaction(supplies).await?;
    println!("  ✓ Recorded: Purchase on account of 3,000");

    let receipt = TransactionBuilder::new(
        user,
        NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
        "Receipt against invoice #1001",
    )
    .debit(cash.id, BigDecimal::from(8_000))
    .credit(receivable.id, BigDecimal::from(8_000))
    .build()?;
    ledger.create_transaction(receipt).await?;
    println!("  ✓ Recorded: Customer payment of 8,000");

    // 3. Trial balance
    let report = ledger
        .trial_balance(user, Some(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()))
        .await?;

    println!("\n🔍 Trial Balance as of January 31, 2024:");
    for row in &report.rows {
        println!(
            "  {:<24} debit {:>10}  credit {:>10}",
            row.account.name, row.debit, row.credit
        );
    }
    println!("  Total Debits:  {}", report.total_debits);
    println!("  Total Credits: {}", report.total_credits);
    println!(
        "  Balanced: {}",
        if report.is_balanced { "✅ Yes" } else { "❌ No" }
    );

    // 4. Business ratios
    let period = MetricsPeriod::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    );
    let ratios = ledger
        .metrics(user, MetricsConfig::default())
        .compute_all(period)
        .await?;

    println!("\n💹 Business Ratios:");
    let show = |name: &str, value: &Option<BigDecimal>| match value {
        Some(v) => println!("  {name}: {v}"),
        None => println!("  {name}: N/A"),
    };
    show("Quick ratio", &ratios.quick_ratio);
    show("Current ratio", &ratios.current_ratio);
    show("Operating cash flow ratio", &ratios.operating_cash_flow_ratio);
    show("Gross profit margin (%)", &ratios.gross_profit_margin);
    show("Debt-to-equity ratio", &ratios.debt_to_equity_ratio);
    show(
        "Accounts receivable turnover",
        &ratios.accounts_receivable_turnover,
    );

    println!("\n🎉 Example completed successfully!");
    Ok(())
}
