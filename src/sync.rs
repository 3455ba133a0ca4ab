//! External accounting-system sync contract
//!
//! The core does not speak OAuth or HTTP. Vendor integrations (Xero,
//! QuickBooks, Sage, ...) live outside this crate, implement
//! [`AccountingProvider`], and hand the core normalized records which the
//! store upserts by `(user, external_id)` or `(user, account_number)`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{AccountType, LedgerResult, UserId};

/// Normalized chart-of-accounts record produced by a vendor sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAccountRecord {
    pub name: String,
    pub account_type: AccountType,
    pub account_number: String,
    pub description: String,
    /// Vendor-side identifier, used as the primary upsert key
    pub external_id: Option<String>,
}

/// Outcome counts of one sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncSummary {
    pub accounts_synced: usize,
    pub transactions_synced: usize,
    pub contacts_synced: usize,
}

/// Capability set every external accounting vendor integration provides.
///
/// Credentials come from the implementation's own injected configuration,
/// never from process-wide globals.
#[async_trait]
pub trait AccountingProvider: Send + Sync {
    /// Vendor name recorded as the transaction source ("xero",
    /// "quickbooks", "sage", ...)
    fn vendor(&self) -> &str;

    /// Establish or refresh the vendor session
    async fn authenticate(&self) -> LedgerResult<()>;

    /// Pull the vendor's chart of accounts and upsert it into the store
    async fn sync_accounts(&self, user: UserId) -> LedgerResult<SyncSummary>;

    /// Pull vendor transactions and post them through the store's validated
    /// create path
    async fn sync_transactions(&self, user: UserId) -> LedgerResult<SyncSummary>;

    /// Pull vendor contacts for the caller's own bookkeeping
    async fn sync_contacts(&self, user: UserId) -> LedgerResult<SyncSummary>;
}

/// Map a vendor's account-type vocabulary onto the five internal types.
/// Unrecognized names default to `Asset`, matching how vendor syncs treat
/// unknown categories.
pub fn map_external_account_type(vendor_type: &str) -> AccountType {
    match vendor_type.to_ascii_lowercase().as_str() {
        "liability" | "liabilities" => AccountType::Liability,
        "equity" => AccountType::Equity,
        "income" | "revenue" => AccountType::Revenue,
        "expense" | "expenses" => AccountType::Expense,
        _ => AccountType::Asset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_type_mapping() {
        assert_eq!(map_external_account_type("Income"), AccountType::Revenue);
        assert_eq!(
            map_external_account_type("Liability"),
            AccountType::Liability
        );
        assert_eq!(map_external_account_type("Equity"), AccountType::Equity);
        assert_eq!(map_external_account_type("Expense"), AccountType::Expense);
        assert_eq!(map_external_account_type("Asset"), AccountType::Asset);
        assert_eq!(map_external_account_type("Bank"), AccountType::Asset);
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = ExternalAccountRecord {
            name: "Sales".to_string(),
            account_type: AccountType::Revenue,
            account_number: "4000".to_string(),
            description: String::new(),
            external_id: Some("qb-77".to_string()),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: ExternalAccountRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
