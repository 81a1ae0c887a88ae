// Finance domain module
// Cost settings, team transactions and charge reconciliation

pub mod cost_setting;
pub mod reconciliation;
pub mod transaction;

pub use cost_setting::{CostCategory, CostSetting};
pub use reconciliation::{
    ChargeKey, ChargeScope, DesiredCharge, DesiredCharges, ExistingCharge, MatchReconciliation,
    ReconciliationOutcome, ReconciliationPlan,
};
pub use transaction::{check_amount_precision, team_balance, Transaction, TransactionType};
