use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Penalty,
    MatchCost,
    Adjustment,
}

impl TransactionType {
    /// Whether this kind of transaction adds to the team balance
    pub fn is_credit(&self) -> bool {
        matches!(self, TransactionType::Deposit | TransactionType::Adjustment)
    }
}

/// Amounts are stored as NUMERIC(10,2): at most two decimals, below 10^8
const AMOUNT_SCALE: u32 = 2;
const AMOUNT_LIMIT: i64 = 100_000_000;

/// Checks that an amount can be stored without rounding or overflow
pub fn check_amount_precision(amount: Decimal) -> Result<(), String> {
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(format!(
            "Amount {} has more than {} decimals",
            amount, AMOUNT_SCALE
        ));
    }
    if amount.abs() >= Decimal::from(AMOUNT_LIMIT) {
        return Err(format!("Amount must stay below {}", AMOUNT_LIMIT));
    }
    Ok(())
}

/// A row in a team's account
///
/// Amounts are always positive; the transaction type decides the sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub team_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub cost_setting_id: Option<Uuid>,
    pub match_id: Option<Uuid>,
    pub transaction_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        team_id: Uuid,
        amount: Decimal,
        transaction_type: TransactionType,
        description: Option<String>,
        transaction_date: NaiveDate,
    ) -> Result<Self, String> {
        if amount <= Decimal::ZERO {
            return Err("Transaction amount must be positive".to_string());
        }
        check_amount_precision(amount)?;

        Ok(Self {
            id: Uuid::new_v4(),
            team_id,
            amount,
            transaction_type,
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            cost_setting_id: None,
            match_id: None,
            transaction_date,
            created_at: Utc::now(),
        })
    }

    /// Amount as it affects the team balance
    pub fn signed_amount(&self) -> Decimal {
        if self.transaction_type.is_credit() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// Sum of signed amounts
pub fn team_balance<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    transactions
        .into_iter()
        .map(Transaction::signed_amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    #[test]
    fn zero_amount_rejected() {
        let result = Transaction::new(Uuid::new_v4(), Decimal::ZERO, TransactionType::Deposit, None, date());
        assert!(result.is_err());
    }

    #[test]
    fn amounts_beyond_column_precision_rejected() {
        let team = Uuid::new_v4();
        let sub_cent = Transaction::new(team, Decimal::new(12345, 3), TransactionType::Deposit, None, date());
        let too_large = Transaction::new(team, Decimal::from(100_000_000), TransactionType::Deposit, None, date());
        assert!(sub_cent.is_err());
        assert!(too_large.is_err());

        // Trailing zeros are not extra precision
        assert!(Transaction::new(team, Decimal::new(12500, 3), TransactionType::Deposit, None, date()).is_ok());
        assert!(Transaction::new(team, Decimal::new(9_999_999_999, 2), TransactionType::Deposit, None, date()).is_ok());
    }

    #[test]
    fn blank_description_dropped() {
        let tx = Transaction::new(
            Uuid::new_v4(),
            Decimal::ONE,
            TransactionType::Deposit,
            Some("  ".to_string()),
            date(),
        )
        .unwrap();
        assert!(tx.description.is_none());
    }

    #[test]
    fn balance_adds_credits_and_subtracts_charges() {
        let team = Uuid::new_v4();
        let transactions = vec![
            Transaction::new(team, Decimal::new(10000, 2), TransactionType::Deposit, None, date()).unwrap(),
            Transaction::new(team, Decimal::new(2500, 2), TransactionType::MatchCost, None, date()).unwrap(),
            Transaction::new(team, Decimal::new(500, 2), TransactionType::Penalty, None, date()).unwrap(),
            Transaction::new(team, Decimal::new(1000, 2), TransactionType::Adjustment, None, date()).unwrap(),
        ];

        assert_eq!(team_balance(&transactions), Decimal::new(8000, 2));
    }

    #[test]
    fn empty_balance_is_zero() {
        assert_eq!(team_balance(&Vec::<Transaction>::new()), Decimal::ZERO);
    }
}
