use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::check_amount_precision;
use crate::domain::matches::CardType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "cost_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    /// Charged once per team for every submitted match (field rent, referee fee)
    MatchCost,
    /// Charged per card when bound to a card type
    Penalty,
    Other,
}

/// An admin-configured named amount used to generate transactions
///
/// # Invariants
/// - Name is never empty
/// - Amount is not negative and fits NUMERIC(10,2)
/// - Only penalty settings are bound to a card type, never to `CardType::None`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSetting {
    pub id: Uuid,
    pub name: String,
    pub amount: Decimal,
    pub category: CostCategory,
    pub card_type: Option<CardType>,
}

impl CostSetting {
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        category: CostCategory,
        card_type: Option<CardType>,
    ) -> Result<Self, String> {
        let setting = Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            amount,
            category,
            card_type,
        };
        setting.validate()?;
        Ok(setting)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Cost setting name cannot be empty".to_string());
        }
        if self.amount < Decimal::ZERO {
            return Err("Cost amount cannot be negative".to_string());
        }
        check_amount_precision(self.amount)?;
        match (self.category, self.card_type) {
            (_, Some(CardType::None)) => {
                Err("A cost setting cannot be bound to card type none".to_string())
            }
            (CostCategory::Penalty, _) | (_, None) => Ok(()),
            (_, Some(_)) => Err("Only penalty settings can be bound to a card type".to_string()),
        }
    }

    /// Penalty setting charged for a card type, first match wins
    pub fn penalty_for(settings: &[CostSetting], card: CardType) -> Option<&CostSetting> {
        settings
            .iter()
            .find(|s| s.category == CostCategory::Penalty && s.card_type == Some(card))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_penalty_setting() {
        let setting = CostSetting::new(
            " Boete gele kaart ",
            Decimal::new(500, 2),
            CostCategory::Penalty,
            Some(CardType::Yellow),
        )
        .unwrap();
        assert_eq!(setting.name, "Boete gele kaart");
    }

    #[test]
    fn negative_amount_rejected() {
        assert!(CostSetting::new("Veldhuur", Decimal::from(-1), CostCategory::MatchCost, None).is_err());
    }

    #[test]
    fn amount_must_fit_storage() {
        assert!(CostSetting::new("Veldhuur", Decimal::new(1001, 3), CostCategory::MatchCost, None).is_err());
        assert!(CostSetting::new("Veldhuur", Decimal::from(100_000_000), CostCategory::MatchCost, None).is_err());
        assert!(CostSetting::new("Veldhuur", Decimal::new(3000, 2), CostCategory::MatchCost, None).is_ok());
    }

    #[test]
    fn empty_name_rejected() {
        assert!(CostSetting::new("", Decimal::ONE, CostCategory::Other, None).is_err());
    }

    #[test]
    fn card_type_only_on_penalties() {
        assert!(CostSetting::new(
            "Veldhuur",
            Decimal::ONE,
            CostCategory::MatchCost,
            Some(CardType::Red)
        )
        .is_err());
        assert!(CostSetting::new(
            "Boete",
            Decimal::ONE,
            CostCategory::Penalty,
            Some(CardType::None)
        )
        .is_err());
    }

    #[test]
    fn penalty_lookup_takes_first_match() {
        let first = CostSetting::new("Geel", Decimal::ONE, CostCategory::Penalty, Some(CardType::Yellow)).unwrap();
        let second = CostSetting::new("Geel bis", Decimal::from(2), CostCategory::Penalty, Some(CardType::Yellow)).unwrap();
        let settings = vec![first.clone(), second];

        assert_eq!(CostSetting::penalty_for(&settings, CardType::Yellow), Some(&first));
        assert!(CostSetting::penalty_for(&settings, CardType::Red).is_none());
    }
}
