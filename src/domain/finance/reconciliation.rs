//! Reconciliation of match-bound charges against a target count.
//!
//! A submitted match implies a set of charges per team: one penalty per
//! card, one row per match-cost setting. Syncing compares that desired set
//! with the rows already booked for the match and produces the inserts and
//! deletes that make them equal. Running the same plan twice is a no-op.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::cost_setting::{CostCategory, CostSetting};
use super::transaction::{Transaction, TransactionType};
use crate::domain::matches::{CardType, Match, Side};

/// Which family of match-bound charges is being reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeScope {
    CardPenalties,
    MatchCosts,
}

impl ChargeScope {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            ChargeScope::CardPenalties => TransactionType::Penalty,
            ChargeScope::MatchCosts => TransactionType::MatchCost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ChargeKey {
    pub team_id: Uuid,
    pub cost_setting_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredCharge {
    pub key: ChargeKey,
    pub count: usize,
    pub amount: Decimal,
    pub description: String,
}

/// A charge row already booked for the match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingCharge {
    pub id: Uuid,
    pub key: ChargeKey,
    pub created_at: DateTime<Utc>,
}

impl ExistingCharge {
    /// Charge view of a booked transaction; rows without a cost setting are not charges
    pub fn from_transaction(tx: &Transaction) -> Option<Self> {
        tx.cost_setting_id.map(|cost_setting_id| ExistingCharge {
            id: tx.id,
            key: ChargeKey {
                team_id: tx.team_id,
                cost_setting_id,
            },
            created_at: tx.created_at,
        })
    }
}

/// Charges a match should carry, plus the card types that had no penalty setting
#[derive(Debug, Clone, Default)]
pub struct DesiredCharges {
    pub charges: Vec<DesiredCharge>,
    pub unmapped_cards: Vec<CardType>,
}

impl DesiredCharges {
    pub fn for_match(scope: ChargeScope, m: &Match, settings: &[CostSetting]) -> Self {
        match scope {
            ChargeScope::CardPenalties => card_penalties(m, settings),
            ChargeScope::MatchCosts => Self {
                charges: match_costs(m, settings),
                unmapped_cards: Vec::new(),
            },
        }
    }
}

fn card_penalties(m: &Match, settings: &[CostSetting]) -> DesiredCharges {
    let mut desired = DesiredCharges::default();

    for side in [Side::Home, Side::Away] {
        let team_id = m.team_id(side);
        for (card, count) in m.card_counts(side) {
            let Some(setting) = CostSetting::penalty_for(settings, card) else {
                if !desired.unmapped_cards.contains(&card) {
                    desired.unmapped_cards.push(card);
                }
                continue;
            };
            if setting.amount.is_zero() {
                continue;
            }
            desired.charges.push(DesiredCharge {
                key: ChargeKey {
                    team_id,
                    cost_setting_id: setting.id,
                },
                count,
                amount: setting.amount,
                description: format!(
                    "{}: {} (wedstrijd {})",
                    setting.name,
                    card.label(),
                    m.match_date().format("%d/%m/%Y")
                ),
            });
        }
    }

    desired
}

fn match_costs(m: &Match, settings: &[CostSetting]) -> Vec<DesiredCharge> {
    if !m.is_submitted() {
        return Vec::new();
    }

    let mut charges = Vec::new();
    for setting in settings
        .iter()
        .filter(|s| s.category == CostCategory::MatchCost && !s.amount.is_zero())
    {
        for side in [Side::Home, Side::Away] {
            charges.push(DesiredCharge {
                key: ChargeKey {
                    team_id: m.team_id(side),
                    cost_setting_id: setting.id,
                },
                count: 1,
                amount: setting.amount,
                description: format!(
                    "{} (wedstrijd {})",
                    setting.name,
                    m.match_date().format("%d/%m/%Y")
                ),
            });
        }
    }
    charges
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationOutcome {
    pub inserted: usize,
    pub deleted: usize,
}

/// What a charge reconciliation of one match did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReconciliation {
    pub outcome: ReconciliationOutcome,
    pub unmapped_cards: Vec<CardType>,
}

/// Rows to insert and ids to delete so that booked charges match the desired set
#[derive(Debug, Clone, Default)]
pub struct ReconciliationPlan {
    pub inserts: Vec<Transaction>,
    pub deletes: Vec<Uuid>,
}

impl ReconciliationPlan {
    /// Compares desired charges with existing rows
    ///
    /// Desired charges sharing a key are summed. Surplus rows are removed
    /// newest first; rows whose key is not desired at all are removed.
    pub fn build(
        match_id: Uuid,
        scope: ChargeScope,
        transaction_date: NaiveDate,
        desired: &[DesiredCharge],
        existing: &[ExistingCharge],
    ) -> Self {
        let mut wanted: BTreeMap<ChargeKey, (usize, &DesiredCharge)> = BTreeMap::new();
        for charge in desired {
            wanted
                .entry(charge.key)
                .and_modify(|(count, _)| *count += charge.count)
                .or_insert((charge.count, charge));
        }

        let mut booked: BTreeMap<ChargeKey, Vec<&ExistingCharge>> = BTreeMap::new();
        for row in existing {
            booked.entry(row.key).or_default().push(row);
        }

        let mut plan = ReconciliationPlan::default();

        for (key, (want, template)) in &wanted {
            let have = booked.get(key).map_or(0, Vec::len);
            for _ in have..*want {
                plan.inserts.push(Transaction {
                    id: Uuid::new_v4(),
                    team_id: key.team_id,
                    amount: template.amount,
                    transaction_type: scope.transaction_type(),
                    description: Some(template.description.clone()),
                    cost_setting_id: Some(key.cost_setting_id),
                    match_id: Some(match_id),
                    transaction_date,
                    created_at: Utc::now(),
                });
            }
        }

        for (key, mut rows) in booked {
            let want = wanted.get(&key).map_or(0, |(count, _)| *count);
            if rows.len() <= want {
                continue;
            }
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            let surplus = rows.len() - want;
            plan.deletes.extend(rows.into_iter().take(surplus).map(|row| row.id));
        }

        plan
    }

    /// Plan for a match as it is stored now
    ///
    /// Also returns the card types that had no penalty setting.
    pub fn for_match(
        scope: ChargeScope,
        m: &Match,
        settings: &[CostSetting],
        existing: &[ExistingCharge],
    ) -> (Self, Vec<CardType>) {
        let desired = DesiredCharges::for_match(scope, m, settings);
        let plan = Self::build(m.id(), scope, m.match_date().date(), &desired.charges, existing);
        (plan, desired.unmapped_cards)
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.deletes.is_empty()
    }

    pub fn outcome(&self) -> ReconciliationOutcome {
        ReconciliationOutcome {
            inserted: self.inserts.len(),
            deleted: self.deletes.len(),
        }
    }
}
