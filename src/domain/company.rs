use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub plan: Plan,
    pub monthly_budget: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription tier of a client company.
///
/// Declaration order is the display order of grouped plan reports.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Plan {
    #[default]
    Starter,
    Aceleracao,
    Crescimento,
}

impl Plan {
    /// Number of campaigns the demo fixtures seed for a company on this plan.
    pub fn campaign_cap(self) -> usize {
        match self {
            Plan::Starter => 1,
            Plan::Aceleracao => 2,
            Plan::Crescimento => 3,
        }
    }

    /// Share of the monthly budget given to each seeded campaign.
    pub fn budget_divisor(self) -> f64 {
        match self {
            Plan::Starter => 1.0,
            Plan::Aceleracao => 2.0,
            Plan::Crescimento => 3.0,
        }
    }
}

impl Company {
    pub fn new(name: String, plan: Plan, monthly_budget: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            plan,
            monthly_budget,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
