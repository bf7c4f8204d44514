use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// A single advertising effort and its raw counters.
///
/// `platform` is an open string: reports group by whatever value is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub platform: String,
    pub status: CampaignStatus,
    pub budget: f64,
    pub spent: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: i64,
    pub revenue: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Paused,
    Completed,
}

/// Platforms the demo fixtures iterate, in seeding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Platform {
    Google,
    Facebook,
    Instagram,
}

impl Platform {
    pub const SEED_ORDER: [Platform; 3] = [Platform::Google, Platform::Facebook, Platform::Instagram];

    pub fn title(self) -> &'static str {
        match self {
            Platform::Google => "Google",
            Platform::Facebook => "Facebook",
            Platform::Instagram => "Instagram",
        }
    }
}

impl Campaign {
    pub fn new(company_id: Uuid, name: String, platform: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id,
            name,
            platform,
            status: CampaignStatus::Active,
            budget: 0.0,
            spent: 0.0,
            impressions: 0,
            clicks: 0,
            conversions: 0,
            revenue: 0.0,
            created_at: now,
            updated_at: now,
        }
    }
}
