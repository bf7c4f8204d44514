use crate::domain::{Campaign, Company, User};
use chrono::{DateTime, Duration, Utc};

/// Records that must be persisted together or not at all.
///
/// Insert order is companies, then users, then campaigns, so foreign keys
/// inside the batch always resolve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch {
    pub companies: Vec<Company>,
    pub users: Vec<User>,
    pub campaigns: Vec<Campaign>,
}

impl RecordBatch {
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty() && self.users.is_empty() && self.campaigns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.companies.len() + self.users.len() + self.campaigns.len()
    }

    /// Restamps every row from `base`, one microsecond apart per table, so
    /// `created_at` ordering reproduces batch order even after the database
    /// truncates to microseconds.
    pub fn stamp_sequential(&mut self, base: DateTime<Utc>) {
        for (i, company) in self.companies.iter_mut().enumerate() {
            let at = base + Duration::microseconds(i as i64);
            company.created_at = at;
            company.updated_at = at;
        }
        for (i, user) in self.users.iter_mut().enumerate() {
            let at = base + Duration::microseconds(i as i64);
            user.created_at = at;
            user.updated_at = at;
        }
        for (i, campaign) in self.campaigns.iter_mut().enumerate() {
            let at = base + Duration::microseconds(i as i64);
            campaign.created_at = at;
            campaign.updated_at = at;
        }
    }
}
