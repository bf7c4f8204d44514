//! Roll-ups of campaign counters into company, plan and platform reports.
//!
//! Everything here is pure: callers pass records that access scoping has
//! already admitted, and get full-precision reports back.

use crate::application::metrics::{self, serialize_rounded};
use crate::domain::{Campaign, Company, Plan};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use strum::IntoEnumIterator;
use uuid::Uuid;

pub const TOP_COMPANIES_LIMIT: usize = 5;

/// Summed raw counters of a group of campaigns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CounterTotals {
    pub campaigns: usize,
    pub budget: f64,
    pub spent: f64,
    pub revenue: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub conversions: i64,
}

impl CounterTotals {
    pub fn from_campaigns<'a, I>(campaigns: I) -> Self
    where
        I: IntoIterator<Item = &'a Campaign>,
    {
        let mut totals = Self::default();
        for campaign in campaigns {
            totals.add(campaign);
        }
        totals
    }

    pub fn add(&mut self, campaign: &Campaign) {
        self.campaigns += 1;
        self.budget += campaign.budget;
        self.spent += campaign.spent;
        self.revenue += campaign.revenue;
        self.impressions += campaign.impressions;
        self.clicks += campaign.clicks;
        self.conversions += campaign.conversions;
    }

    /// Ratio of sums: `sum(revenue) / sum(spent)`.
    pub fn aggregate_roas(&self) -> f64 {
        metrics::roas(self.revenue, self.spent)
    }

    pub fn roi(&self) -> f64 {
        metrics::roi(self.revenue, self.spent)
    }

    pub fn cac(&self) -> f64 {
        metrics::cac(self.spent, self.conversions as f64)
    }

    pub fn ctr(&self) -> f64 {
        metrics::ctr(self.clicks as f64, self.impressions as f64)
    }

    pub fn cpc(&self) -> f64 {
        metrics::cpc(self.spent, self.clicks as f64)
    }

    pub fn conversion_rate(&self) -> f64 {
        metrics::conversion_rate(self.conversions as f64, self.clicks as f64)
    }
}

/// Mean of per-campaign ROAS values.
///
/// Campaigns with no spend have no ROAS and are left out of the mean; a group
/// with no eligible campaign reports 0.
pub fn average_campaign_roas<'a, I>(campaigns: I) -> f64
where
    I: IntoIterator<Item = &'a Campaign>,
{
    let (sum, count) = campaigns
        .into_iter()
        .filter(|c| c.spent > 0.0)
        .fold((0.0, 0usize), |(sum, count), c| {
            (sum + metrics::roas(c.revenue, c.spent), count + 1)
        });

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CampaignReport {
    #[serde(flatten)]
    pub campaign: Campaign,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(serialize_with = "serialize_rounded")]
    pub ctr: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub cpc: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub roas: f64,
}

impl CampaignReport {
    pub fn new(campaign: Campaign) -> Self {
        let ctr = metrics::ctr(campaign.clicks as f64, campaign.impressions as f64);
        let cpc = metrics::cpc(campaign.spent, campaign.clicks as f64);
        let roas = metrics::roas(campaign.revenue, campaign.spent);
        Self {
            campaign,
            company_name: None,
            ctr,
            cpc,
            roas,
        }
    }

    pub fn with_company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompanySummary {
    #[serde(flatten)]
    pub company: Company,
    #[serde(serialize_with = "serialize_rounded")]
    pub total_spent: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub total_revenue: f64,
    pub total_conversions: i64,
    #[serde(serialize_with = "serialize_rounded")]
    pub roi: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub roas: f64,
    pub campaigns_count: usize,
}

impl CompanySummary {
    pub fn new(company: Company, totals: &CounterTotals) -> Self {
        Self {
            company,
            total_spent: totals.spent,
            total_revenue: totals.revenue,
            total_conversions: totals.conversions,
            roi: totals.roi(),
            roas: totals.aggregate_roas(),
            campaigns_count: totals.campaigns,
        }
    }
}

fn totals_by_company(campaigns: &[Campaign]) -> HashMap<Uuid, CounterTotals> {
    let mut totals: HashMap<Uuid, CounterTotals> = HashMap::new();
    for campaign in campaigns {
        totals.entry(campaign.company_id).or_default().add(campaign);
    }
    totals
}

/// One summary per company, in input order. Companies without campaigns are
/// kept with zeroed totals.
pub fn summarize_companies(companies: &[Company], campaigns: &[Campaign]) -> Vec<CompanySummary> {
    let totals = totals_by_company(campaigns);
    companies
        .iter()
        .map(|company| {
            let company_totals = totals.get(&company.id).copied().unwrap_or_default();
            CompanySummary::new(company.clone(), &company_totals)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanPerformance {
    pub plan: Plan,
    pub count: usize,
    #[serde(serialize_with = "serialize_rounded")]
    pub budget: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub avg_roas: f64,
}

/// Groups companies by plan. Plans without companies are omitted.
pub fn plan_performance(companies: &[Company], campaigns: &[Campaign]) -> Vec<PlanPerformance> {
    Plan::iter()
        .filter_map(|plan| {
            let members: Vec<&Company> = companies.iter().filter(|c| c.plan == plan).collect();
            if members.is_empty() {
                return None;
            }

            let member_campaigns = campaigns
                .iter()
                .filter(|campaign| members.iter().any(|c| c.id == campaign.company_id));

            Some(PlanPerformance {
                plan,
                count: members.len(),
                budget: members.iter().map(|c| c.monthly_budget).sum(),
                avg_roas: average_campaign_roas(member_campaigns),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopCompany {
    pub company_id: Uuid,
    pub name: String,
    pub plan: Plan,
    #[serde(serialize_with = "serialize_rounded")]
    pub revenue: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub spent: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub roas: f64,
}

/// Best companies by aggregate ROAS, descending.
///
/// Companies with no spend are excluded rather than ranked as zero. Ties keep
/// input order.
pub fn top_companies_by_roas(summaries: &[CompanySummary], limit: usize) -> Vec<TopCompany> {
    let mut ranked: Vec<&CompanySummary> = summaries
        .iter()
        .filter(|s| s.campaigns_count > 0 && s.total_spent > 0.0)
        .collect();

    ranked.sort_by(|a, b| b.roas.partial_cmp(&a.roas).unwrap_or(Ordering::Equal));

    ranked
        .into_iter()
        .take(limit)
        .map(|s| TopCompany {
            company_id: s.company.id,
            name: s.company.name.clone(),
            plan: s.company.plan,
            revenue: s.total_revenue,
            spent: s.total_spent,
            roas: s.roas,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlatformPerformance {
    #[serde(serialize_with = "serialize_rounded")]
    pub spent: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub revenue: f64,
    pub conversions: i64,
    pub clicks: i64,
    pub impressions: i64,
    #[serde(serialize_with = "serialize_rounded")]
    pub roas: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub ctr: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub cpc: f64,
}

impl From<&CounterTotals> for PlatformPerformance {
    fn from(totals: &CounterTotals) -> Self {
        Self {
            spent: totals.spent,
            revenue: totals.revenue,
            conversions: totals.conversions,
            clicks: totals.clicks,
            impressions: totals.impressions,
            roas: totals.aggregate_roas(),
            ctr: totals.ctr(),
            cpc: totals.cpc(),
        }
    }
}

/// Counters summed per platform string, keyed by platform.
pub fn platform_breakdown(campaigns: &[Campaign]) -> BTreeMap<String, PlatformPerformance> {
    let mut groups: BTreeMap<String, CounterTotals> = BTreeMap::new();
    for campaign in campaigns {
        groups.entry(campaign.platform.clone()).or_default().add(campaign);
    }

    groups
        .iter()
        .map(|(platform, totals)| (platform.clone(), PlatformPerformance::from(totals)))
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgencyKpis {
    pub total_companies: usize,
    pub total_campaigns: usize,
    #[serde(serialize_with = "serialize_rounded")]
    pub total_budget: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub total_spent: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub total_revenue: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub roi: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub avg_cac: f64,
    pub total_conversions: i64,
}

pub fn agency_kpis(companies: &[Company], campaigns: &[Campaign]) -> AgencyKpis {
    let totals = CounterTotals::from_campaigns(campaigns);
    AgencyKpis {
        total_companies: companies.len(),
        total_campaigns: totals.campaigns,
        total_budget: companies.iter().map(|c| c.monthly_budget).sum(),
        total_spent: totals.spent,
        total_revenue: totals.revenue,
        roi: totals.roi(),
        avg_cac: totals.cac(),
        total_conversions: totals.conversions,
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientKpis {
    #[serde(serialize_with = "serialize_rounded")]
    pub roi: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub cac: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub conversion_rate: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub revenue_attributed: f64,
    #[serde(serialize_with = "serialize_rounded")]
    pub total_spent: f64,
    pub total_conversions: i64,
    pub total_clicks: i64,
    pub total_impressions: i64,
}

impl From<&CounterTotals> for ClientKpis {
    fn from(totals: &CounterTotals) -> Self {
        Self {
            roi: totals.roi(),
            cac: totals.cac(),
            conversion_rate: totals.conversion_rate(),
            revenue_attributed: totals.revenue,
            total_spent: totals.spent,
            total_conversions: totals.conversions,
            total_clicks: totals.clicks,
            total_impressions: totals.impressions,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgencyDashboard {
    pub kpis: AgencyKpis,
    pub plans_performance: Vec<PlanPerformance>,
    pub top_companies: Vec<TopCompany>,
}

pub fn build_agency_dashboard(companies: &[Company], campaigns: &[Campaign]) -> AgencyDashboard {
    let summaries = summarize_companies(companies, campaigns);
    AgencyDashboard {
        kpis: agency_kpis(companies, campaigns),
        plans_performance: plan_performance(companies, campaigns),
        top_companies: top_companies_by_roas(&summaries, TOP_COMPANIES_LIMIT),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompanyDashboard {
    pub company: Company,
    pub kpis: ClientKpis,
    pub campaigns: Vec<CampaignReport>,
    pub platform_performance: BTreeMap<String, PlatformPerformance>,
}

/// Dashboard of a single tenant. `campaigns` must all belong to `company`.
pub fn build_company_dashboard(company: Company, campaigns: Vec<Campaign>) -> CompanyDashboard {
    let totals = CounterTotals::from_campaigns(&campaigns);
    let platform_performance = platform_breakdown(&campaigns);
    CompanyDashboard {
        company,
        kpis: ClientKpis::from(&totals),
        campaigns: campaigns.into_iter().map(CampaignReport::new).collect(),
        platform_performance,
    }
}
