use crate::domain::{Plan, Role};

pub(super) const ROLES: [&str; 2] = ["agency", "client"];
pub(super) const PLANS: [&str; 3] = ["starter", "aceleracao", "crescimento"];

pub(super) fn parse_role(role: &str) -> Option<Role> {
    match role {
        "agency" => Some(Role::Agency),
        "client" => Some(Role::Client),
        _ => None,
    }
}

pub(super) fn parse_plan(plan: &str) -> Option<Plan> {
    match plan {
        "starter" => Some(Plan::Starter),
        "aceleracao" => Some(Plan::Aceleracao),
        "crescimento" => Some(Plan::Crescimento),
        _ => None,
    }
}
