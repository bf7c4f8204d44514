//! Derived advertising KPIs.
//!
//! Every formula reports `0.0` when its denominator is not positive: an
//! undefined metric is shown as zero, never as an error or NaN. Values are
//! kept at full precision; rounding happens only when a report is serialized.

use serde::Serializer;

/// Click-through rate, in percent.
pub fn ctr(clicks: f64, impressions: f64) -> f64 {
    if impressions > 0.0 {
        clicks / impressions * 100.0
    } else {
        0.0
    }
}

/// Cost per click.
pub fn cpc(spent: f64, clicks: f64) -> f64 {
    if clicks > 0.0 {
        spent / clicks
    } else {
        0.0
    }
}

/// Return on ad spend, as a ratio.
pub fn roas(revenue: f64, spent: f64) -> f64 {
    if spent > 0.0 {
        revenue / spent
    } else {
        0.0
    }
}

/// Return on investment, in percent.
pub fn roi(revenue: f64, spent: f64) -> f64 {
    if spent > 0.0 {
        (revenue - spent) / spent * 100.0
    } else {
        0.0
    }
}

/// Customer acquisition cost.
pub fn cac(spent: f64, conversions: f64) -> f64 {
    if conversions > 0.0 {
        spent / conversions
    } else {
        0.0
    }
}

/// Conversions per click, in percent.
pub fn conversion_rate(conversions: f64, clicks: f64) -> f64 {
    if clicks > 0.0 {
        conversions / clicks * 100.0
    } else {
        0.0
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `serialize_with` helper for KPI fields.
pub(crate) fn serialize_rounded<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(round2(*value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_denominators_report_zero() {
        assert_eq!(ctr(10.0, 0.0), 0.0);
        assert_eq!(cpc(100.0, 0.0), 0.0);
        assert_eq!(roas(500.0, 0.0), 0.0);
        assert_eq!(roi(500.0, 0.0), 0.0);
        assert_eq!(cac(100.0, 0.0), 0.0);
        assert_eq!(conversion_rate(3.0, 0.0), 0.0);
    }

    #[test]
    fn all_zero_counters_never_produce_nan() {
        for value in [
            ctr(0.0, 0.0),
            cpc(0.0, 0.0),
            roas(0.0, 0.0),
            roi(0.0, 0.0),
            cac(0.0, 0.0),
            conversion_rate(0.0, 0.0),
        ] {
            assert!(!value.is_nan());
            assert_eq!(value, 0.0);
        }
    }

    #[test]
    fn formulas_match_definitions() {
        assert_eq!(ctr(50.0, 1000.0), 5.0);
        assert_eq!(cpc(200.0, 50.0), 4.0);
        assert_eq!(roas(900.0, 300.0), 3.0);
        assert_eq!(roi(900.0, 300.0), 200.0);
        assert_eq!(roi(150.0, 300.0), -50.0);
        assert_eq!(cac(300.0, 6.0), 50.0);
        assert_eq!(conversion_rate(5.0, 50.0), 10.0);
    }

    #[test]
    fn rounding_keeps_two_decimals() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(2.675_000_1), 2.68);
        assert_eq!(round2(-1.005_1), -1.01);
        assert_eq!(round2(42.0), 42.0);
    }
}
