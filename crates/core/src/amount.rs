//! Amount helpers: range resolution policy and INR formatting

use serde::{Deserialize, Serialize};

/// How a spoken range ("50k-1 lakh") collapses to a single amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Take the smaller bound
    #[default]
    LowerBound,
    /// Take the arithmetic mean of both bounds
    Midpoint,
}

impl RangePolicy {
    pub fn resolve(&self, low: f64, high: f64) -> f64 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        match self {
            RangePolicy::LowerBound => low,
            RangePolicy::Midpoint => (low + high) / 2.0,
        }
    }
}

/// Format a rupee amount with Indian digit grouping, e.g. `₹12,34,567`
///
/// Amounts are rounded to whole rupees.
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, last_three) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("{},{}", groups.join(","), last_three)
    };

    if negative {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_policy() {
        assert_eq!(RangePolicy::LowerBound.resolve(50_000.0, 100_000.0), 50_000.0);
        assert_eq!(RangePolicy::LowerBound.resolve(100_000.0, 50_000.0), 50_000.0);
        assert_eq!(RangePolicy::Midpoint.resolve(50_000.0, 100_000.0), 75_000.0);
    }

    #[test]
    fn test_format_inr() {
        assert_eq!(format_inr(0.0), "₹0");
        assert_eq!(format_inr(999.0), "₹999");
        assert_eq!(format_inr(1_000.0), "₹1,000");
        assert_eq!(format_inr(100_000.0), "₹1,00,000");
        assert_eq!(format_inr(1_234_567.0), "₹12,34,567");
        assert_eq!(format_inr(25_000_000.0), "₹2,50,00,000");
        assert_eq!(format_inr(499.6), "₹500");
    }
}
