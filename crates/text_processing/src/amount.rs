//! Phrase Normalizer
//!
//! Converts colloquial Indian amount phrasing into plain numbers:
//! "50k" → 50,000, "1.5 lakh" → 1,50,000, "₹2 crore" → 2,00,00,000,
//! "1,00,000" → 1,00,000 and ranges like "50k-1 lakh" or "between 2 and 3 lakh".
//!
//! Patterns are compiled once at program start using `once_cell::sync::Lazy`.
//! Unrecognised text is never an error; it simply yields no mentions.

use event_planner_core::RangePolicy;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Magnitude words and their multipliers
///
/// Devanagari words are listed in both precomposed and combining-nukta forms.
const MAGNITUDES: &[(&str, f64)] = &[
    ("crores", 10_000_000.0),
    ("crore", 10_000_000.0),
    ("cr", 10_000_000.0),
    ("\u{0915}\u{0930}\u{094B}\u{0921}\u{093C}", 10_000_000.0),
    ("\u{0915}\u{0930}\u{094B}\u{095C}", 10_000_000.0),
    ("lakhs", 100_000.0),
    ("lakh", 100_000.0),
    ("lacs", 100_000.0),
    ("lac", 100_000.0),
    ("\u{0932}\u{093E}\u{0916}", 100_000.0),
    ("thousands", 1_000.0),
    ("thousand", 1_000.0),
    ("hazaar", 1_000.0),
    ("hazar", 1_000.0),
    ("\u{0939}\u{091C}\u{093C}\u{093E}\u{0930}", 1_000.0),
    ("\u{0939}\u{095B}\u{093E}\u{0930}", 1_000.0),
    ("\u{0939}\u{091C}\u{093E}\u{0930}", 1_000.0),
    ("k", 1_000.0),
];

const NUMBER: &str = r"\d{1,3}(?:,\d{2,3})+(?:\.\d+)?|\d+(?:\.\d+)?";
const CURRENCY: &str = r"(?:₹|\b(?:rs\.?|inr))\s*";

static MAGNITUDE_ALTERNATION: Lazy<String> = Lazy::new(|| {
    let mut words: Vec<&str> = MAGNITUDES.iter().map(|(w, _)| *w).collect();
    // Longest first so "crore" is preferred over "cr"
    words.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
});

/// One numeric mention: optional "between", currency, a number, an optional magnitude,
/// then optionally a separator and a second bound.
static MENTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let mag = MAGNITUDE_ALTERNATION.as_str();
    Regex::new(&format!(
        r"(?i)(?P<between>\bbetween\s+)?(?P<currency>{cur})?(?P<low>{num})(?:\s*(?P<low_mag>{mag})\b)?(?:(?P<sep>\s*[-–]\s*|\s+(?:to|and)\s+)(?:{cur})?(?P<high>{num})(?:\s*(?P<high_mag>{mag})\b)?)?",
        cur = CURRENCY,
        num = NUMBER,
        mag = mag,
    ))
    .unwrap()
});

/// A numeric mention found in text
#[derive(Debug, Clone, PartialEq)]
pub struct AmountMention {
    /// Single amount after applying magnitude and range policy
    pub value: f64,
    /// Lower and upper bound for ranges, both equal to `value` otherwise
    pub low: f64,
    pub high: f64,
    /// Byte span in the scanned text
    pub start: usize,
    pub end: usize,
    pub has_magnitude: bool,
    pub has_currency: bool,
    pub is_range: bool,
}

impl AmountMention {
    /// Whether the value is a whole number
    pub fn is_whole(&self) -> bool {
        self.value.fract() == 0.0
    }
}

/// Normalizer for Indian amount expressions
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountNormalizer {
    policy: RangePolicy,
}

impl AmountNormalizer {
    pub fn new(policy: RangePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RangePolicy {
        self.policy
    }

    /// Canonical amount for `text`, or `None` when it holds no number
    ///
    /// The first mention carrying a magnitude word or currency marker is preferred;
    /// otherwise the first bare number is used.
    pub fn normalize_amount(&self, text: &str) -> Option<f64> {
        let mentions = self.scan(text);
        mentions
            .iter()
            .find(|m| m.has_magnitude || m.has_currency)
            .or_else(|| mentions.first())
            .map(|m| m.value)
    }

    /// All numeric mentions in `text`, in order of appearance
    ///
    /// Numbers glued to letters ("2nd", "10am", "A4") and ten-digit mobile numbers
    /// are skipped.
    pub fn scan(&self, text: &str) -> Vec<AmountMention> {
        let mut mentions = Vec::new();

        for caps in MENTION_PATTERN.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(low) = caps.name("low") else { continue };

            if glued_before(text, whole.start()) {
                continue;
            }

            let Some(low_digits) = parse_number(low.as_str()) else {
                continue;
            };
            let low_mag = magnitude(&caps, "low_mag");

            if looks_like_mobile(low.as_str()) {
                tracing::debug!(value = %low.as_str(), "Skipping mobile number");
                continue;
            }

            let has_currency = caps.name("currency").is_some();
            let separator = caps.name("sep").map(|m| m.as_str().trim().to_lowercase());
            let high = caps.name("high").and_then(|h| parse_number(h.as_str()).map(|v| (h, v)));

            // "and" only joins a range after "between"; otherwise the bounds are separate numbers
            let joined = match separator.as_deref() {
                Some("and") => caps.name("between").is_some(),
                Some(_) => true,
                None => false,
            };

            match high {
                Some((high_match, high_digits)) if joined => {
                    let end = whole.end();
                    if glued_after(text, end) || looks_like_mobile(high_match.as_str()) {
                        continue;
                    }
                    let high_mag = magnitude(&caps, "high_mag");
                    let high_value = high_digits * high_mag.unwrap_or(1.0);
                    let low_value = scale_lower_bound(low_digits, low_mag, high_mag, high_value);
                    let start = caps
                        .name("currency")
                        .map_or(low.start(), |c| c.start());
                    mentions.push(AmountMention {
                        value: round_paise(self.policy.resolve(low_value, high_value)),
                        low: round_paise(low_value.min(high_value)),
                        high: round_paise(low_value.max(high_value)),
                        start,
                        end,
                        has_magnitude: low_mag.is_some() || high_mag.is_some(),
                        has_currency,
                        is_range: true,
                    });
                }
                other => {
                    let end = caps
                        .name("low_mag")
                        .map_or(low.end(), |m| m.end());
                    let start = caps
                        .name("currency")
                        .map_or(low.start(), |c| c.start());
                    if !glued_after(text, end) {
                        let value = round_paise(low_digits * low_mag.unwrap_or(1.0));
                        mentions.push(single(value, start, end, low_mag.is_some(), has_currency));
                    }

                    // Unjoined second number ("200 and 50k")
                    if let Some((high_match, high_digits)) = other {
                        let high_mag = magnitude(&caps, "high_mag");
                        let end = whole.end();
                        if !glued_after(text, end) && !looks_like_mobile(high_match.as_str()) {
                            let value = round_paise(high_digits * high_mag.unwrap_or(1.0));
                            mentions.push(single(value, high_match.start(), end, high_mag.is_some(), false));
                        }
                    }
                }
            }
        }

        mentions
    }
}

/// Normalize with the default range policy
pub fn normalize_amount(text: &str) -> Option<f64> {
    AmountNormalizer::default().normalize_amount(text)
}

fn single(value: f64, start: usize, end: usize, has_magnitude: bool, has_currency: bool) -> AmountMention {
    AmountMention {
        value,
        low: value,
        high: value,
        start,
        end,
        has_magnitude,
        has_currency,
        is_range: false,
    }
}

/// Lower bound of a range
///
/// A magnitude on the upper bound alone carries over to the lower bound ("1-2 lakh",
/// "30 to 50k") unless that would push it above the upper bound ("50000 to 1 lakh").
fn scale_lower_bound(digits: f64, own: Option<f64>, upper: Option<f64>, high_value: f64) -> f64 {
    match (own, upper) {
        (Some(multiplier), _) => digits * multiplier,
        (None, Some(multiplier)) if digits * multiplier <= high_value => digits * multiplier,
        _ => digits,
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn magnitude(caps: &Captures<'_>, group: &str) -> Option<f64> {
    let word = caps.name(group)?.as_str().to_lowercase();
    MAGNITUDES
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, multiplier)| *multiplier)
}

fn looks_like_mobile(digits: &str) -> bool {
    let clean: String = digits.chars().filter(|c| *c != ',').collect();
    clean.len() == 10 && clean.starts_with(['6', '7', '8', '9']) && clean.chars().all(|c| c.is_ascii_digit())
}

fn glued_before(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .map_or(false, |c| c.is_alphanumeric() || c == '.' || c == ',')
}

fn glued_after(text: &str, end: usize) -> bool {
    text[end..]
        .chars()
        .next()
        .map_or(false, |c| c.is_alphanumeric())
}

fn round_paise(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude_words() {
        assert_eq!(normalize_amount("50k"), Some(50_000.0));
        assert_eq!(normalize_amount("1 lakh"), Some(100_000.0));
        assert_eq!(normalize_amount("2.5 crore"), Some(25_000_000.0));
        assert_eq!(normalize_amount("1.5 lakh"), Some(150_000.0));
        assert_eq!(normalize_amount("3 lacs"), Some(300_000.0));
        assert_eq!(normalize_amount("50 thousand rupees"), Some(50_000.0));
        assert_eq!(normalize_amount("20 hazaar"), Some(20_000.0));
        assert_eq!(normalize_amount("2 cr"), Some(20_000_000.0));
        assert_eq!(normalize_amount("5 लाख"), Some(500_000.0));
    }

    #[test]
    fn test_plain_and_grouped_numbers() {
        assert_eq!(normalize_amount("1,00,000"), Some(100_000.0));
        assert_eq!(normalize_amount("250,000"), Some(250_000.0));
        assert_eq!(normalize_amount("75000"), Some(75_000.0));
        assert_eq!(normalize_amount("₹50,000"), Some(50_000.0));
        assert_eq!(normalize_amount("Rs. 12000"), Some(12_000.0));
        assert_eq!(normalize_amount("INR 5 lakh"), Some(500_000.0));
    }

    #[test]
    fn test_no_number_is_absent() {
        assert_eq!(normalize_amount("a lavish budget"), None);
        assert_eq!(normalize_amount(""), None);
        assert_eq!(normalize_amount("lakh"), None);
    }

    #[test]
    fn test_ranges_lower_bound() {
        assert_eq!(normalize_amount("50k-1 lakh"), Some(50_000.0));
        assert_eq!(normalize_amount("1-2 lakh"), Some(100_000.0));
        assert_eq!(normalize_amount("2 to 3 lakh"), Some(200_000.0));
        assert_eq!(normalize_amount("between 4 and 5 lakh"), Some(400_000.0));
        assert_eq!(normalize_amount("1 lakh – 80k"), Some(80_000.0));
    }

    #[test]
    fn test_ranges_midpoint() {
        let normalizer = AmountNormalizer::new(RangePolicy::Midpoint);
        assert_eq!(normalizer.normalize_amount("1-2 lakh"), Some(150_000.0));
        assert_eq!(normalizer.normalize_amount("50k to 1 lakh"), Some(75_000.0));
    }

    #[test]
    fn test_ranges_with_full_lower_amount() {
        assert_eq!(normalize_amount("50000 to 1 lakh"), Some(50_000.0));
        assert_eq!(normalize_amount("80,000 - 1.5 lakh"), Some(80_000.0));
        assert_eq!(normalize_amount("₹75,000 to 2 lakh"), Some(75_000.0));
        assert_eq!(normalize_amount("30 to 50k"), Some(30_000.0));

        let midpoint = AmountNormalizer::new(RangePolicy::Midpoint);
        assert_eq!(midpoint.normalize_amount("50000 to 1 lakh"), Some(75_000.0));
        assert_eq!(midpoint.normalize_amount("80,000 - 1.5 lakh"), Some(115_000.0));
    }

    #[test]
    fn test_range_bounds_with_mixed_magnitudes() {
        let normalizer = AmountNormalizer::default();

        let mentions = normalizer.scan("50000 to 1 lakh");
        assert_eq!(mentions.len(), 1);
        assert!(mentions[0].is_range);
        assert_eq!((mentions[0].low, mentions[0].high), (50_000.0, 100_000.0));

        let mentions = normalizer.scan("between 1 lakh and 1.5 lakh");
        assert_eq!((mentions[0].low, mentions[0].high), (100_000.0, 150_000.0));

        let mentions = normalizer.scan("2-3 crore");
        assert_eq!((mentions[0].low, mentions[0].high), (20_000_000.0, 30_000_000.0));

        let mentions = normalizer.scan("900 to 2k");
        assert_eq!((mentions[0].low, mentions[0].high), (900.0, 2_000.0));
    }

    #[test]
    fn test_scan_spans_and_flags() {
        let text = "budget ₹2 lakh for 150 guests";
        let mentions = AmountNormalizer::default().scan(text);
        assert_eq!(mentions.len(), 2);

        let budget = &mentions[0];
        assert_eq!(budget.value, 200_000.0);
        assert!(budget.has_currency);
        assert!(budget.has_magnitude);
        assert_eq!(&text[budget.start..budget.end], "₹2 lakh");

        let guests = &mentions[1];
        assert_eq!(guests.value, 150.0);
        assert!(!guests.has_magnitude);
        assert_eq!(&text[guests.start..guests.end], "150");
    }

    #[test]
    fn test_scan_and_without_between_is_two_numbers() {
        let mentions = AmountNormalizer::default().scan("200 and 50k");
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].value, 200.0);
        assert!(!mentions[0].is_range);
        assert_eq!(mentions[1].value, 50_000.0);
        assert!(mentions[1].has_magnitude);
    }

    #[test]
    fn test_scan_skips_glued_and_mobile_numbers() {
        let normalizer = AmountNormalizer::default();
        assert!(normalizer.scan("on the 2nd at 10am").is_empty());
        assert!(normalizer.scan("call me on 9876543210").is_empty());
        assert_eq!(normalizer.scan("room A4 for 30").len(), 1);
    }

    #[test]
    fn test_prefers_marked_amount() {
        assert_eq!(normalize_amount("200 guests and 3 lakh"), Some(300_000.0));
    }
}
