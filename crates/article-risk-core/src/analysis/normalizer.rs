use colored::Color;
use serde::{Deserialize, Serialize};

/// Aggro thresholds are applied to the scaled percentage.
const AGGRO_MEDIUM_PERCENT: f64 = 40.0;
const AGGRO_HIGH_PERCENT: f64 = 60.0;
const AGGRO_CRITICAL_PERCENT: f64 = 80.0;

/// Binary thresholds are applied to the raw score.
const CATEGORY_HIGH_RAW: f64 = 0.45;
const AGGREGATE_HIGH_RAW: f64 = 0.5;

/// Breakdown categories known to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Aggro,
    Mismatch,
    Crossref,
    Other(String),
}

impl Category {
    pub fn from_key(key: &str) -> Self {
        match key {
            "aggro_score" => Self::Aggro,
            "mismatch_score" => Self::Mismatch,
            "crossref_score" => Self::Crossref,
            other => Self::Other(other.to_string()),
        }
    }

    /// Display label; unknown categories fall back to their raw key.
    pub fn label(&self) -> &str {
        match self {
            Self::Aggro => "제목 과장성",
            Self::Mismatch => "제목-본문 비일관성",
            Self::Crossref => "내용 비신뢰성",
            Self::Other(key) => key,
        }
    }
}

/// Discrete risk bucket derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
    Critical,
}

/// Display attributes shared by every element coloured by tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierStyle {
    pub text_class: &'static str,
    pub background_class: &'static str,
    pub bar_class: &'static str,
    #[serde(skip)]
    pub terminal: Color,
}

impl Tier {
    pub fn style(&self) -> TierStyle {
        match self {
            Self::Low => TierStyle {
                text_class: "text-green-600",
                background_class: "bg-green-50",
                bar_class: "bg-green-500",
                terminal: Color::Green,
            },
            Self::Medium => TierStyle {
                text_class: "text-yellow-600",
                background_class: "bg-yellow-50",
                bar_class: "bg-yellow-500",
                terminal: Color::Yellow,
            },
            Self::High => TierStyle {
                text_class: "text-orange-600",
                background_class: "bg-orange-50",
                bar_class: "bg-orange-500",
                terminal: Color::BrightRed,
            },
            Self::Critical => TierStyle {
                text_class: "text-red-600",
                background_class: "bg-red-50",
                bar_class: "bg-red-500",
                terminal: Color::Red,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Display percentage and tier computed for one score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    /// `raw * 100`, clamped to `0.0..=100.0`.
    pub display_percent: f64,
    pub tier: Tier,
}

impl Classification {
    fn new(raw: f64, tier: Tier) -> Self {
        Self {
            display_percent: display_percent(raw),
            tier,
        }
    }

    /// Percentage rounded to a whole number for display.
    pub fn rounded_percent(&self) -> u32 {
        self.display_percent.round() as u32
    }
}

/// Classify a breakdown score according to its category's policy.
///
/// Never fails: scores outside `0.0..=1.0` are clamped for display only and
/// still receive a tier.
pub fn classify(category_key: &str, raw: f64) -> Classification {
    classify_category(&Category::from_key(category_key), raw)
}

pub fn classify_category(category: &Category, raw: f64) -> Classification {
    let tier = match category {
        Category::Aggro => aggro_tier(raw * 100.0),
        Category::Mismatch | Category::Crossref | Category::Other(_) => {
            binary_tier(raw, CATEGORY_HIGH_RAW)
        }
    };
    Classification::new(raw, tier)
}

/// Classify the aggregate `final_risk_score`.
pub fn classify_aggregate(raw: f64) -> Classification {
    Classification::new(raw, binary_tier(raw, AGGREGATE_HIGH_RAW))
}

fn aggro_tier(points: f64) -> Tier {
    if points < AGGRO_MEDIUM_PERCENT {
        Tier::Low
    } else if points < AGGRO_HIGH_PERCENT {
        Tier::Medium
    } else if points < AGGRO_CRITICAL_PERCENT {
        Tier::High
    } else {
        Tier::Critical
    }
}

fn binary_tier(raw: f64, high_from: f64) -> Tier {
    if raw < high_from {
        Tier::Low
    } else {
        Tier::High
    }
}

fn display_percent(raw: f64) -> f64 {
    let scaled = raw * 100.0;
    if scaled.is_nan() {
        0.0
    } else {
        scaled.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn aggro_scenario_high() {
        let classification = classify("aggro_score", 0.75);
        assert_eq!(classification.rounded_percent(), 75);
        assert_eq!(classification.tier, Tier::High);
    }

    #[test]
    fn aggro_boundaries() {
        assert_eq!(classify("aggro_score", 0.39).tier, Tier::Low);
        assert_eq!(classify("aggro_score", 0.4).tier, Tier::Medium);
        assert_eq!(classify("aggro_score", 0.6).tier, Tier::High);
        assert_eq!(classify("aggro_score", 0.8).tier, Tier::Critical);
        assert_eq!(classify("aggro_score", 1.0).tier, Tier::Critical);
    }

    #[test]
    fn mismatch_threshold_is_on_raw_score() {
        assert_eq!(classify("mismatch_score", 0.44).tier, Tier::Low);
        assert_eq!(classify("mismatch_score", 0.45).tier, Tier::High);
        assert_eq!(classify("crossref_score", 0.449).tier, Tier::Low);
        assert_eq!(classify("crossref_score", 0.9).tier, Tier::High);
    }

    #[test]
    fn unknown_category_uses_binary_rule() {
        assert_eq!(classify("novel_score", 0.2).tier, Tier::Low);
        assert_eq!(classify("novel_score", 0.45).tier, Tier::High);
        assert_eq!(Category::from_key("novel_score").label(), "novel_score");
    }

    #[test]
    fn aggregate_threshold() {
        assert_eq!(classify_aggregate(0.49).tier, Tier::Low);
        assert_eq!(classify_aggregate(0.5).tier, Tier::High);
        assert_eq!(classify_aggregate(0.2).rounded_percent(), 20);
    }

    #[test]
    fn out_of_range_scores_clamp_for_display_only() {
        let over = classify("aggro_score", 1.7);
        assert_eq!(over.display_percent, 100.0);
        assert_eq!(over.tier, Tier::Critical);

        let under = classify("mismatch_score", -0.3);
        assert_eq!(under.display_percent, 0.0);
        assert_eq!(under.tier, Tier::Low);

        let nan = classify("crossref_score", f64::NAN);
        assert_eq!(nan.display_percent, 0.0);
    }

    #[test]
    fn labels_for_known_categories() {
        assert_eq!(Category::from_key("aggro_score").label(), "제목 과장성");
        assert_eq!(Category::from_key("mismatch_score").label(), "제목-본문 비일관성");
        assert_eq!(Category::from_key("crossref_score").label(), "내용 비신뢰성");
    }

    #[test]
    fn each_tier_has_distinct_style() {
        let tiers = [Tier::Low, Tier::Medium, Tier::High, Tier::Critical];
        for (i, a) in tiers.iter().enumerate() {
            for b in &tiers[i + 1..] {
                assert_ne!(a.style().text_class, b.style().text_class);
                assert_ne!(a.style().bar_class, b.style().bar_class);
            }
        }
    }

    proptest! {
        #[test]
        fn aggro_tier_partitions_scaled_score(raw in 0.0f64..=1.0) {
            let points = raw * 100.0;
            let expected = if points < 40.0 {
                Tier::Low
            } else if points < 60.0 {
                Tier::Medium
            } else if points < 80.0 {
                Tier::High
            } else {
                Tier::Critical
            };
            prop_assert_eq!(classify("aggro_score", raw).tier, expected);
        }

        #[test]
        fn binary_categories_split_at_raw_threshold(
            raw in -2.0f64..3.0,
            key in prop_oneof![
                Just("mismatch_score".to_string()),
                Just("crossref_score".to_string()),
                "[a-z_]{1,12}".prop_filter("not aggro", |k| k != "aggro_score"),
            ],
        ) {
            let expected = if raw < 0.45 { Tier::Low } else { Tier::High };
            prop_assert_eq!(classify(&key, raw).tier, expected);
        }

        #[test]
        fn aggregate_splits_at_half(raw in 0.0f64..=1.0) {
            let expected = if raw < 0.5 { Tier::Low } else { Tier::High };
            prop_assert_eq!(classify_aggregate(raw).tier, expected);
        }

        #[test]
        fn display_percent_stays_in_range(raw in proptest::num::f64::ANY) {
            let classification = classify("aggro_score", raw);
            prop_assert!((0.0..=100.0).contains(&classification.display_percent));
        }
    }
}
