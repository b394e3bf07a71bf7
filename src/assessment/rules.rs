//! Jurisdiction rule resolution.
//!
//! The two fixed federal states map to hidden, versioned built-in rule
//! sets; custom profiles carry their own validated configuration. Nothing
//! downstream of this module knows about jurisdictions beyond the
//! [`RulesConfig`] it hands out.

use super::domain::{FatalScope, FederalState, RulesConfig, UserInputProfile};

/// A built-in jurisdiction configuration with its regulation version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinRuleSet {
    pub version: &'static str,
    pub config: RulesConfig,
}

/// Nordrhein-Westfalen, APO-GOSt as of the 2024 cohort.
const NORDRHEIN_WESTFALEN: BuiltinRuleSet = BuiltinRuleSet {
    version: "nw-2024.1",
    config: RulesConfig {
        lk_weight: 2,
        gk_weight: 1,
        deficit_threshold: 4,
        max_deficits: 7,
        min_total_points: 200,
        zero_is_fatal: true,
        fatal_scope: FatalScope::ExamOnly,
        exam_weight: 4,
        near_miss_margin: 30,
    },
};

/// Bayern, GSO as of the 2024 cohort. Stricter fatal-zero scope and a
/// tighter near-miss band than Nordrhein-Westfalen.
const BAYERN: BuiltinRuleSet = BuiltinRuleSet {
    version: "by-2024.1",
    config: RulesConfig {
        lk_weight: 2,
        gk_weight: 1,
        deficit_threshold: 4,
        max_deficits: 8,
        min_total_points: 200,
        zero_is_fatal: true,
        fatal_scope: FatalScope::AllCourses,
        exam_weight: 4,
        near_miss_margin: 24,
    },
};

const MANDATORY_SUBJECTS: &[&str] = &["deutsch", "mathematik"];

/// The built-in rule set for a fixed jurisdiction, or `None` for `Custom`.
pub fn builtin(state: FederalState) -> Option<&'static BuiltinRuleSet> {
    match state {
        FederalState::NordrheinWestfalen => Some(&NORDRHEIN_WESTFALEN),
        FederalState::Bayern => Some(&BAYERN),
        FederalState::Custom => None,
    }
}

/// Subject names (normalized lowercase) every profile of this jurisdiction
/// must cover.
pub fn mandatory_subjects(state: FederalState) -> &'static [&'static str] {
    match state {
        FederalState::NordrheinWestfalen | FederalState::Bayern => MANDATORY_SUBJECTS,
        FederalState::Custom => &[],
    }
}

/// Yield the effective rule configuration for a validated profile.
///
/// Fixed jurisdictions always use their built-in rules; a `rules_config`
/// supplied alongside one is ignored. A custom profile without a config
/// cannot survive validation, so hitting that case here is a defect.
pub fn resolve(profile: &UserInputProfile) -> RulesConfig {
    match builtin(profile.federal_state) {
        Some(builtin) => builtin.config.clone(),
        None => profile
            .rules_config
            .clone()
            .expect("validated custom profile carries a rules config"),
    }
}
