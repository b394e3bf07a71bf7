//! Trap detection.
//!
//! Traps are structural or regulatory risks that can disqualify a student
//! even when the raw arithmetic passes. Each check is a pure function over
//! (profile, rules, stats) producing at most one finding; checks never
//! read each other's output. The registry is a `const` slice, so it is
//! populated for process lifetime and its order only affects presentation
//! order of the findings.

use std::collections::BTreeMap;

use super::domain::{
    FatalScope, RiskFinding, RulesConfig, ScoreStats, Severity, TrapKind, UserInputProfile,
};
use super::rules;

pub type TrapCheck = fn(&UserInputProfile, &RulesConfig, &ScoreStats) -> Option<RiskFinding>;

pub(crate) const TRAP_CHECKS: &[TrapCheck] = &[
    mandatory_coverage,
    deficit_ceiling,
    points_floor,
    fatal_zero,
    enrollment_gap,
    points_buffer,
    mandatory_solid,
    deficit_free,
];

/// Run every registered check in order and collect the findings.
pub fn detect(
    profile: &UserInputProfile,
    rules: &RulesConfig,
    stats: &ScoreStats,
) -> Vec<RiskFinding> {
    TRAP_CHECKS
        .iter()
        .filter_map(|check| check(profile, rules, stats))
        .collect()
}

fn args<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn covers_subject(profile: &UserInputProfile, name: &str) -> bool {
    profile
        .subjects
        .iter()
        .any(|subject| subject.name.trim().eq_ignore_ascii_case(name))
}

/// A jurisdiction-mandated subject is missing from the profile entirely.
fn mandatory_coverage(
    profile: &UserInputProfile,
    _rules: &RulesConfig,
    _stats: &ScoreStats,
) -> Option<RiskFinding> {
    let missing: Vec<&str> = rules::mandatory_subjects(profile.federal_state)
        .iter()
        .filter(|name| !covers_subject(profile, name))
        .copied()
        .collect();

    if missing.is_empty() {
        return None;
    }

    let listed = missing.join(", ");
    Some(RiskFinding {
        trap: TrapKind::MandatoryCoverage,
        severity: Severity::High,
        message: format!("mandatory subject(s) missing from the profile: {listed}"),
        message_key: "risk.mandatory_coverage".to_string(),
        message_args: args([("missing", listed)]),
        affected_subject_ids: Vec::new(),
    })
}

fn deficit_ceiling(
    _profile: &UserInputProfile,
    rules: &RulesConfig,
    stats: &ScoreStats,
) -> Option<RiskFinding> {
    if stats.total_deficits <= rules.max_deficits {
        return None;
    }

    let affected: Vec<String> = stats
        .subject_scores
        .iter()
        .filter(|score| score.deficits > 0)
        .map(|score| score.subject_id.clone())
        .collect();

    Some(RiskFinding {
        trap: TrapKind::DeficitCeiling,
        severity: Severity::High,
        message: format!(
            "{} deficit semester(s) exceed the allowed maximum of {}",
            stats.total_deficits, rules.max_deficits
        ),
        message_key: "risk.deficit_ceiling".to_string(),
        message_args: args([
            ("count", stats.total_deficits.to_string()),
            ("max", rules.max_deficits.to_string()),
        ]),
        affected_subject_ids: affected,
    })
}

/// Below the qualifying floor, or close enough above it to warrant a
/// near-miss warning.
fn points_floor(
    _profile: &UserInputProfile,
    rules: &RulesConfig,
    stats: &ScoreStats,
) -> Option<RiskFinding> {
    let total = stats.total_projected_points;
    let floor = rules.min_total_points;

    if total < floor {
        return Some(RiskFinding {
            trap: TrapKind::PointsFloor,
            severity: Severity::High,
            message: format!("projected total {total} is below the qualifying minimum {floor}"),
            message_key: "risk.points_floor".to_string(),
            message_args: args([
                ("total", total.to_string()),
                ("minimum", floor.to_string()),
            ]),
            affected_subject_ids: Vec::new(),
        });
    }

    if total < floor + rules.near_miss_margin {
        return Some(RiskFinding {
            trap: TrapKind::PointsFloor,
            severity: Severity::Medium,
            message: format!(
                "projected total {total} is within {} points of the qualifying minimum {floor}",
                rules.near_miss_margin
            ),
            message_key: "risk.points_floor_near_miss".to_string(),
            message_args: args([
                ("total", total.to_string()),
                ("minimum", floor.to_string()),
                ("margin", rules.near_miss_margin.to_string()),
            ]),
            affected_subject_ids: Vec::new(),
        });
    }

    None
}

/// A single zero grade inside the fatal scope voids the qualification no
/// matter how large the projected surplus is.
fn fatal_zero(
    profile: &UserInputProfile,
    rules: &RulesConfig,
    _stats: &ScoreStats,
) -> Option<RiskFinding> {
    if !rules.zero_is_fatal || rules.fatal_scope == FatalScope::None {
        return None;
    }

    let affected: Vec<String> = profile
        .subjects
        .iter()
        .filter(|subject| match rules.fatal_scope {
            FatalScope::None => false,
            FatalScope::ExamOnly => {
                subject.is_exam_subject
                    && (subject.has_zero_semester() || subject.final_exam_grade == Some(0))
            }
            FatalScope::AllCourses => {
                subject.has_zero_semester() || subject.final_exam_grade == Some(0)
            }
        })
        .map(|subject| subject.id.clone())
        .collect();

    if affected.is_empty() {
        return None;
    }

    Some(RiskFinding {
        trap: TrapKind::FatalZero,
        severity: Severity::High,
        message:
            "a 0-point grade voids the qualification regardless of the projected total"
                .to_string(),
        message_key: "risk.fatal_zero".to_string(),
        message_args: args([("subjects", affected.join(", "))]),
        affected_subject_ids: affected,
    })
}

/// A must-enroll subject with a 0-point semester counts as never attended,
/// which breaks the enrollment obligation independently of the fatal-zero
/// rule.
fn enrollment_gap(
    profile: &UserInputProfile,
    _rules: &RulesConfig,
    _stats: &ScoreStats,
) -> Option<RiskFinding> {
    let affected: Vec<String> = profile
        .subjects
        .iter()
        .filter(|subject| subject.is_belegpflichtig && subject.has_zero_semester())
        .map(|subject| subject.id.clone())
        .collect();

    if affected.is_empty() {
        return None;
    }

    Some(RiskFinding {
        trap: TrapKind::EnrollmentGap,
        severity: Severity::Medium,
        message: format!(
            "must-enroll subject(s) with a 0-point semester count as never attended: {}",
            affected.join(", ")
        ),
        message_key: "risk.enrollment_gap".to_string(),
        message_args: args([("subjects", affected.join(", "))]),
        affected_subject_ids: affected,
    })
}

/// Positive signal: the projected total clears the floor by at least the
/// near-miss margin.
fn points_buffer(
    _profile: &UserInputProfile,
    rules: &RulesConfig,
    stats: &ScoreStats,
) -> Option<RiskFinding> {
    let total = stats.total_projected_points;
    let comfortable = rules.min_total_points + rules.near_miss_margin;
    if total < comfortable {
        return None;
    }

    let surplus = total - rules.min_total_points;
    Some(RiskFinding {
        trap: TrapKind::PointsBuffer,
        severity: Severity::Low,
        message: format!(
            "projected total {total} clears the qualifying minimum by {surplus} points"
        ),
        message_key: "risk.points_buffer".to_string(),
        message_args: args([
            ("total", total.to_string()),
            ("surplus", surplus.to_string()),
        ]),
        affected_subject_ids: Vec::new(),
    })
}

/// Positive signal: every subject flagged mandatory stayed above the
/// deficit threshold in all four semesters.
fn mandatory_solid(
    profile: &UserInputProfile,
    rules: &RulesConfig,
    _stats: &ScoreStats,
) -> Option<RiskFinding> {
    let mandatory: Vec<&super::domain::Subject> = profile
        .subjects
        .iter()
        .filter(|subject| subject.is_mandatory)
        .collect();

    if mandatory.is_empty() {
        return None;
    }

    let solid = mandatory.iter().all(|subject| {
        subject
            .semester_grades
            .values()
            .all(|grade| *grade > rules.deficit_threshold)
    });
    if !solid {
        return None;
    }

    let affected: Vec<String> = mandatory
        .iter()
        .map(|subject| subject.id.clone())
        .collect();

    Some(RiskFinding {
        trap: TrapKind::MandatorySolid,
        severity: Severity::Low,
        message: "all mandatory subjects are above the deficit threshold".to_string(),
        message_key: "risk.mandatory_solid".to_string(),
        message_args: args([("subjects", affected.join(", "))]),
        affected_subject_ids: affected,
    })
}

/// Positive signal: no deficit semesters anywhere in the profile.
fn deficit_free(
    _profile: &UserInputProfile,
    _rules: &RulesConfig,
    stats: &ScoreStats,
) -> Option<RiskFinding> {
    if stats.total_deficits != 0 {
        return None;
    }

    Some(RiskFinding {
        trap: TrapKind::DeficitFree,
        severity: Severity::Low,
        message: "no deficit semesters recorded".to_string(),
        message_key: "risk.deficit_free".to_string(),
        message_args: BTreeMap::new(),
        affected_subject_ids: Vec::new(),
    })
}
