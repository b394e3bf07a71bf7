use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// The four qualification-phase semesters every subject must be graded in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Semester {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Semester {
    pub const ALL: [Semester; 4] = [Semester::Q1, Semester::Q2, Semester::Q3, Semester::Q4];

    pub const fn label(self) -> &'static str {
        match self {
            Semester::Q1 => "q1",
            Semester::Q2 => "q2",
            Semester::Q3 => "q3",
            Semester::Q4 => "q4",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Course intensity level a subject is taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    Leistungskurs,
    Grundkurs,
}

/// How a subject is examined, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    #[default]
    None,
    Written,
    Oral,
    Colloquium,
}

impl ExamType {
    pub const fn label(self) -> &'static str {
        match self {
            ExamType::None => "none",
            ExamType::Written => "written",
            ExamType::Oral => "oral",
            ExamType::Colloquium => "colloquium",
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Jurisdiction whose enrollment and scoring rules govern the profile.
///
/// The two fixed states carry hidden built-in rule sets; `Custom` profiles
/// must ship their own [`RulesConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FederalState {
    NordrheinWestfalen,
    Bayern,
    Custom,
}

impl fmt::Display for FederalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FederalState::NordrheinWestfalen => "Nordrhein-Westfalen",
            FederalState::Bayern => "Bayern",
            FederalState::Custom => "custom",
        };
        f.write_str(label)
    }
}

/// A declared subject with its per-semester grades and exam role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub course_type: CourseType,
    #[serde(default)]
    pub is_mandatory: bool,
    #[serde(default)]
    pub is_belegpflichtig: bool,
    pub semester_grades: BTreeMap<Semester, u8>,
    #[serde(default)]
    pub final_exam_grade: Option<u8>,
    #[serde(default)]
    pub confidence: Option<u8>,
    #[serde(default)]
    pub stress_factors: BTreeSet<String>,
    #[serde(default)]
    pub is_exam_subject: bool,
    #[serde(default)]
    pub exam_type: ExamType,
}

impl Subject {
    /// True if any of the four semester grades is a flat zero.
    pub fn has_zero_semester(&self) -> bool {
        self.semester_grades.values().any(|grade| *grade == 0)
    }
}

/// Which grades a fatal zero rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalScope {
    None,
    ExamOnly,
    AllCourses,
}

/// Effective scoring and qualification rules for one jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Multiplier applied to every Leistungskurs semester grade.
    pub lk_weight: u32,
    /// Multiplier applied to every Grundkurs semester grade.
    pub gk_weight: u32,
    /// A semester grade at or below this value counts as a deficit.
    pub deficit_threshold: u8,
    /// Ceiling on the profile-wide deficit count.
    pub max_deficits: u32,
    /// Qualifying floor for the projected point total.
    pub min_total_points: u32,
    pub zero_is_fatal: bool,
    pub fatal_scope: FatalScope,
    /// Multiplier applied to a final exam grade relative to a semester
    /// grade. The real qualification block weighs exam results fourfold.
    #[serde(default = "default_exam_weight")]
    pub exam_weight: u32,
    /// Totals within this many points above `min_total_points` still raise
    /// a medium-severity near-miss warning.
    #[serde(default = "default_near_miss_margin")]
    pub near_miss_margin: u32,
}

impl RulesConfig {
    pub const DEFAULT_EXAM_WEIGHT: u32 = 4;
    pub const DEFAULT_NEAR_MISS_MARGIN: u32 = 30;
}

fn default_exam_weight() -> u32 {
    RulesConfig::DEFAULT_EXAM_WEIGHT
}

fn default_near_miss_margin() -> u32 {
    RulesConfig::DEFAULT_NEAR_MISS_MARGIN
}

/// The validated student profile the whole pipeline operates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInputProfile {
    pub federal_state: FederalState,
    pub graduation_year: u16,
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub rules_config: Option<RulesConfig>,
}

/// Risk level attached to a finding; ordered so `max` picks the worst.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifies which trap check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapKind {
    MandatoryCoverage,
    DeficitCeiling,
    PointsFloor,
    FatalZero,
    EnrollmentGap,
    PointsBuffer,
    MandatorySolid,
    DeficitFree,
}

/// One explainable finding emitted by a trap check.
///
/// `message` is fallback text; `message_key` and `message_args` are opaque
/// to the engine and resolved by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFinding {
    pub trap: TrapKind,
    pub severity: Severity,
    pub message: String,
    pub message_key: String,
    pub message_args: BTreeMap<String, String>,
    pub affected_subject_ids: Vec<String>,
}

/// Per-subject contribution to the projected total, kept for transparent
/// audits of the arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub subject_id: String,
    pub course_points: u32,
    pub exam_points: u32,
    pub deficits: u32,
}

/// Profile-wide aggregates produced by the scoring calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreStats {
    pub total_projected_points: u32,
    pub total_deficits: u32,
    pub subject_scores: Vec<SubjectScore>,
}

/// Final assessment output, recomputed from scratch on every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskReport {
    pub federal_state: FederalState,
    pub overall_severity: Severity,
    pub stats: ScoreStats,
    pub findings: Vec<RiskFinding>,
}
