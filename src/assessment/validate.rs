//! Profile validation.
//!
//! The validator is the only component that ever sees raw input. It turns
//! an untyped JSON value into a [`UserInputProfile`] or a *complete* list
//! of path-addressed violations; checks never short-circuit on the first
//! failure, so one call surfaces every problem at once. Downstream stages
//! are entitled to assume a validated profile and do not re-defend.

use std::fmt;

use super::domain::{ExamType, FederalState, RulesConfig, Semester, Subject, UserInputProfile};

const MIN_GRADUATION_YEAR: u16 = 2000;
const MAX_GRADUATION_YEAR: u16 = 2100;
const MAX_GRADE: u8 = 15;
const MAX_CONFIDENCE: u8 = 10;

// Ceilings keep scoring arithmetic inside u32: the largest reachable
// total is MAX_SUBJECTS * (4 semesters + 1 exam) * MAX_GRADE * MAX_RULE_WEIGHT.
const MAX_SUBJECTS: usize = 64;
const MAX_RULE_WEIGHT: u32 = 100;
const MAX_RULE_POINTS: u32 = 100_000;

/// Structural invariant a raw profile can break.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViolationKind {
    #[error("input is not a well-formed profile: {detail}")]
    Malformed { detail: String },
    #[error("at least one subject is required")]
    NoSubjects,
    #[error("duplicate subject id '{id}'")]
    DuplicateSubjectId { id: String },
    #[error("graduation year {year} is outside the supported range {min}-{max}")]
    GraduationYearOutOfRange { year: u16, min: u16, max: u16 },
    #[error("missing grade for semester {semester}")]
    MissingSemesterGrade { semester: Semester },
    #[error("grade for semester {semester} must be between 0 and 15, found {grade}")]
    GradeOutOfRange { semester: Semester, grade: u8 },
    #[error("confidence must be between 0 and 10, found {confidence}")]
    ConfidenceOutOfRange { confidence: u8 },
    #[error("final exam grade must be between 0 and 15, found {grade}")]
    ExamGradeOutOfRange { grade: u8 },
    #[error("exam subject is missing its final exam grade")]
    MissingExamGrade,
    #[error("final exam grade is only allowed on exam subjects")]
    UnexpectedExamGrade,
    #[error("non-exam subject must use exam type \"none\", found \"{found}\"")]
    UnexpectedExamType { found: ExamType },
    #[error("exam subject must not use exam type \"none\"")]
    MissingExamType,
    #[error("{state} requires exactly {expected} LK subjects, found {found}")]
    AdvancedCourseCount {
        state: FederalState,
        expected: usize,
        found: usize,
    },
    #[error("{state} requires exactly {expected} exam subjects, found {found}")]
    ExamSubjectCount {
        state: FederalState,
        expected: usize,
        found: usize,
    },
    #[error("the custom jurisdiction requires a rules_config")]
    MissingRulesConfig,
    #[error("{field} must be positive")]
    NonPositiveRuleValue { field: &'static str },
    #[error("{field} must not exceed {max}, found {found}")]
    RuleValueTooLarge {
        field: &'static str,
        max: u32,
        found: u32,
    },
    #[error("at most {max} subjects are supported, found {found}")]
    TooManySubjects { max: usize, found: usize },
    #[error("deficit_threshold must not exceed 15, found {found}")]
    DeficitThresholdOutOfRange { found: u8 },
}

/// A single violation, addressed by the JSON path it was found at.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub path: String,
    pub kind: ViolationKind,
}

impl Violation {
    fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// Complete set of violations found in one validation pass.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("profile failed validation with {} violation(s)", .violations.len())]
pub struct ValidationErrors {
    pub violations: Vec<Violation>,
}

impl ValidationErrors {
    /// A failure caused by input that never deserialized into a profile.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation::new(
                "$",
                ViolationKind::Malformed {
                    detail: detail.into(),
                },
            )],
        }
    }

    /// True if any violation's fallback message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.to_string().contains(needle))
    }
}

/// Validate a raw, untyped value into a profile.
///
/// Malformed input is an expected condition and maps to a single
/// `Malformed` violation; it never panics.
pub fn validate(raw: serde_json::Value) -> Result<UserInputProfile, ValidationErrors> {
    let profile: UserInputProfile =
        serde_json::from_value(raw).map_err(|err| ValidationErrors::malformed(err.to_string()))?;

    let violations = check_profile(&profile);
    if violations.is_empty() {
        Ok(profile)
    } else {
        Err(ValidationErrors { violations })
    }
}

fn check_profile(profile: &UserInputProfile) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !(MIN_GRADUATION_YEAR..=MAX_GRADUATION_YEAR).contains(&profile.graduation_year) {
        violations.push(Violation::new(
            "graduation_year",
            ViolationKind::GraduationYearOutOfRange {
                year: profile.graduation_year,
                min: MIN_GRADUATION_YEAR,
                max: MAX_GRADUATION_YEAR,
            },
        ));
    }

    check_subjects(profile, &mut violations);
    check_jurisdiction(profile, &mut violations);

    violations
}

fn check_subjects(profile: &UserInputProfile, violations: &mut Vec<Violation>) {
    if profile.subjects.is_empty() {
        violations.push(Violation::new("subjects", ViolationKind::NoSubjects));
        return;
    }

    if profile.subjects.len() > MAX_SUBJECTS {
        violations.push(Violation::new(
            "subjects",
            ViolationKind::TooManySubjects {
                max: MAX_SUBJECTS,
                found: profile.subjects.len(),
            },
        ));
    }

    for (index, subject) in profile.subjects.iter().enumerate() {
        let duplicated = profile.subjects[..index]
            .iter()
            .any(|earlier| earlier.id == subject.id);
        if duplicated {
            violations.push(Violation::new(
                format!("subjects[{index}].id"),
                ViolationKind::DuplicateSubjectId {
                    id: subject.id.clone(),
                },
            ));
        }

        check_subject(index, subject, violations);
    }
}

fn check_subject(index: usize, subject: &Subject, violations: &mut Vec<Violation>) {
    for semester in Semester::ALL {
        match subject.semester_grades.get(&semester) {
            None => violations.push(Violation::new(
                format!("subjects[{index}].semester_grades"),
                ViolationKind::MissingSemesterGrade { semester },
            )),
            Some(grade) if *grade > MAX_GRADE => violations.push(Violation::new(
                format!("subjects[{index}].semester_grades.{semester}"),
                ViolationKind::GradeOutOfRange {
                    semester,
                    grade: *grade,
                },
            )),
            Some(_) => {}
        }
    }

    if let Some(confidence) = subject.confidence {
        if confidence > MAX_CONFIDENCE {
            violations.push(Violation::new(
                format!("subjects[{index}].confidence"),
                ViolationKind::ConfidenceOutOfRange { confidence },
            ));
        }
    }

    if subject.is_exam_subject {
        match subject.final_exam_grade {
            None => violations.push(Violation::new(
                format!("subjects[{index}].final_exam_grade"),
                ViolationKind::MissingExamGrade,
            )),
            Some(grade) if grade > MAX_GRADE => violations.push(Violation::new(
                format!("subjects[{index}].final_exam_grade"),
                ViolationKind::ExamGradeOutOfRange { grade },
            )),
            Some(_) => {}
        }

        if subject.exam_type == ExamType::None {
            violations.push(Violation::new(
                format!("subjects[{index}].exam_type"),
                ViolationKind::MissingExamType,
            ));
        }
    } else {
        if subject.final_exam_grade.is_some() {
            violations.push(Violation::new(
                format!("subjects[{index}].final_exam_grade"),
                ViolationKind::UnexpectedExamGrade,
            ));
        }

        if subject.exam_type != ExamType::None {
            violations.push(Violation::new(
                format!("subjects[{index}].exam_type"),
                ViolationKind::UnexpectedExamType {
                    found: subject.exam_type,
                },
            ));
        }
    }
}

fn check_jurisdiction(profile: &UserInputProfile, violations: &mut Vec<Violation>) {
    match profile.federal_state {
        FederalState::NordrheinWestfalen => {
            check_cardinalities(profile, 2, 4, violations);
        }
        FederalState::Bayern => {
            check_cardinalities(profile, 2, 5, violations);
        }
        FederalState::Custom => match &profile.rules_config {
            None => violations.push(Violation::new(
                "rules_config",
                ViolationKind::MissingRulesConfig,
            )),
            Some(config) => check_rules_config(config, violations),
        },
    }
}

fn check_cardinalities(
    profile: &UserInputProfile,
    expected_lk: usize,
    expected_exams: usize,
    violations: &mut Vec<Violation>,
) {
    use super::domain::CourseType;

    let lk_count = profile
        .subjects
        .iter()
        .filter(|subject| subject.course_type == CourseType::Leistungskurs)
        .count();
    if lk_count != expected_lk {
        violations.push(Violation::new(
            "subjects",
            ViolationKind::AdvancedCourseCount {
                state: profile.federal_state,
                expected: expected_lk,
                found: lk_count,
            },
        ));
    }

    let exam_count = profile
        .subjects
        .iter()
        .filter(|subject| subject.is_exam_subject)
        .count();
    if exam_count != expected_exams {
        violations.push(Violation::new(
            "subjects",
            ViolationKind::ExamSubjectCount {
                state: profile.federal_state,
                expected: expected_exams,
                found: exam_count,
            },
        ));
    }

    // A rules_config supplied alongside a fixed jurisdiction is ignored;
    // the resolver always hands out the built-in.
}

fn check_rules_config(config: &RulesConfig, violations: &mut Vec<Violation>) {
    if config.lk_weight == 0 {
        violations.push(Violation::new(
            "rules_config.lk_weight",
            ViolationKind::NonPositiveRuleValue { field: "lk_weight" },
        ));
    }
    if config.gk_weight == 0 {
        violations.push(Violation::new(
            "rules_config.gk_weight",
            ViolationKind::NonPositiveRuleValue { field: "gk_weight" },
        ));
    }
    if config.exam_weight == 0 {
        violations.push(Violation::new(
            "rules_config.exam_weight",
            ViolationKind::NonPositiveRuleValue {
                field: "exam_weight",
            },
        ));
    }
    if config.min_total_points == 0 {
        violations.push(Violation::new(
            "rules_config.min_total_points",
            ViolationKind::NonPositiveRuleValue {
                field: "min_total_points",
            },
        ));
    }
    if config.deficit_threshold > MAX_GRADE {
        violations.push(Violation::new(
            "rules_config.deficit_threshold",
            ViolationKind::DeficitThresholdOutOfRange {
                found: config.deficit_threshold,
            },
        ));
    }

    check_rule_ceiling("lk_weight", config.lk_weight, MAX_RULE_WEIGHT, violations);
    check_rule_ceiling("gk_weight", config.gk_weight, MAX_RULE_WEIGHT, violations);
    check_rule_ceiling(
        "exam_weight",
        config.exam_weight,
        MAX_RULE_WEIGHT,
        violations,
    );
    check_rule_ceiling(
        "min_total_points",
        config.min_total_points,
        MAX_RULE_POINTS,
        violations,
    );
    check_rule_ceiling(
        "near_miss_margin",
        config.near_miss_margin,
        MAX_RULE_POINTS,
        violations,
    );
}

fn check_rule_ceiling(
    field: &'static str,
    value: u32,
    max: u32,
    violations: &mut Vec<Violation>,
) {
    if value > max {
        violations.push(Violation::new(
            format!("rules_config.{field}"),
            ViolationKind::RuleValueTooLarge {
                field,
                max,
                found: value,
            },
        ));
    }
}
