use super::common::*;
use crate::assessment::domain::{CourseType, ExamType, FederalState, Semester};
use crate::assessment::validate::{validate, ViolationKind};

#[test]
fn nw_profile_with_two_lk_and_four_exams_validates() {
    let profile = validate(to_value(&nw_profile())).expect("profile is valid");
    assert_eq!(profile.federal_state, FederalState::NordrheinWestfalen);
    assert_eq!(profile.subjects.len(), 5);
}

#[test]
fn nw_profile_with_three_lk_fails_with_lk_message() {
    let mut profile = nw_profile();
    profile.subjects[2].course_type = CourseType::Leistungskurs;

    let errors = validate(to_value(&profile)).expect_err("three LK must fail");
    assert!(errors.mentions("2 LK"), "expected '2 LK' in {errors:?}");
    assert!(errors.violations.iter().any(|violation| matches!(
        violation.kind,
        ViolationKind::AdvancedCourseCount {
            expected: 2,
            found: 3,
            ..
        }
    )));
}

#[test]
fn nw_profile_with_wrong_exam_count_fails() {
    let mut profile = nw_profile();
    profile.subjects[3].is_exam_subject = false;
    profile.subjects[3].exam_type = ExamType::None;
    profile.subjects[3].final_exam_grade = None;

    let errors = validate(to_value(&profile)).expect_err("three exams must fail");
    assert!(errors.violations.iter().any(|violation| matches!(
        violation.kind,
        ViolationKind::ExamSubjectCount {
            expected: 4,
            found: 3,
            ..
        }
    )));
}

#[test]
fn bayern_profile_requires_five_exam_subjects() {
    assert!(validate(to_value(&bayern_profile())).is_ok());

    let mut profile = bayern_profile();
    profile.subjects.pop();
    let errors = validate(to_value(&profile)).expect_err("four exams must fail for Bayern");
    assert!(errors.violations.iter().any(|violation| matches!(
        violation.kind,
        ViolationKind::ExamSubjectCount { expected: 5, .. }
    )));
}

#[test]
fn custom_profile_without_rules_config_fails() {
    let mut profile = custom_profile();
    profile.rules_config = None;

    let errors = validate(to_value(&profile)).expect_err("missing rules config must fail");
    assert_eq!(errors.violations.len(), 1);
    assert_eq!(errors.violations[0].path, "rules_config");
    assert!(matches!(
        errors.violations[0].kind,
        ViolationKind::MissingRulesConfig
    ));
}

#[test]
fn custom_profile_with_complete_config_validates() {
    let profile = validate(to_value(&custom_profile())).expect("custom profile is valid");
    assert!(profile.rules_config.is_some());
}

#[test]
fn custom_profile_with_zero_weight_fails() {
    let mut profile = custom_profile();
    profile
        .rules_config
        .as_mut()
        .expect("config present")
        .gk_weight = 0;

    let errors = validate(to_value(&profile)).expect_err("zero weight must fail");
    assert!(errors.violations.iter().any(|violation| matches!(
        violation.kind,
        ViolationKind::NonPositiveRuleValue { field: "gk_weight" }
    )));
}

#[test]
fn custom_profile_with_oversized_weight_fails() {
    let mut profile = custom_profile();
    profile
        .rules_config
        .as_mut()
        .expect("config present")
        .lk_weight = u32::MAX / 2;

    let errors = validate(to_value(&profile)).expect_err("oversized weight must fail");
    let violation = errors
        .violations
        .iter()
        .find(|violation| violation.path == "rules_config.lk_weight")
        .expect("lk_weight violation present");
    assert!(matches!(
        violation.kind,
        ViolationKind::RuleValueTooLarge {
            field: "lk_weight",
            ..
        }
    ));
}

#[test]
fn custom_profile_with_oversized_points_floor_fails() {
    let mut profile = custom_profile();
    let config = profile.rules_config.as_mut().expect("config present");
    config.min_total_points = u32::MAX;
    config.near_miss_margin = u32::MAX;

    let errors = validate(to_value(&profile)).expect_err("oversized floor must fail");
    assert!(errors.violations.iter().any(|violation| matches!(
        violation.kind,
        ViolationKind::RuleValueTooLarge {
            field: "min_total_points",
            ..
        }
    )));
    assert!(errors.violations.iter().any(|violation| matches!(
        violation.kind,
        ViolationKind::RuleValueTooLarge {
            field: "near_miss_margin",
            ..
        }
    )));
}

#[test]
fn oversized_subject_list_is_rejected() {
    let mut profile = custom_profile();
    let template = profile.subjects[0].clone();
    for index in 0..70 {
        let mut extra = template.clone();
        extra.id = format!("extra-{index}");
        profile.subjects.push(extra);
    }

    let errors = validate(to_value(&profile)).expect_err("oversized subject list must fail");
    assert!(errors.violations.iter().any(|violation| matches!(
        violation.kind,
        ViolationKind::TooManySubjects { max: 64, .. }
    )));
}

#[test]
fn fixed_jurisdiction_ignores_supplied_rules_config() {
    let mut profile = nw_profile();
    profile.rules_config = Some(custom_rules());

    assert!(validate(to_value(&profile)).is_ok());
}

#[test]
fn non_exam_subject_with_exam_type_fails_referencing_none() {
    let mut profile = nw_profile();
    profile.subjects[4].exam_type = ExamType::Written;

    let errors = validate(to_value(&profile)).expect_err("inconsistent exam type must fail");
    let violation = errors
        .violations
        .iter()
        .find(|violation| violation.path == "subjects[4].exam_type")
        .expect("exam type violation present");
    assert!(violation.kind.to_string().contains("none"));
}

#[test]
fn exam_subject_without_exam_type_fails() {
    let mut profile = nw_profile();
    profile.subjects[0].exam_type = ExamType::None;

    let errors = validate(to_value(&profile)).expect_err("missing exam type must fail");
    assert!(errors
        .violations
        .iter()
        .any(|violation| matches!(violation.kind, ViolationKind::MissingExamType)));
}

#[test]
fn exam_subject_without_final_grade_fails() {
    let mut profile = nw_profile();
    profile.subjects[1].final_exam_grade = None;

    let errors = validate(to_value(&profile)).expect_err("missing final grade must fail");
    assert!(errors
        .violations
        .iter()
        .any(|violation| matches!(violation.kind, ViolationKind::MissingExamGrade)));
}

#[test]
fn all_violations_are_collected_in_one_pass() {
    let mut profile = nw_profile();
    // Three independent problems: a duplicate id, a missing semester, and
    // an out-of-range confidence.
    profile.subjects[1].id = "de".to_string();
    profile.subjects[2].semester_grades.remove(&Semester::Q3);
    profile.subjects[3].confidence = Some(11);

    let errors = validate(to_value(&profile)).expect_err("broken profile must fail");
    assert!(errors.violations.len() >= 3, "got {errors:?}");
    assert!(errors
        .violations
        .iter()
        .any(|violation| matches!(violation.kind, ViolationKind::DuplicateSubjectId { .. })));
    assert!(errors.violations.iter().any(|violation| matches!(
        violation.kind,
        ViolationKind::MissingSemesterGrade {
            semester: Semester::Q3
        }
    )));
    assert!(errors
        .violations
        .iter()
        .any(|violation| matches!(
            violation.kind,
            ViolationKind::ConfidenceOutOfRange { confidence: 11 }
        )));
}

#[test]
fn grade_above_fifteen_is_rejected() {
    let mut profile = nw_profile();
    profile
        .subjects[0]
        .semester_grades
        .insert(Semester::Q2, 16);

    let errors = validate(to_value(&profile)).expect_err("grade 16 must fail");
    assert!(errors.violations.iter().any(|violation| matches!(
        violation.kind,
        ViolationKind::GradeOutOfRange {
            semester: Semester::Q2,
            grade: 16
        }
    )));
}

#[test]
fn graduation_year_outside_range_is_rejected() {
    let mut profile = nw_profile();
    profile.graduation_year = 1990;

    let errors = validate(to_value(&profile)).expect_err("year 1990 must fail");
    assert!(errors
        .violations
        .iter()
        .any(|violation| matches!(
            violation.kind,
            ViolationKind::GraduationYearOutOfRange { year: 1990, .. }
        )));
}

#[test]
fn empty_subject_list_is_rejected() {
    let mut profile = custom_profile();
    profile.subjects.clear();

    let errors = validate(to_value(&profile)).expect_err("empty subjects must fail");
    assert!(errors
        .violations
        .iter()
        .any(|violation| matches!(violation.kind, ViolationKind::NoSubjects)));
}

#[test]
fn malformed_value_maps_to_single_violation() {
    let errors =
        validate(serde_json::json!({ "federal_state": 42 })).expect_err("garbage must fail");
    assert_eq!(errors.violations.len(), 1);
    assert_eq!(errors.violations[0].path, "$");
    assert!(matches!(
        errors.violations[0].kind,
        ViolationKind::Malformed { .. }
    ));
}
