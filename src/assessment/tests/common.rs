use std::collections::BTreeMap;

use serde_json::Value;

use crate::assessment::domain::{
    CourseType, ExamType, FatalScope, FederalState, RulesConfig, Semester, Subject,
    UserInputProfile,
};

pub(super) fn grades(values: [u8; 4]) -> BTreeMap<Semester, u8> {
    Semester::ALL.into_iter().zip(values).collect()
}

pub(super) fn subject(id: &str, name: &str, course_type: CourseType, values: [u8; 4]) -> Subject {
    Subject {
        id: id.to_string(),
        name: name.to_string(),
        course_type,
        is_mandatory: false,
        is_belegpflichtig: false,
        semester_grades: grades(values),
        final_exam_grade: None,
        confidence: None,
        stress_factors: Default::default(),
        is_exam_subject: false,
        exam_type: ExamType::None,
    }
}

pub(super) fn exam_subject(
    id: &str,
    name: &str,
    course_type: CourseType,
    values: [u8; 4],
    exam_type: ExamType,
    final_grade: u8,
) -> Subject {
    let mut subject = subject(id, name, course_type, values);
    subject.is_exam_subject = true;
    subject.exam_type = exam_type;
    subject.final_exam_grade = Some(final_grade);
    subject
}

/// Valid Nordrhein-Westfalen profile: 2 LK, 4 exam subjects across written
/// and oral exams, one plain enrollment subject. 461 projected points, no
/// deficits.
pub(super) fn nw_profile() -> UserInputProfile {
    let mut deutsch = exam_subject(
        "de",
        "Deutsch",
        CourseType::Leistungskurs,
        [11, 12, 10, 12],
        ExamType::Written,
        11,
    );
    deutsch.is_mandatory = true;
    deutsch.is_belegpflichtig = true;

    let mut mathematik = exam_subject(
        "ma",
        "Mathematik",
        CourseType::Leistungskurs,
        [9, 10, 11, 10],
        ExamType::Written,
        10,
    );
    mathematik.is_mandatory = true;
    mathematik.is_belegpflichtig = true;

    UserInputProfile {
        federal_state: FederalState::NordrheinWestfalen,
        graduation_year: 2026,
        subjects: vec![
            deutsch,
            mathematik,
            exam_subject(
                "en",
                "Englisch",
                CourseType::Grundkurs,
                [12, 11, 12, 13],
                ExamType::Written,
                12,
            ),
            exam_subject(
                "ge",
                "Geschichte",
                CourseType::Grundkurs,
                [8, 9, 8, 10],
                ExamType::Oral,
                9,
            ),
            subject("bi", "Biologie", CourseType::Grundkurs, [10, 10, 9, 11]),
        ],
        rules_config: None,
    }
}

/// Valid Bayern profile: 2 LK and the five-subject exam block.
pub(super) fn bayern_profile() -> UserInputProfile {
    let mut profile = nw_profile();
    profile.federal_state = FederalState::Bayern;
    profile.subjects.push(exam_subject(
        "ph",
        "Physik",
        CourseType::Grundkurs,
        [9, 10, 9, 11],
        ExamType::Colloquium,
        10,
    ));
    profile
}

pub(super) fn custom_rules() -> RulesConfig {
    RulesConfig {
        lk_weight: 2,
        gk_weight: 1,
        deficit_threshold: 4,
        max_deficits: 2,
        min_total_points: 100,
        zero_is_fatal: true,
        fatal_scope: FatalScope::AllCourses,
        exam_weight: 4,
        near_miss_margin: 20,
    }
}

/// Minimal custom-jurisdiction profile: one non-exam subject plus an
/// explicit rules config.
pub(super) fn custom_profile() -> UserInputProfile {
    UserInputProfile {
        federal_state: FederalState::Custom,
        graduation_year: 2027,
        subjects: vec![subject(
            "ku",
            "Kunst",
            CourseType::Grundkurs,
            [12, 13, 12, 14],
        )],
        rules_config: Some(custom_rules()),
    }
}

pub(super) fn to_value(profile: &UserInputProfile) -> Value {
    serde_json::to_value(profile).expect("profile serializes")
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
