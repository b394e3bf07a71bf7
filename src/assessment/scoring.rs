//! Point projection and deficit counting.

use super::domain::{CourseType, RulesConfig, ScoreStats, SubjectScore, UserInputProfile};

/// Compute profile-wide aggregates under the given rules.
///
/// Course points are the sum over the four semesters of grade times track
/// weight; exam subjects additionally contribute their final exam grade
/// times the exam weight. A non-exam subject contributing zero exam points
/// is expected, not an error.
pub fn compute_stats(profile: &UserInputProfile, rules: &RulesConfig) -> ScoreStats {
    let mut subject_scores = Vec::with_capacity(profile.subjects.len());
    let mut total_projected_points = 0u32;
    let mut total_deficits = 0u32;

    for subject in &profile.subjects {
        let weight = match subject.course_type {
            CourseType::Leistungskurs => rules.lk_weight,
            CourseType::Grundkurs => rules.gk_weight,
        };

        let mut course_points = 0u32;
        let mut deficits = 0u32;
        for grade in subject.semester_grades.values() {
            course_points += u32::from(*grade) * weight;
            if *grade <= rules.deficit_threshold {
                deficits += 1;
            }
        }

        let exam_points = if subject.is_exam_subject {
            subject
                .final_exam_grade
                .map(|grade| u32::from(grade) * rules.exam_weight)
                .unwrap_or(0)
        } else {
            0
        };

        total_projected_points += course_points + exam_points;
        total_deficits += deficits;

        subject_scores.push(SubjectScore {
            subject_id: subject.id.clone(),
            course_points,
            exam_points,
            deficits,
        });
    }

    ScoreStats {
        total_projected_points,
        total_deficits,
        subject_scores,
    }
}
