//! Rule-based Abitur risk assessment.
//!
//! The pipeline is a chain of pure stages over immutable values: an
//! untyped input is validated into a [`UserInputProfile`], the jurisdiction
//! resolves to a [`RulesConfig`], the scoring calculator produces
//! [`ScoreStats`], the trap detector derives findings from profile, rules,
//! and stats, and the assembler folds everything into a [`RiskReport`].
//! Nothing is cached and no stage mutates a predecessor's output, so the
//! same profile always yields a bit-identical report.

pub mod domain;
pub(crate) mod report;
pub mod router;
pub(crate) mod rules;
pub(crate) mod scoring;
pub(crate) mod traps;
pub(crate) mod validate;

#[cfg(test)]
mod tests;

pub use domain::{
    CourseType, ExamType, FatalScope, FederalState, RiskFinding, RiskReport, RulesConfig,
    ScoreStats, Semester, Severity, Subject, SubjectScore, TrapKind, UserInputProfile,
};
pub use router::assessment_router;
pub use validate::{validate, ValidationErrors, Violation, ViolationKind};

/// Run the full pipeline on a raw, untyped value.
pub fn assess(raw: serde_json::Value) -> Result<RiskReport, ValidationErrors> {
    let profile = validate::validate(raw)?;
    Ok(assess_profile(&profile))
}

/// Run the scoring, trap-detection, and assembly stages on an
/// already-validated profile.
pub fn assess_profile(profile: &UserInputProfile) -> RiskReport {
    let rules = rules::resolve(profile);
    let stats = scoring::compute_stats(profile, &rules);
    let findings = traps::detect(profile, &rules, &stats);
    report::assemble(profile, stats, findings)
}
