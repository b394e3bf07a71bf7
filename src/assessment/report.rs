//! Severity aggregation and report assembly. A pure projection: nothing is
//! computed here beyond folding the findings into one overall severity.

use super::domain::{RiskFinding, RiskReport, ScoreStats, Severity, UserInputProfile};

/// The worst severity among the findings; `Low` when there are none.
pub fn overall_severity(findings: &[RiskFinding]) -> Severity {
    findings
        .iter()
        .map(|finding| finding.severity)
        .max()
        .unwrap_or(Severity::Low)
}

pub fn assemble(
    profile: &UserInputProfile,
    stats: ScoreStats,
    findings: Vec<RiskFinding>,
) -> RiskReport {
    RiskReport {
        federal_state: profile.federal_state,
        overall_severity: overall_severity(&findings),
        stats,
        findings,
    }
}
