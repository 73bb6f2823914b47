use super::DocsReport;
use crate::types::consilience::{CheckResult, CheckStatus};
use crate::types::scoring::{GateOutcome, SustainabilityGateResult};

pub fn docs_to_markdown(report: &DocsReport<'_>) -> String {
    let result = report.result;
    let mut output = String::new();
    output.push_str("# Documentation Credibility\n\n");
    output.push_str(&format!("Effective score: {:.0}\n\n", result.docs_effective));
    output.push_str("## Components\n\n");
    output.push_str(&format!(
        "- raw quality: {:.0}\n- tech score: {:.0}\n- marketing penalty: {:.0}\n- consilience: {:.0}\n\n",
        result.docs_quality_raw, result.tech_score, result.marketing_penalty, result.consilience_score
    ));

    output.push_str("## Flags\n\n");
    output.push_str(&format!(
        "- marketing heavy: {}\n- broken references: {}\n\n",
        yes_no(result.is_marketing_heavy),
        yes_no(result.has_broken_refs)
    ));

    output.push_str("## Consilience\n\n");
    push_check(&mut output, "paths", &result.consilience.path);
    push_check(&mut output, "badges", &result.consilience.badge);
    push_check(&mut output, "commands", &result.consilience.command);
    if let Some(links) = report.links {
        push_check(&mut output, "links", links);
    }

    let broken: Vec<_> = [
        &result.consilience.path,
        &result.consilience.badge,
        &result.consilience.command,
    ]
    .into_iter()
    .chain(report.links)
    .flat_map(|check| check.details.iter())
    .filter(|detail| detail.status == CheckStatus::Broken)
    .collect();
    if !broken.is_empty() {
        output.push_str("\n## Broken References\n\n");
        for detail in broken {
            output.push_str(&format!("- `{}` ({})\n", detail.reference, detail.reason));
        }
    }
    output
}

pub fn gate_to_markdown(result: &SustainabilityGateResult) -> String {
    let mut output = String::new();
    output.push_str("# Sustainability Gate\n\n");
    output.push_str(&format!(
        "Level: {} | score: {:.0} | sustainable: {}\n\n",
        result.gate_level,
        result.sustainability_score,
        yes_no(result.is_sustainable)
    ));

    output.push_str("## Checks\n\n");
    for check in &result.checks {
        let marker = match check.outcome {
            GateOutcome::Passed => "pass",
            GateOutcome::Failed => "fail",
            GateOutcome::Skipped => "skip",
        };
        output.push_str(&format!(
            "- [{marker}] {}: {}\n",
            check.name.as_str(),
            check.message
        ));
    }

    output.push_str("\n## Warnings\n\n");
    if result.warnings.is_empty() {
        output.push_str("- none\n");
    } else {
        for warning in &result.warnings {
            output.push_str(&format!("- {warning}\n"));
        }
    }
    output
}

fn push_check(output: &mut String, label: &str, check: &CheckResult) {
    output.push_str(&format!(
        "- {label}: {} valid, {} broken, {} unchecked\n",
        check.valid, check.broken, check.unchecked
    ));
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::scoring::{GateCheckName, GateCheckResult, GateLevel};

    #[test]
    fn gate_markdown_lists_checks_and_warnings() {
        let result = SustainabilityGateResult {
            is_sustainable: true,
            gate_level: GateLevel::Maintained,
            sustainability_score: 79.0,
            days_since_commit: 12,
            checks: vec![
                GateCheckResult::evaluated(GateCheckName::RecentCommit, true, 12.0, 180.0, "recent"),
                GateCheckResult::skipped(GateCheckName::PrActivity, 1.0, "no pull requests"),
            ],
            warnings: vec!["Bus factor risk".to_string()],
        };
        let rendered = gate_to_markdown(&result);
        assert!(rendered.contains("Level: maintained"));
        assert!(rendered.contains("- [pass] recent_commit: recent"));
        assert!(rendered.contains("- [skip] pr_activity"));
        assert!(rendered.contains("- Bus factor risk"));
    }
}
