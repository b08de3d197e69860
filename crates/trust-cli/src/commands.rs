//! Subcommand implementations. Each returns a JSON report and, when the
//! input was refused, a failure message that turns into a non-zero exit.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use trust_pipeline::config::TrustConfig;
use trust_pipeline::debate::{
    require_deliverable_ready, AgentOutput, DebateContext, DebateOrchestrator, DebateState,
    ScriptedRunner,
};
use trust_pipeline::gate::{ExtractionGate, GateInput};
use trust_pipeline::grading::{InMemoryEvidenceStore, SanadGrader};
use trust_pipeline::integrity::{self, parse_sanad, ValidationResult};
use trust_pipeline::model::Evidence;

pub struct Report {
    pub body: Value,
    pub failure: Option<String>,
}

impl Report {
    fn pass(body: Value) -> Self {
        Self {
            body,
            failure: None,
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn gate(config: &TrustConfig, file: &Path) -> Result<Report> {
    let inputs: Vec<GateInput> = read_json(file)?;
    let batch = ExtractionGate::new(&config.gate).evaluate_batch(&inputs);
    info!(
        allowed = batch.allowed.len(),
        blocked = batch.blocked.len(),
        "gate evaluated"
    );
    let failure = (!batch.all_allowed())
        .then(|| format!("{} of {} inputs blocked", batch.blocked.len(), batch.total()));
    Ok(Report {
        body: serde_json::to_value(&batch)?,
        failure,
    })
}

fn validation_report(kind: &str, result: ValidationResult) -> Result<Report> {
    let failure = (!result.passed).then(|| {
        format!(
            "{} failed validation with {} error(s)",
            kind,
            result.errors.len()
        )
    });
    Ok(Report {
        body: serde_json::to_value(&result)?,
        failure,
    })
}

pub fn validate_sanad(file: &Path) -> Result<Report> {
    let doc: Value = read_json(file)?;
    validation_report("sanad", integrity::validate_sanad(&doc))
}

pub fn validate_claim(file: &Path) -> Result<Report> {
    let doc: Value = read_json(file)?;
    validation_report("claim", integrity::validate_claim(&doc))
}

pub fn grade(sanad_file: &Path, evidence_file: &Path) -> Result<Report> {
    let doc: Value = read_json(sanad_file)?;
    let sanad = match parse_sanad(&doc) {
        Ok(sanad) => sanad,
        Err(violation) => {
            warn!(errors = violation.errors.len(), "sanad rejected before grading");
            return Ok(Report {
                body: json!({ "errors": violation.errors }),
                failure: Some(violation.to_string()),
            });
        }
    };
    let evidence: Vec<Evidence> = read_json(evidence_file)?;
    let grader = SanadGrader::new(evidence.into_iter().collect::<InMemoryEvidenceStore>());
    let result = grader
        .grade(&sanad)
        .with_context(|| format!("grading sanad {}", sanad.sanad_id))?;
    info!(sanad_id = %sanad.sanad_id, grade = %result.grade, "sanad graded");
    Ok(Report::pass(serde_json::to_value(&result)?))
}

/// Scripted debate file: the subject plus every role's outputs in round order.
#[derive(Debug, Deserialize)]
struct DebateScript {
    context: DebateContext,
    outputs: Vec<AgentOutput>,
}

pub fn debate(config: &TrustConfig, file: &Path) -> Result<Report> {
    let script: DebateScript = read_json(file)?;
    let state = DebateState::new(&script.context.debate_id);
    let runner = ScriptedRunner::from_outputs(script.outputs);
    let mut orchestrator = DebateOrchestrator::with_config(runner, script.context, config.debate);
    let outcome = orchestrator.run_to_outcome(state)?;
    info!("{}", outcome.summary_line());
    let failure = require_deliverable_ready(&outcome).err().map(|e| e.to_string());
    Ok(Report {
        body: serde_json::to_value(&outcome)?,
        failure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_json(value: &Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    #[test]
    fn test_gate_command_reports_blocks() {
        let file = write_json(&json!([
            {"claim_id": "a", "extraction_confidence": 0.99, "dhabt_score": 0.99},
            {"claim_id": "b", "extraction_confidence": 0.94, "dhabt_score": 0.99}
        ]));
        let report = gate(&TrustConfig::default(), file.path()).unwrap();
        assert_eq!(report.body["blocked"][0]["reason"], "LOW_CONFIDENCE");
        assert!(report.failure.is_some());
    }

    #[test]
    fn test_validate_claim_command() {
        let file = write_json(&json!({
            "claim_id": "3d2b0c1e-7a55-4f0e-9d1b-0c8e2f6a9b71",
            "claim_grade": "D",
            "claim_verdict": "UNVERIFIED",
            "claim_action": "NONE"
        }));
        let report = validate_claim(file.path()).unwrap();
        assert_eq!(report.body["passed"], false);
        assert_eq!(report.body["errors"][0]["code"], "GRADE_D_REQUIRES_ACTION");
        assert!(report.failure.is_some());
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        assert!(validate_sanad(Path::new("/nonexistent/sanad.json")).is_err());
    }

    #[test]
    fn test_debate_command() {
        let outputs: Vec<Value> = [
            "ADVOCATE",
            "SANAD_BREAKER",
            "CONTRADICTION_FINDER",
            "RISK_OFFICER",
            "ARBITER",
        ]
        .iter()
        .map(|role| {
            json!({
                "role": role,
                "output_type": "argument",
                "content": {"summary": "agree", "position": "INVEST"},
                "muhasabah": {"confidence": 0.6, "supported_claim_ids": ["c-1"]}
            })
        })
        .collect();
        let file = write_json(&json!({
            "context": {"debate_id": "d-1", "subject": "memo"},
            "outputs": outputs
        }));
        let report = debate(&TrustConfig::default(), file.path()).unwrap();
        assert_eq!(report.body["stop_reason"], "CONSENSUS");
        assert!(report.failure.is_none());
    }
}
