//! Extraction gate end-to-end: claim drafts parsed from JSON, judged one
//! at a time and as a calculation's full input set.

use serde_json::json;
use trust_pipeline::config::TrustConfig;
use trust_pipeline::gate::{
    enforce_extraction_gate, evaluate, evaluate_batch, BlockReason, ExtractionGate,
    ExtractionGateDecision, GateInput, InputGradeInfo,
};
use trust_pipeline::model::{ClaimDraft, Grade};

fn draft(value: serde_json::Value) -> GateInput {
    let draft: ClaimDraft = serde_json::from_value(value).unwrap();
    GateInput::from(&draft)
}

#[test]
fn test_low_confidence_draft_blocked() {
    let input = draft(json!({
        "claim_id": "6f1c1f4e-8d0a-4c55-9a3e-2f9e8b7d6c5a",
        "value": {"arr_usd": 4200000},
        "extraction_confidence": 0.94,
        "dhabt_score": 0.99
    }));
    let decision = evaluate(&input);
    assert!(decision.blocked());
    assert!(!decision.allowed());
    assert_eq!(decision.reason(), Some(BlockReason::LowConfidence));
}

#[test]
fn test_same_draft_human_verified_allowed() {
    let input = draft(json!({
        "claim_id": "6f1c1f4e-8d0a-4c55-9a3e-2f9e8b7d6c5a",
        "extraction_confidence": 0.94,
        "dhabt_score": 0.99,
        "verification_method": "HUMAN_VERIFIED"
    }));
    let decision = evaluate(&input);
    assert!(decision.allowed());
    assert!(decision.bypassed_by_human_verification());
}

#[test]
fn test_human_verified_without_scores_allowed() {
    let input = draft(json!({
        "claim_id": "6f1c1f4e-8d0a-4c55-9a3e-2f9e8b7d6c5a",
        "is_human_verified": true
    }));
    assert!(evaluate(&input).allowed());
}

#[test]
fn test_exact_thresholds_allowed() {
    let input = draft(json!({
        "claim_id": "0b7cbb2b-5e0f-4d1c-8a41-3c1f07f5f0d2",
        "extraction_confidence": 0.95,
        "dhabt_score": 0.90
    }));
    let decision = evaluate(&input);
    assert!(decision.allowed());
    assert!(!decision.bypassed_by_human_verification());
}

#[test]
fn test_decision_wire_shape() {
    let input = draft(json!({
        "claim_id": "6f1c1f4e-8d0a-4c55-9a3e-2f9e8b7d6c5a",
        "dhabt_score": 0.99
    }));
    let decision = evaluate(&input);
    let wire = serde_json::to_value(&decision).unwrap();
    assert_eq!(wire["allowed"], false);
    assert_eq!(wire["blocked"], true);
    assert_eq!(wire["reason"], "MISSING_CONFIDENCE");
    assert_eq!(wire["claim_id"], "6f1c1f4e-8d0a-4c55-9a3e-2f9e8b7d6c5a");

    let back: ExtractionGateDecision = serde_json::from_value(wire).unwrap();
    assert_eq!(back, decision);
}

#[test]
fn test_contradictory_wire_record_rejected() {
    let wire = json!({
        "allowed": true,
        "blocked": true,
        "reason": null,
        "claim_id": "c-1",
        "confidence": null,
        "dhabt_score": null,
        "bypassed_by_human_verification": false
    });
    assert!(serde_json::from_value::<ExtractionGateDecision>(wire).is_err());
}

#[test]
fn test_batch_partitions_in_order() {
    let inputs: Vec<GateInput> = serde_json::from_value(json!([
        {"claim_id": "a", "extraction_confidence": 0.99, "dhabt_score": 0.99},
        {"claim_id": "b", "extraction_confidence": 0.50, "dhabt_score": 0.99},
        {"claim_id": "c", "extraction_confidence": 0.96, "dhabt_score": 0.91},
        {"claim_id": "d", "extraction_confidence": 1.5, "dhabt_score": 0.99}
    ]))
    .unwrap();
    let batch = evaluate_batch(&inputs);
    let allowed: Vec<&str> = batch.allowed.iter().map(|d| d.claim_id()).collect();
    let blocked: Vec<_> = batch.blocked.iter().map(|d| d.reason()).collect();
    assert_eq!(allowed, vec!["a", "c"]);
    assert_eq!(
        blocked,
        vec![
            Some(BlockReason::LowConfidence),
            Some(BlockReason::InvalidConfidence)
        ]
    );
    assert_eq!(batch.total(), 4);
}

#[test]
fn test_configured_thresholds_apply_to_enforcement() {
    let mut config = TrustConfig::default();
    config
        .apply_env_from(|var| match var {
            "TRUST_GATE_MIN_CONFIDENCE" => Some("0.98".to_string()),
            _ => None,
        })
        .unwrap();
    let gate = ExtractionGate::new(&config.gate);

    let inputs: Vec<InputGradeInfo> = serde_json::from_value(json!([
        {"input_name": "arr", "claim_id": "a", "extraction_confidence": 0.99,
         "dhabt_score": 0.95, "sanad_grade": "B"},
        {"input_name": "burn", "claim_id": "b", "extraction_confidence": 0.97,
         "dhabt_score": 0.95, "sanad_grade": "A"}
    ]))
    .unwrap();

    let err = enforce_extraction_gate(&gate, &inputs).unwrap_err();
    assert_eq!(err.blocked.len(), 1);
    assert_eq!(err.blocked[0].input_name, "burn");

    let clearance = enforce_extraction_gate(&ExtractionGate::default(), &inputs).unwrap();
    assert_eq!(clearance.weakest_grade, Some(Grade::B));
}
