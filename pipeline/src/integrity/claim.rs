//! Claim document validation.

use serde_json::Value;
use tracing::debug;

use super::fields::{optional_uuid, parse_enum, present, require_uuid};
use super::result::{ErrorCode, IntegrityViolation, IssueSink, ValidationIssue, ValidationResult};
use crate::model::{Claim, ClaimAction, ClaimRule, ClaimVerdict, Grade};

impl ClaimRule {
    /// Issue code reported when this rule is broken.
    pub fn error_code(self) -> ErrorCode {
        match self {
            Self::NoFreeFacts => ErrorCode::NffViolation,
            Self::GradeDRequiresAction => ErrorCode::GradeDRequiresAction,
            Self::ContradictedRequiresAction => ErrorCode::ContradictedRequiresAction,
        }
    }

    fn path(self) -> &'static str {
        match self {
            Self::NoFreeFacts => "ic_bound",
            Self::GradeDRequiresAction | Self::ContradictedRequiresAction => "claim_action",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::NoFreeFacts => "ic_bound claim has neither sanad_id nor primary_span_id",
            Self::GradeDRequiresAction => "grade D claim must carry an action other than NONE",
            Self::ContradictedRequiresAction => {
                "CONTRADICTED claim must carry an action other than NONE"
            }
        }
    }
}

/// Validate a claim document: field types, enums, and cross-field rules.
pub fn validate_claim(doc: &Value) -> ValidationResult {
    let Some(obj) = doc.as_object() else {
        return ValidationResult::fail(
            ErrorCode::InvalidDocument,
            "$",
            "claim document must be a JSON object",
        );
    };

    let mut sink = IssueSink::default();

    require_uuid(obj, "claim_id", "", &mut sink);
    let grade = parse_enum::<Grade>(obj, "claim_grade", "", true, &mut sink);
    let verdict = parse_enum::<ClaimVerdict>(obj, "claim_verdict", "", true, &mut sink);
    let action = parse_enum::<ClaimAction>(obj, "claim_action", "", true, &mut sink);

    let ic_bound = match present(obj, "ic_bound") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            sink.error(ErrorCode::InvalidType, "ic_bound", "ic_bound must be a boolean");
            false
        }
    };

    let sanad_ref = optional_uuid(obj, "sanad_id", "", &mut sink).is_some();
    let span_ref = match present(obj, "primary_span_id") {
        None => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => {
            sink.error(
                ErrorCode::InvalidType,
                "primary_span_id",
                "primary_span_id must be a string",
            );
            false
        }
    };

    if let (Some(grade), Some(verdict), Some(action)) = (grade, verdict, action) {
        for rule in ClaimRule::check(grade, verdict, action, ic_bound, sanad_ref || span_ref) {
            sink.error(rule.error_code(), rule.path(), rule.message());
        }
    }

    let result = sink.finish();
    if !result.passed {
        debug!(codes = ?result.error_codes(), "claim failed integrity validation");
    }
    result
}

/// Validate, then deserialize into a typed [`Claim`].
pub fn parse_claim(doc: &Value) -> Result<Claim, IntegrityViolation> {
    validate_claim(doc).into_result()?;
    serde_json::from_value(doc.clone()).map_err(|e| IntegrityViolation {
        errors: vec![ValidationIssue::new(
            ErrorCode::InvalidDocument,
            "$",
            &e.to_string(),
        )],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn claim() -> Value {
        json!({
            "claim_id": Uuid::new_v4().to_string(),
            "value": {"metric": "ARR", "amount": 4200000},
            "claim_grade": "B",
            "claim_verdict": "VERIFIED",
            "claim_action": "NONE",
            "ic_bound": true,
            "sanad_id": Uuid::new_v4().to_string()
        })
    }

    #[test]
    fn test_valid_claim() {
        let doc = claim();
        assert!(validate_claim(&doc).passed);
        let parsed = parse_claim(&doc).unwrap();
        assert_eq!(parsed.claim_grade, Grade::B);
        assert!(parsed.ic_bound);
    }

    #[test]
    fn test_no_free_facts() {
        let mut doc = claim();
        doc["sanad_id"] = Value::Null;
        let result = validate_claim(&doc);
        assert_eq!(result.error_codes(), vec![ErrorCode::NffViolation]);
        assert_eq!(result.errors[0].path, "ic_bound");

        doc["primary_span_id"] = json!("deck.pdf#p12");
        assert!(validate_claim(&doc).passed);
    }

    #[test]
    fn test_grade_d_and_contradicted_require_action() {
        let mut doc = claim();
        doc["claim_grade"] = json!("D");
        doc["claim_verdict"] = json!("CONTRADICTED");
        let codes = validate_claim(&doc).error_codes();
        assert_eq!(
            codes,
            vec![
                ErrorCode::GradeDRequiresAction,
                ErrorCode::ContradictedRequiresAction
            ]
        );

        doc["claim_action"] = json!("RED_FLAG");
        assert!(validate_claim(&doc).passed);
    }

    #[test]
    fn test_bad_enums_skip_cross_field_rules() {
        let mut doc = claim();
        doc["claim_grade"] = json!("F");
        doc["claim_action"] = json!("SHRUG");
        let codes = validate_claim(&doc).error_codes();
        assert_eq!(codes, vec![ErrorCode::InvalidEnum, ErrorCode::InvalidEnum]);
    }

    #[test]
    fn test_field_types() {
        let mut doc = claim();
        doc["ic_bound"] = json!("yes");
        doc["primary_span_id"] = json!(12);
        doc["claim_id"] = Value::Null;
        let codes = validate_claim(&doc).error_codes();
        assert!(codes.contains(&ErrorCode::MissingField));
        assert_eq!(
            codes.iter().filter(|c| **c == ErrorCode::InvalidType).count(),
            2
        );
    }

    #[test]
    fn test_non_object() {
        let result = validate_claim(&json!(["claim"]));
        assert_eq!(result.error_codes(), vec![ErrorCode::InvalidDocument]);
        assert!(parse_claim(&json!(null)).is_err());
    }
}
