//! Sanad document validation.

use chrono::DateTime;
use serde_json::Value;
use tracing::debug;

use super::fields::{
    check_uuid, join, optional_uuid, parse_enum, present, require_str, require_uuid,
    unit_decimal, Object,
};
use super::graph::{analyze_links, ChainLink};
use super::result::{ErrorCode, IntegrityViolation, IssueSink, ValidationIssue, ValidationResult};
use crate::model::{
    ActorType, CorroborationStatus, CureProtocol, DefectSeverity, DefectStatus, DefectType, Grade,
    NodeType, Sanad,
};

/// Validate a sanad document, accumulating every error.
pub fn validate_sanad(doc: &Value) -> ValidationResult {
    let Some(obj) = doc.as_object() else {
        return ValidationResult::fail(
            ErrorCode::InvalidDocument,
            "$",
            "sanad document must be a JSON object",
        );
    };

    let mut sink = IssueSink::default();

    require_uuid(obj, "sanad_id", "", &mut sink);
    require_uuid(obj, "claim_id", "", &mut sink);

    match present(obj, "primary_evidence_id") {
        None => sink.error(
            ErrorCode::MissingPrimaryEvidence,
            "primary_evidence_id",
            "primary_evidence_id is required and may not be null",
        ),
        Some(_) => {
            optional_uuid(obj, "primary_evidence_id", "", &mut sink);
        }
    }

    if let Some(value) = present(obj, "corroborating_evidence_ids") {
        match value.as_array() {
            Some(ids) => {
                for (i, id) in ids.iter().enumerate() {
                    check_uuid(id, &format!("corroborating_evidence_ids[{}]", i), &mut sink);
                }
            }
            None => sink.error(
                ErrorCode::InvalidType,
                "corroborating_evidence_ids",
                "corroborating_evidence_ids must be an array",
            ),
        }
    }

    if let Some(check) = present(obj, "independence_check") {
        let well_formed = check.as_object().is_some_and(|c| {
            ["verified", "independent"]
                .iter()
                .all(|f| c.get(*f).is_some_and(Value::is_boolean))
        });
        if !well_formed {
            sink.error(
                ErrorCode::InvalidType,
                "independence_check",
                "independence_check must be an object with boolean verified and independent",
            );
        }
    }

    unit_decimal(obj, "extraction_confidence", "", true, &mut sink);
    parse_enum::<CorroborationStatus>(obj, "corroboration_status", "", true, &mut sink);
    let grade = parse_enum::<Grade>(obj, "sanad_grade", "", true, &mut sink);

    validate_chain(obj, &mut sink);
    let open_fatal = validate_defects(obj, &mut sink);

    if let (Some(grade), true) = (grade, open_fatal) {
        if grade != Grade::D {
            sink.error(
                ErrorCode::GradeDefectMismatch,
                "sanad_grade",
                &format!("an OPEN FATAL defect requires grade D, found {}", grade),
            );
        }
    }

    let result = sink.finish();
    if !result.passed {
        debug!(
            errors = result.errors.len(),
            codes = ?result.error_codes(),
            "sanad failed integrity validation"
        );
    }
    result
}

fn validate_chain(obj: &Object, sink: &mut IssueSink) {
    let nodes = match present(obj, "transmission_chain") {
        None => {
            sink.error(
                ErrorCode::MissingField,
                "transmission_chain",
                "transmission_chain is required",
            );
            return;
        }
        Some(Value::Array(nodes)) => nodes,
        Some(_) => {
            sink.error(
                ErrorCode::InvalidType,
                "transmission_chain",
                "transmission_chain must be an array",
            );
            return;
        }
    };
    if nodes.is_empty() {
        sink.error(
            ErrorCode::EmptyChain,
            "transmission_chain",
            "transmission_chain must contain at least one node",
        );
        return;
    }

    let mut links = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        if let Some(link) = validate_node(node, i, sink) {
            links.push(link);
        }
    }
    sink.extend(analyze_links(&links).issues);
}

/// Validate one node in isolation; returns its linkage when it has a string id.
fn validate_node(node: &Value, position: usize, sink: &mut IssueSink) -> Option<ChainLink> {
    let prefix = format!("transmission_chain[{}]", position);
    let Some(obj) = node.as_object() else {
        sink.error(ErrorCode::InvalidType, &prefix, "node must be an object");
        return None;
    };

    let node_id = require_str(obj, "node_id", &prefix, sink).map(str::to_string);
    if let Some(id) = &node_id {
        if uuid::Uuid::parse_str(id).is_err() {
            sink.error(
                ErrorCode::InvalidUuid,
                &join(&prefix, "node_id"),
                &format!("{:?} is not a valid UUID", id),
            );
        }
    }

    parse_enum::<NodeType>(obj, "node_type", &prefix, true, sink);
    parse_enum::<ActorType>(obj, "actor_type", &prefix, true, sink);
    require_str(obj, "actor_id", &prefix, sink);
    if let Some(ts) = require_str(obj, "timestamp", &prefix, sink) {
        if DateTime::parse_from_rfc3339(ts).is_err() {
            sink.error(
                ErrorCode::InvalidTimestamp,
                &join(&prefix, "timestamp"),
                &format!("{:?} is not an RFC 3339 timestamp", ts),
            );
        }
    }
    unit_decimal(obj, "confidence", &prefix, false, sink);

    let mut parent = None;
    for field in ["prev_node_id", "parent_id"] {
        match present(obj, field) {
            None => {}
            Some(Value::String(p)) => {
                if uuid::Uuid::parse_str(p).is_err() {
                    sink.error(
                        ErrorCode::InvalidUuid,
                        &join(&prefix, field),
                        &format!("{:?} is not a valid UUID", p),
                    );
                }
                parent.get_or_insert_with(|| p.clone());
            }
            Some(_) => sink.error(
                ErrorCode::InvalidUuid,
                &join(&prefix, field),
                "expected a UUID string",
            ),
        }
    }

    node_id.map(|id| ChainLink {
        position,
        node_id: id,
        parent_id: parent,
    })
}

/// Validate defects; returns whether any OPEN FATAL defect is present.
fn validate_defects(obj: &Object, sink: &mut IssueSink) -> bool {
    let defects = match present(obj, "defects") {
        None => return false,
        Some(Value::Array(defects)) => defects,
        Some(_) => {
            sink.error(ErrorCode::InvalidType, "defects", "defects must be an array");
            return false;
        }
    };

    let mut open_fatal = false;
    for (i, defect) in defects.iter().enumerate() {
        let prefix = format!("defects[{}]", i);
        let Some(d) = defect.as_object() else {
            sink.error(ErrorCode::InvalidType, &prefix, "defect must be an object");
            continue;
        };

        parse_enum::<DefectType>(d, "defect_type", &prefix, true, sink);
        let severity = parse_enum::<DefectSeverity>(d, "severity", &prefix, true, sink);
        parse_enum::<CureProtocol>(d, "cure_protocol", &prefix, true, sink);
        let status = parse_enum::<DefectStatus>(d, "status", &prefix, false, sink);

        match present(d, "description") {
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            _ => sink.error(
                ErrorCode::MissingDescription,
                &join(&prefix, "description"),
                "defect must carry a non-empty description",
            ),
        }

        let status = status.unwrap_or_default();
        if severity == Some(DefectSeverity::Fatal) {
            if status == DefectStatus::Open {
                open_fatal = true;
            } else {
                sink.warn(
                    ErrorCode::FatalDefectNotOpen,
                    &prefix,
                    "fatal defect is no longer open; grade is not forced to D",
                );
            }
        }
    }
    open_fatal
}

/// Validate, then deserialize into a typed [`Sanad`].
pub fn parse_sanad(doc: &Value) -> Result<Sanad, IntegrityViolation> {
    validate_sanad(doc).into_result()?;
    serde_json::from_value(doc.clone()).map_err(|e| IntegrityViolation {
        errors: vec![ValidationIssue::new(
            ErrorCode::InvalidDocument,
            "$",
            &e.to_string(),
        )],
    })
}
