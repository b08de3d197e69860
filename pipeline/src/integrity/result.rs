//! Validation results: accumulated `{code, message, path}` issues.

use serde::{Deserialize, Serialize};

/// Machine-readable issue code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Document is not a JSON object.
    InvalidDocument,
    MissingField,
    InvalidType,
    InvalidUuid,
    InvalidEnum,
    InvalidConfidence,
    InvalidTimestamp,
    MissingPrimaryEvidence,
    EmptyChain,
    MissingDescription,
    SanadDuplicateNode,
    SanadOrphanReference,
    SanadNoRoot,
    SanadMultipleRoots,
    SanadCycleDetected,
    SanadOrphanedNode,
    GradeDefectMismatch,
    /// Warning: a fatal defect is no longer open.
    FatalDefectNotOpen,
    NffViolation,
    GradeDRequiresAction,
    ContradictedRequiresAction,
}

impl ErrorCode {
    /// Wire name of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidDocument => "INVALID_DOCUMENT",
            Self::MissingField => "MISSING_FIELD",
            Self::InvalidType => "INVALID_TYPE",
            Self::InvalidUuid => "INVALID_UUID",
            Self::InvalidEnum => "INVALID_ENUM",
            Self::InvalidConfidence => "INVALID_CONFIDENCE",
            Self::InvalidTimestamp => "INVALID_TIMESTAMP",
            Self::MissingPrimaryEvidence => "MISSING_PRIMARY_EVIDENCE",
            Self::EmptyChain => "EMPTY_CHAIN",
            Self::MissingDescription => "MISSING_DESCRIPTION",
            Self::SanadDuplicateNode => "SANAD_DUPLICATE_NODE",
            Self::SanadOrphanReference => "SANAD_ORPHAN_REFERENCE",
            Self::SanadNoRoot => "SANAD_NO_ROOT",
            Self::SanadMultipleRoots => "SANAD_MULTIPLE_ROOTS",
            Self::SanadCycleDetected => "SANAD_CYCLE_DETECTED",
            Self::SanadOrphanedNode => "SANAD_ORPHANED_NODE",
            Self::GradeDefectMismatch => "GRADE_DEFECT_MISMATCH",
            Self::FatalDefectNotOpen => "FATAL_DEFECT_NOT_OPEN",
            Self::NffViolation => "NFF_VIOLATION",
            Self::GradeDRequiresAction => "GRADE_D_REQUIRES_ACTION",
            Self::ContradictedRequiresAction => "CONTRADICTED_REQUIRES_ACTION",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: ErrorCode,
    pub message: String,
    /// Location in the document, e.g. `transmission_chain[2].node_id`.
    pub path: String,
}

impl ValidationIssue {
    pub fn new(code: ErrorCode, path: &str, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            path: path.to_string(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)
    }
}

/// Outcome of validating one document. Never partial: either every check
/// passed or the full error list is returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub errors: Vec<ValidationIssue>,
    #[serde(default)]
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Build from accumulated issues; passes iff there are no errors.
    pub fn from_issues(errors: Vec<ValidationIssue>, warnings: Vec<ValidationIssue>) -> Self {
        Self {
            passed: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Immediate fail-closed result with a single error.
    pub fn fail(code: ErrorCode, path: &str, message: &str) -> Self {
        Self::from_issues(vec![ValidationIssue::new(code, path, message)], Vec::new())
    }

    pub fn has_error(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    pub fn has_warning(&self, code: ErrorCode) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// Error codes in the order they were raised.
    pub fn error_codes(&self) -> Vec<ErrorCode> {
        self.errors.iter().map(|e| e.code).collect()
    }

    /// Convert a failed result into an error so callers can reject the write with `?`.
    pub fn into_result(self) -> Result<Self, IntegrityViolation> {
        if self.passed {
            Ok(self)
        } else {
            Err(IntegrityViolation {
                errors: self.errors,
            })
        }
    }
}

/// A document failed integrity validation; the whole write must be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("integrity validation failed with {} error(s): {}", .errors.len(), summarize(.errors))]
pub struct IntegrityViolation {
    pub errors: Vec<ValidationIssue>,
}

fn summarize(errors: &[ValidationIssue]) -> String {
    errors
        .iter()
        .map(|e| e.code.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collects issues while a validator walks a document.
#[derive(Debug, Default)]
pub(crate) struct IssueSink {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl IssueSink {
    pub(crate) fn error(&mut self, code: ErrorCode, path: &str, message: &str) {
        self.errors.push(ValidationIssue::new(code, path, message));
    }

    pub(crate) fn warn(&mut self, code: ErrorCode, path: &str, message: &str) {
        self.warnings.push(ValidationIssue::new(code, path, message));
    }

    pub(crate) fn extend(&mut self, issues: Vec<ValidationIssue>) {
        self.errors.extend(issues);
    }

    pub(crate) fn finish(self) -> ValidationResult {
        ValidationResult::from_issues(self.errors, self.warnings)
    }
}
