//! Trust Pipeline Library
//!
//! Fail-closed trust checks for evidence-backed investment claims:
//! - **gate**: extraction confidence gate; no extracted value feeds a
//!   calculation unless its confidence and dhabt score clear the thresholds
//!   or a human verified it
//! - **integrity**: structural validation of sanad (evidence chain) and claim
//!   documents, including transmission-chain graph linkage
//! - **grading**: corroboration counting, conflict-of-interest cures, and
//!   sanad grade computation over an injected evidence repository
//! - **debate**: five-role adversarial debate with a Muhasabah self-accounting
//!   gate on every output
//!
//! # Usage
//!
//! ```bash
//! # Evaluate gate inputs
//! trust-cli gate inputs.json
//!
//! # Validate a sanad document
//! trust-cli validate-sanad sanad.json
//!
//! # Grade a sanad against an evidence file
//! trust-cli grade sanad.json --evidence evidence.json
//! ```

pub mod config;
pub mod debate;
pub mod gate;
pub mod grading;
pub mod integrity;
pub mod model;

pub use config::{ConfigError, GateConfig, TrustConfig};
pub use gate::{
    enforce_extraction_gate, BlockReason, ExtractionGate, ExtractionGateBlocked,
    ExtractionGateDecision, GateInput, InputGradeInfo,
};
pub use grading::{compute_sanad_grade, EvidenceRepository, GradeResult, SanadGrader};
pub use integrity::{validate_claim, validate_sanad, IntegrityViolation, ValidationResult};
