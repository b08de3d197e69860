//! Typed records for claims, evidence, and sanads.
//!
//! Every closed set on the wire is an enum here, so unknown labels are
//! rejected when a document is deserialized rather than deep inside the
//! grading logic.

pub mod claim;
pub mod evidence;
pub mod grade;
pub mod sanad;

pub use claim::{Claim, ClaimAction, ClaimDraft, ClaimRule, ClaimVerdict, VerificationMethod};
pub use evidence::{CoiMetadata, CoiSeverity, Evidence, SourceTier};
pub use grade::{strictest_cap, Grade};
pub use sanad::{
    ActorType, CorroborationStatus, CureProtocol, Defect, DefectSeverity, DefectStatus,
    DefectType, IndependenceCheck, NodeType, Sanad, TransmissionNode,
};
