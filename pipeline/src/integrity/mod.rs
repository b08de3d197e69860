//! Structural integrity validation for sanad and claim documents.
//!
//! Validators take raw `serde_json::Value` documents, never trust their
//! shape, and report *every* problem found as a `{code, message, path}`
//! issue. A document either passes cleanly or is rejected as a whole.
//!
//! ```text
//!   JSON doc ──► field checks ──► chain linkage (petgraph) ──► defect checks
//!                     │                   │                        │
//!                     └──────────── IssueSink ◄────────────────────┘
//!                                      │
//!                               ValidationResult
//! ```

mod fields;
pub mod claim;
pub mod graph;
pub mod result;
pub mod sanad;

pub use claim::{parse_claim, validate_claim};
pub use graph::{analyze_links, links_from_nodes, ChainLink, LinkageReport};
pub use result::{ErrorCode, IntegrityViolation, ValidationIssue, ValidationResult};
pub use sanad::{parse_sanad, validate_sanad};
