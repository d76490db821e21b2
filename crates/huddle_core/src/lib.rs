//! Core data types for the huddle weekly recap pipeline.
//!
//! This crate holds the structures every stage exchanges: the truth record
//! built from the sports API, the evidence set gathered for key players,
//! the audit result, and the provider-neutral generation request and
//! response types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audit;
mod evidence;
mod message;
mod request;
mod role;
mod stage;
mod truth;

pub use audit::{AuditResult, AuditStatus, Issue, IssueKind};
pub use evidence::{
    EvidenceSet, KickoffWindow, PlayerEvidence, Quote, Reference, ReferenceId, SeasonOutlook,
};
pub use message::Message;
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse};
pub use role::Role;
pub use stage::RecapStage;
pub use truth::{
    BYE, CumulativeRecord, MatchupResult, PlayerSnapshot, TIE, TIE_TOLERANCE, TeamSnapshot,
    TruthRecord, format_record,
};
