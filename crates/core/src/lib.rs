//! `carelink-core`: shared record, identifier and fix types.
//!
//! Every other crate in the workspace speaks these types. No IO here.

pub mod fix;
pub mod mrn;
pub mod record;

pub use fix::{Fix, NewFix};
pub use mrn::{normalize_identifier, Mrn};
pub use record::{Record, RecordBody, RecordKind};
