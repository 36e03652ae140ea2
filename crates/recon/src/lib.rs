//! `carelink-recon`: identifier inference, name linkage and pending-match
//! clustering over an aggregated record set.
//!
//! Pure engine crate: receives owner-tagged records and fixes, returns the
//! reconciled view. No storage or CLI dependencies.

pub mod derived;
pub mod engine;
pub mod evidence;
pub mod fixes;
pub mod identifiers;
pub mod model;
pub mod names;
pub mod pending;

pub use derived::{derive_records, parse_date, DerivedId, DerivedRecord};
pub use engine::run;
pub use fixes::apply_fixes;
pub use identifiers::{infer_identifiers, IdentifierGraph, IdentifierMappings};
pub use model::{ReconMeta, ReconResult, ReconSummary};
pub use names::{names_represent_same_person, parse_name, ParsedName};
pub use pending::{find_pending_matches, PendingMatchGroup, PendingMatchType};
