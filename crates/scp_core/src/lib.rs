//! Core document types for the SCP archive.
//!
//! Two collections are modelled here: [`Scp`] entries, keyed by their
//! human-assigned `scp_id`, and [`ScpTale`] narratives, keyed by a
//! store-assigned identifier. Tales forward-reference SCPs through
//! `scp_refs`; SCPs hold the inverse set in `referencing_tale_ids`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod id;
mod page;
mod policy;
mod reconcile;
mod scp;
mod tale;

pub use id::DocumentId;
pub use page::{Page, PageRequest, Pagination};
pub use policy::ScpDeletePolicy;
pub use reconcile::{DanglingReference, ReconcileReport};
pub use scp::{NewScp, Scp, ScpPatch};
pub use tale::{NewTale, ScpTale, TalePatch};
