//! Core reconciliation logic for conditional access policy sync.
//!
//! This crate holds everything that does not talk to the network: the typed
//! definition schema and directory loader, the reconciliation planner, the
//! run summary accumulator with its notification rendering, and the
//! [`PolicyStore`] seam the applier drives.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use capsync_core::{apply_plan, load_definitions, plan, RunSummary};
//!
//! let outcome = load_definitions(&dir)?;
//! let mut summary = RunSummary::new();
//! summary.absorb_load_failures(&outcome.failures);
//!
//! let decisions = plan(&remote, &outcome.defined);
//! apply_plan(&store, decisions, &mut summary).await;
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

mod apply;
mod definition;
mod error;
mod reconcile;
mod report;
mod source;

pub use apply::*;
pub use definition::*;
pub use error::*;
pub use reconcile::*;
pub use report::*;
pub use source::*;

/// Namespace prefix marking a remote policy as managed by this tool.
///
/// Remote policies without this prefix are never deleted, regardless of
/// whether they appear in the local definitions.
pub const MANAGED_PREFIX: &str = "GH - ";
