//! Placement analytics over student, interview and hiring relations.
//!
//! The flow is `join → filter → {aggregate, pivot}`: [`join::join_relations`]
//! denormalizes the four source relations, [`filter::apply_filters`] selects
//! rows for a department/batch/company selection, and the [`aggregate`] and
//! [`pivot`] functions derive tables from the selection.
//! [`pipeline::run`] performs the whole flow against one snapshot.

pub mod aggregate;
pub mod db;
pub mod error;
pub mod filter;
pub mod join;
pub mod models;
pub mod pipeline;
pub mod pivot;
pub mod report;
pub mod source;
pub mod status;

pub use error::JoinKeyError;
pub use filter::{BatchSelection, FilterSet, FilteredView, Selection};
pub use models::Relations;
pub use pipeline::PipelineOutput;
pub use status::PlacementStatus;
