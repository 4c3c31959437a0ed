//! Artifact construction and index generation.
//!
//! [`build`] merges the resolved contents of one job into a deduplicated
//! [`Artifact`](linkmill_shared::Artifact) with both encodings;
//! [`generate_index`] renders the Markdown index over the persisted
//! artifact metadata.

mod builder;
mod index;

pub use builder::build;
pub use index::generate_index;
