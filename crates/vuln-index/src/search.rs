//! Query evaluation.
//!
//! This module provides:
//! - Candidate selection from search terms and categorical filters
//! - The `QueryEngine` API with sort/filter fusion and pagination

mod candidates;
mod engine;


pub use candidates::Candidates;
pub use engine::{execute_query, QueryEngine};
