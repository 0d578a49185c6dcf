//! # Types Module
//!
//! Core records exchanged between pipeline stages: the job posting consumed
//! read-only by the core, and the recommendation it produces.

mod job;

pub use job::{JobPosting, Recommendation};
