//! Business logic for Chronicle.
//!
//! This crate defines the repository traits implemented by
//! `chronicle-infra`, the generation-provider boundary, the incremental
//! transcript-summarization engine, and the activity/milestone services.
//! It has no infrastructure dependencies of its own -- persistence and
//! HTTP live behind the traits.

pub mod provider;
pub mod repository;
pub mod service;
pub mod summarize;
