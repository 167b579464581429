//! # Workflows Module
//!
//! High-level procedures that tie the `core` and `engine` layers together.
//!
//! ## Architecture
//!
//! - **Ingestion Workflow** ([`ingest`]) - Concurrent parsing of a batch of raw files,
//!   partitioning of successes and failures, and one atomic commit of the successful subset
//!   into a session.

pub mod ingest;
