//! # molstat Core Library
//!
//! A library for loading molecular structures into an inspection session and deriving
//! summary statistics from their atom records.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture so that the pure data and statistics
//! code never depends on session state.
//!
//! - **[`core`]: The Foundation.** Immutable data models (`Atom`, `Molecule`,
//!   `LoadedStructure`), the pure statistics engine (`compute_stats`), and I/O utilities
//!   (the parser collaborator contract, a PDB reader and CSV report writers).
//!
//! - **[`engine`]: The Session Layer.** The explicitly owned `Session` holding the
//!   structure registry, the single active selection, the viewer display state and the
//!   change-notification bus. Every mutation is synchronous and either fully applied or
//!   rejected.
//!
//! - **[`workflows`]: The Public API.** Orchestrates complete procedures, such as ingesting
//!   a batch of raw files: parsing them concurrently, partitioning successes from failures
//!   and committing the successful subset as one atomic batch.

pub mod core;
pub mod engine;
pub mod workflows;
