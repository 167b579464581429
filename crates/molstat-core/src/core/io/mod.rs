//! Provides input/output functionality for molecular structures.
//!
//! This module defines the parser collaborator contract used by the ingestion workflow, a
//! fixed-column PDB reader that serves as the default parser, and CSV writers for derived
//! statistics.

pub mod error;
pub mod pdb;
pub mod report;
pub mod traits;
