//! # Core Module
//!
//! Stateless building blocks shared by the session engine and the workflows.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, molecules and the loaded-structure
//!   records tracked by the registry
//! - **Statistics** ([`stats`]) - Pure derivation of [`stats::MoleculeStats`] from a molecule
//! - **File I/O** ([`io`]) - The parser collaborator contract, a PDB reader and report writers

pub mod io;
pub mod models;
pub mod stats;
