//! # Core Models Module
//!
//! Data structures produced by the parser collaborator and tracked by the registry.
//!
//! ## Key Components
//!
//! - [`atom`] - One parsed atomic record
//! - [`molecule`] - The immutable, ordered atom sequence of one parsed input
//! - [`structure`] - Raw input files, uploaded-file entries and loaded structures
//!
//! ## Usage
//!
//! ```ignore
//! use molstat::core::models::{atom::Atom, molecule::Molecule};
//!
//! let molecule = Molecule::new(vec![
//!     Atom::new("C", "ALA", 1, "A"),
//!     Atom::new("O", "HOH", 101, "A"),
//! ]);
//! assert_eq!(molecule.len(), 2);
//! ```

pub mod atom;
pub mod molecule;
pub mod structure;
