use std::fmt;

/// Represents one atomic record as produced by a structure parser.
///
/// Atoms carry only the identity needed for composition statistics: the element symbol
/// and the residue and chain the atom belongs to. No geometry is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    /// The element symbol exactly as reported by the parser (e.g., "C", "FE").
    pub element: String,
    /// The residue code this atom belongs to (e.g., "ALA", "HOH", "NA").
    pub residue: String,
    /// The residue sequence number within its chain.
    pub residue_id: isize,
    /// The chain identifier (e.g., "A").
    pub chain: String,
}

impl Atom {
    /// Creates a new `Atom` from its element, residue code, residue number and chain.
    ///
    /// # Arguments
    ///
    /// * `element` - The element symbol.
    /// * `residue` - The residue code.
    /// * `residue_id` - The residue sequence number within the chain.
    /// * `chain` - The chain identifier.
    pub fn new(element: &str, residue: &str, residue_id: isize, chain: &str) -> Self {
        Self {
            element: element.to_string(),
            residue: residue.to_string(),
            residue_id,
            chain: chain.to_string(),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{}:{}",
            self.element, self.residue, self.residue_id, self.chain
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_stores_all_fields() {
        let atom = Atom::new("FE", "HEM", 201, "B");

        assert_eq!(atom.element, "FE");
        assert_eq!(atom.residue, "HEM");
        assert_eq!(atom.residue_id, 201);
        assert_eq!(atom.chain, "B");
    }

    #[test]
    fn atom_equality_and_clone_works() {
        let atom1 = Atom::new("N", "GLY", 3, "A");
        let atom2 = atom1.clone();
        assert_eq!(atom1, atom2);
        assert_ne!(atom1, Atom::new("N", "GLY", 4, "A"));
    }

    #[test]
    fn display_includes_residue_and_chain() {
        let atom = Atom::new("C", "ALA", 12, "A");
        assert_eq!(atom.to_string(), "C ALA12:A");
    }
}
