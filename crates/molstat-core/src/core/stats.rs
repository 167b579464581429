//! Derivation of aggregate composition statistics from a molecule's atom records.
//!
//! Everything here is a pure function of [`Molecule::atoms`]: the same molecule always
//! yields an identical [`MoleculeStats`], and no statistic is ever stored on the molecule
//! itself.

use crate::core::models::molecule::Molecule;
use phf::{Set, phf_set};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

static WATER_RESIDUE_CODES: Set<&'static str> = phf_set! {
    "HOH", "WAT",
};

const MAX_ION_CODE_LENGTH: usize = 2;

/// Coarse classification of a residue code used for the water and ion counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueClass {
    Water,
    Ion,
    Other,
}

/// Classifies a residue code as water, ion, or neither.
///
/// Water is an exact, case-sensitive match against `HOH` and `WAT` only. Anything else
/// counts as an ion when the code is at most two characters long and contains no lowercase
/// letter. The ion rule is a heuristic for monatomic-ion codes such as `NA`, `CL` or `ZN`;
/// it will also accept two-letter ligand abbreviations and the empty code.
pub fn classify_residue(code: &str) -> ResidueClass {
    if WATER_RESIDUE_CODES.contains(code) {
        ResidueClass::Water
    } else if code.chars().count() <= MAX_ION_CODE_LENGTH
        && !code.chars().any(char::is_lowercase)
    {
        ResidueClass::Ion
    } else {
        ResidueClass::Other
    }
}

/// Per-chain breakdown of a molecule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainInfo {
    pub chain_id: String,
    /// Number of distinct residue sequence numbers seen in this chain.
    pub residue_count: usize,
    /// Number of atoms tagged with this chain.
    pub atom_count: usize,
}

impl ChainInfo {
    /// Share of the molecule's atoms that belong to this chain, in percent.
    ///
    /// Returns `0.0` when `total_atoms` is zero.
    pub fn share_percent(&self, total_atoms: usize) -> f64 {
        if total_atoms == 0 {
            return 0.0;
        }
        self.atom_count as f64 / total_atoms as f64 * 100.0
    }
}

/// Aggregate statistics derived from a molecule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoleculeStats {
    pub total_atoms: usize,
    /// Distinct element symbols, sorted ascending.
    pub unique_elements: Vec<String>,
    /// Atom count per residue code.
    pub residue_counts: BTreeMap<String, usize>,
    /// Chains sorted ascending by id, see [`collate_chain_ids`].
    pub chain_info: Vec<ChainInfo>,
    /// Number of atoms in water residues.
    pub water_count: usize,
    /// Number of atoms in residues classified as ions.
    pub ion_count: usize,
}

#[derive(Default)]
struct ChainAccumulator {
    residue_ids: HashSet<isize>,
    atoms: usize,
}

/// Orders chain ids the way a root-locale collation orders Latin identifiers.
///
/// Ids compare case-insensitively first; on a tie the first differing character decides,
/// with lowercase before uppercase. `["B", "a", "A", "b"]` sorts as `["a", "A", "b", "B"]`.
pub fn collate_chain_ids(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a
        .cmp(folded_b)
        .then_with(|| {
            a.chars()
                .zip(b.chars())
                .find(|(x, y)| x != y)
                .map_or(Ordering::Equal, |(x, y)| case_rank(x).cmp(&case_rank(y)))
        })
        .then_with(|| a.cmp(b))
}

fn case_rank(c: char) -> u8 {
    if c.is_uppercase() { 1 } else { 0 }
}

/// Computes [`MoleculeStats`] for a molecule in a single pass over its atoms.
///
/// An empty molecule yields all-zero statistics.
pub fn compute_stats(molecule: &Molecule) -> MoleculeStats {
    let atoms = molecule.atoms();

    let mut elements: BTreeSet<&str> = BTreeSet::new();
    let mut residue_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut chains: HashMap<&str, ChainAccumulator> = HashMap::new();
    let mut water_count = 0;
    let mut ion_count = 0;

    for atom in atoms {
        elements.insert(atom.element.as_str());

        *residue_counts.entry(atom.residue.clone()).or_insert(0) += 1;

        let chain = chains.entry(atom.chain.as_str()).or_default();
        chain.residue_ids.insert(atom.residue_id);
        chain.atoms += 1;

        match classify_residue(&atom.residue) {
            ResidueClass::Water => water_count += 1,
            ResidueClass::Ion => ion_count += 1,
            ResidueClass::Other => {}
        }
    }

    let mut chain_info: Vec<ChainInfo> = chains
        .into_iter()
        .map(|(chain_id, acc)| ChainInfo {
            chain_id: chain_id.to_string(),
            residue_count: acc.residue_ids.len(),
            atom_count: acc.atoms,
        })
        .collect();
    chain_info.sort_by(|a, b| collate_chain_ids(&a.chain_id, &b.chain_id));

    MoleculeStats {
        total_atoms: atoms.len(),
        unique_elements: elements.into_iter().map(str::to_string).collect(),
        residue_counts,
        chain_info,
        water_count,
        ion_count,
    }
}
