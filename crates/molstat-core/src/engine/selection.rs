use std::fmt;

/// The two collections a selection can index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Uploaded files paired with their parsed molecule.
    Files,
    /// Loaded structures, from files and from jobs.
    Structures,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Collection::Files => "file collection",
                Collection::Structures => "structure collection",
            }
        )
    }
}

/// The single active selection: an index into one of the collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub collection: Collection,
    pub index: usize,
}

impl Selection {
    pub fn new(collection: Collection, index: usize) -> Self {
        Self { collection, index }
    }

    /// Re-clamps the selection after the entry at `removed` was deleted from `collection`.
    ///
    /// Deleting the selected entry clears the selection. Deleting an entry below it shifts
    /// the selection down by one so it keeps referring to the same logical entry. Deletions
    /// above it, or in the other collection, leave it untouched.
    pub fn after_removal(self, collection: Collection, removed: usize) -> Option<Selection> {
        if self.collection != collection {
            return Some(self);
        }
        match self.index.cmp(&removed) {
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(Selection::new(collection, self.index - 1)),
            std::cmp::Ordering::Less => Some(self),
        }
    }
}
