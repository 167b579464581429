use super::error::SessionError;
use super::selection::{Collection, Selection};
use crate::core::models::molecule::Molecule;
use crate::core::models::structure::{LoadedStructure, UploadedFileEntry};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;

/// The ordered collections of loaded structures and uploaded files, plus the single active
/// selection over them.
///
/// The registry guarantees that structure ids are unique and that the selection never
/// refers past the end of its collection. Operations that fail leave it unchanged.
#[derive(Debug, Clone, Default)]
pub struct StructureRegistry {
    /// Loaded structures in display order.
    structures: Vec<LoadedStructure>,
    /// Uploaded files in upload order.
    files: Vec<UploadedFileEntry>,
    /// The active selection, if any.
    selection: Option<Selection>,
}

impl StructureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn structures(&self) -> &[LoadedStructure] {
        &self.structures
    }

    pub fn files(&self) -> &[UploadedFileEntry] {
        &self.files
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Files => self.files.len(),
            Collection::Structures => self.structures.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty() && self.files.is_empty()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Returns the selected index if the active selection is in `collection`.
    pub fn selected_index(&self, collection: Collection) -> Option<usize> {
        self.selection
            .filter(|s| s.collection == collection)
            .map(|s| s.index)
    }

    pub fn structure(&self, id: &str) -> Option<&LoadedStructure> {
        self.structures.iter().find(|s| s.id == id)
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.structures.iter().position(|s| s.id == id)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.position_of(id).is_some()
    }

    /// Appends a batch of structures atomically.
    ///
    /// # Return
    ///
    /// The index range the batch now occupies.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DuplicateId`] for the first id that is already loaded or that
    /// repeats within the batch; nothing is appended in that case.
    pub fn add_loaded_structures(
        &mut self,
        batch: Vec<LoadedStructure>,
    ) -> Result<Range<usize>, SessionError> {
        let mut incoming: HashSet<&str> = HashSet::with_capacity(batch.len());
        for structure in &batch {
            if self.contains_id(&structure.id) || !incoming.insert(structure.id.as_str()) {
                return Err(SessionError::DuplicateId {
                    id: structure.id.clone(),
                });
            }
        }

        let start = self.structures.len();
        self.structures.extend(batch);
        Ok(start..self.structures.len())
    }

    /// Appends a batch of uploaded files.
    ///
    /// # Return
    ///
    /// The index range the batch now occupies.
    pub fn add_files(&mut self, batch: Vec<UploadedFileEntry>) -> Range<usize> {
        let start = self.files.len();
        self.files.extend(batch);
        start..self.files.len()
    }

    /// Removes the structure at `index`, re-clamping the selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::IndexOutOfRange`] if `index` is not a valid position.
    pub fn delete_structure(&mut self, index: usize) -> Result<LoadedStructure, SessionError> {
        self.check_bounds(Collection::Structures, index)?;
        let removed = self.structures.remove(index);
        self.reclamp_selection(Collection::Structures, index);
        Ok(removed)
    }

    /// Removes the uploaded file at `index`, re-clamping the selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::IndexOutOfRange`] if `index` is not a valid position.
    pub fn delete_file(&mut self, index: usize) -> Result<UploadedFileEntry, SessionError> {
        self.check_bounds(Collection::Files, index)?;
        let removed = self.files.remove(index);
        self.reclamp_selection(Collection::Files, index);
        Ok(removed)
    }

    /// Sets or clears the active selection.
    ///
    /// Passing `None` clears the selection regardless of which collection it was in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::IndexOutOfRange`] unless `index` is `None` or within the
    /// bounds of `collection`. Out-of-range indices are never clamped.
    pub fn set_selected_index(
        &mut self,
        collection: Collection,
        index: Option<usize>,
    ) -> Result<(), SessionError> {
        match index {
            None => self.selection = None,
            Some(index) => {
                self.check_bounds(collection, index)?;
                self.selection = Some(Selection::new(collection, index));
            }
        }
        Ok(())
    }

    /// Replaces the molecule (and raw payload) of the structure with `id`.
    ///
    /// The previous molecule is not modified; the entry simply points at the new one.
    ///
    /// # Return
    ///
    /// The index of the updated structure.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownStructure`] if no structure has this id.
    pub fn resolve_structure(
        &mut self,
        id: &str,
        molecule: Arc<Molecule>,
        raw_data: Option<String>,
    ) -> Result<usize, SessionError> {
        let index = self
            .position_of(id)
            .ok_or_else(|| SessionError::UnknownStructure { id: id.to_string() })?;
        let structure = &mut self.structures[index];
        structure.molecule = Some(molecule);
        if raw_data.is_some() {
            structure.raw_data = raw_data;
        }
        Ok(index)
    }

    /// Replaces the parsed molecule of the uploaded file at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::IndexOutOfRange`] if `index` is not a valid position.
    pub fn update_file(
        &mut self,
        index: usize,
        molecule: Option<Arc<Molecule>>,
    ) -> Result<(), SessionError> {
        self.check_bounds(Collection::Files, index)?;
        self.files[index].molecule = molecule;
        Ok(())
    }

    fn check_bounds(&self, collection: Collection, index: usize) -> Result<(), SessionError> {
        let len = self.len(collection);
        if index >= len {
            return Err(SessionError::IndexOutOfRange {
                collection,
                index,
                len,
            });
        }
        Ok(())
    }

    fn reclamp_selection(&mut self, collection: Collection, removed: usize) {
        self.selection = self
            .selection
            .and_then(|s| s.after_removal(collection, removed));
    }
}
