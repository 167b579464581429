use super::config::SessionConfig;
use super::error::SessionError;
use super::events::{EventBus, SessionEvent, Subscriber, SubscriptionId};
use super::registry::StructureRegistry;
use super::selection::{Collection, Selection};
use super::viewer::{ViewerCoordinator, ViewerState, ViewerStateUpdate};
use crate::core::models::molecule::Molecule;
use crate::core::models::structure::{LoadedStructure, StructureSource, UploadedFileEntry};
use crate::core::stats::{MoleculeStats, compute_stats};
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info};

/// One row of the loaded-structure listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureSummary {
    pub id: String,
    pub name: String,
    pub source: StructureSource,
    /// `None` while a job-backed structure has no geometry.
    pub atom_count: Option<usize>,
}

/// Statistics for one structure that has a molecule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureStats {
    pub id: String,
    pub name: String,
    pub source: StructureSource,
    pub stats: MoleculeStats,
}

/// What the renderer needs to draw the current scene.
#[derive(Debug, Clone, Copy)]
pub struct RenderSnapshot<'a> {
    pub structures: &'a [LoadedStructure],
    pub viewer: &'a ViewerState,
}

/// The indices a committed ingestion batch occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub structures: Range<usize>,
    pub files: Range<usize>,
    /// Whether the commit set the selection to the first uploaded file.
    pub auto_selected: bool,
}

/// An explicitly owned inspection session.
///
/// A session owns the structure registry, the viewer display state and the change
/// notification bus. Every successful mutation emits one or more [`SessionEvent`]s after it
/// has been applied; rejected mutations emit nothing and change nothing.
#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    registry: StructureRegistry,
    viewer: ViewerCoordinator,
    events: EventBus,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let viewer = ViewerCoordinator::new(config.initial_viewer.clone());
        Self {
            config,
            registry: StructureRegistry::new(),
            viewer,
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &StructureRegistry {
        &self.registry
    }

    pub fn structures(&self) -> &[LoadedStructure] {
        self.registry.structures()
    }

    pub fn files(&self) -> &[UploadedFileEntry] {
        self.registry.files()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.registry.selection()
    }

    pub fn viewer_state(&self) -> &ViewerState {
        self.viewer.state()
    }

    pub fn snapshot(&self) -> RenderSnapshot<'_> {
        RenderSnapshot {
            structures: self.registry.structures(),
            viewer: self.viewer.state(),
        }
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Appends a batch of structures atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DuplicateId`] if any id is already loaded or repeats within
    /// the batch.
    pub fn add_loaded_structures(
        &mut self,
        batch: Vec<LoadedStructure>,
    ) -> Result<Range<usize>, SessionError> {
        let range = self.registry.add_loaded_structures(batch)?;
        debug!(count = range.len(), "Structures added.");
        self.events.emit(&SessionEvent::StructuresAdded {
            range: range.clone(),
        });
        Ok(range)
    }

    pub fn add_files(&mut self, batch: Vec<UploadedFileEntry>) -> Range<usize> {
        let range = self.registry.add_files(batch);
        debug!(count = range.len(), "Files added.");
        self.events.emit(&SessionEvent::FilesAdded {
            range: range.clone(),
        });
        range
    }

    /// Registers a job-backed structure whose geometry is not available yet.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DuplicateId`] if `id` is already loaded.
    pub fn add_job_structure(&mut self, id: &str, name: &str) -> Result<usize, SessionError> {
        let range = self.add_loaded_structures(vec![LoadedStructure::pending_job(id, name)])?;
        Ok(range.start)
    }

    /// Attaches geometry to the structure with `id`, typically a job that finished.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownStructure`] if no structure has this id.
    pub fn resolve_structure(
        &mut self,
        id: &str,
        molecule: Molecule,
        raw_data: Option<String>,
    ) -> Result<usize, SessionError> {
        let index = self
            .registry
            .resolve_structure(id, Arc::new(molecule), raw_data)?;
        info!(id, index, "Structure geometry resolved.");
        self.events.emit(&SessionEvent::StructureResolved { index });
        Ok(index)
    }

    /// Replaces the parsed molecule of the uploaded file at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::IndexOutOfRange`] if `index` is not a valid file position.
    pub fn update_file(
        &mut self,
        index: usize,
        molecule: Option<Molecule>,
    ) -> Result<(), SessionError> {
        self.registry.update_file(index, molecule.map(Arc::new))?;
        self.events.emit(&SessionEvent::FileUpdated { index });
        Ok(())
    }

    /// Removes the structure at `index` and re-clamps the selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::IndexOutOfRange`] if `index` is not a valid position.
    pub fn delete_structure(&mut self, index: usize) -> Result<LoadedStructure, SessionError> {
        let before = self.registry.selection();
        let removed = self.registry.delete_structure(index)?;
        debug!(id = %removed.id, index, "Structure removed.");
        self.events.emit(&SessionEvent::StructureRemoved {
            index,
            id: removed.id.clone(),
        });
        self.emit_selection_if_changed(before);
        Ok(removed)
    }

    /// Removes the uploaded file at `index` and re-clamps the selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::IndexOutOfRange`] if `index` is not a valid position.
    pub fn delete_file(&mut self, index: usize) -> Result<UploadedFileEntry, SessionError> {
        let before = self.registry.selection();
        let removed = self.registry.delete_file(index)?;
        debug!(name = removed.name(), index, "File removed.");
        self.events.emit(&SessionEvent::FileRemoved { index });
        self.emit_selection_if_changed(before);
        Ok(removed)
    }

    /// Sets or clears the active selection.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::IndexOutOfRange`] unless `index` is `None` or in bounds.
    pub fn set_selected_index(
        &mut self,
        collection: Collection,
        index: Option<usize>,
    ) -> Result<(), SessionError> {
        let before = self.registry.selection();
        self.registry.set_selected_index(collection, index)?;
        self.emit_selection_if_changed(before);
        Ok(())
    }

    /// Merges a partial update into the viewer state.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfiguration`] if any field is out of its domain; the
    /// viewer state is left untouched in that case.
    pub fn update_viewer_state(
        &mut self,
        update: &ViewerStateUpdate,
    ) -> Result<&ViewerState, SessionError> {
        if self.viewer.apply(update)? {
            debug!(state = ?self.viewer.state(), "Viewer state updated.");
            self.events.emit(&SessionEvent::ViewerStateChanged {
                state: self.viewer.state().clone(),
            });
        }
        Ok(self.viewer.state())
    }

    /// Commits one ingestion batch: structures and files together, or neither.
    ///
    /// If nothing is selected afterwards, the first uploaded file becomes the selection.
    pub(crate) fn commit_ingested(
        &mut self,
        structures: Vec<LoadedStructure>,
        files: Vec<UploadedFileEntry>,
    ) -> Result<CommitSummary, SessionError> {
        let structures = self.add_loaded_structures(structures)?;
        let files = self.add_files(files);

        let auto_selected = self.registry.selection().is_none() && !self.files().is_empty();
        if auto_selected {
            self.set_selected_index(Collection::Files, Some(0))?;
        }

        Ok(CommitSummary {
            structures,
            files,
            auto_selected,
        })
    }

    /// Lists every loaded structure in display order.
    pub fn summaries(&self) -> Vec<StructureSummary> {
        self.structures()
            .iter()
            .map(|s| StructureSummary {
                id: s.id.clone(),
                name: s.name.clone(),
                source: s.source,
                atom_count: s.atom_count(),
            })
            .collect()
    }

    /// Computes statistics for every structure that has a molecule.
    ///
    /// Unresolved job-backed structures are skipped.
    pub fn structure_stats(&self) -> Vec<StructureStats> {
        self.structures()
            .iter()
            .filter_map(|s| {
                s.molecule.as_ref().map(|molecule| StructureStats {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    source: s.source,
                    stats: compute_stats(molecule),
                })
            })
            .collect()
    }

    /// Computes statistics for the molecule behind the active selection, if any.
    pub fn selected_stats(&self) -> Option<MoleculeStats> {
        let selection = self.registry.selection()?;
        let molecule = match selection.collection {
            Collection::Files => self.files().get(selection.index)?.molecule.as_ref(),
            Collection::Structures => self.structures().get(selection.index)?.molecule.as_ref(),
        }?;
        Some(compute_stats(molecule))
    }

    fn emit_selection_if_changed(&self, before: Option<Selection>) {
        let after = self.registry.selection();
        if after != before {
            self.events
                .emit(&SessionEvent::SelectionChanged { selection: after });
        }
    }
}
