use std::fmt;

use indexmap::IndexMap;

use crate::model::category::CategoryId;

/// Session-local id of a draft row. Never collides with a [`CategoryId`]
/// because it is a different type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TempId(pub u64);

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new-{}", self.0)
    }
}

/// A not-yet-persisted category row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftRow {
    pub temp_id: TempId,
    /// Where the category will be created (`None` = root)
    pub parent_id: Option<CategoryId>,
    /// Draft name, may be empty
    pub name: String,
}

/// The single inline-edit slot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditSlot {
    #[default]
    Idle,
    Editing {
        id: CategoryId,
        draft_name: String,
    },
}

impl EditSlot {
    pub fn is_idle(&self) -> bool {
        matches!(self, EditSlot::Idle)
    }

    pub fn editing_id(&self) -> Option<CategoryId> {
        match self {
            EditSlot::Idle => None,
            EditSlot::Editing { id, .. } => Some(*id),
        }
    }
}

/// A write the session hands back to its owner for persisting.
/// Names are already trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingWrite {
    Create {
        parent_id: Option<CategoryId>,
        name: String,
    },
    Rename {
        id: CategoryId,
        name: String,
    },
}

/// Transient editing state: any number of draft rows plus at most one inline
/// edit. Knows nothing about the tree or persistence; commits return
/// [`PendingWrite`]s for the caller to dispatch.
#[derive(Debug, Clone, Default)]
pub struct EditingSession {
    /// Drafts in creation order
    drafts: IndexMap<TempId, DraftRow>,
    slot: EditSlot,
    next_temp: u64,
}

impl EditingSession {
    pub fn new() -> Self {
        Self::default()
    }

    // --- drafts ---

    /// Open a new empty draft under `parent_id`.
    pub fn start_add(&mut self, parent_id: Option<CategoryId>) -> TempId {
        self.next_temp += 1;
        let temp_id = TempId(self.next_temp);
        self.drafts.insert(
            temp_id,
            DraftRow {
                temp_id,
                parent_id,
                name: String::new(),
            },
        );
        log::debug!("draft {} opened under {:?}", temp_id, parent_id);
        temp_id
    }

    /// Returns false if the draft does not exist.
    pub fn update_draft_name(&mut self, temp_id: TempId, name: impl Into<String>) -> bool {
        match self.drafts.get_mut(&temp_id) {
            Some(draft) => {
                draft.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn cancel_draft(&mut self, temp_id: TempId) -> Option<DraftRow> {
        self.drafts.shift_remove(&temp_id)
    }

    /// Remove the draft and return the create request, unless the trimmed
    /// name is empty (then the draft is simply dropped).
    pub fn commit_draft(&mut self, temp_id: TempId) -> Option<PendingWrite> {
        let draft = self.drafts.shift_remove(&temp_id)?;
        let name = draft.name.trim();
        if name.is_empty() {
            log::debug!("draft {} committed empty, discarded", temp_id);
            return None;
        }
        Some(PendingWrite::Create {
            parent_id: draft.parent_id,
            name: name.to_string(),
        })
    }

    pub fn draft(&self, temp_id: TempId) -> Option<&DraftRow> {
        self.drafts.get(&temp_id)
    }

    /// All drafts in creation order
    pub fn drafts(&self) -> impl Iterator<Item = &DraftRow> {
        self.drafts.values()
    }

    /// Drafts targeting `parent_id`, in creation order
    pub fn drafts_under(&self, parent_id: Option<CategoryId>) -> impl Iterator<Item = &DraftRow> {
        self.drafts
            .values()
            .filter(move |d| d.parent_id == parent_id)
    }

    pub fn draft_count(&self) -> usize {
        self.drafts.len()
    }

    // --- edit slot ---

    /// Begin renaming `id`. A different edit already in progress is cancelled
    /// first and its id returned. Restarting the same edit keeps its draft.
    pub fn start_edit(&mut self, id: CategoryId, current_name: &str) -> Option<CategoryId> {
        let previous = self.slot.editing_id();
        if previous == Some(id) {
            return None;
        }
        self.slot = EditSlot::Editing {
            id,
            draft_name: current_name.to_string(),
        };
        if let Some(prev) = previous {
            log::debug!("edit of {} cancelled by edit of {}", prev, id);
        }
        previous
    }

    /// Returns false when no edit is active.
    pub fn update_edit_name(&mut self, name: impl Into<String>) -> bool {
        match &mut self.slot {
            EditSlot::Editing { draft_name, .. } => {
                *draft_name = name.into();
                true
            }
            EditSlot::Idle => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.slot = EditSlot::Idle;
    }

    /// Return to idle and yield the rename request, unless the trimmed name
    /// is empty.
    pub fn commit_edit(&mut self) -> Option<PendingWrite> {
        match std::mem::take(&mut self.slot) {
            EditSlot::Idle => None,
            EditSlot::Editing { id, draft_name } => {
                let name = draft_name.trim();
                if name.is_empty() {
                    None
                } else {
                    Some(PendingWrite::Rename {
                        id,
                        name: name.to_string(),
                    })
                }
            }
        }
    }

    pub fn edit_slot(&self) -> &EditSlot {
        &self.slot
    }

    pub fn is_editing(&self, id: CategoryId) -> bool {
        self.slot.editing_id() == Some(id)
    }

    // --- batch ---

    pub fn has_pending_edits(&self) -> bool {
        !self.drafts.is_empty() || !self.slot.is_idle()
    }

    /// Number of drafts plus the edit slot when active
    pub fn pending_count(&self) -> usize {
        self.drafts.len() + usize::from(!self.slot.is_idle())
    }

    /// Commit every draft (creation order) and the edit slot. The session is
    /// empty and idle afterwards.
    pub fn commit_all(&mut self) -> Vec<PendingWrite> {
        let temp_ids: Vec<TempId> = self.drafts.keys().copied().collect();
        let mut writes: Vec<PendingWrite> = temp_ids
            .into_iter()
            .filter_map(|t| self.commit_draft(t))
            .collect();
        writes.extend(self.commit_edit());
        writes
    }

    /// Drop every draft and the edit slot.
    pub fn discard_all(&mut self) {
        let temp_ids: Vec<TempId> = self.drafts.keys().copied().collect();
        for temp_id in temp_ids {
            self.cancel_draft(temp_id);
        }
        self.cancel_edit();
    }

    /// Forget rows that point at categories which no longer exist: drafts
    /// under a removed parent are dropped, an edit of a removed node is
    /// cancelled. Returns how many rows were dropped.
    pub fn forget_categories(&mut self, removed: &[CategoryId]) -> usize {
        let before = self.pending_count();
        self.drafts
            .retain(|_, d| !d.parent_id.is_some_and(|p| removed.contains(&p)));
        if self
            .slot
            .editing_id()
            .is_some_and(|id| removed.contains(&id))
        {
            self.slot = EditSlot::Idle;
        }
        before - self.pending_count()
    }
}
