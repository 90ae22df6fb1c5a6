use std::collections::VecDeque;

use crate::engine::drag::{DragController, DropOutcome};
use crate::engine::session::{EditingSession, PendingWrite, TempId};
use crate::engine::view::{ViewNode, ViewRow, build_view, flatten_visible};
use crate::io::backend::{BackendError, CategoryBackend};
use crate::model::category::CategoryId;
use crate::ops::tree_ops::{CategoryTree, TreeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing message (toast / status line)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// The row whose input should receive focus once it is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Draft(TempId),
    Category(CategoryId),
}

/// Events for the presentation layer, drained with [`CategoryBoard::drain_events`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    FocusRequested(FocusTarget),
    Notice(Notice),
}

/// Pending delete confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDialog {
    pub id: CategoryId,
    pub name: String,
    /// Direct subcategories
    pub child_count: usize,
    pub warning: Option<String>,
}

/// Cascade warning for a category with `child_count` direct children
pub fn cascade_warning(child_count: usize) -> Option<String> {
    let noun = match child_count {
        0 => return None,
        1 => "subcategory",
        _ => "subcategories",
    };
    Some(format!(
        "this category has {} {} that will also be removed",
        child_count, noun
    ))
}

/// Composes the tree, the editing session and the drag controller over a
/// persistence backend.
///
/// Local state is updated optimistically; backend failures become
/// [`BoardEvent::Notice`]s and are never rolled back. A [`refetch`] resolves
/// any divergence.
///
/// [`refetch`]: CategoryBoard::refetch
pub struct CategoryBoard<B: CategoryBackend> {
    tree: CategoryTree,
    session: EditingSession,
    drag: DragController,
    delete_dialog: Option<DeleteDialog>,
    backend: B,
    events: VecDeque<BoardEvent>,
}

impl<B: CategoryBackend> CategoryBoard<B> {
    /// Fetch the forest from `backend` and build a board over it.
    pub fn load(mut backend: B) -> Result<Self, BackendError> {
        let forest = backend.fetch_categories()?;
        let tree = CategoryTree::from_forest(forest)?;
        log::info!("loaded {} categories", tree.len());
        Ok(Self::with_tree(tree, backend))
    }

    pub fn with_tree(tree: CategoryTree, backend: B) -> Self {
        CategoryBoard {
            tree,
            session: EditingSession::new(),
            drag: DragController::new(),
            delete_dialog: None,
            backend,
            events: VecDeque::new(),
        }
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    /// For restoring view state (expanded ids). Structural edits should go
    /// through the board so they reach the backend.
    pub fn tree_mut(&mut self) -> &mut CategoryTree {
        &mut self.tree
    }

    pub fn session(&self) -> &EditingSession {
        &self.session
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn delete_dialog(&self) -> Option<&DeleteDialog> {
        self.delete_dialog.as_ref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // -----------------------------------------------------------------------
    // Expand / collapse
    // -----------------------------------------------------------------------

    /// Returns true if the node is now expanded.
    pub fn toggle_expand(&mut self, id: CategoryId) -> bool {
        self.tree.toggle_expanded(id)
    }

    // -----------------------------------------------------------------------
    // Drafts
    // -----------------------------------------------------------------------

    /// Open a draft row under `parent_id` (root when `None`), expanding the
    /// parent and requesting focus for the new row. Unknown parents are
    /// refused.
    pub fn start_add(&mut self, parent_id: Option<CategoryId>) -> Option<TempId> {
        if let Some(pid) = parent_id {
            if !self.tree.contains(pid) {
                log::debug!("start_add under unknown category {}", pid);
                return None;
            }
            self.tree.expand(pid);
        }
        let temp_id = self.session.start_add(parent_id);
        self.events
            .push_back(BoardEvent::FocusRequested(FocusTarget::Draft(temp_id)));
        Some(temp_id)
    }

    pub fn update_draft_name(&mut self, temp_id: TempId, name: impl Into<String>) -> bool {
        self.session.update_draft_name(temp_id, name)
    }

    pub fn cancel_draft(&mut self, temp_id: TempId) {
        self.session.cancel_draft(temp_id);
    }

    /// Persist a draft. Returns the new category id when the backend accepted
    /// it. The draft is gone either way.
    pub fn commit_draft(&mut self, temp_id: TempId) -> Option<CategoryId> {
        let write = self.session.commit_draft(temp_id)?;
        self.apply_write(write)
    }

    // -----------------------------------------------------------------------
    // Inline edit
    // -----------------------------------------------------------------------

    /// Start renaming `id`, cancelling any other edit in progress.
    pub fn start_edit(&mut self, id: CategoryId) -> bool {
        let name = match self.tree.get(id) {
            Some(node) => node.name.clone(),
            None => return false,
        };
        self.session.start_edit(id, &name);
        self.events
            .push_back(BoardEvent::FocusRequested(FocusTarget::Category(id)));
        true
    }

    pub fn update_edit_name(&mut self, name: impl Into<String>) -> bool {
        self.session.update_edit_name(name)
    }

    pub fn cancel_edit(&mut self) {
        self.session.cancel_edit();
    }

    /// Apply the edit slot. Returns true if a rename was dispatched.
    pub fn commit_edit(&mut self) -> bool {
        match self.session.commit_edit() {
            Some(write) => self.apply_write(write).is_some(),
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Visibility
    // -----------------------------------------------------------------------

    /// Flip hidden/active. Returns the new `is_active`, or None for unknown ids.
    pub fn toggle_hidden(&mut self, id: CategoryId) -> Option<bool> {
        let is_active = self.tree.toggle_hidden(id).ok()?;
        if let Err(e) = self.backend.set_category_active(id, is_active) {
            let verb = if is_active { "show" } else { "hide" };
            self.notify(
                NoticeLevel::Error,
                format!("could not {} category {}: {}", verb, id, e),
            );
        }
        Some(is_active)
    }

    // -----------------------------------------------------------------------
    // Drag and drop
    // -----------------------------------------------------------------------

    /// Begin dragging `id`. Refused while that node is being renamed.
    pub fn drag_start(&mut self, id: CategoryId) -> bool {
        if !self.tree.contains(id) || self.session.is_editing(id) {
            return false;
        }
        self.drag.drag_start(id);
        true
    }

    pub fn drag_over(&mut self, id: CategoryId) {
        if self.drag.is_dragging() {
            self.drag.drag_over(id);
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Drop. A successful move is persisted; a refused move leaves the tree
    /// untouched and emits a warning notice.
    pub fn drag_end(&mut self) -> Result<DropOutcome, TreeError> {
        match self.drag.drag_end(&mut self.tree) {
            Ok(DropOutcome::Moved { id, new_parent }) => {
                log::info!("moved category {} under {}", id, new_parent);
                if let Err(e) = self.backend.reparent_category(id, Some(new_parent)) {
                    self.notify(
                        NoticeLevel::Error,
                        format!("could not save move of category {}: {}", id, e),
                    );
                }
                Ok(DropOutcome::Moved { id, new_parent })
            }
            Ok(DropOutcome::Ignored) => Ok(DropOutcome::Ignored),
            Err(e) => {
                self.notify(NoticeLevel::Warning, e.to_string());
                Err(e)
            }
        }
    }

    /// Move `id` to the root level (no drag gesture involved).
    pub fn move_to_root(&mut self, id: CategoryId) -> Result<(), TreeError> {
        self.tree.reparent(id, None)?;
        if let Err(e) = self.backend.reparent_category(id, None) {
            self.notify(
                NoticeLevel::Error,
                format!("could not save move of category {}: {}", id, e),
            );
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    pub fn open_delete_dialog(&mut self, id: CategoryId) -> bool {
        let node = match self.tree.get(id) {
            Some(n) => n,
            None => return false,
        };
        let child_count = node.child_ids.len();
        self.delete_dialog = Some(DeleteDialog {
            id,
            name: node.name.clone(),
            child_count,
            warning: cascade_warning(child_count),
        });
        true
    }

    pub fn cancel_delete(&mut self) {
        self.delete_dialog = None;
    }

    /// Delete the dialog's category and its subtree. Returns the removed ids.
    pub fn confirm_delete(&mut self) -> Vec<CategoryId> {
        let dialog = match self.delete_dialog.take() {
            Some(d) => d,
            None => return Vec::new(),
        };
        if let Err(e) = self.backend.delete_category(dialog.id) {
            self.notify(
                NoticeLevel::Error,
                format!("could not delete \"{}\": {}", dialog.name, e),
            );
        }
        let removed = self.tree.remove(dialog.id).unwrap_or_default();
        log::info!("deleted category {} ({} nodes)", dialog.id, removed.len());
        self.forget(&removed);
        removed
    }

    // -----------------------------------------------------------------------
    // Batch
    // -----------------------------------------------------------------------

    pub fn has_pending_edits(&self) -> bool {
        self.session.has_pending_edits()
    }

    pub fn pending_count(&self) -> usize {
        self.session.pending_count()
    }

    /// Commit every draft and the edit slot. Returns how many writes were
    /// dispatched.
    pub fn commit_all(&mut self) -> usize {
        let writes = self.session.commit_all();
        let count = writes.len();
        for write in writes {
            self.apply_write(write);
        }
        count
    }

    pub fn discard_all(&mut self) {
        self.session.discard_all();
    }

    // -----------------------------------------------------------------------
    // Refetch
    // -----------------------------------------------------------------------

    /// Replace the local forest with the backend's. Expanded ids survive;
    /// drafts and edits pointing at vanished categories are dropped.
    pub fn refetch(&mut self) -> Result<(), BackendError> {
        let forest = self.backend.fetch_categories()?;
        self.tree.replace_forest(forest)?;

        let mut gone: Vec<CategoryId> = self
            .session
            .drafts()
            .filter_map(|d| d.parent_id)
            .chain(self.session.edit_slot().editing_id())
            .chain(self.drag.dragged())
            .chain(self.drag.over())
            .filter(|id| !self.tree.contains(*id))
            .collect();
        if let Some(d) = &self.delete_dialog
            && !self.tree.contains(d.id)
        {
            self.delete_dialog = None;
        }
        gone.dedup();
        self.forget(&gone);
        log::debug!("refetched {} categories", self.tree.len());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // View
    // -----------------------------------------------------------------------

    /// Merged forest of categories and drafts
    pub fn view(&self) -> Vec<ViewNode> {
        build_view(&self.tree, &self.session, &self.drag)
    }

    /// Rows to render, honoring the expanded set
    pub fn visible_rows(&self) -> Vec<ViewRow> {
        flatten_visible(&self.view())
    }

    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        self.events.drain(..).collect()
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn apply_write(&mut self, write: PendingWrite) -> Option<CategoryId> {
        match write {
            PendingWrite::Create { parent_id, name } => {
                match self.backend.create_category(parent_id, &name) {
                    Ok(category) => {
                        let id = category.id;
                        match self.tree.add_child(parent_id, category) {
                            Ok(()) => {
                                log::info!("created category {} \"{}\"", id, name);
                                Some(id)
                            }
                            Err(e) => {
                                self.notify(
                                    NoticeLevel::Warning,
                                    format!("created \"{}\" but could not place it: {}", name, e),
                                );
                                None
                            }
                        }
                    }
                    Err(e) => {
                        self.notify(
                            NoticeLevel::Error,
                            format!("could not create \"{}\": {}", name, e),
                        );
                        None
                    }
                }
            }
            PendingWrite::Rename { id, name } => {
                if self.tree.rename(id, &name).is_err() {
                    log::debug!("rename of vanished category {} skipped", id);
                    return None;
                }
                if let Err(e) = self.backend.update_category(id, &name) {
                    self.notify(
                        NoticeLevel::Error,
                        format!("could not rename to \"{}\": {}", name, e),
                    );
                }
                Some(id)
            }
        }
    }

    fn forget(&mut self, removed: &[CategoryId]) {
        if removed.is_empty() {
            return;
        }
        let dropped = self.session.forget_categories(removed);
        if dropped > 0 {
            log::debug!("dropped {} pending rows under removed categories", dropped);
        }
        if self
            .drag
            .dragged()
            .into_iter()
            .chain(self.drag.over())
            .any(|id| removed.contains(&id))
        {
            self.drag.cancel();
        }
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Info => log::info!("{}", message),
            NoticeLevel::Warning => log::warn!("{}", message),
            NoticeLevel::Error => log::error!("{}", message),
        }
        self.events
            .push_back(BoardEvent::Notice(Notice { level, message }));
    }
}
