use crate::model::category::{Category, CategoryId};
use crate::ops::tree_ops::{CategoryTree, TreeError};

/// Error type for persistence calls
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("category {0} does not exist on the server")]
    NotFound(CategoryId),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid category data: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<TreeError> for BackendError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::NotFound(id) | TreeError::ParentNotFound(id) => BackendError::NotFound(id),
            other => BackendError::Rejected(other.to_string()),
        }
    }
}

/// The persistence collaborator behind a category board.
///
/// The board mutates its local tree optimistically and only reports failures
/// from these calls; it never rolls back.
pub trait CategoryBackend {
    /// Full forest, used for the initial load and for refetches
    fn fetch_categories(&mut self) -> Result<Vec<Category>, BackendError>;

    /// Create a category and return it with its assigned id
    fn create_category(
        &mut self,
        parent_id: Option<CategoryId>,
        name: &str,
    ) -> Result<Category, BackendError>;

    fn update_category(&mut self, id: CategoryId, name: &str) -> Result<Category, BackendError>;

    fn set_category_active(&mut self, id: CategoryId, is_active: bool) -> Result<(), BackendError>;

    /// Delete a category and its whole subtree
    fn delete_category(&mut self, id: CategoryId) -> Result<(), BackendError>;

    fn reparent_category(
        &mut self,
        id: CategoryId,
        new_parent_id: Option<CategoryId>,
    ) -> Result<(), BackendError>;
}

impl<B: CategoryBackend + ?Sized> CategoryBackend for Box<B> {
    fn fetch_categories(&mut self) -> Result<Vec<Category>, BackendError> {
        (**self).fetch_categories()
    }

    fn create_category(
        &mut self,
        parent_id: Option<CategoryId>,
        name: &str,
    ) -> Result<Category, BackendError> {
        (**self).create_category(parent_id, name)
    }

    fn update_category(&mut self, id: CategoryId, name: &str) -> Result<Category, BackendError> {
        (**self).update_category(id, name)
    }

    fn set_category_active(&mut self, id: CategoryId, is_active: bool) -> Result<(), BackendError> {
        (**self).set_category_active(id, is_active)
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<(), BackendError> {
        (**self).delete_category(id)
    }

    fn reparent_category(
        &mut self,
        id: CategoryId,
        new_parent_id: Option<CategoryId>,
    ) -> Result<(), BackendError> {
        (**self).reparent_category(id, new_parent_id)
    }
}

/// A call received by a [`MemoryBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Fetch,
    Create {
        parent_id: Option<CategoryId>,
        name: String,
    },
    Update {
        id: CategoryId,
        name: String,
    },
    SetActive {
        id: CategoryId,
        is_active: bool,
    },
    Delete {
        id: CategoryId,
    },
    Reparent {
        id: CategoryId,
        new_parent_id: Option<CategoryId>,
    },
}

/// In-memory server: keeps its own copy of the forest, records every call,
/// and can be told to fail the next request.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    server: CategoryTree,
    calls: Vec<BackendCall>,
    fail_next: Option<String>,
    /// Lowest id the next create may use; never moves backwards
    next_id: u64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_forest(forest: Vec<Category>) -> Result<Self, TreeError> {
        Ok(MemoryBackend {
            server: CategoryTree::from_forest(forest)?,
            ..Default::default()
        })
    }

    /// Make the next call fail with `BackendError::Rejected(reason)`.
    pub fn fail_next(&mut self, reason: impl Into<String>) {
        self.fail_next = Some(reason.into());
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// The server-side copy of the forest
    pub fn server(&self) -> &CategoryTree {
        &self.server
    }

    fn record(&mut self, call: BackendCall) -> Result<(), BackendError> {
        self.calls.push(call);
        match self.fail_next.take() {
            Some(reason) => Err(BackendError::Rejected(reason)),
            None => Ok(()),
        }
    }

    fn allocate_id(&mut self) -> CategoryId {
        let after_max = self.server.max_id().map_or(1, |id| id.0 + 1);
        let id = self.next_id.max(after_max);
        self.next_id = id + 1;
        CategoryId(id)
    }
}

impl CategoryBackend for MemoryBackend {
    fn fetch_categories(&mut self) -> Result<Vec<Category>, BackendError> {
        self.record(BackendCall::Fetch)?;
        Ok(self.server.to_forest())
    }

    fn create_category(
        &mut self,
        parent_id: Option<CategoryId>,
        name: &str,
    ) -> Result<Category, BackendError> {
        self.record(BackendCall::Create {
            parent_id,
            name: name.to_string(),
        })?;
        let category = Category::new(self.allocate_id(), name, parent_id);
        self.server.add_child(parent_id, category.clone())?;
        Ok(category)
    }

    fn update_category(&mut self, id: CategoryId, name: &str) -> Result<Category, BackendError> {
        self.record(BackendCall::Update {
            id,
            name: name.to_string(),
        })?;
        self.server.rename(id, name)?;
        self.server.find_by_id(id).ok_or(BackendError::NotFound(id))
    }

    fn set_category_active(&mut self, id: CategoryId, is_active: bool) -> Result<(), BackendError> {
        self.record(BackendCall::SetActive { id, is_active })?;
        let current = self.server.get(id).ok_or(BackendError::NotFound(id))?;
        if current.is_active != is_active {
            self.server.toggle_hidden(id)?;
        }
        Ok(())
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<(), BackendError> {
        self.record(BackendCall::Delete { id })?;
        self.server.remove(id)?;
        Ok(())
    }

    fn reparent_category(
        &mut self,
        id: CategoryId,
        new_parent_id: Option<CategoryId>,
    ) -> Result<(), BackendError> {
        self.record(BackendCall::Reparent { id, new_parent_id })?;
        self.server.reparent(id, new_parent_id)?;
        Ok(())
    }
}
