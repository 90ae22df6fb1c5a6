use std::collections::HashSet;

use serde::Serialize;

use crate::model::category::{Category, CategoryId};
use crate::ops::slug::slugify;
use crate::ops::tree_ops::CategoryTree;

/// Structured result from `arbor check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A broken tree invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// A child's `parent_id` does not point back at the node listing it
    #[serde(rename = "parent_mismatch")]
    ParentMismatch {
        parent_id: Option<CategoryId>,
        child_id: CategoryId,
        recorded_parent: Option<CategoryId>,
    },
    /// A child list references an id with no node
    #[serde(rename = "dangling_child")]
    DanglingChild {
        parent_id: Option<CategoryId>,
        child_id: CategoryId,
    },
    /// A node cannot be reached from the roots (orphan or part of a cycle)
    #[serde(rename = "unreachable")]
    Unreachable { id: CategoryId },
    /// A node is listed under more than one parent
    #[serde(rename = "multiple_parents")]
    MultipleParents { id: CategoryId },
    /// The same id appears more than once in a stored forest
    #[serde(rename = "duplicate_id")]
    DuplicateId { id: CategoryId },
    /// The stored slug is not derived from the name
    #[serde(rename = "stale_slug")]
    StaleSlug {
        id: CategoryId,
        slug: String,
        expected: String,
    },
}

/// A non-critical issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    #[serde(rename = "empty_name")]
    EmptyName { id: CategoryId },
}

/// Validate every tree invariant. Read-only.
///
/// Checks performed:
/// 1. Every listed child exists and records the listing node as its parent
/// 2. Every node is reached exactly once walking down from the roots
/// 3. Every slug equals `slugify(name)`
pub fn check_tree(tree: &CategoryTree) -> CheckResult {
    let mut result = CheckResult::default();
    let mut visited: HashSet<CategoryId> = HashSet::new();

    let mut stack: Vec<(Option<CategoryId>, CategoryId)> =
        tree.roots().iter().rev().map(|id| (None, *id)).collect();
    while let Some((parent_id, id)) = stack.pop() {
        let node = match tree.get(id) {
            Some(n) => n,
            None => {
                result.errors.push(CheckError::DanglingChild {
                    parent_id,
                    child_id: id,
                });
                continue;
            }
        };
        if !visited.insert(id) {
            result.errors.push(CheckError::MultipleParents { id });
            continue;
        }
        if node.parent_id != parent_id {
            result.errors.push(CheckError::ParentMismatch {
                parent_id,
                child_id: id,
                recorded_parent: node.parent_id,
            });
        }
        let expected = slugify(&node.name);
        if node.slug != expected {
            result.errors.push(CheckError::StaleSlug {
                id,
                slug: node.slug.clone(),
                expected,
            });
        }
        if node.name.trim().is_empty() {
            result.warnings.push(CheckWarning::EmptyName { id });
        }
        stack.extend(node.child_ids.iter().rev().map(|c| (Some(id), *c)));
    }

    for (_, node) in tree.iter_all() {
        if !visited.contains(&node.id) {
            result.errors.push(CheckError::Unreachable { id: node.id });
        }
    }

    result.valid = result.errors.is_empty();
    result
}

/// Validate a nested forest as stored on disk, before it is loaded into a
/// tree (which would silently repair parent links and slugs).
pub fn check_forest(forest: &[Category]) -> CheckResult {
    let mut result = CheckResult::default();
    let mut seen: HashSet<CategoryId> = HashSet::new();
    let mut stack: Vec<(Option<CategoryId>, &Category)> =
        forest.iter().rev().map(|c| (None, c)).collect();
    while let Some((parent_id, category)) = stack.pop() {
        let id = category.id;
        if !seen.insert(id) {
            result.errors.push(CheckError::DuplicateId { id });
        }
        if category.parent_id != parent_id {
            result.errors.push(CheckError::ParentMismatch {
                parent_id,
                child_id: id,
                recorded_parent: category.parent_id,
            });
        }
        let expected = slugify(&category.name);
        if category.slug != expected {
            result.errors.push(CheckError::StaleSlug {
                id,
                slug: category.slug.clone(),
                expected,
            });
        }
        if category.name.trim().is_empty() {
            result.warnings.push(CheckWarning::EmptyName { id });
        }
        stack.extend(category.children.iter().rev().map(|c| (Some(id), c)));
    }
    result.valid = result.errors.is_empty();
    result
}
