use std::collections::HashSet;

use indexmap::IndexMap;

use crate::model::category::{Category, CategoryId, CategoryNode};
use crate::ops::slug::slugify;

/// Error type for tree operations. A returned error always means the tree was
/// left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("category not found: {0}")]
    NotFound(CategoryId),
    #[error("parent category not found: {0}")]
    ParentNotFound(CategoryId),
    #[error("duplicate category id: {0}")]
    DuplicateId(CategoryId),
    #[error("cannot move category {dragged} into its own subtree ({target})")]
    CycleRejected {
        dragged: CategoryId,
        target: CategoryId,
    },
}

/// The canonical category forest plus the set of expanded node ids.
///
/// Nodes live in a flat arena keyed by id; parent/child links are ids. The
/// nested [`Category`] shape is only produced at the edges ([`to_forest`],
/// [`find_by_id`]).
///
/// [`to_forest`]: CategoryTree::to_forest
/// [`find_by_id`]: CategoryTree::find_by_id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    nodes: IndexMap<CategoryId, CategoryNode>,
    roots: Vec<CategoryId>,
    expanded: HashSet<CategoryId>,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from nested categories. Parent links and slugs are taken
    /// from the structure and the names, not from the stored fields.
    pub fn from_forest(forest: Vec<Category>) -> Result<Self, TreeError> {
        let mut tree = CategoryTree::new();
        for category in forest {
            tree.insert_checked(None, category)?;
        }
        Ok(tree)
    }

    /// Replace every node with `forest`, keeping the expanded set.
    pub fn replace_forest(&mut self, forest: Vec<Category>) -> Result<(), TreeError> {
        let mut next = CategoryTree::from_forest(forest)?;
        next.expanded = std::mem::take(&mut self.expanded);
        *self = next;
        Ok(())
    }

    /// Export the nested form, roots in order.
    pub fn to_forest(&self) -> Vec<Category> {
        self.roots
            .iter()
            .filter_map(|id| self.build_category(*id))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn roots(&self) -> &[CategoryId] {
        &self.roots
    }

    /// Arena record for `id`
    pub fn get(&self, id: CategoryId) -> Option<&CategoryNode> {
        self.nodes.get(&id)
    }

    /// Nested copy of the subtree rooted at `id`
    pub fn find_by_id(&self, id: CategoryId) -> Option<Category> {
        self.build_category(id)
    }

    /// Children of `parent`, or the roots when `parent` is `None`.
    /// Unknown parents have no children.
    pub fn children_of(&self, parent: Option<CategoryId>) -> &[CategoryId] {
        match parent {
            None => &self.roots,
            Some(pid) => self
                .nodes
                .get(&pid)
                .map_or(&[][..], |n| n.child_ids.as_slice()),
        }
    }

    /// Every arena record, in insertion order (not tree order).
    pub fn iter_all(&self) -> impl Iterator<Item = (&CategoryId, &CategoryNode)> {
        self.nodes.iter()
    }

    /// All nodes in depth-first pre-order with their depth (0 = root).
    pub fn iter_depth_first(&self) -> Vec<(usize, &CategoryNode)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, CategoryId)> =
            self.roots.iter().rev().map(|id| (0, *id)).collect();
        while let Some((depth, id)) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                out.push((depth, node));
                stack.extend(node.child_ids.iter().rev().map(|c| (depth + 1, *c)));
            }
        }
        out
    }

    /// The node and all of its descendants, pre-order. Empty for unknown ids.
    pub fn subtree_ids(&self, id: CategoryId) -> Vec<CategoryId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                out.push(current);
                stack.extend(node.child_ids.iter().rev().copied());
            }
        }
        out
    }

    /// Number of descendants of `id` (excluding itself)
    pub fn descendant_count(&self, id: CategoryId) -> usize {
        self.subtree_ids(id).len().saturating_sub(1)
    }

    /// True if `candidate` sits somewhere below `ancestor`.
    pub fn is_descendant_of(&self, candidate: CategoryId, ancestor: CategoryId) -> bool {
        let mut current = self.nodes.get(&candidate).and_then(|n| n.parent_id);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                // corrupted parent chain
                return false;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent_id);
        }
        false
    }

    /// Depth of `id` (0 = root), None if unknown
    pub fn depth_of(&self, id: CategoryId) -> Option<usize> {
        let mut node = self.nodes.get(&id)?;
        let mut depth = 0;
        while let Some(pid) = node.parent_id {
            node = self.nodes.get(&pid)?;
            depth += 1;
            if depth > self.nodes.len() {
                return None;
            }
        }
        Some(depth)
    }

    /// Largest id in the tree
    pub fn max_id(&self) -> Option<CategoryId> {
        self.nodes.keys().max().copied()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Append `category` (with any children it carries) under `parent_id`, or
    /// at the end of the roots when `parent_id` is `None`. The parent is
    /// auto-expanded.
    pub fn add_child(
        &mut self,
        parent_id: Option<CategoryId>,
        category: Category,
    ) -> Result<(), TreeError> {
        if let Some(pid) = parent_id
            && !self.nodes.contains_key(&pid)
        {
            return Err(TreeError::ParentNotFound(pid));
        }
        self.insert_checked(parent_id, category)?;
        if let Some(pid) = parent_id {
            self.expanded.insert(pid);
        }
        Ok(())
    }

    /// Rename a category and recompute its slug.
    pub fn rename(&mut self, id: CategoryId, new_name: &str) -> Result<(), TreeError> {
        let node = self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))?;
        node.set_name(new_name);
        Ok(())
    }

    /// Flip `is_active`. Returns the new value.
    pub fn toggle_hidden(&mut self, id: CategoryId) -> Result<bool, TreeError> {
        let node = self.nodes.get_mut(&id).ok_or(TreeError::NotFound(id))?;
        node.is_active = !node.is_active;
        Ok(node.is_active)
    }

    /// Remove a category together with its whole subtree.
    /// Returns the removed ids, pre-order.
    pub fn remove(&mut self, id: CategoryId) -> Result<Vec<CategoryId>, TreeError> {
        let node = self.nodes.get(&id).ok_or(TreeError::NotFound(id))?;
        let parent_id = node.parent_id;
        self.detach(id, parent_id);
        let removed = self.subtree_ids(id);
        for rid in &removed {
            self.nodes.shift_remove(rid);
            self.expanded.remove(rid);
        }
        Ok(removed)
    }

    /// Move `dragged` (and its subtree) to the end of `target`'s children, or
    /// to the end of the roots when `target` is `None`. The new parent is
    /// auto-expanded.
    ///
    /// Moving a node into itself or into one of its own descendants is
    /// rejected before anything changes.
    pub fn reparent(
        &mut self,
        dragged: CategoryId,
        target: Option<CategoryId>,
    ) -> Result<(), TreeError> {
        let old_parent = self
            .nodes
            .get(&dragged)
            .ok_or(TreeError::NotFound(dragged))?
            .parent_id;
        if let Some(tid) = target {
            if !self.nodes.contains_key(&tid) {
                return Err(TreeError::ParentNotFound(tid));
            }
            if tid == dragged || self.is_descendant_of(tid, dragged) {
                return Err(TreeError::CycleRejected {
                    dragged,
                    target: tid,
                });
            }
        }

        self.detach(dragged, old_parent);
        match target {
            None => self.roots.push(dragged),
            Some(tid) => {
                if let Some(parent) = self.nodes.get_mut(&tid) {
                    parent.child_ids.push(dragged);
                }
                self.expanded.insert(tid);
            }
        }
        if let Some(node) = self.nodes.get_mut(&dragged) {
            node.parent_id = target;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Expanded set
    // -----------------------------------------------------------------------

    pub fn is_expanded(&self, id: CategoryId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn expand(&mut self, id: CategoryId) {
        self.expanded.insert(id);
    }

    pub fn collapse(&mut self, id: CategoryId) {
        self.expanded.remove(&id);
    }

    /// Returns true if the node is now expanded.
    pub fn toggle_expanded(&mut self, id: CategoryId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    pub fn expanded_ids(&self) -> &HashSet<CategoryId> {
        &self.expanded
    }

    /// Expand every node that has children.
    pub fn expand_all(&mut self) {
        let parents: Vec<CategoryId> = self
            .nodes
            .values()
            .filter(|n| n.has_children())
            .map(|n| n.id)
            .collect();
        self.expanded.extend(parents);
    }

    pub fn set_expanded(&mut self, ids: impl IntoIterator<Item = CategoryId>) {
        self.expanded = ids.into_iter().collect();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn insert_checked(
        &mut self,
        parent_id: Option<CategoryId>,
        category: Category,
    ) -> Result<(), TreeError> {
        let mut seen = HashSet::new();
        let clash = first_duplicate(&category, &mut seen)
            .or_else(|| seen.into_iter().find(|id| self.nodes.contains_key(id)));
        if let Some(dup) = clash {
            return Err(TreeError::DuplicateId(dup));
        }
        let id = category.id;
        self.insert_subtree(parent_id, category);
        match parent_id {
            None => self.roots.push(id),
            Some(pid) => {
                if let Some(parent) = self.nodes.get_mut(&pid) {
                    parent.child_ids.push(id);
                }
            }
        }
        Ok(())
    }

    fn insert_subtree(&mut self, parent_id: Option<CategoryId>, category: Category) {
        if category.parent_id != parent_id {
            log::debug!(
                "category {} stored parent {:?}, placed under {:?}",
                category.id,
                category.parent_id,
                parent_id
            );
        }
        let id = category.id;
        let child_ids = category.children.iter().map(|c| c.id).collect();
        self.nodes.insert(
            id,
            CategoryNode {
                id,
                slug: slugify(&category.name),
                name: category.name,
                is_active: category.is_active,
                parent_id,
                child_ids,
            },
        );
        for child in category.children {
            self.insert_subtree(Some(id), child);
        }
    }

    fn detach(&mut self, id: CategoryId, parent_id: Option<CategoryId>) {
        match parent_id {
            None => self.roots.retain(|r| *r != id),
            Some(pid) => {
                if let Some(parent) = self.nodes.get_mut(&pid) {
                    parent.child_ids.retain(|c| *c != id);
                }
            }
        }
    }

    fn build_category(&self, id: CategoryId) -> Option<Category> {
        let node = self.nodes.get(&id)?;
        Some(Category {
            id: node.id,
            name: node.name.clone(),
            slug: node.slug.clone(),
            is_active: node.is_active,
            parent_id: node.parent_id,
            children: node
                .child_ids
                .iter()
                .filter_map(|c| self.build_category(*c))
                .collect(),
        })
    }
}

/// First id that appears twice inside `category`'s subtree. Every visited id
/// is recorded in `seen`.
fn first_duplicate(category: &Category, seen: &mut HashSet<CategoryId>) -> Option<CategoryId> {
    if !seen.insert(category.id) {
        return Some(category.id);
    }
    category
        .children
        .iter()
        .find_map(|child| first_duplicate(child, seen))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::check::check_tree;
    use pretty_assertions::assert_eq;

    const ROUPAS: CategoryId = CategoryId(1);
    const CAMISETAS: CategoryId = CategoryId(2);
    const ACESSORIOS: CategoryId = CategoryId(3);
    const REGATAS: CategoryId = CategoryId(4);

    /// Roupas > Camisetas > Regatas, Acessórios
    fn sample_tree() -> CategoryTree {
        CategoryTree::from_forest(vec![
            Category::new(ROUPAS, "Roupas", None).with_children(vec![
                Category::new(CAMISETAS, "Camisetas", Some(ROUPAS))
                    .with_children(vec![Category::new(REGATAS, "Regatas", Some(CAMISETAS))]),
            ]),
            Category::new(ACESSORIOS, "Acessórios", None),
        ])
        .unwrap()
    }

    fn names(tree: &CategoryTree, parent: Option<CategoryId>) -> Vec<String> {
        tree.children_of(parent)
            .iter()
            .map(|id| tree.get(*id).unwrap().name.clone())
            .collect()
    }

    fn assert_valid(tree: &CategoryTree) {
        let result = check_tree(tree);
        assert!(result.valid, "invariants broken: {:?}", result.errors);
    }

    // --- construction ---

    #[test]
    fn from_forest_links_parents_and_slugs() {
        let tree = sample_tree();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.roots(), &[ROUPAS, ACESSORIOS]);
        assert_eq!(tree.get(REGATAS).unwrap().parent_id, Some(CAMISETAS));
        assert_eq!(tree.get(ACESSORIOS).unwrap().slug, "acessorios");
        assert_valid(&tree);
    }

    #[test]
    fn from_forest_repairs_stale_parent_fields() {
        let mut child = Category::new(CAMISETAS, "Camisetas", None);
        child.parent_id = Some(CategoryId(99));
        child.slug = "stale".into();
        let roupas = Category::new(ROUPAS, "Roupas", None)
            .with_children(vec![child]);
        let tree = CategoryTree::from_forest(vec![roupas]).unwrap();
        assert_eq!(tree.get(CAMISETAS).unwrap().parent_id, Some(ROUPAS));
        assert_eq!(tree.get(CAMISETAS).unwrap().slug, "camisetas");
    }

    #[test]
    fn from_forest_rejects_duplicate_ids() {
        let err = CategoryTree::from_forest(vec![
            Category::new(ROUPAS, "Roupas", None),
            Category::new(ROUPAS, "Again", None),
        ])
        .unwrap_err();
        assert_eq!(err, TreeError::DuplicateId(ROUPAS));
    }

    #[test]
    fn to_forest_round_trips_structure() {
        let tree = sample_tree();
        let rebuilt = CategoryTree::from_forest(tree.to_forest()).unwrap();
        assert_eq!(rebuilt, tree);
    }

    // --- find ---

    #[test]
    fn find_by_id_returns_nested_subtree() {
        let tree = sample_tree();
        let camisetas = tree.find_by_id(CAMISETAS).unwrap();
        assert_eq!(camisetas.name, "Camisetas");
        assert_eq!(camisetas.children.len(), 1);
        assert_eq!(camisetas.children[0].id, REGATAS);
        assert!(tree.find_by_id(CategoryId(404)).is_none());
    }

    // --- add_child ---

    #[test]
    fn add_child_appends_and_expands_parent() {
        let mut tree = sample_tree();
        tree.add_child(Some(ROUPAS), Category::new(CategoryId(10), "Bolsos", None))
            .unwrap();
        assert_eq!(names(&tree, Some(ROUPAS)), vec!["Camisetas", "Bolsos"]);
        assert_eq!(tree.get(CategoryId(10)).unwrap().parent_id, Some(ROUPAS));
        assert!(tree.is_expanded(ROUPAS));
        assert_valid(&tree);
    }

    #[test]
    fn add_child_at_root() {
        let mut tree = sample_tree();
        tree.add_child(None, Category::new(CategoryId(10), "Calçados", None))
            .unwrap();
        assert_eq!(names(&tree, None), vec!["Roupas", "Acessórios", "Calçados"]);
        assert_valid(&tree);
    }

    #[test]
    fn add_child_unknown_parent_leaves_tree_unchanged() {
        let mut tree = sample_tree();
        let before = tree.clone();
        let orphan = Category::new(CategoryId(10), "X", None);
        let err = tree.add_child(Some(CategoryId(404)), orphan).unwrap_err();
        assert_eq!(err, TreeError::ParentNotFound(CategoryId(404)));
        assert_eq!(tree, before);
    }

    #[test]
    fn add_child_duplicate_id_rejected() {
        let mut tree = sample_tree();
        let before = tree.clone();
        let err = tree
            .add_child(None, Category::new(CAMISETAS, "Dup", None))
            .unwrap_err();
        assert_eq!(err, TreeError::DuplicateId(CAMISETAS));
        assert_eq!(tree, before);
    }

    // --- rename / toggle ---

    #[test]
    fn rename_recomputes_slug() {
        let mut tree = sample_tree();
        tree.rename(CAMISETAS, "Camisetas Básicas").unwrap();
        let node = tree.get(CAMISETAS).unwrap();
        assert_eq!(node.name, "Camisetas Básicas");
        assert_eq!(node.slug, "camisetas-basicas");
        assert_eq!(node.child_ids, vec![REGATAS]);
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let mut tree = sample_tree();
        let before = tree.clone();
        let missing = CategoryId(404);
        assert_eq!(tree.rename(missing, "x"), Err(TreeError::NotFound(missing)));
        assert_eq!(
            tree.toggle_hidden(missing),
            Err(TreeError::NotFound(missing))
        );
        assert_eq!(tree.remove(missing), Err(TreeError::NotFound(missing)));
        assert_eq!(
            tree.reparent(missing, Some(ROUPAS)),
            Err(TreeError::NotFound(missing))
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn toggle_hidden_is_an_involution() {
        let mut tree = sample_tree();
        assert_eq!(tree.toggle_hidden(ACESSORIOS), Ok(false));
        assert!(tree.get(ACESSORIOS).unwrap().hidden());
        assert_eq!(tree.toggle_hidden(ACESSORIOS), Ok(true));
        assert_eq!(tree, sample_tree());
    }

    // --- remove ---

    #[test]
    fn remove_drops_whole_subtree() {
        let mut tree = sample_tree();
        let removed = tree.remove(ROUPAS).unwrap();
        assert_eq!(removed, vec![ROUPAS, CAMISETAS, REGATAS]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.roots(), &[ACESSORIOS]);
        assert!(tree.find_by_id(REGATAS).is_none());
        assert_valid(&tree);
    }

    #[test]
    fn remove_nested_node_updates_parent() {
        let mut tree = sample_tree();
        tree.remove(REGATAS).unwrap();
        assert!(tree.get(CAMISETAS).unwrap().child_ids.is_empty());
        assert_valid(&tree);
    }

    // --- reparent ---

    #[test]
    fn reparent_moves_subtree_and_expands_target() {
        let mut tree = sample_tree();
        tree.reparent(CAMISETAS, Some(ACESSORIOS)).unwrap();
        assert!(tree.get(ROUPAS).unwrap().child_ids.is_empty());
        assert_eq!(tree.get(ACESSORIOS).unwrap().child_ids, vec![CAMISETAS]);
        assert_eq!(tree.get(CAMISETAS).unwrap().parent_id, Some(ACESSORIOS));
        // The subtree travels along
        assert_eq!(tree.get(REGATAS).unwrap().parent_id, Some(CAMISETAS));
        assert!(tree.is_expanded(ACESSORIOS));
        assert_valid(&tree);
    }

    #[test]
    fn reparent_to_root() {
        let mut tree = sample_tree();
        tree.reparent(REGATAS, None).unwrap();
        assert_eq!(tree.roots(), &[ROUPAS, ACESSORIOS, REGATAS]);
        assert_eq!(tree.get(REGATAS).unwrap().parent_id, None);
        assert_valid(&tree);
    }

    #[test]
    fn reparent_onto_self_or_descendant_is_rejected() {
        let mut tree = sample_tree();
        let before = tree.clone();
        assert_eq!(
            tree.reparent(ROUPAS, Some(ROUPAS)),
            Err(TreeError::CycleRejected {
                dragged: ROUPAS,
                target: ROUPAS
            })
        );
        assert_eq!(
            tree.reparent(ROUPAS, Some(REGATAS)),
            Err(TreeError::CycleRejected {
                dragged: ROUPAS,
                target: REGATAS
            })
        );
        assert_eq!(tree, before);
        assert!(tree.contains(ROUPAS));
    }

    #[test]
    fn reparent_into_missing_target_is_rejected() {
        let mut tree = sample_tree();
        let before = tree.clone();
        assert_eq!(
            tree.reparent(CAMISETAS, Some(CategoryId(404))),
            Err(TreeError::ParentNotFound(CategoryId(404)))
        );
        assert_eq!(tree, before);
    }

    // --- reads ---

    #[test]
    fn depth_first_order_and_depths() {
        let tree = sample_tree();
        let order: Vec<(usize, &str)> = tree
            .iter_depth_first()
            .into_iter()
            .map(|(d, n)| (d, n.name.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, "Roupas"),
                (1, "Camisetas"),
                (2, "Regatas"),
                (0, "Acessórios")
            ]
        );
        assert_eq!(tree.depth_of(REGATAS), Some(2));
        assert_eq!(tree.descendant_count(ROUPAS), 2);
        assert!(tree.is_descendant_of(REGATAS, ROUPAS));
        assert!(!tree.is_descendant_of(ROUPAS, REGATAS));
    }

    #[test]
    fn expanded_set_toggles() {
        let mut tree = sample_tree();
        assert!(tree.toggle_expanded(ROUPAS));
        assert!(tree.is_expanded(ROUPAS));
        assert!(!tree.toggle_expanded(ROUPAS));
        tree.expand_all();
        assert!(tree.is_expanded(ROUPAS));
        assert!(tree.is_expanded(CAMISETAS));
        assert!(!tree.is_expanded(ACESSORIOS));
    }

    #[test]
    fn replace_forest_keeps_expanded() {
        let mut tree = sample_tree();
        tree.expand(ROUPAS);
        tree.replace_forest(vec![Category::new(ROUPAS, "Roupas", None)])
            .unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_expanded(ROUPAS));
    }

    #[test]
    fn mixed_operations_preserve_invariants() {
        let mut tree = sample_tree();
        let mut next_id = 100;
        for step in 0..60u64 {
            let ids: Vec<CategoryId> = tree.iter_depth_first().iter().map(|(_, n)| n.id).collect();
            let pick = |k: u64| ids.get((k as usize) % ids.len().max(1)).copied();
            match step % 5 {
                0 => {
                    next_id += 1;
                    let node = Category::new(CategoryId(next_id), format!("Nó {}", next_id), None);
                    let _ = tree.add_child(pick(step), node);
                }
                1 => {
                    if let Some(id) = pick(step * 7) {
                        let _ = tree.rename(id, &format!("Renomeado {}", step));
                    }
                }
                2 => {
                    if let Some(id) = pick(step * 3) {
                        let _ = tree.toggle_hidden(id);
                    }
                }
                3 => {
                    if let (Some(a), Some(b)) = (pick(step * 11), pick(step * 13 + 1)) {
                        let _ = tree.reparent(a, Some(b));
                    }
                }
                _ => {
                    if step % 10 == 4
                        && let Some(id) = pick(step * 5)
                    {
                        let _ = tree.remove(id);
                    }
                }
            }
            assert_valid(&tree);
        }
    }
}
