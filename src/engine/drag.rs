use crate::model::category::CategoryId;
use crate::ops::tree_ops::{CategoryTree, TreeError};

/// What a drop did to the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// `id` now lives under `new_parent`
    Moved {
        id: CategoryId,
        new_parent: CategoryId,
    },
    /// Nothing dragged, nothing hovered, or dropped onto itself
    Ignored,
}

/// Tracks one drag gesture and turns the drop into a reparent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragController {
    dragged: Option<CategoryId>,
    over: Option<CategoryId>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_start(&mut self, id: CategoryId) {
        self.dragged = Some(id);
        self.over = None;
    }

    /// Last hover wins.
    pub fn drag_over(&mut self, id: CategoryId) {
        self.over = Some(id);
    }

    pub fn cancel(&mut self) {
        self.dragged = None;
        self.over = None;
    }

    pub fn dragged(&self) -> Option<CategoryId> {
        self.dragged
    }

    pub fn over(&self) -> Option<CategoryId> {
        self.over
    }

    pub fn is_dragging(&self) -> bool {
        self.dragged.is_some()
    }

    /// Finish the gesture. When both ends are set and differ, the dragged
    /// node is reparented under the hovered one. The gesture is cleared
    /// whatever happens; a refusal from the tree is passed through.
    pub fn drag_end(&mut self, tree: &mut CategoryTree) -> Result<DropOutcome, TreeError> {
        let dragged = self.dragged.take();
        let over = self.over.take();
        match (dragged, over) {
            (Some(id), Some(target)) if id != target => {
                tree.reparent(id, Some(target))?;
                Ok(DropOutcome::Moved {
                    id,
                    new_parent: target,
                })
            }
            _ => Ok(DropOutcome::Ignored),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::Category;

    const A: CategoryId = CategoryId(1);
    const B: CategoryId = CategoryId(2);
    const C: CategoryId = CategoryId(3);
    const D: CategoryId = CategoryId(4);

    /// A > B > C, D
    fn chain() -> CategoryTree {
        CategoryTree::from_forest(vec![
            Category::new(A, "A", None).with_children(vec![
                Category::new(B, "B", Some(A)).with_children(vec![Category::new(C, "C", Some(B))]),
            ]),
            Category::new(D, "D", None),
        ])
        .unwrap()
    }

    #[test]
    fn drop_reparents_and_clears() {
        let mut tree = chain();
        let mut drag = DragController::new();
        drag.drag_start(C);
        drag.drag_over(A);
        drag.drag_over(D);
        assert_eq!(
            drag.drag_end(&mut tree),
            Ok(DropOutcome::Moved {
                id: C,
                new_parent: D
            })
        );
        assert_eq!(tree.get(C).unwrap().parent_id, Some(D));
        assert!(!drag.is_dragging());
        assert_eq!(drag.over(), None);
    }

    #[test]
    fn drop_onto_self_is_ignored() {
        let mut tree = chain();
        let before = tree.clone();
        let mut drag = DragController::new();
        drag.drag_start(B);
        drag.drag_over(B);
        assert_eq!(drag.drag_end(&mut tree), Ok(DropOutcome::Ignored));
        assert_eq!(tree, before);
    }

    #[test]
    fn drop_without_hover_is_ignored() {
        let mut tree = chain();
        let mut drag = DragController::new();
        drag.drag_start(B);
        assert_eq!(drag.drag_end(&mut tree), Ok(DropOutcome::Ignored));
        assert_eq!(drag.dragged(), None);
    }

    #[test]
    fn drop_into_descendant_propagates_refusal() {
        let mut tree = chain();
        let before = tree.clone();
        let mut drag = DragController::new();
        drag.drag_start(A);
        drag.drag_over(C);
        assert_eq!(
            drag.drag_end(&mut tree),
            Err(TreeError::CycleRejected {
                dragged: A,
                target: C
            })
        );
        assert_eq!(tree, before);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn cancel_clears_gesture() {
        let mut drag = DragController::new();
        drag.drag_start(A);
        drag.drag_over(D);
        drag.cancel();
        assert_eq!(drag, DragController::default());
    }
}
