use crate::engine::drag::DragController;
use crate::engine::session::{EditSlot, EditingSession, TempId};
use crate::model::category::CategoryId;
use crate::ops::tree_ops::CategoryTree;

/// One node of the merged view: canonical categories interleaved with drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNode {
    Category(CategoryView),
    Draft(DraftView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub hidden: bool,
    pub expanded: bool,
    /// Draft name when this node is in the edit slot
    pub editing: Option<String>,
    /// Being dragged
    pub dragging: bool,
    /// Currently hovered by a drag
    pub drop_target: bool,
    /// Canonical children first, then drafts targeting this node
    pub children: Vec<ViewNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftView {
    pub temp_id: TempId,
    pub parent_id: Option<CategoryId>,
    pub name: String,
}

/// Build the merged forest. Every canonical node is included regardless of
/// the expanded set; root drafts follow the root categories.
pub fn build_view(
    tree: &CategoryTree,
    session: &EditingSession,
    drag: &DragController,
) -> Vec<ViewNode> {
    build_level(tree, session, drag, None)
}

fn build_level(
    tree: &CategoryTree,
    session: &EditingSession,
    drag: &DragController,
    parent: Option<CategoryId>,
) -> Vec<ViewNode> {
    let mut out: Vec<ViewNode> = tree
        .children_of(parent)
        .iter()
        .filter_map(|id| tree.get(*id))
        .map(|node| {
            let editing = match session.edit_slot() {
                EditSlot::Editing { id, draft_name } if *id == node.id => Some(draft_name.clone()),
                _ => None,
            };
            ViewNode::Category(CategoryView {
                id: node.id,
                name: node.name.clone(),
                slug: node.slug.clone(),
                hidden: node.hidden(),
                expanded: tree.is_expanded(node.id),
                editing,
                dragging: drag.dragged() == Some(node.id),
                drop_target: drag.over() == Some(node.id),
                children: build_level(tree, session, drag, Some(node.id)),
            })
        })
        .collect();
    out.extend(session.drafts_under(parent).map(|d| {
        ViewNode::Draft(DraftView {
            temp_id: d.temp_id,
            parent_id: d.parent_id,
            name: d.name.clone(),
        })
    }));
    out
}

/// A visible row after flattening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub depth: usize,
    pub is_last_sibling: bool,
    /// For each ancestor level, whether that ancestor was the last sibling
    pub ancestor_last: Vec<bool>,
    pub item: RowItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowItem {
    Category {
        id: CategoryId,
        name: String,
        hidden: bool,
        has_children: bool,
        is_expanded: bool,
        editing: Option<String>,
        dragging: bool,
        drop_target: bool,
    },
    Draft {
        temp_id: TempId,
        parent_id: Option<CategoryId>,
        name: String,
    },
}

impl ViewRow {
    pub fn category_id(&self) -> Option<CategoryId> {
        match &self.item {
            RowItem::Category { id, .. } => Some(*id),
            RowItem::Draft { .. } => None,
        }
    }

    pub fn temp_id(&self) -> Option<TempId> {
        match &self.item {
            RowItem::Draft { temp_id, .. } => Some(*temp_id),
            RowItem::Category { .. } => None,
        }
    }
}

/// Flatten the merged view into rows, descending only into expanded nodes.
pub fn flatten_visible(nodes: &[ViewNode]) -> Vec<ViewRow> {
    let mut rows = Vec::new();
    flatten_inner(nodes, 0, &[], &mut rows);
    rows
}

fn flatten_inner(
    nodes: &[ViewNode],
    depth: usize,
    ancestor_last: &[bool],
    rows: &mut Vec<ViewRow>,
) {
    let count = nodes.len();
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i + 1 == count;
        match node {
            ViewNode::Category(cat) => {
                let has_children = !cat.children.is_empty();
                let is_expanded = has_children && cat.expanded;
                rows.push(ViewRow {
                    depth,
                    is_last_sibling: is_last,
                    ancestor_last: ancestor_last.to_vec(),
                    item: RowItem::Category {
                        id: cat.id,
                        name: cat.name.clone(),
                        hidden: cat.hidden,
                        has_children,
                        is_expanded,
                        editing: cat.editing.clone(),
                        dragging: cat.dragging,
                        drop_target: cat.drop_target,
                    },
                });
                if is_expanded {
                    let mut next_last = ancestor_last.to_vec();
                    next_last.push(is_last);
                    flatten_inner(&cat.children, depth + 1, &next_last, rows);
                }
            }
            ViewNode::Draft(draft) => rows.push(ViewRow {
                depth,
                is_last_sibling: is_last,
                ancestor_last: ancestor_last.to_vec(),
                item: RowItem::Draft {
                    temp_id: draft.temp_id,
                    parent_id: draft.parent_id,
                    name: draft.name.clone(),
                },
            }),
        }
    }
}
