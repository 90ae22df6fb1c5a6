use serde::Serialize;

use crate::model::category::CategoryId;
use crate::ops::tree_ops::CategoryTree;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct CategoryJson {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub parent_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CategoryJson>,
}

#[derive(Serialize)]
pub struct CategoryDetailJson {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub parent_id: Option<CategoryId>,
    pub depth: usize,
    pub children: Vec<CategoryId>,
    pub descendant_count: usize,
    /// Names from the root down to this category
    pub path: Vec<String>,
}

#[derive(Serialize)]
pub struct HiddenJson {
    pub id: CategoryId,
    pub name: String,
    pub path: Vec<String>,
}

#[derive(Serialize)]
pub struct WriteResultJson {
    pub action: &'static str,
    pub id: CategoryId,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<CategoryId>,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub fn category_to_json(tree: &CategoryTree, id: CategoryId) -> Option<CategoryJson> {
    let node = tree.get(id)?;
    Some(CategoryJson {
        id: node.id,
        name: node.name.clone(),
        slug: node.slug.clone(),
        is_active: node.is_active,
        parent_id: node.parent_id,
        children: node
            .child_ids
            .iter()
            .filter_map(|c| category_to_json(tree, *c))
            .collect(),
    })
}

pub fn forest_to_json(tree: &CategoryTree) -> Vec<CategoryJson> {
    tree.roots()
        .iter()
        .filter_map(|id| category_to_json(tree, *id))
        .collect()
}

/// Names from the root down to `id`
pub fn name_path(tree: &CategoryTree, id: CategoryId) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = Some(id);
    while let Some(cid) = current {
        match tree.get(cid) {
            Some(node) => {
                path.push(node.name.clone());
                current = node.parent_id;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

pub fn category_detail_json(tree: &CategoryTree, id: CategoryId) -> Option<CategoryDetailJson> {
    let node = tree.get(id)?;
    Some(CategoryDetailJson {
        id: node.id,
        name: node.name.clone(),
        slug: node.slug.clone(),
        is_active: node.is_active,
        parent_id: node.parent_id,
        depth: tree.depth_of(id).unwrap_or(0),
        children: node.child_ids.clone(),
        descendant_count: tree.descendant_count(id),
        path: name_path(tree, id),
    })
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One line per category, indented with box-drawing guides, every node
/// expanded.
pub fn format_tree(tree: &CategoryTree) -> String {
    let mut out = String::new();
    let roots = tree.roots();
    for (i, id) in roots.iter().enumerate() {
        format_node(tree, *id, "", i + 1 == roots.len(), true, &mut out);
    }
    out
}

fn format_node(
    tree: &CategoryTree,
    id: CategoryId,
    prefix: &str,
    is_last: bool,
    is_root: bool,
    out: &mut String,
) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let branch = match (is_root, is_last) {
        (true, _) => "",
        (false, true) => "└ ",
        (false, false) => "├ ",
    };
    out.push_str(&format!("{}{}{} #{}", prefix, branch, node.name, node.id));
    if node.hidden() {
        out.push_str(" (hidden)");
    }
    out.push('\n');

    let child_prefix = match (is_root, is_last) {
        (true, _) => prefix.to_string(),
        (false, true) => format!("{}  ", prefix),
        (false, false) => format!("{}│ ", prefix),
    };
    let count = node.child_ids.len();
    for (i, child) in node.child_ids.iter().enumerate() {
        format_node(tree, *child, &child_prefix, i + 1 == count, false, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::category::Category;

    fn tree() -> CategoryTree {
        let r = CategoryId(1);
        CategoryTree::from_forest(vec![
            Category::new(r, "Roupas", None).with_children(vec![
                Category::new(CategoryId(2), "Camisetas", Some(r)),
                Category {
                    is_active: false,
                    ..Category::new(CategoryId(4), "Calças", Some(r))
                },
            ]),
            Category::new(CategoryId(3), "Acessórios", None),
        ])
        .unwrap()
    }

    #[test]
    fn tree_text_snapshot() {
        insta::assert_snapshot!(format_tree(&tree()), @r"
        Roupas #1
        ├ Camisetas #2
        └ Calças #4 (hidden)
        Acessórios #3
        ");
    }

    #[test]
    fn path_and_detail() {
        let tree = tree();
        assert_eq!(name_path(&tree, CategoryId(4)), vec!["Roupas", "Calças"]);
        let detail = category_detail_json(&tree, CategoryId(1)).unwrap();
        assert_eq!(detail.descendant_count, 2);
        assert_eq!(detail.depth, 0);
        assert!(category_detail_json(&tree, CategoryId(9)).is_none());
    }

    #[test]
    fn forest_json_nests_children() {
        let json = serde_json::to_value(forest_to_json(&tree())).unwrap();
        assert_eq!(json[0]["children"][1]["name"], "Calças");
        assert_eq!(json[0]["children"][1]["is_active"], false);
        assert!(json[1].get("children").is_none());
    }
}
