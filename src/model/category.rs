use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ops::slug::slugify;

/// Identifier of a persisted category. Assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl CategoryId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CategoryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(CategoryId)
    }
}

/// A category with its subtree, in the nested shape used on the wire and on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Always `slugify(name)`
    pub slug: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Category>,
}

fn default_true() -> bool {
    true
}

impl Category {
    /// Create an active, childless category. The slug is derived from `name`.
    pub fn new(id: CategoryId, name: impl Into<String>, parent_id: Option<CategoryId>) -> Self {
        let name = name.into();
        Category {
            id,
            slug: slugify(&name),
            name,
            is_active: true,
            parent_id,
            children: Vec::new(),
        }
    }

    /// `hidden` is the inverse of `is_active`
    pub fn hidden(&self) -> bool {
        !self.is_active
    }

    pub fn with_children(mut self, children: Vec<Category>) -> Self {
        self.children = children;
        self
    }
}

/// Arena record for one category. Children are referenced by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub parent_id: Option<CategoryId>,
    /// Ordered child ids
    pub child_ids: Vec<CategoryId>,
}

impl CategoryNode {
    pub fn hidden(&self) -> bool {
        !self.is_active
    }

    pub fn has_children(&self) -> bool {
        !self.child_ids.is_empty()
    }

    /// Replace the name and recompute the slug.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.slug = slugify(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_category_derives_slug() {
        let cat = Category::new(CategoryId(7), "Acessórios de Verão", None);
        assert_eq!(cat.slug, "acessorios-de-verao");
        assert!(cat.is_active);
        assert!(!cat.hidden());
    }

    #[test]
    fn category_json_shape() {
        let child = Category::new(CategoryId(2), "Camisetas", Some(CategoryId(1)));
        let cat = Category::new(CategoryId(1), "Roupas", None)
            .with_children(vec![child]);
        let json = serde_json::to_value(&cat).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["children"][0]["parent_id"], 1);

        // Leaves omit `children`, and a missing `is_active` defaults to true
        let leaf: Category =
            serde_json::from_str(r#"{"id":3,"name":"Bolsos","slug":"bolsos"}"#).unwrap();
        assert!(leaf.is_active);
        assert_eq!(leaf.parent_id, None);
        assert!(leaf.children.is_empty());
    }

    #[test]
    fn parse_category_id() {
        assert_eq!("42".parse::<CategoryId>().unwrap(), CategoryId(42));
        assert_eq!("#42".parse::<CategoryId>().unwrap(), CategoryId(42));
        assert!("abc".parse::<CategoryId>().is_err());
    }

    #[test]
    fn set_name_recomputes_slug() {
        let mut node = CategoryNode {
            id: CategoryId(1),
            name: "Old".into(),
            slug: "old".into(),
            is_active: true,
            parent_id: None,
            child_ids: vec![],
        };
        node.set_name("Calçados Femininos");
        assert_eq!(node.slug, "calcados-femininos");
    }
}
