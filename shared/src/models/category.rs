//! Category Model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Menu category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub restaurant_id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub image_url: Option<String>,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreate {
    pub name: String,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub image_url: Option<String>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
    pub image_url: Option<String>,
}

/// Fixed parent groupings, matched by category name
const PARENT_GROUPS: [(&str, &str); 4] = [
    ("Sıcak Kahveler", "Kahveler"),
    ("Soğuk Kahveler", "Kahveler"),
    ("Sıcak İçecekler", "İçecekler"),
    ("Soğuk İçecekler", "İçecekler"),
];

/// Parent grouping for a category name, if any
pub fn category_parent(name: &str) -> Option<&'static str> {
    let name = name.trim();
    PARENT_GROUPS
        .iter()
        .find(|(child, _)| *child == name)
        .map(|(_, parent)| *parent)
}

/// Top-level menu section: a standalone category, or a parent with children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub name: String,
    pub categories: Vec<Category>,
}

/// Fold categories into top-level groups, keeping the sort order of the
/// first member of each group.
pub fn group_categories(mut categories: Vec<Category>) -> Vec<CategoryGroup> {
    categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));

    let mut groups: Vec<CategoryGroup> = Vec::new();
    for category in categories {
        let group_name = category_parent(&category.name)
            .unwrap_or(category.name.as_str())
            .to_string();
        match groups.iter_mut().find(|g| g.name == group_name) {
            Some(group) => group.categories.push(category),
            None => groups.push(CategoryGroup {
                name: group_name,
                categories: vec![category],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(id: i64, name: &str, sort_order: i32) -> Category {
        Category {
            id,
            restaurant_id: Uuid::nil(),
            name: name.to_string(),
            icon: None,
            sort_order,
            image_url: None,
        }
    }

    #[test]
    fn parent_table() {
        assert_eq!(category_parent("Sıcak Kahveler"), Some("Kahveler"));
        assert_eq!(category_parent("Soğuk İçecekler"), Some("İçecekler"));
        assert_eq!(category_parent("Köfteler"), None);
    }

    #[test]
    fn grouping_merges_children_under_parent() {
        let groups = group_categories(vec![
            cat(3, "Soğuk Kahveler", 3),
            cat(1, "Köfteler", 1),
            cat(2, "Sıcak Kahveler", 2),
            cat(4, "Tatlılar", 4),
        ]);
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Köfteler", "Kahveler", "Tatlılar"]);
        let kahve: Vec<_> = groups[1].categories.iter().map(|c| c.id).collect();
        assert_eq!(kahve, [2, 3]);
    }
}
