//! Products extracted from final categories

/// A product listed under a final category
///
/// Products carry no identity of their own; every field is optional except
/// the owning category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Product {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub category_id: i64,
    pub link: Option<String>,
}

impl Product {
    pub fn new(
        name: Option<String>,
        image_url: Option<String>,
        category_id: i64,
        link: Option<String>,
    ) -> Self {
        Self {
            name,
            image_url,
            category_id,
            link,
        }
    }
}
