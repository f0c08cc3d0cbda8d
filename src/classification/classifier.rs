use crate::classification::template::CategoryTemplate;
use crate::models::UNCLASSIFIED_CATEGORY;

/// First-match-wins category lookup over a compiled template
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'t> {
    template: &'t CategoryTemplate,
}

impl<'t> Classifier<'t> {
    pub fn new(template: &'t CategoryTemplate) -> Self {
        Self { template }
    }

    /// Category of a normalized name, or [`UNCLASSIFIED_CATEGORY`]
    pub fn classify(&self, name: &str) -> &'t str {
        self.template
            .categories()
            .iter()
            .find(|category| category.matches(name))
            .map(|category| category.name())
            .unwrap_or(UNCLASSIFIED_CATEGORY)
    }

    pub fn is_in_template(&self, name: &str) -> bool {
        self.template
            .categories()
            .iter()
            .any(|category| category.matches(name))
    }
}
