use crate::classification::template::CategoryTemplate;

/// Canonicalizes raw channel names against a compiled template
///
/// Suffix tokens are removed wherever they occur in the name, so `CCTV-1 HD`
/// and `CCTV-1高清` both become `CCTV-1` before the alias table is consulted.
#[derive(Debug, Clone)]
pub struct NameNormalizer<'t> {
    template: &'t CategoryTemplate,
    suffixes: Vec<String>,
}

impl<'t> NameNormalizer<'t> {
    pub fn new(template: &'t CategoryTemplate, suffixes: &[String]) -> Self {
        Self {
            template,
            suffixes: suffixes.iter().filter(|s| !s.is_empty()).cloned().collect(),
        }
    }

    pub fn template(&self) -> &'t CategoryTemplate {
        self.template
    }

    /// Strip suffix tokens and resolve the alias table.
    ///
    /// A name that is already an alias key is looked up as written, so
    /// canonical names containing a suffix token (`湖南综合`) survive a second
    /// pass. Otherwise the stripped name is looked up. Alias targets are
    /// returned untouched; one defensive re-lookup of the target is made and
    /// longer chains are not followed.
    pub fn normalize(&self, name: &str) -> String {
        let trimmed = name.trim();
        let key = if self.template.alias_target(trimmed).is_some() {
            trimmed.to_string()
        } else {
            self.strip_suffixes(trimmed)
        };
        match self.template.alias_target(&key) {
            Some(target) => self
                .template
                .alias_target(target)
                .unwrap_or(target)
                .to_string(),
            None => key,
        }
    }

    /// Remove every suffix token and re-trim until nothing changes
    pub fn strip_suffixes(&self, name: &str) -> String {
        let mut current = name.trim().to_string();
        loop {
            let mut next = current.clone();
            for suffix in &self.suffixes {
                if next.contains(suffix.as_str()) {
                    next = next.replace(suffix.as_str(), "");
                }
            }
            let next = next.trim();
            if next == current {
                return current;
            }
            current = next.to_string();
        }
    }
}
