//! Category template compiler
//!
//! A template is a plain text file that lists categories and, under each one,
//! the channel names that belong to it:
//!
//! ```text
//! 央视频道,#genre#
//! CCTV-1|CCTV1|中央一台
//! CCTV-\d+
//!
//! 卫视频道,#genre#
//! 湖南卫视
//! ```
//!
//! A line ending in `,#genre#` opens a category. A line containing `|` is a
//! name group: every part becomes an anchored pattern and an alias of the
//! first part. Any other line is a free-form regex searched anywhere in the
//! name. Both kinds append to the category's ordered name list, which later
//! drives the sort order inside the category.
//!
//! Compilation never fails as a whole. A line whose regex does not compile is
//! logged and dropped; everything else keeps its position.

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};

/// Suffix marking a category header line
pub const CATEGORY_MARKER: &str = ",#genre#";
/// Leading character of comment lines
pub const COMMENT_PREFIX: char = '#';
/// Separator inside a name group
pub const NAME_GROUP_DELIMITER: char = '|';

/// One entry of a category's ordered name list
#[derive(Debug, Clone)]
pub struct OrderedName {
    name: String,
    /// `^(?:name)$`, the whole-string form used for ranking
    anchored: Regex,
}

impl OrderedName {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whole-string match against an already normalized name
    pub fn matches(&self, normalized_name: &str) -> bool {
        self.anchored.is_match(normalized_name)
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    patterns: Vec<Regex>,
    ordered_names: Vec<OrderedName>,
}

impl Category {
    fn new(name: String) -> Self {
        Self {
            name,
            patterns: Vec::new(),
            ordered_names: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    pub fn ordered_names(&self) -> &[OrderedName] {
        &self.ordered_names
    }

    /// First pattern, in declaration order, that finds a match in `name`
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(name))
    }

    /// Sort key of a normalized name inside this category.
    ///
    /// Index of the first ordered name matching the whole string, or
    /// `ordered_names().len()` when none does.
    pub fn rank(&self, normalized_name: &str) -> usize {
        self.ordered_names
            .iter()
            .position(|entry| entry.matches(normalized_name))
            .unwrap_or(self.ordered_names.len())
    }
}

/// What a single template line contributes to its category
struct TemplateEntry {
    patterns: Vec<Regex>,
    names: Vec<OrderedName>,
    aliases: Vec<(String, String)>,
}

/// Compiled, immutable category template
#[derive(Debug, Clone, Default)]
pub struct CategoryTemplate {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, String>,
}

impl CategoryTemplate {
    /// Read and compile a template file. The file is a required input.
    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::missing_input("category template", path));
        }
        let text = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        let template = Self::compile(&text);
        info!(
            "Compiled template {}: {} categories, {} patterns, {} aliases",
            path.display(),
            template.len(),
            template.pattern_count(),
            template.alias_count()
        );
        Ok(template)
    }

    /// Compile template text. Invalid lines are logged and skipped.
    pub fn compile(text: &str) -> Self {
        let mut template = Self::default();
        let mut current: Option<usize> = None;

        for (line_idx, raw_line) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }

            if line.ends_with(CATEGORY_MARKER) {
                current = template.open_category(line, line_no);
                continue;
            }

            let Some(category_idx) = current else {
                debug!("Template line {} outside any category ignored: {}", line_no, line);
                continue;
            };

            match compile_entry(line, line_no) {
                Ok(entry) => template.push_entry(category_idx, entry),
                Err(e) => warn!("Skipping template line: {}", e),
            }
        }

        template
    }

    /// Start or re-open a category. Re-opened categories keep their original
    /// position and accumulate further entries.
    fn open_category(&mut self, line: &str, line_no: usize) -> Option<usize> {
        let name = line.split(',').next().unwrap_or_default().trim();
        if name.is_empty() {
            warn!("Template line {} declares a category without a name", line_no);
            return None;
        }

        if let Some(&idx) = self.index.get(name) {
            debug!("Category '{}' re-opened on line {}, merging entries", name, line_no);
            return Some(idx);
        }

        let idx = self.categories.len();
        self.categories.push(Category::new(name.to_string()));
        self.index.insert(name.to_string(), idx);
        Some(idx)
    }

    fn push_entry(&mut self, category_idx: usize, entry: TemplateEntry) {
        let category = &mut self.categories[category_idx];
        category.patterns.extend(entry.patterns);
        category.ordered_names.extend(entry.names);
        for (alias, canonical) in entry.aliases {
            self.aliases.insert(alias, canonical);
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.index.get(name).map(|&idx| &self.categories[idx])
    }

    /// Position of a category in template order
    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains_category(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Canonical name for an alias, if the name appears in a name group
    pub fn alias_target(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.categories.iter().map(|c| c.patterns.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn anchored(fragment: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{fragment})$"))
}

fn compile_entry(line: &str, line_no: usize) -> AppResult<TemplateEntry> {
    let invalid = |e: regex::Error| AppError::template(line_no, format!("invalid pattern '{line}': {e}"));

    if line.contains(NAME_GROUP_DELIMITER) {
        let parts: Vec<&str> = line
            .split(NAME_GROUP_DELIMITER)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        let Some(canonical) = parts.first().copied() else {
            return Err(AppError::template(line_no, "name group without names"));
        };

        let mut entry = TemplateEntry {
            patterns: Vec::with_capacity(parts.len()),
            names: Vec::with_capacity(parts.len()),
            aliases: Vec::with_capacity(parts.len()),
        };
        for part in parts {
            let regex = anchored(part).map_err(invalid)?;
            entry.patterns.push(regex.clone());
            entry.names.push(OrderedName {
                name: part.to_string(),
                anchored: regex,
            });
            entry.aliases.push((part.to_string(), canonical.to_string()));
        }
        return Ok(entry);
    }

    let search = Regex::new(line).map_err(invalid)?;
    let whole = anchored(line).map_err(invalid)?;
    Ok(TemplateEntry {
        patterns: vec![search],
        names: vec![OrderedName {
            name: line.to_string(),
            anchored: whole,
        }],
        aliases: Vec::new(),
    })
}
