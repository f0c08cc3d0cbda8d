//! Template-driven classification core
//!
//! Everything in here is synchronous and works on values it is handed: the
//! template is compiled once per run and borrowed by the normalizer,
//! classifier and ordering engine.

pub mod classifier;
pub mod normalizer;
pub mod ordering;
pub mod template;

pub use classifier::Classifier;
pub use normalizer::NameNormalizer;
pub use ordering::OrderingEngine;
pub use template::{Category, CategoryTemplate, OrderedName};

use crate::models::{Channel, ParsedChannel};

/// Normalize and classify parsed records, reporting one unit per record
pub fn classify_records<F>(
    records: Vec<ParsedChannel>,
    normalizer: &NameNormalizer<'_>,
    mut on_progress: F,
) -> Vec<Channel>
where
    F: FnMut(usize),
{
    let classifier = Classifier::new(normalizer.template());
    records
        .into_iter()
        .map(|record| {
            let name = normalizer.normalize(&record.name);
            let category = classifier.classify(&name);
            on_progress(1);
            Channel::new(name, record.url, category)
        })
        .collect()
}
