//! Final channel ordering
//!
//! Template categories come first, in template order. Inside a category,
//! whitelisted channels lead and each half is sorted by the position of the
//! first ordered template name matching the channel's normalized name.
//! Everything else (including `Other`) follows in its original order.

use tracing::debug;

use crate::classification::normalizer::NameNormalizer;
use crate::filtering::MembershipList;
use crate::models::Channel;

pub struct OrderingEngine<'a> {
    normalizer: &'a NameNormalizer<'a>,
    whitelist: &'a MembershipList,
}

impl<'a> OrderingEngine<'a> {
    pub fn new(normalizer: &'a NameNormalizer<'a>, whitelist: &'a MembershipList) -> Self {
        Self {
            normalizer,
            whitelist,
        }
    }

    /// Reorder channels. The output is a permutation of the input and every
    /// sort is stable.
    pub fn order(&self, channels: Vec<Channel>) -> Vec<Channel> {
        let template = self.normalizer.template();
        let total = channels.len();

        let mut buckets: Vec<Vec<Channel>> = (0..template.len()).map(|_| Vec::new()).collect();
        let mut remaining = Vec::new();
        for channel in channels {
            match template.category_index(&channel.category) {
                Some(idx) => buckets[idx].push(channel),
                None => remaining.push(channel),
            }
        }

        let mut ordered = Vec::with_capacity(total);
        for (category, bucket) in template.categories().iter().zip(buckets) {
            if bucket.is_empty() {
                continue;
            }

            let (mut preferred, mut rest): (Vec<_>, Vec<_>) =
                bucket.into_iter().partition(|c| self.whitelist.matches(c));
            let rank = |c: &Channel| category.rank(&self.normalizer.normalize(&c.name));
            preferred.sort_by_cached_key(rank);
            rest.sort_by_cached_key(rank);

            debug!(
                "Ordered category '{}': {} whitelisted, {} other",
                category.name(),
                preferred.len(),
                rest.len()
            );
            ordered.extend(preferred);
            ordered.extend(rest);
        }

        ordered.extend(remaining);
        ordered
    }
}
