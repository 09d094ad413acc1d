use std::collections::BTreeSet;

use super::FeatureId;

/// Which features to iterate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureRequest {
    filter_ids: Option<BTreeSet<FeatureId>>,
}

impl FeatureRequest {
    /// Every feature.
    pub fn all() -> Self { Self::default() }

    /// Only the features whose id is in `ids`.
    pub fn with_ids(ids: impl IntoIterator<Item = FeatureId>) -> Self {
        Self { filter_ids: Some(ids.into_iter().collect()) }
    }

    #[inline]
    pub fn matches(&self, id: FeatureId) -> bool {
        self.filter_ids.as_ref().is_none_or(|ids| ids.contains(&id))
    }
}
