// SPDX-License-Identifier: Apache-2.0

use crate::index::{ContentIndex, ContentItem};
use azubi_prep_model::{Difficulty, ExamRelevance, ThreeTierCategory};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Case-fold for indexing and matching: NFKC, then lowercase.
#[must_use]
pub fn fold_text(input: &str) -> String {
    input.nfkc().collect::<String>().to_lowercase()
}

/// Folded tokens, split on anything that is not alphanumeric.
#[must_use]
pub fn tokenize(folded: &str) -> Vec<String> {
    folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// The text a content item is findable by: title, description, tags,
/// both category labels.
#[must_use]
pub fn item_haystack(item: &ContentItem) -> String {
    let mut parts: Vec<&str> = vec![
        item.title(),
        item.description(),
        item.legacy_category(),
        item.three_tier_category().as_str(),
    ];
    if let Some(tags) = item.tags() {
        parts.extend(tags.iter().map(String::as_str));
    }
    fold_text(&parts.join(" "))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub category: Option<ThreeTierCategory>,
    pub difficulty: Option<Difficulty>,
    pub exam_relevance: Option<ExamRelevance>,
    pub new_in_2025: Option<bool>,
}

impl SearchFilters {
    #[must_use]
    pub fn accepts(&self, item: &ContentItem) -> bool {
        if self.category.is_some_and(|c| c != item.three_tier_category()) {
            return false;
        }
        if self.difficulty.is_some_and(|d| d != item.difficulty()) {
            return false;
        }
        if self
            .exam_relevance
            .is_some_and(|r| r != item.exam_relevance())
        {
            return false;
        }
        if self.new_in_2025.is_some_and(|n| n != item.new_in_2025()) {
            return false;
        }
        true
    }
}

/// Contains-match over folded haystacks. An empty query matches all;
/// the caller decides where empty queries are legal.
#[must_use]
pub fn search(index: &ContentIndex, query: &str, filters: &SearchFilters) -> Vec<ContentItem> {
    let folded_query = fold_text(query.trim());

    let mut hits: Vec<ContentItem> = if folded_query.is_empty() {
        index.all_items()
    } else if folded_query.chars().all(char::is_alphanumeric) {
        // A separator-free query can only match inside a single token,
        // so the inverted index's vocabulary is an exact prefilter.
        let mut keys = std::collections::BTreeSet::new();
        for (token, token_keys) in index.tokens() {
            if token.contains(&folded_query) {
                keys.extend(token_keys.iter().cloned());
            }
        }
        keys.iter().filter_map(|key| index.item_by_key(key)).collect()
    } else {
        index
            .all_items()
            .into_iter()
            .filter(|item| {
                index
                    .haystack(&item.key())
                    .is_some_and(|h| h.contains(&folded_query))
            })
            .collect()
    };

    hits.retain(|item| filters.accepts(item));
    hits.sort_by_key(ContentItem::order_key);
    hits
}
