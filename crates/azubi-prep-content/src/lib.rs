// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Authoritative read-only view of the study content corpus.
//!
//! The loader ingests the JSON content manifest, enriches every item
//! with its derived three-tier category, and builds the in-memory
//! indexes behind every content, relationship, and recommendation
//! query.

mod decode;
mod index;
mod load;
mod recommend;
mod relate;
mod search;
mod service;
mod source;
mod validate;

pub use index::{ContentIndex, ContentItem};
pub use load::{load_corpus, LoadEvent, LoadLog, LoadStage, LoadedCorpus};
pub use recommend::{recommend_modules, RecommendOptions, Recommendation, RecommendationWeights};
pub use relate::{
    advanced_content, prerequisites, related_content, RelatedBuckets, RelatedContentCache,
    RelatedItem, RelatedOptions, Relationship,
};
pub use search::{fold_text, search, SearchFilters};
pub use service::{CategoryContentGroup, ContentService};
pub use source::{ContentSource, DirSource, ManifestSection, MemorySource, SourceError};
pub use validate::{validate_corpus, CategoryCounts, CategoryValidationReport};

pub const CRATE_NAME: &str = "azubi-prep-content";
