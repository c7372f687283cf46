//! Collections: named, ordered groups of documents.
//!
//! Every document belongs to exactly one collection, decided by the scanner
//! when the file is loaded. A collection starts in discovery order and is
//! reordered only by an explicit [`Collection::sort_by`] call; the build
//! sorts with [`publication_order`] (newest first).
//!
//! [`Collections`] keeps collections in the order their first document was
//! discovered, which is the order the build renders them in.

use crate::config::CollectionConfig;
use crate::document::Document;
use crate::paginator::{Paginator, PaginatorError};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    config: CollectionConfig,
    documents: Vec<Document>,
}

impl Collection {
    pub fn new(name: impl Into<String>, config: CollectionConfig) -> Self {
        Self {
            name: name.into(),
            config,
            documents: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Append a document.
    pub fn add(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Reorder documents with the given comparator. The sort is stable.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Document, &Document) -> Ordering,
    {
        self.documents.sort_by(compare);
    }

    /// Page the documents by the configured `pagination.per_page`.
    pub fn paginate(&self) -> Result<Paginator<'_, Document>, PaginatorError> {
        Paginator::new(&self.documents, self.config.pagination.per_page)
    }

    pub fn item_layout(&self) -> Option<&str> {
        self.config.layout.as_deref()
    }

    pub fn listing_layout(&self) -> Option<&str> {
        self.config.list_layout.as_deref()
    }

    pub fn permalink_pattern(&self) -> Option<&str> {
        self.config.permalink.as_deref()
    }

    pub fn list_permalink(&self) -> Option<&str> {
        self.config.list_permalink.as_deref()
    }
}

/// Newest first. Undated documents count as the Unix epoch; ties are broken
/// by slug, greater first (bytewise).
pub fn publication_order(a: &Document, b: &Document) -> Ordering {
    let timestamp = |doc: &Document| doc.date().map(|d| d.timestamp()).unwrap_or(0);
    timestamp(b)
        .cmp(&timestamp(a))
        .then_with(|| b.slug().as_bytes().cmp(a.slug().as_bytes()))
}

/// Collections in first-discovery order.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    entries: Vec<Collection>,
}

impl Collections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.entries.iter().find(|c| c.name == name)
    }

    #[cfg(test)]
    pub fn get_or_insert_with<F>(&mut self, name: &str, make_config: F) -> &mut Collection
    where
        F: FnOnce() -> CollectionConfig,
    {
        match self.get_or_try_insert_with(name, || Ok::<_, std::convert::Infallible>(make_config())) {
            Ok(collection) => collection,
            Err(never) => match never {},
        }
    }

    /// The collection called `name`, created with the config from
    /// `make_config` if this is the first time the name is seen. Nothing is
    /// inserted if `make_config` fails.
    pub fn get_or_try_insert_with<F, E>(
        &mut self,
        name: &str,
        make_config: F,
    ) -> Result<&mut Collection, E>
    where
        F: FnOnce() -> Result<CollectionConfig, E>,
    {
        let index = match self.entries.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.entries.push(Collection::new(name, make_config()?));
                self.entries.len() - 1
            }
        };
        Ok(&mut self.entries[index])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Collection> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Collection> {
        self.entries.iter_mut()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of documents across all collections.
    pub fn document_count(&self) -> usize {
        self.entries.iter().map(Collection::len).sum()
    }
}

impl<'a> IntoIterator for &'a Collections {
    type Item = &'a Collection;
    type IntoIter = std::slice::Iter<'a, Collection>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
