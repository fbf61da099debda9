//! In-memory document catalog
//!
//! The catalog is loaded once by the caller and passed in wherever documents are
//! selected by id. It never decides merge order: a selection keeps the order it was
//! given in.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{DocumentRequest, DocumentType};

/// Available source documents, keyed by id
#[derive(Debug, Clone, Default)]
pub struct DocumentCatalog {
    documents: Vec<DocumentRequest>,
    index: HashMap<String, usize>,
}

#[derive(Deserialize)]
struct CatalogFile {
    documents: Vec<DocumentRequest>,
}

impl DocumentCatalog {
    /// Build a catalog; later duplicates of an id replace earlier ones
    pub fn new(documents: Vec<DocumentRequest>) -> Self {
        let mut catalog = Self::default();
        for doc in documents {
            match catalog.index.get(&doc.id) {
                Some(&slot) => catalog.documents[slot] = doc,
                None => {
                    catalog.index.insert(doc.id.clone(), catalog.documents.len());
                    catalog.documents.push(doc);
                }
            }
        }
        catalog
    }

    /// Parse `{"documents": [...]}` or a bare array of documents
    pub fn from_json(json: &str) -> Result<Self> {
        let documents = if json.trim_start().starts_with('{') {
            serde_json::from_str::<CatalogFile>(json)?.documents
        } else {
            serde_json::from_str::<Vec<DocumentRequest>>(json)?
        };
        Ok(Self::new(documents))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&DocumentRequest> {
        self.index.get(id).map(|&slot| &self.documents[slot])
    }

    /// Turn an ordered id selection into document requests, keeping the order
    pub fn resolve<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<DocumentRequest>> {
        ids.iter()
            .map(|id| {
                let id = id.as_ref();
                self.get(id)
                    .cloned()
                    .ok_or_else(|| Error::InvalidRequest(format!("Unknown document id: {}", id)))
            })
            .collect()
    }

    /// Documents grouped by category, categories ordered by priority and documents
    /// by name
    pub fn by_category(&self) -> Vec<(DocumentType, Vec<&DocumentRequest>)> {
        let mut groups: BTreeMap<(u8, DocumentType), Vec<&DocumentRequest>> = BTreeMap::new();
        for doc in &self.documents {
            groups
                .entry((doc.doc_type.config().priority, doc.doc_type))
                .or_default()
                .push(doc);
        }

        groups
            .into_iter()
            .map(|((_, doc_type), mut docs)| {
                docs.sort_by(|a, b| a.name.cmp(&b.name));
                (doc_type, docs)
            })
            .collect()
    }
}
