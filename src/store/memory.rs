/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # In-memory store
//!
//! Holds a single collection in process and runs aggregation pipelines with
//! the evaluator in [`super::eval`]. A missing collection and an empty one are
//! kept apart so drop-and-replace behaves as it does on a server.

use crate::COLLECTION_NAME;
use crate::store::ArticleStore;
use crate::store::eval::run_pipeline;
use anyhow::Result;
use mongodb::bson::Document;
use mongodb::bson::oid::ObjectId;
use parking_lot::RwLock;

#[derive(Debug)]
pub struct MemoryStore {
    collection_name: String,
    /// `None` until the first insert creates the collection
    documents: RwLock<Option<Vec<Document>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collection_name: COLLECTION_NAME.to_string(),
            documents: RwLock::new(None),
        }
    }

    /// Store whose collection already holds `documents`
    pub fn with_documents(documents: Vec<Document>) -> Self {
        let store = Self::new();
        // Infallible for the in-memory store
        let _ = store.insert_many(&documents);
        store
    }

    /// Snapshot of every stored document, in insertion order
    pub fn documents(&self) -> Vec<Document> {
        self.documents.read().clone().unwrap_or_default()
    }
}

impl ArticleStore for MemoryStore {
    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn collection_exists(&self) -> Result<bool> {
        Ok(self.documents.read().is_some())
    }

    fn drop_collection(&self) -> Result<()> {
        *self.documents.write() = None;
        Ok(())
    }

    fn insert_many(&self, documents: &[Document]) -> Result<usize> {
        let mut guard = self.documents.write();
        let collection = guard.get_or_insert_with(Vec::new);

        for document in documents {
            let mut stored = document.clone();
            if !stored.contains_key("_id") {
                stored.insert("_id", ObjectId::new());
            }
            collection.push(stored);
        }

        Ok(documents.len())
    }

    fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        run_pipeline(self.documents(), &pipeline)
    }

    fn count_documents(&self) -> Result<u64> {
        Ok(self.documents.read().as_ref().map_or(0, |docs| docs.len() as u64))
    }
}
