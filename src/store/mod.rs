/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Document store boundary
//!
//! The loader and the reports never talk to a database driver directly. They
//! go through [`ArticleStore`], which covers the handful of collection
//! operations the tool needs: replace the collection, bulk insert, and run an
//! aggregation pipeline.

use anyhow::Result;
use mongodb::bson::Document;

mod eval;
pub mod memory;
pub mod mongo;

/// A single named collection of article documents
pub trait ArticleStore {
    /// Name of the collection this store reads and writes
    fn collection_name(&self) -> &str;

    fn collection_exists(&self) -> Result<bool>;

    /// Remove the collection and every document in it
    fn drop_collection(&self) -> Result<()>;

    /// Insert all documents in one bulk call, returning how many were stored
    fn insert_many(&self, documents: &[Document]) -> Result<usize>;

    /// Run an aggregation pipeline and collect every result document
    fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>>;

    fn count_documents(&self) -> Result<u64>;
}

impl<S: ArticleStore + ?Sized> ArticleStore for &S {
    fn collection_name(&self) -> &str {
        (**self).collection_name()
    }

    fn collection_exists(&self) -> Result<bool> {
        (**self).collection_exists()
    }

    fn drop_collection(&self) -> Result<()> {
        (**self).drop_collection()
    }

    fn insert_many(&self, documents: &[Document]) -> Result<usize> {
        (**self).insert_many(documents)
    }

    fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        (**self).aggregate(pipeline)
    }

    fn count_documents(&self) -> Result<u64> {
        (**self).count_documents()
    }
}
