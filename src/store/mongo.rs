/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # MongoDB-backed store
//!
//! Uses the blocking client of the official driver. Every call runs to
//! completion before returning, so the loader's batches are inserted strictly
//! one after another.

use crate::config::StoreConfig;
use crate::store::ArticleStore;
use anyhow::Context;
use anyhow::Result;
use mongodb::bson::Document;
use mongodb::bson::doc;
use mongodb::sync::Client;
use mongodb::sync::Collection;
use mongodb::sync::Database;
use tracing::debug;

/// Article collection on a MongoDB server
pub struct MongoStore {
    // Kept so the connection pool lives as long as the store
    _client: Client,
    database: Database,
    collection: Collection<Document>,
    collection_name: String,
}

impl std::fmt::Debug for MongoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoStore")
            .field("database", &self.database.name())
            .field("collection", &self.collection_name)
            .finish()
    }
}

impl MongoStore {
    /// Connect to the configured server and make sure it answers.
    ///
    /// The driver connects lazily, so a `ping` is issued here to surface an
    /// unreachable server at startup instead of on the first query.
    pub fn connect(config: &StoreConfig) -> Result<Self> {
        let uri = config.uri();
        let client = Client::with_uri_str(&uri)
            .with_context(|| format!("Invalid MongoDB endpoint '{}'", uri))?;

        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 }, None)
            .with_context(|| format!("Failed to reach MongoDB at {}", uri))?;
        debug!("Connected to {} (database '{}')", uri, config.database);

        let collection = database.collection::<Document>(&config.collection);

        Ok(Self {
            _client: client,
            database,
            collection,
            collection_name: config.collection.clone(),
        })
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }
}

impl ArticleStore for MongoStore {
    fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn collection_exists(&self) -> Result<bool> {
        let names = self
            .database
            .list_collection_names(None)
            .context("Failed to list collections")?;
        Ok(names.iter().any(|name| name == &self.collection_name))
    }

    fn drop_collection(&self) -> Result<()> {
        self.collection
            .drop(None)
            .with_context(|| format!("Failed to drop collection '{}'", self.collection_name))
    }

    fn insert_many(&self, documents: &[Document]) -> Result<usize> {
        // The server rejects an empty bulk insert
        if documents.is_empty() {
            return Ok(0);
        }

        let result = self
            .collection
            .insert_many(documents.iter(), None)
            .with_context(|| format!("Failed to insert {} documents", documents.len()))?;
        Ok(result.inserted_ids.len())
    }

    fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        let cursor = self
            .collection
            .aggregate(pipeline, None)
            .context("Failed to run aggregation")?;

        cursor
            .collect::<mongodb::error::Result<Vec<Document>>>()
            .context("Failed to read aggregation results")
    }

    fn count_documents(&self) -> Result<u64> {
        self.collection
            .count_documents(None, None)
            .context("Failed to count documents")
    }
}
