/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # NDJSON bulk loader
//!
//! Streams a newline-delimited JSON file into the article collection:
//!
//! - The collection is dropped first, so a rerun replaces the data instead of
//!   appending to it.
//! - Lines are read one at a time and parsed independently. Blank lines are
//!   ignored; lines that are not a JSON object are logged and skipped.
//! - Parsed documents are buffered and inserted in batches of
//!   [`BATCH_SIZE`](crate::BATCH_SIZE), so memory stays bounded whatever the
//!   file size. The last partial batch is flushed at end of file.

use crate::BATCH_SIZE;
use crate::store::ArticleStore;
use anyhow::Context;
use anyhow::Result;
use mongodb::bson::Document;
use serde_json::Value;
use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use tracing::warn;

/// Outcome of a load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Documents stored in the collection
    pub inserted: usize,
    /// Non-blank lines rejected by the parser
    pub skipped: usize,
    /// Bulk insert calls issued
    pub batches: usize,
}

/// Why a single line was not turned into a document
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("{0}")]
    Bson(#[from] mongodb::bson::ser::Error),
}

/// Parse one trimmed, non-empty line into a document
pub fn parse_record(line: &str) -> Result<Document, RecordError> {
    let value: Value = serde_json::from_str(line)?;

    let kind = match &value {
        Value::Object(_) => return Ok(mongodb::bson::to_document(&value)?),
        Value::Array(_) => "an array",
        Value::String(_) => "a string",
        Value::Number(_) => "a number",
        Value::Bool(_) => "a boolean",
        Value::Null => "null",
    };
    Err(RecordError::NotAnObject(kind))
}

/// Replace the collection with the records of an NDJSON file
pub fn load_file<S: ArticleStore + ?Sized>(store: &S, path: impl AsRef<Path>) -> Result<LoadStats> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?;

    info!("Loading data from {}...", path.display());
    load_from_reader(store, BufReader::new(file), BATCH_SIZE)
}

/// Replace the collection with the records read from `reader`
pub fn load_from_reader<S, R>(store: &S, reader: R, batch_size: usize) -> Result<LoadStats>
where
    S: ArticleStore + ?Sized,
    R: BufRead,
{
    replace_collection(store)?;

    let batch_size = batch_size.max(1);
    let mut stats = LoadStats::default();
    let mut batch: Vec<Document> = Vec::with_capacity(batch_size);

    for (idx, line) in reader.lines().enumerate() {
        let line_num = idx + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_num))?;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_record(trimmed) {
            Ok(document) => {
                batch.push(document);
                if batch.len() >= batch_size {
                    flush(store, &mut batch, &mut stats)?;
                }
            }
            Err(e) => {
                stats.skipped += 1;
                warn!("Skipping invalid JSON on line {}: {}", line_num, e);
            }
        }
    }

    if !batch.is_empty() {
        flush(store, &mut batch, &mut stats)?;
    }

    Ok(stats)
}

fn replace_collection<S: ArticleStore + ?Sized>(store: &S) -> Result<()> {
    if store.collection_exists()? {
        store.drop_collection()?;
        info!("Dropped existing '{}' collection", store.collection_name());
    }
    Ok(())
}

fn flush<S: ArticleStore + ?Sized>(
    store: &S,
    batch: &mut Vec<Document>,
    stats: &mut LoadStats,
) -> Result<()> {
    let inserted = store.insert_many(batch)?;
    stats.inserted += inserted;
    stats.batches += 1;
    batch.clear();

    info!("Inserted {} documents...", stats.inserted);
    Ok(())
}

/// Whether a load failed because the input file does not exist
pub fn is_file_not_found(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|e| e.kind() == io::ErrorKind::NotFound)
}
