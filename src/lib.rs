/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # NEWSDB - Article Loader and Reports
//!
//! This library loads newline-delimited JSON articles into a document store
//! and runs a fixed set of aggregation reports against them.
//!
//! The store is reached through the [`ArticleStore`] trait. [`MongoStore`]
//! talks to a MongoDB server; [`MemoryStore`] keeps the collection in process
//! and evaluates the same aggregation pipelines, which is what the tests use.

pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod menu;
pub mod pipelines;
pub mod queries;
pub mod report;
pub mod store;
pub mod window;

pub use config::StoreConfig;
pub use error::InputError;
pub use loader::LoadStats;
pub use store::ArticleStore;
pub use store::memory::MemoryStore;
pub use store::mongo::MongoStore;
pub use window::DayWindow;

/// Host every executable connects to
pub const DEFAULT_HOST: &str = "localhost";

/// Database holding the article collection
pub const DATABASE_NAME: &str = "291db";

/// Collection the loader replaces and the query tool reads
pub const COLLECTION_NAME: &str = "articles";

/// Number of parsed records buffered before a bulk insert
pub const BATCH_SIZE: usize = 5000;

/// Number of rows every ranked report returns
pub const TOP_N: i64 = 5;
