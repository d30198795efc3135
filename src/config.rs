/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Store endpoint configuration
//!
//! Both executables take only a port on the command line. Host, database and
//! collection are fixed, but can be overridden programmatically so the
//! live-server tests can point at a scratch database.

use crate::COLLECTION_NAME;
use crate::DATABASE_NAME;
use crate::DEFAULT_HOST;
use crate::error::InputError;

/// Where the article collection lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub collection: String,
}

impl StoreConfig {
    /// Default endpoint on the given port
    pub fn new(port: u16) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port,
            database: DATABASE_NAME.to_string(),
            collection: COLLECTION_NAME.to_string(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Connection string understood by the MongoDB driver
    pub fn uri(&self) -> String {
        format!("mongodb://{}:{}", self.host, self.port)
    }
}

/// Parse a port given on the command line
pub fn parse_port(input: &str) -> Result<u16, InputError> {
    match input.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(InputError::InvalidPort(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let config = StoreConfig::new(27017);

        assert_eq!(config.host, "localhost");
        assert_eq!(config.database, "291db");
        assert_eq!(config.collection, "articles");
        assert_eq!(config.uri(), "mongodb://localhost:27017");
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::new(28000)
            .with_host("db.internal")
            .with_database("scratch")
            .with_collection("articles_test");

        assert_eq!(config.uri(), "mongodb://db.internal:28000");
        assert_eq!(config.database, "scratch");
        assert_eq!(config.collection, "articles_test");
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("27017").unwrap(), 27017);
        assert_eq!(parse_port(" 8080 ").unwrap(), 8080);

        assert!(matches!(parse_port("0"), Err(InputError::InvalidPort(_))));
        assert!(matches!(parse_port("70000"), Err(InputError::InvalidPort(_))));
        assert!(matches!(parse_port("abc"), Err(InputError::InvalidPort(_))));
    }
}
