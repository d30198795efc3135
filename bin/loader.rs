/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # NEWSDB Loader
//!
//! Replaces the `articles` collection with the records of an NDJSON file.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin loader -- articles.json 27017
//! ```

use newsdb::MongoStore;
use newsdb::StoreConfig;
use newsdb::config::parse_port;
use newsdb::loader;
use newsdb::logging::init_logging;
use std::env;
use std::process;
use tracing::Level;

fn main() {
    init_logging(Level::INFO);

    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <json_filename> <port>", args[0]);
        process::exit(1);
    }

    let json_filename = &args[1];
    let port = match parse_port(&args[2]) {
        Ok(port) => port,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let store = match MongoStore::connect(&StoreConfig::new(port)) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error connecting to MongoDB: {:#}", e);
            process::exit(1);
        }
    };

    match loader::load_file(&store, json_filename) {
        Ok(stats) => {
            println!("\nCompleted! Total documents inserted: {}", stats.inserted);
            if stats.skipped > 0 {
                println!("Skipped {} invalid lines", stats.skipped);
            }
        }
        Err(e) if loader::is_file_not_found(&e) => {
            eprintln!("Error: File '{}' not found", json_filename);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
