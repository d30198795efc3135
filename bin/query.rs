/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # NEWSDB Query Tool
//!
//! Interactive menu over the loaded `articles` collection.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin query -- 27017
//! ```

use newsdb::MongoStore;
use newsdb::StoreConfig;
use newsdb::config::parse_port;
use newsdb::logging::init_logging;
use newsdb::menu::run_menu;
use std::env;
use std::io;
use std::process;
use tracing::Level;

fn main() {
    // Keep log lines out of the interactive session unless asked for
    init_logging(Level::WARN);

    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <port>", args[0]);
        process::exit(1);
    }

    let port = match parse_port(&args[1]) {
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
    println!(
        "Connected to MongoDB database '{}' on port {}",
        store.database_name(),
        port
    );

    if let Err(e) = run_menu(&store, io::stdin().lock(), io::stdout().lock()) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
