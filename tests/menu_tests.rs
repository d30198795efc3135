/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! Interactive session tests
//!
//! Drives the menu with scripted input and checks the transcript it writes.

use anyhow::Result;
use anyhow::bail;
use mongodb::bson::Document;
use mongodb::bson::doc;
use newsdb::ArticleStore;
use newsdb::MemoryStore;
use newsdb::menu::run_menu;
use std::cell::Cell;
use std::io::Cursor;

/// Store wrapper counting aggregations, optionally failing every one
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    aggregations: Cell<usize>,
    fail: bool,
}

impl ArticleStore for CountingStore {
    fn collection_name(&self) -> &str {
        self.inner.collection_name()
    }

    fn collection_exists(&self) -> Result<bool> {
        self.inner.collection_exists()
    }

    fn drop_collection(&self) -> Result<()> {
        self.inner.drop_collection()
    }

    fn insert_many(&self, documents: &[Document]) -> Result<usize> {
        self.inner.insert_many(documents)
    }

    fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        self.aggregations.set(self.aggregations.get() + 1);
        if self.fail {
            bail!("connection reset by peer");
        }
        self.inner.aggregate(pipeline)
    }

    fn count_documents(&self) -> Result<u64> {
        self.inner.count_documents()
    }
}

fn sample_store() -> MemoryStore {
    MemoryStore::with_documents(vec![
        doc! {
            "title": "Markets rally",
            "content": "stocks rally again",
            "media-type": "News",
            "source": "Reuters",
            "published": "2015-09-21T08:00:00Z",
        },
        doc! {
            "title": "Rates hold",
            "content": "rates hold steady",
            "media-type": "news",
            "source": "Reuters",
            "published": "2015-09-21T12:00:00Z",
        },
        doc! {
            "title": "My garden",
            "content": "tomatoes again",
            "media-type": "Blog",
            "source": "Gardener",
            "published": "2015-09-21T18:00:00Z",
        },
    ])
}

fn session<S: ArticleStore>(store: &S, script: &str) -> String {
    let mut output = Vec::new();
    run_menu(store, Cursor::new(script.to_string()), &mut output).unwrap();
    String::from_utf8(output).unwrap()
}

// ============================================================================
// Session flow
// ============================================================================

#[test]
fn test_exit_immediately() {
    let output = session(&sample_store(), "5\n");

    assert!(output.contains("Main Menu"));
    assert!(output.contains("1. Most Common Words by Media Type"));
    assert!(output.contains("5. Exit"));
    assert!(output.contains("\nEnter your choice (1-5): "));
    assert!(output.ends_with("\nExiting program. Goodbye!\n"));
    assert_eq!(output.matches("Main Menu").count(), 1);
}

#[test]
fn test_end_of_input_exits() {
    let output = session(&sample_store(), "");
    assert!(output.ends_with("\nExiting program. Goodbye!\n"));

    // Input ending at a sub-prompt
    let output = session(&sample_store(), "4\n");
    assert!(output.contains("Enter source name: "));
    assert!(output.ends_with("\nExiting program. Goodbye!\n"));
}

#[test]
fn test_invalid_choice_returns_to_menu() {
    let output = session(&sample_store(), "9\nabc\n\n5\n");

    assert_eq!(
        output
            .matches("Invalid choice. Please enter a number between 1 and 5.")
            .count(),
        3
    );
    assert_eq!(output.matches("Main Menu").count(), 4);
}

#[test]
fn test_full_session() {
    let output = session(
        &sample_store(),
        "1\nnews\n2\n2015-09-21\n3\n4\nreuters\n5\n",
    );

    assert!(output.contains("Enter media type (news or blog): "));
    assert!(output.contains("\nTop 5 most common words for 'news':\n"));
    assert!(output.contains("  rally: 2\n"));
    assert!(output.contains("  hold: 2\n"));

    assert!(output.contains("Enter date (YYYY-MM-DD): "));
    assert!(output.contains("\nDate: 2015-09-21\nNews articles: 2\nBlog articles: 1\n"));
    assert!(output.contains("News had more articles by 1\n"));

    assert!(output.contains("\nTop 5 news sources by article count (2015):\n"));
    assert!(output.contains("  1. Reuters: 2 articles\n"));
    assert!(output.contains("  2. Gardener: 1 articles\n"));

    assert!(output.contains("Enter source name: "));
    assert!(output.contains(
        "\nTop 2 most recent articles from 'reuters':\n  1. Rates hold (2015-09-21)\n  2. Markets rally (2015-09-21)\n"
    ));

    assert!(output.ends_with("\nExiting program. Goodbye!\n"));
}

#[test]
fn test_unknown_source() {
    let output = session(&sample_store(), "4\nNobody\n5\n");
    assert!(output.contains("\nSource 'Nobody' was not found.\n"));
}

#[test]
fn test_day_without_articles() {
    let output = session(&sample_store(), "2\n2001-01-01\n5\n");
    assert!(output.contains("\nNo articles were published on this day.\n"));
}

// ============================================================================
// Input validation
// ============================================================================

#[test]
fn test_empty_inputs_are_rejected() {
    let store = CountingStore::default();
    let output = session(&store, "1\n   \n2\n\n4\n\n5\n");

    assert!(output.contains("Error: Media type cannot be empty\n"));
    assert!(output.contains("Error: Date cannot be empty\n"));
    assert!(output.contains("Error: Source name cannot be empty\n"));
    assert_eq!(store.aggregations.get(), 0);
}

#[test]
fn test_bad_date_never_reaches_store() {
    let store = CountingStore::default();
    let script = ["2015/09/21", "2015-13-01", "2015-9-1", "2015- 9-21", "2015-09- 1", "+015-09-21"]
        .iter()
        .map(|date| format!("2\n{}\n", date))
        .collect::<String>()
        + "5\n";
    let output = session(&store, &script);

    assert_eq!(
        output
            .matches("Error: Invalid date format. Please use YYYY-MM-DD\n")
            .count(),
        6
    );
    assert_eq!(store.aggregations.get(), 0);
}

#[test]
fn test_store_failure_keeps_menu_running() {
    let store = CountingStore {
        fail: true,
        ..CountingStore::default()
    };
    let output = session(&store, "3\n1\nnews\n5\n");

    assert_eq!(output.matches("Error: connection reset by peer\n").count(), 2);
    assert_eq!(store.aggregations.get(), 2);
    assert!(output.ends_with("\nExiting program. Goodbye!\n"));
}
