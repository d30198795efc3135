/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Aggregation pipelines
//!
//! One builder per report. The pipelines are plain documents; filtering,
//! tokenising and counting all happen inside the store.
//!
//! Ranked pipelines sort on `count` alone. Rows with equal counts come back in
//! whatever order the store produces.

use crate::TOP_N;
use crate::window::DayWindow;
use mongodb::bson::Document;
use mongodb::bson::doc;

/// Tokens kept by the word count: letters only, nothing else
pub const WORD_PATTERN: &str = "^[a-zA-Z]+$";

/// Media types compared by the daily count
pub const COMPARED_MEDIA_TYPES: &str = "^(news|blog)$";

/// Case-insensitive exact match on a string field
fn exact_match_ignoring_case(value: &str) -> Document {
    doc! {
        "$regex": format!("^{}$", regex::escape(value)),
        "$options": "i"
    }
}

fn published_within(window: &DayWindow) -> Document {
    doc! {
        "$match": {
            "published": { "$gte": window.start.as_str(), "$lte": window.end.as_str() }
        }
    }
}

/// Five most frequent alphabetic words in `content` and `title` for a media type
pub fn top_words(media_type: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "media-type": exact_match_ignoring_case(media_type) } },
        doc! {
            "$project": {
                "combined_text": {
                    "$concat": [
                        { "$ifNull": ["$content", ""] },
                        " ",
                        { "$ifNull": ["$title", ""] }
                    ]
                }
            }
        },
        doc! {
            "$project": {
                "words": { "$split": [{ "$toLower": "$combined_text" }, " "] }
            }
        },
        doc! { "$unwind": "$words" },
        doc! { "$match": { "words": { "$regex": WORD_PATTERN, "$ne": "" } } },
        doc! { "$group": { "_id": "$words", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": TOP_N }
    ]
}

/// Article counts per lowercased media type ("news"/"blog") inside a window
pub fn media_type_counts(window: &DayWindow) -> Vec<Document> {
    vec![
        published_within(window),
        doc! {
            "$match": {
                "media-type": { "$regex": COMPARED_MEDIA_TYPES, "$options": "i" }
            }
        },
        doc! {
            "$group": {
                "_id": { "$toLower": "$media-type" },
                "count": { "$sum": 1 }
            }
        }
    ]
}

/// Five sources with the most articles inside a window, grouped on the raw value
pub fn top_sources(window: &DayWindow) -> Vec<Document> {
    vec![
        published_within(window),
        doc! { "$group": { "_id": "$source", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": TOP_N }
    ]
}

/// Five most recently published articles of a source, compared case-insensitively
pub fn recent_by_source(source: &str) -> Vec<Document> {
    vec![
        doc! {
            "$match": {
                "$expr": { "$eq": [{ "$toLower": "$source" }, source.to_lowercase()] }
            }
        },
        doc! { "$sort": { "published": -1 } },
        doc! { "$limit": TOP_N },
        doc! {
            "$project": {
                "title": { "$ifNull": ["$title", "No title"] },
                "published": { "$ifNull": ["$published", ""] }
            }
        }
    ]
}
