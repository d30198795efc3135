/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Reports
//!
//! The four read-only reports. Each one runs its pipeline from
//! [`crate::pipelines`] through an [`ArticleStore`] and decodes the result
//! documents into typed rows. None of them modifies the collection.

use crate::pipelines;
use crate::store::ArticleStore;
use crate::window::DayWindow;
use anyhow::Context;
use anyhow::Result;
use mongodb::bson::Bson;
use mongodb::bson::Document;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Year covered by the top sources report
pub const REPORT_YEAR: i32 = 2015;

/// A word and how many times it occurs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WordCount {
    #[serde(rename = "_id")]
    pub word: String,
    pub count: u64,
}

/// News and blog article counts for one day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTypeCounts {
    pub day: String,
    pub news: u64,
    pub blog: u64,
}

/// Which media type published more on a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    NoArticles,
    NewsAhead(u64),
    BlogAhead(u64),
    Tied,
}

impl MediaTypeCounts {
    pub fn comparison(&self) -> Comparison {
        match (self.news, self.blog) {
            (0, 0) => Comparison::NoArticles,
            (news, blog) if news > blog => Comparison::NewsAhead(news - blog),
            (news, blog) if blog > news => Comparison::BlogAhead(blog - news),
            _ => Comparison::Tied,
        }
    }
}

/// A source and its article count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCount {
    /// Raw group key; `None` for articles without a source
    pub source: Option<String>,
    pub count: u64,
}

impl SourceCount {
    pub fn display_name(&self) -> &str {
        match self.source.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Unknown",
        }
    }
}

/// Title and timestamp of a recent article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentArticle {
    pub title: String,
    pub published: String,
}

impl RecentArticle {
    /// Date part of the timestamp (everything before the first `T`)
    pub fn date_label(&self) -> &str {
        if self.published.is_empty() {
            return "Unknown date";
        }
        self.published.split('T').next().unwrap_or(&self.published)
    }
}

#[derive(Debug, Deserialize)]
struct GroupCount {
    #[serde(rename = "_id")]
    key: Bson,
    count: u64,
}

#[derive(Debug, Deserialize)]
struct RecentRow {
    #[serde(default)]
    title: Bson,
    #[serde(default)]
    published: Bson,
}

fn decode<T: DeserializeOwned>(rows: Vec<Document>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            mongodb::bson::from_document(row.clone())
                .with_context(|| format!("Unexpected result row {}", row))
        })
        .collect()
}

/// Text of a value the way it should be shown to the user
fn text_of(value: Bson) -> Option<String> {
    match value {
        Bson::Null | Bson::Undefined => None,
        Bson::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Top words in `content` and `title` of articles with the given media type
pub fn top_words_by_media_type<S: ArticleStore + ?Sized>(
    store: &S,
    media_type: &str,
) -> Result<Vec<WordCount>> {
    decode(store.aggregate(pipelines::top_words(media_type))?)
}

/// News and blog article counts for the day covered by `window`
pub fn article_count_difference<S: ArticleStore + ?Sized>(
    store: &S,
    window: &DayWindow,
) -> Result<MediaTypeCounts> {
    let rows: Vec<GroupCount> = decode(store.aggregate(pipelines::media_type_counts(window))?)?;

    let mut counts = MediaTypeCounts {
        day: window.day_label(),
        news: 0,
        blog: 0,
    };
    for row in rows {
        match text_of(row.key).as_deref() {
            Some("news") => counts.news = row.count,
            Some("blog") => counts.blog = row.count,
            _ => {}
        }
    }

    Ok(counts)
}

/// Sources with the most articles published inside `window`
pub fn top_sources<S: ArticleStore + ?Sized>(store: &S, window: &DayWindow) -> Result<Vec<SourceCount>> {
    let rows: Vec<GroupCount> = decode(store.aggregate(pipelines::top_sources(window))?)?;

    Ok(rows
        .into_iter()
        .map(|row| SourceCount {
            source: text_of(row.key),
            count: row.count,
        })
        .collect())
}

pub fn top_sources_2015<S: ArticleStore + ?Sized>(store: &S) -> Result<Vec<SourceCount>> {
    top_sources(store, &DayWindow::year(REPORT_YEAR))
}

/// Most recently published articles of a source
pub fn recent_articles_by_source<S: ArticleStore + ?Sized>(
    store: &S,
    source: &str,
) -> Result<Vec<RecentArticle>> {
    let rows: Vec<RecentRow> = decode(store.aggregate(pipelines::recent_by_source(source))?)?;

    Ok(rows
        .into_iter()
        .map(|row| RecentArticle {
            title: text_of(row.title).unwrap_or_else(|| "No title".to_string()),
            published: text_of(row.published).unwrap_or_default(),
        })
        .collect())
}
