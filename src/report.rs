/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! Text rendering of report results.

use crate::queries::Comparison;
use crate::queries::MediaTypeCounts;
use crate::queries::RecentArticle;
use crate::queries::SourceCount;
use crate::queries::WordCount;
use std::io;
use std::io::Write;

pub fn write_top_words<W: Write>(out: &mut W, media_type: &str, words: &[WordCount]) -> io::Result<()> {
    writeln!(out, "\nTop 5 most common words for '{}':", media_type)?;
    if words.is_empty() {
        writeln!(out, "  No words found")?;
    }
    for word in words {
        writeln!(out, "  {}: {}", word.word, word.count)?;
    }
    Ok(())
}

pub fn write_count_difference<W: Write>(out: &mut W, counts: &MediaTypeCounts) -> io::Result<()> {
    let comparison = counts.comparison();
    if comparison == Comparison::NoArticles {
        return writeln!(out, "\nNo articles were published on this day.");
    }

    writeln!(out, "\nDate: {}", counts.day)?;
    writeln!(out, "News articles: {}", counts.news)?;
    writeln!(out, "Blog articles: {}", counts.blog)?;

    match comparison {
        Comparison::NewsAhead(diff) => writeln!(out, "News had more articles by {}", diff),
        Comparison::BlogAhead(diff) => writeln!(out, "Blog had more articles by {}", diff),
        _ => writeln!(out, "Both media types had the same number of articles"),
    }
}

pub fn write_top_sources<W: Write>(out: &mut W, year: i32, sources: &[SourceCount]) -> io::Result<()> {
    writeln!(out, "\nTop 5 news sources by article count ({}):", year)?;
    if sources.is_empty() {
        writeln!(out, "  No articles found for {}", year)?;
    }
    for (rank, source) in sources.iter().enumerate() {
        writeln!(out, "  {}. {}: {} articles", rank + 1, source.display_name(), source.count)?;
    }
    Ok(())
}

pub fn write_recent_articles<W: Write>(
    out: &mut W,
    source: &str,
    articles: &[RecentArticle],
) -> io::Result<()> {
    if articles.is_empty() {
        return writeln!(out, "\nSource '{}' was not found.", source);
    }

    writeln!(out, "\nTop {} most recent articles from '{}':", articles.len(), source)?;
    for (rank, article) in articles.iter().enumerate() {
        writeln!(out, "  {}. {} ({})", rank + 1, article.title, article.date_label())?;
    }
    Ok(())
}
