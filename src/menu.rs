/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Interactive menu
//!
//! A single-state loop: print the menu, read a choice, run the matching report
//! and come back. Input problems and failed reports are printed inline and
//! never end the loop; only choice 5 or the end of input does.

use crate::error::InputError;
use crate::error::require_non_empty;
use crate::queries;
use crate::queries::REPORT_YEAR;
use crate::report;
use crate::store::ArticleStore;
use crate::window::DayWindow;
use anyhow::Context;
use anyhow::Result;
use std::io::BufRead;
use std::io::Write;
use tracing::debug;

const RULE: &str = "==================================================";

/// An entry of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    TopWords,
    CountDifference,
    TopSources,
    RecentArticles,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::TopWords),
            "2" => Some(Self::CountDifference),
            "3" => Some(Self::TopSources),
            "4" => Some(Self::RecentArticles),
            "5" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Whether the loop should keep reading choices
enum Step {
    Continue,
    EndOfInput,
}

/// Run the menu until the user exits or `input` is exhausted
pub fn run_menu<S, R, W>(store: &S, mut input: R, mut output: W) -> Result<()>
where
    S: ArticleStore + ?Sized,
    R: BufRead,
    W: Write,
{
    loop {
        write_menu(&mut output)?;

        let Some(line) = prompt(&mut input, &mut output, "\nEnter your choice (1-5): ")? else {
            break;
        };

        let step = match MenuChoice::parse(&line) {
            Some(MenuChoice::Exit) => break,
            Some(choice) => run_choice(store, choice, &mut input, &mut output)?,
            None => {
                writeln!(output, "Invalid choice. Please enter a number between 1 and 5.")?;
                Step::Continue
            }
        };

        if let Step::EndOfInput = step {
            break;
        }
    }

    writeln!(output, "\nExiting program. Goodbye!")?;
    output.flush()?;
    Ok(())
}

fn write_menu<W: Write>(output: &mut W) -> Result<()> {
    writeln!(output, "\n{}", RULE)?;
    writeln!(output, "Main Menu")?;
    writeln!(output, "{}", RULE)?;
    writeln!(output, "1. Most Common Words by Media Type")?;
    writeln!(output, "2. Article Count Difference Between News and Blogs")?;
    writeln!(output, "3. Top 5 News Sources by Article Count ({})", REPORT_YEAR)?;
    writeln!(output, "4. 5 Most Recent Articles by Source")?;
    writeln!(output, "5. Exit")?;
    writeln!(output, "{}", RULE)?;
    Ok(())
}

/// Print `message`, then read one line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> Result<Option<String>> {
    write!(output, "{}", message)?;
    output.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read from standard input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn report_failure<W: Write>(output: &mut W, error: &anyhow::Error) -> Result<()> {
    debug!("Report failed: {:?}", error);
    writeln!(output, "Error: {:#}", error)?;
    Ok(())
}

fn report_invalid_input<W: Write>(output: &mut W, error: &InputError) -> Result<()> {
    writeln!(output, "{}", error)?;
    Ok(())
}

fn run_choice<S, R, W>(store: &S, choice: MenuChoice, input: &mut R, output: &mut W) -> Result<Step>
where
    S: ArticleStore + ?Sized,
    R: BufRead,
    W: Write,
{
    match choice {
        MenuChoice::TopWords => {
            let Some(answer) = prompt(input, output, "Enter media type (news or blog): ")? else {
                return Ok(Step::EndOfInput);
            };
            match require_non_empty("Media type", &answer) {
                Err(e) => report_invalid_input(output, &e)?,
                Ok(media_type) => match queries::top_words_by_media_type(store, media_type) {
                    Ok(words) => report::write_top_words(output, media_type, &words)?,
                    Err(e) => report_failure(output, &e)?,
                },
            }
        }
        MenuChoice::CountDifference => {
            let Some(answer) = prompt(input, output, "Enter date (YYYY-MM-DD): ")? else {
                return Ok(Step::EndOfInput);
            };
            let window = require_non_empty("Date", &answer).and_then(DayWindow::parse);
            match window {
                Err(e) => report_invalid_input(output, &e)?,
                Ok(window) => match queries::article_count_difference(store, &window) {
                    Ok(counts) => report::write_count_difference(output, &counts)?,
                    Err(e) => report_failure(output, &e)?,
                },
            }
        }
        MenuChoice::TopSources => match queries::top_sources_2015(store) {
            Ok(sources) => report::write_top_sources(output, REPORT_YEAR, &sources)?,
            Err(e) => report_failure(output, &e)?,
        },
        MenuChoice::RecentArticles => {
            let Some(answer) = prompt(input, output, "Enter source name: ")? else {
                return Ok(Step::EndOfInput);
            };
            match require_non_empty("Source name", &answer) {
                Err(e) => report_invalid_input(output, &e)?,
                Ok(source) => match queries::recent_articles_by_source(store, source) {
                    Ok(articles) => report::write_recent_articles(output, source, &articles)?,
                    Err(e) => report_failure(output, &e)?,
                },
            }
        }
        MenuChoice::Exit => return Ok(Step::EndOfInput),
    }

    Ok(Step::Continue)
}
