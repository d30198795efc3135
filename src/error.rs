/*
 * Copyright (c) 2025-present Dawid Pawlik
 *
 * For educational use only by employees and students of MIMUW.
 * See LICENSE file for details.
 */

//! # Input validation errors
//!
//! Everything else in the crate reports failures through `anyhow`. Bad user
//! input is kept as a typed error so the menu can print it inline and carry on.

use thiserror::Error;

/// Rejected user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// A required prompt was answered with an empty line
    #[error("Error: {0} cannot be empty")]
    Empty(&'static str),

    #[error("Error: Invalid date format. Please use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Error: Invalid port '{0}'")]
    InvalidPort(String),
}

/// Trim a prompt answer and reject it when nothing is left
pub fn require_non_empty<'a>(field: &'static str, input: &'a str) -> Result<&'a str, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Err(InputError::Empty(field))
    } else {
        Ok(trimmed)
    }
}
