//! Mail nickname derivation
//!
//! The one piece of directory logic computed client-side: new accounts get a
//! `firstname.lastname` nickname derived from the person's Spanish-form
//! names. Tokens are lowercased, NFD-normalized, stripped of combining marks
//! and of anything outside `[a-z0-9]`. When `first.surname` already exists
//! among the currently loaded users, the second surname token is appended
//! with no separator (`jose.garcia` -> `jose.garcialopez`).

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Errors raised while deriving a nickname
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NicknameError {
    /// No usable token survived normalization of the given names
    #[error("given names contain no usable characters")]
    EmptyGivenName,

    /// No usable token survived normalization of the surnames
    #[error("surnames contain no usable characters")]
    EmptySurname,

    /// The short form collides and there is no second surname to fall back on
    #[error("nickname {0} is taken and no second surname is available")]
    Exhausted(String),
}

/// Normalizes one name token: lowercase, NFD, drop combining marks, keep
/// only ASCII alphanumerics
fn normalize_token(token: &str) -> String {
    token
        .to_lowercase()
        .nfd()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Splits a name field into normalized, non-empty tokens
fn tokens(field: &str) -> Vec<String> {
    field
        .split_whitespace()
        .map(normalize_token)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Derives the mail nickname for a new directory user
///
/// `taken` reports whether a candidate nickname is already present in the
/// currently loaded user list; the caller decides what "loaded" means.
///
/// "José María" + "García López" yields `jose.garcia`, or `jose.garcialopez`
/// when the short form is taken.
pub fn mail_nickname(
    given_names: &str,
    surnames: &str,
    taken: impl Fn(&str) -> bool,
) -> Result<String, NicknameError> {
    let given = tokens(given_names);
    let sur = tokens(surnames);

    let first_given = given.first().ok_or(NicknameError::EmptyGivenName)?;
    let first_surname = sur.first().ok_or(NicknameError::EmptySurname)?;

    let short = format!("{first_given}.{first_surname}");
    if !taken(&short) {
        return Ok(short);
    }

    match sur.get(1) {
        Some(second_surname) => {
            let long = format!("{first_given}.{first_surname}{second_surname}");
            if taken(&long) {
                Err(NicknameError::Exhausted(long))
            } else {
                Ok(long)
            }
        }
        None => Err(NicknameError::Exhausted(short)),
    }
}
