use crate::error::{ProcessingError, Result};
use crate::models::{Timestamp, Variable};
use crate::utils::constants::CHUNK_EXTENSION;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// Collect the distinct timestamps named by a variable's chunk files.
///
/// All chunk indices of one timestamp collapse to a single entry. Any filename
/// that does not parse aborts the whole extraction.
pub fn extract_dates<I, S>(filenames: I, variable: Variable) -> Result<BTreeSet<Timestamp>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    filenames
        .into_iter()
        .map(|name| parse_filename(name.as_ref(), variable))
        .collect()
}

/// Parse `<variable>_YYYY_MM_DD_HH_<index>.bin` into its timestamp
pub fn parse_filename(filename: &str, variable: Variable) -> Result<Timestamp> {
    let prefix = format!("{}_", variable.file_token());
    let stem = filename.strip_prefix(&prefix).unwrap_or(filename);
    let stem = stem.strip_suffix(CHUNK_EXTENSION).unwrap_or(stem);
    let stem = strip_chunk_index(stem);

    parse_date_stem(stem, filename)
}

/// Drop a trailing `_` followed by one or two digits
fn strip_chunk_index(stem: &str) -> &str {
    match stem.rsplit_once('_') {
        Some((head, tail))
            if (1..=2).contains(&tail.len()) && tail.bytes().all(|b| b.is_ascii_digit()) =>
        {
            head
        }
        _ => stem,
    }
}

/// Strict `YYYY_MM_DD_HH`; components may or may not be zero-padded
fn parse_date_stem(stem: &str, filename: &str) -> Result<Timestamp> {
    // chrono needs a minute to build a datetime; pin it to zero
    NaiveDateTime::parse_from_str(&format!("{}_0", stem), "%Y_%m_%d_%H_%M")
        .map(Timestamp::from_datetime)
        .map_err(|source| ProcessingError::DateParse {
            filename: filename.to_string(),
            source,
        })
}
