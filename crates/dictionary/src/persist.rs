//! Flat-file persistence: one `key|value|count` line per entry, ascending by key.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::entry::Entry;
use crate::error::DictionaryError;
use crate::tree::WordTree;

pub const DELIMITER: char = '|';

const FORBIDDEN: [char; 3] = [DELIMITER, '\n', '\r'];

/// A persisted line that was skipped during load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct MalformedRecord {
    pub line: usize,
    pub reason: &'static str,
}

#[derive(Debug)]
pub enum LoadOutcome {
    /// The file does not exist; the caller starts from an empty dictionary.
    Missing,
    Loaded {
        tree: WordTree,
        skipped: Vec<MalformedRecord>,
    },
}

pub fn encode_line(entry: &Entry) -> Result<String, DictionaryError> {
    let forbidden = |field: &str| field.contains(FORBIDDEN);
    if entry.key.is_empty() || forbidden(&entry.key) || forbidden(&entry.value) {
        return Err(DictionaryError::Unencodable {
            key: entry.key.clone(),
        });
    }
    Ok(format!(
        "{}{DELIMITER}{}{DELIMITER}{}",
        entry.key, entry.value, entry.count
    ))
}

/// Splits on the first two delimiters; the rest must be the access count.
pub fn decode_line(line: &str) -> Result<Entry, &'static str> {
    let mut fields = line.splitn(3, DELIMITER);
    let (Some(key), Some(value), Some(count)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err("expected three '|'-separated fields");
    };
    if key.is_empty() {
        return Err("empty key");
    }
    if key.contains(FORBIDDEN) || value.contains(FORBIDDEN) {
        return Err("line break inside a field");
    }
    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|_| "access count is not a non-negative integer")?;
    Ok(Entry::new(key, value, count))
}

pub fn encode(tree: &WordTree) -> Result<String, DictionaryError> {
    let mut out = String::new();
    for entry in tree {
        out.push_str(&encode_line(entry)?);
        out.push('\n');
    }
    Ok(out)
}

/// Encodes the whole tree before writing anything, so an unencodable entry
/// leaves `out` untouched. Returns the number of entries written.
pub fn write_entries<W: Write>(tree: &WordTree, mut out: W) -> Result<usize, DictionaryError> {
    let contents = encode(tree)?;
    out.write_all(contents.as_bytes())?;
    out.flush()?;
    Ok(contents.lines().count())
}

/// Reads every line into a fresh tree. Blank lines are ignored, malformed
/// ones are skipped and reported. Later duplicates overwrite earlier ones.
pub fn read_entries<R: BufRead>(mut reader: R) -> io::Result<(WordTree, Vec<MalformedRecord>)> {
    let mut tree = WordTree::new();
    let mut skipped = Vec::new();
    let mut buf = Vec::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let Ok(line) = std::str::from_utf8(&buf) else {
            skipped.push(MalformedRecord {
                line: line_no,
                reason: "not valid UTF-8",
            });
            continue;
        };
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            continue;
        }
        match decode_line(line) {
            Ok(Entry { key, value, count }) => {
                tree.insert_with_count(key, value, count);
            }
            Err(reason) => skipped.push(MalformedRecord {
                line: line_no,
                reason,
            }),
        }
    }
    Ok((tree, skipped))
}

/// Writes the whole tree in key order. The file is only touched once every
/// entry has been encoded.
pub fn save(tree: &WordTree, path: impl AsRef<Path>) -> Result<usize, DictionaryError> {
    let path = path.as_ref();
    let mut contents = Vec::new();
    let written = write_entries(tree, &mut contents)?;
    fs::write(path, contents).map_err(|e| DictionaryError::io(path, e))?;
    info!("saved {written} words to {}", path.display());
    Ok(written)
}

pub fn load(path: impl AsRef<Path>) -> Result<LoadOutcome, DictionaryError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("{} does not exist, starting empty", path.display());
            return Ok(LoadOutcome::Missing);
        }
        Err(e) => return Err(DictionaryError::io(path, e)),
    };
    let (tree, skipped) =
        read_entries(BufReader::new(file)).map_err(|e| DictionaryError::io(path, e))?;
    for record in &skipped {
        warn!("{}: skipped {record}", path.display());
    }
    info!(
        "loaded {} words from {} ({} skipped)",
        tree.len(),
        path.display(),
        skipped.len()
    );
    Ok(LoadOutcome::Loaded { tree, skipped })
}
