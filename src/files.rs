//! Small JSON and file-reading helpers shared by the pipelines

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// How many bytes each backward step pulls when tailing a file.
const TAIL_BLOCK: u64 = 8192;

/// Serialise `value` as pretty-printed JSON and write it to `path`.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialising to JSON")?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Read the JSON document at `path` into a typed value.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value = serde_json::from_str(&json)
        .with_context(|| format!("parsing JSON in {}", path.display()))?;
    Ok(value)
}

/// Read the last `limit` lines of the file at `path` without loading the
/// whole file.
///
/// Blocks are read backwards from EOF until enough newlines have been
/// seen. Bytes that are not valid UTF-8 are replaced; output files on
/// these clusters occasionally embed binary noise and the callers only do
/// substring tests.
pub fn tail_lines(path: &Path, limit: usize) -> io::Result<Vec<String>> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();

    let mut start = len;
    let mut newlines = 0usize;
    let mut blocks: Vec<Vec<u8>> = Vec::new();

    // One newline more than `limit` guarantees the window begins on a line
    // boundary; any partial line at the front is trimmed below.
    while start > 0 && newlines <= limit {
        let step = TAIL_BLOCK.min(start);
        start -= step;
        let mut block = vec![0u8; step as usize];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut block)?;
        newlines += block.iter().filter(|b| **b == b'\n').count();
        blocks.push(block);
    }

    let mut tail = Vec::with_capacity(blocks.iter().map(Vec::len).sum());
    for block in blocks.iter().rev() {
        tail.extend_from_slice(block);
    }

    let text = String::from_utf8_lossy(&tail);
    let mut lines: Vec<String> = text.lines().map(str::to_owned).collect();
    if lines.len() > limit {
        lines.drain(..lines.len() - limit);
    }
    Ok(lines)
}

/// True if any of `lines` contains `substring`.
pub fn any_line_contains(lines: &[String], substring: &str) -> bool {
    lines.iter().any(|line| line.contains(substring))
}

/// True if any line of the file at `path` contains `needle`. The whole
/// file is read; use [`tail_lines`] when only the end matters.
pub fn file_contains_line(path: &Path, needle: &str) -> io::Result<bool> {
    let mut bytes = Vec::new();
    File::open(path)?.read_to_end(&mut bytes)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.lines().any(|line| line.contains(needle)))
}
