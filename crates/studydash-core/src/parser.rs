//! Record file parser.
//!
//! A record file is a Markdown document whose YAML front-matter header,
//! delimited by `---` lines, carries the exam metadata:
//!
//! ```text
//! ---
//! current_semester: 2
//! exams:
//!   - module: Algebra
//!     semester: 1
//!     ects: 5
//!     status: passed
//!     grade: 2.3
//! ---
//! Free-form notes.
//! ```

use std::path::Path;

use crate::error::RecordError;
use crate::model::Metadata;

const DELIMITER: &str = "---";

/// A parsed record file: header metadata plus the Markdown body.
#[derive(Debug, Clone, Default)]
pub struct RecordDocument {
    pub metadata: Metadata,
    pub body: String,
}

/// Read and parse a record file.
///
/// The file handle is released as soon as the content has been read.
pub fn parse_record_file(path: &Path) -> Result<RecordDocument, RecordError> {
    let content = std::fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_record_str(&content)
}

/// Parse record file content (useful for testing).
///
/// A document without a leading `---` line has empty metadata and the whole
/// text as its body.
pub fn parse_record_str(content: &str) -> Result<RecordDocument, RecordError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let Some((header, body)) = split_front_matter(content)? else {
        return Ok(RecordDocument {
            metadata: Metadata::default(),
            body: content.to_string(),
        });
    };

    let metadata = if header.trim().is_empty() {
        Metadata::default()
    } else {
        serde_yaml::from_str(header)?
    };

    Ok(RecordDocument {
        metadata,
        body: body.to_string(),
    })
}

/// Split `content` into `(header, body)` if it opens with a delimiter line.
fn split_front_matter(content: &str) -> Result<Option<(&str, &str)>, RecordError> {
    let mut lines = content.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if !is_delimiter(first) {
        return Ok(None);
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if is_delimiter(line) {
            let header = &content[header_start..offset];
            let body = &content[offset + line.len()..];
            return Ok(Some((header, body.trim_start_matches(['\r', '\n']))));
        }
        offset += line.len();
    }

    Err(RecordError::UnterminatedHeader)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}
