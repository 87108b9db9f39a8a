// Primitives shared by the file readers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use snafu::prelude::*;

use crate::analysis::{BadPatternSnafu, MissingColumnSnafu, MissingInputSnafu};
use crate::analysis::AnalysisResult;

/// Expands a path+glob pattern relative to the given root. The matches are
/// sorted so the row order of the pooled tables does not depend on the
/// directory listing order.
pub fn discover_files(root: &Path, pattern: &str) -> AnalysisResult<Vec<PathBuf>> {
    let full_pattern = root.join(pattern).display().to_string();
    let paths = glob::glob(&full_pattern).context(BadPatternSnafu {
        pattern: full_pattern.clone(),
    })?;
    let mut files: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    ensure!(
        !files.is_empty(),
        MissingInputSnafu {
            pattern: full_pattern
        }
    );
    files.sort();
    Ok(files)
}

/// Addresses record fields by header name, tolerating extra columns and
/// stray whitespace around the header cells.
pub struct ColumnIndex {
    indices: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new<'a, I: IntoIterator<Item = &'a str>>(headers: I) -> ColumnIndex {
        let indices = headers
            .into_iter()
            .enumerate()
            .map(|(idx, h)| (h.trim().to_string(), idx))
            .collect();
        ColumnIndex { indices }
    }

    pub fn index(&self, column: &str) -> Option<usize> {
        self.indices.get(column).copied()
    }

    pub fn get<'a>(&self, record: &'a csv::StringRecord, column: &str) -> Option<&'a str> {
        self.index(column).and_then(|idx| record.get(idx))
    }

    pub fn require(&self, columns: &[&str], path: &str) -> AnalysisResult<()> {
        for column in columns {
            ensure!(
                self.indices.contains_key(*column),
                MissingColumnSnafu {
                    column: *column,
                    path
                }
            );
        }
        Ok(())
    }
}

/// Parses a numeric cell the way the scrape exports write them: empty
/// cells, NA and nan are missing; float-formatted integers ("2.0") are
/// accepted; anything unparsable coerces to missing.
pub fn parse_opt_u32(raw: Option<&str>) -> Option<u32> {
    let s = raw?.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("nan") {
        return None;
    }
    let f = s.parse::<f64>().ok()?;
    if !f.is_finite() || f < 0.0 {
        return None;
    }
    Some(f as u32)
}

#[cfg(test)]
mod tests {
    use super::parse_opt_u32;

    #[test]
    fn numeric_cells_tolerate_scrape_artifacts() {
        assert_eq!(parse_opt_u32(Some("2")), Some(2));
        assert_eq!(parse_opt_u32(Some("2.0")), Some(2));
        assert_eq!(parse_opt_u32(Some(" 45 ")), Some(45));
        assert_eq!(parse_opt_u32(Some("")), None);
        assert_eq!(parse_opt_u32(Some("nan")), None);
        assert_eq!(parse_opt_u32(Some("NA")), None);
        assert_eq!(parse_opt_u32(Some("-3")), None);
        assert_eq!(parse_opt_u32(Some("Immune")), None);
        assert_eq!(parse_opt_u32(None), None);
    }
}
