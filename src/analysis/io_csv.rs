// Primitives for reading CSV files.

use std::path::Path;

use log::warn;
use snafu::prelude::*;

use banishment_stats::{RawContestant, VoteRecord};

use crate::analysis::io_common::{parse_opt_u32, ColumnIndex};
use crate::analysis::{AnalysisResult, CsvRecordSnafu, OpeningCsvSnafu};

fn to_opt_string(value: Option<&str>) -> Option<String> {
    value.map(|s| s.to_string()).filter(|s| !s.trim().is_empty())
}

/// Reads one per-season contestant file. Standardization happens later in
/// the library; this reader only deals with the file shape.
pub fn read_contestant_file(path: &Path) -> AnalysisResult<Vec<RawContestant>> {
    let path_str = path.display().to_string();
    let mut rdr = csv::Reader::from_path(path).context(OpeningCsvSnafu {
        path: path_str.clone(),
    })?;
    let headers = rdr
        .headers()
        .context(OpeningCsvSnafu {
            path: path_str.clone(),
        })?
        .clone();
    let cols = ColumnIndex::new(headers.iter());
    cols.require(&["Season", "Contestant", "Finish"], &path_str)?;

    let mut res: Vec<RawContestant> = Vec::new();
    for record in rdr.records() {
        let record = record.context(CsvRecordSnafu {
            path: path_str.clone(),
        })?;
        res.push(RawContestant {
            season: cols.get(&record, "Season").unwrap_or("").to_string(),
            name: cols.get(&record, "Contestant").unwrap_or("").to_string(),
            player_id: to_opt_string(cols.get(&record, "player_id")),
            finish: cols.get(&record, "Finish").unwrap_or("").to_string(),
            gender: to_opt_string(cols.get(&record, "Inferred_Gender")),
            ethnicity: to_opt_string(cols.get(&record, "Inferred_Ethnicity")),
            age: parse_opt_u32(cols.get(&record, "Age")),
            episode: parse_opt_u32(cols.get(&record, "Episode")),
        });
    }
    Ok(res)
}

/// Reads one per-season vote file. A row without a parsable round-table
/// number cannot be attributed to a round and is skipped with a warning.
pub fn read_vote_file(path: &Path) -> AnalysisResult<Vec<VoteRecord>> {
    let path_str = path.display().to_string();
    let mut rdr = csv::Reader::from_path(path).context(OpeningCsvSnafu {
        path: path_str.clone(),
    })?;
    let headers = rdr
        .headers()
        .context(OpeningCsvSnafu {
            path: path_str.clone(),
        })?
        .clone();
    let cols = ColumnIndex::new(headers.iter());
    cols.require(&["player", "target", "round_table", "Season"], &path_str)?;

    let mut res: Vec<VoteRecord> = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record.context(CsvRecordSnafu {
            path: path_str.clone(),
        })?;
        let round_table = match parse_opt_u32(cols.get(&record, "round_table")) {
            Some(r) => r,
            None => {
                warn!(
                    "read_vote_file: {}: skipping record {} without a round table number",
                    path_str,
                    idx + 1
                );
                continue;
            }
        };
        res.push(VoteRecord::new(
            cols.get(&record, "player").unwrap_or(""),
            cols.get(&record, "target").unwrap_or(""),
            round_table,
            cols.get(&record, "Season").unwrap_or(""),
        ));
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn contestant_reader_handles_scrape_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("season_1.csv");
        fs::write(
            &path,
            "Season,Contestant,Episode,Finish,Inferred_Gender,Inferred_Ethnicity,Age,player_id,fname\n\
             1,Alice,2.0,Banished,female,white,28,1_Alice,Alice\n\
             1,Bob,,Winner,male,,,,Bob\n",
        )
        .unwrap();
        let rows = read_contestant_file(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].episode, Some(2));
        assert_eq!(rows[0].age, Some(28));
        assert_eq!(rows[1].episode, None);
        assert_eq!(rows[1].ethnicity, None);
        assert_eq!(rows[1].player_id, None);
    }

    #[test]
    fn contestant_reader_requires_the_identity_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "Contestant,Finish\nAlice,Banished\n").unwrap();
        let res = read_contestant_file(&path);
        assert!(matches!(
            res,
            Err(crate::analysis::AnalysisError::MissingColumn { .. })
        ));
    }

    #[test]
    fn vote_reader_skips_unattributable_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("votes.csv");
        fs::write(
            &path,
            "player,target,round_table,Season\n\
             1_Alice,1_Bob,1,1\n\
             1_Bob,1_Alice,,1\n",
        )
        .unwrap();
        let rows = read_vote_file(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player, "1_Alice");
    }
}
