// Primitives for reading Excel workbooks. Scrape exports frequently land
// in .xlsx rather than .csv; the column conventions are the same.

use std::path::Path;

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::warn;
use snafu::prelude::*;

use banishment_stats::{RawContestant, VoteRecord};

use crate::analysis::config_reader::FileSource;
use crate::analysis::io_common::{parse_opt_u32, ColumnIndex};
use crate::analysis::{AnalysisResult, EmptyExcelSnafu, OpeningExcelSnafu};

fn open_range(path: &Path, source: &FileSource) -> AnalysisResult<Range<DataType>> {
    let path_str = path.display().to_string();
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu {
        path: path_str.clone(),
    })?;
    let wrange = match &source.worksheet_name {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0),
    }
    .context(EmptyExcelSnafu {})?
    .context(OpeningExcelSnafu { path: path_str })?;
    Ok(wrange)
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        // Integral floats are season and episode numbers, not decimals.
        DataType::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Int(i) => i.to_string(),
        DataType::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn row_cell(row: &[DataType], idx: Option<usize>) -> Option<String> {
    idx.and_then(|i| row.get(i))
        .map(cell_to_string)
        .filter(|s| !s.trim().is_empty())
}

pub fn read_contestant_file(
    path: &Path,
    source: &FileSource,
) -> AnalysisResult<Vec<RawContestant>> {
    let wrange = open_range(path, source)?;
    let mut rows = wrange.rows();
    let header = rows.next().context(EmptyExcelSnafu {})?;
    let header_cells: Vec<String> = header.iter().map(cell_to_string).collect();
    let cols = ColumnIndex::new(header_cells.iter().map(|s| s.as_str()));
    cols.require(
        &["Season", "Contestant", "Finish"],
        &path.display().to_string(),
    )?;

    let mut res: Vec<RawContestant> = Vec::new();
    for row in rows {
        res.push(RawContestant {
            season: row_cell(row, cols.index("Season")).unwrap_or_default(),
            name: row_cell(row, cols.index("Contestant")).unwrap_or_default(),
            player_id: row_cell(row, cols.index("player_id")),
            finish: row_cell(row, cols.index("Finish")).unwrap_or_default(),
            gender: row_cell(row, cols.index("Inferred_Gender")),
            ethnicity: row_cell(row, cols.index("Inferred_Ethnicity")),
            age: parse_opt_u32(row_cell(row, cols.index("Age")).as_deref()),
            episode: parse_opt_u32(row_cell(row, cols.index("Episode")).as_deref()),
        });
    }
    Ok(res)
}

pub fn read_vote_file(path: &Path, source: &FileSource) -> AnalysisResult<Vec<VoteRecord>> {
    let wrange = open_range(path, source)?;
    let mut rows = wrange.rows();
    let header = rows.next().context(EmptyExcelSnafu {})?;
    let header_cells: Vec<String> = header.iter().map(cell_to_string).collect();
    let cols = ColumnIndex::new(header_cells.iter().map(|s| s.as_str()));
    cols.require(
        &["player", "target", "round_table", "Season"],
        &path.display().to_string(),
    )?;

    let mut res: Vec<VoteRecord> = Vec::new();
    for (idx, row) in rows.enumerate() {
        let round_table = match parse_opt_u32(row_cell(row, cols.index("round_table")).as_deref()) {
            Some(r) => r,
            None => {
                warn!(
                    "read_vote_file: {:?}: skipping row {} without a round table number",
                    path,
                    idx + 1
                );
                continue;
            }
        };
        res.push(VoteRecord::new(
            &row_cell(row, cols.index("player")).unwrap_or_default(),
            &row_cell(row, cols.index("target")).unwrap_or_default(),
            round_table,
            &row_cell(row, cols.index("Season")).unwrap_or_default(),
        ));
    }
    Ok(res)
}
