// Writes the derived tables to the output directory, each in two formats:
// delimited rows (.csv) and an array of records (.json). The column names
// and the "all" season sentinel are the contract with the dashboard layer.

use std::fs;
use std::path::Path;

use log::{info, warn};
use snafu::prelude::*;

use serde_json::json;
use serde_json::Value as JSValue;

use banishment_stats::{
    AgeSurvivalRow, CompositionRow, EarlyBanishmentRow, EthnicityGroup, RoundBaselineRow,
    RoundVoteRow, StatsBundle, SurvivalRow,
};

use crate::analysis::{
    AnalysisResult, FailedArtifactsSnafu, ParsingJsonSnafu, WritingCsvSnafu, WritingOutputSnafu,
};

const COMPOSITION_HEADER: [&str; 4] = ["group_value", "proportion", "group_type", "season"];

const EARLY_BANISHMENT_HEADER: [&str; 7] = [
    "group_type",
    "group_value",
    "season",
    "episode_cutoff",
    "early_banished",
    "percentage_of_early_banishments",
    "early_banished_names",
];

const SURVIVAL_HEADER: [&str; 6] = [
    "Inferred_Gender",
    "ethnicity_group",
    "median_episode",
    "mean_episode",
    "count",
    "season",
];

const AGE_SURVIVAL_HEADER: [&str; 5] = [
    "age_group",
    "median_episode",
    "mean_episode",
    "count",
    "season",
];

const ROUND_VOTES_HEADER: [&str; 9] = [
    "player",
    "target",
    "round_table",
    "Season",
    "target_gender",
    "target_ethnicity",
    "voter_gender",
    "voter_ethnicity",
    "Round",
];

const ROUND_BASELINE_HEADER: [&str; 6] = [
    "voter_gender",
    "voter_ethnicity",
    "player_count",
    "baseline_proportion",
    "Round",
    "Season",
];

fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_eth_str(value: &Option<EthnicityGroup>) -> String {
    value.map(|e| e.as_str().to_string()).unwrap_or_default()
}

fn opt_js(value: &Option<String>) -> JSValue {
    match value {
        Some(s) => json!(s),
        None => JSValue::Null,
    }
}

fn opt_eth_js(value: &Option<EthnicityGroup>) -> JSValue {
    match value {
        Some(e) => json!(e.as_str()),
        None => JSValue::Null,
    }
}

pub fn composition_json(rows: &[CompositionRow]) -> Vec<JSValue> {
    rows.iter()
        .map(|r| {
            json!({
                "group_value": r.group_value,
                "proportion": r.proportion,
                "group_type": r.group_type.column_name(),
                "season": r.season,
            })
        })
        .collect()
}

fn composition_records(rows: &[CompositionRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            vec![
                r.group_value.clone(),
                r.proportion.to_string(),
                r.group_type.column_name().to_string(),
                r.season.clone(),
            ]
        })
        .collect()
}

pub fn early_banishment_json(rows: &[EarlyBanishmentRow]) -> Vec<JSValue> {
    rows.iter()
        .map(|r| {
            json!({
                "group_type": r.group_type.column_name(),
                "group_value": r.group_value,
                "season": r.season,
                "episode_cutoff": r.episode_cutoff,
                "early_banished": r.early_banished,
                "percentage_of_early_banishments": r.percentage_of_early_banishments,
                "early_banished_names": r.early_banished_names,
            })
        })
        .collect()
}

fn early_banishment_records(rows: &[EarlyBanishmentRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            vec![
                r.group_type.column_name().to_string(),
                r.group_value.clone(),
                r.season.clone(),
                r.episode_cutoff.to_string(),
                r.early_banished.to_string(),
                r.percentage_of_early_banishments.to_string(),
                // A single delimited cell; the JSON format keeps the real list.
                r.early_banished_names.join("; "),
            ]
        })
        .collect()
}

pub fn survival_json(rows: &[SurvivalRow]) -> Vec<JSValue> {
    rows.iter()
        .map(|r| {
            json!({
                "Inferred_Gender": r.gender,
                "ethnicity_group": r.ethnicity_group.as_str(),
                "median_episode": r.median_episode,
                "mean_episode": r.mean_episode,
                "count": r.count,
                "season": r.season,
            })
        })
        .collect()
}

fn survival_records(rows: &[SurvivalRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            vec![
                r.gender.clone(),
                r.ethnicity_group.as_str().to_string(),
                r.median_episode.to_string(),
                r.mean_episode.to_string(),
                r.count.to_string(),
                r.season.clone(),
            ]
        })
        .collect()
}

pub fn age_survival_json(rows: &[AgeSurvivalRow]) -> Vec<JSValue> {
    rows.iter()
        .map(|r| {
            json!({
                "age_group": r.age_group.as_str(),
                "median_episode": r.median_episode,
                "mean_episode": r.mean_episode,
                "count": r.count,
                "season": r.season,
            })
        })
        .collect()
}

fn age_survival_records(rows: &[AgeSurvivalRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            vec![
                r.age_group.as_str().to_string(),
                r.median_episode.to_string(),
                r.mean_episode.to_string(),
                r.count.to_string(),
                r.season.clone(),
            ]
        })
        .collect()
}

pub fn round_votes_json(rows: &[RoundVoteRow]) -> Vec<JSValue> {
    rows.iter()
        .map(|r| {
            json!({
                "player": r.player,
                "target": r.target,
                "round_table": r.round_table,
                "Season": r.season,
                "target_gender": opt_js(&r.target_gender),
                "target_ethnicity": opt_eth_js(&r.target_ethnicity),
                "voter_gender": opt_js(&r.voter_gender),
                "voter_ethnicity": opt_eth_js(&r.voter_ethnicity),
                "Round": r.round,
            })
        })
        .collect()
}

fn round_votes_records(rows: &[RoundVoteRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            vec![
                r.player.clone(),
                r.target.clone(),
                r.round_table.to_string(),
                r.season.clone(),
                opt_str(&r.target_gender),
                opt_eth_str(&r.target_ethnicity),
                opt_str(&r.voter_gender),
                opt_eth_str(&r.voter_ethnicity),
                r.round.to_string(),
            ]
        })
        .collect()
}

pub fn round_baseline_json(rows: &[RoundBaselineRow]) -> Vec<JSValue> {
    rows.iter()
        .map(|r| {
            json!({
                "voter_gender": r.voter_gender,
                "voter_ethnicity": r.voter_ethnicity.as_str(),
                "player_count": r.player_count,
                "baseline_proportion": r.baseline_proportion,
                "Round": r.round,
                "Season": r.season,
            })
        })
        .collect()
}

fn round_baseline_records(rows: &[RoundBaselineRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| {
            vec![
                r.voter_gender.clone(),
                r.voter_ethnicity.as_str().to_string(),
                r.player_count.to_string(),
                r.baseline_proportion.to_string(),
                r.round.to_string(),
                r.season.clone(),
            ]
        })
        .collect()
}

fn write_csv_file(path: &Path, header: &[&str], records: &[Vec<String>]) -> AnalysisResult<()> {
    let path_str = path.display().to_string();
    let mut wtr = csv::Writer::from_path(path).context(WritingCsvSnafu {
        path: path_str.clone(),
    })?;
    wtr.write_record(header).context(WritingCsvSnafu {
        path: path_str.clone(),
    })?;
    for record in records {
        wtr.write_record(record).context(WritingCsvSnafu {
            path: path_str.clone(),
        })?;
    }
    wtr.flush().context(WritingOutputSnafu { path: path_str })?;
    Ok(())
}

fn write_json_file(path: &Path, values: Vec<JSValue>) -> AnalysisResult<()> {
    let path_str = path.display().to_string();
    let contents =
        serde_json::to_string(&JSValue::Array(values)).context(ParsingJsonSnafu {})?;
    fs::write(path, contents).context(WritingOutputSnafu { path: path_str })?;
    Ok(())
}

/// Writes the seven artifacts. Each one is attempted independently: a
/// failure is logged and reported at the end, it does not prevent the
/// remaining artifacts from being written.
pub fn write_artifacts(bundle: &StatsBundle, out_dir: &Path) -> AnalysisResult<()> {
    fs::create_dir_all(out_dir).context(WritingOutputSnafu {
        path: out_dir.display().to_string(),
    })?;

    let artifacts: Vec<(&str, Vec<&str>, Vec<Vec<String>>, Vec<JSValue>)> = vec![
        (
            "baseline_composition",
            COMPOSITION_HEADER.to_vec(),
            composition_records(&bundle.baseline),
            composition_json(&bundle.baseline),
        ),
        (
            "early_banishment_stats",
            EARLY_BANISHMENT_HEADER.to_vec(),
            early_banishment_records(&bundle.early_banishment),
            early_banishment_json(&bundle.early_banishment),
        ),
        (
            "survival_stats",
            SURVIVAL_HEADER.to_vec(),
            survival_records(&bundle.survival),
            survival_json(&bundle.survival),
        ),
        (
            "age_survival_stats",
            AGE_SURVIVAL_HEADER.to_vec(),
            age_survival_records(&bundle.age_survival),
            age_survival_json(&bundle.age_survival),
        ),
        (
            "finalist_composition",
            COMPOSITION_HEADER.to_vec(),
            composition_records(&bundle.finalists),
            composition_json(&bundle.finalists),
        ),
        (
            "early_vote_composition",
            ROUND_VOTES_HEADER.to_vec(),
            round_votes_records(&bundle.round_votes),
            round_votes_json(&bundle.round_votes),
        ),
        (
            "baseline_rounds",
            ROUND_BASELINE_HEADER.to_vec(),
            round_baseline_records(&bundle.round_baseline),
            round_baseline_json(&bundle.round_baseline),
        ),
    ];

    let mut failed: Vec<String> = Vec::new();
    for (name, header, records, values) in artifacts {
        let csv_path = out_dir.join(format!("{}.csv", name));
        if let Err(e) = write_csv_file(&csv_path, &header, &records) {
            warn!("write_artifacts: {}: {}", name, e);
            failed.push(format!("{}.csv", name));
        }
        let json_path = out_dir.join(format!("{}.json", name));
        if let Err(e) = write_json_file(&json_path, values) {
            warn!("write_artifacts: {}: {}", name, e);
            failed.push(format!("{}.json", name));
        }
    }
    ensure!(failed.is_empty(), FailedArtifactsSnafu { names: failed });
    info!("Wrote all artifacts to {:?}", out_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use banishment_stats::GroupDim;

    #[test]
    fn empty_tables_still_produce_valid_files() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = StatsBundle {
            baseline: Vec::new(),
            early_banishment: Vec::new(),
            survival: Vec::new(),
            age_survival: Vec::new(),
            finalists: Vec::new(),
            round_votes: Vec::new(),
            round_baseline: Vec::new(),
        };
        write_artifacts(&bundle, dir.path()).unwrap();
        let csv = fs::read_to_string(dir.path().join("survival_stats.csv")).unwrap();
        assert!(csv.starts_with("Inferred_Gender,ethnicity_group"));
        let js = fs::read_to_string(dir.path().join("baseline_rounds.json")).unwrap();
        assert_eq!(js, "[]");
    }

    #[test]
    fn composition_rows_keep_the_column_contract() {
        let rows = vec![CompositionRow {
            group_type: GroupDim::EthnicityGroup,
            group_value: "white".to_string(),
            proportion: 0.75,
            season: "all".to_string(),
        }];
        let js = composition_json(&rows);
        assert_eq!(js[0]["group_type"], "ethnicity_group");
        assert_eq!(js[0]["season"], "all");
        let records = composition_records(&rows);
        assert_eq!(records[0], vec!["white", "0.75", "ethnicity_group", "all"]);
    }
}
