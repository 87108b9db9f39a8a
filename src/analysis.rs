use log::{debug, info, warn};

use banishment_stats::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod export;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;

use crate::analysis::config_reader::*;
use crate::args::Args;

#[derive(Debug, Snafu)]
pub enum AnalysisError {
    #[snafu(display("No files found matching pattern: {pattern}"))]
    MissingInput { pattern: String },
    #[snafu(display("Invalid file pattern {pattern}"))]
    BadPattern {
        source: glob::PatternError,
        pattern: String,
    },
    #[snafu(display("Error opening CSV file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading a record of {path}"))]
    CsvRecord { source: csv::Error, path: String },
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display(""))]
    EmptyExcel {},
    #[snafu(display("Missing column {column} in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display(""))]
    OpeningJson { source: std::io::Error },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display(""))]
    MissingParentDir {},
    #[snafu(display("Error writing CSV output {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error writing output {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Failed to write output artifacts: {names:?}"))]
    FailedArtifacts { names: Vec<String> },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

pub mod config_reader {
    use crate::analysis::*;

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct OutputSettings {
        #[serde(rename = "analysisName")]
        pub analysis_name: String,
        #[serde(rename = "outputDirectory")]
        pub output_directory: Option<String>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct FileSource {
        pub provider: String,
        #[serde(rename = "filePattern")]
        pub file_pattern: String,
        #[serde(rename = "worksheetName")]
        pub worksheet_name: Option<String>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct AnalysisRules {
        #[serde(rename = "episodeCutoff")]
        pub episode_cutoff: Option<u32>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct AnalysisConfig {
        #[serde(rename = "outputSettings")]
        pub output_settings: OutputSettings,
        #[serde(rename = "contestantFileSources")]
        pub contestant_file_sources: Vec<FileSource>,
        #[serde(rename = "voteFileSources")]
        pub vote_file_sources: Vec<FileSource>,
        pub rules: Option<AnalysisRules>,
    }

    pub fn csv_source(pattern: &str) -> FileSource {
        FileSource {
            provider: "csv".to_string(),
            file_pattern: pattern.to_string(),
            worksheet_name: None,
        }
    }

    /// The layout the scraping stage produces, used when no configuration
    /// file is given.
    pub fn default_config() -> AnalysisConfig {
        AnalysisConfig {
            output_settings: OutputSettings {
                analysis_name: "banishment_analysis".to_string(),
                output_directory: Some("outputs".to_string()),
            },
            contestant_file_sources: vec![csv_source("data/*.csv")],
            vote_file_sources: vec![csv_source("data/votes/*.csv")],
            rules: None,
        }
    }

    pub fn read_config(path: &str) -> AnalysisResult<AnalysisConfig> {
        let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
        let config: AnalysisConfig =
            serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        Ok(config)
    }
}

pub fn read_summary(path: String) -> AnalysisResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {})?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn read_contestant_data(root: &Path, sources: &[FileSource]) -> AnalysisResult<Vec<Contestant>> {
    let mut out: Vec<Contestant> = Vec::new();
    for source in sources {
        let files = io_common::discover_files(root, &source.file_pattern)?;
        for path in files {
            info!("Loading {:?}...", path);
            let raws = match source.provider.as_str() {
                "csv" => io_csv::read_contestant_file(&path)?,
                "xlsx" => io_excel::read_contestant_file(&path, source)?,
                x => whatever!("Provider not implemented {:?}", x),
            };
            out.extend(raws.into_iter().map(standardize));
        }
    }
    Ok(out)
}

fn read_vote_data(root: &Path, sources: &[FileSource]) -> AnalysisResult<Vec<VoteRecord>> {
    let mut out: Vec<VoteRecord> = Vec::new();
    for source in sources {
        let files = io_common::discover_files(root, &source.file_pattern)?;
        for path in files {
            info!("Loading votes from {:?}...", path);
            let mut votes = match source.provider.as_str() {
                "csv" => io_csv::read_vote_file(&path)?,
                "xlsx" => io_excel::read_vote_file(&path, source)?,
                x => whatever!("Provider not implemented {:?}", x),
            };
            out.append(&mut votes);
        }
    }
    Ok(out)
}

fn build_summary_js(
    config: &AnalysisConfig,
    options: &StatsOptions,
    bundle: &StatsBundle,
) -> JSValue {
    json!({
        "analysis": config.output_settings.analysis_name,
        "episodeCutoff": options.episode_cutoff,
        "artifacts": {
            "baseline_composition": export::composition_json(&bundle.baseline),
            "early_banishment_stats": export::early_banishment_json(&bundle.early_banishment),
            "survival_stats": export::survival_json(&bundle.survival),
            "age_survival_stats": export::age_survival_json(&bundle.age_survival),
            "finalist_composition": export::composition_json(&bundle.finalists),
            "early_vote_composition": export::round_votes_json(&bundle.round_votes),
            "baseline_rounds": export::round_baseline_json(&bundle.round_baseline),
        }
    })
}

pub fn run_analysis(args: &Args) -> AnalysisResult<()> {
    let (mut config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root = Path::new(config_path.as_str())
                .parent()
                .context(MissingParentDirSnafu {})?
                .to_path_buf();
            (config, root)
        }
        None => (default_config(), PathBuf::from(".")),
    };

    // Command line overrides.
    if let Some(pattern) = &args.data {
        config.contestant_file_sources = vec![csv_source(pattern)];
    }
    if let Some(pattern) = &args.votes {
        config.vote_file_sources = vec![csv_source(pattern)];
    }
    if let Some(out) = &args.out {
        config.output_settings.output_directory = Some(out.clone());
    }
    if let Some(cutoff) = args.cutoff {
        config.rules = Some(AnalysisRules {
            episode_cutoff: Some(cutoff),
        });
    }
    info!("config: {:?}", config);

    let contestants = read_contestant_data(&root, &config.contestant_file_sources)?;
    let votes = read_vote_data(&root, &config.vote_file_sources)?;

    let options = StatsOptions {
        episode_cutoff: config
            .rules
            .as_ref()
            .and_then(|r| r.episode_cutoff)
            .unwrap_or(StatsOptions::DEFAULT_OPTIONS.episode_cutoff),
    };

    let bundle = match run_banishment_stats(&contestants, &votes, &options) {
        Ok(x) => x,
        Err(e) => {
            whatever!("Aggregation error: {:?}", e)
        }
    };

    let out_dir = root.join(
        config
            .output_settings
            .output_directory
            .clone()
            .unwrap_or_else(|| "outputs".to_string()),
    );
    export::write_artifacts(&bundle, &out_dir)?;

    // Assemble the final summary.
    let summary_js = build_summary_js(&config, &options, &bundle);
    let pretty_js_stats = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    let summary_path = out_dir.join("summary.json");
    fs::write(&summary_path, &pretty_js_stats).context(WritingOutputSnafu {
        path: summary_path.display().to_string(),
    })?;

    // The reference summary, if provided for comparison.
    if let Some(summary_p) = &args.reference {
        let summary_ref = read_summary(summary_p.clone())?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between computed summary and reference summary")
        }
    }

    println!(
        "Success! Combined analysis for {} seasons completed.",
        seasons(&contestants).len()
    );
    println!("Files saved in: {}", out_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;

    const SEASON_1: &str = "\
Season,Contestant,Episode,Finish,Inferred_Gender,Inferred_Ethnicity,Age,player_id
1,Alice,2.0,Banished,female,white,28,1_Alice
1,Bob,3.0,Murdered,male,asian,34,1_Bob
1,Carol,5.0,Banished,female,white,47,1_Carol
1,Dan,10.0,Winner,male,white,61,1_Dan
1,Erin,10.0,Runner-up,female,black,,1_Erin
";

    const SEASON_2: &str = "\
Season,Contestant,Episode,Finish,Inferred_Gender,Inferred_Ethnicity,Age,player_id
2,Frank,1.0,Banished,male,white,52,2_Frank
2,Grace,8.0,Winner,female,white,29,2_Grace
";

    const VOTES_1: &str = "\
player,target,round_table,Season
1_Alice,1_Bob,1,1
1_Bob,1_Alice,1,1
1_Carol, 1_Alice ,1,1
1_Dan,Banished,1,1
1_Alice,1_Carol,2,1
";

    const VOTES_2: &str = "\
player,target,round_table,Season
2_Frank,2_Grace,1,2
";

    const ARTIFACT_NAMES: [&str; 7] = [
        "baseline_composition",
        "early_banishment_stats",
        "survival_stats",
        "age_survival_stats",
        "finalist_composition",
        "early_vote_composition",
        "baseline_rounds",
    ];

    fn base_args() -> Args {
        Args {
            config: None,
            data: None,
            votes: None,
            out: None,
            cutoff: None,
            reference: None,
            verbose: false,
        }
    }

    fn write_fixtures(dir: &Path) -> Args {
        fs::create_dir_all(dir.join("data/votes")).unwrap();
        fs::write(dir.join("data/season_1.csv"), SEASON_1).unwrap();
        fs::write(dir.join("data/season_2.csv"), SEASON_2).unwrap();
        fs::write(dir.join("data/votes/season_1_votes.csv"), VOTES_1).unwrap();
        fs::write(dir.join("data/votes/season_2_votes.csv"), VOTES_2).unwrap();
        Args {
            data: Some(dir.join("data/*.csv").display().to_string()),
            votes: Some(dir.join("data/votes/*.csv").display().to_string()),
            out: Some(dir.join("outputs").display().to_string()),
            ..base_args()
        }
    }

    #[test]
    fn end_to_end_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let args = write_fixtures(dir.path());
        run_analysis(&args).unwrap();

        let out_dir = dir.path().join("outputs");
        for name in ARTIFACT_NAMES {
            assert!(out_dir.join(format!("{}.csv", name)).is_file(), "{}", name);
            let js: JSValue = serde_json::from_str(
                &fs::read_to_string(out_dir.join(format!("{}.json", name))).unwrap(),
            )
            .unwrap();
            assert!(js.is_array(), "{} is not a record array", name);
        }

        let baseline: JSValue = serde_json::from_str(
            &fs::read_to_string(out_dir.join("baseline_composition.json")).unwrap(),
        )
        .unwrap();
        let rows = baseline.as_array().unwrap();
        // Pooled and per-season variants are all present.
        for season in ["all", "1", "2"] {
            assert!(rows.iter().any(|r| r["season"] == season), "{}", season);
        }
        // Proportions per (group_type, season) partition sum to 1.
        for season in ["all", "1", "2"] {
            let sum: f64 = rows
                .iter()
                .filter(|r| r["season"] == season && r["group_type"] == "Inferred_Gender")
                .map(|r| r["proportion"].as_f64().unwrap())
                .sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            data: Some(dir.path().join("nothing/*.csv").display().to_string()),
            ..base_args()
        };
        let res = run_analysis(&args);
        assert!(matches!(res, Err(AnalysisError::MissingInput { .. })));
        // Fatal failures abort before any output is written.
        assert!(!dir.path().join("outputs").exists());
    }

    #[test]
    fn reference_check_passes_and_detects_divergence() {
        let dir = tempfile::tempdir().unwrap();
        let args = write_fixtures(dir.path());
        run_analysis(&args).unwrap();

        let out_dir = dir.path().join("outputs");
        let reference = dir.path().join("reference.json");
        fs::copy(out_dir.join("summary.json"), &reference).unwrap();

        let args_checked = Args {
            reference: Some(reference.display().to_string()),
            ..args.clone()
        };
        run_analysis(&args_checked).unwrap();

        // A changed cutoff changes the summary and must be caught.
        let args_diverged = Args {
            cutoff: Some(1),
            ..args_checked
        };
        assert!(run_analysis(&args_diverged).is_err());
    }

    #[test]
    fn config_file_drives_a_run() {
        let dir = tempfile::tempdir().unwrap();
        write_fixtures(dir.path());
        let config = r#"{
            "outputSettings": {
                "analysisName": "uk_traitors",
                "outputDirectory": "outputs"
            },
            "contestantFileSources": [
                { "provider": "csv", "filePattern": "data/*.csv" }
            ],
            "voteFileSources": [
                { "provider": "csv", "filePattern": "data/votes/*.csv" }
            ],
            "rules": { "episodeCutoff": 4 }
        }"#;
        let config_path = dir.path().join("analysis.json");
        fs::write(&config_path, config).unwrap();

        let args = Args {
            config: Some(config_path.display().to_string()),
            ..base_args()
        };
        run_analysis(&args).unwrap();
        // Patterns resolve against the configuration file directory.
        assert!(dir.path().join("outputs/summary.json").is_file());
    }

    #[test]
    fn early_banishment_csv_has_the_expected_rows() {
        let dir = tempfile::tempdir().unwrap();
        let args = write_fixtures(dir.path());
        run_analysis(&args).unwrap();

        let content =
            fs::read_to_string(dir.path().join("outputs/early_banishment_stats.csv")).unwrap();
        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<&str>>(),
            vec![
                "group_type",
                "group_value",
                "season",
                "episode_cutoff",
                "early_banished",
                "percentage_of_early_banishments",
                "early_banished_names"
            ]
        );
        // Season 2: Frank is the only early banishment.
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        let frank = rows
            .iter()
            .find(|r| r.get(2) == Some("2") && r.get(0) == Some("Inferred_Gender"))
            .unwrap();
        assert_eq!(frank.get(1), Some("male"));
        assert_eq!(frank.get(4), Some("1"));
        assert_eq!(frank.get(6), Some("Frank"));
    }
}
