//!
//! This is the long-form manual for `banishment_stats` and `traitorstats`.
//!
//! ## Input files
//!
//! The pipeline reads two kinds of per-season flat files, discovered through
//! path+glob patterns and concatenated in sorted path order.
//!
//! ### Contestant season files
//!
//! One file per season, as produced by the scraping stage. The following
//! columns are read (header names are matched exactly):
//!
//! | column             | required | content                                      |
//! |--------------------|----------|----------------------------------------------|
//! | `Season`           | yes      | season label, e.g. `1` or `C1`               |
//! | `Contestant`       | yes      | contestant display name                      |
//! | `Finish`           | yes      | outcome text, e.g. `Banished (Episode 3)` already reduced to `banished` |
//! | `Episode`          | no       | episode of exit                              |
//! | `Inferred_Gender`  | no       | output of the gender inference stage         |
//! | `Inferred_Ethnicity` | no     | output of the ethnicity inference stage      |
//! | `Age`              | no       | contestant age                               |
//! | `player_id`        | no       | generated identifier; defaults to `<Season>_<Contestant>` |
//!
//! Any other column is ignored. Numeric cells tolerate float-formatted text
//! (`2.0`), empty cells, `NA` and `nan`, which all appear in scrape exports.
//! A missing `Inferred_Gender` or `Inferred_Ethnicity` value recovers to the
//! `unknown` category and the run continues.
//!
//! ### Vote files
//!
//! One file per season with one row per round-table vote:
//!
//! | column        | required | content                            |
//! |---------------|----------|------------------------------------|
//! | `player`      | yes      | voting player identifier           |
//! | `target`      | yes      | vote target identifier             |
//! | `round_table` | yes      | round-table number, starting at 1  |
//! | `Season`      | yes      | season label                       |
//!
//! Targets that do not look like contestant identifiers (a leading digit or
//! `C`) are special non-player options (shields, abstentions); they are
//! excluded before enrichment and their count is logged.
//!
//! ### Providers
//!
//! Both kinds of files can be read from two providers:
//!
//! * `csv` Comma separated values with a header row.
//! * `xlsx` Excel workbooks (the first worksheet, or the worksheet named by
//!   `worksheetName`), with the same header row conventions.
//!
//! ## Configuration file
//!
//! `traitorstats --config analysis.json` drives a run from a JSON document:
//!
//! ```json
//! {
//!   "outputSettings": {
//!     "analysisName": "uk_traitors",
//!     "outputDirectory": "outputs"
//!   },
//!   "contestantFileSources": [
//!     { "provider": "csv", "filePattern": "data/*.csv" }
//!   ],
//!   "voteFileSources": [
//!     { "provider": "csv", "filePattern": "data/votes/*.csv" }
//!   ],
//!   "rules": {
//!     "episodeCutoff": 4
//!   }
//! }
//! ```
//!
//! Relative file patterns are resolved against the directory containing the
//! configuration file. Every setting has a command line override
//! (`--data`, `--votes`, `--out`, `--cutoff`).
//!
//! ## Output artifacts
//!
//! Each derived table is written twice, as `<name>.csv` and as a JSON array
//! of records in `<name>.json`:
//!
//! * `baseline_composition` gender and ethnicity-group proportions of the cast.
//! * `early_banishment_stats` counts, shares and names of contestants
//!   banished at or before the episode cutoff.
//! * `survival_stats` median/mean episode of exit by gender and ethnicity group.
//! * `age_survival_stats` the same statistics by age bracket.
//! * `finalist_composition` proportions over the contestants of the final episode.
//! * `early_vote_composition` the demographically enriched votes per round table.
//! * `baseline_rounds` the room composition of every round table.
//!
//! Every aggregate carries a `season` column; the label `all` marks rows
//! pooled across every season. These column names and the `all` sentinel are
//! the interface contract with the dashboard layer.
//!
