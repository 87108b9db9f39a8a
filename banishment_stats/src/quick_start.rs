//!
//! # Quick start
//!
//! This example runs the pipeline end to end on scraped season data.
//!
//! **Collecting the data** The scraping stage (outside this crate) writes one
//! contestant file and one vote file per season:
//!
//! ```text
//! data/UK_traitors_season_1_ai_tagged.csv
//! data/UK_traitors_season_2_ai_tagged.csv
//! data/votes/UK_traitors_season_1_votes.csv
//! data/votes/UK_traitors_season_2_votes.csv
//! ```
//!
//! See the [manual](crate::manual) for the expected columns.
//!
//! **Running the analysis** With the default layout above, no configuration
//! file is needed:
//!
//! ```bash
//! traitorstats
//! ```
//!
//! which is shorthand for:
//!
//! ```bash
//! traitorstats --data 'data/*.csv' --votes 'data/votes/*.csv' --out outputs
//! ```
//!
//! The seven derived tables land in `outputs/`, each as a `.csv` and a
//! `.json` file, ready for the dashboard layer.
//!
//! **Checking a run against a reference** After a code or data change, a
//! previously saved summary can be compared against the current run:
//!
//! ```bash
//! traitorstats --reference outputs/summary_reference.json
//! ```
//!
//! Differences are printed line by line and the run exits with an error.
//!
//! **Using the library** The same pipeline is available programmatically
//! through [`builder::Builder`](crate::builder::Builder) or directly through
//! [`run_banishment_stats`](crate::run_banishment_stats) for callers that
//! already hold standardized tables.
//!
