// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// The sentinel season label for aggregates pooled across every season.
pub const SEASON_ALL: &str = "all";

/// A contestant row as parsed from a season file, before standardization.
///
/// Text fields carry whatever casing and whitespace the scrape produced.
/// In most cases, it is enough to use the higher-level builder API.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct RawContestant {
    pub season: String,
    pub name: String,
    /// The generated player identifier. When absent, one is derived from
    /// the season and the contestant name, following the scraper convention.
    pub player_id: Option<String>,
    pub finish: String,
    /// Inferred gender. A missing value recovers to the "unknown" category.
    pub gender: Option<String>,
    /// Inferred ethnicity. A missing value recovers to the "unknown" category.
    pub ethnicity: Option<String>,
    pub age: Option<u32>,
    /// Episode of exit. Winners and finalists carry the final episode.
    pub episode: Option<u32>,
}

/// A standardized contestant record. Immutable after standardization and
/// scoped to one season.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Contestant {
    pub season: String,
    pub name: String,
    pub player_id: String,
    pub finish: String,
    pub gender: String,
    pub ethnicity: String,
    pub ethnicity_group: EthnicityGroup,
    pub age: Option<u32>,
    pub episode: Option<u32>,
    pub is_banished: bool,
    pub is_murdered: bool,
}

/// A single round-table vote: one player voting against one target.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRecord {
    pub player: String,
    pub target: String,
    pub round_table: u32,
    pub season: String,
}

impl VoteRecord {
    /// Builds a vote record, trimming the text fields as the ingestion
    /// contract requires.
    pub fn new(player: &str, target: &str, round_table: u32, season: &str) -> VoteRecord {
        VoteRecord {
            player: player.trim().to_string(),
            target: target.trim().to_string(),
            round_table,
            season: season.trim().to_string(),
        }
    }
}

/// A vote joined with the demographics of its voter and its target.
///
/// Unmatched identifiers leave the demographic fields empty; the row itself
/// is always retained.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EnrichedVote {
    pub player: String,
    pub target: String,
    pub round_table: u32,
    pub season: String,
    pub target_gender: Option<String>,
    pub target_ethnicity: Option<EthnicityGroup>,
    pub voter_gender: Option<String>,
    pub voter_ethnicity: Option<EthnicityGroup>,
}

/// The binary derived ethnicity category.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum EthnicityGroup {
    White,
    PersonOfColor,
}

impl EthnicityGroup {
    /// Classifies an inferred ethnicity into the two-bucket grouping.
    /// Anything that is not exactly "white" (including the recovered
    /// "unknown" category) lands in the person_of_color bucket.
    pub fn from_inferred(ethnicity: &str) -> EthnicityGroup {
        if ethnicity == "white" {
            EthnicityGroup::White
        } else {
            EthnicityGroup::PersonOfColor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EthnicityGroup::White => "white",
            EthnicityGroup::PersonOfColor => "person_of_color",
        }
    }
}

/// The grouping dimensions every composition and rate aggregate is
/// computed over.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum GroupDim {
    Gender,
    EthnicityGroup,
}

impl GroupDim {
    pub const ALL: [GroupDim; 2] = [GroupDim::Gender, GroupDim::EthnicityGroup];

    /// The column-contract name of the dimension. Downstream consumers key
    /// on these exact strings.
    pub fn column_name(&self) -> &'static str {
        match self {
            GroupDim::Gender => "Inferred_Gender",
            GroupDim::EthnicityGroup => "ethnicity_group",
        }
    }
}

/// The fixed 4-bin age partition. Total and disjoint over [0, 100].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum AgeBracket {
    Under30,
    From30To44,
    From45To59,
    Over60,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::Under30,
        AgeBracket::From30To44,
        AgeBracket::From45To59,
        AgeBracket::Over60,
    ];

    /// Assigns an age to its bracket. Ages outside [0, 100] are treated as
    /// missing and excluded from the age aggregate.
    pub fn from_age(age: u32) -> Option<AgeBracket> {
        match age {
            0..=29 => Some(AgeBracket::Under30),
            30..=44 => Some(AgeBracket::From30To44),
            45..=59 => Some(AgeBracket::From45To59),
            60..=100 => Some(AgeBracket::Over60),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBracket::Under30 => "<30",
            AgeBracket::From30To44 => "30-44",
            AgeBracket::From45To59 => "45-59",
            AgeBracket::Over60 => "60+",
        }
    }
}

// ******** Output data structures *********

/// One row of a proportion-of-whole composition (baseline or finalists).
/// Within a (group_type, season) partition the proportions sum to 1.
#[derive(PartialEq, Debug, Clone)]
pub struct CompositionRow {
    pub group_type: GroupDim,
    pub group_value: String,
    pub proportion: f64,
    pub season: String,
}

/// One row of the early-banishment rate aggregate.
#[derive(PartialEq, Debug, Clone)]
pub struct EarlyBanishmentRow {
    pub group_type: GroupDim,
    pub group_value: String,
    pub season: String,
    pub episode_cutoff: u32,
    pub early_banished: u64,
    pub percentage_of_early_banishments: f64,
    /// Sorted, de-duplicated names of the contestants in this bucket.
    pub early_banished_names: Vec<String>,
}

/// Survival statistics for one (gender, ethnicity group) cell.
#[derive(PartialEq, Debug, Clone)]
pub struct SurvivalRow {
    pub gender: String,
    pub ethnicity_group: EthnicityGroup,
    pub median_episode: f64,
    pub mean_episode: f64,
    pub count: u64,
    pub season: String,
}

/// Survival statistics for one age bracket.
#[derive(PartialEq, Debug, Clone)]
pub struct AgeSurvivalRow {
    pub age_group: AgeBracket,
    pub median_episode: f64,
    pub mean_episode: f64,
    pub count: u64,
    pub season: String,
}

/// An enriched vote stamped with its round and season labels.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundVoteRow {
    pub player: String,
    pub target: String,
    pub round_table: u32,
    pub season: String,
    pub target_gender: Option<String>,
    pub target_ethnicity: Option<EthnicityGroup>,
    pub voter_gender: Option<String>,
    pub voter_ethnicity: Option<EthnicityGroup>,
    pub round: u32,
}

/// The room baseline of a round table: unique active voters grouped by
/// demographics. Proportions sum to 1 across the partition.
#[derive(PartialEq, Debug, Clone)]
pub struct RoundBaselineRow {
    pub voter_gender: String,
    pub voter_ethnicity: EthnicityGroup,
    pub player_count: u64,
    pub baseline_proportion: f64,
    pub round: u32,
    pub season: String,
}

/// Every derived table of one full pipeline run.
#[derive(PartialEq, Debug, Clone)]
pub struct StatsBundle {
    pub baseline: Vec<CompositionRow>,
    pub early_banishment: Vec<EarlyBanishmentRow>,
    pub survival: Vec<SurvivalRow>,
    pub age_survival: Vec<AgeSurvivalRow>,
    pub finalists: Vec<CompositionRow>,
    pub round_votes: Vec<RoundVoteRow>,
    pub round_baseline: Vec<RoundBaselineRow>,
}

// ********* Configuration **********

/// The options that govern an aggregation run.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct StatsOptions {
    /// A banishment at or before this episode counts as early.
    pub episode_cutoff: u32,
}

impl StatsOptions {
    pub const DEFAULT_OPTIONS: StatsOptions = StatsOptions { episode_cutoff: 4 };
}

/// Errors that prevent the pipeline from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum StatsErrors {
    /// The contestant table is empty: nothing can be aggregated.
    EmptyTable,
}

impl Error for StatsErrors {}

impl Display for StatsErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsErrors::EmptyTable => write!(f, "the contestant table is empty"),
        }
    }
}
