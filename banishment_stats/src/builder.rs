pub use crate::config::*;
use crate::{run_banishment_stats, standardize};

/// A builder for assembling contestant and vote tables in code.
///
/// Rows are standardized as they are added, so the tables behave exactly
/// like tables ingested from season files.
///
/// ```
/// pub use banishment_stats::builder::Builder;
/// pub use banishment_stats::{RawContestant, StatsOptions};
/// # use banishment_stats::StatsErrors;
///
/// let mut builder = Builder::new(&StatsOptions::DEFAULT_OPTIONS);
///
/// builder.add_contestant(RawContestant {
///     season: "1".to_string(),
///     name: "Anna".to_string(),
///     finish: "Banished".to_string(),
///     gender: Some("female".to_string()),
///     ethnicity: Some("white".to_string()),
///     episode: Some(2),
///     ..RawContestant::default()
/// })?;
/// builder.add_vote("1_Anna", "1_Bob", 1, "1")?;
///
/// let bundle = builder.run()?;
/// assert!(!bundle.baseline.is_empty());
/// # Ok::<(), StatsErrors>(())
/// ```
pub struct Builder {
    pub(crate) _options: StatsOptions,
    pub(crate) _contestants: Vec<Contestant>,
    pub(crate) _votes: Vec<VoteRecord>,
}

impl Builder {
    pub fn new(options: &StatsOptions) -> Builder {
        Builder {
            _options: *options,
            _contestants: Vec::new(),
            _votes: Vec::new(),
        }
    }

    /// Adds one contestant row. The row is standardized on entry.
    pub fn add_contestant(&mut self, raw: RawContestant) -> Result<(), StatsErrors> {
        self._contestants.push(standardize(raw));
        Ok(())
    }

    /// Adds one round-table vote. Text fields are trimmed on entry.
    pub fn add_vote(
        &mut self,
        player: &str,
        target: &str,
        round_table: u32,
        season: &str,
    ) -> Result<(), StatsErrors> {
        self._votes
            .push(VoteRecord::new(player, target, round_table, season));
        Ok(())
    }

    /// Runs the full aggregation pipeline over the assembled tables.
    pub fn run(&self) -> Result<StatsBundle, StatsErrors> {
        run_banishment_stats(&self._contestants, &self._votes, &self._options)
    }
}
