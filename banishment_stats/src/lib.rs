mod config;
pub mod builder;
pub mod manual;
pub mod quick_start;

use log::{debug, info};

use std::collections::{BTreeMap, HashMap};

pub use crate::config::*;

// **** Private helpers ****

fn season_label(season: Option<&str>) -> String {
    season.unwrap_or(SEASON_ALL).to_string()
}

fn season_subset<'a>(data: &'a [Contestant], season: Option<&str>) -> Vec<&'a Contestant> {
    match season {
        None => data.iter().collect(),
        Some(s) => data.iter().filter(|c| c.season == s).collect(),
    }
}

fn group_value(c: &Contestant, dim: GroupDim) -> String {
    match dim {
        GroupDim::Gender => c.gender.clone(),
        GroupDim::EthnicityGroup => c.ethnicity_group.as_str().to_string(),
    }
}

/// The fraction of rows falling into each category value, largest first.
/// Ties are broken by category value so the output order is reproducible.
fn composition_over<'a, I>(rows: I, dim: GroupDim, season: &str) -> Vec<CompositionRow>
where
    I: Iterator<Item = &'a Contestant>,
{
    let mut counts: HashMap<String, u64> = HashMap::new();
    let mut total: u64 = 0;
    for c in rows {
        *counts.entry(group_value(c, dim)).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return Vec::new();
    }
    let mut pairs: Vec<(String, u64)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs
        .into_iter()
        .map(|(value, count)| CompositionRow {
            group_type: dim,
            group_value: value,
            proportion: count as f64 / total as f64,
            season: season.to_string(),
        })
        .collect()
}

fn median(sorted: &[u32]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    }
}

fn mean(values: &[u32]) -> f64 {
    values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
}

// A vote was cast against a contestant when the target identifier starts
// with a season token: a digit for regular seasons, 'C' for celebrity ones.
// Everything else is a special non-player option.
fn is_contestant_target(target: &str) -> bool {
    matches!(target.chars().next(), Some(ch) if ch.is_ascii_digit() || ch == 'C')
}

// **** Standardization ****

/// Standardizes a raw contestant row: trims the identity fields,
/// lower-cases the classified text fields and derives the categorical
/// flags. A missing gender or ethnicity recovers to "unknown" and the
/// pipeline continues.
pub fn standardize(raw: RawContestant) -> Contestant {
    let season = raw.season.trim().to_string();
    let name = raw.name.trim().to_string();
    let player_id = match raw.player_id {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => format!("{}_{}", season, name),
    };
    let finish = raw.finish.trim().to_lowercase();
    let gender = match raw.gender {
        Some(g) if !g.trim().is_empty() => g.trim().to_lowercase(),
        _ => {
            debug!("standardize: no inferred gender for {:?}", player_id);
            "unknown".to_string()
        }
    };
    let ethnicity = match raw.ethnicity {
        Some(e) if !e.trim().is_empty() => e.trim().to_lowercase(),
        _ => {
            debug!("standardize: no inferred ethnicity for {:?}", player_id);
            "unknown".to_string()
        }
    };
    let ethnicity_group = EthnicityGroup::from_inferred(&ethnicity);
    Contestant {
        season,
        name,
        player_id,
        is_banished: finish == "banished",
        is_murdered: finish == "murdered",
        finish,
        gender,
        ethnicity,
        ethnicity_group,
        age: raw.age,
        episode: raw.episode,
    }
}

// **** Season and round discovery ****

/// The distinct seasons of the table, numeric seasons first in ascending
/// order, then the remaining labels lexicographically.
pub fn seasons(data: &[Contestant]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for c in data.iter() {
        if !out.contains(&c.season) {
            out.push(c.season.clone());
        }
    }
    out.sort_by_key(|s| match s.parse::<u64>() {
        Ok(n) => (false, n, String::new()),
        Err(_) => (true, 0, s.clone()),
    });
    out
}

/// The highest round-table number observed in the enriched votes.
pub fn max_round(votes: &[EnrichedVote]) -> Option<u32> {
    votes.iter().map(|v| v.round_table).max()
}

// **** Composition and rate aggregators ****

/// Baseline composition: for each grouping dimension independently, the
/// fraction of contestants in each category value. `None` pools every
/// season under the "all" label.
pub fn baseline_composition(data: &[Contestant], season: Option<&str>) -> Vec<CompositionRow> {
    let rows = season_subset(data, season);
    let label = season_label(season);
    let mut out: Vec<CompositionRow> = Vec::new();
    for dim in GroupDim::ALL {
        out.extend(composition_over(rows.iter().copied(), dim, &label));
    }
    out
}

/// Early-banishment statistics: contestants banished at or before the
/// episode cutoff, counted per category value together with their share of
/// the early-banished subset and the names in each bucket.
pub fn early_banishment_stats(
    data: &[Contestant],
    episode_cutoff: u32,
    season: Option<&str>,
) -> Vec<EarlyBanishmentRow> {
    let rows = season_subset(data, season);
    let early: Vec<&Contestant> = rows
        .into_iter()
        .filter(|c| c.is_banished && matches!(c.episode, Some(ep) if ep <= episode_cutoff))
        .collect();
    if early.is_empty() {
        return Vec::new();
    }
    let total = early.len();
    let label = season_label(season);

    let mut out: Vec<EarlyBanishmentRow> = Vec::new();
    for dim in GroupDim::ALL {
        let mut groups: BTreeMap<String, Vec<&Contestant>> = BTreeMap::new();
        for c in early.iter() {
            groups.entry(group_value(c, dim)).or_default().push(c);
        }
        for (value, members) in groups {
            let mut names: Vec<String> = members.iter().map(|c| c.name.clone()).collect();
            names.sort();
            names.dedup();
            out.push(EarlyBanishmentRow {
                group_type: dim,
                group_value: value,
                season: label.clone(),
                episode_cutoff,
                early_banished: members.len() as u64,
                percentage_of_early_banishments: members.len() as f64 / total as f64,
                early_banished_names: names,
            });
        }
    }
    out
}

/// Survival statistics by (gender, ethnicity group): median and mean
/// episode of exit plus the count of contestants with a recorded exit.
pub fn survival_stats(data: &[Contestant], season: Option<&str>) -> Vec<SurvivalRow> {
    let rows = season_subset(data, season);
    let label = season_label(season);
    let mut groups: BTreeMap<(String, EthnicityGroup), Vec<u32>> = BTreeMap::new();
    for c in rows {
        if let Some(ep) = c.episode {
            groups
                .entry((c.gender.clone(), c.ethnicity_group))
                .or_default()
                .push(ep);
        }
    }
    groups
        .into_iter()
        .map(|((gender, ethnicity_group), mut episodes)| {
            episodes.sort_unstable();
            SurvivalRow {
                gender,
                ethnicity_group,
                median_episode: median(&episodes),
                mean_episode: mean(&episodes),
                count: episodes.len() as u64,
                season: label.clone(),
            }
        })
        .collect()
}

/// Survival statistics by age bracket. Contestants without a valid age are
/// excluded here but retained in every other aggregate.
pub fn age_survival_stats(data: &[Contestant], season: Option<&str>) -> Vec<AgeSurvivalRow> {
    let rows = season_subset(data, season);
    let label = season_label(season);
    let mut groups: BTreeMap<AgeBracket, Vec<u32>> = BTreeMap::new();
    for c in rows {
        let bracket = match c.age.and_then(AgeBracket::from_age) {
            Some(b) => b,
            None => continue,
        };
        if let Some(ep) = c.episode {
            groups.entry(bracket).or_default().push(ep);
        }
    }
    groups
        .into_iter()
        .map(|(age_group, mut episodes)| {
            episodes.sort_unstable();
            AgeSurvivalRow {
                age_group,
                median_episode: median(&episodes),
                mean_episode: mean(&episodes),
                count: episodes.len() as u64,
                season: label.clone(),
            }
        })
        .collect()
}

/// Composition of the finalist subset. The finalists of a season are all
/// the rows whose episode equals that season's maximum episode; ties are
/// intentional, multiple finalists share the final episode.
pub fn finalist_composition(data: &[Contestant], season: Option<&str>) -> Vec<CompositionRow> {
    let rows = season_subset(data, season);
    let mut max_ep: HashMap<&str, u32> = HashMap::new();
    for c in rows.iter() {
        if let Some(ep) = c.episode {
            let entry = max_ep.entry(c.season.as_str()).or_insert(ep);
            if ep > *entry {
                *entry = ep;
            }
        }
    }
    let finalists: Vec<&Contestant> = rows
        .iter()
        .filter(|c| {
            matches!(
                (c.episode, max_ep.get(c.season.as_str())),
                (Some(ep), Some(max)) if ep == *max
            )
        })
        .copied()
        .collect();
    if finalists.is_empty() {
        return Vec::new();
    }
    let label = season_label(season);
    let mut out: Vec<CompositionRow> = Vec::new();
    for dim in GroupDim::ALL {
        out.extend(composition_over(finalists.iter().copied(), dim, &label));
    }
    out
}

// **** Vote enrichment and round-table aggregators ****

/// Joins raw votes with contestant demographics. Votes against special
/// non-player options are excluded up front; for the remaining rows the
/// output cardinality equals the input cardinality. An identifier that
/// matches no contestant leaves the demographic fields empty, it never
/// drops the row.
pub fn enrich_votes(votes: &[VoteRecord], contestants: &[Contestant]) -> Vec<EnrichedVote> {
    let lookup: HashMap<&str, &Contestant> = contestants
        .iter()
        .map(|c| (c.player_id.as_str(), c))
        .collect();
    let mut dropped: usize = 0;
    let mut out: Vec<EnrichedVote> = Vec::new();
    for v in votes.iter() {
        if !is_contestant_target(&v.target) {
            debug!("enrich_votes: excluding special target {:?}", v.target);
            dropped += 1;
            continue;
        }
        let target = lookup.get(v.target.as_str());
        let voter = lookup.get(v.player.as_str());
        if target.is_none() {
            debug!("enrich_votes: no contestant for target {:?}", v.target);
        }
        out.push(EnrichedVote {
            player: v.player.clone(),
            target: v.target.clone(),
            round_table: v.round_table,
            season: v.season.clone(),
            target_gender: target.map(|c| c.gender.clone()),
            target_ethnicity: target.map(|c| c.ethnicity_group),
            voter_gender: voter.map(|c| c.gender.clone()),
            voter_ethnicity: voter.map(|c| c.ethnicity_group),
        });
    }
    if dropped > 0 {
        info!(
            "enrich_votes: excluded {} votes against non-contestant targets",
            dropped
        );
    }
    out
}

fn round_subset<'a>(
    votes: &'a [EnrichedVote],
    round: u32,
    season: Option<&str>,
) -> Vec<&'a EnrichedVote> {
    votes
        .iter()
        .filter(|v| v.round_table == round)
        .filter(|v| match season {
            None => true,
            Some(s) => v.season == s,
        })
        .collect()
}

/// The enriched votes of one round table, stamped with the round number
/// and the season label.
pub fn round_votes(votes: &[EnrichedVote], round: u32, season: Option<&str>) -> Vec<RoundVoteRow> {
    let label = season_label(season);
    round_subset(votes, round, season)
        .into_iter()
        .map(|v| RoundVoteRow {
            player: v.player.clone(),
            target: v.target.clone(),
            round_table: v.round_table,
            season: label.clone(),
            target_gender: v.target_gender.clone(),
            target_ethnicity: v.target_ethnicity,
            voter_gender: v.voter_gender.clone(),
            voter_ethnicity: v.voter_ethnicity,
            round,
        })
        .collect()
}

/// The room baseline of one round table: the unique active voters grouped
/// by (gender, ethnicity group), with counts and proportions. Voters whose
/// demographics could not be resolved are not part of the partition, so
/// the proportions sum to 1 over the known-demographic voters.
pub fn round_baseline(
    votes: &[EnrichedVote],
    round: u32,
    season: Option<&str>,
) -> Vec<RoundBaselineRow> {
    let subset = round_subset(votes, round, season);
    let mut active: Vec<(&str, &str, EthnicityGroup)> = Vec::new();
    for v in subset {
        if let (Some(gender), Some(eth)) = (&v.voter_gender, v.voter_ethnicity) {
            let key = (v.player.as_str(), gender.as_str(), eth);
            if !active.contains(&key) {
                active.push(key);
            }
        }
    }
    if active.is_empty() {
        return Vec::new();
    }
    let mut groups: BTreeMap<(String, EthnicityGroup), u64> = BTreeMap::new();
    for (_, gender, eth) in active.iter() {
        *groups.entry((gender.to_string(), *eth)).or_insert(0) += 1;
    }
    let total: u64 = groups.values().sum();
    let label = season_label(season);
    groups
        .into_iter()
        .map(|((voter_gender, voter_ethnicity), player_count)| RoundBaselineRow {
            voter_gender,
            voter_ethnicity,
            player_count,
            baseline_proportion: player_count as f64 / total as f64,
            round,
            season: label.clone(),
        })
        .collect()
}

// **** Pipeline entry point ****

/// Runs the full aggregation pipeline over a pooled contestant table and
/// the raw votes.
///
/// Every aggregate is computed once pooled across seasons (under the "all"
/// label) and once per individual season, never partially. Round-table
/// aggregates cover the full integer range up to the highest observed
/// round. Empty subsets contribute nothing rather than failing.
pub fn run_banishment_stats(
    contestants: &[Contestant],
    votes: &[VoteRecord],
    options: &StatsOptions,
) -> Result<StatsBundle, StatsErrors> {
    info!(
        "Processing {:?} contestants and {:?} votes, options: {:?}",
        contestants.len(),
        votes.len(),
        options
    );
    if contestants.is_empty() {
        return Err(StatsErrors::EmptyTable);
    }

    let season_list = seasons(contestants);
    info!("Analyzing seasons: {:?}", season_list);

    let mut baseline = baseline_composition(contestants, None);
    for s in season_list.iter() {
        baseline.extend(baseline_composition(contestants, Some(s)));
    }

    let cutoff = options.episode_cutoff;
    let mut early_banishment = early_banishment_stats(contestants, cutoff, None);
    for s in season_list.iter() {
        early_banishment.extend(early_banishment_stats(contestants, cutoff, Some(s)));
    }

    let mut survival = survival_stats(contestants, None);
    for s in season_list.iter() {
        survival.extend(survival_stats(contestants, Some(s)));
    }

    let mut age_survival = age_survival_stats(contestants, None);
    for s in season_list.iter() {
        age_survival.extend(age_survival_stats(contestants, Some(s)));
    }

    let mut finalists = finalist_composition(contestants, None);
    for s in season_list.iter() {
        finalists.extend(finalist_composition(contestants, Some(s)));
    }

    let enriched = enrich_votes(votes, contestants);
    debug!("votes after enrichment: {:?} rows", enriched.len());

    let mut vote_counts: BTreeMap<(String, EthnicityGroup), u64> = BTreeMap::new();
    for v in enriched.iter() {
        if let (Some(gender), Some(eth)) = (&v.voter_gender, v.voter_ethnicity) {
            *vote_counts.entry((gender.clone(), eth)).or_insert(0) += 1;
        }
    }
    for ((gender, eth), count) in vote_counts.iter() {
        info!("votes cast by {} / {}: {}", gender, eth.as_str(), count);
    }

    let mut round_vote_rows: Vec<RoundVoteRow> = Vec::new();
    let mut round_baseline_rows: Vec<RoundBaselineRow> = Vec::new();
    if let Some(max) = max_round(&enriched) {
        for round in 1..=max {
            round_vote_rows.extend(round_votes(&enriched, round, None));
            for s in season_list.iter() {
                round_vote_rows.extend(round_votes(&enriched, round, Some(s)));
            }
            round_baseline_rows.extend(round_baseline(&enriched, round, None));
            for s in season_list.iter() {
                round_baseline_rows.extend(round_baseline(&enriched, round, Some(s)));
            }
        }
    }

    Ok(StatsBundle {
        baseline,
        early_banishment,
        survival,
        age_survival,
        finalists,
        round_votes: round_vote_rows,
        round_baseline: round_baseline_rows,
    })
}
