//! Join & ranking of vote tallies against the party catalog.
//!
//! Each tally is matched to its party by id. Matched rows take their display name (localized), symbol,
//! color and status from the party. Tallies that reference a party the catalog doesn't have still produce
//! a row, labelled with the tally's own `partyName` (or [`UNKNOWN_PARTY`]) and a neutral color.
//!
//! Rows are ordered by votes descending with a stable sort, so ties keep the order in which the backend
//! listed them, and ranked 1..=n in that order. [`rank`] is a pure function of its inputs.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{event, Level};

use crate::{
    fetcher::FetchedResults,
    model::{
        Locale, Party, PartyField, PartyStatus, VoteTally, DEFAULT_COLOR, DEFAULT_SYMBOL,
        UNKNOWN_PARTY,
    },
};

/// One ranked line of the results table. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub id: String,
    pub display_name: String,
    pub symbol: String,
    pub color: String,
    pub status: PartyStatus,
    pub votes: u64,
    /// share of `total_votes`, one decimal place
    pub percentage: String,
    /// 1-based position after sorting
    pub rank: usize,
}

/// Formats `votes / total_votes` as a percentage with one decimal, halves rounded up. A zero total yields
/// `"0.0"`.
pub fn format_percentage(votes: u64, total_votes: u64) -> String {
    let share = if total_votes > 0 {
        votes as f64 / total_votes as f64 * 100.0
    } else {
        0.0
    };

    // `{:.1}` alone rounds exact ties to even (6.25 -> "6.2")
    format!("{:.1}", (share * 10.0).round() / 10.0)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn join_row(tally: &VoteTally, party: Option<&Party>, total_votes: u64, locale: Locale) -> ResultRow {
    let fallback_name = non_empty(tally.party_name.as_deref()).unwrap_or(UNKNOWN_PARTY);

    let (id, display_name, symbol, color, status) = match party {
        Some(party) => (
            party.id.clone(),
            non_empty(Some(party.localized(PartyField::Name, locale))).unwrap_or(fallback_name),
            non_empty(party.symbol.as_deref()).or(non_empty(tally.symbol.as_deref())),
            non_empty(party.color.as_deref()).unwrap_or(DEFAULT_COLOR),
            party.status,
        ),
        None => (
            tally.party_id.clone(),
            fallback_name,
            non_empty(tally.symbol.as_deref()),
            DEFAULT_COLOR,
            PartyStatus::Active,
        ),
    };

    ResultRow {
        id,
        display_name: display_name.to_string(),
        symbol: symbol.unwrap_or(DEFAULT_SYMBOL).to_string(),
        color: color.to_string(),
        status,
        votes: tally.vote_count,
        percentage: format_percentage(tally.vote_count, total_votes),
        rank: 0,
    }
}

/// Joins `vote_results` with `parties`, computes vote shares and returns the rows ranked by votes.
pub fn rank(
    vote_results: &[VoteTally],
    total_votes: u64,
    parties: &[Party],
    locale: Locale,
) -> Vec<ResultRow> {
    // first party with a given id wins, same as a linear search would
    let mut catalog: HashMap<&str, &Party> = HashMap::with_capacity(parties.len());
    for party in parties {
        catalog.entry(party.id.as_str()).or_insert(party);
    }

    let mut rows: Vec<ResultRow> = vote_results
        .iter()
        .map(|tally| {
            let party = catalog.get(tally.party_id.as_str()).copied();
            join_row(tally, party, total_votes, locale)
        })
        .collect();

    // sort_by is stable: equal vote counts keep their input order
    rows.sort_by(|a, b| b.votes.cmp(&a.votes));
    for (index, row) in rows.iter_mut().enumerate() {
        row.rank = index + 1;
    }

    let tallied = rows
        .iter()
        .fold(0u64, |sum, row| sum.saturating_add(row.votes));
    if tallied != total_votes {
        event!(
            Level::DEBUG,
            "sum of tallies ({}) differs from reported total ({})",
            tallied,
            total_votes
        );
    }

    rows
}

/// Convenience wrapper over [`rank`] for a whole fetch result
pub fn rank_fetched(fetched: &FetchedResults, locale: Locale) -> Vec<ResultRow> {
    rank(
        &fetched.vote_results,
        fetched.total_votes,
        &fetched.parties,
        locale,
    )
}
