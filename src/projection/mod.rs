//! Locale-aware projection of the results table.
//!
//! A language switch re-labels rows from the raw data of the last applied fetch. It never touches the
//! network; without a retained fetch there is nothing to project and the caller keeps what it has.
use crate::{
    fetcher::FetchedResults,
    model::Locale,
    ranking::{rank_fetched, ResultRow},
};

/// Re-derives the rows for `locale`. Returns `None` when no fetch has been applied yet.
pub fn project(retained: Option<&FetchedResults>, locale: Locale) -> Option<Vec<ResultRow>> {
    retained.map(|fetched| rank_fetched(fetched, locale))
}

#[cfg(test)]
mod tests {
    use crate::{
        fetcher::FetchedResults,
        model::Locale,
        test_utils::{party, tally, with_translated_name},
    };

    use super::project;

    #[test]
    fn nothing_to_project_before_first_fetch() {
        assert!(project(None, Locale::Hi).is_none());
    }

    #[test]
    fn relabels_every_row() {
        let fetched = FetchedResults {
            vote_results: vec![tally("A", 30), tally("B", 70)],
            total_votes: 100,
            parties: vec![
                with_translated_name(party("A", "Alpha"), "mr", "आल्फा"),
                with_translated_name(party("B", "Beta"), "mr", "बीटा"),
            ],
        };

        let rows = project(Some(&fetched), Locale::Mr).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["बीटा", "आल्फा"]);

        let rows = project(Some(&fetched), Locale::En).unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
    }
}
