// src/filter/mod.rs

use chrono::{Datelike, NaiveDate};

use crate::dates;
use crate::records::ContestRecord;
use crate::table::Table;

/// User-selected inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        DateRange { from, to }
    }

    fn contains(&self, d: NaiveDate) -> bool {
        self.from <= d && d <= self.to
    }
}

/// Three-way overlap between the contest's `[start, end]` interval and the
/// selected window: the contest starts in the window, OR ends in it, OR
/// spans it entirely. A branch with a missing date simply cannot fire.
pub fn overlaps(start: Option<NaiveDate>, end: Option<NaiveDate>, range: &DateRange) -> bool {
    let starts_in = start.map(|s| range.contains(s)).unwrap_or(false);
    let ends_in = end.map(|e| range.contains(e)).unwrap_or(false);
    let spans = match (start, end) {
        (Some(s), Some(e)) => s <= range.from && e >= range.to,
        _ => false,
    };
    starts_in || ends_in || spans
}

/// Conjunctive contest filter. Every set predicate must hold; unset
/// predicates pass everything. Year and month are judged on the start date,
/// month by its calendar label ("December"), not its number.
#[derive(Debug, Clone, Default)]
pub struct ContestFilter {
    pub year: Option<i32>,
    pub month: Option<String>,
    pub camp_type: Option<String>,
    pub range: Option<DateRange>,
}

impl ContestFilter {
    pub fn matches(&self, rec: &ContestRecord) -> bool {
        if let Some(year) = self.year {
            match rec.start {
                Some(s) if s.year() == year => {}
                _ => return false,
            }
        }
        if let Some(month) = &self.month {
            match rec.start {
                Some(s) if dates::month_name(s).eq_ignore_ascii_case(month.trim()) => {}
                _ => return false,
            }
        }
        if let Some(camp_type) = &self.camp_type {
            match &rec.camp_type {
                Some(t) if t.trim() == camp_type.trim() => {}
                _ => return false,
            }
        }
        if let Some(range) = &self.range {
            if !overlaps(rec.start, rec.end, range) {
                return false;
            }
        }
        true
    }

    /// Keep matching records, in source row order, never duplicating.
    pub fn apply<'a>(&self, recs: &'a [ContestRecord]) -> Vec<&'a ContestRecord> {
        recs.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Re-sort a result set by start date ascending (the behavior of the later
/// revisions); dateless records sink to the end, keeping their row order.
pub fn sort_by_start<'a>(mut recs: Vec<&'a ContestRecord>) -> Vec<&'a ContestRecord> {
    recs.sort_by_key(|r| (r.start.is_none(), r.start, r.row));
    recs
}

/// Row indices whose stringified cell in `col` contains `query` as a
/// case-insensitive substring. No tokenization, no ranking, no pagination.
pub fn search_rows(table: &Table, col: usize, query: &str) -> Vec<usize> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return (0..table.len()).collect();
    }
    (0..table.len())
        .filter(|&row| table.cell(row, col).to_lowercase().contains(&needle))
        .collect()
}

/// Search projected back into a table over the same columns.
pub fn search(table: &Table, col: usize, query: &str) -> Table {
    table.select_rows(&search_rows(table, col, query))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(row: usize, start: Option<NaiveDate>, end: Option<NaiveDate>) -> ContestRecord {
        ContestRecord {
            row,
            merch_id: None,
            name: None,
            camp_type: Some("Spin".into()),
            start,
            end,
            announce: None,
            kam: None,
            audience: None,
        }
    }

    #[test]
    fn range_overlap_includes_the_ends_in_range_case() {
        // Contest 01-01-2024..31-01-2024 vs window 2024-01-15..2024-02-01.
        let range = DateRange::new(d(2024, 1, 15), d(2024, 2, 1));
        assert!(overlaps(Some(d(2024, 1, 1)), Some(d(2024, 1, 31)), &range));
    }

    #[test]
    fn range_overlap_excludes_a_disjoint_window() {
        let range = DateRange::new(d(2024, 2, 1), d(2024, 3, 1));
        assert!(!overlaps(Some(d(2024, 1, 1)), Some(d(2024, 1, 31)), &range));
    }

    #[test]
    fn range_overlap_spanning_branch() {
        let range = DateRange::new(d(2024, 1, 10), d(2024, 1, 12));
        assert!(overlaps(Some(d(2024, 1, 1)), Some(d(2024, 1, 31)), &range));
    }

    #[test]
    fn range_overlap_with_missing_dates() {
        let range = DateRange::new(d(2024, 1, 10), d(2024, 1, 20));
        // Start known and inside the window: the starts-in branch fires.
        assert!(overlaps(Some(d(2024, 1, 15)), None, &range));
        // Nothing known: no branch can fire.
        assert!(!overlaps(None, None, &range));
    }

    #[test]
    fn filters_are_conjunctive() {
        let recs = vec![
            rec(0, Some(d(2024, 1, 1)), Some(d(2024, 1, 31))),
            rec(1, Some(d(2024, 12, 8)), Some(d(2024, 12, 20))),
            rec(2, Some(d(2023, 12, 1)), Some(d(2023, 12, 31))),
        ];
        let filter = ContestFilter {
            year: Some(2024),
            month: Some("December".into()),
            camp_type: Some("Spin".into()),
            range: None,
        };
        let hits = filter.apply(&recs);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].row, 1);
    }

    #[test]
    fn month_filter_matches_by_label_not_number() {
        let recs = vec![rec(0, Some(d(2024, 12, 8)), None)];
        let by_label = ContestFilter {
            month: Some("december".into()),
            ..Default::default()
        };
        assert_eq!(by_label.apply(&recs).len(), 1);
        let wrong_label = ContestFilter {
            month: Some("12".into()),
            ..Default::default()
        };
        assert!(wrong_label.apply(&recs).is_empty());
    }

    #[test]
    fn filtering_preserves_order_and_never_duplicates() {
        let recs: Vec<ContestRecord> = (0..6)
            .map(|i| rec(i, Some(d(2024, 1, 1 + i as u32)), Some(d(2024, 2, 1))))
            .collect();
        let filter = ContestFilter {
            range: Some(DateRange::new(d(2024, 1, 3), d(2024, 1, 5))),
            ..Default::default()
        };
        let hits = filter.apply(&recs);
        let rows: Vec<usize> = hits.iter().map(|r| r.row).collect();
        let mut sorted = rows.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(rows, sorted, "result must be an in-order subsequence");
        assert!(rows.iter().all(|r| *r < recs.len()));
    }

    #[test]
    fn sort_by_start_sinks_dateless_records() {
        let recs = vec![
            rec(0, None, None),
            rec(1, Some(d(2024, 3, 1)), None),
            rec(2, Some(d(2024, 1, 1)), None),
        ];
        let refs: Vec<&ContestRecord> = recs.iter().collect();
        let sorted = sort_by_start(refs);
        let rows: Vec<usize> = sorted.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 1, 0]);
    }

    fn winners_table() -> Table {
        Table::from_values(
            vec![
                vec!["businessid", "Gift"],
                vec!["BZID-1304470286", "Mixer"],
                vec!["bzid-9913040000", "Kettle"],
                vec!["BZID-5550001111", "Mixer"],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect(),
        )
    }

    #[test]
    fn search_is_case_insensitive_substring_containment() {
        let t = winners_table();
        let col = t.column_index("businessid").unwrap();
        // "1304" appears mid-id in both rows, one upper- and one lowercase.
        assert_eq!(search_rows(&t, col, "1304"), vec![0, 1]);
        assert_eq!(search_rows(&t, col, "BZID"), vec![0, 1, 2]);
        assert_eq!(search_rows(&t, col, "zzz"), Vec::<usize>::new());
    }

    #[test]
    fn search_is_idempotent() {
        let t = winners_table();
        let col = t.column_index("businessid").unwrap();
        let once = search(&t, col, "1304");
        let twice = search(&once, col, "1304");
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_query_matches_everything() {
        let t = winners_table();
        assert_eq!(search_rows(&t, 0, "  "), vec![0, 1, 2]);
    }
}
