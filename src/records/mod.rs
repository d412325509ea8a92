// src/records/mod.rs
//
// Strongly-typed views over the two worksheets. Column names drifted across
// spreadsheet revisions, so each logical field carries a prioritized list of
// accepted source labels, resolved once at load time instead of probed at
// every use site. Absent columns leave the field `None` and the dependent
// feature degrades silently.

use chrono::NaiveDate;
use tracing::debug;

use crate::dates::{self, Status};
use crate::table::Table;

// Contest Details labels.
pub const MERCH_ID: &[&str] = &["Merch ID", "Merchant ID", "ID"];
pub const CAMPAIGN_NAME: &[&str] = &["Camp Name", "Campaign Name", "Contest Name"];
pub const CAMPAIGN_TYPE: &[&str] = &["Camp Type", "Campaign Type", "Type"];
pub const START_DATE: &[&str] = &["Start Date", "Start date", "start_date"];
pub const END_DATE: &[&str] = &["End Date", "End date", "end_date"];
pub const ANNOUNCE_DATE: &[&str] = &["Winner Announcement Date", "Announcement Date"];
pub const KAM: &[&str] = &["KAM", "Owner"];
pub const AUDIENCE: &[&str] = &["To Whom?", "To Whom", "Audience"];

// Winner Details labels.
pub const BUSINESS_ID: &[&str] = &["businessid", "business_id", "Business ID"];
pub const CUSTOMER_NAME: &[&str] = &["customer_firstname", "Customer Name", "Customer"];
pub const CUSTOMER_PHONE: &[&str] = &["customer_phone", "Phone"];
pub const BUSINESS_NAME: &[&str] = &["business_displayname", "Business Name"];
pub const LOCATION: &[&str] = &["location", "Location", "City"];
pub const CONTEST_LABEL: &[&str] = &["Contest", "Camp Description", "Campaign"];
pub const GIFT: &[&str] = &["Gift", "Prize"];
pub const GIFT_STATUS: &[&str] = &["Gift Status", "Gift Sent", "Status"];
pub const GIFT_SENT_DATE: &[&str] = &["Gift Sent Date"];

/// One row of the Contest Details worksheet, `row` pointing back at its
/// position in the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct ContestRecord {
    pub row: usize,
    pub merch_id: Option<String>,
    pub name: Option<String>,
    pub camp_type: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub announce: Option<NaiveDate>,
    pub kam: Option<String>,
    pub audience: Option<String>,
}

impl ContestRecord {
    /// Inclusive length of the contest in days, when both dates parsed.
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(s), Some(e)) => Some((e - s).num_days() + 1),
            _ => None,
        }
    }

    pub fn status(&self, today: NaiveDate) -> Status {
        dates::classify(self.start, self.end, today)
    }
}

/// One row of the Winner Details worksheet. Date fields are denormalized
/// copies of the contest's and are not guaranteed consistent with it.
#[derive(Debug, Clone, PartialEq)]
pub struct WinnerRecord {
    pub row: usize,
    pub business_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub business_name: Option<String>,
    pub location: Option<String>,
    pub contest: Option<String>,
    pub gift: Option<String>,
    pub gift_status: Option<String>,
    pub gift_sent: Option<NaiveDate>,
    pub announce: Option<NaiveDate>,
}

fn text_field(table: &Table, row: usize, col: Option<usize>) -> Option<String> {
    let cell = table.cell(row, col?);
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Normalize one date column of the table, or return a `None`-filled column
/// when no candidate label resolves.
fn date_column(table: &Table, candidates: &[&str]) -> Vec<Option<NaiveDate>> {
    match table.resolve_column(candidates) {
        Some(idx) => dates::normalize_column(&table.column(idx)),
        None => {
            debug!("no column matched {:?}; dates absent", candidates);
            vec![None; table.len()]
        }
    }
}

/// Resolve the Contest Details columns once and build typed records, one per
/// table row, in row order.
pub fn load_contests(table: &Table) -> Vec<ContestRecord> {
    let merch = table.resolve_column(MERCH_ID);
    let name = table.resolve_column(CAMPAIGN_NAME);
    let camp_type = table.resolve_column(CAMPAIGN_TYPE);
    let kam = table.resolve_column(KAM);
    let audience = table.resolve_column(AUDIENCE);
    let starts = date_column(table, START_DATE);
    let ends = date_column(table, END_DATE);
    let announces = date_column(table, ANNOUNCE_DATE);

    (0..table.len())
        .map(|row| ContestRecord {
            row,
            merch_id: text_field(table, row, merch),
            name: text_field(table, row, name),
            camp_type: text_field(table, row, camp_type),
            start: starts[row],
            end: ends[row],
            announce: announces[row],
            kam: text_field(table, row, kam),
            audience: text_field(table, row, audience),
        })
        .collect()
}

/// Resolve the Winner Details columns once and build typed records.
pub fn load_winners(table: &Table) -> Vec<WinnerRecord> {
    let business_id = table.resolve_column(BUSINESS_ID);
    let customer = table.resolve_column(CUSTOMER_NAME);
    let phone = table.resolve_column(CUSTOMER_PHONE);
    let business = table.resolve_column(BUSINESS_NAME);
    let location = table.resolve_column(LOCATION);
    let contest = table.resolve_column(CONTEST_LABEL);
    let gift = table.resolve_column(GIFT);
    let gift_status = table.resolve_column(GIFT_STATUS);
    let gift_sent = date_column(table, GIFT_SENT_DATE);
    let announces = date_column(table, ANNOUNCE_DATE);

    (0..table.len())
        .map(|row| WinnerRecord {
            row,
            business_id: text_field(table, row, business_id),
            customer_name: text_field(table, row, customer),
            customer_phone: text_field(table, row, phone),
            business_name: text_field(table, row, business),
            location: text_field(table, row, location),
            contest: text_field(table, row, contest),
            gift: text_field(table, row, gift),
            gift_status: text_field(table, row, gift_status),
            gift_sent: gift_sent[row],
            announce: announces[row],
        })
        .collect()
}

/// Winner rows ordered newest announcement first, the business-history
/// order; dateless rows sink to the end, keeping their row order.
pub fn sort_by_announce_desc(winners: &[WinnerRecord]) -> Vec<&WinnerRecord> {
    let mut refs: Vec<&WinnerRecord> = winners.iter().collect();
    refs.sort_by_key(|w| (w.announce.is_none(), std::cmp::Reverse(w.announce), w.row));
    refs
}

/// Mean inclusive contest length in days, over the records where both dates
/// parsed; `None` when no contest has a measurable duration.
pub fn average_duration_days(contests: &[ContestRecord]) -> Option<f64> {
    let mut sum = 0i64;
    let mut n = 0usize;
    for days in contests.iter().filter_map(|c| c.duration_days()) {
        sum += days;
        n += 1;
    }
    if n == 0 {
        None
    } else {
        Some(sum as f64 / n as f64)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Best-effort link from a winner row to the contest it refers to: the first
/// contest whose name contains the winner's contest label (or vice versa),
/// case-insensitively. This is a fuzzy match over denormalized text, not a
/// foreign key.
pub fn link_contest<'a>(
    winner: &WinnerRecord,
    contests: &'a [ContestRecord],
) -> Option<&'a ContestRecord> {
    let label = winner.contest.as_deref()?.trim();
    if label.is_empty() {
        return None;
    }
    contests.iter().find(|c| {
        c.name
            .as_deref()
            .map(|n| contains_ci(n, label) || contains_ci(label, n))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn contest_table() -> Table {
        Table::from_values(
            vec![
                vec!["Merch ID", "Camp Name", "Camp Type", "Start Date", "End Date", "KAM"],
                vec!["M-1", "Diwali Spin", "Spin", "01-01-2024", "31-01-2024", "Asha"],
                vec!["M-2", "Summer Quiz", "Quiz", "15-06-2024", "not a date", "Ravi"],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect(),
        )
    }

    #[test]
    fn contests_load_through_label_fallbacks() {
        let recs = load_contests(&contest_table());
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].name.as_deref(), Some("Diwali Spin"));
        assert_eq!(recs[0].start, Some(d(2024, 1, 1)));
        assert_eq!(recs[0].end, Some(d(2024, 1, 31)));
        assert_eq!(recs[0].duration_days(), Some(31));
        // Announcement column absent entirely, audience absent: degrade.
        assert_eq!(recs[0].announce, None);
        assert_eq!(recs[0].audience, None);
    }

    #[test]
    fn unparseable_dates_degrade_to_unknown_status() {
        let recs = load_contests(&contest_table());
        assert_eq!(recs[1].end, None);
        assert_eq!(recs[1].status(d(2024, 6, 20)), Status::Unknown);
        assert_eq!(recs[1].duration_days(), None);
    }

    #[test]
    fn status_comes_from_the_classifier() {
        let recs = load_contests(&contest_table());
        assert_eq!(recs[0].status(d(2024, 1, 15)), Status::Running);
        assert_eq!(recs[0].status(d(2023, 12, 31)), Status::Upcoming);
        assert_eq!(recs[0].status(d(2024, 2, 1)), Status::Past);
    }

    #[test]
    fn winners_load_with_alternate_labels() {
        let table = Table::from_values(
            vec![
                vec!["Business ID", "Customer Name", "Contest", "Gift"],
                vec!["BZID-1304470286", "Priya", "Diwali Spin Week 2", "Mixer"],
            ]
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect(),
        );
        let recs = load_winners(&table);
        assert_eq!(recs[0].business_id.as_deref(), Some("BZID-1304470286"));
        assert_eq!(recs[0].gift.as_deref(), Some("Mixer"));
        assert_eq!(recs[0].customer_phone, None);
    }

    fn winner(row: usize, announce: Option<NaiveDate>) -> WinnerRecord {
        WinnerRecord {
            row,
            business_id: Some("BZID-1304470286".into()),
            customer_name: None,
            customer_phone: None,
            business_name: None,
            location: None,
            contest: None,
            gift: None,
            gift_status: None,
            gift_sent: None,
            announce,
        }
    }

    #[test]
    fn business_history_orders_newest_announcement_first() {
        let winners = vec![
            winner(0, Some(d(2024, 1, 5))),
            winner(1, None),
            winner(2, Some(d(2024, 3, 1))),
            winner(3, Some(d(2023, 11, 20))),
        ];
        let rows: Vec<usize> = sort_by_announce_desc(&winners)
            .iter()
            .map(|w| w.row)
            .collect();
        assert_eq!(rows, vec![2, 0, 3, 1]);
    }

    #[test]
    fn average_duration_skips_dateless_contests() {
        let recs = load_contests(&contest_table());
        // Only the first contest has both dates: 31 inclusive days.
        assert_eq!(average_duration_days(&recs), Some(31.0));
        assert_eq!(average_duration_days(&[]), None);
    }

    #[test]
    fn winner_links_to_contest_by_substring_either_way() {
        let contests = load_contests(&contest_table());
        let winner = WinnerRecord {
            row: 0,
            business_id: Some("BZID-1".into()),
            customer_name: None,
            customer_phone: None,
            business_name: None,
            location: None,
            contest: Some("diwali spin week 2".into()),
            gift: None,
            gift_status: None,
            gift_sent: None,
            announce: None,
        };
        let linked = link_contest(&winner, &contests).unwrap();
        assert_eq!(linked.merch_id.as_deref(), Some("M-1"));

        let unlinked = WinnerRecord {
            contest: Some("Monsoon Draw".into()),
            ..winner.clone()
        };
        assert!(link_contest(&unlinked, &contests).is_none());

        let no_label = WinnerRecord {
            contest: None,
            ..winner
        };
        assert!(link_contest(&no_label, &contests).is_none());
    }
}
