// src/dates/mod.rs
//
// Best-effort normalization of the sheet's heterogeneous date strings.
// Nothing here errors: a cell that parses under no known shape becomes
// `None` and the caller degrades.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Fixed priority list of explicit formats, day-first shapes before ISO,
/// text-month shapes after, two-digit-year variants last.
pub const DATE_FORMATS: &[&str] = &[
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d %B %Y",
    "%d-%m-%y",
    "%d/%m/%y",
];

pub const MONTH_NAMES: &[&str] = &[
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// `D-M-Y` or `D/M/Y` with a 2- or 4-digit year.
static NUMERIC_DMY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{2,4})$").unwrap());

/// `YYYY-M-D` or `YYYY/M/D`.
static NUMERIC_YMD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})[-/](\d{1,2})$").unwrap());

/// Which side of a numeric date the day sits on. Detected per column by
/// majority vote over the unambiguous cells; ties break toward day-first,
/// matching the source data's convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    DayFirst,
    MonthFirst,
    Iso,
}

/// Try the explicit formats in priority order. A numeric `%Y` match with a
/// year below 1000 is rejected (it is really a two-digit year that a later
/// format will pick up).
pub fn parse_with_formats(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            if fmt.contains("%Y") && d.year() < 1000 {
                continue;
            }
            return Some(d);
        }
    }
    None
}

/// Permissive day-first parse of a numeric date: split on `-`/`/`, treat the
/// pieces as day, month, year; if that is impossible but swapping day and
/// month is not, swap. Two-digit years map to 2000+.
pub fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let caps = NUMERIC_DMY.captures(s.trim())?;
    let a: u32 = caps[1].parse().ok()?;
    let b: u32 = caps[2].parse().ok()?;
    let mut y: i32 = caps[3].parse().ok()?;
    if y < 100 {
        y += 2000;
    }
    NaiveDate::from_ymd_opt(y, b, a).or_else(|| NaiveDate::from_ymd_opt(y, a, b))
}

/// Month-first variant of the permissive parse, for columns the vote decides
/// are month-first.
fn parse_month_first(s: &str) -> Option<NaiveDate> {
    let caps = NUMERIC_DMY.captures(s.trim())?;
    let a: u32 = caps[1].parse().ok()?;
    let b: u32 = caps[2].parse().ok()?;
    let mut y: i32 = caps[3].parse().ok()?;
    if y < 100 {
        y += 2000;
    }
    NaiveDate::from_ymd_opt(y, a, b).or_else(|| NaiveDate::from_ymd_opt(y, b, a))
}

/// Parse a single cell: explicit formats first, then the permissive
/// day-first fallback. Unparseable cells are `None`, never an error.
pub fn parse_cell(s: &str) -> Option<NaiveDate> {
    parse_with_formats(s).or_else(|| parse_day_first(s))
}

/// Vote on the numeric ordering of a date column by sampling up to
/// `sample_limit` cells. Only unambiguous cells vote: `a-b-y` with `a > 12`
/// is day-first evidence, `b > 12` month-first, a four-digit leading year is
/// ISO. Ties and vote-free columns resolve to day-first.
pub fn detect_order<'a, I>(cells: I, sample_limit: usize) -> DateOrder
where
    I: IntoIterator<Item = &'a str>,
{
    let (mut day_first, mut month_first, mut iso) = (0usize, 0usize, 0usize);
    for cell in cells.into_iter().take(sample_limit) {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        if NUMERIC_YMD.is_match(cell) {
            iso += 1;
            continue;
        }
        if let Some(caps) = NUMERIC_DMY.captures(cell) {
            let a: u32 = caps[1].parse().unwrap_or(0);
            let b: u32 = caps[2].parse().unwrap_or(0);
            if a > 12 && b <= 12 {
                day_first += 1;
            } else if b > 12 && a <= 12 {
                month_first += 1;
            }
        }
    }
    if iso > day_first && iso > month_first {
        DateOrder::Iso
    } else if month_first > day_first && month_first > iso {
        DateOrder::MonthFirst
    } else {
        DateOrder::DayFirst
    }
}

/// Parse one cell under a detected ordering, falling back to the generic
/// path when the ordered parse misses (text months, odd shapes).
pub fn parse_ordered(s: &str, order: DateOrder) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    match order {
        DateOrder::DayFirst => parse_cell(s),
        DateOrder::MonthFirst => parse_month_first(s).or_else(|| parse_cell(s)),
        DateOrder::Iso => {
            if let Some(caps) = NUMERIC_YMD.captures(s) {
                let y: i32 = caps[1].parse().ok()?;
                let m: u32 = caps[2].parse().ok()?;
                let d: u32 = caps[3].parse().ok()?;
                NaiveDate::from_ymd_opt(y, m, d)
            } else {
                parse_cell(s)
            }
        }
    }
}

const ORDER_SAMPLE_LIMIT: usize = 100;

/// Normalize a whole column: detect its ordering by vote, then parse every
/// cell under it. Output is aligned with the input rows.
pub fn normalize_column(cells: &[&str]) -> Vec<Option<NaiveDate>> {
    let order = detect_order(cells.iter().copied(), ORDER_SAMPLE_LIMIT);
    cells.iter().map(|c| parse_ordered(c, order)).collect()
}

/// Export/display format, `DD-MM-YYYY`.
pub fn format_dmy(d: NaiveDate) -> String {
    d.format("%d-%m-%Y").to_string()
}

pub fn month_name(d: NaiveDate) -> &'static str {
    MONTH_NAMES[d.month0() as usize]
}

/// Where a contest sits relative to "today". `Unknown` covers a missing or
/// unparseable start or end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Upcoming,
    Running,
    Past,
    Unknown,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Upcoming => "upcoming",
            Status::Running => "running",
            Status::Past => "past",
            Status::Unknown => "unknown",
        }
    }
}

/// Running is inclusive of both boundary dates: `start <= today <= end`.
pub fn classify(start: Option<NaiveDate>, end: Option<NaiveDate>, today: NaiveDate) -> Status {
    match (start, end) {
        (Some(s), Some(e)) => {
            if s > today {
                Status::Upcoming
            } else if e < today {
                Status::Past
            } else {
                Status::Running
            }
        }
        _ => Status::Unknown,
    }
}
