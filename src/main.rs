use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use sheetdash::{
    auth::{self, SheetsAuth},
    config::DashConfig,
    dates::Status,
    export,
    fetch::{store::SheetStore, SheetsClient},
    filter::{self, ContestFilter, DateRange},
    records, render,
    table::Table,
};
use std::{
    collections::{HashMap, HashSet},
    env, fs,
    path::PathBuf,
    time::Duration,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// ISO date pair overriding the default "this month" window.
const FROM_ENV: &str = "SHEETDASH_FROM";
const TO_ENV: &str = "SHEETDASH_TO";
/// Business-id substring to look up in the winners table.
const SEARCH_ENV: &str = "SHEETDASH_SEARCH";
/// `cards` switches the contest listing from the table view.
const VIEW_ENV: &str = "SHEETDASH_VIEW";
/// Alternate config file path.
const CONFIG_ENV: &str = "SHEETDASH_CONFIG";

fn env_date(var: &str) -> Result<Option<NaiveDate>> {
    match env::var(var) {
        Ok(s) => {
            let d = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("${} must be YYYY-MM-DD, got `{}`", var, s))?;
            Ok(Some(d))
        }
        Err(_) => Ok(None),
    }
}

/// Selected window: env override, else the first of this month through today.
fn selected_range(today: NaiveDate) -> Result<DateRange> {
    let from = env_date(FROM_ENV)?;
    let to = env_date(TO_ENV)?;
    let month_start = today.with_day(1).unwrap_or(today);
    Ok(DateRange::new(
        from.unwrap_or(month_start),
        to.unwrap_or(today),
    ))
}

fn date_columns(table: &Table) -> Vec<usize> {
    [
        records::START_DATE,
        records::END_DATE,
        records::ANNOUNCE_DATE,
        records::GIFT_SENT_DATE,
    ]
    .iter()
    .filter_map(|candidates| table.resolve_column(candidates))
    .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sheetdash=info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();
    info!("startup");

    // ─── 2) load config + credentials ────────────────────────────────
    let config_path = env::var(CONFIG_ENV).ok().map(PathBuf::from);
    let config = DashConfig::load(config_path.as_deref())?;
    info!(spreadsheet = %config.spreadsheet_id, "config loaded");

    let key = auth::load_service_account(&config.credentials_path)?;
    if let Some(key) = &key {
        info!(client_email = %key.client_email, "service account available");
    }
    let sheets_auth = SheetsAuth::resolve(key.as_ref(), config.api_key.as_deref())?;

    // ─── 3) fetch both tables (cache-backed) ─────────────────────────
    let client = SheetsClient::new(config.spreadsheet_id.clone(), sheets_auth)?;
    let store = SheetStore::new(client, Duration::from_secs(config.cache_ttl_secs));

    let winner_aliases = config.winner_aliases();
    let (contest_table, winner_table) = tokio::try_join!(
        store.table(&config.contest_worksheet),
        store.table_by_aliases(&winner_aliases),
    )?;
    if winner_table.is_none() {
        warn!("winners worksheet missing; winner features disabled for this run");
    }

    // ─── 4) typed records + status summary ───────────────────────────
    let contests = records::load_contests(&contest_table);
    let today = Local::now().date_naive();

    let mut by_status: HashMap<Status, usize> = HashMap::new();
    for rec in &contests {
        *by_status.entry(rec.status(today)).or_insert(0) += 1;
    }
    info!(
        total = contests.len(),
        running = by_status.get(&Status::Running).copied().unwrap_or(0),
        upcoming = by_status.get(&Status::Upcoming).copied().unwrap_or(0),
        past = by_status.get(&Status::Past).copied().unwrap_or(0),
        unknown = by_status.get(&Status::Unknown).copied().unwrap_or(0),
        "contest records loaded"
    );

    if let Some(avg) = records::average_duration_days(&contests) {
        println!("Average contest duration: {:.1} days", avg);
    }

    if let Some(col) = contest_table.resolve_column(records::CAMPAIGN_TYPE) {
        print!(
            "{}",
            render::counts("Contests by type", &contest_table.value_counts(col))
        );
        println!();
    }

    // ─── 5) filter to the selected window ────────────────────────────
    let range = selected_range(today)?;
    let filter = ContestFilter {
        range: Some(range),
        ..Default::default()
    };
    let hits = filter::sort_by_start(filter.apply(&contests));
    let rows: Vec<usize> = hits.iter().map(|r| r.row).collect();
    let filtered = contest_table.select_rows(&rows);

    println!(
        "Contests overlapping {} to {}: {}",
        range.from, range.to, filtered.len()
    );
    let view = env::var(VIEW_ENV).unwrap_or_default();
    if view.eq_ignore_ascii_case("cards") {
        print!("{}", render::cards(&filtered));
    } else {
        print!("{}", render::text_table(&filtered));
    }

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("creating output directory {}", config.out_dir.display()))?;
    let out_path = config
        .out_dir
        .join(export::range_filename("running_contests", &range));
    export::write_csv(&filtered, &date_columns(&filtered), &out_path)?;
    println!("exported {}", out_path.display());

    // ─── 6) winner lookup + recent winners ───────────────────────────
    if let Some(winner_table) = winner_table {
        let winners = records::load_winners(&winner_table);
        let unique_businesses = winner_table
            .resolve_column(records::BUSINESS_ID)
            .map(|col| winner_table.nunique(col))
            .unwrap_or(0);
        info!(
            total = winners.len(),
            unique_businesses, "winner records loaded"
        );

        if let Ok(query) = env::var(SEARCH_ENV) {
            match winner_table.resolve_column(records::BUSINESS_ID) {
                Some(col) => {
                    // Business history: hits ordered newest announcement
                    // first, with the win-span summary.
                    let hit_rows: HashSet<usize> = filter::search_rows(&winner_table, col, &query)
                        .into_iter()
                        .collect();
                    let hits: Vec<records::WinnerRecord> = winners
                        .iter()
                        .filter(|w| hit_rows.contains(&w.row))
                        .cloned()
                        .collect();
                    let ordered = records::sort_by_announce_desc(&hits);
                    let rows: Vec<usize> = ordered.iter().map(|w| w.row).collect();
                    let announced: Vec<NaiveDate> =
                        ordered.iter().filter_map(|w| w.announce).collect();
                    let history = winner_table.select_rows(&rows);

                    println!("\nWinner history for `{}`: {} wins", query, history.len());
                    if let (Some(first), Some(last)) =
                        (announced.iter().min(), announced.iter().max())
                    {
                        println!(
                            "first win: {}  last win: {}",
                            first.format("%d-%b-%Y"),
                            last.format("%d-%b-%Y")
                        );
                    }
                    print!("{}", render::cards(&history));
                    let path = config.out_dir.join(export::search_filename(&query));
                    export::write_csv(&history, &date_columns(&history), &path)?;
                    println!("exported {}", path.display());
                }
                None => warn!("no business-id column; lookup disabled"),
            }
        }

        // Ten most recently announced winners, dateless rows last.
        let recent_rows: Vec<usize> = records::sort_by_announce_desc(&winners)
            .iter()
            .take(10)
            .map(|w| w.row)
            .collect();
        println!("\nRecent winners:");
        print!("{}", render::text_table(&winner_table.select_rows(&recent_rows)));
    }

    info!("done");
    Ok(())
}
