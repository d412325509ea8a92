// src/fetch/mod.rs

pub mod store;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::SheetsAuth;
use crate::table::Table;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Historical names of the winners worksheet, in lookup order. Trailing-space
/// and pluralization variants both occur in old spreadsheet revisions.
pub const WINNER_SHEET_ALIASES: &[&str] = &[
    "Winner Details",
    "Winners Details",
    "Winner Details ",
    "Winners Details ",
];

/// First alias present verbatim in the spreadsheet's worksheet list, if any.
/// A miss is a `None`, never a panic; the caller decides how loudly to warn.
pub fn resolve_worksheet<'a>(titles: &'a [String], aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .find_map(|alias| titles.iter().find(|t| t.as_str() == *alias))
        .map(|t| t.as_str())
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

fn cell_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Read-only client for one spreadsheet.
pub struct SheetsClient {
    http: Client,
    base: Url,
    spreadsheet_id: String,
    auth: SheetsAuth,
}

impl SheetsClient {
    pub fn new(spreadsheet_id: impl Into<String>, auth: SheetsAuth) -> Result<Self> {
        Ok(SheetsClient {
            http: Client::new(),
            base: Url::parse(SHEETS_API_BASE).context("parsing Sheets API base URL")?,
            spreadsheet_id: spreadsheet_id.into(),
            auth,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| anyhow!("Sheets API base URL cannot be a base"))?;
            path.push(&self.spreadsheet_id);
            for seg in segments {
                path.push(seg);
            }
        }
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
        debug!(%url, "GET");
        let resp = self
            .auth
            .apply(self.http.get(url))
            .send()
            .await
            .with_context(|| format!("requesting {}", what))?;

        if matches!(
            resp.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            bail!(
                "authentication failed fetching {} (HTTP {}); check the credential \
                 and make sure the spreadsheet is shared with the service account",
                what,
                resp.status()
            );
        }

        let resp = resp
            .error_for_status()
            .with_context(|| format!("fetching {}", what))?;
        resp.json::<T>()
            .await
            .with_context(|| format!("decoding {} response", what))
    }

    /// Titles of every worksheet (tab) in the spreadsheet.
    pub async fn worksheet_titles(&self) -> Result<Vec<String>> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");
        let meta: SpreadsheetMeta = self.get_json(url, "worksheet list").await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    /// Fetch one worksheet as a table: first row is the header, fully-empty
    /// rows are dropped.
    pub async fn fetch_values(&self, title: &str) -> Result<Table> {
        let url = self.endpoint(&["values", title])?;
        let range: ValueRange = self
            .get_json(url, &format!("worksheet `{}`", title))
            .await?;
        let values: Vec<Vec<String>> = range
            .values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();
        let table = Table::from_values(values);
        info!(worksheet = title, rows = table.len(), "worksheet fetched");
        Ok(table)
    }

    /// Resolve a worksheet by its alias list and fetch it, returning the
    /// resolved title alongside the table. A name miss is a degraded
    /// feature, not a failure: the dependent table comes back as `None`
    /// with a warning.
    pub async fn fetch_by_aliases(&self, aliases: &[&str]) -> Result<Option<(String, Table)>> {
        let titles = self.worksheet_titles().await?;
        match resolve_worksheet(&titles, aliases) {
            Some(title) => {
                let title = title.to_string();
                let table = self.fetch_values(&title).await?;
                Ok(Some((title, table)))
            }
            None => {
                warn!(
                    "worksheet not found: none of {:?} present in {:?}",
                    aliases, titles
                );
                Ok(None)
            }
        }
    }
}
