// Diagnostic: list the spreadsheet's worksheet titles and each table's
// headers, to see what the current revision of the sheet actually calls
// its columns.

use anyhow::Result;
use sheetdash::{
    auth::{self, SheetsAuth},
    config::DashConfig,
    fetch::SheetsClient,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let config = DashConfig::load(None)?;
    let key = auth::load_service_account(&config.credentials_path)?;
    let sheets_auth = SheetsAuth::resolve(key.as_ref(), config.api_key.as_deref())?;
    let client = SheetsClient::new(config.spreadsheet_id.clone(), sheets_auth)?;

    let titles = client.worksheet_titles().await?;
    info!("{} worksheets", titles.len());
    for title in &titles {
        println!("worksheet: {:?}", title);
        let table = client.fetch_values(title).await?;
        println!("  rows: {}", table.len());
        for header in &table.headers {
            println!("  column: {:?}", header);
        }
    }
    Ok(())
}
