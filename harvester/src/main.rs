use anyhow::{ensure, Context, Result};
use clap::Parser;
use reqwest::Client;
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::macros::format_description;
use time::OffsetDateTime;
use tokio::time::sleep;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

const START_MARKER: &str = "*** START OF THE PROJECT GUTENBERG EBOOK";
const END_MARKER: &str = "*** END OF THE PROJECT GUTENBERG EBOOK";

const TO_DOWNLOAD_FILE: &str = "ids_to_download.txt";
const DOWNLOADED_FILE: &str = "downloaded_books.txt";
const FAILED_FILE: &str = "failed_downloads.txt";

const USER_AGENT: &str = "gutensearch-harvester/0.1 (+https://www.gutenberg.org/policy/robot_access.html)";

#[derive(Parser, Debug)]
#[command(name = "gutensearch-harvester")]
#[command(about = "Fetch Project Gutenberg plain-text books into the datalake")]
struct Cli {
    /// First book id (inclusive) for the generated download list
    #[arg(long, default_value_t = 1)]
    start: u32,
    /// Last book id (inclusive)
    #[arg(long, default_value_t = 10)]
    end: u32,
    /// Mirror to fetch from
    #[arg(long, default_value = "https://www.gutenberg.org")]
    base_url: Url,
    /// Root of the datalake to write into
    #[arg(long, default_value = "datalake")]
    datalake: PathBuf,
    /// Directory for download control files
    #[arg(long, default_value = "control")]
    control: PathBuf,
    /// Retries per book after the first attempt
    #[arg(long, default_value_t = 2)]
    retries: u32,
    /// Politeness delay between requests, milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,
    /// Request timeout seconds
    #[arg(long, default_value_t = 20)]
    timeout_secs: u64,
    /// Only (re)generate the download list and exit
    #[arg(long, default_value_t = false)]
    generate_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    ensure!(cli.start <= cli.end, "start must be <= end");

    fs::create_dir_all(&cli.control)?;
    let to_path = cli.control.join(TO_DOWNLOAD_FILE);
    let downloaded_path = cli.control.join(DOWNLOADED_FILE);
    let failed_path = cli.control.join(FAILED_FILE);

    let ids: Vec<String> = (cli.start..=cli.end).map(|id| id.to_string()).collect();
    fs::write(&to_path, ids.join("\n") + "\n")?;
    for path in [&downloaded_path, &failed_path] {
        if !path.exists() {
            fs::write(path, "")?;
        }
    }
    tracing::info!(queued = ids.len(), path = %to_path.display(), "download list written");
    if cli.generate_only {
        return Ok(());
    }

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(cli.timeout_secs))
        .build()?;

    let queue: Vec<String> = fs::read_to_string(&to_path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    let downloaded = read_id_set(&downloaded_path)?;
    let failed = read_id_set(&failed_path)?;
    tracing::info!(
        total = queue.len(),
        already_downloaded = downloaded.len(),
        previously_failed = failed.len(),
        "starting harvest"
    );

    let out_dir = hour_dir(&cli.datalake)?;
    let mut harvested = 0usize;
    let mut failures = 0usize;
    for sid in queue {
        if downloaded.contains(&sid) || failed.contains(&sid) {
            continue;
        }
        let Ok(id) = sid.parse::<u32>() else {
            tracing::warn!(id = %sid, "invalid id in download list, marking failed");
            append_line(&failed_path, &sid)?;
            continue;
        };

        let mut ok = false;
        for attempt in 0..=cli.retries {
            match harvest_one(&client, &cli.base_url, id, &out_dir).await {
                Ok(()) => {
                    append_line(&downloaded_path, &sid)?;
                    tracing::info!(id, "book harvested");
                    ok = true;
                    break;
                }
                Err(err) => {
                    tracing::warn!(id, attempt = attempt + 1, error = %err, "harvest attempt failed");
                    if attempt < cli.retries {
                        sleep(Duration::from_millis(cli.delay_ms * u64::from(attempt + 1))).await;
                    }
                }
            }
        }
        if ok {
            harvested += 1;
        } else {
            append_line(&failed_path, &sid)?;
            tracing::error!(id, "all attempts failed, marked in failed list");
            failures += 1;
        }

        // polite pause between books
        sleep(Duration::from_millis(cli.delay_ms)).await;
    }

    tracing::info!(harvested, failures, datalake = %out_dir.display(), "harvest finished");
    Ok(())
}

async fn harvest_one(client: &Client, base: &Url, id: u32, out_dir: &Path) -> Result<()> {
    let url = base.join(&format!("cache/epub/{id}/pg{id}.txt"))?;
    let response = client.get(url).send().await?.error_for_status()?;
    let text = response.text().await?;

    let (header, body) =
        split_markers(&text).with_context(|| format!("licence markers missing in book {id}"))?;
    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join(format!("{id}_body.txt")), body)?;
    fs::write(out_dir.join(format!("{id}_header.txt")), header)?;
    Ok(())
}

/// Split raw Gutenberg text at the licence markers into trimmed
/// `(header, body)`; `None` when either marker is missing.
fn split_markers(text: &str) -> Option<(&str, &str)> {
    let start = text.find(START_MARKER)?;
    let after_start = start + START_MARKER.len();
    let end_rel = text[after_start..].find(END_MARKER)?;
    let header = text[..start].trim();
    let body = text[after_start..after_start + end_rel].trim();
    Some((header, body))
}

/// Harvested files land under `<datalake>/<YYYYMMDD>/<HH>/`.
fn hour_dir(datalake: &Path) -> Result<PathBuf> {
    let now = OffsetDateTime::now_utc();
    let date = now.format(format_description!("[year][month][day]"))?;
    let hour = now.format(format_description!("[hour]"))?;
    Ok(datalake.join(date).join(hour))
}

fn read_id_set(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}
