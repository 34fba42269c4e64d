use super::folder::OutputFolder;
use super::used::UsedBarcodes;
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// File name of the persisted session log inside the output folder
pub const LOG_FILE_NAME: &str = "session.log";

static BARCODE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)barcode=(\S+)").unwrap());

/// One persisted session event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Reserved { barcode: String },
    Start { barcode: String },
    Stop { barcode: String },
    Saved { barcode: String, file: String },
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEvent::Reserved { barcode } => write!(f, "RESERVED barcode={}", barcode),
            LogEvent::Start { barcode } => write!(f, "START barcode={}", barcode),
            LogEvent::Stop { barcode } => write!(f, "STOP barcode={}", barcode),
            LogEvent::Saved { barcode, file } => {
                write!(f, "SAVED barcode={} file={}", barcode, file)
            }
        }
    }
}

/// Render an event as a log line: `[<ISO-8601>] <EVENT> barcode=<code>...`
pub fn format_line(at: DateTime<Utc>, event: &LogEvent) -> String {
    format!("[{}] {}", at.to_rfc3339_opts(SecondsFormat::Millis, true), event)
}

/// Collect every `barcode=<token>` in the text, deduplicated in first-seen order.
///
/// Blank lines and unrelated content are ignored. The key is matched
/// case-insensitively; the token itself is kept verbatim.
pub fn extract_barcodes(text: &str) -> UsedBarcodes {
    text.lines()
        .flat_map(|line| BARCODE_TOKEN.captures_iter(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Read the folder's session log (creating it when absent) and rebuild the used set.
pub async fn load(folder: &OutputFolder) -> Result<UsedBarcodes> {
    let text = folder.read_text_or_create(LOG_FILE_NAME).await?;
    let used = extract_barcodes(&text);
    tracing::info!(
        "Loaded {} used barcode(s) from {:?}",
        used.len(),
        folder.file_path(LOG_FILE_NAME)
    );
    Ok(used)
}

/// Append one line to the session log.
///
/// This is a read-modify-write of the whole file. Two appends racing on the
/// same file can drop a line; callers must issue them one at a time.
pub async fn append(folder: &OutputFolder, line: &str) -> Result<()> {
    let current = folder.read_text_or_create(LOG_FILE_NAME).await?;

    let updated = if current.is_empty() {
        line.to_string()
    } else {
        format!("{}\n{}", current, line)
    };

    folder.write(LOG_FILE_NAME, updated.as_bytes()).await?;
    Ok(())
}
