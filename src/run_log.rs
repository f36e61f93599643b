use std::fs::OpenOptions;
use std::io::{Read as _, Seek as _, SeekFrom, Write as _};
use std::path::Path;

use anyhow::Context as _;
use chrono::{DateTime, TimeZone};
use tracing::info;

const BANNER_WIDTH: usize = 110;

/// Free-text record of one run, written to the top of `log.txt` at exit
#[derive(Debug, Default, Clone)]
pub struct RunLog {
    text: String,
}

impl RunLog {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            text: header.into(),
        }
    }

    /// Append a line and echo it to the tracing output
    pub fn record(&mut self, line: impl AsRef<str>) {
        let line = line.as_ref();
        info!("{}", line);
        self.text.push_str(line);
        self.text.push('\n');
    }

    /// Append text verbatim
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// `####...` line followed by `Results from DD-MM-YYYY at HH:MM:SS AM:`
pub fn run_banner<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}\nResults from {}:\n\n",
        "#".repeat(BANNER_WIDTH),
        now.format("%d-%m-%Y at %I:%M:%S %p")
    )
}

/// Put `text` above whatever the file already holds, creating it if needed
pub fn prepend_to_file(path: &Path, text: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("open log file: {}", path.display()))?;

    let mut previous = String::new();
    file.read_to_string(&mut previous)
        .with_context(|| format!("read log file: {}", path.display()))?;

    let mut contents = String::with_capacity(text.len() + previous.len() + 3);
    contents.push_str(text.trim_end_matches(['\r', '\n']));
    contents.push_str("\n\n\n");
    contents.push_str(&previous);

    file.seek(SeekFrom::Start(0))
        .with_context(|| format!("rewind log file: {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("write log file: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("flush log file: {}", path.display()))?;

    Ok(())
}
