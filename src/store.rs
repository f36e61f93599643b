use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::debug;

/// Listing ids already notified on, one `<city>.txt` file per city.
///
/// Files only ever grow. Running two processes against the same city at once
/// is not supported.
#[derive(Debug, Clone)]
pub struct SeenIdStore {
    dir: PathBuf,
}

impl SeenIdStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, city: &str) -> PathBuf {
        self.dir.join(format!("{city}.txt"))
    }

    /// Create the city's empty file if missing. Returns whether it was created.
    pub fn ensure(&self, city: &str) -> anyhow::Result<bool> {
        let path = self.path_for(city);
        if path.exists() {
            return Ok(false);
        }

        debug!("Creating ID file {}", path.display());
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create data dir: {}", self.dir.display()))?;
        OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&path)
            .with_context(|| format!("create id file: {}", path.display()))?;

        Ok(true)
    }

    /// Read every id recorded for `city`, creating an empty file on first use
    pub fn load(&self, city: &str) -> anyhow::Result<HashSet<u64>> {
        self.ensure(city)?;

        let path = self.path_for(city);
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("read id file: {}", path.display()))?;
        parse_ids(&contents, &path)
    }

    /// Append `ids` to the city's file, leaving existing lines untouched
    pub fn append(&self, city: &str, ids: &[u64]) -> anyhow::Result<()> {
        let path = self.path_for(city);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open id file for append: {}", path.display()))?;

        let mut buf = String::new();
        for id in ids {
            buf.push_str(&id.to_string());
            buf.push('\n');
        }
        file.write_all(buf.as_bytes())
            .with_context(|| format!("append ids: {}", path.display()))?;
        file.flush()
            .with_context(|| format!("flush id file: {}", path.display()))?;

        Ok(())
    }
}

fn parse_ids(contents: &str, path: &Path) -> anyhow::Result<HashSet<u64>> {
    contents
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| {
            line.parse::<u64>().with_context(|| {
                format!("invalid id {line:?} at {}:{}", path.display(), idx + 1)
            })
        })
        .collect()
}
