use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::companion::selector::MoodBucket;

/// Result of loading the ASCII art portraits. When loading fails the display keeps working in
/// text-only mode and remembers why.
#[derive(Debug, Clone, PartialEq)]
pub enum PortraitSet {
    Ready(HashMap<MoodBucket, String>),
    DegradedFallback(String),
}

impl PortraitSet {
    /// Loads `<bucket>.txt` for every bucket from `dir`. A single missing or empty file puts
    /// the whole set into fallback mode.
    pub fn load(dir: &Path) -> Self {
        match load_all(dir) {
            Ok(portraits) => {
                info!("Loaded portraits from {}", dir.display());
                PortraitSet::Ready(portraits)
            }
            Err(e) => {
                warn!("Falling back to text-only display {e:?}");
                PortraitSet::DegradedFallback(format!("{e:#}"))
            }
        }
    }

    pub fn required_files() -> Vec<String> {
        MoodBucket::ALL.into_iter().map(file_name).collect()
    }
}

fn file_name(bucket: MoodBucket) -> String {
    format!("{}.txt", bucket.name())
}

fn load_all(dir: &Path) -> Result<HashMap<MoodBucket, String>> {
    let mut portraits = HashMap::new();
    for bucket in MoodBucket::ALL {
        let path = dir.join(file_name(bucket));
        let portrait = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if portrait.trim().is_empty() {
            bail!("{} is empty", path.display());
        }
        portraits.insert(bucket, portrait);
    }
    Ok(portraits)
}
