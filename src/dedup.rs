//! Single-slot memory of the last successfully published article link.
//!
//! The guard only prevents re-posting the immediately previous article across
//! consecutive runs; it is deliberately not a processed-set. The slot is
//! updated only after a sink reports success, so a failed publish leaves the
//! article eligible for the next run.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct DedupState {
    last_processed_link: Option<String>,
}

pub struct DedupGuard {
    path: PathBuf,
    state: DedupState,
}

impl DedupGuard {
    /// Load the slot from disk. A missing or unreadable file is an empty
    /// slot, not an error: the worst case is one repeated post.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "State file unreadable; starting with an empty slot");
                DedupState::default()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => DedupState::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read state file; starting with an empty slot");
                DedupState::default()
            }
        };
        Self { path, state }
    }

    /// True when no prior state exists or the slot holds a different link.
    pub fn is_new(&self, link: &str) -> bool {
        self.state.last_processed_link.as_deref() != Some(link)
    }

    /// Replace the slot with `link` and persist it. Write goes through a
    /// temp file plus rename so a crash never leaves a half-written slot.
    pub fn mark_processed(&mut self, link: &str) -> io::Result<()> {
        self.state.last_processed_link = Some(link.to_string());
        let json = serde_json::to_string(&self.state).map_err(io::Error::other)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        info!(%link, "Recorded last processed link");
        Ok(())
    }

    pub fn last_processed_link(&self) -> Option<&str> {
        self.state.last_processed_link.as_deref()
    }
}
