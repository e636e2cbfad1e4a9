//! JSON timetable file.
//!
//! A flat list of blocks on disk. The CLI uses it as the source of truth
//! for a user's timetable and appends accepted breaks to it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::interval::ActivityBlock;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    #[serde(default)]
    pub blocks: Vec<ActivityBlock>,
}

impl Timetable {
    /// Read a timetable; a missing file is an empty timetable.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "timetable not found, starting empty");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
