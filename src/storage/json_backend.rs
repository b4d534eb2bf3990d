use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{ledger::Snapshot, utils::paths};

use super::{Result, SnapshotStore};

const TMP_SUFFIX: &str = "tmp";
const CORRUPT_SUFFIX: &str = "corrupt";

/// Stores the ledger snapshot as a single pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default data file under the application directory.
    pub fn new_default() -> Self {
        Self::new(paths::data_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Moves an unreadable file out of the way so the next save cannot overwrite it.
    fn quarantine(&self) -> Option<PathBuf> {
        let target = sibling_path(&self.path, CORRUPT_SUFFIX);
        match fs::rename(&self.path, &target) {
            Ok(()) => Some(target),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "could not move malformed snapshot aside");
                None
            }
        }
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Snapshot {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no snapshot on disk, starting empty");
                return Snapshot::default();
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "snapshot unreadable, starting empty");
                return Snapshot::default();
            }
        };

        match Snapshot::from_json(&data) {
            Ok(snapshot) => {
                tracing::debug!(
                    path = %self.path.display(),
                    transactions = snapshot.transactions.len(),
                    budgets = snapshot.budgets.len(),
                    "snapshot loaded"
                );
                snapshot
            }
            Err(reason) => {
                let moved = self.quarantine();
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = ?moved,
                    %reason,
                    "malformed snapshot, starting empty"
                );
                Snapshot::default()
            }
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        let tmp = sibling_path(&self.path, TMP_SUFFIX);
        paths::write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Appends `suffix` to the file extension: `ledger.json` -> `ledger.json.tmp`.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, suffix),
        None => suffix.to_string(),
    };
    sibling.set_extension(ext);
    sibling
}
