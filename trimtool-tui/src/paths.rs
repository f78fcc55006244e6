//! Platform directories for the console's own files.
//!
//! XDG on Linux, the standard locations on macOS and Windows.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "trimtool";
const APPLICATION: &str = "trimtool";

/// Name of the active log file inside the cache directory.
pub const LATEST_LOG: &str = "latest.log";

/// Archived logs kept by [`rotate_logs`].
const MAX_OLD_LOGS: usize = 25;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Persistent data: `~/.local/share/trimtool` on Linux.
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Regenerable data and logs: `~/.cache/trimtool` on Linux.
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

pub fn settings_db() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("settings.db"))
}

pub fn log_file() -> Option<PathBuf> {
    cache_dir().map(|dir| dir.join(LATEST_LOG))
}

/// Archive the previous `latest.log` and prune old archives.
///
/// Call at startup, before the logger opens a fresh file.
pub fn rotate_logs() {
    if let Some(cache) = cache_dir() {
        rotate_logs_in(&cache);
    }
}

/// [`rotate_logs`] for an explicit directory.
pub fn rotate_logs_in(dir: &Path) {
    let latest = dir.join(LATEST_LOG);
    if latest.exists() {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let archived = dir.join(format!("{}.log", stamp));
        if let Err(e) = fs::rename(&latest, &archived) {
            eprintln!("could not archive {}: {}", latest.display(), e);
        }
    }
    prune_logs(dir, MAX_OLD_LOGS);
}

/// Keep only the `keep` most recently modified archived logs.
fn prune_logs(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else { return };

    let mut archived: Vec<_> = entries
        .filter_map(Result::ok)
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.ends_with(".log") && name != LATEST_LOG
        })
        .collect();

    if archived.len() <= keep {
        return;
    }

    // Oldest first; ties broken by name, which embeds the timestamp.
    archived.sort_by_key(|e| (e.metadata().and_then(|m| m.modified()).ok(), e.file_name()));
    for entry in archived.iter().take(archived.len() - keep) {
        let _ = fs::remove_file(entry.path());
    }
}
