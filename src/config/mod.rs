use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".rollbook";
const BOOK_FILE: &str = "book.json";

/// Returns the application data directory, defaulting to `~/.rollbook`.
/// `ROLLBOOK_HOME` overrides the location.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("ROLLBOOK_HOME") {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Canonical path of the persisted book document.
pub fn book_file() -> PathBuf {
    app_data_dir().join(BOOK_FILE)
}
