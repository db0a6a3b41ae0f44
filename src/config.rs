use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Dosetrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Blob store key holding the medication array.
pub const MEDICATIONS_KEY: &str = "medications";

/// Blob store key holding the adherence records.
pub const ADHERENCE_KEY: &str = "adherence";

/// Get the application data directory
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}

/// Default path of the SQLite-backed blob store
pub fn store_path() -> PathBuf {
    app_data_dir().join("store.db")
}

/// Default tracing filter when RUST_LOG is unset
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_under_home() {
        let dir = app_data_dir();
        let home = dirs::home_dir().unwrap();
        assert!(dir.starts_with(home));
        assert!(dir.ends_with("Dosetrack"));
    }

    #[test]
    fn store_path_under_app_data() {
        let path = store_path();
        assert!(path.starts_with(app_data_dir()));
        assert!(path.ends_with("store.db"));
    }

    #[test]
    fn storage_keys_are_distinct() {
        assert_ne!(MEDICATIONS_KEY, ADHERENCE_KEY);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_filter_scopes_to_crate() {
        assert_eq!(default_log_filter(), "dosetrack=info");
    }
}
