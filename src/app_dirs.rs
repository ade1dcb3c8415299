use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("arcade");
            Some(state_dir.join("records.db"))
        } else {
            ProjectDirs::from("", "", "arcade")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("records.db"))
        }
    }

    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", "arcade") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("arcade_config.json")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_lives_under_the_app_name() {
        if let Some(db) = AppDirs::db_path() {
            assert_eq!(db.file_name().unwrap(), "records.db");
            assert!(db.to_string_lossy().contains("arcade"));
        }
        assert!(AppDirs::config_path()
            .to_string_lossy()
            .ends_with("config.json"));
    }
}
