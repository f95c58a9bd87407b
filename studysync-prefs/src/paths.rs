use directories::ProjectDirs;
use std::path::PathBuf;

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("com", "studysync", "StudySync") {
        pd.data_dir().to_path_buf()
    } else {
        // Fallback: current dir
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

pub fn default_prefs_file() -> PathBuf {
    data_root().join("preferences.json")
}

pub fn default_log_file() -> PathBuf {
    data_root().join("studysync.log")
}
