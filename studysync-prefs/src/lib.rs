use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use studysync_core::{PreferenceStore, StoreError, Theme};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

pub mod paths;

const FILE_VERSION: u32 = 1;

#[derive(Clone, Serialize, Deserialize)]
struct FileImage {
    version: u32,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    theme: Option<Theme>,
    #[serde(default)]
    session_cookie: Option<String>,
}

#[derive(Default, Clone)]
struct State {
    theme: Option<Theme>,
    session_cookie: Option<String>,
}

impl State {
    fn to_image(&self) -> FileImage {
        FileImage {
            version: FILE_VERSION,
            updated_at: Utc::now(),
            theme: self.theme,
            session_cookie: self.session_cookie.clone(),
        }
    }

    fn from_image(img: FileImage) -> Self {
        Self { theme: img.theme, session_cookie: img.session_cookie }
    }
}

/// Preferences kept in a small JSON file, rewritten atomically on every change.
pub struct JsonPrefs {
    path: PathBuf,
    state: RwLock<State>,
}

impl JsonPrefs {
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open_at(paths::default_prefs_file())
    }

    pub fn open_at(path: PathBuf) -> Result<Self, StoreError> {
        ensure_parent_dirs(&path)?;
        let state = load_or_init(&path)?;
        Ok(Self { path, state: RwLock::new(state) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session_cookie(&self) -> Option<String> {
        self.state.read().session_cookie.clone()
    }

    pub fn set_session_cookie(&self, cookie: Option<String>) -> Result<(), StoreError> {
        {
            let mut s = self.state.write();
            if s.session_cookie == cookie {
                return Ok(());
            }
            s.session_cookie = cookie;
        }
        self.save()
    }

    fn save(&self) -> Result<(), StoreError> {
        let snapshot = self.state.read().to_image();
        write_atomic(&self.path, &snapshot).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "writing preferences failed");
            StoreError::io("write preferences")(e)
        })
    }
}

impl PreferenceStore for JsonPrefs {
    fn theme(&self) -> Option<Theme> {
        self.state.read().theme
    }

    fn set_theme(&self, theme: Theme) -> Result<(), StoreError> {
        self.state.write().theme = Some(theme);
        self.save()
    }
}

fn ensure_parent_dirs(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(StoreError::io("create data dir"))?;
    }
    Ok(())
}

fn load_or_init(path: &Path) -> Result<State, StoreError> {
    if !path.exists() {
        let st = State::default();
        write_atomic(path, &st.to_image()).map_err(StoreError::io("init preferences"))?;
        return Ok(st);
    }
    let buf = fs::read_to_string(path).map_err(StoreError::io("read preferences"))?;
    match serde_json::from_str::<FileImage>(&buf) {
        Ok(img) => {
            debug!(path = %path.display(), version = img.version, "preferences loaded");
            Ok(State::from_image(img))
        }
        // An unreadable file is replaced on the next save rather than blocking startup.
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed preferences file");
            Ok(State::default())
        }
    }
}

fn write_atomic(path: &Path, img: &FileImage) -> Result<(), std::io::Error> {
    let json = serde_json::to_vec_pretty(img)?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
