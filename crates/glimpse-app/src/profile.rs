use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use glimpse_config::Config;
use glimpse_types::WindowPosition;
use serde::{Deserialize, Serialize};

/// Layout of `<config dir>/glimpse`
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    root: PathBuf,
}

impl ConfigPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform config directory, e.g. `~/Library/Application Support/glimpse`
    pub fn system() -> anyhow::Result<Self> {
        let base = dirs::config_dir().context("No config directory on this platform")?;
        Ok(Self::new(base.join("glimpse")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    pub fn profile_file(&self, name: &str) -> PathBuf {
        self.profiles_dir().join(format!("{name}.json"))
    }

    pub fn window_file(&self) -> PathBuf {
        self.root.join("window.json")
    }
}

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

fn read_profile(path: &Path) -> anyhow::Result<Config> {
    let data =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let profile: Profile = serde_json::from_str(&data)
        .with_context(|| format!("Malformed profile {}", path.display()))?;
    Ok(profile.value)
}

/// Create the profile folder and a `main` profile from defaults if missing
pub fn init_user_config(paths: &ConfigPaths) -> anyhow::Result<()> {
    fs::create_dir_all(paths.profiles_dir())?;

    let main_profile = paths.profile_file("main");
    if !main_profile.exists() {
        let profile = Profile {
            name: "main".into(),
            value: Config::default(),
        };
        fs::write(&main_profile, serde_json::to_string_pretty(&profile)?)?;
        tracing::info!("Created main profile at {}", main_profile.display());
    }

    Ok(())
}

/// Load a user profile by name, defaulting to main if name not found
pub fn load_user_profile(paths: &ConfigPaths, name: &str) -> anyhow::Result<Config> {
    let profile_file = paths.profile_file(name);
    if profile_file.exists() {
        return read_profile(&profile_file);
    }

    tracing::warn!("Profile {name} not found, falling back to main profile or defaults");
    let main_file = paths.profile_file("main");
    if main_file.exists() {
        read_profile(&main_file)
    } else {
        Ok(Config::default())
    }
}

/// Last saved window position; unreadable state counts as none
pub fn load_window_position(paths: &ConfigPaths) -> Option<WindowPosition> {
    let data = fs::read_to_string(paths.window_file()).ok()?;
    match serde_json::from_str(&data) {
        Ok(pos) => Some(pos),
        Err(e) => {
            tracing::warn!("Ignoring malformed window state: {}", e);
            None
        }
    }
}

pub fn save_window_position(paths: &ConfigPaths, pos: WindowPosition) -> anyhow::Result<()> {
    fs::create_dir_all(paths.root())?;
    let file = paths.window_file();
    fs::write(&file, serde_json::to_string(&pos)?)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    Ok(())
}
