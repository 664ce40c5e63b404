//! # Configuration
//!
//! An explicit [`Config`] value is built once per process and handed to
//! [`KeyStore`](crate::key::KeyStore), [`HybridCipher`](crate::crypto::HybridCipher),
//! [`LeakScanner`](crate::scanner::LeakScanner) and
//! [`CommitGate`](crate::gate::CommitGate). Nothing reads configuration from a
//! global.
//!
//! ## Resolution
//!
//! The content root is resolved in this order:
//!
//! 1. An explicit path (the `--root` flag)
//! 2. The `NOTECRYPT_DIR` environment variable
//! 3. `~/.second-brain`, if that directory exists
//! 4. The current directory
//!
//! Every other field starts from its default, is overridden by
//! `<root>/notecrypt.toml` when present, and then by `NOTECRYPT_KEYS_DIR` /
//! `NOTECRYPT_KEY_BITS`.
//!
//! ```toml
//! keys_dir = "keys"
//! key_bits = 4096
//! content_areas = ["data/notes/", "data/work_logs/", "data/projects/"]
//! placeholder_markers = ["example", "your_", "changeme"]
//! ```

use crate::error::{NoteCryptError, Result};
use config::{Config as ConfigLoader, File, FileFormat};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "notecrypt.toml";
pub const ENV_PREFIX: &str = "NOTECRYPT_";
pub const GLOBAL_DIR_NAME: &str = ".second-brain";
pub const DEFAULT_KEY_BITS: usize = 4096;

const DEFAULT_CONTENT_AREAS: &[&str] = &["data/notes/", "data/work_logs/", "data/projects/"];
const DEFAULT_CONFIG_FILES: &[&str] = &["config.json"];
const DEFAULT_SCAN_EXTENSIONS: &[&str] = &[
    ".md", ".txt", ".json", ".yaml", ".yml", ".toml", ".ini", ".conf", ".config",
];
const DEFAULT_PLACEHOLDER_MARKERS: &[&str] = &["example", "your_"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Content root; staged paths are resolved against it
    pub root: PathBuf,
    /// Directory holding the key pair and its metadata
    pub keys_dir: PathBuf,
    /// RSA modulus size used by `key generate`
    pub key_bits: usize,
    /// Path prefixes (relative to root) whose files are scanned
    pub content_areas: Vec<String>,
    /// Top-level files that are always scanned
    pub config_files: Vec<String>,
    /// Extensions of text formats the scanner opens
    pub scan_extensions: Vec<String>,
    /// Lines containing any of these (case-insensitive) are never flagged
    pub placeholder_markers: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    keys_dir: Option<PathBuf>,
    key_bits: Option<usize>,
    content_areas: Option<Vec<String>>,
    config_files: Option<Vec<String>>,
    scan_extensions: Option<Vec<String>>,
    placeholder_markers: Option<Vec<String>>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Defaults for the given root, without consulting files or environment
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            keys_dir: root.join("keys"),
            root,
            key_bits: DEFAULT_KEY_BITS,
            content_areas: owned(DEFAULT_CONTENT_AREAS),
            config_files: owned(DEFAULT_CONFIG_FILES),
            scan_extensions: owned(DEFAULT_SCAN_EXTENSIONS),
            placeholder_markers: owned(DEFAULT_PLACEHOLDER_MARKERS),
        }
    }

    /// Resolve the root, then apply `notecrypt.toml` and environment overrides
    pub fn load(explicit_root: Option<&Path>) -> Result<Self> {
        let root = Self::resolve_root(explicit_root);
        let mut cfg = Self::with_root(&root);

        if let Some(file) = load_file(&root)? {
            cfg.apply_file(file);
        }
        cfg.apply_env()?;

        tracing::debug!(root = %cfg.root.display(), keys_dir = %cfg.keys_dir.display(), "configuration loaded");
        Ok(cfg)
    }

    /// Pick the content root without reading any configuration files
    pub fn resolve_root(explicit_root: Option<&Path>) -> PathBuf {
        if let Some(root) = explicit_root {
            return root.to_path_buf();
        }

        if let Ok(dir) = env::var(format!("{ENV_PREFIX}DIR")) {
            if !dir.trim().is_empty() {
                return PathBuf::from(dir);
            }
        }

        if let Some(global) = dirs::home_dir().map(|home| home.join(GLOBAL_DIR_NAME)) {
            if global.is_dir() {
                return global;
            }
        }

        env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    /// Whether `root` looks like a notes repository this tool manages
    pub fn is_managed_root(&self) -> bool {
        self.root.join("data").is_dir()
            || self.root.join(CONFIG_FILE).is_file()
            || self
                .config_files
                .iter()
                .any(|name| self.root.join(name).is_file())
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(keys_dir) = file.keys_dir {
            self.keys_dir = self.root.join(keys_dir);
        }
        if let Some(bits) = file.key_bits {
            self.key_bits = bits;
        }
        if let Some(areas) = file.content_areas {
            self.content_areas = areas;
        }
        if let Some(files) = file.config_files {
            self.config_files = files;
        }
        if let Some(exts) = file.scan_extensions {
            self.scan_extensions = exts;
        }
        if let Some(markers) = file.placeholder_markers {
            self.placeholder_markers = markers;
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(keys_dir) = env::var(format!("{ENV_PREFIX}KEYS_DIR")) {
            if !keys_dir.trim().is_empty() {
                self.keys_dir = self.root.join(keys_dir);
            }
        }

        if let Ok(bits) = env::var(format!("{ENV_PREFIX}KEY_BITS")) {
            self.key_bits = bits.trim().parse().map_err(|_| {
                NoteCryptError::Config(format!("{ENV_PREFIX}KEY_BITS is not a number: {bits}"))
            })?;
        }

        Ok(())
    }
}

fn load_file(root: &Path) -> Result<Option<FileConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let path_str = path
        .to_str()
        .ok_or_else(|| NoteCryptError::Config("Invalid config path".into()))?;

    let file = ConfigLoader::builder()
        .add_source(File::new(path_str, FileFormat::Toml))
        .build()
        .and_then(|built| built.try_deserialize::<FileConfig>())
        .map_err(|err| NoteCryptError::Config(format!("Failed to load {CONFIG_FILE}: {err}")))?;

    Ok(Some(file))
}
