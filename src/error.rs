use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteCryptError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Key not found at {}\nGenerate keys with: notecrypt key generate", .0.display())]
    KeyNotFound(PathBuf),

    #[error(
        "Private key {} has unsafe permissions {mode:03o} (required: 600)\nFix with: chmod 600 {}",
        .path.display(),
        .path.display()
    )]
    UnsafeKeyPermissions { path: PathBuf, mode: u32 },

    #[error("Private key is passphrase-protected but no passphrase was provided")]
    PassphraseRequired,

    #[error("Wrong passphrase for private key")]
    WrongPassphrase,

    #[error("Key pair already exists in {}. Use --force to replace it (previously encrypted blocks will become unreadable)", .0.display())]
    KeysExist(PathBuf),

    #[error("Unsupported key size: {0} bits (supported: 2048, 3072, 4096)")]
    UnsupportedKeySize(usize),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Invalid encrypted payload: {0}")]
    InvalidPayloadFormat(String),

    #[error("Unsupported payload format: {0}")]
    UnsupportedPayloadVersion(String),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Scan failed: {0}")]
    ScanInternalError(String),

    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("Pre-commit hook already exists at {}. Use --force to overwrite", .0.display())]
    HookExists(PathBuf),

    #[error("Pre-commit hook at {} was not installed by notecrypt", .0.display())]
    ForeignHook(PathBuf),

    #[error("No pre-commit hook installed")]
    HookNotInstalled,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, NoteCryptError>;
