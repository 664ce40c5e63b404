//! # notecrypt
//!
//! Keeps sensitive passages of plain-text notes encrypted at rest, and keeps
//! them from reaching git history unencrypted.
//!
//! ## Features
//!
//! - **Hybrid Encryption**: RSA-OAEP (SHA-256) wraps a fresh AES-256-GCM key per message
//! - **Embedded Blocks**: Encrypted passages live inside ordinary Markdown as comment-delimited blocks
//! - **Partial Decryption**: Blocks you can't open are left as they are, the rest of the note still reads
//! - **Key Custody**: Private key written owner-only, re-checked before every read, optional passphrase
//! - **Leak Scanner**: Regex rule tables catch credentials and sensitive markers before commit
//! - **Pre-commit Gate**: Blocks commits with findings, never blocks on its own failures
//!
//! ## Quick Start
//!
//! ```bash
//! # Inside your notes repository
//! notecrypt init
//! notecrypt key generate
//! notecrypt hook install
//!
//! # Encrypt a passage and paste the block into a note
//! echo "account: 12345678" | notecrypt encrypt >> data/notes/bank.md
//!
//! # Read a note with its blocks opened
//! notecrypt decrypt data/notes/bank.md
//! ```
//!
//! ## How It Works
//!
//! ### Encryption
//!
//! ```text
//! plaintext → AES-256-GCM (fresh key + nonce) → ciphertext
//!             AES key → RSA-OAEP-SHA256 (public key) → wrapped key
//!             v1:RSA-AES256-GCM:<wrapped key>:<nonce>:<ciphertext>
//! ```
//!
//! Every field is standard base64. The version and algorithm tags are matched
//! literally; anything else is rejected before any key is loaded.
//!
//! ### Embedded Block Format
//!
//! ```text
//! <!-- ENCRYPTED:v1:RSA-AES256-GCM -->
//! v1:RSA-AES256-GCM:...
//! <!-- END ENCRYPTED -->
//! ```
//!
//! ### Commit Validation
//!
//! ```text
//! git commit → pre-commit hook → notecrypt hook check
//!   → staged files → strip encrypted blocks → rule tables → allow / block
//! ```
//!
//! Files declaring `is_sensitive: true` (or `sensitive`, `encrypted`,
//! `is_encrypted`) in their header must contain at least one block.
//!
//! ## Key Files
//!
//! | File | Mode | Content |
//! |---|---|---|
//! | `keys/private_key.pem` | 600 | PKCS#8 PEM, optionally passphrase-encrypted |
//! | `keys/public_key.pem` | 644 | SPKI PEM |
//! | `keys/.key_metadata.json` | default | creation time, algorithm, fingerprint, passphrase flag |
//!
//! Rotating keys (`notecrypt key generate --force`) does not re-encrypt
//! existing blocks. Blocks sealed for the old key stay unreadable.
//!
//! ## Module Overview
//!
//! - [`key`] - Key pair generation, persistence and loading
//! - [`permissions`] - Access-control descriptor for the private key file
//! - [`crypto`] - Hybrid encryption and the payload wire format
//! - [`block`] - Embedding payloads in documents
//! - [`rules`] - Leak detection rule tables
//! - [`frontmatter`] - Document header parsing
//! - [`scanner`] - Leak scanner over a set of files
//! - [`report`] - Validation findings and rendering
//! - [`gate`] - Pre-commit verdict with fail-open handling
//! - [`git`] - Repository discovery, staged file listing and staged content
//! - [`hook`] - Pre-commit hook install/uninstall
//! - [`gitignore`] - Private key ignore entries
//! - [`config`] - Explicit configuration
//! - [`error`] - Error types and unified error handling
//!
//! ## Security Considerations
//!
//! **Protected against:**
//! - Sensitive passages readable in the repository or its history
//! - Accidentally committing credentials, `.env` files or the private key
//! - Tampered ciphertext being accepted
//!
//! **Not protected against:**
//! - Plaintext left in the working directory by `notecrypt decrypt`
//! - A compromised local account (the private key is on the same disk)
//! - Commits made with `git commit --no-verify`

pub mod block;
pub mod config;
pub mod crypto;
pub mod error;
pub mod frontmatter;
pub mod gate;
pub mod git;
pub mod gitignore;
pub mod hook;
pub mod key;
pub mod permissions;
pub mod report;
pub mod rules;
pub mod scanner;

// Re-export commonly used types
pub use block::BlockCodec;
pub use config::Config;
pub use crypto::{EncryptedPayload, HybridCipher};
pub use error::{NoteCryptError, Result};
pub use gate::{CommitGate, Verdict};
pub use git::{GitRepo, StagedFiles};
pub use key::{KeyMetadata, KeyStore};
pub use report::{Severity, ValidationIssue, ValidationResult};
pub use scanner::LeakScanner;
