pub mod decrypt;
pub mod encrypt;
pub mod hook;
pub mod init;
pub mod key;
pub mod scan;

pub use decrypt::decrypt;
pub use encrypt::encrypt;
pub use hook::{hook_check, hook_install, hook_uninstall};
pub use init::init;
pub use key::{key_generate, key_info};
pub use scan::scan;

use notecrypt::{NoteCryptError, Result};
use rpassword::prompt_password;
use std::env;
use zeroize::Zeroizing;

/// Read instead of prompting when set
pub const PASSPHRASE_ENV: &str = "NOTECRYPT_PASSPHRASE";

/// Passphrase from `NOTECRYPT_PASSPHRASE`, or from the terminal.
///
/// With `confirm`, a prompted passphrase must be typed twice.
pub fn read_passphrase(prompt: &str, confirm: bool) -> Result<Zeroizing<String>> {
    if let Ok(value) = env::var(PASSPHRASE_ENV) {
        return non_empty(Zeroizing::new(value));
    }

    let first = Zeroizing::new(prompt_password(format!("{prompt}: "))?);
    if confirm {
        let second = Zeroizing::new(prompt_password("Confirm passphrase: ")?);
        if *first != *second {
            return Err(NoteCryptError::Other("Passphrases do not match".into()));
        }
    }
    non_empty(first)
}

fn non_empty(passphrase: Zeroizing<String>) -> Result<Zeroizing<String>> {
    if passphrase.is_empty() {
        return Err(NoteCryptError::Other("Passphrase cannot be empty".into()));
    }
    Ok(passphrase)
}
