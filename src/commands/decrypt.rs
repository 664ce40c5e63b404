use super::{read_passphrase, PASSPHRASE_ENV};
use notecrypt::block;
use notecrypt::{BlockCodec, Config, HybridCipher, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Print `file` (or stdin) with every block the local key opens decrypted
pub fn decrypt(config: &Config, file: Option<&Path>, ask_passphrase: bool) -> Result<()> {
    let document = match file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            input
        }
    };

    let cipher = HybridCipher::from_config(config);
    let has_blocks = block::contains_block(&document);

    // Only ask when there is something to open
    let key_is_protected = cipher
        .key_store()
        .load_metadata()
        .is_some_and(|m| m.has_passphrase);
    let passphrase = if has_blocks
        && (ask_passphrase || key_is_protected || std::env::var_os(PASSPHRASE_ENV).is_some())
    {
        Some(read_passphrase("Private key passphrase", false)?)
    } else {
        None
    };

    let opened = BlockCodec::new(&cipher)
        .decrypt_document(&document, passphrase.as_deref().map(String::as_str))?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(opened.as_bytes())?;
    stdout.flush()?;

    let remaining = block::extract_all(&opened).len();
    if remaining > 0 {
        eprintln!("Note: {remaining} block(s) could not be decrypted with this key and were left as-is");
    }

    Ok(())
}
