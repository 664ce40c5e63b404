use super::read_passphrase;
use notecrypt::gitignore::ensure_keys_in_gitignore;
use notecrypt::permissions::PermissionStatus;
use notecrypt::{Config, KeyStore, NoteCryptError, Result};

/// Generate and store a key pair
pub fn key_generate(config: &Config, bits: Option<usize>, with_passphrase: bool, force: bool) -> Result<()> {
    let keys = KeyStore::from_config(config);
    if keys.keys_exist() && !force {
        return Err(NoteCryptError::KeysExist(keys.keys_dir().to_path_buf()));
    }

    let passphrase = if with_passphrase {
        Some(read_passphrase("New private key passphrase", true)?)
    } else {
        None
    };

    let bits = bits.unwrap_or(config.key_bits);
    println!("Generating {bits}-bit RSA key pair...");
    let metadata = keys.generate_and_persist(bits, passphrase.as_deref().map(String::as_str), force)?;

    println!("Private key: {}", keys.private_key_path().display());
    println!("Public key:  {}", keys.public_key_path().display());
    println!("Fingerprint: {}", metadata.public_key_fingerprint);

    if ensure_keys_in_gitignore(&config.root)? {
        println!("Added private key entries to .gitignore");
    }

    if force {
        println!("\nWARNING: Blocks encrypted with the previous key can no longer be decrypted.");
    }
    println!("\nBack up {} somewhere safe. Losing it means losing every encrypted passage.", keys.private_key_path().display());

    Ok(())
}

/// Print key metadata
pub fn key_info(config: &Config) -> Result<()> {
    let keys = KeyStore::from_config(config);
    if !keys.keys_exist() {
        return Err(NoteCryptError::KeyNotFound(keys.private_key_path()));
    }

    println!("Keys directory: {}", keys.keys_dir().display());
    match keys.load_metadata() {
        Some(metadata) => {
            println!("Algorithm:      {}", metadata.algorithm);
            println!("Fingerprint:    {}", metadata.public_key_fingerprint);
            println!("Created:        {}", metadata.created_at.to_rfc3339());
            println!("Passphrase:     {}", if metadata.has_passphrase { "yes" } else { "no" });
            println!("Format version: {}", metadata.version);
        }
        None => {
            let public = keys.load_public()?;
            println!("Fingerprint:    {}", KeyStore::fingerprint(&public)?);
            println!("(metadata file missing or unreadable)");
        }
    }

    let access = keys.private_key_access();
    match access.check()? {
        PermissionStatus::Safe => println!("Private key permissions: ok"),
        PermissionStatus::Unsafe { mode } => println!(
            "Private key permissions: UNSAFE ({mode:03o}), fix with: chmod 600 {}",
            access.path().display()
        ),
        PermissionStatus::Unsupported => println!("Private key permissions: not verifiable on this platform"),
    }

    Ok(())
}
