use notecrypt::gitignore::ensure_keys_in_gitignore;
use notecrypt::permissions::{self, OWNER_ONLY_DIR};
use notecrypt::{Config, KeyStore, Result};
use std::fs;

/// Prepare the notes root for encryption
pub fn init(config: &Config) -> Result<()> {
    println!("Initializing notecrypt in {}...", config.root.display());

    fs::create_dir_all(&config.keys_dir)?;
    permissions::set_mode(&config.keys_dir, OWNER_ONLY_DIR)?;
    println!("Keys directory: {}", config.keys_dir.display());

    if ensure_keys_in_gitignore(&config.root)? {
        println!("Added private key entries to .gitignore");
    } else {
        println!(".gitignore already protects private keys");
    }

    let keys = KeyStore::from_config(config);
    println!("\nInitialization complete!");
    println!("\nNext steps:");
    if keys.keys_exist() {
        println!("1. Key pair already present; see 'notecrypt key info'");
    } else {
        println!("1. Generate a key pair: notecrypt key generate");
    }
    println!("2. Install the pre-commit guard: notecrypt hook install");
    println!("3. Encrypt passages with 'notecrypt encrypt' and paste the block into your notes");

    Ok(())
}
