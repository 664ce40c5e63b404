use notecrypt::{BlockCodec, Config, HybridCipher, Result};
use std::io::{self, Read};

/// Encrypt `text` (or stdin) and print it as a block or bare payload
pub fn encrypt(config: &Config, text: Option<String>, raw: bool) -> Result<()> {
    let plaintext = match text {
        Some(text) => text,
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            // Drop the newline `echo` and editors append
            if input.ends_with('\n') {
                input.pop();
                if input.ends_with('\r') {
                    input.pop();
                }
            }
            input
        }
    };

    let cipher = HybridCipher::from_config(config);
    if raw {
        println!("{}", cipher.encrypt(&plaintext)?);
    } else {
        println!("{}", BlockCodec::new(&cipher).encrypt_block(&plaintext)?);
    }

    Ok(())
}
