//! # Embedded Encrypted Blocks
//!
//! Documents mix plaintext with encrypted regions delimited by HTML comments,
//! so Markdown renderers hide the markers:
//!
//! ```text
//! <!-- ENCRYPTED:v1:RSA-AES256-GCM -->
//! v1:RSA-AES256-GCM:...
//! <!-- END ENCRYPTED -->
//! ```
//!
//! [`extract_all`], [`strip_all`] and [`wrap`] are pure text functions.
//! [`BlockCodec`] adds the cipher for creating and opening blocks.

use crate::crypto::{EncryptedPayload, HybridCipher, ALGORITHM, FORMAT_VERSION};
use crate::error::Result;
use regex::Regex;
use rsa::RsaPrivateKey;
use std::ops::Range;
use std::sync::LazyLock;

pub const BLOCK_OPEN_PREFIX: &str = "<!-- ENCRYPTED:";
pub const BLOCK_CLOSE: &str = "<!-- END ENCRYPTED -->";

// Open marker, one payload line, close marker. Payloads never span lines, so
// an unterminated open marker cannot reach forward to a later close.
static BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!-- ENCRYPTED:([^\r\n]*?) -->\r?\n([^\r\n]+)\r?\n<!-- END ENCRYPTED -->")
        .expect("block pattern is valid")
});

/// One block found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlock<'a> {
    /// Full block text, markers included
    pub text: &'a str,
    /// `version:algorithm` from the open marker
    pub tag: &'a str,
    /// Payload between the markers, trimmed
    pub payload: &'a str,
    /// Byte range of `text` within the document
    pub range: Range<usize>,
}

impl EncryptedBlock<'_> {
    /// Whether the payload parses as an [`EncryptedPayload`]. Anything else
    /// between markers is plain text wearing block markers.
    pub fn is_well_formed(&self) -> bool {
        self.payload.parse::<EncryptedPayload>().is_ok()
    }

    /// 1-based line of the open marker within `document`
    pub fn line_in(&self, document: &str) -> usize {
        document[..self.range.start].matches('\n').count() + 1
    }
}

/// The open marker for the current format
pub fn open_marker() -> String {
    format!("{BLOCK_OPEN_PREFIX}{FORMAT_VERSION}:{ALGORITHM} -->")
}

/// Wrap a payload string between the block markers
pub fn wrap(payload: &str) -> String {
    format!("{}\n{payload}\n{BLOCK_CLOSE}", open_marker())
}

/// Every block in document order
pub fn extract_all(document: &str) -> Vec<EncryptedBlock<'_>> {
    BLOCK_REGEX
        .captures_iter(document)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(EncryptedBlock {
                text: whole.as_str(),
                tag: caps.get(1)?.as_str(),
                payload: caps.get(2)?.as_str().trim(),
                range: whole.range(),
            })
        })
        .collect()
}

/// Whether the document holds at least one well-formed block
pub fn contains_block(document: &str) -> bool {
    extract_all(document).iter().any(EncryptedBlock::is_well_formed)
}

/// Blocks whose payload does not parse, in document order
pub fn malformed_blocks(document: &str) -> Vec<EncryptedBlock<'_>> {
    extract_all(document)
        .into_iter()
        .filter(|block| !block.is_well_formed())
        .collect()
}

/// Remove every well-formed block without decrypting.
///
/// Each block is replaced by as many newlines as it spanned, so line numbers
/// in the remaining text still match the original document. Malformed blocks
/// are kept verbatim and stay visible to the scanner.
pub fn strip_all(document: &str) -> String {
    BLOCK_REGEX
        .replace_all(document, |caps: &regex::Captures<'_>| {
            if caps[2].trim().parse::<EncryptedPayload>().is_ok() {
                "\n".repeat(caps[0].matches('\n').count())
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Creates and opens blocks with a [`HybridCipher`]
#[derive(Debug, Clone, Copy)]
pub struct BlockCodec<'a> {
    cipher: &'a HybridCipher,
}

impl<'a> BlockCodec<'a> {
    pub fn new(cipher: &'a HybridCipher) -> Self {
        Self { cipher }
    }

    /// Encrypt `plaintext` and wrap it as a block
    pub fn encrypt_block(&self, plaintext: &str) -> Result<String> {
        let payload = self.cipher.encrypt(plaintext)?;
        Ok(wrap(&payload.to_string()))
    }

    /// Replace every block that decrypts with its plaintext.
    ///
    /// Blocks that fail to parse or decrypt stay exactly as they were. Failing
    /// to load the private key aborts the whole call; a document without
    /// well-formed blocks never touches the key.
    pub fn decrypt_document(&self, document: &str, passphrase: Option<&str>) -> Result<String> {
        let blocks = extract_all(document);
        if !blocks.iter().any(EncryptedBlock::is_well_formed) {
            return Ok(document.to_string());
        }

        let private = self.cipher.key_store().load_private(passphrase)?;
        Ok(Self::decrypt_blocks(document, &blocks, &private))
    }

    fn decrypt_blocks(document: &str, blocks: &[EncryptedBlock<'_>], private: &RsaPrivateKey) -> String {
        let mut out = String::with_capacity(document.len());
        let mut cursor = 0;
        let mut opened = 0;

        for block in blocks {
            out.push_str(&document[cursor..block.range.start]);
            let decrypted = block
                .payload
                .parse::<EncryptedPayload>()
                .and_then(|payload| HybridCipher::decrypt_with(private, &payload));

            match decrypted {
                Ok(plaintext) => {
                    out.push_str(&plaintext);
                    opened += 1;
                }
                Err(e) => {
                    tracing::debug!(offset = block.range.start, error = %e, "leaving block encrypted");
                    out.push_str(block.text);
                }
            }
            cursor = block.range.end;
        }
        out.push_str(&document[cursor..]);

        tracing::debug!(total = blocks.len(), opened, "decrypted document");
        out
    }
}
