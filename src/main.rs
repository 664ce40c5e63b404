mod commands;

use clap::{Parser, Subcommand};
use notecrypt::{Config, Result};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "notecrypt")]
#[command(version)]
#[command(about = "Encrypted passages in plain-text notes, with a pre-commit leak guard", long_about = None)]
struct Cli {
    /// Notes root (default: $NOTECRYPT_DIR, ~/.second-brain, or the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Diagnostic log level written to stderr (RUST_LOG also applies)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the keys directory and .gitignore entries
    Init,

    /// Manage the key pair
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Encrypt text (argument or stdin) into an embeddable block
    Encrypt {
        /// Text to encrypt; read from stdin when omitted
        text: Option<String>,

        /// Print the bare payload instead of a wrapped block
        #[arg(long)]
        raw: bool,
    },

    /// Print a document with every block you can open decrypted
    Decrypt {
        /// Document to decrypt; read from stdin when omitted
        file: Option<PathBuf>,

        /// Prompt for the private key passphrase
        #[arg(short, long)]
        passphrase: bool,
    },

    /// Scan files for unencrypted sensitive data
    Scan {
        /// Paths relative to the notes root
        #[arg(required = true)]
        paths: Vec<String>,

        /// Print findings as JSON
        #[arg(long)]
        json: bool,
    },

    /// Pre-commit hook
    Hook {
        #[command(subcommand)]
        action: HookAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Generate and store a new key pair
    Generate {
        /// RSA modulus size (2048, 3072 or 4096)
        #[arg(long)]
        bits: Option<usize>,

        /// Protect the private key with a passphrase
        #[arg(short, long)]
        passphrase: bool,

        /// Replace an existing key pair
        #[arg(short, long)]
        force: bool,
    },

    /// Show key metadata
    Info,
}

#[derive(Subcommand)]
enum HookAction {
    /// Validate staged files (run by git)
    Check,

    /// Install the pre-commit hook in the current repository
    Install {
        /// Overwrite an existing hook
        #[arg(short, long)]
        force: bool,
    },

    /// Remove the pre-commit hook
    Uninstall,
}

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(level: &str) {
    let level: tracing::Level = level.parse().unwrap_or(tracing::Level::WARN);
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let root = cli.root.as_deref();
    let load_config = || Config::load(root);

    match cli.command {
        Commands::Init => commands::init(&load_config()?)?,
        Commands::Key { action } => match action {
            KeyAction::Generate {
                bits,
                passphrase,
                force,
            } => commands::key_generate(&load_config()?, bits, passphrase, force)?,
            KeyAction::Info => commands::key_info(&load_config()?)?,
        },
        Commands::Encrypt { text, raw } => commands::encrypt(&load_config()?, text, raw)?,
        Commands::Decrypt { file, passphrase } => {
            commands::decrypt(&load_config()?, file.as_deref(), passphrase)?
        }
        Commands::Scan { paths, json } => return commands::scan(&load_config()?, &paths, json),
        // The hook resolves its root from the repository being committed to
        Commands::Hook { action } => match action {
            HookAction::Check => return commands::hook_check(root),
            HookAction::Install { force } => commands::hook_install(force)?,
            HookAction::Uninstall => commands::hook_uninstall()?,
        },
    }

    Ok(0)
}
