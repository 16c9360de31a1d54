//! powsig CLI
//!
//! Mine proof-of-work digests for a nickname and sign them with RSA-PSS.
//!
//! # Commands
//!
//! - `mine` - Find digests with leading zeros (4 then 5 by default)
//! - `keygen` - Generate `private.pem` / `public.pem`
//! - `sign` - Sign a message, or mine a digest and sign it
//! - `verify` - Verify a hex signature over a message
//! - `prove` - Mine, sign and verify in one go
//! - `check` - Verify a claimed nonce
//! - `benchmark` - Measure the candidate hashrate

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use powsig::config::{Config, CONFIG_FILE};
use powsig::keys::{default_key_dir, ensure_key_dir, KeyStore};
use powsig::primitives::{
    candidate, digest, hash_candidate, verify_nonce, DIGEST_HEX_LEN, MAX_DIFFICULTY,
    RSA_KEY_BITS,
};
use powsig::{sign, verify, KeyPair, Miner, PowResult};

#[derive(Parser)]
#[command(name = "powsig")]
#[command(author = "Cyberia")]
#[command(version = "0.1.0")]
#[command(about = "Proof-of-work digests signed with RSA-PSS")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding private.pem and public.pem (default: ~/.powsig)
    #[arg(long, global = true)]
    key_dir: Option<PathBuf>,

    /// Config file (default: ~/.powsig/config.json if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Give up after this many hashes
    #[arg(long, global = true)]
    max_attempts: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find digests with leading zeros for a nickname
    Mine {
        /// Nickname to mine with (will prompt if not provided)
        #[arg(long)]
        nickname: Option<String>,

        /// Leading zero hex characters; repeat for several runs (default: 4 and 5)
        #[arg(short, long)]
        difficulty: Vec<u32>,
    },

    /// Generate a new RSA key pair
    Keygen {
        /// Replace existing key files
        #[arg(long)]
        force: bool,
    },

    /// Sign a message with the private key
    Sign {
        /// Message to sign as-is
        #[arg(long, conflicts_with = "nickname", required_unless_present = "nickname")]
        message: Option<String>,

        /// Mine a digest for this nickname and sign the digest
        #[arg(long)]
        nickname: Option<String>,

        /// Difficulty when mining (default: from config)
        #[arg(short, long)]
        difficulty: Option<u32>,
    },

    /// Verify a signature with the public key
    Verify {
        /// The exact message that was signed
        #[arg(long)]
        message: String,

        /// Signature as hex
        #[arg(long)]
        signature: String,
    },

    /// Mine a digest, sign it and verify the signature
    Prove {
        /// Nickname to mine with (will prompt if not provided)
        #[arg(long)]
        nickname: Option<String>,

        /// Difficulty (default: from config)
        #[arg(short, long)]
        difficulty: Option<u32>,
    },

    /// Check a claimed proof-of-work nonce
    Check {
        /// Nickname the proof was mined for
        #[arg(long)]
        nickname: String,

        /// The claimed nonce
        #[arg(long)]
        nonce: u64,

        /// Difficulty (default: from config)
        #[arg(short, long)]
        difficulty: Option<u32>,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of hashes to compute
        #[arg(short, long, default_value = "1000000")]
        count: u64,
    },
}

/// Config file values with command-line overrides applied
struct Settings {
    config: Config,
    store: KeyStore,
}

impl Settings {
    fn difficulty(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.config.difficulty)
    }
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    let result = load_settings(&cli).and_then(|settings| match cli.command {
        Commands::Mine {
            nickname,
            difficulty,
        } => cmd_mine(nickname, difficulty, &settings).map(|()| true),
        Commands::Keygen { force } => cmd_keygen(force, &settings).map(|()| true),
        Commands::Sign {
            message,
            nickname,
            difficulty,
        } => cmd_sign(message, nickname, difficulty, &settings).map(|()| true),
        Commands::Verify { message, signature } => cmd_verify(&message, &signature, &settings),
        Commands::Prove {
            nickname,
            difficulty,
        } => cmd_prove(nickname, difficulty, &settings).map(|()| true),
        Commands::Check {
            nickname,
            nonce,
            difficulty,
        } => cmd_check(&nickname, nonce, difficulty, &settings),
        Commands::Benchmark { count } => cmd_benchmark(count).map(|()| true),
    });

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }
    std::process::exit(exit_code(&result));
}

/// `Ok(false)` means a verification ran and rejected its input
fn exit_code(result: &anyhow::Result<bool>) -> i32 {
    match result {
        Ok(true) => 0,
        Ok(false) | Err(_) => 1,
    }
}

/// Log to stderr so stdout carries only results; `RUST_LOG` overrides the level
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_or_default(&default_key_dir().join(CONFIG_FILE))?,
    }
    .with_overrides(cli.max_attempts, cli.key_dir.clone());

    let key_dir = config.key_dir_or_else(default_key_dir);

    Ok(Settings {
        config,
        store: KeyStore::new(key_dir),
    })
}

fn read_nickname(nickname: Option<String>) -> anyhow::Result<String> {
    let nickname = match nickname {
        Some(n) => n,
        None => {
            print!("Enter your nickname: ");
            std::io::stdout().flush().ok();
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            input
        }
    };

    let nickname = nickname.trim();
    if nickname.is_empty() {
        anyhow::bail!("Nickname must not be empty");
    }
    Ok(nickname.to_string())
}

/// Run one search, printing hashrate while it goes
fn mine(nickname: &str, difficulty: u32, settings: &Settings) -> anyhow::Result<PowResult> {
    let miner = Miner::new(nickname, difficulty)?
        .with_max_attempts(settings.config.max_attempts)
        .with_progress_interval(settings.config.progress_interval);

    let mut reported = false;
    let result = miner.run_with_progress(|progress| {
        print!(
            "\rHashrate: {:.0} H/s | Hashes: {} | Time: {:.1}s",
            progress.hashrate(),
            progress.attempts,
            progress.elapsed.as_secs_f64()
        );
        std::io::stdout().flush().ok();
        reported = true;
    });

    if reported {
        println!();
    }
    Ok(result?)
}

fn print_proof(proof: &PowResult, difficulty: u32) {
    println!("Found hash with {} leading zeros!", difficulty);
    println!("  Data:    {}", proof.candidate);
    println!("  Nonce:   {}", proof.nonce);
    println!("  Hash:    {}", proof.digest);
    println!("  Hashes:  {}", proof.attempts);
    println!("  Time:    {:.4}s", proof.elapsed.as_secs_f64());
}

fn cmd_mine(
    nickname: Option<String>,
    difficulties: Vec<u32>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let nickname = read_nickname(nickname)?;

    let difficulties = if difficulties.is_empty() {
        vec![4, 5]
    } else {
        difficulties
    };

    for difficulty in difficulties {
        println!("\n=== Proof-of-work challenge: {} leading zeros ===", difficulty);
        let proof = mine(&nickname, difficulty, settings)?;
        print_proof(&proof, difficulty);
    }

    Ok(())
}

fn cmd_keygen(force: bool, settings: &Settings) -> anyhow::Result<()> {
    let store = &settings.store;

    if store.exists() && !force {
        anyhow::bail!(
            "Keys already exist in {}. Use --force to replace them.",
            store.dir().display()
        );
    }

    // Fail on an unwritable directory before the slow key generation
    match settings.config.key_dir {
        Some(_) => store.ensure_dir()?,
        None => {
            ensure_key_dir()?;
        }
    }

    println!("Generating {}-bit RSA key pair...", RSA_KEY_BITS);
    let keys = KeyPair::generate()?;
    store.save(&keys, force)?;

    println!("Key pair generated!");
    println!("  Private key: {}", store.private_key_path().display());
    println!("  Public key:  {}", store.public_key_path().display());

    Ok(())
}

fn cmd_sign(
    message: Option<String>,
    nickname: Option<String>,
    difficulty: Option<u32>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let message = match message {
        Some(m) => m,
        None => {
            let nickname = read_nickname(nickname)?;
            let difficulty = settings.difficulty(difficulty);
            let proof = mine(&nickname, difficulty, settings)?;
            print_proof(&proof, difficulty);
            proof.digest
        }
    };

    let private_key = settings
        .store
        .load_private_key()
        .context("Failed to load private key (run 'powsig keygen' first?)")?;
    let signature = sign(&private_key, &message)?;

    println!("Message:   {}", message);
    println!("Signature: {}", hex::encode(&signature));

    Ok(())
}

fn cmd_verify(message: &str, signature_hex: &str, settings: &Settings) -> anyhow::Result<bool> {
    let signature = hex::decode(signature_hex.trim()).context("Signature is not valid hex")?;
    let public_key = settings
        .store
        .load_public_key()
        .context("Failed to load public key")?;

    let valid = verify(&public_key, message, &signature)?;
    if valid {
        println!("Signature valid: the data has not been tampered with.");
    } else {
        println!("Signature invalid: the data may have been tampered with!");
    }
    Ok(valid)
}

fn cmd_prove(
    nickname: Option<String>,
    difficulty: Option<u32>,
    settings: &Settings,
) -> anyhow::Result<()> {
    let nickname = read_nickname(nickname)?;
    let difficulty = settings.difficulty(difficulty);

    let keys = settings
        .store
        .load_key_pair()
        .context("Failed to load private key (run 'powsig keygen' first?)")?;
    let public_key = settings
        .store
        .load_public_key()
        .context("Failed to load public key")?;

    let proof = mine(&nickname, difficulty, settings)?;
    print_proof(&proof, difficulty);

    let signature = keys.sign(&proof.digest)?;
    println!("\nSignature: {}", hex::encode(&signature));

    if verify(&public_key, &proof.digest, &signature)? {
        println!("Signature valid: the data has not been tampered with.");
        Ok(())
    } else {
        anyhow::bail!(
            "Signature did not verify against {}",
            settings.store.public_key_path().display()
        )
    }
}

fn cmd_check(
    nickname: &str,
    nonce: u64,
    difficulty: Option<u32>,
    settings: &Settings,
) -> anyhow::Result<bool> {
    let difficulty = settings.difficulty(difficulty);
    let data = candidate(nickname, nonce);

    println!("Data: {}", data);
    println!("Hash: {}", digest(&data));

    let valid = verify_nonce(nickname, nonce, difficulty);
    if valid {
        println!("Valid proof for {} leading zeros.", difficulty);
    } else {
        println!("Not a valid proof for {} leading zeros.", difficulty);
    }
    Ok(valid)
}

fn cmd_benchmark(count: u64) -> anyhow::Result<()> {
    println!("Running benchmark with {} hashes...", count);

    let start = Instant::now();

    for nonce in 0..count {
        std::hint::black_box(hash_candidate(&candidate("benchmark", nonce)));
    }

    let elapsed = start.elapsed();
    let hashrate = count as f64 / elapsed.as_secs_f64();

    println!("\nResults:");
    println!("  Total hashes: {}", count);
    println!("  Time elapsed: {:.2}s", elapsed.as_secs_f64());
    println!("  Hashrate: {:.2} H/s", hashrate);

    println!("\nExpected search time:");
    for difficulty in 1..=6u32 {
        let expected = 16f64.powi(difficulty as i32);
        println!(
            "  {} leading zeros: ~{:.0} hashes, ~{:.2}s",
            difficulty,
            expected,
            expected / hashrate
        );
    }

    println!("\nAlgorithm parameters:");
    println!("  Hash: SHA-256 ({} hex characters)", DIGEST_HEX_LEN);
    println!("  Max difficulty: {}", MAX_DIFFICULTY);
    println!("  Signature: RSA-PSS, {} bits, SHA-256", RSA_KEY_BITS);

    Ok(())
}
