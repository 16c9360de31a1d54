//! Leading-zero proof-of-work search
//!
//! A candidate is the seed followed by a decimal nonce (`"user123"` and
//! `42` give `"user12342"`). The search walks nonces upward from zero and
//! stops at the first candidate whose SHA-256 hex digest starts with
//! `difficulty` `'0'` characters. Expected cost is about `16^difficulty`
//! hashes.
//!
//! Nonces are `u64`. Running out of nonce space ends the search with
//! [`PowError::Exhausted`] instead of wrapping around.

use core::fmt::Write;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::PowError;
use crate::params::{DIGEST_SIZE, MAX_DIFFICULTY};

/// Attempts between two progress callbacks unless configured otherwise
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000_000;

/// Build the candidate string for `nonce`.
pub fn candidate(seed: &str, nonce: u64) -> String {
    format!("{seed}{nonce}")
}

/// SHA-256 of the candidate's UTF-8 bytes.
pub fn hash_candidate(candidate: &str) -> [u8; DIGEST_SIZE] {
    Sha256::digest(candidate.as_bytes()).into()
}

/// Lowercase hex digest of a candidate.
pub fn digest(candidate: &str) -> String {
    hex::encode(hash_candidate(candidate))
}

/// Number of leading zero hex characters in the rendered digest.
pub fn leading_zero_nibbles(hash: &[u8; DIGEST_SIZE]) -> u32 {
    let mut nibbles = 0u32;

    for byte in hash.iter() {
        if *byte == 0 {
            nibbles += 2;
        } else {
            if *byte < 0x10 {
                nibbles += 1;
            }
            break;
        }
    }

    nibbles
}

/// Check a raw hash against a difficulty (leading zero hex characters).
pub fn meets_difficulty(hash: &[u8; DIGEST_SIZE], difficulty: u32) -> bool {
    leading_zero_nibbles(hash) >= difficulty
}

/// Check a hex digest against a difficulty.
///
/// Works on the text form, so it also accepts digests that came from
/// elsewhere (a file, the command line).
pub fn digest_meets_difficulty(digest: &str, difficulty: u32) -> bool {
    let needed = difficulty as usize;
    digest.len() >= needed && digest.bytes().take(needed).all(|b| b == b'0')
}

/// Recompute a claimed solution and check it against `difficulty`.
pub fn verify_nonce(seed: &str, nonce: u64, difficulty: u32) -> bool {
    !seed.is_empty() && meets_difficulty(&hash_candidate(&candidate(seed, nonce)), difficulty)
}

/// A solved proof-of-work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowResult {
    /// Winning candidate (`seed` + decimal nonce)
    pub candidate: String,
    /// Lowercase hex SHA-256 of `candidate`
    pub digest: String,
    /// Winning nonce
    pub nonce: u64,
    /// Hashes computed, including the winning one
    pub attempts: u64,
    /// Wall-clock time spent searching
    pub elapsed: Duration,
}

impl PowResult {
    /// Check that this result is a genuine solution for `seed` at `difficulty`.
    pub fn verify(&self, seed: &str, difficulty: u32) -> bool {
        self.candidate == candidate(seed, self.nonce)
            && digest(&self.candidate) == self.digest
            && digest_meets_difficulty(&self.digest, difficulty)
    }
}

/// Snapshot handed to progress observers
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub attempts: u64,
    pub elapsed: Duration,
}

impl Progress {
    /// Hashes per second so far
    pub fn hashrate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }
}

/// Sequential proof-of-work searcher
///
/// Holds validated search parameters. The search itself keeps no state
/// between runs, so running the same miner twice yields the same result.
#[derive(Debug, Clone)]
pub struct Miner<'a> {
    seed: &'a str,
    difficulty: u32,
    max_attempts: Option<u64>,
    progress_interval: u64,
}

impl<'a> Miner<'a> {
    /// Validate the inputs and build an unbounded miner.
    pub fn new(seed: &'a str, difficulty: u32) -> Result<Self, PowError> {
        if seed.is_empty() {
            return Err(PowError::EmptySeed);
        }
        if difficulty > MAX_DIFFICULTY {
            return Err(PowError::DifficultyOutOfRange {
                difficulty,
                max: MAX_DIFFICULTY,
            });
        }

        Ok(Self {
            seed,
            difficulty,
            max_attempts: None,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        })
    }

    /// Cap the number of hashes; `None` searches until a match.
    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Attempts between progress callbacks (minimum 1).
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn seed(&self) -> &str {
        self.seed
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Search without progress reporting.
    pub fn run(&self) -> Result<PowResult, PowError> {
        self.run_with_progress(|_| {})
    }

    /// Search, calling `on_progress` every `progress_interval` attempts.
    pub fn run_with_progress<F>(&self, mut on_progress: F) -> Result<PowResult, PowError>
    where
        F: FnMut(&Progress),
    {
        debug!(
            seed = self.seed,
            difficulty = self.difficulty,
            max_attempts = ?self.max_attempts,
            "starting proof-of-work search"
        );

        let start = Instant::now();
        let mut buf = String::with_capacity(self.seed.len() + 20);
        buf.push_str(self.seed);
        let mut nonce: u64 = 0;

        loop {
            if self.max_attempts.is_some_and(|max| nonce >= max) {
                warn!(attempts = nonce, "proof-of-work attempt cap reached");
                return Err(PowError::Exhausted { attempts: nonce });
            }

            buf.truncate(self.seed.len());
            // Writing into a String cannot fail
            let _ = write!(buf, "{nonce}");

            let hash = hash_candidate(&buf);
            let attempts = nonce.saturating_add(1);

            if meets_difficulty(&hash, self.difficulty) {
                let elapsed = start.elapsed();
                let digest = hex::encode(hash);
                info!(
                    nonce,
                    digest = %digest,
                    elapsed_secs = elapsed.as_secs_f64(),
                    "proof-of-work solved"
                );
                return Ok(PowResult {
                    candidate: buf,
                    digest,
                    nonce,
                    attempts,
                    elapsed,
                });
            }

            if attempts % self.progress_interval == 0 {
                on_progress(&Progress {
                    attempts,
                    elapsed: start.elapsed(),
                });
            }

            nonce = match nonce.checked_add(1) {
                Some(next) => next,
                None => {
                    warn!(attempts, "nonce space exhausted");
                    return Err(PowError::Exhausted { attempts });
                }
            };
        }
    }
}

/// Find the first candidate for `seed` meeting `difficulty`.
///
/// Unbounded: returns only once a solution is found. Use [`Miner`] with
/// [`Miner::with_max_attempts`] for a capped search.
pub fn search(seed: &str, difficulty: u32) -> Result<PowResult, PowError> {
    Miner::new(seed, difficulty)?.run()
}
