use lazy_static::lazy_static;
use log::warn;
use std::env;

pub const DEFAULT_PROMPT: &str = ": ";
pub const DEFAULT_MAX_INPUT: usize = 2048;
pub const DEFAULT_MAX_ARGS: usize = 512;
pub const DEFAULT_MAX_JOBS: usize = 512;

#[derive(Clone, Debug)]
pub struct Config {
    pub prompt: String,
    /// Longest line accepted from the terminal, in bytes. Longer lines are cut.
    pub max_input: usize,
    /// Upper bound on arguments per directive, program name included.
    pub max_args: usize,
    /// Slot count of the background job registry.
    pub max_jobs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: DEFAULT_PROMPT.to_string(),
            max_input: DEFAULT_MAX_INPUT,
            max_args: DEFAULT_MAX_ARGS,
            max_jobs: DEFAULT_MAX_JOBS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            prompt: DEFAULT_PROMPT.to_string(),
            max_input: limit_from_env("MINISH_MAX_INPUT", DEFAULT_MAX_INPUT),
            max_args: limit_from_env("MINISH_MAX_ARGS", DEFAULT_MAX_ARGS),
            max_jobs: limit_from_env("MINISH_MAX_JOBS", DEFAULT_MAX_JOBS),
        }
    }
}

fn limit_from_env(key: &str, default: usize) -> usize {
    match env::var(key) {
        Ok(raw) => parse_limit(key, &raw).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_limit(key: &str, raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => {
            warn!("{} must be greater than zero, using default", key);
            None
        }
        Ok(value) => Some(value),
        Err(e) => {
            warn!("ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::from_env();
}
