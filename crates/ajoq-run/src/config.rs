use std::env;

use ajoq_lang::{DEFAULT_MAX_DEPTH, Options};

/// Settings read from the environment, overridden by command line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub max_depth: usize,
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            log_filter: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(depth) = var("AJOQ_MAX_DEPTH") {
            if let Ok(depth) = depth.trim().parse::<usize>() {
                config.max_depth = depth;
            } else {
                eprintln!(
                    "Warning: Invalid AJOQ_MAX_DEPTH value '{}', using default {}",
                    depth, config.max_depth
                );
            }
        }

        if let Some(filter) = var("AJOQ_LOG").filter(|f| !f.trim().is_empty()) {
            config.log_filter = Some(filter);
        }

        config
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        if let Some(max_depth) = max_depth {
            self.max_depth = max_depth;
        }
        self
    }

    pub fn options(&self) -> Options {
        Options {
            max_depth: self.max_depth,
        }
    }
}
