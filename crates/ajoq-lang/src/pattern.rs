use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use regex_lite::{Regex, RegexBuilder};
use smol_str::SmolStr;

use crate::error::compile::CompileError;

/// A regular expression literal: source text plus `/.../flags` style flags.
///
/// Supported flags are `i` (case-insensitive), `m` (multi-line) and `s` (dot
/// matches newline). The stateful `g`/`y` flags and the `u`/`d`/`v` flags are
/// accepted and have no effect since every test starts at the beginning of the
/// subject.
#[derive(Clone)]
pub struct Pattern {
    source: SmolStr,
    flags: SmolStr,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, CompileError> {
        Self::with_flags(source, "")
    }

    pub fn with_flags(source: &str, flags: &str) -> Result<Self, CompileError> {
        let mut builder = RegexBuilder::new(source);

        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'g' | 'y' | 'u' | 'd' | 'v' => &mut builder,
                _ => {
                    return Err(CompileError::InvalidRegularExpression(format!(
                        "/{source}/{flags}: unknown flag '{flag}'"
                    )));
                }
            };
        }

        let regex = builder
            .build()
            .map_err(|e| CompileError::InvalidRegularExpression(format!("/{source}/{flags}: {e}")))?;

        Ok(Self {
            source: source.into(),
            flags: flags.into(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    #[inline]
    pub fn test(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Parses the `/source/flags` literal form.
impl FromStr for Pattern {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('/').and_then(|rest| rest.rsplit_once('/')) {
            Some((source, flags)) => Self::with_flags(source, flags),
            None => Err(CompileError::InvalidRegularExpression(format!(
                "{s}: expected /source/flags"
            ))),
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.flags.hash(state);
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
