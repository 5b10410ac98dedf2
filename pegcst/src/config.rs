// pegcst. Packrat parsing over token streams
// Copyright (c) 2024 The pegcst Developers
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Per-parse settings.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Number of packrat entries kept when nothing else is configured.
pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(5000) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// How many rule results the packrat cache may hold.
///
/// In JSON this reads `"disabled"`, `"unbounded"` or `{ "bounded": 5000 }`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheCapacity {
    /// Nothing is memoized.
    Disabled,
    /// At most this many entries; the least recently used one is evicted first.
    Bounded(NonZeroUsize),
    /// Entries are never evicted.
    Unbounded,
}

impl CacheCapacity {
    /// Shorthand for `Bounded`, with `0` meaning `Disabled`.
    pub fn bounded(capacity: usize) -> CacheCapacity {
        NonZeroUsize::new(capacity).map_or(CacheCapacity::Disabled, CacheCapacity::Bounded)
    }
}

impl Default for CacheCapacity {
    fn default() -> Self {
        CacheCapacity::Bounded(DEFAULT_CACHE_CAPACITY)
    }
}

/// Settings of one parse.
///
/// # Examples
///
/// ```
/// # use std::num::NonZeroUsize;
/// # use pegcst::{CacheCapacity, ParserConfig};
/// let config = ParserConfig::from_json(r#"{ "cache": "unbounded", "call_limit": 10000 }"#).unwrap();
///
/// assert_eq!(config.cache, CacheCapacity::Unbounded);
/// assert_eq!(config.call_limit, NonZeroUsize::new(10000));
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    pub cache: CacheCapacity,
    /// Maximum number of rule and combinator calls; `None` for no limit.
    pub call_limit: Option<NonZeroUsize>,
}

impl ParserConfig {
    pub fn new() -> ParserConfig {
        ParserConfig::default()
    }

    pub fn with_cache(mut self, cache: CacheCapacity) -> ParserConfig {
        self.cache = cache;
        self
    }

    pub fn with_call_limit(mut self, call_limit: Option<NonZeroUsize>) -> ParserConfig {
        self.call_limit = call_limit;
        self
    }

    /// Reads a configuration from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<ParserConfig, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("Failed to serialize ParserConfig to json.")
    }
}
