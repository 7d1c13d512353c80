//! Severity floors for logger identities owned by other libraries
//!
//! A floor applies to the named identity and, unless overridden closer,
//! to every dotted descendant: a floor on `uvicorn` also covers
//! `uvicorn.access`. Identities with no floor in their ancestry pass every
//! severity. Floors are plain table entries, so naming an identity that has
//! never logged is allowed and has no effect until it does.

use super::log_level::LogLevel;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Libraries whose logging the MCP server quiets by default
pub const DEFAULT_THIRD_PARTY_LOGGERS: [&str; 8] = [
    "fastmcp",
    "uvicorn",
    "uvicorn.access",
    "uvicorn.error",
    "starlette",
    "asyncmy",
    "httpx",
    "httpcore",
];

#[derive(Debug)]
pub struct ThirdPartyLevels {
    floors: RwLock<HashMap<String, LogLevel>>,
    /// Whether external records reach the installed sinks at all
    propagate: AtomicBool,
}

impl ThirdPartyLevels {
    pub fn new() -> Self {
        Self {
            floors: RwLock::new(HashMap::new()),
            propagate: AtomicBool::new(true),
        }
    }

    /// Set the floor of every name in `names` to `threshold`
    pub fn suppress<I, S>(&self, threshold: LogLevel, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut floors = self.floors.write();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() {
                floors.insert(name.to_string(), threshold);
            }
        }
    }

    /// Floor set directly on `name`
    pub fn floor(&self, name: &str) -> Option<LogLevel> {
        self.floors.read().get(name).copied()
    }

    /// Floor on `name` or its nearest dotted ancestor
    pub fn effective_floor(&self, name: &str) -> Option<LogLevel> {
        let floors = self.floors.read();
        let mut current = name;
        loop {
            if let Some(level) = floors.get(current) {
                return Some(*level);
            }
            match current.rfind('.') {
                Some(idx) => current = &current[..idx],
                None => return None,
            }
        }
    }

    pub fn is_enabled(&self, name: &str, level: LogLevel) -> bool {
        self.effective_floor(name).map_or(true, |floor| level >= floor)
    }

    pub fn set_propagate(&self, propagate: bool) {
        self.propagate.store(propagate, Ordering::Relaxed);
    }

    pub fn propagates(&self) -> bool {
        self.propagate.load(Ordering::Relaxed)
    }

    /// Remove the floor of one identity
    pub fn reset(&self, name: &str) -> Option<LogLevel> {
        self.floors.write().remove(name)
    }

    pub fn clear(&self) {
        self.floors.write().clear();
    }
}

impl Default for ThirdPartyLevels {
    fn default() -> Self {
        Self::new()
    }
}
