// Copyright 2025-2026 CEMAXECUTER LLC

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// Read-only configuration lookup for pipeline stages.
///
/// Stages resolve every setting through `property`, which never fails:
/// a missing key or a value that does not parse as the requested type
/// yields the supplied default.
pub trait ConfigSource {
    /// Raw string lookup; `None` when the key is absent.
    fn lookup(&self, key: &str) -> Option<&str>;

    fn property<T: FromStr>(&self, key: &str, default: T) -> T
    where
        Self: Sized,
    {
        match self.lookup(key) {
            Some(raw) => raw.trim().parse().unwrap_or(default),
            None => default,
        }
    }
}

/// Key=value configuration store, loadable from a receiver config file.
///
/// File format: one `key=value` pair per line, `#` starts a comment,
/// blank lines are ignored. Values keep everything after the first `=`.
#[derive(Debug, Default, Clone)]
pub struct KvConfig {
    entries: HashMap<String, String>,
}

impl KvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config = Self::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config.set(key.trim(), value.trim());
            }
        }
        Ok(config)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConfigSource for KvConfig {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}
