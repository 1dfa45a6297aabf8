use std::borrow::Cow;

use log::Level;

use crate::error::{Error, Result};


pub const DEFAULT_STORAGE_KEY: &str = "elm-todo-save";

pub const DEFAULT_MOUNT_ID: &str = "app";


/// What to do when the saved state is not valid JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptState {
    /// Refuse to start.
    Fail,

    /// Log a warning and start as if nothing was saved.
    Discard,
}

impl CorruptState {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "fail" => Some(CorruptState::Fail),
            "discard" => Some(CorruptState::Discard),
            _ => None,
        }
    }
}

impl Default for CorruptState {
    #[inline]
    fn default() -> Self {
        CorruptState::Fail
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub storage_key: Cow<'static, str>,
    pub mount_id: Cow<'static, str>,
    pub log_level: Level,
    pub on_corrupt: CorruptState,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: Cow::Borrowed(DEFAULT_STORAGE_KEY),
            mount_id: Cow::Borrowed(DEFAULT_MOUNT_ID),
            log_level: if cfg!(debug_assertions) { Level::Debug } else { Level::Info },
            on_corrupt: CorruptState::default(),
        }
    }
}

impl Config {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn storage_key<A>(mut self, key: A) -> Self where A: Into<Cow<'static, str>> {
        self.storage_key = key.into();
        self
    }

    #[inline]
    pub fn mount_id<A>(mut self, id: A) -> Self where A: Into<Cow<'static, str>> {
        self.mount_id = id.into();
        self
    }

    #[inline]
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    #[inline]
    pub fn on_corrupt(mut self, policy: CorruptState) -> Self {
        self.on_corrupt = policy;
        self
    }

    /// Overrides settings from `data-*` attributes, usually those of the
    /// mount element.
    ///
    /// Recognizes `data-storage-key`, `data-log-level` and `data-on-corrupt`.
    pub fn apply_attributes<F>(mut self, get: F) -> Result<Self> where F: Fn(&str) -> Option<String> {
        if let Some(key) = get("data-storage-key") {
            if key.is_empty() {
                return Err(Error::Config { name: "data-storage-key", value: key });
            }

            self.storage_key = Cow::Owned(key);
        }

        if let Some(level) = get("data-log-level") {
            self.log_level = level.parse()
                .map_err(|_| Error::Config { name: "data-log-level", value: level })?;
        }

        if let Some(policy) = get("data-on-corrupt") {
            self.on_corrupt = CorruptState::parse(&policy)
                .ok_or(Error::Config { name: "data-on-corrupt", value: policy })?;
        }

        Ok(self)
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use log::Level;
    use crate::error::Error;
    use super::{Config, CorruptState, DEFAULT_STORAGE_KEY};

    fn attributes(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::new();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        // State saved by earlier releases lives under this key
        assert_eq!(config.storage_key, "elm-todo-save");
        assert_eq!(config.mount_id, "app");
        assert_eq!(config.on_corrupt, CorruptState::Fail);
    }

    #[test]
    fn no_attributes_changes_nothing() {
        let config = Config::new().apply_attributes(attributes(&[])).unwrap();
        assert_eq!(config, Config::new());
    }

    #[test]
    fn attributes_override() {
        let config = Config::new()
            .apply_attributes(attributes(&[
                ("data-storage-key", "my-todos"),
                ("data-log-level", "warn"),
                ("data-on-corrupt", "discard"),
            ]))
            .unwrap();

        assert_eq!(config.storage_key, "my-todos");
        assert_eq!(config.log_level, Level::Warn);
        assert_eq!(config.on_corrupt, CorruptState::Discard);
    }

    #[test]
    fn invalid_attribute() {
        let err = Config::new()
            .apply_attributes(attributes(&[("data-on-corrupt", "ignore")]))
            .unwrap_err();

        match err {
            Error::Config { name, value } => {
                assert_eq!(name, "data-on-corrupt");
                assert_eq!(value, "ignore");
            },
            err => panic!("unexpected error: {}", err),
        }

        assert!(Config::new().apply_attributes(attributes(&[("data-log-level", "loud")])).is_err());
        assert!(Config::new().apply_attributes(attributes(&[("data-storage-key", "")])).is_err());
    }

    #[test]
    fn builder() {
        let config = Config::new()
            .storage_key("other")
            .mount_id("root")
            .log_level(Level::Trace)
            .on_corrupt(CorruptState::Discard);

        assert_eq!(config.storage_key, "other");
        assert_eq!(config.mount_id, "root");
        assert_eq!(config.log_level, Level::Trace);
        assert_eq!(config.on_corrupt, CorruptState::Discard);
    }
}
