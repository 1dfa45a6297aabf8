use std::borrow::Cow;
use std::rc::Rc;

use log::{debug, error, info, trace, warn};
use serde::Serialize;
use serde_json::Value;

use crate::config::CorruptState;
use crate::error::{Error, Result};
use crate::port::{Port, Subscription};
use crate::storage::Storage;


/// The state handed to the application at startup.
///
/// `None` means nothing was saved.
pub type Flags = Option<Value>;


/// Keeps one JSON value under a single storage key.
#[derive(Debug)]
pub struct Persistence<S> {
    storage: S,
    key: Cow<'static, str>,
    on_corrupt: CorruptState,
}

impl<S> Persistence<S> where S: Storage {
    pub fn new<A>(storage: S, key: A) -> Self where A: Into<Cow<'static, str>> {
        Self {
            storage,
            key: key.into(),
            on_corrupt: CorruptState::default(),
        }
    }

    #[inline]
    pub fn on_corrupt(mut self, policy: CorruptState) -> Self {
        self.on_corrupt = policy;
        self
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Reads the saved state.
    ///
    /// A missing entry, an empty string and `null` all mean there is no
    /// saved state.
    pub fn load(&self) -> Result<Flags> {
        let text = match self.storage.get_item(&self.key)? {
            Some(text) if !text.is_empty() => text,
            _ => {
                debug!("No saved state under {:?}", self.key);
                return Ok(None);
            },
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Null) => Ok(None),

            Ok(value) => {
                info!("Loaded saved state from {:?} ({} bytes)", self.key, text.len());
                Ok(Some(value))
            },

            Err(source) => match self.on_corrupt {
                CorruptState::Fail => Err(Error::Decode {
                    key: self.key.to_string(),
                    source,
                }),

                CorruptState::Discard => {
                    warn!("Discarding saved state under {:?}: {}", self.key, source);
                    Ok(None)
                },
            },
        }
    }

    /// Encodes `state` and overwrites the saved state with it.
    pub fn save<A>(&self, state: &A) -> Result<()> where A: Serialize + ?Sized {
        let text = serde_json::to_string(state).map_err(Error::Encode)?;

        self.storage.set_item(&self.key, &text)?;

        trace!("Saved state to {:?} ({} bytes)", self.key, text.len());
        Ok(())
    }
}

impl<S> Persistence<S> where S: Storage + 'static {
    /// Saves every value sent on `port`.
    ///
    /// Writes are not retried, a failed write is logged and the previous
    /// value stays in storage.
    pub fn subscribe(this: &Rc<Self>, port: &Port<Value>) -> Subscription {
        debug!("Persisting {:?} notifications to {:?}", port.name(), this.key);

        let this = this.clone();

        port.subscribe(move |state| {
            if let Err(err) = this.save(state) {
                error!("Failed to persist state to {:?}: {}", this.key, err);
            }
        })
    }
}
