use thiserror::Error;
use wasm_bindgen::JsValue;

pub use crate::storage::StorageError;


pub type Result<T, E = Error> = std::result::Result<T, E>;


#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("saved state under {key:?} is not valid JSON")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode state as JSON")]
    Encode(#[source] serde_json::Error),

    #[error("there is no element with id {0:?} to mount the application on")]
    MountNotFound(String),

    #[error("invalid value {value:?} for {name}")]
    Config {
        name: &'static str,
        value: String,
    },
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        let message = match std::error::Error::source(&err) {
            Some(source) => format!("{}: {}", err, source),
            None => err.to_string(),
        };

        js_sys::Error::new(&message).into()
    }
}
