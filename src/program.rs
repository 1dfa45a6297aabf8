use std::rc::Rc;

use discard::Discard;
use log::info;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::persist::{Flags, Persistence};
use crate::port::{Port, Subscription};
use crate::storage::Storage;


/// Name of the port an application uses to ask for its state to be saved.
pub const SAVE_PORT: &str = "setStorage";


/// An application that can be started from saved state.
pub trait Application: Sized {
    /// Where the application is mounted.
    type Node;

    fn init(flags: Flags, node: Self::Node) -> Result<Self>;

    /// Every value sent on this port is saved, replacing the previous one.
    fn save_port(&self) -> &Port<Value>;
}


/// A running application wired to its storage.
#[derive(Debug)]
pub struct Program<A, S> {
    app: A,
    persistence: Rc<Persistence<S>>,
    subscription: Option<Subscription>,
}

impl<A, S> Program<A, S> where A: Application, S: Storage + 'static {
    /// Loads the saved state, initializes the application with it, and then
    /// saves everything the application sends on its save port.
    ///
    /// If the saved state can't be read the application is never initialized.
    pub fn start(config: &Config, storage: S, node: A::Node) -> Result<Self> {
        let persistence = Rc::new(
            Persistence::new(storage, config.storage_key.clone())
                .on_corrupt(config.on_corrupt)
        );

        let flags = persistence.load()?;

        info!("Starting application ({})", if flags.is_some() { "restored" } else { "fresh" });

        let app = A::init(flags, node)?;

        let subscription = Persistence::subscribe(&persistence, app.save_port());

        Ok(Self {
            app,
            persistence,
            subscription: Some(subscription),
        })
    }

    #[inline]
    pub fn app(&self) -> &A {
        &self.app
    }

    #[inline]
    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Stops saving and hands back the application.
    pub fn stop(mut self) -> A {
        if let Some(subscription) = self.subscription.take() {
            subscription.discard();
        }

        self.app
    }
}


#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;
    use serde_json::{json, Value};
    use crate::config::{Config, CorruptState};
    use crate::error::{Error, Result};
    use crate::persist::Flags;
    use crate::port::Port;
    use crate::storage::{Storage, MemoryStorage};
    use super::{Application, Program, SAVE_PORT};

    const KEY: &str = "elm-todo-save";

    struct Recorder {
        flags: Flags,
        save: Port<Value>,
    }

    impl Application for Recorder {
        type Node = Rc<Cell<usize>>;

        fn init(flags: Flags, node: Self::Node) -> Result<Self> {
            node.set(node.get() + 1);

            Ok(Self {
                flags,
                save: Port::new(SAVE_PORT),
            })
        }

        fn save_port(&self) -> &Port<Value> {
            &self.save
        }
    }

    fn start(storage: &Rc<MemoryStorage>, config: &Config) -> (Result<Program<Recorder, Rc<MemoryStorage>>>, usize) {
        let inits = Rc::new(Cell::new(0));
        let program = Program::start(config, storage.clone(), inits.clone());
        (program, inits.get())
    }

    #[test]
    fn empty_storage_then_first_save() {
        let storage = Rc::new(MemoryStorage::new());

        let (program, inits) = start(&storage, &Config::new());
        let program = program.unwrap();

        assert_eq!(inits, 1);
        assert_eq!(program.app().flags, None);

        program.app().save_port().send(json!({ "items": [] }));

        assert_eq!(storage.get_item(KEY).unwrap(), Some(r#"{"items":[]}"#.to_owned()));
    }

    #[test]
    fn restores_saved_state() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item(KEY, r#"{"items":[{"text":"milk","done":false}]}"#).unwrap();

        let (program, _) = start(&storage, &Config::new());

        assert_eq!(
            program.unwrap().app().flags,
            Some(json!({ "items": [{ "text": "milk", "done": false }] })),
        );
    }

    #[test]
    fn uses_configured_key() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item("other", "[1,2]").unwrap();

        let (program, _) = start(&storage, &Config::new().storage_key("other"));
        let program = program.unwrap();

        assert_eq!(program.app().flags, Some(json!([1, 2])));
        assert_eq!(program.persistence().key(), "other");

        program.app().save_port().send(json!([3]));

        assert_eq!(storage.get_item("other").unwrap(), Some("[3]".to_owned()));
        assert_eq!(storage.get_item(KEY).unwrap(), None);
    }

    #[test]
    fn malformed_state_is_a_startup_error() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item(KEY, "{oops").unwrap();

        let (program, inits) = start(&storage, &Config::new());

        assert!(matches!(program, Err(Error::Decode { .. })));
        assert_eq!(inits, 0);
    }

    #[test]
    fn malformed_state_can_be_discarded() {
        let storage = Rc::new(MemoryStorage::new());
        storage.set_item(KEY, "{oops").unwrap();

        let (program, inits) = start(&storage, &Config::new().on_corrupt(CorruptState::Discard));
        let program = program.unwrap();

        assert_eq!(inits, 1);
        assert_eq!(program.app().flags, None);

        program.app().save_port().send(json!({ "items": [] }));

        assert_eq!(storage.get_item(KEY).unwrap(), Some(r#"{"items":[]}"#.to_owned()));
    }

    #[test]
    fn stop_detaches_storage() {
        let storage = Rc::new(MemoryStorage::new());

        let (program, _) = start(&storage, &Config::new());
        let app = program.unwrap().stop();

        assert_eq!(app.save_port().subscriber_count(), 0);

        app.save_port().send(json!({ "items": [] }));

        assert_eq!(storage.get_item(KEY).unwrap(), None);
    }
}
