use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::app::App;
use crate::config::Config;
use crate::error::Error;
use crate::program::Program;
use crate::storage::LocalStorage;

pub mod config;
pub mod error;
pub mod logging;
pub mod persist;
pub mod port;
pub mod program;
pub mod storage;

mod app;
mod model;
mod routing;
mod todo;
mod util;


fn mount_node(id: &str) -> Result<HtmlElement, Error> {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(id))
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| Error::MountNotFound(id.to_owned()))
}


#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    #[cfg(debug_assertions)]
    console_error_panic_hook::set_once();

    let config = Config::default();
    let node = mount_node(&config.mount_id)?;
    let config = config.apply_attributes(|name| node.get_attribute(name))?;

    logging::init(config.log_level);

    let storage = LocalStorage::new().map_err(Error::from)?;

    // The DOM and the save port keep the application alive
    let _program = Program::<Rc<App>, _>::start(&config, storage, node)?;

    Ok(())
}
