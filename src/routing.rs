use wasm_bindgen::prelude::*;
use web_sys::Url;
use futures_signals::signal::{Signal, SignalExt};
use dominator::routing;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Active,
    Completed,
    All,
}

impl Route {
    pub fn from_hash(hash: &str) -> Self {
        match hash {
            "#/active" => Route::Active,
            "#/completed" => Route::Completed,
            _ => Route::All,
        }
    }

    pub fn signal() -> impl Signal<Item = Self> {
        routing::url()
            .signal_ref(|url| Url::new(&url).unwrap_throw())
            .map(|url| Route::from_hash(&url.hash()))
            .dedupe()
    }

    pub fn url(&self) -> &'static str {
        match self {
            Route::Active => "#/active",
            Route::Completed => "#/completed",
            Route::All => "#/",
        }
    }

    #[inline]
    pub fn shows(&self, done: bool) -> bool {
        match self {
            Route::Active => !done,
            Route::Completed => done,
            Route::All => true,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::Route;

    #[test]
    fn from_hash() {
        assert_eq!(Route::from_hash("#/active"), Route::Active);
        assert_eq!(Route::from_hash("#/completed"), Route::Completed);
        assert_eq!(Route::from_hash("#/"), Route::All);
        assert_eq!(Route::from_hash(""), Route::All);
        assert_eq!(Route::from_hash("#/unknown"), Route::All);
    }

    #[test]
    fn url_round_trips() {
        for route in [Route::Active, Route::Completed, Route::All] {
            assert_eq!(Route::from_hash(route.url()), route);
        }
    }

    #[test]
    fn shows() {
        assert!(Route::All.shows(true));
        assert!(Route::All.shows(false));
        assert!(Route::Active.shows(false));
        assert!(!Route::Active.shows(true));
        assert!(Route::Completed.shows(true));
        assert!(!Route::Completed.shows(false));
    }
}
