use std::rc::Rc;

use wasm_bindgen::prelude::*;
use futures_signals::map_ref;
use futures_signals::signal::{Signal, SignalExt, Mutable};
use dominator::{Dom, html, clone, events, with_node};
use web_sys::HtmlInputElement;

use crate::app::App;
use crate::model::Item;
use crate::routing::Route;
use crate::util::trim;


#[derive(Debug)]
pub struct Todo {
    id: u32,
    pub(crate) text: Mutable<String>,
    pub(crate) done: Mutable<bool>,
    editing: Mutable<Option<String>>,
}

impl Todo {
    pub fn new(id: u32, text: String, done: bool) -> Rc<Self> {
        Rc::new(Self {
            id,
            text: Mutable::new(text),
            done: Mutable::new(done),
            editing: Mutable::new(None),
        })
    }

    pub fn to_item(&self) -> Item {
        Item {
            text: self.text.get_cloned(),
            done: self.done.get(),
        }
    }

    fn set_done(&self, app: &App, done: bool) {
        self.done.set_neq(done);
        app.persist();
    }

    fn remove(&self, app: &App) {
        app.remove_todo(self);
        app.persist();
    }

    fn is_visible(&self) -> impl Signal<Item = bool> {
        (map_ref! {
            let route = Route::signal(),
            let done = self.done.signal() =>
            route.shows(*done)
        }).dedupe()
    }

    fn is_editing(&self) -> impl Signal<Item = bool> {
        self.editing.signal_ref(|x| x.is_some()).dedupe()
    }

    fn start_editing(&self) {
        self.editing.set_neq(Some(self.text.get_cloned()));
    }

    fn cancel_editing(&self) {
        self.editing.set_neq(None);
    }

    fn done_editing(&self, app: &App) {
        if let Some(text) = self.editing.replace(None) {
            if let Some(text) = trim(&text) {
                self.text.set_neq(text.to_owned());

            } else {
                app.remove_todo(self);
            }

            app.persist();
        }
    }

    pub fn render(todo: Rc<Self>, app: Rc<App>) -> Dom {
        html!("li", {
            .class_signal("editing", todo.is_editing())
            .class_signal("completed", todo.done.signal())

            .visible_signal(todo.is_visible())

            .children(&mut [
                html!("div", {
                    .class("view")
                    .children(&mut [
                        html!("input" => HtmlInputElement, {
                            .class("toggle")
                            .attr("type", "checkbox")
                            .prop_signal("checked", todo.done.signal())

                            .with_node!(element => {
                                .event(clone!(todo, app => move |_: events::Change| {
                                    todo.set_done(&app, element.checked());
                                }))
                            })
                        }),

                        html!("label", {
                            .event(clone!(todo => move |_: events::DoubleClick| {
                                todo.start_editing();
                            }))

                            .text_signal(todo.text.signal_cloned())
                        }),

                        html!("button", {
                            .class("destroy")
                            .event(clone!(todo, app => move |_: events::Click| {
                                todo.remove(&app);
                            }))
                        }),
                    ])
                }),

                html!("input" => HtmlInputElement, {
                    .class("edit")

                    .prop_signal("value", todo.editing.signal_cloned()
                        .map(|x| x.unwrap_or_else(|| "".to_owned())))

                    .visible_signal(todo.is_editing())
                    .focused_signal(todo.is_editing())

                    .with_node!(element => {
                        .event(clone!(todo => move |event: events::KeyDown| {
                            match event.key().as_str() {
                                "Enter" => {
                                    element.blur().unwrap_throw();
                                },
                                "Escape" => {
                                    todo.cancel_editing();
                                },
                                _ => {}
                            }
                        }))
                    })

                    .with_node!(element => {
                        .event(clone!(todo => move |_: events::Input| {
                            todo.editing.set_neq(Some(element.value()));
                        }))
                    })

                    .event(clone!(todo, app => move |_: events::Blur| {
                        todo.done_editing(&app);
                    }))
                }),
            ])
        })
    }
}

impl PartialEq<Todo> for Todo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}


#[cfg(test)]
mod tests {
    use serde_json::Value;
    use crate::app::App;
    use crate::model::Item;
    use crate::port::Port;
    use super::Todo;

    #[test]
    fn to_item() {
        let todo = Todo::new(0, "milk".to_owned(), true);
        assert_eq!(todo.to_item(), Item { text: "milk".to_owned(), done: true });
    }

    #[test]
    fn identity_is_by_id() {
        assert!(*Todo::new(1, "a".to_owned(), false) == *Todo::new(1, "b".to_owned(), true));
        assert!(*Todo::new(1, "a".to_owned(), false) != *Todo::new(2, "a".to_owned(), false));
    }

    #[test]
    fn editing_commits_trimmed_text() {
        let app = App::new(None, Port::<Value>::new("setStorage"));
        app.add_todo("milk");

        let todo = app.todo_at(0);
        todo.start_editing();
        todo.editing.set(Some("  oat milk ".to_owned()));
        todo.done_editing(&app);

        assert_eq!(todo.text.get_cloned(), "oat milk");
        assert_eq!(todo.editing.get_cloned(), None);
    }

    #[test]
    fn editing_to_empty_removes() {
        let app = App::new(None, Port::<Value>::new("setStorage"));
        app.add_todo("milk");

        let todo = app.todo_at(0);
        todo.start_editing();
        todo.editing.set(Some("   ".to_owned()));
        todo.done_editing(&app);

        assert!(app.snapshot().items.is_empty());
    }

    #[test]
    fn cancel_keeps_text() {
        let app = App::new(None, Port::<Value>::new("setStorage"));
        app.add_todo("milk");

        let todo = app.todo_at(0);
        todo.start_editing();
        todo.editing.set(Some("eggs".to_owned()));
        todo.cancel_editing();
        todo.done_editing(&app);

        assert_eq!(todo.text.get_cloned(), "milk");
    }
}
