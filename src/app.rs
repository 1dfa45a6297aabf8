use std::cell::Cell;
use std::rc::Rc;

use log::{error, warn};
use serde_json::Value;
use futures_signals::signal::{Signal, SignalExt, Mutable};
use futures_signals::signal_vec::{SignalVec, SignalVecExt, MutableVec};
use dominator::{Dom, text_signal, html, clone, events, link, with_node};
use web_sys::{HtmlElement, HtmlInputElement};

use crate::error::Result;
use crate::model::TodoState;
use crate::persist::Flags;
use crate::port::Port;
use crate::program::{Application, SAVE_PORT};
use crate::routing::Route;
use crate::todo::Todo;
use crate::util::trim;


#[derive(Debug)]
pub struct App {
    todo_id: Cell<u32>,
    new_todo_title: Mutable<String>,
    todo_list: MutableVec<Rc<Todo>>,
    save: Port<Value>,
}

impl App {
    /// Flags that don't describe a to-do list are dropped.
    pub fn new(flags: Flags, save: Port<Value>) -> Rc<Self> {
        let state = flags
            .map(|flags| {
                serde_json::from_value::<TodoState>(flags).unwrap_or_else(|err| {
                    warn!("Ignoring saved state that is not a to-do list: {}", err);
                    TodoState::default()
                })
            })
            .unwrap_or_default();

        let todos: Vec<Rc<Todo>> = state.items.into_iter()
            .enumerate()
            .map(|(id, item)| Todo::new(id as u32, item.text, item.done))
            .collect();

        Rc::new(Self {
            todo_id: Cell::new(todos.len() as u32),
            new_todo_title: Mutable::new("".to_owned()),
            todo_list: MutableVec::new_with_values(todos),
            save,
        })
    }

    pub fn snapshot(&self) -> TodoState {
        TodoState {
            items: self.todo_list.lock_ref().iter().map(|todo| todo.to_item()).collect(),
        }
    }

    /// Asks for the current list to be saved.
    pub fn persist(&self) {
        match serde_json::to_value(self.snapshot()) {
            Ok(state) => self.save.send(state),
            Err(err) => error!("Failed to encode the to-do list: {}", err),
        }
    }

    pub(crate) fn add_todo(&self, title: &str) {
        let id = self.todo_id.get();
        self.todo_id.set(id + 1);
        self.todo_list.lock_mut().push_cloned(Todo::new(id, title.to_owned(), false));
        self.persist();
    }

    fn create_new_todo(&self) {
        let title = self.new_todo_title.get_cloned();

        // Only create a new Todo if the text box is not empty
        if let Some(title) = trim(&title) {
            self.new_todo_title.set_neq("".to_owned());
            self.add_todo(title);
        }
    }

    pub fn remove_todo(&self, todo: &Todo) {
        self.todo_list.lock_mut().retain(|x| **x != *todo);
    }

    fn remove_all_completed_todos(&self) {
        self.todo_list.lock_mut().retain(|todo| !todo.done.get());
        self.persist();
    }

    fn set_all_todos_completed(&self, checked: bool) {
        for todo in self.todo_list.lock_ref().iter() {
            todo.done.set_neq(checked);
        }

        self.persist();
    }

    fn completed(&self) -> impl SignalVec<Item = bool> {
        self.todo_list.signal_vec_cloned()
            .map_signal(|todo| todo.done.signal())
    }

    fn completed_len(&self) -> impl Signal<Item = usize> {
        self.completed()
            .filter(|done| *done)
            .len()
    }

    fn not_completed_len(&self) -> impl Signal<Item = usize> {
        self.completed()
            .filter(|done| !done)
            .len()
    }

    fn has_todos(&self) -> impl Signal<Item = bool> {
        self.todo_list.signal_vec_cloned()
            .len()
            .map(|len| len > 0)
            .dedupe()
    }

    fn render_header(app: Rc<Self>) -> Dom {
        html!("header", {
            .class("header")
            .children(&mut [
                html!("h1", {
                    .text("todos")
                }),

                html!("input" => HtmlInputElement, {
                    .focused(true)
                    .class("new-todo")
                    .attr("placeholder", "What needs to be done?")
                    .prop_signal("value", app.new_todo_title.signal_cloned())

                    .with_node!(element => {
                        .event(clone!(app => move |_: events::Input| {
                            app.new_todo_title.set_neq(element.value());
                        }))
                    })

                    .event(clone!(app => move |event: events::KeyDown| {
                        if event.key() == "Enter" {
                            app.create_new_todo();
                        }
                    }))
                }),
            ])
        })
    }

    fn render_main(app: Rc<Self>) -> Dom {
        html!("section", {
            .class("main")

            // Hide if it doesn't have any todos.
            .visible_signal(app.has_todos())

            .children(&mut [
                html!("input" => HtmlInputElement, {
                    .class("toggle-all")
                    .attr("id", "toggle-all")
                    .attr("type", "checkbox")
                    .prop_signal("checked", app.not_completed_len().map(|len| len == 0))

                    .with_node!(element => {
                        .event(clone!(app => move |_: events::Change| {
                            app.set_all_todos_completed(element.checked());
                        }))
                    })
                }),

                html!("label", {
                    .attr("for", "toggle-all")
                    .text("Mark all as complete")
                }),

                html!("ul", {
                    .class("todo-list")
                    .children_signal_vec(app.todo_list.signal_vec_cloned()
                        .map(clone!(app => move |todo| Todo::render(todo, app.clone()))))
                }),
            ])
        })
    }

    fn render_button(text: &str, route: Route) -> Dom {
        html!("li", {
            .children(&mut [
                link!(route.url(), {
                    .text(text)
                    .class_signal("selected", Route::signal().map(move |x| x == route))
                })
            ])
        })
    }

    fn render_footer(app: Rc<Self>) -> Dom {
        html!("footer", {
            .class("footer")

            // Hide if it doesn't have any todos.
            .visible_signal(app.has_todos())

            .children(&mut [
                html!("span", {
                    .class("todo-count")

                    .children(&mut [
                        html!("strong", {
                            .text_signal(app.not_completed_len().map(|len| len.to_string()))
                        }),

                        text_signal(app.not_completed_len().map(|len| {
                            if len == 1 {
                                " item left"
                            } else {
                                " items left"
                            }
                        })),
                    ])
                }),

                html!("ul", {
                    .class("filters")
                    .children(&mut [
                        Self::render_button("All", Route::All),
                        Self::render_button("Active", Route::Active),
                        Self::render_button("Completed", Route::Completed),
                    ])
                }),

                html!("button", {
                    .class("clear-completed")

                    // Show if there is at least one completed item.
                    .visible_signal(app.completed_len().map(|len| len > 0))

                    .event(clone!(app => move |_: events::Click| {
                        app.remove_all_completed_todos();
                    }))

                    .text("Clear completed")
                }),
            ])
        })
    }

    pub fn render(app: Rc<Self>) -> Dom {
        html!("section", {
            .class("todoapp")
            .children(&mut [
                Self::render_header(app.clone()),
                Self::render_main(app.clone()),
                Self::render_footer(app),
            ])
        })
    }
}

impl Application for Rc<App> {
    type Node = HtmlElement;

    fn init(flags: Flags, node: Self::Node) -> Result<Self> {
        let app = App::new(flags, Port::new(SAVE_PORT));
        dominator::append_dom(&node, App::render(app.clone()));
        Ok(app)
    }

    #[inline]
    fn save_port(&self) -> &Port<Value> {
        &self.save
    }
}


#[cfg(test)]
impl App {
    pub(crate) fn todo_at(&self, index: usize) -> Rc<Todo> {
        self.todo_list.lock_ref()[index].clone()
    }
}
