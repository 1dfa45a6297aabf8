use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use discard::Discard;


type Handler<A> = Rc<dyn Fn(&A)>;

struct Inner<A> {
    name: &'static str,
    next_id: Cell<usize>,
    handlers: RefCell<Vec<(usize, Handler<A>)>>,
    queue: RefCell<VecDeque<A>>,
    dispatching: Cell<bool>,
}

impl<A> Inner<A> {
    fn unsubscribe(&self, id: usize) {
        self.handlers.borrow_mut().retain(|(x, _)| *x != id);
    }
}


// Clears the dispatching flag even if a handler panics
struct Dispatching<'a>(&'a Cell<bool>);

impl<'a> Drop for Dispatching<'a> {
    #[inline]
    fn drop(&mut self) {
        self.0.set(false);
    }
}


/// An outbound channel that the application uses to announce events.
///
/// Every value sent is delivered to every handler, in the order the values
/// were sent. Handlers are called in the order they subscribed.
pub struct Port<A> {
    inner: Rc<Inner<A>>,
}

impl<A> Port<A> where A: 'static {
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Rc::new(Inner {
                name,
                next_id: Cell::new(0),
                handlers: RefCell::new(vec![]),
                queue: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
            }),
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription where F: Fn(&A) + 'static {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        self.inner.handlers.borrow_mut().push((id, Rc::new(handler)));

        let inner: Weak<Inner<A>> = Rc::downgrade(&self.inner);

        Subscription {
            remove: Some(Box::new(move || {
                if let Some(inner) = inner.upgrade() {
                    inner.unsubscribe(id);
                }
            })),
        }
    }

    pub fn send(&self, value: A) {
        self.inner.queue.borrow_mut().push_back(value);

        // A handler is sending, the outer loop will pick the value up
        if self.inner.dispatching.replace(true) {
            return;
        }

        let _guard = Dispatching(&self.inner.dispatching);

        loop {
            let value = match self.inner.queue.borrow_mut().pop_front() {
                Some(value) => value,
                None => break,
            };

            // Handlers may subscribe or unsubscribe while running
            let handlers: Vec<Handler<A>> = self.inner.handlers.borrow()
                .iter()
                .map(|(_, handler)| handler.clone())
                .collect();

            for handler in handlers {
                handler(&value);
            }
        }
    }
}

impl<A> Clone for Port<A> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A> fmt::Debug for Port<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("name", &self.inner.name)
            .field("subscribers", &self.inner.handlers.borrow().len())
            .finish()
    }
}


/// A handler registered with [`Port::subscribe`].
///
/// Dropping a `Subscription` leaves the handler registered for as long as the
/// port exists. Use [`Discard::discard`] to remove it.
pub struct Subscription {
    remove: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscription")
    }
}

impl Discard for Subscription {
    #[inline]
    fn discard(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}
