//! Observer list with selector-based change detection
//!
//! Listeners run synchronously in registration order. A `Subscription` is an
//! RAII handle: dropping it (or calling `unsubscribe`) removes the listener,
//! which is safe even from inside a running callback.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Box<dyn FnMut(&T)>;

struct Listener<T> {
    id: u64,
    callback: Callback<T>,
}

struct Registry<T> {
    next_id: u64,
    listeners: Vec<Listener<T>>,
    /// Ids released while their listener was checked out for a notify pass
    released: HashSet<u64>,
}

/// Shared list of listeners for values of type `T`
pub struct Observers<T> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Observers<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 1,
                listeners: Vec::new(),
                released: HashSet::new(),
            })),
        }
    }

    /// Number of live listeners
    pub fn len(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call `callback` on every notification
    pub fn subscribe_all<C>(&self, callback: C) -> Subscription
    where
        C: FnMut(&T) + 'static,
    {
        self.register(Box::new(callback))
    }

    /// Call `callback` with the selected value whenever it differs from the
    /// previously seen one. `current` seeds the comparison.
    pub fn subscribe<S, F, C>(&self, current: &T, selector: F, mut callback: C) -> Subscription
    where
        S: PartialEq + 'static,
        F: Fn(&T) -> S + 'static,
        C: FnMut(&S) + 'static,
    {
        let mut previous = selector(current);
        self.register(Box::new(move |value: &T| {
            let selected = selector(value);
            if selected != previous {
                callback(&selected);
                previous = selected;
            }
        }))
    }

    /// Deliver `value` to every listener in registration order
    pub fn notify(&self, value: &T) {
        // Check the listeners out so callbacks may subscribe or unsubscribe.
        let mut active = std::mem::take(&mut self.registry.borrow_mut().listeners);

        for listener in active.iter_mut() {
            if self.registry.borrow().released.contains(&listener.id) {
                continue;
            }
            (listener.callback)(value);
        }

        let mut registry = self.registry.borrow_mut();
        let added = std::mem::take(&mut registry.listeners);
        let released = std::mem::take(&mut registry.released);
        active.retain(|l| !released.contains(&l.id));
        active.extend(added);
        registry.listeners = active;
    }

    fn register(&self, callback: Callback<T>) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push(Listener { id, callback });

        let weak: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription {
            release: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    let mut registry = registry.borrow_mut();
                    let before = registry.listeners.len();
                    registry.listeners.retain(|l| l.id != id);
                    if registry.listeners.len() == before {
                        // Not in the list: it is checked out by a notify pass.
                        registry.released.insert(id);
                    }
                }
            })),
        }
    }
}

/// Handle to a registered listener; releases it on drop
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Release the listener now
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}
