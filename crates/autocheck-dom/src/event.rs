//! DOM Events
//!
//! Custom events with a typed detail payload, dispatched through a chain of
//! event targets (the target first, then each ancestor while bubbling).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::NodeId;

/// Event with a detail payload of type `D`
#[derive(Debug, Clone)]
pub struct Event<D> {
    pub name: String,
    pub detail: D,
    pub target: Option<NodeId>,
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl<D> Event<D> {
    /// Create a bubbling, non-cancelable event
    pub fn new(name: impl Into<String>, detail: D) -> Self {
        Self {
            name: name.into(),
            detail,
            target: None,
            current_target: None,
            bubbles: true,
            cancelable: false,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation to ancestors. Remaining listeners on the current
    /// target still run.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Handle returned by `add_event_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback<D> = Arc<dyn Fn(&mut Event<D>) + Send + Sync>;

struct Registration<D> {
    id: ListenerId,
    event: String,
    once: bool,
    callback: Callback<D>,
}

/// A node events are dispatched on, optionally linked to a parent
pub struct EventTarget<D> {
    id: NodeId,
    parent: Option<Arc<EventTarget<D>>>,
    listeners: Mutex<Vec<Registration<D>>>,
    next_listener: AtomicU64,
}

impl<D> EventTarget<D> {
    /// Create a root target
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    /// Create a target whose events bubble to `parent`
    pub fn with_parent(parent: Option<Arc<EventTarget<D>>>) -> Self {
        Self {
            id: NodeId::next(),
            parent,
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(1),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<&Arc<EventTarget<D>>> {
        self.parent.as_ref()
    }

    /// Register a listener for events named `event`
    pub fn add_event_listener<F>(&self, event: &str, callback: F) -> ListenerId
    where
        F: Fn(&mut Event<D>) + Send + Sync + 'static,
    {
        self.register(event, false, Arc::new(callback))
    }

    /// Register a listener removed after its first invocation
    pub fn add_event_listener_once<F>(&self, event: &str, callback: F) -> ListenerId
    where
        F: Fn(&mut Event<D>) + Send + Sync + 'static,
    {
        self.register(event, true, Arc::new(callback))
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|registration| registration.id != id);
        listeners.len() != before
    }

    /// Number of listeners registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners()
            .iter()
            .filter(|registration| registration.event == event)
            .count()
    }

    /// Dispatch an event on this target and, while it bubbles, its ancestors.
    ///
    /// Returns false if a listener canceled the event. Listeners run without
    /// any internal lock held and may dispatch further events or change
    /// registrations.
    pub fn dispatch_event(&self, event: &mut Event<D>) -> bool {
        event.target = Some(self.id);
        tracing::trace!(event = %event.name, target = self.id.0, "dispatch");

        let mut node = Some(self);
        while let Some(current) = node {
            event.current_target = Some(current.id);
            for callback in current.take_callbacks(&event.name) {
                callback(event);
            }

            if event.propagation_stopped || !event.bubbles {
                break;
            }
            node = current.parent.as_deref();
        }

        event.current_target = None;
        !event.default_prevented
    }

    fn register(&self, event: &str, once: bool, callback: Callback<D>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners().push(Registration {
            id,
            event: event.to_string(),
            once,
            callback,
        });
        id
    }

    /// Snapshot the callbacks for `event`, dropping one-shot registrations
    fn take_callbacks(&self, event: &str) -> Vec<Callback<D>> {
        let mut listeners = self.listeners();
        let callbacks = listeners
            .iter()
            .filter(|registration| registration.event == event)
            .map(|registration| Arc::clone(&registration.callback))
            .collect();
        listeners.retain(|registration| !(registration.once && registration.event == event));
        callbacks
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<Registration<D>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D> Default for EventTarget<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> std::fmt::Debug for EventTarget<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTarget")
            .field("id", &self.id)
            .field("parent", &self.parent.as_ref().map(|parent| parent.id))
            .field("listeners", &self.listeners().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(target: &EventTarget<u32>, event: &str, log: &Arc<Mutex<Vec<String>>>, tag: &str) {
        let log = Arc::clone(log);
        let tag = tag.to_string();
        target.add_event_listener(event, move |e: &mut Event<u32>| {
            log.lock().unwrap().push(format!("{tag}:{}:{}", e.name, e.detail));
        });
    }

    #[test]
    fn test_event_bubbles_to_ancestors() {
        let document = Arc::new(EventTarget::<u32>::new());
        let element = EventTarget::with_parent(Some(Arc::clone(&document)));
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&element, "ping", &log, "element");
        recorder(&document, "ping", &log, "document");

        let mut event = Event::new("ping", 7);
        assert!(element.dispatch_event(&mut event));

        assert_eq!(*log.lock().unwrap(), vec!["element:ping:7", "document:ping:7"]);
        assert_eq!(event.target, Some(element.id()));
    }

    #[test]
    fn test_non_bubbling_event_stays_on_target() {
        let document = Arc::new(EventTarget::<u32>::new());
        let element = EventTarget::with_parent(Some(Arc::clone(&document)));
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&document, "ping", &log, "document");

        element.dispatch_event(&mut Event::new("ping", 1).with_bubbles(false));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_prevent_default_only_when_cancelable() {
        let target = EventTarget::<()>::new();
        target.add_event_listener("start", |e: &mut Event<()>| e.prevent_default());

        assert!(target.dispatch_event(&mut Event::new("start", ())));
        assert!(!target.dispatch_event(&mut Event::new("start", ()).with_cancelable(true)));
    }

    #[test]
    fn test_stop_propagation() {
        let document = Arc::new(EventTarget::<u32>::new());
        let element = EventTarget::with_parent(Some(Arc::clone(&document)));
        let log = Arc::new(Mutex::new(Vec::new()));
        element.add_event_listener("ping", |e: &mut Event<u32>| e.stop_propagation());
        recorder(&element, "ping", &log, "element");
        recorder(&document, "ping", &log, "document");

        element.dispatch_event(&mut Event::new("ping", 2));
        assert_eq!(*log.lock().unwrap(), vec!["element:ping:2"]);
    }

    #[test]
    fn test_remove_and_once_listeners() {
        let target = EventTarget::<u32>::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let id = target.add_event_listener("ping", |_: &mut Event<u32>| {});
        let once_log = Arc::clone(&log);
        target.add_event_listener_once("ping", move |e: &mut Event<u32>| {
            once_log.lock().unwrap().push(e.detail.to_string());
        });
        assert_eq!(target.listener_count("ping"), 2);

        target.dispatch_event(&mut Event::new("ping", 1));
        target.dispatch_event(&mut Event::new("ping", 2));
        assert_eq!(*log.lock().unwrap(), vec!["1"]);

        assert!(target.remove_event_listener(id));
        assert!(!target.remove_event_listener(id));
        assert_eq!(target.listener_count("ping"), 0);
    }

    #[test]
    fn test_listener_may_reenter_target() {
        let target = Arc::new(EventTarget::<u32>::new());
        let inner = Arc::clone(&target);
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&target, "second", &log, "t");
        target.add_event_listener("first", move |_: &mut Event<u32>| {
            inner.dispatch_event(&mut Event::new("second", 9));
        });

        target.dispatch_event(&mut Event::new("first", 0));
        assert_eq!(*log.lock().unwrap(), vec!["t:second:9"]);
    }
}
