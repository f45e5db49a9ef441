//! Signal/slot event emitter.
//!
//! Subscriptions return an opaque handle; releasing the handle removes the
//! listener. Every handle is owned by exactly one parent object, which must
//! release it on disposal. Listeners fire synchronously, in subscription
//! order, during the emitting call.

/// Handle returned by [`Emitter::on`]; pass to [`Emitter::off`] to remove
/// the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle(usize);

/// A synchronous multi-listener event emitter.
pub struct Emitter<T> {
    listeners: Vec<Option<Box<dyn FnMut(&T)>>>,
}

impl<T> Emitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener, returning its handle.
    pub fn on(&mut self, listener: impl FnMut(&T) + 'static) -> ListenerHandle {
        // Reuse a released slot when one exists
        for (idx, slot) in self.listeners.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(Box::new(listener));
                return ListenerHandle(idx);
            }
        }
        self.listeners.push(Some(Box::new(listener)));
        ListenerHandle(self.listeners.len() - 1)
    }

    /// Remove a listener. Releasing an already-released handle is a no-op.
    pub fn off(&mut self, handle: ListenerHandle) {
        if let Some(slot) = self.listeners.get_mut(handle.0) {
            *slot = None;
        }
    }

    /// Fire all current listeners with `event`.
    pub fn emit(&mut self, event: &T) {
        for slot in self.listeners.iter_mut() {
            if let Some(listener) = slot {
                listener(event);
            }
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|l| l.is_some()).count()
    }
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}
