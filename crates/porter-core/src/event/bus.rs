// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Box<dyn FnMut(&T) + Send>;

/// Dispatches events of type `T` to registered listeners, synchronously.
///
/// This EventBus is generic over the event type `T`, which keeps `porter-core`
/// decoupled from the events higher-level crates define.
pub struct EventBus<T: 'static> {
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_id: u64,
}

impl<T: 'static> EventBus<T> {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Registers `listener`. Listeners run in subscription order.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Calls every listener with `event`.
    pub fn publish(&mut self, event: &T) {
        log::trace!("Publishing an event to {} listener(s).", self.listeners.len());
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<T: 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Resized { width: u32, height: u32 },
        Shutdown,
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (log.clone(), log)
    }

    #[test]
    fn event_bus_creation() {
        let bus = EventBus::<TestEvent>::new();
        assert!(bus.is_empty());
    }

    #[test]
    fn listeners_run_in_subscription_order() {
        let mut bus = EventBus::<TestEvent>::new();
        let (a, seen) = recorder();
        let b = a.clone();
        bus.subscribe(move |e| a.lock().unwrap().push(format!("first {e:?}")));
        bus.subscribe(move |e| b.lock().unwrap().push(format!("second {e:?}")));

        bus.publish(&TestEvent::Shutdown);

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first Shutdown".to_string(), "second Shutdown".to_string()]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::<TestEvent>::new();
        let (a, seen) = recorder();
        let id = bus.subscribe(move |e| a.lock().unwrap().push(format!("{e:?}")));

        bus.publish(&TestEvent::Resized {
            width: 1,
            height: 1,
        });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&TestEvent::Shutdown);

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn clear_detaches_everyone() {
        let mut bus = EventBus::<TestEvent>::new();
        bus.subscribe(|_| {});
        bus.subscribe(|_| {});
        assert_eq!(bus.len(), 2);
        bus.clear();
        assert!(bus.is_empty());
    }
}
