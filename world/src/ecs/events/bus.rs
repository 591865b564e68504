//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Event bus implementation
//!
//! Events are queued with `publish` and delivered when the game loop calls
//! `process_events`, never synchronously. Two kinds of consumers exist:
//! - observers (`subscribe`) see every event
//! - one-shot listeners (`listen_once`) are owned by the bus until their
//!   signal fires or they are withdrawn, and are consumed on delivery

use super::types::{GameEvent, Signal};
use crate::ecs::GameWorld;
use crate::presentation::Presentation;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

pub type EventHandler = Box<dyn Fn(&GameEvent)>;

/// Shared handle to the pending event queue
///
/// Collaborators that raise events outside the bus (a UI layer, the
/// presentation) hold a clone and publish through it.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Arc<Mutex<VecDeque<GameEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next `process_events`
    pub fn publish(&self, event: GameEvent) {
        self.events.lock().push_back(event);
    }

    fn pop(&self) -> Option<GameEvent> {
        self.events.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

/// Registration token returned by `EventBus::listen_once`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Why a listener was withdrawn before its signal fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Withdrawal {
    Cancelled,
    TimedOut,
}

/// World access handed to a listener while it runs
pub struct ListenerScope<'a> {
    pub entities: &'a mut GameWorld,
    pub events: &'a EventQueue,
    pub presentation: &'a mut dyn Presentation,
}

/// One-shot consumer of a signal
///
/// Both hooks take the listener by value, so a registration can only ever
/// run one of them, once.
pub trait Listener {
    /// The signal fired
    fn on_signal(self: Box<Self>, scope: ListenerScope<'_>, event: &GameEvent);

    /// The registration was withdrawn before the signal fired
    fn on_withdraw(self: Box<Self>, scope: ListenerScope<'_>, reason: Withdrawal) {
        let _ = (scope, reason);
    }
}

/// Event bus for publishing and subscribing to game events
#[derive(Default)]
pub struct EventBus {
    queue: EventQueue,
    observers: Vec<EventHandler>,
    listeners: HashMap<Signal, Vec<(ListenerId, Box<dyn Listener>)>>,
    signals: HashMap<ListenerId, Signal>,
    next_listener: u64,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for publishing into this bus's queue
    pub fn publisher(&self) -> EventQueue {
        self.queue.clone()
    }

    /// Subscribe to all events with a handler function
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: Fn(&GameEvent) + 'static,
    {
        self.observers.push(Box::new(handler));
    }

    /// Register a listener for exactly one firing of `signal`
    pub fn listen_once(&mut self, signal: Signal, listener: Box<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;

        self.listeners
            .entry(signal)
            .or_default()
            .push((id, listener));
        self.signals.insert(id, signal);
        tracing::trace!("Listener {:?} registered for {}", id, signal);
        id
    }

    /// Remove a registration, handing the listener back to the caller.
    /// Returns `None` if it already fired or was removed.
    pub fn unlisten(&mut self, id: ListenerId) -> Option<Box<dyn Listener>> {
        let signal = self.signals.remove(&id)?;
        let registrations = self.listeners.get_mut(&signal)?;
        let index = registrations.iter().position(|(other, _)| *other == id)?;
        let (_, listener) = registrations.remove(index);
        if registrations.is_empty() {
            self.listeners.remove(&signal);
        }
        Some(listener)
    }

    fn take_listeners(&mut self, signal: Signal) -> Vec<Box<dyn Listener>> {
        let registrations = self.listeners.remove(&signal).unwrap_or_default();
        registrations
            .into_iter()
            .map(|(id, listener)| {
                self.signals.remove(&id);
                listener
            })
            .collect()
    }

    /// Whether the registration is still waiting for its signal
    pub fn is_listening(&self, id: ListenerId) -> bool {
        self.signals.contains_key(&id)
    }

    /// Number of pending one-shot registrations
    pub fn listener_count(&self) -> usize {
        self.signals.len()
    }

    /// Publish an event to the queue
    pub fn publish(&self, event: GameEvent) {
        self.queue.publish(event);
    }

    /// Deliver all queued events, including those raised while delivering.
    /// Returns the delivered events in order.
    pub fn process_events(
        &mut self,
        entities: &mut GameWorld,
        presentation: &mut dyn Presentation,
    ) -> Vec<GameEvent> {
        let mut processed = Vec::new();

        while let Some(event) = self.queue.pop() {
            for handler in self.observers.iter() {
                handler(&event);
            }

            if let Some(signal) = event.signal() {
                let listeners = self.take_listeners(signal);
                if listeners.is_empty() {
                    tracing::debug!("No listener waiting on {}, ignoring", signal);
                }
                for listener in listeners {
                    let scope = ListenerScope {
                        entities: &mut *entities,
                        events: &self.queue,
                        presentation: &mut *presentation,
                    };
                    listener.on_signal(scope, &event);
                }
            }

            processed.push(event);
        }

        processed
    }

    /// Clear all queued events without processing
    pub fn clear(&self) {
        self.queue.clear();
    }

    /// Get the number of queued events
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::{DialogId, HeadlessPresentation};
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingListener {
        fired: Rc<Cell<usize>>,
        withdrawn: Rc<Cell<usize>>,
    }

    impl Listener for CountingListener {
        fn on_signal(self: Box<Self>, _scope: ListenerScope<'_>, _event: &GameEvent) {
            self.fired.set(self.fired.get() + 1);
        }

        fn on_withdraw(self: Box<Self>, _scope: ListenerScope<'_>, _reason: Withdrawal) {
            self.withdrawn.set(self.withdrawn.get() + 1);
        }
    }

    fn counting() -> (Box<CountingListener>, Rc<Cell<usize>>) {
        let fired = Rc::new(Cell::new(0));
        let listener = Box::new(CountingListener {
            fired: Rc::clone(&fired),
            withdrawn: Rc::new(Cell::new(0)),
        });
        (listener, fired)
    }

    fn finished(signal: Signal) -> GameEvent {
        GameEvent::DialogFinished {
            dialog: DialogId::new(),
            signal,
        }
    }

    #[test]
    fn test_event_bus() {
        let mut bus = EventBus::new();
        let counter = Rc::new(Cell::new(0));
        let counter_clone = Rc::clone(&counter);

        bus.subscribe(move |_event| {
            counter_clone.set(counter_clone.get() + 1);
        });

        bus.publish(GameEvent::Custom {
            event_type: "test".into(),
            data: "data".into(),
        });

        assert_eq!(bus.queue_len(), 1);

        let mut world = GameWorld::new();
        let mut presentation = HeadlessPresentation::default();
        let processed = bus.process_events(&mut world, &mut presentation);

        assert_eq!(processed.len(), 1);
        assert_eq!(counter.get(), 1);
        assert_eq!(bus.queue_len(), 0);
    }

    #[test]
    fn test_listener_fires_once() {
        let mut bus = EventBus::new();
        let signal = Signal::new();
        let (listener, fired) = counting();
        let id = bus.listen_once(signal, listener);
        assert!(bus.is_listening(id));

        bus.publish(finished(signal));
        bus.publish(finished(signal));

        let mut world = GameWorld::new();
        let mut presentation = HeadlessPresentation::default();
        let processed = bus.process_events(&mut world, &mut presentation);

        assert_eq!(processed.len(), 2);
        assert_eq!(fired.get(), 1);
        assert!(!bus.is_listening(id));
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_unrelated_signal_does_not_fire() {
        let mut bus = EventBus::new();
        let (listener, fired) = counting();
        let id = bus.listen_once(Signal::new(), listener);

        bus.publish(finished(Signal::new()));

        let mut world = GameWorld::new();
        let mut presentation = HeadlessPresentation::default();
        bus.process_events(&mut world, &mut presentation);

        assert_eq!(fired.get(), 0);
        assert!(bus.is_listening(id));
    }

    #[test]
    fn test_unlisten_returns_listener() {
        let mut bus = EventBus::new();
        let signal = Signal::new();
        let (listener, fired) = counting();
        let id = bus.listen_once(signal, listener);

        assert!(bus.unlisten(id).is_some());
        assert!(bus.unlisten(id).is_none());

        bus.publish(finished(signal));
        let mut world = GameWorld::new();
        let mut presentation = HeadlessPresentation::default();
        bus.process_events(&mut world, &mut presentation);

        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn test_clear() {
        let bus = EventBus::new();

        bus.publisher().publish(GameEvent::Custom {
            event_type: "test".into(),
            data: "data".into(),
        });

        assert_eq!(bus.queue_len(), 1);
        bus.clear();
        assert_eq!(bus.queue_len(), 0);
    }
}
