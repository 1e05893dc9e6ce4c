//! Combat notifications and the publish/subscribe bus that carries them
//!
//! The bus is synchronous: `publish` runs every subscriber inline, in
//! subscription order, before returning. It is meant to be driven from the
//! single simulation thread; the internal locks only make the handle safe to
//! store in components and statics, they do not make cross-thread delivery
//! ordering meaningful.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use glam::Vec2;
use parking_lot::Mutex;
use skirmish_scene::Entity;
use tracing::warn;

use crate::damage::DamageInfo;

/// Notifications consumed by presentation, AI and UI layers
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    /// A hit resolved against `target` for `amount` final damage
    DamageReceived {
        info: DamageInfo,
        target: Entity,
        amount: f32,
    },
    /// `target`'s health changed (damage or heal)
    HealthChanged {
        target: Entity,
        current: f32,
        max: f32,
    },
    /// `target` transitioned to dead. Published exactly once per receiver.
    EntityDied { target: Entity },
}

impl CombatEvent {
    /// The entity this event is about
    pub fn target(&self) -> Entity {
        match self {
            Self::DamageReceived { target, .. }
            | Self::HealthChanged { target, .. }
            | Self::EntityDied { target } => *target,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::DamageReceived { .. } => "damage_received",
            Self::HealthChanged { .. } => "health_changed",
            Self::EntityDied { .. } => "entity_died",
        }
    }
}

/// Presentation requests emitted alongside combat events.
///
/// These never go through the bus; the world queues them and presentation
/// drains them once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackCue {
    /// Play a hurt effect where a hit landed
    Hurt { target: Entity, point: Vec2 },
    /// Play a death effect for `target`, whose `owner` is about to be destroyed
    Death { target: Entity, owner: Entity },
    /// A loot drop spawned
    Loot {
        drop: Entity,
        item: String,
        position: Vec2,
    },
}

type Handler = Arc<Mutex<dyn FnMut(&CombatEvent) + Send>>;

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<(u64, Handler)>>,
}

/// Cloneable handle to a publish/subscribe channel for combat events.
///
/// Clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct CombatEventBus {
    inner: Arc<BusInner>,
}

impl CombatEventBus {
    /// A fresh, private bus
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide bus. Created on first use and never torn down.
    pub fn global() -> &'static CombatEventBus {
        static GLOBAL: OnceLock<CombatEventBus> = OnceLock::new();
        GLOBAL.get_or_init(CombatEventBus::new)
    }

    /// Register `handler`. It stays registered until the returned guard is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&CombatEvent) + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let handler: Handler = Arc::new(Mutex::new(handler));
        self.inner.subscribers.lock().push((id, handler));
        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver `event` to every current subscriber, inline.
    ///
    /// A subscriber that publishes from inside its own handler does not see
    /// the nested event; the nested delivery to it is skipped and logged.
    pub fn publish(&self, event: &CombatEvent) {
        let handlers: Vec<Handler> = self
            .inner
            .subscribers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            match handler.try_lock() {
                Some(mut handler) => (*handler)(event),
                None => warn!(
                    event = event.kind(),
                    entity = %event.target(),
                    "skipping re-entrant delivery to a busy subscriber"
                ),
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

impl std::fmt::Debug for CombatEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombatEventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Scoped registration on a [`CombatEventBus`]. Unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    bus: Weak<BusInner>,
    id: u64,
}

impl Subscription {
    /// Unsubscribe now. Equivalent to dropping the guard.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.subscribers.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn died(index: u32) -> CombatEvent {
        CombatEvent::EntityDied {
            target: Entity::from_raw(index, 0),
        }
    }

    #[test]
    fn test_publish_reaches_subscribers_in_order() {
        let bus = CombatEventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first_log = Arc::clone(&log);
        let _first = bus.subscribe(move |e| first_log.lock().push(("first", e.target().index())));
        let second_log = Arc::clone(&log);
        let _second = bus.subscribe(move |e| second_log.lock().push(("second", e.target().index())));

        bus.publish(&died(7));
        assert_eq!(*log.lock(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_dropping_subscription_unsubscribes() {
        let bus = CombatEventBus::new();
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        bus.publish(&died(1));
        assert_eq!(bus.subscriber_count(), 1);

        drop(sub);
        bus.publish(&died(1));
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_subscription_outliving_bus_is_harmless() {
        let bus = CombatEventBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        sub.cancel();
    }

    #[test]
    fn test_clones_share_subscribers() {
        let bus = CombatEventBus::new();
        let clone = bus.clone();
        let hits = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&hits);
        let _sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });
        clone.publish(&died(2));
        assert_eq!(hits.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_reentrant_publish_does_not_deadlock() {
        let bus = CombatEventBus::new();
        let inner_bus = bus.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_handler = Arc::clone(&seen);
        let _sub = bus.subscribe(move |e| {
            seen_in_handler.lock().push(e.target().index());
            if e.target().index() == 1 {
                inner_bus.publish(&died(2));
            }
        });

        bus.publish(&died(1));
        // The nested event was skipped for the busy subscriber
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn test_global_is_shared() {
        let a = CombatEventBus::global() as *const CombatEventBus;
        let b = CombatEventBus::global() as *const CombatEventBus;
        assert_eq!(a, b);
    }
}
