use crate::core::geo::Point;
use crate::dom::element::ElementId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

type Subscribers = Mutex<Vec<(u64, ElementId)>>;

#[derive(Debug, Default)]
struct Registry {
    next_id: AtomicU64,
    subscribers: Subscribers,
}

/// The browser window: its inner size and the elements listening for resize
#[derive(Debug, Clone)]
pub struct Window {
    size: Point,
    registry: Arc<Registry>,
}

impl Window {
    pub fn new(size: Point) -> Self {
        Self {
            size,
            registry: Arc::new(Registry::default()),
        }
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Registers `target` for resize notifications until the returned handle
    /// is dropped
    pub fn subscribe_resize(&self, target: ElementId) -> ResizeSubscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.registry.subscribers).push((id, target));
        log::debug!("resize subscription {id} registered for element {target}");

        ResizeSubscription {
            id,
            target,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Elements with a live subscription, in subscription order
    pub fn resize_targets(&self) -> Vec<ElementId> {
        lock(&self.registry.subscribers)
            .iter()
            .map(|(_, target)| *target)
            .collect()
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry.subscribers).len()
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new(Point::new(1280.0, 800.0))
    }
}

fn lock(subscribers: &Subscribers) -> std::sync::MutexGuard<'_, Vec<(u64, ElementId)>> {
    subscribers
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Live resize registration; unsubscribes when dropped
#[derive(Debug)]
pub struct ResizeSubscription {
    id: u64,
    target: ElementId,
    registry: Weak<Registry>,
}

impl ResizeSubscription {
    pub fn target(&self) -> ElementId {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.registry.upgrade().is_some_and(|registry| {
            lock(&registry.subscribers)
                .iter()
                .any(|(id, _)| *id == self.id)
        })
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry.subscribers).retain(|(id, _)| *id != self.id);
            log::debug!("resize subscription {} released", self.id);
        }
    }
}
