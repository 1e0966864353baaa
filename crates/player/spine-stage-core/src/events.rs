//! Outward notifications for hosts that mirror player properties.

use serde::{Deserialize, Serialize};

/// Change notifications emitted by the driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PlayerEvent {
    /// `false` when loading starts, `true` once the skeleton is set up.
    Loaded(bool),
    AnimationChanged(String),
    AnimationsChanged(Vec<String>),
    SkinChanged(String),
    SkinsChanged(Vec<String>),
    SpeedChanged(f32),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

type Callback = Box<dyn FnMut(&PlayerEvent)>;

/// Registered callbacks, invoked in subscription order.
#[derive(Default)]
pub struct Observers {
    next: u32,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&PlayerEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next = self.next.wrapping_add(1);
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sid, _)| *sid != id);
        self.callbacks.len() != before
    }

    pub fn emit(&mut self, event: PlayerEvent) {
        for (_, cb) in &mut self.callbacks {
            cb(&event);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emits_to_subscribers_until_unsubscribed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut obs = Observers::new();
        let sink = Rc::clone(&seen);
        let id = obs.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        obs.emit(PlayerEvent::SkinChanged("gold".into()));
        assert!(obs.unsubscribe(id));
        assert!(!obs.unsubscribe(id));
        obs.emit(PlayerEvent::SpeedChanged(2.0));
        assert_eq!(
            *seen.borrow(),
            vec![PlayerEvent::SkinChanged("gold".into())]
        );
    }
}
