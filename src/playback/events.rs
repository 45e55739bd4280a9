//! Notifications published by the playback clock
//!
//! Consumers either register a [`PlaybackObserver`] (called synchronously
//! on the ticking thread) or take a crossbeam [`Receiver`] and drain it at
//! their own pace. Both see the same events in the same order.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::query::FrameResults;

use super::types::PlaybackState;

/// Messages sent from the playback clock to its subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A non-empty dataset was attached to the clock
    DatasetLoaded {
        sample_count: usize,
        source_count: usize,
        duration: f64,
    },

    /// Resolved positions for the current elapsed time.
    /// At most one per tick.
    Frame { elapsed: f64, results: FrameResults },

    /// Playback state transition
    StateChanged(PlaybackState),

    /// The cursor passed a timeline marker while playing
    MarkerReached { id: u32, name: String, time: f64 },
}

/// Receives playback events synchronously
pub trait PlaybackObserver {
    fn on_event(&mut self, event: &PlaybackEvent);
}

impl<F> PlaybackObserver for F
where
    F: FnMut(&PlaybackEvent),
{
    fn on_event(&mut self, event: &PlaybackEvent) {
        self(event)
    }
}

/// Subscriber list for playback events
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn PlaybackObserver>>,
    channels: Vec<Sender<PlaybackEvent>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronous observer
    pub fn subscribe(&mut self, observer: impl PlaybackObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Open a channel that receives every subsequent event
    pub fn subscribe_channel(&mut self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = unbounded();
        self.channels.push(tx);
        rx
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.observers.len() + self.channels.len()
    }

    /// Deliver an event to every subscriber
    ///
    /// Channels whose receiver was dropped are removed.
    pub fn publish(&mut self, event: PlaybackEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }

        let before = self.channels.len();
        self.channels.retain(|tx| tx.send(event.clone()).is_ok());
        if self.channels.len() < before {
            tracing::debug!(
                "Dropped {} disconnected playback channel(s)",
                before - self.channels.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_observer_and_channel_see_same_events() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe(move |e: &PlaybackEvent| sink.borrow_mut().push(e.clone()));
        let rx = bus.subscribe_channel();

        bus.publish(PlaybackEvent::StateChanged(PlaybackState::Playing));
        bus.publish(PlaybackEvent::StateChanged(PlaybackState::Paused));

        let from_channel: Vec<_> = rx.try_iter().collect();
        assert_eq!(*seen.borrow(), from_channel);
        assert_eq!(from_channel.len(), 2);
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe_channel();
        assert_eq!(bus.subscriber_count(), 1);

        drop(rx);
        bus.publish(PlaybackEvent::StateChanged(PlaybackState::Stopped));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
