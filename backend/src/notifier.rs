use tokio::sync::broadcast;
use tracing::trace;

/// Payload-free signal that election data changed. Subscribers re-fetch
/// instead of trusting anything carried with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectionsChanged;

/// Fan-out of change signals to whoever is listening (event streams, tests).
/// Sending never blocks and never fails the write that triggered it.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ElectionsChanged>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ElectionsChanged> {
        self.sender.subscribe()
    }

    pub fn elections_changed(&self) {
        match self.sender.send(ElectionsChanged) {
            Ok(receivers) => trace!("Change notification delivered to {} subscribers", receivers),
            Err(_) => trace!("Change notification dropped, no subscribers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn notifies_every_subscriber() {
        let notifier = ChangeNotifier::new(4);
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();
        notifier.elections_changed();
        assert_eq!(a.try_recv(), Ok(ElectionsChanged));
        assert_eq!(b.try_recv(), Ok(ElectionsChanged));
        assert_eq!(a.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn sending_without_subscribers_is_harmless() {
        let notifier = ChangeNotifier::new(1);
        notifier.elections_changed();
        let mut late = notifier.subscribe();
        assert_eq!(late.try_recv(), Err(TryRecvError::Empty));
    }
}
