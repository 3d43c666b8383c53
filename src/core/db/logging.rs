//! Pre-execution logging notifications.

/// Snapshot delivered to subscribers right before a statement runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingEvent {
    pub connection_string: Option<String>,
    pub statement: String,
}

/// Handle returned by [`crate::core::db::Connection::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&LoggingEvent)>;

/// Ordered list of logging callbacks.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, Callback)>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(sid, _)| *sid != id);
        self.callbacks.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Invokes every callback in registration order.
    pub(crate) fn notify(&mut self, event: &LoggingEvent) {
        for (_, callback) in &mut self.callbacks {
            callback(event);
        }
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.callbacks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_notify_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut subs = Subscribers::default();
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            subs.add(Box::new(move |e: &LoggingEvent| {
                seen.borrow_mut().push(format!("{}:{}", tag, e.statement))
            }));
        }

        subs.notify(&LoggingEvent {
            connection_string: None,
            statement: "SELECT 1".to_string(),
        });
        assert_eq!(*seen.borrow(), vec!["first:SELECT 1", "second:SELECT 1"]);
    }

    #[test]
    fn test_remove() {
        let mut subs = Subscribers::default();
        let id = subs.add(Box::new(|_: &LoggingEvent| {}));
        assert_eq!(subs.len(), 1);
        assert!(subs.remove(id));
        assert!(!subs.remove(id));
        assert_eq!(subs.len(), 0);
    }
}
