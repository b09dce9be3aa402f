//! Topic namespace for one vehicle

use charger_core::Signal;

/// Maps between full transport topics and signals
///
/// Topics are `{prefix}{car}/{suffix}`, e.g. `teslamate/cars/1/geofence`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    base: String,
}

impl Topics {
    pub fn new(prefix: &str, car: &str) -> Self {
        Self {
            base: format!("{}{}/", prefix, car),
        }
    }

    /// Full topic for a signal
    pub fn topic(&self, signal: Signal) -> String {
        format!("{}{}", self.base, signal.topic_suffix())
    }

    /// Every subscribed topic paired with its signal
    pub fn all(&self) -> impl Iterator<Item = (Signal, String)> + '_ {
        Signal::ALL.into_iter().map(|s| (s, self.topic(s)))
    }

    /// Signal for a full topic, if it is in this namespace
    pub fn signal(&self, topic: &str) -> Option<Signal> {
        topic
            .strip_prefix(&self.base)
            .and_then(Signal::from_topic_suffix)
    }
}
