//! Events passed between workflow steps.

use crate::step::{StepName, END};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Read access to the payload of an event.
///
/// A missing key is `None`, never an error. Output extraction
/// ([`Output::from_payload`](crate::Output::from_payload)) reads through
/// this trait, so a plain `HashMap` of strings works there as well as an
/// [`Event`].
///
/// # Examples
///
/// ```
/// use ayumi::{Event, EventPayload};
/// use std::collections::HashMap;
///
/// let ev = Event::new("next", [("greeting", "ciao")]);
/// assert_eq!(ev.get("greeting"), Some("ciao"));
///
/// let counts: HashMap<String, u32> = HashMap::from([("hits".to_string(), 3)]);
/// assert_eq!(EventPayload::get(&counts, "hits"), Some(&3));
/// ```
pub trait EventPayload {
    /// The type of the values held in the payload.
    type Value: ?Sized;

    /// Looks up `key`, returning `None` when it is absent.
    fn get(&self, key: &str) -> Option<&Self::Value>;

    /// Returns `true` if `key` is present.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

impl<K, V> EventPayload for HashMap<K, V>
where
    K: Borrow<str> + Hash + Eq,
{
    type Value = V;

    fn get(&self, key: &str) -> Option<&V> {
        HashMap::get(self, key)
    }
}

/// The base event: the name of the step to run next plus a string payload.
///
/// Events are not mutated once built. A step reads the event it was handed
/// and returns a fresh one.
///
/// # Examples
///
/// ```
/// use ayumi::{Event, EventPayload};
///
/// let ev = Event::new("translate", [("text", "guten tag")]);
/// assert_eq!(ev.next_step(), "translate");
/// assert_eq!(ev.get("text"), Some("guten tag"));
/// assert_eq!(ev.get("missing"), None);
/// assert!(!ev.is_terminal());
///
/// assert!(Event::terminal([("output", "done")]).is_terminal());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    next_step: StepName,
    data: HashMap<String, String>,
}

impl Event {
    /// Creates an event routed to `next_step`.
    ///
    /// The name is not checked here; an unknown name is only noticed when
    /// the workflow tries to dispatch it.
    pub fn new<K, V>(next_step: impl Into<StepName>, data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            next_step: next_step.into(),
            data: data
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Creates an event routed to the terminal step.
    pub fn terminal<K, V>(data: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(END, data)
    }

    /// Creates an event with an empty payload.
    pub fn empty(next_step: impl Into<StepName>) -> Self {
        Self {
            next_step: next_step.into(),
            data: HashMap::new(),
        }
    }

    /// The step this event should be dispatched to.
    pub fn next_step(&self) -> &StepName {
        &self.next_step
    }

    /// The raw payload.
    pub fn data(&self) -> &HashMap<String, String> {
        &self.data
    }

    /// Returns `true` if this event ends the run.
    pub fn is_terminal(&self) -> bool {
        self.next_step.is_end()
    }
}

impl EventPayload for Event {
    type Value = str;

    fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}
