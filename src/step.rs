use crate::event::Event;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved name of the terminal step.
///
/// An event whose next step is `END` finishes the run. No step in a
/// workflow may be registered under this name.
pub const END: &str = "end";

/// A step function: consumes the current event and the shared context,
/// produces the next event.
pub type StepFn<C> = Box<dyn Fn(&Event, &mut C) -> Event + Send + Sync>;

/// Boxes a function or closure as a [`StepFn`].
pub fn step_fn<C, F>(f: F) -> StepFn<C>
where
    F: Fn(&Event, &mut C) -> Event + Send + Sync + 'static,
{
    Box::new(f)
}

/// Type-safe step name wrapper.
///
/// # Examples
///
/// ```
/// use ayumi::StepName;
///
/// let name = StepName::new("summarize");
/// assert_eq!(name.as_str(), "summarize");
/// assert!(!name.is_end());
///
/// let end: StepName = "end".into();
/// assert!(end.is_end());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepName(String);

impl StepName {
    /// Creates a new StepName
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The terminal step name.
    pub fn end() -> Self {
        Self::new(END)
    }

    /// Returns `true` if this is the reserved terminal name.
    pub fn is_end(&self) -> bool {
        self.0 == END
    }

    /// Returns the step name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StepName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for StepName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for StepName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for StepName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StepName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Limits applied by [`Engine::run_with_limits`](crate::Engine::run_with_limits).
///
/// Plain runs are unbounded: a step table that cycles without reaching
/// [`END`] loops forever. Callers that cannot rule this out opt in to a cap
/// here.
///
/// # Examples
///
/// ```
/// use ayumi::RunLimits;
///
/// assert_eq!(RunLimits::default().max_steps, None);
/// assert_eq!(RunLimits::max_steps(100).max_steps, Some(100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunLimits {
    /// Maximum number of step dispatches, the first one included.
    /// `None` means no limit.
    pub max_steps: Option<usize>,
}

impl RunLimits {
    /// No limit at all, same as [`RunLimits::default`].
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Caps a run at `max_steps` dispatches.
    pub fn max_steps(max_steps: usize) -> Self {
        Self {
            max_steps: Some(max_steps),
        }
    }

    /// Returns `true` once `dispatched` reaches the cap.
    pub fn exhausted(&self, dispatched: usize) -> bool {
        self.max_steps.is_some_and(|max| dispatched >= max)
    }
}

/// Builds a step table from `name => function` pairs.
///
/// # Example
///
/// ```rust
/// use ayumi::prelude::*;
///
/// fn greet(_ev: &Event, _ctx: &mut Context) -> Event {
///     Event::terminal([("output", "hi")])
/// }
///
/// let table = steps! {
///     "greet" => greet,
///     "shout" => |_ev: &Event, _ctx: &mut Context| Event::terminal([("output", "HI")]),
/// };
/// assert_eq!(table.len(), 2);
/// assert!(table.contains_key("greet"));
/// ```
#[macro_export]
macro_rules! steps {
    ($($name:expr => $step:expr),* $(,)?) => {{
        let mut table = ::std::collections::HashMap::<$crate::StepName, $crate::StepFn<_>>::new();
        $(
            table.insert($crate::StepName::from($name), $crate::step_fn($step));
        )*
        table
    }};
}
