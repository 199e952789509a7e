//! Observers notified while a workflow runs.

use crate::event::Event;
use crate::workflow::Output;
use tracing::info;

/// Callbacks invoked by [`Engine::run_with_hooks`](crate::Engine::run_with_hooks).
///
/// For every event a step produces, `on_step_start` fires first. A
/// non-terminal event is then dispatched and `on_step_end` fires with the
/// event that came back. The terminal event gets `on_step_start` and
/// `on_output`, but no `on_step_end`.
///
/// All methods default to doing nothing.
pub trait RunHooks {
    /// Called with each event as it becomes the current one.
    fn on_step_start(&mut self, _event: &Event) {}

    /// Called with the event produced by dispatching a non-terminal event.
    fn on_step_end(&mut self, _event: &Event) {}

    /// Called once, with the output of the run.
    fn on_output(&mut self, _output: &Output) {}
}

/// Hooks that ignore everything.
impl RunHooks for () {}

/// Adapts three closures into [`RunHooks`].
///
/// # Examples
///
/// ```
/// use ayumi::{Event, FnHooks, Output, RunHooks};
///
/// let mut seen = Vec::new();
/// let mut hooks = FnHooks::new(
///     |ev: &Event| seen.push(ev.next_step().to_string()),
///     |_: &Event| {},
///     |_: Output| {},
/// );
/// hooks.on_step_start(&Event::empty("end"));
/// drop(hooks);
/// assert_eq!(seen, vec!["end".to_string()]);
/// ```
pub struct FnHooks<S, E, O> {
    on_start: S,
    on_end: E,
    on_output: O,
}

impl<S, E, O> FnHooks<S, E, O>
where
    S: FnMut(&Event),
    E: FnMut(&Event),
    O: FnMut(Output),
{
    /// Wraps the start, end and output callbacks, in that order.
    pub fn new(on_start: S, on_end: E, on_output: O) -> Self {
        Self {
            on_start,
            on_end,
            on_output,
        }
    }
}

impl<S, E, O> RunHooks for FnHooks<S, E, O>
where
    S: FnMut(&Event),
    E: FnMut(&Event),
    O: FnMut(Output),
{
    fn on_step_start(&mut self, event: &Event) {
        (self.on_start)(event)
    }

    fn on_step_end(&mut self, event: &Event) {
        (self.on_end)(event)
    }

    fn on_output(&mut self, output: &Output) {
        (self.on_output)(output.clone())
    }
}

/// Hooks that log every notification through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHooks;

impl RunHooks for TracingHooks {
    fn on_step_start(&mut self, event: &Event) {
        info!("Event for step '{}' started", event.next_step());
    }

    fn on_step_end(&mut self, event: &Event) {
        info!("Step produced event for '{}'", event.next_step());
    }

    fn on_output(&mut self, output: &Output) {
        info!("Workflow output: {}", output);
    }
}
