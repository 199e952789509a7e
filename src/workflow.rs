//! Workflow engine for executing steps.

use crate::context::{Context, ContextStore};
use crate::error::WorkflowError;
use crate::event::{Event, EventPayload};
use crate::hooks::{FnHooks, RunHooks};
use crate::step::{step_fn, RunLimits, StepFn, StepName};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Payload key the output of a run is read from.
pub const OUTPUT_KEY: &str = "output";

/// What a run produced.
///
/// The anomalies a run can hit are values here rather than errors: a
/// terminal event without an [`OUTPUT_KEY`] entry is [`Output::NoOutput`],
/// and asking a non-terminal event for output is [`Output::NotTerminal`].
/// A dispatch to a step that does not exist ends the run with a
/// [`Output::Produced`] message naming the step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// The terminal event's `output` value.
    Produced(String),
    /// The terminal event carried no `output`.
    NoOutput,
    /// The event was not a terminal event.
    NotTerminal,
}

impl Output {
    /// The output as the string delivered to callers.
    ///
    /// ```
    /// use ayumi::Output;
    ///
    /// assert_eq!(Output::Produced("hi".into()).as_str(), "hi");
    /// assert_eq!(Output::NoOutput.as_str(), "No output produced");
    /// assert_eq!(Output::NotTerminal.as_str(), "Not an output step");
    /// ```
    pub fn as_str(&self) -> &str {
        match self {
            Output::Produced(value) => value,
            Output::NoOutput => "No output produced",
            Output::NotTerminal => "Not an output step",
        }
    }

    /// Reads the [`OUTPUT_KEY`] entry of a terminal payload.
    ///
    /// Works on anything readable as string values, not only [`Event`].
    /// Callers check that the payload came from a terminal event first.
    ///
    /// ```
    /// use ayumi::Output;
    /// use std::collections::HashMap;
    ///
    /// let payload = HashMap::from([("output".to_string(), "hi".to_string())]);
    /// assert_eq!(Output::from_payload(&payload), "hi");
    /// assert_eq!(Output::from_payload(&HashMap::<String, String>::new()), Output::NoOutput);
    /// ```
    pub fn from_payload<P, V>(payload: &P) -> Self
    where
        P: EventPayload<Value = V> + ?Sized,
        V: AsRef<str> + ?Sized,
    {
        match payload.get(OUTPUT_KEY) {
            Some(value) => Output::Produced(value.as_ref().to_string()),
            None => Output::NoOutput,
        }
    }

    /// Returns `true` if a terminal event supplied the value.
    pub fn is_produced(&self) -> bool {
        matches!(self, Output::Produced(_))
    }

    /// Converts into the string delivered to callers.
    pub fn into_string(self) -> String {
        match self {
            Output::Produced(value) => value,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for Output {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Output {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl From<Output> for String {
    fn from(output: Output) -> Self {
        output.into_string()
    }
}

/// An event-driven workflow.
///
/// Implementors provide single-step dispatch and output extraction; the
/// run loop is shared. A run dispatches the first step, then keeps
/// dispatching whatever step the latest event names until an event names
/// [`END`](crate::END).
///
/// Runs are not bounded. A step graph that never reaches the end loops
/// forever unless the run goes through [`Engine::run_with_limits`].
pub trait Engine {
    /// The context threaded through every step.
    type Context: ContextStore;

    /// The step a run starts from.
    fn first_step(&self) -> &StepName;

    /// Checks that no step uses the reserved terminal name.
    ///
    /// Runs do not call this; callers decide whether to validate first.
    fn validate(&self) -> Result<(), WorkflowError>;

    /// Runs the step named `step` once.
    ///
    /// An unknown name never fails: it yields a terminal event whose
    /// output explains which step was missing.
    fn take_step(&self, step: &str, event: &Event, ctx: &mut Self::Context) -> Event;

    /// Extracts the output from a terminal event.
    fn output(&self, event: &Event, ctx: &Self::Context) -> Output;

    /// Runs to completion, reporting progress to `hooks`.
    ///
    /// `on_step_start` sees every event, the terminal one included.
    /// `on_step_end` only sees events produced by dispatching a
    /// non-terminal event, so it never fires for the first event or for
    /// the final transition into `on_output`.
    fn run_with_hooks<H>(&self, input: Event, ctx: &mut Self::Context, hooks: &mut H)
    where
        H: RunHooks + ?Sized,
    {
        let mut event = self.take_step(self.first_step().as_str(), &input, ctx);
        loop {
            hooks.on_step_start(&event);
            if event.is_terminal() {
                let output = self.output(&event, ctx);
                info!("Workflow reached '{}'", event.next_step());
                hooks.on_output(&output);
                break;
            }
            event = self.take_step(event.next_step().as_str(), &event, ctx);
            hooks.on_step_end(&event);
        }
    }

    /// Runs to completion with three plain callbacks.
    fn run<S, E, O>(
        &self,
        input: Event,
        ctx: &mut Self::Context,
        on_step_start: S,
        on_step_end: E,
        on_output: O,
    ) where
        S: FnMut(&Event),
        E: FnMut(&Event),
        O: FnMut(Output),
    {
        let mut hooks = FnHooks::new(on_step_start, on_step_end, on_output);
        self.run_with_hooks(input, ctx, &mut hooks);
    }

    /// Like [`Engine::run_with_hooks`], but stops once `limits` is hit.
    ///
    /// Every dispatch counts, the first one included. When the cap is
    /// reached on a non-terminal event the run stops before dispatching it
    /// and returns [`WorkflowError::StepLimitExceeded`]. Unbounded limits
    /// behave exactly like an ordinary run.
    fn run_with_limits<H>(
        &self,
        input: Event,
        ctx: &mut Self::Context,
        limits: RunLimits,
        hooks: &mut H,
    ) -> Result<(), WorkflowError>
    where
        H: RunHooks + ?Sized,
    {
        let mut event = self.take_step(self.first_step().as_str(), &input, ctx);
        let mut dispatched = 1;
        loop {
            hooks.on_step_start(&event);
            if event.is_terminal() {
                let output = self.output(&event, ctx);
                info!(
                    "Workflow reached '{}' after {} steps",
                    event.next_step(),
                    dispatched
                );
                hooks.on_output(&output);
                return Ok(());
            }
            if let Some(limit) = limits.max_steps.filter(|_| limits.exhausted(dispatched)) {
                warn!(
                    "Workflow stopped after {} steps before dispatching '{}'",
                    dispatched,
                    event.next_step()
                );
                return Err(WorkflowError::StepLimitExceeded {
                    limit,
                    last_step: event.next_step().clone(),
                });
            }
            event = self.take_step(event.next_step().as_str(), &event, ctx);
            dispatched += 1;
            hooks.on_step_end(&event);
        }
    }
}

/// The base workflow: a table of step functions plus the step to start from.
///
/// # Examples
///
/// ```
/// use ayumi::prelude::*;
///
/// let workflow = Workflow::builder()
///     .add_step("greet", |ev: &Event, _ctx: &mut Context| {
///         let name = ev.get("name").unwrap_or("world");
///         Event::terminal([("output", format!("hello {}", name))])
///     })
///     .start_with("greet")
///     .build()
///     .expect("valid workflow");
///
/// assert!(workflow.validate().is_ok());
///
/// let mut outputs = Vec::new();
/// let mut ctx = Context::default();
/// workflow.run(
///     Event::new("greet", [("name", "ayumi")]),
///     &mut ctx,
///     |_| {},
///     |_| {},
///     |out| outputs.push(out),
/// );
/// assert_eq!(outputs, vec!["hello ayumi"]);
/// ```
pub struct Workflow<C = Context> {
    first_step: StepName,
    context: C,
    steps: HashMap<StepName, StepFn<C>>,
}

impl<C> fmt::Debug for Workflow<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .field("first_step", &self.first_step)
            .finish()
    }
}

impl Workflow<Context> {
    /// Creates a builder for a workflow over the base [`Context`].
    ///
    /// Use [`WorkflowBuilder::new`] for other context types.
    pub fn builder() -> WorkflowBuilder<Context> {
        WorkflowBuilder::new()
    }
}

impl<C: ContextStore> Workflow<C> {
    /// Creates a workflow from a ready-made step table. Nothing is checked;
    /// see [`Engine::validate`].
    pub fn new(
        first_step: impl Into<StepName>,
        context: C,
        steps: HashMap<StepName, StepFn<C>>,
    ) -> Self {
        Self {
            first_step: first_step.into(),
            context,
            steps,
        }
    }

    /// The context this workflow was built with.
    pub fn default_context(&self) -> &C {
        &self.context
    }

    /// Mutable access to the context this workflow was built with.
    pub fn default_context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Returns an iterator over all registered step names.
    pub fn step_names(&self) -> impl Iterator<Item = &StepName> {
        self.steps.keys()
    }

    /// Returns `true` if a step with the given name exists.
    pub fn has_step(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Returns the number of registered steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

impl<C: ContextStore + Default> Workflow<C> {
    /// Runs against the workflow's own context instead of a caller-supplied one.
    pub fn run_in_default_context<H>(&mut self, input: Event, hooks: &mut H)
    where
        H: RunHooks + ?Sized,
    {
        let mut ctx = std::mem::take(&mut self.context);
        self.run_with_hooks(input, &mut ctx, hooks);
        self.context = ctx;
    }
}

impl<C: ContextStore> Engine for Workflow<C> {
    type Context = C;

    fn first_step(&self) -> &StepName {
        &self.first_step
    }

    fn validate(&self) -> Result<(), WorkflowError> {
        match self.steps.keys().find(|name| name.is_end()) {
            Some(name) => Err(WorkflowError::ReservedStepName(name.clone())),
            None => Ok(()),
        }
    }

    fn take_step(&self, step: &str, event: &Event, ctx: &mut C) -> Event {
        match self.steps.get(step) {
            Some(f) => {
                debug!("Dispatching step '{}'", step);
                f(event, ctx)
            }
            None => {
                warn!("Step '{}' does not exist, ending workflow", step);
                Event::terminal([(
                    OUTPUT_KEY.to_string(),
                    format!(
                        "There was an error while executing step {}: the step does not exist",
                        step
                    ),
                )])
            }
        }
    }

    fn output(&self, event: &Event, _ctx: &C) -> Output {
        if !event.is_terminal() {
            return Output::NotTerminal;
        }
        Output::from_payload(event)
    }
}

/// Builder for constructing [`Workflow`] instances.
pub struct WorkflowBuilder<C = Context> {
    steps: HashMap<StepName, StepFn<C>>,
    start_step: Option<StepName>,
    context: Option<C>,
}

impl<C> Default for WorkflowBuilder<C> {
    fn default() -> Self {
        Self {
            steps: HashMap::new(),
            start_step: None,
            context: None,
        }
    }
}

impl<C: ContextStore> WorkflowBuilder<C> {
    /// Creates a new empty workflow builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a step under `name`, replacing any step already there.
    pub fn add_step<F>(mut self, name: impl Into<StepName>, step: F) -> Self
    where
        F: Fn(&Event, &mut C) -> Event + Send + Sync + 'static,
    {
        self.steps.insert(name.into(), step_fn(step));
        self
    }

    /// Adds every step of a ready-made table.
    pub fn add_steps(mut self, steps: HashMap<StepName, StepFn<C>>) -> Self {
        self.steps.extend(steps);
        self
    }

    /// Sets the start step by name.
    pub fn start_with(mut self, step_name: impl Into<StepName>) -> Self {
        self.start_step = Some(step_name.into());
        self
    }

    /// Sets the workflow's default context.
    pub fn context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }

    /// Builds the workflow.
    ///
    /// Only a missing start step is rejected. The step table is not
    /// validated here, and the start step does not have to exist.
    pub fn build(self) -> Result<Workflow<C>, WorkflowError>
    where
        C: Default,
    {
        let first_step = self.start_step.ok_or_else(|| {
            WorkflowError::Configuration("Start step must be specified".to_string())
        })?;

        Ok(Workflow::new(
            first_step,
            self.context.unwrap_or_default(),
            self.steps,
        ))
    }
}
