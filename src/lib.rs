//! # Ayumi (歩み)
//!
//! A minimal event-driven workflow engine for Rust.
//!
//! "Ayumi" (歩み) means "steps" or "a walk" in Japanese: a run walks from
//! one step to the next, each step deciding where to go by the event it
//! returns.
//!
//! ## Model
//!
//! - **[`Event`]**: the name of the next step plus a small string payload
//! - **[`Context`]**: storage shared by every step of a run, split into a
//!   persistent store and a state that is replaced wholesale
//! - **[`Workflow`]**: a table of named step functions and the step to
//!   start from
//!
//! A run dispatches the first step, then whatever step each returned event
//! names, until an event names [`END`]. The output is read from that final
//! event's `"output"` entry.
//!
//! ## Quick Start
//!
//! ```rust
//! use ayumi::prelude::*;
//!
//! let workflow = Workflow::builder()
//!     .add_step("fetch", |_ev: &Event, ctx: &mut Context| {
//!         ctx.store_value("raw", "sample data".to_string());
//!         Event::new("summarize", [("source", "memory")])
//!     })
//!     .add_step("summarize", |ev: &Event, ctx: &mut Context| {
//!         let raw = ctx.get_value::<String>("raw").cloned().unwrap_or_default();
//!         let source = ev.get("source").unwrap_or("unknown");
//!         Event::terminal([("output", format!("{} from {}", raw, source))])
//!     })
//!     .start_with("fetch")
//!     .build()
//!     .expect("valid workflow");
//!
//! workflow.validate().expect("no reserved step names");
//!
//! let mut output = None;
//! workflow.run(
//!     Event::empty("fetch"),
//!     &mut Context::default(),
//!     |ev| println!("now at {}", ev.next_step()),
//!     |ev| println!("step produced {:?}", ev),
//!     |out| output = Some(out),
//! );
//!
//! assert_eq!(output, Some(Output::Produced("sample data from memory".to_string())));
//! ```
//!
//! ## Failure Handling
//!
//! Only [`Engine::validate`] reports an error. Everything that goes wrong
//! during a run ends up in the output instead:
//!
//! ```rust
//! use ayumi::prelude::*;
//!
//! let workflow = Workflow::builder()
//!     .add_step("start", |_ev: &Event, _ctx: &mut Context| Event::empty("typo"))
//!     .start_with("start")
//!     .build()
//!     .expect("valid workflow");
//!
//! let mut output = String::new();
//! workflow.run(
//!     Event::empty("start"),
//!     &mut Context::default(),
//!     |_| {},
//!     |_| {},
//!     |out| output = out.into_string(),
//! );
//!
//! assert_eq!(
//!     output,
//!     "There was an error while executing step typo: the step does not exist"
//! );
//! ```
//!
//! ## Bounded Runs
//!
//! ```rust
//! use ayumi::prelude::*;
//!
//! let workflow = Workflow::new(
//!     "ping",
//!     Context::default(),
//!     steps! {
//!         "ping" => |_ev: &Event, _ctx: &mut Context| Event::empty("pong"),
//!         "pong" => |_ev: &Event, _ctx: &mut Context| Event::empty("ping"),
//!     },
//! );
//!
//! let result = workflow.run_with_limits(
//!     Event::empty("ping"),
//!     &mut Context::default(),
//!     RunLimits::max_steps(10),
//!     &mut TracingHooks,
//! );
//! assert!(matches!(result, Err(WorkflowError::StepLimitExceeded { limit: 10, .. })));
//! ```

mod context;
mod error;
mod event;
mod hooks;
mod step;
mod workflow;

pub mod prelude;

pub use context::{Context, ContextKey, ContextStore, ValueMap};
pub use error::WorkflowError;
pub use event::{Event, EventPayload};
pub use hooks::{FnHooks, RunHooks, TracingHooks};
pub use step::{step_fn, RunLimits, StepFn, StepName, END};
pub use workflow::{Engine, Output, Workflow, WorkflowBuilder, OUTPUT_KEY};
