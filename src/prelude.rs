//! Commonly used types and traits

pub use crate::context::{Context, ContextStore, ValueMap};
pub use crate::error::WorkflowError;
pub use crate::event::{Event, EventPayload};
pub use crate::hooks::{RunHooks, TracingHooks};
pub use crate::step::{RunLimits, StepName, END};
pub use crate::steps;
pub use crate::workflow::{Engine, Output, Workflow};
