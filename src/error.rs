use crate::step::StepName;
use thiserror::Error;

/// Errors surfaced to the caller.
///
/// Problems found while a run is in progress (a step that does not exist,
/// a terminal event without output) are not errors: they come back through
/// the output channel as descriptive strings. Only structural problems and
/// an exhausted opt-in [`RunLimits`](crate::RunLimits) show up here.
///
/// # Non-Exhaustive
///
/// Always include a wildcard arm when matching:
///
/// ```
/// use ayumi::WorkflowError;
///
/// fn describe(error: &WorkflowError) -> String {
///     match error {
///         WorkflowError::ReservedStepName(name) => format!("rename step {}", name),
///         WorkflowError::StepLimitExceeded { limit, .. } => format!("gave up after {}", limit),
///         _ => error.to_string(),
///     }
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WorkflowError {
    /// A step was registered under the reserved terminal name.
    #[error("`{0}` is a reserved keyword, you cannot use it as a name for your steps")]
    ReservedStepName(StepName),

    /// The workflow configuration is invalid.
    #[error("Invalid workflow configuration: {0}")]
    Configuration(String),

    /// A bounded run dispatched `limit` steps without reaching the end.
    #[error("Step limit of {limit} reached before the workflow ended (next step: {last_step})")]
    StepLimitExceeded {
        /// The configured maximum number of dispatches.
        limit: usize,
        /// The step the run would have dispatched next.
        last_step: StepName,
    },
}
