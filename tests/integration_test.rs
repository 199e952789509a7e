use ayumi::prelude::*;
use ayumi::{FnHooks, StepFn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn mock_step(_ev: &Event, _ctx: &mut Context) -> Event {
    Event::terminal([("output", "hello world")])
}

#[test]
fn test_single_step_workflow() {
    init_tracing();

    let workflow = Workflow::new(
        "firstStep",
        Context::default(),
        steps! { "firstStep" => mock_step },
    );
    assert!(workflow.validate().is_ok());

    let event = workflow.take_step(
        "firstStep",
        &Event::new("mockEvent", [("mock", "event")]),
        &mut Context::default(),
    );
    assert_eq!(event.get("output"), Some("hello world"));
    assert_eq!(event.next_step(), "end");
    assert_eq!(workflow.output(&event, &Context::default()), "hello world");

    let mut starts = Vec::new();
    let mut ends = Vec::new();
    let mut outputs = Vec::new();
    workflow.run(
        Event::new("mockEvent", [("mock", "event")]),
        &mut Context::default(),
        |ev| starts.push(ev.next_step().to_string()),
        |ev| ends.push(ev.next_step().to_string()),
        |out| outputs.push(out),
    );

    assert_eq!(starts, vec!["end"]);
    assert!(ends.is_empty());
    assert_eq!(outputs, vec!["hello world"]);
}

#[test]
fn test_two_step_chain() {
    init_tracing();

    let workflow = Workflow::builder()
        .add_step("s1", |ev: &Event, _ctx: &mut Context| {
            let text = ev.get("text").unwrap_or_default().to_uppercase();
            Event::new("s2", [("text", text)])
        })
        .add_step("s2", |ev: &Event, _ctx: &mut Context| {
            Event::terminal([("output", format!("{}!", ev.get("text").unwrap_or_default()))])
        })
        .start_with("s1")
        .build()
        .expect("valid workflow");

    let mut starts = Vec::new();
    let mut ends = Vec::new();
    let mut outputs = Vec::new();
    workflow.run(
        Event::new("s1", [("text", "ciao")]),
        &mut Context::default(),
        |ev| starts.push(ev.next_step().clone()),
        |ev| ends.push(ev.next_step().clone()),
        |out| outputs.push(out),
    );

    assert_eq!(starts, vec![StepName::new("s2"), StepName::end()]);
    assert_eq!(ends, vec![StepName::end()]);
    assert_eq!(outputs, vec![Output::Produced("CIAO!".to_string())]);
}

#[test]
fn test_reserved_name_is_reported_but_run_still_allowed() {
    init_tracing();

    let workflow = Workflow::builder()
        .add_step("start", |_ev: &Event, _ctx: &mut Context| Event::empty("end"))
        .add_step("end", mock_step)
        .start_with("start")
        .build()
        .expect("valid workflow");

    let err = workflow.validate().expect_err("reserved name");
    assert_eq!(err, WorkflowError::ReservedStepName(StepName::end()));

    // an event naming "end" terminates; the step registered as "end" never runs
    let mut outputs = Vec::new();
    workflow.run(
        Event::empty("start"),
        &mut Context::default(),
        |_| {},
        |_| {},
        |out| outputs.push(out),
    );
    assert_eq!(outputs, vec![Output::NoOutput]);
}

#[test]
fn test_context_survives_across_steps() {
    init_tracing();

    #[derive(Debug, Clone, PartialEq)]
    struct User {
        name: String,
        credits: u32,
    }

    let workflow = Workflow::builder()
        .add_step("charge", |_ev: &Event, ctx: &mut Context| {
            let Some(user) = ctx.get_value::<User>("user").cloned() else {
                return Event::terminal([("output", "no user")]);
            };
            ctx.store_value(
                "user",
                User {
                    credits: user.credits - 50,
                    ..user
                },
            );
            ctx.set_state(ValueMap::new().with("charged", 50u32));
            Event::empty("report")
        })
        .add_step("report", |_ev: &Event, ctx: &mut Context| {
            let charged = ctx.state().get::<u32>("charged").copied().unwrap_or(0);
            let left = ctx
                .get_value::<User>("user")
                .map(|u| u.credits)
                .unwrap_or(0);
            ctx.set_state(ValueMap::new());
            Event::terminal([("output", format!("charged {}, {} left", charged, left))])
        })
        .start_with("charge")
        .build()
        .expect("valid workflow");

    let store = ValueMap::new().with(
        "user",
        User {
            name: "John Doe".to_string(),
            credits: 200,
        },
    );
    let mut ctx = Context::new(store, ValueMap::new().with("iterations", 3u32));

    let mut outputs = Vec::new();
    workflow.run(Event::empty("charge"), &mut ctx, |_| {}, |_| {}, |out| {
        outputs.push(out)
    });

    assert_eq!(outputs, vec!["charged 50, 150 left"]);
    assert_eq!(
        ctx.get_value::<User>("user"),
        Some(&User {
            name: "John Doe".to_string(),
            credits: 150,
        })
    );
    assert!(ctx.state().is_empty());
}

#[test]
fn test_step_closures_mutate_captured_state() {
    init_tracing();

    let log = Arc::new(Mutex::new(Vec::new()));
    let mut steps: HashMap<StepName, StepFn<Context>> = HashMap::new();
    for (name, next) in [("a", "b"), ("b", "c"), ("c", "end")] {
        let log = log.clone();
        steps.insert(
            StepName::new(name),
            Box::new(move |_ev: &Event, _ctx: &mut Context| {
                if let Ok(mut log) = log.lock() {
                    log.push(name);
                }
                if next == "end" {
                    Event::terminal([("output", "done")])
                } else {
                    Event::empty(next)
                }
            }),
        );
    }

    let workflow = Workflow::builder()
        .add_steps(steps)
        .start_with("a")
        .build()
        .expect("valid workflow");
    assert_eq!(workflow.step_count(), 3);

    let mut ends = 0;
    let mut hooks = FnHooks::new(|_: &Event| {}, |_: &Event| ends += 1, |_: Output| {});
    workflow.run_with_hooks(Event::empty("a"), &mut Context::default(), &mut hooks);
    drop(hooks);

    assert_eq!(ends, 2);
    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn test_cycle_needs_opt_in_limit() {
    init_tracing();

    let workflow = Workflow::builder()
        .add_step("loop", |_ev: &Event, _ctx: &mut Context| Event::empty("loop"))
        .start_with("loop")
        .build()
        .expect("valid workflow");

    let result = workflow.run_with_limits(
        Event::empty("loop"),
        &mut Context::default(),
        RunLimits::max_steps(100),
        &mut TracingHooks,
    );
    assert_eq!(
        result,
        Err(WorkflowError::StepLimitExceeded {
            limit: 100,
            last_step: StepName::new("loop"),
        })
    );
}

#[test]
fn test_custom_context_type() {
    init_tracing();

    #[derive(Default)]
    struct Tally {
        store: HashMap<String, u32>,
        state: ValueMap,
    }

    impl ContextStore for Tally {
        fn store_value<T: std::any::Any + Send + Sync>(
            &mut self,
            key: impl Into<ayumi::ContextKey>,
            value: T,
        ) {
            let any: &dyn std::any::Any = &value;
            if let Some(n) = any.downcast_ref::<u32>() {
                self.store.insert(key.into().as_str().to_string(), *n);
            }
        }

        fn get_value<T: std::any::Any>(&self, key: &str) -> Option<&T> {
            let value: &dyn std::any::Any = self.store.get(key)?;
            value.downcast_ref::<T>()
        }

        fn state(&self) -> &ValueMap {
            &self.state
        }

        fn set_state(&mut self, state: ValueMap) {
            self.state = state;
        }
    }

    let mut workflow = ayumi::WorkflowBuilder::<Tally>::new()
        .add_step("bump", |_ev: &Event, ctx: &mut Tally| {
            let n = ctx.get_value::<u32>("n").copied().unwrap_or(0);
            ctx.store_value("n", n + 1);
            Event::terminal([("output", (n + 1).to_string())])
        })
        .start_with("bump")
        .build()
        .expect("valid workflow");

    let mut outputs = Vec::new();
    let mut hooks = FnHooks::new(|_: &Event| {}, |_: &Event| {}, |out: Output| {
        outputs.push(out)
    });
    workflow.run_in_default_context(Event::empty("bump"), &mut hooks);
    workflow.run_in_default_context(Event::empty("bump"), &mut hooks);
    drop(hooks);

    assert_eq!(outputs, vec!["1", "2"]);
    assert_eq!(workflow.default_context().get_value::<u32>("n"), Some(&2));
}
