//! Scenario tests for the debugger attachment core
//!
//! These exercise the full embedding surface: listener registration, event
//! dispatch with scoped snapshots, break scheduling from the isolate's own
//! thread and from other threads, and the legacy scripted-call bridge.

use std::cell::RefCell;
use std::rc::Rc;

use kestrel_engine::{
    DebugApi, DebugError, DebugEventKind, EventDetails, Isolate, NativeFunction, Scoped, Value,
};

fn init_logging() {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Trace)
        .init();
}

/// Installs a listener that counts invocations and records the last observed
/// event kind.
fn install_counting_listener(
    isolate: &mut Isolate,
    data: Value,
) -> (Rc<RefCell<u32>>, Rc<RefCell<Option<DebugEventKind>>>) {
    let calls = Rc::new(RefCell::new(0));
    let last_kind = Rc::new(RefCell::new(None));
    let calls_in = Rc::clone(&calls);
    let kind_in = Rc::clone(&last_kind);

    DebugApi::set_event_listener(
        isolate,
        Some(Box::new(move |_isolate, details: &EventDetails| {
            *calls_in.borrow_mut() += 1;
            *kind_in.borrow_mut() = Some(details.event());
        })),
        data,
    );

    (calls, last_kind)
}

#[test]
fn has_listener_reflects_last_registration() {
    init_logging();
    let mut isolate = Isolate::new();
    assert!(!DebugApi::has_event_listener(&isolate));

    let previous = DebugApi::set_event_listener(
        &mut isolate,
        Some(Box::new(|_, _| {})),
        Value::Undefined,
    );
    assert!(!previous);
    assert!(DebugApi::has_event_listener(&isolate));

    let previous = DebugApi::set_event_listener(
        &mut isolate,
        Some(Box::new(|_, _| {})),
        Value::Undefined,
    );
    assert!(previous);

    let previous = DebugApi::set_event_listener(&mut isolate, None, Value::Undefined);
    assert!(previous);
    assert!(!DebugApi::has_event_listener(&isolate));
}

#[test]
#[allow(deprecated)]
fn debug_context_lives_with_the_listener() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();

    DebugApi::set_event_listener(&mut isolate, Some(Box::new(|_, _| {})), Value::Undefined);
    assert_eq!(DebugApi::get_debug_context(&isolate), None);

    // First dispatch creates the context lazily.
    DebugApi::notify_after_compile(&mut isolate, context, Value::Undefined);
    let debug_context = DebugApi::get_debug_context(&isolate);
    assert!(debug_context.is_some());
    assert_ne!(debug_context, Some(context));

    // Clearing the listener tears it down.
    DebugApi::set_event_listener(&mut isolate, None, Value::Undefined);
    assert_eq!(DebugApi::get_debug_context(&isolate), None);
}

#[test]
fn dispatch_without_listener_is_a_counted_no_op() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();

    DebugApi::notify_exception(&mut isolate, context, Value::string("boom"));

    let stats = isolate.dispatch_stats();
    assert_eq!(stats.dispatched, 0);
    assert_eq!(stats.context_entries, 0);
    assert_eq!(stats.dropped_no_listener, 1);
    assert_eq!(isolate.current_context(), None);
}

#[test]
fn after_compile_event_carries_the_registration_data() {
    init_logging();
    let mut isolate = Isolate::new();
    let context = isolate.new_context();
    let isolate_id = isolate.id();
    let data = Value::string("attached-front-end");

    let observed: Rc<RefCell<Option<(DebugEventKind, Value, Value)>>> =
        Rc::new(RefCell::new(None));
    let observed_in = Rc::clone(&observed);
    let stashed: Rc<RefCell<Option<Scoped<Value>>>> = Rc::new(RefCell::new(None));
    let stashed_in = Rc::clone(&stashed);

    DebugApi::set_event_listener(
        &mut isolate,
        Some(Box::new(move |_isolate, details| {
            assert_eq!(details.isolate_id(), isolate_id);
            assert_eq!(details.event_context().get().ok(), Some(context));
            *observed_in.borrow_mut() = Some((
                details.event(),
                details.callback_data().get().expect("live handle"),
                details.event_data().get().expect("live handle"),
            ));
            // Retaining a handle past the callback is a contract violation;
            // the stashed clone must fail recognizably afterwards.
            *stashed_in.borrow_mut() = Some(details.event_data().clone());
        })),
        data.clone(),
    );

    let script_info = Value::string("script.ks");
    DebugApi::notify_after_compile(&mut isolate, context, script_info.clone());

    let observed = observed.borrow_mut().take().expect("listener ran");
    assert_eq!(observed.0, DebugEventKind::AfterCompile);
    assert_eq!(observed.1, data);
    assert_eq!(observed.2, script_info);

    let stale = stashed.borrow_mut().take().expect("handle stashed");
    assert!(!stale.is_valid());
    assert!(matches!(stale.get(), Err(DebugError::StaleHandle)));

    // The pre-dispatch context is restored.
    assert_eq!(isolate.current_context(), None);
    assert_eq!(isolate.dispatch_stats().dispatched, 1);
}

#[test]
#[allow(deprecated)]
fn event_context_is_never_the_debug_context() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();

    let seen: Rc<RefCell<Option<kestrel_engine::ContextId>>> = Rc::new(RefCell::new(None));
    let seen_in = Rc::clone(&seen);
    DebugApi::set_event_listener(
        &mut isolate,
        Some(Box::new(move |isolate, details| {
            // The debug context is current while the listener runs, but the
            // snapshot names the pre-dispatch context.
            *seen_in.borrow_mut() = isolate.current_context();
            assert_eq!(details.event_context().get().ok(), Some(context));
        })),
        Value::Undefined,
    );

    isolate.enter_context(context);
    DebugApi::notify_break(&mut isolate, context);
    isolate.exit_context();

    let current_during_dispatch = seen.borrow_mut().take().expect("listener ran");
    assert_eq!(
        Some(current_during_dispatch),
        DebugApi::get_debug_context(&isolate)
    );
    assert_ne!(current_during_dispatch, context);
}

#[test]
fn replacing_the_listener_silences_the_old_one() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();

    let (first_calls, _) = install_counting_listener(&mut isolate, Value::Undefined);
    DebugApi::notify_after_compile(&mut isolate, context, Value::Undefined);
    assert_eq!(*first_calls.borrow(), 1);

    let (second_calls, _) = install_counting_listener(&mut isolate, Value::Undefined);
    DebugApi::notify_after_compile(&mut isolate, context, Value::Undefined);
    DebugApi::notify_compile_error(&mut isolate, context, Value::Undefined);

    assert_eq!(*first_calls.borrow(), 1, "replaced listener must stay silent");
    assert_eq!(*second_calls.borrow(), 2);
}

#[test]
fn every_event_kind_is_delivered() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();
    let (calls, last_kind) = install_counting_listener(&mut isolate, Value::Undefined);

    DebugApi::notify_break(&mut isolate, context);
    assert_eq!(*last_kind.borrow(), Some(DebugEventKind::Break));
    DebugApi::notify_exception(&mut isolate, context, Value::string("err"));
    assert_eq!(*last_kind.borrow(), Some(DebugEventKind::Exception));
    DebugApi::notify_after_compile(&mut isolate, context, Value::Undefined);
    assert_eq!(*last_kind.borrow(), Some(DebugEventKind::AfterCompile));
    DebugApi::notify_compile_error(&mut isolate, context, Value::Undefined);
    assert_eq!(*last_kind.borrow(), Some(DebugEventKind::CompileError));
    DebugApi::notify_async_task_event(&mut isolate, context, Value::Undefined);
    assert_eq!(*last_kind.borrow(), Some(DebugEventKind::AsyncTaskEvent));

    assert_eq!(*calls.borrow(), 5);
}

#[test]
fn cancelled_break_never_fires() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();
    let (calls, _) = install_counting_listener(&mut isolate, Value::Undefined);

    DebugApi::debug_break(&isolate);
    DebugApi::cancel_debug_break(&isolate);

    assert!(!DebugApi::check_break(&mut isolate, context));
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn repeated_break_requests_collapse() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();
    let (calls, last_kind) = install_counting_listener(&mut isolate, Value::Undefined);

    DebugApi::debug_break(&isolate);
    DebugApi::debug_break(&isolate);

    assert!(DebugApi::check_break(&mut isolate, context));
    assert_eq!(*last_kind.borrow(), Some(DebugEventKind::Break));
    assert_eq!(*calls.borrow(), 1);

    // No new request: the later safe point sees nothing.
    assert!(!DebugApi::check_break(&mut isolate, context));
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn break_requested_from_another_thread_fires_at_a_safe_point() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();
    let (calls, _) = install_counting_listener(&mut isolate, Value::Undefined);

    let handle = isolate.break_handle();
    std::thread::spawn(move || handle.request())
        .join()
        .expect("control thread panicked");

    assert!(DebugApi::check_break(&mut isolate, context));
    assert_eq!(*calls.borrow(), 1);
}

#[test]
#[allow(deprecated)]
fn check_debug_break_reads_without_consuming() {
    let isolate = Isolate::new();
    DebugApi::debug_break(&isolate);
    assert!(DebugApi::check_debug_break(&isolate));
    assert!(DebugApi::check_debug_break(&isolate));
    DebugApi::cancel_debug_break(&isolate);
    assert!(!DebugApi::check_debug_break(&isolate));
}

#[test]
fn scripted_call_requires_a_listener() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();
    let function = NativeFunction::from_fn_ptr(|_, _| Ok(Value::Undefined));

    let result = DebugApi::call(&mut isolate, context, &function, Value::Undefined);
    assert!(matches!(result, Err(DebugError::NotDebuggable)));
}

#[test]
fn scripted_call_receives_state_data_and_debug_global() {
    init_logging();
    let mut isolate = Isolate::new();
    let context = isolate.new_context();
    DebugApi::set_event_listener(&mut isolate, Some(Box::new(|_, _| {})), Value::Undefined);

    let function = NativeFunction::from_closure(|this, args| {
        // Receiver is the debug context's global object.
        let Value::Object(global) = this else {
            return Err(Value::string("receiver is not an object"));
        };
        assert_eq!(
            global.internal_slot("[[DebugContext]]"),
            Some(Value::Boolean(true))
        );
        assert_eq!(args.len(), 2);
        assert!(matches!(args[0], Value::Object(_)), "execution state");
        Ok(args[1].clone())
    });

    let result = DebugApi::call(&mut isolate, context, &function, Value::Integer(11));
    assert_eq!(result.expect("call succeeds"), Value::Integer(11));
    assert_eq!(isolate.current_context(), None);
}

#[test]
fn scripted_call_surfaces_thrown_values() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();
    DebugApi::set_event_listener(&mut isolate, Some(Box::new(|_, _| {})), Value::Undefined);

    let function = NativeFunction::from_fn_ptr(|_, _| Err(Value::string("nope")));
    let result = DebugApi::call(&mut isolate, context, &function, Value::Undefined);

    match result {
        Err(DebugError::Exception(value)) => assert_eq!(value, Value::string("nope")),
        other => panic!("expected an exception failure, got {other:?}"),
    }

    // The failure is recoverable; the isolate keeps dispatching.
    let undefined_ok = NativeFunction::from_fn_ptr(|_, _| Ok(Value::Undefined));
    let result = DebugApi::call(&mut isolate, context, &undefined_ok, Value::Undefined);
    assert_eq!(result.expect("call succeeds"), Value::Undefined);
}

#[test]
fn scripted_call_nests_once_inside_a_dispatch() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();

    let nested_result: Rc<RefCell<Option<Result<Value, DebugError>>>> =
        Rc::new(RefCell::new(None));
    let nested_in = Rc::clone(&nested_result);

    DebugApi::set_event_listener(
        &mut isolate,
        Some(Box::new(move |isolate, _details| {
            let function = NativeFunction::from_fn_ptr(|_, args| Ok(args[0].clone()));
            let result = DebugApi::call(isolate, context, &function, Value::Undefined);
            *nested_in.borrow_mut() = Some(result);
        })),
        Value::Undefined,
    );

    DebugApi::notify_break(&mut isolate, context);

    let nested = nested_result.borrow_mut().take().expect("listener ran");
    assert!(matches!(nested, Ok(Value::Object(_))));
    assert_eq!(isolate.current_context(), None);
}

#[test]
fn sequential_scripted_calls_inside_a_dispatch_are_allowed() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();

    let results: Rc<RefCell<Vec<Result<Value, DebugError>>>> = Rc::new(RefCell::new(Vec::new()));
    let results_in = Rc::clone(&results);
    DebugApi::set_event_listener(
        &mut isolate,
        Some(Box::new(move |isolate, _details| {
            let function = NativeFunction::from_fn_ptr(|_, _| Ok(Value::Undefined));
            // One level of nesting per call; back-to-back calls each get
            // their own enter/exit of the debug context.
            for _ in 0..2 {
                results_in
                    .borrow_mut()
                    .push(DebugApi::call(isolate, context, &function, Value::Undefined));
            }
        })),
        Value::Undefined,
    );

    DebugApi::notify_break(&mut isolate, context);

    let results = results.borrow();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(Result::is_ok));
    assert_eq!(isolate.current_context(), None);
}

#[test]
fn internal_properties_alternate_names_and_values() {
    let mut isolate = Isolate::new();
    let context = isolate.new_context();
    isolate.enter_context(context);

    let state = isolate.capture_execution_state();
    let properties = DebugApi::get_internal_properties(&isolate, &state);

    assert!(!properties.is_empty());
    assert_eq!(properties.len() % 2, 0);
    assert!(matches!(properties[0], Value::String(_)));
    assert_eq!(properties[0], Value::string("[[StateSequence]]"));

    // Primitives have no internal properties.
    assert!(DebugApi::get_internal_properties(&isolate, &Value::Integer(1)).is_empty());
    assert!(DebugApi::get_internal_properties(&isolate, &Value::Undefined).is_empty());
}

#[test]
fn capability_flags_are_stored_per_isolate() {
    let mut isolate = Isolate::new();

    assert!(!DebugApi::is_tail_call_elimination_enabled(&isolate));
    DebugApi::set_tail_call_elimination_enabled(&mut isolate, true);
    assert!(DebugApi::is_tail_call_elimination_enabled(&isolate));
    DebugApi::set_tail_call_elimination_enabled(&mut isolate, false);
    assert!(!DebugApi::is_tail_call_elimination_enabled(&isolate));

    DebugApi::set_live_edit_enabled(&mut isolate, false);
    DebugApi::set_live_edit_enabled(&mut isolate, true);
}

#[test]
#[allow(deprecated)]
fn retired_surfaces_report_unsupported() {
    let isolate = Isolate::new();
    assert!(matches!(
        DebugApi::get_mirror(&isolate, &Value::Undefined),
        Err(DebugError::Unsupported)
    ));
    assert!(matches!(
        DebugApi::get_debugged_context(&isolate),
        Err(DebugError::Unsupported)
    ));
}
