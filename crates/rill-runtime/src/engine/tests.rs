use std::cell::RefCell;
use std::rc::Rc;

use rill_core::{
    ArrayValue, CallSite, ErrorKind, ObjectValue, ParamKind, ParameterSpec, Value,
};

use super::runtime_test_support::{
    pair_callable, register_failing_function, register_recording_function, test_context,
};
use super::{
    bind_arguments, call_dynamic, call_function, call_static_dynamic, DiagnosticKind,
    ExecutionContext, FunctionSignature, MethodSignature,
};

#[test]
fn missing_argument_binds_null_and_warns_once() {
    // params = [$x: any, no default], args = [] -> [Null] plus one warning.
    let mut ctx = ExecutionContext::new();
    let params = [ParameterSpec::new("x")];

    let bound = bind_arguments(&mut ctx, Some(&[]), &params, Some("f"), None, None)
        .expect("bind should pass");

    assert_eq!(bound, [Value::Null]);
    let warnings: Vec<_> = ctx
        .diagnostics()
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("argument 1"));
    assert!(warnings[0].message.contains("($x)"));
}

#[test]
fn padding_keeps_given_values_and_fills_the_rest() {
    let mut ctx = ExecutionContext::new();
    let params = [
        ParameterSpec::new("a"),
        ParameterSpec::new("b"),
        ParameterSpec::new("c").with_default(Value::Int(30)),
        ParameterSpec::new("d"),
    ];
    let args = [Value::Int(1), Value::Int(2)];

    let bound =
        bind_arguments(&mut ctx, Some(&args), &params, Some("f"), None, None).expect("bind");

    assert_eq!(bound.len(), 4);
    assert_eq!(&bound[..2], &args);
    assert_eq!(bound[2], Value::Int(30));
    assert_eq!(bound[3], Value::Null);
}

#[test]
fn dynamic_pair_call_matches_direct_static_call() {
    // ["Logger", "info"] with args=["hello"] == Logger::info("hello").
    let mut ctx = test_context();
    let site = CallSite::new("main.rill", 10);
    let args = [Value::string("hello")];

    let dynamic = call_dynamic(&mut ctx, None, Some(&site), &pair_callable("Logger", "info"), &args)
        .expect("dynamic call");
    let direct = call_static_dynamic(
        &mut ctx,
        &Value::string("Logger"),
        Some(&site),
        "Logger",
        "info",
        &args,
    )
    .expect("direct call");

    assert_eq!(dynamic, Value::string("info: hello"));
    assert_eq!(dynamic, direct);
}

#[test]
fn bare_name_string_dispatches_a_free_function() {
    let mut ctx = test_context();
    let result = call_dynamic(
        &mut ctx,
        None,
        None,
        &Value::string("strtolower"),
        &[Value::string("Rill")],
    )
    .expect("call");
    assert_eq!(result, Value::string("rill"));
}

#[test]
fn numeric_constraint_violation_leaves_no_frame_behind() {
    // params=[$n: numeric], args=["abc"] -> compile error, stack untouched.
    let mut ctx = ExecutionContext::new();
    ctx.register_function(FunctionSignature::new(
        "sqrtish",
        vec![ParameterSpec::new("n").with_kind(ParamKind::Numeric)],
        Rc::new(|_ctx, args| Ok(Value::Float(args[0].to_double()))),
    ));
    let site = CallSite::new("main.rill", 11);

    let error = call_function(&mut ctx, Some(&site), "sqrtish", &[Value::string("abc")])
        .expect_err("non-numeric argument must abort the call");

    assert_eq!(error.kind, ErrorKind::CompileError);
    assert_eq!(error.message, "Argument 1 must be int or double");
    assert_eq!(ctx.call_depth(), 0);
}

#[test]
fn all_four_callable_shapes_reach_the_same_target() {
    let mut ctx = test_context();
    ctx.register_method(MethodSignature::new(
        "Echo",
        "__invoke",
        vec![ParameterSpec::new("text")],
        Rc::new(|_target, _ctx, args| {
            Ok(Value::string(args[0].to_string_value()))
        }),
    ));
    ctx.register_method(MethodSignature::new(
        "Echo",
        "say",
        vec![ParameterSpec::new("text")],
        Rc::new(|_target, _ctx, args| {
            Ok(Value::string(args[0].to_string_value()))
        }),
    ));
    ctx.register_function(FunctionSignature::new(
        "echo_text",
        vec![ParameterSpec::new("text")],
        Rc::new(|_ctx, args| Ok(Value::string(args[0].to_string_value()))),
    ));

    let args = [Value::string("same")];
    let object_shape = Value::object(ObjectValue::new("Echo"));
    let pair_shape = pair_callable("Echo", "say");
    let string_shape = Value::string("Echo::say");
    let name_shape = Value::string("echo_text");

    for callable in [object_shape, pair_shape, string_shape, name_shape] {
        let result =
            call_dynamic(&mut ctx, None, None, &callable, &args).expect("shape should dispatch");
        assert_eq!(result, Value::string("same"));
    }
}

#[test]
fn nested_calls_keep_the_stack_balanced_through_failures() {
    let mut ctx = test_context();
    register_failing_function(&mut ctx, "faulty");

    // outer() calls down two levels; the innermost callee fails fatally.
    ctx.register_function(FunctionSignature::new(
        "middle",
        Vec::new(),
        Rc::new(|ctx, _args| {
            let site = CallSite::new("middle.rill", 2);
            call_function(ctx, Some(&site), "faulty", &[])
        }),
    ));
    ctx.register_function(FunctionSignature::new(
        "outer",
        Vec::new(),
        Rc::new(|ctx, _args| {
            let site = CallSite::new("outer.rill", 1);
            call_function(ctx, Some(&site), "middle", &[])
        }),
    ));

    let site = CallSite::new("main.rill", 12);
    let depth_before = ctx.call_depth();
    let error = call_function(&mut ctx, Some(&site), "outer", &[])
        .expect_err("innermost failure must propagate");

    assert_eq!(error.kind, ErrorKind::Fatal);
    assert_eq!(ctx.call_depth(), depth_before);
}

#[test]
fn deep_nesting_reports_an_accurate_stack_trace_mid_call() {
    let mut ctx = test_context();
    let observed = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&observed);

    ctx.register_function(FunctionSignature::new(
        "leaf",
        Vec::new(),
        Rc::new(move |ctx, _args| {
            *sink.borrow_mut() = ctx.stack_trace();
            Ok(Value::Null)
        }),
    ));
    ctx.register_function(FunctionSignature::new(
        "trunk",
        Vec::new(),
        Rc::new(|ctx, _args| {
            let site = CallSite::new("trunk.rill", 5);
            call_function(ctx, Some(&site), "leaf", &[])
        }),
    ));

    let site = CallSite::new("main.rill", 1);
    call_function(&mut ctx, Some(&site), "trunk", &[]).expect("call should pass");

    assert_eq!(
        *observed.borrow(),
        "#0 leaf() called at trunk.rill:5\n#1 trunk() called at main.rill:1"
    );
    assert_eq!(ctx.call_depth(), 0);
}

#[test]
fn by_reference_parameters_write_back_to_the_caller() {
    let mut ctx = ExecutionContext::new();
    ctx.register_function(FunctionSignature::new(
        "bump",
        vec![ParameterSpec::new("counter")
            .with_kind(ParamKind::Numeric)
            .by_reference()],
        Rc::new(|_ctx, args| {
            if let Value::Reference(slot) = &args[0] {
                let next = slot.borrow().to_int() + 1;
                *slot.borrow_mut() = Value::Int(next);
            }
            Ok(Value::Null)
        }),
    ));

    let counter = Value::reference(Value::Int(41));
    call_function(&mut ctx, None, "bump", &[counter.clone()]).expect("call");
    assert_eq!(counter.to_immutable(), Value::Int(42));
}

#[test]
fn value_parameters_shield_the_caller_from_callee_writes() {
    let mut ctx = ExecutionContext::new();
    ctx.register_function(FunctionSignature::new(
        "try_clobber",
        vec![ParameterSpec::new("x")],
        Rc::new(|_ctx, args| {
            // The bound slot is a snapshot; a reference never reaches here.
            assert!(args[0].is_immutable());
            Ok(Value::Null)
        }),
    ));

    let caller_slot = Value::reference(Value::string("original"));
    call_function(&mut ctx, None, "try_clobber", &[caller_slot.clone()]).expect("call");
    assert_eq!(caller_slot.to_immutable(), Value::string("original"));
}

#[test]
fn recoverable_diagnostics_never_interrupt_dispatch() {
    let mut ctx = test_context();
    let log = Rc::new(RefCell::new(Vec::new()));
    register_recording_function(&mut ctx, "record", Rc::clone(&log));

    // Call with a missing argument: warning recorded, call still runs.
    let site = CallSite::new("main.rill", 13);
    let result = call_function(&mut ctx, Some(&site), "record", &[]).expect("call");
    assert_eq!(result, Value::Null);
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(
        ctx.diagnostics()
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Warning)
            .count(),
        1
    );
}

#[test]
fn fatal_resolution_records_the_site_of_the_failing_call() {
    let mut ctx = test_context();
    let site = CallSite::new("app.rill", 77);

    let error = call_dynamic(
        &mut ctx,
        None,
        Some(&site),
        &Value::array(ArrayValue::new()),
        &[],
    )
    .expect_err("empty array callable must fail");

    assert_eq!(error.kind, ErrorKind::Fatal);
    assert_eq!(error.site, Some(site));
    assert_eq!(
        ctx.diagnostics().last().map(|d| d.kind),
        Some(DiagnosticKind::Fatal)
    );
}
