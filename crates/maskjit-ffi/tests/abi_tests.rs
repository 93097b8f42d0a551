//! ABI contract tests

use std::mem::{align_of, size_of};

use maskjit_ffi::bindings::{self, AbiReturn, AbiType, ParamRole};
use maskjit_ffi::{
    prepare_args, ArgType, ArgValue, KernelArg, OwnedStringRepr, StringPtrArgHandler,
    StringViewRepr, STRING_BINDINGS,
};
use maskjit_types::PrimitiveType;

#[test]
fn test_table_matches_routine_list() {
    let names: Vec<_> = STRING_BINDINGS.iter().map(|f| f.name).collect();
    assert_eq!(
        names,
        [
            "length",
            "startswith",
            "endswith",
            "find",
            "rfind",
            "upper",
            "lower",
            "materialize_from_view"
        ]
    );
}

#[test]
fn test_every_routine_takes_addresses() {
    for f in STRING_BINDINGS {
        assert!(f.arity() >= 1);
        for p in f.params {
            assert!(matches!(p.ty, AbiType::OwnedStringPtr | AbiType::StringViewPtr));
        }
    }
}

#[test]
fn test_return_kinds() {
    assert_eq!(bindings::LENGTH.ret, AbiReturn::Length);
    assert_eq!(bindings::STARTSWITH.ret, AbiReturn::Bool);
    assert_eq!(bindings::ENDSWITH.ret, AbiReturn::Bool);
    assert_eq!(bindings::FIND.ret, AbiReturn::Index);
    assert_eq!(bindings::RFIND.ret, AbiReturn::Index);
    assert_eq!(bindings::UPPER.ret, AbiReturn::Status);
    assert_eq!(bindings::LOWER.ret, AbiReturn::Status);
    assert_eq!(bindings::MATERIALIZE_FROM_VIEW.ret, AbiReturn::Status);
}

#[test]
fn test_case_conversion_writes_second_param() {
    for f in [&bindings::UPPER, &bindings::LOWER] {
        assert_eq!(f.params[0].role, ParamRole::Input);
        assert_eq!(f.params[1].role, ParamRole::Output);
        assert_eq!(f.params[1].ty, AbiType::OwnedStringPtr);
    }
}

#[test]
fn test_layout_sizes() {
    assert_eq!(size_of::<OwnedStringRepr>(), 2 * size_of::<i32>() + size_of::<usize>());
    assert_eq!(align_of::<StringViewRepr<'static>>(), align_of::<usize>());
}

#[test]
fn test_view_borrows_owned_storage() {
    let owned = OwnedStringRepr::from_string("prefix-suffix".to_string()).unwrap();
    let view = owned.as_view().unwrap();
    assert_eq!(view.data(), owned.as_str().as_ptr());
    assert_eq!(view.size_bytes(), owned.size_bytes());
    assert_eq!(view.length(), 13);
}

#[test]
fn test_launch_arguments_for_string_udf() {
    let col = OwnedStringRepr::from_string("row".to_string()).unwrap();
    let out = OwnedStringRepr::new();
    let args = vec![
        KernelArg::owned_string(&col),
        KernelArg::new(ArgType::Array(PrimitiveType::Boolean), ArgValue::Address(0x40)),
        KernelArg::owned_string(&out),
        KernelArg::new(ArgType::Scalar(PrimitiveType::Int64), ArgValue::Int(3)),
    ];

    let handler = StringPtrArgHandler;
    let prepared = prepare_args(&[&handler], args.clone());

    assert_eq!(prepared[0].ty, ArgType::UInt64);
    assert_eq!(prepared[2].ty, ArgType::UInt64);
    assert_eq!(prepared[1], args[1]);
    assert_eq!(prepared[3], args[3]);
    assert_ne!(prepared[0].value, prepared[2].value);
}
