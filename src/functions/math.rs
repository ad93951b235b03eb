//! The `Math` static namespace.

use super::{float_arg, Namespace, NativeFn};
use crate::errors::Result;
use crate::value::{Type, Value};

const F: &[Type] = &[Type::Float];
const FF: &[Type] = &[Type::Float, Type::Float];

fn unary(name: &'static str, body: fn(&[Value]) -> Result<Value>) -> NativeFn {
    NativeFn {
        name,
        params: F,
        returns: Type::Float,
        body,
    }
}

fn binary(name: &'static str, body: fn(&[Value]) -> Result<Value>) -> NativeFn {
    NativeFn {
        name,
        params: FF,
        returns: Type::Float,
        body,
    }
}

fn constant(name: &'static str, body: fn(&[Value]) -> Result<Value>) -> NativeFn {
    NativeFn {
        name,
        params: &[],
        returns: Type::Float,
        body,
    }
}

pub fn namespace() -> Namespace {
    let mut ns = Namespace::new("Math");

    ns.register(unary("abs", |a| Ok(float_arg(a, 0)?.abs().into())));
    ns.register(unary("sqrt", |a| Ok(float_arg(a, 0)?.sqrt().into())));
    ns.register(unary("cbrt", |a| Ok(float_arg(a, 0)?.cbrt().into())));
    ns.register(unary("floor", |a| Ok(float_arg(a, 0)?.floor().into())));
    ns.register(unary("ceil", |a| Ok(float_arg(a, 0)?.ceil().into())));
    ns.register(unary("signum", |a| {
        let v = float_arg(a, 0)?;
        // f64::signum maps 0.0 to 1.0
        Ok(if v == 0.0 || v.is_nan() { v } else { v.signum() }.into())
    }));
    ns.register(unary("sin", |a| Ok(float_arg(a, 0)?.sin().into())));
    ns.register(unary("cos", |a| Ok(float_arg(a, 0)?.cos().into())));
    ns.register(unary("tan", |a| Ok(float_arg(a, 0)?.tan().into())));
    ns.register(unary("asin", |a| Ok(float_arg(a, 0)?.asin().into())));
    ns.register(unary("acos", |a| Ok(float_arg(a, 0)?.acos().into())));
    ns.register(unary("atan", |a| Ok(float_arg(a, 0)?.atan().into())));
    ns.register(unary("exp", |a| Ok(float_arg(a, 0)?.exp().into())));
    ns.register(unary("log", |a| Ok(float_arg(a, 0)?.ln().into())));
    ns.register(unary("log10", |a| Ok(float_arg(a, 0)?.log10().into())));
    ns.register(NativeFn {
        name: "round",
        params: F,
        returns: Type::Int,
        // half-up, saturating at the i64 range like a float-to-int cast
        body: |a| Ok(Value::Int((float_arg(a, 0)? + 0.5).floor() as i64)),
    });

    ns.register(binary("pow", |a| Ok(float_arg(a, 0)?.powf(float_arg(a, 1)?).into())));
    ns.register(binary("min", |a| Ok(float_arg(a, 0)?.min(float_arg(a, 1)?).into())));
    ns.register(binary("max", |a| Ok(float_arg(a, 0)?.max(float_arg(a, 1)?).into())));
    ns.register(binary("hypot", |a| Ok(float_arg(a, 0)?.hypot(float_arg(a, 1)?).into())));
    ns.register(binary("atan2", |a| Ok(float_arg(a, 0)?.atan2(float_arg(a, 1)?).into())));

    ns.register(constant("PI", |_| Ok(std::f64::consts::PI.into())));
    ns.register(constant("E", |_| Ok(std::f64::consts::E.into())));
    // Must be marked state dependent in any library that exposes it.
    ns.register(constant("random", |_| Ok(rand::random::<f64>().into())));

    ns
}
