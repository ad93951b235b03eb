use crate::errors::{EvalError, Result};
use crate::functions::{int_arg, Accessor, DynamicNamespace, Namespace, NativeFn};
use crate::value::{Type, Value};

/// Evaluation context: the inputs an expression reads as `x`, `y` and `z`,
/// plus the numeric predicates exposed to expressions.
///
/// The driver overwrites the fields through `&mut` before each run and the
/// compiled expression only ever sees `&Variables`, so one instance must not
/// be shared between threads while runs are in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Variables {
    pub x_var: i32,
    pub y_var: i32,
    pub z_var: i32,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(&self) -> i32 {
        self.x_var
    }

    pub fn y(&self) -> i32 {
        self.y_var
    }

    pub fn z(&self) -> i32 {
        self.z_var
    }

    pub fn assign(&mut self, x: i32, y: i32, z: i32) {
        self.x_var = x;
        self.y_var = y;
        self.z_var = z;
    }

    /// Up to three inputs, in `x, y, z` order; missing ones are 0.
    pub fn assign_slice(&mut self, inputs: &[i32]) -> Result<()> {
        if inputs.len() > 3 {
            return Err(EvalError::Invocation(format!(
                "expected at most 3 inputs, got {}",
                inputs.len()
            )));
        }
        let at = |i: usize| inputs.get(i).copied().unwrap_or(0);
        self.assign(at(0), at(1), at(2));
        Ok(())
    }

    /// Note the loop body never runs below 4, so 0, 1 and negative numbers
    /// come out as prime.
    pub fn is_prime(number: i32) -> bool {
        let limit = f64::from(number).sqrt().floor() as i32;
        (2..=limit).all(|i| number % i != 0)
    }

    /// Scans 0, 1, 1, 2, 3, 5, ... for at most 1000 terms.
    pub fn is_fibonacci(x: i32) -> bool {
        let x = i64::from(x);
        let (mut previous, mut current): (i64, i64) = (0, 1);
        if x == previous {
            return true;
        }
        for _ in 1..1000 {
            if x == current {
                return true;
            }
            if x < current {
                return false;
            }
            (previous, current) = (current, previous + current);
        }
        false
    }

    /// Exact float comparison on the square root; no tolerance.
    pub fn is_perfect_square(x: i32) -> bool {
        let square = f64::from(x).sqrt();
        (square - square.floor()) == 0.0
    }

    pub fn is_perfect_cube(x: i32) -> bool {
        let cube = f64::from(x).cbrt();
        (cube - cube.floor()) == 0.0
    }

    /// Only the first 16 square pyramidal numbers are recognised.
    pub fn is_square_pyramid_number(x: i32) -> bool {
        (1..17i32).any(|i| i * (i + 1) * (2 * i + 1) / 6 == x)
    }

    /// The predicates, as the static `Variables` namespace.
    pub fn namespace() -> Namespace {
        const I: &[Type] = &[Type::Int];

        let mut ns = Namespace::new("Variables");
        ns.register(predicate("isPrime", &[Type::Float], |a| {
            Ok(Variables::is_prime(int32_arg(a, 0)?).into())
        }));
        ns.register(predicate("isFibonacci", I, |a| {
            Ok(Variables::is_fibonacci(int32_arg(a, 0)?).into())
        }));
        ns.register(predicate("isPerfectSquare", I, |a| {
            Ok(Variables::is_perfect_square(int32_arg(a, 0)?).into())
        }));
        ns.register(predicate("isPerfectCube", I, |a| {
            Ok(Variables::is_perfect_cube(int32_arg(a, 0)?).into())
        }));
        ns.register(predicate("isSquarePyramidNumber", I, |a| {
            Ok(Variables::is_square_pyramid_number(int32_arg(a, 0)?).into())
        }));
        ns
    }

    /// The accessors, as the dynamic `Variables` namespace.
    pub fn accessors() -> DynamicNamespace {
        DynamicNamespace::new(
            "Variables",
            vec![
                Accessor {
                    name: "x",
                    read: Variables::x,
                },
                Accessor {
                    name: "y",
                    read: Variables::y,
                },
                Accessor {
                    name: "z",
                    read: Variables::z,
                },
            ],
        )
    }
}

/// Predicate argument narrowed to `i32`. Out-of-range values saturate,
/// floats truncate toward zero and NaN becomes 0.
fn int32_arg(args: &[Value], i: usize) -> Result<i32> {
    match args.get(i) {
        Some(Value::Float(f)) => Ok(*f as i32),
        _ => Ok(int_arg(args, i)?.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32),
    }
}

fn predicate(
    name: &'static str,
    params: &'static [Type],
    body: fn(&[Value]) -> Result<Value>,
) -> NativeFn {
    NativeFn {
        name,
        params,
        returns: Type::Bool,
        body,
    }
}
