use hello_expr as hx;
use hx::Value;
use pretty_assertions::assert_eq;

#[test]
fn test_example_no_variables() {
    assert_eq!(hx::evaluate("2+2", &[]), Some(Value::Int(4)));
}

#[test]
fn test_example_one_variable() {
    assert_eq!(hx::evaluate("2 + 3 / x", &[4]), Some(Value::Float(2.75)));
}

#[test]
fn test_example_three_variables() {
    assert_eq!(hx::evaluate("(y + x + z)", &[1, 10, 100]), Some(Value::Int(111)));
    assert_eq!(
        hx::evaluate("(y + x + z) == 111", &[3, 4, 5]),
        Some(Value::Bool(false))
    );
    assert_eq!(
        hx::evaluate("(((x*x) + (y*y)) == (z*z))", &[3, 4, 5]),
        Some(Value::Bool(true))
    );
}

#[test]
fn test_example_predicates() {
    assert_eq!(
        hx::evaluate("isSquarePyramidNumber(x) && isFibonacci(y)", &[30, 55]),
        Some(Value::Bool(true))
    );
    assert_eq!(
        hx::evaluate("isPrime(x) && isPerfectCube(y) && isPerfectSquare(z)", &[67, 27, 64]),
        Some(Value::Bool(true))
    );
}

#[test]
fn test_example_math_namespace() {
    assert_eq!(hx::evaluate("sqrt(x) + abs(-y)", &[16, 2]), Some(Value::Float(6.0)));
    assert_eq!(hx::evaluate("max(x, y) > z", &[1, 7, 5]), Some(Value::Bool(true)));
    assert_eq!(hx::evaluate("isPrime(sqrt(x) * 1.0)", &[49]), Some(Value::Bool(true)));
}

#[test]
fn test_compile_once_run_many() {
    let library = hx::build_library().unwrap();
    let compiled = hx::compile("(y + x + z)", &library);
    assert!(compiled.is_some());
    let mut vars = hx::Variables::new();
    let out: Vec<Option<Value>> = (0..10)
        .map(|i| hx::run("(y + x + z)", compiled.as_ref(), &mut vars, i, i * 2, i * 3))
        .collect();
    let expected: Vec<Option<Value>> = (0..10).map(|i| Some(Value::Int(i * 6))).collect();
    assert_eq!(out, expected);
}

#[test]
fn test_evaluator_reuses_compiled_form() {
    let mut ev = hx::Evaluator::new("x * x + y").unwrap();
    assert_eq!(ev.eval(3, 1, 0).unwrap(), Value::Int(10));
    assert_eq!(ev.eval(-4, 0, 0).unwrap(), Value::Int(16));
    assert_eq!(ev.compiled().source(), "x * x + y");
}

#[test]
fn test_random_is_not_folded() {
    let library = hx::build_library().unwrap();
    let compiled = library.compile("random() < 1.0").unwrap();
    assert!(!compiled.is_constant());
    assert_eq!(compiled.invoke(&hx::Variables::new()).unwrap(), Value::Bool(true));
}
