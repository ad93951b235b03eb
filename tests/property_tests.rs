use hello_expr::{evaluate, Value, Variables};
use proptest::prelude::*;

proptest! {
    #[test]
    fn integer_arithmetic_matches_rust(x in -100i32..100, y in -100i32..100, z in -100i32..100) {
        let (a, b, c) = (x as i64, y as i64, z as i64);
        prop_assert_eq!(evaluate("x + y * z", &[x, y, z]), Some(Value::Int(a + b * c)));
        prop_assert_eq!(evaluate("(x - y) * z", &[x, y, z]), Some(Value::Int((a - b) * c)));
        prop_assert_eq!(evaluate("-x + y - -z", &[x, y, z]), Some(Value::Int(-a + b + c)));
    }

    #[test]
    fn division_is_real(x in -100i32..100, y in 1i32..100) {
        prop_assert_eq!(evaluate("x / y", &[x, y]), Some(Value::Float(x as f64 / y as f64)));
    }

    #[test]
    fn remainder_matches_rust(x in -100i32..100, y in -100i32..100) {
        let expected = if y == 0 { None } else { Some(Value::Int(x as i64 % y as i64)) };
        prop_assert_eq!(evaluate("x % y", &[x, y]), expected);
    }

    #[test]
    fn boolean_logic_matches_rust(x in -20i32..20, y in -20i32..20, z in -20i32..20) {
        let expected = (x < y && y <= z) || !(x == z);
        prop_assert_eq!(
            evaluate("(x < y && y <= z) || !(x == z)", &[x, y, z]),
            Some(Value::Bool(expected))
        );
    }

    #[test]
    fn predicates_match_direct_calls(n in -50i32..2000) {
        prop_assert_eq!(evaluate("isFibonacci(x)", &[n]), Some(Value::Bool(Variables::is_fibonacci(n))));
        prop_assert_eq!(evaluate("isPrime(x)", &[n]), Some(Value::Bool(Variables::is_prime(n))));
        prop_assert_eq!(
            evaluate("isSquarePyramidNumber(x)", &[n]),
            Some(Value::Bool(Variables::is_square_pyramid_number(n)))
        );
    }
}
