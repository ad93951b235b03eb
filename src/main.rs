use clap::Parser;
use hello_expr::{build_library, compile, evaluate, run, Value, Variables};
use tracing::{error, Level};

/// Expression evaluation demo: compile small expressions over `x`, `y`, `z`
/// and run them with different inputs.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Evaluate this expression instead of running the scripted demo.
    #[arg(long)]
    expr: Option<String>,
    /// Value bound to `x` (with --expr)
    #[arg(short = 'x', default_value_t = 0, allow_negative_numbers = true)]
    x: i32,
    /// Value bound to `y` (with --expr)
    #[arg(short = 'y', default_value_t = 0, allow_negative_numbers = true)]
    y: i32,
    /// Value bound to `z` (with --expr)
    #[arg(short = 'z', default_value_t = 0, allow_negative_numbers = true)]
    z: i32,
    /// Print results as JSON values
    #[arg(long)]
    json: bool,
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    // Parse CLI arguments.
    let args = Args::parse();

    // Diagnostics go to stderr, results to stdout.
    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();

    let show = |result: Option<Value>| -> String {
        if args.json {
            serde_json::to_string(&result).unwrap_or_else(|_| "null".to_string())
        } else {
            result.map(|v| v.to_string()).unwrap_or_else(|| "null".to_string())
        }
    };

    if let Some(expr) = args.expr.as_deref() {
        println!("{}", show(evaluate(expr, &[args.x, args.y, args.z])));
        return;
    }

    println!("\nThe simplest example does not use any variables.");
    println!("   result: {}", show(evaluate("2+2", &[])));
    println!("\nThe following example uses one variable.");
    println!("   result: {}", show(evaluate("2 + 3 / x", &[4])));
    println!("\nThe following examples use three variables.");
    println!("   result: {}", show(evaluate("(y + x + z)", &[1, 10, 100])));
    println!("   result: {}", show(evaluate("(y + x + z) == 111", &[1, 10, 100])));
    println!("   result: {}", show(evaluate("(y + x + z) == 111", &[3, 4, 5])));
    println!("   result: {}", show(evaluate("(((x*x) + (y*y)) == (z*z))", &[3, 4, 5])));
    println!("\nThe following examples call predicates from the Variables namespace.");
    println!(
        "   result: {}",
        show(evaluate("isSquarePyramidNumber(x) && isFibonacci(y)", &[30, 55]))
    );
    println!(
        "   result: {}",
        show(evaluate("isPrime(x) && isPerfectCube(y) && isPerfectSquare(z)", &[67, 27, 64]))
    );

    println!("\nIf lots of data must be fed into the same expression, compile it separately first.");
    let library = match build_library() {
        Ok(library) => library,
        Err(e) => {
            error!("{e}");
            return;
        }
    };
    let expression = "(y + x + z)";
    let compiled = compile(expression, &library);
    let mut vars = Variables::new();
    for i in 0..10 {
        let result = run(expression, compiled.as_ref(), &mut vars, i, i * 2, i * 3);
        println!("{i}.  Loop result ==> {}", show(result));
    }
}
