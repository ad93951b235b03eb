// src/expression.rs
use crate::errors::{EvalError, Result};
use crate::parser::{Parser, MAX_DEPTH};
use crate::value::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        f.write_str(s)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        })
    }
}

/// Parsed expression. `column` is where the node's token starts (for
/// operators, the operator itself). `height` counts nodes on the longest
/// path down to a leaf and never exceeds [`MAX_DEPTH`].
#[derive(Debug, Clone, PartialEq)]
pub struct ENode {
    pub kind: ENodeKind,
    pub column: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ENodeKind {
    Literal(Value),
    /// `name` or `name(args)`; a bare name is a call with no arguments.
    Call { name: String, args: Vec<ENode> },
    Unary { op: UnaryOp, operand: Box<ENode> },
    Binary { op: BinaryOp, left: Box<ENode>, right: Box<ENode> },
}

pub fn parse_expr(input: &str) -> Result<ENode> {
    let mut p = Parser::new(input);
    p.skip_ws();
    if p.eof() {
        return Err(p.error("empty expression"));
    }
    let node = parse_or(&mut p)?;
    p.skip_ws();
    if !p.eof() {
        return Err(p.error(format!("unexpected `{}`", rest_token(&p))));
    }
    Ok(node)
}

fn rest_token(p: &Parser) -> String {
    p.peek_char().map(String::from).unwrap_or_default()
}

fn node(kind: ENodeKind, column: usize) -> Result<ENode> {
    let below = match &kind {
        ENodeKind::Literal(_) => 0,
        ENodeKind::Call { args, .. } => args.iter().map(|a| a.height).max().unwrap_or(0),
        ENodeKind::Unary { operand, .. } => operand.height,
        ENodeKind::Binary { left, right, .. } => left.height.max(right.height),
    };
    if below >= MAX_DEPTH {
        return Err(EvalError::compilation("expression nested too deeply", column));
    }
    Ok(ENode {
        kind,
        column,
        height: below + 1,
    })
}

fn binary(op: BinaryOp, column: usize, left: ENode, right: ENode) -> Result<ENode> {
    let kind = ENodeKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    };
    node(kind, column)
}

fn parse_or(p: &mut Parser) -> Result<ENode> {
    let mut left = parse_and(p)?;
    loop {
        p.skip_ws();
        let column = p.column();
        if p.consume_str("||") {
            let right = parse_and(p)?;
            left = binary(BinaryOp::Or, column, left, right)?;
        } else {
            break;
        }
    }
    Ok(left)
}

fn parse_and(p: &mut Parser) -> Result<ENode> {
    let mut left = parse_equality(p)?;
    loop {
        p.skip_ws();
        let column = p.column();
        if p.consume_str("&&") {
            let right = parse_equality(p)?;
            left = binary(BinaryOp::And, column, left, right)?;
        } else {
            break;
        }
    }
    Ok(left)
}

fn parse_equality(p: &mut Parser) -> Result<ENode> {
    let mut left = parse_relation(p)?;
    loop {
        p.skip_ws();
        let column = p.column();
        let op = if p.consume_str("==") {
            BinaryOp::Eq
        } else if p.consume_str("!=") {
            BinaryOp::Ne
        } else {
            break;
        };
        let right = parse_relation(p)?;
        left = binary(op, column, left, right)?;
    }
    Ok(left)
}

/// Relations do not chain: `a < b < c` stops after `a < b`.
fn parse_relation(p: &mut Parser) -> Result<ENode> {
    let left = parse_additive(p)?;
    p.skip_ws();
    let column = p.column();
    let op = if p.consume_str("<=") {
        BinaryOp::Lte
    } else if p.consume_str(">=") {
        BinaryOp::Gte
    } else if p.consume_char('<') {
        BinaryOp::Lt
    } else if p.consume_char('>') {
        BinaryOp::Gt
    } else {
        return Ok(left);
    };
    let right = parse_additive(p)?;
    binary(op, column, left, right)
}

fn parse_additive(p: &mut Parser) -> Result<ENode> {
    let mut left = parse_term(p)?;
    loop {
        p.skip_ws();
        let column = p.column();
        let op = if p.consume_char('+') {
            BinaryOp::Add
        } else if p.consume_char('-') {
            BinaryOp::Sub
        } else {
            break;
        };
        let right = parse_term(p)?;
        left = binary(op, column, left, right)?;
    }
    Ok(left)
}

fn parse_term(p: &mut Parser) -> Result<ENode> {
    let mut left = parse_unary(p)?;
    loop {
        p.skip_ws();
        let column = p.column();
        let op = if p.consume_char('*') {
            BinaryOp::Mul
        } else if p.consume_char('/') {
            BinaryOp::Div
        } else if p.consume_char('%') {
            BinaryOp::Rem
        } else {
            break;
        };
        let right = parse_unary(p)?;
        left = binary(op, column, left, right)?;
    }
    Ok(left)
}

fn parse_unary(p: &mut Parser) -> Result<ENode> {
    p.skip_ws();
    let column = p.column();
    let op = if p.peek_str("!=") {
        None
    } else if p.consume_char('!') {
        Some(UnaryOp::Not)
    } else if p.consume_char('-') {
        Some(UnaryOp::Neg)
    } else {
        None
    };
    match op {
        Some(op) => {
            p.descend()?;
            let operand = parse_unary(p)?;
            p.ascend();
            let kind = ENodeKind::Unary {
                op,
                operand: Box::new(operand),
            };
            node(kind, column)
        }
        None => parse_primary(p),
    }
}

fn parse_primary(p: &mut Parser) -> Result<ENode> {
    p.skip_ws();
    let column = p.column();
    match p.peek_char() {
        None => Err(p.error("unexpected end of expression")),
        Some('(') => {
            p.descend()?;
            p.consume_char('(');
            let inner = parse_or(p)?;
            p.skip_ws();
            p.expect(')')?;
            p.ascend();
            Ok(inner)
        }
        Some(c) if c.is_ascii_digit() => {
            let value = p.parse_number_literal()?;
            node(ENodeKind::Literal(value), column)
        }
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            let name = p.parse_identifier()?;
            let kind = match name.as_str() {
                "true" => ENodeKind::Literal(Value::Bool(true)),
                "false" => ENodeKind::Literal(Value::Bool(false)),
                _ => {
                    p.skip_ws();
                    let args = if p.consume_char('(') {
                        p.descend()?;
                        let args = parse_args(p)?;
                        p.ascend();
                        args
                    } else {
                        Vec::new()
                    };
                    ENodeKind::Call { name, args }
                }
            };
            node(kind, column)
        }
        Some(c) => Err(p.error(format!("unexpected `{c}`"))),
    }
}

/// Arguments after the opening parenthesis, through the closing one.
fn parse_args(p: &mut Parser) -> Result<Vec<ENode>> {
    let mut out = Vec::new();
    p.skip_ws();
    if p.consume_char(')') {
        return Ok(out);
    }
    loop {
        out.push(parse_or(p)?);
        p.skip_ws();
        if p.consume_char(',') {
            continue;
        }
        p.expect(')')?;
        return Ok(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape(node: &ENode) -> String {
        match &node.kind {
            ENodeKind::Literal(v) => v.to_string(),
            ENodeKind::Call { name, args } if args.is_empty() => name.clone(),
            ENodeKind::Call { name, args } => {
                let args: Vec<String> = args.iter().map(shape).collect();
                format!("{name}({})", args.join(", "))
            }
            ENodeKind::Unary { op, operand } => format!("({op}{})", shape(operand)),
            ENodeKind::Binary { op, left, right } => {
                format!("({} {op} {})", shape(left), shape(right))
            }
        }
    }

    fn parsed(input: &str) -> String {
        shape(&parse_expr(input).unwrap())
    }

    #[test]
    fn precedence() {
        assert_eq!(parsed("2 + 3 / x"), "(2 + (3 / x))");
        assert_eq!(parsed("a || b && c"), "(a || (b && c))");
        assert_eq!(parsed("x + 1 == y * 2"), "((x + 1) == (y * 2))");
        assert_eq!(parsed("1 - 2 - 3"), "((1 - 2) - 3)");
        assert_eq!(parsed("-x % 3"), "((-x) % 3)");
    }

    #[test]
    fn calls_and_bare_names() {
        assert_eq!(
            parsed("isSquarePyramidNumber(x) && isFibonacci(y)"),
            "(isSquarePyramidNumber(x) && isFibonacci(y))"
        );
        assert_eq!(parsed("pow(x, 2.5)"), "pow(x, 2.5)");
        assert_eq!(parsed("random()"), "random");
        assert_eq!(parsed("!true != false"), "((!true) != false)");
    }

    #[test]
    fn operator_columns() {
        let node = parse_expr("(y + x + z) == 111").unwrap();
        assert_eq!(node.column, 13);
    }

    #[test]
    fn malformed_inputs_report_columns() {
        let cases = [
            ("2 + + 2", 5),
            ("", 1),
            ("(1 + 2", 7),
            ("1 2", 3),
            ("x = 1", 3),
            ("f(1,", 5),
            ("3 # 4", 3),
        ];
        for (input, column) in cases {
            let err = parse_expr(input).unwrap_err();
            assert_eq!(err.column(), Some(column), "{input}");
        }
    }

    #[test]
    fn nesting_is_bounded() {
        let ok = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parsed(&ok), "x");
        assert_eq!(parse_expr(&format!("{}x", "-".repeat(50))).unwrap().height, 51);

        let too_deep = [
            format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000)),
            format!("{}x", "!".repeat(10_000)),
            format!("{}1{}", "abs(".repeat(10_000), ")".repeat(10_000)),
            vec!["1"; 10_000].join(" + "),
        ];
        for input in &too_deep {
            let err = parse_expr(input).unwrap_err();
            assert!(err.to_string().contains("nested too deeply"), "{err}");
        }
        // the first paren past the limit is the one reported
        let err = parse_expr(&too_deep[0]).unwrap_err();
        assert_eq!(err.column(), Some(MAX_DEPTH + 1));
    }
}
