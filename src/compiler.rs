use crate::context::Variables;
use crate::errors::{EvalError, Result};
use crate::expression::{parse_expr, BinaryOp, ENode, ENodeKind, UnaryOp};
use crate::functions::{Accessor, Function};
use crate::library::{Library, Member};
use crate::value::{cmp_numbers, values_equal, Type, Value};
use std::fmt;
use std::sync::Arc;

/// Resolved, type-checked code. Names are already bound to functions or
/// accessors, so running it never looks anything up.
#[derive(Clone)]
enum Code {
    Const(Value),
    Read(Accessor),
    Call {
        func: Arc<dyn Function>,
        args: Vec<Code>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Code>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Code>,
        right: Box<Code>,
    },
}

impl Code {
    fn as_const(&self) -> Option<Value> {
        match self {
            Code::Const(v) => Some(*v),
            _ => None,
        }
    }
}

/// An expression compiled against a [`Library`]. Immutable; invoke it as
/// often as needed with different [`Variables`].
#[derive(Clone)]
pub struct CompiledExpression {
    source: String,
    code: Code,
    ty: Type,
}

impl CompiledExpression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn result_type(&self) -> Type {
        self.ty
    }

    /// True when the whole expression folded to a single value.
    pub fn is_constant(&self) -> bool {
        matches!(self.code, Code::Const(_))
    }

    pub fn invoke(&self, vars: &Variables) -> Result<Value> {
        eval(&self.code, vars)
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExpression")
            .field("source", &self.source)
            .field("type", &self.ty)
            .field("constant", &self.is_constant())
            .finish()
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

pub fn compile(expression: &str, library: &Library) -> Result<CompiledExpression> {
    let ast = parse_expr(expression)?;
    let (code, ty) = Compiler { library }.node(&ast)?;
    Ok(CompiledExpression {
        source: expression.to_string(),
        code,
        ty,
    })
}

struct Compiler<'a> {
    library: &'a Library,
}

impl Compiler<'_> {
    fn node(&self, node: &ENode) -> Result<(Code, Type)> {
        match &node.kind {
            ENodeKind::Literal(v) => Ok((Code::Const(*v), v.ty())),
            ENodeKind::Call { name, args } => self.call(name, args, node.column),
            ENodeKind::Unary { op, operand } => self.unary(*op, operand, node.column),
            ENodeKind::Binary { op, left, right } => self.binary(*op, left, right, node.column),
        }
    }

    fn call(&self, name: &str, args: &[ENode], column: usize) -> Result<(Code, Type)> {
        let func = match self.library.resolve(name) {
            Some(Member::Dynamic(acc)) => {
                if !args.is_empty() {
                    return Err(EvalError::compilation(
                        format!("`{name}` takes no arguments"),
                        column,
                    ));
                }
                return Ok((Code::Read(acc), Type::Int));
            }
            Some(Member::Static(func)) => func,
            None => return Err(EvalError::compilation(self.unknown(name), column)),
        };

        if func.arity() != args.len() {
            return Err(EvalError::compilation(
                format!(
                    "`{name}` expects {} argument(s), got {}",
                    func.arity(),
                    args.len()
                ),
                column,
            ));
        }

        let mut compiled = Vec::with_capacity(args.len());
        for (i, (arg, &param)) in args.iter().zip(func.params()).enumerate() {
            let (code, ty) = self.node(arg)?;
            if !ty.assignable_to(param) {
                return Err(EvalError::compilation(
                    format!("argument {} of `{name}` must be {param}, found {ty}", i + 1),
                    arg.column,
                ));
            }
            compiled.push(code);
        }

        let ty = func.returns();
        if self.library.folds_constants() && !self.library.is_state_dependent(name) {
            let consts: Option<Vec<Value>> = compiled.iter().map(Code::as_const).collect();
            if let Some(consts) = consts {
                if let Ok(v) = call_checked(func.as_ref(), &consts) {
                    return Ok((Code::Const(v), ty));
                }
            }
        }
        Ok((
            Code::Call {
                func,
                args: compiled,
            },
            ty,
        ))
    }

    fn unknown(&self, name: &str) -> String {
        match self
            .library
            .names()
            .into_iter()
            .find(|n| n.eq_ignore_ascii_case(name))
        {
            Some(close) => format!("unknown name `{name}`; did you mean `{close}`?"),
            None => format!("unknown name `{name}`"),
        }
    }

    fn unary(&self, op: UnaryOp, operand: &ENode, column: usize) -> Result<(Code, Type)> {
        let (code, ty) = self.node(operand)?;
        let ok = match op {
            UnaryOp::Neg => ty.is_numeric(),
            UnaryOp::Not => ty == Type::Bool,
        };
        if !ok {
            return Err(EvalError::compilation(
                format!("operator `{op}` cannot be applied to {ty}"),
                column,
            ));
        }
        let code = Code::Unary {
            op,
            operand: Box::new(code),
        };
        Ok((self.fold(code), ty))
    }

    fn binary(&self, op: BinaryOp, left: &ENode, right: &ENode, column: usize) -> Result<(Code, Type)> {
        let (lcode, lt) = self.node(left)?;
        let (rcode, rt) = self.node(right)?;
        let numeric = lt.is_numeric() && rt.is_numeric();
        let ty = match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Rem if numeric => {
                Some(lt.promote(rt))
            }
            BinaryOp::Div if numeric => Some(Type::Float),
            BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte if numeric => {
                Some(Type::Bool)
            }
            BinaryOp::Eq | BinaryOp::Ne if numeric || (lt == Type::Bool && rt == Type::Bool) => {
                Some(Type::Bool)
            }
            BinaryOp::And | BinaryOp::Or if lt == Type::Bool && rt == Type::Bool => {
                Some(Type::Bool)
            }
            _ => None,
        };
        let Some(ty) = ty else {
            return Err(EvalError::compilation(
                format!("operator `{op}` cannot be applied to {lt} and {rt}"),
                column,
            ));
        };
        let code = Code::Binary {
            op,
            left: Box::new(lcode),
            right: Box::new(rcode),
        };
        Ok((self.fold(code), ty))
    }

    /// Evaluate operator nodes whose operands are constants. A fold that
    /// faults is kept as code so the fault surfaces on invocation.
    fn fold(&self, code: Code) -> Code {
        if !self.library.folds_constants() {
            return code;
        }
        let all_const = match &code {
            Code::Unary { operand, .. } => operand.as_const().is_some(),
            Code::Binary { left, right, .. } => {
                left.as_const().is_some() && right.as_const().is_some()
            }
            _ => false,
        };
        if !all_const {
            return code;
        }
        match eval(&code, &Variables::default()) {
            Ok(v) => Code::Const(v),
            Err(_) => code,
        }
    }
}

fn call_checked(func: &dyn Function, args: &[Value]) -> Result<Value> {
    let value = func.call(args)?;
    if value.ty() != func.returns() {
        return Err(EvalError::Invocation(format!(
            "`{}` returned {}, declared {}",
            func.name(),
            value.ty(),
            func.returns()
        )));
    }
    Ok(value)
}

fn eval(code: &Code, vars: &Variables) -> Result<Value> {
    match code {
        Code::Const(v) => Ok(*v),
        Code::Read(acc) => Ok(Value::Int(i64::from((acc.read)(vars)))),
        Code::Call { func, args } => {
            let args = args
                .iter()
                .map(|a| eval(a, vars))
                .collect::<Result<Vec<_>>>()?;
            call_checked(func.as_ref(), &args)
        }
        Code::Unary { op, operand } => {
            let v = eval(operand, vars)?;
            match (op, v) {
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (UnaryOp::Neg, Value::Int(i)) => i
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| EvalError::Invocation(format!("integer overflow in -({i})"))),
                (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
                (op, v) => Err(mismatch(&op.to_string(), &[v])),
            }
        }
        Code::Binary { op, left, right } => {
            let l = eval(left, vars)?;
            // && and || short-circuit
            match (op, l) {
                (BinaryOp::And, Value::Bool(false)) => return Ok(Value::Bool(false)),
                (BinaryOp::Or, Value::Bool(true)) => return Ok(Value::Bool(true)),
                _ => {}
            }
            let r = eval(right, vars)?;
            apply_binary(*op, l, r)
        }
    }
}

fn mismatch(op: &str, operands: &[Value]) -> EvalError {
    let types: Vec<String> = operands.iter().map(|v| v.ty().to_string()).collect();
    EvalError::Invocation(format!(
        "operator `{op}` cannot be applied to {}",
        types.join(" and ")
    ))
}

fn apply_binary(op: BinaryOp, l: Value, r: Value) -> Result<Value> {
    use std::cmp::Ordering;
    match op {
        BinaryOp::And | BinaryOp::Or => match (l.as_bool(), r.as_bool()) {
            (Some(_), Some(b)) => Ok(Value::Bool(b)),
            _ => Err(mismatch(&op.to_string(), &[l, r])),
        },
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&l, &r))),
        BinaryOp::Ne => Ok(Value::Bool(!values_equal(&l, &r))),
        BinaryOp::Lt => Ok(Value::Bool(cmp_numbers(&l, &r, |o| o == Ordering::Less))),
        BinaryOp::Lte => Ok(Value::Bool(cmp_numbers(&l, &r, |o| o != Ordering::Greater))),
        BinaryOp::Gt => Ok(Value::Bool(cmp_numbers(&l, &r, |o| o == Ordering::Greater))),
        BinaryOp::Gte => Ok(Value::Bool(cmp_numbers(&l, &r, |o| o != Ordering::Less))),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            arithmetic(op, l, r)
        }
    }
}

fn arithmetic(op: BinaryOp, l: Value, r: Value) -> Result<Value> {
    if let (Value::Int(a), Value::Int(b)) = (l, r) {
        let out = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Div => return Ok(Value::Float(a as f64 / b as f64)),
            BinaryOp::Rem if b == 0 => {
                return Err(EvalError::Invocation("integer remainder by zero".into()))
            }
            BinaryOp::Rem => a.checked_rem(b),
            _ => None,
        };
        return out
            .map(Value::Int)
            .ok_or_else(|| EvalError::Invocation(format!("integer overflow in {a} {op} {b}")));
    }
    let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) else {
        return Err(mismatch(&op.to_string(), &[l, r]));
    };
    let out = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        _ => return Err(mismatch(&op.to_string(), &[l, r])),
    };
    Ok(Value::Float(out))
}
