use std::{fmt, rc::Rc};

use crate::{
    ast::Lambda,
    eval::Env,
    op::Operator,
    pkg::PackageValue,
    primitive::Primitive,
    value::{Ident, Value},
};

/// A function value: a registered primitive, a function variable
/// resolved at call time, a lambda closure, a train, an
/// operator-derived function or a callable host object
///
/// Operator-derived functions keep their operands instead of expanding
/// into closures, so printed representations stay meaningful.
#[derive(Debug, Clone)]
pub enum Function {
    Prim(Primitive),
    /// A lowercase function variable, looked up on every call
    Named(Ident),
    /// A lambda with its captured lexical environment
    Lambda(Rc<Lambda>, Env),
    /// A tacit train; the leftmost element may be a value
    Train(Rc<Vec<Value>>),
    Derived(Rc<Derived>),
    /// A function with a bound bracket axis
    Axis(Rc<(Function, Value)>),
    /// A callable host object
    Host(Rc<dyn PackageValue>),
}

/// An operator application: the operator and its bound operands
///
/// Operands may be functions or arrays; the hybrid glyphs `/ ⌿ \ ⍀`
/// and forms like `f⍣n` or `n∘g` carry array operands.
#[derive(Debug, Clone)]
pub struct Derived {
    pub op: Operator,
    pub f: Value,
    pub g: Option<Value>,
}

impl Function {
    /// Strip bound axes, returning the underlying function and the
    /// innermost axis if any
    pub fn unaxis(&self) -> (&Function, Option<&Value>) {
        match self {
            Function::Axis(inner) => (&inner.0, Some(&inner.1)),
            f => (f, None),
        }
    }
    /// The primitive at the bottom of any axis wrappers
    pub fn as_prim(&self) -> Option<Primitive> {
        match self.unaxis().0 {
            Function::Prim(p) => Some(*p),
            _ => None,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Prim(p) => write!(f, "{}", p.glyph()),
            Function::Named(name) => write!(f, "{name}"),
            Function::Lambda(lambda, _) => write!(f, "{}", lambda.text),
            Function::Train(parts) => {
                write!(f, "(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match part {
                        Value::Func(g) => write!(f, "{g}")?,
                        v => write!(f, "{v}")?,
                    }
                }
                write!(f, ")")
            }
            Function::Derived(d) => {
                let left = match &d.f {
                    Value::Func(g) => g.to_string(),
                    v => v.to_string(),
                };
                match (&d.op, &d.g) {
                    (Operator::Outer, _) => write!(f, "∘.{left}"),
                    (op, Some(g)) => {
                        let right = match g {
                            Value::Func(g) => g.to_string(),
                            v => v.to_string(),
                        };
                        write!(f, "{left}{}{right}", op.glyph())
                    }
                    (op, None) => write!(f, "{left}{}", op.glyph()),
                }
            }
            Function::Axis(inner) => write!(f, "{}[{}]", inner.0, inner.1),
            Function::Host(host) => write!(f, "{}", host.name()),
        }
    }
}
