use std::rc::Rc;

use ecow::EcoString;

use crate::{lex::Sp, num::Num, op::Operator, value::Ident};

/// A parsed expression
///
/// Function-or-value classification follows the naming law: glyphs,
/// lambdas, trains and lowercase-first identifiers are functions,
/// everything else is a value.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A numeric literal
    Num(Num),
    /// A double-quoted string scalar
    Str(EcoString),
    /// A single-quoted character vector
    Chars(EcoString),
    /// A name; resolution and classification happen at evaluation
    Ident(Ident),
    /// A primitive glyph in function position
    Glyph(char),
    /// Juxtaposed value expressions forming a vector
    Strand(Vec<Sp<Expr>>),
    Monadic(Box<Monadic>),
    Dyadic(Box<Dyadic>),
    /// An operator with its bound operands
    Derived(Box<DerivedExpr>),
    /// A function with a bracket axis
    Axis(Box<AxisExpr>),
    /// A parenthesised 2+-function tacit form
    Train(Vec<Sp<Expr>>),
    Lambda(Rc<Lambda>),
    /// Bracket indexing `X[i;…]`; `None` subscripts select everything
    /// along their axis
    Index(Box<IndexExpr>),
    Assign(Box<AssignExpr>),
}

#[derive(Debug, Clone)]
pub struct Monadic {
    pub f: Sp<Expr>,
    pub r: Sp<Expr>,
}

#[derive(Debug, Clone)]
pub struct Dyadic {
    pub l: Sp<Expr>,
    pub f: Sp<Expr>,
    pub r: Sp<Expr>,
}

#[derive(Debug, Clone)]
pub struct DerivedExpr {
    pub op: Operator,
    /// The left operand: a function, or an array for the hybrid forms
    pub f: Sp<Expr>,
    /// The right operand of a dyadic operator
    pub g: Option<Sp<Expr>>,
}

#[derive(Debug, Clone)]
pub struct AxisExpr {
    pub f: Sp<Expr>,
    pub axis: Sp<Expr>,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub x: Sp<Expr>,
    pub subs: Vec<Option<Sp<Expr>>>,
}

/// One of the five assignment flavours
///
/// Simple, multiple and indexed assignment are distinguished by the
/// target expression; a modifier function makes it a modified
/// assignment; any other structural target is a selective
/// specification.
#[derive(Debug, Clone)]
pub struct AssignExpr {
    pub target: Sp<Expr>,
    pub modifier: Option<Sp<Expr>>,
    pub value: Sp<Expr>,
}

/// A lambda body: guarded clauses evaluated in order
#[derive(Debug, Clone)]
pub struct Lambda {
    pub clauses: Vec<Clause>,
    /// The source text, kept for display
    pub text: EcoString,
}

#[derive(Debug, Clone)]
pub struct Clause {
    pub guard: Option<Sp<Expr>>,
    pub body: Sp<Expr>,
}
