use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::{AssignExpr, Expr, Lambda},
    error::{AplError, AplResult},
    function::{Derived, Function},
    lex::Sp,
    parse::is_function_name,
    pkg::{upper_key, PackageValue},
    primitive::Primitive,
    value::{Ident, Value},
    Apl,
};

/// A lexical environment: name bindings and a parent pointer
///
/// Environments are shared by closures; the runtime owns the root.
#[derive(Debug, Clone)]
pub struct Env(Rc<EnvInner>);

#[derive(Debug)]
struct EnvInner {
    vars: RefCell<HashMap<Ident, Value>>,
    parent: Option<Env>,
}

impl Env {
    pub fn new(parent: Option<Env>) -> Self {
        Env(Rc::new(EnvInner {
            vars: RefCell::new(HashMap::new()),
            parent,
        }))
    }
    /// Walk the parent chain for a binding
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut env = Some(self);
        while let Some(e) = env {
            if let Some(v) = e.0.vars.borrow().get(name) {
                return Some(v.clone());
            }
            env = e.0.parent.as_ref();
        }
        None
    }
    /// The environment holding a binding, if any
    pub fn holder(&self, name: &str) -> Option<Env> {
        let mut env = Some(self.clone());
        while let Some(e) = env {
            if e.0.vars.borrow().contains_key(name) {
                return Some(e);
            }
            env = e.0.parent.clone();
        }
        None
    }
    pub fn contains_local(&self, name: &str) -> bool {
        self.0.vars.borrow().contains_key(name)
    }
    /// Bind in this environment
    pub fn set_local(&self, name: Ident, v: Value) {
        self.0.vars.borrow_mut().insert(name, v);
    }
    /// Update where the name is bound, or bind here if nowhere
    pub fn set_where_found(&self, name: Ident, v: Value) {
        match self.holder(&name) {
            Some(env) => env.set_local(name, v),
            None => self.set_local(name, v),
        }
    }
    pub fn names(&self) -> Vec<Ident> {
        self.0.vars.borrow().keys().cloned().collect()
    }
}

/// The result of one round of lambda clauses
enum LambdaFlow {
    Done(Value),
    /// A self-call in tail position reuses the frame
    Tail(Option<Value>, Value),
}

impl Apl {
    pub(crate) fn eval(&mut self, expr: &Sp<Expr>) -> AplResult {
        let span = expr.span;
        let result = match &expr.value {
            Expr::Num(n) => Ok(Value::Num(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Chars(s) => Ok(chars_value(s)),
            Expr::Ident(name) => Ok(self.eval_ident(name)),
            Expr::Glyph(_)
            | Expr::Lambda(_)
            | Expr::Train(_)
            | Expr::Derived(_)
            | Expr::Axis(_) => self.eval_fn(expr).map(Value::Func),
            Expr::Strand(parts) => {
                let mut vals = vec![Value::Empty; parts.len()];
                for i in (0..parts.len()).rev() {
                    vals[i] = self.eval(&parts[i])?;
                }
                Ok(Value::vector(vals))
            }
            Expr::Monadic(m) => {
                let r = self.eval(&m.r)?;
                let f = self.eval_fn(&m.f)?;
                self.call_function(&f, None, r, None)
            }
            Expr::Dyadic(d) => {
                let r = self.eval(&d.r)?;
                let l = self.eval(&d.l)?;
                let f = self.eval_fn(&d.f)?;
                self.call_function(&f, Some(l), r, None)
            }
            Expr::Index(ix) => {
                let mut subs = vec![None; ix.subs.len()];
                for i in (0..ix.subs.len()).rev() {
                    if let Some(sub) = &ix.subs[i] {
                        subs[i] = Some(self.eval(sub)?);
                    }
                }
                let x = self.eval(&ix.x)?;
                if let Value::Pkg(host) = &x {
                    pkg_at(host.as_ref(), &subs)
                } else {
                    crate::algorithm::dyadic::index_value(&x, &subs, self.origin)
                }
            }
            Expr::Assign(a) => self.eval_assign(a),
        };
        result.map_err(|e| e.at(span))
    }

    /// Resolve a name in value position; unbound names evaluate to
    /// themselves
    fn eval_ident(&mut self, name: &Ident) -> Value {
        match name.as_str() {
            "⎕IO" => return Value::int(self.origin),
            "⎕PP" => return Value::int(self.format.pp as i64),
            "⎕NL" => return Value::Str("\n".into()),
            _ => {}
        }
        if let Some(v) = self.package_var(name) {
            return v;
        }
        self.env
            .get(name)
            .unwrap_or_else(|| Value::Ident(name.clone()))
    }

    /// Evaluate an expression in function position
    pub(crate) fn eval_fn(&mut self, expr: &Sp<Expr>) -> AplResult<Function> {
        match &expr.value {
            Expr::Glyph(c) => Primitive::from_glyph(*c)
                .map(Function::Prim)
                .ok_or_else(|| AplError::name(format!("unknown primitive {c}")).at(expr.span)),
            Expr::Ident(name) => Ok(Function::Named(name.clone())),
            Expr::Lambda(lambda) => Ok(Function::Lambda(lambda.clone(), self.env.clone())),
            Expr::Train(parts) => {
                let mut vals = Vec::with_capacity(parts.len());
                for part in parts {
                    vals.push(self.eval_operand(part)?);
                }
                Ok(Function::Train(Rc::new(vals)))
            }
            Expr::Derived(d) => {
                let f = self.eval_operand(&d.f)?;
                let g = match &d.g {
                    Some(g) => Some(self.eval_operand(g)?),
                    None => None,
                };
                Ok(Function::Derived(Rc::new(Derived { op: d.op, f, g })))
            }
            Expr::Axis(a) => {
                let axis = self.eval(&a.axis)?;
                let inner = self.eval_fn(&a.f)?;
                Ok(Function::Axis(Rc::new((inner, axis))))
            }
            _ => match self.eval(expr)? {
                Value::Func(f) => Ok(f),
                v => Err(AplError::name(format!("{} is not a function", v.type_name()))
                    .at(expr.span)),
            },
        }
    }

    /// Evaluate an operator operand, which may be a function or an
    /// array
    fn eval_operand(&mut self, expr: &Sp<Expr>) -> AplResult<Value> {
        match &expr.value {
            Expr::Glyph(_)
            | Expr::Lambda(_)
            | Expr::Train(_)
            | Expr::Derived(_)
            | Expr::Axis(_) => self.eval_fn(expr).map(Value::Func),
            Expr::Ident(name) if is_function_name(name) => {
                Ok(Value::Func(Function::Named(name.clone())))
            }
            _ => self.eval(expr),
        }
    }

    /// Apply a function value
    pub(crate) fn call_function(
        &mut self,
        f: &Function,
        l: Option<Value>,
        r: Value,
        axis: Option<&Value>,
    ) -> AplResult {
        match f {
            Function::Prim(p) => p.call(self, l.as_ref(), &r, axis),
            Function::Named(name) => {
                let resolved = if let Some(v) = self.package_var(name) {
                    Some(v)
                } else {
                    self.env.get(name)
                };
                match resolved {
                    Some(Value::Func(f)) => self.call_function(&f, l, r, axis),
                    Some(Value::Pkg(host)) => host.clone().call(self, l, r),
                    Some(v) => Err(AplError::name(format!(
                        "value in function variable {name} is not a function, but a {}",
                        v.type_name()
                    ))),
                    None => Err(AplError::name(format!("undefined function {name}"))),
                }
            }
            Function::Lambda(lambda, env) => {
                let lambda = lambda.clone();
                let env = env.clone();
                self.lambda_call(&lambda, &env, l, r)
            }
            Function::Train(parts) => {
                let parts = parts.clone();
                self.train_call(&parts, l, r)
            }
            Function::Derived(d) => {
                let d = d.clone();
                crate::op::call_derived(self, &d, l.as_ref(), &r, axis)
            }
            Function::Axis(inner) => {
                let inner = inner.clone();
                self.call_function(&inner.0, l, r, Some(&inner.1))
            }
            Function::Host(host) => host.clone().call(self, l, r),
        }
    }

    /// Call a lambda: fresh frame under the captured environment, with
    /// `⍵`, `⍺` and `∇` bound; tail self-calls loop in place
    fn lambda_call(
        &mut self,
        lambda: &Rc<Lambda>,
        closure: &Env,
        mut l: Option<Value>,
        mut r: Value,
    ) -> AplResult {
        loop {
            let frame = Env::new(Some(closure.clone()));
            frame.set_local("⍵".into(), r.clone());
            if let Some(l) = &l {
                frame.set_local("⍺".into(), l.clone());
            }
            frame.set_local(
                "∇".into(),
                Value::Func(Function::Lambda(lambda.clone(), closure.clone())),
            );
            let saved = std::mem::replace(&mut self.env, frame);
            let outcome = self.lambda_clauses(lambda);
            self.env = saved;
            match outcome? {
                LambdaFlow::Done(v) => return Ok(v),
                LambdaFlow::Tail(nl, nr) => {
                    l = nl;
                    r = nr;
                }
            }
        }
    }

    fn lambda_clauses(&mut self, lambda: &Lambda) -> AplResult<LambdaFlow> {
        let n = lambda.clauses.len();
        if n == 0 {
            return Ok(LambdaFlow::Done(Value::Empty));
        }
        for (i, clause) in lambda.clauses.iter().enumerate() {
            let last = i + 1 == n;
            if let Some(guard) = &clause.guard {
                let g = self.eval(guard)?;
                if is_true(&g) {
                    return self.clause_result(&clause.body);
                }
                continue;
            }
            if last {
                return self.clause_result(&clause.body);
            }
            self.eval(&clause.body)?;
        }
        Ok(LambdaFlow::Done(Value::Empty))
    }

    /// Evaluate a result clause, turning a direct `∇` application into
    /// a frame-reusing tail call
    fn clause_result(&mut self, body: &Sp<Expr>) -> AplResult<LambdaFlow> {
        match &body.value {
            Expr::Monadic(m) if is_nabla(&m.f) => {
                let r = self.eval(&m.r)?;
                Ok(LambdaFlow::Tail(None, r))
            }
            Expr::Dyadic(d) if is_nabla(&d.f) => {
                let r = self.eval(&d.r)?;
                let l = self.eval(&d.l)?;
                Ok(LambdaFlow::Tail(Some(l), r))
            }
            _ => self.eval(body).map(LambdaFlow::Done),
        }
    }

    /// Apply a train: even length is an atop of the head onto the
    /// rest, odd length a fork
    fn train_call(&mut self, parts: &[Value], l: Option<Value>, r: Value) -> AplResult {
        match parts.len() {
            0 => Ok(Value::Empty),
            1 => self.call_operand(&parts[0], l, r),
            n if n % 2 == 0 => {
                let h = self.train_call(&parts[1..], l, r)?;
                self.call_operand(&parts[0], None, h)
            }
            _ => {
                let right = self.train_call(&parts[2..], l.clone(), r.clone())?;
                let left = match &parts[0] {
                    Value::Func(f) => {
                        let f = f.clone();
                        self.call_function(&f, l, r, None)?
                    }
                    v => v.clone(),
                };
                self.call_operand(&parts[1], Some(left), right)
            }
        }
    }

    fn call_operand(&mut self, f: &Value, l: Option<Value>, r: Value) -> AplResult {
        match f {
            Value::Func(f) => {
                let f = f.clone();
                self.call_function(&f, l, r, None)
            }
            v => Err(AplError::name(format!(
                "{} is not applicable in a train",
                v.type_name()
            ))),
        }
    }

    fn eval_assign(&mut self, a: &AssignExpr) -> AplResult {
        let v = self.eval(&a.value)?;
        if let Some(m) = &a.modifier {
            let f = self.eval_fn(m)?;
            self.modified_assign(&a.target, &f, &v)?;
            return Ok(v);
        }
        match &a.target.value {
            Expr::Ident(name) => self.assign_name(name, v.clone())?,
            Expr::Strand(parts) => {
                let names = strand_names(parts)?;
                if !v.is_scalar() && v.size() != names.len() {
                    return Err(AplError::length(
                        "vector assignment: counts do not match",
                    ));
                }
                for (i, name) in names.iter().enumerate() {
                    let vi = if v.is_scalar() { v.clone() } else { v.at(i) };
                    self.assign_name(name, vi)?;
                }
            }
            Expr::Index(ix) => {
                let name = match &ix.x.value {
                    Expr::Ident(n) => n.clone(),
                    _ => {
                        return Err(AplError::domain(
                            "indexed assignment needs a variable",
                        ))
                    }
                };
                let cur = self
                    .env
                    .get(&name)
                    .ok_or_else(|| AplError::name(format!("undefined variable {name}")))?;
                let mut subs = vec![None; ix.subs.len()];
                for i in (0..ix.subs.len()).rev() {
                    if let Some(sub) = &ix.subs[i] {
                        subs[i] = Some(self.eval(sub)?);
                    }
                }
                // Writing through a host object goes to its set method
                if let Value::Pkg(host) = &cur {
                    match pkg_key(&subs)? {
                        Value::Str(field) => host.set(&upper_key(&field), v.clone())?,
                        k => {
                            return Err(AplError::domain(format!(
                                "field keys must be strings, not {}",
                                k.type_name()
                            )))
                        }
                    }
                    return Ok(v);
                }
                let (_, positions) =
                    crate::algorithm::dyadic::index_positions(&cur.shape(), &subs, self.origin)?;
                if !v.is_scalar() && v.size() != positions.len() {
                    return Err(AplError::length(
                        "indexed assignment: counts do not match",
                    ));
                }
                let mut elems = cur.elems();
                for (k, &p) in positions.iter().enumerate() {
                    elems[p] = if v.is_scalar() { v.clone() } else { v.at(k) };
                }
                self.env
                    .set_where_found(name, Value::from_elems(cur.shape(), elems));
            }
            _ => crate::invert::selective_assign(self, &a.target, &v)?,
        }
        Ok(v)
    }

    fn modified_assign(&mut self, target: &Sp<Expr>, f: &Function, v: &Value) -> AplResult<()> {
        // `⊢←` writes through to where the name is bound
        let is_tack = matches!(f.as_prim(), Some(Primitive::Right));
        let one = |apl: &mut Apl, name: &Ident, vi: Value| -> AplResult<()> {
            if is_tack {
                apl.check_naming_law(name, &vi)?;
                apl.env.set_where_found(name.clone(), vi);
                return Ok(());
            }
            let cur = apl
                .env
                .get(name)
                .ok_or_else(|| AplError::name(format!("undefined variable {name}")))?;
            let new = apl.call_function(f, Some(cur), vi, None)?;
            apl.env.set_where_found(name.clone(), new);
            Ok(())
        };
        match &target.value {
            Expr::Ident(name) => one(self, name, v.clone()),
            Expr::Strand(parts) => {
                let names = strand_names(parts)?;
                if !v.is_scalar() && v.size() != names.len() {
                    return Err(AplError::length(
                        "vector assignment: counts do not match",
                    ));
                }
                for (i, name) in names.iter().enumerate() {
                    let vi = if v.is_scalar() { v.clone() } else { v.at(i) };
                    one(self, name, vi)?;
                }
                Ok(())
            }
            _ => Err(AplError::domain("modified assignment needs a name")),
        }
    }

    /// Assign into the current environment, honouring the naming law
    /// and the reserved system names
    pub(crate) fn assign_name(&mut self, name: &Ident, v: Value) -> AplResult<()> {
        match name.as_str() {
            "⎕" => {
                self.print_value(&v)?;
                return Ok(());
            }
            "⎕IO" => {
                let origin = v
                    .as_index()
                    .filter(|&n| n == 0 || n == 1)
                    .ok_or_else(|| AplError::domain("index origin must be 0 or 1"))?;
                self.origin = origin;
                return Ok(());
            }
            "⎕PP" => {
                let pp = v
                    .as_index()
                    .filter(|&n| n >= 0)
                    .ok_or_else(|| AplError::domain("print precision must be non-negative"))?;
                self.format.pp = pp as usize;
                return Ok(());
            }
            _ => {}
        }
        if name.contains('→') {
            return Err(AplError::name("cannot assign to a package variable"));
        }
        self.check_naming_law(name, &v)?;
        // A declared default left argument never overwrites a given one
        if name == "⍺" && self.env.contains_local("⍺") {
            return Ok(());
        }
        self.env.set_local(name.clone(), v);
        Ok(())
    }

    fn check_naming_law(&self, name: &Ident, v: &Value) -> AplResult<()> {
        // A host object decides for itself whether it is value-like or
        // callable, so it may bind to either class of name
        if matches!(v, Value::Pkg(_)) {
            return Ok(());
        }
        let func_name = is_function_name(name);
        let func_value = v.is_func();
        if func_name && !func_value {
            return Err(AplError::name(format!(
                "only functions can be assigned to lowercase variable {name}"
            )));
        }
        if !func_name && func_value && !name.starts_with('⍺') && !name.starts_with('⍵') {
            return Err(AplError::name(format!(
                "cannot assign a function to uppercase variable {name}"
            )));
        }
        Ok(())
    }
}

/// Field access on a host object: `X["key"]` reads one field,
/// `X["a" "b"]` a vector of them; the first rune of each key is
/// upper-cased
fn pkg_at(host: &dyn PackageValue, subs: &[Option<Value>]) -> AplResult {
    let key = pkg_key(subs)?;
    if let Value::Str(name) = &key {
        return host
            .at(&upper_key(name))
            .ok_or_else(|| AplError::name(format!("{}: no field {name}", host.name())));
    }
    let mut out = Vec::with_capacity(key.size());
    for i in 0..key.size() {
        match key.at(i) {
            Value::Str(name) => out.push(host.at(&upper_key(&name)).ok_or_else(|| {
                AplError::name(format!("{}: no field {name}", host.name()))
            })?),
            v => {
                return Err(AplError::domain(format!(
                    "field keys must be strings, not {}",
                    v.type_name()
                )))
            }
        }
    }
    Ok(Value::vector(out))
}

/// The single key subscript of a host-object access
fn pkg_key(subs: &[Option<Value>]) -> AplResult {
    match subs {
        [Some(key)] => Ok(key.clone()),
        _ => Err(AplError::domain("host objects take a single key subscript")),
    }
}

fn is_nabla(expr: &Sp<Expr>) -> bool {
    matches!(&expr.value, Expr::Ident(name) if name == "∇")
}

fn is_true(v: &Value) -> bool {
    let n = if v.is_scalar() {
        v.as_num()
    } else if v.size() == 1 {
        v.at(0).as_num()
    } else {
        None
    };
    n.is_some_and(|n| !n.is_zero())
}

fn chars_value(s: &str) -> Value {
    let chars: Vec<char> = s.chars().collect();
    match chars.len() {
        0 => Value::Empty,
        1 => Value::Str(s.into()),
        _ => Value::vector(
            chars
                .into_iter()
                .map(|c| Value::Str(c.to_string().into()))
                .collect(),
        ),
    }
}

fn strand_names(parts: &[Sp<Expr>]) -> AplResult<Vec<Ident>> {
    parts
        .iter()
        .map(|p| match &p.value {
            Expr::Ident(name) => Ok(name.clone()),
            _ => Err(AplError::syntax("destructuring assignment needs names")),
        })
        .collect()
}
