/*!
An interpreter core for an APL dialect.

The runtime is host-embeddable: construct an [`Apl`] with an output
sink, feed it lines with [`Apl::parse_and_eval`], and bind or read
variables programmatically. Primitives act uniformly on scalars and
rank-n arrays; higher-order operators derive new functions from
existing ones; numbers live in a tower of kinds with automatic
uptyping.

```
use aplv::{Apl, Buffer};

let out = Buffer::new();
let mut apl = Apl::new(out.clone());
apl.parse_and_eval("1 2 3 + 4 5 6").unwrap();
assert_eq!(out.take_string(), "5 7 9\n");
```
*/

mod algorithm;
mod array;
mod ast;
mod complex;
mod error;
mod eval;
mod fmt;
mod function;
mod invert;
mod lex;
mod num;
mod op;
mod parse;
mod pervade;
mod pkg;
mod primitive;
mod shape;
mod value;

use std::{cell::RefCell, collections::HashMap, io::Write, rc::Rc};

pub use ecow::EcoString;
use rand::{rngs::SmallRng, SeedableRng};

pub use crate::{
    array::{Array, ArrayValue},
    ast::Expr,
    complex::Complex,
    error::{AplError, AplResult, ErrorKind},
    eval::Env,
    fmt::Format,
    function::{Derived, Function},
    lex::{Span, Sp},
    num::{Kind, Num, Tower},
    op::Operator,
    pkg::PackageValue,
    primitive::Primitive,
    shape::Shape,
    value::{Ident, Value},
};

/// A shareable in-memory output sink, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct Buffer(Rc<RefCell<Vec<u8>>>);

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }
    /// The captured output so far, clearing the buffer
    pub fn take_string(&self) -> String {
        let mut buf = self.0.borrow_mut();
        let out = String::from_utf8_lossy(&buf).into_owned();
        buf.clear();
        out
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// One interpreter instance: the tower, the environment chain, the
/// registries, the package map, the format settings and the output
/// sink
///
/// Nothing is process-global; independent runtimes coexist. A runtime
/// is single-threaded and not `Sync`.
pub struct Apl {
    pub tower: Tower,
    pub format: Format,
    /// `⎕IO`
    pub origin: i64,
    root: Env,
    pub(crate) env: Env,
    pkgs: HashMap<EcoString, HashMap<EcoString, Value>>,
    out: RefCell<Box<dyn Write>>,
    pub(crate) rng: RefCell<SmallRng>,
}

impl Apl {
    /// Construct a runtime writing its printed output to `out`
    pub fn new(out: impl Write + 'static) -> Self {
        let root = Env::new(None);
        Apl {
            tower: Tower::default(),
            format: Format::default(),
            origin: 1,
            env: root.clone(),
            root,
            pkgs: HashMap::new(),
            out: RefCell::new(Box::new(out)),
            rng: RefCell::new(SmallRng::from_entropy()),
        }
    }

    /// Install a numeric tower
    pub fn register_tower(&mut self, tower: Tower) {
        self.tower = tower;
    }

    /// Parse and evaluate one source line, which may contain `⋄`
    ///
    /// Each statement's value is printed unless the statement is an
    /// assignment; an error aborts the remaining statements.
    pub fn parse_and_eval(&mut self, line: &str) -> AplResult<()> {
        let statements = parse::parse_line(line)?;
        for statement in &statements {
            let v = self.eval(statement)?;
            if !matches!(statement.value, Expr::Assign(_)) {
                self.print_value(&v)?;
            }
        }
        Ok(())
    }

    /// Evaluate source text and return the last statement's value
    /// without printing; this backs the `⍎` primitive
    pub fn execute(&mut self, src: &str) -> AplResult<Value> {
        let statements = parse::parse_line(src)?;
        let mut last = Value::Empty;
        for statement in &statements {
            last = self.eval(statement)?;
        }
        Ok(last)
    }

    /// Programmatic bind into the current environment
    pub fn assign(&mut self, name: &str, v: Value) -> AplResult<()> {
        self.assign_name(&Ident::from(name), v)
    }

    /// Programmatic read, walking the environment chain
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.package_var(name) {
            return Some(v);
        }
        self.env.get(name)
    }

    /// Install a package of host values reachable as `pkg→name`
    pub fn register_package(
        &mut self,
        name: &str,
        entries: impl IntoIterator<Item = (EcoString, Value)>,
    ) {
        self.pkgs
            .insert(EcoString::from(name), entries.into_iter().collect());
    }

    /// Install a callable host object as `pkg→name`
    pub fn register_host(&mut self, pkg: &str, name: &str, host: Rc<dyn PackageValue>) {
        self.pkgs
            .entry(EcoString::from(pkg))
            .or_default()
            .insert(EcoString::from(name), Value::Pkg(host));
    }

    /// Enumerate visible names: the root environment plus package
    /// names ending in `/`, the members of one package, or — for a
    /// qualified `pkg→name` — the fields and methods of a host object
    pub fn vars(&self, pkg: &str) -> AplResult<Vec<String>> {
        if pkg.contains('→') {
            let host = match self.package_var(pkg) {
                Some(Value::Pkg(host)) => host,
                _ => return Err(AplError::name(format!("{pkg} is not a host object"))),
            };
            let mut names: Vec<String> = host
                .keys()
                .unwrap_or_default()
                .iter()
                .map(|k| k.to_string())
                .collect();
            names.extend(host.methods().into_iter().map(|m| m.to_string()));
            names.sort();
            return Ok(names);
        }
        let mut names: Vec<String> = if pkg.is_empty() {
            let mut names: Vec<String> = self
                .pkgs
                .keys()
                .map(|n| format!("{n}/"))
                .collect();
            names.extend(self.root.names().into_iter().map(|n| n.to_string()));
            names
        } else {
            let entries = self
                .pkgs
                .get(pkg)
                .ok_or_else(|| AplError::name(format!("package {pkg} is not registered")))?;
            entries.keys().map(|n| n.to_string()).collect()
        };
        names.sort();
        Ok(names)
    }

    pub(crate) fn package_var(&self, name: &str) -> Option<Value> {
        let (pkg, var) = name.split_once('→')?;
        if pkg.chars().any(char::is_uppercase) {
            return None;
        }
        self.pkgs.get(pkg)?.get(var).cloned()
    }

    pub(crate) fn print_value(&self, v: &Value) -> AplResult<()> {
        writeln!(
            self.out.borrow_mut(),
            "{}",
            fmt::format_value(v, &self.format)
        )
        .map_err(|e| AplError::value(format!("output: {e}")))
    }
}
