use std::rc::Rc;

use ecow::EcoString;

use crate::{
    ast::*,
    error::{AplError, AplResult},
    lex::{lex, Simple, Span, Sp, Token},
    num::Tower,
    op::Operator,
};

/// Parse one source line into its `⋄`-separated statements
pub fn parse_line(input: &str) -> AplResult<Vec<Sp<Expr>>> {
    let tokens = lex(input)?;
    let chars: Vec<char> = input.chars().collect();
    let mut statements = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, tok) in tokens.iter().enumerate() {
        match &tok.value {
            Token::Simple(Simple::OpenParen | Simple::OpenBracket | Simple::OpenCurly) => {
                depth += 1
            }
            Token::Simple(Simple::CloseParen | Simple::CloseBracket | Simple::CloseCurly) => {
                depth = depth.saturating_sub(1)
            }
            Token::Simple(Simple::Diamond | Simple::Newline) if depth == 0 => {
                if i > start {
                    statements.push(&tokens[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    if tokens.len() > start {
        statements.push(&tokens[start..]);
    }
    statements
        .into_iter()
        .map(|toks| {
            let mut parser = Parser {
                tokens: toks,
                index: 0,
                chars: &chars,
            };
            let expr = parser.expression()?;
            parser.expect_end()?;
            Ok(expr)
        })
        .collect()
}

/// A parsed node, classified as value or function by the naming law
enum Node {
    Val(Sp<Expr>),
    Fun(Sp<Expr>),
    Arrow(Span),
}

/// Whether a name denotes a function variable: its first rune is a
/// lowercase letter; for package-qualified names the part after `→`
/// decides
pub(crate) fn is_function_name(name: &str) -> bool {
    if name == "∇" {
        return true;
    }
    let tail = name.rsplit('→').next().unwrap_or(name);
    tail.chars().next().is_some_and(|c| c.is_lowercase())
}

struct Parser<'a> {
    tokens: &'a [Sp<Token>],
    index: usize,
    chars: &'a [char],
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Sp<Token>> {
        self.tokens.get(self.index)
    }
    fn next(&mut self) -> Option<Sp<Token>> {
        let tok = self.tokens.get(self.index).cloned();
        if tok.is_some() {
            self.index += 1;
        }
        tok
    }
    fn last_span(&self) -> Span {
        self.tokens
            .get(self.index.min(self.tokens.len().saturating_sub(1)))
            .map(|t| t.span)
            .unwrap_or(Span::Builtin)
    }
    fn error(&self, message: impl Into<String>) -> AplError {
        AplError::syntax(message).at(self.last_span())
    }
    fn expect_end(&self) -> AplResult<()> {
        if self.index < self.tokens.len() {
            return Err(self.error(format!(
                "unexpected `{}`",
                self.tokens[self.index].value
            )));
        }
        Ok(())
    }
    fn expect_simple(&mut self, simple: Simple) -> AplResult<Span> {
        match self.next() {
            Some(Sp {
                value: Token::Simple(s),
                span,
            }) if s == simple => Ok(span),
            _ => Err(self.error(format!("expected `{simple}`"))),
        }
    }

    /// Parse a whole expression, folding nodes right to left
    fn expression(&mut self) -> AplResult<Sp<Expr>> {
        let nodes = self.nodes(|_| false)?;
        self.fold(nodes)
    }

    /// Build the classified node list up to a stop token
    fn nodes(&mut self, stop: impl Fn(&Token) -> bool) -> AplResult<Vec<Node>> {
        let mut nodes: Vec<Node> = Vec::new();
        while let Some(tok) = self.peek() {
            if stop(&tok.value) {
                break;
            }
            let tok = self.next().unwrap();
            match tok.value {
                Token::Number(s) => {
                    let n = Tower::default()
                        .parse(&s)
                        .ok_or_else(|| self.error(format!("malformed number {s}")))?;
                    self.push_val(&mut nodes, tok.span.sp(Expr::Num(n)));
                }
                Token::Str(s) => self.push_val(&mut nodes, tok.span.sp(Expr::Str(s))),
                Token::Chars(s) => self.push_val(&mut nodes, tok.span.sp(Expr::Chars(s))),
                Token::Ident(name) => {
                    let expr = tok.span.sp(Expr::Ident(name.clone()));
                    if is_function_name(&name) {
                        nodes.push(Node::Fun(expr));
                    } else {
                        self.push_val(&mut nodes, expr);
                    }
                }
                Token::Glyph(c) => {
                    if let Some(op) = Operator::from_glyph(c) {
                        self.operator(&mut nodes, op, tok.span)?;
                    } else if crate::primitive::Primitive::from_glyph(c).is_some() {
                        nodes.push(Node::Fun(tok.span.sp(Expr::Glyph(c))));
                    } else {
                        return Err(self.error(format!("unknown glyph {c}")));
                    }
                }
                Token::Simple(Simple::OpenParen) => {
                    let node = self.parenthesised(tok.span)?;
                    match node {
                        Node::Val(e) => self.push_val(&mut nodes, e),
                        node => nodes.push(node),
                    }
                }
                Token::Simple(Simple::OpenCurly) => {
                    let lambda = self.lambda(tok.span)?;
                    nodes.push(Node::Fun(lambda));
                }
                Token::Simple(Simple::OpenBracket) => self.bracket(&mut nodes, tok.span)?,
                Token::Simple(Simple::LeftArrow) => nodes.push(Node::Arrow(tok.span)),
                Token::Simple(s) => {
                    return Err(self.error(format!("unexpected `{s}`")));
                }
            }
        }
        Ok(nodes)
    }

    /// Push a value node, merging adjacent values into a strand
    fn push_val(&mut self, nodes: &mut Vec<Node>, expr: Sp<Expr>) {
        if let Some(Node::Val(prev)) = nodes.last_mut() {
            let span = prev.span.merge(expr.span);
            let strand = match std::mem::replace(prev, span.sp(Expr::Num(crate::num::Num::Int(0))))
            {
                Sp {
                    value: Expr::Strand(mut parts),
                    ..
                } => {
                    parts.push(expr);
                    Expr::Strand(parts)
                }
                first => Expr::Strand(vec![first, expr]),
            };
            *prev = span.sp(strand);
        } else {
            nodes.push(Node::Val(expr));
        }
    }

    /// Attach an operator to its operands
    fn operator(&mut self, nodes: &mut Vec<Node>, op: Operator, span: Span) -> AplResult<()> {
        use Operator::*;
        // `∘.` begins an outer product with no left operand
        if op == Compose {
            if let Some(Sp {
                value: Token::Glyph('.'),
                ..
            }) = self.peek()
            {
                self.next();
                let g = self.function_atom()?;
                let span = span.merge(g.span);
                nodes.push(Node::Fun(span.sp(Expr::Derived(Box::new(DerivedExpr {
                    op: Outer,
                    f: g,
                    g: None,
                })))));
                return Ok(());
            }
        }
        let operand = match nodes.pop() {
            Some(Node::Val(e)) | Some(Node::Fun(e)) => e,
            _ => return Err(self.error(format!("operator {} is missing its operand", op.glyph()))),
        };
        let g = if op.dyadic_operator() {
            Some(match op {
                Inner => self.function_atom()?,
                Rank | Stencil => self.value_operand(true)?,
                Power | At | Compose => {
                    if self.peek_is_function() {
                        self.function_atom()?
                    } else {
                        self.value_operand(op != Power)?
                    }
                }
                _ => unreachable!(),
            })
        } else {
            None
        };
        let end = g.as_ref().map(|g| g.span).unwrap_or(span);
        let span = operand.span.merge(end);
        nodes.push(Node::Fun(span.sp(Expr::Derived(Box::new(DerivedExpr {
            op,
            f: operand,
            g,
        })))));
        Ok(())
    }

    fn peek_is_function(&self) -> bool {
        match self.peek().map(|t| &t.value) {
            Some(Token::Glyph(c)) => {
                crate::primitive::Primitive::from_glyph(*c).is_some()
                    || Operator::from_glyph(*c).is_some()
            }
            Some(Token::Ident(name)) => is_function_name(name),
            Some(Token::Simple(Simple::OpenCurly)) => true,
            _ => false,
        }
    }

    /// A single function operand: glyph, name, lambda or parenthesised
    fn function_atom(&mut self) -> AplResult<Sp<Expr>> {
        let tok = self
            .next()
            .ok_or_else(|| self.error("expected a function operand"))?;
        match tok.value {
            Token::Glyph(c) if crate::primitive::Primitive::from_glyph(c).is_some() => {
                Ok(tok.span.sp(Expr::Glyph(c)))
            }
            Token::Ident(name) if is_function_name(&name) => Ok(tok.span.sp(Expr::Ident(name))),
            Token::Simple(Simple::OpenCurly) => self.lambda(tok.span),
            Token::Simple(Simple::OpenParen) => match self.parenthesised(tok.span)? {
                Node::Fun(e) | Node::Val(e) => Ok(e),
                Node::Arrow(_) => Err(self.error("expected a function operand")),
            },
            t => Err(self.error(format!("expected a function operand, found `{t}`"))),
        }
    }

    /// A value operand: a number strand, literal, name or parenthesised
    /// expression
    fn value_operand(&mut self, strand: bool) -> AplResult<Sp<Expr>> {
        let tok = self
            .next()
            .ok_or_else(|| self.error("expected a value operand"))?;
        let first = match tok.value {
            Token::Number(s) => {
                let n = Tower::default()
                    .parse(&s)
                    .ok_or_else(|| self.error(format!("malformed number {s}")))?;
                tok.span.sp(Expr::Num(n))
            }
            Token::Str(s) => tok.span.sp(Expr::Str(s)),
            Token::Chars(s) => tok.span.sp(Expr::Chars(s)),
            Token::Ident(name) if !is_function_name(&name) => tok.span.sp(Expr::Ident(name)),
            Token::Simple(Simple::OpenParen) => match self.parenthesised(tok.span)? {
                Node::Val(e) | Node::Fun(e) => e,
                Node::Arrow(_) => return Err(self.error("expected a value operand")),
            },
            t => return Err(self.error(format!("expected a value operand, found `{t}`"))),
        };
        if !strand {
            return Ok(first);
        }
        let mut parts = vec![first];
        while let Some(Sp {
            value: Token::Number(_),
            ..
        }) = self.peek()
        {
            let tok = self.next().unwrap();
            if let Token::Number(s) = tok.value {
                let n = Tower::default()
                    .parse(&s)
                    .ok_or_else(|| self.error(format!("malformed number {s}")))?;
                parts.push(tok.span.sp(Expr::Num(n)));
            }
        }
        if parts.len() == 1 {
            Ok(parts.pop().unwrap())
        } else {
            let span = parts[0].span.merge(parts[parts.len() - 1].span);
            Ok(span.sp(Expr::Strand(parts)))
        }
    }

    /// A parenthesised expression: a value, a function, or a train
    fn parenthesised(&mut self, open: Span) -> AplResult<Node> {
        let nodes = self.nodes(|t| matches!(t, Token::Simple(Simple::CloseParen)))?;
        let close = self.expect_simple(Simple::CloseParen)?;
        let span = open.merge(close);
        // A run of functions, optionally led by a value, is a train
        let fun_count = nodes
            .iter()
            .filter(|n| matches!(n, Node::Fun(_)))
            .count();
        let is_train = nodes.len() >= 2
            && fun_count + 1 >= nodes.len()
            && nodes
                .iter()
                .skip(1)
                .all(|n| matches!(n, Node::Fun(_)))
            && fun_count >= nodes.len() - 1;
        if is_train {
            let parts: Vec<Sp<Expr>> = nodes
                .into_iter()
                .map(|n| match n {
                    Node::Val(e) | Node::Fun(e) => e,
                    Node::Arrow(_) => unreachable!(),
                })
                .collect();
            return Ok(Node::Fun(span.sp(Expr::Train(parts))));
        }
        match nodes.len() {
            0 => Err(self.error("empty parentheses")),
            1 => {
                let mut nodes = nodes;
                Ok(match nodes.pop().unwrap() {
                    Node::Val(e) => Node::Val(span.sp(e.value)),
                    Node::Fun(e) => Node::Fun(span.sp(e.value)),
                    Node::Arrow(_) => return Err(self.error("misplaced `←`")),
                })
            }
            _ => {
                let folded = self.fold(nodes)?;
                Ok(Node::Val(span.sp(folded.value)))
            }
        }
    }

    /// A bracket suffix: an axis on a function, subscripts on a value
    fn bracket(&mut self, nodes: &mut Vec<Node>, open: Span) -> AplResult<()> {
        match nodes.pop() {
            Some(Node::Fun(f)) => {
                let inner = self.nodes(|t| {
                    matches!(t, Token::Simple(Simple::CloseBracket))
                })?;
                let close = self.expect_simple(Simple::CloseBracket)?;
                let axis = self.fold(inner)?;
                let span = f.span.merge(open).merge(close);
                nodes.push(Node::Fun(span.sp(Expr::Axis(Box::new(AxisExpr {
                    f,
                    axis,
                })))));
                Ok(())
            }
            Some(Node::Val(x)) => {
                let mut subs: Vec<Option<Sp<Expr>>> = Vec::new();
                loop {
                    let section = self.nodes(|t| {
                        matches!(
                            t,
                            Token::Simple(Simple::CloseBracket | Simple::Semicolon)
                        )
                    })?;
                    subs.push(if section.is_empty() {
                        None
                    } else {
                        Some(self.fold(section)?)
                    });
                    match self.next() {
                        Some(Sp {
                            value: Token::Simple(Simple::Semicolon),
                            ..
                        }) => continue,
                        Some(Sp {
                            value: Token::Simple(Simple::CloseBracket),
                            span: close,
                        }) => {
                            let span = x.span.merge(open).merge(close);
                            let expr = span.sp(Expr::Index(Box::new(IndexExpr { x, subs })));
                            self.push_val(nodes, expr);
                            return Ok(());
                        }
                        _ => return Err(self.error("expected `]`")),
                    }
                }
            }
            _ => Err(self.error("subscripts must follow a value or function")),
        }
    }

    /// A lambda body: `⋄`-separated clauses, each optionally guarded
    fn lambda(&mut self, open: Span) -> AplResult<Sp<Expr>> {
        let tokens = self.tokens;
        let body_start = self.index;
        let mut depth = 0usize;
        let mut end = None;
        for i in self.index..tokens.len() {
            match &tokens[i].value {
                Token::Simple(Simple::OpenParen | Simple::OpenBracket | Simple::OpenCurly) => {
                    depth += 1
                }
                Token::Simple(Simple::CloseParen | Simple::CloseBracket) => {
                    depth = depth.saturating_sub(1)
                }
                Token::Simple(Simple::CloseCurly) => {
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        let end = end.ok_or_else(|| self.error("unterminated lambda"))?;
        let body = &tokens[body_start..end];
        let close = tokens[end].span;
        self.index = end + 1;
        // Split clauses at top level
        let mut clauses = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        let mut splits = Vec::new();
        for (i, tok) in body.iter().enumerate() {
            match &tok.value {
                Token::Simple(Simple::OpenParen | Simple::OpenBracket | Simple::OpenCurly) => {
                    depth += 1
                }
                Token::Simple(
                    Simple::CloseParen | Simple::CloseBracket | Simple::CloseCurly,
                ) => depth = depth.saturating_sub(1),
                Token::Simple(Simple::Diamond | Simple::Newline) if depth == 0 => {
                    splits.push((start, i));
                    start = i + 1;
                }
                _ => {}
            }
        }
        splits.push((start, body.len()));
        for (from, to) in splits {
            let clause = &body[from..to];
            if clause.is_empty() {
                continue;
            }
            // A top-level colon separates the guard from the body
            let mut depth = 0usize;
            let mut colon = None;
            for (i, tok) in clause.iter().enumerate() {
                match &tok.value {
                    Token::Simple(
                        Simple::OpenParen | Simple::OpenBracket | Simple::OpenCurly,
                    ) => depth += 1,
                    Token::Simple(
                        Simple::CloseParen | Simple::CloseBracket | Simple::CloseCurly,
                    ) => depth = depth.saturating_sub(1),
                    Token::Simple(Simple::Colon) if depth == 0 => {
                        colon = Some(i);
                        break;
                    }
                    _ => {}
                }
            }
            let (guard, body_toks) = match colon {
                Some(i) => (Some(&clause[..i]), &clause[i + 1..]),
                None => (None, clause),
            };
            let guard = guard
                .map(|toks| self.sub_parse(toks))
                .transpose()?;
            let body = self.sub_parse(body_toks)?;
            clauses.push(Clause { guard, body });
        }
        let span = open.merge(close);
        let text: EcoString = match span {
            Span::Code(code) => self.chars[code.start.pos..code.end.pos].iter().copied().collect(),
            Span::Builtin => EcoString::from("{}"),
        };
        Ok(span.sp(Expr::Lambda(Rc::new(Lambda { clauses, text }))))
    }

    fn sub_parse(&self, tokens: &[Sp<Token>]) -> AplResult<Sp<Expr>> {
        let mut parser = Parser {
            tokens,
            index: 0,
            chars: self.chars,
        };
        let expr = parser.expression()?;
        parser.expect_end()?;
        Ok(expr)
    }

    /// Fold a node list right to left into one expression
    fn fold(&self, nodes: Vec<Node>) -> AplResult<Sp<Expr>> {
        let mut nodes = nodes;
        let mut acc: Option<Sp<Expr>> = None;
        while let Some(node) = nodes.pop() {
            match node {
                Node::Val(v) => match acc.take() {
                    None => acc = Some(v),
                    Some(_) => {
                        return Err(AplError::syntax("value next to value").at(v.span));
                    }
                },
                Node::Fun(f) => match acc.take() {
                    None => acc = Some(f),
                    Some(rhs) => {
                        let dyadic = matches!(nodes.last(), Some(Node::Val(_)));
                        if dyadic {
                            let l = match nodes.pop() {
                                Some(Node::Val(l)) => l,
                                _ => unreachable!(),
                            };
                            let span = l.span.merge(rhs.span);
                            acc = Some(span.sp(Expr::Dyadic(Box::new(Dyadic { l, f, r: rhs }))));
                        } else {
                            let span = f.span.merge(rhs.span);
                            acc = Some(span.sp(Expr::Monadic(Box::new(Monadic { f, r: rhs }))));
                        }
                    }
                },
                Node::Arrow(arrow_span) => {
                    let value = acc
                        .take()
                        .ok_or_else(|| AplError::syntax("missing value after ←").at(arrow_span))?;
                    let (target, modifier) = match nodes.pop() {
                        Some(Node::Val(t)) => (t, None),
                        Some(Node::Fun(f)) => {
                            let name_target = matches!(f.value, Expr::Ident(_))
                                && !matches!(nodes.last(), Some(Node::Val(_)));
                            if name_target {
                                (f, None)
                            } else {
                                match nodes.pop() {
                                    Some(Node::Val(t)) => (t, Some(f)),
                                    _ => {
                                        return Err(AplError::syntax(
                                            "modified assignment is missing its target",
                                        )
                                        .at(arrow_span))
                                    }
                                }
                            }
                        }
                        _ => {
                            return Err(
                                AplError::syntax("assignment is missing its target").at(arrow_span)
                            )
                        }
                    };
                    let span = target.span.merge(value.span);
                    acc = Some(span.sp(Expr::Assign(Box::new(AssignExpr {
                        target,
                        modifier,
                        value,
                    }))));
                }
            }
        }
        acc.ok_or_else(|| AplError::syntax("empty expression").at(Span::Builtin))
    }
}
