use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use yap::{IntoTokens, TokenLocation, Tokens, one_of};

use crate::{Expr, Module, SignalKind};

/// Failures while reading a module description.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input that does not follow the grammar.
    #[error("syntax error at offset {offset} near {near:?}")]
    Syntax { offset: usize, near: String },
    /// An identifier with no declaration.
    #[error("signal `{name}` is not declared")]
    UndeclaredSignal { name: String },
    /// A name declared more than once.
    #[error("signal `{name}` is declared twice")]
    DuplicateSignal { name: String },
    /// A signal assigned more than once.
    #[error("signal `{name}` is assigned twice")]
    DuplicateDriver { name: String },
    /// An assignment to an input port.
    #[error("input port `{name}` cannot be assigned")]
    DrivenInput { name: String },
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug)]
enum Ast {
    Literal(bool),
    Name(String),
    Not(Box<Ast>),
    And(Box<Ast>, Box<Ast>),
    Or(Box<Ast>, Box<Ast>),
    Xor(Box<Ast>, Box<Ast>),
    Mux(Box<Ast>, Box<Ast>, Box<Ast>),
    Fd(Box<Ast>, Box<Ast>),
}

#[derive(Debug)]
enum Statement {
    Declare(SignalKind, Vec<String>),
    Assign(String, Ast),
}

fn parse_space(t: &mut impl Tokens<Item = char>) -> bool {
    t.skip_while(|c| c.is_whitespace()) > 0
}

fn parse_comment(t: &mut impl Tokens<Item = char>) -> bool {
    if !t.token('#') {
        return false;
    }
    t.skip_while(|c| *c != '\n');
    true
}

fn parse_blank(t: &mut impl Tokens<Item = char>) {
    while parse_space(t) || parse_comment(t) {}
}

#[must_use]
fn parse_symbol(t: &mut impl Tokens<Item = char>, symbol: char) -> Option<()> {
    if !t.token(symbol) {
        return None;
    }
    Some(())
}

fn parse_ident(t: &mut impl Tokens<Item = char>) -> Option<String> {
    match t.peek() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => (),
        _ => return None,
    }
    let name: String = t.take_while(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
    Some(name)
}

#[must_use]
fn parse_keyword_expect(t: &mut impl Tokens<Item = char>, expected: &str) -> Option<()> {
    let keyword = parse_ident(t)?;
    if keyword != expected {
        return None;
    }
    Some(())
}

/// `<symbol>` surrounded by optional blanks.
#[must_use]
fn parse_punct(t: &mut impl Tokens<Item = char>, symbol: char) -> Option<()> {
    parse_blank(t);
    parse_symbol(t, symbol)?;
    parse_blank(t);
    Some(())
}

fn parse_call<T: Tokens<Item = char>>(t: &mut T, name: &str, arity: usize) -> Option<Vec<Ast>> {
    parse_keyword_expect(t, name)?;
    parse_punct(t, '(')?;
    let mut args = Vec::with_capacity(arity);
    for index in 0..arity {
        if index > 0 {
            parse_punct(t, ',')?;
        }
        args.push(parse_expr(t)?);
    }
    parse_punct(t, ')')?;
    Some(args)
}

fn parse_primary<T: Tokens<Item = char>>(t: &mut T) -> Option<Ast> {
    one_of!(t;
        parse_symbol(t, '0').map(|()| Ast::Literal(false)),
        parse_symbol(t, '1').map(|()| Ast::Literal(true)),
        parse_symbol(t, '(').and_then(|()| {
            parse_blank(t);
            let inner = parse_expr(t)?;
            parse_punct(t, ')')?;
            Some(inner)
        }),
        parse_call(t, "mux", 3).and_then(|args| {
            let [select, zero, one]: [Ast; 3] = args.try_into().ok()?;
            Some(Ast::Mux(Box::new(select), Box::new(zero), Box::new(one)))
        }),
        parse_call(t, "fd", 2).and_then(|args| {
            let [clock, data]: [Ast; 2] = args.try_into().ok()?;
            Some(Ast::Fd(Box::new(clock), Box::new(data)))
        }),
        parse_ident(t).map(Ast::Name),
    )
}

fn parse_unary<T: Tokens<Item = char>>(t: &mut T) -> Option<Ast> {
    if t.token('~') {
        parse_blank(t);
        return Some(Ast::Not(Box::new(parse_unary(t)?)));
    }
    parse_primary(t)
}

fn parse_binary<T: Tokens<Item = char>>(
    t: &mut T,
    symbol: char,
    operand: fn(&mut T) -> Option<Ast>,
    combine: fn(Box<Ast>, Box<Ast>) -> Ast,
) -> Option<Ast> {
    let mut lhs = operand(t)?;
    while let Some(rhs) = t.optional(|t| {
        parse_punct(t, symbol)?;
        operand(t)
    }) {
        lhs = combine(Box::new(lhs), Box::new(rhs));
    }
    Some(lhs)
}

fn parse_and<T: Tokens<Item = char>>(t: &mut T) -> Option<Ast> {
    parse_binary(t, '&', parse_unary, Ast::And)
}

fn parse_xor<T: Tokens<Item = char>>(t: &mut T) -> Option<Ast> {
    parse_binary(t, '^', parse_and, Ast::Xor)
}

fn parse_expr<T: Tokens<Item = char>>(t: &mut T) -> Option<Ast> {
    parse_binary(t, '|', parse_xor, Ast::Or)
}

fn parse_name_list(t: &mut impl Tokens<Item = char>) -> Option<Vec<String>> {
    let mut names = vec![parse_ident(t)?];
    while let Some(name) = t.optional(|t| {
        parse_punct(t, ',')?;
        parse_ident(t)
    }) {
        names.push(name);
    }
    Some(names)
}

fn parse_declaration(t: &mut impl Tokens<Item = char>) -> Option<Statement> {
    let kind = match parse_ident(t)?.as_str() {
        "input" => SignalKind::Input,
        "output" => SignalKind::Output,
        "signal" => SignalKind::Internal,
        _ => return None,
    };
    if !parse_space(t) {
        return None;
    }
    parse_blank(t);
    let names = parse_name_list(t)?;
    parse_punct(t, ';')?;
    Some(Statement::Declare(kind, names))
}

fn parse_assignment<T: Tokens<Item = char>>(t: &mut T) -> Option<Statement> {
    let target = parse_ident(t)?;
    parse_punct(t, '=')?;
    let value = parse_expr(t)?;
    parse_punct(t, ';')?;
    Some(Statement::Assign(target, value))
}

fn parse_statement<T: Tokens<Item = char>>(t: &mut T) -> Option<Statement> {
    one_of!(t;
        parse_declaration(t),
        parse_assignment(t),
    )
}

fn parse_header(t: &mut impl Tokens<Item = char>) -> Option<String> {
    parse_keyword_expect(t, "module")?;
    if !parse_space(t) {
        return None;
    }
    parse_blank(t);
    let name = parse_ident(t)?;
    parse_punct(t, ';')?;
    Some(name)
}

fn syntax_error(source: &str, offset: usize) -> ParseError {
    let near = source[offset..].lines().next().unwrap_or("").chars().take(32).collect();
    ParseError::Syntax { offset, near }
}

struct Resolver {
    module: Module,
    names: HashMap<String, crate::SignalId>,
}

impl Resolver {
    fn declare(&mut self, kind: SignalKind, name: String) -> Result<(), ParseError> {
        if self.names.contains_key(&name) {
            return Err(ParseError::DuplicateSignal { name });
        }
        let id = self.module.add_signal(name.clone(), kind);
        self.names.insert(name, id);
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<crate::SignalId, ParseError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ParseError::UndeclaredSignal { name: name.to_string() })
    }

    fn expr(&self, ast: Ast) -> Result<Expr, ParseError> {
        Ok(match ast {
            Ast::Literal(value) => Expr::Boolean(value),
            Ast::Name(name) => Expr::Signal(self.lookup(&name)?),
            Ast::Not(arg) => Expr::not(self.expr(*arg)?),
            Ast::And(a, b) => Expr::and(self.expr(*a)?, self.expr(*b)?),
            Ast::Or(a, b) => Expr::or(self.expr(*a)?, self.expr(*b)?),
            Ast::Xor(a, b) => Expr::xor(self.expr(*a)?, self.expr(*b)?),
            Ast::Mux(select, zero, one) => Expr::mux(self.expr(*select)?, self.expr(*zero)?, self.expr(*one)?),
            Ast::Fd(clock, data) => Expr::fd(self.expr(*clock)?, self.expr(*data)?),
        })
    }

    fn assign(&mut self, target: String, value: Ast) -> Result<(), ParseError> {
        let id = self.lookup(&target)?;
        if self.module.signal(id).kind == SignalKind::Input {
            return Err(ParseError::DrivenInput { name: target });
        }
        let expr = self.expr(value)?;
        if self.module.set_source(id, expr).is_some() {
            return Err(ParseError::DuplicateDriver { name: target });
        }
        Ok(())
    }
}

/// Parses a module from its textual form.
///
/// Declarations may appear anywhere in the body; signals are numbered in
/// declaration order.
///
/// # Errors
///
/// Fails on syntax errors and on inconsistent declarations or assignments.
pub fn parse(source: &str) -> Result<Module, ParseError> {
    let mut tokens = source.into_tokens();
    parse_blank(&mut tokens);
    let name = parse_header(&mut tokens).ok_or_else(|| syntax_error(source, 0))?;

    let mut statements = Vec::new();
    loop {
        parse_blank(&mut tokens);
        if tokens.eof() {
            break;
        }
        let offset = tokens.location().offset();
        match tokens.optional(parse_statement) {
            Some(statement) => statements.push(statement),
            None => return Err(syntax_error(source, offset)),
        }
    }

    let mut resolver = Resolver {
        module: Module::new(name),
        names: HashMap::new(),
    };
    let mut assignments = Vec::new();
    for statement in statements {
        match statement {
            Statement::Declare(kind, names) => {
                for name in names {
                    resolver.declare(kind, name)?;
                }
            }
            Statement::Assign(target, value) => assignments.push((target, value)),
        }
    }
    for (target, value) in assignments {
        resolver.assign(target, value)?;
    }

    tracing::debug!(
        "parsed module {} with {} signals",
        resolver.module.name(),
        resolver.module.len()
    );
    Ok(resolver.module)
}

/// Reads and parses a module file.
///
/// # Errors
///
/// Fails if the file cannot be read or does not parse.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Module, ParseError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&source)
}
