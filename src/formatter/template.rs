//! Go-style text templates for `--format`
//!
//! Supports the subset of Go's `text/template` that list and inspect
//! formats use in practice: field chains, method calls with arguments,
//! pipelines, literals, trim markers, comments and a fixed function set.
//! Control structures (`if`, `range`, ...) and variables are rejected at
//! parse time.

use crate::error::SwarmctlError;
use serde_json::Value;
use std::fmt;

/// Functions callable from a template
const FUNCTIONS: &[&str] = &[
    "index", "join", "json", "len", "lower", "pad", "print", "printf", "println", "split",
    "title", "truncate", "upper",
];

/// Go template keywords this engine does not implement
const KEYWORDS: &[&str] = &[
    "block", "break", "continue", "define", "else", "end", "if", "range", "template", "with",
];

/// Data a template is executed against
pub trait Context {
    /// Resolve a top-level accessor such as `.Name`
    fn field(&self, name: &str) -> Option<Value>;

    /// Resolve an accessor taking arguments such as `.Label "env"`
    fn method(&self, _name: &str, _args: &[Value]) -> Option<Value> {
        None
    }

    /// The whole object, for `{{.}}` and `{{json .}}`
    fn to_value(&self) -> Value;
}

impl Context for Value {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

/// Template failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template source is malformed or uses unknown names
    Parse(String),
    /// Execution against a value failed
    Exec(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Parse(msg) | TemplateError::Exec(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for TemplateError {}

impl From<TemplateError> for SwarmctlError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::Parse(msg) => SwarmctlError::TemplateParse(msg),
            TemplateError::Exec(msg) => SwarmctlError::Render(msg),
        }
    }
}

fn parse_err(line: usize, msg: &str) -> TemplateError {
    TemplateError::Parse(format!("template: :{}: {}", line, msg))
}

fn exec_err(line: usize, at: &Operand, msg: &str) -> TemplateError {
    TemplateError::Exec(format!("template: :{}: executing at <{}>: {}", line, at, msg))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Pipe,
    Dot,
    Field(Vec<String>),
    Ident(String),
    Str(String),
    Int(i64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Dot,
    Field(Vec<String>),
    Func(String),
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Dot => write!(f, "."),
            Operand::Field(path) => write!(f, ".{}", path.join(".")),
            Operand::Func(name) => write!(f, "{}", name),
            Operand::Str(s) => write!(f, "{:?}", s),
            Operand::Int(n) => write!(f, "{}", n),
            Operand::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone)]
struct Command {
    operands: Vec<Operand>,
}

#[derive(Debug, Clone)]
struct Pipeline {
    commands: Vec<Command>,
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Action { pipeline: Pipeline, line: usize },
}

/// Lexed contents of one `{{ ... }}` action
struct Action {
    tokens: Vec<Token>,
    trim_right: bool,
    end: usize,
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source
    pub fn parse(src: &str) -> Result<Self, TemplateError> {
        let mut nodes = Vec::new();
        let mut text = String::new();
        let mut pos = 0;
        let mut trim_next = false;

        while let Some(offset) = src[pos..].find("{{") {
            let open = pos + offset;
            let chunk = &src[pos..open];
            text.push_str(if trim_next { chunk.trim_start() } else { chunk });

            let line = src[..open].matches('\n').count() + 1;
            let mut start = open + 2;
            let bytes = src.as_bytes();
            if bytes.get(start) == Some(&b'-')
                && bytes.get(start + 1).is_some_and(|b| b.is_ascii_whitespace())
            {
                let keep = text.trim_end().len();
                text.truncate(keep);
                start += 1;
            }

            if src[start..].trim_start().starts_with("/*") {
                let body = start + (src[start..].len() - src[start..].trim_start().len());
                let close = src[body..]
                    .find("*/")
                    .ok_or_else(|| parse_err(line, "unclosed comment"))?;
                let after = body + close + 2;
                let rest = src[after..].trim_start();
                let skipped = after + (src[after..].len() - rest.len());
                if rest.starts_with("-}}") {
                    trim_next = true;
                    pos = skipped + 3;
                } else if rest.starts_with("}}") {
                    trim_next = false;
                    pos = skipped + 2;
                } else {
                    return Err(parse_err(line, "comment ends before closing delimiter"));
                }
                continue;
            }

            let action = lex_action(src, start, line)?;
            let pipeline = build_pipeline(action.tokens, line)?;
            if !text.is_empty() {
                nodes.push(Node::Text(std::mem::take(&mut text)));
            }
            nodes.push(Node::Action { pipeline, line });
            trim_next = action.trim_right;
            pos = action.end;
        }

        let tail = &src[pos..];
        text.push_str(if trim_next { tail.trim_start() } else { tail });
        if !text.is_empty() {
            nodes.push(Node::Text(text));
        }

        Ok(Self { nodes })
    }

    /// Reject field accessors not in `accessors`
    ///
    /// Only the first segment of a chain is checked; nested members are
    /// resolved against the data at execution time.
    pub fn check_fields(&self, accessors: &[&str]) -> Result<(), TemplateError> {
        for node in &self.nodes {
            let Node::Action { pipeline, line } = node else {
                continue;
            };
            for command in &pipeline.commands {
                for operand in &command.operands {
                    if let Operand::Field(path) = operand {
                        let first = path[0].as_str();
                        if !accessors.contains(&first) {
                            return Err(parse_err(
                                *line,
                                &format!("can't evaluate field {}", first),
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Render the template against `ctx`
    pub fn execute(&self, ctx: &dyn Context) -> Result<String, TemplateError> {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Action { pipeline, line } => {
                    let value = eval_pipeline(pipeline, ctx, *line)?;
                    out.push_str(&display(&value));
                }
            }
        }
        Ok(out)
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn lex_action(src: &str, mut i: usize, line: usize) -> Result<Action, TemplateError> {
    let b = src.as_bytes();
    let mut tokens = Vec::new();

    loop {
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= b.len() {
            return Err(parse_err(line, "unclosed action"));
        }

        let rest = &src[i..];
        if rest.starts_with("-}}") {
            return Ok(Action {
                tokens,
                trim_right: true,
                end: i + 3,
            });
        }
        if rest.starts_with("}}") {
            return Ok(Action {
                tokens,
                trim_right: false,
                end: i + 2,
            });
        }

        match b[i] {
            b'|' => {
                tokens.push(Token::Pipe);
                i += 1;
            }
            b'"' => {
                let (s, next) = lex_quoted(src, i + 1, line)?;
                tokens.push(Token::Str(s));
                i = next;
            }
            b'`' => {
                let close = src[i + 1..]
                    .find('`')
                    .ok_or_else(|| parse_err(line, "unterminated raw quoted string"))?;
                tokens.push(Token::Str(src[i + 1..i + 1 + close].to_string()));
                i += close + 2;
            }
            b'.' => {
                let mut path = Vec::new();
                while i < b.len() && b[i] == b'.' {
                    let start = i + 1;
                    let mut end = start;
                    while end < b.len() && is_ident_byte(b[end]) {
                        end += 1;
                    }
                    if end == start {
                        break;
                    }
                    path.push(src[start..end].to_string());
                    i = end;
                }
                if path.is_empty() {
                    tokens.push(Token::Dot);
                    i += 1;
                } else {
                    tokens.push(Token::Field(path));
                }
            }
            b'$' => {
                let start = i;
                i += 1;
                while i < b.len() && is_ident_byte(b[i]) {
                    i += 1;
                }
                return Err(parse_err(
                    line,
                    &format!("undefined variable {:?}", &src[start..i]),
                ));
            }
            c if c.is_ascii_digit()
                || (c == b'-' && b.get(i + 1).is_some_and(|d| d.is_ascii_digit())) =>
            {
                let start = i;
                i += 1;
                while i < b.len() && b[i].is_ascii_digit() {
                    i += 1;
                }
                let literal = &src[start..i];
                let n = literal.parse::<i64>().map_err(|_| {
                    parse_err(line, &format!("bad number syntax: {:?}", literal))
                })?;
                tokens.push(Token::Int(n));
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = i;
                while i < b.len() && is_ident_byte(b[i]) {
                    i += 1;
                }
                tokens.push(match &src[start..i] {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    word => Token::Ident(word.to_string()),
                });
            }
            _ => {
                let c = rest.chars().next().unwrap_or_default();
                return Err(parse_err(line, &format!("unexpected \"{}\" in command", c)));
            }
        }
    }
}

fn lex_quoted(src: &str, start: usize, line: usize) -> Result<(String, usize), TemplateError> {
    let mut out = String::new();
    let mut chars = src[start..].char_indices();

    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => return Ok((out, start + offset + 1)),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, '\\')) => out.push('\\'),
                Some((_, '"')) => out.push('"'),
                Some((_, other)) => {
                    return Err(parse_err(
                        line,
                        &format!("invalid syntax in quoted string: \\{}", other),
                    ))
                }
                None => break,
            },
            '\n' => break,
            c => out.push(c),
        }
    }

    Err(parse_err(line, "unterminated quoted string"))
}

fn build_pipeline(tokens: Vec<Token>, line: usize) -> Result<Pipeline, TemplateError> {
    let mut commands = Vec::new();
    let mut current = Vec::new();

    for token in tokens {
        let operand = match token {
            Token::Pipe => {
                if current.is_empty() {
                    return Err(parse_err(line, "missing value for command"));
                }
                commands.push(build_command(std::mem::take(&mut current), line)?);
                continue;
            }
            Token::Ident(name) => {
                if KEYWORDS.contains(&name.as_str()) {
                    return Err(parse_err(line, &format!("unsupported action {:?}", name)));
                }
                if !FUNCTIONS.contains(&name.as_str()) {
                    return Err(parse_err(line, &format!("function {:?} not defined", name)));
                }
                Operand::Func(name)
            }
            Token::Dot => Operand::Dot,
            Token::Field(path) => Operand::Field(path),
            Token::Str(s) => Operand::Str(s),
            Token::Int(n) => Operand::Int(n),
            Token::Bool(b) => Operand::Bool(b),
        };
        current.push(operand);
    }

    if current.is_empty() {
        return Err(parse_err(line, "missing value for command"));
    }
    commands.push(build_command(current, line)?);

    Ok(Pipeline { commands })
}

fn build_command(operands: Vec<Operand>, line: usize) -> Result<Command, TemplateError> {
    match operands.first() {
        Some(Operand::Func(_)) | Some(Operand::Field(_)) => {}
        Some(first) if operands.len() > 1 => {
            return Err(parse_err(
                line,
                &format!("can't give argument to non-function {}", first),
            ))
        }
        _ => {}
    }
    Ok(Command { operands })
}

fn eval_pipeline(
    pipeline: &Pipeline,
    ctx: &dyn Context,
    line: usize,
) -> Result<Value, TemplateError> {
    let mut piped = None;
    for command in &pipeline.commands {
        piped = Some(eval_command(command, ctx, piped.take(), line)?);
    }
    Ok(piped.unwrap_or(Value::Null))
}

fn eval_args(
    operands: &[Operand],
    ctx: &dyn Context,
    piped: Option<Value>,
    line: usize,
) -> Result<Vec<Value>, TemplateError> {
    let mut args = operands
        .iter()
        .map(|op| eval_operand(op, ctx, line))
        .collect::<Result<Vec<_>, _>>()?;
    args.extend(piped);
    Ok(args)
}

fn eval_command(
    command: &Command,
    ctx: &dyn Context,
    piped: Option<Value>,
    line: usize,
) -> Result<Value, TemplateError> {
    let Some((first, rest)) = command.operands.split_first() else {
        return Ok(Value::Null);
    };

    match first {
        Operand::Func(name) => {
            let args = eval_args(rest, ctx, piped, line)?;
            call_function(name, &args).map_err(|msg| exec_err(line, first, &msg))
        }
        Operand::Field(path) if !rest.is_empty() || piped.is_some() => {
            if path.len() != 1 {
                return Err(exec_err(line, first, "can't give argument to nested field"));
            }
            let args = eval_args(rest, ctx, piped, line)?;
            ctx.method(&path[0], &args).ok_or_else(|| {
                exec_err(line, first, &format!("can't call method {}", path[0]))
            })
        }
        operand => {
            if piped.is_some() {
                return Err(exec_err(line, operand, "can't give argument to non-function"));
            }
            eval_operand(operand, ctx, line)
        }
    }
}

fn eval_operand(operand: &Operand, ctx: &dyn Context, line: usize) -> Result<Value, TemplateError> {
    match operand {
        Operand::Dot => Ok(ctx.to_value()),
        Operand::Field(path) => resolve_field(ctx, path).map_err(|msg| exec_err(line, operand, &msg)),
        Operand::Func(name) => call_function(name, &[]).map_err(|msg| exec_err(line, operand, &msg)),
        Operand::Str(s) => Ok(Value::String(s.clone())),
        Operand::Int(n) => Ok(Value::from(*n)),
        Operand::Bool(b) => Ok(Value::Bool(*b)),
    }
}

fn resolve_field(ctx: &dyn Context, path: &[String]) -> Result<Value, String> {
    let (first, rest) = path
        .split_first()
        .ok_or_else(|| "empty field".to_string())?;
    let mut value = ctx
        .field(first)
        .or_else(|| ctx.method(first, &[]))
        .ok_or_else(|| format!("can't evaluate field {}", first))?;

    for name in rest {
        value = match value {
            Value::Object(mut map) => map.remove(name).unwrap_or(Value::Null),
            Value::Null => Value::Null,
            other => {
                return Err(format!(
                    "can't evaluate field {} in type {}",
                    name,
                    type_name(&other)
                ))
            }
        };
    }

    Ok(value)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "slice",
        Value::Object(_) => "map",
    }
}

/// Print a value the way Go's `fmt` prints template results
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => "<no value>".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(display).collect();
            format!("[{}]", items.join(" "))
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let entries: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{}:{}", k, display(v)))
                .collect();
            format!("map[{}]", entries.join(" "))
        }
    }
}

fn expect_args(name: &str, args: &[Value], want: usize) -> Result<(), String> {
    if args.len() != want {
        return Err(format!(
            "wrong number of args for {}: want {} got {}",
            name,
            want,
            args.len()
        ));
    }
    Ok(())
}

fn as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => display(other),
    }
}

fn as_int(name: &str, value: &Value) -> Result<usize, String> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("{}: expected non-negative integer, got {}", name, display(value)))
}

/// Widest padding `pad` will add on either side
const MAX_PAD: usize = 4096;

fn as_pad(name: &str, value: &Value) -> Result<usize, String> {
    let width = as_int(name, value)?;
    if width > MAX_PAD {
        return Err(format!("{}: padding {} exceeds maximum of {}", name, width, MAX_PAD));
    }
    Ok(width)
}

fn call_function(name: &str, args: &[Value]) -> Result<Value, String> {
    match name {
        "json" => {
            expect_args(name, args, 1)?;
            serde_json::to_string(&args[0])
                .map(Value::String)
                .map_err(|e| e.to_string())
        }
        "join" => {
            expect_args(name, args, 2)?;
            let items = match &args[0] {
                Value::Array(items) => items.iter().map(as_string).collect::<Vec<_>>(),
                Value::Null => Vec::new(),
                other => return Err(format!("join: expected list, got {}", type_name(other))),
            };
            Ok(Value::String(items.join(&as_string(&args[1]))))
        }
        "split" => {
            expect_args(name, args, 2)?;
            let source = as_string(&args[0]);
            let sep = as_string(&args[1]);
            let parts: Vec<Value> = if sep.is_empty() {
                source.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                source.split(sep.as_str()).map(|s| Value::String(s.to_string())).collect()
            };
            Ok(Value::Array(parts))
        }
        "lower" => {
            expect_args(name, args, 1)?;
            Ok(Value::String(as_string(&args[0]).to_lowercase()))
        }
        "upper" => {
            expect_args(name, args, 1)?;
            Ok(Value::String(as_string(&args[0]).to_uppercase()))
        }
        "title" => {
            expect_args(name, args, 1)?;
            Ok(Value::String(title_case(&as_string(&args[0]))))
        }
        "pad" => {
            expect_args(name, args, 3)?;
            let source = as_string(&args[0]);
            if source.is_empty() {
                return Ok(Value::String(source));
            }
            let prefix = as_pad(name, &args[1])?;
            let suffix = as_pad(name, &args[2])?;
            Ok(Value::String(format!(
                "{}{}{}",
                " ".repeat(prefix),
                source,
                " ".repeat(suffix)
            )))
        }
        "truncate" => {
            expect_args(name, args, 2)?;
            let length = as_int(name, &args[1])?;
            Ok(Value::String(as_string(&args[0]).chars().take(length).collect()))
        }
        "println" => {
            let parts: Vec<String> = args.iter().map(display).collect();
            Ok(Value::String(format!("{}\n", parts.join(" "))))
        }
        "print" => Ok(Value::String(sprint(args))),
        "printf" => {
            let (format, rest) = args
                .split_first()
                .ok_or_else(|| "wrong number of args for printf: want at least 1 got 0".to_string())?;
            Ok(Value::String(sprintf(&as_string(format), rest)))
        }
        "len" => {
            expect_args(name, args, 1)?;
            let len = match &args[0] {
                Value::Array(items) => items.len(),
                Value::Object(map) => map.len(),
                Value::String(s) => s.len(),
                other => return Err(format!("len of type {}", type_name(other))),
            };
            Ok(Value::from(len))
        }
        "index" => {
            let (item, keys) = args
                .split_first()
                .ok_or_else(|| "wrong number of args for index: want at least 1 got 0".to_string())?;
            let mut current = item.clone();
            for key in keys {
                current = match (&current, key) {
                    (Value::Object(map), key) => {
                        map.get(&as_string(key)).cloned().unwrap_or(Value::Null)
                    }
                    (Value::Array(items), key) => {
                        let idx = as_int(name, key)?;
                        items
                            .get(idx)
                            .cloned()
                            .ok_or_else(|| format!("index out of range: {}", idx))?
                    }
                    (other, _) => {
                        return Err(format!("can't index item of type {}", type_name(other)))
                    }
                };
            }
            Ok(current)
        }
        _ => Err(format!("function {:?} not defined", name)),
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if in_word {
                out.push(c);
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Operands are separated by a space when neither side is a string
fn sprint(args: &[Value]) -> String {
    let mut out = String::new();
    let mut prev_is_string = true;
    for (i, arg) in args.iter().enumerate() {
        let is_string = arg.is_string();
        if i > 0 && !is_string && !prev_is_string {
            out.push(' ');
        }
        out.push_str(&display(arg));
        prev_is_string = is_string;
    }
    out
}

fn sprintf(format: &str, args: &[Value]) -> String {
    let mut out = String::new();
    let mut args = args.iter();
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb @ ('s' | 'v' | 'd' | 'q')) => match args.next() {
                Some(arg) => match verb {
                    'q' => out.push_str(&format!("{:?}", as_string(arg))),
                    'd' => match arg.as_i64() {
                        Some(n) => out.push_str(&n.to_string()),
                        None => out.push_str(&format!("%!d({})", display(arg))),
                    },
                    _ => out.push_str(&display(arg)),
                },
                None => out.push_str(&format!("%!{}(MISSING)", verb)),
            },
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push_str("%!(NOVERB)"),
        }
    }

    out
}
