//! jsheap inspector
//!
//! Interactive BigInt calculator over a live heap. Each line is either an
//! expression (`0xff ** 20`, `-7 >> 1`, `~0b1010`) or a command:
//!
//! - `:radix N` prints results in radix `N` (2 to 36)
//! - `:dump` shows the heap projection of the last result
//! - `:stats` prints heap statistics
//! - `:gc` runs a collection

use std::process::ExitCode;

use jsheap::bigint::{self, BigInt};
use jsheap::gc::{Handle, HandleScope};
use jsheap::{Context, JsResult};
use regex::Regex;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

const EXPRESSION: &str = r"(?x)
    ^\s*
    (?P<lunary>[-~]?)\s*(?P<lhs>0[xX][0-9a-fA-F]+|0[oO][0-7]+|0[bB][01]+|[0-9]+)n?
    (?:\s*
        (?P<op>\*\*|>>>|<<|>>|[-+*/%&|^])
        \s*(?P<runary>[-~]?)\s*(?P<rhs>0[xX][0-9a-fA-F]+|0[oO][0-7]+|0[bB][01]+|[0-9]+)n?
    )?
    \s*$";

struct Inspector {
    ctx: Context,
    expression: Regex,
    radix: u32,
    last: Option<BigInt>,
}

impl Inspector {
    fn new(expression: Regex) -> Self {
        Inspector {
            ctx: Context::new(),
            expression,
            radix: 10,
            last: None,
        }
    }

    fn handle_line(&mut self, line: &str) -> String {
        match line.split_once(char::is_whitespace).unwrap_or((line, "")) {
            (":radix", arg) => match arg.trim().parse::<u32>() {
                Ok(radix) if (2..=36).contains(&radix) => {
                    self.radix = radix;
                    format!("radix {}", radix)
                }
                _ => "usage: :radix N (2 to 36)".to_string(),
            },
            (":dump", _) => self.dump(),
            (":stats", _) => self.ctx.memory_stats().to_string(),
            (":gc", _) => format!("{:?}", self.ctx.collect_garbage()),
            (command, _) if command.starts_with(':') => format!("unknown command {}", command),
            _ => self.evaluate(line),
        }
    }

    fn evaluate(&mut self, line: &str) -> String {
        let Some(caps) = self.expression.captures(line) else {
            return "syntax error".to_string();
        };
        let group = |name: &str| caps.name(name).map_or("", |m| m.as_str());
        let (lunary, lhs, op, runary, rhs) = (
            group("lunary"),
            group("lhs"),
            group("op"),
            group("runary"),
            group("rhs"),
        );

        let mut scope = HandleScope::new(&mut self.ctx);
        let result = operand(&mut scope, lunary, lhs).and_then(|x| {
            if op.is_empty() {
                return Ok(x);
            }
            let y = operand(&mut scope, runary, rhs)?;
            binary(&mut scope, op, x, y)
        });
        match result {
            Ok(value) => {
                let value = scope.heap().get(value).clone();
                let text = bigint::to_string(&value, self.radix);
                self.last = Some(value);
                text
            }
            Err(err) => {
                scope.clear_exception();
                err.to_string()
            }
        }
    }

    fn dump(&mut self) -> String {
        let Some(last) = &self.last else {
            return "no result yet".to_string();
        };
        let mut scope = HandleScope::new(&mut self.ctx);
        let handle = scope.factory().new_bigint(last.sign(), last.digits().to_vec());
        format_dump(&scope, handle)
    }
}

#[cfg(feature = "dump")]
fn format_dump(ctx: &Context, handle: Handle<BigInt>) -> String {
    jsheap::runtime::format_object(ctx.heap(), handle.value(ctx.heap()))
}

#[cfg(not(feature = "dump"))]
fn format_dump(_: &Context, _: Handle<BigInt>) -> String {
    "heap dumps need the `dump` feature".to_string()
}

fn operand(ctx: &mut Context, unary: &str, literal: &str) -> JsResult<Handle<BigInt>> {
    let (radix, digits) = match literal.get(..2) {
        Some("0x" | "0X") => (16, &literal[2..]),
        Some("0o" | "0O") => (8, &literal[2..]),
        Some("0b" | "0B") => (2, &literal[2..]),
        _ => (10, literal),
    };
    let value = match bigint::parse(ctx, digits, radix) {
        Some(value) => value,
        None => return Err(ctx.throw(jsheap::JsError::Range("Maximum BigInt size exceeded"))),
    };
    match unary {
        "-" => bigint::unary_minus(ctx, value),
        "~" => bigint::bitwise_not(ctx, value),
        _ => Ok(value),
    }
}

fn binary(ctx: &mut Context, op: &str, x: Handle<BigInt>, y: Handle<BigInt>) -> JsResult<Handle<BigInt>> {
    match op {
        "+" => bigint::add(ctx, x, y),
        "-" => bigint::subtract(ctx, x, y),
        "*" => bigint::multiply(ctx, x, y),
        "/" => bigint::divide(ctx, x, y),
        "%" => bigint::remainder(ctx, x, y),
        "**" => bigint::exponentiate(ctx, x, y),
        "&" => bigint::bitwise_and(ctx, x, y),
        "|" => bigint::bitwise_or(ctx, x, y),
        "^" => bigint::bitwise_xor(ctx, x, y),
        "<<" => bigint::left_shift(ctx, x, y),
        ">>" => bigint::signed_right_shift(ctx, x, y),
        ">>>" => bigint::unsigned_right_shift(ctx, x, y),
        _ => unreachable!("operator {} not matched by the expression pattern", op),
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let expression = match Regex::new(EXPRESSION) {
        Ok(re) => re,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut editor = match rustyline::DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Error starting line editor: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("jsheap inspector");
    println!("Type a BigInt expression or :radix, :dump, :stats, :gc. Ctrl+D to exit.\n");

    let mut inspector = Inspector::new(expression);
    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                println!("{}", inspector.handle_line(line));
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
