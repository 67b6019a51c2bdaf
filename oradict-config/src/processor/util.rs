use oradict_core::err::{bail, Context, Result};
use serde_yaml::{Mapping, Value};

use super::ConfigStringExpr as X;

/// Recursively walks the configuration nodes uses the supplied callback
/// to transforms any strings found
pub(crate) fn process_strings(
    node: Value,
    cb: &impl Fn(String) -> Result<String>,
) -> Result<Value> {
    Ok(match node {
        Value::String(str) => Value::String(
            cb(str.clone()).context(format!("Failed to process config string {}", str))?,
        ),
        Value::Sequence(seq) => Value::Sequence(
            seq.into_iter()
                .map(|n| process_strings(n, cb))
                .collect::<Result<Vec<Value>>>()?,
        ),
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|i| -> Result<(Value, Value)> {
                    Ok((i.0, process_strings(i.1, cb)?))
                })
                .collect::<Result<Mapping>>()?,
        ),
        n => n,
    })
}

/// Splits the string into constant and `${..}` segments.
/// A backslash escapes the following character.
pub(crate) fn parse_expression(str: &str) -> Result<Vec<X>> {
    let mut segments = vec![];
    let mut constant = String::new();
    let mut chars = str.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    constant.push(escaped);
                }
            }
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                let mut inner = String::new();
                let mut closed = false;

                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }

                if !closed {
                    bail!(
                        "Failed to parse expression \"{}\", found unclosed ${{...}}",
                        str
                    );
                }

                if !constant.is_empty() {
                    segments.push(X::Constant(std::mem::take(&mut constant)));
                }
                segments.push(X::Interpolation(
                    inner.split(':').map(|i| i.to_string()).collect(),
                ));
            }
            c => constant.push(c),
        }
    }

    if !constant.is_empty() || segments.is_empty() {
        segments.push(X::Constant(constant));
    }

    Ok(segments)
}

/// Renders an interpolation back into its `${..}` form
pub(crate) fn interpolation_to_string(parts: &[String]) -> String {
    format!("${{{}}}", parts.join(":"))
}
