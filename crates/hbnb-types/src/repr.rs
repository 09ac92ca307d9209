//! Console notation for attribute values.
//!
//! The canonical entity representation renders attribute mappings the way the
//! console has always displayed them: single-quoted strings, `True`/`False`,
//! `None`, and `{'key': value}` mappings. This module produces that notation
//! from [`AttrValue`]s.

use std::fmt::Write as _;

use crate::AttrValue;

/// Quote a string, preferring single quotes unless the text contains a single
/// quote and no double quote.
pub fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Render a float with a mandatory fractional part or exponent.
pub fn repr_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".into();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let abs = f.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        // "1.5e20" -> "1.5e+20", "1e-5" -> "1e-05"
        let sci = format!("{f:e}");
        let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(d) => ('-', d),
            None => ('+', exp),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    if f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        format!("{f}")
    }
}

/// Render any attribute value.
pub fn repr_value(value: &AttrValue) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &AttrValue) {
    match value {
        AttrValue::Null => out.push_str("None"),
        AttrValue::Bool(true) => out.push_str("True"),
        AttrValue::Bool(false) => out.push_str("False"),
        AttrValue::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => {
                let _ = write!(out, "{i}");
            }
            (None, Some(u), _) => {
                let _ = write!(out, "{u}");
            }
            (None, None, Some(f)) => out.push_str(&repr_float(f)),
            _ => {
                let _ = write!(out, "{n}");
            }
        },
        AttrValue::String(s) => out.push_str(&repr_str(s)),
        AttrValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        AttrValue::Object(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&repr_str(k));
                out.push_str(": ");
                write_value(out, v);
            }
            out.push('}');
        }
    }
}

/// Render a list of already-formatted strings, e.g. the output of `all`.
pub fn repr_str_list<S: AsRef<str>>(items: &[S]) -> String {
    let rendered: Vec<String> = items.iter().map(|s| repr_str(s.as_ref())).collect();
    format!("[{}]", rendered.join(", "))
}
