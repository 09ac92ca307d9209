//! Console line tokenizer.
//!
//! Lines are split shell-style, with one exception: the first brace-delimited
//! span (or, failing that, the first bracket-delimited span) is kept verbatim
//! as a single trailing token so that `update` can receive a dictionary
//! literal intact. Text after that span is discarded.

use std::ops::Range;

use crate::error::ParseError;

/// Tokenize one console line.
///
/// Shell-style tokens are stripped of trailing commas; tokens made only of
/// commas are dropped. An empty line yields no tokens.
pub fn parse_line(line: &str) -> Result<Vec<String>, ParseError> {
    match find_literal_span(line) {
        Some(span) => {
            let mut tokens = split_args(&line[..span.start])?;
            tokens.push(line[span].to_string());
            Ok(tokens)
        }
        None => split_args(line),
    }
}

/// Byte range of the literal span treated as an opaque trailing token.
pub fn find_literal_span(line: &str) -> Option<Range<usize>> {
    find_balanced(line, '{', '}').or_else(|| find_balanced(line, '[', ']'))
}

/// Whether `token` is a brace-delimited literal.
pub fn is_dict_literal(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('{') && token.ends_with('}')
}

fn split_args(text: &str) -> Result<Vec<String>, ParseError> {
    Ok(split_words(text)?
        .into_iter()
        .filter_map(strip_trailing_commas)
        .collect())
}

fn strip_trailing_commas(token: String) -> Option<String> {
    let trimmed = token.trim_end_matches(',');
    if trimmed.is_empty() && !token.is_empty() {
        None
    } else if trimmed.len() == token.len() {
        Some(token)
    } else {
        Some(trimmed.to_string())
    }
}

/// Shell-style word splitting.
///
/// Whitespace separates words. Single quotes preserve their contents
/// literally; double quotes allow `\"` and `\\` escapes; outside quotes a
/// backslash escapes the next character. Adjacent quoted and unquoted parts
/// join into one word, and `""` yields an empty word.
pub fn split_words(text: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut chars = text.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut word = String::new();
        while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
            match c {
                '\'' => loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return Err(ParseError::UnclosedQuote),
                    }
                },
                '"' => loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(e @ ('"' | '\\')) => word.push(e),
                            Some(other) => {
                                word.push('\\');
                                word.push(other);
                            }
                            None => return Err(ParseError::UnclosedQuote),
                        },
                        Some(c) => word.push(c),
                        None => return Err(ParseError::UnclosedQuote),
                    }
                },
                '\\' => match chars.next() {
                    Some(e) => word.push(e),
                    None => return Err(ParseError::TrailingEscape),
                },
                c => word.push(c),
            }
        }
        words.push(word);
    }

    Ok(words)
}

fn find_balanced(line: &str, open: char, close: char) -> Option<Range<usize>> {
    let start = first_unquoted(line, open)?;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in line[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(start..start + offset + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte offset of the first `target` outside shell quotes.
fn first_unquoted(line: &str, target: char) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some('\'') => {
                if c == '\'' {
                    quote = None;
                }
            }
            Some(q) => {
                if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\\' => escaped = true,
                '\'' | '"' => quote = Some(c),
                c if c == target => return Some(offset),
                _ => {}
            },
        }
    }
    None
}
