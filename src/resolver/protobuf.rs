//! Protobuf resolution
//!
//! Only the structure needed to register a `.proto` file is checked: the
//! braces balance, the syntax level is known, there is something to
//! register, and every import is either a well-known type or a declared
//! reference.

use std::iter::Peekable;
use std::str::Chars;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{RegisterError, Result};
use crate::resolver::SchemaSources;
use crate::subject::SchemaType;

const WELL_KNOWN_PREFIX: &str = "google/protobuf/";

struct ProtoPatterns {
    syntax: Regex,
    definition: Regex,
    import: Regex,
}

fn patterns() -> &'static ProtoPatterns {
    static PATTERNS: OnceLock<ProtoPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ProtoPatterns {
        syntax: Regex::new(r#"(?m)^\s*syntax\s*=\s*"([^"]*)"\s*;"#).unwrap(),
        definition: Regex::new(r"(?m)^\s*(message|enum|service)\s+\w+").unwrap(),
        import: Regex::new(r#"(?m)^\s*import\s+(?:public\s+|weak\s+)?"([^"]+)"\s*;"#).unwrap(),
    })
}

pub(crate) fn resolve(sources: &SchemaSources) -> Result<(String, String)> {
    let declared = sources.dependency_names();
    for dependency in &sources.dependencies {
        check(&dependency.schema, &dependency.origin, None)?;
    }

    let is_declared = |import: &str| declared.contains(import);
    let stripped = check(&sources.main, &sources.path, Some(&is_declared))?;
    let canonical = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok((sources.main.clone(), canonical))
}

/// Check one file and return it with comments removed. Imports are only
/// verified when `is_declared` is given; dependencies carry their own.
fn check(text: &str, origin: &str, is_declared: Option<&dyn Fn(&str) -> bool>) -> Result<String> {
    let patterns = patterns();
    let invalid = |reason: String| RegisterError::invalid(SchemaType::Protobuf, origin, reason);

    let stripped = strip_comments(text).map_err(invalid)?;

    if let Some(captures) = patterns.syntax.captures(&stripped) {
        let syntax = &captures[1];
        if syntax != "proto2" && syntax != "proto3" {
            return Err(invalid(format!("unknown syntax '{}'", syntax)));
        }
    }

    if !patterns.definition.is_match(&stripped) {
        return Err(invalid("no message, enum or service definition".to_string()));
    }

    if let Some(is_declared) = is_declared {
        for captures in patterns.import.captures_iter(&stripped) {
            let import = &captures[1];
            if !import.starts_with(WELL_KNOWN_PREFIX) && !is_declared(import) {
                return Err(RegisterError::UnresolvedImport {
                    import: import.to_string(),
                    path: origin.to_string(),
                });
            }
        }
    }

    Ok(stripped)
}

#[derive(Clone, Copy, PartialEq)]
enum Scan {
    Code,
    LineComment,
    BlockComment,
    Literal(char),
}

/// Remove comments in one pass, whichever kind opens first, and check that
/// braces outside string literals balance. Literals are kept as written.
fn strip_comments(text: &str) -> std::result::Result<String, String> {
    let mut stripped = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut state = Scan::Code;
    let mut depth: i64 = 0;

    while let Some(c) = chars.next() {
        state = match state {
            Scan::Code => match c {
                '/' if next_is(&mut chars, '/') => Scan::LineComment,
                '/' if next_is(&mut chars, '*') => {
                    stripped.push(' ');
                    Scan::BlockComment
                }
                '"' | '\'' => {
                    stripped.push(c);
                    Scan::Literal(c)
                }
                _ => {
                    if c == '{' {
                        depth += 1;
                    } else if c == '}' {
                        depth -= 1;
                        if depth < 0 {
                            return Err("unexpected '}'".to_string());
                        }
                    }
                    stripped.push(c);
                    Scan::Code
                }
            },
            Scan::LineComment if c == '\n' => {
                stripped.push(c);
                Scan::Code
            }
            Scan::BlockComment if c == '*' && next_is(&mut chars, '/') => Scan::Code,
            Scan::LineComment | Scan::BlockComment => {
                if c == '\n' {
                    stripped.push(c);
                }
                state
            }
            Scan::Literal(quote) => {
                stripped.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        stripped.push(escaped);
                    }
                    state
                } else if c == quote {
                    Scan::Code
                } else {
                    state
                }
            }
        };
    }

    match state {
        Scan::BlockComment => Err("unterminated block comment".to_string()),
        Scan::Literal(_) => Err("unterminated string literal".to_string()),
        _ if depth != 0 => Err(format!("{} unclosed '{{'", depth)),
        _ => Ok(stripped),
    }
}

/// Consume the next char if it is `expected`
fn next_is(chars: &mut Peekable<Chars<'_>>, expected: char) -> bool {
    chars.next_if_eq(&expected).is_some()
}
