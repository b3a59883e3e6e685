use itertools::Itertools;
use kureha_lang::{Expr, StringPart, VariableKind};

use crate::{
    Error, RenderOptions,
    buffer::is_word_char,
    literal,
    renderer::render_embedded,
};

/// Literal kinds that can carry `#{...}` splices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Splice<'a> {
    String,
    Symbol,
    XString,
    Regex { flags: &'a str },
}

impl Splice<'_> {
    fn delimiter(&self) -> char {
        match self {
            Splice::String | Splice::Symbol => '"',
            Splice::XString => '`',
            Splice::Regex { .. } => '/',
        }
    }
}

/// Rebuilds an interpolated literal, rendering every embedded part in its own scope.
pub(crate) fn splice(parts: &[StringPart], kind: Splice<'_>, options: &RenderOptions) -> Result<String, Error> {
    let parts = merge_text(parts);

    if matches!(kind, Splice::String | Splice::Symbol) && parts.iter().all(|part| matches!(part, Part::Text(_))) {
        let text = text_or_empty(parts.first());
        return Ok(match kind {
            Splice::Symbol => literal::symbol(text),
            _ => literal::string(text),
        });
    }

    let mut result = String::new();

    match kind {
        Splice::Symbol => result.push_str(":\""),
        _ => result.push(kind.delimiter()),
    }

    for (index, part) in parts.iter().enumerate() {
        match part {
            Part::Text(text) => match kind {
                Splice::Regex { .. } => result.push_str(&escape_regex_source(text)),
                _ => result.push_str(&literal::escape(text, kind.delimiter())),
            },
            Part::Embedded(statements) => {
                let next_text = match parts.get(index + 1) {
                    Some(Part::Text(text)) => Some(text.as_str()),
                    _ => None,
                };

                match short_form_variable(statements, next_text) {
                    Some(name) => {
                        result.push('#');
                        result.push_str(name);
                    }
                    None => {
                        result.push_str("#{");
                        result.push_str(&render_embedded(statements, options)?);
                        result.push('}');
                    }
                }
            }
        }
    }

    result.push(kind.delimiter());

    if let Splice::Regex { flags } = kind {
        result.push_str(flags);
    }

    Ok(result)
}

enum Part<'a> {
    Text(String),
    Embedded(&'a [kureha_lang::Node]),
}

fn merge_text(parts: &[StringPart]) -> Vec<Part<'_>> {
    parts
        .iter()
        .map(|part| match part {
            StringPart::Text(text) => Part::Text(text.clone()),
            StringPart::Embedded(statements) => Part::Embedded(statements.as_slice()),
        })
        .coalesce(|previous, current| match (previous, current) {
            (Part::Text(mut left), Part::Text(right)) => {
                left.push_str(&right);
                Ok(Part::Text(left))
            }
            (previous, current) => Err((previous, current)),
        })
        .filter(|part| !matches!(part, Part::Text(text) if text.is_empty()))
        .collect()
}

fn text_or_empty<'a>(part: Option<&'a Part<'_>>) -> &'a str {
    match part {
        Some(Part::Text(text)) => text,
        _ => "",
    }
}

/// `#@name`, `#@@name` and `#$name` splice a variable without braces when
/// the following text cannot be read as part of its name.
fn short_form_variable<'a>(statements: &'a [kureha_lang::Node], next_text: Option<&str>) -> Option<&'a str> {
    let [statement] = statements else {
        return None;
    };

    let Expr::Variable {
        kind: VariableKind::Instance | VariableKind::Class | VariableKind::Global,
        name,
    } = &statement.expr
    else {
        return None;
    };

    let sigil_free = name.trim_start_matches(['@', '$']);
    if !literal::is_identifier(sigil_free) {
        return None;
    }

    match next_text.and_then(|text| text.chars().next()) {
        Some(c) if is_word_char(c) => None,
        _ => Some(name.as_str()),
    }
}

/// Regex text stays as written; only a bare `/` would end the literal early.
fn escape_regex_source(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                result.push(ch);
                if let Some(escaped) = chars.next() {
                    result.push(escaped);
                }
            }
            '/' => result.push_str("\\/"),
            c => result.push(c),
        }
    }

    result
}
