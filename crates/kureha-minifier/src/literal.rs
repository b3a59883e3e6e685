use std::fmt::Write;

use crate::buffer::is_word_char;

const OPERATOR_METHODS: &[&str] = &[
    "+", "-", "*", "/", "%", "**", "==", "===", "!=", "=~", "!~", "<", "<=", ">", ">=", "<=>", "<<", ">>", "&", "|",
    "^", "~", "!", "[]", "[]=", "+@", "-@", "`",
];

/// Integer literal text without digit separators or a redundant leading `+`.
pub fn integer(text: &str) -> String {
    text.strip_prefix('+').unwrap_or(text).replace('_', "")
}

pub fn float(value: f64) -> String {
    if value.is_nan() {
        return "Float::NAN".to_string();
    }

    if value.is_infinite() {
        return if value > 0.0 {
            "Float::INFINITY".to_string()
        } else {
            "-Float::INFINITY".to_string()
        };
    }

    let plain = format!("{}", value);
    let plain = if plain.contains('.') { plain } else { format!("{}.0", plain) };
    let exponent = format!("{:e}", value);

    if exponent.len() < plain.len() { exponent } else { plain }
}

pub fn symbol(name: &str) -> String {
    if is_bare_symbol(name) {
        format!(":{}", name)
    } else {
        format!(":\"{}\"", escape(name, '"'))
    }
}

/// Plain string literal in whichever quoting is shorter, double quotes on a tie.
pub fn string(content: &str) -> String {
    let double = format!("\"{}\"", escape(content, '"'));

    match single_quoted(content) {
        Some(single) if single.len() < double.len() => single,
        _ => double,
    }
}

/// `%w[a b]` or `%i[a b]` when every element survives whitespace splitting.
pub fn word_array(sigil: char, elements: &[&str]) -> Option<String> {
    let fits = |element: &&str| {
        !element.is_empty()
            && !element
                .chars()
                .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '[' | ']' | '\\'))
    };

    if elements.is_empty() || !elements.iter().all(fits) {
        return None;
    }

    Some(format!("%{}[{}]", sigil, elements.join(" ")))
}

/// Escapes string content for a double-quote-like literal closed by `delimiter`.
pub fn escape(content: &str, delimiter: char) -> String {
    let mut result = String::with_capacity(content.len() * 2);
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => result.push_str("\\\\"),
            c if c == delimiter => {
                result.push('\\');
                result.push(c);
            }
            '#' if matches!(chars.peek(), Some('{' | '@' | '$')) => result.push_str("\\#"),
            '\n' | '\t' => result.push(ch),
            '\r' => result.push_str("\\r"),
            '\u{7}' => result.push_str("\\a"),
            '\u{8}' => result.push_str("\\b"),
            '\u{b}' => result.push_str("\\v"),
            '\u{c}' => result.push_str("\\f"),
            '\u{1b}' => result.push_str("\\e"),
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0x7F {
                    let _ = write!(result, "\\x{:02x}", code);
                } else {
                    let _ = write!(result, "\\u{{{:x}}}", code);
                }
            }
            c => result.push(c),
        }
    }

    result
}

fn single_quoted(content: &str) -> Option<String> {
    if content.chars().any(|c| c.is_control() && !matches!(c, '\n' | '\t')) {
        return None;
    }

    let mut result = String::with_capacity(content.len() + 2);
    result.push('\'');
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\'' => result.push_str("\\'"),
            // A lone backslash only needs doubling before a quote, another backslash, or the end.
            '\\' if matches!(chars.peek(), None | Some('\\' | '\'')) => result.push_str("\\\\"),
            c => result.push(c),
        }
    }

    result.push('\'');
    Some(result)
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if (first.is_alphabetic() || first == '_' || !first.is_ascii()) => chars.all(is_word_char),
        _ => false,
    }
}

/// Names a method can be defined or aliased under without quoting.
pub fn is_method_name(name: &str) -> bool {
    if OPERATOR_METHODS.contains(&name) {
        return true;
    }

    match name.strip_suffix(['?', '!', '=']) {
        Some(stem) => is_identifier(stem),
        None => is_identifier(name),
    }
}

pub fn is_bare_symbol(name: &str) -> bool {
    if let Some(rest) = name.strip_prefix("@@") {
        return is_identifier(rest);
    }

    if let Some(rest) = name.strip_prefix('@') {
        return is_identifier(rest);
    }

    if let Some(rest) = name.strip_prefix('$') {
        return is_identifier(rest) || (!rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()));
    }

    is_method_name(name)
}

/// Symbols that can be written as a `name:` hash label, including `ok?:` and `save!:`.
pub fn is_label(name: &str) -> bool {
    is_identifier(name.strip_suffix(['?', '!']).unwrap_or(name))
}
