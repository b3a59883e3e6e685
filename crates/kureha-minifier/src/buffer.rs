/// Append-only output of a single render call.
///
/// Every push decides whether the new token can touch the previous one or
/// needs a space to stay a separate token.
#[derive(Debug, Default)]
pub(crate) struct RenderBuffer {
    text: String,
    pending: Pending,
    space_after_keywords: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Pending {
    #[default]
    None,
    /// A keyword or command name whose operand is about to be pushed.
    Operand,
    /// A `/.../` literal without flags; letters pushed next would read as options.
    RegexEnd,
}

impl RenderBuffer {
    pub fn new(space_after_keywords: bool) -> Self {
        Self {
            text: String::new(),
            pending: Pending::None,
            space_after_keywords,
        }
    }

    pub fn push_str(&mut self, s: &str) {
        let Some(first) = s.chars().next() else {
            return;
        };

        if self.needs_space_before(first) {
            self.text.push(' ');
        }

        self.pending = Pending::None;
        self.text.push_str(s);
    }

    /// Pushes a keyword that is not followed by an operand (`end`, `else`, `redo`).
    pub fn push_keyword(&mut self, keyword: &str) {
        self.push_str(keyword);
    }

    /// Pushes a keyword or command name whose operand comes next.
    pub fn push_operand_keyword(&mut self, keyword: &str) {
        self.push_str(keyword);
        self.pending = Pending::Operand;
    }

    /// Pushes a regular expression literal, `flagless` when nothing follows its closing `/`.
    pub fn push_regex(&mut self, literal: &str, flagless: bool) {
        self.push_str(literal);
        if flagless {
            self.pending = Pending::RegexEnd;
        }
    }

    /// Pushes text that must stay verbatim, such as a line break or comment.
    pub fn push_raw(&mut self, s: &str) {
        self.pending = Pending::None;
        self.text.push_str(s);
    }

    pub fn into_string(self) -> String {
        self.text
    }

    fn needs_space_before(&self, first: char) -> bool {
        match self.pending {
            Pending::Operand => return self.space_after_keywords || !matches!(first, '"' | '\''),
            Pending::RegexEnd if is_word_char(first) => return true,
            _ => {}
        }

        let Some(last) = self.text.chars().next_back() else {
            return false;
        };

        (ends_word(last) && is_word_char(first))
            // `foo? ==x` and `foo! =~x` keep the suffix on the method name.
            || (matches!(last, '?' | '!') && first == '=')
            // `a: :b`
            || (last == ':' && first == ':')
            // `a/ /b/` divides by a regex instead of opening a comment-like `//`.
            || (last == '/' && first == '/')
    }
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || !c.is_ascii()
}

fn ends_word(c: char) -> bool {
    is_word_char(c) || matches!(c, '?' | '!')
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::identifiers(vec!["def", "hello"], "def hello")]
    #[case::punctuation(vec!["a", "+", "b"], "a+b")]
    #[case::keyword_after_paren(vec!["foo()", "if"], "foo()if")]
    #[case::number_then_keyword(vec!["1", "if"], "1 if")]
    #[case::predicate_method_then_equals(vec!["empty?", "==", "x"], "empty? ==x")]
    #[case::label_then_symbol(vec!["a:", ":b"], "a: :b")]
    #[case::scope(vec!["Foo", "::", "Bar"], "Foo::Bar")]
    #[case::divide_by_regex(vec!["a", "/", "/b/"], "a/ /b/")]
    fn test_push_str(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        let mut buffer = RenderBuffer::new(false);
        tokens.iter().for_each(|token| buffer.push_str(token));
        assert_eq!(buffer.into_string(), expected);
    }

    #[rstest]
    #[case::string_operand("\"x\"", false, "puts\"x\"")]
    #[case::word_operand("x", false, "puts x")]
    #[case::symbol_operand(":a", false, "puts :a")]
    #[case::forced_space("\"x\"", true, "puts \"x\"")]
    fn test_push_operand_keyword(#[case] operand: &str, #[case] space_after_keywords: bool, #[case] expected: &str) {
        let mut buffer = RenderBuffer::new(space_after_keywords);
        buffer.push_operand_keyword("puts");
        buffer.push_str(operand);
        assert_eq!(buffer.into_string(), expected);
    }

    #[rstest]
    #[case::flagless_then_keyword(true, "if", "/a/ if")]
    #[case::flagless_then_operator(true, "&&", "/a/&&")]
    #[case::flagged_then_keyword(false, "if", "/a/i if")]
    fn test_push_regex(#[case] flagless: bool, #[case] next: &str, #[case] expected: &str) {
        let mut buffer = RenderBuffer::new(false);
        buffer.push_regex(if flagless { "/a/" } else { "/a/i" }, flagless);
        buffer.push_str(next);
        assert_eq!(buffer.into_string(), expected);
    }

    #[test]
    fn test_push_raw_never_adds_space() {
        let mut buffer = RenderBuffer::new(false);
        buffer.push_operand_keyword("return");
        buffer.push_raw("\n");
        buffer.push_str("x");
        assert_eq!(buffer.into_string(), "return\nx");
    }
}
