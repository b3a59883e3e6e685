/// Cosmetic switches read for the duration of one render call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Join statements with `;` rather than a newline.
    pub insert_separators: bool,
    pub strip_comments: bool,
    pub strip_blank_lines: bool,
    /// Always put a space after keywords and command names that take an operand.
    pub space_after_keywords: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            insert_separators: true,
            strip_comments: true,
            strip_blank_lines: true,
            space_after_keywords: false,
        }
    }
}

impl RenderOptions {
    pub(crate) fn separator(&self) -> &'static str {
        if self.insert_separators { ";" } else { "\n" }
    }
}
