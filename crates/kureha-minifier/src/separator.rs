//! Statement boundary decisions.
//!
//! A statement sequence walks this machine once per statement. What goes
//! between two statements depends only on the state left by the previous one
//! and the class of the next one, never on rendered text.

/// State after the last emitted item of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparatorState {
    /// Nothing emitted yet, or directly after an opening delimiter.
    Start,
    /// After a plain statement or a construct header (`def x`, `if y`, `do|z|`).
    AfterStatement,
    /// After a construct closed by its own terminator keyword.
    AfterBlockClose,
    /// After a rendered comment, which runs to the end of its line.
    AfterComment,
    /// A kept blank line is waiting to be emitted before the next statement.
    AfterBlankLine,
}

/// How the renderer sees a statement for boundary purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementClass {
    /// Trivia removed by the render options.
    Skipped,
    Plain,
    /// Definitions, block-form conditionals and loops, do-blocks.
    BlockClosing,
    Comment,
    BlankLine,
    /// `end` and the clause keywords `else`, `elsif`, `when`, `rescue`, `ensure`.
    Terminator,
    /// The closing `}` or `)` of a delimited sequence.
    Delimiter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    None,
    /// `;`, or a newline when separators are turned off.
    Separator,
    Newline,
    BlankLine,
}

/// Boundary to emit before a statement of `class`, and the state after it.
pub fn transition(state: SeparatorState, class: StatementClass) -> (Boundary, SeparatorState) {
    use Boundary as B;
    use SeparatorState as S;
    use StatementClass as C;

    match (state, class) {
        (state, C::Skipped) => (B::None, state),

        (S::Start, C::BlankLine) => (B::None, S::Start),
        (S::Start, C::Plain) => (B::None, S::AfterStatement),
        (S::Start, C::BlockClosing) => (B::None, S::AfterBlockClose),
        (S::Start, C::Comment) => (B::None, S::AfterComment),
        (S::Start, C::Terminator | C::Delimiter) => (B::None, S::Start),

        (S::AfterStatement | S::AfterBlockClose, C::Plain) => (B::Separator, S::AfterStatement),
        (S::AfterStatement | S::AfterBlockClose, C::BlockClosing) => (B::Separator, S::AfterBlockClose),
        (S::AfterStatement | S::AfterBlockClose, C::Terminator) => (B::Separator, S::Start),
        (S::AfterStatement | S::AfterBlockClose, C::Comment) => (B::None, S::AfterComment),
        (S::AfterStatement | S::AfterBlockClose, C::BlankLine) => (B::None, S::AfterBlankLine),
        (S::AfterStatement | S::AfterBlockClose, C::Delimiter) => (B::None, S::Start),

        (S::AfterComment, C::Plain) => (B::Newline, S::AfterStatement),
        (S::AfterComment, C::BlockClosing) => (B::Newline, S::AfterBlockClose),
        (S::AfterComment, C::Comment) => (B::Newline, S::AfterComment),
        (S::AfterComment, C::BlankLine) => (B::None, S::AfterBlankLine),
        (S::AfterComment, C::Terminator | C::Delimiter) => (B::Newline, S::Start),

        (S::AfterBlankLine, C::Plain) => (B::BlankLine, S::AfterStatement),
        (S::AfterBlankLine, C::BlockClosing) => (B::BlankLine, S::AfterBlockClose),
        (S::AfterBlankLine, C::Comment) => (B::BlankLine, S::AfterComment),
        (S::AfterBlankLine, C::BlankLine) => (B::None, S::AfterBlankLine),
        (S::AfterBlankLine, C::Terminator) => (B::Newline, S::Start),
        (S::AfterBlankLine, C::Delimiter) => (B::None, S::Start),
    }
}
