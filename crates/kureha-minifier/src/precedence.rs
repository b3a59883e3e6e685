use kureha_lang::{BinaryOperator, UnaryOperator};

/// Every operator form the renderer can emit, including the ones that are
/// separate node kinds in the tree (ranges, ternaries, assignments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Not,
    BitNot,
    UnaryPlus,
    Pow,
    Negate,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Gt,
    Ge,
    Lt,
    Le,
    Cmp,
    Eq,
    CaseEq,
    NotEq,
    Match,
    NotMatch,
    And,
    Or,
    Range,
    ExclusiveRange,
    Ternary,
    RescueModifier,
    Assign,
    KeywordAnd,
    KeywordOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
    NonAssoc,
}

/// Where a child sits relative to its parent operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    /// The single operand of a prefix operator.
    Operand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorDescriptor {
    pub symbol: &'static str,
    /// Higher binds tighter.
    pub rank: u8,
    pub associativity: Associativity,
    /// Nested chains of the same operator evaluate identically however they are grouped.
    pub regroupable: bool,
    /// Trailing characters of a parent symbol this operator would fuse with into another token.
    pub fuses_after: &'static [char],
}

const fn descriptor(symbol: &'static str, rank: u8, associativity: Associativity) -> OperatorDescriptor {
    OperatorDescriptor {
        symbol,
        rank,
        associativity,
        regroupable: false,
        fuses_after: &[],
    }
}

const fn regroupable(symbol: &'static str, rank: u8) -> OperatorDescriptor {
    OperatorDescriptor {
        regroupable: true,
        ..descriptor(symbol, rank, Associativity::Left)
    }
}

impl Operator {
    pub const ALL: [Operator; 34] = [
        Operator::Not,
        Operator::BitNot,
        Operator::UnaryPlus,
        Operator::Pow,
        Operator::Negate,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::Add,
        Operator::Sub,
        Operator::Shl,
        Operator::Shr,
        Operator::BitAnd,
        Operator::BitOr,
        Operator::BitXor,
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
        Operator::Cmp,
        Operator::Eq,
        Operator::CaseEq,
        Operator::NotEq,
        Operator::Match,
        Operator::NotMatch,
        Operator::And,
        Operator::Or,
        Operator::Range,
        Operator::ExclusiveRange,
        Operator::Ternary,
        Operator::RescueModifier,
        Operator::Assign,
        Operator::KeywordAnd,
        Operator::KeywordOr,
    ];

    #[inline(always)]
    pub const fn descriptor(self) -> OperatorDescriptor {
        use Associativity::*;

        match self {
            Operator::Not => descriptor("!", 17, Right),
            Operator::BitNot => OperatorDescriptor {
                fuses_after: &['=', '!'],
                ..descriptor("~", 17, Right)
            },
            Operator::UnaryPlus => descriptor("+", 17, Right),
            Operator::Pow => descriptor("**", 16, Right),
            Operator::Negate => descriptor("-", 15, Right),
            Operator::Mul => descriptor("*", 14, Left),
            Operator::Div => descriptor("/", 14, Left),
            Operator::Mod => descriptor("%", 14, Left),
            Operator::Add => descriptor("+", 13, Left),
            Operator::Sub => descriptor("-", 13, Left),
            Operator::Shl => descriptor("<<", 12, Left),
            Operator::Shr => descriptor(">>", 12, Left),
            Operator::BitAnd => descriptor("&", 11, Left),
            Operator::BitOr => descriptor("|", 10, Left),
            Operator::BitXor => descriptor("^", 10, Left),
            Operator::Gt => descriptor(">", 9, Left),
            Operator::Ge => descriptor(">=", 9, Left),
            Operator::Lt => descriptor("<", 9, Left),
            Operator::Le => descriptor("<=", 9, Left),
            Operator::Cmp => descriptor("<=>", 8, NonAssoc),
            Operator::Eq => descriptor("==", 8, NonAssoc),
            Operator::CaseEq => descriptor("===", 8, NonAssoc),
            Operator::NotEq => descriptor("!=", 8, NonAssoc),
            Operator::Match => descriptor("=~", 8, NonAssoc),
            Operator::NotMatch => descriptor("!~", 8, NonAssoc),
            Operator::And => regroupable("&&", 7),
            Operator::Or => regroupable("||", 6),
            Operator::Range => descriptor("..", 5, NonAssoc),
            Operator::ExclusiveRange => descriptor("...", 5, NonAssoc),
            Operator::Ternary => descriptor("?", 4, Right),
            Operator::RescueModifier => descriptor("rescue", 3, Left),
            Operator::Assign => descriptor("=", 2, Right),
            Operator::KeywordAnd => regroupable("and", 0),
            Operator::KeywordOr => regroupable("or", 0),
        }
    }

    pub fn symbol(self) -> &'static str {
        self.descriptor().symbol
    }

    /// Binary operator a method call named `name` renders as, when called with one argument.
    pub fn from_method_name(name: &str) -> Option<Self> {
        BinaryOperator::from_method_name(name).map(Operator::from)
    }

    /// Prefix operator a method call named `name` renders as, when called without arguments.
    pub fn from_prefix_method_name(name: &str) -> Option<Self> {
        UnaryOperator::from_method_name(name).map(Operator::from)
    }
}

impl From<BinaryOperator> for Operator {
    fn from(op: BinaryOperator) -> Self {
        match op {
            BinaryOperator::Pow => Operator::Pow,
            BinaryOperator::Mul => Operator::Mul,
            BinaryOperator::Div => Operator::Div,
            BinaryOperator::Mod => Operator::Mod,
            BinaryOperator::Add => Operator::Add,
            BinaryOperator::Sub => Operator::Sub,
            BinaryOperator::Shl => Operator::Shl,
            BinaryOperator::Shr => Operator::Shr,
            BinaryOperator::BitAnd => Operator::BitAnd,
            BinaryOperator::BitOr => Operator::BitOr,
            BinaryOperator::BitXor => Operator::BitXor,
            BinaryOperator::Gt => Operator::Gt,
            BinaryOperator::Ge => Operator::Ge,
            BinaryOperator::Lt => Operator::Lt,
            BinaryOperator::Le => Operator::Le,
            BinaryOperator::Cmp => Operator::Cmp,
            BinaryOperator::Eq => Operator::Eq,
            BinaryOperator::CaseEq => Operator::CaseEq,
            BinaryOperator::NotEq => Operator::NotEq,
            BinaryOperator::Match => Operator::Match,
            BinaryOperator::NotMatch => Operator::NotMatch,
            BinaryOperator::And => Operator::And,
            BinaryOperator::Or => Operator::Or,
            BinaryOperator::KeywordAnd => Operator::KeywordAnd,
            BinaryOperator::KeywordOr => Operator::KeywordOr,
        }
    }
}

impl From<UnaryOperator> for Operator {
    fn from(op: UnaryOperator) -> Self {
        match op {
            UnaryOperator::Not => Operator::Not,
            UnaryOperator::BitNot => Operator::BitNot,
            UnaryOperator::Plus => Operator::UnaryPlus,
            UnaryOperator::Negate => Operator::Negate,
        }
    }
}

/// Decides whether `child` needs grouping parentheses when it sits on `side` of `parent`.
pub fn needs_parens(child: Option<Operator>, parent: Operator, side: Side) -> bool {
    let Some(child) = child else {
        return false;
    };

    let child_descriptor = child.descriptor();
    let parent_descriptor = parent.descriptor();

    if side != Side::Left
        && parent_descriptor
            .symbol
            .chars()
            .next_back()
            .is_some_and(|last| child_descriptor.fuses_after.contains(&last))
    {
        return true;
    }

    match child_descriptor.rank.cmp(&parent_descriptor.rank) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => {
            if child == parent && parent_descriptor.regroupable {
                return false;
            }

            match (parent_descriptor.associativity, side) {
                (_, Side::Operand) => false,
                (Associativity::NonAssoc, _) => true,
                (Associativity::Left, Side::Right) => true,
                (Associativity::Right, Side::Left) => true,
                _ => false,
            }
        }
    }
}
