use reef_common::token::TokenKind;

/// The precedence ladder, ascending.
///
/// Assignments bind just above `Lowest` and are left-associative like
/// every other rung. `**` gets its own rung between the multiplicative
/// operators and prefix so `5 * 5 ** 2` parses as `5 * (5 ** 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Assign,
    OrElse,
    BooleanOr,
    BooleanAnd,
    BoolEquiv,
    BoolLtGt,
    Range,
    AddSub,
    MulDiv,
    Power,
    Prefix,
    Call,
}

/// Left-binding precedence of an infix token. Unknown tokens sit at
/// `Lowest`, which the Pratt loop never enters on.
pub fn precedence_of(kind: TokenKind) -> Precedence {
    use TokenKind::*;
    match kind {
        Assign | PlusAssign | MinusAssign | StarAssign | SlashAssign | PercentAssign
        | AndAssign | OrAssign | XorAssign | ShlAssign | ShrAssign | NotAssign => {
            Precedence::Assign
        }
        Orelse => Precedence::OrElse,
        BooleanOr => Precedence::BooleanOr,
        BooleanAnd => Precedence::BooleanAnd,
        Eq | NotEq => Precedence::BoolEquiv,
        Lt | LtEq | Gt | GtEq | Is | In => Precedence::BoolLtGt,
        DotDot | DotDotEq => Precedence::Range,
        Plus | Minus | And | Or | Xor => Precedence::AddSub,
        Star | Slash | Percent | Shl | Shr => Precedence::MulDiv,
        StarStar => Precedence::Power,
        Lparen | Lbracket | ColonColon => Precedence::Call,
        _ => Precedence::Lowest,
    }
}
