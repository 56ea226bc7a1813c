//! The error taxonomy from the design's error-handling section.
//!
//! Codes are grouped by phase, matching the design's kind groupings
//! (Lexical / Syntactic / Semantic-name / Semantic-type / Overload /
//! Template / Constant-eval / Internal). The lexer and parser are external
//! to this crate; their codes are reserved here so the sink can render a
//! uniform `E####` surface regardless of which stage raised the
//! diagnostic.
use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexical (E0xxx) — reserved for the external lexer.
    IllegalCharacter,
    UnterminatedComment,
    UnterminatedString,
    MalformedEscape,
    InvalidUnicode,
    EmptyCharLiteral,
    MultiCharLiteral,

    // Syntactic (E1xxx) — reserved for the external parser.
    UnexpectedToken,
    ExpectedDeclaration,
    ExpectedExpression,
    ExpectedIdentifier,
    ExpectedSemicolon,
    ExpectedCloseParen,
    ExpectedCloseBracket,
    ExpectedImportPath,
    ConflictingModifiers,

    // Semantic-name (E2xxx)
    Undefined,
    MultiplyDefined,
    InstanceMemberFromStatic,
    PrivateAccess,
    AmbiguousName,

    // Semantic-type (E3xxx)
    IncompatibleTypes,
    AmbiguousConversion,
    CyclicInheritance,
    NonSingular,
    InvalidQualifierCombination,
    InvalidTypeModifier,
    LiteralOverflow,

    // Overload (E4xxx)
    NoMatchingOverload,
    AmbiguousCall,

    // Template (E5xxx)
    InstantiationFailure,
    UnboundTypeParameter,
    ConstraintViolation,

    // Constant-eval (E6xxx)
    NotAConstant,
    UninitializedVariable,
    RuntimeOnly,

    // Internal (E9xxx)
    Unimplemented,
    InvalidState,
    CircularDependency,
}

impl ErrorCode {
    /// The stable `E####` code rendered in diagnostic output, grouped by
    /// phase the way the design's taxonomy groups them.
    #[must_use]
    pub fn code(self) -> &'static str {
        use ErrorCode::{
            AmbiguousCall, AmbiguousConversion, AmbiguousName, CircularDependency,
            ConflictingModifiers, ConstraintViolation, CyclicInheritance, EmptyCharLiteral,
            ExpectedCloseBracket, ExpectedCloseParen, ExpectedDeclaration, ExpectedExpression,
            ExpectedIdentifier, ExpectedImportPath, ExpectedSemicolon, IllegalCharacter,
            IncompatibleTypes, InstanceMemberFromStatic, InstantiationFailure,
            InvalidQualifierCombination, InvalidState, InvalidTypeModifier, InvalidUnicode,
            LiteralOverflow, MalformedEscape, MultiCharLiteral, MultiplyDefined,
            NoMatchingOverload, NonSingular, NotAConstant, PrivateAccess, RuntimeOnly,
            UnboundTypeParameter, Undefined, UninitializedVariable, Unimplemented,
            UnexpectedToken, UnterminatedComment, UnterminatedString,
        };
        match self {
            IllegalCharacter => "E0001",
            UnterminatedComment => "E0002",
            UnterminatedString => "E0003",
            MalformedEscape => "E0004",
            InvalidUnicode => "E0005",
            EmptyCharLiteral => "E0006",
            MultiCharLiteral => "E0007",
            UnexpectedToken => "E1001",
            ExpectedDeclaration => "E1002",
            ExpectedExpression => "E1003",
            ExpectedIdentifier => "E1004",
            ExpectedSemicolon => "E1005",
            ExpectedCloseParen => "E1006",
            ExpectedCloseBracket => "E1007",
            ExpectedImportPath => "E1008",
            ConflictingModifiers => "E1009",
            Undefined => "E2001",
            MultiplyDefined => "E2002",
            InstanceMemberFromStatic => "E2003",
            PrivateAccess => "E2004",
            AmbiguousName => "E2005",
            IncompatibleTypes => "E3001",
            AmbiguousConversion => "E3002",
            CyclicInheritance => "E3003",
            NonSingular => "E3004",
            InvalidQualifierCombination => "E3005",
            InvalidTypeModifier => "E3006",
            LiteralOverflow => "E3007",
            NoMatchingOverload => "E4001",
            AmbiguousCall => "E4002",
            InstantiationFailure => "E5001",
            UnboundTypeParameter => "E5002",
            ConstraintViolation => "E5003",
            NotAConstant => "E6001",
            UninitializedVariable => "E6002",
            RuntimeOnly => "E6003",
            Unimplemented => "E9001",
            InvalidState => "E9002",
            CircularDependency => "E9003",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        let all = [
            ErrorCode::IllegalCharacter,
            ErrorCode::Undefined,
            ErrorCode::IncompatibleTypes,
            ErrorCode::NoMatchingOverload,
            ErrorCode::InstantiationFailure,
            ErrorCode::NotAConstant,
            ErrorCode::Unimplemented,
        ];
        let mut seen = std::collections::HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {code}");
        }
    }
}
