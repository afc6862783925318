//! Token kinds of the expression language

/// All token kinds produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,   // p, U, grad
    INTEGER, // 42
    DECIMAL, // 3.14, 1e-3

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_PAREN,    // (
    R_PAREN,    // )
    COMMA,      // ,
    SEMICOLON,  // ;
    DOT,        // .
    QUESTION,   // ?
    COLON,      // :
    EQ,         // =
    EQ_EQ,      // ==
    BANG_EQ,    // !=
    LT,         // <
    GT,         // >
    LT_EQ,      // <=
    GT_EQ,      // >=
    PLUS,       // +
    MINUS,      // -
    STAR,       // *
    SLASH,      // /
    PERCENT,    // %
    AMP,        // &
    CARET,      // ^
    BANG,       // !
    AMP_AMP,    // &&
    PIPE_PIPE,  // ||

    // =========================================================================
    // KEYWORDS (named constants)
    // =========================================================================
    PI_KW,
    TRUE_KW,
    FALSE_KW,

    // =========================================================================
    // SPECIAL
    // =========================================================================
    ERROR,
    EOF,
}

impl SyntaxKind {
    /// Check if this is a trivia token (whitespace or comment)
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::LINE_COMMENT)
    }

    pub fn is_keyword(self) -> bool {
        matches!(self, Self::PI_KW | Self::TRUE_KW | Self::FALSE_KW)
    }

    pub fn is_number(self) -> bool {
        matches!(self, Self::INTEGER | Self::DECIMAL)
    }

    /// Source spelling for punctuation and keywords, used in diagnostics
    pub fn display_name(self) -> &'static str {
        match self {
            Self::WHITESPACE => "whitespace",
            Self::LINE_COMMENT => "comment",
            Self::IDENT => "identifier",
            Self::INTEGER => "integer",
            Self::DECIMAL => "number",
            Self::L_PAREN => "'('",
            Self::R_PAREN => "')'",
            Self::COMMA => "','",
            Self::SEMICOLON => "';'",
            Self::DOT => "'.'",
            Self::QUESTION => "'?'",
            Self::COLON => "':'",
            Self::EQ => "'='",
            Self::EQ_EQ => "'=='",
            Self::BANG_EQ => "'!='",
            Self::LT => "'<'",
            Self::GT => "'>'",
            Self::LT_EQ => "'<='",
            Self::GT_EQ => "'>='",
            Self::PLUS => "'+'",
            Self::MINUS => "'-'",
            Self::STAR => "'*'",
            Self::SLASH => "'/'",
            Self::PERCENT => "'%'",
            Self::AMP => "'&'",
            Self::CARET => "'^'",
            Self::BANG => "'!'",
            Self::AMP_AMP => "'&&'",
            Self::PIPE_PIPE => "'||'",
            Self::PI_KW => "'pi'",
            Self::TRUE_KW => "'true'",
            Self::FALSE_KW => "'false'",
            Self::ERROR => "invalid character",
            Self::EOF => "end of input",
        }
    }
}
