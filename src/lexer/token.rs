use crate::source::SourceCode;

/// One lexeme. Keywords and punctuation carry no payload; identifiers and
/// literals keep their raw text so the analyser (not the lexer) can decide
/// what they mean for a given target type (spec.md §4.4's bounds checks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Identifier(String),
    IntLiteral(String),
    DoubleLiteral(String),

    KwType,
    KwNative,
    KwReturn,
    KwIf,
    KwElse,
    KwWhile,
    KwThis,
    KwVoid,
    KwBool,
    KwInt,
    KwDouble,
    KwTrue,
    KwFalse,

    LBrace,
    RBrace,
    LParen,
    RParen,
    Semicolon,
    Comma,
    Dot,
    Amp,

    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
    AndAnd,
    OrOr,

    Eof,
}

impl TokenKind {
    /// The keyword this identifier spells, if any.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "type" => TokenKind::KwType,
            "native" => TokenKind::KwNative,
            "return" => TokenKind::KwReturn,
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "while" => TokenKind::KwWhile,
            "this" => TokenKind::KwThis,
            "void" => TokenKind::KwVoid,
            "bool" => TokenKind::KwBool,
            "int" => TokenKind::KwInt,
            "double" => TokenKind::KwDouble,
            "true" => TokenKind::KwTrue,
            "false" => TokenKind::KwFalse,
            _ => return None,
        })
    }

    /// The literal spelling of this token, for `KeywordUsedAsIdentifier` and
    /// `UnexpectedToken` diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::IntLiteral(text) | TokenKind::DoubleLiteral(text) => text.clone(),
            TokenKind::KwType => "type".into(),
            TokenKind::KwNative => "native".into(),
            TokenKind::KwReturn => "return".into(),
            TokenKind::KwIf => "if".into(),
            TokenKind::KwElse => "else".into(),
            TokenKind::KwWhile => "while".into(),
            TokenKind::KwThis => "this".into(),
            TokenKind::KwVoid => "void".into(),
            TokenKind::KwBool => "bool".into(),
            TokenKind::KwInt => "int".into(),
            TokenKind::KwDouble => "double".into(),
            TokenKind::KwTrue => "true".into(),
            TokenKind::KwFalse => "false".into(),
            TokenKind::LBrace => "{".into(),
            TokenKind::RBrace => "}".into(),
            TokenKind::LParen => "(".into(),
            TokenKind::RParen => ")".into(),
            TokenKind::Semicolon => ";".into(),
            TokenKind::Comma => ",".into(),
            TokenKind::Dot => ".".into(),
            TokenKind::Amp => "&".into(),
            TokenKind::Assign => "=".into(),
            TokenKind::Plus => "+".into(),
            TokenKind::Minus => "-".into(),
            TokenKind::Star => "*".into(),
            TokenKind::Slash => "/".into(),
            TokenKind::Bang => "!".into(),
            TokenKind::Lt => "<".into(),
            TokenKind::Gt => ">".into(),
            TokenKind::Le => "<=".into(),
            TokenKind::Ge => ">=".into(),
            TokenKind::EqEq => "==".into(),
            TokenKind::NotEq => "!=".into(),
            TokenKind::AndAnd => "&&".into(),
            TokenKind::OrOr => "||".into(),
            TokenKind::Eof => "<eof>".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: SourceCode,
}

impl Token {
    pub fn new(kind: TokenKind, span: SourceCode) -> Token {
        Token { kind, span }
    }
}
