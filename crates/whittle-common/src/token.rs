use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use serde::Serialize;

/// Every kind of token the D splitter recognises.
///
/// This is deliberately not the full D vocabulary: it covers the operators
/// and block keywords that drive tree splitting, plus four catch-all kinds.
/// Anything the lexer cannot name (identifiers, literals, unknown bytes,
/// truncated tokens at end of input) is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // ── Catch-all kinds ────────────────────────────────────────────────
    /// End of input. Returned forever once the cursor is exhausted.
    End,
    /// A run of whitespace bytes.
    Whitespace,
    /// Any comment flavour (`//`, `/* */`, nested `/+ +/`).
    Comment,
    /// Everything else: words, literals, strings, single unknown bytes.
    Other,

    // ── Delimiters ─────────────────────────────────────────────────────
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,

    // ── Statement punctuation ──────────────────────────────────────────
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `:`
    Colon,
    /// `?`
    Question,
    /// `=>`
    FatArrow,

    // ── Assignment family ──────────────────────────────────────────────
    /// `=`
    Eq,
    /// `+=`
    PlusEq,
    /// `-=`
    MinusEq,
    /// `*=`
    StarEq,
    /// `%=`
    PercentEq,
    /// `^=`
    CaretEq,
    /// `^^=`
    CaretCaretEq,
    /// `~=`
    TildeEq,
    /// `<<=`
    ShlEq,
    /// `>>=`
    ShrEq,
    /// `>>>=`
    UshrEq,

    // ── Logic and bitwise ──────────────────────────────────────────────
    /// `||`
    PipePipe,
    /// `&&`
    AmpAmp,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `&`
    Amp,
    /// `^^`
    CaretCaret,

    // ── Comparison family ──────────────────────────────────────────────
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    GtEq,
    /// `<=`
    LtEq,
    /// `!>`
    NotGt,
    /// `!<`
    NotLt,
    /// `!>=`
    NotGtEq,
    /// `!<=`
    NotLtEq,
    /// `<>`
    LtGt,
    /// `!<>`
    NotLtGt,
    /// `<>=`
    LtGtEq,
    /// `!<>=`
    NotLtGtEq,
    /// `in`
    In,
    /// `!in`
    NotIn,
    /// `is`
    Is,
    /// `!is`
    NotIs,

    // ── Shifts and arithmetic ──────────────────────────────────────────
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    Ushr,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `~`
    Tilde,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `!`
    Bang,

    // ── Keywords that open or continue blocks ──────────────────────────
    /// `import`
    Import,
    /// `if`
    If,
    /// `static if` (lexed as one two-word token)
    StaticIf,
    /// `else`
    Else,
    /// `do`
    Do,
    /// `while`
    While,
    /// `try`
    Try,
    /// `catch`
    Catch,
    /// `finally`
    Finally,
    /// `out`
    Out,
    /// `body`
    Body,
}

/// How a token behaves as a tree separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeparatorKind {
    /// Opens a brace pair; the parser recurses to the matching closer.
    Pair,
    /// Introduces what follows (`import`, block keywords, `else`).
    Prefix,
    /// Terminates what precedes (`;`).
    Postfix,
    /// Splits its neighbours into operands.
    Binary,
    /// No splitting role.
    None,
}

/// Complete text ↔ kind table for the named tokens.
///
/// The catch-all kinds (`End`, `Whitespace`, `Comment`, `Other`) have no
/// fixed text and do not appear here.
const TOKEN_TEXTS: &[(&str, TokenKind)] = &[
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
    ("..", TokenKind::DotDot),
    (":", TokenKind::Colon),
    ("?", TokenKind::Question),
    ("=>", TokenKind::FatArrow),
    ("=", TokenKind::Eq),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("%=", TokenKind::PercentEq),
    ("^=", TokenKind::CaretEq),
    ("^^=", TokenKind::CaretCaretEq),
    ("~=", TokenKind::TildeEq),
    ("<<=", TokenKind::ShlEq),
    (">>=", TokenKind::ShrEq),
    (">>>=", TokenKind::UshrEq),
    ("||", TokenKind::PipePipe),
    ("&&", TokenKind::AmpAmp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("&", TokenKind::Amp),
    ("^^", TokenKind::CaretCaret),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    (">", TokenKind::Gt),
    ("<", TokenKind::Lt),
    (">=", TokenKind::GtEq),
    ("<=", TokenKind::LtEq),
    ("!>", TokenKind::NotGt),
    ("!<", TokenKind::NotLt),
    ("!>=", TokenKind::NotGtEq),
    ("!<=", TokenKind::NotLtEq),
    ("<>", TokenKind::LtGt),
    ("!<>", TokenKind::NotLtGt),
    ("<>=", TokenKind::LtGtEq),
    ("!<>=", TokenKind::NotLtGtEq),
    ("in", TokenKind::In),
    ("!in", TokenKind::NotIn),
    ("is", TokenKind::Is),
    ("!is", TokenKind::NotIs),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    (">>>", TokenKind::Ushr),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("~", TokenKind::Tilde),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("!", TokenKind::Bang),
    ("import", TokenKind::Import),
    ("if", TokenKind::If),
    ("static if", TokenKind::StaticIf),
    ("else", TokenKind::Else),
    ("do", TokenKind::Do),
    ("while", TokenKind::While),
    ("try", TokenKind::Try),
    ("catch", TokenKind::Catch),
    ("finally", TokenKind::Finally),
    ("out", TokenKind::Out),
    ("body", TokenKind::Body),
];

/// Split-priority table. Row 0 produces the outermost splits.
///
/// A token's row is the *first* row its text appears in, so kinds repeated
/// further down (unary `&`, `*`, postfix `++`) resolve to their earlier,
/// coarser row. The shadowed entries are kept so the table reads as the
/// full operator-precedence ladder.
pub const PRECEDENCE: &[&[TokenKind]] = &[
    // 0: statement-level splits
    &[
        TokenKind::Semicolon,
        TokenKind::LBrace,
        TokenKind::Try,
        TokenKind::Catch,
        TokenKind::Finally,
        TokenKind::While,
        TokenKind::Do,
        TokenKind::In,
        TokenKind::Out,
        TokenKind::Body,
        TokenKind::If,
        TokenKind::StaticIf,
        TokenKind::Else,
    ],
    // 1
    &[TokenKind::Import],
    // 2
    &[TokenKind::DotDot],
    // 3
    &[TokenKind::Comma],
    // 4
    &[TokenKind::FatArrow],
    // 5: assignment
    &[
        TokenKind::Eq,
        TokenKind::MinusEq,
        TokenKind::PlusEq,
        TokenKind::ShlEq,
        TokenKind::ShrEq,
        TokenKind::UshrEq,
        TokenKind::StarEq,
        TokenKind::PercentEq,
        TokenKind::CaretEq,
        TokenKind::CaretCaretEq,
        TokenKind::TildeEq,
    ],
    // 6: conditional
    &[TokenKind::Question, TokenKind::Colon],
    // 7
    &[TokenKind::PipePipe],
    // 8
    &[TokenKind::AmpAmp],
    // 9
    &[TokenKind::Pipe],
    // 10
    &[TokenKind::Caret],
    // 11
    &[TokenKind::Amp],
    // 12: comparison
    &[
        TokenKind::EqEq,
        TokenKind::NotEq,
        TokenKind::Gt,
        TokenKind::Lt,
        TokenKind::GtEq,
        TokenKind::LtEq,
        TokenKind::NotGt,
        TokenKind::NotLt,
        TokenKind::NotGtEq,
        TokenKind::NotLtEq,
        TokenKind::LtGt,
        TokenKind::NotLtGt,
        TokenKind::LtGtEq,
        TokenKind::NotLtGtEq,
        TokenKind::In,
        TokenKind::NotIn,
        TokenKind::Is,
        TokenKind::NotIs,
    ],
    // 13: shifts
    &[TokenKind::Shl, TokenKind::Shr, TokenKind::Ushr],
    // 14: additive
    &[TokenKind::Plus, TokenKind::Minus, TokenKind::Tilde],
    // 15: multiplicative
    &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent],
    // 16: unary (all shadowed except ++/--)
    &[
        TokenKind::Amp,
        TokenKind::PlusPlus,
        TokenKind::MinusMinus,
        TokenKind::Star,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Tilde,
    ],
    // 17
    &[TokenKind::CaretCaret],
    // 18: postfix/member (++/-- shadowed by row 16)
    &[TokenKind::Dot, TokenKind::PlusPlus, TokenKind::MinusMinus],
    // 19
    &[TokenKind::Bang],
    // 20: call/index
    &[TokenKind::LParen, TokenKind::LBracket],
];

/// Number of split-priority rows.
pub const SEPARATOR_ROWS: usize = PRECEDENCE.len();

impl TokenKind {
    /// Fixed source text of this kind, if it has one.
    pub fn text(self) -> Option<&'static str> {
        static TEXTS: OnceLock<FxHashMap<TokenKind, &'static str>> = OnceLock::new();
        TEXTS
            .get_or_init(|| TOKEN_TEXTS.iter().map(|&(text, kind)| (kind, text)).collect())
            .get(&self)
            .copied()
    }

    /// The split-priority row of this kind (first row containing it).
    pub fn precedence_row(self) -> Option<usize> {
        static ROWS: OnceLock<FxHashMap<TokenKind, usize>> = OnceLock::new();
        ROWS.get_or_init(|| {
            let mut rows = FxHashMap::default();
            for (row, kinds) in PRECEDENCE.iter().enumerate() {
                for &kind in kinds.iter() {
                    rows.entry(kind).or_insert(row);
                }
            }
            rows
        })
        .get(&self)
        .copied()
    }

    /// How this kind behaves as a tree separator.
    pub fn separator(self) -> SeparatorKind {
        match self {
            TokenKind::LBrace | TokenKind::LBracket | TokenKind::LParen => SeparatorKind::Pair,
            TokenKind::Semicolon => SeparatorKind::Postfix,
            TokenKind::Import => SeparatorKind::Prefix,
            kind if kind.is_block_keyword() => SeparatorKind::Prefix,
            kind if kind.precedence_row().is_some() => SeparatorKind::Binary,
            _ => SeparatorKind::None,
        }
    }

    /// Keywords that open or continue a block statement.
    pub fn is_block_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
                | TokenKind::While
                | TokenKind::Do
                | TokenKind::In
                | TokenKind::Out
                | TokenKind::Body
                | TokenKind::If
                | TokenKind::StaticIf
                | TokenKind::Else
        )
    }

    /// The closer matching a `Pair` opener.
    pub fn matching_closer(self) -> Option<TokenKind> {
        match self {
            TokenKind::LBrace => Some(TokenKind::RBrace),
            TokenKind::LBracket => Some(TokenKind::RBracket),
            TokenKind::LParen => Some(TokenKind::RParen),
            _ => None,
        }
    }
}

/// Longest-match lookup of a named token at the start of `rest`.
///
/// Returns the kind and its byte length. A token whose last character is
/// alphanumeric is a keyword and must end at a word boundary: `inside`
/// never matches `in`. Ties go to the longer text.
pub fn lookup(rest: &[u8]) -> Option<(TokenKind, usize)> {
    static BY_FIRST_BYTE: OnceLock<FxHashMap<u8, Vec<(&'static str, TokenKind)>>> =
        OnceLock::new();
    let table = BY_FIRST_BYTE.get_or_init(|| {
        let mut map: FxHashMap<u8, Vec<(&'static str, TokenKind)>> = FxHashMap::default();
        for &(text, kind) in TOKEN_TEXTS {
            map.entry(text.as_bytes()[0]).or_default().push((text, kind));
        }
        for candidates in map.values_mut() {
            candidates.sort_by_key(|(text, _)| std::cmp::Reverse(text.len()));
        }
        map
    });

    let first = *rest.first()?;
    for &(text, kind) in table.get(&first)?.iter() {
        let bytes = text.as_bytes();
        if !rest.starts_with(bytes) {
            continue;
        }
        // Keyword boundary: a token ending in a word character must not be
        // followed by another word character.
        let last = bytes[bytes.len() - 1];
        if is_word_byte(last) && rest.get(bytes.len()).copied().is_some_and(is_word_byte) {
            continue;
        }
        return Some((kind, bytes.len()));
    }
    None
}

/// Word characters for boundary and word-splitting purposes.
pub fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
