use serde::{Deserialize, Serialize};

/// Display class of a lexical token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    /// Whitespace and unclassified text
    Text,
    CommentSingle,
    CommentMultiline,
    Keyword,
    KeywordConstant,
    KeywordDeclaration,
    KeywordNamespace,
    KeywordType,
    Name,
    NameBuiltin,
    NameFunction,
    String,
    StringBacktick,
    StringChar,
    NumberBin,
    NumberFloat,
    NumberHex,
    NumberInteger,
    NumberOct,
    Operator,
    Punctuation,
    /// Character no rule accepts
    Error,
}

impl TokenClass {
    /// Short CSS class, compatible with chroma/pygments stylesheets
    pub fn css_class(self) -> &'static str {
        match self {
            TokenClass::Text => "",
            TokenClass::CommentSingle => "c1",
            TokenClass::CommentMultiline => "cm",
            TokenClass::Keyword => "k",
            TokenClass::KeywordConstant => "kc",
            TokenClass::KeywordDeclaration => "kd",
            TokenClass::KeywordNamespace => "kn",
            TokenClass::KeywordType => "kt",
            TokenClass::Name => "n",
            TokenClass::NameBuiltin => "nb",
            TokenClass::NameFunction => "nf",
            TokenClass::String => "s",
            TokenClass::StringBacktick => "sb",
            TokenClass::StringChar => "sc",
            TokenClass::NumberBin => "mb",
            TokenClass::NumberFloat => "mf",
            TokenClass::NumberHex => "mh",
            TokenClass::NumberInteger => "mi",
            TokenClass::NumberOct => "mo",
            TokenClass::Operator => "o",
            TokenClass::Punctuation => "p",
            TokenClass::Error => "err",
        }
    }
}

/// Lexical unit; `text` may span several lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub class: TokenClass,
    pub text: String,
}

impl Token {
    pub fn new(class: TokenClass, text: impl Into<String>) -> Self {
        Self {
            class,
            text: text.into(),
        }
    }

    /// Number of line breaks inside the token
    pub fn newlines(&self) -> usize {
        self.text.bytes().filter(|&b| b == b'\n').count()
    }
}
