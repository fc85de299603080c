use crate::token::{Token, TokenClass};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use thiserror::Error;

/// Source language, selecting the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Go,
    /// No lexer: one text token per line
    PlainText,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "go" => Language::Go,
            _ => Language::PlainText,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::PlainText)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::PlainText => "text",
        }
    }
}

/// Lexer failure, located by line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct LexError {
    pub line: usize,
    pub reason: String,
}

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A[\p{L}_][\p{L}\p{N}_]*").expect("valid identifier regex"));

static GO_RULES: Lazy<Vec<(Regex, TokenClass)>> = Lazy::new(|| {
    [
        (r"\A\s+", TokenClass::Text),
        (r"\A//[^\n]*", TokenClass::CommentSingle),
        (r"\A'(?:\\[^\n][^'\n]*|[^'\\\n])'", TokenClass::StringChar),
        (r#"\A"(?:\\.|[^"\\\n])*""#, TokenClass::String),
        (r"\A0[xX][0-9a-fA-F_]+i?", TokenClass::NumberHex),
        (r"\A0[bB][01_]+", TokenClass::NumberBin),
        (r"\A0[oO][0-7_]+", TokenClass::NumberOct),
        (
            r"\A(?:\d[\d_]*\.[\d_]*(?:[eE][-+]?\d+)?|\.\d[\d_]*(?:[eE][-+]?\d+)?|\d[\d_]*[eE][-+]?\d+)i?",
            TokenClass::NumberFloat,
        ),
        (r"\A\d[\d_]*i?", TokenClass::NumberInteger),
        (
            r"\A(?:<<=|>>=|&\^=|\.\.\.|&&|\|\||<-|\+\+|--|==|!=|<=|>=|:=|<<|>>|&\^|[-+*/%&|^]=|[-+*/%&|^<>=!~])",
            TokenClass::Operator,
        ),
        (r"\A[()\[\]{}.,;:]", TokenClass::Punctuation),
    ]
    .into_iter()
    .map(|(pattern, class)| (Regex::new(pattern).expect("valid go lexer rule"), class))
    .collect()
});

/// Split `source` into tokens. Concatenating the token texts reproduces the
/// source exactly.
pub fn tokenize(language: Language, source: &str) -> Result<Vec<Token>, LexError> {
    match language {
        Language::Go => tokenize_go(source),
        Language::PlainText => Ok(source
            .split_inclusive('\n')
            .map(|line| Token::new(TokenClass::Text, line))
            .collect()),
    }
}

fn tokenize_go(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut rest = source;
    while !rest.is_empty() {
        let (class, len) = next_go_token(rest).map_err(|reason| LexError { line, reason })?;
        let (text, tail) = rest.split_at(len);
        let token = Token::new(class, text);
        line += token.newlines();
        tokens.push(token);
        rest = tail;
    }
    Ok(tokens)
}

fn next_go_token(rest: &str) -> Result<(TokenClass, usize), String> {
    if rest.starts_with("/*") {
        return rest[2..]
            .find("*/")
            .map(|end| (TokenClass::CommentMultiline, end + 4))
            .ok_or_else(|| "unterminated block comment".to_string());
    }
    if rest.starts_with('`') {
        return rest[1..]
            .find('`')
            .map(|end| (TokenClass::StringBacktick, end + 2))
            .ok_or_else(|| "unterminated raw string".to_string());
    }
    if let Some(m) = IDENT_RE.find(rest) {
        let word = m.as_str();
        let called = rest[m.end()..].starts_with('(');
        return Ok((classify_word(word, called), m.end()));
    }
    for (rule, class) in GO_RULES.iter() {
        if let Some(m) = rule.find(rest) {
            return Ok((*class, m.end()));
        }
    }
    let len = rest.chars().next().map_or(1, char::len_utf8);
    Ok((TokenClass::Error, len))
}

fn classify_word(word: &str, called: bool) -> TokenClass {
    match word {
        "import" | "package" => TokenClass::KeywordNamespace,
        "var" | "func" | "struct" | "map" | "chan" | "type" | "interface" | "const" => {
            TokenClass::KeywordDeclaration
        }
        "break" | "default" | "select" | "case" | "defer" | "go" | "else" | "goto" | "switch"
        | "fallthrough" | "if" | "range" | "continue" | "for" | "return" => TokenClass::Keyword,
        "true" | "false" | "iota" | "nil" => TokenClass::KeywordConstant,
        "uint" | "uint8" | "uint16" | "uint32" | "uint64" | "int" | "int8" | "int16" | "int32"
        | "int64" | "float32" | "float64" | "complex64" | "complex128" | "byte" | "rune"
        | "string" | "bool" | "error" | "uintptr" | "any" | "comparable" => TokenClass::KeywordType,
        "append" | "cap" | "clear" | "close" | "complex" | "copy" | "delete" | "imag" | "len"
        | "make" | "max" | "min" | "new" | "panic" | "print" | "println" | "real" | "recover" => {
            TokenClass::NameBuiltin
        }
        _ if called => TokenClass::NameFunction,
        _ => TokenClass::Name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classes(source: &str) -> Vec<(TokenClass, String)> {
        tokenize(Language::Go, source)
            .unwrap()
            .into_iter()
            .filter(|t| t.class != TokenClass::Text)
            .map(|t| (t.class, t.text))
            .collect()
    }

    #[test]
    fn detects_language_from_path() {
        assert_eq!(Language::from_path("src/runtime/proc.go"), Language::Go);
        assert_eq!(Language::from_path("MAIN.GO"), Language::Go);
        assert_eq!(Language::from_path("asm_amd64.s"), Language::PlainText);
        assert_eq!(Language::from_path("Makefile"), Language::PlainText);
    }

    #[test]
    fn tokens_reproduce_source() {
        let source = "package main\n\nimport \"fmt\"\n\n/* block\n comment */\nfunc main() {\n\tx := `raw\nstring`\n\tfmt.Println(x, 'a', 0x1F, 1.5e3)\n}\n";
        let tokens = tokenize(Language::Go, source).unwrap();
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, source);
        let newlines: usize = tokens.iter().map(Token::newlines).sum();
        assert_eq!(newlines, source.matches('\n').count());
    }

    #[test]
    fn classifies_go_tokens() {
        let got = classes("func (s *Server) Serve() error { return nil } // done");
        let expected = vec![
            (TokenClass::KeywordDeclaration, "func"),
            (TokenClass::Punctuation, "("),
            (TokenClass::Name, "s"),
            (TokenClass::Operator, "*"),
            (TokenClass::Name, "Server"),
            (TokenClass::Punctuation, ")"),
            (TokenClass::NameFunction, "Serve"),
            (TokenClass::Punctuation, "("),
            (TokenClass::Punctuation, ")"),
            (TokenClass::KeywordType, "error"),
            (TokenClass::Punctuation, "{"),
            (TokenClass::Keyword, "return"),
            (TokenClass::KeywordConstant, "nil"),
            (TokenClass::Punctuation, "}"),
            (TokenClass::CommentSingle, "// done"),
        ];
        let expected: Vec<(TokenClass, String)> = expected
            .into_iter()
            .map(|(c, t)| (c, t.to_string()))
            .collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn literals() {
        let got = classes(r#"a := "x\"y"; b := 'q'; c := 0b101; d := .5; e := 42; f := 3i"#);
        let literals: Vec<TokenClass> = got
            .into_iter()
            .map(|(c, _)| c)
            .filter(|c| {
                !matches!(
                    c,
                    TokenClass::Name | TokenClass::Operator | TokenClass::Punctuation
                )
            })
            .collect();
        assert_eq!(
            literals,
            vec![
                TokenClass::String,
                TokenClass::StringChar,
                TokenClass::NumberBin,
                TokenClass::NumberFloat,
                TokenClass::NumberInteger,
                TokenClass::NumberInteger,
            ]
        );
    }

    #[test]
    fn multiline_tokens_keep_newlines() {
        let tokens = tokenize(Language::Go, "/* a\nb\nc */").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].class, TokenClass::CommentMultiline);
        assert_eq!(tokens[0].newlines(), 2);
    }

    #[test]
    fn block_comment_opener_does_not_close_itself() {
        let got = classes("/*/ x */\nvar a");
        assert_eq!(got[0], (TokenClass::CommentMultiline, "/*/ x */".to_string()));
        assert_eq!(got[1], (TokenClass::KeywordDeclaration, "var".to_string()));

        let got = classes("/*/ see `foo */ var b");
        assert_eq!(got[0], (TokenClass::CommentMultiline, "/*/ see `foo */".to_string()));
        assert!(tokenize(Language::Go, "/*/").is_err());
    }

    #[test]
    fn unterminated_block_comment_fails_with_line() {
        let err = tokenize(Language::Go, "package x\n\n/* never closed\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.reason.contains("block comment"));
    }

    #[test]
    fn unterminated_raw_string_fails() {
        let err = tokenize(Language::Go, "var s = `open").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn stray_characters_become_error_tokens() {
        let got = classes("a @ b");
        assert_eq!(got[1], (TokenClass::Error, "@".to_string()));
    }

    #[test]
    fn plain_text_is_one_token_per_line() {
        let tokens = tokenize(Language::PlainText, "a\nb\n\nc").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a\n", "b\n", "\n", "c"]);
    }
}
