use logos::Logos;

/// Tokens of the post-processor argument string, e.g.
/// `--no-header --line-numbers`. Anything else lexes as `Unknown`.

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")] // Skip whitespace
#[logos(error = LexerError)]
pub enum Token {
    #[token("--header")]
    Header,

    #[token("--no-header")]
    NoHeader,

    #[token("--comments")]
    Comments,

    #[token("--no-comments")]
    NoComments,

    #[token("--line-numbers")]
    LineNumbers,

    #[token("--no-line-numbers")]
    NoLineNumbers,

    #[token("--show-editor")]
    ShowEditor,

    #[token("--no-show-editor")]
    NoShowEditor,

    // Lowest priority so exact flags always win
    #[regex(r"[^ \t\r\n\f]+", |lex| lex.slice().to_string(), priority = 0)]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LexerError;

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "lexer error")
    }
}

impl std::error::Error for LexerError {}

/// Lex an argument string into tokens
pub fn lex(input: &str) -> Vec<(Token, logos::Span)> {
    Token::lexer(input)
        .spanned()
        .filter_map(|(result, span)| match result {
            Ok(token) => Some((token, span)),
            Err(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flags() {
        let input = "--no-header --comments\t--line-numbers --no-show-editor";
        let tokens: Vec<_> = lex(input).into_iter().map(|(t, _)| t).collect();

        assert_eq!(
            tokens,
            vec![
                Token::NoHeader,
                Token::Comments,
                Token::LineNumbers,
                Token::NoShowEditor,
            ]
        );
    }

    #[test]
    fn test_unknown_tokens() {
        let tokens: Vec<_> = lex("--headers --header --fast x")
            .into_iter()
            .map(|(t, _)| t)
            .collect();

        assert_eq!(
            tokens,
            vec![
                Token::Unknown("--headers".to_string()),
                Token::Header,
                Token::Unknown("--fast".to_string()),
                Token::Unknown("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty() {
        assert!(lex("   ").is_empty());
    }
}
