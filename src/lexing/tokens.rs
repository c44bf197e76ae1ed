//! Core token definitions for the logos lexer

use logos::Logos;
use std::ops::Range;

/// Context-free tokens over raw ConTeXt source.
///
/// `Word` is deliberately narrow: it stops at every character that can open
/// a higher-priority construct (`\`, `{`, `}`, `[`, `]`, `$`, `%`, `,`, `=`,
/// whitespace). The parser re-merges the inert ones back into text runs, so
/// a one-character-too-greedy word can never swallow a control sequence.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawToken {
    /// `%` comment to end of line, newline excluded.
    #[regex(r"%[^\r\n]*")]
    LineComment,

    /// Backslash followed by one of the fixed special characters.
    /// The character sets of `Escaped` and `CommandName` are disjoint, so
    /// the two patterns never compete.
    #[regex(r"\\[#$%&^_{}|~\\]")]
    Escaped,

    /// Control-sequence name, `\` followed by letters, `@` or `:`.
    #[regex(r"\\[@a-zA-Z:]+")]
    CommandName,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("$")]
    Dollar,

    #[token(",")]
    Comma,

    #[token("=")]
    Equals,

    #[regex(r"\r?\n")]
    Newline,

    #[regex(r"[ \t]+")]
    Whitespace,

    /// Maximal run of plain text characters.
    #[regex(r"[^\\{}\[\]$%,=\s]+")]
    Word,

    /// Any byte the patterns above reject, e.g. a lone `\` before a digit.
    /// Kept as a token so spans stay total.
    Unknown,
}

/// Tokenize the whole input. Spans are contiguous and cover every byte.
pub fn tokenize(source: &str) -> Vec<(RawToken, Range<usize>)> {
    let mut tokens = Vec::new();
    for (result, span) in RawToken::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => tokens.push((RawToken::Unknown, span)),
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_tokens(spec: &[(RawToken, usize, usize)]) -> Vec<(RawToken, Range<usize>)> {
        spec.iter().map(|(t, s, e)| (*t, *s..*e)).collect()
    }

    #[test]
    fn test_command_with_blocks_pattern() {
        let tokens = tokenize("\\define[one,two]{x}");
        assert_eq!(
            tokens,
            mk_tokens(&[
                (RawToken::CommandName, 0, 7),
                (RawToken::LBracket, 7, 8),
                (RawToken::Word, 8, 11),
                (RawToken::Comma, 11, 12),
                (RawToken::Word, 12, 15),
                (RawToken::RBracket, 15, 16),
                (RawToken::LBrace, 16, 17),
                (RawToken::Word, 17, 18),
                (RawToken::RBrace, 18, 19),
            ])
        );
    }

    #[test]
    fn test_escaped_beats_command_name() {
        // `\%` is an escape, `\em` a command name; a lone `\` is Unknown.
        let tokens = tokenize("\\% \\em \\ ");
        assert_eq!(
            tokens,
            mk_tokens(&[
                (RawToken::Escaped, 0, 2),
                (RawToken::Whitespace, 2, 3),
                (RawToken::CommandName, 3, 6),
                (RawToken::Whitespace, 6, 7),
                (RawToken::Unknown, 7, 8),
                (RawToken::Whitespace, 8, 9),
            ])
        );
    }

    #[test]
    fn test_comment_runs_to_end_of_line() {
        let tokens = tokenize("a % b \\stoptext\nc");
        assert_eq!(
            tokens,
            mk_tokens(&[
                (RawToken::Word, 0, 1),
                (RawToken::Whitespace, 1, 2),
                (RawToken::LineComment, 2, 15),
                (RawToken::Newline, 15, 16),
                (RawToken::Word, 16, 17),
            ])
        );
    }

    #[test]
    fn test_blank_line_is_two_newlines() {
        let tokens = tokenize("one\n\ntwo");
        assert_eq!(
            tokens,
            mk_tokens(&[
                (RawToken::Word, 0, 3),
                (RawToken::Newline, 3, 4),
                (RawToken::Newline, 4, 5),
                (RawToken::Word, 5, 8),
            ])
        );
    }

    #[test]
    fn test_math_and_punctuation() {
        let tokens = tokenize("$x^2 + y$");
        assert_eq!(
            tokens,
            mk_tokens(&[
                (RawToken::Dollar, 0, 1),
                (RawToken::Word, 1, 4),
                (RawToken::Whitespace, 4, 5),
                (RawToken::Word, 5, 6),
                (RawToken::Whitespace, 6, 7),
                (RawToken::Word, 7, 8),
                (RawToken::Dollar, 8, 9),
            ])
        );
    }

    #[test]
    fn test_command_name_allows_at_and_colon() {
        let tokens = tokenize("\\c@tcode:x");
        assert_eq!(tokens, mk_tokens(&[(RawToken::CommandName, 0, 10)]));
    }

    #[test]
    fn test_crlf_newline_is_one_token() {
        let tokens = tokenize("a\r\nb");
        assert_eq!(
            tokens,
            mk_tokens(&[
                (RawToken::Word, 0, 1),
                (RawToken::Newline, 1, 3),
                (RawToken::Word, 3, 4),
            ])
        );
    }

    #[test]
    fn test_spans_cover_every_byte() {
        let source = "\\bf{a}[k=v]$m$ \\1 %c\n\nend";
        let tokens = tokenize(source);
        let mut offset = 0;
        for (_, span) in &tokens {
            assert_eq!(span.start, offset);
            offset = span.end;
        }
        assert_eq!(offset, source.len());
    }
}
