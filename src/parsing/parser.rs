//! Document and content composition
//!
//! The parser walks the flat token stream with a single cursor. Content
//! dispatch is ordered choice over the current token: comment, escape, math,
//! command-name dispatch (inclusion table, command group, `\bgroup`, generic
//! command), brace group, and finally a text run as the fallback that
//! absorbs everything inert. Terminators are passed down explicitly so that
//! `}`/`\egroup` and `\stop<name>` only close the construct that is actually
//! open; stray closers degrade instead of failing.
//!
//! Span discipline: every consumed token lands inside exactly one node span,
//! and sibling items are consumed contiguously, so concatenating the item
//! slices of an area reconstructs that area byte for byte. The command-stop
//! lookahead never consumes on the reject path, which is what keeps the
//! whitespace after a command available to the following text run.

use crate::ast::diagnostics::{Diagnostic, DiagnosticKind, ParseError};
use crate::ast::elements::{
    BraceCloser, BraceGroup, BraceOpener, CommandGroup, ContentItem, Document, Escaped,
    InlineMath, LineComment, Marker, MathGroup, MathItem, ParagraphMark, Postamble, Preamble,
    Span, Text, TextBlock, TextPart,
};
use crate::lexing::{tokenize, RawToken};

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Nesting bound for pathological input; past it, openers degrade to text.
pub(crate) const MAX_DEPTH: usize = 128;

/// What closes the construct currently being parsed.
pub(crate) enum Terminator<'t> {
    /// Top level or a document area: nothing closes it but end of input.
    None,
    /// A brace group: `}` or `\egroup`.
    Brace,
    /// A command group: the exact `\stop<name>` spelling.
    Group(&'t str),
}

pub struct Parser<'a> {
    src: &'a str,
    tokens: Vec<(RawToken, Span)>,
    pub(crate) pos: usize,
    pub(crate) depth: usize,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

fn is_body_open(name: &str) -> bool {
    name == "\\starttext" || name == "\\startcomponent"
}

fn is_body_close(name: &str) -> bool {
    name == "\\stoptext" || name == "\\stopcomponent"
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            tokens: tokenize(src),
            pos: 0,
            depth: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub(crate) fn kind(&self, i: usize) -> Option<RawToken> {
        self.tokens.get(i).map(|t| t.0)
    }

    pub(crate) fn span(&self, i: usize) -> Span {
        self.tokens[i].1.clone()
    }

    /// Lexeme of token `i`. Tied to the source lifetime, not the borrow of
    /// `self`, so it can be held across cursor moves.
    pub(crate) fn text(&self, i: usize) -> &'a str {
        &self.src[self.tokens[i].1.clone()]
    }

    pub(crate) fn src_slice(&self, span: Span) -> String {
        self.src[span].to_string()
    }

    pub(crate) fn src_str(&self) -> &'a str {
        self.src
    }

    pub(crate) fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Byte offset of the first `needle` at or after `from`.
    pub(crate) fn src_find(&self, from: usize, needle: char) -> Option<usize> {
        self.src[from..].find(needle).map(|offset| from + offset)
    }

    /// Drop every token reaching past `offset` and re-lex from there.
    /// Needed after verbatim regions, whose raw-byte boundary can cut
    /// through a token (a comment that began inside the region).
    pub(crate) fn resync_from(&mut self, offset: usize) {
        let cut = self.tokens.partition_point(|(_, span)| span.end <= offset);
        self.tokens.truncate(cut);
        for (token, span) in tokenize(&self.src[offset..]) {
            self.tokens
                .push((token, span.start + offset..span.end + offset));
        }
        self.pos = cut;
    }

    pub(crate) fn marker_here(&self) -> Marker {
        Marker {
            text: self.text(self.pos).to_string(),
            span: self.span(self.pos),
        }
    }

    // # Document areas

    /// `document = (preamble main postamble) | main`, three-part preferred:
    /// the first top-level body-open command splits the input.
    pub fn parse_document(&mut self) -> PResult<Document> {
        let len = self.src.len();

        let mut pre_items = Vec::new();
        let mut opener: Option<Marker> = None;
        while let Some(token) = self.kind(self.pos) {
            if token == RawToken::CommandName && is_body_open(self.text(self.pos)) {
                opener = Some(self.marker_here());
                self.pos += 1;
                break;
            }
            let before = self.pos;
            let item = self.parse_item(token, &Terminator::None)?;
            pre_items.push(item);
            if self.pos == before {
                self.pos += 1;
            }
        }

        let opener = match opener {
            Some(opener) => opener,
            // No body-open command anywhere: the whole input is main.
            None => {
                return Ok(Document {
                    preamble: None,
                    main: pre_items,
                    postamble: None,
                    span: 0..len,
                })
            }
        };

        let mut main = Vec::new();
        let mut closer: Option<Marker> = None;
        while let Some(token) = self.kind(self.pos) {
            if token == RawToken::CommandName && is_body_close(self.text(self.pos)) {
                closer = Some(self.marker_here());
                self.pos += 1;
                break;
            }
            let before = self.pos;
            let item = self.parse_item(token, &Terminator::None)?;
            main.push(item);
            if self.pos == before {
                self.pos += 1;
            }
        }

        let pre_start = pre_items
            .first()
            .map(|item| item.span().start)
            .unwrap_or(opener.span.start);
        let preamble = Preamble {
            span: pre_start..opener.span.end,
            items: pre_items,
            opener,
        };

        let postamble = match closer {
            Some(closer) => {
                let mut items = Vec::new();
                while let Some(token) = self.kind(self.pos) {
                    let before = self.pos;
                    let item = self.parse_item(token, &Terminator::None)?;
                    items.push(item);
                    if self.pos == before {
                        self.pos += 1;
                    }
                }
                let end = items
                    .last()
                    .map(|item| item.span().end)
                    .unwrap_or(closer.span.end);
                Some(Postamble {
                    span: closer.span.start..end,
                    closer,
                    items,
                })
            }
            None => {
                self.diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::UnterminatedCommandGroup {
                        name: preamble.opener.text.clone(),
                    },
                    span: preamble.opener.span.start..len,
                });
                None
            }
        };

        Ok(Document {
            preamble: Some(preamble),
            main,
            postamble,
            span: 0..len,
        })
    }

    // # Content composition

    pub(crate) fn parse_content(&mut self, term: &Terminator) -> PResult<Vec<ContentItem>> {
        self.depth += 1;
        let items = self.parse_content_inner(term);
        self.depth -= 1;
        items
    }

    fn parse_content_inner(&mut self, term: &Terminator) -> PResult<Vec<ContentItem>> {
        let mut items = Vec::new();
        while let Some(token) = self.kind(self.pos) {
            if self.closes(term) {
                break;
            }
            let before = self.pos;
            let item = self.parse_item(token, term)?;
            items.push(item);
            if self.pos == before {
                self.pos += 1;
            }
        }
        Ok(items)
    }

    fn closes(&self, term: &Terminator) -> bool {
        let token = match self.kind(self.pos) {
            Some(token) => token,
            None => return true,
        };
        match term {
            Terminator::None => false,
            Terminator::Brace => {
                token == RawToken::RBrace
                    || (token == RawToken::CommandName && self.text(self.pos) == "\\egroup")
            }
            Terminator::Group(stop) => {
                token == RawToken::CommandName && self.text(self.pos) == *stop
            }
        }
    }

    fn parse_item(&mut self, token: RawToken, term: &Terminator) -> PResult<ContentItem> {
        if self.depth > MAX_DEPTH {
            return Ok(self.parse_flat_text(term));
        }
        match token {
            RawToken::LineComment => Ok(ContentItem::LineComment(self.parse_line_comment())),
            RawToken::Escaped => Ok(ContentItem::Escaped(self.parse_escaped())),
            RawToken::Dollar => Ok(ContentItem::InlineMath(self.parse_inline_math())),
            RawToken::LBrace => Ok(ContentItem::BraceGroup(self.parse_brace_group()?)),
            RawToken::CommandName => self.parse_command_like(),
            _ => Ok(ContentItem::TextBlock(self.parse_text_block(term))),
        }
    }

    /// Dispatch on a command name: inclusion table first, then command
    /// groups, then the brace-group alias, then a generic command.
    fn parse_command_like(&mut self) -> PResult<ContentItem> {
        let name = self.text(self.pos);
        if name == "\\bgroup" {
            return Ok(ContentItem::BraceGroup(self.parse_brace_group()?));
        }
        if name.starts_with("\\start") {
            if let Some(spec) = super::inclusions::lookup(name) {
                return Ok(ContentItem::Inclusion(self.parse_inclusion(spec)?));
            }
            return Ok(ContentItem::CommandGroup(self.parse_command_group()?));
        }
        Ok(ContentItem::Command(self.parse_command()?))
    }

    pub(crate) fn parse_line_comment(&mut self) -> LineComment {
        let span = self.span(self.pos);
        let text = self.text(self.pos).to_string();
        self.pos += 1;
        LineComment { text, span }
    }

    pub(crate) fn parse_escaped(&mut self) -> Escaped {
        let span = self.span(self.pos);
        let ch = self.text(self.pos).chars().nth(1).unwrap_or('\\');
        self.pos += 1;
        Escaped { ch, span }
    }

    // # Groups

    /// `{`/`\bgroup` ... `}`/`\egroup`, spellings free to mismatch. End of
    /// input closes the group implicitly with a diagnostic.
    pub(crate) fn parse_brace_group(&mut self) -> PResult<BraceGroup> {
        let open_span = self.span(self.pos);
        let opener = if self.kind(self.pos) == Some(RawToken::LBrace) {
            BraceOpener::Brace
        } else {
            BraceOpener::BGroup
        };
        self.pos += 1;

        let items = self.parse_content(&Terminator::Brace)?;

        match self.kind(self.pos) {
            Some(RawToken::RBrace) => {
                let end = self.span(self.pos).end;
                self.pos += 1;
                Ok(BraceGroup {
                    opener,
                    items,
                    closer: Some(BraceCloser::Brace),
                    span: open_span.start..end,
                })
            }
            Some(RawToken::CommandName) => {
                // parse_content only stops on `\egroup` here
                let end = self.span(self.pos).end;
                self.pos += 1;
                Ok(BraceGroup {
                    opener,
                    items,
                    closer: Some(BraceCloser::EGroup),
                    span: open_span.start..end,
                })
            }
            _ => {
                let span = open_span.start..self.src.len();
                self.diagnostics.push(Diagnostic {
                    kind: DiagnosticKind::UnterminatedBraceGroup,
                    span: span.clone(),
                });
                Ok(BraceGroup {
                    opener,
                    items,
                    closer: None,
                    span,
                })
            }
        }
    }

    /// `\start<name>` ... `\stop<name>` with the same free-form identifier
    /// on both ends (empty identifier allowed).
    fn parse_command_group(&mut self) -> PResult<CommandGroup> {
        let start = self.marker_here();
        self.pos += 1;

        let stop_name = format!("\\stop{}", &start.text["\\start".len()..]);
        let body = self.parse_content(&Terminator::Group(&stop_name))?;

        if self.kind(self.pos) == Some(RawToken::CommandName)
            && self.text(self.pos) == stop_name
        {
            let stop = self.marker_here();
            self.pos += 1;
            let span = start.span.start..stop.span.end;
            Ok(CommandGroup {
                start,
                body,
                stop: Some(stop),
                span,
            })
        } else {
            let span = start.span.start..self.src.len();
            self.diagnostics.push(Diagnostic {
                kind: DiagnosticKind::UnterminatedCommandGroup {
                    name: start.text.clone(),
                },
                span: span.clone(),
            });
            Ok(CommandGroup {
                start,
                body,
                stop: None,
                span,
            })
        }
    }

    // # Inline math

    /// `$...$` with its own content rule: no general content, only comments,
    /// escapes, math groups and math text. An unescaped `$` never falls back
    /// to text, so an empty `$$` still yields a math node.
    fn parse_inline_math(&mut self) -> InlineMath {
        let start = self.span(self.pos).start;
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            match self.kind(self.pos) {
                None => {
                    let span = start..self.src.len();
                    self.diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::UnterminatedInlineMath,
                        span: span.clone(),
                    });
                    return InlineMath { items, span };
                }
                Some(RawToken::Dollar) => {
                    let end = self.span(self.pos).end;
                    self.pos += 1;
                    return InlineMath {
                        items,
                        span: start..end,
                    };
                }
                Some(RawToken::LineComment) => {
                    items.push(MathItem::LineComment(self.parse_line_comment()))
                }
                Some(RawToken::Escaped) => items.push(MathItem::Escaped(self.parse_escaped())),
                Some(RawToken::LBrace) if self.depth <= MAX_DEPTH => {
                    items.push(MathItem::Group(self.parse_math_group()))
                }
                Some(_) => items.push(MathItem::Text(self.parse_math_text(false))),
            }
        }
    }

    fn parse_math_group(&mut self) -> MathGroup {
        self.depth += 1;
        let start = self.span(self.pos).start;
        self.pos += 1;
        let mut items = Vec::new();
        let group = loop {
            match self.kind(self.pos) {
                None => {
                    let span = start..self.src.len();
                    self.diagnostics.push(Diagnostic {
                        kind: DiagnosticKind::UnterminatedBraceGroup,
                        span: span.clone(),
                    });
                    break MathGroup { items, span };
                }
                Some(RawToken::RBrace) => {
                    let end = self.span(self.pos).end;
                    self.pos += 1;
                    break MathGroup {
                        items,
                        span: start..end,
                    };
                }
                Some(RawToken::LineComment) => {
                    items.push(MathItem::LineComment(self.parse_line_comment()))
                }
                Some(RawToken::Escaped) => items.push(MathItem::Escaped(self.parse_escaped())),
                Some(RawToken::LBrace) if self.depth <= MAX_DEPTH => {
                    items.push(MathItem::Group(self.parse_math_group()))
                }
                Some(_) => items.push(MathItem::Text(self.parse_math_text(true))),
            }
        };
        self.depth -= 1;
        group
    }

    /// Maximal math text run. Consumes at least one token, which also covers
    /// the depth-limited case where a `{` is flattened into text.
    fn parse_math_text(&mut self, in_group: bool) -> Text {
        let start = self.span(self.pos).start;
        let mut end = self.span(self.pos).end;
        self.pos += 1;
        while let Some(token) = self.kind(self.pos) {
            let mergeable = match token {
                RawToken::Dollar
                | RawToken::LBrace
                | RawToken::LineComment
                | RawToken::Escaped => false,
                RawToken::RBrace => !in_group,
                _ => true,
            };
            if !mergeable {
                break;
            }
            end = self.span(self.pos).end;
            self.pos += 1;
        }
        Text {
            text: self.src[start..end].to_string(),
            span: start..end,
        }
    }

    // # Text

    fn is_textual(&self, token: RawToken, term: &Terminator) -> bool {
        match token {
            RawToken::Word
            | RawToken::Whitespace
            | RawToken::Newline
            | RawToken::Comma
            | RawToken::Equals
            | RawToken::LBracket
            | RawToken::RBracket
            | RawToken::Unknown => true,
            // A stray `}` with no open brace group joins the text run.
            RawToken::RBrace => !matches!(term, Terminator::Brace),
            _ => false,
        }
    }

    /// Maximal text run, split at blank lines into `text (mark text)*`.
    fn parse_text_block(&mut self, term: &Terminator) -> TextBlock {
        let start_pos = self.pos;
        while let Some(token) = self.kind(self.pos) {
            if !self.is_textual(token, term) {
                break;
            }
            self.pos += 1;
        }
        let run = &self.tokens[start_pos..self.pos];
        let parts = split_paragraphs(run, self.src);
        let span = run[0].1.start..run[run.len() - 1].1.end;
        TextBlock { parts, span }
    }

    /// Depth-limit fallback: consume everything up to the terminator as one
    /// flat text part, no structure.
    fn parse_flat_text(&mut self, term: &Terminator) -> ContentItem {
        let start_pos = self.pos;
        while self.pos < self.tokens.len() && !self.closes(term) {
            self.pos += 1;
        }
        if self.pos == start_pos {
            self.pos += 1;
        }
        let span = self.tokens[start_pos].1.start..self.tokens[self.pos - 1].1.end;
        ContentItem::TextBlock(TextBlock {
            parts: vec![TextPart::Text(Text {
                text: self.src[span.clone()].to_string(),
                span: span.clone(),
            })],
            span,
        })
    }
}

/// Split a textual token run at blank lines.
///
/// A blank line is two or more newlines with only horizontal whitespace
/// between them. A mark is only emitted between two text parts; blank lines
/// at the edges of the run stay inside the adjacent text so the run still
/// covers every byte. Horizontal whitespace after the last newline of a
/// boundary belongs to the following text part.
fn split_paragraphs(run: &[(RawToken, Span)], src: &str) -> Vec<TextPart> {
    let mut parts = Vec::new();
    let mut current: Option<Span> = None;

    let extend = |current: &mut Option<Span>, span: Span| match current {
        Some(cur) => cur.end = span.end,
        None => *current = Some(span),
    };

    let mut i = 0;
    while i < run.len() {
        if run[i].0 != RawToken::Newline {
            extend(&mut current, run[i].1.clone());
            i += 1;
            continue;
        }
        // Measure the whitespace run starting at this newline.
        let mut j = i;
        let mut newlines = 0;
        let mut last_newline = i;
        while j < run.len()
            && matches!(run[j].0, RawToken::Newline | RawToken::Whitespace)
        {
            if run[j].0 == RawToken::Newline {
                newlines += 1;
                last_newline = j;
            }
            j += 1;
        }
        let splits = newlines >= 2 && j < run.len() && current.is_some();
        if splits {
            if let Some(span) = current.take() {
                parts.push(TextPart::Text(Text {
                    text: src[span.clone()].to_string(),
                    span,
                }));
            }
            parts.push(TextPart::ParagraphMark(ParagraphMark {
                span: run[i].1.start..run[last_newline].1.end,
            }));
            if last_newline + 1 < j {
                current = Some(run[last_newline + 1].1.start..run[j - 1].1.end);
            }
        } else {
            extend(&mut current, run[i].1.start..run[j - 1].1.end);
        }
        i = j;
    }
    if let Some(span) = current {
        parts.push(TextPart::Text(Text {
            text: src[span.clone()].to_string(),
            span,
        }));
    }
    parts
}
