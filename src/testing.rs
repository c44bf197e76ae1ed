//! Testing utilities for AST assertions
//!
//! # Parser Testing Guidelines
//!
//! Parser tests assert on two things, and only these two:
//!
//! 1. **AST shape** via [`assert_ast`]: node kinds, names, texts and
//!    nesting, written with the fluent builder so the test reads like the
//!    tree it checks. Counting nodes or grepping debug output proves
//!    nothing about structure; don't.
//! 2. **Span tiling** via [`reconstruct`]: concatenating the top-level
//!    slices of the parse must reproduce the input byte for byte. Any span
//!    bug (an off-by-one, a swallowed separator, a dropped whitespace run)
//!    breaks this immediately, which is why most document tests end with a
//!    `reconstruct` check.
//!
//! ```rust,ignore
//! use ctxt::testing::{assert_ast, parse_clean, reconstruct};
//!
//! let source = "\\starttext Hello \\stoptext";
//! let doc = parse_clean(source);
//! assert_ast(&doc).main_count(1).main(0, |item| {
//!     item.assert_text().text(" Hello ");
//! });
//! assert_eq!(reconstruct(&doc, source), source);
//! ```
//!
//! The `parse_*` helpers panic with the parse error message, so a test that
//! only cares about well-formed input needs no `Result` plumbing.

use crate::ast::elements::{
    BraceGroup, Command, CommandGroup, ContentItem, Document, Inclusion, InlineMath, TextBlock,
    TextPart,
};
use crate::parsing::{parse, ParseOutcome};

/// Parse and panic on the hard error case. Diagnostics are allowed.
pub fn parse_ok(source: &str) -> Document {
    parse_outcome(source).document
}

/// Parse and panic on the hard error case or on any diagnostic.
pub fn parse_clean(source: &str) -> Document {
    let outcome = parse_outcome(source);
    assert!(
        outcome.diagnostics.is_empty(),
        "expected a clean parse, got diagnostics: {:?}",
        outcome.diagnostics
    );
    outcome.document
}

pub fn parse_outcome(source: &str) -> ParseOutcome {
    match parse(source) {
        Ok(outcome) => outcome,
        Err(err) => panic!("parse failed: {}", err),
    }
}

/// Concatenate the source slices of the document's top-level pieces, in
/// order: preamble items, opener, main items, closer, postamble items.
pub fn reconstruct(doc: &Document, source: &str) -> String {
    let mut out = String::new();
    if let Some(preamble) = &doc.preamble {
        for item in &preamble.items {
            out.push_str(&source[item.span()]);
        }
        out.push_str(&source[preamble.opener.span.clone()]);
    }
    for item in &doc.main {
        out.push_str(&source[item.span()]);
    }
    if let Some(postamble) = &doc.postamble {
        out.push_str(&source[postamble.closer.span.clone()]);
        for item in &postamble.items {
            out.push_str(&source[item.span()]);
        }
    }
    out
}

/// Serialize the tree for structural comparison in tests.
pub fn ast_json(doc: &Document) -> serde_json::Value {
    serde_json::to_value(doc).expect("document serializes")
}

/// Create an assertion builder for a document
pub fn assert_ast(doc: &Document) -> DocumentAssertion<'_> {
    DocumentAssertion { doc }
}

pub struct DocumentAssertion<'a> {
    doc: &'a Document,
}

impl<'a> DocumentAssertion<'a> {
    pub fn main_count(self, expected: usize) -> Self {
        let actual = self.doc.main.len();
        assert_eq!(
            actual,
            expected,
            "Expected {} main items, found {}: [{}]",
            expected,
            actual,
            summarize_items(&self.doc.main)
        );
        self
    }

    pub fn main<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(ContentItemAssertion<'a>),
    {
        assert!(
            index < self.doc.main.len(),
            "Main index {} out of bounds ({} items)",
            index,
            self.doc.main.len()
        );
        assertion(ContentItemAssertion {
            item: &self.doc.main[index],
            context: format!("main[{}]", index),
        });
        self
    }

    pub fn has_preamble(self, opener: &str) -> Self {
        match &self.doc.preamble {
            Some(preamble) => assert_eq!(
                preamble.opener.text, opener,
                "Expected preamble opener '{}', found '{}'",
                opener, preamble.opener.text
            ),
            None => panic!("Expected a preamble, document is main-only"),
        }
        self
    }

    pub fn no_preamble(self) -> Self {
        assert!(
            self.doc.preamble.is_none(),
            "Expected a main-only document, found a preamble"
        );
        self
    }

    pub fn has_postamble(self, closer: &str) -> Self {
        match &self.doc.postamble {
            Some(postamble) => assert_eq!(
                postamble.closer.text, closer,
                "Expected postamble closer '{}', found '{}'",
                closer, postamble.closer.text
            ),
            None => panic!("Expected a postamble, document has none"),
        }
        self
    }

    pub fn no_postamble(self) -> Self {
        assert!(
            self.doc.postamble.is_none(),
            "Expected no postamble, found one"
        );
        self
    }
}

pub struct ContentItemAssertion<'a> {
    item: &'a ContentItem,
    context: String,
}

impl<'a> ContentItemAssertion<'a> {
    pub fn assert_text(self) -> TextBlockAssertion<'a> {
        match self.item {
            ContentItem::TextBlock(block) => TextBlockAssertion {
                block,
                context: self.context,
            },
            other => panic!(
                "{}: Expected TextBlock, found {}",
                self.context,
                item_kind(other)
            ),
        }
    }

    pub fn assert_command(self) -> CommandAssertion<'a> {
        match self.item {
            ContentItem::Command(command) => CommandAssertion {
                command,
                context: self.context,
            },
            other => panic!(
                "{}: Expected Command, found {}",
                self.context,
                item_kind(other)
            ),
        }
    }

    pub fn assert_brace_group(self) -> BraceGroupAssertion<'a> {
        match self.item {
            ContentItem::BraceGroup(group) => BraceGroupAssertion {
                group,
                context: self.context,
            },
            other => panic!(
                "{}: Expected BraceGroup, found {}",
                self.context,
                item_kind(other)
            ),
        }
    }

    pub fn assert_command_group(self) -> CommandGroupAssertion<'a> {
        match self.item {
            ContentItem::CommandGroup(group) => CommandGroupAssertion {
                group,
                context: self.context,
            },
            other => panic!(
                "{}: Expected CommandGroup, found {}",
                self.context,
                item_kind(other)
            ),
        }
    }

    pub fn assert_math(self) -> MathAssertion<'a> {
        match self.item {
            ContentItem::InlineMath(math) => MathAssertion {
                math,
                context: self.context,
            },
            other => panic!(
                "{}: Expected InlineMath, found {}",
                self.context,
                item_kind(other)
            ),
        }
    }

    pub fn assert_inclusion(self) -> InclusionAssertion<'a> {
        match self.item {
            ContentItem::Inclusion(inclusion) => InclusionAssertion {
                inclusion,
                context: self.context,
            },
            other => panic!(
                "{}: Expected Inclusion, found {}",
                self.context,
                item_kind(other)
            ),
        }
    }

    pub fn assert_comment(self, text: &str) {
        match self.item {
            ContentItem::LineComment(comment) => assert_eq!(
                comment.text, text,
                "{}: comment text mismatch",
                self.context
            ),
            other => panic!(
                "{}: Expected LineComment, found {}",
                self.context,
                item_kind(other)
            ),
        }
    }

    pub fn assert_escaped(self, ch: char) {
        match self.item {
            ContentItem::Escaped(escaped) => assert_eq!(
                escaped.ch, ch,
                "{}: escaped character mismatch",
                self.context
            ),
            other => panic!(
                "{}: Expected Escaped, found {}",
                self.context,
                item_kind(other)
            ),
        }
    }
}

pub struct TextBlockAssertion<'a> {
    block: &'a TextBlock,
    context: String,
}

impl<'a> TextBlockAssertion<'a> {
    /// The block is one unbroken text part with exactly this content.
    pub fn text(self, expected: &str) -> Self {
        assert_eq!(
            self.block.parts.len(),
            1,
            "{}: expected a single text part, found {}",
            self.context,
            self.block.parts.len()
        );
        match &self.block.parts[0] {
            TextPart::Text(text) => assert_eq!(
                text.text, expected,
                "{}: text content mismatch",
                self.context
            ),
            TextPart::ParagraphMark(_) => {
                panic!("{}: expected text, found a paragraph mark", self.context)
            }
        }
        self
    }

    pub fn part_count(self, expected: usize) -> Self {
        assert_eq!(
            self.block.parts.len(),
            expected,
            "{}: part count mismatch",
            self.context
        );
        self
    }

    /// Texts of the non-mark parts, in order.
    pub fn texts(self, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self
            .block
            .parts
            .iter()
            .filter_map(|part| match part {
                TextPart::Text(text) => Some(text.text.as_str()),
                TextPart::ParagraphMark(_) => None,
            })
            .collect();
        assert_eq!(actual, expected, "{}: text parts mismatch", self.context);
        self
    }

    pub fn paragraph_marks(self, expected: usize) -> Self {
        let actual = self
            .block
            .parts
            .iter()
            .filter(|part| matches!(part, TextPart::ParagraphMark(_)))
            .count();
        assert_eq!(
            actual, expected,
            "{}: paragraph mark count mismatch",
            self.context
        );
        self
    }
}

pub struct CommandAssertion<'a> {
    command: &'a Command,
    context: String,
}

impl<'a> CommandAssertion<'a> {
    pub fn name(self, expected: &str) -> Self {
        assert_eq!(
            self.command.name.text, expected,
            "{}: command name mismatch",
            self.context
        );
        self
    }

    pub fn block_count(self, expected: usize) -> Self {
        assert_eq!(
            self.command.blocks.len(),
            expected,
            "{}: block count mismatch",
            self.context
        );
        self
    }

    pub fn keywords(self, block: usize, expected: &[&str]) -> Self {
        match &self.command.blocks[block] {
            crate::ast::elements::CommandBlock::Options(options) => {
                let actual: Vec<&str> =
                    options.keywords.iter().map(|k| k.text.as_str()).collect();
                assert_eq!(
                    actual, expected,
                    "{}: keywords of block {} mismatch",
                    self.context, block
                );
            }
            other => panic!(
                "{}: block {} is not an option block: {:?}",
                self.context, block, other
            ),
        }
        self
    }

    pub fn setting_keys(self, block: usize, expected: &[&str]) -> Self {
        match &self.command.blocks[block] {
            crate::ast::elements::CommandBlock::Settings(settings) => {
                let actual: Vec<&str> = settings
                    .settings
                    .iter()
                    .map(|s| s.key.text.as_str())
                    .collect();
                assert_eq!(
                    actual, expected,
                    "{}: setting keys of block {} mismatch",
                    self.context, block
                );
            }
            other => panic!(
                "{}: block {} is not a settings block: {:?}",
                self.context, block, other
            ),
        }
        self
    }

    pub fn no_scope(self) -> Self {
        assert!(
            self.command.scope.is_none(),
            "{}: expected no scope, found one",
            self.context
        );
        self
    }

    pub fn scope<F>(self, assertion: F) -> Self
    where
        F: FnOnce(BraceGroupAssertion<'a>),
    {
        match &self.command.scope {
            Some(group) => assertion(BraceGroupAssertion {
                group,
                context: format!("{}:scope", self.context),
            }),
            None => panic!("{}: expected a scope, found none", self.context),
        }
        self
    }
}

pub struct BraceGroupAssertion<'a> {
    group: &'a BraceGroup,
    context: String,
}

impl<'a> BraceGroupAssertion<'a> {
    pub fn item_count(self, expected: usize) -> Self {
        assert_eq!(
            self.group.items.len(),
            expected,
            "{}: expected {} items, found [{}]",
            self.context,
            expected,
            summarize_items(&self.group.items)
        );
        self
    }

    pub fn item<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(ContentItemAssertion<'a>),
    {
        assertion(ContentItemAssertion {
            item: &self.group.items[index],
            context: format!("{}:items[{}]", self.context, index),
        });
        self
    }

    pub fn closed(self) -> Self {
        assert!(
            self.group.closer.is_some(),
            "{}: expected a closed group",
            self.context
        );
        self
    }

    pub fn unclosed(self) -> Self {
        assert!(
            self.group.closer.is_none(),
            "{}: expected an unclosed group",
            self.context
        );
        self
    }
}

pub struct CommandGroupAssertion<'a> {
    group: &'a CommandGroup,
    context: String,
}

impl<'a> CommandGroupAssertion<'a> {
    pub fn name(self, expected: &str) -> Self {
        assert_eq!(
            self.group.name(),
            expected,
            "{}: environment name mismatch",
            self.context
        );
        self
    }

    pub fn item_count(self, expected: usize) -> Self {
        assert_eq!(
            self.group.body.len(),
            expected,
            "{}: expected {} body items, found [{}]",
            self.context,
            expected,
            summarize_items(&self.group.body)
        );
        self
    }

    pub fn item<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(ContentItemAssertion<'a>),
    {
        assertion(ContentItemAssertion {
            item: &self.group.body[index],
            context: format!("{}:body[{}]", self.context, index),
        });
        self
    }

    pub fn closed(self) -> Self {
        assert!(
            self.group.stop.is_some(),
            "{}: expected a matched \\stop",
            self.context
        );
        self
    }

    pub fn unclosed(self) -> Self {
        assert!(
            self.group.stop.is_none(),
            "{}: expected a missing \\stop",
            self.context
        );
        self
    }
}

pub struct MathAssertion<'a> {
    math: &'a InlineMath,
    context: String,
}

impl<'a> MathAssertion<'a> {
    pub fn item_count(self, expected: usize) -> Self {
        assert_eq!(
            self.math.items.len(),
            expected,
            "{}: math item count mismatch",
            self.context
        );
        self
    }

    pub fn text(self, index: usize, expected: &str) -> Self {
        match &self.math.items[index] {
            crate::ast::elements::MathItem::Text(text) => assert_eq!(
                text.text, expected,
                "{}: math text mismatch",
                self.context
            ),
            other => panic!(
                "{}: math item {} is not text: {:?}",
                self.context, index, other
            ),
        }
        self
    }
}

pub struct InclusionAssertion<'a> {
    inclusion: &'a Inclusion,
    context: String,
}

impl<'a> InclusionAssertion<'a> {
    pub fn language(self, expected: crate::ast::elements::SubLanguage) -> Self {
        assert_eq!(
            self.inclusion.language, expected,
            "{}: inclusion language mismatch",
            self.context
        );
        self
    }

    pub fn body(self, expected: &str) -> Self {
        assert_eq!(
            self.inclusion.body.text, expected,
            "{}: inclusion body mismatch",
            self.context
        );
        self
    }

    pub fn delimiters(self, start: &str, stop: &str) -> Self {
        assert_eq!(
            self.inclusion.start.text, start,
            "{}: start delimiter mismatch",
            self.context
        );
        assert_eq!(
            self.inclusion.stop.text, stop,
            "{}: stop delimiter mismatch",
            self.context
        );
        self
    }
}

fn item_kind(item: &ContentItem) -> &'static str {
    match item {
        ContentItem::LineComment(_) => "LineComment",
        ContentItem::Command(_) => "Command",
        ContentItem::BraceGroup(_) => "BraceGroup",
        ContentItem::Escaped(_) => "Escaped",
        ContentItem::InlineMath(_) => "InlineMath",
        ContentItem::CommandGroup(_) => "CommandGroup",
        ContentItem::TextBlock(_) => "TextBlock",
        ContentItem::Inclusion(_) => "Inclusion",
    }
}

fn summarize_items(items: &[ContentItem]) -> String {
    items
        .iter()
        .map(item_kind)
        .collect::<Vec<_>>()
        .join(", ")
}
