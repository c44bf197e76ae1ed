//! Node types for the ConTeXt document tree
//!
//!     The shapes follow the grammar one to one: a document splits into an
//!     optional preamble, a main area, and an optional postamble; content is
//!     a flat priority-ordered union; commands carry an ordered block chain
//!     and an optional braced scope; settings values recurse back into
//!     commands and groups.
//!
//!     Every node has a `span: Range<usize>` byte range. Enums that wrap
//!     several node types expose the span through a `span()` accessor.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Byte range into the original source.
pub type Span = Range<usize>;

/// A whole parsed input.
///
/// The three-part form (preamble / main / postamble) is preferred whenever a
/// body-open command (`\starttext` or `\startcomponent`) occurs at the top
/// level; otherwise the entire input is `main` and both options are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub preamble: Option<Preamble>,
    pub main: Vec<ContentItem>,
    pub postamble: Option<Postamble>,
    pub span: Span,
}

/// Everything before and including the body-open command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preamble {
    pub items: Vec<ContentItem>,
    /// The body-open command, `\starttext` or `\startcomponent`.
    pub opener: Marker,
    pub span: Span,
}

/// The body-close command and everything after it.
///
/// Either closer (`\stoptext` / `\stopcomponent`) is accepted for either
/// opener, in the same permissive spirit as brace group delimiters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Postamble {
    pub closer: Marker,
    pub items: Vec<ContentItem>,
    pub span: Span,
}

/// One unit of document content, in grammar priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ContentItem {
    LineComment(LineComment),
    Command(Command),
    BraceGroup(BraceGroup),
    Escaped(Escaped),
    InlineMath(InlineMath),
    CommandGroup(CommandGroup),
    TextBlock(TextBlock),
    Inclusion(Inclusion),
}

impl ContentItem {
    pub fn span(&self) -> Span {
        match self {
            ContentItem::LineComment(n) => n.span.clone(),
            ContentItem::Command(n) => n.span.clone(),
            ContentItem::BraceGroup(n) => n.span.clone(),
            ContentItem::Escaped(n) => n.span.clone(),
            ContentItem::InlineMath(n) => n.span.clone(),
            ContentItem::CommandGroup(n) => n.span.clone(),
            ContentItem::TextBlock(n) => n.span.clone(),
            ContentItem::Inclusion(n) => n.span.clone(),
        }
    }
}

/// A delimiter or name token kept verbatim, e.g. `\starttext` or `\define`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub text: String,
    pub span: Span,
}

/// A `%` comment running to end of line (exclusive of the newline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineComment {
    pub text: String,
    pub span: Span,
}

/// A backslash-escaped special character, e.g. `\%` or `\{`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escaped {
    pub ch: char,
    pub span: Span,
}

/// An invoked macro: name, block chain, optional braced scope.
///
/// Blocks only ever appear before the scope. Where the chain ends is a
/// lookahead decision, see [`crate::parsing::blocks`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: Marker,
    pub blocks: Vec<CommandBlock>,
    pub scope: Option<BraceGroup>,
    pub span: Span,
}

/// One bracketed argument block in a command's chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandBlock {
    Empty(EmptyBlock),
    Options(OptionBlock),
    Settings(SettingsBlock),
}

impl CommandBlock {
    pub fn span(&self) -> Span {
        match self {
            CommandBlock::Empty(b) => b.span.clone(),
            CommandBlock::Options(b) => b.span.clone(),
            CommandBlock::Settings(b) => b.span.clone(),
        }
    }
}

/// `[]`, possibly with interior whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyBlock {
    pub span: Span,
}

/// `[kw, kw, ...]`, bare keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionBlock {
    pub keywords: Vec<Keyword>,
    pub span: Span,
}

/// `[key=value, ...]`, preferred over an option block when the first item
/// carries a `=`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsBlock {
    pub settings: Vec<Setting>,
    pub span: Span,
}

/// A bare keyword or a setting key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: Keyword,
    pub value: Value,
    pub span: Span,
}

/// A setting value. Values recurse: they may contain commands, brace groups
/// and escapes alongside plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub items: Vec<ValueItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueItem {
    LineComment(LineComment),
    Escaped(Escaped),
    Group(ValueGroup),
    Text(Text),
    Command(Command),
}

impl ValueItem {
    pub fn span(&self) -> Span {
        match self {
            ValueItem::LineComment(n) => n.span.clone(),
            ValueItem::Escaped(n) => n.span.clone(),
            ValueItem::Group(n) => n.span.clone(),
            ValueItem::Text(n) => n.span.clone(),
            ValueItem::Command(n) => n.span.clone(),
        }
    }
}

/// A `{...}` group inside a setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueGroup {
    pub items: Vec<ValueItem>,
    pub span: Span,
}

/// Opening spelling of a brace group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BraceOpener {
    /// `{`
    Brace,
    /// `\bgroup`
    BGroup,
}

/// Closing spelling of a brace group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BraceCloser {
    /// `}`
    Brace,
    /// `\egroup`
    EGroup,
}

/// `{...}` region. Opener and closer spellings may mismatch (`\bgroup`
/// closed by `}` and so on); all four combinations are accepted.
///
/// `closer` is `None` when the group was closed implicitly at end of input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BraceGroup {
    pub opener: BraceOpener,
    pub items: Vec<ContentItem>,
    pub closer: Option<BraceCloser>,
    pub span: Span,
}

/// `\start<name>` ... `\stop<name>` environment.
///
/// `stop` is `None` when end of input was reached first; the span then
/// extends to the end of input and a diagnostic records the implicit close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandGroup {
    pub start: Marker,
    pub body: Vec<ContentItem>,
    pub stop: Option<Marker>,
    pub span: Span,
}

impl CommandGroup {
    /// The shared identifier after `\start`/`\stop`, possibly empty.
    pub fn name(&self) -> &str {
        &self.start.text["\\start".len()..]
    }
}

/// `$...$` region with its own content rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineMath {
    pub items: Vec<MathItem>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MathItem {
    LineComment(LineComment),
    Escaped(Escaped),
    Group(MathGroup),
    Text(Text),
}

impl MathItem {
    pub fn span(&self) -> Span {
        match self {
            MathItem::LineComment(n) => n.span.clone(),
            MathItem::Escaped(n) => n.span.clone(),
            MathItem::Group(n) => n.span.clone(),
            MathItem::Text(n) => n.span.clone(),
        }
    }
}

/// `{...}` inside math mode; nests math content, not general content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathGroup {
    pub items: Vec<MathItem>,
    pub span: Span,
}

/// Maximal run of literal prose, split at blank lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub parts: Vec<TextPart>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextPart {
    Text(Text),
    ParagraphMark(ParagraphMark),
}

impl TextPart {
    pub fn span(&self) -> Span {
        match self {
            TextPart::Text(n) => n.span.clone(),
            TextPart::ParagraphMark(n) => n.span.clone(),
        }
    }
}

/// A literal text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    pub span: Span,
}

/// Blank-line boundary inside a text block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphMark {
    pub span: Span,
}

/// The sub-language of an inclusion body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubLanguage {
    Metapost,
    Tikz,
    Lua,
    Html,
    Css,
    /// `\starttyping`, verbatim text with no associated language.
    PlainTyping,
    Tex,
    Xml,
    ParsedXml,
}

impl std::fmt::Display for SubLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SubLanguage::Metapost => "metapost",
            SubLanguage::Tikz => "tikz",
            SubLanguage::Lua => "lua",
            SubLanguage::Html => "html",
            SubLanguage::Css => "css",
            SubLanguage::PlainTyping => "typing",
            SubLanguage::Tex => "tex",
            SubLanguage::Xml => "xml",
            SubLanguage::ParsedXml => "parsedxml",
        };
        write!(f, "{}", name)
    }
}

/// An opaque injected-language region.
///
/// The body is exactly the bytes between the start and stop delimiters,
/// exclusive of both; its interior is handed to an external parser, never
/// parsed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inclusion {
    pub language: SubLanguage,
    pub start: Marker,
    pub body: Text,
    pub stop: Marker,
    pub span: Span,
}
