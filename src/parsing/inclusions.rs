//! Injected-language regions
//!
//! A fixed table maps `\start...` spellings to their required `\stop...`
//! twin and the language of the body. Recognition is by exact name only; a
//! `\start` spelling missing from the table is an ordinary command group.
//!
//! The body is verbatim bytes, not tokens: everything from the end of the
//! start delimiter up to the next `\` in the raw source, with no comment,
//! escape or group structure applied. That next backslash must begin the
//! exact stop delimiter. If it begins anything else, or there is no
//! backslash before end of input, the whole parse fails. No other construct
//! has that property; there is no sane way to resynchronize inside a
//! foreign language.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::ast::diagnostics::ParseError;
use crate::ast::elements::{Inclusion, Marker, SubLanguage, Text};

use super::parser::{PResult, Parser};

pub struct InclusionSpec {
    pub start: &'static str,
    pub stop: &'static str,
    pub language: SubLanguage,
}

macro_rules! inclusion {
    ($name:literal, $language:expr) => {
        InclusionSpec {
            start: concat!("\\start", $name),
            stop: concat!("\\stop", $name),
            language: $language,
        }
    };
}

/// Every recognized inclusion environment. The typing variants at the end
/// carry foreign syntax just as the dedicated environments do, so they get
/// the same verbatim treatment.
pub static INCLUSIONS: &[InclusionSpec] = &[
    inclusion!("MPinclusions", SubLanguage::Metapost),
    inclusion!("useMPgraphic", SubLanguage::Metapost),
    inclusion!("reusableMPgraphic", SubLanguage::Metapost),
    inclusion!("MPcode", SubLanguage::Metapost),
    inclusion!("MPpage", SubLanguage::Metapost),
    inclusion!("staticMPfigure", SubLanguage::Metapost),
    inclusion!("tikzpicture", SubLanguage::Tikz),
    inclusion!("luacode", SubLanguage::Lua),
    inclusion!("HTML", SubLanguage::Html),
    inclusion!("CSS", SubLanguage::Css),
    inclusion!("typing", SubLanguage::PlainTyping),
    inclusion!("LUA", SubLanguage::Lua),
    inclusion!("MP", SubLanguage::Metapost),
    inclusion!("PARSEDXML", SubLanguage::ParsedXml),
    inclusion!("TEX", SubLanguage::Tex),
    inclusion!("XML", SubLanguage::Xml),
];

static BY_START: Lazy<HashMap<&'static str, &'static InclusionSpec>> = Lazy::new(|| {
    INCLUSIONS.iter().map(|spec| (spec.start, spec)).collect()
});

/// Look a start delimiter up by its exact spelling.
pub fn lookup(start_name: &str) -> Option<&'static InclusionSpec> {
    BY_START.get(start_name).copied()
}

/// True for characters that would keep a control-sequence name going, so
/// `\stopMP` does not accept a `\stopMPcode` in the source.
fn extends_command_name(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '@' || ch == ':'
}

/// A short source snippet starting at `at`, for error messages. Cut at a
/// char boundary and at the end of the line.
fn found_at(src: &str, at: usize) -> String {
    let rest = &src[at..];
    let mut end = rest.len().min(24);
    while end > 0 && !rest.is_char_boundary(end) {
        end -= 1;
    }
    let mut snippet = &rest[..end];
    if let Some(eol) = snippet.find(['\r', '\n']) {
        snippet = &snippet[..eol];
    }
    snippet.to_string()
}

impl<'a> Parser<'a> {
    /// Cursor sits on the start delimiter; `spec` is its table entry.
    pub(crate) fn parse_inclusion(
        &mut self,
        spec: &'static InclusionSpec,
    ) -> PResult<Inclusion> {
        let start = self.marker_here();
        self.pos += 1;

        // The body ends at the next backslash in the raw bytes, wherever
        // the token boundaries happen to fall. A `%` in the body can pull
        // the stop delimiter inside a comment token, so the check is on
        // bytes, not tokens.
        let body_start = start.span.end;
        let backslash = match self.src_find(body_start, '\\') {
            Some(offset) => offset,
            None => {
                return Err(ParseError::UnterminatedInclusion {
                    expected: spec.stop.to_string(),
                    at: start.span.start,
                })
            }
        };

        let rest = &self.src_str()[backslash..];
        let stop_matches = rest.starts_with(spec.stop)
            && !rest[spec.stop.len()..]
                .chars()
                .next()
                .is_some_and(extends_command_name);
        if !stop_matches {
            return Err(ParseError::InclusionDelimiterMismatch {
                expected: spec.stop.to_string(),
                found: found_at(self.src_str(), backslash),
                at: backslash,
            });
        }

        let stop_end = backslash + spec.stop.len();
        self.resync_from(stop_end);
        let stop = Marker {
            text: spec.stop.to_string(),
            span: backslash..stop_end,
        };
        let body = Text {
            text: self.src_slice(body_start..backslash),
            span: body_start..backslash,
        };
        let span = start.span.start..stop.span.end;
        Ok(Inclusion {
            language: spec.language,
            start,
            body,
            stop,
            span,
        })
    }
}
