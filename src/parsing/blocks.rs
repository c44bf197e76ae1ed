//! The command argument chain
//!
//! A command is `name (empty | options | settings)* scope?`, and nothing in
//! the input says where the chain ends. The decision is made here, in two
//! pieces:
//!
//! - a non-consuming lookahead (`block_chain_continues` / `scope_follows`)
//!   that skips horizontal whitespace, line comments and at most one newline
//!   in a row, then asks whether the next significant token is `[` (or `{`
//!   for the scope). A blank line always ends the command.
//! - a backtracking attempt (`try_block`): the cursor moves into the block
//!   only tentatively, and if the bracket content fails to close before a
//!   blank line or end of input, or fits neither the option nor the settings
//!   shape, the cursor and any diagnostics from the attempt are rolled back
//!   and the command simply stops. Malformed bracket content then degrades
//!   to literal text in the caller; lookahead failure is never an error.
//!
//! Settings are preferred over options: a first item shaped `key =` selects
//! the settings parse, and every item must then be a `key=value` pair.
//! Setting values recurse into comments, escapes, `{...}` groups and whole
//! commands, mirroring the content grammar one level down.

use crate::ast::elements::{
    Command, CommandBlock, EmptyBlock, Keyword, OptionBlock, Setting, SettingsBlock, Text, Value,
    ValueGroup, ValueItem,
};
use crate::lexing::RawToken;

use super::parser::{PResult, Parser, MAX_DEPTH};

impl<'a> Parser<'a> {
    pub(crate) fn parse_command(&mut self) -> PResult<Command> {
        let name = self.marker_here();
        self.pos += 1;

        let mut blocks = Vec::new();
        let mut end = name.span.end;
        loop {
            let bracket = match self.block_chain_continues() {
                Some(bracket) => bracket,
                None => break,
            };
            let saved_pos = self.pos;
            let saved_diagnostics = self.diagnostics.len();
            self.pos = bracket;
            match self.try_block()? {
                Some(block) => {
                    end = block.span().end;
                    blocks.push(block);
                }
                None => {
                    // The bracket never closed into a valid block; command-stop.
                    self.pos = saved_pos;
                    self.diagnostics.truncate(saved_diagnostics);
                    break;
                }
            }
        }

        let scope = match self.scope_follows() {
            Some(brace) => {
                self.pos = brace;
                let group = self.parse_brace_group()?;
                end = group.span.end;
                Some(group)
            }
            None => None,
        };

        let span = name.span.start..end;
        Ok(Command {
            name,
            blocks,
            scope,
            span,
        })
    }

    fn block_chain_continues(&self) -> Option<usize> {
        self.significant_token(RawToken::LBracket)
    }

    fn scope_follows(&self) -> Option<usize> {
        self.significant_token(RawToken::LBrace)
    }

    /// Index of the wanted token if it is the next significant one. Skips
    /// horizontal whitespace and comments; two newlines with nothing but
    /// whitespace between them are a blank line and end the search.
    fn significant_token(&self, wanted: RawToken) -> Option<usize> {
        let mut i = self.pos;
        let mut newlines = 0;
        while let Some(token) = self.kind(i) {
            match token {
                RawToken::Whitespace => i += 1,
                RawToken::LineComment => {
                    newlines = 0;
                    i += 1;
                }
                RawToken::Newline => {
                    newlines += 1;
                    if newlines >= 2 {
                        return None;
                    }
                    i += 1;
                }
                token if token == wanted => return Some(i),
                _ => return None,
            }
        }
        None
    }

    /// Parse one `[...]` block with the cursor already on the `[`. `None`
    /// means the attempt failed and the caller must restore the cursor.
    fn try_block(&mut self) -> PResult<Option<CommandBlock>> {
        let open = self.span(self.pos);
        self.pos += 1;
        if !self.skip_block_trivia() {
            return Ok(None);
        }
        match self.kind(self.pos) {
            None => Ok(None),
            Some(RawToken::RBracket) => {
                let end = self.span(self.pos).end;
                self.pos += 1;
                Ok(Some(CommandBlock::Empty(EmptyBlock {
                    span: open.start..end,
                })))
            }
            Some(_) => {
                if self.settings_ahead() {
                    Ok(self
                        .parse_settings_block(open.start)?
                        .map(CommandBlock::Settings))
                } else {
                    Ok(self.parse_option_block(open.start).map(CommandBlock::Options))
                }
            }
        }
    }

    /// Skip whitespace and comments inside a block attempt. `false` on a
    /// blank line, which aborts the block.
    fn skip_block_trivia(&mut self) -> bool {
        let mut newlines = 0;
        while let Some(token) = self.kind(self.pos) {
            match token {
                RawToken::Whitespace => self.pos += 1,
                RawToken::LineComment => {
                    newlines = 0;
                    self.pos += 1;
                }
                RawToken::Newline => {
                    newlines += 1;
                    if newlines >= 2 {
                        return false;
                    }
                    self.pos += 1;
                }
                _ => return true,
            }
        }
        true
    }

    fn merges_into_keyword(token: RawToken) -> bool {
        matches!(
            token,
            RawToken::Word | RawToken::CommandName | RawToken::Unknown | RawToken::Dollar
        )
    }

    /// A keyword or setting key: a contiguous run of word-like tokens with
    /// no interior whitespace, taken as one raw slice. Interface constants
    /// like `\v!big` lex as a command name plus a word and must still count
    /// as a single keyword.
    fn parse_keyword(&mut self) -> Option<Keyword> {
        if !self.kind(self.pos).is_some_and(Self::merges_into_keyword) {
            return None;
        }
        let start = self.span(self.pos).start;
        let mut end = start;
        while let Some(token) = self.kind(self.pos) {
            if !Self::merges_into_keyword(token) {
                break;
            }
            end = self.span(self.pos).end;
            self.pos += 1;
        }
        if end == start {
            return None;
        }
        Some(Keyword {
            text: self.src_slice(start..end),
            span: start..end,
        })
    }

    /// Settings over options: a leading `key =` selects the settings shape.
    fn settings_ahead(&self) -> bool {
        let mut i = self.pos;
        while self.kind(i).is_some_and(Self::merges_into_keyword) {
            i += 1;
        }
        if i == self.pos {
            return false;
        }
        while matches!(
            self.kind(i),
            Some(RawToken::Whitespace | RawToken::Newline | RawToken::LineComment)
        ) {
            i += 1;
        }
        self.kind(i) == Some(RawToken::Equals)
    }

    fn parse_settings_block(&mut self, start: usize) -> PResult<Option<SettingsBlock>> {
        let mut settings = Vec::new();
        loop {
            if !self.skip_block_trivia() {
                return Ok(None);
            }
            let key = match self.parse_keyword() {
                Some(key) => key,
                None => return Ok(None),
            };
            if !self.skip_block_trivia() {
                return Ok(None);
            }
            if self.kind(self.pos) != Some(RawToken::Equals) {
                return Ok(None);
            }
            self.pos += 1;
            if !self.skip_block_trivia() {
                return Ok(None);
            }
            let value = match self.parse_value()? {
                Some(value) => value,
                None => return Ok(None),
            };
            let span = key.span.start..value.span.end;
            settings.push(Setting { key, value, span });
            match self.kind(self.pos) {
                Some(RawToken::Comma) => self.pos += 1,
                Some(RawToken::RBracket) => {
                    let end = self.span(self.pos).end;
                    self.pos += 1;
                    return Ok(Some(SettingsBlock {
                        settings,
                        span: start..end,
                    }));
                }
                _ => return Ok(None),
            }
        }
    }

    /// A setting value: one or more of comment, escape, group, command,
    /// text, ending at `,` or `]`.
    fn parse_value(&mut self) -> PResult<Option<Value>> {
        let mut items: Vec<ValueItem> = Vec::new();
        loop {
            match self.kind(self.pos) {
                None => return Ok(None),
                Some(RawToken::Comma) | Some(RawToken::RBracket) => break,
                Some(RawToken::LineComment) => {
                    items.push(ValueItem::LineComment(self.parse_line_comment()))
                }
                Some(RawToken::Escaped) => items.push(ValueItem::Escaped(self.parse_escaped())),
                Some(RawToken::LBrace) => match self.parse_value_group()? {
                    Some(group) => items.push(ValueItem::Group(group)),
                    None => return Ok(None),
                },
                Some(RawToken::CommandName) => match self.parse_value_command()? {
                    Some(command) => items.push(ValueItem::Command(command)),
                    None => return Ok(None),
                },
                Some(RawToken::RBrace) | Some(RawToken::LBracket) => return Ok(None),
                Some(_) => match self.parse_value_text(false) {
                    Some(text) => items.push(ValueItem::Text(text)),
                    None => return Ok(None),
                },
            }
        }
        if items.is_empty() {
            return Ok(None);
        }
        let span = items[0].span().start..items[items.len() - 1].span().end;
        Ok(Some(Value { items, span }))
    }

    /// Plain value text: words, spaces and inert punctuation; a blank line
    /// fails the block. Commas are only plain inside a `{...}` group.
    fn parse_value_text(&mut self, in_group: bool) -> Option<Text> {
        let start = self.span(self.pos).start;
        let mut end = start;
        let mut newlines = 0;
        while let Some(token) = self.kind(self.pos) {
            match token {
                RawToken::Word | RawToken::Equals | RawToken::Dollar | RawToken::Unknown => {
                    newlines = 0
                }
                RawToken::Comma if in_group => newlines = 0,
                RawToken::Whitespace => {}
                RawToken::Newline => {
                    newlines += 1;
                    if newlines >= 2 {
                        return None;
                    }
                }
                _ => break,
            }
            end = self.span(self.pos).end;
            self.pos += 1;
        }
        if end == start {
            return None;
        }
        Some(Text {
            text: self.src_slice(start..end),
            span: start..end,
        })
    }

    /// A command nested inside a setting value. Depth-limited like groups;
    /// past the limit the attempt fails and the block backtracks.
    fn parse_value_command(&mut self) -> PResult<Option<Command>> {
        if self.depth > MAX_DEPTH {
            return Ok(None);
        }
        self.depth += 1;
        let result = self.parse_command();
        self.depth -= 1;
        result.map(Some)
    }

    fn parse_value_group(&mut self) -> PResult<Option<ValueGroup>> {
        if self.depth > MAX_DEPTH {
            return Ok(None);
        }
        self.depth += 1;
        let result = self.parse_value_group_inner();
        self.depth -= 1;
        result
    }

    fn parse_value_group_inner(&mut self) -> PResult<Option<ValueGroup>> {
        let start = self.span(self.pos).start;
        self.pos += 1;
        let mut items: Vec<ValueItem> = Vec::new();
        loop {
            match self.kind(self.pos) {
                None => return Ok(None),
                Some(RawToken::RBrace) => {
                    let end = self.span(self.pos).end;
                    self.pos += 1;
                    let span = start..end;
                    return Ok(Some(ValueGroup { items, span }));
                }
                Some(RawToken::LineComment) => {
                    items.push(ValueItem::LineComment(self.parse_line_comment()))
                }
                Some(RawToken::Escaped) => items.push(ValueItem::Escaped(self.parse_escaped())),
                Some(RawToken::LBrace) => match self.parse_value_group()? {
                    Some(group) => items.push(ValueItem::Group(group)),
                    None => return Ok(None),
                },
                Some(RawToken::CommandName) => match self.parse_value_command()? {
                    Some(command) => items.push(ValueItem::Command(command)),
                    None => return Ok(None),
                },
                Some(RawToken::LBracket) | Some(RawToken::RBracket) => return Ok(None),
                Some(_) => match self.parse_value_text(true) {
                    Some(text) => items.push(ValueItem::Text(text)),
                    None => return Ok(None),
                },
            }
        }
    }

    fn parse_option_block(&mut self, start: usize) -> Option<OptionBlock> {
        let mut keywords = Vec::new();
        loop {
            if !self.skip_block_trivia() {
                return None;
            }
            match self.parse_keyword() {
                Some(keyword) => keywords.push(keyword),
                None => return None,
            }
            if !self.skip_block_trivia() {
                return None;
            }
            match self.kind(self.pos) {
                Some(RawToken::Comma) => self.pos += 1,
                Some(RawToken::RBracket) => {
                    let end = self.span(self.pos).end;
                    self.pos += 1;
                    return Some(OptionBlock {
                        keywords,
                        span: start..end,
                    });
                }
                _ => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::Parser;
    use crate::ast::elements::{CommandBlock, ValueItem};

    fn command(source: &str) -> crate::ast::elements::Command {
        let mut parser = Parser::new(source);
        parser.parse_command().unwrap()
    }

    #[test]
    fn test_bare_command_has_no_blocks() {
        let cmd = command("\\bf rest");
        assert_eq!(cmd.name.text, "\\bf");
        assert!(cmd.blocks.is_empty());
        assert!(cmd.scope.is_none());
        assert_eq!(cmd.span, 0..3);
    }

    #[test]
    fn test_empty_option_and_settings_blocks_chain() {
        let cmd = command("\\setup[][one,two][key=value]");
        assert_eq!(cmd.blocks.len(), 3);
        assert!(matches!(cmd.blocks[0], CommandBlock::Empty(_)));
        match &cmd.blocks[1] {
            CommandBlock::Options(options) => {
                let texts: Vec<&str> =
                    options.keywords.iter().map(|k| k.text.as_str()).collect();
                assert_eq!(texts, ["one", "two"]);
            }
            other => panic!("expected options, got {:?}", other),
        }
        match &cmd.blocks[2] {
            CommandBlock::Settings(settings) => {
                assert_eq!(settings.settings.len(), 1);
                assert_eq!(settings.settings[0].key.text, "key");
            }
            other => panic!("expected settings, got {:?}", other),
        }
        assert_eq!(cmd.span, 0..28);
    }

    #[test]
    fn test_settings_value_spans_exclude_surrounding_trivia() {
        let cmd = command("\\setup[width = 3cm, style=bold]");
        let settings = match &cmd.blocks[0] {
            CommandBlock::Settings(settings) => settings,
            other => panic!("expected settings, got {:?}", other),
        };
        assert_eq!(settings.settings.len(), 2);
        let width = &settings.settings[0];
        assert_eq!(width.key.text, "width");
        match &width.value.items[0] {
            ValueItem::Text(text) => assert_eq!(text.text, "3cm"),
            other => panic!("expected text value, got {:?}", other),
        }
    }

    #[test]
    fn test_interface_constant_is_one_keyword() {
        // `\v!big` lexes as two tokens but is a single keyword.
        let cmd = command("\\setuphead[\\v!big]");
        match &cmd.blocks[0] {
            CommandBlock::Options(options) => {
                assert_eq!(options.keywords.len(), 1);
                assert_eq!(options.keywords[0].text, "\\v!big");
                assert_eq!(options.keywords[0].span, 11..17);
            }
            other => panic!("expected options, got {:?}", other),
        }
        assert_eq!(cmd.span, 0..18);
    }

    #[test]
    fn test_interface_constant_as_setting_key() {
        let cmd = command("\\setupwhatever[\\c!width=3cm]");
        let settings = match &cmd.blocks[0] {
            CommandBlock::Settings(settings) => settings,
            other => panic!("expected settings, got {:?}", other),
        };
        assert_eq!(settings.settings[0].key.text, "\\c!width");
        match &settings.settings[0].value.items[0] {
            ValueItem::Text(text) => assert_eq!(text.text, "3cm"),
            other => panic!("expected text value, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_still_separates_keywords() {
        // `one two` with no comma fits no block shape.
        let cmd = command("\\foo[one two]");
        assert!(cmd.blocks.is_empty());
        assert_eq!(cmd.span, 0..4);
    }

    #[test]
    fn test_trailing_comma_at_end_of_input_backtracks() {
        let cmd = command("\\foo[a=b,");
        assert!(cmd.blocks.is_empty());
        assert_eq!(cmd.span, 0..4);
    }

    #[test]
    fn test_value_group_allows_commas_and_nesting() {
        let cmd = command("\\setup[before={a, {b}, c}]");
        let settings = match &cmd.blocks[0] {
            CommandBlock::Settings(settings) => settings,
            other => panic!("expected settings, got {:?}", other),
        };
        let group = match &settings.settings[0].value.items[0] {
            ValueItem::Group(group) => group,
            other => panic!("expected group value, got {:?}", other),
        };
        assert!(group
            .items
            .iter()
            .any(|item| matches!(item, ValueItem::Group(_))));
    }

    #[test]
    fn test_value_can_hold_a_command() {
        let cmd = command("\\setup[style=\\bf]");
        let settings = match &cmd.blocks[0] {
            CommandBlock::Settings(settings) => settings,
            other => panic!("expected settings, got {:?}", other),
        };
        match &settings.settings[0].value.items[0] {
            ValueItem::Command(inner) => assert_eq!(inner.name.text, "\\bf"),
            other => panic!("expected command value, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_bracket_backtracks_to_bare_command() {
        let mut parser = Parser::new("\\foo[unclosed");
        let cmd = parser.parse_command().unwrap();
        assert!(cmd.blocks.is_empty());
        assert_eq!(cmd.span, 0..4);
        // Cursor is back on the `[` so it can become text.
        assert_eq!(parser.span(parser.pos), 4..5);
    }

    #[test]
    fn test_blank_line_stops_the_chain() {
        let cmd = command("\\foo\n\n[one]");
        assert!(cmd.blocks.is_empty());
        assert_eq!(cmd.span, 0..4);
    }

    #[test]
    fn test_single_newline_does_not_stop_the_chain() {
        let cmd = command("\\foo\n[one]{x}");
        assert_eq!(cmd.blocks.len(), 1);
        let scope = cmd.scope.expect("scope expected");
        assert_eq!(scope.span, 10..13);
        assert_eq!(cmd.span, 0..13);
    }

    #[test]
    fn test_comment_between_name_and_block_is_skipped() {
        let cmd = command("\\foo % trailing\n[one]");
        assert_eq!(cmd.blocks.len(), 1);
    }

    #[test]
    fn test_blank_line_inside_block_fails_it() {
        let cmd = command("\\foo[one,\n\ntwo]");
        assert!(cmd.blocks.is_empty());
        assert_eq!(cmd.span, 0..4);
    }

    #[test]
    fn test_scope_without_blocks() {
        let cmd = command("\\emph{word}");
        assert!(cmd.blocks.is_empty());
        let scope = cmd.scope.expect("scope expected");
        assert_eq!(scope.span, 5..11);
        assert_eq!(cmd.span, 0..11);
    }
}
