//! Stylesheet parsing on top of `cssparser`.
//!
//! Only the shape needed for selector auditing is kept: style rules carry
//! their selector list and start position, conditional group rules carry
//! their nested rules, every other at-rule is recorded by name only.

use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, SourceLocation, StyleSheetParser,
};
use sweep_common::protocol::GeneratedPosition;

/// At-rules whose block is a list of rules that still apply to the document.
const GROUP_AT_RULES: &[&str] = &[
    "media",
    "supports",
    "layer",
    "container",
    "document",
    "-moz-document",
];

/// A parsed stylesheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    /// Top-level rules in source order.
    pub rules: Vec<CssRule>,
    /// Rules the parser had to skip.
    pub errors: Vec<RuleError>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CssRule {
    Style(StyleRule),
    Group(GroupRule),
    Other(OtherRule),
}

/// A qualified rule such as `.a, .b { ... }`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Selector list members, trimmed, in source order.
    pub selectors: Vec<String>,
    /// Position of the first character of the selector list.
    pub start: GeneratedPosition,
}

/// A conditional group rule (`@media`, `@supports`, ...) and its children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupRule {
    pub name: String,
    pub rules: Vec<CssRule>,
}

/// Any other at-rule (`@import`, `@font-face`, `@keyframes`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtherRule {
    pub name: String,
}

/// A rule that could not be parsed and was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleError {
    pub position: GeneratedPosition,
    pub text: String,
}

enum AtPrelude {
    Group(String),
    Other(String),
}

#[derive(Default)]
struct RuleListParser {
    errors: Vec<RuleError>,
}

/// cssparser lines are 0-based and columns 1-based.
fn position_of(location: SourceLocation) -> GeneratedPosition {
    GeneratedPosition::new(location.line + 1, location.column.saturating_sub(1))
}

fn consume_rest(input: &mut Parser<'_, '_>) {
    while input.next_including_whitespace_and_comments().is_ok() {}
}

impl RuleListParser {
    fn parse_rule_list<'i>(&mut self, input: &mut Parser<'i, '_>) -> Vec<CssRule> {
        let mut rules = Vec::new();
        let mut errors = Vec::new();
        for item in StyleSheetParser::new(input, &mut *self) {
            match item {
                Ok(rule) => rules.push(rule),
                Err((err, slice)) => errors.push(RuleError {
                    position: position_of(err.location),
                    text: slice.trim().to_owned(),
                }),
            }
        }
        self.errors.extend(errors);
        rules
    }
}

impl<'i> AtRuleParser<'i> for RuleListParser {
    type Prelude = AtPrelude;
    type AtRule = CssRule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let name = name.to_ascii_lowercase();
        consume_rest(input);
        if GROUP_AT_RULES.contains(&name.as_str()) {
            Ok(AtPrelude::Group(name))
        } else {
            Ok(AtPrelude::Other(name))
        }
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        let name = match prelude {
            AtPrelude::Group(name) | AtPrelude::Other(name) => name,
        };
        Ok(CssRule::Other(OtherRule { name }))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        match prelude {
            AtPrelude::Group(name) => {
                let rules = self.parse_rule_list(input);
                Ok(CssRule::Group(GroupRule { name, rules }))
            }
            AtPrelude::Other(name) => {
                consume_rest(input);
                Ok(CssRule::Other(OtherRule { name }))
            }
        }
    }
}

impl<'i> QualifiedRuleParser<'i> for RuleListParser {
    type Prelude = Vec<String>;
    type QualifiedRule = CssRule;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        // Splits on top-level commas only; `:is(a, b)` stays whole.
        let members = input.parse_comma_separated(
            |item| -> Result<String, ParseError<'i, Self::Error>> {
                let start = item.position();
                consume_rest(item);
                Ok(item.slice_from(start).trim().to_owned())
            },
        )?;
        let selectors: Vec<String> = members.into_iter().filter(|s| !s.is_empty()).collect();
        if selectors.is_empty() {
            return Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid));
        }
        Ok(selectors)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        consume_rest(input);
        Ok(CssRule::Style(StyleRule {
            selectors: prelude,
            start: position_of(start.source_location()),
        }))
    }
}

/// Parse a full stylesheet, recovering from invalid rules.
pub fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut rule_parser = RuleListParser::default();
    let rules = rule_parser.parse_rule_list(&mut parser);
    Stylesheet {
        rules,
        errors: rule_parser.errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn style(rule: &CssRule) -> &StyleRule {
        match rule {
            CssRule::Style(style) => style,
            other => panic!("expected style rule, got {:?}", other),
        }
    }

    #[test]
    fn parses_selector_lists_and_positions() {
        let sheet = parse_stylesheet(".a { color: red }\n\n  .b,.c { margin: 0 }\n");
        assert!(sheet.errors.is_empty());
        assert_eq!(sheet.rules.len(), 2);

        let first = style(&sheet.rules[0]);
        assert_eq!(first.selectors, vec![".a"]);
        assert_eq!(first.start, GeneratedPosition::new(1, 0));

        let second = style(&sheet.rules[1]);
        assert_eq!(second.selectors, vec![".b", ".c"]);
        assert_eq!(second.start, GeneratedPosition::new(3, 2));
    }

    #[test]
    fn commas_inside_functions_do_not_split() {
        let sheet = parse_stylesheet(":is(h1, h2) > span, p { }");
        let rule = style(&sheet.rules[0]);
        assert_eq!(rule.selectors, vec![":is(h1, h2) > span", "p"]);
    }

    #[test]
    fn group_rules_keep_children() {
        let sheet = parse_stylesheet(
            "@import url(x.css);\n@media (max-width: 10px) { .m { top: 0 } }\n@keyframes spin { from { top: 0 } to { top: 1px } }",
        );
        assert_eq!(sheet.rules.len(), 3);
        assert_eq!(
            sheet.rules[0],
            CssRule::Other(OtherRule {
                name: "import".into()
            })
        );
        match &sheet.rules[1] {
            CssRule::Group(group) => {
                assert_eq!(group.name, "media");
                assert_eq!(group.rules.len(), 1);
                assert_eq!(style(&group.rules[0]).selectors, vec![".m"]);
                assert_eq!(style(&group.rules[0]).start, GeneratedPosition::new(2, 27));
            }
            other => panic!("expected media group, got {:?}", other),
        }
        assert_eq!(
            sheet.rules[2],
            CssRule::Other(OtherRule {
                name: "keyframes".into()
            })
        );
    }

    #[test]
    fn rules_without_selectors_are_reported() {
        let sheet = parse_stylesheet("{ color: red }\n.ok { }");
        assert_eq!(sheet.errors.len(), 1);
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(style(&sheet.rules[0]).selectors, vec![".ok"]);
    }

    #[test]
    fn comments_are_not_rules() {
        let sheet = parse_stylesheet("/* header */\n.a { }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(style(&sheet.rules[0]).start, GeneratedPosition::new(2, 0));
    }
}
