//! Class-level inline style rules.
//!
//! The thesis export carries emphasis as CSS classes on `<span>`s
//! (`.c7{font-weight:700}`) rather than as `<b>`/`<i>` tags. This module
//! parses every `<style>` block once with cssparser and keeps only what the
//! Markdown renderer can express: bold, italic and underline per class.

use std::collections::HashMap;

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser, Token,
};

use crate::dom::Dom;

/// Emphasis flags that can be inherited down the inline tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl InlineStyle {
    pub const PLAIN: InlineStyle = InlineStyle {
        bold: false,
        italic: false,
        underline: false,
    };

    pub const fn bold() -> Self {
        Self {
            bold: true,
            ..Self::PLAIN
        }
    }

    pub const fn italic() -> Self {
        Self {
            italic: true,
            ..Self::PLAIN
        }
    }

    pub const fn underline() -> Self {
        Self {
            underline: true,
            ..Self::PLAIN
        }
    }

    /// Flags set in either side. Flags only ever turn on while descending.
    pub fn union(self, other: InlineStyle) -> InlineStyle {
        InlineStyle {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }
}

/// Per-property values declared by one rule; `None` means "not mentioned".
#[derive(Debug, Clone, Copy, Default)]
struct Declared {
    bold: Option<bool>,
    italic: Option<bool>,
    underline: Option<bool>,
}

impl Declared {
    /// Later declarations override earlier ones property by property.
    fn apply(&mut self, later: Declared) {
        self.bold = later.bold.or(self.bold);
        self.italic = later.italic.or(self.italic);
        self.underline = later.underline.or(self.underline);
    }

    fn resolve(self) -> InlineStyle {
        InlineStyle {
            bold: self.bold.unwrap_or(false),
            italic: self.italic.unwrap_or(false),
            underline: self.underline.unwrap_or(false),
        }
    }
}

/// Immutable class name → [`InlineStyle`] table.
#[derive(Debug, Clone, Default)]
pub struct StyleRules {
    classes: HashMap<String, InlineStyle>,
}

impl StyleRules {
    /// Parse a stylesheet, keeping rules whose selector subject is a class.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut declared: HashMap<String, Declared> = HashMap::new();

        let mut rule_parser = TopLevelRuleParser {
            declared: &mut declared,
        };
        for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
            // Lenient: skip rules cssparser cannot make sense of.
            let _ = result;
        }

        let classes = declared
            .into_iter()
            .map(|(class, decl)| (class, decl.resolve()))
            .collect();
        Self { classes }
    }

    /// Collect every `<style>` element of the document and parse it.
    pub fn from_dom(dom: &Dom) -> Self {
        Self::parse(&crate::dom::style_text(dom))
    }

    pub fn get(&self, class: &str) -> Option<InlineStyle> {
        self.classes.get(class).copied()
    }

    /// Union of the flags of every listed class.
    pub fn resolve(&self, classes: &[String]) -> InlineStyle {
        classes
            .iter()
            .filter_map(|c| self.get(c))
            .fold(InlineStyle::PLAIN, InlineStyle::union)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

struct TopLevelRuleParser<'a> {
    declared: &'a mut HashMap<String, Declared>,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    // @import, @media, @font-face: nothing there styles a class we render.
    fn parse_prelude<'t>(
        &mut self,
        _name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = Vec<String>;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Ok(subject_classes(input))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut decl_parser = DeclarationListParser {
            declared: Declared::default(),
        };
        for result in RuleBodyParser::new(input, &mut decl_parser) {
            let _ = result;
        }

        let rule = decl_parser.declared;
        for class in prelude {
            self.declared.entry(class).or_default().apply(rule);
        }
        Ok(())
    }
}

/// Classes that are the subject of each selector in a comma-separated list.
///
/// Only a class as the last simple selector counts: `.c1`, `p.c1` and
/// `.a .c1` yield `c1`; `.c1 span` and `.c1:hover` yield nothing.
fn subject_classes(input: &mut Parser<'_, '_>) -> Vec<String> {
    let mut classes = Vec::new();
    let mut last_class: Option<String> = None;
    let mut after_dot = false;

    while let Ok(token) = input.next_including_whitespace() {
        match token {
            Token::Delim('.') => {
                after_dot = true;
                continue;
            }
            Token::Ident(name) if after_dot => last_class = Some(name.to_string()),
            Token::WhiteSpace(_) => {}
            Token::Comma => classes.extend(last_class.take()),
            _ => last_class = None,
        }
        after_dot = false;
    }
    classes.extend(last_class);
    classes
}

struct DeclarationListParser {
    declared: Declared,
}

impl<'i> AtRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type AtRule = ();
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();
}

impl<'i> DeclarationParser<'i> for DeclarationListParser {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let property = name.to_ascii_lowercase();
        let value = match property.as_str() {
            "font-weight" => Declared {
                bold: parse_font_weight(input),
                ..Declared::default()
            },
            "font-style" => Declared {
                italic: parse_font_style(input),
                ..Declared::default()
            },
            "text-decoration" | "text-decoration-line" => Declared {
                underline: Some(has_keyword(input, "underline")),
                ..Declared::default()
            },
            _ => Declared::default(),
        };
        // Drain whatever is left (`!important`, colors after keywords).
        while input.next().is_ok() {}

        self.declared.apply(value);
        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for DeclarationListParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

fn parse_font_weight(input: &mut Parser<'_, '_>) -> Option<bool> {
    match input.next().ok()? {
        Token::Ident(ident) => match ident.to_ascii_lowercase().as_str() {
            "bold" | "bolder" => Some(true),
            "normal" | "lighter" => Some(false),
            _ => None,
        },
        Token::Number { value, .. } => Some(*value >= 700.0),
        _ => None,
    }
}

fn parse_font_style(input: &mut Parser<'_, '_>) -> Option<bool> {
    let ident = input.expect_ident_cloned().ok()?;
    match ident.to_ascii_lowercase().as_str() {
        "italic" | "oblique" => Some(true),
        "normal" => Some(false),
        _ => None,
    }
}

fn has_keyword(input: &mut Parser<'_, '_>, keyword: &str) -> bool {
    let mut found = false;
    while let Ok(token) = input.next() {
        if let Token::Ident(ident) = token
            && ident.eq_ignore_ascii_case(keyword)
        {
            found = true;
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_docs_classes() {
        let css = ".c1{font-weight:700}.c2{font-style:italic}\
                   .c3{text-decoration:underline;color:#1155cc}\
                   .c4{font-weight:400;font-size:11pt}";
        let rules = StyleRules::parse(css);

        assert_eq!(rules.get("c1"), Some(InlineStyle::bold()));
        assert_eq!(rules.get("c2"), Some(InlineStyle::italic()));
        assert_eq!(rules.get("c3"), Some(InlineStyle::underline()));
        assert_eq!(rules.get("c4"), Some(InlineStyle::PLAIN));
        assert_eq!(rules.get("missing"), None);
    }

    #[test]
    fn test_keywords_and_spacing() {
        let rules = StyleRules::parse(
            ".b { font-weight: bold } .i { font-style: italic !important } \
             .u { text-decoration: underline solid #000 }",
        );
        assert_eq!(rules.get("b"), Some(InlineStyle::bold()));
        assert_eq!(rules.get("i"), Some(InlineStyle::italic()));
        assert_eq!(rules.get("u"), Some(InlineStyle::underline()));
    }

    #[test]
    fn test_subject_class_only() {
        let rules = StyleRules::parse(
            ".a, p.b, .x .c { font-weight: 700 } .d span { font-style: italic } \
             .e:hover { text-decoration: underline } .lst-kix_1>li:before { content: '-' }",
        );
        assert_eq!(rules.get("a"), Some(InlineStyle::bold()));
        assert_eq!(rules.get("b"), Some(InlineStyle::bold()));
        assert_eq!(rules.get("c"), Some(InlineStyle::bold()));
        assert_eq!(rules.get("x"), None);
        assert_eq!(rules.get("d"), None);
        assert_eq!(rules.get("e"), None);
        assert_eq!(rules.get("lst-kix_1"), None);
    }

    #[test]
    fn test_later_rule_overrides_per_property() {
        let rules = StyleRules::parse(
            ".c1 { font-weight: 700; font-style: italic } .c1 { font-weight: 400 } .c1 { color: red }",
        );
        assert_eq!(rules.get("c1"), Some(InlineStyle::italic()));
    }

    #[test]
    fn test_at_rules_are_skipped() {
        let rules = StyleRules::parse(
            "@import url('https://themes.googleusercontent.com/fonts/css?kit=abc');\
             @media print { .p { font-weight: 700 } } .c9 { font-style: italic }",
        );
        assert_eq!(rules.get("c9"), Some(InlineStyle::italic()));
        assert_eq!(rules.get("p"), None);
    }

    #[test]
    fn test_resolve_unions_classes() {
        let rules = StyleRules::parse(".c1{font-weight:700}.c2{font-style:italic}");
        let style = rules.resolve(&["c1".to_string(), "c2".to_string(), "c3".to_string()]);
        assert!(style.bold && style.italic && !style.underline);
        assert!(rules.resolve(&[]).is_plain());
    }
}
