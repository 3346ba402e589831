// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSS Selector parsing and matching
//!
//! CSS selectors are the path language for HTML documents. Supported:
//! type, universal, `#id`, `.class`, attribute operators, the structural
//! pseudo-classes, `:not()`, `:has()`, `:contains()`, the four combinators,
//! selector lists, and a leading combinator (`> td`) relative to the query
//! scope.

use std::collections::HashSet;

use super::element::Element;
use super::node::NodeId;
use crate::error::{Error, Result};

/// A parsed CSS selector list
#[derive(Debug, Clone)]
pub struct Selector {
    source: String,
    groups: Vec<ComplexSelector>,
}

/// One comma-separated alternative
#[derive(Debug, Clone)]
struct ComplexSelector {
    /// Combinator between the query scope and the first compound
    leading: Option<Combinator>,
    compounds: Vec<Vec<SelectorPart>>,
    /// `combinators[i]` links `compounds[i]` to `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

/// Combinator between selector parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant (space)
    Descendant,
    /// Child (>)
    Child,
    /// Adjacent sibling (+)
    AdjacentSibling,
    /// General sibling (~)
    GeneralSibling,
}

/// A part of a compound selector
#[derive(Debug, Clone)]
pub enum SelectorPart {
    /// Universal selector (*)
    Universal,
    /// Tag name
    Tag(String),
    /// ID selector (#id)
    Id(String),
    /// Class selector (.class)
    Class(String),
    /// Attribute selector ([attr], [attr=value], etc.)
    Attribute(AttributeSelector),
    /// Pseudo-class (:first-child, etc.)
    PseudoClass(PseudoClass),
}

/// Attribute selector
#[derive(Debug, Clone)]
pub struct AttributeSelector {
    pub name: String,
    pub operator: Option<AttributeOperator>,
    pub value: Option<String>,
    pub case_insensitive: bool,
}

/// Attribute selector operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// [attr=value] - exact match
    Equals,
    /// [attr~=value] - word in space-separated list
    Includes,
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch,
    /// [attr^=value] - starts with
    Prefix,
    /// [attr$=value] - ends with
    Suffix,
    /// [attr*=value] - contains substring
    Substring,
}

/// Pseudo-class selectors
#[derive(Debug, Clone)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    NthChild(NthExpr),
    NthLastChild(NthExpr),
    FirstOfType,
    LastOfType,
    NthOfType(NthExpr),
    Empty,
    Not(Box<Selector>),
    Has(Box<Selector>),
    /// Non-standard: text content contains the given string
    Contains(String),
    Checked,
    Disabled,
    Root,
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone)]
pub struct NthExpr {
    pub a: i32,
    pub b: i32,
}

impl NthExpr {
    /// Parse `odd`, `even`, `3`, `2n+1`, `-n+3`...
    pub fn parse(expr: &str) -> Option<Self> {
        let expr: String = expr
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        match expr.as_str() {
            "odd" => return Some(Self { a: 2, b: 1 }),
            "even" => return Some(Self { a: 2, b: 0 }),
            _ => {}
        }

        if let Ok(n) = expr.parse::<i32>() {
            return Some(Self { a: 0, b: n });
        }

        let (a_part, b_part) = expr.split_once('n')?;
        let a = match a_part {
            "" | "+" => 1,
            "-" => -1,
            s => s.parse().ok()?,
        };
        let b = if b_part.is_empty() {
            0
        } else {
            b_part.parse().ok()?
        };
        Some(Self { a, b })
    }

    /// Check a 1-based position
    pub fn matches(&self, index: i32) -> bool {
        if self.a == 0 {
            return index == self.b;
        }
        let diff = index - self.b;
        diff % self.a == 0 && diff / self.a >= 0
    }
}

impl Selector {
    /// Parse a CSS selector string
    pub fn parse(selector: &str) -> Result<Self> {
        let trimmed = selector.trim();
        if trimmed.is_empty() {
            return Err(Error::selector(selector, "empty selector"));
        }

        let mut parser = SelectorParser::new(trimmed);
        let groups = parser.parse_list()?;
        if parser.pos < parser.input.len() {
            return Err(Error::selector(
                selector,
                format!("unexpected '{}'", parser.input[parser.pos]),
            ));
        }

        Ok(Self {
            source: trimmed.to_string(),
            groups,
        })
    }

    /// Source text of the selector
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Check if an element matches, with the document as scope
    pub fn matches(&self, element: &Element) -> bool {
        self.matches_in_scope(element, NodeId::ROOT)
    }

    fn matches_in_scope(&self, element: &Element, scope: NodeId) -> bool {
        element.tree().get(element.node_id()).is_element()
            && self.groups.iter().any(|g| g.matches(element, scope))
    }

    /// Descendants of `scope` matching this selector, in document order
    pub fn select(&self, scope: &Element) -> Vec<Element> {
        let scope_id = scope.node_id();
        let mut seen = HashSet::new();
        scope
            .descendants()
            .into_iter()
            .filter(|e| self.matches_in_scope(e, scope_id))
            .filter(|e| seen.insert(e.node_id()))
            .collect()
    }
}

impl ComplexSelector {
    fn matches(&self, element: &Element, scope: NodeId) -> bool {
        self.matches_at(self.compounds.len() - 1, element, scope)
    }

    fn matches_at(&self, index: usize, element: &Element, scope: NodeId) -> bool {
        if !self.compounds[index]
            .iter()
            .all(|part| part_matches(part, element))
        {
            return false;
        }

        if index == 0 {
            return match self.leading {
                None | Some(Combinator::Descendant) => true,
                Some(Combinator::Child) => element.parent_id() == Some(scope),
                Some(Combinator::AdjacentSibling) => element
                    .preceding_siblings()
                    .first()
                    .map_or(false, |s| s.node_id() == scope),
                Some(Combinator::GeneralSibling) => element
                    .preceding_siblings()
                    .iter()
                    .any(|s| s.node_id() == scope),
            };
        }

        let previous = index - 1;
        match self.combinators[previous] {
            Combinator::Descendant => {
                let mut ancestor = element.parent();
                while let Some(a) = ancestor {
                    if self.matches_at(previous, &a, scope) {
                        return true;
                    }
                    ancestor = a.parent();
                }
                false
            }
            Combinator::Child => element
                .parent()
                .map_or(false, |p| self.matches_at(previous, &p, scope)),
            Combinator::AdjacentSibling => element
                .preceding_siblings()
                .first()
                .map_or(false, |s| self.matches_at(previous, s, scope)),
            Combinator::GeneralSibling => element
                .preceding_siblings()
                .iter()
                .any(|s| self.matches_at(previous, s, scope)),
        }
    }
}

/// Check if a selector part matches
fn part_matches(part: &SelectorPart, element: &Element) -> bool {
    match part {
        SelectorPart::Universal => true,
        SelectorPart::Tag(tag) => element.tag_name().eq_ignore_ascii_case(tag),
        SelectorPart::Id(id) => element.id() == Some(id.as_str()),
        SelectorPart::Class(class) => element.has_class(class),
        SelectorPart::Attribute(attr) => attribute_matches(attr, element),
        SelectorPart::PseudoClass(pseudo) => pseudo_matches(pseudo, element),
    }
}

/// Check if attribute selector matches
fn attribute_matches(attr: &AttributeSelector, element: &Element) -> bool {
    let Some(value) = element.attr(&attr.name) else {
        return false;
    };

    let (Some(op), Some(target)) = (&attr.operator, &attr.value) else {
        return true; // Just checking existence
    };

    let (value, target) = if attr.case_insensitive {
        (value.to_lowercase(), target.to_lowercase())
    } else {
        (value.to_string(), target.clone())
    };

    match op {
        AttributeOperator::Equals => value == target,
        AttributeOperator::Includes => value.split_whitespace().any(|w| w == target),
        AttributeOperator::DashMatch => {
            value == target || value.starts_with(&format!("{}-", target))
        }
        AttributeOperator::Prefix => !target.is_empty() && value.starts_with(&target),
        AttributeOperator::Suffix => !target.is_empty() && value.ends_with(&target),
        AttributeOperator::Substring => !target.is_empty() && value.contains(&target),
    }
}

/// Check if pseudo-class matches
fn pseudo_matches(pseudo: &PseudoClass, element: &Element) -> bool {
    match pseudo {
        PseudoClass::FirstChild => element.preceding_siblings().is_empty(),
        PseudoClass::LastChild => element.following_siblings().is_empty(),
        PseudoClass::OnlyChild => {
            element.preceding_siblings().is_empty() && element.following_siblings().is_empty()
        }
        PseudoClass::NthChild(expr) => expr.matches(element.preceding_siblings().len() as i32 + 1),
        PseudoClass::NthLastChild(expr) => {
            expr.matches(element.following_siblings().len() as i32 + 1)
        }
        PseudoClass::FirstOfType => same_type(&element.preceding_siblings(), element) == 0,
        PseudoClass::LastOfType => same_type(&element.following_siblings(), element) == 0,
        PseudoClass::NthOfType(expr) => {
            expr.matches(same_type(&element.preceding_siblings(), element) as i32 + 1)
        }
        PseudoClass::Empty => element
            .tree()
            .get(element.node_id())
            .children
            .is_empty(),
        PseudoClass::Not(sel) => !sel.matches(element),
        PseudoClass::Has(sel) => !sel.select(element).is_empty(),
        PseudoClass::Contains(text) => element.text_content().contains(text.as_str()),
        PseudoClass::Checked => {
            element.has_attribute("checked") || element.has_attribute("selected")
        }
        PseudoClass::Disabled => element.has_attribute("disabled"),
        PseudoClass::Root => element.parent().is_none(),
    }
}

fn same_type(siblings: &[Element], element: &Element) -> usize {
    siblings
        .iter()
        .filter(|s| s.tag_name() == element.tag_name())
        .count()
}

/// Simple selector parser
struct SelectorParser {
    input: Vec<char>,
    pos: usize,
}

impl SelectorParser {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    fn source(&self) -> String {
        self.input.iter().collect()
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::selector(self.source(), reason)
    }

    fn parse_list(&mut self) -> Result<Vec<ComplexSelector>> {
        let mut groups = Vec::new();
        loop {
            groups.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.advance();
                }
                _ => break,
            }
        }
        Ok(groups)
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector> {
        self.skip_whitespace();
        let leading = self.parse_combinator_symbol();
        self.skip_whitespace();

        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') | Some('+') | Some('~') => match self.parse_combinator_symbol() {
                    Some(c) => c,
                    None => break,
                },
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected '{}'", c))),
            };
            self.skip_whitespace();
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector {
            leading,
            compounds,
            combinators,
        })
    }

    fn parse_combinator_symbol(&mut self) -> Option<Combinator> {
        let combinator = match self.peek()? {
            '>' => Combinator::Child,
            '+' => Combinator::AdjacentSibling,
            '~' => Combinator::GeneralSibling,
            _ => return None,
        };
        self.advance();
        Some(combinator)
    }

    fn parse_compound(&mut self) -> Result<Vec<SelectorPart>> {
        let mut parts = Vec::new();

        while let Some(c) = self.peek() {
            match c {
                '#' => {
                    self.advance();
                    parts.push(SelectorPart::Id(self.read_identifier()?));
                }
                '.' => {
                    self.advance();
                    parts.push(SelectorPart::Class(self.read_identifier()?));
                }
                '[' => parts.push(SelectorPart::Attribute(self.parse_attribute()?)),
                ':' => parts.push(SelectorPart::PseudoClass(self.parse_pseudo()?)),
                '*' => {
                    self.advance();
                    parts.push(SelectorPart::Universal);
                }
                c if c.is_alphanumeric() || c == '_' || c == '-' => {
                    let tag = self.read_identifier()?;
                    parts.push(SelectorPart::Tag(tag.to_lowercase()));
                }
                _ => break,
            }
        }

        if parts.is_empty() {
            return Err(self.error("expected a simple selector"));
        }
        Ok(parts)
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn read_identifier(&mut self) -> Result<String> {
        let mut result = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                result.push(c);
                self.advance();
            } else if c == '\\' {
                self.advance();
                if let Some(escaped) = self.advance() {
                    result.push(escaped);
                }
            } else {
                break;
            }
        }
        if result.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(result)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector> {
        self.advance(); // consume '['

        self.skip_whitespace();
        let name = self.read_identifier()?;
        self.skip_whitespace();

        let mut operator = None;
        let mut value = None;
        let mut case_insensitive = false;

        if let Some(c) = self.peek() {
            if c != ']' {
                let op = match c {
                    '=' => AttributeOperator::Equals,
                    '~' => AttributeOperator::Includes,
                    '|' => AttributeOperator::DashMatch,
                    '^' => AttributeOperator::Prefix,
                    '$' => AttributeOperator::Suffix,
                    '*' => AttributeOperator::Substring,
                    _ => return Err(self.error(format!("unknown operator: {}", c))),
                };
                self.advance();
                if op != AttributeOperator::Equals {
                    self.expect('=')?;
                }
                operator = Some(op);

                self.skip_whitespace();
                value = Some(self.read_attribute_value()?);
                self.skip_whitespace();

                if let Some('i') | Some('I') = self.peek() {
                    case_insensitive = true;
                    self.advance();
                    self.skip_whitespace();
                }
            }
        }

        self.expect(']')?;

        Ok(AttributeSelector {
            name,
            operator,
            value,
            case_insensitive,
        })
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass> {
        self.advance(); // consume ':'
        let name = self.read_identifier()?.to_lowercase();

        let nth = |parser: &mut Self| -> Result<NthExpr> {
            let arg = parser.parse_function_arg()?;
            NthExpr::parse(&arg).ok_or_else(|| parser.error(format!("invalid nth expression '{}'", arg)))
        };

        let pseudo = match name.as_str() {
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "empty" => PseudoClass::Empty,
            "checked" => PseudoClass::Checked,
            "disabled" => PseudoClass::Disabled,
            "root" => PseudoClass::Root,
            "nth-child" => PseudoClass::NthChild(nth(self)?),
            "nth-last-child" => PseudoClass::NthLastChild(nth(self)?),
            "nth-of-type" => PseudoClass::NthOfType(nth(self)?),
            "not" => {
                let inner = self.parse_function_arg()?;
                PseudoClass::Not(Box::new(Selector::parse(&inner)?))
            }
            "has" => {
                let inner = self.parse_function_arg()?;
                PseudoClass::Has(Box::new(Selector::parse(&inner)?))
            }
            "contains" => {
                let inner = self.parse_function_arg()?;
                let text = inner
                    .trim_matches(|c| c == '"' || c == '\'')
                    .to_string();
                PseudoClass::Contains(text)
            }
            other => return Err(self.error(format!("unsupported pseudo-class :{}", other))),
        };

        Ok(pseudo)
    }

    fn parse_function_arg(&mut self) -> Result<String> {
        self.expect('(')?;
        let mut depth = 1;
        let mut result = String::new();

        while let Some(c) = self.advance() {
            match c {
                '(' => {
                    depth += 1;
                    result.push(c);
                }
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(result.trim().to_string());
                    }
                    result.push(c);
                }
                _ => result.push(c),
            }
        }

        Err(self.error("unclosed '('"))
    }

    fn read_attribute_value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                let mut result = String::new();
                while let Some(c) = self.advance() {
                    if c == quote {
                        return Ok(result);
                    }
                    if c == '\\' {
                        if let Some(escaped) = self.advance() {
                            result.push(escaped);
                        }
                    } else {
                        result.push(c);
                    }
                }
                Err(self.error("unterminated string"))
            }
            _ => {
                let mut result = String::new();
                while let Some(c) = self.peek() {
                    if c == ']' || c.is_whitespace() {
                        break;
                    }
                    result.push(c);
                    self.advance();
                }
                if result.is_empty() {
                    return Err(self.error("expected attribute value"));
                }
                Ok(result)
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{}', got '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', got end of input", expected))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    const TABLE: &str = r#"
        <table id="ops">
          <thead><tr><th>Date</th><th>Label</th><th>Amount</th></tr></thead>
          <tbody>
            <tr class="op debit"><td>01/02/2024</td><td>Rent</td><td>-800,00</td></tr>
            <tr class="op"><td>03/02/2024</td><td>Salary <b>Feb</b></td><td>2.500,00</td></tr>
          </tbody>
        </table>
        <p lang="fr-FR">Bonjour</p>
    "#;

    fn texts(sel: &str) -> Vec<String> {
        let doc = parse_html(TABLE).unwrap();
        doc.root()
            .query(sel)
            .unwrap()
            .iter()
            .map(|e| e.text_content())
            .collect()
    }

    #[test]
    fn test_selector_parsing() {
        assert!(Selector::parse("div").is_ok());
        assert!(Selector::parse(".class").is_ok());
        assert!(Selector::parse("#id").is_ok());
        assert!(Selector::parse("[attr]").is_ok());
        assert!(Selector::parse("[attr=value]").is_ok());
        assert!(Selector::parse("div.class#id").is_ok());
        assert!(Selector::parse("table > tbody tr:nth-child(2n+1), p").is_ok());
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div[").is_err());
        assert!(Selector::parse("li:hover").is_err());
    }

    #[test]
    fn test_combinators() {
        assert_eq!(texts("tbody td:first-child"), vec!["01/02/2024", "03/02/2024"]);
        assert_eq!(texts("tr.debit > td:nth-child(3)"), vec!["-800,00"]);
        assert_eq!(texts("th + th"), vec!["Label", "Amount"]);
        assert_eq!(texts("th:first-child ~ th:last-child"), vec!["Amount"]);
        assert_eq!(texts("#ops b"), vec!["Feb"]);
    }

    #[test]
    fn test_attribute_and_pseudo() {
        assert_eq!(texts("p[lang|=fr]"), vec!["Bonjour"]);
        assert_eq!(texts("tr:not(.debit) > td:nth-child(1)"), vec!["03/02/2024"]);
        assert_eq!(texts("tr:has(b) td:last-child"), vec!["2.500,00"]);
        assert_eq!(texts("td:contains('Rent')"), vec!["Rent"]);
        assert_eq!(texts("td, th:nth-of-type(1)").len(), 7);
    }

    #[test]
    fn test_scoped_leading_combinator() {
        let doc = parse_html(TABLE).unwrap();
        let row = doc.root().query_first("tr.debit").unwrap().unwrap();
        let cells = row.query("> td").unwrap();
        assert_eq!(cells.len(), 3);
        assert!(row.query("> b").unwrap().is_empty());
    }

    #[test]
    fn test_nth_expr() {
        let odd = NthExpr::parse("odd").unwrap();
        assert!(odd.matches(1));
        assert!(!odd.matches(2));
        assert!(odd.matches(3));

        let even = NthExpr::parse("even").unwrap();
        assert!(!even.matches(1));
        assert!(even.matches(2));

        let expr = NthExpr::parse("2n+1").unwrap();
        assert!(expr.matches(1));
        assert!(!expr.matches(2));
        assert!(expr.matches(3));

        let first_three = NthExpr::parse("-n+3").unwrap();
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));
    }
}
