//! Selector model and parser

use crate::SelectorError;

/// A component of a compound selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Presence selector `[name]`
    pub fn presence(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            matcher: None,
            case_insensitive: false,
        }
    }

    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(val)) = (&self.matcher, value) else {
            // [attr] only checks existence
            return self.matcher.is_none() && value.is_some();
        };

        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_lowercase()
            } else {
                s.to_string()
            }
        };
        let val = fold(val);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                val.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{expected}-"))
            }
            AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(&fold(expected)),
            AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(&fold(expected)),
            AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(&fold(expected)),
        }
    }
}

/// Components that must all match one element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

/// How a compound relates to the one on its left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

/// Compounds joined by combinators. `ancestors` runs right to left from
/// the subject: each entry is reached from the previous compound through
/// its paired combinator.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub subject: CompoundSelector,
    pub ancestors: Vec<(Combinator, CompoundSelector)>,
}

/// Comma-separated selector list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// List that matches when any attribute in `names` is present
    pub fn any_attribute<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let selectors = names
            .into_iter()
            .map(|name| ComplexSelector {
                subject: CompoundSelector {
                    components: vec![SelectorComponent::Attribute(AttributeSelector::presence(name))],
                },
                ancestors: Vec::new(),
            })
            .collect();
        Self { selectors }
    }

    /// Append another list's selectors
    pub fn extend(&mut self, other: SelectorList) {
        self.selectors.extend(other.selectors);
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

impl std::str::FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector_list(s)
    }
}

/// Parse a comma-separated selector list
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SelectorError::Empty);
    }
    let selectors = split_outside_brackets(input, ',')
        .into_iter()
        .map(|part| parse_complex(part.trim(), input))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SelectorList { selectors })
}

fn invalid(selector: &str, reason: &str) -> SelectorError {
    SelectorError::Invalid {
        selector: selector.to_string(),
        reason: reason.to_string(),
    }
}

/// Split on `sep` while outside `[...]` and quotes
fn split_outside_brackets(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_complex(input: &str, whole: &str) -> Result<ComplexSelector, SelectorError> {
    if input.is_empty() {
        return Err(invalid(whole, "empty entry in selector list"));
    }

    // Tokenize into compounds and combinators, left to right
    let mut compounds: Vec<&str> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut pending: Option<Combinator> = None;
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    fn flush<'a>(input: &'a str, start: &mut Option<usize>, end: usize, compounds: &mut Vec<&'a str>) {
        if let Some(s) = start.take() {
            compounds.push(&input[s..end]);
        }
    }

    for (i, c) in input.char_indices() {
        match c {
            '[' => {
                depth += 1;
                if start.is_none() {
                    if let Some(comb) = pending.take() {
                        combinators.push(comb);
                    }
                    start = Some(i);
                }
            }
            ']' => depth = depth.saturating_sub(1),
            c if depth == 0 && (c.is_whitespace() || c == '>') => {
                let had_compound = start.is_some();
                flush(input, &mut start, i, &mut compounds);
                if had_compound {
                    pending = Some(Combinator::Descendant);
                }
                if c == '>' {
                    if compounds.is_empty() {
                        return Err(invalid(whole, "child combinator without left side"));
                    }
                    pending = Some(Combinator::Child);
                }
            }
            _ => {
                if start.is_none() {
                    if let Some(comb) = pending.take() {
                        combinators.push(comb);
                    }
                    start = Some(i);
                }
            }
        }
    }
    flush(input, &mut start, input.len(), &mut compounds);
    if matches!(pending, Some(Combinator::Child)) && combinators.len() + 1 == compounds.len() {
        return Err(invalid(whole, "dangling child combinator"));
    }

    let mut parsed = compounds
        .iter()
        .map(|c| parse_compound(c, whole))
        .collect::<Result<Vec<_>, _>>()?;
    let subject = parsed.pop().ok_or_else(|| invalid(whole, "missing subject"))?;
    let ancestors = combinators.into_iter().rev().zip(parsed.into_iter().rev()).collect();
    Ok(ComplexSelector { subject, ancestors })
}

fn parse_compound(input: &str, whole: &str) -> Result<CompoundSelector, SelectorError> {
    let mut components = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let (token, tail) = if rest.starts_with('[') {
            let end = rest.find(']').ok_or_else(|| invalid(whole, "unterminated attribute selector"))?;
            rest.split_at(end + 1)
        } else {
            let skip = rest.chars().next().map_or(0, char::len_utf8);
            let end = rest[skip..]
                .find(['#', '.', '['])
                .map_or(rest.len(), |p| p + skip);
            rest.split_at(end)
        };
        let component = parse_simple_selector(token).ok_or_else(|| invalid(whole, &format!("bad component `{token}`")))?;
        components.push(component);
        rest = tail;
    }

    Ok(CompoundSelector { components })
}

/// Parse a simple selector (type, class, id, or attribute)
pub fn parse_simple_selector(input: &str) -> Option<SelectorComponent> {
    let input = input.trim();

    if input.is_empty() {
        return None;
    }

    if input == "*" {
        return Some(SelectorComponent::Universal);
    }

    if let Some(id) = input.strip_prefix('#') {
        return is_valid_ident(id).then(|| SelectorComponent::Id(id.to_string()));
    }

    if let Some(class) = input.strip_prefix('.') {
        return is_valid_ident(class).then(|| SelectorComponent::Class(class.to_string()));
    }

    if input.starts_with('[') && input.ends_with(']') {
        return parse_attribute_selector(&input[1..input.len() - 1]);
    }

    is_valid_ident(input).then(|| SelectorComponent::Type(input.to_lowercase()))
}

/// Check if string is a valid CSS identifier
fn is_valid_ident(s: &str) -> bool {
    let mut chars = s.chars();

    // First character must be a letter, underscore, or hyphen
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '-' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Parse an attribute selector content (without brackets)
fn parse_attribute_selector(content: &str) -> Option<SelectorComponent> {
    let content = content.trim();

    let (content, case_insensitive) = match content.strip_suffix(" i").or_else(|| content.strip_suffix(" I")) {
        Some(stripped) => (stripped.trim_end(), true),
        None => (content, false),
    };

    for (op, matcher_fn) in [
        ("~=", AttributeMatcher::Contains as fn(String) -> AttributeMatcher),
        ("|=", AttributeMatcher::DashMatch as fn(String) -> AttributeMatcher),
        ("^=", AttributeMatcher::Prefix as fn(String) -> AttributeMatcher),
        ("$=", AttributeMatcher::Suffix as fn(String) -> AttributeMatcher),
        ("*=", AttributeMatcher::Substring as fn(String) -> AttributeMatcher),
        ("=", AttributeMatcher::Exact as fn(String) -> AttributeMatcher),
    ] {
        if let Some(pos) = content.find(op) {
            let name = content[..pos].trim();
            if !is_valid_ident(name) {
                return None;
            }
            let value = content[pos + op.len()..]
                .trim()
                .trim_matches('"')
                .trim_matches('\'')
                .to_string();

            return Some(SelectorComponent::Attribute(AttributeSelector {
                name: name.to_ascii_lowercase(),
                matcher: Some(matcher_fn(value)),
                case_insensitive,
            }));
        }
    }

    is_valid_ident(content).then(|| {
        SelectorComponent::Attribute(AttributeSelector {
            name: content.to_ascii_lowercase(),
            matcher: None,
            case_insensitive,
        })
    })
}
