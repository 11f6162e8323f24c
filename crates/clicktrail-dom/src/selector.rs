//! A small CSS selector subset.
//!
//! Supported: type (`button`, `*`), `#id`, `.class`, `[attr]`, `[attr=value]`
//! compounds, joined by the descendant combinator (whitespace). Selector
//! lists, other combinators and pseudo-classes are rejected.

use crate::Element;

/// Selector parse errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected character '{found}' at offset {offset} in selector")]
    Unexpected { found: char, offset: usize },

    #[error("unterminated attribute selector")]
    UnterminatedAttribute,

    #[error("expected a name at offset {0} in selector")]
    ExpectedName(usize),
}

/// One attribute condition.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    value: Option<String>,
}

/// A compound selector: every condition applies to the same element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrCondition>,
}

impl Compound {
    fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if tag != element.tag_name() {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attributes.iter().all(|cond| match &cond.value {
            None => element.has_attribute(&cond.name),
            Some(expected) => element.attribute(&cond.name).as_deref() == Some(expected.as_str()),
        })
    }
}

/// A parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    // Outermost ancestor first, subject last.
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut compounds = Vec::new();
        let mut offset = 0;

        for part in input.split_whitespace() {
            let start = input[offset..].find(part).map_or(offset, |i| offset + i);
            compounds.push(parse_compound(part, start)?);
            offset = start + part.len();
        }

        if compounds.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { compounds })
    }

    /// Match `element`, consulting `ancestors` (nearest first) for
    /// descendant combinators.
    pub fn matches<'a, I>(&self, element: &Element, ancestors: I) -> bool
    where
        I: IntoIterator<Item = &'a Element>,
    {
        let (subject, rest) = match self.compounds.split_last() {
            Some(split) => split,
            None => return false,
        };
        if !subject.matches(element) {
            return false;
        }

        // Greedy right-to-left: each remaining compound must match some
        // ancestor further out than the previous match.
        let mut pending = rest.iter().rev().peekable();
        for ancestor in ancestors {
            match pending.peek() {
                Some(compound) if compound.matches(ancestor) => {
                    pending.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        pending.peek().is_none()
    }

    /// Whether the selector uses a descendant combinator.
    pub fn has_ancestors(&self) -> bool {
        self.compounds.len() > 1
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_name(chars: &[(usize, char)], pos: &mut usize, base: usize) -> Result<String, SelectorError> {
    let start = *pos;
    while *pos < chars.len() && is_name_char(chars[*pos].1) {
        *pos += 1;
    }
    if *pos == start {
        let offset = chars.get(start).map_or(base, |(i, _)| base + i);
        return Err(SelectorError::ExpectedName(offset));
    }
    Ok(chars[start..*pos].iter().map(|(_, c)| *c).collect())
}

fn parse_compound(part: &str, base: usize) -> Result<Compound, SelectorError> {
    let chars: Vec<(usize, char)> = part.char_indices().collect();
    let mut compound = Compound::default();
    let mut pos = 0;

    if let Some((_, c)) = chars.first() {
        if *c == '*' {
            pos = 1;
        } else if c.is_ascii_alphabetic() {
            compound.tag = Some(read_name(&chars, &mut pos, base)?.to_ascii_lowercase());
        }
    }

    while pos < chars.len() {
        let (offset, c) = chars[pos];
        pos += 1;
        match c {
            '#' => compound.id = Some(read_name(&chars, &mut pos, base)?),
            '.' => compound.classes.push(read_name(&chars, &mut pos, base)?),
            '[' => {
                let close = chars[pos..]
                    .iter()
                    .position(|(_, c)| *c == ']')
                    .ok_or(SelectorError::UnterminatedAttribute)?;
                let body: String = chars[pos..pos + close].iter().map(|(_, c)| *c).collect();
                pos += close + 1;
                compound.attributes.push(parse_attribute(&body, base + offset)?);
            }
            found => {
                return Err(SelectorError::Unexpected {
                    found,
                    offset: base + offset,
                })
            }
        }
    }

    Ok(compound)
}

fn parse_attribute(body: &str, offset: usize) -> Result<AttrCondition, SelectorError> {
    let (name, value) = match body.split_once('=') {
        Some((name, value)) => {
            let value = value.trim();
            let unquoted = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            (name.trim(), Some(unquoted.to_string()))
        }
        None => (body.trim(), None),
    };

    if name.is_empty() || !name.chars().all(is_name_char) {
        return Err(SelectorError::ExpectedName(offset + 1));
    }

    Ok(AttrCondition {
        name: name.to_ascii_lowercase(),
        value,
    })
}
