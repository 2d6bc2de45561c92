// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parsing of AngelCode BMFont XML descriptors.
//!
//! Only the elements the cache needs are read: `info`, `common`, `char` and
//! `kerning`. The scanner understands plain element tags with quoted
//! attributes, which is all BMFont emits.

use porter_core::asset::{BitmapFontData, Glyph};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing a BMFont descriptor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FontParseError {
    /// A required element is absent.
    #[error("bitmap font is missing its <{0}> element")]
    MissingElement(&'static str),
    /// A required attribute is absent.
    #[error("<{element}> is missing attribute '{name}'")]
    MissingAttribute {
        /// Element name.
        element: &'static str,
        /// Attribute name.
        name: &'static str,
    },
    /// An attribute is not a number.
    #[error("<{element}> attribute '{name}' has invalid value '{value}'")]
    InvalidAttribute {
        /// Element name.
        element: &'static str,
        /// Attribute name.
        name: &'static str,
        /// The offending value.
        value: String,
    },
    /// A tag was never closed or an attribute value never terminated.
    #[error("malformed markup near '{0}'")]
    Malformed(String),
}

struct Tag<'a> {
    name: &'a str,
    attributes: Vec<(&'a str, &'a str)>,
}

impl<'a> Tag<'a> {
    fn get(&self, name: &str) -> Option<&'a str> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    fn number<T: FromStr>(&self, element: &'static str, name: &'static str) -> Result<T, FontParseError> {
        let value = self
            .get(name)
            .ok_or(FontParseError::MissingAttribute { element, name })?;
        value.trim().parse().map_err(|_| FontParseError::InvalidAttribute {
            element,
            name,
            value: value.to_string(),
        })
    }

    fn number_or<T: FromStr>(&self, element: &'static str, name: &'static str, default: T) -> Result<T, FontParseError> {
        match self.get(name) {
            Some(_) => self.number(element, name),
            None => Ok(default),
        }
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(24).collect()
}

fn scan_tags(xml: &str) -> Result<Vec<Tag<'_>>, FontParseError> {
    let mut tags = Vec::new();
    let mut rest = xml;

    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let end = after.find('>').ok_or_else(|| FontParseError::Malformed(snippet(after)))?;
        let body = &after[..end];
        rest = &after[end + 1..];

        // Declarations, comments and closing tags carry nothing we need.
        if body.starts_with(['?', '!', '/']) {
            continue;
        }
        let body = body.strip_suffix('/').unwrap_or(body);
        let (name, attrs) = body
            .split_once(char::is_whitespace)
            .unwrap_or((body, ""));
        tags.push(Tag {
            name,
            attributes: parse_attributes(attrs)?,
        });
    }
    Ok(tags)
}

fn parse_attributes(mut text: &str) -> Result<Vec<(&str, &str)>, FontParseError> {
    let mut attributes = Vec::new();
    loop {
        text = text.trim_start();
        if text.is_empty() {
            return Ok(attributes);
        }
        let (name, after) = text
            .split_once('=')
            .ok_or_else(|| FontParseError::Malformed(snippet(text)))?;
        let after = after.trim_start();
        let quote = after
            .chars()
            .next()
            .filter(|c| *c == '"' || *c == '\'')
            .ok_or_else(|| FontParseError::Malformed(snippet(after)))?;
        let value_and_rest = &after[1..];
        let close = value_and_rest
            .find(quote)
            .ok_or_else(|| FontParseError::Malformed(snippet(after)))?;
        attributes.push((name.trim(), &value_and_rest[..close]));
        text = &value_and_rest[close + 1..];
    }
}

/// Parses a BMFont XML document into glyph layout data.
///
/// # Errors
/// Fails if `<info>` or `<common>` is absent, if a required attribute is
/// missing or not numeric, or if the markup cannot be scanned.
pub fn parse_bitmap_font(xml: &str) -> Result<BitmapFontData, FontParseError> {
    let tags = scan_tags(xml)?;

    let info = tags
        .iter()
        .find(|t| t.name == "info")
        .ok_or(FontParseError::MissingElement("info"))?;
    let common = tags
        .iter()
        .find(|t| t.name == "common")
        .ok_or(FontParseError::MissingElement("common"))?;

    let mut chars = HashMap::new();
    let mut kernings = HashMap::new();
    for tag in &tags {
        match tag.name {
            "char" => {
                let id: u32 = tag.number("char", "id")?;
                chars.insert(
                    id,
                    Glyph {
                        x: tag.number("char", "x")?,
                        y: tag.number("char", "y")?,
                        width: tag.number("char", "width")?,
                        height: tag.number("char", "height")?,
                        x_offset: tag.number_or("char", "xoffset", 0)?,
                        y_offset: tag.number_or("char", "yoffset", 0)?,
                        x_advance: tag.number_or("char", "xadvance", 0)?,
                    },
                );
            }
            "kerning" => {
                let first = tag.number("kerning", "first")?;
                let second = tag.number("kerning", "second")?;
                kernings.insert((first, second), tag.number("kerning", "amount")?);
            }
            _ => {}
        }
    }

    Ok(BitmapFontData {
        font: info.get("face").unwrap_or_default().to_string(),
        size: info.number("info", "size")?,
        line_height: common.number("common", "lineHeight")?,
        chars,
        kernings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: &str = r#"<?xml version="1.0"?>
<font>
  <info face="Arial Black" size="32" bold="0"/>
  <common lineHeight="36" base="29" scaleW="256" scaleH="256" pages="1"/>
  <pages><page id="0" file="arial.png"/></pages>
  <!-- glyphs -->
  <chars count="2">
    <char id="65" x="2" y="4" width="20" height="24" xoffset="-1" yoffset="5" xadvance="21" page="0"/>
    <char id='66' x='24' y='4' width='18' height='24'/>
  </chars>
  <kernings count="1">
    <kerning first="65" second="66" amount="-2"/>
  </kernings>
</font>"#;

    #[test]
    fn test_parses_layout() {
        let font = parse_bitmap_font(FONT).unwrap();
        assert_eq!(font.font, "Arial Black");
        assert_eq!(font.size, 32);
        assert_eq!(font.line_height, 36);
        assert_eq!(font.chars.len(), 2);

        let a = font.chars[&65];
        assert_eq!((a.x, a.y, a.width, a.height), (2, 4, 20, 24));
        assert_eq!((a.x_offset, a.y_offset, a.x_advance), (-1, 5, 21));
        assert_eq!(font.chars[&66].x_advance, 0);
        assert_eq!(font.kerning(65, 66), -2);
        assert_eq!(font.kerning(66, 65), 0);
    }

    #[test]
    fn test_missing_common_is_an_error() {
        assert_eq!(
            parse_bitmap_font(r#"<font><info size="8"/></font>"#),
            Err(FontParseError::MissingElement("common"))
        );
    }

    #[test]
    fn test_bad_numbers_are_reported() {
        let xml = r#"<font><info size="8"/><common lineHeight="9"/><char id="x" x="0" y="0" width="1" height="1"/></font>"#;
        assert_eq!(
            parse_bitmap_font(xml),
            Err(FontParseError::InvalidAttribute {
                element: "char",
                name: "id",
                value: "x".into()
            })
        );
    }

    #[test]
    fn test_unterminated_markup() {
        assert!(matches!(
            parse_bitmap_font(r#"<font><info size="8"#),
            Err(FontParseError::Malformed(_))
        ));
    }
}
