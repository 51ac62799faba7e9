//! XML to JSON conversion for the `text/xml` / `application/xml` body branch.
//!
//! The conversion contract, fixed and tested here:
//!
//! - An element with child elements becomes an object keyed by child name;
//!   repeated child names collect into an array in document order.
//! - Attributes go under an `"@attributes"` object of string values.
//! - A text-only element without attributes becomes a string.
//! - An element with attributes and text but no children keeps its text
//!   under `"$value"`.
//! - An empty element without attributes becomes `{}`.
//! - Text interleaved between child elements is dropped.
//! - The root element's name is dropped; its converted value is the result.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};
use std::fmt;

/// Conversion failure: either the parser rejected the input or the document
/// shape is invalid (multiple roots, unclosed elements, stray text).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum XmlError {
    Parse(String),
    Structure(&'static str),
}

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlError::Parse(detail) => write!(f, "malformed XML body: {}", detail),
            XmlError::Structure(detail) => write!(f, "malformed XML body: {}", detail),
        }
    }
}

impl std::error::Error for XmlError {}

#[derive(Default)]
struct Element {
    attributes: Map<String, Value>,
    children: Vec<(String, Value)>,
    text: String,
}

impl Element {
    fn into_value(self) -> Value {
        let text = self.text.trim().to_owned();

        if self.children.is_empty() && self.attributes.is_empty() {
            return if text.is_empty() {
                Value::Object(Map::new())
            } else {
                Value::String(text)
            };
        }

        let mut object = Map::new();
        let children_empty = self.children.is_empty();

        if !self.attributes.is_empty() {
            object.insert("@attributes".to_string(), Value::Object(self.attributes));
        }
        if children_empty && !text.is_empty() {
            object.insert("$value".to_string(), Value::String(text));
        }

        for (name, value) in self.children {
            match object.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    object.insert(name, value);
                }
            }
        }

        Value::Object(object)
    }
}

fn open_element(start: &BytesStart<'_>) -> Result<(String, Element), XmlError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::default();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| XmlError::Parse(err.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| XmlError::Parse(err.to_string()))?
            .into_owned();
        element.attributes.insert(key, Value::String(value));
    }
    Ok((name, element))
}

fn close_element(
    stack: &mut Vec<(String, Element)>,
    root: &mut Option<Value>,
    name: String,
    value: Value,
) {
    if let Some((_, parent)) = stack.last_mut() {
        parent.children.push((name, value));
    } else {
        // Root element: its name is dropped, its value is the document.
        *root = Some(value);
    }
}

/// Convert an XML document into a JSON value.
pub(crate) fn to_value(input: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<(String, Element)> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(XmlError::Structure("multiple root elements"));
                }
                stack.push(open_element(&start)?);
            }
            Ok(Event::Empty(start)) => {
                if root.is_some() && stack.is_empty() {
                    return Err(XmlError::Structure("multiple root elements"));
                }
                let (name, element) = open_element(&start)?;
                close_element(&mut stack, &mut root, name, element.into_value());
            }
            Ok(Event::End(_)) => {
                let Some((name, element)) = stack.pop() else {
                    return Err(XmlError::Structure("unexpected closing tag"));
                };
                close_element(&mut stack, &mut root, name, element.into_value());
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|err| XmlError::Parse(err.to_string()))?;
                match stack.last_mut() {
                    Some((_, element)) => element.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => return Err(XmlError::Structure("text outside the root element")),
                }
            }
            Ok(Event::CData(cdata)) => {
                if let Some((_, element)) = stack.last_mut() {
                    element
                        .text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Ok(Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_)) => {}
            Ok(Event::Eof) => break,
            Err(err) => return Err(XmlError::Parse(err.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(XmlError::Structure("unclosed element"));
    }
    root.ok_or(XmlError::Structure("no root element"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_name_dropped() {
        let value = to_value("<pet><name>Rex</name></pet>").unwrap();
        assert_eq!(value, json!({"name": "Rex"}));
    }

    #[test]
    fn test_repeated_children_become_array() {
        let value = to_value("<pets><pet>Rex</pet><pet>Milo</pet><pet>Ada</pet></pets>").unwrap();
        assert_eq!(value, json!({"pet": ["Rex", "Milo", "Ada"]}));
    }

    #[test]
    fn test_attributes_grouped_under_marker_key() {
        let value = to_value(r#"<pet id="7"><name>Rex</name></pet>"#).unwrap();
        assert_eq!(value, json!({"@attributes": {"id": "7"}, "name": "Rex"}));
    }

    #[test]
    fn test_text_with_attributes_uses_value_key() {
        let value = to_value(r#"<note lang="en">hello</note>"#).unwrap();
        assert_eq!(
            value,
            json!({"@attributes": {"lang": "en"}, "$value": "hello"})
        );
    }

    #[test]
    fn test_empty_elements() {
        assert_eq!(to_value("<a/>").unwrap(), json!({}));
        assert_eq!(to_value("<a><b/></a>").unwrap(), json!({"b": {}}));
    }

    #[test]
    fn test_nested_structure() {
        let value = to_value(
            "<order><item><sku>a1</sku><qty>2</qty></item><item><sku>b2</sku><qty>1</qty></item></order>",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({"item": [{"sku": "a1", "qty": "2"}, {"sku": "b2", "qty": "1"}]})
        );
    }

    #[test]
    fn test_declaration_and_whitespace_ignored() {
        let value = to_value("<?xml version=\"1.0\"?>\n<a>\n  <b>1</b>\n</a>\n").unwrap();
        assert_eq!(value, json!({"b": "1"}));
    }

    #[test]
    fn test_malformed_input_rejected() {
        assert!(to_value("<a><b></a>").is_err());
        assert!(to_value("<a>").is_err());
        assert!(to_value("not xml at all").is_err());
        assert!(to_value("").is_err());
    }

    #[test]
    fn test_multiple_roots_rejected() {
        assert_eq!(
            to_value("<a/><b/>").unwrap_err(),
            XmlError::Structure("multiple root elements")
        );
    }
}
