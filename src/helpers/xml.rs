//! XML utilities for SpreadsheetML packages.
//! Escaping for the package writer, plus a reader wrapper and helper traits for read-back.

use crate::error::TableSheetError;
use quick_xml::escape::escape;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),
}

/// Escapes text for use as element content or a double-quoted attribute value.
///
/// Control characters other than tab, newline, and carriage return are not
/// allowed in XML 1.0 and are dropped.
pub(crate) fn escape_text(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_forbidden_char) {
        let cleaned = text.chars().filter(|c| !is_forbidden_char(*c)).collect::<String>();
        Cow::Owned(escape(cleaned.as_str()).into_owned())
    } else {
        escape(text)
    }
}

#[inline]
fn is_forbidden_char(character: char) -> bool {
    character.is_control() && !matches!(character, '\t' | '\n' | '\r')
}

/// XML reader wrapper configured for SpreadsheetML parts
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    /// Creates a new XML reader with the configuration used for package parts
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event from the reader
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, TableSheetError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(TableSheetError::XmlError(error)),
        }
    }
}

/// Helper trait for XML nodes providing attribute access
pub(crate) trait XmlNodeHelper<'a> {
    /// Gets an unescaped attribute value by name
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, TableSheetError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, TableSheetError> {
        match self.try_get_attribute(name)? {
            Some(attribute) => Ok(Some(attribute.unescape_value()?)),
            None => Ok(None),
        }
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends text content from a BytesRef event (entities and character references)
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), TableSheetError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), TableSheetError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = std::char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_markup_and_quotes() {
        assert_eq!(escape_text(r#"R&D <"net">"#), "R&amp;D &lt;&quot;net&quot;&gt;");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn escape_drops_control_characters() {
        assert_eq!(escape_text("a\u{0}b\u{b}c\td"), "abc\td");
    }

    #[test]
    fn reader_resolves_references() -> Result<(), TableSheetError> {
        let mut reader = XmlReader::new("<t a=\"x&amp;y\">A&amp;B&#x41;&#66;</t>".as_bytes());
        let mut text = String::new();
        let mut attribute = String::new();
        match_xml_events!(reader => {
            Event::Start(event) => {
                attribute = event.get_attribute_value("a")?.unwrap_or_default().to_string();
            }
            Event::Text(event) => text.push_str(&event.xml_content()?),
            Event::GeneralRef(event) => text.push_bytes_ref(&event)?,
        });
        assert_eq!(attribute, "x&y");
        assert_eq!(text, "A&BAB");
        Ok(())
    }
}
