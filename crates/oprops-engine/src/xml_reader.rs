//! Reader for the XML properties schema.
//!
//! Accepts the subset of XML the schema needs: the XML declaration, a
//! `properties` DOCTYPE, comments, processing instructions, character and
//! predefined entity references, and CDATA sections inside `<comment>` and
//! `<entry>`. Entries are put into the sink as soon as each `<entry>` closes.

use tracing::trace;

use crate::encoding::{decode_latin1, Encoding};
use crate::error::{EngineError, Result};
use crate::storage::PropertySink;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

struct StartTag<'a> {
    name: &'a str,
    attrs: Vec<(&'a str, String)>,
    empty: bool,
}

impl StartTag<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, reason: impl Into<String>) -> EngineError {
        EngineError::Xml {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn expect(&mut self, s: &str) -> Result<()> {
        if !self.starts_with(s) {
            return Err(self.error(format!("expected {s:?}")));
        }
        self.pos += s.len();
        Ok(())
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(' ' | '\t' | '\n')) {
            self.pos += 1;
        }
        self.pos > start
    }

    /// Advance past `terminator`, returning the text before it.
    fn take_until(&mut self, terminator: &str, what: &str) -> Result<&'a str> {
        match self.rest().find(terminator) {
            Some(i) => {
                let text = &self.rest()[..i];
                self.pos += i + terminator.len();
                Ok(text)
            }
            None => Err(self.error(format!("unterminated {what}"))),
        }
    }

    /// Skip whitespace, comments and processing instructions.
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<!--") {
                self.pos += 4;
                self.take_until("-->", "comment")?;
            } else if self.starts_with("<?") {
                self.pos += 2;
                self.take_until("?>", "processing instruction")?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_name(&mut self) -> Result<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
            _ => return Err(self.error("expected a name")),
        }
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        Ok(&self.src[start..self.pos])
    }

    fn parse_doctype(&mut self) -> Result<()> {
        self.expect("<!DOCTYPE")?;
        if !self.skip_whitespace() {
            return Err(self.error("expected whitespace after <!DOCTYPE"));
        }
        let name = self.parse_name()?;
        if name != "properties" {
            return Err(self.error(format!("DOCTYPE names {name:?}, expected \"properties\"")));
        }
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated DOCTYPE")),
                Some('>') => return Ok(()),
                Some(q @ ('"' | '\'')) => {
                    self.take_until(&q.to_string(), "DOCTYPE literal")?;
                }
                Some('[') => self.skip_internal_subset()?,
                Some(_) => {}
            }
        }
    }

    fn skip_internal_subset(&mut self) -> Result<()> {
        loop {
            if self.starts_with("<!--") {
                self.pos += 4;
                self.take_until("-->", "comment")?;
                continue;
            }
            match self.bump() {
                None => return Err(self.error("unterminated DOCTYPE internal subset")),
                Some(']') => return Ok(()),
                Some(q @ ('"' | '\'')) => {
                    self.take_until(&q.to_string(), "DOCTYPE literal")?;
                }
                Some(_) => {}
            }
        }
    }

    /// Resolve the reference starting at `&` and append it to `out`.
    fn parse_reference(&mut self, out: &mut String) -> Result<()> {
        self.expect("&")?;
        let body = match self.rest().find(';') {
            Some(i) => &self.rest()[..i],
            None => return Err(self.error("unterminated entity reference")),
        };
        let resolved = match body {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => {
                let (digits, radix) = match body.strip_prefix("#x") {
                    Some(hex) => (hex, 16),
                    None => match body.strip_prefix('#') {
                        Some(dec) => (dec, 10),
                        None => {
                            return Err(self.error(format!("unknown entity &{body};")));
                        }
                    },
                };
                if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                    return Err(self.error(format!("malformed character reference &{body};")));
                }
                u32::from_str_radix(digits, radix)
                    .ok()
                    .and_then(char::from_u32)
            }
        };
        match resolved {
            Some(c) => {
                out.push(c);
                self.pos += body.len() + 1;
                Ok(())
            }
            None => Err(self.error(format!("invalid character reference &{body};"))),
        }
    }

    fn parse_attr_value(&mut self) -> Result<String> {
        let quote = match self.bump() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected a quoted attribute value")),
        };
        let mut value = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated attribute value")),
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some('<') => return Err(self.error("'<' not allowed in attribute value")),
                Some('&') => self.parse_reference(&mut value)?,
                Some(c) => {
                    self.pos += c.len_utf8();
                    value.push(if c == '\t' || c == '\n' { ' ' } else { c });
                }
            }
        }
    }

    /// Parse a start tag beginning at `<`.
    fn parse_start_tag(&mut self) -> Result<StartTag<'a>> {
        self.expect("<")?;
        let name = self.parse_name()?;
        let mut attrs: Vec<(&'a str, String)> = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            if self.starts_with("/>") {
                self.pos += 2;
                return Ok(StartTag {
                    name,
                    attrs,
                    empty: true,
                });
            }
            if self.starts_with(">") {
                self.pos += 1;
                return Ok(StartTag {
                    name,
                    attrs,
                    empty: false,
                });
            }
            if self.at_end() {
                return Err(self.error(format!("unterminated start tag <{name}>")));
            }
            if !had_space {
                return Err(self.error("expected whitespace between attributes"));
            }
            let attr = self.parse_name()?;
            self.skip_whitespace();
            self.expect("=")?;
            self.skip_whitespace();
            let value = self.parse_attr_value()?;
            if attrs.iter().any(|(n, _)| *n == attr) {
                return Err(self.error(format!("duplicate attribute {attr:?} on <{name}>")));
            }
            attrs.push((attr, value));
        }
    }

    fn parse_end_tag(&mut self, element: &str) -> Result<()> {
        self.expect("</")?;
        let name = self.parse_name()?;
        if name != element {
            return Err(self.error(format!("expected </{element}>, found </{name}>")));
        }
        self.skip_whitespace();
        self.expect(">")
    }

    /// Read the character content of a text-only element up to its end tag.
    fn parse_text_content(&mut self, tag: &StartTag<'_>) -> Result<String> {
        let mut text = String::new();
        if tag.empty {
            return Ok(text);
        }
        loop {
            if self.at_end() {
                return Err(self.error(format!("unexpected end of document inside <{}>", tag.name)));
            }
            if self.starts_with("<!--") {
                self.pos += 4;
                self.take_until("-->", "comment")?;
            } else if self.starts_with("<![CDATA[") {
                self.pos += 9;
                text.push_str(self.take_until("]]>", "CDATA section")?);
            } else if self.starts_with("<?") {
                self.pos += 2;
                self.take_until("?>", "processing instruction")?;
            } else if self.starts_with("</") {
                self.parse_end_tag(tag.name)?;
                return Ok(text);
            } else if self.starts_with("<") {
                return Err(self.error(format!("elements are not allowed inside <{}>", tag.name)));
            } else if self.starts_with("&") {
                self.parse_reference(&mut text)?;
            } else if let Some(c) = self.bump() {
                text.push(c);
            }
        }
    }

    fn check_attrs(&self, tag: &StartTag<'_>, allowed: &[&str]) -> Result<()> {
        match tag.attrs.iter().find(|(n, _)| !allowed.contains(n)) {
            Some((n, _)) => Err(self.error(format!("attribute {n:?} not allowed on <{}>", tag.name))),
            None => Ok(()),
        }
    }

    fn parse_properties<S: PropertySink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let root = self.parse_start_tag()?;
        if root.name != "properties" {
            return Err(self.error(format!("root element is <{}>, expected <properties>", root.name)));
        }
        self.check_attrs(&root, &["version"])?;

        let mut count = 0;
        let mut seen_child = false;
        if !root.empty {
            loop {
                self.skip_misc()?;
                if self.at_end() {
                    return Err(self.error("unexpected end of document inside <properties>"));
                }
                if self.starts_with("</") {
                    self.parse_end_tag("properties")?;
                    break;
                }
                if !self.starts_with("<") || self.starts_with("<!") {
                    return Err(self.error("character data is not allowed inside <properties>"));
                }
                let tag = self.parse_start_tag()?;
                match tag.name {
                    "comment" => {
                        if seen_child {
                            return Err(self.error("<comment> must be the first child of <properties>"));
                        }
                        self.check_attrs(&tag, &[])?;
                        self.parse_text_content(&tag)?;
                    }
                    "entry" => {
                        self.check_attrs(&tag, &["key"])?;
                        let key = tag
                            .attr("key")
                            .ok_or_else(|| self.error("<entry> requires a key attribute"))?
                            .to_string();
                        let value = self.parse_text_content(&tag)?;
                        trace!(key = %key, "property read");
                        sink.put_property(key, value);
                        count += 1;
                    }
                    other => {
                        return Err(self.error(format!("element <{other}> is not allowed inside <properties>")));
                    }
                }
                seen_child = true;
            }
        }

        self.skip_misc()?;
        if !self.at_end() {
            return Err(self.error("content after the root element"));
        }
        Ok(count)
    }
}

/// Value of a pseudo-attribute in the XML declaration.
fn pseudo_attribute(decl: &str, name: &str) -> Option<String> {
    let idx = decl.find(name)?;
    let rest = decl[idx + name.len()..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &rest[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

fn declared_encoding(bytes: &[u8]) -> Result<Encoding> {
    if !bytes.starts_with(b"<?xml") {
        return Ok(Encoding::Utf8);
    }
    let Some(end) = bytes.windows(2).position(|w| w == b"?>") else {
        return Ok(Encoding::Utf8);
    };
    match pseudo_attribute(&decode_latin1(&bytes[..end]), "encoding") {
        Some(label) => Encoding::from_label(&label),
        None => Ok(Encoding::Utf8),
    }
}

/// Parse an XML properties document and put its entries into `sink` in
/// document order.
pub(crate) fn read_xml<S: PropertySink + ?Sized>(bytes: &[u8], sink: &mut S) -> Result<usize> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let encoding = declared_encoding(bytes)?;
    let text = encoding
        .decode(bytes)
        .map_err(|reason| EngineError::Xml { offset: 0, reason })?;
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut parser = Parser::new(&text);
    if parser.starts_with("<?xml") {
        parser.pos += 5;
        parser.take_until("?>", "XML declaration")?;
    }
    parser.skip_misc()?;
    if parser.starts_with("<!DOCTYPE") {
        parser.parse_doctype()?;
        parser.skip_misc()?;
    }
    if parser.at_end() {
        return Err(parser.error("missing root element"));
    }
    parser.parse_properties(sink)
}
