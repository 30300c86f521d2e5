//! Writer for the XML properties schema.

use std::io::{self, Write};

use crate::encoding::Encoding;

pub(crate) const DOCTYPE: &str =
    r#"<!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">"#;

/// Escape character data. In attribute values `"` and literal whitespace
/// that XML would normalize are escaped as well.
fn escape_xml(s: &str, encoding: Encoding, in_attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\t' | '\n' if in_attribute => {
                out.push_str(&format!("&#{};", u32::from(c)));
            }
            '\r' => out.push_str("&#13;"),
            c if (c < ' ' && c != '\t' && c != '\n') || !encoding.can_encode(c) => {
                out.push_str(&format!("&#{};", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out
}

/// Serialize `entries` as an XML properties document.
///
/// `label` is written verbatim into the XML declaration; `encoding` is what
/// it resolved to.
pub(crate) fn write_xml<'a, W, I>(
    out: &mut W,
    entries: I,
    comment: Option<&str>,
    label: &str,
    encoding: Encoding,
) -> io::Result<()>
where
    W: Write + ?Sized,
    I: Iterator<Item = (&'a str, &'a str)>,
{
    let mut doc = String::new();
    doc.push_str(&format!(
        "<?xml version=\"1.0\" encoding=\"{}\" standalone=\"no\"?>\n",
        escape_xml(label, Encoding::Ascii, true)
    ));
    doc.push_str(DOCTYPE);
    doc.push('\n');
    doc.push_str("<properties>\n");
    if let Some(comment) = comment {
        doc.push_str(&format!(
            "<comment>{}</comment>\n",
            escape_xml(comment, encoding, false)
        ));
    }
    for (key, value) in entries {
        doc.push_str(&format!(
            "<entry key=\"{}\">{}</entry>\n",
            escape_xml(key, encoding, true),
            escape_xml(value, encoding, false)
        ));
    }
    doc.push_str("</properties>\n");

    out.write_all(&encoding.encode(&doc))?;
    out.flush()
}
