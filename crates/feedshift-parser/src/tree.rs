//! A small ordered element tree read from and written back to XML with quick-xml.
//!
//! Text follows the usual element-tree split: `text` is the character data that
//! precedes the first child, `tail` is the character data that follows the
//! element's end tag inside its parent. CDATA sections are folded into the
//! surrounding text. Comments, processing instructions and doctypes are dropped.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::XmlError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
    pub tail: Option<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Leaf element carrying `text`; an empty string is stored as-is.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn push(&mut self, child: Element) -> &mut Self {
        self.children.push(child);
        self
    }

    pub fn push_text(&mut self, name: &str, text: impl Into<String>) -> &mut Self {
        self.push(Element::with_text(name, text))
    }

    pub fn first_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|child| child.name.as_str()).collect()
    }

    fn append_character_data(&mut self, data: &str) {
        let slot = match self.children.last_mut() {
            Some(last) => &mut last.tail,
            None => &mut self.text,
        };
        slot.get_or_insert_with(String::new).push_str(data);
    }

    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.as_deref().map_or(true, str::is_empty)
    }
}

fn malformed(reader: &Reader<&[u8]>, message: impl ToString) -> XmlError {
    XmlError::Malformed {
        position: reader.buffer_position() as u64,
        message: message.to_string(),
    }
}

fn start_element(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Element, XmlError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| malformed(reader, err))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| malformed(reader, err))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Parses `content` into its root element.
pub fn parse_document(content: &str) -> Result<Element, XmlError> {
    let mut reader = Reader::from_str(content);
    let mut open: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|err| malformed(&reader, err))?;
        let finished = match event {
            Event::Start(start) => {
                if root.is_some() && open.is_empty() {
                    return Err(malformed(&reader, "content after the root element"));
                }
                open.push(start_element(&reader, &start)?);
                None
            }
            Event::Empty(start) => {
                if root.is_some() && open.is_empty() {
                    return Err(malformed(&reader, "content after the root element"));
                }
                Some(start_element(&reader, &start)?)
            }
            Event::End(_) => {
                // quick-xml has already matched the end tag against its start tag
                let element = open
                    .pop()
                    .ok_or_else(|| malformed(&reader, "unbalanced end tag"))?;
                Some(element)
            }
            Event::Text(text) => {
                let data = text.unescape().map_err(|err| malformed(&reader, err))?;
                if let Some(current) = open.last_mut() {
                    current.append_character_data(&data);
                }
                None
            }
            Event::CData(cdata) => {
                if let Some(current) = open.last_mut() {
                    current.append_character_data(&String::from_utf8_lossy(&cdata));
                }
                None
            }
            Event::Eof => break,
            _ => None,
        };

        if let Some(element) = finished {
            match open.last_mut() {
                Some(parent) => parent.children.push(element),
                None => root = Some(element),
            }
        }
    }

    if let Some(innermost) = open.last() {
        return Err(XmlError::UnexpectedEof {
            open: open.len(),
            innermost: innermost.name.clone(),
        });
    }

    root.ok_or(XmlError::MissingRoot)
}

fn write_err(err: impl ToString) -> XmlError {
    XmlError::Write(err.to_string())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), XmlError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(write_err)?;
    } else {
        writer.write_event(Event::Start(start)).map_err(write_err)?;
        if let Some(text) = element.text.as_deref().filter(|text| !text.is_empty()) {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_err)?;
        }
        for child in &element.children {
            write_element(writer, child)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(element.name.as_str())))
            .map_err(write_err)?;
    }

    if let Some(tail) = element.tail.as_deref().filter(|tail| !tail.is_empty()) {
        writer
            .write_event(Event::Text(BytesText::new(tail)))
            .map_err(write_err)?;
    }
    Ok(())
}

/// Renders `root` as a UTF-8 document with an XML declaration on its own line.
/// The root's own tail is not written.
pub fn write_document(root: &Element) -> Result<String, XmlError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(write_err)?;
    writer.get_mut().push(b'\n');

    let root = Element {
        tail: None,
        ..root.clone()
    };
    write_element(&mut writer, &root)?;

    String::from_utf8(writer.into_inner()).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_tail_are_split_around_children() {
        let root = parse_document("<a>lead<b>inner</b>after<c/>end</a>").expect("parse");
        assert_eq!(root.text.as_deref(), Some("lead"));
        assert_eq!(root.child_names(), vec!["b", "c"]);
        assert_eq!(root.children[0].text.as_deref(), Some("inner"));
        assert_eq!(root.children[0].tail.as_deref(), Some("after"));
        assert_eq!(root.children[1].text, None);
        assert_eq!(root.children[1].tail.as_deref(), Some("end"));
    }

    #[test]
    fn cdata_is_folded_into_text() {
        let root = parse_document("<a>x <![CDATA[<b>bold</b>]]> y</a>").expect("parse");
        assert_eq!(root.text.as_deref(), Some("x <b>bold</b> y"));
    }

    #[test]
    fn entities_are_unescaped() {
        let root = parse_document(r#"<a k="1 &amp; 2">&lt;tag&gt;</a>"#).expect("parse");
        assert_eq!(root.attributes, vec![("k".to_string(), "1 & 2".to_string())]);
        assert_eq!(root.text.as_deref(), Some("<tag>"));
    }

    #[test]
    fn rejects_unclosed_and_empty_documents() {
        assert!(parse_document("<a><b>").is_err());
        assert!(matches!(parse_document("   "), Err(XmlError::MissingRoot)));
        assert!(parse_document("<a></b>").is_err());
        assert!(parse_document("<a/><b/>").is_err());
    }

    #[test]
    fn writes_declaration_and_self_closes_empty_elements() {
        let mut root = Element::new("products");
        root.push_text("empty", "");
        root.push_text("full", "a & b");
        let xml = write_document(&root).expect("write");
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<products><empty/><full>a &amp; b</full></products>"
        );
    }

    #[test]
    fn written_document_parses_back_to_the_same_tree() {
        let source = r#"<root><script type="text/javascript">var x = 1;</script>
<item id="7">one<sub>two</sub>three</item></root>"#;
        let parsed = parse_document(source).expect("parse");
        let reparsed = parse_document(&write_document(&parsed).expect("write")).expect("reparse");
        assert_eq!(parsed, reparsed);
    }
}
