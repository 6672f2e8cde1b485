//! Codec trait and the XML implementation.
//!
//! A codec converts a [`MatchState`] into one line of text and back. The
//! match never names a concrete format: it holds some `C: Codec` and calls
//! `encode`/`decode`. [`XmlCodec`] is the format real clients speak.

use crate::{MatchState, ProtocolError};

/// Converts records to and from wire text.
///
/// `Send + Sync + 'static` because the codec lives inside the match actor
/// task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a record into a single line (no trailing newline).
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the record cannot be represented,
    /// for example a position outside `0..=8`.
    fn encode(&self, state: &MatchState) -> Result<String, ProtocolError>;

    /// Parses one line into a record.
    ///
    /// # Errors
    /// `ProtocolError::Malformed` for broken markup, `ProtocolError::Schema`
    /// for a well-formed document that is not a record.
    fn decode(&self, text: &str) -> Result<MatchState, ProtocolError>;
}

// ---------------------------------------------------------------------------
// XmlCodec
// ---------------------------------------------------------------------------

#[cfg(feature = "xml")]
pub use xml::XmlCodec;

#[cfg(feature = "xml")]
mod xml {
    use quick_xml::Reader;
    use quick_xml::Writer;
    use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

    use super::Codec;
    use crate::schema::{self, Element};
    use crate::{MatchState, ProtocolError};

    /// A [`Codec`] producing one-line XML documents:
    ///
    /// ```text
    /// <?xml version="1.0" encoding="UTF-8"?><JogoDaVelha><id>X</id><status>jogue</status><jogada/><tabuleiro><p0>X</p0><p1/>...<p8/></tabuleiro></JogoDaVelha>
    /// ```
    ///
    /// Decoding accepts the document with or without the declaration,
    /// children in any order, and marks or status tokens in any case.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use velha_engine::{Board, Mark};
    /// use velha_protocol::{Codec, MatchState, MatchStatus, XmlCodec};
    ///
    /// let codec = XmlCodec;
    /// let state = MatchState::new(Mark::O, MatchStatus::Waiting, Board::new());
    ///
    /// let line = codec.encode(&state).unwrap();
    /// assert!(!line.contains('\n'));
    /// assert_eq!(codec.decode(&line).unwrap(), state);
    /// ```
    #[derive(Debug, Clone, Copy, Default)]
    pub struct XmlCodec;

    impl Codec for XmlCodec {
        fn encode(&self, state: &MatchState) -> Result<String, ProtocolError> {
            let tree = schema::from_state(state);
            // Same schema as decode; a failure here means the record itself
            // is out of range.
            schema::validate(&tree).map_err(|e| ProtocolError::Encode(e.to_string()))?;
            write_document(&tree)
        }

        fn decode(&self, text: &str) -> Result<MatchState, ProtocolError> {
            let tree = read_document(text)?;
            schema::to_state(&tree)
        }
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// Parses `text` into an element tree with exactly one root.
    fn read_document(text: &str) -> Result<Element, ProtocolError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        // Open elements, innermost last.
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(malformed)?;
            match event {
                Event::Decl(_) => {
                    if root.is_some() || !open.is_empty() {
                        return Err(ProtocolError::Malformed(
                            "declaration after the root element".into(),
                        ));
                    }
                }
                Event::Start(start) => {
                    open.push(start_element(&start, &root)?);
                }
                Event::Empty(start) => {
                    let element = start_element(&start, &root)?;
                    close_element(element, &mut open, &mut root);
                }
                Event::End(_) => {
                    // Matching end names are checked by the reader.
                    let element = open
                        .pop()
                        .ok_or_else(|| ProtocolError::Malformed("unbalanced end tag".into()))?;
                    close_element(element, &mut open, &mut root);
                }
                Event::Text(content) => {
                    let content = content.unescape().map_err(malformed)?;
                    append_text(&content, &mut open)?;
                }
                Event::CData(content) => {
                    let content = String::from_utf8(content.into_inner().into_owned())
                        .map_err(malformed)?;
                    append_text(&content, &mut open)?;
                }
                Event::Comment(_) | Event::PI(_) => {}
                Event::DocType(_) => {
                    return Err(ProtocolError::Malformed("doctype is not allowed".into()));
                }
                Event::Eof => break,
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(ProtocolError::Malformed(format!(
                "<{}> is never closed",
                unclosed.name
            )));
        }
        root.ok_or_else(|| ProtocolError::Malformed("empty document".into()))
    }

    fn start_element(start: &BytesStart<'_>, root: &Option<Element>) -> Result<Element, ProtocolError> {
        if root.is_some() {
            return Err(ProtocolError::Malformed(
                "content after the root element".into(),
            ));
        }
        if start.attributes().next().is_some() {
            return Err(ProtocolError::Schema(format!(
                "<{}> must not carry attributes",
                String::from_utf8_lossy(start.name().as_ref())
            )));
        }
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(malformed)?
            .to_owned();
        Ok(Element::new(name))
    }

    /// Attaches a finished element to its parent, or makes it the root.
    fn close_element(element: Element, open: &mut [Element], root: &mut Option<Element>) {
        match open.last_mut() {
            Some(parent) => parent.children.push(element),
            None => *root = Some(element),
        }
    }

    fn append_text(content: &str, open: &mut [Element]) -> Result<(), ProtocolError> {
        match open.last_mut() {
            Some(element) => {
                element.text.push_str(content);
                Ok(())
            }
            None if content.trim().is_empty() => Ok(()),
            None => Err(ProtocolError::Malformed(
                "text outside the root element".into(),
            )),
        }
    }

    fn malformed(err: impl std::fmt::Display) -> ProtocolError {
        ProtocolError::Malformed(err.to_string())
    }

    // -----------------------------------------------------------------------
    // Writing
    // -----------------------------------------------------------------------

    fn write_document(root: &Element) -> Result<String, ProtocolError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(encode_failed)?;
        write_element(&mut writer, root)?;
        String::from_utf8(writer.into_inner()).map_err(encode_failed)
    }

    fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), ProtocolError> {
        let name = element.name.as_str();
        if element.text.is_empty() && element.children.is_empty() {
            return writer
                .write_event(Event::Empty(BytesStart::new(name)))
                .map_err(encode_failed);
        }

        writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(encode_failed)?;
        if !element.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&element.text)))
                .map_err(encode_failed)?;
        }
        for child in &element.children {
            write_element(writer, child)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(encode_failed)
    }

    fn encode_failed(err: impl std::fmt::Display) -> ProtocolError {
        ProtocolError::Encode(err.to_string())
    }

}
