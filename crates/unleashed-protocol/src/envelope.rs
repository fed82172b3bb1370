//! Request and response envelopes.
//!
//! Every call to the controller is wrapped in an `ajax-request` element and
//! answered with an `ajax-response`:
//!
//! ```text
//! <ajax-request action="getconf" DECRYPT_X="true" updater="" comp="wlansvc-list">
//!   ...payload...
//! </ajax-request>
//!
//! <ajax-response>
//!   <response type="object" id="wlansvc-list.0.5">
//!     <xmsg .../>?  ...payload...
//!   </response>
//! </ajax-response>
//! ```
//!
//! The payload slot is raw XML: requests splice a serialized value in
//! verbatim, and responses keep the exact inner bytes of `response` so a
//! typed decode can happen later, once the error channel has been checked.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::EnvelopeError;

const REQUEST_ROOT: &str = "ajax-request";
const RESPONSE_ROOT: &[u8] = b"ajax-response";
const RESPONSE_ELEMENT: &[u8] = b"response";
const XMSG_ELEMENT: &[u8] = b"xmsg";

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Actions accepted by the configuration endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfAction {
    GetConf,
    SetConf,
    AddObj,
    UpdObj,
    DelObj,
}

impl ConfAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetConf => "getconf",
            Self::SetConf => "setconf",
            Self::AddObj => "addobj",
            Self::UpdObj => "updobj",
            Self::DelObj => "delobj",
        }
    }
}

/// Which endpoint an envelope belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// Configuration objects (`/admin/_conf.jsp`).
    Conf,
    /// Live statistics (`/admin/_cmdstat.jsp`, `getstat`).
    Stat,
    /// Imperative device commands (`/admin/_cmdstat.jsp`, `docmd`).
    Command,
}

// ---------------------------------------------------------------------------
// RequestEnvelope
// ---------------------------------------------------------------------------

/// An outbound `ajax-request`.
///
/// Built with one of the kind constructors and optionally given a payload:
///
/// ```rust
/// use unleashed_protocol::{ConfAction, RequestEnvelope};
///
/// let envelope = RequestEnvelope::conf(ConfAction::GetConf, "wlansvc-list")
///     .decrypt(true);
/// let bytes = envelope.encode().unwrap();
/// assert!(bytes.starts_with(b"<ajax-request action=\"getconf\" DECRYPT_X=\"true\""));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    kind: EnvelopeKind,
    action: &'static str,
    comp: String,
    decrypt: bool,
    /// Kind-specific attributes written between `action` and `updater`.
    extra: Vec<(&'static str, String)>,
    payload: Vec<u8>,
}

impl RequestEnvelope {
    /// A configuration request for component `comp`.
    pub fn conf(action: ConfAction, comp: impl Into<String>) -> Self {
        Self::new(EnvelopeKind::Conf, action.as_str(), comp.into(), Vec::new())
    }

    /// A `getstat` statistics request for component `comp`.
    pub fn stat(comp: impl Into<String>) -> Self {
        Self::new(
            EnvelopeKind::Stat,
            "getstat",
            comp.into(),
            vec![("caller", String::new())],
        )
    }

    /// A `docmd` command request addressed to component `comp`.
    pub fn command(comp: impl Into<String>) -> Self {
        let comp = comp.into();
        let extra = vec![("xcmd", comp.clone())];
        Self::new(EnvelopeKind::Command, "docmd", comp, extra)
    }

    fn new(
        kind: EnvelopeKind,
        action: &'static str,
        comp: String,
        extra: Vec<(&'static str, String)>,
    ) -> Self {
        Self {
            kind,
            action,
            comp,
            decrypt: false,
            extra,
            payload: Vec::new(),
        }
    }

    /// Asks the controller to return secrets (passphrases) in clear text.
    pub fn decrypt(mut self, decrypt: bool) -> Self {
        self.decrypt = decrypt;
        self
    }

    /// Serializes `value` into the payload slot.
    ///
    /// The value's serde name becomes the element name, so payload types
    /// carry `#[serde(rename = "...")]` for their wire element.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::Encode`] if quick-xml rejects the value.
    pub fn payload<T: Serialize>(
        mut self,
        value: &T,
    ) -> Result<Self, EnvelopeError> {
        let xml = quick_xml::se::to_string(value).map_err(EnvelopeError::encode)?;
        self.payload = xml.into_bytes();
        Ok(self)
    }

    /// Uses already-serialized XML as the payload.
    pub fn raw_payload(mut self, xml: impl Into<Vec<u8>>) -> Self {
        self.payload = xml.into();
        self
    }

    pub fn kind(&self) -> EnvelopeKind {
        self.kind
    }

    pub fn action(&self) -> &'static str {
        self.action
    }

    pub fn comp(&self) -> &str {
        &self.comp
    }

    /// Renders the envelope to bytes.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::Encode`] if the writer fails.
    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        let mut start = BytesStart::new(REQUEST_ROOT);
        start.push_attribute(("action", self.action));
        if self.decrypt {
            start.push_attribute(("DECRYPT_X", "true"));
        }
        for (key, value) in &self.extra {
            start.push_attribute((*key, value.as_str()));
        }
        start.push_attribute(("updater", ""));
        start.push_attribute(("comp", self.comp.as_str()));

        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Start(start))
            .map_err(EnvelopeError::encode)?;
        writer.get_mut().extend_from_slice(&self.payload);
        writer
            .write_event(Event::End(BytesEnd::new(REQUEST_ROOT)))
            .map_err(EnvelopeError::encode)?;
        Ok(writer.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Xmsg
// ---------------------------------------------------------------------------

/// A structured application error returned inside a 200 response.
#[derive(Debug, Clone, PartialEq, Eq, Default, thiserror::Error)]
#[error("xmsg error: {msg}: {lmsg}")]
pub struct Xmsg {
    /// Machine-readable error type (`type` attribute).
    pub kind: String,
    pub msg: String,
    pub name: String,
    /// Localized message.
    pub lmsg: String,
}

impl Xmsg {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, EnvelopeError> {
        let mut xmsg = Xmsg::default();
        for attr in start.attributes() {
            let attr = attr.map_err(EnvelopeError::decode)?;
            let value = attr.unescape_value().map_err(EnvelopeError::decode)?;
            match attr.key.as_ref() {
                b"type" => xmsg.kind = value.into_owned(),
                b"msg" => xmsg.msg = value.into_owned(),
                b"name" => xmsg.name = value.into_owned(),
                b"lmsg" => xmsg.lmsg = value.into_owned(),
                _ => {}
            }
        }
        Ok(xmsg)
    }
}

// ---------------------------------------------------------------------------
// ResponseEnvelope
// ---------------------------------------------------------------------------

/// A decoded `ajax-response` whose payload has not been interpreted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    /// The `type` attribute of `response`.
    pub kind: String,
    pub id: String,
    /// The structured error, if the controller sent one.
    pub error: Option<Xmsg>,
    /// Exact inner XML of the `response` element.
    pub raw: Vec<u8>,
}

impl ResponseEnvelope {
    /// Parses the outer envelope.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::Decode`] if the document is malformed or
    /// truncated, the root is not `ajax-response`, or there is no
    /// `response` element.
    pub fn decode(data: &[u8]) -> Result<Self, EnvelopeError> {
        let mut reader = Reader::from_reader(data);
        reader.config_mut().trim_text(true);
        reader.config_mut().check_end_names = true;

        // Find the root element.
        loop {
            match reader.read_event().map_err(EnvelopeError::decode)? {
                Event::Start(e) if e.local_name().as_ref() == RESPONSE_ROOT => {
                    break;
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(EnvelopeError::Decode(format!(
                        "unexpected root element <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    )));
                }
                Event::Eof => {
                    return Err(EnvelopeError::Decode("empty document".into()));
                }
                _ => {}
            }
        }

        // Find `response` among the root's children.
        loop {
            match reader.read_event().map_err(EnvelopeError::decode)? {
                Event::Start(e) if e.local_name().as_ref() == RESPONSE_ELEMENT => {
                    let (kind, id) = response_attributes(&e)?;
                    let span = reader
                        .read_to_end(e.name())
                        .map_err(EnvelopeError::decode)?;
                    let raw = data[span.start as usize..span.end as usize].to_vec();
                    let error = find_xmsg(&raw)?;
                    close_root(&mut reader)?;
                    return Ok(Self { kind, id, error, raw });
                }
                Event::Empty(e) if e.local_name().as_ref() == RESPONSE_ELEMENT => {
                    let (kind, id) = response_attributes(&e)?;
                    close_root(&mut reader)?;
                    return Ok(Self { kind, id, error: None, raw: Vec::new() });
                }
                Event::Start(e) => {
                    reader
                        .read_to_end(e.name())
                        .map_err(EnvelopeError::decode)?;
                }
                Event::End(_) | Event::Eof => {
                    return Err(EnvelopeError::Decode(
                        "missing response element".into(),
                    ));
                }
                _ => {}
            }
        }
    }

    /// Splits off the structured error.
    ///
    /// An `xmsg` wins over any payload that came with it.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::Application`] carrying the `xmsg` verbatim.
    pub fn into_result(self) -> Result<ConfResponse, EnvelopeError> {
        match self.error {
            Some(xmsg) => Err(EnvelopeError::Application(xmsg)),
            None => Ok(ConfResponse {
                kind: self.kind,
                id: self.id,
                raw: self.raw,
            }),
        }
    }
}

/// Skips the root's remaining children, then requires the root to close
/// with nothing but whitespace, comments or processing instructions after
/// it.
fn close_root(reader: &mut Reader<&[u8]>) -> Result<(), EnvelopeError> {
    loop {
        match reader.read_event().map_err(EnvelopeError::decode)? {
            Event::Start(e) => {
                reader
                    .read_to_end(e.name())
                    .map_err(EnvelopeError::decode)?;
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(EnvelopeError::Decode(
                    "unclosed <ajax-response>".into(),
                ));
            }
            _ => {}
        }
    }
    loop {
        match reader.read_event().map_err(EnvelopeError::decode)? {
            Event::Eof => return Ok(()),
            Event::Comment(_) | Event::PI(_) => {}
            Event::Text(t) if t.iter().all(u8::is_ascii_whitespace) => {}
            _ => {
                return Err(EnvelopeError::Decode(
                    "content after </ajax-response>".into(),
                ));
            }
        }
    }
}

fn response_attributes(
    start: &BytesStart<'_>,
) -> Result<(String, String), EnvelopeError> {
    let mut kind = String::new();
    let mut id = String::new();
    for attr in start.attributes() {
        let attr = attr.map_err(EnvelopeError::decode)?;
        match attr.key.as_ref() {
            b"type" => {
                kind = attr
                    .unescape_value()
                    .map_err(EnvelopeError::decode)?
                    .into_owned();
            }
            b"id" => {
                id = attr
                    .unescape_value()
                    .map_err(EnvelopeError::decode)?
                    .into_owned();
            }
            _ => {}
        }
    }
    Ok((kind, id))
}

/// Looks for an `xmsg` among the top-level elements of `raw`.
fn find_xmsg(raw: &[u8]) -> Result<Option<Xmsg>, EnvelopeError> {
    let mut reader = Reader::from_reader(raw);
    reader.config_mut().trim_text(true);
    loop {
        match reader.read_event().map_err(EnvelopeError::decode)? {
            Event::Empty(e) if e.local_name().as_ref() == XMSG_ELEMENT => {
                return Xmsg::from_start(&e).map(Some);
            }
            Event::Start(e) if e.local_name().as_ref() == XMSG_ELEMENT => {
                return Xmsg::from_start(&e).map(Some);
            }
            Event::Start(e) => {
                reader
                    .read_to_end(e.name())
                    .map_err(EnvelopeError::decode)?;
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn decode_payload<T: DeserializeOwned>(xml: &[u8]) -> Result<T, EnvelopeError> {
    let text = std::str::from_utf8(xml).map_err(EnvelopeError::decode)?;
    quick_xml::de::from_str(text).map_err(EnvelopeError::decode)
}

// ---------------------------------------------------------------------------
// ConfResponse
// ---------------------------------------------------------------------------

/// A configuration response that carried no error.
///
/// Dropping it is the no-content success; [`decode`](Self::decode) reads
/// it into a destination type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfResponse {
    pub kind: String,
    pub id: String,
    pub raw: Vec<u8>,
}

impl ConfResponse {
    /// Decodes the first element of the payload into `T`.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::Decode`] if the payload does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, EnvelopeError> {
        decode_payload(&self.raw)
    }
}

// ---------------------------------------------------------------------------
// StatResponse
// ---------------------------------------------------------------------------

/// A statistics response: the whole `response` element decoded as `T`.
///
/// Unlike configuration responses there is no error short-circuit; callers
/// inspect whatever status fields `T` carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatResponse<T> {
    pub kind: String,
    pub id: String,
    pub body: T,
}

impl<T: DeserializeOwned> StatResponse<T> {
    /// Parses the outer envelope and decodes the `response` element's
    /// children as the fields of `T`.
    ///
    /// # Errors
    /// Returns [`EnvelopeError::Decode`] for malformed envelopes or
    /// payloads that do not match `T`.
    pub fn decode(data: &[u8]) -> Result<Self, EnvelopeError> {
        let envelope = ResponseEnvelope::decode(data)?;
        let mut wrapped = Vec::with_capacity(envelope.raw.len() + 21);
        wrapped.extend_from_slice(b"<response>");
        wrapped.extend_from_slice(&envelope.raw);
        wrapped.extend_from_slice(b"</response>");
        Ok(Self {
            kind: envelope.kind,
            id: envelope.id,
            body: decode_payload(&wrapped)?,
        })
    }
}

/// Checks that `data` is a well-formed XML document.
///
/// Command responses echo an envelope whose shape is not relied on, so
/// this is all that is verified about them.
///
/// # Errors
/// Returns [`EnvelopeError::Decode`] if the document is malformed, is
/// truncated inside an element, or has no root element.
pub fn check_well_formed(data: &[u8]) -> Result<(), EnvelopeError> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().check_end_names = true;
    let mut seen_root = false;
    let mut depth = 0usize;
    loop {
        match reader.read_event().map_err(EnvelopeError::decode)? {
            Event::Start(_) => {
                seen_root = true;
                depth += 1;
            }
            Event::Empty(_) => seen_root = true,
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof if depth > 0 => {
                return Err(EnvelopeError::Decode(format!(
                    "document ends with {depth} unclosed element(s)"
                )));
            }
            Event::Eof if seen_root => return Ok(()),
            Event::Eof => {
                return Err(EnvelopeError::Decode("empty document".into()));
            }
            _ => {}
        }
    }
}
