use std::io::Write;

use mime::Mime;

use super::{
    body::Body,
    header::{self, encode_unstructured, Headers},
};

/// MIME part variants
#[derive(Debug, Clone)]
pub enum Part {
    /// Single part with content
    Single(SinglePart),

    /// Multiple parts of content
    Multi(MultiPart),
}

impl Part {
    /// Get the headers of this part
    pub fn headers(&self) -> &Headers {
        match self {
            Part::Single(part) => part.headers(),
            Part::Multi(part) => part.headers(),
        }
    }

    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        match self {
            Part::Single(part) => &mut part.headers,
            Part::Multi(part) => &mut part.headers,
        }
    }

    /// The parsed `Content-Type` header, if any
    pub fn content_type(&self) -> Option<Mime> {
        let content_type = self.headers().get(&header::CONTENT_TYPE)?;
        content_type.replace("\r\n", "").parse().ok()
    }

    /// The sub-parts of a multipart, or an empty slice for a single part
    pub fn parts(&self) -> &[Part] {
        match self {
            Part::Single(_) => &[],
            Part::Multi(part) => part.parts(),
        }
    }

    /// Get message content formatted for SMTP
    pub fn formatted(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.format(&mut out);
        out
    }

    /// Get message content formatted for SMTP, as a string.
    ///
    /// Every body is transfer-encoded, so the output is plain ASCII.
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.formatted()).into_owned()
    }

    fn format(&self, out: &mut Vec<u8>) {
        match self {
            Part::Single(part) => part.format(out),
            Part::Multi(part) => part.format(out),
        }
    }
}

impl From<SinglePart> for Part {
    fn from(part: SinglePart) -> Self {
        Part::Single(part)
    }
}

impl From<MultiPart> for Part {
    fn from(part: MultiPart) -> Self {
        Part::Multi(part)
    }
}

/// Single part
#[derive(Debug, Clone)]
pub struct SinglePart {
    headers: Headers,
    body: Vec<u8>,
}

impl SinglePart {
    pub(crate) fn new(content_type: &Mime, body: Body) -> Self {
        let mut headers = Headers::new();
        headers.set(header::CONTENT_TYPE, content_type.to_string());
        headers.set(header::CONTENT_TRANSFER_ENCODING, body.encoding().to_string());

        SinglePart {
            headers,
            body: body.into_vec(),
        }
    }

    /// Get the headers from singlepart
    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub(crate) fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Get the encoded body
    #[inline]
    pub fn raw_body(&self) -> &[u8] {
        &self.body
    }

    fn format(&self, out: &mut Vec<u8>) {
        write!(out, "{}", self.headers)
            .expect("A Write implementation panicked while formatting headers");
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out.extend_from_slice(b"\r\n");
    }
}

/// The kind of multipart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiPartKind {
    /// Mixed kind to combine unrelated content parts
    ///
    /// For example this kind can be used to mix email message and attachments.
    Mixed,

    /// Alternative kind to join several variants of same email contents.
    ///
    /// That kind is recommended to use for joining plain (text) and rich (HTML) messages into single email message.
    Alternative,
}

impl MultiPartKind {
    fn subtype(self) -> &'static str {
        match self {
            Self::Mixed => "mixed",
            Self::Alternative => "alternative",
        }
    }
}

/// Create a random MIME boundary.
fn make_boundary() -> String {
    std::iter::repeat_with(fastrand::alphanumeric)
        .take(40)
        .collect()
}

/// Multipart variant with parts
#[derive(Debug, Clone)]
pub struct MultiPart {
    headers: Headers,
    boundary: String,
    parts: Vec<Part>,
}

impl MultiPart {
    pub(crate) fn new(kind: MultiPartKind) -> Self {
        Self::with_boundary(kind, make_boundary())
    }

    pub(crate) fn with_boundary(kind: MultiPartKind, boundary: String) -> Self {
        let mut headers = Headers::new();
        headers.set(
            header::CONTENT_TYPE,
            encode_unstructured(
                &header::CONTENT_TYPE,
                &format!("multipart/{}; boundary=\"{}\"", kind.subtype(), boundary),
            ),
        );

        MultiPart {
            headers,
            boundary,
            parts: Vec::new(),
        }
    }

    /// Add a part to the multipart
    pub(crate) fn part<P: Into<Part>>(mut self, part: P) -> Self {
        self.parts.push(part.into());
        self
    }

    /// Get the boundary of multipart contents
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Get the headers from the multipart
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get the parts of the multipart
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    fn format(&self, out: &mut Vec<u8>) {
        write!(out, "{}", self.headers)
            .expect("A Write implementation panicked while formatting headers");
        out.extend_from_slice(b"\r\n");

        for part in &self.parts {
            out.extend_from_slice(b"--");
            out.extend_from_slice(self.boundary.as_bytes());
            out.extend_from_slice(b"\r\n");
            part.format(out);
        }

        out.extend_from_slice(b"--");
        out.extend_from_slice(self.boundary.as_bytes());
        out.extend_from_slice(b"--\r\n");
    }
}
