//! Provides a strongly typed way to build emails
//!
//! ## Usage
//!
//! An [`Email`] describes the message: who it goes to, its subject and a
//! plain text and/or HTML body. [`Email::as_mime`] turns it, together with
//! any number of [`Attachment`]s, into a MIME [`Part`] tree:
//!
//! | body | html_body | attachments | root part |
//! |------|-----------|-------------|-----------|
//! | yes  | no        | none        | `text/plain` |
//! | no   | yes       | none        | `text/html` |
//! | yes  | yes       | none        | `multipart/alternative` |
//! | any  | any       | some        | `multipart/mixed` |
//!
//! ```
//! use outbox::{Attachment, Email};
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let email = Email::builder()
//!     .recipients(["nico@example.com", "ana@example.com"])
//!     .subject("Happy new year")
//!     .body("Be happy!")
//!     .html_body("<p><b>Be</b> happy!</p>")
//!     .field("Reply-To", "yuin@example.com")
//!     .build()?;
//!
//! let greeting = Attachment::new("card.txt", "Cheers".as_bytes())?;
//! let mime = email.as_mime(&[greeting]);
//!
//! assert_eq!(mime.content_type().unwrap().essence_str(), "multipart/mixed");
//! # Ok(())
//! # }
//! ```

use std::fmt;

pub use self::{
    attachment::Attachment,
    body::ContentTransferEncoding,
    header::{ContentDisposition, FilenameEncoding, HeaderName, Headers, InvalidHeaderName},
    mimebody::{MultiPart, MultiPartKind, Part, SinglePart},
};
use self::{
    body::Body,
    header::{encode_address_list, encode_mailboxes, encode_unstructured, is_address_header},
};
use crate::error::{self, Error};

mod attachment;
mod body;
pub mod header;
mod mimebody;

/// One or more recipient addresses, in order.
///
/// A single address is turned into a one-element list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients(Vec<String>);

impl Recipients {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Recipients {
    fn from(address: &str) -> Self {
        Self(vec![address.to_owned()])
    }
}

impl From<String> for Recipients {
    fn from(address: String) -> Self {
        Self(vec![address])
    }
}

impl From<Vec<String>> for Recipients {
    fn from(addresses: Vec<String>) -> Self {
        Self(addresses)
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(addresses: Vec<&str>) -> Self {
        addresses.as_slice().into()
    }
}

impl From<&[&str]> for Recipients {
    fn from(addresses: &[&str]) -> Self {
        Self(addresses.iter().map(|&address| address.to_owned()).collect())
    }
}

impl From<&[String]> for Recipients {
    fn from(addresses: &[String]) -> Self {
        Self(addresses.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for Recipients {
    fn from(addresses: [&str; N]) -> Self {
        addresses.as_slice().into()
    }
}

impl<const N: usize> From<[String; N]> for Recipients {
    fn from(addresses: [String; N]) -> Self {
        Self(addresses.into())
    }
}

/// A message waiting to be rendered and sent
///
/// `Email` is immutable: build it with [`Email::builder`] or [`Email::new`].
#[derive(Clone, PartialEq, Eq)]
pub struct Email {
    recipients: Vec<String>,
    subject: String,
    body: Option<String>,
    html_body: Option<String>,
    fields: Vec<(HeaderName, String)>,
    rfc2231: Option<bool>,
}

impl Email {
    /// Creates a plain text email
    pub fn new<R, S, B>(recipients: R, subject: S, body: B) -> Result<Self, Error>
    where
        R: Into<Recipients>,
        S: Into<String>,
        B: Into<String>,
    {
        Self::builder()
            .recipients(recipients)
            .subject(subject)
            .body(body)
            .build()
    }

    /// Creates a new empty email builder
    pub fn builder() -> EmailBuilder {
        EmailBuilder::new()
    }

    /// The recipients, in the order they were given
    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The plain text body
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The HTML body
    pub fn html_body(&self) -> Option<&str> {
        self.html_body.as_deref()
    }

    /// Extra header fields, in the order they were added
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (&**name, value.as_str()))
    }

    /// Whether non-ASCII attachment names are forced to RFC 2231 (`Some(true)`),
    /// to RFC 2047 (`Some(false)`), or left to the renderer (`None`)
    pub fn rfc2231(&self) -> Option<bool> {
        self.rfc2231
    }

    /// Renders the email and its attachments into a MIME tree
    ///
    /// The bodies come first, as a single text part or a
    /// `multipart/alternative`. When there are attachments, that structure
    /// is wrapped into a `multipart/mixed` followed by one
    /// `application/octet-stream` part per attachment, in order.
    ///
    /// `Subject`, `To` and then the extra fields are added to the root part
    /// once the structure is assembled. Values are encoded and folded as
    /// they are added: address fields (`To`, `Reply-To`, `Cc`...) only get
    /// their display names encoded, other fields are treated as unstructured
    /// text.
    pub fn as_mime(&self, attachments: &[Attachment]) -> Part {
        let mut root = self.content();

        if !attachments.is_empty() {
            let encoding = self.filename_encoding();
            let mixed = attachments
                .iter()
                .fold(MultiPart::new(MultiPartKind::Mixed).part(root), |mixed, a| {
                    mixed.part(a.to_part(encoding))
                });
            root = Part::Multi(mixed);
        }

        let headers = root.headers_mut();
        headers.set(header::MIME_VERSION, String::from("1.0"));
        headers.set(
            header::SUBJECT,
            encode_unstructured(&header::SUBJECT, &self.subject),
        );
        headers.set(
            header::TO,
            encode_mailboxes(&header::TO, self.recipients.iter().map(String::as_str)),
        );
        for (name, value) in &self.fields {
            let value = if is_address_header(name) {
                encode_address_list(name, value)
            } else {
                encode_unstructured(name, value)
            };
            headers.append(name.clone(), value);
        }

        root
    }

    fn content(&self) -> Part {
        let plain = self
            .body
            .as_deref()
            .map(|body| SinglePart::new(&mime::TEXT_PLAIN_UTF_8, Body::text(body)));
        let html = self
            .html_body
            .as_deref()
            .map(|html| SinglePart::new(&mime::TEXT_HTML_UTF_8, Body::text(html)));

        match (plain, html) {
            (Some(plain), Some(html)) => Part::Multi(
                MultiPart::new(MultiPartKind::Alternative)
                    .part(plain)
                    .part(html),
            ),
            (Some(part), None) | (None, Some(part)) => Part::Single(part),
            (None, None) => unreachable!("an email always has at least one body"),
        }
    }

    fn filename_encoding(&self) -> FilenameEncoding {
        match self.rfc2231 {
            Some(true) => FilenameEncoding::Rfc2231,
            Some(false) => FilenameEncoding::Rfc2047,
            None => FilenameEncoding::default(),
        }
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Email")
            .field("recipients", &self.recipients)
            .field("subject", &self.subject)
            .field("body", &self.body.is_some())
            .field("html_body", &self.html_body.is_some())
            .field("fields", &self.fields)
            .field("rfc2231", &self.rfc2231)
            .finish()
    }
}

/// A builder for [`Email`]
#[derive(Debug, Clone, Default)]
pub struct EmailBuilder {
    recipients: Option<Recipients>,
    subject: String,
    body: Option<String>,
    html_body: Option<String>,
    fields: Vec<(String, String)>,
    rfc2231: Option<bool>,
}

impl EmailBuilder {
    /// Creates a new empty email builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recipients, replacing any previous ones
    pub fn recipients<R: Into<Recipients>>(mut self, recipients: R) -> Self {
        self.recipients = Some(recipients.into());
        self
    }

    /// Set the `Subject` header
    pub fn subject<S: Into<String>>(mut self, subject: S) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the plain text body
    pub fn body<S: Into<String>>(mut self, body: S) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the HTML body
    pub fn html_body<S: Into<String>>(mut self, html_body: S) -> Self {
        self.html_body = Some(html_body.into());
        self
    }

    /// Add an extra header field, such as `Reply-To`
    pub fn field<N: Into<String>, V: Into<String>>(mut self, name: N, value: V) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Force the encoding of non-ASCII attachment names
    ///
    /// `true` selects RFC 2231 parameter encoding, `false` selects RFC 2047
    /// encoded words. Without a call the renderer picks one.
    pub fn rfc2231(mut self, rfc2231: bool) -> Self {
        self.rfc2231 = Some(rfc2231);
        self
    }

    /// Validates the input and builds the email
    ///
    /// Recipients are checked first, then the bodies, then the extra fields.
    pub fn build(self) -> Result<Email, Error> {
        let recipients = match self.recipients {
            Some(recipients) if !recipients.0.is_empty() => recipients.into_vec(),
            _ => return Err(error::validation("at least one recipient is required")),
        };

        if self.body.is_none() && self.html_body.is_none() {
            return Err(error::validation(
                "an email needs a body, an html body, or both",
            ));
        }

        let fields = self
            .fields
            .into_iter()
            .map(|(name, value)| -> Result<(HeaderName, String), Error> {
                let name = HeaderName::new_from_ascii(name).map_err(error::validation)?;
                if value.contains(['\r', '\n']) {
                    return Err(error::validation(format!(
                        "value of header {name} contains a line break"
                    )));
                }
                Ok((name, value))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Email {
            recipients,
            subject: self.subject,
            body: self.body,
            html_body: self.html_body,
            fields,
            rfc2231: self.rfc2231,
        })
    }
}
