//! Headers widely used in email messages
// https://tools.ietf.org/html/rfc5322#section-2.2

use std::{
    borrow::Cow,
    error::Error as StdError,
    fmt::{self, Display},
    ops::Deref,
};

mod address;
mod date;
mod disposition;
mod textual;

pub use self::disposition::{ContentDisposition, FilenameEncoding};
pub(crate) use self::{
    address::{encode_address_list, encode_mailboxes, is_address_header},
    date::format_date,
    textual::encode_unstructured,
};

/// An ordered list of header fields.
///
/// Unlike a map, the same name may appear more than once: extra fields are
/// appended as-is, even when they collide with a structural header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    headers: Vec<(HeaderName, String)>,
}

impl Headers {
    #[inline]
    pub const fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    /// Returns the value of the first header with this name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name_, _value)| name.eq_ignore_ascii_case(name_))
            .map(|(_name, value)| value.as_str())
    }

    /// Returns every value stored under this name, in insertion order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(name_, _value)| name.eq_ignore_ascii_case(name_))
            .map(|(_name, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replaces the first header with this name, or appends it
    pub fn set(&mut self, name: HeaderName, value: String) {
        match self
            .headers
            .iter_mut()
            .find(|(name_, _value)| name.eq_ignore_ascii_case(name_))
        {
            Some((_name, current_value)) => *current_value = value,
            None => self.headers.push((name, value)),
        }
    }

    /// Appends a header without looking at the ones already present
    pub fn append(&mut self, name: HeaderName, value: String) {
        self.headers.push((name, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (&**name, value.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.headers {
            Display::fmt(name, f)?;
            f.write_str(": ")?;
            f.write_str(value)?;
            f.write_str("\r\n")?;
        }

        Ok(())
    }
}

/// A valid header name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderName(Cow<'static, str>);

impl HeaderName {
    /// Creates a new header name
    pub fn new_from_ascii(ascii: String) -> Result<Self, InvalidHeaderName> {
        if !ascii.is_empty() && ascii.len() <= 76 && ascii.bytes().all(is_field_name_byte) {
            Ok(Self(Cow::Owned(ascii)))
        } else {
            Err(InvalidHeaderName(ascii))
        }
    }

    /// Creates a new header name, panics on invalid name
    pub const fn new_from_ascii_str(ascii: &'static str) -> Self {
        let bytes = ascii.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if !is_field_name_byte(bytes[i]) {
                panic!("invalid header name");
            }
            i += 1;
        }

        Self(Cow::Borrowed(ascii))
    }
}

// https://tools.ietf.org/html/rfc5322#section-3.6.8
const fn is_field_name_byte(b: u8) -> bool {
    b >= 33 && b <= 126 && b != b':'
}

impl Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

impl Deref for HeaderName {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for HeaderName {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for HeaderName {
    fn eq(&self, other: &str) -> bool {
        self.eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for HeaderName {
    fn eq(&self, other: &&str) -> bool {
        self.eq_ignore_ascii_case(other)
    }
}

/// Error returned by [`HeaderName::new_from_ascii`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHeaderName(String);

impl Display for InvalidHeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid header name {:?}", self.0)
    }
}

impl StdError for InvalidHeaderName {}

pub(crate) const MIME_VERSION: HeaderName = HeaderName::new_from_ascii_str("MIME-Version");
pub(crate) const CONTENT_TYPE: HeaderName = HeaderName::new_from_ascii_str("Content-Type");
pub(crate) const CONTENT_TRANSFER_ENCODING: HeaderName =
    HeaderName::new_from_ascii_str("Content-Transfer-Encoding");
pub(crate) const CONTENT_DISPOSITION: HeaderName =
    HeaderName::new_from_ascii_str("Content-Disposition");
pub(crate) const SUBJECT: HeaderName = HeaderName::new_from_ascii_str("Subject");
pub(crate) const TO: HeaderName = HeaderName::new_from_ascii_str("To");
pub(crate) const FROM: HeaderName = HeaderName::new_from_ascii_str("From");
pub(crate) const DATE: HeaderName = HeaderName::new_from_ascii_str("Date");
