use std::fmt::{self, Display, Write};

use email_encoding::headers::writer::EmailWriter;

/// How a filename that can't be sent as a plain quoted string is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilenameEncoding {
    /// `filename*0*=utf-8''%E2%82%AC.txt`
    ///
    /// Defined in [RFC 2231](https://tools.ietf.org/html/rfc2231)
    #[default]
    Rfc2231,
    /// `filename="=?utf-8?b?4oKsLnR4dA==?="`
    ///
    /// Not allowed by [RFC 2047](https://tools.ietf.org/html/rfc2047#section-5)
    /// inside a quoted string, but still what a lot of mail clients expect.
    Rfc2047,
}

/// `Content-Disposition` of an attachment
///
/// Defined in [RFC2183](https://tools.ietf.org/html/rfc2183)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition(String);

impl ContentDisposition {
    /// An attachment which is separate from the body of the message, and can be downloaded separately
    ///
    /// Long filenames are split over several lines.
    pub fn attachment(file_name: &str, encoding: FilenameEncoding) -> Self {
        let mut value = String::new();
        {
            let mut w = EmailWriter::new(&mut value, "Content-Disposition: ".len(), 0, false);
            w.write_str("attachment;")
                .expect("writing to a String can't fail");
            w.space();
            write_filename(&mut w, file_name, encoding).expect("writing to a String can't fail");
        }

        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn write_filename(
    w: &mut EmailWriter<'_>,
    file_name: &str,
    encoding: FilenameEncoding,
) -> fmt::Result {
    let printable = file_name.bytes().all(|b| matches!(b, b' '..=b'~'));

    match encoding {
        FilenameEncoding::Rfc2047 if !printable => {
            w.write_str("filename=\"")?;
            email_encoding::headers::rfc2047::encode(file_name, w)?;
            w.write_char('"')
        }
        _ => email_encoding::headers::rfc2231::encode("filename", file_name, w),
    }
}

impl Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ContentDisposition> for String {
    fn from(disposition: ContentDisposition) -> Self {
        disposition.0
    }
}
