use std::fmt::{self, Display};

/// `Content-Transfer-Encoding` of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTransferEncoding {
    /// ASCII
    SevenBit,
    /// Quoted-Printable encoding
    QuotedPrintable,
    /// base64 encoding
    Base64,
}

impl Display for ContentTransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SevenBit => "7bit",
            Self::QuotedPrintable => "quoted-printable",
            Self::Base64 => "base64",
        })
    }
}

/// A part body that has already been encoded.
#[derive(Debug, Clone)]
pub(crate) struct Body {
    buf: Vec<u8>,
    encoding: ContentTransferEncoding,
}

impl Body {
    /// Encodes text, choosing the most efficient encoding between
    /// `7bit`, `quoted-printable` and `base64`.
    ///
    /// Line endings are converted to `CRLF`.
    pub(crate) fn text(text: &str) -> Self {
        use email_encoding::body::Encoding;

        let text = crlf_line_endings(text);
        let encoding = match Encoding::choose(text.as_str(), false) {
            Encoding::SevenBit | Encoding::EightBit => ContentTransferEncoding::SevenBit,
            Encoding::QuotedPrintable => ContentTransferEncoding::QuotedPrintable,
            Encoding::Base64 => ContentTransferEncoding::Base64,
        };

        Self::encode(text.into_bytes(), encoding)
    }

    /// Encodes opaque binary content, always as `base64`
    pub(crate) fn binary(buf: &[u8]) -> Self {
        Self::encode(buf.to_vec(), ContentTransferEncoding::Base64)
    }

    fn encode(buf: Vec<u8>, encoding: ContentTransferEncoding) -> Self {
        match encoding {
            ContentTransferEncoding::SevenBit => Self { buf, encoding },
            ContentTransferEncoding::QuotedPrintable => Self {
                buf: quoted_printable::encode(buf),
                encoding,
            },
            ContentTransferEncoding::Base64 => {
                let len = email_encoding::body::base64::encoded_len(buf.len());

                let mut out = String::with_capacity(len);
                email_encoding::body::base64::encode(&buf, &mut out)
                    .expect("encode body as base64");

                Self {
                    buf: out.into_bytes(),
                    encoding,
                }
            }
        }
    }

    #[inline]
    pub(crate) fn encoding(&self) -> ContentTransferEncoding {
        self.encoding
    }

    #[inline]
    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

/// Inserts `\r` before every `\n` that doesn't already have one
fn crlf_line_endings(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 32);

    let mut previous = None;
    for c in s.chars() {
        if c == '\n' && previous != Some('\r') {
            out.push('\r');
        }
        out.push(c);
        previous = Some(c);
    }

    out
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{crlf_line_endings, Body, ContentTransferEncoding};

    #[test]
    fn seven_bit_detect() {
        let encoded = Body::text("Hello, world!");

        assert_eq!(encoded.encoding(), ContentTransferEncoding::SevenBit);
        assert_eq!(encoded.into_vec(), b"Hello, world!");
    }

    #[test]
    fn non_ascii_text_is_not_seven_bit() {
        let encoded = Body::text("Российская Федерация");

        assert_ne!(encoded.encoding(), ContentTransferEncoding::SevenBit);
        assert!(encoded.into_vec().is_ascii());
    }

    #[test]
    fn binary_is_base64() {
        let encoded = Body::binary(b"foo");

        assert_eq!(encoded.encoding(), ContentTransferEncoding::Base64);
        assert_eq!(encoded.into_vec(), b"Zm9v");
    }

    #[test]
    fn binary_is_wrapped() {
        let encoded = Body::binary(&[0; 80]);

        assert_eq!(
            encoded.into_vec(),
            concat!(
                "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA\r\n",
                "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
            )
            .as_bytes()
        );
    }

    #[test]
    fn crlf() {
        assert_eq!(crlf_line_endings("a\nb\r\nc\n"), "a\r\nb\r\nc\r\n");
        assert_eq!(crlf_line_endings("\n"), "\r\n");
        assert_eq!(crlf_line_endings("no newline"), "no newline");
    }

    #[test]
    fn encoding_names() {
        assert_eq!(ContentTransferEncoding::SevenBit.to_string(), "7bit");
        assert_eq!(
            ContentTransferEncoding::QuotedPrintable.to_string(),
            "quoted-printable"
        );
        assert_eq!(ContentTransferEncoding::Base64.to_string(), "base64");
    }
}
