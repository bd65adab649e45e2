use std::fmt::{self, Write};

use email_encoding::headers::writer::EmailWriter;

/// Encodes an unstructured header value, such as `Subject`.
///
/// Words that aren't plain ASCII are grouped into RFC 2047 encoded words,
/// and the value is folded at spaces to keep lines short. `name` is the
/// header the value is written after.
pub(crate) fn encode_unstructured(name: &str, value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    UnstructuredEncoder::new(name, &mut encoded)
        .format(value.split_inclusive(' '))
        .expect("writing to a String can't fail");
    encoded
}

struct UnstructuredEncoder<'a> {
    writer: EmailWriter<'a>,
    encode_buf: String,
}

impl<'a> UnstructuredEncoder<'a> {
    fn new(name: &str, out: &'a mut String) -> Self {
        Self {
            writer: EmailWriter::new(out, name.len() + ": ".len(), 0, false),
            encode_buf: String::new(),
        }
    }

    fn format<'w>(mut self, words: impl Iterator<Item = &'w str>) -> fmt::Result {
        for word in words {
            if is_ascii_text(word) {
                self.flush_encode_buf()?;
                self.writer.folding().write_str(word)?;
            } else {
                self.encode_buf.push_str(word);
            }
        }

        self.flush_encode_buf()
    }

    fn flush_encode_buf(&mut self) -> fmt::Result {
        if self.encode_buf.is_empty() {
            return Ok(());
        }

        let prefix = self.encode_buf.trim_end_matches(' ');
        email_encoding::headers::rfc2047::encode(prefix, &mut self.writer)?;

        // trailing spaces stay foldable
        for _ in prefix.len()..self.encode_buf.len() {
            self.writer.space();
        }

        self.encode_buf.clear();
        Ok(())
    }
}

/// ASCII without NUL, CR or LF
fn is_ascii_text(s: &str) -> bool {
    s.bytes()
        .all(|b| matches!(b, 1..=9 | 11 | 12 | 14..=127))
}
