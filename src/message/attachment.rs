use std::{
    fmt,
    fs::File,
    io::Read,
    path::Path,
};

use crate::{
    error::{self, Error},
    message::{
        body::Body,
        header::{self, ContentDisposition, FilenameEncoding},
        SinglePart,
    },
};

/// A named binary payload attached to an [`Email`][super::Email]
///
/// The content is read in full when the attachment is created, so the
/// source can be closed or rewound afterwards without affecting it.
///
/// # Example
///
/// ```
/// use outbox::Attachment;
///
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let attachment = Attachment::new("report.csv", "id,total\n1,42\n".as_bytes())?;
///
/// assert_eq!(attachment.name(), "report.csv");
/// assert_eq!(attachment.raw(), b"id,total\n1,42\n");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    name: String,
    raw: Vec<u8>,
}

impl Attachment {
    /// Reads everything from `source` and stores it under `name`
    pub fn new<N, R>(name: N, mut source: R) -> Result<Self, Error>
    where
        N: Into<String>,
        R: Read,
    {
        let mut raw = Vec::new();
        source.read_to_end(&mut raw).map_err(error::io)?;

        Ok(Self::from_bytes(name, raw))
    }

    /// Creates an attachment from content that is already in memory
    pub fn from_bytes<N: Into<String>>(name: N, raw: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            raw,
        }
    }

    /// Reads a file, naming the attachment after the file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| error::io(format!("{} has no file name", path.display())))?;
        let file = File::open(path).map_err(error::io)?;

        Self::new(name, file)
    }

    /// The display filename
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The cached content
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Returns a copy of the cached content.
    ///
    /// Unlike reading from a stream, every call returns the same bytes.
    pub fn read(&self) -> Vec<u8> {
        self.raw.clone()
    }

    /// Build the `application/octet-stream` part for this attachment
    pub(crate) fn to_part(&self, encoding: FilenameEncoding) -> SinglePart {
        let mut part = SinglePart::new(&mime::APPLICATION_OCTET_STREAM, Body::binary(&self.raw));
        part.headers_mut().set(
            header::CONTENT_DISPOSITION,
            ContentDisposition::attachment(&self.name, encoding).into(),
        );
        part
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("len", &self.raw.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::io::{self, Read};

    use pretty_assertions::assert_eq;

    use super::Attachment;
    use crate::message::header::FilenameEncoding;

    #[test]
    fn attachment_raw_data() {
        let attachment = Attachment::new("my filename", "this is some data".as_bytes()).unwrap();

        assert_eq!(attachment.name(), "my filename");
        assert_eq!(attachment.raw(), b"this is some data");
    }

    #[test]
    fn attachment_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/src/message/attachment.rs");
        let expected = std::fs::read(path).unwrap();

        let attachment = Attachment::new("my filename", std::fs::File::open(path).unwrap()).unwrap();
        assert_eq!(attachment.name(), "my filename");
        assert_eq!(attachment.raw(), expected.as_slice());
        assert_eq!(attachment.read(), expected);

        let attachment = Attachment::from_path(path).unwrap();
        assert_eq!(attachment.name(), "attachment.rs");
        assert_eq!(attachment.raw(), expected.as_slice());
    }

    #[test]
    fn read_is_repeatable() {
        let mut source = io::Cursor::new(b"foo data".to_vec());
        let attachment = Attachment::new("my filename", &mut source).unwrap();

        // the source is exhausted, the attachment is not
        let mut rest = Vec::new();
        source.read_to_end(&mut rest).unwrap();
        assert!(rest.is_empty());

        assert_eq!(attachment.read(), b"foo data");
        assert_eq!(attachment.read(), b"foo data");
        assert_eq!(attachment.raw(), b"foo data");
    }

    #[test]
    fn read_error() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
        }

        let err = Attachment::new("broken", Broken).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn missing_file() {
        let err = Attachment::from_path("/this/file/does/not/exist.txt").unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn attachment_part() {
        let attachment = Attachment::from_bytes("foo.txt", b"foo".to_vec());
        let part = attachment.to_part(FilenameEncoding::Rfc2231);

        assert_eq!(
            String::from_utf8(crate::message::Part::Single(part).formatted()).unwrap(),
            concat!(
                "Content-Type: application/octet-stream\r\n",
                "Content-Transfer-Encoding: base64\r\n",
                "Content-Disposition: attachment; filename=\"foo.txt\"\r\n",
                "\r\n",
                "Zm9v\r\n",
            )
        );
    }
}
