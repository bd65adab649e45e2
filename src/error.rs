//! Error and result type for building and sending emails

use std::{error::Error as StdError, fmt};

/// Boxed error returned by the [`Transport`][crate::transport::Transport]
/// and [`Session`][crate::transport::Session] capabilities
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// The errors that may occur while building or sending an email
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    /// Returns true if the error was raised while validating input,
    /// before any I/O happened
    pub fn is_validation(&self) -> bool {
        matches!(self.inner.kind, Kind::Validation)
    }

    /// Returns true if the error happened while connecting, upgrading to TLS,
    /// authenticating or closing the session
    pub fn is_transport(&self) -> bool {
        matches!(self.inner.kind, Kind::Transport)
    }

    /// Returns true if the error happened while handing the message over
    /// to the server
    pub fn is_submission(&self) -> bool {
        matches!(self.inner.kind, Kind::Submission)
    }

    /// Returns true if an attachment source could not be read
    pub fn is_io(&self) -> bool {
        matches!(self.inner.kind, Kind::Io)
    }
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// Invalid recipients, bodies, header fields or connection settings
    Validation,
    /// Connection, TLS negotiation, authentication or teardown failure
    Transport,
    /// Failure while submitting the message
    Submission,
    /// Failure while reading an attachment
    Io,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("outbox::Error");

        builder.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }

        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Validation => f.write_str("validation error")?,
            Kind::Transport => f.write_str("transport error")?,
            Kind::Submission => f.write_str("submission error")?,
            Kind::Io => f.write_str("i/o error")?,
        };

        if let Some(ref e) = self.inner.source {
            write!(f, ": {e}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| {
            let r: &(dyn StdError + 'static) = &**e;
            r
        })
    }
}

pub(crate) fn validation<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Validation, Some(e))
}

pub(crate) fn transport<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Transport, Some(e))
}

pub(crate) fn submission<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Submission, Some(e))
}

pub(crate) fn io<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Io, Some(e))
}
