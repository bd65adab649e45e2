//! ### Talking to the server
//!
//! [`Outbox`][crate::Outbox] doesn't speak SMTP itself. It drives a
//! [`Transport`], which opens a [`Session`] with the server for every message.
//!
//! The following transports are available:
//!
//! * The [`SmtpTransport`][smtp::SmtpTransport] connects to a real server through
//!   `lettre`'s blocking SMTP client. It is the default.
//! * The [`StubTransport`][stub::StubTransport] records every call instead of
//!   talking to the network, and can be told to fail at a given step. It is
//!   useful for testing.

use crate::{error::BoxError, Mode};

pub mod smtp;
pub mod stub;

/// Opens sessions with an SMTP server
pub trait Transport {
    /// The session returned by a successful connection
    type Session: Session;

    /// Connects to `host:port`
    ///
    /// With [`Mode::Ssl`] the connection must be encrypted from the start.
    /// The other modes connect in clear text; [`Mode::Tls`] is upgraded
    /// later through [`Session::starttls`].
    fn connect(&self, host: &str, port: u16, mode: Mode) -> Result<Self::Session, BoxError>;

    /// Checks that a message from `from` to `to` can be submitted
    ///
    /// Called before any connection is opened, so that a message which
    /// would be refused doesn't cost a login. Accepts everything by default.
    fn check_envelope(&self, from: &str, to: &[String]) -> Result<(), BoxError> {
        let _ = (from, to);
        Ok(())
    }
}

/// A single connection with an SMTP server
///
/// A session is used for exactly one message and dropped afterwards,
/// whether sending succeeded or not.
pub trait Session {
    /// Upgrades the connection with `STARTTLS`
    fn starttls(&mut self) -> Result<(), BoxError>;

    /// Turns the logging of the protocol exchange on or off
    fn set_debug(&mut self, debug: bool);

    /// Authenticates with the server
    fn login(&mut self, username: &str, password: &str) -> Result<(), BoxError>;

    /// Submits a formatted message for delivery to `to`
    fn send_mail(&mut self, from: &str, to: &[String], message: &[u8]) -> Result<(), BoxError>;

    /// Ends the session with `QUIT`
    fn quit(&mut self) -> Result<(), BoxError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Session = T::Session;

    fn connect(&self, host: &str, port: u16, mode: Mode) -> Result<Self::Session, BoxError> {
        (**self).connect(host, port, mode)
    }

    fn check_envelope(&self, from: &str, to: &[String]) -> Result<(), BoxError> {
        (**self).check_envelope(from, to)
    }
}
