//! The SMTP transport sends emails using the SMTP protocol.
//!
//! The protocol itself is handled by `lettre`'s blocking [`SmtpConnection`];
//! this module only maps the [`Transport`] and [`Session`] steps onto it.
//!
//! ```rust,no_run
//! use outbox::{transport::smtp::SmtpTransport, Email, Mode, Outbox};
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let outbox = Outbox::builder("user@example.com", "hunter2", "smtp.example.com", 465)
//!     .mode(Mode::Ssl)
//!     .transport(SmtpTransport::new().timeout(Some(std::time::Duration::from_secs(30))))
//!     .build();
//!
//! outbox.send(&Email::new("nico@example.com", "Hello", "Hi Nico!")?, &[])?;
//! # Ok(())
//! # }
//! ```

use std::{fmt, time::Duration};

use lettre::{
    address::{Address, Envelope},
    transport::smtp::{
        authentication::{Credentials, DEFAULT_MECHANISMS},
        client::{SmtpConnection, TlsParameters},
        extension::ClientId,
    },
};

use super::{Session, Transport};
use crate::{error::BoxError, Mode};

/// Connects to real SMTP servers
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    hello_name: ClientId,
    timeout: Option<Duration>,
}

impl SmtpTransport {
    /// Creates a transport that introduces itself with the local hostname
    /// and never times out
    pub fn new() -> Self {
        Self {
            hello_name: ClientId::default(),
            timeout: None,
        }
    }

    /// Set the name used during EHLO
    pub fn hello_name(mut self, name: ClientId) -> Self {
        self.hello_name = name;
        self
    }

    /// Set the read and write timeout of the connection
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SmtpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for SmtpTransport {
    type Session = SmtpSession;

    fn connect(&self, host: &str, port: u16, mode: Mode) -> Result<SmtpSession, BoxError> {
        let tls_parameters = match mode {
            Mode::Tls | Mode::Ssl => Some(TlsParameters::new(host.to_owned())?),
            Mode::Plain => None,
        };
        let wrapper = match mode {
            Mode::Ssl => tls_parameters.as_ref(),
            Mode::Tls | Mode::Plain => None,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(host, port, %mode, "connecting");
        let connection =
            SmtpConnection::connect((host, port), self.timeout, &self.hello_name, wrapper, None)?;

        Ok(SmtpSession {
            connection,
            hello_name: self.hello_name.clone(),
            tls_parameters,
            debug: false,
        })
    }

    /// Both the sender and the recipients must be valid addresses
    fn check_envelope(&self, from: &str, to: &[String]) -> Result<(), BoxError> {
        envelope(from, to).map(drop)
    }
}

fn envelope(from: &str, to: &[String]) -> Result<Envelope, BoxError> {
    let from = from.parse::<Address>()?;
    let to = to
        .iter()
        .map(|recipient| recipient.parse::<Address>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Envelope::new(Some(from), to)?)
}

/// A live connection opened by [`SmtpTransport`]
pub struct SmtpSession {
    connection: SmtpConnection,
    hello_name: ClientId,
    tls_parameters: Option<TlsParameters>,
    debug: bool,
}

impl fmt::Debug for SmtpSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSession")
            .field("hello_name", &self.hello_name)
            .field("encrypted", &self.is_encrypted())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl SmtpSession {
    /// Whether the protocol exchange is being logged
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Tells if the underlying stream is currently encrypted
    pub fn is_encrypted(&self) -> bool {
        self.connection.is_encrypted()
    }

    fn trace(&self, step: &str) {
        #[cfg(feature = "tracing")]
        {
            if self.debug {
                tracing::info!(step, encrypted = self.is_encrypted(), "smtp");
            }
        }
        #[cfg(not(feature = "tracing"))]
        let _ = step;
    }
}

impl Session for SmtpSession {
    fn starttls(&mut self) -> Result<(), BoxError> {
        let tls_parameters = self
            .tls_parameters
            .as_ref()
            .ok_or("STARTTLS requires TLS parameters")?;
        self.connection.starttls(tls_parameters, &self.hello_name)?;
        self.trace("STARTTLS");
        Ok(())
    }

    fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn login(&mut self, username: &str, password: &str) -> Result<(), BoxError> {
        self.trace("AUTH");
        let credentials = Credentials::new(username.to_owned(), password.to_owned());
        self.connection.auth(DEFAULT_MECHANISMS, &credentials)?;
        Ok(())
    }

    fn send_mail(&mut self, from: &str, to: &[String], message: &[u8]) -> Result<(), BoxError> {
        let envelope = envelope(from, to)?;

        self.trace("DATA");
        let response = self.connection.send(&envelope, message)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(code = %response.code(), "message accepted");
        #[cfg(not(feature = "tracing"))]
        let _ = response;
        Ok(())
    }

    fn quit(&mut self) -> Result<(), BoxError> {
        self.trace("QUIT");
        self.connection.quit()?;
        Ok(())
    }
}
