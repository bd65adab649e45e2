//! Sending rendered emails through an authenticated SMTP session

use std::{
    fmt::{self, Display},
    str::FromStr,
    time::SystemTime,
};

use crate::{
    error::{self, Error},
    message::{
        header::{self, encode_address_list, format_date},
        Attachment, Email,
    },
    transport::{smtp::SmtpTransport, Session, Transport},
};

mod connection_url;

/// Default smtp port
pub const SMTP_PORT: u16 = 25;
/// Default submission port
pub const SUBMISSION_PORT: u16 = 587;
/// Default submission over TLS port
///
/// Defined in [RFC8314](https://tools.ietf.org/html/rfc8314)
pub const SUBMISSIONS_PORT: u16 = 465;

/// How the connection with the server is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Connect in clear text, then upgrade with `STARTTLS` before logging in
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "TLS"))]
    Tls,
    /// Connect over an already encrypted channel
    #[cfg_attr(feature = "serde", serde(rename = "SSL"))]
    Ssl,
    /// No encryption at all
    #[cfg_attr(feature = "serde", serde(rename = "plain"))]
    Plain,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Tls => "TLS",
            Mode::Ssl => "SSL",
            Mode::Plain => "plain",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    /// Accepts exactly `TLS`, `SSL` or `plain`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TLS" => Ok(Mode::Tls),
            "SSL" => Ok(Mode::Ssl),
            "plain" => Ok(Mode::Plain),
            _ => Err(error::validation(format!(
                "invalid mode {s:?}, expected one of TLS, SSL or plain"
            ))),
        }
    }
}

/// Where and how to connect
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionDetails {
    pub host: String,
    pub port: u16,
    pub mode: Mode,
    pub debug: bool,
}

/// Sends [`Email`]s through an authenticated SMTP session
///
/// Every call to [`Outbox::send`] opens its own session, logs in, submits
/// the message and quits. Nothing is kept open between two sends.
///
/// ```rust,no_run
/// use outbox::{Attachment, Email, Outbox};
///
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let outbox = Outbox::new("me@example.com", "hunter2", "smtp.example.com", 587);
/// let email = Email::builder()
///     .recipients(["nico@example.com"])
///     .subject("Minutes")
///     .body("See attached.")
///     .build()?;
///
/// outbox.send(&email, &[Attachment::from_path("minutes.pdf")?])?;
/// # Ok(())
/// # }
/// ```
pub struct Outbox<T = SmtpTransport> {
    username: String,
    password: String,
    sender: Option<String>,
    connection_details: ConnectionDetails,
    transport: T,
}

impl Outbox {
    /// Creates an outbox using `STARTTLS`, with debugging off
    pub fn new<U, P, H>(username: U, password: P, host: H, port: u16) -> Self
    where
        U: Into<String>,
        P: Into<String>,
        H: Into<String>,
    {
        Self::builder(username, password, host, port).build()
    }

    /// Creates a builder with the default mode, debug flag and transport
    pub fn builder<U, P, H>(username: U, password: P, host: H, port: u16) -> OutboxBuilder
    where
        U: Into<String>,
        P: Into<String>,
        H: Into<String>,
    {
        OutboxBuilder::new(username, password, host, port)
    }

    /// Creates an outbox from a connection URL
    ///
    /// See [`OutboxBuilder::from_url`] for the accepted format.
    pub fn from_url(connection_url: &str) -> Result<Self, Error> {
        OutboxBuilder::from_url(connection_url).map(OutboxBuilder::build)
    }
}

impl<T: Transport> Outbox<T> {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// The envelope sender and default `From`, the username unless set
    /// with [`OutboxBuilder::sender`]
    pub fn sender(&self) -> &str {
        self.sender.as_deref().unwrap_or(&self.username)
    }

    pub fn connection_details(&self) -> &ConnectionDetails {
        &self.connection_details
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Opens and authenticates a session
    ///
    /// Connects, upgrades with `STARTTLS` when the mode is [`Mode::Tls`],
    /// sets the debug flag and logs in. Any failure is a transport error and
    /// drops the half-open session.
    pub fn login(&self) -> Result<T::Session, Error> {
        let ConnectionDetails {
            ref host,
            port,
            mode,
            debug,
        } = self.connection_details;

        let mut session = self
            .transport
            .connect(host, port, mode)
            .map_err(error::transport)?;
        if mode == Mode::Tls {
            session.starttls().map_err(error::transport)?;
        }
        session.set_debug(debug);
        session
            .login(&self.username, &self.password)
            .map_err(error::transport)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(host = %host, port, %mode, username = %self.username, "logged in");
        Ok(session)
    }

    /// Renders `email` with its attachments and sends it
    ///
    /// `From` (the [sender](Outbox::sender)) and `Date` are added unless the
    /// email's extra fields already set them. The message is addressed to the
    /// email's recipients, and the session is closed afterwards.
    ///
    /// The transport checks the envelope first: a sender or recipient it
    /// can't submit to is a validation error, and no connection is opened.
    pub fn send(&self, email: &Email, attachments: &[Attachment]) -> Result<(), Error> {
        let sender = self.sender();
        self.transport
            .check_envelope(sender, email.recipients())
            .map_err(error::validation)?;

        let mut session = self.login()?;

        let mut message = email.as_mime(attachments);
        let headers = message.headers_mut();
        if !headers.contains(&header::FROM) {
            headers.append(header::FROM, encode_address_list(&header::FROM, sender));
        }
        if !headers.contains(&header::DATE) {
            headers.append(header::DATE, format_date(SystemTime::now()));
        }
        let formatted = message.formatted();

        session
            .send_mail(sender, email.recipients(), &formatted)
            .map_err(error::submission)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            recipients = email.recipients().len(),
            attachments = attachments.len(),
            bytes = formatted.len(),
            "message submitted"
        );

        session.quit().map_err(error::transport)?;
        Ok(())
    }

    /// Runs `f` with this outbox
    ///
    /// No connection is opened for the scope itself: each [`Outbox::send`]
    /// inside it still uses its own session, so there is nothing to tear
    /// down when `f` returns.
    pub fn scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Self) -> R,
    {
        f(self)
    }
}

impl<T> fmt::Debug for Outbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outbox")
            .field("username", &self.username)
            .field("sender", &self.sender)
            .field("connection_details", &self.connection_details)
            .finish_non_exhaustive()
    }
}

/// Builder for an [`Outbox`]
pub struct OutboxBuilder<T = SmtpTransport> {
    username: String,
    password: String,
    sender: Option<String>,
    connection_details: ConnectionDetails,
    transport: T,
}

impl<T> fmt::Debug for OutboxBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboxBuilder")
            .field("username", &self.username)
            .field("sender", &self.sender)
            .field("connection_details", &self.connection_details)
            .finish_non_exhaustive()
    }
}

impl OutboxBuilder {
    /// Creates a builder using [`Mode::Tls`], debugging off and the SMTP transport
    pub fn new<U, P, H>(username: U, password: P, host: H, port: u16) -> Self
    where
        U: Into<String>,
        P: Into<String>,
        H: Into<String>,
    {
        Self {
            username: username.into(),
            password: password.into(),
            sender: None,
            connection_details: ConnectionDetails {
                host: host.into(),
                port,
                mode: Mode::default(),
                debug: false,
            },
            transport: SmtpTransport::new(),
        }
    }
}

impl<T> OutboxBuilder<T> {
    /// Set how the connection is secured
    pub fn mode(mut self, mode: Mode) -> Self {
        self.connection_details.mode = mode;
        self
    }

    /// Log the protocol exchange of every session
    pub fn debug(mut self, debug: bool) -> Self {
        self.connection_details.debug = debug;
        self
    }

    /// Set the envelope sender, also used as `From`
    ///
    /// Defaults to the username, which only works when the login is an
    /// email address.
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Use another transport, such as a stub for testing
    pub fn transport<U: Transport>(self, transport: U) -> OutboxBuilder<U> {
        OutboxBuilder {
            username: self.username,
            password: self.password,
            sender: self.sender,
            connection_details: self.connection_details,
            transport,
        }
    }

    /// Build the outbox
    pub fn build(self) -> Outbox<T> {
        Outbox {
            username: self.username,
            password: self.password,
            sender: self.sender,
            connection_details: self.connection_details,
            transport: self.transport,
        }
    }
}
