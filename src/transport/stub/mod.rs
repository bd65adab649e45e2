//! The stub transport records every step of every session instead of talking to
//! a server. It can be useful for testing purposes.
//!
//! # Example
//!
//! ```rust
//! use outbox::{
//!     transport::stub::{Call, StubTransport},
//!     Email, Mode, Outbox,
//! };
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let stub = StubTransport::new_ok();
//! let outbox = Outbox::builder("u", "p", "server", 1234)
//!     .transport(stub.clone())
//!     .build();
//!
//! outbox.send(&Email::new(["a@b.com"], "s", "body")?, &[])?;
//!
//! let calls = stub.calls();
//! assert_eq!(
//!     calls[0],
//!     Call::Connect {
//!         host: "server".into(),
//!         port: 1234,
//!         mode: Mode::Tls
//!     }
//! );
//! assert_eq!(calls.last(), Some(&Call::Quit));
//! # Ok(())
//! # }
//! ```

use std::{
    error::Error as StdError,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use super::{Session, Transport};
use crate::{error::BoxError, Mode};

/// A step recorded by [`StubTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect { host: String, port: u16, mode: Mode },
    StartTls,
    SetDebug(bool),
    Login { username: String, password: String },
    SendMail { from: String, to: Vec<String>, message: String },
    Quit,
}

/// The steps a [`StubTransport`] can be told to fail at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Connect,
    StartTls,
    Login,
    SendMail,
    Quit,
}

/// The error returned by a failing [`StubTransport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubError(pub Step);

impl fmt::Display for StubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stub transport failed at {:?}", self.0)
    }
}

impl StdError for StubError {}

/// This transport records every call and returns the configured result
///
/// Clones share the same call log, so a clone can be handed to an
/// [`Outbox`][crate::Outbox] while the original is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct StubTransport {
    fail_at: Option<Step>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl StubTransport {
    /// Creates a new transport that always succeeds
    pub fn new_ok() -> Self {
        Self::default()
    }

    /// Creates a new transport that fails when it reaches `step`
    pub fn new_error(step: Step) -> Self {
        Self {
            fail_at: Some(step),
            calls: Arc::default(),
        }
    }

    /// Returns a copy of every recorded call, oldest first
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    /// Forgets every recorded call
    pub fn clear(&self) {
        lock(&self.calls).clear();
    }
}

fn lock(calls: &Mutex<Vec<Call>>) -> MutexGuard<'_, Vec<Call>> {
    calls.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record(
    fail_at: Option<Step>,
    calls: &Mutex<Vec<Call>>,
    step: Step,
    call: Call,
) -> Result<(), BoxError> {
    #[cfg(feature = "tracing")]
    tracing::debug!(?call, "stub transport");
    lock(calls).push(call);

    if fail_at == Some(step) {
        Err(Box::new(StubError(step)))
    } else {
        Ok(())
    }
}

impl Transport for StubTransport {
    type Session = StubSession;

    fn connect(&self, host: &str, port: u16, mode: Mode) -> Result<StubSession, BoxError> {
        record(
            self.fail_at,
            &self.calls,
            Step::Connect,
            Call::Connect {
                host: host.to_owned(),
                port,
                mode,
            },
        )?;

        Ok(StubSession {
            fail_at: self.fail_at,
            calls: Arc::clone(&self.calls),
        })
    }
}

/// A session opened by [`StubTransport`]
#[derive(Debug)]
pub struct StubSession {
    fail_at: Option<Step>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Session for StubSession {
    fn starttls(&mut self) -> Result<(), BoxError> {
        record(self.fail_at, &self.calls, Step::StartTls, Call::StartTls)
    }

    fn set_debug(&mut self, debug: bool) {
        lock(&self.calls).push(Call::SetDebug(debug));
    }

    fn login(&mut self, username: &str, password: &str) -> Result<(), BoxError> {
        record(
            self.fail_at,
            &self.calls,
            Step::Login,
            Call::Login {
                username: username.to_owned(),
                password: password.to_owned(),
            },
        )
    }

    fn send_mail(&mut self, from: &str, to: &[String], message: &[u8]) -> Result<(), BoxError> {
        record(
            self.fail_at,
            &self.calls,
            Step::SendMail,
            Call::SendMail {
                from: from.to_owned(),
                to: to.to_vec(),
                message: String::from_utf8_lossy(message).into_owned(),
            },
        )
    }

    fn quit(&mut self) -> Result<(), BoxError> {
        record(self.fail_at, &self.calls, Step::Quit, Call::Quit)
    }
}
