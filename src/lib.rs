//! Outbox is a small library to build emails and send them through an
//! authenticated SMTP server.
//!
//! An [`Email`] holds the recipients, the subject, and a plain text and/or
//! HTML body. [`Attachment`]s are read into memory when they are created.
//! An [`Outbox`] holds the credentials and connection details. For every
//! message it opens a session, logs in, sends the rendered MIME document
//! and quits.
//!
//! ## Features
//!
//! * `tracing`: log session events with [`tracing`](https://docs.rs/tracing),
//!   enabled by default
//! * `serde`: `Serialize` and `Deserialize` for [`Mode`] and [`ConnectionDetails`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use outbox::{Attachment, Email, Mode, Outbox};
//!
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let email = Email::builder()
//!     .recipients(["nico@example.com", "ana@example.com"])
//!     .subject("Quarterly report")
//!     .body("The report is attached.")
//!     .html_body("<p>The report is <b>attached</b>.</p>")
//!     .field("Reply-To", "finance@example.com")
//!     .build()?;
//! let report = Attachment::from_path("report-Q3.pdf")?;
//!
//! let outbox = Outbox::builder("me@example.com", "hunter2", "smtp.example.com", 465)
//!     .mode(Mode::Ssl)
//!     .build();
//! outbox.send(&email, &[report])?;
//! # Ok(())
//! # }
//! ```
//!
//! For testing, swap the SMTP transport for a
//! [`StubTransport`](transport::stub::StubTransport) with
//! [`OutboxBuilder::transport`].

#![doc(html_root_url = "https://docs.rs/crate/outbox/0.1.0")]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    rust_2018_idioms
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod message;
mod outbox;
pub mod transport;

pub use crate::{
    error::Error,
    message::{Attachment, Email, EmailBuilder, Recipients},
    outbox::{
        ConnectionDetails, Mode, Outbox, OutboxBuilder, SMTP_PORT, SUBMISSIONS_PORT,
        SUBMISSION_PORT,
    },
};
