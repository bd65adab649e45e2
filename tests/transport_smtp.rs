use std::{
    io::{self, BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
    time::Duration,
};

use base64::{engine::general_purpose::STANDARD, Engine};
use lettre::transport::smtp::extension::ClientId;
use outbox::{transport::smtp::SmtpTransport, Attachment, Email, Mode, Outbox};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// What a fake server saw during one session
#[derive(Debug, Default)]
struct Transcript {
    commands: Vec<String>,
    message: String,
}

#[derive(Debug, Clone, Copy)]
struct Replies {
    starttls: &'static str,
    rcpt: &'static str,
}

impl Default for Replies {
    fn default() -> Self {
        Self {
            starttls: "454 4.7.0 TLS not available",
            rcpt: "250 2.1.5 Ok",
        }
    }
}

/// Accepts one connection and answers like a small ESMTP server
fn fake_server(replies: Replies) -> (u16, JoinHandle<Transcript>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        converse(stream, replies).unwrap()
    });
    (port, handle)
}

fn converse(stream: TcpStream, replies: Replies) -> io::Result<Transcript> {
    let mut writer = stream.try_clone()?;
    let mut reader = BufReader::new(stream);
    let mut transcript = Transcript::default();

    writer.write_all(b"220 fake.test ESMTP\r\n")?;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let command = line.trim_end().to_owned();
        transcript.commands.push(command.clone());

        let reply = match command.split(' ').next().unwrap_or_default() {
            "EHLO" => "250-fake.test\r\n250-STARTTLS\r\n250 AUTH PLAIN LOGIN",
            "STARTTLS" => replies.starttls,
            "AUTH" => "235 2.7.0 Accepted",
            "MAIL" => "250 2.1.0 Ok",
            "RCPT" => replies.rcpt,
            "DATA" => {
                writer.write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")?;
                loop {
                    let mut data = String::new();
                    if reader.read_line(&mut data)? == 0 || data == ".\r\n" {
                        break;
                    }
                    transcript.message.push_str(&data);
                }
                "250 2.0.0 queued"
            }
            "QUIT" => {
                writer.write_all(b"221 2.0.0 Bye\r\n")?;
                break;
            }
            _ => "502 5.5.2 Error: command not recognized",
        };
        writer.write_all(format!("{reply}\r\n").as_bytes())?;
    }

    Ok(transcript)
}

fn outbox(port: u16, mode: Mode) -> Outbox {
    Outbox::builder("u", "p", "127.0.0.1", port)
        .sender("me@example.com")
        .mode(mode)
        .debug(true)
        .transport(
            SmtpTransport::new()
                .hello_name(ClientId::Domain("outbox.test".to_owned()))
                .timeout(Some(Duration::from_secs(10))),
        )
        .build()
}

#[test]
fn plain_session_commands() {
    init_logging();
    let (port, server) = fake_server(Replies::default());
    let email = Email::new(["a@b.com", "c@d.com"], "Hello", "Hi there").unwrap();

    outbox(port, Mode::Plain).send(&email, &[]).unwrap();

    let transcript = server.join().unwrap();
    assert_eq!(
        transcript.commands,
        vec![
            "EHLO outbox.test".to_owned(),
            format!("AUTH PLAIN {}", STANDARD.encode("\0u\0p")),
            "MAIL FROM:<me@example.com>".to_owned(),
            "RCPT TO:<a@b.com>".to_owned(),
            "RCPT TO:<c@d.com>".to_owned(),
            "DATA".to_owned(),
            "QUIT".to_owned(),
        ]
    );
    assert!(transcript.message.contains("From: me@example.com\r\n"));
    assert!(transcript.message.contains("To: a@b.com, c@d.com\r\n"));
    assert!(transcript.message.contains("Subject: Hello\r\n"));
}

#[test]
fn refused_starttls_is_a_transport_error() {
    init_logging();
    let (port, server) = fake_server(Replies::default());
    let email = Email::new("a@b.com", "Hello", "Hi there").unwrap();

    let err = outbox(port, Mode::Tls).send(&email, &[]).unwrap_err();
    assert!(err.is_transport(), "{err}");

    let transcript = server.join().unwrap();
    assert_eq!(transcript.commands, ["EHLO outbox.test", "STARTTLS", "QUIT"]);
}

#[test]
fn ssl_starts_with_a_tls_handshake() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut first = [0; 1];
        stream.read_exact(&mut first).unwrap();
        first[0]
    });
    let email = Email::new("a@b.com", "Hello", "Hi there").unwrap();

    let err = outbox(port, Mode::Ssl).send(&email, &[]).unwrap_err();
    assert!(err.is_transport(), "{err}");
    // TLS handshake record
    assert_eq!(server.join().unwrap(), 0x16);
}

#[test]
fn rejected_recipient_is_a_submission_error() {
    init_logging();
    let (port, server) = fake_server(Replies {
        rcpt: "550 5.1.1 No such user",
        ..Replies::default()
    });
    let email = Email::new("nobody@b.com", "Hello", "Hi there").unwrap();

    let err = outbox(port, Mode::Plain).send(&email, &[]).unwrap_err();
    assert!(err.is_submission(), "{err}");

    let transcript = server.join().unwrap();
    assert_eq!(
        &transcript.commands[2..],
        &["MAIL FROM:<me@example.com>", "RCPT TO:<nobody@b.com>", "QUIT"]
    );
}

#[test]
fn login_that_is_not_an_address_needs_a_sender() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let email = Email::new("a@b.com", "Hello", "Hi there").unwrap();

    let err = Outbox::builder("u", "p", "127.0.0.1", port)
        .mode(Mode::Plain)
        .build()
        .send(&email, &[])
        .unwrap_err();
    assert!(err.is_validation(), "{err}");

    listener.set_nonblocking(true).unwrap();
    let accepted = listener.accept().map(|_| ()).map_err(|e| e.kind());
    assert_eq!(accepted, Err(io::ErrorKind::WouldBlock));
}

#[test]
fn invalid_recipient_fails_before_connecting() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let email = Email::new("not an address", "Hello", "Hi there").unwrap();

    let err = outbox(port, Mode::Plain).send(&email, &[]).unwrap_err();
    assert!(err.is_validation(), "{err}");

    listener.set_nonblocking(true).unwrap();
    assert!(listener.accept().is_err());
}

#[test]
fn submitted_lines_stay_short() {
    let (port, server) = fake_server(Replies::default());
    let recipients = (0..40)
        .map(|i| format!("recipient.number{i:02}@example-company.com"))
        .collect::<Vec<_>>();
    let email = Email::builder()
        .recipients(recipients)
        .subject("Отчёт за квартал")
        .body("See attached.")
        .build()
        .unwrap();
    let report = Attachment::from_bytes(format!("{}.pdf", "Отчёт".repeat(60)), vec![7; 300]);

    outbox(port, Mode::Plain).send(&email, &[report]).unwrap();

    let transcript = server.join().unwrap();
    let rcpts = transcript
        .commands
        .iter()
        .filter(|c| c.starts_with("RCPT TO:"))
        .count();
    assert_eq!(rcpts, 40);
    assert!(transcript.message.contains("filename*0*=utf-8''"));
    for line in transcript.message.lines() {
        assert!(line.len() <= 78, "{} chars: {line:?}", line.len());
    }
}
