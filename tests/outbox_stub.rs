use outbox::{
    transport::stub::{Call, Step, StubTransport},
    Attachment, Email, Error, Mode, Outbox,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn outbox(stub: &StubTransport, mode: Mode) -> Outbox<StubTransport> {
    Outbox::builder("u", "p", "server", 1234)
        .mode(mode)
        .transport(stub.clone())
        .build()
}

fn email() -> Email {
    Email::new("a@b.com", "s", "b").unwrap()
}

#[test]
fn send_runs_a_full_session() {
    init_logging();
    let stub = StubTransport::new_ok();
    outbox(&stub, Mode::Tls).send(&email(), &[]).unwrap();

    let calls = stub.calls();
    assert_eq!(
        &calls[..4],
        &[
            Call::Connect {
                host: "server".into(),
                port: 1234,
                mode: Mode::Tls,
            },
            Call::StartTls,
            Call::SetDebug(false),
            Call::Login {
                username: "u".into(),
                password: "p".into(),
            },
        ]
    );
    match &calls[4] {
        Call::SendMail { from, to, message } => {
            assert_eq!(from, "u");
            assert_eq!(to, &["a@b.com".to_owned()]);
            assert!(message.contains("From: u\r\n"));
            assert!(message.contains("To: a@b.com\r\n"));
            assert!(message.contains("Subject: s\r\n"));
            assert!(message.contains("Date: "));
        }
        other => panic!("expected SendMail, got {other:?}"),
    }
    assert_eq!(calls[5], Call::Quit);
    assert_eq!(calls.len(), 6);
}

#[test]
fn ssl_and_plain_skip_starttls() {
    for mode in [Mode::Ssl, Mode::Plain] {
        let stub = StubTransport::new_ok();
        outbox(&stub, mode).send(&email(), &[]).unwrap();

        let calls = stub.calls();
        assert!(!calls.contains(&Call::StartTls), "{mode} sent STARTTLS");
        assert_eq!(
            calls[0],
            Call::Connect {
                host: "server".into(),
                port: 1234,
                mode,
            }
        );
    }
}

#[test]
fn debug_flag_reaches_the_session() {
    let stub = StubTransport::new_ok();
    let outbox = Outbox::builder("u", "p", "server", 1234)
        .debug(true)
        .transport(stub.clone())
        .build();
    outbox.login().unwrap();

    assert!(stub.calls().contains(&Call::SetDebug(true)));
}

#[test]
fn failures_are_classified() {
    for step in [Step::Connect, Step::StartTls, Step::Login, Step::Quit] {
        let stub = StubTransport::new_error(step);
        let err = outbox(&stub, Mode::Tls).send(&email(), &[]).unwrap_err();
        assert!(err.is_transport(), "{step:?} should be a transport error");
    }

    let stub = StubTransport::new_error(Step::SendMail);
    let err = outbox(&stub, Mode::Tls).send(&email(), &[]).unwrap_err();
    assert!(err.is_submission());
    assert!(!stub.calls().contains(&Call::Quit));
}

#[test]
fn failed_login_stops_the_session() {
    let stub = StubTransport::new_error(Step::Login);
    outbox(&stub, Mode::Tls).send(&email(), &[]).unwrap_err();

    let calls = stub.calls();
    assert!(matches!(calls.last(), Some(Call::Login { .. })));
    assert!(!calls.iter().any(|c| matches!(c, Call::SendMail { .. })));
}

#[test]
fn every_send_opens_its_own_session() {
    let stub = StubTransport::new_ok();
    let sender = outbox(&stub, Mode::Plain);

    sender
        .scope(|sender| -> Result<(), Error> {
            sender.send(&email(), &[])?;
            sender.send(&email(), &[])
        })
        .unwrap();

    let calls = stub.calls();
    let connects = calls
        .iter()
        .filter(|c| matches!(c, Call::Connect { .. }))
        .count();
    let quits = calls.iter().filter(|c| **c == Call::Quit).count();
    assert_eq!(connects, 2);
    assert_eq!(quits, 2);
}

#[test]
fn scope_alone_does_nothing() {
    let stub = StubTransport::new_ok();
    let value = outbox(&stub, Mode::Tls).scope(|_| 42);

    assert_eq!(value, 42);
    assert!(stub.calls().is_empty());
}

#[test]
fn explicit_from_is_kept() {
    let stub = StubTransport::new_ok();
    let email = Email::builder()
        .recipients("a@b.com")
        .subject("s")
        .body("b")
        .field("From", "Reports <reports@b.com>")
        .build()
        .unwrap();
    outbox(&stub, Mode::Tls).send(&email, &[]).unwrap();

    let message = stub
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::SendMail { message, .. } => Some(message),
            _ => None,
        })
        .unwrap();
    assert!(message.contains("From: Reports <reports@b.com>\r\n"));
    assert!(!message.contains("From: u\r\n"));
}

#[test]
fn attachments_are_submitted() {
    let stub = StubTransport::new_ok();
    let report = Attachment::from_bytes("report.csv", b"a,b\n1,2\n".to_vec());
    outbox(&stub, Mode::Tls).send(&email(), &[report]).unwrap();

    let sent = stub.calls().into_iter().any(|c| match c {
        Call::SendMail { message, .. } => {
            message.contains("Content-Type: multipart/mixed")
                && message.contains("filename=\"report.csv\"")
        }
        _ => false,
    });
    assert!(sent);
}

#[test]
fn sender_is_used_for_envelope_and_from() {
    let stub = StubTransport::new_ok();
    Outbox::builder("u", "p", "server", 1234)
        .sender("me@example.com")
        .transport(stub.clone())
        .build()
        .send(&email(), &[])
        .unwrap();

    let calls = stub.calls();
    assert!(calls.contains(&Call::Login {
        username: "u".into(),
        password: "p".into(),
    }));
    let (from, message) = calls
        .into_iter()
        .find_map(|c| match c {
            Call::SendMail { from, message, .. } => Some((from, message)),
            _ => None,
        })
        .unwrap();
    assert_eq!(from, "me@example.com");
    assert!(message.contains("From: me@example.com\r\n"));
}
