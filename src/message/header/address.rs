use std::{
    fmt::{self, Write},
    mem,
};

use email_encoding::headers::writer::EmailWriter;

/// Headers whose value is a list of mailboxes
const ADDRESS_HEADERS: [&str; 6] = ["From", "Sender", "Reply-To", "To", "Cc", "Bcc"];

pub(crate) fn is_address_header(name: &str) -> bool {
    ADDRESS_HEADERS
        .iter()
        .any(|header| header.eq_ignore_ascii_case(name))
}

/// Encodes a comma separated list of mailboxes, such as
/// `Jürgen <j@example.com>, ana@example.com`
pub(crate) fn encode_address_list(name: &str, value: &str) -> String {
    encode_mailboxes(name, split_mailboxes(value))
}

/// Encodes mailboxes given one by one
///
/// Display names go through `quoted_string`, so a non-ASCII name becomes an
/// RFC 2047 encoded word while the address itself is left readable. The list
/// is folded between mailboxes.
pub(crate) fn encode_mailboxes<'a, I>(name: &str, mailboxes: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut encoded = String::new();
    {
        let mut w = EmailWriter::new(&mut encoded, name.len() + ": ".len(), 0, false);
        write_mailboxes(&mut w, mailboxes).expect("writing to a String can't fail");
    }
    encoded
}

fn write_mailboxes<'a, I>(w: &mut EmailWriter<'_>, mailboxes: I) -> fmt::Result
where
    I: IntoIterator<Item = &'a str>,
{
    let mut first = true;
    for mailbox in mailboxes {
        if !mem::take(&mut first) {
            w.write_char(',')?;
            w.space();
        }

        write_mailbox(w, mailbox.trim())?;
    }

    Ok(())
}

fn write_mailbox(w: &mut EmailWriter<'_>, mailbox: &str) -> fmt::Result {
    let (phrase, address) = match mailbox.rfind('<') {
        Some(i) if mailbox.ends_with('>') => (mailbox[..i].trim(), &mailbox[i..]),
        _ => ("", mailbox),
    };

    if !phrase.is_empty() {
        email_encoding::headers::quoted_string::encode(&unquote(phrase), w)?;
        w.space();
    }

    w.folding().write_str(address)
}

/// Removes the quotes around an already quoted display name
fn unquote(phrase: &str) -> String {
    match phrase
        .strip_prefix('"')
        .and_then(|phrase| phrase.strip_suffix('"'))
    {
        Some(inner) => {
            let mut unquoted = String::with_capacity(inner.len());
            let mut chars = inner.chars();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => unquoted.extend(chars.next()),
                    c => unquoted.push(c),
                }
            }
            unquoted
        }
        None => phrase.to_owned(),
    }
}

/// Splits on the commas that aren't inside a quoted name or an angle address
fn split_mailboxes(value: &str) -> Vec<&str> {
    let mut mailboxes = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut in_angle = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '<' if !in_quotes => in_angle = true,
            '>' if !in_quotes => in_angle = false,
            ',' if !in_quotes && !in_angle => {
                mailboxes.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    mailboxes.push(&value[start..]);

    mailboxes.retain(|mailbox| !mailbox.trim().is_empty());
    mailboxes
}
