use std::time::SystemTime;

/// Formats a timestamp for the `Date` header
///
/// [RFC 5322](https://tools.ietf.org/html/rfc5322#section-3.3) allows the
/// `-0000` zone to mean UTC, which is what `httpdate`'s `GMT` is.
pub(crate) fn format_date(time: SystemTime) -> String {
    let mut date = httpdate::fmt_http_date(time);
    if date.ends_with("GMT") {
        date.truncate(date.len() - "GMT".len());
        date.push_str("-0000");
    }
    date
}
