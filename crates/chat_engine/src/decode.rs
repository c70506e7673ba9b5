use chardetng::EncodingDetector;
use chat_logging::{chat_trace, chat_warn};
use encoding_rs::{Encoding, UTF_8};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
    /// Some bytes were invalid for the encoding and became U+FFFD.
    pub lossy: bool,
}

/// Where the chosen encoding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharsetSource {
    ByteOrderMark,
    ContentType,
    ValidUtf8,
    Detected,
}

/// Decodes a response body. The encoding is taken from a BOM, then the
/// `Content-Type` charset; bodies that are valid UTF-8 stay UTF-8 and
/// anything else goes through detection. Invalid sequences are replaced,
/// never rejected.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> DecodedText {
    let (encoding, source) = pick_encoding(bytes, content_type);
    chat_trace!("decoding {} bytes as {} ({:?})", bytes.len(), encoding.name(), source);

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        chat_warn!(
            "response body is not valid {}; invalid bytes replaced",
            encoding.name()
        );
    }
    DecodedText {
        text: text.into_owned(),
        encoding_label: encoding.name().to_string(),
        lossy: had_errors,
    }
}

fn pick_encoding(bytes: &[u8], content_type: Option<&str>) -> (&'static Encoding, CharsetSource) {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return (encoding, CharsetSource::ByteOrderMark);
    }
    if let Some(encoding) = content_type
        .and_then(charset_param)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return (encoding, CharsetSource::ContentType);
    }
    if std::str::from_utf8(bytes).is_ok() {
        return (UTF_8, CharsetSource::ValidUtf8);
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    (detector.guess(None, true), CharsetSource::Detected)
}

/// Value of the `charset` parameter of a media type, unquoted.
fn charset_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']))
    })
}
