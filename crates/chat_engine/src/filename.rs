use sha2::{Digest, Sha256};

const MAX_STEM_LEN: usize = 60;

/// Deterministic, filesystem-safe transcript filename: `chat-{view}--{short_hash(endpoint, view)}`.
///
/// The extension is left to the caller so the transcript and its manifest share a stem.
pub fn transcript_stem(endpoint: &str, show_chat: &str) -> String {
    let view = sanitize(show_chat);
    let hash = short_hash(&format!("{endpoint}\n{show_chat}"));
    format!("chat-{view}--{hash}")
}

fn sanitize(input: &str) -> String {
    let mut cleaned = String::with_capacity(input.len());
    let mut prev_dash = false;
    for c in input.chars() {
        let keep = c.is_ascii_alphanumeric() || c == '_';
        if keep {
            cleaned.push(c);
            prev_dash = false;
        } else if !prev_dash {
            cleaned.push('-');
            prev_dash = true;
        }
    }
    let mut cleaned = cleaned.trim_matches('-').to_string();
    if cleaned.is_empty() {
        cleaned = "latest".to_string();
    }
    cleaned.truncate(MAX_STEM_LEN);
    cleaned
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
