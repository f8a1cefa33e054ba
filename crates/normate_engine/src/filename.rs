use sha2::{Digest, Sha256};

const PREFIX: &str = "normate-report";

/// Deterministic, filesystem-safe export filename: `normate-report-{job_id}.pdf`.
///
/// Ids that need sanitising get a short hash of the raw id appended so distinct
/// ids never collapse onto the same file.
pub fn export_filename(job_id: &str) -> String {
    let sanitized = sanitize_id(job_id);
    if sanitized == job_id {
        format!("{PREFIX}-{sanitized}.pdf")
    } else {
        format!("{PREFIX}-{sanitized}--{}.pdf", short_hash(job_id))
    }
}

fn sanitize_id(input: &str) -> String {
    let mut compacted = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for c in input.chars() {
        let c = if is_allowed(c) { c } else { '_' };
        if c == '_' {
            if !prev_underscore {
                compacted.push(c);
            }
            prev_underscore = true;
        } else {
            compacted.push(c);
            prev_underscore = false;
        }
    }
    let mut cleaned = compacted.trim_matches(&['_', '.', '-'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "report".to_string();
    }
    if cleaned.len() > 64 {
        let mut end = 64;
        while !cleaned.is_char_boundary(end) {
            end -= 1;
        }
        cleaned.truncate(end);
    }
    cleaned
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
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
