use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Content token: lowercase hex SHA-256 over the UTF-8 bytes. Stable across
/// runs and platforms, so the "no changes" short-circuit survives restarts.
pub fn fingerprint(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

pub fn has_changed(token: &str, last: Option<&str>) -> bool {
    last != Some(token)
}

/// Read the last saved token. An absent file means no prior run observed.
pub fn load_last(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(Some(s.trim().to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).context(format!("Failed to read token file {}", path.display())),
    }
}

pub fn save(path: &Path, token: &str) -> Result<()> {
    std::fs::write(path, token)
        .context(format!("Failed to write token file {}", path.display()))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_hex_digest() {
        let a = fingerprint("<div>hello</div>");
        let b = fingerprint("<div>hello</div>");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn whitespace_differences_count_as_changed() {
        assert_ne!(fingerprint("<div>a</div>"), fingerprint("<div>a</div>\n"));
    }

    #[test]
    fn change_detection() {
        let token = fingerprint("x");
        assert!(has_changed(&token, None));
        assert!(has_changed(&token, Some("something-else")));
        assert!(!has_changed(&token, Some(token.as_str())));
    }

    #[test]
    fn token_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_hash.txt");
        assert_eq!(load_last(&path).unwrap(), None);

        let token = fingerprint("content");
        save(&path, &token).unwrap();
        assert_eq!(load_last(&path).unwrap(), Some(token));
    }
}
