use sha2::Digest;

/// Number of hex characters kept from the SHA-256 digest for content
/// fingerprints. Long enough for idempotency checks and readable backup names.
pub const CONTENT_HASH_LEN: usize = 16;

/// Deterministic short fingerprint of a text blob.
pub fn content_hash(text: &str) -> String {
    let mut digest = sha256_hex(text.as_bytes());
    digest.truncate(CONTENT_HASH_LEN);
    digest
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Split a file name into its stem and extension (with the leading dot).
/// `CLAUDE.md` -> (`CLAUDE`, `.md`); `Makefile` -> (`Makefile`, ``).
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name, ""),
        Some(idx) => (&file_name[..idx], &file_name[idx..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_deterministic_and_truncated() {
        let first = content_hash("hello");
        assert_eq!(first, content_hash("hello"));
        assert_eq!(first.len(), CONTENT_HASH_LEN);
        assert_eq!(first, "2cf24dba5fb0a30e");
        assert_ne!(first, content_hash("hello "));
    }

    #[test]
    fn empty_hash_matches_truncated_sha256_of_nothing() {
        assert_eq!(content_hash(""), "e3b0c44298fc1c14");
    }

    #[test]
    fn split_file_name_handles_dotfiles_and_missing_extensions() {
        assert_eq!(split_file_name("CLAUDE.md"), ("CLAUDE", ".md"));
        assert_eq!(split_file_name("notes.v2.txt"), ("notes.v2", ".txt"));
        assert_eq!(split_file_name("Makefile"), ("Makefile", ""));
        assert_eq!(split_file_name(".profile"), (".profile", ""));
    }
}
