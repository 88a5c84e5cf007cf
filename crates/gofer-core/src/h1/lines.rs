//! Canonical line-list hashing: the final step shared by every H1 variant.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

/// Hash `lines` the way the upstream `dirhash` package does: join with `\n`,
/// append a trailing `\n`, SHA-256 the result, and prefix the base64 digest
/// with `h1:`.
///
/// Always returns a 47-byte string; callers that skip [`hash_lines`] and
/// build this by hand have a bug.
pub fn hash_lines(lines: &[String]) -> CoreResult<String> {
    let mut joined = lines.join("\n");
    joined.push('\n');

    let digest = Sha256::digest(joined.as_bytes());
    let h1 = format!("h1:{}", BASE64.encode(digest));

    if h1.len() != 47 {
        return Err(CoreError::InternalBug(format!(
            "hash_lines produced {} bytes, expected 47",
            h1.len()
        )));
    }
    Ok(h1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_47_byte_string() {
        let h1 = hash_lines(&["deadbeef  go.mod".to_string()]).unwrap();
        assert_eq!(h1.len(), 47);
        assert!(h1.starts_with("h1:"));
    }

    #[test]
    fn is_deterministic() {
        let a = hash_lines(&["x  y".to_string()]).unwrap();
        let b = hash_lines(&["x  y".to_string()]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn order_matters() {
        let a = hash_lines(&["a  1".to_string(), "b  2".to_string()]).unwrap();
        let b = hash_lines(&["b  2".to_string(), "a  1".to_string()]).unwrap();
        assert_ne!(a, b);
    }
}
