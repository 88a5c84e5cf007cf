//! Case-folded path escaping for the native cache layout (`§3`).
//!
//! The native module cache is case-folded: every uppercase letter `X` in a
//! module name is rewritten to `!x` so that the on-disk layout never depends
//! on filesystem case sensitivity.

/// Escape a module name for use as a native-cache path component.
pub fn escape_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Reverse [`escape_name`], turning `!x` back into `X`.
///
/// # Panics
///
/// Panics if a `!` is not followed by an ASCII lowercase letter; this would
/// indicate a corrupted cache path, which callers should treat as a bug
/// rather than silently ignore.
pub fn unescape_name(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '!' {
            let next = chars
                .next()
                .expect("escaped module name ends with a dangling '!'");
            assert!(
                next.is_ascii_lowercase(),
                "escaped module name has '!' not followed by a lowercase letter"
            );
            out.push(next.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Rewrite every `/` in a module name to `@`, used for signature-store
/// filenames (`§3`).
pub fn slash_to_at(name: &str) -> String {
    name.replace('/', "@")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_uppercase() {
        assert_eq!(escape_name("github.com/BurntSushi/toml"), "github.com/!burnt!sushi/toml");
    }

    #[test]
    fn round_trips() {
        let original = "github.com/BurntSushi/toml";
        let escaped = escape_name(original);
        assert_eq!(unescape_name(&escaped), original);
    }

    #[test]
    fn slash_to_at_rewrites() {
        assert_eq!(slash_to_at("github.com/a/b"), "github.com@a@b");
    }
}
