//! The build-descriptor (`go.mod`-equivalent) parser: module path plus
//! direct requirements (`§4.C`).

use gofer_schema::{ModuleName, ModuleVersion};

use crate::error::{CoreError, CoreResult};

/// A module path and its direct requirements, as read from a descriptor
/// file.
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// This descriptor's own module path.
    pub module: ModuleName,
    /// Direct `require` entries, version-validated and `/go.mod`-suffix
    /// stripped.
    pub requires: Vec<(ModuleName, ModuleVersion)>,
}

/// Parse descriptor file contents.
///
/// Recognises the `module` directive and both single-line and parenthesised
/// block forms of `require`. `exclude`, `replace`, and `retract` directives
/// (single-line or block) are recognised and skipped without acting on them
/// — real-world descriptor files carry these routinely, and a parser that
/// chokes on every directive it doesn't need would be unusable against
/// them. Any other unrecognised non-empty line is fatal.
///
/// # Errors
///
/// Returns [`CoreError::State`] if no `module` directive is present, or if
/// a `require` entry's name or version fails validation.
pub fn parse_descriptor(text: &str) -> CoreResult<Descriptor> {
    let mut module: Option<ModuleName> = None;
    let mut requires = Vec::new();

    let mut lines = text.lines().peekable();
    while let Some(raw) = lines.next() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("module ") {
            module = Some(ModuleName::parse(rest.trim())?);
            continue;
        }

        if let Some(rest) = line.strip_prefix("require ") {
            let rest = rest.trim();
            if rest == "(" {
                consume_block(&mut lines, |entry| {
                    requires.push(parse_require_entry(entry)?);
                    Ok(())
                })?;
            } else {
                requires.push(parse_require_entry(rest)?);
            }
            continue;
        }

        if is_ignored_directive_start(line) {
            if line.ends_with('(') {
                consume_block(&mut lines, |_| Ok(()))?;
            }
            continue;
        }

        if line == "go" || line.starts_with("go ") || line.starts_with("toolchain ") {
            continue;
        }

        return Err(CoreError::State(format!(
            "unrecognised descriptor directive: {line}"
        )));
    }

    let module = module.ok_or_else(|| CoreError::State("descriptor has no module directive".into()))?;
    Ok(Descriptor { module, requires })
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn is_ignored_directive_start(line: &str) -> bool {
    for directive in ["exclude", "replace", "retract"] {
        if line == directive || line.starts_with(&format!("{directive} ")) {
            return true;
        }
    }
    false
}

fn consume_block(
    lines: &mut std::iter::Peekable<std::str::Lines<'_>>,
    mut on_entry: impl FnMut(&str) -> CoreResult<()>,
) -> CoreResult<()> {
    for raw in lines.by_ref() {
        let line = strip_comment(raw).trim();
        if line == ")" {
            return Ok(());
        }
        if line.is_empty() {
            continue;
        }
        on_entry(line)?;
    }
    Err(CoreError::State("unterminated block in descriptor".into()))
}

fn parse_require_entry(entry: &str) -> CoreResult<(ModuleName, ModuleVersion)> {
    let entry = entry.trim_end_matches("// indirect").trim();
    let mut fields = entry.split_whitespace();
    let name = fields
        .next()
        .ok_or_else(|| CoreError::State(format!("empty require entry: {entry}")))?;
    let version = fields
        .next()
        .ok_or_else(|| CoreError::State(format!("require entry missing version: {entry}")))?;

    Ok((ModuleName::parse(name)?, ModuleVersion::parse(version)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_module_and_single_line_requires() {
        let text = "module github.com/example/mod\n\ngo 1.21\n\nrequire github.com/burntsushi/toml v1.3.2\n";
        let d = parse_descriptor(text).unwrap();
        assert_eq!(d.module.as_str(), "github.com/example/mod");
        assert_eq!(d.requires.len(), 1);
        assert_eq!(d.requires[0].0.as_str(), "github.com/burntsushi/toml");
    }

    #[test]
    fn parses_block_requires_and_skips_replace() {
        let text = "\
module github.com/example/mod

require (
\tgithub.com/burntsushi/toml v1.3.2
\tgithub.com/pkg/errors v0.9.1 // indirect
)

replace github.com/old/name => github.com/new/name v1.0.0
";
        let d = parse_descriptor(text).unwrap();
        assert_eq!(d.requires.len(), 2);
    }

    #[test]
    fn requires_module_directive() {
        assert!(parse_descriptor("require github.com/a/b v1.0.0\n").is_err());
    }

    #[test]
    fn rejects_unrecognised_directive() {
        let text = "module github.com/example/mod\n\nbogus directive here\n";
        assert!(parse_descriptor(text).is_err());
    }
}
