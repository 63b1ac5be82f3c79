//! Header/footer attribution applied to every generated file

use std::path::Path;

use super::GenerationContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `# ...`
    Hash,
    /// `// ...`
    Slash,
    /// `<!-- ... -->`
    Xml,
}

impl CommentStyle {
    pub fn for_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("go" | "java" | "js" | "ts" | "cs" | "swift" | "rs" | "gradle" | "mod") => {
                CommentStyle::Slash
            }
            Some("md" | "xml" | "csproj" | "html") => CommentStyle::Xml,
            _ => CommentStyle::Hash,
        }
    }

    fn comment(&self, text: &str) -> String {
        match self {
            CommentStyle::Hash => format!("# {}", text),
            CommentStyle::Slash => format!("// {}", text),
            CommentStyle::Xml => format!("<!-- {} -->", text),
        }
    }
}

/// Lines that tooling requires at the very top of a file
fn is_leading_directive(line: &str) -> bool {
    line.starts_with("#!") || line.starts_with("// swift-tools-version")
}

pub fn header_lines(ctx: &GenerationContext) -> Vec<String> {
    vec![
        format!("{} Enterprise Framework {}", ctx.organization, ctx.version),
        format!("Generated by {} {} for {}", crate::NAME, crate::VERSION, ctx.org_key),
        "Do not edit by hand; regenerate instead.".to_string(),
    ]
}

pub fn footer_line(ctx: &GenerationContext) -> String {
    format!("End of generated {} framework file", ctx.org_key)
}

/// Wraps `contents` in the attribution block for `path`'s comment style.
/// A shebang or tools-version line stays on line 1.
pub fn wrap(path: &Path, contents: &str, ctx: &GenerationContext) -> String {
    let style = CommentStyle::for_path(path);

    let (directive, body) = match contents.split_once('\n') {
        Some((first, rest)) if is_leading_directive(first) => (Some(first), rest),
        None if is_leading_directive(contents) => (Some(contents), ""),
        _ => (None, contents),
    };

    let mut out = String::with_capacity(contents.len() + 256);
    if let Some(line) = directive {
        out.push_str(line);
        out.push('\n');
    }
    for line in header_lines(ctx) {
        out.push_str(&style.comment(&line));
        out.push('\n');
    }
    out.push('\n');
    out.push_str(body);
    if !body.is_empty() && !body.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&style.comment(&footer_line(ctx)));
    out.push('\n');
    out
}
