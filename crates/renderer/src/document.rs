use crate::error::RenderError;
use std::path::{Path, PathBuf};

/// plotly.js is loaded from its CDN; the documents carry no local assets.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// JSON that can sit inside a `<script>` element. `<` only ever appears inside
/// JSON strings, where `<` is equivalent.
pub fn script_safe_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

/// Writes a finished document, creating the parent directory when needed.
pub fn write_document(path: &Path, contents: &str) -> Result<PathBuf, RenderError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| RenderError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, contents).map_err(|source| RenderError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), bytes = contents.len(), "Wrote document.");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn script_json_has_no_raw_angle_brackets() {
        let json = serde_json::to_string(&serde_json::json!({ "t": "</script>" })).unwrap();
        let safe = script_safe_json(&json);
        assert!(!safe.contains('<'));
        let back: serde_json::Value = serde_json::from_str(&safe).unwrap();
        assert_eq!(back["t"], "</script>");
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.html");

        let written = write_document(&path, "<html></html>").unwrap();
        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn unwritable_path_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten with a file.
        let result = write_document(dir.path(), "x");
        match result {
            Err(RenderError::Write { path, .. }) => assert_eq!(path, dir.path()),
            other => panic!("expected a write error, got {:?}", other),
        }
    }
}
