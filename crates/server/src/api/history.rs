//! History ledger page.

use axum::{extract::State, response::Html};
use std::sync::Arc;

use batchdl_core::{HistoryEntry, HistoryKind};

use crate::state::AppState;

/// Render the full cumulative ledger, oldest first.
pub async fn get_history(State(state): State<Arc<AppState>>) -> Html<String> {
    let entries = state.orchestrator().history().all().await;
    Html(render_history(&entries))
}

fn render_history(entries: &[HistoryEntry]) -> String {
    let mut rows = String::new();
    for entry in entries {
        let kind = match entry.kind {
            HistoryKind::Completed => "completed",
            HistoryKind::Error => "error",
            HistoryKind::Skipped => "skipped",
            HistoryKind::Archived => "archived",
        };
        let url = entry.url.as_deref().unwrap_or("-");
        let file = entry
            .file_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        let detail = entry.detail.as_deref().unwrap_or("");
        rows.push_str(&format!(
            "<tr class=\"{kind}\"><td>{}</td><td>{kind}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            escape(url),
            escape(&file),
            escape(detail),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>batchdl - history</title>
  <style>
    body {{ font-family: sans-serif; max-width: 1000px; margin: 2em auto; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ border: 1px solid #ccc; padding: 0.4em 0.6em; text-align: left; }}
    .completed {{ color: #070; }}
    .error {{ color: #b00; }}
  </style>
</head>
<body>
  <h1>History ({} entries)</h1>
  <table>
    <thead>
      <tr><th>Time</th><th>Kind</th><th>URL</th><th>File</th><th>Detail</th></tr>
    </thead>
    <tbody>
{}    </tbody>
  </table>
  <p><a href="/">New batch</a> &middot; <a href="/progress">Progress</a></p>
</body>
</html>
"#,
        entries.len(),
        rows
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_render_includes_entries() {
        let entries = vec![
            HistoryEntry::completed("http://example.com/a.bin", Path::new("/d/b/a.bin")),
            HistoryEntry::failed("http://example.com/bad", "connection reset"),
        ];
        let html = render_history(&entries);
        assert!(html.contains("History (2 entries)"));
        assert!(html.contains("http://example.com/a.bin"));
        assert!(html.contains("connection reset"));
    }

    #[test]
    fn test_render_escapes_markup() {
        let entries = vec![HistoryEntry::failed(
            "http://example.com/<script>",
            "boom & bust",
        )];
        let html = render_history(&entries);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("boom &amp; bust"));
    }
}
