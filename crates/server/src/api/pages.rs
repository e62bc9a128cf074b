//! Inline HTML pages: the submission form and the progress view.

use axum::response::Html;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn progress_page() -> Html<&'static str> {
    Html(PROGRESS_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>batchdl</title>
  <style>
    body { font-family: sans-serif; max-width: 720px; margin: 2em auto; }
    label { display: block; margin-top: 1em; font-weight: bold; }
    textarea, input[type=text], input[type=number] { width: 100%; }
    textarea { height: 10em; }
    .row { margin-top: 0.5em; }
    button { margin-top: 1.5em; padding: 0.5em 2em; }
    #error { color: #b00; margin-top: 1em; }
  </style>
</head>
<body>
  <h1>batchdl</h1>
  <form id="batch-form">
    <label for="urls">URLs (one per line)</label>
    <textarea id="urls" name="urls" placeholder="https://example.com/file.bin"></textarea>

    <label for="folder">Folder name (optional)</label>
    <input type="text" id="folder" name="folder" placeholder="auto-generated when empty">

    <label for="filename_pattern">Filename pattern</label>
    <input type="text" id="filename_pattern" name="filename_pattern" value="{name}.{ext}">

    <label for="parallel_downloads">Parallel downloads</label>
    <input type="number" id="parallel_downloads" name="parallel_downloads" value="5" min="1">

    <div class="row">
      <input type="checkbox" id="auto_zip" name="auto_zip">
      <label for="auto_zip" style="display:inline">Zip the folder when done</label>
    </div>
    <div class="row">
      <input type="checkbox" id="skip_invalid" name="skip_invalid">
      <label for="skip_invalid" style="display:inline">Skip invalid URLs</label>
    </div>

    <label for="cookie_file">Cookie file (for restricted sites)</label>
    <input type="file" id="cookie_file" name="cookie_file">

    <button type="submit">Start download</button>
  </form>
  <div id="error"></div>
  <p><a href="/progress">Progress</a> &middot; <a href="/history">History</a></p>
  <script>
    document.getElementById('batch-form').addEventListener('submit', async (e) => {
      e.preventDefault();
      const resp = await fetch('/start_download', {
        method: 'POST',
        body: new FormData(e.target),
      });
      if (resp.ok) {
        window.location = '/progress';
      } else {
        const body = await resp.json().catch(() => ({ error: resp.statusText }));
        document.getElementById('error').textContent = body.error;
      }
    });
  </script>
</body>
</html>
"#;

// `r##` because the markup itself contains `"#` (href="#").
const PROGRESS_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>batchdl - progress</title>
  <style>
    body { font-family: sans-serif; max-width: 900px; margin: 2em auto; }
    table { border-collapse: collapse; width: 100%; margin-top: 1em; }
    th, td { border: 1px solid #ccc; padding: 0.4em 0.6em; text-align: left; }
    .completed { color: #070; }
    .error { color: #b00; }
    #summary { margin-top: 1em; }
  </style>
</head>
<body>
  <h1>Progress</h1>
  <div id="summary">Loading&hellip;</div>
  <table>
    <thead>
      <tr><th>URL</th><th>Status</th><th>Progress</th><th>File</th></tr>
    </thead>
    <tbody id="tasks"></tbody>
  </table>
  <p>
    <a href="/">New batch</a> &middot;
    <a href="#" id="clear">Clear</a>
  </p>
  <script>
    async function refresh() {
      const resp = await fetch('/get_progress');
      if (!resp.ok) return;
      const data = await resp.json();
      const speed = data.download_speed.toFixed(2);
      document.getElementById('summary').textContent =
        `${data.completed}/${data.total} completed, ${data.errors} errors, ` +
        `${data.skipped} skipped - ${speed} MiB/s` +
        (data.folder ? ` - folder: ${data.folder} (${data.phase})` : '');
      const rows = data.tasks.map(t => {
        const pct = t.progress.toFixed(1);
        const file = t.filename || (t.error || '');
        return `<tr><td>${t.url}</td><td class="${t.status}">${t.status}</td>` +
          `<td>${pct}%</td><td>${file}</td></tr>`;
      });
      document.getElementById('tasks').innerHTML = rows.join('');
    }
    document.getElementById('clear').addEventListener('click', async (e) => {
      e.preventDefault();
      await fetch('/clear_status', { method: 'POST' });
      refresh();
    });
    refresh();
    setInterval(refresh, 1000);
  </script>
</body>
</html>
"##;
