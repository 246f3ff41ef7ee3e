//! Upload form

use axum::{response::Html, routing::get, Router};

use crate::state::AppState;

const UPLOAD_FORM: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Upload HTML pages</title>
</head>
<body>
  <h1>Upload HTML pages</h1>
  <form action="/api/upload" method="post" enctype="multipart/form-data">
    <input type="file" name="files" accept=".html" multiple required>
    <button type="submit">Upload</button>
  </form>
  <p>Uploaded pages are served at <code>/up/&lt;name&gt;</code>.</p>
</body>
</html>
"#;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(upload_form))
}

async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}
