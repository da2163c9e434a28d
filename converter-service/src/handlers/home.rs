use axum::response::Html;

const UPLOAD_FORM: &str = r#"<!doctype html>
<title>Image to PDF Converter</title>
<h1>Upload an image to convert to PDF</h1>
<form method="post" action="/convert" enctype="multipart/form-data">
    <input type="file" name="image" accept="image/*">
    <button type="submit">Convert to PDF</button>
</form>
"#;

pub async fn home() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}
