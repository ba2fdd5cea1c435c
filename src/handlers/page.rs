use axum::response::Html;
use strum::IntoEnumIterator;

use crate::{media::OutputFormat, utils::escape_html};

/// Error feedback shown above the form. Lives for exactly one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice(pub String);

impl Notice {
    pub fn error(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

/// Values to put back into the form after a failed submission
#[derive(Debug, Default)]
pub struct FormValues<'a> {
    pub url: &'a str,
    pub format: Option<OutputFormat>,
}

pub fn render_page(notices: &[Notice], values: &FormValues<'_>) -> Html<String> {
    let notices_html: String = notices
        .iter()
        .map(|notice| format!("<p class=\"notice error\">{}</p>\n", escape_html(&notice.0)))
        .collect();

    let selected = values.format.unwrap_or(OutputFormat::Video);
    let options: String = OutputFormat::iter()
        .map(|format| {
            format!(
                "<label><input type=\"radio\" name=\"format\" value=\"{}\"{}> {}</label>\n",
                format,
                if format == selected { " checked" } else { "" },
                format.label()
            )
        })
        .collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Media Converter</title>
<style>
body {{ font-family: sans-serif; max-width: 40rem; margin: 3rem auto; }}
.notice {{ padding: .5rem 1rem; border-radius: 4px; }}
.error {{ background: #fde2e2; color: #8a1f1f; }}
input[type=url] {{ width: 100%; padding: .4rem; }}
</style>
</head>
<body>
<h1>Media Converter</h1>
{notices}<form method="post" action="/">
<p><input type="url" name="url" placeholder="https://www.youtube.com/watch?v=..." value="{url}" required></p>
<p>{options}</p>
<p><button type="submit">Convert</button></p>
</form>
</body>
</html>
"#,
        notices = notices_html,
        url = escape_html(values.url),
        options = options,
    ))
}
