use url::Url;

const SUPPORTED_DOMAINS: [&str; 2] = ["youtube.com", "youtu.be"];

/// http(s) URL on a YouTube host or one of its subdomains
pub fn is_supported_url(input: &str) -> bool {
    let Ok(parsed) = Url::parse(input.trim()) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();

    SUPPORTED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

/// `attachment` disposition with an ASCII fallback and the exact UTF-8 name
pub fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitize_ascii_filename(filename),
        urlencoding::encode(filename)
    )
}

fn sanitize_ascii_filename(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let compact = sanitized.trim();
    if compact.is_empty() {
        "download".to_string()
    } else {
        compact.to_string()
    }
}

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_hosts_are_accepted() {
        assert!(is_supported_url("https://youtu.be/abc123"));
        assert!(is_supported_url("https://www.youtube.com/watch?v=abc123"));
        assert!(is_supported_url("http://m.youtube.com/watch?v=abc123"));
        assert!(is_supported_url("  https://music.youtube.com/watch?v=abc123  "));
        assert!(is_supported_url("https://YOUTU.BE/abc123"));
    }

    #[test]
    fn everything_else_is_rejected() {
        assert!(!is_supported_url(""));
        assert!(!is_supported_url("youtube.com/watch?v=abc123"));
        assert!(!is_supported_url("https://notyoutube.com/watch?v=abc123"));
        assert!(!is_supported_url("https://youtube.com.evil.example/watch"));
        assert!(!is_supported_url("https://example.com/?next=youtube.com"));
        assert!(!is_supported_url("file:///etc/youtube.com"));
    }

    #[test]
    fn disposition_forces_download_and_keeps_unicode_name() {
        let header = content_disposition("Привет-мир.mp3");
        assert!(header.starts_with("attachment; filename=\""));
        assert!(header.contains("filename*=UTF-8''%D0%9F"));
        assert!(header.is_ascii());

        assert_eq!(
            content_disposition("My-Test-Video.mp4"),
            "attachment; filename=\"My-Test-Video.mp4\"; filename*=UTF-8''My-Test-Video.mp4"
        );
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }
}
