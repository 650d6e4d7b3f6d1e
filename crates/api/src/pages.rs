//! HTML served to the login popup window.

/// Message posted to `window.opener` once the code exchange succeeded.
pub const AUTH_SUCCESS_MESSAGE: &str = "dropbox-auth-success";

/// Final page of the login popup: notifies the opener and closes itself.
pub fn login_complete() -> String {
    format!(
        r#"<!doctype html>
<html><head><meta charset="utf-8"><title>Dropbox login</title></head>
<body style="font-family: sans-serif;">
<h2>Authentication complete</h2>
<p>You can return to the application.</p>
<script>
  try {{
    if (window.opener) {{
      window.opener.postMessage({{ type: '{message}' }}, '*');
    }}
  }} catch (e) {{}}
  setTimeout(() => {{ window.close(); }}, 500);
</script>
</body></html>"#,
        message = AUTH_SUCCESS_MESSAGE
    )
}

/// Shown when Dropbox redirects back with an `error` instead of a code.
pub fn login_failed(error: &str, description: Option<&str>) -> String {
    format!(
        "<h1>Authentication error</h1><p>{}: {}</p>",
        escape_html(error),
        escape_html(description.unwrap_or_default())
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
