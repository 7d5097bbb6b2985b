//! Static fallback page served when no SSR handler is configured.

/// Minimal HTML shell that leaves rendering to the client bootstrap script
pub fn fallback_html(client_entry: &str, title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
</head>
<body>
    <div id="root"></div>
    <script type="module" src="{client_entry}"></script>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_client_entry() {
        let html = fallback_html("/assets/entry.client.js", "App");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<script type="module" src="/assets/entry.client.js"></script>"#));
        assert!(html.contains("<title>App</title>"));
    }
}
