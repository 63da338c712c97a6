pub fn markdown_fixture() -> &'static str {
    return r#"
**Summary** of the page at https://example.com/docs?page=1&sort=asc

The site exposes a `GET /api/items` endpoint, *mostly* used by the dashboard.
---
Anything else you want to know?
"#
    .trim();
}

pub fn untrusted_fixture() -> &'static str {
    return r#"<script>alert("pwned")</script> & <b>bold</b>"#;
}
