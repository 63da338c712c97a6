use super::SessionContext;

#[test]
fn it_rebinds_keeping_url_and_generation() {
    let ctx = SessionContext::new("abc", "https://example.com", 3);
    let rebound = ctx.rebind("def");

    assert_eq!(rebound.id, "def");
    assert_eq!(rebound.url, "https://example.com");
    assert_eq!(rebound.generation, 3);
    assert_eq!(ctx.id, "abc");
}

#[test]
fn it_replaces_url() {
    let ctx = SessionContext::new("abc", "https://example.com", 1);
    let updated = ctx.with_url("https://example.org");

    assert_eq!(updated.id, "abc");
    assert_eq!(updated.url, "https://example.org");
}
