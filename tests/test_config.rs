use courier::config::{Config, split_url};

#[test]
fn test_config_default_without_env() {
    // When COURIER_CONFIG is not set, a single default request is used
    unsafe {
        std::env::remove_var("COURIER_CONFIG");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.requests.len(), 1);
    assert_eq!(cfg.requests[0].url, "http://example.com/");
    assert_eq!(cfg.requests[0].cancel_after_ms, None);
}

#[test]
fn test_config_parses_yaml() {
    let yaml = "\
requests:
  - url: http://localhost:8080/health
  - url: http://example.com/
    cancel_after_ms: 250
";
    let cfg: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.requests.len(), 2);
    assert_eq!(cfg.requests[0].url, "http://localhost:8080/health");
    assert_eq!(cfg.requests[0].cancel_after_ms, None);
    assert_eq!(cfg.requests[1].cancel_after_ms, Some(250));
}

#[test]
fn test_split_url_default_port() {
    let (host, port, path) = split_url("http://example.com/").unwrap();
    assert_eq!(host, "example.com");
    assert_eq!(port, 80);
    assert_eq!(path, "/");
}

#[test]
fn test_split_url_explicit_port_and_query() {
    let (host, port, path) = split_url("http://localhost:8081/search?q=rust").unwrap();
    assert_eq!(host, "localhost");
    assert_eq!(port, 8081);
    assert_eq!(path, "/search?q=rust");
}

#[test]
fn test_split_url_bare_domain_gets_root_path() {
    let (_, _, path) = split_url("http://example.com").unwrap();
    assert_eq!(path, "/");
}

#[test]
fn test_split_url_rejects_https() {
    assert!(split_url("https://example.com/").is_err());
}

#[test]
fn test_split_url_rejects_garbage() {
    assert!(split_url("not a url at all").is_err());
}
