use super::*;

#[test]
fn mime_follows_extension() {
    assert_eq!(mime_for("pile.PNG"), "image/png");
    assert_eq!(mime_for("clip.mov"), "video/quicktime");
    assert_eq!(mime_for("no-extension"), "image/jpeg");
}

#[test]
fn data_url_wraps_base64() {
    assert_eq!(data_url("image/png", b"hi"), "data:image/png;base64,aGk=");
}

#[test]
fn orders_advance_parses() {
    let cli = Cli::try_parse_from([
        "ecoclear-cli",
        "--role",
        "DRIVER",
        "--actor",
        "00000000-0000-0000-0000-00000000d001",
        "orders",
        "advance",
        "00000000-0000-0000-0000-000000000001",
        "arrived_pickup",
    ])
    .unwrap();
    assert_eq!(cli.role.as_deref(), Some("DRIVER"));
    assert!(matches!(cli.command, Command::Orders(_)));
}

#[tokio::test]
async fn api_request_requires_identity() {
    let ctx = CliContext { base_url: "http://127.0.0.1:9".into(), role: None, actor: None };
    let err = api_request(&ctx, reqwest::Method::GET, "/api/orders", None).await.unwrap_err();
    assert!(matches!(err, CliError::MissingIdentity));
}
