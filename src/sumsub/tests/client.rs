use std::time::Duration;

use sumsub::{
    signer::{ACCESS_SIG_HEADER, ACCESS_TS_HEADER, APP_TOKEN_HEADER},
    RequestSigner, SumsubClient, SumsubConfig, SumsubError,
};
use wiremock::{
    matchers::{header, method, path},
    Match, Mock, MockServer, Request, ResponseTemplate,
};

const KEY: &str = "test-app-token";
const SECRET: &str = "test-secret";

/// Accepts only requests whose signature headers verify against `SECRET`.
struct ValidSignature;

impl Match for ValidSignature {
    fn matches(&self, request: &Request) -> bool {
        let header = |name: &str| {
            request
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let (Some(ts), Some(sig)) = (header(ACCESS_TS_HEADER), header(ACCESS_SIG_HEADER)) else {
            return false;
        };
        let Ok(ts) = ts.parse::<u64>() else {
            return false;
        };

        let mut path_and_query = request.url.path().to_string();
        if let Some(query) = request.url.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        RequestSigner::new(KEY, SECRET)
            .and_then(|signer| {
                signer.sign(
                    request.method.as_str(),
                    &path_and_query,
                    Some(request.body.as_slice()),
                    ts,
                )
            })
            .map(|signed| signed.signature() == sig)
            .unwrap_or(false)
    }
}

fn client(server: &MockServer) -> SumsubClient {
    let mut config = SumsubConfig::new(KEY, SECRET);
    config.base_url = server.uri();
    SumsubClient::new(&config).unwrap()
}

#[tokio::test]
async fn get_applicant_returns_raw_body() {
    let server = MockServer::start().await;
    let body = r#"{"id":"applicant-1","inspectionId":"insp-1","externalUserId":"42"}"#;
    Mock::given(method("GET"))
        .and(path("/resources/applicants/-;externalUserId=42/one"))
        .and(header(APP_TOKEN_HEADER, KEY))
        .and(ValidSignature)
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server).get_applicant("42").await.unwrap();
    assert_eq!(response, body);
}

#[tokio::test]
async fn provider_error_body_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resources/applicants/-;externalUserId=404/one"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string(r#"{"description":"Applicant not found","code":404}"#),
        )
        .mount(&server)
        .await;

    let err = client(&server).get_applicant("404").await.unwrap_err();
    match err {
        SumsubError::Api { code, description } => {
            assert_eq!(code, 404);
            assert_eq!(description, "Applicant not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_keeps_status_and_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client(&server).get_applicant("1").await.unwrap_err();
    assert_eq!(err.to_string(), "provider returned 502: bad gateway");
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = SumsubConfig::new(KEY, SECRET);
    config.base_url = server.uri();
    config.timeout = Duration::from_millis(100);
    let client = SumsubClient::new(&config).unwrap();

    let err = client.get_applicant("slow").await.unwrap_err();
    assert!(matches!(err, SumsubError::Timeout));
    assert_eq!(err.to_string(), "timeout");
}

#[tokio::test]
async fn unreachable_provider_is_a_transport_error() {
    let mut config = SumsubConfig::new(KEY, SECRET);
    config.base_url = "http://127.0.0.1:1".into();
    let client = SumsubClient::new(&config).unwrap();

    let err = client.get_applicant("1").await.unwrap_err();
    assert!(matches!(err, SumsubError::Transport(_)));
}

#[tokio::test]
async fn document_metadata_is_signed_and_returned() {
    let server = MockServer::start().await;
    let body = r#"{"items":[{"id":"img-1"},{"id":"img-2"}]}"#;
    Mock::given(method("GET"))
        .and(path("/resources/applicants/applicant-1/metadata/resources"))
        .and(ValidSignature)
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let response = client(&server)
        .get_document_metadata("applicant-1")
        .await
        .unwrap();
    assert_eq!(response, body);
}

#[tokio::test]
async fn document_image_is_base64_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resources/inspections/insp-1/resources/img-1"))
        .and(ValidSignature)
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
        .mount(&server)
        .await;

    let image = client(&server)
        .get_document_image("insp-1", "img-1")
        .await
        .unwrap();
    assert_eq!(image.as_deref(), Some("aGVsbG8="));
}

#[tokio::test]
async fn missing_document_image_is_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/resources/inspections/insp-1/resources/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let image = client(&server)
        .get_document_image("insp-1", "gone")
        .await
        .unwrap();
    assert_eq!(image, None);
}

#[test]
fn missing_credentials_fail_before_any_request() {
    let err = SumsubClient::new(&SumsubConfig::new("", SECRET)).unwrap_err();
    assert!(matches!(err, SumsubError::MissingCredential("provider_key")));

    let err = SumsubClient::new(&SumsubConfig::new(KEY, "")).unwrap_err();
    assert!(matches!(err, SumsubError::MissingCredential("provider_secret")));
}

#[tokio::test]
async fn ids_are_percent_encoded_and_signed_as_sent() {
    let server = MockServer::start().await;
    let cases = [
        ("a b", "a%20b"),
        ("x#y", "x%23y"),
        ("é", "%C3%A9"),
        ("a/b", "a%2Fb"),
    ];
    for (id, encoded) in cases {
        Mock::given(method("GET"))
            .and(path(format!(
                "/resources/applicants/-;externalUserId={encoded}/one"
            )))
            .and(ValidSignature)
            .respond_with(ResponseTemplate::new(200).set_body_string(id))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client(&server);
    for (id, _) in cases {
        assert_eq!(client.get_applicant(id).await.unwrap(), id);
    }
}

#[tokio::test]
async fn base_url_path_prefix_is_kept_and_signed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sumsub/resources/inspections/insp%201/resources/img-1"))
        .and(ValidSignature)
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = SumsubConfig::new(KEY, SECRET);
    config.base_url = format!("{}/sumsub/", server.uri());
    let client = SumsubClient::new(&config).unwrap();

    let image = client.get_document_image("insp 1", "img-1").await.unwrap();
    assert_eq!(image.as_deref(), Some("aGVsbG8="));
}

#[test]
fn malformed_base_url_is_rejected() {
    let mut config = SumsubConfig::new(KEY, SECRET);
    config.base_url = "not a url".into();
    assert!(matches!(
        SumsubClient::new(&config),
        Err(SumsubError::InvalidBaseUrl(_))
    ));

    config.base_url = "mailto:kyc@example.com".into();
    assert!(matches!(
        SumsubClient::new(&config),
        Err(SumsubError::InvalidBaseUrl(_))
    ));
}
