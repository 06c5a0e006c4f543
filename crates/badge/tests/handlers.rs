//! Request Handler Tests

use credibil_badge::achievement::AchievementStatus;
use credibil_badge::config::Config;
use credibil_badge::context::RequestContext;
use credibil_badge::registry;
use credibil_badge::types::{
    InitIssuanceRequest, IssueCredentialRequest, StatusListRequest, StoragesRequest,
};
use credibil_badge::{Error, Request};
use http::StatusCode;
use serde_json::{Map, Value, json};
use test_utils::{Platform, data};
use uuid::Uuid;

async fn setup() -> (Platform, Config) {
    let provider = Platform::new();
    let config = data::config();
    registry::create_issuers(&provider, &config).await.expect("should create issuer");
    (provider, config)
}

fn context() -> RequestContext {
    RequestContext::new(data::BASE_URL)
}

fn init_request(
    credential_uuid: &str, storage_id: &str,
) -> Request<InitIssuanceRequest, RequestContext> {
    Request {
        body: InitIssuanceRequest {
            credential_uuid: credential_uuid.to_string(),
            storage_id: storage_id.to_string(),
            issuer_id: None,
        },
        headers: context(),
    }
}

// Should hand a mobile wallet off with a deep link, QR code and app links,
// then issue the credential the wallet requests.
#[tokio::test]
async fn mobile_wallet() {
    let (provider, config) = setup().await;
    let achievement = data::program();
    provider.add_achievement(achievement.clone());

    // --------------------------------------------------
    // The learner chooses the Learner Credential Wallet
    // --------------------------------------------------
    let request = init_request(&achievement.uuid.to_string(), "lc_wallet");
    let response =
        credibil_badge::handle(&config, request, &provider).await.expect("should init issuance");

    assert_eq!(response.status, StatusCode::OK);
    let deeplink = response.deeplink.clone().expect("should have deep link");
    assert!(deeplink.starts_with("dccrequest://request?issuer=did%3Akey%3A"));
    assert!(deeplink.contains("&auth_type=bearer&"));
    assert!(deeplink.ends_with("&vp_version=1.1"));
    assert!(response.qrcode.as_deref().is_some_and(|q| q.starts_with("data:image/png;base64,")));
    assert!(response.app_link_android.is_some());
    assert!(response.app_link_ios.is_some());
    assert!(response.redirect.is_none());

    // --------------------------------------------------
    // The wallet requests the credential
    // --------------------------------------------------
    let challenge = deeplink
        .split('&')
        .find_map(|p| p.strip_prefix("challenge="))
        .expect("should have challenge");
    let issuance_line_uuid = Uuid::parse_str(challenge).expect("should be a uuid");

    let Value::Object(data) = json!({"holder": "did:example:learner"}) else { unreachable!() };
    let request = Request {
        body: IssueCredentialRequest { issuance_line_uuid, data },
        headers: context(),
    };
    let response =
        credibil_badge::handle(&config, request, &provider).await.expect("should issue credential");

    assert_eq!(response.status, StatusCode::CREATED);
    let credential = &response.body.0;
    assert_eq!(credential["credentialSubject"]["id"], json!("did:example:learner"));
    assert_eq!(credential["credentialStatus"]["statusListIndex"], json!("0"));
    assert!(credential.get("proof").is_some());
}

// Should ask the API layer to redirect to a web wallet.
#[tokio::test]
async fn web_wallet() {
    let (provider, config) = setup().await;
    let achievement = data::course();
    provider.add_achievement(achievement.clone());

    let request = init_request(&achievement.uuid.to_string(), data::WEB_WALLET_ID);
    let response =
        credibil_badge::handle(&config, request, &provider).await.expect("should init issuance");

    assert_eq!(response.redirect, Some(true));
    assert_eq!(response.deeplink.as_deref(), Some("https://wallet.example.com/receive"));
    assert!(response.app_link_android.is_none());
}

// Should reject malformed init requests.
#[tokio::test]
async fn init_invalid() {
    let (provider, config) = setup().await;
    let achievement = data::program();
    provider.add_achievement(achievement.clone());

    let Err(Error::InvalidRequest(msg)) =
        credibil_badge::handle(&config, init_request("", "lc_wallet"), &provider).await
    else {
        panic!("should be invalid");
    };
    assert_eq!(msg, "`credential_uuid`: Mandatory data is missing");

    let Err(Error::InvalidRequest(_)) =
        credibil_badge::handle(&config, init_request("not-a-uuid", "lc_wallet"), &provider).await
    else {
        panic!("should be invalid");
    };

    let request = init_request(&achievement.uuid.to_string(), "");
    let Err(Error::InvalidRequest(_)) = credibil_badge::handle(&config, request, &provider).await
    else {
        panic!("should be invalid");
    };
}

// Should report unknown achievements and storages.
#[tokio::test]
async fn init_not_found() {
    let (provider, config) = setup().await;
    let achievement = data::program();
    provider.add_achievement(achievement.clone());

    let request = init_request(&Uuid::new_v4().to_string(), "lc_wallet");
    let Err(Error::NotFound(_)) = credibil_badge::handle(&config, request, &provider).await else {
        panic!("should be not found");
    };

    let request = init_request(&achievement.uuid.to_string(), "paper_wallet");
    let Err(Error::NotFound(msg)) = credibil_badge::handle(&config, request, &provider).await
    else {
        panic!("should be not found");
    };
    assert!(msg.contains("lc_wallet, web_wallet"), "{msg}");
}

// Should refuse to issue a revoked achievement with a conflict status.
#[tokio::test]
async fn issue_revoked() {
    let (provider, config) = setup().await;
    let achievement = data::program();
    provider.add_achievement(achievement.clone());

    let request = init_request(&achievement.uuid.to_string(), "lc_wallet");
    let response =
        credibil_badge::handle(&config, request, &provider).await.expect("should init issuance");
    let deeplink = response.deeplink.clone().expect("should have deep link");
    let challenge = deeplink
        .split('&')
        .find_map(|p| p.strip_prefix("challenge="))
        .expect("should have challenge");

    provider
        .set_achievement_status(&achievement.uuid, AchievementStatus::Revoked)
        .await
        .expect("should revoke");

    let request = Request {
        body: IssueCredentialRequest {
            issuance_line_uuid: Uuid::parse_str(challenge).expect("should be a uuid"),
            data: Map::new(),
        },
        headers: context(),
    };
    let err =
        credibil_badge::handle(&config, request, &provider).await.expect_err("should not issue");
    assert_eq!(err.status(), StatusCode::CONFLICT);
}

// Should serve the status list only for registered issuers.
#[tokio::test]
async fn status_list() {
    let (provider, config) = setup().await;

    let request = Request {
        body: StatusListRequest { issuer_id: config.default_issuer.id.clone() },
        headers: context(),
    };
    let response =
        credibil_badge::handle(&config, request, &provider).await.expect("should issue list");
    assert_eq!(response.body.0["type"][1], json!("StatusList2021Credential"));

    let request = Request {
        body: StatusListRequest { issuer_id: "did:key:unknown".to_string() },
        headers: context(),
    };
    let err =
        credibil_badge::handle(&config, request, &provider).await.expect_err("should not issue");
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

// Should list the storages offered to users.
#[tokio::test]
async fn storages() {
    let (provider, config) = setup().await;

    let response =
        credibil_badge::handle(&config, StoragesRequest, &provider).await.expect("should list");
    let ids = response.0.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["lc_wallet", "web_wallet"]);
}
