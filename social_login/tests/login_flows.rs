//! End-to-end login flow scenarios against the public API, with scripted
//! provider responses.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use url::Url;

use social_login::{
    HttpClient, HttpClientError, HttpResponse, InMemoryAccountStore, InMemoryCacheStore,
    InMemoryLinkStore, InMemorySessionStore, LoginOrchestrator, LoginOutcome, Provider,
    ProviderConfig, ProviderRegistry, shared_cache_store,
};

/// Scripted provider transport: responses are served in order, calls counted.
struct ScriptedHttp {
    replies: Mutex<VecDeque<HttpResponse>>,
    call_count: Mutex<usize>,
}

impl ScriptedHttp {
    fn new(replies: Vec<(u16, &str)>) -> Self {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|(status, body)| HttpResponse {
                        status,
                        body: body.to_string(),
                    })
                    .collect(),
            ),
            call_count: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn next(&self) -> Result<HttpResponse, HttpClientError> {
        *self.call_count.lock().unwrap() += 1;
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| HttpClientError::Transport("no scripted response left".to_string()))
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn get(
        &self,
        _url: &str,
        _headers: &[(String, String)],
    ) -> Result<HttpResponse, HttpClientError> {
        self.next()
    }

    async fn post_form(
        &self,
        _url: &str,
        _form: &[(String, String)],
    ) -> Result<HttpResponse, HttpClientError> {
        self.next()
    }
}

struct World {
    orchestrator: LoginOrchestrator,
    http: Arc<ScriptedHttp>,
    accounts: Arc<InMemoryAccountStore>,
    links: Arc<InMemoryLinkStore>,
}

fn world(replies: Vec<(u16, &str)>) -> World {
    let registry = ProviderRegistry::new(vec![
        ProviderConfig::google(
            "google-client-id".to_string(),
            "google-secret".to_string(),
            "https://shop.example/auth/social/callback/google".to_string(),
        ),
        ProviderConfig::facebook(
            "facebook-client-id".to_string(),
            "facebook-secret".to_string(),
            "https://shop.example/auth/social/callback/facebook".to_string(),
        ),
    ])
    .unwrap();

    let http = Arc::new(ScriptedHttp::new(replies));
    let accounts = Arc::new(InMemoryAccountStore::new());
    let links = Arc::new(InMemoryLinkStore::new());

    let orchestrator = LoginOrchestrator::new(
        registry,
        shared_cache_store(InMemoryCacheStore::new()),
        http.clone(),
        Arc::new(InMemorySessionStore::new()),
        accounts.clone(),
        links.clone(),
    );

    World {
        orchestrator,
        http,
        accounts,
        links,
    }
}

fn query_param(url: &str, name: &str) -> Option<String> {
    Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

#[tokio::test]
async fn google_connect_builds_complete_authorization_url() {
    let w = world(vec![]);

    let url = w
        .orchestrator
        .begin_connect("S1", Provider::Google, 1)
        .await
        .unwrap();

    assert_eq!(
        query_param(&url, "client_id").as_deref(),
        Some("google-client-id")
    );
    assert_eq!(
        query_param(&url, "redirect_uri").as_deref(),
        Some("https://shop.example/auth/social/callback/google")
    );
    let scope = query_param(&url, "scope").unwrap();
    assert!(scope.contains("https://www.googleapis.com/auth/userinfo.profile"));
    assert!(scope.contains("https://www.googleapis.com/auth/userinfo.email"));
    assert_eq!(query_param(&url, "response_type").as_deref(), Some("code"));
    assert_eq!(query_param(&url, "access_type").as_deref(), Some("online"));

    // The state is high-entropy and bound to (S1, google): the callback
    // accepts exactly this value
    let state = query_param(&url, "state").unwrap();
    assert!(state.len() >= 43);
}

#[tokio::test]
async fn callback_with_wrong_state_terminates_flow() {
    let w = world(vec![(200, r#"{"access_token":"never-used"}"#)]);

    w.orchestrator
        .begin_connect("S1", Provider::Google, 1)
        .await
        .unwrap();

    let outcome = w
        .orchestrator
        .handle_callback("S1", Provider::Google, "not-the-issued-state", "code", 1)
        .await
        .unwrap();

    assert_eq!(outcome, LoginOutcome::StateMismatch);
    assert_eq!(w.http.calls(), 0, "no token exchange may happen");
    assert_eq!(w.links.link_count(), 0, "no IdentityLink may be created");
}

#[tokio::test]
async fn facebook_first_login_creates_account_link_and_session() {
    let w = world(vec![
        (200, r#"{"access_token":"fb-token"}"#),
        (200, r#"{"id":"123","name":"A B"}"#),
        (
            200,
            r#"{"id":"123","first_name":"A","last_name":"B","email":"a@b.com"}"#,
        ),
    ]);

    let url = w
        .orchestrator
        .begin_connect("S1", Provider::Facebook, 1)
        .await
        .unwrap();
    let state = query_param(&url, "state").unwrap();

    let outcome = w
        .orchestrator
        .handle_callback("S1", Provider::Facebook, &state, "auth-code", 1)
        .await
        .unwrap();
    match &outcome {
        LoginOutcome::Verified(identity) => {
            assert_eq!(identity.provider, Provider::Facebook);
            assert_eq!(identity.external_id, "123");
            assert_eq!(identity.email.as_deref(), Some("a@b.com"));
        }
        other => panic!("Expected Verified, got {other:?}"),
    }
    assert_eq!(w.http.calls(), 3, "exchange, verify, profile");

    let finalized = w.orchestrator.finalize("S1").await.unwrap();
    let rotated = match finalized {
        LoginOutcome::LoggedIn {
            account_id,
            session_id,
        } => {
            assert_ne!(session_id, "S1");
            let account = w.accounts.find_account(&account_id, 1).await;
            assert_eq!(account.first_name, "A");
            assert_eq!(account.last_name, "B");
            assert_eq!(account.email, "a@b.com");
            session_id
        }
        other => panic!("Expected LoggedIn, got {other:?}"),
    };

    assert_eq!(w.links.link_count(), 1);

    // Pending data was consumed: a second finalize is a no-op
    let again = w.orchestrator.finalize(&rotated).await.unwrap();
    assert_eq!(again, LoginOutcome::NoPendingIdentity);
}

// Small extension trait to keep the happy-path assertions readable.
trait FindAccount {
    async fn find_account(&self, id: &str, website_id: i64) -> social_login::LocalAccount;
}

impl FindAccount for InMemoryAccountStore {
    async fn find_account(&self, id: &str, website_id: i64) -> social_login::LocalAccount {
        use social_login::AccountStore;
        self.find_by_id(id, website_id)
            .await
            .unwrap()
            .expect("account should exist")
    }
}

#[tokio::test]
async fn profile_without_email_requires_user_action() {
    let w = world(vec![
        (200, r#"{"access_token":"fb-token"}"#),
        (200, r#"{"id":"123"}"#),
        (200, r#"{"id":"123","first_name":"A","last_name":"B"}"#),
    ]);

    let url = w
        .orchestrator
        .begin_connect("S1", Provider::Facebook, 1)
        .await
        .unwrap();
    let state = query_param(&url, "state").unwrap();

    w.orchestrator
        .handle_callback("S1", Provider::Facebook, &state, "auth-code", 1)
        .await
        .unwrap();

    let outcome = w.orchestrator.finalize("S1").await.unwrap();
    assert_eq!(outcome, LoginOutcome::NeedsEmail(Provider::Facebook));
    assert_eq!(w.accounts.account_count(), 0, "no account may be created");
    assert_eq!(w.links.link_count(), 0);
}

#[tokio::test]
async fn returning_user_resolves_through_existing_link() {
    // Two complete facebook logins with the same external id but a changed
    // profile email: the second login must land on the first account.
    let first_profile =
        r#"{"id":"777","first_name":"A","last_name":"B","email":"old@b.com"}"#;
    let second_profile =
        r#"{"id":"777","first_name":"A","last_name":"B","email":"new@b.com"}"#;

    let w = world(vec![
        (200, r#"{"access_token":"t1"}"#),
        (200, r#"{"id":"777"}"#),
        (200, first_profile),
        (200, r#"{"access_token":"t2"}"#),
        (200, r#"{"id":"777"}"#),
        (200, second_profile),
    ]);

    let url = w
        .orchestrator
        .begin_connect("S1", Provider::Facebook, 1)
        .await
        .unwrap();
    let state = query_param(&url, "state").unwrap();
    w.orchestrator
        .handle_callback("S1", Provider::Facebook, &state, "c1", 1)
        .await
        .unwrap();
    let first = w.orchestrator.finalize("S1").await.unwrap();
    let first_account = match first {
        LoginOutcome::LoggedIn { account_id, .. } => account_id,
        other => panic!("Expected LoggedIn, got {other:?}"),
    };

    let url = w
        .orchestrator
        .begin_connect("S2", Provider::Facebook, 1)
        .await
        .unwrap();
    let state = query_param(&url, "state").unwrap();
    w.orchestrator
        .handle_callback("S2", Provider::Facebook, &state, "c2", 1)
        .await
        .unwrap();
    let second = w.orchestrator.finalize("S2").await.unwrap();
    let second_account = match second {
        LoginOutcome::LoggedIn { account_id, .. } => account_id,
        other => panic!("Expected LoggedIn, got {other:?}"),
    };

    assert_eq!(
        first_account, second_account,
        "external-id match takes precedence over the changed email"
    );
    assert_eq!(w.links.link_count(), 1, "the original link is reused");
    assert_eq!(w.accounts.account_count(), 1);
}
