use askama::Template;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::{TypedHeader, headers};
use serde::Deserialize;
use std::sync::Arc;

use social_login::{LoginOrchestrator, LoginOutcome, Provider, SOCIAL_ROUTE_PREFIX};

use super::config::{SOCIAL_REDIRECT_HOME, SOCIAL_REDIRECT_LOGIN};
use super::error::IntoResponseError;
use super::session::{ensure_session_id, session_id_from_cookies, set_session_cookie};

/// Shared state for the social-login routes.
#[derive(Clone)]
pub struct SocialLoginState {
    pub orchestrator: Arc<LoginOrchestrator>,
    /// Website scope used when the request does not carry one.
    pub default_website_id: i64,
}

pub fn social_login_router(state: SocialLoginState) -> Router {
    Router::new()
        .route("/connect/{provider}", get(connect))
        .route("/callback/{provider}", get(callback))
        .route("/finalize", get(finalize))
        .with_state(state)
}

#[derive(Deserialize)]
struct ConnectParams {
    scope: Option<i64>,
}

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    /// `popup` (default) closes the opened window and forwards the opener;
    /// `redirect` sends the browser straight to the finalize endpoint.
    client: Option<String>,
    scope: Option<i64>,
}

#[derive(Template)]
#[template(path = "popup_close.j2")]
struct PopupCloseTemplate {
    finalize_url: String,
}

fn parse_provider(raw: &str) -> Result<Provider, (StatusCode, String)> {
    raw.parse()
        .map_err(|_| (StatusCode::NOT_FOUND, "Unknown provider".to_string()))
}

fn finalize_url() -> String {
    format!("{}/finalize", SOCIAL_ROUTE_PREFIX.as_str())
}

async fn connect(
    State(state): State<SocialLoginState>,
    Path(provider): Path<String>,
    Query(params): Query<ConnectParams>,
    cookies: Option<TypedHeader<headers::Cookie>>,
) -> Result<(HeaderMap, Redirect), (StatusCode, String)> {
    let provider = parse_provider(&provider)?;
    let cookies = cookies.map(|TypedHeader(c)| c);
    let (session_id, fresh_session) = ensure_session_id(cookies.as_ref()).map_err(|e| {
        tracing::error!("Failed to mint a session id: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Something went wrong. Please try again.".to_string(),
        )
    })?;
    let website_id = params.scope.unwrap_or(state.default_website_id);

    let auth_url = state
        .orchestrator
        .begin_connect(&session_id, provider, website_id)
        .await
        .into_response_error()?;

    let mut headers = HeaderMap::new();
    if fresh_session {
        set_session_cookie(&mut headers, &session_id);
    }
    Ok((headers, Redirect::to(&auth_url)))
}

async fn callback(
    State(state): State<SocialLoginState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    cookies: Option<TypedHeader<headers::Cookie>>,
) -> Result<Response, (StatusCode, String)> {
    let provider = parse_provider(&provider)?;
    let cookies = cookies.map(|TypedHeader(c)| c);
    // No session cookie means no state token was ever issued for this
    // browser; the flow below reports that as a state mismatch.
    let session_id = session_id_from_cookies(cookies.as_ref()).unwrap_or_default();
    let website_id = params.scope.unwrap_or(state.default_website_id);

    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        tracing::error!("Callback for {} arrived without a code", provider);
        return Ok(outcome_message(&LoginOutcome::ExchangeFailed(
            "Unspecified OAuth error occurred.".to_string(),
        ))
        .into_response());
    };

    let outcome = state
        .orchestrator
        .handle_callback(
            &session_id,
            provider,
            params.state.as_deref().unwrap_or_default(),
            code,
            website_id,
        )
        .await
        .into_response_error()?;

    match outcome {
        LoginOutcome::Verified(_) => {
            if params.client.as_deref() == Some("redirect") {
                Ok(Redirect::to(&finalize_url()).into_response())
            } else {
                let template = PopupCloseTemplate {
                    finalize_url: finalize_url(),
                };
                let html = template
                    .render()
                    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
                Ok(Html(html).into_response())
            }
        }
        failure => Ok(outcome_message(&failure).into_response()),
    }
}

async fn finalize(
    State(state): State<SocialLoginState>,
    cookies: Option<TypedHeader<headers::Cookie>>,
) -> Result<Response, (StatusCode, String)> {
    let cookies = cookies.map(|TypedHeader(c)| c);
    let Some(session_id) = session_id_from_cookies(cookies.as_ref()) else {
        return Ok(Redirect::to(SOCIAL_REDIRECT_HOME.as_str()).into_response());
    };

    let outcome = state
        .orchestrator
        .finalize(&session_id)
        .await
        .into_response_error()?;

    Ok(match outcome {
        LoginOutcome::LoggedIn {
            session_id: rotated_id,
            ..
        } => {
            let mut headers = HeaderMap::new();
            set_session_cookie(&mut headers, &rotated_id);
            (headers, Redirect::to(SOCIAL_REDIRECT_HOME.as_str())).into_response()
        }
        LoginOutcome::NoPendingIdentity => {
            Redirect::to(SOCIAL_REDIRECT_HOME.as_str()).into_response()
        }
        failure => {
            let message = outcome_message(&failure);
            let target = format!(
                "{}?error={}",
                SOCIAL_REDIRECT_LOGIN.as_str(),
                urlencoding::encode(&message)
            );
            Redirect::to(&target).into_response()
        }
    })
}

/// The single human-readable message for each failure outcome. No stack
/// traces, no internal identifiers.
fn outcome_message(outcome: &LoginOutcome) -> String {
    match outcome {
        LoginOutcome::StateMismatch => {
            "Warning! State mismatch. Authentication attempt may have been compromised."
                .to_string()
        }
        LoginOutcome::ExchangeFailed(message) => message.clone(),
        LoginOutcome::VerificationFailed => "Unspecified OAuth error occurred.".to_string(),
        LoginOutcome::ProfileUnavailable(_) => {
            "Could not retrieve your profile from the provider. Please try again.".to_string()
        }
        LoginOutcome::NeedsEmail(provider) => {
            format!("Email is null. Please enter an email in your {provider} profile.")
        }
        LoginOutcome::AccountConflict(message) => message.clone(),
        LoginOutcome::Verified(_)
        | LoginOutcome::LoggedIn { .. }
        | LoginOutcome::NoPendingIdentity => String::new(),
    }
}
