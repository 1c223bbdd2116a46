use std::time::Duration;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use http::{HeaderValue, Method, header};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{handlers, middleware_layer, state::AppState};

/// Builds the application's router.
///
/// `/login` and `POST /usuarios` are public; every other route passes
/// through [`middleware_layer::auth::require_auth`].
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/usuarios", post(handlers::users::create_user))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/logout", delete(handlers::auth::logout))
        .route("/usuarios/logado", get(handlers::users::logged_in))
        .route("/usuarios/conta", put(handlers::users::update_account))
        .route("/usuarios/celular", put(handlers::users::update_phone))
        .route("/usuarios/email", put(handlers::users::update_email))
        .route("/usuarios/senha", put(handlers::users::change_password))
        .route("/agua", post(handlers::water::create_intake))
        .route(
            "/agua/{timestamp}",
            get(handlers::water::get_intake)
                .put(handlers::water::update_intake)
                .delete(handlers::water::delete_intake),
        )
        .route("/agua/dia/{dia}", get(handlers::water::intakes_of_day))
        .route("/agua/mes/{mes}", get(handlers::water::intakes_of_month))
        .route(
            "/agua/semana/{ano}/{semana}",
            get(handlers::water::intakes_of_week),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
}

/// CORS for the configured browser origins. Unparseable origins are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("⚠️ Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(86400))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use async_trait::async_trait;

    use crate::{
        crypto::token::TokenService,
        error::{AppError, Result},
        repositories::{memory::MemoryStore, whitelist::SessionWhitelist},
    };

    /// A whitelist whose backend is down.
    struct UnavailableWhitelist;

    #[async_trait]
    impl SessionWhitelist for UnavailableWhitelist {
        async fn store(&self, _user_id: i32, _token: &str) -> Result<()> {
            Err(AppError::Internal("whitelist unavailable".to_string()))
        }

        async fn revoke(&self, _user_id: i32, _token: &str) -> Result<()> {
            Err(AppError::Internal("whitelist unavailable".to_string()))
        }

        async fn lookup(&self, _token: &str) -> Result<i32> {
            Err(AppError::Internal("whitelist unavailable".to_string()))
        }
    }

    fn app() -> Router {
        let state = AppState::with_store(
            Arc::new(MemoryStore::new()),
            TokenService::new(b"router-test-secret"),
        );
        router(state)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn registration(email: &str) -> Value {
        json!({
            "nome": "Ana",
            "sobrenome": "Souza",
            "apelido": "Aninha",
            "celular": "11987654321",
            "email": email,
            "sexo": "F",
            "data_nascimento": "1990-04-12",
            "senha": "segredo123"
        })
    }

    async fn register_and_login(app: &Router, email: &str) -> String {
        let created = send(app, "POST", "/usuarios", None, Some(registration(email))).await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let login = send(
            app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": email, "senha": "segredo123" })),
        )
        .await;
        assert_eq!(login.status(), StatusCode::OK);
        body_json(login).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn session_lifecycle() {
        let app = app();
        let token = register_and_login(&app, "ana@example.com").await;

        let me = send(&app, "GET", "/usuarios/logado", Some(&token), None).await;
        assert_eq!(me.status(), StatusCode::OK);
        let profile = body_json(me).await;
        assert_eq!(profile["matricula"], 1);
        assert_eq!(profile["apelido"], "Aninha");
        assert!(profile.get("senha").is_none());

        let logout = send(&app, "DELETE", "/logout", Some(&token), None).await;
        assert_eq!(logout.status(), StatusCode::NO_CONTENT);

        let reused = send(&app, "GET", "/usuarios/logado", Some(&token), None).await;
        assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_routes_require_bearer_token() {
        let app = app();

        let missing = send(&app, "GET", "/usuarios/logado", None, None).await;
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert!(body_json(missing).await["error"].is_string());

        let forged = TokenService::new(b"another-secret").issue(1).unwrap();
        let rejected = send(&app, "GET", "/agua/dia/2024-05-17", Some(&forged), None).await;
        assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn signed_but_unlisted_token_is_rejected() {
        let app = app();
        register_and_login(&app, "ana@example.com").await;

        let unlisted = TokenService::new(b"router-test-secret").issue(1).unwrap();
        let response = send(&app, "GET", "/usuarios/logado", Some(&unlisted), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn whitelist_storage_failure_is_server_error() {
        let mut state = AppState::with_store(
            Arc::new(MemoryStore::new()),
            TokenService::new(b"router-test-secret"),
        );
        state.whitelist = Arc::new(UnavailableWhitelist);
        let app = router(state);

        let token = TokenService::new(b"router-test-secret").issue(1).unwrap();
        let response = send(&app, "GET", "/usuarios/logado", Some(&token), None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Internal server error");
    }

    #[tokio::test]
    async fn wrong_credentials_are_unauthorized() {
        let app = app();
        register_and_login(&app, "ana@example.com").await;

        let wrong_password = send(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": "ana@example.com", "senha": "errada" })),
        )
        .await;
        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

        let unknown = send(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": "bia@example.com", "senha": "segredo123" })),
        )
        .await;
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_registration_is_bad_request() {
        let app = app();

        let mut short_name = registration("ana@example.com");
        short_name["nome"] = json!(" A ");
        let response = send(&app, "POST", "/usuarios", None, Some(short_name)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let mut bad_date = registration("ana@example.com");
        bad_date["data_nascimento"] = json!("12/04/1990");
        let response = send(&app, "POST", "/usuarios", None, Some(bad_date)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let malformed = Request::builder()
            .method("POST")
            .uri("/usuarios")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(malformed).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let app = app();
        register_and_login(&app, "ana@example.com").await;

        let again = send(&app, "POST", "/usuarios", None, Some(registration("ana@example.com"))).await;
        assert_eq!(again.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn account_updates() {
        let app = app();
        let token = register_and_login(&app, "ana@example.com").await;

        let phone = send(
            &app,
            "PUT",
            "/usuarios/celular",
            Some(&token),
            Some(json!({ "celular": "1198765432" })),
        )
        .await;
        assert_eq!(phone.status(), StatusCode::BAD_REQUEST);

        let phone = send(
            &app,
            "PUT",
            "/usuarios/celular",
            Some(&token),
            Some(json!({ "celular": "21912345678" })),
        )
        .await;
        assert_eq!(phone.status(), StatusCode::NO_CONTENT);

        let account = send(
            &app,
            "PUT",
            "/usuarios/conta",
            Some(&token),
            Some(json!({
                "nome": "Ana Maria",
                "sobrenome": "Souza",
                "apelido": "Aninha",
                "sexo": "F",
                "data_nascimento": "1990-04-13"
            })),
        )
        .await;
        assert_eq!(account.status(), StatusCode::NO_CONTENT);

        let profile = body_json(send(&app, "GET", "/usuarios/logado", Some(&token), None).await).await;
        assert_eq!(profile["nome"], "Ana Maria");
        assert_eq!(profile["celular"], "21912345678");
        assert_eq!(profile["data_nascimento"], "1990-04-13");
    }

    #[tokio::test]
    async fn email_update_is_validated() {
        let app = app();
        let token = register_and_login(&app, "ana@example.com").await;
        register_and_login(&app, "bia@example.com").await;

        let invalid = send(
            &app,
            "PUT",
            "/usuarios/email",
            Some(&token),
            Some(json!({ "email": "not-an-email" })),
        )
        .await;
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let taken = send(
            &app,
            "PUT",
            "/usuarios/email",
            Some(&token),
            Some(json!({ "email": "bia@example.com" })),
        )
        .await;
        assert_eq!(taken.status(), StatusCode::CONFLICT);

        let changed = send(
            &app,
            "PUT",
            "/usuarios/email",
            Some(&token),
            Some(json!({ "email": "ana.souza@example.com" })),
        )
        .await;
        assert_eq!(changed.status(), StatusCode::NO_CONTENT);

        let profile = body_json(send(&app, "GET", "/usuarios/logado", Some(&token), None).await).await;
        assert_eq!(profile["email"], "ana.souza@example.com");
    }

    #[tokio::test]
    async fn password_change_requires_current_password() {
        let app = app();
        let token = register_and_login(&app, "ana@example.com").await;

        let wrong = send(
            &app,
            "PUT",
            "/usuarios/senha",
            Some(&token),
            Some(json!({ "senha_atual": "nao-e-essa", "senha_nova": "nova-senha" })),
        )
        .await;
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

        let changed = send(
            &app,
            "PUT",
            "/usuarios/senha",
            Some(&token),
            Some(json!({ "senha_atual": "segredo123", "senha_nova": "nova-senha" })),
        )
        .await;
        assert_eq!(changed.status(), StatusCode::NO_CONTENT);

        let login = send(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "email": "ana@example.com", "senha": "nova-senha" })),
        )
        .await;
        assert_eq!(login.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn water_record_lifecycle() {
        let app = app();
        let token = register_and_login(&app, "ana@example.com").await;

        let created = send(
            &app,
            "POST",
            "/agua",
            Some(&token),
            Some(json!({ "data": "2024-05-17T08:30:00Z", "quantidade": 250 })),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let record = body_json(created).await;
        assert_eq!(record["usuario_matricula"], 1);
        assert_eq!(record["quantidade"], 250);

        let duplicate = send(
            &app,
            "POST",
            "/agua",
            Some(&token),
            Some(json!({ "data": "2024-05-17T08:30:00Z", "quantidade": 100 })),
        )
        .await;
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let fetched = send(&app, "GET", "/agua/2024-05-17T08:30:00Z", Some(&token), None).await;
        assert_eq!(fetched.status(), StatusCode::OK);

        let moved = send(
            &app,
            "PUT",
            "/agua/2024-05-17T08:30:00Z",
            Some(&token),
            Some(json!({ "data": "2024-05-17T09:00:00Z", "quantidade": 300 })),
        )
        .await;
        assert_eq!(moved.status(), StatusCode::NO_CONTENT);

        let day = send(&app, "GET", "/agua/dia/2024-05-17", Some(&token), None).await;
        assert_eq!(day.status(), StatusCode::OK);
        let list = body_json(day).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["quantidade"], 300);

        let deleted = send(&app, "DELETE", "/agua/2024-05-17T09:00:00Z", Some(&token), None).await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let gone = send(&app, "GET", "/agua/2024-05-17T09:00:00Z", Some(&token), None).await;
        assert_eq!(gone.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn invalid_water_payloads_are_bad_request() {
        let app = app();
        let token = register_and_login(&app, "ana@example.com").await;

        for body in [
            json!({ "quantidade": 250 }),
            json!({ "data": "0001-01-01T00:00:00Z", "quantidade": 250 }),
            json!({ "data": "2024-05-17T08:30:00Z", "quantidade": 0 }),
            json!({ "data": "2024-05-17T08:30:00Z" }),
        ] {
            let response = send(&app, "POST", "/agua", Some(&token), Some(body)).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        let bad_path = send(&app, "GET", "/agua/ontem", Some(&token), None).await;
        assert_eq!(bad_path.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn history_queries() {
        let app = app();
        let token = register_and_login(&app, "ana@example.com").await;

        for (instant, amount) in [
            ("2024-01-07T23:00:00Z", 100),
            ("2024-01-08T07:00:00Z", 200),
            ("2024-01-14T22:00:00Z", 300),
            ("2024-02-01T10:00:00Z", 400),
        ] {
            let response = send(
                &app,
                "POST",
                "/agua",
                Some(&token),
                Some(json!({ "data": instant, "quantidade": amount })),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let week = send(&app, "GET", "/agua/semana/2024/2", Some(&token), None).await;
        assert_eq!(week.status(), StatusCode::OK);
        let amounts: Vec<i64> = body_json(week)
            .await
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["quantidade"].as_i64().unwrap())
            .collect();
        assert_eq!(amounts, vec![200, 300]);

        let month = send(&app, "GET", "/agua/mes/2024-01", Some(&token), None).await;
        assert_eq!(body_json(month).await.as_array().unwrap().len(), 3);

        let empty_day = send(&app, "GET", "/agua/dia/2024-03-01", Some(&token), None).await;
        assert_eq!(empty_day.status(), StatusCode::NO_CONTENT);

        let empty_week = send(&app, "GET", "/agua/semana/2024/40", Some(&token), None).await;
        assert_eq!(empty_week.status(), StatusCode::NO_CONTENT);

        for uri in [
            "/agua/semana/2023/53",
            "/agua/semana/2024/abc",
            "/agua/mes/2024-1",
            "/agua/dia/2024-02-30",
        ] {
            let response = send(&app, "GET", uri, Some(&token), None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn records_are_scoped_to_their_owner() {
        let app = app();
        let ana = register_and_login(&app, "ana@example.com").await;
        let bia = register_and_login(&app, "bia@example.com").await;

        let created = send(
            &app,
            "POST",
            "/agua",
            Some(&ana),
            Some(json!({ "data": "2024-05-17T08:30:00Z", "quantidade": 250 })),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);

        let other = send(&app, "GET", "/agua/dia/2024-05-17", Some(&bia), None).await;
        assert_eq!(other.status(), StatusCode::NO_CONTENT);
    }
}
