use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseManager, MemoryStore, PgStore, RecordStore, SharedStore};
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, validate_user_middleware};
use crate::state::AppState;

/// Full application router: public routes plus the authenticated API
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(client_routes())
        .merge(project_routes())
        // route_layer: unmatched paths stay 404 instead of 401
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            validate_user_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    let mut router = Router::new()
        .merge(public_routes())
        .merge(protected)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config));
    }

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
}

fn client_routes() -> Router<AppState> {
    use protected::clients;

    Router::new()
        .route("/clients/", get(clients::list).post(clients::create))
        .route(
            "/clients/:id/",
            get(clients::retrieve)
                .put(clients::put)
                .patch(clients::patch)
                .delete(clients::delete),
        )
}

fn project_routes() -> Router<AppState> {
    use protected::projects;

    Router::new()
        .route("/clients/:client_id/projects/", post(projects::create))
        .route("/projects/", get(projects::list))
        .route(
            "/projects/:id/",
            get(projects::retrieve)
                .put(projects::put)
                .patch(projects::patch)
                .delete(projects::delete),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
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
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Open the configured record store, running migrations when enabled
pub async fn build_store(config: &AppConfig) -> anyhow::Result<SharedStore> {
    match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory record store; data is lost on exit");
            let store = MemoryStore::new();
            for username in &config.database.seed_users {
                let user = store.create_user(username).await?;
                tracing::info!("Seeded user '{}' with id {}", user.username, user.id);
            }
            if config.database.seed_users.is_empty() {
                tracing::warn!("No SEED_USERS given; every protected request will be refused");
            }
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config(seed: &[&str]) -> AppConfig {
        let mut config = AppConfig::development();
        config.database.backend = StoreBackend::Memory;
        config.database.seed_users = seed.iter().map(|s| s.to_string()).collect();
        config
    }

    #[tokio::test]
    async fn memory_store_is_seeded_from_config() {
        let store = build_store(&memory_config(&["alice", "bob"])).await.unwrap();

        let users = store.list_users().await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert!(store.find_user(users[0].id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_seed_users_fail_boot() {
        assert!(build_store(&memory_config(&["alice", "alice"])).await.is_err());
    }
}
