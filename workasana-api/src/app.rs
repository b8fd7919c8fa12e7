/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use workasana_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use workasana_shared::auth::middleware::authenticate;

/// Shared application state
///
/// Cloned into every handler through Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// # Layout
///
/// ```text
/// /health                          public
/// /v1
/// ├── /users                       signup, login, refresh, list (public); me (auth)
/// ├── /tasks                       query, create, mine, update, delete (auth); all (public)
/// ├── /projects                    list, tags (public); create, mine, update, delete (auth)
/// ├── /teams                       list (public); create, update (auth)
/// ├── /tags                        list (public); add (auth)
/// └── /report                      closed, pending, last-week (public)
/// ```
///
/// Protected routes live in their own router with the JWT layer applied via
/// `route_layer`, then get merged with the public ones. Paths shared by both
/// (e.g. `GET /v1/projects` and `POST /v1/projects`) merge per method.
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/users", get(routes::users::list_users))
        .route("/users/signup", post(routes::users::signup))
        .route("/users/login", post(routes::users::login))
        .route("/users/refresh", post(routes::users::refresh))
        .route("/tasks/all", get(routes::tasks::list_all_tasks))
        .route("/projects", get(routes::projects::list_projects))
        .route("/projects/:id/tags", get(routes::tags::project_tags))
        .route("/teams", get(routes::teams::list_teams))
        .route("/tags", get(routes::tags::list_tags))
        .route("/report/closed", get(routes::reports::closed_tasks))
        .route("/report/pending", get(routes::reports::pending_work))
        .route("/report/last-week", get(routes::reports::last_week));

    let protected = Router::new()
        .route("/users/me", get(routes::users::me))
        .route(
            "/tasks",
            get(routes::tasks::query_tasks).post(routes::tasks::create_task),
        )
        .route("/tasks/mine", get(routes::tasks::my_tasks))
        .route(
            "/tasks/:id",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        .route("/projects", post(routes::projects::create_project))
        .route("/projects/mine", get(routes::projects::my_projects))
        .route(
            "/projects/:id",
            put(routes::projects::update_project).delete(routes::projects::delete_project),
        )
        .route("/teams", post(routes::teams::create_team))
        .route("/teams/:id", put(routes::teams::update_team))
        .route("/tags", post(routes::tags::add_tag))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1", public.merge(protected))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
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
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// JWT authentication middleware
///
/// Validates the bearer token and injects an `AuthContext` into request
/// extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret())?;

    tracing::debug!(user_id = %auth.user_id, path = %req.uri().path(), "Authenticated request");
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
