use crate::api::handlers::{auth, catalog, characters};
use crate::auth::middleware::{auth_middleware, TOKEN_HEADER};
use crate::types;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI document for every route under `/api`.
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        catalog::list_items,
        catalog::list_quests,
        characters::create_character,
        characters::list_characters,
        characters::get_character,
        characters::update_character,
        characters::get_inventory,
        characters::add_inventory_item,
        characters::get_quests,
        characters::set_quest_status,
    ),
    components(schemas(
        types::RegisterRequest,
        types::RegisterResponse,
        types::UserProfile,
        types::LoginRequest,
        types::TokenResponse,
        types::Character,
        types::CharacterSummary,
        types::CharacterPatch,
        types::CreateCharacterRequest,
        types::CharacterListResponse,
        types::Item,
        types::Quest,
        types::InventoryEntry,
        types::InventoryResponse,
        types::AddInventoryRequest,
        types::QuestProgress,
        types::QuestProgressResponse,
        types::QuestStatus,
        types::QuestStatusRequest,
        types::ItemCatalogResponse,
        types::QuestCatalogResponse,
        types::ErrorResponse,
    )),
    modifiers(&TokenSecurity),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "characters", description = "Characters owned by the caller"),
        (name = "catalog", description = "Item and quest reference data")
    )
)]
pub struct ApiDoc;

struct TokenSecurity;

impl Modify for TokenSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(TOKEN_HEADER))),
            );
        }
    }
}

/// Routes mounted under `/api`.
///
/// Registration, login and the catalogs are public; every character route
/// sits behind [`auth_middleware`].
pub fn create_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        // Public routes (no auth required)
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/items", get(catalog::list_items))
        .route("/quests", get(catalog::list_quests));

    let protected_routes = Router::new()
        // Protected routes (token required)
        .route(
            "/characters",
            get(characters::list_characters).post(characters::create_character),
        )
        .route(
            "/characters/{id}",
            get(characters::get_character).put(characters::update_character),
        )
        .route(
            "/characters/{id}/inventory",
            get(characters::get_inventory).post(characters::add_inventory_item),
        )
        .route("/characters/{id}/quests", get(characters::get_quests))
        .route(
            "/characters/{id}/quests/{quest_id}",
            put(characters::set_quest_status),
        )
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    public_routes.merge(protected_routes)
}

/// The complete application: `/api`, `/health`, API docs and the HTTP layers.
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api", create_router(state.clone()));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route("/api-docs/openapi.json", get(openapi_json));

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

#[cfg(not(feature = "swagger-ui"))]
async fn openapi_json() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}
