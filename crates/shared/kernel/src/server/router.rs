use super::{AppState, flags, health};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Liveness endpoints.
pub fn system_router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(health::health_handler))
}

/// Feature flag evaluation and administration.
pub fn flags_router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(flags::enabled_features, flags::update_feature))
        .routes(routes!(flags::get_feature))
        .routes(routes!(flags::registry))
}

/// All kernel routes.
pub fn api_router() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().merge(system_router()).merge(flags_router())
}
