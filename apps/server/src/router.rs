use axum::Router;
use sf_kernel::server::AppState;
use sf_kernel::server::router::api_router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(
    title = "School Finder API",
    description = "Feature flag evaluation and administration"
))]
struct ApiDoc;

#[allow(unreachable_pub)]
pub fn init(state: AppState) -> Router {
    let (api_routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    let scalar_routes = Scalar::with_url("/api", api_doc);

    Router::new().merge(api_routes).merge(scalar_routes)
}
