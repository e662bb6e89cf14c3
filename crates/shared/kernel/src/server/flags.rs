//! Feature flag endpoints.

use super::{ApiError, Identity};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use sf_domain::constants::FLAGS_TAG;
use sf_domain::features::{FeatureDefinition, FeatureUpdate, RegistryMetadata};
use sf_flags::{EvaluationContext, FlagStore};
use tracing::info;
use utoipa::ToSchema;

/// Flags that are on for the caller.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct EnabledFeaturesResponse {
    pub enabled_features: Vec<String>,
    pub user_role: String,
    pub user_id: String,
}

/// A single feature definition.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct FeatureResponse {
    pub key: String,
    pub display_name: String,
    pub description: String,
    pub enabled: bool,
    pub rollout_percentage: u8,
    pub allowed_roles: Vec<String>,
    pub environments: Vec<String>,
}

impl From<&FeatureDefinition> for FeatureResponse {
    fn from(feature: &FeatureDefinition) -> Self {
        Self {
            key: feature.key.to_string(),
            display_name: feature.display_name.clone(),
            description: feature.description.clone(),
            enabled: feature.enabled,
            rollout_percentage: feature.rollout_percentage,
            allowed_roles: feature.allowed_roles.clone(),
            environments: feature.environments.names().map(ToOwned::to_owned).collect(),
        }
    }
}

/// Every definition plus registry metadata (administrators only).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegistryResponse {
    pub version: String,
    pub last_updated: Option<String>,
    pub environment: String,
    pub features: Vec<FeatureResponse>,
}

/// Partial update of one flag.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateFeatureRequest {
    pub feature_name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub updates: Option<FeatureUpdate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(super) struct UpdateFeatureResponse {
    pub success: bool,
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/api/feature-flags",
    params(
        ("x-user-id" = String, Header, description = "Authenticated user id"),
        ("x-user-role" = Option<String>, Header, description = "User role, defaults to `user`"),
    ),
    responses(
        (status = OK, description = "Flags enabled for the caller", body = EnabledFeaturesResponse),
        (status = UNAUTHORIZED, description = "No authenticated user"),
    ),
    tag = FLAGS_TAG,
)]
pub(super) async fn enabled_features(
    State(flags): State<FlagStore>,
    identity: Identity,
) -> Result<Json<EnabledFeaturesResponse>, ApiError> {
    let user_id = identity.user_id.ok_or_else(ApiError::unauthorized)?;
    let ctx = EvaluationContext::user(&user_id).role(&identity.role);

    let enabled_features =
        flags.evaluator().enabled_features(&ctx).into_iter().map(|key| key.to_string()).collect();

    Ok(Json(EnabledFeaturesResponse { enabled_features, user_role: identity.role, user_id }))
}

#[utoipa::path(
    get,
    path = "/api/feature-flags/{key}",
    params(("key" = String, Path, description = "Feature key")),
    responses(
        (status = OK, description = "Feature definition", body = FeatureResponse),
        (status = NOT_FOUND, description = "Unknown feature"),
    ),
    tag = FLAGS_TAG,
)]
pub(super) async fn get_feature(
    State(flags): State<FlagStore>,
    Path(key): Path<String>,
) -> Result<Json<FeatureResponse>, ApiError> {
    let registry = flags.snapshot();
    let feature = registry.get(&key).ok_or(sf_flags::FlagError::NotFound { key })?;
    Ok(Json(FeatureResponse::from(feature)))
}

#[utoipa::path(
    get,
    path = "/api/admin/feature-flags",
    params(("x-user-role" = String, Header, description = "Must be `admin`")),
    responses(
        (status = OK, description = "Full registry", body = RegistryResponse),
        (status = UNAUTHORIZED, description = "Caller is not an administrator"),
    ),
    tag = FLAGS_TAG,
)]
pub(super) async fn registry(
    State(flags): State<FlagStore>,
    identity: Identity,
) -> Result<Json<RegistryResponse>, ApiError> {
    if !identity.is_admin() {
        return Err(ApiError::unauthorized());
    }

    let registry = flags.snapshot();
    let RegistryMetadata { version, last_updated, environment } = registry.metadata().clone();

    Ok(Json(RegistryResponse {
        version,
        last_updated,
        environment,
        features: registry.iter().map(FeatureResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/feature-flags",
    params(
        ("x-user-id" = String, Header, description = "Authenticated user id"),
        ("x-user-role" = String, Header, description = "Must be `admin`"),
    ),
    request_body = UpdateFeatureRequest,
    responses(
        (status = OK, description = "Feature updated", body = UpdateFeatureResponse),
        (status = BAD_REQUEST, description = "Missing, malformed or invalid update"),
        (status = UNAUTHORIZED, description = "Caller is not an authenticated administrator"),
        (status = NOT_FOUND, description = "Unknown feature"),
    ),
    tag = FLAGS_TAG,
)]
pub(super) async fn update_feature(
    State(flags): State<FlagStore>,
    identity: Identity,
    request: Result<Json<UpdateFeatureRequest>, JsonRejection>,
) -> Result<Json<UpdateFeatureResponse>, ApiError> {
    if !identity.is_admin() {
        return Err(ApiError::unauthorized());
    }
    let user_id = identity.user_id.ok_or_else(ApiError::unauthorized)?;

    let Json(request) = request.map_err(ApiError::from)?;
    let (Some(feature_name), Some(updates)) = (request.feature_name, request.updates) else {
        return Err(ApiError::BadRequest {
            message: "Feature name and updates are required".into(),
        });
    };
    if feature_name.trim().is_empty() {
        return Err(ApiError::BadRequest { message: "Feature name cannot be empty".into() });
    }
    if updates.is_empty() {
        return Err(ApiError::BadRequest { message: "No updates provided".into() });
    }

    flags.update(&feature_name, &updates)?;
    info!(flag = %feature_name, user = %user_id, "Feature flag changed via API");

    Ok(Json(UpdateFeatureResponse {
        success: true,
        message: format!("Feature '{feature_name}' updated successfully"),
    }))
}
