use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use posforge_infra::ConfigDomain;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new().route("/:domain", get(get_config).put(update_config))
}

fn parse_domain(raw: &str) -> Result<ConfigDomain, axum::response::Response> {
    raw.parse().map_err(errors::domain_error_to_response)
}

pub async fn get_config(
    Extension(services): Extension<Arc<AppServices>>,
    Path(domain): Path<String>,
) -> axum::response::Response {
    let domain = match parse_domain(&domain) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.config.get(domain) {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_config(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<ActorContext>,
    Path(domain): Path<String>,
    Json(changes): Json<BTreeMap<String, serde_json::Value>>,
) -> axum::response::Response {
    if !ctx.capabilities().is_supervisor() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "supervisor_only",
            "configuration changes require a supervisor",
        );
    }

    let domain = match parse_domain(&domain) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.config.update(domain, changes) {
        Ok(settings) => (StatusCode::OK, Json(settings)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
