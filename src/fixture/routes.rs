use super::FixtureBackend;
use crate::api::KnotviewError;
use crate::model::ListMode;
use crate::request::{Reply, Request};
use crate::service::ServiceError;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

type Shared = State<Arc<FixtureBackend>>;

/// Routes mirroring the analysis backend's `/view` API.
pub fn router(backend: Arc<FixtureBackend>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

    Router::new()
        .route("/view", get(full_graph))
        .route("/view/name", get(project_name))
        .route("/view/classpath", get(classpath))
        .route("/view/unrefReport", get(unreferenced_report))
        .route("/view/missingReport", get(missing_report))
        .route("/view/metrics", get(metrics))
        .route("/view/node/{id}", get(node_detail))
        .route("/view/node/{id}/listmode/{mode}", get(list_mode))
        .route("/view/arc/{id}", get(arc_detail))
        .route("/view/filters", get(active_filters))
        .route("/view/filters/{label}", get(toggle_filter))
        .route("/view/filters/impliedBy/{id}/{enabled}", get(implied_by))
        .route("/view/search/{text}", get(search))
        .layer(cors)
        .with_state(backend)
}

/// Serves the fixture on localhost until the process is stopped.
pub async fn serve(
    backend: FixtureBackend,
    port: u16,
    open_browser: bool,
) -> Result<(), KnotviewError> {
    let name = backend.project_name().to_string();
    let app = router(Arc::new(backend));

    let addr = format!("127.0.0.1:{}", port);
    let url = format!("http://{}/view", addr);

    info!(project = %name, %addr, "serving fixture");
    println!("Serving '{}' at {}", name, url);
    println!("Press Ctrl+C to stop");

    if open_browser {
        if let Err(e) = open::that(&url) {
            warn!("could not open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn respond(backend: &FixtureBackend, request: Request) -> Response {
    debug!(?request, "fixture request");
    match backend.answer(&request) {
        Ok(Reply::ProjectName(name)) => name.into_response(),
        Ok(Reply::Graph(graph)) => Json(graph).into_response(),
        Ok(Reply::Classpath(entries)) => Json(entries).into_response(),
        Ok(Reply::Report(report)) => Json(report).into_response(),
        Ok(Reply::NodeDetail(detail)) => Json(detail).into_response(),
        Ok(Reply::ArcDetail(arc)) => Json(arc).into_response(),
        Ok(Reply::Rescoped(rescoped)) => Json(rescoped).into_response(),
        Ok(Reply::Filters(labels)) => Json(labels).into_response(),
        Ok(Reply::Matches(ids)) => Json(ids).into_response(),
        Err(ServiceError::NotFound(what)) => (StatusCode::NOT_FOUND, what).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn project_name(State(backend): Shared) -> Response {
    respond(&backend, Request::ProjectName)
}

async fn full_graph(State(backend): Shared) -> Response {
    respond(&backend, Request::FullGraph)
}

async fn classpath(State(backend): Shared) -> Response {
    respond(&backend, Request::Classpath)
}

async fn unreferenced_report(State(backend): Shared) -> Response {
    respond(&backend, Request::UnreferencedReport)
}

async fn missing_report(State(backend): Shared) -> Response {
    respond(&backend, Request::MissingReport)
}

async fn metrics(State(backend): Shared) -> Response {
    respond(&backend, Request::Metrics)
}

async fn node_detail(State(backend): Shared, Path(id): Path<String>) -> Response {
    respond(&backend, Request::NodeDetail { id })
}

async fn list_mode(State(backend): Shared, Path((id, mode)): Path<(String, String)>) -> Response {
    match mode.parse::<ListMode>() {
        Ok(mode) => respond(&backend, Request::ListMode { id, mode }),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

async fn arc_detail(State(backend): Shared, Path(id): Path<String>) -> Response {
    respond(&backend, Request::ArcDetail { id })
}

async fn active_filters(State(backend): Shared) -> Response {
    respond(&backend, Request::ActiveFilters)
}

async fn toggle_filter(State(backend): Shared, Path(label): Path<String>) -> Response {
    respond(&backend, Request::ToggleFilter { label })
}

async fn implied_by(
    State(backend): Shared,
    Path((id, enabled)): Path<(String, bool)>,
) -> Response {
    respond(&backend, Request::ImpliedBy { id, enabled })
}

async fn search(State(backend): Shared, Path(text): Path<String>) -> Response {
    respond(&backend, Request::Search { text })
}
