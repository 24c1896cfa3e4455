//! Router assembly: public, protected and elevated tiers.

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_owner_middleware, resolve_tenant_middleware};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let config = crate::config::config();

    // Layers run bottom-up: JWT first, then tenant resolution, then the owner check.
    let elevated = admin_routes()
        .route_layer(from_fn(require_owner_middleware))
        .route_layer(from_fn_with_state(state.clone(), resolve_tenant_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let protected = Router::new()
        .merge(auth_routes())
        .merge(children_routes())
        .merge(attendance_routes())
        .merge(report_routes())
        .merge(activity_routes())
        .merge(message_routes())
        .merge(menu_routes())
        .merge(letter_routes())
        .merge(gallery_routes())
        .route("/api/location", get(protected::location::location_get))
        .route_layer(from_fn_with_state(state.clone(), resolve_tenant_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let router = Router::new()
        // Public
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        .route("/auth/register", post(public::register_post))
        .route("/auth/login", post(public::login_post))
        // Protected API
        .merge(protected)
        // Owner administration
        .merge(elevated)
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security));

    with_request_logging(router, config.api.enable_request_logging).with_state(state)
}

fn with_request_logging(router: Router<AppState>, enabled: bool) -> Router<AppState> {
    if enabled {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new().route("/api/auth/whoami", get(auth::whoami_get))
}

fn children_routes() -> Router<AppState> {
    use protected::children;

    Router::new()
        .route("/api/children", get(children::children_get).post(children::children_post))
        .route(
            "/api/children/:cnp",
            get(children::child_get)
                .patch(children::child_patch)
                .delete(children::child_delete),
        )
}

fn attendance_routes() -> Router<AppState> {
    use protected::attendance;

    Router::new()
        .route("/api/children/:cnp/attendance", get(attendance::attendance_history_get))
        .route("/api/children/:cnp/attendance/summary", get(attendance::attendance_summary_get))
        .route(
            "/api/children/:cnp/attendance/:date",
            get(attendance::attendance_day_get).put(attendance::attendance_day_put),
        )
        .route("/api/attendance/groups/:grupa_id/:date", get(attendance::sheet_get))
        .route("/api/attendance/:date", put(attendance::sheet_put))
}

fn report_routes() -> Router<AppState> {
    use protected::reports;

    Router::new()
        .route("/api/children/:cnp/reports", get(reports::child_reports_get))
        .route("/api/children/:cnp/reports/:date", get(reports::report_get).put(reports::report_put))
        .route("/api/reports/groups/:grupa_id/:date", get(reports::group_reports_get))
}

fn activity_routes() -> Router<AppState> {
    use protected::activities;

    Router::new()
        .route("/api/activities", get(activities::activities_get).post(activities::activities_post))
        .route(
            "/api/activities/:id",
            get(activities::activity_get)
                .patch(activities::activity_patch)
                .delete(activities::activity_delete),
        )
        .route("/api/activities/:id/photos", post(activities::activity_photos_post))
}

fn message_routes() -> Router<AppState> {
    use protected::messages;

    Router::new()
        .route("/api/messages", get(messages::inbox_get).post(messages::message_post))
        .route("/api/messages/sent", get(messages::sent_get))
        .route("/api/messages/unread", get(messages::unread_get))
        .route("/api/messages/:id/thread", get(messages::thread_get))
        .route("/api/messages/:id/reply", post(messages::reply_post))
}

fn menu_routes() -> Router<AppState> {
    use protected::menus;

    Router::new()
        .route("/api/menus", get(menus::menus_get).post(menus::menus_post))
        .route("/api/menus/current", get(menus::menu_current_get))
        .route("/api/menus/generate", post(menus::menu_generate_post))
        .route(
            "/api/menus/:id",
            get(menus::menu_get).patch(menus::menu_patch).delete(menus::menu_delete),
        )
        .route("/api/menus/:id/publish", post(menus::menu_publish_post))
}

fn letter_routes() -> Router<AppState> {
    use protected::letters;

    Router::new()
        .route("/api/letters/:week", get(letters::week_get))
        .route("/api/letters/:week/monday/generate", post(letters::monday_generate_post))
        .route("/api/letters/:week/friday/generate", post(letters::friday_generate_post))
        .route("/api/letters/:week/:kind", get(letters::letter_get).put(letters::letter_put))
}

fn gallery_routes() -> Router<AppState> {
    use protected::gallery;

    Router::new()
        .route("/api/gallery", get(gallery::gallery_get).post(gallery::gallery_post))
        .route("/api/gallery/:id", get(gallery::gallery_item_get).delete(gallery::gallery_item_delete))
}

fn admin_routes() -> Router<AppState> {
    use elevated::{finance, guardians, locations, staff};

    Router::new()
        .route("/api/admin/locations", get(locations::locations_get).post(locations::locations_post))
        .route(
            "/api/admin/locations/:location_id",
            get(locations::location_admin_get).patch(locations::location_patch),
        )
        .route("/api/admin/locations/:location_id/groups", post(locations::groups_post))
        .route(
            "/api/admin/locations/:location_id/groups/:grupa_id",
            axum::routing::patch(locations::group_patch).delete(locations::group_delete),
        )
        .route("/api/admin/locations/:location_id/finance", get(finance::finance_get))
        .route("/api/admin/staff", get(staff::staff_get).post(staff::staff_post))
        .route("/api/admin/staff/:uid", axum::routing::delete(staff::staff_delete))
        .route("/api/admin/guardians", get(guardians::guardians_get).post(guardians::guardians_post))
        .route("/api/admin/guardians/:uid", axum::routing::delete(guardians::guardian_delete))
}
