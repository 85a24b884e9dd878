use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

/// Declares the bearer scheme in the document. Requests are not authenticated.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::subscription::create_subscription,
        handlers::subscription::get_subscription,
        handlers::subscription::update_subscription,
        handlers::subscription::delete_subscription,
        handlers::subscription::list_subscriptions,
        handlers::subscription::get_total_cost,
    ),
    components(
        schemas(
            Subscription,
            CreateSubscriptionRequest,
            UpdateSubscriptionRequest,
            TotalCostResponse,
            MessageResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "subscriptions", description = "User subscription records"),
    ),
    info(
        title = "Subscription Service API",
        version = "1.0.0",
        description = "REST API for managing user subscriptions"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/subscriptions"));
        assert!(paths.iter().any(|p| p.as_str() == "/subscriptions/{id}"));
        assert!(paths.iter().any(|p| p.as_str() == "/subscriptions/total-cost"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("Subscription"));
    }
}
