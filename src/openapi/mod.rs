use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Back Office API",
        version = "1.0.0",
        description = r#"
# Container logistics back office

Backoffice users register containers, drivers pick them up at the port and
deliver them, warehouses accept them and drivers return the empty box.

## Authentication

Every endpoint except sign-up, login, password recovery and contact-us expects
a token in the Authorization header:

```
Authorization: Token <token>
```

`Bearer <token>` is accepted as well.

## Platforms

Send `Platform: mobile` from the driver and warehouse apps. Responses then use
the compact mobile shapes, and login rotates the user's tokens.

## Pagination

List endpoints serve 10 items per page selected by the `page` query parameter.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://localhost:8080", description = "Local development")),
    modifiers(&BearerAuth),
    tags(
        (name = "companies", description = "Onboarding and company records"),
        (name = "shipments", description = "Containers and the shipment workflow"),
        (name = "customers", description = "Warehouses and associate companies with their shipments"),
        (name = "dashboard", description = "Backoffice counters")
    ),
    paths(
        crate::handlers::companies::onboarding,
        crate::handlers::companies::edit_company,
        crate::handlers::companies::view_company,

        crate::handlers::shipments::add_containers,
        crate::handlers::shipments::list_shipments,
        crate::handlers::shipments::get_shipment,
        crate::handlers::shipments::update_shipment,
        crate::handlers::shipments::delete_shipment,

        crate::handlers::customers::list_customers,
        crate::handlers::customers::customer_history,

        crate::handlers::dashboard::stats,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,

            crate::services::views::UserView,
            crate::services::views::ProfileView,
            crate::services::views::DriverView,
            crate::services::views::WarehouseView,
            crate::services::views::BackOfficeView,
            crate::services::views::CompanyView,
            crate::services::views::ShipmentView,
            crate::services::views::ShipmentMobileView,
            crate::services::views::AnyShipmentView,
            crate::handlers::companies::OnboardingBody,

            crate::services::shipments::ContainerInput,
            crate::services::shipments::AddContainersRequest,
            crate::services::shipments::AddedShipment,
            crate::services::customers::CustomerEntry,
            crate::services::customers::CustomerKind,
            crate::services::dashboard::DashboardStats,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "Bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_workflow_paths() {
        let json = serde_json::to_string(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("Back Office API"));
        assert!(json.contains("/api/v1/shipments/{id}"));
        assert!(json.contains("/api/v1/container/add"));
        assert!(json.contains("/api/v1/dashboard-stats"));
        assert!(json.contains("\"Bearer\""));
    }
}
