// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_jwt",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Gestiones ---
        handlers::gestiones::crear_gestion,
        handlers::gestiones::listar_gestiones,

        // --- Reportes ---
        handlers::reportes::resumen,
        handlers::reportes::edades,
        handlers::reportes::avance,
        handlers::reportes::tendencia,
    ),
    components(
        schemas(
            // --- Gestiones ---
            models::gestion::Gestion,
            models::gestion::CrearGestionPayload,
            models::gestion::TipoContacto,
            models::gestion::ResultadoGestion,

            // --- Reportes ---
            models::reportes::ResumenCartera,
            models::reportes::EdadCartera,
            models::reportes::AvanceGestion,
            models::reportes::TendenciaCartera,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Gestiones", description = "Bitácora de gestiones de cobro"),
        (name = "Reportes", description = "Tableros y agregaciones de la cartera")
    )
)]
pub struct ApiDoc;
