//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaración de los módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa el logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() está bien aquí: si la configuración falla, la aplicación
    // no debe arrancar.
    let app_state = AppState::new()
        .await
        .expect("Falla al inicializar el estado de la aplicación.");

    // Corre las migraciones de SQLx al arrancar
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falla al correr las migraciones de la base de datos.");

    tracing::info!("✅ Migraciones de la base de datos ejecutadas con éxito!");

    // Primer arranque: siembra el administrador inicial si no hay usuarios.
    bootstrap_admin(&app_state).await;

    // Rutas de autenticación (públicas)
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Rutas del usuario autenticado y administración de usuarios
    let usuario_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/contrasena", put(handlers::auth::cambiar_contrasena))
        .route(
            "/",
            get(handlers::usuarios::listar_usuarios).post(handlers::usuarios::crear_usuario),
        )
        .route(
            "/{id}",
            put(handlers::usuarios::actualizar_usuario)
                .delete(handlers::usuarios::eliminar_usuario),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let cartera_routes = Router::new()
        .route("/", get(handlers::cartera::listar_cartera))
        .route("/clientes", get(handlers::cartera::listar_clientes))
        .route("/clientes/{nit}", get(handlers::cartera::detalle_cliente))
        .route("/vendedores", get(handlers::cartera::listar_vendedores))
        .route("/exportar", get(handlers::cartera::exportar_cartera))
        .route("/importar", post(handlers::cartera::importar_cartera))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let gestion_routes = Router::new()
        .route(
            "/",
            post(handlers::gestiones::crear_gestion).get(handlers::gestiones::listar_gestiones),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let reporte_routes = Router::new()
        .route("/resumen", get(handlers::reportes::resumen))
        .route("/edades", get(handlers::reportes::edades))
        .route("/avance", get(handlers::reportes::avance))
        .route("/tendencia", get(handlers::reportes::tendencia))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Combina todo en el router principal
    let app = Router::new()
        .route("/api/salud", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/usuarios", usuario_routes)
        .nest("/api/cartera", cartera_routes)
        .nest("/api/gestiones", gestion_routes)
        .nest("/api/reportes", reporte_routes)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Inicia el servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falla al iniciar el listener TCP");
    tracing::info!("🚀 Servidor escuchando en {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Error en el servidor Axum");
}

// Siembra el primer administrador con ADMIN_EMAIL / ADMIN_PASSWORD. Sin
// ADMIN_PASSWORD no se crea nada: solo se avisa.
async fn bootstrap_admin(app_state: &AppState) {
    let email = std::env::var("ADMIN_EMAIL")
        .unwrap_or_else(|_| format!("admin@{}", app_state.dominio_correo));

    match std::env::var("ADMIN_PASSWORD") {
        Ok(password) => match app_state.usuario_service.bootstrap_admin(&email, &password).await {
            Ok(true) => tracing::info!("👤 Administrador inicial creado: {}", email),
            Ok(false) => {}
            Err(e) => tracing::error!("🔥 Falla al crear el administrador inicial: {}", e),
        },
        Err(_) => {
            tracing::warn!(
                "ADMIN_PASSWORD no está definida; si no existen usuarios nadie podrá entrar."
            );
        }
    }
}
