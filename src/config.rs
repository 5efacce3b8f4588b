// src/config.rs

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{env, str::FromStr, time::Duration};

use crate::{
    db::{
        CarteraRepository, ClienteRepository, GestionRepository, ReporteRepository,
        UsuarioRepository,
    },
    services::{
        auth::AuthService, importacion::ImportacionService, reportes::ReporteService,
        usuarios::UsuarioService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub jwt_secret: String,
    pub dominio_correo: String,
    pub auth_service: AuthService,
    pub usuario_service: UsuarioService,
    pub cliente_repo: ClienteRepository,
    pub cartera_repo: CarteraRepository,
    pub gestion_repo: GestionRepository,
    pub reporte_service: ReporteService,
    pub importacion_service: ImportacionService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // El almacén es un único archivo SQLite; si no existe se crea.
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://cartera.db".to_string());
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET debe estar definida");
        let dominio_correo =
            env::var("CORREO_DOMINIO").unwrap_or_else(|_| "papelandina.com.co".to_string());

        let opciones = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(opciones)
            .await?;

        tracing::info!("✅ Conexión con la base de datos establecida con éxito!");

        // --- Arma el grafo de dependencias ---
        let usuario_repo = UsuarioRepository::new(db_pool.clone());
        let cliente_repo = ClienteRepository::new(db_pool.clone());
        let cartera_repo = CarteraRepository::new(db_pool.clone());
        let gestion_repo = GestionRepository::new(db_pool.clone());
        let reporte_repo = ReporteRepository::new(db_pool.clone());

        let auth_service = AuthService::new(usuario_repo.clone(), jwt_secret.clone());
        let usuario_service = UsuarioService::new(usuario_repo, dominio_correo.clone());
        let reporte_service = ReporteService::new(reporte_repo, cartera_repo.clone());
        let importacion_service =
            ImportacionService::new(db_pool.clone(), cartera_repo.clone(), cliente_repo.clone());

        Ok(Self {
            db_pool,
            jwt_secret,
            dominio_correo,
            auth_service,
            usuario_service,
            cliente_repo,
            cartera_repo,
            gestion_repo,
            reporte_service,
            importacion_service,
        })
    }
}
