// src/db/cliente_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    common::error::AppError,
    models::cartera::{Cliente, FilaImportada, Vendedor},
    services::acceso::AlcanceCartera,
};

#[derive(Clone)]
pub struct ClienteRepository {
    pool: SqlitePool,
}

impl ClienteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Listado de clientes visible según el alcance del usuario.
    pub async fn listar(&self, alcance: &AlcanceCartera) -> Result<Vec<Cliente>, AppError> {
        let clientes = match alcance {
            AlcanceCartera::Total => {
                sqlx::query_as::<_, Cliente>(
                    r#"
                    SELECT nit, razon_social, telefono, celular, direccion, email, ciudad,
                           vendedor, cupo_activo, created_at, updated_at
                    FROM clientes
                    ORDER BY razon_social ASC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
            AlcanceCartera::Vendedor(vendedor) => {
                sqlx::query_as::<_, Cliente>(
                    r#"
                    SELECT nit, razon_social, telefono, celular, direccion, email, ciudad,
                           vendedor, cupo_activo, created_at, updated_at
                    FROM clientes
                    WHERE vendedor = ?
                    ORDER BY razon_social ASC
                    "#,
                )
                .bind(vendedor)
                .fetch_all(&self.pool)
                .await?
            }
            AlcanceCartera::Ninguno => Vec::new(),
        };
        Ok(clientes)
    }

    pub async fn buscar_por_nit(&self, nit: &str) -> Result<Option<Cliente>, AppError> {
        let cliente = sqlx::query_as::<_, Cliente>(
            r#"
            SELECT nit, razon_social, telefono, celular, direccion, email, ciudad,
                   vendedor, cupo_activo, created_at, updated_at
            FROM clientes
            WHERE nit = ?
            "#,
        )
        .bind(nit)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cliente)
    }

    // Upsert por NIT desde una fila del archivo importado. Los campos de
    // contacto solo se pisan cuando el archivo trae valor.
    pub async fn upsert_desde_importacion(
        &self,
        conn: &mut SqliteConnection,
        fila: &FilaImportada,
        ahora: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO clientes (
                nit, razon_social, telefono, celular, direccion, email, ciudad,
                vendedor, cupo_activo, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (nit) DO UPDATE SET
                razon_social = excluded.razon_social,
                telefono     = COALESCE(excluded.telefono, telefono),
                celular      = COALESCE(excluded.celular, celular),
                direccion    = COALESCE(excluded.direccion, direccion),
                email        = COALESCE(excluded.email, email),
                ciudad       = COALESCE(excluded.ciudad, ciudad),
                vendedor     = COALESCE(excluded.vendedor, vendedor),
                cupo_activo  = excluded.cupo_activo,
                updated_at   = excluded.updated_at
            "#,
        )
        .bind(&fila.nit)
        .bind(&fila.razon_social)
        .bind(&fila.telefono)
        .bind(&fila.celular)
        .bind(&fila.direccion)
        .bind(&fila.email)
        .bind(&fila.ciudad)
        .bind(&fila.vendedor)
        .bind(fila.cupo_activo.unwrap_or(true))
        .bind(ahora)
        .bind(ahora)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn upsert_vendedor(
        &self,
        conn: &mut SqliteConnection,
        nombre: &str,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO vendedores (nombre) VALUES (?) ON CONFLICT (nombre) DO NOTHING")
            .bind(nombre)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn listar_vendedores(&self) -> Result<Vec<Vendedor>, AppError> {
        let vendedores =
            sqlx::query_as::<_, Vendedor>("SELECT nombre FROM vendedores ORDER BY nombre ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(vendedores)
    }
}
