// src/db/gestion_repo.rs

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::gestion::{CrearGestionPayload, Gestion},
    services::acceso::AlcanceCartera,
};

#[derive(Clone)]
pub struct GestionRepository {
    pool: SqlitePool,
}

impl GestionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Registra una gestión. Bitácora append-only: nunca se edita ni borra.
    pub async fn crear(
        &self,
        payload: &CrearGestionPayload,
        usuario_id: Uuid,
        usuario_email: &str,
        hoy: NaiveDate,
    ) -> Result<Gestion, AppError> {
        let gestion = Gestion {
            id: Uuid::new_v4(),
            nit: payload.nit.trim().to_string(),
            tipo_contacto: payload.tipo_contacto,
            resultado: payload.resultado,
            fecha_gestion: payload.fecha_gestion.unwrap_or(hoy),
            usuario_id,
            usuario_email: usuario_email.to_string(),
            notas: payload.notas.clone(),
            fecha_promesa_pago: payload.fecha_promesa_pago,
            valor_promesa: payload.valor_promesa,
            fecha_proximo_seguimiento: payload.fecha_proximo_seguimiento,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO gestiones (
                id, nit, tipo_contacto, resultado, fecha_gestion, usuario_id,
                usuario_email, notas, fecha_promesa_pago, valor_promesa,
                fecha_proximo_seguimiento, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(gestion.id)
        .bind(&gestion.nit)
        .bind(gestion.tipo_contacto)
        .bind(gestion.resultado)
        .bind(gestion.fecha_gestion)
        .bind(gestion.usuario_id)
        .bind(&gestion.usuario_email)
        .bind(&gestion.notas)
        .bind(gestion.fecha_promesa_pago)
        .bind(gestion.valor_promesa)
        .bind(gestion.fecha_proximo_seguimiento)
        .bind(gestion.created_at)
        .execute(&self.pool)
        .await?;

        Ok(gestion)
    }

    // Gestiones del rango, acotadas al alcance vía la tabla de clientes
    // (las gestiones no guardan vendedor propio).
    pub async fn listar(
        &self,
        alcance: &AlcanceCartera,
        desde: NaiveDate,
        hasta: NaiveDate,
        nit: Option<&str>,
    ) -> Result<Vec<Gestion>, AppError> {
        let gestiones = match alcance {
            AlcanceCartera::Total => {
                sqlx::query_as::<_, Gestion>(
                    r#"
                    SELECT id, nit, tipo_contacto, resultado, fecha_gestion, usuario_id,
                           usuario_email, notas, fecha_promesa_pago, valor_promesa,
                           fecha_proximo_seguimiento, created_at
                    FROM gestiones
                    WHERE fecha_gestion BETWEEN ? AND ?
                      AND (? IS NULL OR nit = ?)
                    ORDER BY fecha_gestion DESC, created_at DESC
                    "#,
                )
                .bind(desde)
                .bind(hasta)
                .bind(nit)
                .bind(nit)
                .fetch_all(&self.pool)
                .await?
            }
            AlcanceCartera::Vendedor(vendedor) => {
                sqlx::query_as::<_, Gestion>(
                    r#"
                    SELECT id, nit, tipo_contacto, resultado, fecha_gestion, usuario_id,
                           usuario_email, notas, fecha_promesa_pago, valor_promesa,
                           fecha_proximo_seguimiento, created_at
                    FROM gestiones
                    WHERE fecha_gestion BETWEEN ? AND ?
                      AND (? IS NULL OR nit = ?)
                      AND nit IN (SELECT nit FROM clientes WHERE vendedor = ?)
                    ORDER BY fecha_gestion DESC, created_at DESC
                    "#,
                )
                .bind(desde)
                .bind(hasta)
                .bind(nit)
                .bind(nit)
                .bind(vendedor)
                .fetch_all(&self.pool)
                .await?
            }
            AlcanceCartera::Ninguno => Vec::new(),
        };
        Ok(gestiones)
    }

    pub async fn gestiones_de_cliente(&self, nit: &str) -> Result<Vec<Gestion>, AppError> {
        let gestiones = sqlx::query_as::<_, Gestion>(
            r#"
            SELECT id, nit, tipo_contacto, resultado, fecha_gestion, usuario_id,
                   usuario_email, notas, fecha_promesa_pago, valor_promesa,
                   fecha_proximo_seguimiento, created_at
            FROM gestiones
            WHERE nit = ?
            ORDER BY fecha_gestion DESC, created_at DESC
            "#,
        )
        .bind(nit)
        .fetch_all(&self.pool)
        .await?;
        Ok(gestiones)
    }
}
