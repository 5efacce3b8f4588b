// src/db/reporte_repo.rs

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::{
    common::error::AppError, models::reportes::TendenciaCartera,
    services::acceso::AlcanceCartera,
};

// Totales crudos del resumen; el servicio calcula los porcentajes.
#[derive(Debug, Default, sqlx::FromRow)]
pub struct TotalesCartera {
    pub total_cartera: f64,
    pub total_vencido: f64,
    pub num_clientes: i64,
    pub num_facturas: i64,
}

// Conteos crudos del avance de gestión en un rango.
#[derive(Debug, Default)]
pub struct ConteosAvance {
    pub total_clientes: i64,
    pub clientes_gestionados: i64,
    pub clientes_mora: i64,
    pub mora_gestionada: i64,
}

#[derive(Clone)]
pub struct ReporteRepository {
    pool: SqlitePool,
}

impl ReporteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn totales(&self, alcance: &AlcanceCartera) -> Result<TotalesCartera, AppError> {
        let totales = match alcance {
            AlcanceCartera::Total => {
                sqlx::query_as::<_, TotalesCartera>(
                    r#"
                    SELECT
                        COALESCE(SUM(valor), 0.0) AS total_cartera,
                        COALESCE(SUM(CASE WHEN dias_vencidos > 0 THEN valor ELSE 0.0 END), 0.0)
                            AS total_vencido,
                        COUNT(DISTINCT nit) AS num_clientes,
                        COUNT(*) AS num_facturas
                    FROM cartera_actual
                    "#,
                )
                .fetch_one(&self.pool)
                .await?
            }
            AlcanceCartera::Vendedor(vendedor) => {
                sqlx::query_as::<_, TotalesCartera>(
                    r#"
                    SELECT
                        COALESCE(SUM(valor), 0.0) AS total_cartera,
                        COALESCE(SUM(CASE WHEN dias_vencidos > 0 THEN valor ELSE 0.0 END), 0.0)
                            AS total_vencido,
                        COUNT(DISTINCT nit) AS num_clientes,
                        COUNT(*) AS num_facturas
                    FROM cartera_actual
                    WHERE vendedor = ?
                    "#,
                )
                .bind(vendedor)
                .fetch_one(&self.pool)
                .await?
            }
            AlcanceCartera::Ninguno => TotalesCartera::default(),
        };
        Ok(totales)
    }

    // Cuatro conteos del avance: clientes visibles, clientes con gestión en
    // el rango, y ambos restringidos a clientes con mora.
    pub async fn conteos_avance(
        &self,
        alcance: &AlcanceCartera,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> Result<ConteosAvance, AppError> {
        let (filtro_vendedor, vendedor) = match alcance {
            AlcanceCartera::Total => (false, None),
            AlcanceCartera::Vendedor(v) => (true, Some(v.as_str())),
            AlcanceCartera::Ninguno => return Ok(ConteosAvance::default()),
        };

        let sql_total = if filtro_vendedor {
            "SELECT COUNT(DISTINCT nit) FROM cartera_actual WHERE vendedor = ?"
        } else {
            "SELECT COUNT(DISTINCT nit) FROM cartera_actual"
        };
        let sql_mora = if filtro_vendedor {
            "SELECT COUNT(DISTINCT nit) FROM cartera_actual WHERE dias_vencidos > 0 AND vendedor = ?"
        } else {
            "SELECT COUNT(DISTINCT nit) FROM cartera_actual WHERE dias_vencidos > 0"
        };
        let sql_gestionados = if filtro_vendedor {
            r#"
            SELECT COUNT(DISTINCT g.nit)
            FROM gestiones g
            WHERE g.fecha_gestion BETWEEN ? AND ?
              AND g.nit IN (SELECT nit FROM cartera_actual WHERE vendedor = ?)
            "#
        } else {
            r#"
            SELECT COUNT(DISTINCT g.nit)
            FROM gestiones g
            WHERE g.fecha_gestion BETWEEN ? AND ?
              AND g.nit IN (SELECT nit FROM cartera_actual)
            "#
        };
        let sql_mora_gestionada = if filtro_vendedor {
            r#"
            SELECT COUNT(DISTINCT g.nit)
            FROM gestiones g
            WHERE g.fecha_gestion BETWEEN ? AND ?
              AND g.nit IN (
                  SELECT nit FROM cartera_actual WHERE dias_vencidos > 0 AND vendedor = ?
              )
            "#
        } else {
            r#"
            SELECT COUNT(DISTINCT g.nit)
            FROM gestiones g
            WHERE g.fecha_gestion BETWEEN ? AND ?
              AND g.nit IN (SELECT nit FROM cartera_actual WHERE dias_vencidos > 0)
            "#
        };

        let mut consulta_total = sqlx::query_scalar::<_, i64>(sql_total);
        if let Some(v) = vendedor {
            consulta_total = consulta_total.bind(v);
        }
        let total_clientes = consulta_total.fetch_one(&self.pool).await?;

        let mut consulta_mora = sqlx::query_scalar::<_, i64>(sql_mora);
        if let Some(v) = vendedor {
            consulta_mora = consulta_mora.bind(v);
        }
        let clientes_mora = consulta_mora.fetch_one(&self.pool).await?;

        let mut consulta_gestionados =
            sqlx::query_scalar::<_, i64>(sql_gestionados).bind(desde).bind(hasta);
        if let Some(v) = vendedor {
            consulta_gestionados = consulta_gestionados.bind(v);
        }
        let clientes_gestionados = consulta_gestionados.fetch_one(&self.pool).await?;

        let mut consulta_mora_gestionada =
            sqlx::query_scalar::<_, i64>(sql_mora_gestionada).bind(desde).bind(hasta);
        if let Some(v) = vendedor {
            consulta_mora_gestionada = consulta_mora_gestionada.bind(v);
        }
        let mora_gestionada = consulta_mora_gestionada.fetch_one(&self.pool).await?;

        Ok(ConteosAvance { total_clientes, clientes_gestionados, clientes_mora, mora_gestionada })
    }

    // Serie diaria para los gráficos de tendencia, del histórico diario.
    pub async fn tendencia(
        &self,
        alcance: &AlcanceCartera,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> Result<Vec<TendenciaCartera>, AppError> {
        let serie = match alcance {
            AlcanceCartera::Total => {
                sqlx::query_as::<_, TendenciaCartera>(
                    r#"
                    SELECT fecha_corte,
                           COALESCE(SUM(valor), 0.0) AS total,
                           COALESCE(SUM(CASE WHEN dias_vencidos > 0 THEN valor ELSE 0.0 END), 0.0)
                               AS vencido
                    FROM cartera_historico_diario
                    WHERE fecha_corte BETWEEN ? AND ?
                    GROUP BY fecha_corte
                    ORDER BY fecha_corte ASC
                    "#,
                )
                .bind(desde)
                .bind(hasta)
                .fetch_all(&self.pool)
                .await?
            }
            AlcanceCartera::Vendedor(vendedor) => {
                sqlx::query_as::<_, TendenciaCartera>(
                    r#"
                    SELECT fecha_corte,
                           COALESCE(SUM(valor), 0.0) AS total,
                           COALESCE(SUM(CASE WHEN dias_vencidos > 0 THEN valor ELSE 0.0 END), 0.0)
                               AS vencido
                    FROM cartera_historico_diario
                    WHERE fecha_corte BETWEEN ? AND ? AND vendedor = ?
                    GROUP BY fecha_corte
                    ORDER BY fecha_corte ASC
                    "#,
                )
                .bind(desde)
                .bind(hasta)
                .bind(vendedor)
                .fetch_all(&self.pool)
                .await?
            }
            AlcanceCartera::Ninguno => Vec::new(),
        };
        Ok(serie)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{NaiveDate, Utc};
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use uuid::Uuid;

    use super::*;
    use crate::{
        db::{CarteraRepository, GestionRepository},
        models::{
            cartera::FilaImportada,
            gestion::{CrearGestionPayload, ResultadoGestion, TipoContacto},
        },
    };

    async fn pool_pruebas() -> SqlitePool {
        let opciones =
            SqliteConnectOptions::from_str("sqlite::memory:").expect("opciones válidas");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opciones)
            .await
            .expect("pool en memoria");
        sqlx::migrate!().run(&pool).await.expect("migraciones");
        pool
    }

    fn hoy() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).expect("fecha válida")
    }

    fn fila(nit: &str, factura: &str, dias: i64) -> FilaImportada {
        FilaImportada {
            nit: nit.to_string(),
            razon_social: format!("Cliente {}", nit),
            factura: factura.to_string(),
            valor: 100.0,
            dias_vencidos: dias,
            ..FilaImportada::default()
        }
    }

    async fn gestionar(pool: &SqlitePool, nit: &str) {
        let payload = CrearGestionPayload {
            nit: nit.to_string(),
            tipo_contacto: TipoContacto::Llamada,
            resultado: ResultadoGestion::PromesaPago,
            fecha_gestion: Some(hoy()),
            notas: None,
            fecha_promesa_pago: None,
            valor_promesa: None,
            fecha_proximo_seguimiento: None,
        };
        GestionRepository::new(pool.clone())
            .crear(&payload, Uuid::new_v4(), "cobranza@papelandina.com.co", hoy())
            .await
            .expect("gestión");
    }

    // Sin cartera todos los conteos son cero y los porcentajes no dividen
    // por cero (los calcula el servicio a partir de estos conteos).
    #[tokio::test]
    async fn avance_con_cartera_vacia() {
        let pool = pool_pruebas().await;
        let repo = ReporteRepository::new(pool.clone());

        let conteos = repo
            .conteos_avance(&AlcanceCartera::Total, hoy(), hoy())
            .await
            .expect("conteos");
        assert_eq!(conteos.total_clientes, 0);
        assert_eq!(conteos.clientes_gestionados, 0);
        assert_eq!(conteos.clientes_mora, 0);
        assert_eq!(conteos.mora_gestionada, 0);
    }

    #[tokio::test]
    async fn avance_cuenta_clientes_distintos_y_mora() {
        let pool = pool_pruebas().await;
        let cartera = CarteraRepository::new(pool.clone());
        let repo = ReporteRepository::new(pool.clone());

        // tres clientes: dos en mora, uno al día; el primero con dos facturas
        let filas = vec![
            fila("900100200", "F-1", 45),
            fila("900100200", "F-2", 10),
            fila("900100201", "F-3", 0),
            fila("900100202", "F-4", 120),
        ];
        let mut tx = pool.begin().await.expect("transacción");
        cartera.reemplazar_actual(&mut *tx, &filas, Utc::now()).await.expect("reemplazo");
        tx.commit().await.expect("commit");

        // una gestión a un cliente en mora y otra a uno al día
        gestionar(&pool, "900100200").await;
        gestionar(&pool, "900100201").await;

        let conteos = repo
            .conteos_avance(&AlcanceCartera::Total, hoy(), hoy())
            .await
            .expect("conteos");
        assert_eq!(conteos.total_clientes, 3);
        assert_eq!(conteos.clientes_gestionados, 2);
        assert_eq!(conteos.clientes_mora, 2);
        assert_eq!(conteos.mora_gestionada, 1);
    }

    #[tokio::test]
    async fn la_tendencia_agrupa_por_fecha_de_corte() {
        let pool = pool_pruebas().await;
        let cartera = CarteraRepository::new(pool.clone());
        let repo = ReporteRepository::new(pool.clone());

        let filas = vec![fila("900100200", "F-1", 45), fila("900100201", "F-2", 0)];
        let ayer = hoy().pred_opt().expect("fecha válida");
        let mut tx = pool.begin().await.expect("transacción");
        cartera.registrar_historico(&mut *tx, &filas, ayer).await.expect("histórico");
        cartera.registrar_historico(&mut *tx, &filas, hoy()).await.expect("histórico");
        tx.commit().await.expect("commit");

        let serie = repo
            .tendencia(&AlcanceCartera::Total, ayer, hoy())
            .await
            .expect("serie");
        assert_eq!(serie.len(), 2);
        assert_eq!(serie[0].fecha_corte, ayer);
        assert_eq!(serie[0].total, 200.0);
        assert_eq!(serie[0].vencido, 100.0);
    }
}
