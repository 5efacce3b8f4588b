// src/db/cartera_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    common::error::AppError,
    models::cartera::{FacturaCartera, FilaImportada},
    services::acceso::AlcanceCartera,
};

#[derive(Clone)]
pub struct CarteraRepository {
    pool: SqlitePool,
}

impl CarteraRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Foto actual de la cartera, acotada al alcance del usuario.
    pub async fn listar_actual(
        &self,
        alcance: &AlcanceCartera,
        solo_vencidas: bool,
    ) -> Result<Vec<FacturaCartera>, AppError> {
        let facturas = match alcance {
            AlcanceCartera::Total => {
                sqlx::query_as::<_, FacturaCartera>(
                    r#"
                    SELECT id, nit, razon_social, factura, valor, fecha_factura,
                           fecha_vencimiento, condicion_pago, dias_vencidos, vendedor,
                           centro_operacion, fecha_carga
                    FROM cartera_actual
                    WHERE (? = 0 OR dias_vencidos > 0)
                    ORDER BY dias_vencidos DESC, valor DESC
                    "#,
                )
                .bind(solo_vencidas)
                .fetch_all(&self.pool)
                .await?
            }
            AlcanceCartera::Vendedor(vendedor) => {
                sqlx::query_as::<_, FacturaCartera>(
                    r#"
                    SELECT id, nit, razon_social, factura, valor, fecha_factura,
                           fecha_vencimiento, condicion_pago, dias_vencidos, vendedor,
                           centro_operacion, fecha_carga
                    FROM cartera_actual
                    WHERE vendedor = ? AND (? = 0 OR dias_vencidos > 0)
                    ORDER BY dias_vencidos DESC, valor DESC
                    "#,
                )
                .bind(vendedor)
                .bind(solo_vencidas)
                .fetch_all(&self.pool)
                .await?
            }
            AlcanceCartera::Ninguno => Vec::new(),
        };
        Ok(facturas)
    }

    pub async fn facturas_de_cliente(&self, nit: &str) -> Result<Vec<FacturaCartera>, AppError> {
        let facturas = sqlx::query_as::<_, FacturaCartera>(
            r#"
            SELECT id, nit, razon_social, factura, valor, fecha_factura,
                   fecha_vencimiento, condicion_pago, dias_vencidos, vendedor,
                   centro_operacion, fecha_carga
            FROM cartera_actual
            WHERE nit = ?
            ORDER BY fecha_vencimiento ASC
            "#,
        )
        .bind(nit)
        .fetch_all(&self.pool)
        .await?;
        Ok(facturas)
    }

    // Reemplazo completo de la foto actual: borra todo y reinserta. Debe
    // ejecutarse dentro de la transacción de la importación; si algo falla
    // el rollback deja la foto anterior intacta.
    pub async fn reemplazar_actual(
        &self,
        conn: &mut SqliteConnection,
        filas: &[FilaImportada],
        fecha_carga: DateTime<Utc>,
    ) -> Result<usize, AppError> {
        sqlx::query("DELETE FROM cartera_actual").execute(&mut *conn).await?;

        for fila in filas {
            sqlx::query(
                r#"
                INSERT INTO cartera_actual (
                    nit, razon_social, factura, valor, fecha_factura, fecha_vencimiento,
                    condicion_pago, dias_vencidos, vendedor, centro_operacion, fecha_carga
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&fila.nit)
            .bind(&fila.razon_social)
            .bind(&fila.factura)
            .bind(fila.valor)
            .bind(fila.fecha_factura)
            .bind(fila.fecha_vencimiento)
            .bind(&fila.condicion_pago)
            .bind(fila.dias_vencidos)
            .bind(&fila.vendedor)
            .bind(&fila.centro_operacion)
            .bind(fecha_carga)
            .execute(&mut *conn)
            .await?;
        }

        Ok(filas.len())
    }

    // Histórico append-only más la variante diaria con llave
    // (fecha_corte, nit, factura): reimportar el mismo día actualiza la fila.
    pub async fn registrar_historico(
        &self,
        conn: &mut SqliteConnection,
        filas: &[FilaImportada],
        fecha_corte: NaiveDate,
    ) -> Result<(), AppError> {
        for fila in filas {
            sqlx::query(
                r#"
                INSERT INTO cartera_historico (
                    fecha_corte, nit, razon_social, factura, valor, dias_vencidos,
                    vendedor, centro_operacion
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(fecha_corte)
            .bind(&fila.nit)
            .bind(&fila.razon_social)
            .bind(&fila.factura)
            .bind(fila.valor)
            .bind(fila.dias_vencidos)
            .bind(&fila.vendedor)
            .bind(&fila.centro_operacion)
            .execute(&mut *conn)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO cartera_historico_diario (
                    fecha_corte, nit, factura, valor, dias_vencidos, vendedor
                )
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT (fecha_corte, nit, factura) DO UPDATE SET
                    valor = excluded.valor,
                    dias_vencidos = excluded.dias_vencidos,
                    vendedor = excluded.vendedor
                "#,
            )
            .bind(fecha_corte)
            .bind(&fila.nit)
            .bind(&fila.factura)
            .bind(fila.valor)
            .bind(fila.dias_vencidos)
            .bind(&fila.vendedor)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use super::*;

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

    fn fila(nit: &str, factura: &str, valor: f64, vendedor: Option<&str>) -> FilaImportada {
        FilaImportada {
            nit: nit.to_string(),
            razon_social: format!("Cliente {}", nit),
            factura: factura.to_string(),
            valor,
            vendedor: vendedor.map(str::to_string),
            ..FilaImportada::default()
        }
    }

    async fn sembrar(pool: &SqlitePool, repo: &CarteraRepository, filas: &[FilaImportada]) {
        let mut tx = pool.begin().await.expect("transacción");
        repo.reemplazar_actual(&mut *tx, filas, Utc::now()).await.expect("reemplazo");
        tx.commit().await.expect("commit");
    }

    // Propiedades de visibilidad: Total ve todas las filas, Vendedor solo
    // las suyas y Ninguno ninguna.
    #[tokio::test]
    async fn el_listado_respeta_el_alcance() {
        let pool = pool_pruebas().await;
        let repo = CarteraRepository::new(pool.clone());

        let filas = vec![
            fila("900100200", "F-1", 100.0, Some("Juan Pérez")),
            fila("900100201", "F-2", 200.0, Some("Ana Gómez")),
            fila("900100202", "F-3", 300.0, None),
        ];
        sembrar(&pool, &repo, &filas).await;

        let todas = repo.listar_actual(&AlcanceCartera::Total, false).await.expect("total");
        assert_eq!(todas.len(), 3);

        let de_juan = repo
            .listar_actual(&AlcanceCartera::Vendedor("Juan Pérez".to_string()), false)
            .await
            .expect("vendedor");
        assert_eq!(de_juan.len(), 1);
        assert_eq!(de_juan[0].factura, "F-1");

        let ninguna = repo.listar_actual(&AlcanceCartera::Ninguno, false).await.expect("ninguno");
        assert!(ninguna.is_empty());
    }

    #[tokio::test]
    async fn el_filtro_de_vencidas_descarta_las_al_dia() {
        let pool = pool_pruebas().await;
        let repo = CarteraRepository::new(pool.clone());

        let mut vencida = fila("900100200", "F-1", 100.0, None);
        vencida.dias_vencidos = 15;
        let al_dia = fila("900100200", "F-2", 50.0, None);
        sembrar(&pool, &repo, &[vencida, al_dia]).await;

        let vencidas = repo.listar_actual(&AlcanceCartera::Total, true).await.expect("vencidas");
        assert_eq!(vencidas.len(), 1);
        assert_eq!(vencidas[0].factura, "F-1");

        let todas = repo.listar_actual(&AlcanceCartera::Total, false).await.expect("todas");
        assert_eq!(todas.len(), 2);
    }
}
