// src/services/reportes.rs
//
// Agregaciones para los tableros: resumen, edades de cartera, avance de
// gestión y tendencia histórica. Todas las funciones reciben el alcance
// explícito del usuario que consulta.

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::{
    common::error::AppError,
    db::{CarteraRepository, ReporteRepository},
    models::{
        cartera::FacturaCartera,
        reportes::{AvanceGestion, EdadCartera, ResumenCartera, TendenciaCartera},
    },
    services::acceso::AlcanceCartera,
};

// Un rango de edades de cartera. Límites inclusivos; None = abierto.
// El primer corte cubre también los días negativos (facturas sin vencer).
pub struct CorteEdad {
    pub etiqueta: &'static str,
    pub desde: Option<i64>,
    pub hasta: Option<i64>,
}

impl CorteEdad {
    fn contiene(&self, dias: i64) -> bool {
        self.desde.is_none_or(|d| dias >= d) && self.hasta.is_none_or(|h| dias <= h)
    }
}

// Los cinco rangos estándar del tablero.
pub const CORTES_ESTANDAR: &[CorteEdad] = &[
    CorteEdad { etiqueta: "Al día", desde: None, hasta: Some(0) },
    CorteEdad { etiqueta: "1-30", desde: Some(1), hasta: Some(30) },
    CorteEdad { etiqueta: "31-60", desde: Some(31), hasta: Some(60) },
    CorteEdad { etiqueta: "61-90", desde: Some(61), hasta: Some(90) },
    CorteEdad { etiqueta: ">90", desde: Some(91), hasta: None },
];

// La variante fina de ocho rangos del reporte de edades.
pub const CORTES_DETALLE: &[CorteEdad] = &[
    CorteEdad { etiqueta: "Al día", desde: None, hasta: Some(0) },
    CorteEdad { etiqueta: "1-15", desde: Some(1), hasta: Some(15) },
    CorteEdad { etiqueta: "16-30", desde: Some(16), hasta: Some(30) },
    CorteEdad { etiqueta: "31-60", desde: Some(31), hasta: Some(60) },
    CorteEdad { etiqueta: "61-90", desde: Some(61), hasta: Some(90) },
    CorteEdad { etiqueta: "91-180", desde: Some(91), hasta: Some(180) },
    CorteEdad { etiqueta: "181-365", desde: Some(181), hasta: Some(365) },
    CorteEdad { etiqueta: ">365", desde: Some(366), hasta: None },
];

// Particiona las facturas por días vencidos. Los cortes cubren todo el
// rango de enteros, así que la suma de los rangos preserva el total.
pub fn clasificar_por_edades(
    facturas: &[FacturaCartera],
    cortes: &[CorteEdad],
) -> Vec<EdadCartera> {
    cortes
        .iter()
        .map(|corte| {
            let mut valor = 0.0;
            let mut num_facturas = 0i64;
            let mut clientes: HashSet<&str> = HashSet::new();
            for factura in facturas.iter().filter(|f| corte.contiene(f.dias_vencidos)) {
                valor += factura.valor;
                num_facturas += 1;
                clientes.insert(factura.nit.as_str());
            }
            EdadCartera {
                etiqueta: corte.etiqueta.to_string(),
                valor,
                num_facturas,
                num_clientes: clientes.len() as i64,
            }
        })
        .collect()
}

// Porcentaje con el divisor en cero resuelto como 0, no como error.
pub fn porcentaje(parte: i64, total: i64) -> f64 {
    if total == 0 { 0.0 } else { parte as f64 * 100.0 / total as f64 }
}

fn porcentaje_valor(parte: f64, total: f64) -> f64 {
    if total == 0.0 { 0.0 } else { parte * 100.0 / total }
}

#[derive(Clone)]
pub struct ReporteService {
    reporte_repo: ReporteRepository,
    cartera_repo: CarteraRepository,
}

impl ReporteService {
    pub fn new(reporte_repo: ReporteRepository, cartera_repo: CarteraRepository) -> Self {
        Self { reporte_repo, cartera_repo }
    }

    pub async fn resumen(&self, alcance: &AlcanceCartera) -> Result<ResumenCartera, AppError> {
        let totales = self.reporte_repo.totales(alcance).await?;
        Ok(ResumenCartera {
            porcentaje_vencido: porcentaje_valor(totales.total_vencido, totales.total_cartera),
            total_cartera: totales.total_cartera,
            total_vencido: totales.total_vencido,
            num_clientes: totales.num_clientes,
            num_facturas: totales.num_facturas,
        })
    }

    pub async fn edades(
        &self,
        alcance: &AlcanceCartera,
        detalle: bool,
    ) -> Result<Vec<EdadCartera>, AppError> {
        let facturas = self.cartera_repo.listar_actual(alcance, false).await?;
        let cortes = if detalle { CORTES_DETALLE } else { CORTES_ESTANDAR };
        Ok(clasificar_por_edades(&facturas, cortes))
    }

    pub async fn avance(
        &self,
        alcance: &AlcanceCartera,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> Result<AvanceGestion, AppError> {
        let conteos = self.reporte_repo.conteos_avance(alcance, desde, hasta).await?;
        Ok(AvanceGestion {
            desde,
            hasta,
            porcentaje_general: porcentaje(conteos.clientes_gestionados, conteos.total_clientes),
            porcentaje_mora: porcentaje(conteos.mora_gestionada, conteos.clientes_mora),
            total_clientes: conteos.total_clientes,
            clientes_gestionados: conteos.clientes_gestionados,
            clientes_mora: conteos.clientes_mora,
            mora_gestionada: conteos.mora_gestionada,
        })
    }

    pub async fn tendencia(
        &self,
        alcance: &AlcanceCartera,
        desde: NaiveDate,
        hasta: NaiveDate,
    ) -> Result<Vec<TendenciaCartera>, AppError> {
        self.reporte_repo.tendencia(alcance, desde, hasta).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn factura(nit: &str, dias: i64, valor: f64) -> FacturaCartera {
        FacturaCartera {
            id: 0,
            nit: nit.to_string(),
            razon_social: format!("Cliente {}", nit),
            factura: format!("F-{}-{}", nit, dias),
            valor,
            fecha_factura: None,
            fecha_vencimiento: None,
            condicion_pago: None,
            dias_vencidos: dias,
            vendedor: None,
            centro_operacion: None,
            fecha_carga: Utc::now(),
        }
    }

    #[test]
    fn particion_estandar_un_valor_por_rango() {
        let facturas: Vec<_> =
            [0, 15, 45, 75, 120].iter().map(|d| factura("900100200", *d, 100.0)).collect();

        let edades = clasificar_por_edades(&facturas, CORTES_ESTANDAR);
        let valores: Vec<f64> = edades.iter().map(|e| e.valor).collect();
        assert_eq!(valores, vec![100.0, 100.0, 100.0, 100.0, 100.0]);
    }

    // Ley de partición: re-clasificar no crea ni destruye valor.
    #[test]
    fn la_particion_preserva_el_total() {
        let facturas: Vec<_> = [-5, 0, 1, 30, 31, 60, 61, 90, 91, 180, 181, 365, 366, 1000]
            .iter()
            .enumerate()
            .map(|(i, d)| factura(&format!("nit-{}", i), *d, 37.5))
            .collect();
        let total: f64 = facturas.iter().map(|f| f.valor).sum();

        for cortes in [CORTES_ESTANDAR, CORTES_DETALLE] {
            let suma: f64 = clasificar_por_edades(&facturas, cortes).iter().map(|e| e.valor).sum();
            assert!((suma - total).abs() < 1e-9);
        }
    }

    #[test]
    fn limites_inclusivos_de_los_rangos() {
        let facturas =
            vec![factura("a", 30, 10.0), factura("b", 31, 20.0), factura("c", -3, 5.0)];
        let edades = clasificar_por_edades(&facturas, CORTES_ESTANDAR);

        assert_eq!(edades[0].etiqueta, "Al día");
        assert_eq!(edades[0].valor, 5.0); // los días negativos cuentan como al día
        assert_eq!(edades[1].valor, 10.0); // 30 cierra el rango 1-30
        assert_eq!(edades[2].valor, 20.0); // 31 abre el rango 31-60
    }

    #[test]
    fn clientes_distintos_por_rango() {
        let facturas = vec![
            factura("x", 10, 1.0),
            factura("x", 20, 1.0),
            factura("y", 25, 1.0),
        ];
        let edades = clasificar_por_edades(&facturas, CORTES_ESTANDAR);
        assert_eq!(edades[1].num_facturas, 3);
        assert_eq!(edades[1].num_clientes, 2);
    }

    #[test]
    fn porcentaje_con_total_cero_es_cero() {
        assert_eq!(porcentaje(0, 0), 0.0);
        assert_eq!(porcentaje(5, 0), 0.0);
        assert_eq!(porcentaje(1, 4), 25.0);
    }
}
