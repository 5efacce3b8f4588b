// src/models/reportes.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

// 1. Resumen de la cartera (las tarjetas del tablero)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumenCartera {
    pub total_cartera: f64,
    pub total_vencido: f64,
    pub num_clientes: i64,
    pub num_facturas: i64,
    pub porcentaje_vencido: f64,
}

// 2. Un rango del reporte de edades de cartera
#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EdadCartera {
    #[schema(example = "31-60")]
    pub etiqueta: String,
    pub valor: f64,
    pub num_facturas: i64,
    pub num_clientes: i64,
}

// 3. Avance de gestión en un período: cuántos clientes de la cartera visible
// tienen al menos una gestión registrada, en general y en mora.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvanceGestion {
    #[schema(value_type = String, format = Date)]
    pub desde: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub hasta: NaiveDate,
    pub total_clientes: i64,
    pub clientes_gestionados: i64,
    pub clientes_mora: i64,
    pub mora_gestionada: i64,
    pub porcentaje_general: f64,
    pub porcentaje_mora: f64,
}

// 4. Un punto de la serie de tendencia diaria (del histórico diario)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TendenciaCartera {
    #[schema(value_type = String, format = Date)]
    pub fecha_corte: NaiveDate,
    pub total: f64,
    pub vencido: f64,
}

// Parámetros comunes de período. "periodo" es uno de los nombres que entiende
// services::periodos; desde/hasta solo aplican con "Personalizado".
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PeriodoQuery {
    #[param(example = "Mes Actual")]
    pub periodo: Option<String>,
    #[param(value_type = Option<String>)]
    pub desde: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub hasta: Option<NaiveDate>,
}

// Resultado de una importación de cartera
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoImportacion {
    pub facturas_insertadas: usize,
    pub clientes_actualizados: usize,
    pub vendedores_actualizados: usize,
    pub fecha_corte: NaiveDate,
    pub mensaje: String,
}
