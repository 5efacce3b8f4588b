// src/models/cartera.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::gestion::Gestion;

// Cliente tal como se persiste. Se upserta en cada importación de cartera;
// el NIT es la llave natural.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub nit: String,
    pub razon_social: String,
    pub telefono: Option<String>,
    pub celular: Option<String>,
    pub direccion: Option<String>,
    pub email: Option<String>,
    pub ciudad: Option<String>,
    pub vendedor: Option<String>,
    pub cupo_activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dimensión de vendedores, poblada desde los archivos importados.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vendedor {
    pub nombre: String,
}

// Una factura de la foto "actual" de la cartera. dias_vencidos viene
// denormalizado del archivo (o se deriva de la fecha de vencimiento).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FacturaCartera {
    pub id: i64,
    pub nit: String,
    pub razon_social: String,
    pub factura: String,
    pub valor: f64,
    pub fecha_factura: Option<NaiveDate>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub condicion_pago: Option<String>,
    pub dias_vencidos: i64,
    pub vendedor: Option<String>,
    pub centro_operacion: Option<String>,
    pub fecha_carga: DateTime<Utc>,
}

// Una fila ya interpretada del archivo de cartera, lista para insertar.
// El mismo archivo trae la factura y los datos de contacto del cliente.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilaImportada {
    pub nit: String,
    pub razon_social: String,
    pub factura: String,
    pub valor: f64,
    pub fecha_factura: Option<NaiveDate>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub condicion_pago: Option<String>,
    pub dias_vencidos: i64,
    pub vendedor: Option<String>,
    pub centro_operacion: Option<String>,
    pub telefono: Option<String>,
    pub celular: Option<String>,
    pub direccion: Option<String>,
    pub email: Option<String>,
    pub ciudad: Option<String>,
    pub cupo_activo: Option<bool>,
}

// Vista de detalle que consume la pantalla de cliente: el cliente, sus
// facturas vigentes y su historial de gestiones.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetalleCliente {
    pub cliente: Cliente,
    pub facturas: Vec<FacturaCartera>,
    pub gestiones: Vec<Gestion>,
    pub total_cartera: f64,
    pub total_vencido: f64,
}
