// src/models/gestion.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Canales por los que se contacta al cliente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TipoContacto {
    Llamada,
    Whatsapp,
    Correo,
    Visita,
    Otro,
}

// Resultado de una gestión de cobro. La categoría agrupa los resultados en
// los reportes de efectividad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ResultadoGestion {
    // Compromisos de pago
    PromesaPago,
    PagoRealizado,
    PagoParcial,
    AcuerdoPlanPagos,
    // Contacto efectivo sin compromiso
    SolicitaFactura,
    SolicitaEstadoCuenta,
    SolicitaNotaCredito,
    DisputaFactura,
    ReclamoCalidad,
    RevisandoConContabilidad,
    // Contacto fallido
    NoContesta,
    Ocupado,
    NumeroErrado,
    BuzonVoz,
    CorreoEnviado,
    CorreoRebotado,
    ClienteIlocalizable,
    // Seguimiento
    ProgramaLlamada,
    ProgramaVisita,
    VisitaRealizada,
    EnviadoCobroJuridico,
}

impl ResultadoGestion {
    pub fn categoria(&self) -> &'static str {
        use ResultadoGestion::*;
        match self {
            PromesaPago | PagoRealizado | PagoParcial | AcuerdoPlanPagos => "compromiso",
            SolicitaFactura | SolicitaEstadoCuenta | SolicitaNotaCredito | DisputaFactura
            | ReclamoCalidad | RevisandoConContabilidad => "contacto_efectivo",
            NoContesta | Ocupado | NumeroErrado | BuzonVoz | CorreoEnviado | CorreoRebotado
            | ClienteIlocalizable => "contacto_fallido",
            ProgramaLlamada | ProgramaVisita | VisitaRealizada | EnviadoCobroJuridico => {
                "seguimiento"
            }
        }
    }
}

// Una gestión registrada: bitácora append-only, una fila por contacto.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Gestion {
    pub id: Uuid,
    pub nit: String,
    pub tipo_contacto: TipoContacto,
    pub resultado: ResultadoGestion,
    pub fecha_gestion: NaiveDate,
    pub usuario_id: Uuid,
    pub usuario_email: String,
    pub notas: Option<String>,
    pub fecha_promesa_pago: Option<NaiveDate>,
    pub valor_promesa: Option<f64>,
    pub fecha_proximo_seguimiento: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrearGestionPayload {
    #[validate(length(min = 1, message = "El NIT es obligatorio."))]
    #[schema(example = "890900123-4")]
    pub nit: String,

    pub tipo_contacto: TipoContacto,
    pub resultado: ResultadoGestion,

    // Si no viene, se registra con la fecha de hoy
    #[schema(value_type = Option<String>, format = Date, example = "2025-06-15")]
    pub fecha_gestion: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "Las notas no pueden superar 2000 caracteres."))]
    pub notas: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub fecha_promesa_pago: Option<NaiveDate>,
    pub valor_promesa: Option<f64>,
    #[schema(value_type = Option<String>, format = Date)]
    pub fecha_proximo_seguimiento: Option<NaiveDate>,
}
