// src/handlers/cartera.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        permisos::{PermExportarCartera, PermImportarCartera, RequierePermiso},
    },
    models::cartera::DetalleCliente,
    services::acceso::AlcanceCartera,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarteraQuery {
    pub solo_vencidas: Option<bool>,
    // Solo admin/supervisor pueden acotar por vendedor; para los demás
    // roles el alcance propio siempre gana.
    pub vendedor: Option<String>,
}

// GET /api/cartera
pub async fn listar_cartera(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Query(query): Query<CarteraQuery>,
) -> Result<impl IntoResponse, AppError> {
    let alcance = AlcanceCartera::del_usuario(&usuario).restringir(query.vendedor);
    let facturas = app_state
        .cartera_repo
        .listar_actual(&alcance, query.solo_vencidas.unwrap_or(false))
        .await?;
    Ok((StatusCode::OK, Json(facturas)))
}

// GET /api/cartera/clientes
pub async fn listar_clientes(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Query(query): Query<CarteraQuery>,
) -> Result<impl IntoResponse, AppError> {
    let alcance = AlcanceCartera::del_usuario(&usuario).restringir(query.vendedor);
    let clientes = app_state.cliente_repo.listar(&alcance).await?;
    Ok((StatusCode::OK, Json(clientes)))
}

// GET /api/cartera/clientes/{nit}
// Un cliente fuera del alcance del usuario responde 404, no 403.
pub async fn detalle_cliente(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    Path(nit): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let cliente = app_state
        .cliente_repo
        .buscar_por_nit(&nit)
        .await?
        .ok_or(AppError::ClienteNoEncontrado)?;

    match AlcanceCartera::del_usuario(&usuario) {
        AlcanceCartera::Total => {}
        AlcanceCartera::Vendedor(vendedor) => {
            if cliente.vendedor.as_deref() != Some(vendedor.as_str()) {
                return Err(AppError::ClienteNoEncontrado);
            }
        }
        AlcanceCartera::Ninguno => return Err(AppError::ClienteNoEncontrado),
    }

    let facturas = app_state.cartera_repo.facturas_de_cliente(&nit).await?;
    let gestiones = app_state.gestion_repo.gestiones_de_cliente(&nit).await?;

    let total_cartera: f64 = facturas.iter().map(|f| f.valor).sum();
    let total_vencido: f64 =
        facturas.iter().filter(|f| f.dias_vencidos > 0).map(|f| f.valor).sum();

    Ok((
        StatusCode::OK,
        Json(DetalleCliente { cliente, facturas, gestiones, total_cartera, total_vencido }),
    ))
}

// GET /api/cartera/vendedores
pub async fn listar_vendedores(
    State(app_state): State<AppState>,
    AuthenticatedUser(_usuario): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let vendedores = app_state.cliente_repo.listar_vendedores().await?;
    Ok((StatusCode::OK, Json(vendedores)))
}

// GET /api/cartera/exportar
// Volcado plano de la cartera visible, para abrir en hoja de cálculo.
pub async fn exportar_cartera(
    State(app_state): State<AppState>,
    AuthenticatedUser(usuario): AuthenticatedUser,
    _perm: RequierePermiso<PermExportarCartera>,
    Query(query): Query<CarteraQuery>,
) -> Result<impl IntoResponse, AppError> {
    let alcance = AlcanceCartera::del_usuario(&usuario).restringir(query.vendedor);
    let facturas = app_state
        .cartera_repo
        .listar_actual(&alcance, query.solo_vencidas.unwrap_or(false))
        .await?;

    let mut escritor = csv::Writer::from_writer(Vec::new());
    escritor
        .write_record([
            "NIT",
            "Razón Social",
            "Factura",
            "Valor",
            "Fecha Factura",
            "Fecha Vencimiento",
            "Condición Pago",
            "Días Vencidos",
            "Vendedor",
            "C.O.",
        ])
        .map_err(anyhow::Error::from)?;

    for factura in &facturas {
        let valor = format!("{:.2}", factura.valor);
        let fecha_factura = factura.fecha_factura.map(|f| f.to_string()).unwrap_or_default();
        let fecha_vencimiento =
            factura.fecha_vencimiento.map(|f| f.to_string()).unwrap_or_default();
        let dias_vencidos = factura.dias_vencidos.to_string();

        escritor
            .write_record([
                factura.nit.as_str(),
                factura.razon_social.as_str(),
                factura.factura.as_str(),
                valor.as_str(),
                fecha_factura.as_str(),
                fecha_vencimiento.as_str(),
                factura.condicion_pago.as_deref().unwrap_or(""),
                dias_vencidos.as_str(),
                factura.vendedor.as_deref().unwrap_or(""),
                factura.centro_operacion.as_deref().unwrap_or(""),
            ])
            .map_err(anyhow::Error::from)?;
    }

    let cuerpo = escritor
        .into_inner()
        .map_err(|e| anyhow::anyhow!("No se pudo cerrar el buffer CSV: {}", e))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"cartera_actual.csv\""),
        ],
        cuerpo,
    ))
}

// POST /api/cartera/importar
// El cuerpo es el archivo CSV completo. Reemplaza la foto actual entera.
pub async fn importar_cartera(
    State(app_state): State<AppState>,
    _perm: RequierePermiso<PermImportarCartera>,
    contenido: String,
) -> Result<impl IntoResponse, AppError> {
    let hoy = Utc::now().date_naive();
    let resultado = app_state.importacion_service.importar_cartera(&contenido, hoy).await?;
    Ok((StatusCode::OK, Json(resultado)))
}
