//! Ledger wire DTOs and conversions

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{
    ApplicantId, BillingTemplateId, CashCutId, CashierId, Currency, Money, PaymentId,
    PaymentMethodId, PortError, ReceiptId, ReceiptLineId, StudentId, StudyPlanId, TermId,
};
use domain_billing::{
    AdjustmentOutcome, AppliedPaymentOutcome, BillingTemplate, CashCut, CashCutSummary, DateRange,
    MethodTotal, NewPayment, Payment, PaymentApplication, PaymentStatus, Receipt, ReceiptOwner,
    ReceiptPage, ReceiptQuery, ReceiptStats, ReceiptStatus, ReceiptSummary, TemplateLine,
};

fn parse_currency(moneda: Option<&str>) -> Result<Currency, PortError> {
    match moneda {
        None | Some("MXN") => Ok(Currency::MXN),
        Some("USD") => Ok(Currency::USD),
        Some(other) => Err(PortError::transformation(format!(
            "unknown currency '{other}'"
        ))),
    }
}

fn parse_receipt_status(estatus: &str) -> Result<ReceiptStatus, PortError> {
    ReceiptStatus::from_wire_name(estatus).ok_or_else(|| {
        PortError::transformation(format!("unknown receipt status '{estatus}'"))
    })
}

fn parse_payment_status(estatus: u8) -> Result<PaymentStatus, PortError> {
    PaymentStatus::from_wire_code(estatus).ok_or_else(|| {
        PortError::transformation(format!("unknown payment status code {estatus}"))
    })
}

fn parse_owner(
    id_aspirante: Option<i64>,
    id_estudiante: Option<i64>,
) -> Result<ReceiptOwner, PortError> {
    match (id_aspirante, id_estudiante) {
        (Some(id), _) => Ok(ReceiptOwner::Applicant(ApplicantId::new(id))),
        (None, Some(id)) => Ok(ReceiptOwner::Student(StudentId::new(id))),
        (None, None) => Err(PortError::transformation(
            "receipt carries neither idAspirante nor idEstudiante",
        )),
    }
}

// --- Receipts ---------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReciboDetalleDto {
    pub id_recibo_detalle: i64,
    pub descripcion: String,
    pub cantidad: Decimal,
    pub precio_unitario: Decimal,
    pub importe: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReciboDto {
    pub id_recibo: i64,
    pub folio: String,
    #[serde(default)]
    pub id_aspirante: Option<i64>,
    #[serde(default)]
    pub id_estudiante: Option<i64>,
    pub fecha_emision: NaiveDate,
    pub fecha_vencimiento: NaiveDate,
    pub subtotal: Decimal,
    pub descuento: Decimal,
    pub recargos: Decimal,
    pub total: Decimal,
    pub saldo: Decimal,
    pub estatus: String,
    #[serde(default)]
    pub moneda: Option<String>,
    #[serde(default)]
    pub detalles: Vec<ReciboDetalleDto>,
    #[serde(default)]
    pub id_plan_estudio: Option<i64>,
    #[serde(default)]
    pub id_periodo: Option<i64>,
}

impl TryFrom<ReciboDto> for Receipt {
    type Error = PortError;

    fn try_from(dto: ReciboDto) -> Result<Self, Self::Error> {
        let currency = parse_currency(dto.moneda.as_deref())?;
        let money = |amount: Decimal| Money::new(amount, currency);

        let lines = dto
            .detalles
            .into_iter()
            .map(|d| domain_billing::ReceiptLine {
                id: ReceiptLineId::new(d.id_recibo_detalle),
                description: d.descripcion,
                quantity: d.cantidad,
                unit_price: money(d.precio_unitario),
                amount: money(d.importe),
            })
            .collect();

        Ok(Receipt {
            id: ReceiptId::new(dto.id_recibo),
            folio: dto.folio,
            owner: parse_owner(dto.id_aspirante, dto.id_estudiante)?,
            issued_on: dto.fecha_emision,
            due_on: dto.fecha_vencimiento,
            subtotal: money(dto.subtotal),
            discount: money(dto.descuento),
            surcharges: money(dto.recargos),
            total: money(dto.total),
            balance: money(dto.saldo),
            status: parse_receipt_status(&dto.estatus)?,
            lines,
            study_plan: dto.id_plan_estudio.map(StudyPlanId::new),
            term: dto.id_periodo.map(TermId::new),
        })
    }
}

/// Body of `POST /Aspirante/{id}/generar-recibo-inscripcion`; the catalog
/// path sends `monto: 0` plus `idConceptoPago` and the backend resolves the
/// real amount
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerarReciboRequest {
    pub monto: Decimal,
    pub concepto: String,
    pub dias_vencimiento: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_concepto_pago: Option<i64>,
}

/// Body of `POST /Aspirante/{id}/generar-recibos-plantilla`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerarPlantillaRequest {
    pub id_plantilla: i64,
    pub eliminar_pendientes_existentes: bool,
}

/// Body of the cancel/reverse transitions
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MotivoRequest {
    pub motivo: String,
}

// --- Templates --------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantillaDetalleDto {
    pub concepto: String,
    pub cantidad: Decimal,
    pub precio_unitario: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantillaDto {
    pub id_plantilla: i64,
    pub id_plan_estudio: i64,
    pub id_periodo: i64,
    pub numero_recibos: u32,
    pub dia_vencimiento: u8,
    #[serde(default)]
    pub detalles: Vec<PlantillaDetalleDto>,
}

impl From<PlantillaDto> for BillingTemplate {
    fn from(dto: PlantillaDto) -> Self {
        BillingTemplate {
            id: BillingTemplateId::new(dto.id_plantilla),
            study_plan: StudyPlanId::new(dto.id_plan_estudio),
            term: TermId::new(dto.id_periodo),
            receipt_count: dto.numero_recibos,
            due_day_of_month: dto.dia_vencimiento,
            lines: dto
                .detalles
                .into_iter()
                .map(|d| TemplateLine {
                    concept: d.concepto,
                    quantity: d.cantidad,
                    unit_price: Money::new(d.precio_unitario, Currency::MXN),
                })
                .collect(),
        }
    }
}

// --- Payments ---------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagoDto {
    pub id_pago: i64,
    pub fecha_pago_utc: DateTime<Utc>,
    pub id_medio_pago: i64,
    pub monto: Decimal,
    pub estatus: u8,
    #[serde(default)]
    pub moneda: Option<String>,
    #[serde(default)]
    pub referencia: Option<String>,
    #[serde(default)]
    pub notas: Option<String>,
}

impl TryFrom<PagoDto> for Payment {
    type Error = PortError;

    fn try_from(dto: PagoDto) -> Result<Self, Self::Error> {
        let currency = parse_currency(dto.moneda.as_deref())?;
        Ok(Payment {
            id: PaymentId::new(dto.id_pago),
            paid_at_utc: dto.fecha_pago_utc,
            method: PaymentMethodId::new(dto.id_medio_pago),
            amount: Money::new(dto.monto, currency),
            status: parse_payment_status(dto.estatus)?,
            reference: dto.referencia,
            notes: dto.notas,
        })
    }
}

impl From<&Payment> for PagoDto {
    fn from(payment: &Payment) -> Self {
        PagoDto {
            id_pago: payment.id.raw(),
            fecha_pago_utc: payment.paid_at_utc,
            id_medio_pago: payment.method.raw(),
            monto: payment.amount.amount(),
            estatus: payment.status.wire_code(),
            moneda: Some(payment.amount.currency().code().to_string()),
            referencia: payment.reference.clone(),
            notas: payment.notes.clone(),
        }
    }
}

/// Body of `POST /Pagos`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagoRequest {
    pub fecha_pago_utc: DateTime<Utc>,
    pub id_medio_pago: i64,
    pub monto: Decimal,
    pub estatus: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referencia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
}

impl From<&NewPayment> for PagoRequest {
    fn from(payment: &NewPayment) -> Self {
        PagoRequest {
            fecha_pago_utc: payment.paid_at_utc,
            id_medio_pago: payment.method.raw(),
            monto: payment.amount.amount(),
            estatus: payment.status.wire_code(),
            referencia: payment.reference.clone(),
            notas: payment.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarPagoResponse {
    pub id_pago: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AplicacionDto {
    pub id_recibo_detalle: i64,
    pub monto: Decimal,
}

impl From<&PaymentApplication> for AplicacionDto {
    fn from(application: &PaymentApplication) -> Self {
        AplicacionDto {
            id_recibo_detalle: application.line.raw(),
            monto: application.amount.amount(),
        }
    }
}

/// Body of `POST /Pagos/aplicar`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AplicarPagoRequest {
    pub id_pago: i64,
    pub aplicaciones: Vec<AplicacionDto>,
}

/// Body of `POST /Pagos/registrar-y-aplicar`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarYAplicarRequest {
    pub id_recibo: i64,
    #[serde(flatten)]
    pub pago: PagoRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoAplicacionDto {
    pub id_recibo: i64,
    pub saldo_anterior: Decimal,
    pub saldo_nuevo: Decimal,
    pub estatus_anterior: String,
    pub estatus_nuevo: String,
    #[serde(default)]
    pub moneda: Option<String>,
}

impl TryFrom<ResultadoAplicacionDto> for AppliedPaymentOutcome {
    type Error = PortError;

    fn try_from(dto: ResultadoAplicacionDto) -> Result<Self, Self::Error> {
        let currency = parse_currency(dto.moneda.as_deref())?;
        Ok(AppliedPaymentOutcome {
            receipt: ReceiptId::new(dto.id_recibo),
            balance_before: Money::new(dto.saldo_anterior, currency),
            balance_after: Money::new(dto.saldo_nuevo, currency),
            status_before: parse_receipt_status(&dto.estatus_anterior)?,
            status_after: parse_receipt_status(&dto.estatus_nuevo)?,
        })
    }
}

// --- Adjustments ------------------------------------------------------------

/// Body of the line/surcharge adjustment calls
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MontoRequest {
    pub monto: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoAjusteDto {
    pub id_recibo: i64,
    pub total_anterior: Decimal,
    pub total_nuevo: Decimal,
    pub saldo_anterior: Decimal,
    pub saldo_nuevo: Decimal,
    #[serde(default)]
    pub moneda: Option<String>,
}

impl TryFrom<ResultadoAjusteDto> for AdjustmentOutcome {
    type Error = PortError;

    fn try_from(dto: ResultadoAjusteDto) -> Result<Self, Self::Error> {
        let currency = parse_currency(dto.moneda.as_deref())?;
        Ok(AdjustmentOutcome {
            receipt: ReceiptId::new(dto.id_recibo),
            total_before: Money::new(dto.total_anterior, currency),
            total_after: Money::new(dto.total_nuevo, currency),
            balance_before: Money::new(dto.saldo_anterior, currency),
            balance_after: Money::new(dto.saldo_nuevo, currency),
        })
    }
}

// --- Search -----------------------------------------------------------------

/// Query parameters of `GET /recibos/buscar` and the Excel download
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusquedaQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_periodo: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estatus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matricula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folio: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub solo_vencidos: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub solo_pendientes: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub solo_pagados: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_emision_inicio: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_emision_fin: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_vencimiento_inicio: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_vencimiento_fin: Option<NaiveDate>,
    pub pagina: u32,
    pub tamano_pagina: u32,
}

impl From<&ReceiptQuery> for BusquedaQuery {
    fn from(query: &ReceiptQuery) -> Self {
        BusquedaQuery {
            id_periodo: query.term.map(|t| t.raw()),
            estatus: query.status.map(|s| s.wire_name().to_string()),
            matricula: query.matricula_contains.clone(),
            folio: query.folio_contains.clone(),
            solo_vencidos: query.only_overdue,
            solo_pendientes: query.only_pending,
            solo_pagados: query.only_paid,
            fecha_emision_inicio: query.issued_between.map(|(from, _)| from),
            fecha_emision_fin: query.issued_between.map(|(_, to)| to),
            fecha_vencimiento_inicio: query.due_between.map(|(from, _)| from),
            fecha_vencimiento_fin: query.due_between.map(|(_, to)| to),
            pagina: query.page,
            tamano_pagina: query.page_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReciboResumenDto {
    pub id_recibo: i64,
    pub folio: String,
    #[serde(default)]
    pub id_aspirante: Option<i64>,
    #[serde(default)]
    pub id_estudiante: Option<i64>,
    #[serde(default)]
    pub matricula: Option<String>,
    pub nombre: String,
    pub fecha_vencimiento: NaiveDate,
    pub total: Decimal,
    pub saldo: Decimal,
    pub estatus: String,
    #[serde(default)]
    pub moneda: Option<String>,
}

impl TryFrom<ReciboResumenDto> for ReceiptSummary {
    type Error = PortError;

    fn try_from(dto: ReciboResumenDto) -> Result<Self, Self::Error> {
        let currency = parse_currency(dto.moneda.as_deref())?;
        Ok(ReceiptSummary {
            id: ReceiptId::new(dto.id_recibo),
            folio: dto.folio,
            owner: parse_owner(dto.id_aspirante, dto.id_estudiante)?,
            matricula: dto.matricula,
            holder_name: dto.nombre,
            due_on: dto.fecha_vencimiento,
            total: Money::new(dto.total, currency),
            balance: Money::new(dto.saldo, currency),
            status: parse_receipt_status(&dto.estatus)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstadisticasDto {
    pub total_registros: u64,
    pub total_pagados: u64,
    pub total_pendientes: u64,
    pub total_vencidos: u64,
    pub total_saldo_pendiente: Decimal,
    pub total_recargos: Decimal,
}

impl From<EstadisticasDto> for ReceiptStats {
    fn from(dto: EstadisticasDto) -> Self {
        ReceiptStats {
            total_records: dto.total_registros,
            total_paid: dto.total_pagados,
            total_pending: dto.total_pendientes,
            total_overdue: dto.total_vencidos,
            pending_balance: Money::new(dto.total_saldo_pendiente, Currency::MXN),
            total_surcharges: Money::new(dto.total_recargos, Currency::MXN),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusquedaDto {
    pub recibos: Vec<ReciboResumenDto>,
    pub estadisticas: EstadisticasDto,
    pub pagina: u32,
    pub tamano_pagina: u32,
}

impl TryFrom<BusquedaDto> for ReceiptPage {
    type Error = PortError;

    fn try_from(dto: BusquedaDto) -> Result<Self, Self::Error> {
        let items = dto
            .recibos
            .into_iter()
            .map(ReceiptSummary::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ReceiptPage {
            items,
            stats: dto.estadisticas.into(),
            page: dto.pagina,
            page_size: dto.tamano_pagina,
        })
    }
}

// --- Cash cuts --------------------------------------------------------------

/// Body of `POST /caja/corte/generar`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerarCorteRequest {
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_cajero: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalMedioDto {
    pub id_medio_pago: i64,
    pub medio_pago: String,
    pub numero_pagos: u32,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorteResumenDto {
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    #[serde(default)]
    pub id_cajero: Option<i64>,
    pub totales_por_medio: Vec<TotalMedioDto>,
    pub pagos: Vec<PagoDto>,
    pub total_general: Decimal,
}

impl TryFrom<CorteResumenDto> for CashCutSummary {
    type Error = PortError;

    fn try_from(dto: CorteResumenDto) -> Result<Self, Self::Error> {
        let payments = dto
            .pagos
            .into_iter()
            .map(Payment::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CashCutSummary {
            range: DateRange::new(dto.fecha_inicio, dto.fecha_fin),
            cashier: dto.id_cajero.map(CashierId::new),
            totals_by_method: dto
                .totales_por_medio
                .into_iter()
                .map(|t| MethodTotal {
                    method: PaymentMethodId::new(t.id_medio_pago),
                    method_name: t.medio_pago,
                    payment_count: t.numero_pagos,
                    total: Money::new(t.total, Currency::MXN),
                })
                .collect(),
            payments,
            grand_total: Money::new(dto.total_general, Currency::MXN),
        })
    }
}

impl From<&CashCutSummary> for CorteResumenDto {
    fn from(summary: &CashCutSummary) -> Self {
        CorteResumenDto {
            fecha_inicio: summary.range.from,
            fecha_fin: summary.range.to,
            id_cajero: summary.cashier.map(|c| c.raw()),
            totales_por_medio: summary
                .totals_by_method
                .iter()
                .map(|t| TotalMedioDto {
                    id_medio_pago: t.method.raw(),
                    medio_pago: t.method_name.clone(),
                    numero_pagos: t.payment_count,
                    total: t.total.amount(),
                })
                .collect(),
            pagos: summary.payments.iter().map(PagoDto::from).collect(),
            total_general: summary.grand_total.amount(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorteDto {
    pub id_corte: i64,
    pub fecha_cierre: DateTime<Utc>,
    pub resumen: CorteResumenDto,
}

impl TryFrom<CorteDto> for CashCut {
    type Error = PortError;

    fn try_from(dto: CorteDto) -> Result<Self, Self::Error> {
        Ok(CashCut {
            id: CashCutId::new(dto.id_corte),
            closed_at: dto.fecha_cierre,
            summary: dto.resumen.try_into()?,
        })
    }
}
