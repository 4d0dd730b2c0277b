//! HTTP implementation of the ledger contract
//!
//! One method per backend endpoint; request shaping and response mapping
//! only. Mutating endpoint families (generation, payments, cut closing)
//! each sit behind an in-flight guard because the backend is not
//! idempotent for them.

use async_trait::async_trait;
use std::sync::Arc;

use core_kernel::{
    ApplicantId, CashCutId, CashierId, ChargeConceptId, DomainPort, Money, PaymentId, PortError,
    ReceiptId, ReceiptLineId, StudentId,
};
use domain_billing::{
    AdjustmentOutcome, AppliedPaymentOutcome, BillingTemplate, CashCut, CashCutSummary, DateRange,
    LedgerPort, NewManualReceipt, NewPayment, Payment, PaymentApplication, Receipt, ReceiptPage,
    ReceiptQuery,
};
use rust_decimal::Decimal;

use crate::config::HttpConfig;
use crate::dto::ledger::{
    AplicacionDto, AplicarPagoRequest, BusquedaDto, BusquedaQuery, CorteDto, CorteResumenDto,
    GenerarCorteRequest, GenerarPlantillaRequest, GenerarReciboRequest, MontoRequest,
    MotivoRequest, PagoRequest, PlantillaDto, ReciboDto, RegistrarPagoResponse,
    RegistrarYAplicarRequest, ResultadoAjusteDto, ResultadoAplicacionDto,
};
use crate::guard::InFlightGuard;
use crate::session::SessionStore;
use crate::transport::Transport;

pub struct HttpLedger {
    transport: Transport,
    generation_guard: InFlightGuard,
    payment_guard: InFlightGuard,
    cut_guard: InFlightGuard,
}

impl HttpLedger {
    pub fn new(config: &HttpConfig, session: Arc<SessionStore>) -> Result<Self, PortError> {
        Ok(Self {
            transport: Transport::new(config, session)?,
            generation_guard: InFlightGuard::new(),
            payment_guard: InFlightGuard::new(),
            cut_guard: InFlightGuard::new(),
        })
    }

    fn receipts_from(dtos: Vec<ReciboDto>) -> Result<Vec<Receipt>, PortError> {
        dtos.into_iter().map(Receipt::try_from).collect()
    }
}

impl DomainPort for HttpLedger {}

#[async_trait]
impl LedgerPort for HttpLedger {
    async fn generate_manual_receipt(
        &self,
        applicant: ApplicantId,
        request: NewManualReceipt,
    ) -> Result<Receipt, PortError> {
        let _permit = self.generation_guard.try_begin("la generación de recibos")?;
        let body = GenerarReciboRequest {
            monto: request.amount.amount(),
            concepto: request.concept,
            dias_vencimiento: request.due_days,
            id_concepto_pago: None,
        };
        let dto: ReciboDto = self
            .transport
            .post_json(
                &format!("/Aspirante/{}/generar-recibo-inscripcion", applicant.raw()),
                &body,
                "generar el recibo",
            )
            .await?;
        dto.try_into()
    }

    async fn generate_concept_receipt(
        &self,
        applicant: ApplicantId,
        concept: ChargeConceptId,
        due_days: u32,
    ) -> Result<Receipt, PortError> {
        let _permit = self.generation_guard.try_begin("la generación de recibos")?;
        // Same endpoint as the manual path; amount 0 plus the concept id
        // tells the backend to resolve the amount from its catalog.
        let body = GenerarReciboRequest {
            monto: Decimal::ZERO,
            concepto: String::new(),
            dias_vencimiento: due_days,
            id_concepto_pago: Some(concept.raw()),
        };
        let dto: ReciboDto = self
            .transport
            .post_json(
                &format!("/Aspirante/{}/generar-recibo-inscripcion", applicant.raw()),
                &body,
                "generar el recibo",
            )
            .await?;
        dto.try_into()
    }

    async fn find_available_template(
        &self,
        applicant: ApplicantId,
    ) -> Result<Option<BillingTemplate>, PortError> {
        let dto: Option<PlantillaDto> = self
            .transport
            .get_optional_json(
                &format!("/Aspirante/{}/plantilla-disponible", applicant.raw()),
                "consultar la plantilla",
            )
            .await?;
        Ok(dto.map(BillingTemplate::from))
    }

    async fn expand_template(
        &self,
        applicant: ApplicantId,
        template: &BillingTemplate,
        purge_pending: bool,
    ) -> Result<Vec<Receipt>, PortError> {
        let _permit = self.generation_guard.try_begin("la generación de recibos")?;
        let body = GenerarPlantillaRequest {
            id_plantilla: template.id.raw(),
            eliminar_pendientes_existentes: purge_pending,
        };
        let dtos: Vec<ReciboDto> = self
            .transport
            .post_json(
                &format!("/Aspirante/{}/generar-recibos-plantilla", applicant.raw()),
                &body,
                "generar los recibos de plantilla",
            )
            .await?;
        Self::receipts_from(dtos)
    }

    async fn search_receipts(&self, query: &ReceiptQuery) -> Result<ReceiptPage, PortError> {
        let dto: BusquedaDto = self
            .transport
            .get_json_query(
                "/recibos/buscar",
                &BusquedaQuery::from(query),
                "buscar recibos",
            )
            .await?;
        dto.try_into()
    }

    async fn receipts_for_applicant(
        &self,
        applicant: ApplicantId,
    ) -> Result<Vec<Receipt>, PortError> {
        let dtos: Vec<ReciboDto> = self
            .transport
            .get_json(
                &format!("/Aspirante/{}/recibos", applicant.raw()),
                "consultar los recibos",
            )
            .await?;
        Self::receipts_from(dtos)
    }

    async fn get_receipt(&self, receipt: ReceiptId) -> Result<Receipt, PortError> {
        let dto: ReciboDto = self
            .transport
            .get_json(
                &format!("/recibos/{}", receipt.raw()),
                "consultar el recibo",
            )
            .await?;
        dto.try_into()
    }

    async fn cancel_receipt(&self, receipt: ReceiptId, reason: &str) -> Result<Receipt, PortError> {
        let body = MotivoRequest {
            motivo: reason.to_string(),
        };
        let dto: ReciboDto = self
            .transport
            .put_json(
                &format!("/recibos/{}/cancelar", receipt.raw()),
                &body,
                "cancelar el recibo",
            )
            .await?;
        dto.try_into()
    }

    async fn reverse_receipt(
        &self,
        receipt: ReceiptId,
        reason: &str,
    ) -> Result<Receipt, PortError> {
        let body = MotivoRequest {
            motivo: reason.to_string(),
        };
        let dto: ReciboDto = self
            .transport
            .put_json(
                &format!("/recibos/{}/reversar", receipt.raw()),
                &body,
                "reversar el recibo",
            )
            .await?;
        dto.try_into()
    }

    async fn delete_receipt(&self, receipt: ReceiptId) -> Result<(), PortError> {
        self.transport
            .delete(
                &format!("/recibos/{}", receipt.raw()),
                "eliminar el recibo",
            )
            .await
    }

    async fn register_payment(&self, payment: &NewPayment) -> Result<PaymentId, PortError> {
        let _permit = self.payment_guard.try_begin("el registro del pago")?;
        let response: RegistrarPagoResponse = self
            .transport
            .post_json("/Pagos", &PagoRequest::from(payment), "registrar el pago")
            .await?;
        Ok(PaymentId::new(response.id_pago))
    }

    async fn apply_payment(
        &self,
        payment: PaymentId,
        applications: &[PaymentApplication],
    ) -> Result<Vec<AppliedPaymentOutcome>, PortError> {
        let _permit = self.payment_guard.try_begin("la aplicación del pago")?;
        let body = AplicarPagoRequest {
            id_pago: payment.raw(),
            aplicaciones: applications.iter().map(AplicacionDto::from).collect(),
        };
        let dtos: Vec<ResultadoAplicacionDto> = self
            .transport
            .post_json("/Pagos/aplicar", &body, "aplicar el pago")
            .await?;
        dtos.into_iter()
            .map(AppliedPaymentOutcome::try_from)
            .collect()
    }

    async fn register_and_apply(
        &self,
        receipt: ReceiptId,
        payment: &NewPayment,
    ) -> Result<AppliedPaymentOutcome, PortError> {
        let _permit = self.payment_guard.try_begin("el registro del pago")?;
        let body = RegistrarYAplicarRequest {
            id_recibo: receipt.raw(),
            pago: PagoRequest::from(payment),
        };
        let dto: ResultadoAplicacionDto = self
            .transport
            .post_json("/Pagos/registrar-y-aplicar", &body, "aplicar el pago")
            .await?;
        dto.try_into()
    }

    async fn adjust_line_amount(
        &self,
        receipt: ReceiptId,
        line: ReceiptLineId,
        amount: Money,
    ) -> Result<AdjustmentOutcome, PortError> {
        let body = MontoRequest {
            monto: amount.amount(),
        };
        let dto: ResultadoAjusteDto = self
            .transport
            .put_json(
                &format!("/caja/recibos/{}/detalles/{}", receipt.raw(), line.raw()),
                &body,
                "ajustar el detalle",
            )
            .await?;
        dto.try_into()
    }

    async fn adjust_surcharge(
        &self,
        receipt: ReceiptId,
        amount: Money,
    ) -> Result<AdjustmentOutcome, PortError> {
        let body = MontoRequest {
            monto: amount.amount(),
        };
        let dto: ResultadoAjusteDto = self
            .transport
            .put_json(
                &format!("/caja/recibos/{}/recargo", receipt.raw()),
                &body,
                "ajustar el recargo",
            )
            .await?;
        dto.try_into()
    }

    async fn generate_cash_cut(
        &self,
        range: DateRange,
        cashier: Option<CashierId>,
    ) -> Result<CashCutSummary, PortError> {
        let body = GenerarCorteRequest {
            fecha_inicio: range.from,
            fecha_fin: range.to,
            id_cajero: cashier.map(|c| c.raw()),
        };
        let dto: CorteResumenDto = self
            .transport
            .post_json("/caja/corte/generar", &body, "generar el corte")
            .await?;
        dto.try_into()
    }

    async fn close_cash_cut(&self, summary: &CashCutSummary) -> Result<CashCut, PortError> {
        let _permit = self.cut_guard.try_begin("el cierre del corte")?;
        let dto: CorteDto = self
            .transport
            .post_json(
                "/caja/corte/cerrar",
                &CorteResumenDto::from(summary),
                "cerrar el corte",
            )
            .await?;
        dto.try_into()
    }

    async fn cash_cut_pdf(&self, cut: CashCutId) -> Result<Vec<u8>, PortError> {
        self.transport
            .get_bytes(
                &format!("/caja/cortes/{}/pdf", cut.raw()),
                "descargar el corte",
            )
            .await
    }

    async fn recalculate_discounts(&self, student: StudentId) -> Result<(), PortError> {
        self.transport
            .post_empty(
                &format!("/Estudiante/{}/recalcular-descuentos", student.raw()),
                &serde_json::json!({}),
                "recalcular los descuentos",
            )
            .await
    }

    /// The admin listing endpoint renders the filtered set as an xlsx blob;
    /// the interactive page and its counters come from `/recibos/buscar`
    async fn receipts_excel(&self, query: &ReceiptQuery) -> Result<Vec<u8>, PortError> {
        self.transport
            .get_bytes_query(
                "/recibos/admin",
                &BusquedaQuery::from(query),
                "descargar el listado",
            )
            .await
    }
}
