//! api_client.rs
//!
//! REST-клиент бэкенда бронирования. Бэкенд - внешний участник: движок только
//! оркестрирует его вызовы. Все запросы идут через `CircuitBreaker`, повторов нет.

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

use crate::{
    config::Config,
    error::FetchError,
    models::{
        discount::ApplicableDiscountsResponse,
        seat::SeatAreasResponse,
        ticket::{ReservationStateResponse, TempReservationResponse},
        AreaId, GradeDiscounts, PaymentConfirmRequest, PaymentStartRequest, PaymentStarted,
        PerformanceDetail, PerformanceId, ReservationId, RoundId, SeatArea, SeatGradeId,
        TempReservationRequest, TicketState,
    },
    services::circuit_breaker::{CircuitBreaker, CircuitState},
};

/// Операции бэкенда, которые потребляет движок.
///
/// Сессия и платёжный протокол обобщены по этому трейту, чтобы тесты могли
/// подставлять бэкенд в памяти.
pub trait BookingApi {
    async fn performance_detail(
        &self,
        performance_id: &PerformanceId,
    ) -> Result<PerformanceDetail, FetchError>;

    async fn seat_areas(&self, performance_id: &PerformanceId) -> Result<Vec<SeatArea>, FetchError>;

    async fn reservation_state(
        &self,
        round_id: &RoundId,
        area_id: &AreaId,
    ) -> Result<Vec<TicketState>, FetchError>;

    async fn hold_tickets(&self, request: &TempReservationRequest) -> Result<ReservationId, FetchError>;

    async fn applicable_discounts(
        &self,
        seat_grade_ids: &[SeatGradeId],
    ) -> Result<Vec<GradeDiscounts>, FetchError>;

    async fn start_payment(&self, request: &PaymentStartRequest) -> Result<PaymentStarted, FetchError>;

    async fn confirm_payment(&self, request: &PaymentConfirmRequest) -> Result<(), FetchError>;
}

impl<T: BookingApi> BookingApi for &T {
    async fn performance_detail(
        &self,
        performance_id: &PerformanceId,
    ) -> Result<PerformanceDetail, FetchError> {
        (**self).performance_detail(performance_id).await
    }

    async fn seat_areas(&self, performance_id: &PerformanceId) -> Result<Vec<SeatArea>, FetchError> {
        (**self).seat_areas(performance_id).await
    }

    async fn reservation_state(
        &self,
        round_id: &RoundId,
        area_id: &AreaId,
    ) -> Result<Vec<TicketState>, FetchError> {
        (**self).reservation_state(round_id, area_id).await
    }

    async fn hold_tickets(&self, request: &TempReservationRequest) -> Result<ReservationId, FetchError> {
        (**self).hold_tickets(request).await
    }

    async fn applicable_discounts(
        &self,
        seat_grade_ids: &[SeatGradeId],
    ) -> Result<Vec<GradeDiscounts>, FetchError> {
        (**self).applicable_discounts(seat_grade_ids).await
    }

    async fn start_payment(&self, request: &PaymentStartRequest) -> Result<PaymentStarted, FetchError> {
        (**self).start_payment(request).await
    }

    async fn confirm_payment(&self, request: &PaymentConfirmRequest) -> Result<(), FetchError> {
        (**self).confirm_payment(request).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReservationQuery<'a> {
    round_id: &'a RoundId,
    area_id: &'a AreaId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DiscountLookupRequest<'a> {
    seat_grade_ids: &'a [SeatGradeId],
}

/// HTTP-клиент бэкенда.
#[derive(Clone, Debug)]
pub struct BackendClient {
    /// Базовый URL без завершающего `/`, например `http://localhost:8080/api/v1`.
    base_url: String,
    http_client: reqwest::Client,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl BackendClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        circuit_breaker: CircuitBreaker,
    ) -> Result<Self, FetchError> {
        reqwest::Url::parse(base_url).map_err(|e| FetchError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Transport {
                endpoint: "client builder".to_string(),
                source,
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            circuit_breaker: Arc::new(circuit_breaker),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_seconds),
            CircuitBreaker::from_config(&config.circuit_breaker),
        )
    }

    /// Текущее состояние Circuit Breaker для мониторинга.
    pub fn circuit_breaker_status(&self) -> (CircuitState, u32) {
        (self.circuit_breaker.get_state(), self.circuit_breaker.failure_count())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Отправляет запрос через Circuit Breaker. Ошибки 5xx и сетевые сбои
    /// считаются отказами бэкенда; 4xx - нет, это ответ по существу.
    async fn send(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, FetchError> {
        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking {}", endpoint);
            return Err(FetchError::CircuitOpen);
        }

        debug!("Sending {}", endpoint);

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_server_error() {
                    error!("{} responded with {}", endpoint, status);
                    self.circuit_breaker.record_failure();
                    return Err(FetchError::Status { endpoint: endpoint.to_string(), status });
                }

                self.circuit_breaker.record_success();
                if !status.is_success() {
                    warn!("{} responded with {}", endpoint, status);
                    return Err(FetchError::Status { endpoint: endpoint.to_string(), status });
                }
                Ok(response)
            }
            Err(source) => {
                error!("{} failed: {:?}", endpoint, source);
                self.circuit_breaker.record_failure();
                Err(FetchError::Transport { endpoint: endpoint.to_string(), source })
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        self.send(endpoint, request)
            .await?
            .json::<T>()
            .await
            .map_err(|source| {
                error!("{} body could not be decoded: {}", endpoint, source);
                FetchError::Decode { endpoint: endpoint.to_string(), source }
            })
    }
}

impl BookingApi for BackendClient {
    async fn performance_detail(
        &self,
        performance_id: &PerformanceId,
    ) -> Result<PerformanceDetail, FetchError> {
        let request = self
            .http_client
            .get(self.url(&format!("/performance/{}", performance_id)))
            .header(reqwest::header::ACCEPT, "application/json");

        self.send_json("GET /performance/{id}", request).await
    }

    async fn seat_areas(&self, performance_id: &PerformanceId) -> Result<Vec<SeatArea>, FetchError> {
        let request = self
            .http_client
            .get(self.url(&format!("/performance/{}/seat-areas", performance_id)));

        let response: SeatAreasResponse = self.send_json("GET /performance/{id}/seat-areas", request).await?;
        info!("Loaded {} seat areas for performance {}", response.seat_areas.len(), performance_id);
        Ok(response.seat_areas)
    }

    async fn reservation_state(
        &self,
        round_id: &RoundId,
        area_id: &AreaId,
    ) -> Result<Vec<TicketState>, FetchError> {
        let request = self
            .http_client
            .get(self.url("/reservation"))
            .query(&ReservationQuery { round_id, area_id });

        let response: ReservationStateResponse = self.send_json("GET /reservation", request).await?;
        info!(
            "Loaded {} tickets for round={} area={}",
            response.tickets.len(),
            round_id,
            area_id
        );
        Ok(response.tickets)
    }

    async fn hold_tickets(&self, request: &TempReservationRequest) -> Result<ReservationId, FetchError> {
        info!("Holding {} tickets for performance {}", request.ticket_ids.len(), request.performance_id);

        let builder = self.http_client.patch(self.url("/reservation/temp")).json(request);
        let response: TempReservationResponse = self.send_json("PATCH /reservation/temp", builder).await?;
        Ok(response.reservation_id)
    }

    async fn applicable_discounts(
        &self,
        seat_grade_ids: &[SeatGradeId],
    ) -> Result<Vec<GradeDiscounts>, FetchError> {
        let builder = self
            .http_client
            .post(self.url("/seat-grade/find-applicable-discounts"))
            .json(&DiscountLookupRequest { seat_grade_ids });

        let response: ApplicableDiscountsResponse = self
            .send_json("POST /seat-grade/find-applicable-discounts", builder)
            .await?;
        Ok(response.seat_grades)
    }

    async fn start_payment(&self, request: &PaymentStartRequest) -> Result<PaymentStarted, FetchError> {
        info!(
            "Starting payment for reservation {} with {} items",
            request.reservation_id,
            request.payment_items.len()
        );

        let builder = self.http_client.patch(self.url("/payment/start")).json(request);
        self.send_json("PATCH /payment/start", builder).await
    }

    async fn confirm_payment(&self, request: &PaymentConfirmRequest) -> Result<(), FetchError> {
        info!("Confirming payment {}", request.payment_id);

        let builder = self.http_client.patch(self.url("/payment/confirm")).json(request);
        self.send("PATCH /payment/confirm", builder).await?;
        Ok(())
    }
}
