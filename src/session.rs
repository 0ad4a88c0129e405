//! Сессия бронирования одного сеанса: схема зон, выбор мест, временное
//! удержание и переход к шагу скидок и оплате.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api_client::BookingApi,
    cache::{AreaLoad, ReservationStateCache},
    catalog::GradeCatalog,
    config::Config,
    discount::{DiscountAllocationEngine, PaymentQuote},
    error::BookingError,
    layout::SeatLayoutIndex,
    models::{
        AreaId, PaymentMethod, PerformanceDetail, PerformanceId, ReservationId, Round, RoundId,
        SeatArea, SeatGradeId, SeatPositionId, TempReservationRequest, TicketState,
    },
    selection::{SeatSelectionSet, SelectedSeat, SelectionResult},
    services::payment::PaymentHandshake,
};

/// Как рисовать место.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatStatus {
    /// Билета для места нет (или состояние ещё не загружено), рисуется "?".
    Unknown,
    Unavailable,
    Available,
    Selected,
}

/// Результат временного удержания; с него начинается шаг скидок.
#[derive(Debug, Clone)]
pub struct HeldReservation {
    pub reservation_id: ReservationId,
    pub grouped: BTreeMap<SeatGradeId, u32>,
    pub seats: Vec<SelectedSeat>,
}

pub struct BookingSession<A> {
    api: A,
    user_id: Uuid,
    payment_method: PaymentMethod,
    performance_id: PerformanceId,
    detail: PerformanceDetail,
    round: Round,
    areas: Vec<SeatArea>,
    catalog: GradeCatalog,
    current_area: Option<AreaId>,
    cache: ReservationStateCache,
    selection: SeatSelectionSet,
}

impl<A: BookingApi> BookingSession<A> {
    /// Загружает спектакль и схему зон параллельно.
    pub async fn open(
        api: A,
        config: &Config,
        performance_id: PerformanceId,
        round_id: RoundId,
    ) -> Result<Self, BookingError> {
        let (detail, areas) = futures::try_join!(
            api.performance_detail(&performance_id),
            api.seat_areas(&performance_id)
        )?;

        let round = detail
            .round(&round_id)
            .cloned()
            .ok_or_else(|| BookingError::UnknownRound(round_id.clone()))?;

        let max_count = detail.max_reservation_count.unwrap_or_else(|| {
            debug!(
                "Performance {} has no reservation limit, using default {}",
                performance_id, config.booking.default_max_reservation_count
            );
            config.booking.default_max_reservation_count
        });
        let catalog = GradeCatalog::new(detail.seat_grades.clone());

        info!(
            "Booking session opened: performance={} round={} areas={} grades={} max={}",
            performance_id,
            round_id,
            areas.len(),
            catalog.len(),
            max_count
        );

        Ok(Self {
            api,
            user_id: config.api.user_id,
            payment_method: config.booking.payment_method,
            performance_id,
            detail,
            round,
            areas,
            catalog,
            current_area: None,
            cache: ReservationStateCache::new(),
            selection: SeatSelectionSet::new(max_count),
        })
    }

    pub fn detail(&self) -> &PerformanceDetail {
        &self.detail
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn areas(&self) -> &[SeatArea] {
        &self.areas
    }

    pub fn catalog(&self) -> &GradeCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SeatSelectionSet {
        &self.selection
    }

    pub fn cache(&self) -> &ReservationStateCache {
        &self.cache
    }

    /// Единственную зону можно открыть сразу, минуя схему зон.
    pub fn single_area(&self) -> Option<&SeatArea> {
        match self.areas.as_slice() {
            [area] => Some(area),
            _ => None,
        }
    }

    pub fn current_area(&self) -> Option<&SeatArea> {
        let area_id = self.current_area.as_ref()?;
        self.areas.iter().find(|a| &a.id == area_id)
    }

    fn switch_area(&mut self, area_id: &AreaId) -> Result<(), BookingError> {
        if !self.areas.iter().any(|a| &a.id == area_id) {
            return Err(BookingError::UnknownArea(area_id.clone()));
        }

        if !self.selection.is_empty() {
            debug!("Dropping {} selected seats on area switch", self.selection.len());
        }
        self.selection.reset();
        self.current_area = Some(area_id.clone());
        Ok(())
    }

    /// Переходит в зону и начинает загрузку её состояния. Выбор сбрасывается.
    /// Ответ применяется через `finish_area_load`.
    pub fn select_area(&mut self, area_id: &AreaId) -> Result<AreaLoad, BookingError> {
        self.switch_area(area_id)?;
        Ok(self.cache.begin_load(self.round.id.clone(), area_id.clone()))
    }

    /// Применяет ответ загрузки; устаревший ответ отбрасывается (`false`).
    pub fn finish_area_load(&mut self, load: AreaLoad, tickets: Vec<TicketState>) -> bool {
        self.cache.apply(load, tickets)
    }

    /// Переходит в зону и загружает её состояние. Ошибка загрузки не
    /// повторяется: зона остаётся выбранной с пустым кешем.
    pub async fn enter_area(&mut self, area_id: &AreaId) -> Result<(), BookingError> {
        self.switch_area(area_id)?;

        let round_id = self.round.id.clone();
        let snapshot = self.cache.load(&self.api, &round_id, area_id).await?;
        info!(
            "Area {} loaded: {} tickets, {} reservable",
            area_id,
            snapshot.len(),
            snapshot.reservable_count()
        );
        Ok(())
    }

    pub fn back_to_areas(&mut self) {
        self.current_area = None;
        self.cache.clear();
        self.selection.reset();
    }

    pub fn layout(&self) -> Result<SeatLayoutIndex<'_>, BookingError> {
        self.current_area()
            .map(SeatLayoutIndex::new)
            .ok_or(BookingError::NoAreaSelected)
    }

    pub fn toggle_seat(&mut self, seat_position_id: &SeatPositionId) -> Result<SelectionResult, BookingError> {
        let area_id = self.current_area.as_ref().ok_or(BookingError::NoAreaSelected)?;
        let area = self
            .areas
            .iter()
            .find(|a| &a.id == area_id)
            .ok_or_else(|| BookingError::UnknownArea(area_id.clone()))?;
        let seat = area
            .position(seat_position_id)
            .ok_or_else(|| BookingError::UnknownSeat(seat_position_id.clone()))?;

        Ok(self.selection.toggle(seat, area, &self.cache))
    }

    /// То же по координатам сетки зоны. Пустая клетка - `Ok(None)`.
    pub fn toggle_at(&mut self, x: u32, y: u32) -> Result<Option<SelectionResult>, BookingError> {
        let seat_id = match self.layout()?.seat_at(x, y) {
            Some(seat) => seat.id.clone(),
            None => return Ok(None),
        };
        self.toggle_seat(&seat_id).map(Some)
    }

    pub fn seat_status(&self, seat_position_id: &SeatPositionId) -> SeatStatus {
        if self.selection.seats().iter().any(|s| &s.seat_position_id == seat_position_id) {
            return SeatStatus::Selected;
        }

        match self.cache.entry(seat_position_id) {
            None => SeatStatus::Unknown,
            Some(entry) if entry.can_reserve => SeatStatus::Available,
            Some(_) => SeatStatus::Unavailable,
        }
    }

    /// Временно удерживает выбранные места на сервере.
    pub async fn hold_seats(&self) -> Result<HeldReservation, BookingError> {
        if self.selection.is_empty() {
            warn!("Hold requested with empty selection");
            return Err(BookingError::NoSelection);
        }

        let request = TempReservationRequest {
            performance_id: self.performance_id.clone(),
            user_id: self.user_id,
            ticket_ids: self.selection.ticket_ids(),
        };
        request.validate()?;

        let reservation_id = self.api.hold_tickets(&request).await?;
        info!("Held {} tickets as reservation {}", request.ticket_ids.len(), reservation_id);

        Ok(HeldReservation {
            reservation_id,
            grouped: self.selection.grouped_by_grade(),
            seats: self.selection.seats().to_vec(),
        })
    }

    /// Загружает применимые скидки и собирает движок распределения.
    pub async fn discount_step(&self, held: &HeldReservation) -> Result<DiscountAllocationEngine, BookingError> {
        let grade_ids: Vec<SeatGradeId> = held.grouped.keys().cloned().collect();
        let discounts = self.api.applicable_discounts(&grade_ids).await?;

        Ok(DiscountAllocationEngine::new(&held.grouped, &self.catalog, discounts))
    }

    /// Платёжный протокол для подтверждённого расчёта.
    pub fn payment(&self, held: &HeldReservation, quote: &PaymentQuote) -> PaymentHandshake<&A> {
        PaymentHandshake::new(
            &self.api,
            self.user_id,
            held.reservation_id.clone(),
            quote,
            self.payment_method,
        )
    }
}
