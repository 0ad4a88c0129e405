//! Набор выбранных мест одной сессии бронирования.
//!
//! Инвариант: `len() <= max_reservation_count()` в любой момент. Лимит задаётся
//! спектаклем и не меняется до конца сессии.

use std::collections::BTreeMap;
use tracing::debug;

use crate::{
    cache::ReservationStateCache,
    error::Rejection,
    models::{SeatArea, SeatGradeId, SeatPosition, SeatPositionId, TicketId},
};

pub const DEFAULT_MAX_RESERVATION_COUNT: u32 = 10;

/// Выбранное место. Живёт только на клиенте, на сервер уходит лишь `ticket_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSeat {
    pub seat_position_id: SeatPositionId,
    pub ticket_id: TicketId,
    pub seat_grade_id: SeatGradeId,
    pub floor_name: String,
    pub area_name: String,
    pub seat_name: String,
}

impl SelectedSeat {
    /// Подпись вида "1층 / F-1구역 / 3열14번".
    pub fn label(&self) -> String {
        format!("{} / {} / {}", self.floor_name, self.area_name, self.seat_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionResult {
    Accepted,
    Deselected,
    Rejected(Rejection),
}

#[derive(Debug, Clone)]
pub struct SeatSelectionSet {
    max_reservation_count: u32,
    seats: Vec<SelectedSeat>,
}

impl Default for SeatSelectionSet {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RESERVATION_COUNT)
    }
}

impl SeatSelectionSet {
    pub fn new(max_reservation_count: u32) -> Self {
        Self { max_reservation_count, seats: Vec::new() }
    }

    /// Переключает место.
    ///
    /// Снятие выбора проходит всегда, даже если место с тех пор стало
    /// недоступным. Добавление требует живой записи с `can_reserve` и
    /// свободного слота под лимитом; при отказе набор не меняется.
    pub fn toggle(
        &mut self,
        seat: &SeatPosition,
        area: &SeatArea,
        cache: &ReservationStateCache,
    ) -> SelectionResult {
        let entry = cache.entry(&seat.id);

        let selected_idx = self.seats.iter().position(|s| {
            s.seat_position_id == seat.id || entry.is_some_and(|e| e.ticket_id == s.ticket_id)
        });
        if let Some(idx) = selected_idx {
            let removed = self.seats.remove(idx);
            debug!("Seat {} deselected (ticket {})", removed.seat_position_id, removed.ticket_id);
            return SelectionResult::Deselected;
        }

        let Some(entry) = entry.filter(|e| e.can_reserve) else {
            debug!("Seat {} is not reservable, click ignored", seat.id);
            return SelectionResult::Rejected(Rejection::Unreservable);
        };

        if self.seats.len() >= self.max_reservation_count as usize {
            debug!("Seat {} rejected: limit of {} reached", seat.id, self.max_reservation_count);
            return SelectionResult::Rejected(Rejection::LimitExceeded {
                max: self.max_reservation_count,
            });
        }

        self.seats.push(SelectedSeat {
            seat_position_id: seat.id.clone(),
            ticket_id: entry.ticket_id.clone(),
            seat_grade_id: seat.seat_grade_id.clone(),
            floor_name: area.floor_name.clone(),
            area_name: area.area_name.clone(),
            seat_name: seat.name.clone(),
        });
        debug!("Seat {} selected (ticket {})", seat.id, entry.ticket_id);
        SelectionResult::Accepted
    }

    pub fn reset(&mut self) {
        self.seats.clear();
    }

    /// Число выбранных мест по категориям. Считается заново при каждом вызове.
    pub fn grouped_by_grade(&self) -> BTreeMap<SeatGradeId, u32> {
        let mut counts = BTreeMap::new();
        for seat in &self.seats {
            *counts.entry(seat.seat_grade_id.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn ticket_ids(&self) -> Vec<TicketId> {
        self.seats.iter().map(|s| s.ticket_id.clone()).collect()
    }

    pub fn is_selected(&self, ticket_id: &TicketId) -> bool {
        self.seats.iter().any(|s| &s.ticket_id == ticket_id)
    }

    pub fn seats(&self) -> &[SelectedSeat] {
        &self.seats
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn max_reservation_count(&self) -> u32 {
        self.max_reservation_count
    }
}
