//! Кеш состояния бронирования для одной пары (сеанс, зона).
//!
//! Смена зоны полностью заменяет содержимое - слияния нет. Загрузки нельзя
//! отменить, поэтому каждая получает номер поколения: ответ, пришедший после
//! того как пользователь уже ушёл в другую зону, отбрасывается.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::{
    api_client::BookingApi,
    error::FetchError,
    models::{AreaId, RoundId, SeatPositionId, TicketId, TicketState},
};

/// Что известно о месте на момент последней загрузки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationEntry {
    pub ticket_id: TicketId,
    pub can_reserve: bool,
}

/// Квитанция на начатую загрузку; предъявляется при применении ответа.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaLoad {
    generation: u64,
    pub round_id: RoundId,
    pub area_id: AreaId,
}

#[derive(Debug, Clone)]
pub struct ReservationSnapshot {
    pub round_id: RoundId,
    pub area_id: AreaId,
    entries: HashMap<SeatPositionId, ReservationEntry>,
}

impl ReservationSnapshot {
    fn from_tickets(load: AreaLoad, tickets: Vec<TicketState>) -> Self {
        let entries = tickets
            .into_iter()
            .map(|t| {
                (
                    t.seat_position_id,
                    ReservationEntry { ticket_id: t.id, can_reserve: t.can_reserve },
                )
            })
            .collect();

        Self { round_id: load.round_id, area_id: load.area_id, entries }
    }

    pub fn entry(&self, seat_position_id: &SeatPositionId) -> Option<&ReservationEntry> {
        self.entries.get(seat_position_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reservable_count(&self) -> usize {
        self.entries.values().filter(|e| e.can_reserve).count()
    }
}

#[derive(Debug, Default)]
pub struct ReservationStateCache {
    generation: u64,
    snapshot: Option<ReservationSnapshot>,
}

impl ReservationStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Начинает загрузку зоны. Старый снимок сразу выбрасывается, а все ранее
    /// выданные квитанции становятся устаревшими.
    pub fn begin_load(&mut self, round_id: RoundId, area_id: AreaId) -> AreaLoad {
        self.generation += 1;
        self.snapshot = None;
        debug!("Reservation load #{} started for round={} area={}", self.generation, round_id, area_id);

        AreaLoad { generation: self.generation, round_id, area_id }
    }

    /// Применяет ответ загрузки. Возвращает `false`, если ответ устарел.
    pub fn apply(&mut self, load: AreaLoad, tickets: Vec<TicketState>) -> bool {
        if !self.is_current(&load) {
            info!(
                "Discarding stale reservation state for round={} area={} (load #{}, current #{})",
                load.round_id, load.area_id, load.generation, self.generation
            );
            return false;
        }

        self.snapshot = Some(ReservationSnapshot::from_tickets(load, tickets));
        true
    }

    pub fn is_current(&self, load: &AreaLoad) -> bool {
        load.generation == self.generation
    }

    /// Загружает состояние зоны и заменяет им кеш. Ошибка возвращается как есть,
    /// повторять загрузку - дело вызывающего.
    pub async fn load<A: BookingApi>(
        &mut self,
        api: &A,
        round_id: &RoundId,
        area_id: &AreaId,
    ) -> Result<&ReservationSnapshot, FetchError> {
        let load = self.begin_load(round_id.clone(), area_id.clone());
        let tickets = api.reservation_state(round_id, area_id).await?;

        Ok(self.snapshot.insert(ReservationSnapshot::from_tickets(load, tickets)))
    }

    /// Сбрасывает кеш (возврат к схеме зон). Незавершённые загрузки устаревают.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.snapshot = None;
    }

    pub fn snapshot(&self) -> Option<&ReservationSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn entry(&self, seat_position_id: &SeatPositionId) -> Option<&ReservationEntry> {
        self.snapshot.as_ref()?.entry(seat_position_id)
    }
}
