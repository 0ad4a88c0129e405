//! Таксономия ошибок движка бронирования.
//!
//! Ни одна ошибка здесь не ретраится автоматически: каждая либо блокирует шаг
//! с сообщением, либо повторяется самим пользователем.

use thiserror::Error;

use crate::models::{AreaId, RoundId, SeatGradeId, SeatPositionId, TierRef};

/// Сбой при обращении к бэкенду.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned an unexpected body: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} responded with status {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },

    #[error("circuit breaker is open - backend temporarily unavailable")]
    CircuitOpen,

    #[error("invalid backend url: {0}")]
    InvalidBaseUrl(String),
}

/// Почему клик по месту ничего не изменил.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("seat cannot be reserved")]
    Unreservable,

    #[error("최대 {max}석까지 선택 가능")]
    LimitExceeded { max: u32 },
}

/// Ошибки шага распределения скидок. Состояние при этом сохраняется.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("할인 적용 수({assigned})가 선택 좌석({total}) 초과")]
    CountOverflow { assigned: u32, total: u32 },

    #[error("할인 적용 수({assigned})가 선택좌석({total})와 불일치합니다.")]
    CountMismatch { assigned: u32, total: u32 },

    #[error("grade {grade}: {assigned} seats assigned but {selected} selected")]
    GradeMismatch {
        grade: SeatGradeId,
        assigned: u32,
        selected: u32,
    },

    #[error("grade {0} has no selected seats")]
    UnknownGrade(SeatGradeId),

    #[error("grade {grade} has no tier {tier}")]
    UnknownTier { grade: SeatGradeId, tier: TierRef },

    #[error("count {count} is not one of the allowed steps {allowed:?}")]
    IllegalCount { count: u32, allowed: Vec<u32> },
}

/// Ошибки двухфазного платежа.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("결제 시작 오류: {0}")]
    Start(#[source] FetchError),

    #[error("결제 승인 오류: {0}")]
    Confirm(#[source] FetchError),

    #[error("payment start is already in flight")]
    StartInFlight,

    #[error("payment confirmation is already in flight")]
    ConfirmInFlight,

    #[error("payment has not been started")]
    NotStarted,

    #[error("payment is already completed")]
    AlreadyCompleted,

    #[error("invalid payment request: {0}")]
    InvalidRequest(#[from] validator::ValidationErrors),
}

/// Ошибки уровня сессии бронирования.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error("invalid request: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("좌석을 선택해주세요.")]
    NoSelection,

    #[error("no seat area is selected")]
    NoAreaSelected,

    #[error("unknown seat area {0}")]
    UnknownArea(AreaId),

    #[error("unknown seat position {0}")]
    UnknownSeat(SeatPositionId),

    #[error("roundId {0} is not part of this performance")]
    UnknownRound(RoundId),
}
