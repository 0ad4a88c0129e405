//! payment.rs
//!
//! Двухфазный платёжный протокол поверх бэкенда:
//! 1.  **start**: создаёт ожидающий платёж и возвращает `paymentId` и сумму.
//!     Слой не идемпотентен: второй вызов создаёт вторую попытку на сервере,
//!     поэтому повторный `start`, пока первый ещё в полёте, отклоняется.
//! 2.  **confirm**: завершает платёж. При сбое ничего не откатывается и не
//!     повторяется - `paymentId` сохраняется для ручного повтора.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api_client::BookingApi,
    discount::PaymentQuote,
    error::PaymentError,
    models::{
        PaymentConfirmRequest, PaymentId, PaymentItem, PaymentMethod, PaymentStartRequest,
        ReservationId,
    },
};

/// Платёж, созданный сервером и ждущий подтверждения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPayment {
    pub payment_id: PaymentId,
    pub total_amount: u64,
}

/// Состояния протокола.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    /// Ничего не запущено (или пользователь закрыл окно оплаты).
    Idle,
    /// `start` отправлен, ответа ещё нет.
    Starting,
    /// Платёж создан, ждём подтверждения пользователем.
    AwaitingConfirm(PendingPayment),
    /// `confirm` отправлен, ответа ещё нет.
    Confirming(PendingPayment),
    Completed(PendingPayment),
}

pub struct PaymentHandshake<A> {
    api: A,
    user_id: Uuid,
    reservation_id: ReservationId,
    payment_items: Vec<PaymentItem>,
    payment_method: PaymentMethod,
    /// Сумма, посчитанная клиентом; сервер остаётся источником истины.
    quoted_total: u64,
    state: Mutex<HandshakeState>,
}

impl<A: BookingApi> PaymentHandshake<A> {
    pub fn new(
        api: A,
        user_id: Uuid,
        reservation_id: ReservationId,
        quote: &PaymentQuote,
        payment_method: PaymentMethod,
    ) -> Self {
        Self {
            api,
            user_id,
            reservation_id,
            payment_items: quote.payment_items(),
            payment_method,
            quoted_total: quote.total_amount(),
            state: Mutex::new(HandshakeState::Idle),
        }
    }

    // Гард никогда не живёт через await.
    fn lock(&self) -> MutexGuard<'_, HandshakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> HandshakeState {
        self.lock().clone()
    }

    pub fn reservation_id(&self) -> &ReservationId {
        &self.reservation_id
    }

    pub fn payment_items(&self) -> &[PaymentItem] {
        &self.payment_items
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Первая фаза. Пока предыдущий `start` не ответил, новый отклоняется.
    pub async fn start(&self) -> Result<PendingPayment, PaymentError> {
        let request = PaymentStartRequest {
            reservation_id: self.reservation_id.clone(),
            payment_items: self.payment_items.clone(),
            payment_method: self.payment_method,
            user_id: self.user_id,
        };
        request.validate()?;

        {
            let mut state = self.lock();
            match &*state {
                HandshakeState::Starting => {
                    warn!("Payment start for reservation {} is already in flight", self.reservation_id);
                    return Err(PaymentError::StartInFlight);
                }
                HandshakeState::Confirming(_) => return Err(PaymentError::ConfirmInFlight),
                HandshakeState::Completed(_) => return Err(PaymentError::AlreadyCompleted),
                HandshakeState::AwaitingConfirm(previous) => {
                    warn!("Abandoning pending payment {} and starting a new one", previous.payment_id);
                }
                HandshakeState::Idle => {}
            }
            *state = HandshakeState::Starting;
        }

        info!(
            "Payment start: reservation={} items={} quoted_total={}",
            self.reservation_id,
            self.payment_items.len(),
            self.quoted_total
        );

        match self.api.start_payment(&request).await {
            Ok(started) => {
                if started.total_amount != self.quoted_total {
                    warn!(
                        "Server total {} differs from quoted total {} for reservation {}",
                        started.total_amount, self.quoted_total, self.reservation_id
                    );
                }
                let pending = PendingPayment {
                    payment_id: started.payment_id,
                    total_amount: started.total_amount,
                };
                *self.lock() = HandshakeState::AwaitingConfirm(pending.clone());
                info!("Payment {} awaiting confirmation", pending.payment_id);
                Ok(pending)
            }
            Err(e) => {
                error!("Payment start failed for reservation {}: {}", self.reservation_id, e);
                *self.lock() = HandshakeState::Idle;
                Err(PaymentError::Start(e))
            }
        }
    }

    /// Вторая фаза. При сбое остаёмся в ожидании подтверждения с тем же платежом.
    pub async fn confirm(&self) -> Result<PendingPayment, PaymentError> {
        let pending = {
            let mut state = self.lock();
            let pending = match &*state {
                HandshakeState::AwaitingConfirm(p) => p.clone(),
                HandshakeState::Idle => return Err(PaymentError::NotStarted),
                HandshakeState::Starting => return Err(PaymentError::StartInFlight),
                HandshakeState::Confirming(_) => return Err(PaymentError::ConfirmInFlight),
                HandshakeState::Completed(_) => return Err(PaymentError::AlreadyCompleted),
            };
            *state = HandshakeState::Confirming(pending.clone());
            pending
        };

        let request = PaymentConfirmRequest {
            payment_id: pending.payment_id.clone(),
            user_id: self.user_id,
            reservation_id: self.reservation_id.clone(),
        };

        match self.api.confirm_payment(&request).await {
            Ok(()) => {
                info!("Payment {} completed", pending.payment_id);
                *self.lock() = HandshakeState::Completed(pending.clone());
                Ok(pending)
            }
            Err(e) => {
                error!("Payment confirm failed for {}: {}", pending.payment_id, e);
                *self.lock() = HandshakeState::AwaitingConfirm(pending);
                Err(PaymentError::Confirm(e))
            }
        }
    }

    /// Пользователь закрыл окно оплаты. Ожидающий платёж забывается.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock();
        if let HandshakeState::AwaitingConfirm(pending) = &*state {
            info!("Payment {} cancelled by user", pending.payment_id);
            *state = HandshakeState::Idle;
            true
        } else {
            false
        }
    }
}
