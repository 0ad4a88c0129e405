use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{DiscountId, PaymentId, ReservationId, SeatGradeId};

/// Строка платёжного запроса: сколько мест категории оплачивается по какому тарифу.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentItem {
    pub seat_grade_id: SeatGradeId,
    pub reservation_count: u32,
    /// `null` для обычного тарифа.
    pub discount_id: Option<DiscountId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
}

/// Тело `PATCH /payment/start`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStartRequest {
    pub reservation_id: ReservationId,
    #[validate(length(min = 1))]
    pub payment_items: Vec<PaymentItem>,
    pub payment_method: PaymentMethod,
    pub user_id: Uuid,
}

/// Ответ `PATCH /payment/start`: платёж создан и ждёт подтверждения.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStarted {
    pub payment_id: PaymentId,
    pub total_amount: u64,
}

/// Тело `PATCH /payment/confirm`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmRequest {
    pub payment_id: PaymentId,
    pub user_id: Uuid,
    pub reservation_id: ReservationId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_tier_item_serializes_null_discount() {
        let item = PaymentItem {
            seat_grade_id: SeatGradeId::from("g1"),
            reservation_count: 2,
            discount_id: None,
        };

        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "seatGradeId": "g1", "reservationCount": 2, "discountId": null })
        );
    }

    #[test]
    fn payment_method_uses_server_spelling() {
        assert_eq!(serde_json::to_value(PaymentMethod::CreditCard).unwrap(), "CREDIT_CARD");
    }

    #[test]
    fn start_request_without_items_is_invalid() {
        let req = PaymentStartRequest {
            reservation_id: ReservationId::from("res-1"),
            payment_items: vec![],
            payment_method: PaymentMethod::CreditCard,
            user_id: Uuid::nil(),
        };
        assert!(req.validate().is_err());
    }
}
