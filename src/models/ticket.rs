use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{PerformanceId, ReservationId, SeatPositionId, TicketId};

/// Живое состояние билета на сеанс. `can_reserve` может смениться в любой момент,
/// поэтому это снимок, а не истина.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketState {
    pub id: TicketId,
    pub seat_position_id: SeatPositionId,
    pub can_reserve: bool,
}

/// Обёртка ответа `GET /reservation?roundId&areaId`.
#[derive(Debug, Deserialize)]
pub(crate) struct ReservationStateResponse {
    pub tickets: Vec<TicketState>,
}

/// Тело `PATCH /reservation/temp`: временно держим выбранные билеты за пользователем.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TempReservationRequest {
    pub performance_id: PerformanceId,
    pub user_id: Uuid,
    #[validate(length(min = 1))]
    pub ticket_ids: Vec<TicketId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TempReservationResponse {
    pub reservation_id: ReservationId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_reservation_body_matches_wire_shape() {
        let req = TempReservationRequest {
            performance_id: PerformanceId::from("p1"),
            user_id: Uuid::nil(),
            ticket_ids: vec![TicketId::from("t1"), TicketId::from("t2")],
        };

        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["performanceId"], "p1");
        assert_eq!(json["userId"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["ticketIds"], serde_json::json!(["t1", "t2"]));
    }

    #[test]
    fn empty_ticket_list_fails_validation() {
        let req = TempReservationRequest {
            performance_id: PerformanceId::from("p1"),
            user_id: Uuid::nil(),
            ticket_ids: vec![],
        };
        assert!(req.validate().is_err());
    }
}
