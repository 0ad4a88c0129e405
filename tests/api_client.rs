use serde_json::json;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use seat_booking::{
    error::FetchError,
    models::{
        AreaId, ApplyCountType, PaymentConfirmRequest, PaymentId, PaymentItem, PaymentMethod,
        PaymentStartRequest, PerformanceId, ReservationId, RoundId, SeatGradeId,
        TempReservationRequest, TicketId,
    },
    services::circuit_breaker::{CircuitBreaker, CircuitState},
    BackendClient, BookingApi,
};

fn client(server: &MockServer, failure_threshold: u32) -> BackendClient {
    BackendClient::new(
        &format!("{}/api/v1", server.uri()),
        Duration::from_secs(5),
        CircuitBreaker::new(failure_threshold, 60),
    )
    .unwrap()
}

#[tokio::test]
async fn performance_detail_parses_rounds_and_grades() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/performance/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "p1",
            "title": "햄릿",
            "location": "예술의전당",
            "rounds": [{ "id": "r1", "roundStartTime": [2025, 3, 7, 19, 5] }],
            "seatGrades": [{ "id": "vip", "name": "VIP", "price": 150000 }],
            "maxReservationCount": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let detail = client(&server, 5)
        .performance_detail(&PerformanceId::from("p1"))
        .await
        .unwrap();

    assert_eq!(detail.title, "햄릿");
    assert_eq!(detail.max_reservation_count, Some(4));
    assert_eq!(detail.seat_grades[0].price, 150_000);
    let round = detail.round(&RoundId::from("r1")).unwrap();
    assert_eq!(round.start_text().as_deref(), Some("2025년 3월 7일 19시 05분"));
}

#[tokio::test]
async fn seat_areas_and_reservation_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/performance/p1/seat-areas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "seatAreas": [{
                "id": "a1", "width": 2, "height": 1, "floorName": "1층", "areaName": "A",
                "positions": [{ "id": "s1", "x": 0, "y": 0, "name": "A1", "seatGradeId": "vip" }]
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/reservation"))
        .and(query_param("roundId", "r1"))
        .and(query_param("areaId", "a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tickets": [{ "id": "t1", "seatPositionId": "s1", "canReserve": true }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 5);
    let areas = client.seat_areas(&PerformanceId::from("p1")).await.unwrap();
    let tickets = client
        .reservation_state(&RoundId::from("r1"), &AreaId::from("a1"))
        .await
        .unwrap();

    assert_eq!(areas.len(), 1);
    assert_eq!(areas[0].positions[0].seat_grade_id, SeatGradeId::from("vip"));
    assert_eq!(tickets[0].id, TicketId::from("t1"));
    assert!(tickets[0].can_reserve);
}

#[tokio::test]
async fn hold_and_discount_lookup_send_camel_case_bodies() {
    let server = MockServer::start().await;
    let user_id = Uuid::nil();
    Mock::given(method("PATCH"))
        .and(path("/api/v1/reservation/temp"))
        .and(body_json(json!({
            "performanceId": "p1",
            "userId": user_id,
            "ticketIds": ["t1", "t2"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reservationId": "res-9" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/seat-grade/find-applicable-discounts"))
        .and(body_json(json!({ "seatGradeIds": ["vip"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "seatGrades": [{
                "id": "vip",
                "discounts": [
                    { "id": "d1", "name": "청소년", "rate": 0.3, "applyCountType": "MAX", "applyCountAmount": 2 },
                    { "id": "d2", "name": "동반" }
                ]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 5);
    let reservation_id = client
        .hold_tickets(&TempReservationRequest {
            performance_id: PerformanceId::from("p1"),
            user_id,
            ticket_ids: vec![TicketId::from("t1"), TicketId::from("t2")],
        })
        .await
        .unwrap();
    let discounts = client.applicable_discounts(&[SeatGradeId::from("vip")]).await.unwrap();

    assert_eq!(reservation_id, ReservationId::from("res-9"));
    let vip = discounts[0].discounts.as_deref().unwrap();
    assert_eq!(vip[0].apply_count_type, Some(ApplyCountType::Max));
    assert_eq!(vip[0].apply_count_amount, Some(2));
    assert_eq!(vip[1].apply_count_type, None);
}

#[tokio::test]
async fn payment_start_and_confirm() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/payment/start"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "paymentId": "pay-1", "totalAmount": 45000 })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/payment/confirm"))
        .and(body_json(json!({ "paymentId": "pay-1", "userId": Uuid::nil(), "reservationId": "res-1" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 5);
    let started = client
        .start_payment(&PaymentStartRequest {
            reservation_id: ReservationId::from("res-1"),
            payment_items: vec![PaymentItem {
                seat_grade_id: SeatGradeId::from("vip"),
                reservation_count: 1,
                discount_id: None,
            }],
            payment_method: PaymentMethod::CreditCard,
            user_id: Uuid::nil(),
        })
        .await
        .unwrap();
    client
        .confirm_payment(&PaymentConfirmRequest {
            payment_id: started.payment_id.clone(),
            user_id: Uuid::nil(),
            reservation_id: ReservationId::from("res-1"),
        })
        .await
        .unwrap();

    assert_eq!(started.payment_id, PaymentId::from("pay-1"));
    assert_eq!(started.total_amount, 45_000);
}

#[tokio::test]
async fn server_errors_open_the_breaker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/performance/p1/seat-areas"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server, 2);
    let performance_id = PerformanceId::from("p1");

    for _ in 0..2 {
        let err = client.seat_areas(&performance_id).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 503));
    }
    assert_eq!(client.circuit_breaker_status().0, CircuitState::Open);

    let err = client.seat_areas(&performance_id).await.unwrap_err();
    assert!(matches!(err, FetchError::CircuitOpen));
}

#[tokio::test]
async fn client_errors_do_not_count_against_the_breaker() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/reservation/temp"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let client = client(&server, 1);
    let request = TempReservationRequest {
        performance_id: PerformanceId::from("p1"),
        user_id: Uuid::nil(),
        ticket_ids: vec![TicketId::from("t1")],
    };

    for _ in 0..3 {
        let err = client.hold_tickets(&request).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 409));
    }
    assert_eq!(client.circuit_breaker_status(), (CircuitState::Closed, 0));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/reservation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tickets": "not a list" })))
        .mount(&server)
        .await;

    let client = client(&server, 1);
    let err = client
        .reservation_state(&RoundId::from("r1"), &AreaId::from("a1"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Decode { ref endpoint, .. } if endpoint == "GET /reservation"));
    assert_eq!(client.circuit_breaker_status(), (CircuitState::Closed, 0));
}
