pub mod ids;
pub mod performance;
pub mod seat;
pub mod ticket;
pub mod discount;
pub mod payment;

pub use ids::{
    AreaId, DiscountId, PaymentId, PerformanceId, ReservationId, RoundId, SeatGradeId,
    SeatPositionId, TicketId,
};
pub use performance::{PerformanceDetail, Round};
pub use seat::{SeatArea, SeatGrade, SeatPosition};
pub use ticket::{TempReservationRequest, TicketState};
pub use discount::{ApplyCountType, Discount, DiscountTier, GradeDiscounts, TierRef};
pub use payment::{PaymentConfirmRequest, PaymentItem, PaymentMethod, PaymentStartRequest, PaymentStarted};
