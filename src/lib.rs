pub mod config;
pub mod error;
pub mod models;
pub mod api_client;
pub mod cache;
pub mod catalog;
pub mod layout;
pub mod selection;
pub mod discount;
pub mod services;
pub mod session;

pub use api_client::{BackendClient, BookingApi};
pub use discount::{DiscountAllocationEngine, PaymentQuote};
pub use selection::{SeatSelectionSet, SelectionResult};
pub use services::payment::PaymentHandshake;
pub use session::{BookingSession, HeldReservation, SeatStatus};
