//! Непрозрачные строковые идентификаторы, которые выдаёт бэкенд.
//!
//! Все они приходят как строки (обычно UUID), но путать идентификатор места
//! с идентификатором билета нельзя: у каждого свой тип.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Спектакль / концерт.
    PerformanceId
);
string_id!(
    /// Сеанс (одна дата/время в рамках серии показов).
    RoundId
);
string_id!(
    /// Зона зала: этаж + именованный блок.
    AreaId
);
string_id!(
    /// Физическое место в зоне.
    SeatPositionId
);
string_id!(
    /// Ценовая категория места (VIP, R, S ...).
    SeatGradeId
);
string_id!(
    /// Серверный билет: место, привязанное к конкретному сеансу.
    TicketId
);
string_id!(DiscountId);
string_id!(ReservationId);
string_id!(PaymentId);
