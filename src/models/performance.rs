use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::{PerformanceId, RoundId, SeatGrade};

/// Ответ `GET /performance/{id}`. Берём только то, что нужно для бронирования.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceDetail {
    #[serde(default)]
    pub id: Option<PerformanceId>,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub rounds: Vec<Round>,
    #[serde(default)]
    pub seat_grades: Vec<SeatGrade>,
    #[serde(default)]
    pub max_reservation_count: Option<u32>,
}

impl PerformanceDetail {
    pub fn round(&self, round_id: &RoundId) -> Option<&Round> {
        self.rounds.iter().find(|r| &r.id == round_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: RoundId,
    /// Сервер присылает время как массив `[год, месяц(1-12), день, час, минута]`.
    #[serde(default, deserialize_with = "deserialize_round_start")]
    pub round_start_time: Option<NaiveDateTime>,
}

impl Round {
    /// Дата сеанса в виде, в котором её показывает витрина.
    pub fn start_text(&self) -> Option<String> {
        self.round_start_time
            .map(|t| t.format("%Y년 %-m월 %-d일 %-H시 %M분").to_string())
    }
}

fn deserialize_round_start<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let parts: Option<Vec<u32>> = Option::deserialize(deserializer)?;
    let Some(parts) = parts else {
        return Ok(None);
    };

    // Секунды и наносекунды сервер иногда дописывает в хвост массива - игнорируем.
    let field = |idx: usize| parts.get(idx).copied().unwrap_or(0);
    let year = i32::try_from(field(0)).map_err(serde::de::Error::custom)?;

    NaiveDate::from_ymd_opt(year, field(1), field(2))
        .and_then(|d| d.and_hms_opt(field(3), field(4), 0))
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid roundStartTime {:?}", parts)))
}
