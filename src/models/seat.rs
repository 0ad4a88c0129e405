use serde::{Deserialize, Serialize};

use super::{AreaId, SeatGradeId, SeatPositionId};

/// Физическое место на сетке зоны. После загрузки зоны не меняется.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatPosition {
    pub id: SeatPositionId,
    /// Координаты с нуля; внутри зоны две позиции не делят одну клетку.
    pub x: u32,
    pub y: u32,
    pub name: String,
    pub seat_grade_id: SeatGradeId,
}

/// Зона зала - единица загрузки состояния бронирования.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatArea {
    pub id: AreaId,
    pub width: u32,
    pub height: u32,
    pub floor_name: String,
    pub area_name: String,
    #[serde(default)]
    pub positions: Vec<SeatPosition>,
}

impl SeatArea {
    pub fn position(&self, id: &SeatPositionId) -> Option<&SeatPosition> {
        self.positions.iter().find(|p| &p.id == id)
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.floor_name, self.area_name)
    }
}

/// Ценовая категория. Цена - целое число в минимальных единицах валюты.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatGrade {
    pub id: SeatGradeId,
    pub name: String,
    pub price: u64,
}

/// Обёртка ответа `GET /performance/{id}/seat-areas`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SeatAreasResponse {
    pub seat_areas: Vec<SeatArea>,
}
