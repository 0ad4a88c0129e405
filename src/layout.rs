//! Индекс раскладки мест зоны и итерация по сетке отрисовки.
//!
//! Сетка имеет размер `(height + 1) × (width + 1)`: нулевая строка и нулевой
//! столбец заняты подписями осей, клетка `(row, col)` при `row, col ≥ 1`
//! соответствует месту с координатами `(col - 1, row - 1)`.

use std::collections::HashMap;
use tracing::warn;

use crate::models::{SeatArea, SeatPosition};

/// Клетка сетки отрисовки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell<'a> {
    Corner,
    /// Номер столбца, с единицы.
    ColumnLabel(u32),
    /// Буквенная подпись строки: A, B, ... Z, AA, AB ...
    RowLabel(String),
    /// Клетка без места - проход, пустота. Это не "занятое место".
    Empty,
    Seat(&'a SeatPosition),
}

#[derive(Debug)]
pub struct SeatLayoutIndex<'a> {
    area: &'a SeatArea,
    by_coords: HashMap<(u32, u32), &'a SeatPosition>,
}

impl<'a> SeatLayoutIndex<'a> {
    /// Строит поиск `(x, y) -> место` за один проход по списку позиций.
    pub fn new(area: &'a SeatArea) -> Self {
        let mut by_coords: HashMap<(u32, u32), &'a SeatPosition> =
            HashMap::with_capacity(area.positions.len());

        for position in &area.positions {
            if position.x >= area.width || position.y >= area.height {
                warn!(
                    "Seat {} at ({}, {}) lies outside area {} ({}x{})",
                    position.id, position.x, position.y, area.id, area.width, area.height
                );
            }
            // Дубликат координат - ошибка данных; оставляем первое место.
            if let Some(existing) = by_coords.get(&(position.x, position.y)) {
                warn!(
                    "Seat {} duplicates coordinates of seat {} in area {}",
                    position.id, existing.id, area.id
                );
                continue;
            }
            by_coords.insert((position.x, position.y), position);
        }

        Self { area, by_coords }
    }

    pub fn area(&self) -> &'a SeatArea {
        self.area
    }

    pub fn seat_at(&self, x: u32, y: u32) -> Option<&'a SeatPosition> {
        self.by_coords.get(&(x, y)).copied()
    }

    /// Число строк сетки, включая строку подписей.
    pub fn grid_rows(&self) -> u32 {
        self.area.height + 1
    }

    /// Число столбцов сетки, включая столбец подписей.
    pub fn grid_cols(&self) -> u32 {
        self.area.width + 1
    }

    pub fn cell_at(&self, row: u32, col: u32) -> GridCell<'a> {
        match (row, col) {
            (0, 0) => GridCell::Corner,
            (0, col) => GridCell::ColumnLabel(col),
            (row, 0) => GridCell::RowLabel(row_label(row - 1)),
            (row, col) => self
                .seat_at(col - 1, row - 1)
                .map_or(GridCell::Empty, GridCell::Seat),
        }
    }

    /// Клетки сетки построчно, слева направо.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, GridCell<'a>)> + '_ {
        (0..self.grid_rows())
            .flat_map(move |row| (0..self.grid_cols()).map(move |col| (row, col)))
            .map(move |(row, col)| (row, col, self.cell_at(row, col)))
    }
}

/// Подпись строки по индексу с нуля: 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn row_label(index: u32) -> String {
    let mut n = index;
    let mut label = Vec::new();
    loop {
        label.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label.reverse();
    String::from_utf8_lossy(&label).into_owned()
}
