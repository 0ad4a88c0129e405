//! Каталог ценовых категорий спектакля и их цвета.

use crate::models::{SeatGrade, SeatGradeId};

/// Палитра цветов категорий, выдаётся по порядку загрузки.
pub const GRADE_PALETTE: [&str; 20] = [
    "#ffe0e0", "#ffe8cc", "#fff0cc", "#f0fff0", "#e0ffe0", "#e0fff8", "#e0f0ff", "#e0e0ff",
    "#f8e0ff", "#ffe0f0", "#ffe0f8", "#fff0f0", "#f0f0ff", "#e8f0ff", "#e0fffc", "#f0ffe0",
    "#fff8e0", "#ffe0e8", "#fce0ff", "#e0ffe8",
];

/// Цвет категории по её позиции в упорядоченном списке категорий.
pub fn color(grade_index: usize) -> &'static str {
    GRADE_PALETTE[grade_index % GRADE_PALETTE.len()]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeInfo {
    pub grade: SeatGrade,
    pub color: &'static str,
}

/// Категории в серверном порядке. Порядок задаёт и цвета, и порядок строк
/// на шаге скидок.
#[derive(Debug, Clone, Default)]
pub struct GradeCatalog {
    grades: Vec<GradeInfo>,
}

impl GradeCatalog {
    pub fn new(grades: Vec<SeatGrade>) -> Self {
        let grades = grades
            .into_iter()
            .enumerate()
            .map(|(idx, grade)| GradeInfo { grade, color: color(idx) })
            .collect();
        Self { grades }
    }

    pub fn get(&self, id: &SeatGradeId) -> Option<&GradeInfo> {
        self.grades.iter().find(|g| &g.grade.id == id)
    }

    /// Позиция категории в каталоге; неизвестные категории уходят в конец.
    pub fn position(&self, id: &SeatGradeId) -> usize {
        self.grades
            .iter()
            .position(|g| &g.grade.id == id)
            .unwrap_or(self.grades.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &GradeInfo> {
        self.grades.iter()
    }

    pub fn len(&self) -> usize {
        self.grades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }
}
