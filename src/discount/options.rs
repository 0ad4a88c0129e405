//! Допустимые значения счётчика для одного тарифа, без учёта остальных.

use crate::models::{ApplyCountType, DiscountTier};

/// Шаги выпадающего списка для тарифа при `grade_total` выбранных местах категории.
///
/// Эти диапазоны не гарантируют сохранение суммы по категории - это
/// проверяется глобально при каждом изменении и при подтверждении.
pub fn available_counts(kind: ApplyCountType, amount: u32, grade_total: u32) -> Vec<u32> {
    match kind {
        ApplyCountType::Max => (0..=amount.min(grade_total)).collect(),
        // Нулевой шаг никогда не сдвинется с нуля.
        ApplyCountType::Multiple if amount == 0 => vec![0],
        ApplyCountType::Multiple => (0..=grade_total).step_by(amount as usize).collect(),
        ApplyCountType::Inf => (0..=grade_total).collect(),
    }
}

impl DiscountTier {
    pub fn available_counts(&self, grade_total: u32) -> Vec<u32> {
        available_counts(self.apply_count_type, self.apply_count_amount, grade_total)
    }
}
