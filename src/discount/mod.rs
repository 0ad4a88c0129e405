//! Распределение скидок по выбранным местам.
//!
//! Для каждой категории пользователь раздаёт количество мест по тарифам
//! (обычный + скидки категории). Правила:
//! - значение одного тарифа берётся только из [`available_counts`];
//! - после любого изменения сумма по всем тарифам не превышает число
//!   выбранных мест, иначе изменение отбрасывается;
//! - подтверждение возможно только при точном совпадении сумм, и общей,
//!   и по каждой категории.

pub mod options;
pub mod pricing;

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

pub use options::available_counts;
pub use pricing::{PaymentQuote, QuoteLine};

use crate::{
    catalog::GradeCatalog,
    error::AllocationError,
    models::{DiscountTier, GradeDiscounts, SeatGrade, SeatGradeId, TierRef},
};

/// Распределение: (категория, тариф) -> количество мест.
///
/// Обновляется целиком: [`AllocationAssignment::with_count`] возвращает новое
/// значение, исходное остаётся нетронутым.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationAssignment {
    counts: BTreeMap<(SeatGradeId, TierRef), u32>,
}

impl AllocationAssignment {
    pub fn get(&self, grade: &SeatGradeId, tier: &TierRef) -> u32 {
        self.counts
            .get(&(grade.clone(), tier.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn with_count(&self, grade: &SeatGradeId, tier: &TierRef, count: u32) -> Self {
        let mut counts = self.counts.clone();
        let key = (grade.clone(), tier.clone());
        if count == 0 {
            counts.remove(&key);
        } else {
            counts.insert(key, count);
        }
        Self { counts }
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn grade_total(&self, grade: &SeatGradeId) -> u32 {
        self.counts
            .iter()
            .filter(|((g, _), _)| g == grade)
            .map(|(_, c)| *c)
            .sum()
    }
}

/// Категория на шаге скидок: сколько мест выбрано и какие тарифы доступны.
#[derive(Debug, Clone)]
pub struct GradeAllocation {
    pub grade: SeatGrade,
    pub selected: u32,
    /// Обычный тариф всегда первым.
    pub tiers: Vec<DiscountTier>,
}

impl GradeAllocation {
    pub fn tier(&self, tier: &TierRef) -> Option<&DiscountTier> {
        self.tiers.iter().find(|t| &t.tier == tier)
    }

    pub fn unit_price(&self, tier: &DiscountTier) -> u64 {
        pricing::unit_price(self.grade.price, tier.rate)
    }
}

#[derive(Debug, Clone)]
pub struct DiscountAllocationEngine {
    grades: Vec<GradeAllocation>,
    assignment: AllocationAssignment,
    total_seats: u32,
}

impl DiscountAllocationEngine {
    /// Собирает шаг скидок из сгруппированного выбора, каталога категорий и
    /// ответа бэкенда о применимых скидках. Категории упорядочены как в каталоге;
    /// категория без записи в ответе получает только обычный тариф.
    pub fn new(
        grouped: &BTreeMap<SeatGradeId, u32>,
        catalog: &GradeCatalog,
        discounts: Vec<GradeDiscounts>,
    ) -> Self {
        let mut by_grade: HashMap<SeatGradeId, GradeDiscounts> =
            discounts.into_iter().map(|d| (d.id.clone(), d)).collect();

        let mut grades: Vec<GradeAllocation> = grouped
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(grade_id, count)| {
                let grade = match catalog.get(grade_id) {
                    Some(info) => info.grade.clone(),
                    None => {
                        warn!("Grade {} is missing from the catalog, pricing it at 0", grade_id);
                        SeatGrade { id: grade_id.clone(), name: grade_id.to_string(), price: 0 }
                    }
                };
                let tiers = by_grade
                    .remove(grade_id)
                    .map(|d| d.tiers())
                    .unwrap_or_else(|| vec![DiscountTier::normal()]);

                GradeAllocation { grade, selected: *count, tiers }
            })
            .collect();
        grades.sort_by_key(|g| catalog.position(&g.grade.id));

        for ignored in by_grade.keys() {
            debug!("Ignoring discounts for unselected grade {}", ignored);
        }

        let total_seats = grades.iter().map(|g| g.selected).sum();
        Self { grades, assignment: AllocationAssignment::default(), total_seats }
    }

    pub fn grades(&self) -> &[GradeAllocation] {
        &self.grades
    }

    pub fn grade(&self, grade_id: &SeatGradeId) -> Option<&GradeAllocation> {
        self.grades.iter().find(|g| &g.grade.id == grade_id)
    }

    pub fn assignment(&self) -> &AllocationAssignment {
        &self.assignment
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    pub fn assigned_total(&self) -> u32 {
        self.assignment.total()
    }

    fn lookup(
        &self,
        grade_id: &SeatGradeId,
        tier: &TierRef,
    ) -> Result<(&GradeAllocation, &DiscountTier), AllocationError> {
        let grade = self
            .grade(grade_id)
            .ok_or_else(|| AllocationError::UnknownGrade(grade_id.clone()))?;
        let discount_tier = grade.tier(tier).ok_or_else(|| AllocationError::UnknownTier {
            grade: grade_id.clone(),
            tier: tier.clone(),
        })?;
        Ok((grade, discount_tier))
    }

    /// Шаги выпадающего списка для тарифа категории.
    pub fn options(&self, grade_id: &SeatGradeId, tier: &TierRef) -> Result<Vec<u32>, AllocationError> {
        let (grade, discount_tier) = self.lookup(grade_id, tier)?;
        Ok(discount_tier.available_counts(grade.selected))
    }

    /// Меняет количество для одного тарифа. При ошибке распределение не меняется.
    pub fn set_count(
        &mut self,
        grade_id: &SeatGradeId,
        tier: &TierRef,
        count: u32,
    ) -> Result<(), AllocationError> {
        let (grade, discount_tier) = self.lookup(grade_id, tier)?;

        let allowed = discount_tier.available_counts(grade.selected);
        if !allowed.contains(&count) {
            warn!("Allocation edit {}/{}={} rejected: allowed {:?}", grade_id, tier, count, allowed);
            return Err(AllocationError::IllegalCount { count, allowed });
        }

        let next = self.assignment.with_count(grade_id, tier, count);
        let assigned = next.total();
        if assigned > self.total_seats {
            warn!(
                "Allocation edit {}/{}={} rejected: {} assigned for {} seats",
                grade_id, tier, count, assigned, self.total_seats
            );
            return Err(AllocationError::CountOverflow { assigned, total: self.total_seats });
        }

        self.assignment = next;
        debug!("Allocation {}/{} set to {} ({} of {} assigned)", grade_id, tier, count, assigned, self.total_seats);
        Ok(())
    }

    /// Предварительный расчёт по текущему распределению.
    pub fn quote(&self) -> PaymentQuote {
        PaymentQuote::build(&self.grades, &self.assignment)
    }

    /// Проверяет распределение и отдаёт итог для оплаты. При расхождении
    /// состояние сохраняется, чтобы пользователь мог исправить выбор.
    pub fn confirm(&self) -> Result<PaymentQuote, AllocationError> {
        let assigned = self.assignment.total();
        if assigned != self.total_seats {
            warn!("Allocation confirm blocked: {} assigned for {} seats", assigned, self.total_seats);
            return Err(AllocationError::CountMismatch { assigned, total: self.total_seats });
        }

        if let Some(grade) = self
            .grades
            .iter()
            .find(|g| self.assignment.grade_total(&g.grade.id) != g.selected)
        {
            warn!("Allocation confirm blocked: grade {} does not add up", grade.grade.id);
            return Err(AllocationError::GradeMismatch {
                grade: grade.grade.id.clone(),
                assigned: self.assignment.grade_total(&grade.grade.id),
                selected: grade.selected,
            });
        }

        let quote = self.quote();
        info!("Allocation confirmed: {} seats, total {}", self.total_seats, quote.total_amount());
        Ok(quote)
    }
}
