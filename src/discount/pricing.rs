//! Расчёт суммы к оплате по распределению.
//!
//! Для строки (категория, тариф, количество) точная сумма -
//! `base_price × (1 − rate) × count`, округлённая вниз один раз на строку.
//! Итог - сумма уже округлённых строк, так что строки всегда сходятся с итогом.

use rust_decimal::{prelude::ToPrimitive, Decimal};

use super::{AllocationAssignment, GradeAllocation};
use crate::models::{PaymentItem, SeatGradeId, TierRef};

/// Точная (без округления) стоимость `count` мест по ставке `rate`.
pub fn discounted_amount(base_price: u64, rate: Decimal, count: u32) -> Decimal {
    Decimal::from(base_price) * (Decimal::ONE - rate) * Decimal::from(count)
}

fn floor_to_u64(amount: Decimal) -> u64 {
    amount.floor().to_u64().unwrap_or(0)
}

/// Цена одного места по тарифу, как её видит пользователь.
pub fn unit_price(base_price: u64, rate: Decimal) -> u64 {
    floor_to_u64(discounted_amount(base_price, rate, 1))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteLine {
    pub seat_grade_id: SeatGradeId,
    pub grade_name: String,
    pub tier: TierRef,
    pub tier_name: String,
    pub count: u32,
    pub unit_price: u64,
    /// Сумма строки, округлённая вниз.
    pub line_total: u64,
}

impl QuoteLine {
    pub fn payment_item(&self) -> PaymentItem {
        PaymentItem {
            seat_grade_id: self.seat_grade_id.clone(),
            reservation_count: self.count,
            discount_id: self.tier.discount_id().cloned(),
        }
    }

    /// Текст для пользователя: "<категория> <N>석에 <тариф> 적용".
    pub fn description(&self) -> String {
        format!("{} {}석에 {} 적용", self.grade_name, self.count, self.tier_name)
    }
}

/// Результат расчёта. Неизменяем: пересчитывается из распределения заново.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaymentQuote {
    lines: Vec<QuoteLine>,
    total_amount: u64,
}

impl PaymentQuote {
    pub fn build(grades: &[GradeAllocation], assignment: &AllocationAssignment) -> Self {
        let mut lines = Vec::new();
        let mut total: u64 = 0;

        for grade in grades {
            for tier in &grade.tiers {
                let count = assignment.get(&grade.grade.id, &tier.tier);
                if count == 0 {
                    continue;
                }

                let line_total = floor_to_u64(discounted_amount(grade.grade.price, tier.rate, count));
                total += line_total;

                lines.push(QuoteLine {
                    seat_grade_id: grade.grade.id.clone(),
                    grade_name: grade.grade.name.clone(),
                    tier: tier.tier.clone(),
                    tier_name: tier.name.clone(),
                    count,
                    unit_price: unit_price(grade.grade.price, tier.rate),
                    line_total,
                });
            }
        }

        Self { lines, total_amount: total }
    }

    pub fn lines(&self) -> &[QuoteLine] {
        &self.lines
    }

    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    pub fn payment_items(&self) -> Vec<PaymentItem> {
        self.lines.iter().map(QuoteLine::payment_item).collect()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.lines.iter().map(QuoteLine::description).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Discount, DiscountId, DiscountTier, SeatGrade};

    #[test]
    fn twenty_percent_off_three_seats() {
        let amount = discounted_amount(10_000, Decimal::new(2, 1), 3);

        assert_eq!(floor_to_u64(amount), 24_000);
        assert_eq!(unit_price(10_000, Decimal::new(2, 1)), 8_000);
    }

    fn grade_with_half(id: &str, price: u64) -> GradeAllocation {
        let half = Discount {
            id: DiscountId::from("half"),
            name: "반값".to_string(),
            rate: Some(Decimal::new(5, 1)),
            apply_count_type: None,
            apply_count_amount: None,
        };
        GradeAllocation {
            grade: SeatGrade { id: SeatGradeId::from(id), name: id.to_string(), price },
            selected: 1,
            tiers: DiscountTier::tiers_for(&[half]),
        }
    }

    #[test]
    fn total_is_the_sum_of_floored_lines() {
        // 333 × 0.5 = 166.5 за место; каждая строка округляется до 166.
        let grades = vec![grade_with_half("A", 333), grade_with_half("B", 333)];
        let tier = TierRef::Discount(DiscountId::from("half"));
        let assignment = AllocationAssignment::default()
            .with_count(&SeatGradeId::from("A"), &tier, 1)
            .with_count(&SeatGradeId::from("B"), &tier, 1);

        let quote = PaymentQuote::build(&grades, &assignment);

        let line_totals: Vec<u64> = quote.lines().iter().map(|l| l.line_total).collect();
        assert_eq!(line_totals, vec![166, 166]);
        assert_eq!(quote.total_amount(), 332);
        assert_eq!(quote.total_amount(), line_totals.iter().sum::<u64>());
    }

    #[test]
    fn line_is_floored_after_multiplying_by_count() {
        // 333 × 0.5 × 3 = 499.5 -> 499, а не 166 × 3 = 498.
        assert_eq!(floor_to_u64(discounted_amount(333, Decimal::new(5, 1), 3)), 499);
        assert_eq!(unit_price(333, Decimal::new(5, 1)), 166);
    }

    #[test]
    fn full_discount_is_free() {
        assert_eq!(unit_price(50_000, Decimal::ONE), 0);
    }
}
