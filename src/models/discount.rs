use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DiscountId, SeatGradeId};

/// Название синтетического тарифа "без скидки".
pub const NORMAL_TIER_NAME: &str = "일반";

/// Политика подсчёта: сколько мест категории может получить тариф.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplyCountType {
    /// Не больше `apply_count_amount` мест.
    Max,
    /// Только кратно `apply_count_amount` (например, "скидка на пару").
    Multiple,
    /// Без ограничений.
    #[default]
    Inf,
}

/// Ссылка на тариф внутри категории.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TierRef {
    Normal,
    Discount(DiscountId),
}

impl TierRef {
    /// Идентификатор скидки для платёжного запроса; у обычного тарифа его нет.
    pub fn discount_id(&self) -> Option<&DiscountId> {
        match self {
            TierRef::Normal => None,
            TierRef::Discount(id) => Some(id),
        }
    }
}

impl fmt::Display for TierRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierRef::Normal => f.write_str("normal"),
            TierRef::Discount(id) => write!(f, "{}", id),
        }
    }
}

/// Скидка в том виде, в каком её присылает сервер.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: DiscountId,
    pub name: String,
    /// Доля от базовой цены (0..1), а не проценты. `null` - без скидки.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub apply_count_type: Option<ApplyCountType>,
    #[serde(default)]
    pub apply_count_amount: Option<u32>,
}

/// Применимые скидки одной категории.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeDiscounts {
    pub id: SeatGradeId,
    #[serde(default)]
    pub discounts: Option<Vec<Discount>>,
}

impl GradeDiscounts {
    /// Тарифы категории; `discounts: null` означает только обычный тариф.
    pub fn tiers(&self) -> Vec<DiscountTier> {
        DiscountTier::tiers_for(self.discounts.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApplicableDiscountsResponse {
    pub seat_grades: Vec<GradeDiscounts>,
}

/// Тариф в движке распределения: либо обычный, либо одна из скидок категории.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountTier {
    pub tier: TierRef,
    pub name: String,
    pub rate: Decimal,
    pub apply_count_type: ApplyCountType,
    pub apply_count_amount: u32,
}

impl DiscountTier {
    /// Обычный тариф: ставка 0, без ограничения количества.
    pub fn normal() -> Self {
        Self {
            tier: TierRef::Normal,
            name: NORMAL_TIER_NAME.to_string(),
            rate: Decimal::ZERO,
            apply_count_type: ApplyCountType::Inf,
            apply_count_amount: 0,
        }
    }

    /// Список тарифов категории: обычный всегда первый.
    pub fn tiers_for(discounts: &[Discount]) -> Vec<DiscountTier> {
        std::iter::once(Self::normal())
            .chain(discounts.iter().map(DiscountTier::from))
            .collect()
    }
}

impl From<&Discount> for DiscountTier {
    fn from(d: &Discount) -> Self {
        // Ставка вне 0..1 дала бы отрицательную цену или наценку.
        let raw = d.rate.unwrap_or_default();
        let rate = raw.clamp(Decimal::ZERO, Decimal::ONE);
        if rate != raw {
            tracing::warn!("Discount {} has out-of-range rate {}, clamped to {}", d.id, raw, rate);
        }

        Self {
            tier: TierRef::Discount(d.id.clone()),
            name: d.name.clone(),
            rate,
            apply_count_type: d.apply_count_type.unwrap_or_default(),
            // Нулевой шаг сервер присылает вместо "не задано".
            apply_count_amount: d.apply_count_amount.filter(|&n| n > 0).unwrap_or(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_tier_is_prepended() {
        let json = r#"{ "id": "g1", "discounts": [
            { "id": "d1", "name": "Student", "rate": 0.2, "applyCountType": "MAX", "applyCountAmount": 2 }
        ] }"#;
        let grade: GradeDiscounts = serde_json::from_str(json).unwrap();

        let tiers = grade.tiers();

        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].tier, TierRef::Normal);
        assert_eq!(tiers[0].name, NORMAL_TIER_NAME);
        assert_eq!(tiers[1].tier, TierRef::Discount(DiscountId::from("d1")));
        assert_eq!(tiers[1].rate, Decimal::new(2, 1));
        assert_eq!(tiers[1].apply_count_type, ApplyCountType::Max);
    }

    #[test]
    fn missing_policy_defaults_to_unlimited_single_step() {
        let json = r#"{ "id": "d1", "name": "Promo", "rate": 0.1 }"#;
        let tier = DiscountTier::from(&serde_json::from_str::<Discount>(json).unwrap());

        assert_eq!(tier.apply_count_type, ApplyCountType::Inf);
        assert_eq!(tier.apply_count_amount, 1);
    }

    #[test]
    fn out_of_range_rate_is_clamped() {
        let json = r#"{ "id": "d1", "name": "Broken", "rate": 1.5 }"#;
        let tier = DiscountTier::from(&serde_json::from_str::<Discount>(json).unwrap());
        assert_eq!(tier.rate, Decimal::ONE);
    }

    #[test]
    fn zero_amount_counts_as_one() {
        let json = r#"{ "id": "d1", "name": "Pair", "rate": 0.1, "applyCountType": "MULTIPLE", "applyCountAmount": 0 }"#;
        let tier = DiscountTier::from(&serde_json::from_str::<Discount>(json).unwrap());

        assert_eq!(tier.apply_count_amount, 1);
        assert_eq!(tier.available_counts(3), vec![0, 1, 2, 3]);
    }

    #[test]
    fn null_rate_and_discounts_are_tolerated() {
        let json = r#"{ "seatGrades": [
            { "id": "g1", "discounts": null },
            { "id": "g2", "discounts": [{ "id": "d1", "name": "Free", "rate": null }] }
        ] }"#;
        let response: ApplicableDiscountsResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.seat_grades[0].tiers(), vec![DiscountTier::normal()]);
        let g2 = response.seat_grades[1].tiers();
        assert_eq!(g2.len(), 2);
        assert_eq!(g2[1].rate, Decimal::ZERO);
    }

    #[test]
    fn normal_tier_has_no_discount_id() {
        assert!(TierRef::Normal.discount_id().is_none());
        assert_eq!(TierRef::Normal.to_string(), "normal");
    }
}
