//! # Quotation Margin Simulator
//!
//! Prices a job from its cost and a target **margin on price**:
//!
//! ```text
//! price   = cost / (1 − margin%)
//! margin% = profit / price × 100
//! markup% = profit / cost  × 100
//! ```
//!
//! The two percentages share a numerator and differ only in denominator, so a
//! 30% margin is a 42.86% markup. Payment terms and a risk buffer are then
//! stacked on top of the suggested price.
//!
//! ## Example
//!
//! ```rust
//! use lasercalc_core::calculations::quotation::{calculate, QuotationInput};
//!
//! let result = calculate(&QuotationInput::default()).unwrap();
//! assert!((result.suggested_price - 1428.5714).abs() < 1e-3);
//! assert!((result.markup_percent - 42.857).abs() < 1e-3);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_at_least, ensure_range, CalcError, CalcResult};
use crate::lookup::percent_of;

/// Margin below which a price is not considered viable (%)
pub const MINIMUM_VIABLE_MARGIN_PERCENT: f64 = 10.0;

/// Competitor difference treated as "similar" (±%)
pub const SIMILAR_PRICE_BAND_PERCENT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTerms {
    Immediate,
    #[default]
    Net30,
    Net60,
    Net90,
}

impl PaymentTerms {
    /// Carrying cost added to the price
    pub fn carrying_cost_fraction(&self) -> f64 {
        match self {
            PaymentTerms::Immediate => 0.0,
            PaymentTerms::Net30 => 0.01,
            PaymentTerms::Net60 => 0.02,
            PaymentTerms::Net90 => 0.03,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PaymentTerms::Immediate => "immediate",
            PaymentTerms::Net30 => "net30",
            PaymentTerms::Net60 => "net60",
            PaymentTerms::Net90 => "net90",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskFactor {
    /// Risk buffer added after payment terms
    pub fn buffer_fraction(&self) -> f64 {
        match self {
            RiskFactor::Low => 0.0,
            RiskFactor::Medium => 0.05,
            RiskFactor::High => 0.10,
        }
    }
}

/// Discount for ordering at least `quantity` parts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeDiscount {
    pub quantity: u32,
    /// 0 to 50 %
    pub discount_percent: f64,
}

/// Input parameters for a quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationInput {
    #[serde(default)]
    pub label: String,
    /// Total manufacturing cost per part (1 to 1,000,000)
    pub base_cost: f64,
    pub material_cost: f64,
    pub labor_cost: f64,
    pub overhead_cost: f64,
    /// Margin on selling price (0 to <100 %)
    pub target_margin_percent: f64,
    #[serde(default)]
    pub competitor_price: Option<f64>,
    #[serde(default)]
    pub volume_discounts: Vec<VolumeDiscount>,
    #[serde(default)]
    pub payment_terms: PaymentTerms,
    #[serde(default)]
    pub risk_factor: RiskFactor,
}

impl Default for QuotationInput {
    fn default() -> Self {
        QuotationInput {
            label: String::new(),
            base_cost: 1000.0,
            material_cost: 400.0,
            labor_cost: 350.0,
            overhead_cost: 250.0,
            target_margin_percent: 30.0,
            competitor_price: None,
            volume_discounts: Vec::new(),
            payment_terms: PaymentTerms::Net30,
            risk_factor: RiskFactor::Medium,
        }
    }
}

impl QuotationInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("base_cost", self.base_cost, 1.0, 1_000_000.0)?;
        ensure_range("material_cost", self.material_cost, 0.0, 1_000_000.0)?;
        ensure_range("labor_cost", self.labor_cost, 0.0, 1_000_000.0)?;
        ensure_range("overhead_cost", self.overhead_cost, 0.0, 1_000_000.0)?;
        ensure_range("target_margin_percent", self.target_margin_percent, 0.0, 100.0)?;
        if let Some(price) = self.competitor_price {
            ensure_range("competitor_price", price, 0.0, 1_000_000.0)?;
        }
        for (i, tier) in self.volume_discounts.iter().enumerate() {
            if tier.quantity == 0 {
                return Err(CalcError::invalid_input(
                    format!("volume_discounts[{}].quantity", i),
                    "0",
                    "Tier quantity must be at least 1",
                ));
            }
            ensure_range(
                &format!("volume_discounts[{}].discount_percent", i),
                tier.discount_percent,
                0.0,
                50.0,
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePricing {
    pub quantity: u32,
    pub discount_percent: f64,
    pub price_per_unit: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub margin_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePosition {
    Lower,
    Similar,
    Higher,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorComparison {
    pub competitor_price: f64,
    pub our_price: f64,
    pub price_difference: f64,
    pub percentage_difference: f64,
    pub position: PricePosition,
}

/// Quotation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotationResult {
    pub suggested_price: f64,
    pub profit_amount: f64,
    pub margin_percent: f64,
    pub markup_percent: f64,

    /// Shares of the suggested price (%)
    pub material_percent: f64,
    pub labor_percent: f64,
    pub overhead_percent: f64,
    pub profit_percent: f64,

    pub payment_terms_adjustment: f64,
    pub adjusted_price: f64,
    pub risk_adjustment: f64,
    pub final_recommended_price: f64,

    pub volume_pricing: Vec<VolumePricing>,
    pub competitor_comparison: Option<CompetitorComparison>,

    /// Cost itself
    pub break_even_price: f64,
    /// Cost + 10%
    pub minimum_acceptable_price: f64,
    pub recommendations: Vec<String>,
}

fn price_for_margin(base_cost: f64, target_margin_percent: f64) -> CalcResult<f64> {
    let remaining = 1.0 - target_margin_percent / 100.0;
    if remaining <= 0.0 {
        return Err(CalcError::division_by_zero(
            "1 - target margin",
            "Target margin cannot be 100% or more",
        ));
    }
    Ok(base_cost / remaining)
}

/// Price a job at a target margin.
///
/// # Errors
///
/// * `DivisionByZero` when the target margin is 100%
pub fn calculate(input: &QuotationInput) -> CalcResult<QuotationResult> {
    input.validate()?;

    let base_cost = input.base_cost;
    let target = input.target_margin_percent;

    let suggested_price = price_for_margin(base_cost, target)?;
    let profit_amount = suggested_price - base_cost;
    let markup_percent = profit_amount / base_cost * 100.0;
    let margin_percent = percent_of(profit_amount, suggested_price);

    let material_percent = percent_of(input.material_cost, suggested_price);
    let labor_percent = percent_of(input.labor_cost, suggested_price);
    let overhead_percent = percent_of(input.overhead_cost, suggested_price);
    let profit_percent = percent_of(profit_amount, suggested_price);

    let payment_terms_adjustment = suggested_price * input.payment_terms.carrying_cost_fraction();
    let adjusted_price = suggested_price + payment_terms_adjustment;
    let risk_adjustment = adjusted_price * input.risk_factor.buffer_fraction();
    let final_recommended_price = adjusted_price + risk_adjustment;

    let volume_pricing: Vec<VolumePricing> = input
        .volume_discounts
        .iter()
        .map(|tier| {
            let price_per_unit = final_recommended_price * (1.0 - tier.discount_percent / 100.0);
            let qty = tier.quantity as f64;
            let total_revenue = price_per_unit * qty;
            let total_profit = total_revenue - base_cost * qty;
            VolumePricing {
                quantity: tier.quantity,
                discount_percent: tier.discount_percent,
                price_per_unit,
                total_revenue,
                total_profit,
                margin_percent: percent_of(total_profit, total_revenue),
            }
        })
        .collect();

    let competitor_comparison = input.competitor_price.filter(|p| *p > 0.0).map(|competitor_price| {
        let price_difference = final_recommended_price - competitor_price;
        let percentage_difference = price_difference / competitor_price * 100.0;
        let position = if percentage_difference < -SIMILAR_PRICE_BAND_PERCENT {
            PricePosition::Lower
        } else if percentage_difference > SIMILAR_PRICE_BAND_PERCENT {
            PricePosition::Higher
        } else {
            PricePosition::Similar
        };
        CompetitorComparison {
            competitor_price,
            our_price: final_recommended_price,
            price_difference,
            percentage_difference,
            position,
        }
    });

    let mut recommendations = Vec::new();
    if target < 20.0 {
        recommendations.push(
            "Target margin below 20% is low. Ensure volume justifies thin margins or consider increasing price."
                .to_string(),
        );
    } else if target > 50.0 {
        recommendations.push(
            "Target margin above 50% is high. Ensure value proposition justifies premium pricing or risk losing to competitors."
                .to_string(),
        );
    }
    if material_percent > 60.0 {
        recommendations.push(format!(
            "Material costs are {:.0}% of price. Consider negotiating bulk discounts with suppliers.",
            material_percent
        ));
    }
    if labor_percent > 40.0 {
        recommendations.push("Labor costs are high. Consider automation or process optimization opportunities.".to_string());
    }
    if overhead_percent > 30.0 {
        recommendations.push("Overhead allocation is high. Review if overhead rates are current and accurate.".to_string());
    }
    if matches!(input.payment_terms, PaymentTerms::Net60 | PaymentTerms::Net90) {
        recommendations.push(format!(
            "Extended payment terms ({}) increase carrying costs by {:.0}%. Consider early payment discounts.",
            input.payment_terms.code(),
            input.payment_terms.carrying_cost_fraction() * 100.0
        ));
    }
    if input.risk_factor == RiskFactor::High {
        recommendations.push(
            "High risk factor applied (10% buffer). Consider requiring deposit or progress payments to mitigate risk."
                .to_string(),
        );
    }
    if let Some(cmp) = &competitor_comparison {
        recommendations.push(match cmp.position {
            PricePosition::Higher => format!(
                "Price is {:.0}% higher than competitor. Justify with quality, service, or delivery advantages.",
                cmp.percentage_difference.abs()
            ),
            PricePosition::Lower => format!(
                "Price is {:.0}% lower than competitor. Consider if you can increase margins.",
                cmp.percentage_difference.abs()
            ),
            PricePosition::Similar => {
                "Price is competitive with market. Focus on non-price differentiators to win the business.".to_string()
            }
        });
    }
    let lowest_margin = volume_pricing
        .iter()
        .map(|v| v.margin_percent)
        .fold(f64::INFINITY, f64::min);
    if lowest_margin < 15.0 {
        recommendations.push(format!(
            "Volume discount reduces margin to {:.0}%. Ensure volume justifies thin margins.",
            lowest_margin
        ));
    }
    recommendations.push("Always verify actual costs before quoting. Use this as a guideline, not absolute.".to_string());
    if (25.0..=35.0).contains(&target) {
        recommendations.push("Target margin is in healthy range (25-35%) for custom fabrication work.".to_string());
    }

    tracing::debug!(suggested_price, final_recommended_price, "quotation priced");

    Ok(QuotationResult {
        suggested_price,
        profit_amount,
        margin_percent,
        markup_percent,
        material_percent,
        labor_percent,
        overhead_percent,
        profit_percent,
        payment_terms_adjustment,
        adjusted_price,
        risk_adjustment,
        final_recommended_price,
        volume_pricing,
        competitor_comparison,
        break_even_price: base_cost,
        minimum_acceptable_price: base_cost * 1.10,
        recommendations,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginAtPrice {
    pub margin_percent: f64,
    pub markup_percent: f64,
    pub profit_amount: f64,
    /// Margin of at least 10%
    pub is_viable: bool,
}

/// Margin and markup achieved when selling at `selling_price`.
pub fn calculate_margin_at_price(base_cost: f64, selling_price: f64) -> CalcResult<MarginAtPrice> {
    ensure_at_least("base_cost", base_cost, 0.0)?;
    ensure_at_least("selling_price", selling_price, 0.0)?;
    if base_cost == 0.0 {
        return Err(CalcError::division_by_zero("base cost", "Markup is undefined for a zero cost"));
    }
    if selling_price == 0.0 {
        return Err(CalcError::division_by_zero("selling price", "Margin is undefined for a zero price"));
    }
    let profit_amount = selling_price - base_cost;
    let margin_percent = profit_amount / selling_price * 100.0;
    Ok(MarginAtPrice {
        margin_percent,
        markup_percent: profit_amount / base_cost * 100.0,
        profit_amount,
        is_viable: margin_percent >= MINIMUM_VIABLE_MARGIN_PERCENT,
    })
}

/// Selling price that yields `target_margin_percent` on price.
pub fn calculate_price_for_margin(base_cost: f64, target_margin_percent: f64) -> CalcResult<f64> {
    ensure_at_least("base_cost", base_cost, 0.0)?;
    ensure_at_least("target_margin_percent", target_margin_percent, 0.0)?;
    price_for_margin(base_cost, target_margin_percent)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountImpact {
    pub discounted_price: f64,
    pub original_margin_percent: f64,
    pub new_margin_percent: f64,
    /// Percentage points lost
    pub margin_reduction: f64,
    pub profit_loss: f64,
}

/// Effect of a discount on margin and profit.
pub fn calculate_discount_impact(
    original_price: f64,
    base_cost: f64,
    discount_percent: f64,
) -> CalcResult<DiscountImpact> {
    ensure_at_least("base_cost", base_cost, 0.0)?;
    ensure_range("discount_percent", discount_percent, 0.0, 100.0)?;
    if !(original_price > 0.0) || discount_percent >= 100.0 {
        return Err(CalcError::division_by_zero(
            "discounted price",
            "Price after discount must be positive",
        ));
    }

    let original_profit = original_price - base_cost;
    let original_margin_percent = original_profit / original_price * 100.0;
    let discounted_price = original_price * (1.0 - discount_percent / 100.0);
    let new_profit = discounted_price - base_cost;
    let new_margin_percent = new_profit / discounted_price * 100.0;

    Ok(DiscountImpact {
        discounted_price,
        original_margin_percent,
        new_margin_percent,
        margin_reduction: original_margin_percent - new_margin_percent,
        profit_loss: original_profit - new_profit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_margin_not_markup() {
        let r = calculate(&QuotationInput::default()).unwrap();
        assert!((r.suggested_price - 1000.0 / 0.7).abs() < 1e-9);
        assert!((r.margin_percent - 30.0).abs() < 1e-9);
        assert!((r.markup_percent - 300.0 / 7.0).abs() < 1e-9);
        assert!((r.profit_amount - (r.suggested_price - 1000.0)).abs() < 1e-9);
    }

    #[test]
    fn test_margin_markup_identity() {
        for (cost, margin) in [(1.0, 0.0), (50.0, 12.5), (1000.0, 30.0), (99_999.0, 75.0), (10.0, 99.0)] {
            let input = QuotationInput {
                base_cost: cost,
                target_margin_percent: margin,
                material_cost: 0.0,
                labor_cost: 0.0,
                overhead_cost: 0.0,
                ..QuotationInput::default()
            };
            let r = calculate(&input).unwrap();
            let profit = r.suggested_price - cost;
            assert!((r.profit_amount - profit).abs() < 1e-6);
            assert!((r.margin_percent - 100.0 * profit / r.suggested_price).abs() < 1e-9);
            assert!((r.markup_percent - 100.0 * profit / cost).abs() < 1e-9);
            if profit > 0.0 {
                assert!(r.margin_percent < r.markup_percent);
            }
        }
    }

    #[test]
    fn test_terms_and_risk_stack() {
        let r = calculate(&QuotationInput::default()).unwrap();
        let adjusted = r.suggested_price * 1.01;
        assert!((r.adjusted_price - adjusted).abs() < 1e-9);
        assert!((r.final_recommended_price - adjusted * 1.05).abs() < 1e-9);
        assert_eq!(r.break_even_price, 1000.0);
        assert!((r.minimum_acceptable_price - 1100.0).abs() < 1e-9);
        assert!(r.recommendations.last().unwrap().contains("healthy range"));
    }

    #[test]
    fn test_full_margin_is_division_by_zero() {
        let input = QuotationInput {
            target_margin_percent: 100.0,
            ..QuotationInput::default()
        };
        assert_eq!(calculate(&input).unwrap_err().error_code(), "DIVISION_BY_ZERO");
    }

    #[test]
    fn test_volume_tiers() {
        let input = QuotationInput {
            volume_discounts: vec![
                VolumeDiscount { quantity: 10, discount_percent: 5.0 },
                VolumeDiscount { quantity: 100, discount_percent: 30.0 },
            ],
            ..QuotationInput::default()
        };
        let r = calculate(&input).unwrap();
        let tier = &r.volume_pricing[0];
        assert!((tier.price_per_unit - r.final_recommended_price * 0.95).abs() < 1e-9);
        assert!((tier.total_profit - (tier.total_revenue - 10_000.0)).abs() < 1e-6);
        assert!(r.volume_pricing[1].margin_percent < 15.0);
        assert!(r.recommendations.iter().any(|s| s.starts_with("Volume discount reduces margin")));
    }

    #[test]
    fn test_competitor_position() {
        let priced = |competitor: f64| {
            calculate(&QuotationInput {
                competitor_price: Some(competitor),
                ..QuotationInput::default()
            })
            .unwrap()
            .competitor_comparison
            .unwrap()
            .position
        };
        // Final price is ~1514.57
        assert_eq!(priced(1000.0), PricePosition::Higher);
        assert_eq!(priced(1500.0), PricePosition::Similar);
        assert_eq!(priced(2000.0), PricePosition::Lower);

        let none = calculate(&QuotationInput {
            competitor_price: Some(0.0),
            ..QuotationInput::default()
        })
        .unwrap();
        assert_eq!(none.competitor_comparison, None);
    }

    #[test]
    fn test_margin_at_price() {
        let m = calculate_margin_at_price(100.0, 125.0).unwrap();
        assert!((m.margin_percent - 20.0).abs() < 1e-9);
        assert!((m.markup_percent - 25.0).abs() < 1e-9);
        assert!(m.is_viable);
        assert!(!calculate_margin_at_price(100.0, 105.0).unwrap().is_viable);
        assert!(calculate_margin_at_price(100.0, 0.0).is_err());
    }

    #[test]
    fn test_price_for_margin() {
        assert!((calculate_price_for_margin(1000.0, 30.0).unwrap() - 1428.571_428_571).abs() < 1e-6);
        assert!(calculate_price_for_margin(1000.0, 100.0).is_err());
    }

    #[test]
    fn test_discount_impact() {
        let d = calculate_discount_impact(200.0, 100.0, 10.0).unwrap();
        assert!((d.discounted_price - 180.0).abs() < 1e-9);
        assert!((d.original_margin_percent - 50.0).abs() < 1e-9);
        assert!((d.new_margin_percent - 800.0 / 18.0).abs() < 1e-9);
        assert!((d.profit_loss - 20.0).abs() < 1e-9);
    }
}
