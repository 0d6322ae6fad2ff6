//! # Equipment ROI
//!
//! Month-by-month cash flow of an equipment purchase with optional
//! financing, revenue growth, payback month, NPV and IRR.
//!
//! ## Cash Flow Model
//!
//! - Investment = equipment + installation; the down payment is paid at month 0
//! - Financing interest on the financed amount is `rate / 12` per month while
//!   the loan runs
//! - Revenue grows at the monthly equivalent of the annual growth rate
//! - NPV discounts each monthly profit at `discount rate / 12`
//! - IRR solves NPV = 0 by Newton's method from 10%

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_range, CalcResult};

const IRR_INITIAL_GUESS: f64 = 0.1;
const IRR_MAX_ITERATIONS: usize = 100;
const IRR_TOLERANCE: f64 = 1e-4;

/// Input parameters for an equipment ROI projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiInput {
    #[serde(default)]
    pub label: String,
    /// $1,000 to $10,000,000
    pub equipment_cost: f64,
    #[serde(default)]
    pub installation_cost: f64,
    /// Parts per month (1 to 1,000,000)
    pub monthly_production: u32,
    pub price_per_unit: f64,
    pub monthly_operating_cost: f64,
    /// -50 to 100 %
    pub annual_growth_rate: f64,
    /// Annual interest on the financed amount (0 to 30 %)
    pub financing_rate: f64,
    /// 0 to 100 %
    pub down_payment_percent: f64,
    /// 1 to 20 years
    pub loan_term_years: u32,
    /// 1 to 20 years
    pub analysis_years: u32,
    /// 0 to 50 %
    pub discount_rate: f64,
}

impl Default for RoiInput {
    fn default() -> Self {
        RoiInput {
            label: String::new(),
            equipment_cost: 150_000.0,
            installation_cost: 5000.0,
            monthly_production: 500,
            price_per_unit: 50.0,
            monthly_operating_cost: 8000.0,
            annual_growth_rate: 5.0,
            financing_rate: 0.0,
            down_payment_percent: 20.0,
            loan_term_years: 5,
            analysis_years: 5,
            discount_rate: 10.0,
        }
    }
}

impl RoiInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("equipment_cost", self.equipment_cost, 1000.0, 10_000_000.0)?;
        ensure_range("installation_cost", self.installation_cost, 0.0, 1_000_000.0)?;
        ensure_range("monthly_production", self.monthly_production as f64, 1.0, 1_000_000.0)?;
        ensure_range("price_per_unit", self.price_per_unit, 0.01, 100_000.0)?;
        ensure_range("monthly_operating_cost", self.monthly_operating_cost, 0.0, 10_000_000.0)?;
        ensure_range("annual_growth_rate", self.annual_growth_rate, -50.0, 100.0)?;
        ensure_range("financing_rate", self.financing_rate, 0.0, 30.0)?;
        ensure_range("down_payment_percent", self.down_payment_percent, 0.0, 100.0)?;
        ensure_range("loan_term_years", self.loan_term_years as f64, 1.0, 20.0)?;
        ensure_range("analysis_years", self.analysis_years as f64, 1.0, 20.0)?;
        ensure_range("discount_rate", self.discount_rate, 0.0, 50.0)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProjection {
    pub month: u32,
    pub revenue: f64,
    pub costs: f64,
    pub profit: f64,
    pub cumulative_cash_flow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub year: u32,
    pub revenue: f64,
    pub costs: f64,
    pub profit: f64,
    pub cumulative_profit: f64,
    /// Cumulative profit over total investment (%)
    pub roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub total_investment: f64,
    pub financed_amount: f64,
    pub down_payment_amount: f64,

    pub monthly_revenue: f64,
    pub monthly_financing_cost: f64,
    /// First-month profit, before growth
    pub monthly_profit: f64,

    /// First month with non-negative cumulative cash flow; `None` when the
    /// investment is not recovered within the analysis period
    pub payback_month: Option<u32>,
    pub payback_years: Option<f64>,

    pub simple_roi: f64,
    pub annual_roi: f64,
    pub total_roi: f64,

    pub npv: f64,
    /// Annual IRR (%)
    pub irr: f64,

    pub yearly_projections: Vec<YearlyProjection>,
    pub monthly_projections: Vec<MonthlyProjection>,
}

/// Project an equipment investment.
pub fn calculate(input: &RoiInput) -> CalcResult<RoiResult> {
    input.validate()?;

    let total_investment = input.equipment_cost + input.installation_cost;
    let down_payment_amount = total_investment * input.down_payment_percent / 100.0;
    let financed_amount = total_investment - down_payment_amount;

    let monthly_revenue = input.monthly_production as f64 * input.price_per_unit;
    let monthly_financing_cost = financed_amount * input.financing_rate / 100.0 / 12.0;
    let loan_months = input.loan_term_years * 12;
    let cost_in_month = |month: u32| {
        if month <= loan_months {
            input.monthly_operating_cost + monthly_financing_cost
        } else {
            input.monthly_operating_cost
        }
    };
    let monthly_profit = monthly_revenue - cost_in_month(1);

    let months = input.analysis_years * 12;
    let monthly_growth = (1.0 + input.annual_growth_rate / 100.0).powf(1.0 / 12.0) - 1.0;

    let mut cumulative = -down_payment_amount;
    let mut payback_month = None;
    let mut monthly_projections = Vec::with_capacity(months as usize);
    for month in 1..=months {
        let revenue = monthly_revenue * (1.0 + monthly_growth).powi(month as i32 - 1);
        let costs = cost_in_month(month);
        let profit = revenue - costs;
        cumulative += profit;
        if payback_month.is_none() && cumulative >= 0.0 {
            payback_month = Some(month);
        }
        monthly_projections.push(MonthlyProjection {
            month,
            revenue,
            costs,
            profit,
            cumulative_cash_flow: cumulative,
        });
    }
    if payback_month.is_none() {
        tracing::warn!(months, "investment not recovered within the analysis period");
    }

    let mut cumulative_profit = -down_payment_amount;
    let yearly_projections: Vec<YearlyProjection> = (1..=input.analysis_years)
        .map(|year| {
            let revenue = monthly_revenue * 12.0 * (1.0 + input.annual_growth_rate / 100.0).powi(year as i32 - 1);
            let costs: f64 = ((year - 1) * 12 + 1..=year * 12).map(cost_in_month).sum();
            let profit = revenue - costs;
            cumulative_profit += profit;
            YearlyProjection {
                year,
                revenue,
                costs,
                profit,
                cumulative_profit,
                roi: cumulative_profit / total_investment * 100.0,
            }
        })
        .collect();

    let total_profit: f64 = yearly_projections.iter().map(|y| y.profit).sum();
    let total_roi = total_profit / total_investment * 100.0;
    let annual_roi = total_roi / input.analysis_years as f64;
    let simple_roi = monthly_profit * 12.0 / total_investment * 100.0;

    let profits: Vec<f64> = monthly_projections.iter().map(|m| m.profit).collect();
    let npv = net_present_value(down_payment_amount, &profits, input.discount_rate / 100.0);
    let irr = internal_rate_of_return(down_payment_amount, &profits);

    tracing::debug!(npv, irr, ?payback_month, "roi projected");

    Ok(RoiResult {
        total_investment,
        financed_amount,
        down_payment_amount,
        monthly_revenue,
        monthly_financing_cost,
        monthly_profit,
        payback_month,
        payback_years: payback_month.map(|m| m as f64 / 12.0),
        simple_roi,
        annual_roi,
        total_roi,
        npv,
        irr,
        yearly_projections,
        monthly_projections,
    })
}

/// NPV of monthly cash flows at an annual rate compounded monthly.
pub fn net_present_value(initial_outlay: f64, monthly_cash_flows: &[f64], annual_rate: f64) -> f64 {
    monthly_cash_flows
        .iter()
        .enumerate()
        .fold(-initial_outlay, |npv, (i, cf)| {
            npv + cf / (1.0 + annual_rate / 12.0).powi(i as i32 + 1)
        })
}

/// Annual IRR (%) of monthly cash flows, by Newton's method.
///
/// Returns 0 when the iteration leaves the finite range.
pub fn internal_rate_of_return(initial_outlay: f64, monthly_cash_flows: &[f64]) -> f64 {
    let mut irr = IRR_INITIAL_GUESS;
    for _ in 0..IRR_MAX_ITERATIONS {
        let mut npv = -initial_outlay;
        let mut derivative = 0.0;
        for (i, cf) in monthly_cash_flows.iter().enumerate() {
            let period = (i + 1) as f64;
            let base = 1.0 + irr / 12.0;
            npv += cf / base.powf(period);
            derivative -= period * cf / (12.0 * base.powf(period + 1.0));
        }

        let next = irr - npv / derivative;
        if !next.is_finite() {
            return 0.0;
        }
        if (next - irr).abs() < IRR_TOLERANCE {
            return next * 100.0;
        }
        irr = next;
    }
    irr * 100.0
}
