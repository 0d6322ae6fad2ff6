//! # Overhead Allocation
//!
//! Distributes a monthly overhead pool across jobs in proportion to one
//! allocation basis. The allocated amounts always sum to the pool.
//!
//! ```text
//! allocated_i = basis_i / Σ basis × total_overhead
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ensure_at_least, ensure_range, CalcError, CalcResult};
use crate::lookup::percent_of;

/// Maximum number of jobs in one allocation
pub const MAX_JOBS: usize = 50;

/// What the overhead is shared by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMethod {
    #[default]
    MachineHours,
    LaborHours,
    MaterialCost,
    FloorSpace,
    EqualSplit,
}

impl AllocationMethod {
    pub const ALL: [AllocationMethod; 5] = [
        AllocationMethod::MachineHours,
        AllocationMethod::LaborHours,
        AllocationMethod::MaterialCost,
        AllocationMethod::FloorSpace,
        AllocationMethod::EqualSplit,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            AllocationMethod::MachineHours => "Machine Hours",
            AllocationMethod::LaborHours => "Labor Hours",
            AllocationMethod::MaterialCost => "Material Cost",
            AllocationMethod::FloorSpace => "Floor Space",
            AllocationMethod::EqualSplit => "Equal Split",
        }
    }

    /// Parse from the snake_case key or the display name
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "machinehours" | "machine" => Ok(AllocationMethod::MachineHours),
            "laborhours" | "labor" => Ok(AllocationMethod::LaborHours),
            "materialcost" | "material" => Ok(AllocationMethod::MaterialCost),
            "floorspace" | "floor" => Ok(AllocationMethod::FloorSpace),
            "equalsplit" | "equal" => Ok(AllocationMethod::EqualSplit),
            _ => Err(CalcError::invalid_input(
                "allocation_method",
                s,
                "Expected machine_hours, labor_hours, material_cost, floor_space or equal_split",
            )),
        }
    }
}

/// One job sharing the overhead pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadJob {
    pub name: String,
    pub machine_hours: f64,
    pub labor_hours: f64,
    /// Also the job's direct cost
    pub material_cost: f64,
    /// m² occupied
    pub floor_space: f64,
}

impl OverheadJob {
    fn basis(&self, method: AllocationMethod) -> f64 {
        match method {
            AllocationMethod::MachineHours => self.machine_hours,
            AllocationMethod::LaborHours => self.labor_hours,
            AllocationMethod::MaterialCost => self.material_cost,
            AllocationMethod::FloorSpace => self.floor_space,
            AllocationMethod::EqualSplit => 1.0,
        }
    }
}

/// Input parameters for an overhead allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadInput {
    #[serde(default)]
    pub label: String,
    /// Monthly overhead pool (0 to 1,000,000)
    pub total_overhead: f64,
    #[serde(default)]
    pub allocation_method: AllocationMethod,
    /// 1 to 50 jobs
    pub jobs: Vec<OverheadJob>,
}

impl Default for OverheadInput {
    fn default() -> Self {
        OverheadInput {
            label: String::new(),
            total_overhead: 50_000.0,
            allocation_method: AllocationMethod::MachineHours,
            jobs: vec![
                OverheadJob {
                    name: "Job 1".to_string(),
                    machine_hours: 100.0,
                    labor_hours: 120.0,
                    material_cost: 10_000.0,
                    floor_space: 500.0,
                },
                OverheadJob {
                    name: "Job 2".to_string(),
                    machine_hours: 150.0,
                    labor_hours: 180.0,
                    material_cost: 15_000.0,
                    floor_space: 750.0,
                },
            ],
        }
    }
}

impl OverheadInput {
    pub fn validate(&self) -> CalcResult<()> {
        ensure_range("total_overhead", self.total_overhead, 0.0, 1_000_000.0)?;
        if self.jobs.is_empty() {
            return Err(CalcError::missing_field("jobs"));
        }
        if self.jobs.len() > MAX_JOBS {
            return Err(CalcError::invalid_input(
                "jobs",
                self.jobs.len().to_string(),
                format!("At most {} jobs can share one overhead pool", MAX_JOBS),
            ));
        }
        for (i, job) in self.jobs.iter().enumerate() {
            if job.name.trim().is_empty() {
                return Err(CalcError::missing_field(format!("jobs[{}].name", i)));
            }
            ensure_at_least(&format!("jobs[{}].machine_hours", i), job.machine_hours, 0.0)?;
            ensure_at_least(&format!("jobs[{}].labor_hours", i), job.labor_hours, 0.0)?;
            ensure_at_least(&format!("jobs[{}].material_cost", i), job.material_cost, 0.0)?;
            ensure_at_least(&format!("jobs[{}].floor_space", i), job.floor_space, 0.0)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAllocation {
    pub job_name: String,
    pub allocated_overhead: f64,
    /// Share of the allocation basis (%)
    pub allocation_percentage: f64,
    /// The job's material cost
    pub direct_cost: f64,
    pub total_cost_with_overhead: f64,
    /// Overhead as a share of the job's total cost (%)
    pub overhead_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAmount {
    pub job_name: String,
    pub amount: f64,
}

/// On ties, `highest` is the first tied job in input order and `lowest` the last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub total_allocated: f64,
    pub average_per_job: f64,
    pub highest: JobAmount,
    pub lowest: JobAmount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadResult {
    pub allocation_method: AllocationMethod,
    pub method_name: String,
    pub allocations: Vec<JobAllocation>,
    pub summary: AllocationSummary,
    pub recommendations: Vec<String>,
}

/// Allocate the overhead pool across the jobs.
///
/// # Errors
///
/// * `DivisionByZero` when every job's basis is zero
pub fn calculate(input: &OverheadInput) -> CalcResult<OverheadResult> {
    input.validate()?;
    let method = input.allocation_method;

    let total_basis: f64 = input.jobs.iter().map(|j| j.basis(method)).sum();
    if total_basis <= 0.0 {
        return Err(CalcError::division_by_zero(
            "allocation basis",
            format!("Every job has zero {}", method.display_name().to_lowercase()),
        ));
    }

    let allocations: Vec<JobAllocation> = input
        .jobs
        .iter()
        .map(|job| {
            let share = job.basis(method) / total_basis;
            let allocated_overhead = share * input.total_overhead;
            let total_cost_with_overhead = job.material_cost + allocated_overhead;
            JobAllocation {
                job_name: job.name.clone(),
                allocated_overhead,
                allocation_percentage: share * 100.0,
                direct_cost: job.material_cost,
                total_cost_with_overhead,
                overhead_percentage: percent_of(allocated_overhead, total_cost_with_overhead),
            }
        })
        .collect();

    let total_allocated: f64 = allocations.iter().map(|a| a.allocated_overhead).sum();
    let average_per_job = total_allocated / allocations.len() as f64;

    // validate() guarantees at least one job
    let first = &allocations[0];
    let (mut highest, mut lowest) = (first, first);
    for a in &allocations[1..] {
        if a.allocated_overhead > highest.allocated_overhead {
            highest = a;
        }
        if a.allocated_overhead <= lowest.allocated_overhead {
            lowest = a;
        }
    }
    let summary = AllocationSummary {
        total_allocated,
        average_per_job,
        highest: JobAmount {
            job_name: highest.job_name.clone(),
            amount: highest.allocated_overhead,
        },
        lowest: JobAmount {
            job_name: lowest.job_name.clone(),
            amount: lowest.allocated_overhead,
        },
    };

    let mut recommendations = Vec::new();
    if method == AllocationMethod::EqualSplit && input.jobs.len() > 5 {
        recommendations.push(
            "Equal split may not accurately reflect cost drivers. Consider machine hours or labor hours allocation."
                .to_string(),
        );
    }
    if summary.highest.amount > summary.lowest.amount * 3.0 {
        recommendations.push(
            "Significant variance in overhead allocation detected. Ensure chosen method reflects actual resource consumption."
                .to_string(),
        );
    }
    for a in &allocations {
        if a.overhead_percentage > 50.0 {
            recommendations.push(format!(
                "{}: Overhead exceeds 50% of total cost. Review if allocation method is appropriate.",
                a.job_name
            ));
        }
    }
    match method {
        AllocationMethod::MachineHours => recommendations.push(
            "Machine hours allocation works well for capital-intensive operations. Ensure accurate time tracking."
                .to_string(),
        ),
        AllocationMethod::MaterialCost => recommendations.push(
            "Material cost allocation may not reflect actual overhead drivers. Consider if suitable for your operations."
                .to_string(),
        ),
        _ => {}
    }

    tracing::debug!(method = method.display_name(), jobs = allocations.len(), "overhead allocated");

    Ok(OverheadResult {
        allocation_method: method,
        method_name: method.display_name().to_string(),
        allocations,
        summary,
        recommendations,
    })
}

/// Overhead rate band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverheadRateCategory {
    Low,
    Moderate,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadRate {
    /// Overhead as % of direct cost
    pub overhead_rate: f64,
    pub category: OverheadRateCategory,
    pub interpretation: String,
}

/// Overhead as a percentage of direct cost, with a band.
pub fn calculate_overhead_rate(total_overhead: f64, total_direct_costs: f64) -> CalcResult<OverheadRate> {
    ensure_at_least("total_overhead", total_overhead, 0.0)?;
    ensure_at_least("total_direct_costs", total_direct_costs, 0.0)?;
    if total_direct_costs == 0.0 {
        return Err(CalcError::division_by_zero("direct costs", "Total direct costs must be positive"));
    }

    let overhead_rate = total_overhead / total_direct_costs * 100.0;
    let (category, interpretation) = if overhead_rate < 30.0 {
        (OverheadRateCategory::Low, "Low overhead rate. Typical for lean operations.")
    } else if overhead_rate <= 60.0 {
        (OverheadRateCategory::Moderate, "Moderate overhead rate. Common in manufacturing.")
    } else if overhead_rate <= 100.0 {
        (OverheadRateCategory::High, "High overhead rate. Review cost structure.")
    } else {
        (
            OverheadRateCategory::VeryHigh,
            "Very high overhead rate. Significant optimization opportunity.",
        )
    };
    Ok(OverheadRate {
        overhead_rate,
        category,
        interpretation: interpretation.to_string(),
    })
}

/// Shop-wide basis totals for comparing methods on a single job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopTotals {
    pub machine_hours: f64,
    pub labor_hours: f64,
    pub material_cost: f64,
    pub floor_space: f64,
    pub job_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodAllocation {
    pub method: AllocationMethod,
    pub method_name: String,
    pub allocated_amount: f64,
    /// Difference from the average of all five methods (%)
    pub difference_from_average: f64,
}

/// What one job would carry under each of the five methods.
pub fn compare_allocation_methods(
    total_overhead: f64,
    job: &OverheadJob,
    totals: &ShopTotals,
) -> CalcResult<Vec<MethodAllocation>> {
    ensure_at_least("total_overhead", total_overhead, 0.0)?;
    let divisor = |method: AllocationMethod| match method {
        AllocationMethod::MachineHours => totals.machine_hours,
        AllocationMethod::LaborHours => totals.labor_hours,
        AllocationMethod::MaterialCost => totals.material_cost,
        AllocationMethod::FloorSpace => totals.floor_space,
        AllocationMethod::EqualSplit => totals.job_count as f64,
    };

    let mut amounts = Vec::with_capacity(AllocationMethod::ALL.len());
    for method in AllocationMethod::ALL {
        let total = divisor(method);
        if !total.is_finite() || total <= 0.0 {
            return Err(CalcError::division_by_zero(
                method.display_name(),
                "Shop total for this basis must be positive",
            ));
        }
        amounts.push((method, job.basis(method) / total * total_overhead));
    }

    let average = amounts.iter().map(|(_, a)| a).sum::<f64>() / amounts.len() as f64;
    if average == 0.0 {
        return Err(CalcError::division_by_zero(
            "average allocation",
            "Every method allocates zero to this job",
        ));
    }

    Ok(amounts
        .into_iter()
        .map(|(method, allocated_amount)| MethodAllocation {
            method,
            method_name: method.display_name().to_string(),
            allocated_amount,
            difference_from_average: (allocated_amount - average) / average * 100.0,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_machine_hours_split() {
        let r = calculate(&OverheadInput::default()).unwrap();
        assert!((r.allocations[0].allocated_overhead - 20_000.0).abs() < 1e-9);
        assert!((r.allocations[1].allocated_overhead - 30_000.0).abs() < 1e-9);
        assert!((r.allocations[0].allocation_percentage - 40.0).abs() < 1e-9);
        assert_eq!(r.summary.highest.job_name, "Job 2");
        assert_eq!(r.summary.lowest.job_name, "Job 1");
        // 20000 / 30000 total cost
        assert!((r.allocations[0].overhead_percentage - 200.0 / 3.0).abs() < 1e-9);
        assert!(r.recommendations.iter().any(|s| s.starts_with("Job 1: Overhead exceeds 50%")));
        assert!(r.recommendations.last().unwrap().starts_with("Machine hours allocation"));
    }

    #[test]
    fn test_allocations_sum_to_pool() {
        for method in AllocationMethod::ALL {
            let input = OverheadInput {
                allocation_method: method,
                total_overhead: 12_345.67,
                ..OverheadInput::default()
            };
            let r = calculate(&input).unwrap();
            assert!((r.summary.total_allocated - 12_345.67).abs() < 1e-6, "{:?}", method);
        }
    }

    #[test]
    fn test_equal_split_many_jobs() {
        let jobs = (1..=6)
            .map(|i| OverheadJob {
                name: format!("Job {}", i),
                machine_hours: 10.0,
                labor_hours: 10.0,
                material_cost: 1000.0,
                floor_space: 10.0,
            })
            .collect();
        let input = OverheadInput {
            allocation_method: AllocationMethod::EqualSplit,
            total_overhead: 600.0,
            jobs,
            ..OverheadInput::default()
        };
        let r = calculate(&input).unwrap();
        assert!(r.allocations.iter().all(|a| (a.allocated_overhead - 100.0).abs() < 1e-9));
        assert!(r.recommendations[0].starts_with("Equal split may not"));
        assert_eq!(r.summary.highest.job_name, "Job 1");
        assert_eq!(r.summary.lowest.job_name, "Job 6");
    }

    #[test]
    fn test_summary_ties() {
        let mut input = OverheadInput::default();
        let (first, second) = (input.jobs[0].clone(), input.jobs[1].clone());
        input.jobs.push(OverheadJob {
            name: "Job 3".to_string(),
            ..first
        });
        input.jobs.push(OverheadJob {
            name: "Job 4".to_string(),
            ..second
        });
        // machine hours 100, 150, 100, 150
        let r = calculate(&input).unwrap();
        assert_eq!(r.summary.highest.job_name, "Job 2");
        assert_eq!(r.summary.lowest.job_name, "Job 3");
    }

    #[test]
    fn test_zero_basis() {
        let mut input = OverheadInput {
            allocation_method: AllocationMethod::FloorSpace,
            ..OverheadInput::default()
        };
        for job in &mut input.jobs {
            job.floor_space = 0.0;
        }
        assert_eq!(calculate(&input).unwrap_err().error_code(), "DIVISION_BY_ZERO");
    }

    #[test]
    fn test_no_jobs() {
        let input = OverheadInput {
            jobs: Vec::new(),
            ..OverheadInput::default()
        };
        assert_eq!(calculate(&input).unwrap_err().error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_overhead_rate() {
        let r = calculate_overhead_rate(40_000.0, 100_000.0).unwrap();
        assert!((r.overhead_rate - 40.0).abs() < 1e-9);
        assert_eq!(r.category, OverheadRateCategory::Moderate);
        assert!(calculate_overhead_rate(1.0, 0.0).is_err());
        assert_eq!(calculate_overhead_rate(150.0, 100.0).unwrap().category, OverheadRateCategory::VeryHigh);
    }

    #[test]
    fn test_compare_methods() {
        let job = OverheadJob {
            name: "Bracket run".to_string(),
            machine_hours: 100.0,
            labor_hours: 100.0,
            material_cost: 10_000.0,
            floor_space: 100.0,
        };
        let totals = ShopTotals {
            machine_hours: 400.0,
            labor_hours: 400.0,
            material_cost: 40_000.0,
            floor_space: 400.0,
            job_count: 4,
        };
        let rows = compare_allocation_methods(10_000.0, &job, &totals).unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| (r.allocated_amount - 2500.0).abs() < 1e-9));
        assert!(rows.iter().all(|r| r.difference_from_average.abs() < 1e-9));

        let zero = ShopTotals { floor_space: 0.0, ..totals };
        assert!(compare_allocation_methods(10_000.0, &job, &zero).is_err());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(AllocationMethod::from_str_flexible("Labor Hours").unwrap(), AllocationMethod::LaborHours);
        assert_eq!(AllocationMethod::from_str_flexible("equal_split").unwrap(), AllocationMethod::EqualSplit);
        assert!(AllocationMethod::from_str_flexible("vibes").is_err());
    }
}
