use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Income level at or above which a bracket's upper bound means "and above".
pub const UNBOUNDED_INCOME: f64 = 1.0e8;

/// Age at which the extra federal standard deduction begins.
pub const FEDERAL_PIVOT_AGE: u32 = 65;

/// One row of the year-by-year projection, tidied from the wire response.
///
/// All monetary fields are finite and non-negative; `age` increases by 1
/// across consecutive rows of a [`ProjectionResult`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub age: u32,
    pub cash_withdraw: f64,
    pub brokerage_balance: f64,
    pub brokerage_withdraw: f64,
    pub ira_balance: f64,
    pub ira_withdraw: f64,
    pub ira_rmd: f64,
    pub ira_to_roth: f64,
    pub roth_balance: f64,
    pub roth_withdraw: f64,
    pub cgd_spendable: f64,
    pub capital_gains_distribution: f64,
    pub total_capital_gains: f64,
    pub ordinary_income: f64,
    pub fed_agi: f64,
    pub fed_tax: f64,
    pub state_agi: f64,
    pub state_tax: f64,
    pub total_tax: f64,
    pub social_security: f64,
    pub aca_hc_payment: f64,
    pub aca_help: f64,
    pub available_spending: f64,
    pub excess: f64,
}

/// Named numeric field of a [`ProjectionPoint`] that a chart can plot.
///
/// The order in which a caller lists keys is meaningful: stacked charts layer
/// series in that order, bottom first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    CashWithdraw,
    BrokerageBalance,
    BrokerageWithdraw,
    IraBalance,
    IraWithdraw,
    IraRmd,
    IraToRoth,
    RothBalance,
    RothWithdraw,
    CgdSpendable,
    TotalCapitalGains,
    OrdinaryIncome,
    FedTax,
    StateAgi,
    StateTax,
    SocialSecurity,
    AcaHcPayment,
    AvailableSpending,
}

impl SeriesKey {
    /// Value of this field at one projection point.
    pub fn value(&self, p: &ProjectionPoint) -> f64 {
        match self {
            SeriesKey::CashWithdraw => p.cash_withdraw,
            SeriesKey::BrokerageBalance => p.brokerage_balance,
            SeriesKey::BrokerageWithdraw => p.brokerage_withdraw,
            SeriesKey::IraBalance => p.ira_balance,
            SeriesKey::IraWithdraw => p.ira_withdraw,
            SeriesKey::IraRmd => p.ira_rmd,
            SeriesKey::IraToRoth => p.ira_to_roth,
            SeriesKey::RothBalance => p.roth_balance,
            SeriesKey::RothWithdraw => p.roth_withdraw,
            SeriesKey::CgdSpendable => p.cgd_spendable,
            SeriesKey::TotalCapitalGains => p.total_capital_gains,
            SeriesKey::OrdinaryIncome => p.ordinary_income,
            SeriesKey::FedTax => p.fed_tax,
            SeriesKey::StateAgi => p.state_agi,
            SeriesKey::StateTax => p.state_tax,
            SeriesKey::SocialSecurity => p.social_security,
            SeriesKey::AcaHcPayment => p.aca_hc_payment,
            SeriesKey::AvailableSpending => p.available_spending,
        }
    }

    /// Human-readable label used in tooltips and legends.
    pub fn label(&self) -> &'static str {
        match self {
            SeriesKey::CashWithdraw => "Cash Withdraw",
            SeriesKey::BrokerageBalance => "Brokerage Balance",
            SeriesKey::BrokerageWithdraw => "Brokerage Withdraw",
            SeriesKey::IraBalance => "IRA Balance",
            SeriesKey::IraWithdraw => "IRA Withdraw",
            SeriesKey::IraRmd => "IRA RMD",
            SeriesKey::IraToRoth => "IRA to Roth",
            SeriesKey::RothBalance => "Roth Balance",
            SeriesKey::RothWithdraw => "Roth Withdraw",
            SeriesKey::CgdSpendable => "CGD Spendable",
            SeriesKey::TotalCapitalGains => "Total Capital Gains",
            SeriesKey::OrdinaryIncome => "Ordinary Income",
            SeriesKey::FedTax => "Fed Tax",
            SeriesKey::StateAgi => "State AGI",
            SeriesKey::StateTax => "State Tax",
            SeriesKey::SocialSecurity => "Social Security",
            SeriesKey::AcaHcPayment => "ACA HC Payment",
            SeriesKey::AvailableSpending => "Available Spending",
        }
    }
}

/// One progressive tax bracket: a rate applied to income in
/// `[from_income, to_income)`.
///
/// On the wire a bracket is a bare 3-element array `[rate, from, to]`; the
/// custom impls keep that shape while giving the fields names in Rust.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBracket {
    pub rate: f64,
    pub from_income: f64,
    pub to_income: f64,
}

impl TaxBracket {
    /// True when `to_income` is the "no upper bound" sentinel.
    pub fn is_unbounded(&self) -> bool {
        self.to_income >= UNBOUNDED_INCOME
    }
}

impl Serialize for TaxBracket {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.rate, self.from_income, self.to_income).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaxBracket {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (rate, from_income, to_income) = <(f64, f64, f64)>::deserialize(deserializer)?;
        Ok(TaxBracket {
            rate,
            from_income,
            to_income,
        })
    }
}

/// Federal tax description attached to a projection response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FederalTaxData {
    /// Ordinary-income brackets, ascending in `from_income`.
    pub taxtable: Vec<TaxBracket>,
    /// Capital-gains brackets, ascending in `from_income`.
    pub cg_taxtable: Vec<TaxBracket>,
    /// Net investment income tax threshold (displayed, never overlaid).
    pub nii: f64,
    pub standard_deduction: f64,
    /// Additional deduction from [`FEDERAL_PIVOT_AGE`] on.
    pub standard_deduction_extra65: f64,
    /// Filing-status label, e.g. "Single" or "MFJ".
    pub status: String,
}

impl FederalTaxData {
    /// The age-pivoted deduction shift applied to every federal threshold.
    pub fn pivot_adjustment(&self) -> PivotAdjustment {
        PivotAdjustment {
            pivot_age: FEDERAL_PIVOT_AGE,
            deduction_below: self.standard_deduction,
            deduction_at_or_above: self.standard_deduction + self.standard_deduction_extra65,
        }
    }
}

/// State tax description attached to a projection response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTaxData {
    pub taxtable: Vec<TaxBracket>,
    pub standard_deduction: f64,
    /// Label like "DC_Single".
    pub status: String,
    pub taxes_retirement_income: bool,
    pub taxes_ss: bool,
}

/// A policy pivot age and the deduction amounts on each side of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PivotAdjustment {
    pub pivot_age: u32,
    pub deduction_below: f64,
    pub deduction_at_or_above: f64,
}

/// Raw per-year record as the optimization service sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawYear {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(rename = "Cash_Withdraw", default)]
    pub cash_withdraw: f64,
    #[serde(rename = "Brokerage_Balance", default)]
    pub brokerage_balance: f64,
    #[serde(rename = "Brokerage_Withdraw", default)]
    pub brokerage_withdraw: f64,
    #[serde(rename = "IRA_Balance", default)]
    pub ira_balance: f64,
    #[serde(rename = "IRA_Withdraw", default)]
    pub ira_withdraw: f64,
    /// Tidied to `ira_rmd`.
    #[serde(rename = "Required_RMD", default)]
    pub required_rmd: f64,
    #[serde(rename = "IRA_to_Roth", default)]
    pub ira_to_roth: f64,
    #[serde(rename = "Roth_Balance", default)]
    pub roth_balance: f64,
    #[serde(rename = "Roth_Withdraw", default)]
    pub roth_withdraw: f64,
    #[serde(rename = "CGD_Spendable", default)]
    pub cgd_spendable: f64,
    #[serde(rename = "Capital_Gains_Distribution", default)]
    pub capital_gains_distribution: f64,
    #[serde(rename = "Total_Capital_Gains", default)]
    pub total_capital_gains: f64,
    #[serde(rename = "Ordinary_Income", default)]
    pub ordinary_income: f64,
    #[serde(rename = "Fed_AGI", default)]
    pub fed_agi: f64,
    #[serde(rename = "Fed_Tax", default)]
    pub fed_tax: f64,
    #[serde(rename = "State_AGI", default)]
    pub state_agi: f64,
    #[serde(rename = "State_Tax", default)]
    pub state_tax: f64,
    #[serde(rename = "Total_Tax", default)]
    pub total_tax: f64,
    #[serde(rename = "Social_Security", default)]
    pub social_security: f64,
    #[serde(rename = "ACA_HC_Payment", default)]
    pub aca_hc_payment: f64,
    #[serde(rename = "ACA_Help", default)]
    pub aca_help: f64,
    /// Tidied to `available_spending`.
    #[serde(rename = "True_Spending", default)]
    pub true_spending: f64,
    #[serde(rename = "Excess", default)]
    pub excess: f64,
}

impl RawYear {
    fn into_point(self, fallback_age: u32) -> ProjectionPoint {
        ProjectionPoint {
            age: self.age.unwrap_or(fallback_age),
            cash_withdraw: self.cash_withdraw,
            brokerage_balance: self.brokerage_balance,
            brokerage_withdraw: self.brokerage_withdraw,
            ira_balance: self.ira_balance,
            ira_withdraw: self.ira_withdraw,
            ira_rmd: self.required_rmd,
            ira_to_roth: self.ira_to_roth,
            roth_balance: self.roth_balance,
            roth_withdraw: self.roth_withdraw,
            cgd_spendable: self.cgd_spendable,
            capital_gains_distribution: self.capital_gains_distribution,
            total_capital_gains: self.total_capital_gains,
            ordinary_income: self.ordinary_income,
            fed_agi: self.fed_agi,
            fed_tax: self.fed_tax,
            state_agi: self.state_agi,
            state_tax: self.state_tax,
            total_tax: self.total_tax,
            social_security: self.social_security,
            aca_hc_payment: self.aca_hc_payment,
            aca_help: self.aca_help,
            available_spending: self.true_spending,
            excess: self.excess,
        }
    }
}

/// Raw response body from the optimization service.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResponse {
    /// Year-index (stringified) to year record.
    pub retire: BTreeMap<String, RawYear>,
    #[serde(default)]
    pub federal: Option<FederalTaxData>,
    #[serde(default)]
    pub state: Option<StateTaxData>,
    #[serde(default)]
    pub spending_floor: Option<f64>,
    #[serde(default)]
    pub endofplan_assets: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One complete projection, ready for the chart orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionResult {
    /// Plan years sorted ascending by age. May be empty ("nothing to draw").
    pub years: Vec<ProjectionPoint>,
    pub federal: Option<FederalTaxData>,
    pub state: Option<StateTaxData>,
    pub spending_floor: Option<f64>,
    pub end_of_plan_assets: Option<f64>,
    pub status: Option<String>,
}

impl ProjectionResult {
    /// Tidy a raw response. `start_age` fills in ages for records that omit
    /// one, from the record's position in the `retire` map.
    pub fn from_response(raw: RawResponse, start_age: u32) -> Result<Self> {
        let mut years: Vec<ProjectionPoint> = raw
            .retire
            .into_iter()
            .map(|(index, year)| {
                let offset: u32 = index
                    .parse()
                    .with_context(|| format!("non-numeric year index {index:?}"))?;
                Ok(year.into_point(start_age + offset))
            })
            .collect::<Result<_>>()?;
        years.sort_by_key(|p| p.age);
        Ok(ProjectionResult {
            years,
            federal: raw.federal,
            state: raw.state,
            spending_floor: raw.spending_floor,
            end_of_plan_assets: raw.endofplan_assets,
            status: raw.status,
        })
    }

    /// Parse and tidy a JSON response body.
    pub fn from_json(body: &str, start_age: u32) -> Result<Self> {
        let raw: RawResponse =
            serde_json::from_str(body).context("malformed projection response")?;
        Self::from_response(raw, start_age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_round_trips_as_tuple() {
        let b: TaxBracket = serde_json::from_str("[0.22, 47150, 100525]").unwrap();
        assert_eq!(b.rate, 0.22);
        assert_eq!(b.from_income, 47150.0);
        assert!(!b.is_unbounded());
        let s = serde_json::to_string(&b).unwrap();
        assert_eq!(s, "[0.22,47150.0,100525.0]");
    }

    #[test]
    fn unbounded_sentinel() {
        let b: TaxBracket = serde_json::from_str("[0.37, 609350, 100000000]").unwrap();
        assert!(b.is_unbounded());
    }

    #[test]
    fn pivot_adjustment_adds_extra_deduction() {
        let fed = FederalTaxData {
            taxtable: vec![],
            cg_taxtable: vec![],
            nii: 200_000.0,
            standard_deduction: 15_000.0,
            standard_deduction_extra65: 2_000.0,
            status: "Single".into(),
        };
        let adj = fed.pivot_adjustment();
        assert_eq!(adj.pivot_age, FEDERAL_PIVOT_AGE);
        assert_eq!(adj.deduction_below, 15_000.0);
        assert_eq!(adj.deduction_at_or_above, 17_000.0);
    }
}
