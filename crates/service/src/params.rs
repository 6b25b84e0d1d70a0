//! Query parameters for the read operations, as received from the caller.
//!
//! Everything arrives stringly-typed (the surrounding transport is a query
//! string); validation here fails fast with a named-parameter error instead
//! of silently defaulting, except where the contract defines a default.

use std::str::FromStr;

use shopgauge_core::errors::DomainError;
use shopgauge_core::window::Interval;
use shopgauge_core::RankMetric;

pub const MAX_PRODUCT_LIMIT: u32 = 100;
pub const DEFAULT_PRODUCT_LIMIT: u32 = 10;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RangeParams {
    pub fn new(from: Option<&str>, to: Option<&str>) -> Self {
        Self { from: from.map(str::to_string), to: to.map(str::to_string) }
    }
}

#[derive(Clone, Debug, Default)]
pub struct OverviewParams {
    pub range: RangeParams,
    pub compare_from: Option<String>,
    pub compare_to: Option<String>,
}

impl OverviewParams {
    /// A comparison window requires both bounds; one without the other is a
    /// malformed request rather than a silent no-comparison.
    pub fn compare_range(&self) -> Result<Option<RangeParams>, DomainError> {
        match (&self.compare_from, &self.compare_to) {
            (Some(from), Some(to)) => {
                Ok(Some(RangeParams { from: Some(from.clone()), to: Some(to.clone()) }))
            }
            (None, None) => Ok(None),
            (Some(_), None) => Err(DomainError::InvalidParameter {
                param: "compareTo",
                value: String::new(),
                expected: "a date when compareFrom is given",
            }),
            (None, Some(_)) => Err(DomainError::InvalidParameter {
                param: "compareFrom",
                value: String::new(),
                expected: "a date when compareTo is given",
            }),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TrendParams {
    pub range: RangeParams,
    pub interval: Option<String>,
}

impl TrendParams {
    pub fn interval(&self) -> Result<Interval, DomainError> {
        match &self.interval {
            Some(raw) => Interval::from_str(raw),
            None => Ok(Interval::Day),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TopProductParams {
    pub range: RangeParams,
    pub limit: Option<String>,
    pub metric: Option<String>,
}

impl TopProductParams {
    pub fn limit(&self) -> Result<u32, DomainError> {
        let Some(raw) = &self.limit else { return Ok(DEFAULT_PRODUCT_LIMIT) };
        let parsed = raw.trim().parse::<u32>().map_err(|_| DomainError::InvalidParameter {
            param: "limit",
            value: raw.clone(),
            expected: "an integer in 1..=100",
        })?;
        if parsed == 0 || parsed > MAX_PRODUCT_LIMIT {
            return Err(DomainError::InvalidParameter {
                param: "limit",
                value: raw.clone(),
                expected: "an integer in 1..=100",
            });
        }
        Ok(parsed)
    }

    pub fn metric(&self) -> Result<RankMetric, DomainError> {
        match &self.metric {
            Some(raw) => RankMetric::from_str(raw),
            None => Ok(RankMetric::Revenue),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct InventoryRiskParamsInput {
    pub threshold: Option<String>,
    pub safety_days: Option<String>,
    pub window_days: Option<String>,
}

impl InventoryRiskParamsInput {
    pub fn threshold(&self) -> Result<Option<u32>, DomainError> {
        self.threshold
            .as_deref()
            .map(|raw| {
                raw.trim().parse::<u32>().map_err(|_| DomainError::InvalidParameter {
                    param: "threshold",
                    value: raw.to_string(),
                    expected: "a non-negative integer",
                })
            })
            .transpose()
    }

    pub fn safety_days(&self) -> Result<Option<f64>, DomainError> {
        self.safety_days
            .as_deref()
            .map(|raw| {
                let parsed =
                    raw.trim().parse::<f64>().map_err(|_| DomainError::InvalidParameter {
                        param: "safetyDays",
                        value: raw.to_string(),
                        expected: "a positive number of days",
                    })?;
                if !(parsed > 0.0) {
                    return Err(DomainError::InvalidParameter {
                        param: "safetyDays",
                        value: raw.to_string(),
                        expected: "a positive number of days",
                    });
                }
                Ok(parsed)
            })
            .transpose()
    }

    pub fn window_days(&self) -> Result<Option<u32>, DomainError> {
        self.window_days
            .as_deref()
            .map(|raw| {
                let parsed =
                    raw.trim().parse::<u32>().map_err(|_| DomainError::InvalidParameter {
                        param: "windowDays",
                        value: raw.to_string(),
                        expected: "a positive integer number of days",
                    })?;
                if parsed == 0 {
                    return Err(DomainError::InvalidParameter {
                        param: "windowDays",
                        value: raw.to_string(),
                        expected: "a positive integer number of days",
                    });
                }
                Ok(parsed)
            })
            .transpose()
    }
}
