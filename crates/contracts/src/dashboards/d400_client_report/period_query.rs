use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Month abbreviations used in period labels, index 0 = January
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Raw query parameters accepted by every report route
///
/// `/report/view/1001?year=2024&months=1%2C3&branches=01%2C02`
/// `/report/pdf/1001?periodo=Janeiro/2024` (legacy form)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periodo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodQueryError {
    #[error("invalid year: {0}")]
    InvalidYear(String),
    #[error("invalid month: {0}")]
    InvalidMonth(String),
    #[error("at least one month is required")]
    NoMonths,
    #[error("at least one branch is required")]
    NoBranches,
}

/// Period filter applied to a report: one year, a non-empty set of months
/// and a non-empty list of branch codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodQuery {
    pub year: i32,
    /// Ascending, without duplicates, each in 1..=12
    pub months: Vec<u32>,
    /// Branch codes in selection order
    pub branches: Vec<String>,
}

impl PeriodQuery {
    pub fn new(year: i32, months: impl IntoIterator<Item = u32>, branches: Vec<String>) -> Self {
        let mut months: Vec<u32> = months.into_iter().filter(|m| (1..=12).contains(m)).collect();
        months.sort_unstable();
        months.dedup();
        Self {
            year,
            months,
            branches,
        }
    }

    /// Builds `year=…&months=…&branches=…`, lists comma-joined and percent-encoded.
    pub fn to_query_string(&self) -> String {
        let months = self
            .months
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let branches = self.branches.join(",");

        format!(
            "year={}&months={}&branches={}",
            urlencoding::encode(&self.year.to_string()),
            urlencoding::encode(&months),
            urlencoding::encode(&branches)
        )
    }

    /// Parses raw params. `Ok(None)` when no `year` is given, which is the
    /// legacy `periodo`-only form.
    pub fn from_params(params: &ReportParams) -> Result<Option<Self>, PeriodQueryError> {
        let year = match params.year.as_deref().map(str::trim) {
            None | Some("") => return Ok(None),
            Some(raw) => raw
                .parse::<i32>()
                .ok()
                .filter(|y| (1900..=9999).contains(y))
                .ok_or_else(|| PeriodQueryError::InvalidYear(raw.to_string()))?,
        };

        let mut months = Vec::new();
        for part in split_list(params.months.as_deref()) {
            let month = part
                .parse::<u32>()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .ok_or_else(|| PeriodQueryError::InvalidMonth(part.to_string()))?;
            months.push(month);
        }
        if months.is_empty() {
            return Err(PeriodQueryError::NoMonths);
        }

        let branches: Vec<String> = split_list(params.branches.as_deref())
            .map(str::to_string)
            .collect();
        if branches.is_empty() {
            return Err(PeriodQueryError::NoBranches);
        }

        Ok(Some(Self::new(year, months, branches)))
    }

    pub fn includes_month(&self, month: u32) -> bool {
        self.months.contains(&month)
    }

    /// "2024" for the whole year, otherwise "Jan, Mar, Dez/2024"
    pub fn period_label(&self) -> String {
        if self.months.len() == 12 {
            return self.year.to_string();
        }
        let names = self
            .months
            .iter()
            .filter_map(|m| month_abbreviation(*m))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}/{}", names, self.year)
    }
}

/// "Jan" for 1 ... "Dez" for 12
pub fn month_abbreviation(month: u32) -> Option<&'static str> {
    (month as usize)
        .checked_sub(1)
        .and_then(|i| MONTH_ABBREVIATIONS.get(i))
        .copied()
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(year: &str, months: &str, branches: &str) -> ReportParams {
        ReportParams {
            year: Some(year.into()),
            months: Some(months.into()),
            branches: Some(branches.into()),
            periodo: None,
        }
    }

    #[test]
    fn test_query_string_order_and_encoding() {
        let query = PeriodQuery::new(2024, [1, 3, 12], vec!["01".into(), "02".into()]);
        assert_eq!(
            query.to_query_string(),
            "year=2024&months=1%2C3%2C12&branches=01%2C02"
        );
    }

    #[test]
    fn test_new_sorts_and_dedups_months() {
        let query = PeriodQuery::new(2023, [12, 1, 3, 3, 0, 13], vec!["A".into()]);
        assert_eq!(query.months, vec![1, 3, 12]);
    }

    #[test]
    fn test_from_params_parses_lists() {
        let parsed = PeriodQuery::from_params(&params("2024", "3, 1,,12", "02,01"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.year, 2024);
        assert_eq!(parsed.months, vec![1, 3, 12]);
        assert_eq!(parsed.branches, vec!["02".to_string(), "01".to_string()]);
    }

    #[test]
    fn test_from_params_without_year_is_legacy() {
        let legacy = ReportParams {
            periodo: Some("Janeiro/2024".into()),
            ..Default::default()
        };
        assert_eq!(PeriodQuery::from_params(&legacy), Ok(None));
    }

    #[test]
    fn test_from_params_errors() {
        assert_eq!(
            PeriodQuery::from_params(&params("abc", "1", "01")),
            Err(PeriodQueryError::InvalidYear("abc".into()))
        );
        assert_eq!(
            PeriodQuery::from_params(&params("2024", "1,13", "01")),
            Err(PeriodQueryError::InvalidMonth("13".into()))
        );
        assert_eq!(
            PeriodQuery::from_params(&params("2024", " , ", "01")),
            Err(PeriodQueryError::NoMonths)
        );
        assert_eq!(
            PeriodQuery::from_params(&params("2024", "1", "")),
            Err(PeriodQueryError::NoBranches)
        );
    }

    #[test]
    fn test_period_label() {
        let full = PeriodQuery::new(2024, 1..=12, vec!["01".into()]);
        assert_eq!(full.period_label(), "2024");

        let partial = PeriodQuery::new(2024, [1, 3, 12], vec!["01".into()]);
        assert_eq!(partial.period_label(), "Jan, Mar, Dez/2024");
    }

    #[test]
    fn test_period_label_skips_months_out_of_range() {
        let query = PeriodQuery {
            year: 2024,
            months: vec![0, 2, 13],
            branches: vec!["01".into()],
        };
        assert_eq!(query.period_label(), "Fev/2024");
        assert_eq!(month_abbreviation(0), None);
        assert_eq!(month_abbreviation(12), Some("Dez"));
    }
}
