//! Type Mapper
//!
//! Infers a column's storage type from its values. A column is first
//! classified into a value domain, which then maps onto a SQL type.

use crate::database::schema::ColumnType;

/// Values treated as missing (after trimming surrounding whitespace)
pub const MISSING_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "<NA>",
];

/// Value domain of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDomain {
    /// Every value is a 64-bit integer and none is missing
    Integral,
    /// Every present value is a real number
    Real,
    /// Mixed or non-numeric values
    Text,
}

/// Whether a raw field counts as a missing value
pub fn is_missing(value: &str) -> bool {
    MISSING_MARKERS.contains(&value.trim())
}

/// Classify a column from its values; `None` marks a missing value
///
/// An integral column with gaps becomes real, and so does a column whose
/// values are all missing. A column with no values at all (a header-only
/// file) is text.
pub fn infer_domain<'a, I>(values: I) -> ValueDomain
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut integral = true;
    let mut has_missing = false;
    let mut seen_any = false;

    for value in values {
        seen_any = true;
        let Some(value) = value else {
            has_missing = true;
            continue;
        };
        let value = value.trim();

        if integral && value.parse::<i64>().is_ok() {
            continue;
        }
        integral = false;

        if value.parse::<f64>().is_err() {
            return ValueDomain::Text;
        }
    }

    if !seen_any {
        ValueDomain::Text
    } else if integral && !has_missing {
        ValueDomain::Integral
    } else {
        ValueDomain::Real
    }
}

/// Map a value domain onto the SQL type used for the column
pub fn map_domain_to_sql(domain: ValueDomain) -> ColumnType {
    match domain {
        ValueDomain::Integral => ColumnType::Integer,
        ValueDomain::Real => ColumnType::Float,
        ValueDomain::Text => ColumnType::Text,
    }
}

/// Infer the SQL type of a column directly from its values
pub fn infer_column_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    map_domain_to_sql(infer_domain(values))
}
