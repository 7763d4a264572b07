//! Required-column contract for a tabular input, independent of row content.

use std::collections::BTreeSet;

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Required columns absent from `columns`, compared trimmed and
/// case-insensitively. Returned in normalized form, sorted.
pub fn missing_columns<C, R>(columns: C, required: R) -> Vec<String>
where
    C: IntoIterator,
    C::Item: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let present: BTreeSet<String> = columns.into_iter().map(|c| normalize(c.as_ref())).collect();
    let required: BTreeSet<String> = required
        .into_iter()
        .map(|c| normalize(c.as_ref()))
        .collect();
    required.difference(&present).cloned().collect()
}

/// Whether `columns` is a superset of `required`.
///
/// Logs the missing set and the available columns when it is not.
pub fn validate_columns<C, R>(columns: C, required: R) -> bool
where
    C: IntoIterator + Clone,
    C::Item: AsRef<str>,
    R: IntoIterator,
    R::Item: AsRef<str>,
{
    let missing = missing_columns(columns.clone(), required);
    if missing.is_empty() {
        return true;
    }
    let available: Vec<String> = columns.into_iter().map(|c| normalize(c.as_ref())).collect();
    tracing::error!(?missing, ?available, "Missing required columns");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::REQUIRED_COLUMNS;

    const FULL_HEADER: &[&str] = &[
        "model",
        "year",
        "price",
        "transmission",
        "mileage",
        "fuelType",
        "tax",
        "mpg",
        "engineSize",
    ];

    #[test]
    fn exact_header_is_accepted() {
        assert!(validate_columns(FULL_HEADER, REQUIRED_COLUMNS));
    }

    #[test]
    fn comparison_ignores_case_and_padding() {
        let header = [
            " Model", "YEAR", "price ", "Transmission", "mileage", "FUELTYPE", "tax", "MPG",
            " engineSize ",
        ];
        assert!(validate_columns(header, REQUIRED_COLUMNS));
    }

    #[test]
    fn missing_price_is_rejected() {
        let header: Vec<&str> = FULL_HEADER.iter().copied().filter(|c| *c != "price").collect();
        assert!(!validate_columns(&header, REQUIRED_COLUMNS));
        assert_eq!(missing_columns(&header, REQUIRED_COLUMNS), vec!["price"]);
    }

    #[test]
    fn extra_columns_are_accepted() {
        let mut header = FULL_HEADER.to_vec();
        header.extend(["colour", "dealer_id"]);
        assert!(validate_columns(&header, REQUIRED_COLUMNS));
    }

    #[test]
    fn missing_set_is_sorted_and_normalized() {
        let missing = missing_columns(["model"], ["Year", "engineSize"]);
        assert_eq!(missing, vec!["enginesize", "year"]);
    }
}
