//! FILENAME: core/chart-support/src/labels.rs
//! Presentation labels for column names, series names and category cells.

use table::{Table, TableError, Value};

/// The cleaned table together with the cleaned form of the requested names.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedLabels {
    pub table: Table,
    /// Same order as the names passed in.
    pub names: Vec<String>,
}

pub trait LabelCleaner {
    /// Cleans the table's column names and text cells, and the given names
    /// (series to plot, legend entries...). Names also get the substitutions
    /// column names skip, so a substituted name no longer matches its column.
    fn clean(
        &self,
        table: &Table,
        names: &[&str],
        preserve_upper: &[&str],
        substitutions: &[(String, String)],
    ) -> Result<CleanedLabels, TableError>;
}

/// `snake_case` to `Title Case`, with acronyms kept upper-case.
///
/// - Column names: underscores become spaces, words are title-cased and
///   words listed in `preserve_upper` are upper-cased.
/// - Text cells: substitutions only.
/// - Names: title-cased like columns, then substituted.
///
/// Substitutions apply in order, each replacing every occurrence.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleCaseCleaner;

impl LabelCleaner for TitleCaseCleaner {
    fn clean(
        &self,
        table: &Table,
        names: &[&str],
        preserve_upper: &[&str],
        substitutions: &[(String, String)],
    ) -> Result<CleanedLabels, TableError> {
        let preserve: Vec<String> = preserve_upper.iter().map(|w| w.to_uppercase()).collect();

        let renamed = table.rename_columns(|name| title_words(name, &preserve))?;
        let table = renamed.map_values(|value| match value {
            Value::Text(text) => Value::Text(substitute(text, substitutions)),
            other => other.clone(),
        });

        let names = names
            .iter()
            .map(|name| substitute(&title_words(name, &preserve), substitutions))
            .collect();

        Ok(CleanedLabels { table, names })
    }
}

/// Title-cases `text` the way Python's `str.title` does: every letter that
/// follows a non-letter is upper-cased, every other letter lower-cased.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }
    result
}

fn title_words(text: &str, preserve: &[String]) -> String {
    title_case(&text.replace('_', " "))
        .split(' ')
        .map(|word| {
            let upper = word.to_uppercase();
            if preserve.contains(&upper) {
                upper
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn substitute(text: &str, substitutions: &[(String, String)]) -> String {
    substitutions
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use table::Column;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("daily active users"), "Daily Active Users");
        assert_eq!(title_case("TVL usd"), "Tvl Usd");
        assert_eq!(title_case("l2 fees"), "L2 Fees");
        assert_eq!(title_case("o'neil"), "O'Neil");
    }

    #[test]
    fn test_clean_columns_names_and_cells() {
        let table = Table::from_columns(vec![
            Column::text("dex_name", ["uniswap_v3", "curve"]),
            Column::numeric("tvl_usd", [1.0, 2.0]),
        ])
        .unwrap();
        let substitutions = vec![("_v3".to_string(), " V3".to_string())];

        let cleaned = TitleCaseCleaner
            .clean(&table, &["tvl_usd", "dex_name"], &["tvl", "usd"], &substitutions)
            .unwrap();

        assert_eq!(cleaned.table.column_names(), vec!["Dex Name", "TVL USD"]);
        assert_eq!(cleaned.names, vec!["TVL USD", "Dex Name"]);
        assert_eq!(cleaned.table.labels("Dex Name").unwrap(), vec!["uniswap V3", "curve"]);
    }

    #[test]
    fn test_substituted_names_leave_columns_alone() {
        let table = Table::from_columns(vec![Column::numeric("ethereum_l1", [1.0])]).unwrap();
        let substitutions = vec![("Ethereum L1".to_string(), "Ethereum".to_string())];

        let cleaned = TitleCaseCleaner
            .clean(&table, &["ethereum_l1"], &["l1"], &substitutions)
            .unwrap();
        assert_eq!(cleaned.table.column_names(), vec!["Ethereum L1"]);
        assert_eq!(cleaned.names, vec!["Ethereum"]);
        assert!(!cleaned.table.has_column(&cleaned.names[0]));
    }

    #[test]
    fn test_substitutions_apply_in_order() {
        let substitutions = vec![
            ("Eth".to_string(), "ETH".to_string()),
            ("ETH Fees".to_string(), "Ethereum Fees".to_string()),
        ];
        let table = Table::from_columns(vec![Column::numeric("v", [1.0])]).unwrap();
        let cleaned = TitleCaseCleaner.clean(&table, &["eth_fees"], &[], &substitutions).unwrap();
        assert_eq!(cleaned.names, vec!["Ethereum Fees"]);
    }

    #[test]
    fn test_cleaning_can_collide_names() {
        let table = Table::from_columns(vec![
            Column::numeric("fees", [1.0]),
            Column::numeric("Fees", [2.0]),
        ])
        .unwrap();
        assert_eq!(
            TitleCaseCleaner.clean(&table, &[], &[], &[]).unwrap_err(),
            TableError::DuplicateColumn("Fees".to_string())
        );
    }
}
