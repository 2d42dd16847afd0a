//! Column-rule files.
//!
//! A rules file is a JSON array of rules:
//!
//! ```json
//! [
//!   {"column": "data_referencia", "kind": "date"},
//!   {"column": "created_at", "kind": "datetime"},
//!   {"column": "valor", "kind": "sentinel", "value": -100},
//!   {"column": "tipo_cub", "kind": "category", "mapping": {"Coluna_0": "CUB-medio"}}
//! ]
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::AppError;
use crate::repair::ColumnRule;

pub fn load_rules(path: &Path) -> Result<Vec<ColumnRule>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open rules file '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid rules file '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::repair::RuleKind;

    #[test]
    fn rules_file_round_trips_through_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"column": "valor", "kind": "sentinel", "value": -999}}]"#).unwrap();

        let rules = load_rules(file.path()).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].column, "valor");
        assert_eq!(rules[0].kind, RuleKind::Sentinel { value: -999.0 });
    }

    #[test]
    fn unknown_rule_kind_is_a_usage_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"column": "valor", "kind": "upper"}}]"#).unwrap();

        let err = load_rules(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Invalid rules file"));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_rules(Path::new("/nonexistent/rules.json")).unwrap_err();
        assert!(err.message().contains("Failed to open rules file"));
    }
}
