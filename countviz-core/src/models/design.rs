use std::collections::HashMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::errors::DesignError;
use crate::utils::get_dynamic_reader;

///
/// DesignTable struct, the representation of an experimental-design table:
/// one row per sample, one column per factor (condition, timepoint, cell
/// count, ...). Values are kept as strings; they only ever drive plot
/// annotation, never arithmetic.
///
#[derive(Clone, Debug)]
pub struct DesignTable {
    pub sample_names: Vec<String>,
    pub factor_names: Vec<String>,
    values: Vec<Vec<String>>,
    sample_index: HashMap<String, usize>,
    pub path: Option<PathBuf>,
}

impl TryFrom<&Path> for DesignTable {
    type Error = DesignError;

    ///
    /// Create a new [DesignTable] from a tab-delimited file.
    ///
    /// The header names the factor columns; each following line is a sample
    /// name plus one value per factor.
    ///
    fn try_from(value: &Path) -> Result<Self, DesignError> {
        let reader = get_dynamic_reader(value)
            .map_err(|e| DesignError::Io(std::io::Error::other(e.to_string())))?;

        let mut factor_names: Vec<String> = Vec::new();
        let mut sample_names: Vec<String> = Vec::new();
        let mut values: Vec<Vec<String>> = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();

            if factor_names.is_empty() && sample_names.is_empty() {
                // Header may or may not carry a corner label; rows decide.
                factor_names = fields.iter().map(|s| s.to_string()).collect();
                continue;
            }

            if sample_names.is_empty() && fields.len() == factor_names.len() {
                // Header carried a corner label over the sample-name column.
                factor_names.remove(0);
            }
            if fields.len() != factor_names.len() + 1 {
                return Err(DesignError::RaggedRow {
                    line: line_no + 1,
                    expected: factor_names.len() + 1,
                    found: fields.len(),
                });
            }

            sample_names.push(fields[0].to_string());
            values.push(fields[1..].iter().map(|s| s.to_string()).collect());
        }

        if factor_names.is_empty() {
            return Err(DesignError::NoFactors(value.display().to_string()));
        }
        if sample_names.is_empty() {
            return Err(DesignError::EmptyDesign(value.display().to_string()));
        }

        let sample_index = sample_names
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();

        Ok(DesignTable {
            sample_names,
            factor_names,
            values,
            sample_index,
            path: Some(value.into()),
        })
    }
}

impl DesignTable {
    pub fn n_samples(&self) -> usize {
        self.sample_names.len()
    }

    fn factor_idx(&self, name: &str) -> Result<usize, DesignError> {
        self.factor_names
            .iter()
            .position(|f| f == name)
            .ok_or_else(|| DesignError::UnknownFactor(name.to_string()))
    }

    /// Values of one factor, reordered to match a caller-supplied sample
    /// order (typically the column order of a [CountMatrix]). Any sample
    /// missing from the design is an error.
    ///
    /// [CountMatrix]: crate::models::CountMatrix
    pub fn factor_values(
        &self,
        factor: &str,
        sample_order: &[String],
    ) -> Result<Vec<String>, DesignError> {
        let col = self.factor_idx(factor)?;
        sample_order
            .iter()
            .map(|s| {
                self.sample_index
                    .get(s)
                    .map(|&row| self.values[row][col].clone())
                    .ok_or_else(|| DesignError::UnknownSample(s.clone()))
            })
            .collect()
    }

    /// Unique values of one factor in first-appearance order.
    pub fn levels(&self, factor: &str) -> Result<Vec<String>, DesignError> {
        let col = self.factor_idx(factor)?;
        let mut levels: Vec<String> = Vec::new();
        for row in &self.values {
            if !levels.contains(&row[col]) {
                levels.push(row[col].clone());
            }
        }
        Ok(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write as _;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::NamedTempFile;

    const DESIGN: &str = "\
sample\tcondition\ttime\tncells
s1\tcontrol\t0h\t1200
s2\tcontrol\t6h\t980
s3\ttreated\t0h\t1100
s4\ttreated\t6h\t1050
";

    fn write_design(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[rstest]
    fn test_parse_design() {
        let file = write_design(DESIGN);
        let design = DesignTable::try_from(file.path()).unwrap();

        assert_eq!(design.n_samples(), 4);
        assert_eq!(design.factor_names, vec!["condition", "time", "ncells"]);
        assert_eq!(design.sample_names, vec!["s1", "s2", "s3", "s4"]);
    }

    #[rstest]
    fn test_factor_values_follow_caller_order() {
        let file = write_design(DESIGN);
        let design = DesignTable::try_from(file.path()).unwrap();

        let order = vec!["s3".to_string(), "s1".to_string()];
        let values = design.factor_values("condition", &order).unwrap();
        assert_eq!(values, vec!["treated", "control"]);
    }

    #[rstest]
    fn test_levels_in_first_appearance_order() {
        let file = write_design(DESIGN);
        let design = DesignTable::try_from(file.path()).unwrap();

        assert_eq!(design.levels("condition").unwrap(), vec!["control", "treated"]);
        assert_eq!(design.levels("time").unwrap(), vec!["0h", "6h"]);
    }

    #[rstest]
    fn test_unknown_factor_and_sample() {
        let file = write_design(DESIGN);
        let design = DesignTable::try_from(file.path()).unwrap();

        assert!(matches!(
            design.levels("batch").unwrap_err(),
            DesignError::UnknownFactor(_)
        ));
        assert!(matches!(
            design
                .factor_values("condition", &["s9".to_string()])
                .unwrap_err(),
            DesignError::UnknownSample(_)
        ));
    }
}
