use std::collections::HashSet;
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::errors::CountMatrixError;
use crate::utils::{get_dynamic_reader, sample_variance};

///
/// CountMatrix struct, the representation of a dense numeric count table
/// (rows = genomic features, columns = samples) read from a
/// whitespace-delimited text file.
///
#[derive(Clone, Debug)]
pub struct CountMatrix {
    pub feature_names: Vec<String>,
    pub sample_names: Vec<String>,
    pub values: Array2<f64>,
    pub path: Option<PathBuf>,
}

impl TryFrom<&Path> for CountMatrix {
    type Error = CountMatrixError;

    ///
    /// Create a new [CountMatrix] from a delimited text file.
    ///
    /// The first line is a header of sample names. It may carry either as
    /// many fields as there are value columns, or one extra leading corner
    /// label (the layout R's `read.table` writes for row-named tables).
    /// Every following line is a feature name followed by numeric values,
    /// split on any run of whitespace. Gzipped files are read transparently.
    ///
    /// # Arguments:
    /// - value: path to the count table on disk.
    fn try_from(value: &Path) -> Result<Self, CountMatrixError> {
        let reader = get_dynamic_reader(value)
            .map_err(|e| CountMatrixError::FileReadError(e.to_string()))?;

        let mut sample_names: Vec<String> = Vec::new();
        let mut feature_names: Vec<String> = Vec::new();
        let mut data: Vec<f64> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut n_samples: usize = 0;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }

            if sample_names.is_empty() && feature_names.is_empty() {
                sample_names = fields.iter().map(|s| s.to_string()).collect();
                continue;
            }

            let name = fields[0].to_string();
            let row_values = &fields[1..];

            if n_samples == 0 {
                // First data row fixes the width; the header may have one
                // extra corner label in front of the sample names.
                n_samples = row_values.len();
                match sample_names.len() {
                    len if len == n_samples => {}
                    len if len == n_samples + 1 => {
                        sample_names.remove(0);
                    }
                    len => {
                        return Err(CountMatrixError::HeaderMismatch {
                            header: len,
                            data: n_samples,
                        });
                    }
                }
            } else if row_values.len() != n_samples {
                return Err(CountMatrixError::RaggedRow {
                    line: line_no + 1,
                    expected: n_samples,
                    found: row_values.len(),
                });
            }

            if !seen.insert(name.clone()) {
                return Err(CountMatrixError::DuplicateFeature(name));
            }

            for token in row_values {
                let parsed: f64 = token.parse().map_err(|_| CountMatrixError::NonNumericValue {
                    line: line_no + 1,
                    token: token.to_string(),
                })?;
                data.push(parsed);
            }
            feature_names.push(name);
        }

        if feature_names.is_empty() {
            return Err(CountMatrixError::EmptyMatrix(value.display().to_string()));
        }

        let values = Array2::from_shape_vec((feature_names.len(), n_samples), data)
            .expect("row-major buffer length matches parsed dimensions");

        Ok(CountMatrix {
            feature_names,
            sample_names,
            values,
            path: Some(value.into()),
        })
    }
}

impl CountMatrix {
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn n_samples(&self) -> usize {
        self.sample_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_names.is_empty()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Values for one sample (column), in feature order.
    pub fn column(&self, sample_idx: usize) -> ArrayView1<'_, f64> {
        self.values.column(sample_idx)
    }

    /// Subset to the `n` features with the highest sample variance across
    /// samples. Ties keep the original file order; `n` larger than the
    /// feature count returns the whole matrix.
    pub fn top_variable_features(&self, n: usize) -> CountMatrix {
        let mut ranked: Vec<(usize, f64)> = self
            .values
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(i, row)| (i, sample_variance(&row.to_vec())))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut keep: Vec<usize> = ranked.into_iter().take(n).map(|(i, _)| i).collect();
        keep.sort_unstable();

        let feature_names = keep.iter().map(|&i| self.feature_names[i].clone()).collect();
        let values = self.values.select(Axis(0), &keep);

        CountMatrix {
            feature_names,
            sample_names: self.sample_names.clone(),
            values,
            path: self.path.clone(),
        }
    }

    /// Write the matrix as a tab-delimited table with a corner-labeled
    /// header and row names. An existing file is overwritten.
    pub fn write_tsv(&self, path: &Path) -> Result<(), CountMatrixError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "feature\t{}", self.sample_names.join("\t"))?;
        for (name, row) in self.feature_names.iter().zip(self.values.axis_iter(Axis(0))) {
            let fields: Vec<String> = row.iter().map(|v| format!("{}", v)).collect();
            writeln!(writer, "{}\t{}", name, fields.join("\t"))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Replace the stored values while keeping names, e.g. after a
    /// normalization pass. Dimensions must match.
    pub fn with_values(&self, values: Array2<f64>) -> CountMatrix {
        assert_eq!(
            values.dim(),
            (self.n_features(), self.n_samples()),
            "replacement values must match matrix dimensions"
        );
        CountMatrix {
            feature_names: self.feature_names.clone(),
            sample_names: self.sample_names.clone(),
            values,
            path: self.path.clone(),
        }
    }
}

impl Display for CountMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CountMatrix ({} features x {} samples)",
            self.n_features(),
            self.n_samples()
        )
    }
}
