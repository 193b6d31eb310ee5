use std::str::FromStr;

use ndarray::{Array2, ArrayView2, Axis};

/// Which way to normalize: along each feature (row) or each sample (column).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalizeAxis {
    Rows,
    Columns,
}

impl FromStr for NormalizeAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rows" | "row" => Ok(NormalizeAxis::Rows),
            "columns" | "cols" | "column" => Ok(NormalizeAxis::Columns),
            _ => Err(format!(
                "Invalid axis: {} (expected rows or columns)",
                s
            )),
        }
    }
}

///
/// Z-score normalize a matrix along one axis: subtract the slice mean and
/// divide by the sample standard deviation (ddof = 1, matching R's
/// `scale()`). Slices with zero variance come back as all zeros instead of
/// NaN, so constant features stay plottable.
///
pub fn zscore(data: ArrayView2<f64>, axis: NormalizeAxis) -> Array2<f64> {
    let mut out = data.to_owned();
    let along = match axis {
        NormalizeAxis::Rows => Axis(0),
        NormalizeAxis::Columns => Axis(1),
    };

    for mut slice in out.axis_iter_mut(along) {
        let n = slice.len() as f64;
        let mean = slice.sum() / n;
        let sd = if n > 1.0 {
            (slice.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        if sd > 0.0 {
            slice.mapv_inplace(|v| (v - mean) / sd);
        } else {
            slice.fill(0.0);
        }
    }

    out
}

/// Elementwise log2(x + 1), the usual variance-stabilizing pre-transform
/// for raw counts.
pub fn log2_plus_one(data: ArrayView2<f64>) -> Array2<f64> {
    data.mapv(|v| (v + 1.0).log2())
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(NormalizeAxis::Rows)]
    #[case(NormalizeAxis::Columns)]
    fn test_normalized_slices_have_zero_mean_unit_sd(#[case] axis: NormalizeAxis) {
        let data = array![
            [1.0, 5.0, 9.0, 2.0],
            [100.0, 80.0, 60.0, 40.0],
            [0.5, 0.1, 0.9, 0.4]
        ];
        let z = zscore(data.view(), axis);

        let along = match axis {
            NormalizeAxis::Rows => Axis(0),
            NormalizeAxis::Columns => Axis(1),
        };
        for slice in z.axis_iter(along) {
            let n = slice.len() as f64;
            let mean = slice.sum() / n;
            let var = slice.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
            assert!(mean.abs() < 1e-10, "mean was {}", mean);
            assert!((var - 1.0).abs() < 1e-10, "variance was {}", var);
        }
    }

    #[rstest]
    fn test_zero_variance_row_becomes_zeros() {
        let data = array![[3.0, 3.0, 3.0], [1.0, 2.0, 3.0]];
        let z = zscore(data.view(), NormalizeAxis::Rows);
        assert_eq!(z.row(0).to_vec(), vec![0.0, 0.0, 0.0]);
        assert!(z.row(1).iter().all(|v| v.is_finite()));
    }

    #[rstest]
    fn test_known_values() {
        // scale(c(2, 4, 6)) in R -> -1, 0, 1
        let data = array![[2.0, 4.0, 6.0]];
        let z = zscore(data.view(), NormalizeAxis::Rows);
        let row = z.row(0);
        assert!((row[0] + 1.0).abs() < 1e-12);
        assert!(row[1].abs() < 1e-12);
        assert!((row[2] - 1.0).abs() < 1e-12);
    }

    #[rstest]
    fn test_log2_plus_one() {
        let data = array![[0.0, 1.0, 3.0]];
        let logged = log2_plus_one(data.view());
        assert_eq!(logged.row(0).to_vec(), vec![0.0, 1.0, 2.0]);
    }
}
