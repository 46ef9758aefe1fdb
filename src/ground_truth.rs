use std::path::{Path, PathBuf};

use nalgebra::DMatrix;

use crate::{datatypes::Side, error::StrainmapError};

/// Derives the side-specific companion path of a ground truth file
///
/// The base path is expected to end in a dot-three extension; its last four
/// characters are replaced by `_<side>.txt`.
fn side_path(base_path: &Path, side: Side) -> Result<PathBuf, StrainmapError> {
    let base = base_path.to_string_lossy();

    let cut = match base.char_indices().rev().nth(3) {
        Some((index, _)) => index,
        None => {
            return Err(StrainmapError::Config(format!(
                "Ground truth base path '{}' is too short to carry a .xxx extension",
                base
            )))
        }
    };

    Ok(PathBuf::from(format!("{}_{}.txt", &base[..cut], side)))
}

/// Reverses the column order of a matrix
fn fliplr(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let ncols = matrix.ncols();
    DMatrix::from_fn(matrix.nrows(), ncols, |row, col| {
        matrix[(row, ncols - 1 - col)]
    })
}

/// Loads the ground truth matrix for one measurement
///
/// The file is whitespace-delimited numeric text with no header. Data taken
/// from the left side of the specimen is mirrored left-to-right into the
/// canonical specimen frame.
///
/// # Arguments
/// * `base_path` - The ground truth path before side resolution, ending in a
///     dot-three extension
/// * `side` - The side of the specimen
///
/// # Returns
/// The ground truth values as a matrix
pub fn load(base_path: &Path, side: Side) -> Result<DMatrix<f64>, StrainmapError> {
    let path = side_path(base_path, side)?;

    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(err) => {
            return Err(StrainmapError::FileAccess(format!(
                "Unable to open ground truth file {}: {}",
                path.display(),
                err
            )))
        }
    };

    let mut values: Vec<f64> = Vec::new();
    let mut ncols: Option<usize> = None;
    let mut nrows = 0;

    for (line_no, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let mut width = 0;
        for token in line.split_whitespace() {
            match token.parse::<f64>() {
                Ok(value) => {
                    values.push(value);
                    width += 1;
                }
                Err(_) => {
                    return Err(StrainmapError::Parse(format!(
                        "Non-numeric token '{}' on line {} of {}",
                        token,
                        line_no + 1,
                        path.display()
                    )))
                }
            }
        }

        match ncols {
            None => ncols = Some(width),
            Some(expected) if width != expected => {
                return Err(StrainmapError::Parse(format!(
                    "Line {} of {} has {} values, expected {}",
                    line_no + 1,
                    path.display(),
                    width,
                    expected
                )));
            }
            Some(_) => {}
        }

        nrows += 1;
    }

    let matrix = DMatrix::from_row_iterator(nrows, ncols.unwrap_or(0), values);

    Ok(match side {
        Side::Left => fliplr(&matrix),
        Side::Right => matrix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn write_ground_truth(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn derives_the_companion_path() {
        let path = side_path(Path::new("data/stage_0042.txt"), Side::Left).unwrap();
        assert_eq!(path, PathBuf::from("data/stage_0042_left.txt"));
    }

    #[test]
    fn rejects_a_base_path_too_short_to_strip() {
        let result = side_path(Path::new("abc"), Side::Right);
        assert!(matches!(result, Err(StrainmapError::Config(_))));
    }

    #[test]
    fn right_side_is_loaded_unmodified() {
        let dir = tempfile::tempdir().unwrap();
        write_ground_truth(dir.path(), "stage_right.txt", "1 2 3\n4 5 6\n");

        let matrix = load(&dir.path().join("stage.txt"), Side::Right).unwrap();

        assert_eq!((matrix.nrows(), matrix.ncols()), (2, 3));
        assert_relative_eq!(matrix[(0, 0)], 1.0);
        assert_relative_eq!(matrix[(1, 2)], 6.0);
    }

    #[test]
    fn left_side_is_mirrored() {
        let dir = tempfile::tempdir().unwrap();
        write_ground_truth(dir.path(), "stage_left.txt", "1 2 3\n4 5 6\n");
        write_ground_truth(dir.path(), "stage_right.txt", "1 2 3\n4 5 6\n");

        let left = load(&dir.path().join("stage.txt"), Side::Left).unwrap();
        let right = load(&dir.path().join("stage.txt"), Side::Right).unwrap();

        for row in 0..2 {
            for col in 0..3 {
                assert_relative_eq!(left[(row, col)], right[(row, 2 - col)]);
            }
        }
    }

    #[test]
    fn double_mirror_restores_the_matrix() {
        let matrix = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(fliplr(&fliplr(&matrix)), matrix);
    }

    #[test]
    fn rejects_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        write_ground_truth(dir.path(), "stage_right.txt", "1 2 3\n4 5\n");

        let result = load(&dir.path().join("stage.txt"), Side::Right);
        assert!(matches!(result, Err(StrainmapError::Parse(_))));
    }

    #[test]
    fn rejects_non_numeric_tokens() {
        let dir = tempfile::tempdir().unwrap();
        write_ground_truth(dir.path(), "stage_right.txt", "1 2 oops\n");

        let result = load(&dir.path().join("stage.txt"), Side::Right);
        assert!(matches!(result, Err(StrainmapError::Parse(_))));
    }

    #[test]
    fn missing_file_is_a_file_access_error() {
        let dir = tempfile::tempdir().unwrap();

        let result = load(&dir.path().join("stage.txt"), Side::Right);
        assert!(matches!(result, Err(StrainmapError::FileAccess(_))));
    }
}
