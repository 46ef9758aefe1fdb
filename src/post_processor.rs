use std::fmt::Write as _;
use std::path::Path;

use nalgebra::DMatrix;

use crate::{datatypes::ImportedData, error::StrainmapError};

/// Writes an imported batch to CSV files
///
/// Each dataset lands in `<output_dir>/<key>.csv`; ground truth matrices,
/// when present, land in `<output_dir>/<key>_target.csv`.
///
/// # Arguments
/// * `imported` - The result of a batch import
/// * `output_dir` - The directory for the CSV files, created if missing
pub fn csv_output(imported: &ImportedData, output_dir: &Path) -> Result<(), StrainmapError> {
    if let Err(err) = std::fs::create_dir_all(output_dir) {
        return Err(StrainmapError::FileAccess(format!(
            "Failed to create output directory {}: {}",
            output_dir.display(),
            err
        )));
    }

    for (key, data) in &imported.inputs {
        let mut contents =
            String::from("coor_x,coor_y,disp_x,disp_y,eps_x,eps_y,eps_xy,eps_vm\n");

        for i in 0..data.len() {
            let eps_vm = data.eps_vm.as_ref().map_or(f64::NAN, |values| values[i]);
            writeln!(
                contents,
                "{},{},{},{},{},{},{},{}",
                data.coor_x[i],
                data.coor_y[i],
                data.disp_x[i],
                data.disp_y[i],
                data.eps_x[i],
                data.eps_y[i],
                data.eps_xy[i],
                eps_vm,
            )
            .unwrap();
        }

        write_file(&output_dir.join(format!("{}.csv", key)), &contents)?;
    }

    if let Some(ground_truths) = &imported.ground_truths {
        for (key, matrix) in ground_truths {
            write_file(
                &output_dir.join(format!("{}_target.csv", key)),
                &matrix_csv(matrix),
            )?;
        }
    }

    println!(
        "info: wrote {} dataset(s) to {}",
        imported.inputs.len(),
        output_dir.display()
    );

    Ok(())
}

fn matrix_csv(matrix: &DMatrix<f64>) -> String {
    let mut contents = String::new();

    for row in 0..matrix.nrows() {
        let line: Vec<String> = (0..matrix.ncols())
            .map(|col| matrix[(row, col)].to_string())
            .collect();
        contents.push_str(&line.join(","));
        contents.push('\n');
    }

    contents
}

fn write_file(path: &Path, contents: &str) -> Result<(), StrainmapError> {
    match std::fs::write(path, contents) {
        Ok(()) => Ok(()),
        Err(err) => Err(StrainmapError::FileAccess(format!(
            "Failed to write {}: {}",
            path.display(),
            err
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::NodemapData;
    use indexmap::IndexMap;

    fn sample_data() -> NodemapData {
        let mut data = NodemapData::from_columns([
            vec![10.0, 11.0],
            vec![20.0, 21.0],
            vec![0.1, 0.3],
            vec![0.2, 0.4],
            vec![0.015, 0.03],
            vec![0.025, 0.04],
            vec![0.05, 0.1],
        ])
        .unwrap();
        data.calc_eps_vm();
        data
    }

    #[test]
    fn writes_one_csv_per_dataset() {
        let dir = tempfile::tempdir().unwrap();

        let mut inputs = IndexMap::new();
        inputs.insert("a.txt_right".to_string(), sample_data());

        let imported = ImportedData {
            inputs,
            ground_truths: None,
        };

        csv_output(&imported, dir.path()).unwrap();

        let contents =
            std::fs::read_to_string(dir.path().join("a.txt_right.csv")).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("coor_x,coor_y"));
        assert!(lines[1].starts_with("10,20,"));
    }

    #[test]
    fn writes_ground_truth_matrices() {
        let dir = tempfile::tempdir().unwrap();

        let mut inputs = IndexMap::new();
        inputs.insert("a.txt_left".to_string(), sample_data());

        let mut ground_truths = IndexMap::new();
        ground_truths.insert(
            "a.txt_left".to_string(),
            DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]),
        );

        let imported = ImportedData {
            inputs,
            ground_truths: Some(ground_truths),
        };

        csv_output(&imported, dir.path()).unwrap();

        let contents =
            std::fs::read_to_string(dir.path().join("a.txt_left_target.csv")).unwrap();
        assert_eq!(contents, "1,2\n3,4\n");
    }
}
