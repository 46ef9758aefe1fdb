use std::path::Path;

use encoding_rs::WINDOWS_1252;

use crate::{
    datatypes::{NodemapData, NodemapLayout},
    error::StrainmapError,
};

/// Parses a nodemap file into per-point data columns
///
/// Nodemap files are `;`-delimited Windows-1252 text, one measurement point
/// per line. A row missing a value in any column is dropped entirely; normal
/// strains are converted from percent to fractions.
///
/// # Arguments
/// * `path` - The path to the nodemap file
/// * `layout` - The column layout of the export format
///
/// # Returns
/// A NodemapData instance without the derived Von Mises column
pub fn parse(path: &Path, layout: &NodemapLayout) -> Result<NodemapData, StrainmapError> {
    layout.validate()?;

    let raw = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            return Err(StrainmapError::FileAccess(format!(
                "Unable to open nodemap file {}: {}",
                path.display(),
                err
            )))
        }
    };

    let (contents, _, _) = WINDOWS_1252.decode(&raw);

    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut row: Vec<f64> = Vec::with_capacity(layout.row_length);

        for token in line.split(';') {
            let token = token.trim();

            // empty fields mark a missing measurement value
            if token.is_empty() {
                row.push(f64::NAN);
                continue;
            }

            match token.parse::<f64>() {
                Ok(value) => row.push(value),
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

        if row.len() < layout.row_length {
            return Err(StrainmapError::Parse(format!(
                "Line {} of {} has {} columns, expected at least {}",
                line_no + 1,
                path.display(),
                row.len(),
                layout.row_length
            )));
        }

        // a missing value anywhere voids the whole measurement point
        if row.iter().any(|value| value.is_nan()) {
            continue;
        }

        rows.push(row);
    }

    let column = |index: usize| -> Vec<f64> { rows.iter().map(|row| row[index]).collect() };

    Ok(NodemapData {
        coor_x: column(layout.index_coor_x),
        coor_y: column(layout.index_coor_y),
        disp_x: column(layout.index_disp_x),
        disp_y: column(layout.index_disp_y),
        // normal strains are exported in percent, shear strain is not
        eps_x: rows.iter().map(|row| row[layout.index_eps_x] / 100.0).collect(),
        eps_y: rows.iter().map(|row| row[layout.index_eps_y] / 100.0).collect(),
        eps_xy: column(layout.index_eps_xy),
        eps_vm: None,
    })
}

/// Parses a nodemap file and derives the Von Mises strain in one step
///
/// # Arguments
/// * `path` - The path to the nodemap file
/// * `layout` - The column layout of the export format
///
/// # Returns
/// A fully populated NodemapData instance
pub fn load(path: &Path, layout: &NodemapLayout) -> Result<NodemapData, StrainmapError> {
    let mut data = parse(path, layout)?;
    data.calc_eps_vm();

    Ok(data)
}
