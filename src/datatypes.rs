use std::str::FromStr;

use indexmap::IndexMap;
use nalgebra::DMatrix;

use crate::error::StrainmapError;

/// Column positions of the physical quantities in a nodemap file.
///
/// The defaults match the Aramis export format. Every index must fall inside
/// `[0, row_length)` and no two quantities may share a column.
#[derive(Debug, Clone)]
pub struct NodemapLayout {
    pub row_length: usize,
    pub index_coor_x: usize,
    pub index_coor_y: usize,
    pub index_disp_x: usize,
    pub index_disp_y: usize,
    pub index_eps_x: usize,
    pub index_eps_y: usize,
    pub index_eps_xy: usize,
}

impl NodemapLayout {
    /// Creates a layout for a non-default export format
    ///
    /// # Arguments
    /// * `row_length` - The minimum number of columns per row
    /// * `indices` - Column indices in the order coor_x, coor_y, disp_x,
    ///     disp_y, eps_x, eps_y, eps_xy
    pub fn new(row_length: usize, indices: [usize; 7]) -> Result<NodemapLayout, StrainmapError> {
        let layout = NodemapLayout {
            row_length,
            index_coor_x: indices[0],
            index_coor_y: indices[1],
            index_disp_x: indices[2],
            index_disp_y: indices[3],
            index_eps_x: indices[4],
            index_eps_y: indices[5],
            index_eps_xy: indices[6],
        };

        layout.validate()?;

        Ok(layout)
    }

    /// Checks that all column indices are in range and pairwise distinct
    pub fn validate(&self) -> Result<(), StrainmapError> {
        let indices = [
            self.index_coor_x,
            self.index_coor_y,
            self.index_disp_x,
            self.index_disp_y,
            self.index_eps_x,
            self.index_eps_y,
            self.index_eps_xy,
        ];

        for (i, index) in indices.iter().enumerate() {
            if *index >= self.row_length {
                return Err(StrainmapError::Config(format!(
                    "Column index {} is outside the declared row length {}",
                    index, self.row_length
                )));
            }
            if indices[..i].contains(index) {
                return Err(StrainmapError::Config(format!(
                    "Column index {} is assigned to more than one quantity",
                    index
                )));
            }
        }

        Ok(())
    }
}

impl Default for NodemapLayout {
    fn default() -> NodemapLayout {
        NodemapLayout {
            row_length: 10,
            index_coor_x: 1,
            index_coor_y: 2,
            index_disp_x: 4,
            index_disp_y: 5,
            index_eps_x: 7,
            index_eps_y: 8,
            index_eps_xy: 9,
        }
    }
}

/// Side of the specimen a measurement was taken from.
///
/// The left camera view is mirrored into the canonical specimen frame, so
/// ground truth data loaded for `Left` is flipped left-to-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl FromStr for Side {
    type Err = StrainmapError;

    fn from_str(s: &str) -> Result<Side, StrainmapError> {
        match s {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(StrainmapError::Config(format!(
                "Unrecognized specimen side '{}'. Expected 'left' or 'right'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Physical data of one nodemap, stored as index-aligned columns.
///
/// All columns have the same length; `eps_vm` is unset until
/// [`NodemapData::calc_eps_vm`] runs.
#[derive(Debug, Clone)]
pub struct NodemapData {
    pub coor_x: Vec<f64>,
    pub coor_y: Vec<f64>,
    pub disp_x: Vec<f64>,
    pub disp_y: Vec<f64>,
    pub eps_x: Vec<f64>,
    pub eps_y: Vec<f64>,
    pub eps_xy: Vec<f64>,
    pub eps_vm: Option<Vec<f64>>,
}

impl NodemapData {
    /// Builds a dataset from caller-supplied columns instead of a nodemap file
    ///
    /// # Arguments
    /// * `columns` - Columns in the order coor_x, coor_y, disp_x, disp_y,
    ///     eps_x, eps_y, eps_xy. All must have the same length.
    pub fn from_columns(columns: [Vec<f64>; 7]) -> Result<NodemapData, StrainmapError> {
        let n = columns[0].len();

        if columns.iter().any(|c| c.len() != n) {
            return Err(StrainmapError::Config(
                "Data columns must all have the same length".to_string(),
            ));
        }

        let [coor_x, coor_y, disp_x, disp_y, eps_x, eps_y, eps_xy] = columns;

        Ok(NodemapData {
            coor_x,
            coor_y,
            disp_x,
            disp_y,
            eps_x,
            eps_y,
            eps_xy,
            eps_vm: None,
        })
    }

    /// The number of measurement points in the dataset
    pub fn len(&self) -> usize {
        self.coor_x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coor_x.is_empty()
    }

    /// Calculates the Von Mises equivalent strain per measurement point
    ///
    /// The result is stored on the dataset and returned.
    pub fn calc_eps_vm(&mut self) -> &[f64] {
        let eps_vm: Vec<f64> = self
            .eps_x
            .iter()
            .zip(&self.eps_y)
            .zip(&self.eps_xy)
            .map(|((&eps_x, &eps_y), &eps_xy)| {
                2.0 / 3.0
                    * f64::sqrt(3.0 / 2.0 * (eps_x * eps_x + eps_y * eps_y) + 3.0 * eps_xy * eps_xy)
            })
            .collect();

        self.eps_vm.insert(eps_vm).as_slice()
    }
}

/// Aligned collections produced by a batch import.
///
/// `ground_truths` is `None` when the batch was imported without targets;
/// otherwise both maps carry the same keys in the same order.
#[derive(Debug)]
pub struct ImportedData {
    pub inputs: IndexMap<String, NodemapData>,
    pub ground_truths: Option<IndexMap<String, DMatrix<f64>>>,
}
