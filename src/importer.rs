use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;

use crate::{
    datatypes::{ImportedData, NodemapLayout, Side},
    error::StrainmapError,
    ground_truth, nodemap,
};

/// Receives batch progress as each nodemap starts importing
pub trait ImportObserver {
    fn on_nodemap(&mut self, index: usize, total: usize, name: &str);
}

/// Imports a batch of nodemaps and their ground truth data
///
/// Nodemaps are processed in ascending stage order, so the keys of the
/// returned collections are deterministic no matter how the caller assembled
/// the map. The first failing file aborts the whole batch.
///
/// # Arguments
/// * `nodemaps` - Nodemap filenames by stage number
/// * `data_path` - Data folder containing the sub-folders `Nodemaps` and,
///     when targets exist, `GroundTruth`
/// * `side` - The side of the specimen
/// * `exists_target` - Whether ground truth data is available for this batch
/// * `observer` - Optional progress callback
///
/// # Returns
/// The imported datasets and, when targets exist, the ground truth matrices
/// under the same keys
pub fn import_all(
    nodemaps: &BTreeMap<u32, String>,
    data_path: &Path,
    side: Side,
    exists_target: bool,
    mut observer: Option<&mut dyn ImportObserver>,
) -> Result<ImportedData, StrainmapError> {
    let layout = NodemapLayout::default();
    let total = nodemaps.len();

    let mut inputs: IndexMap<String, _> = IndexMap::with_capacity(total);
    let mut ground_truths = if exists_target {
        Some(IndexMap::with_capacity(total))
    } else {
        None
    };

    for (index, name) in nodemaps.values().enumerate() {
        if let Some(observer) = observer.as_mut() {
            observer.on_nodemap(index, total, name);
        }

        let key = format!("{}_{}", name, side);

        let data = nodemap::load(&data_path.join("Nodemaps").join(name), &layout)?;
        inputs.insert(key.clone(), data);

        if let Some(ground_truths) = ground_truths.as_mut() {
            let matrix = ground_truth::load(&data_path.join("GroundTruth").join(name), side)?;
            ground_truths.insert(key, matrix);
        }
    }

    Ok(ImportedData {
        inputs,
        ground_truths,
    })
}
