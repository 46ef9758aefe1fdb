use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use indicatif::ProgressBar;

mod datatypes;
mod error;
mod ground_truth;
mod importer;
mod nodemap;
mod post_processor;

use datatypes::Side;
use error::StrainmapError;
use importer::ImportObserver;

/// Imports DIC nodemap measurements and ground truth data into CSV datasets
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the import job json
    job: PathBuf,

    /// Directory for the exported CSV files
    #[arg(short, long, default_value = "out")]
    output: PathBuf,
}

#[derive(Debug)]
struct ImportJob {
    data_path: PathBuf,
    side: Side,
    exists_target: bool,
    nodemaps: BTreeMap<u32, String>,
}

/// Parses and validates the import job json
///
/// # Arguments
/// * `job_file` - The path to the job file
///
/// # Returns
/// An ImportJob instance
fn load_job(job_file: &Path) -> Result<ImportJob, StrainmapError> {
    let file_string = match std::fs::read_to_string(job_file) {
        Ok(f) => f,
        Err(_err) => {
            return Err(StrainmapError::FileAccess(format!(
                "Unable to open job file {}",
                job_file.display()
            )))
        }
    };

    let job_json = match json::parse(&file_string) {
        Ok(j) => j,
        Err(err) => {
            return Err(StrainmapError::Parse(format!(
                "Error in job file json: {err}"
            )))
        }
    };

    if !job_json.has_key("data_path") {
        return Err(StrainmapError::Config(
            "Job json missing data_path field".to_string(),
        ));
    }
    if !job_json.has_key("side") {
        return Err(StrainmapError::Config(
            "Job json missing side field".to_string(),
        ));
    }
    if !job_json.has_key("nodemaps") {
        return Err(StrainmapError::Config(
            "Job json missing nodemaps field".to_string(),
        ));
    }

    let data_path = match job_json["data_path"].as_str() {
        Some(p) => PathBuf::from(p),
        None => {
            return Err(StrainmapError::Config(
                "Job json data_path field must be a string".to_string(),
            ))
        }
    };

    let side = match job_json["side"].as_str() {
        Some(s) => Side::from_str(s)?,
        None => {
            return Err(StrainmapError::Config(
                "Job json side field must be a string".to_string(),
            ))
        }
    };

    let exists_target = job_json["exists_target"].as_bool().unwrap_or(true);

    let mut nodemaps: BTreeMap<u32, String> = BTreeMap::new();
    for (stage, value) in job_json["nodemaps"].entries() {
        let stage_no: u32 = match stage.parse() {
            Ok(n) => n,
            Err(_) => {
                return Err(StrainmapError::Config(format!(
                    "Nodemap stage key '{}' is not an integer",
                    stage
                )))
            }
        };

        let name = match value.as_str() {
            Some(n) => n.to_string(),
            None => {
                return Err(StrainmapError::Config(format!(
                    "Nodemap entry for stage {} must be a filename string",
                    stage_no
                )))
            }
        };

        nodemaps.insert(stage_no, name);
    }

    if nodemaps.is_empty() {
        return Err(StrainmapError::Config(
            "Job json nodemaps field is empty".to_string(),
        ));
    }

    Ok(ImportJob {
        data_path,
        side,
        exists_target,
        nodemaps,
    })
}

/// Progress bar for the batch import
struct ImportObserverBar {
    bar: ProgressBar,
}

impl ImportObserverBar {
    fn new(total: u64) -> ImportObserverBar {
        ImportObserverBar {
            bar: ProgressBar::new(total),
        }
    }
}

impl ImportObserver for ImportObserverBar {
    fn on_nodemap(&mut self, index: usize, _total: usize, _name: &str) {
        self.bar.set_position(index as u64);
    }
}

fn run(args: &Args) -> Result<(), StrainmapError> {
    let job = load_job(&args.job)?;

    println!(
        "info: importing {} nodemap(s) for the {} side of the specimen...",
        job.nodemaps.len(),
        job.side
    );

    let mut observer = ImportObserverBar::new(job.nodemaps.len() as u64);
    let imported = importer::import_all(
        &job.nodemaps,
        &job.data_path,
        job.side,
        job.exists_target,
        Some(&mut observer),
    )?;
    observer.bar.finish();

    post_processor::csv_output(&imported, &args.output)?;

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(err) = run(&args) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_job(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_a_complete_job() {
        let file = write_job(
            r#"{
                "data_path": "data/S950",
                "side": "left",
                "exists_target": false,
                "nodemaps": { "3": "c.txt", "1": "a.txt" }
            }"#,
        );

        let job = load_job(file.path()).unwrap();

        assert_eq!(job.data_path, PathBuf::from("data/S950"));
        assert_eq!(job.side, Side::Left);
        assert!(!job.exists_target);
        let names: Vec<&String> = job.nodemaps.values().collect();
        assert_eq!(names, ["a.txt", "c.txt"]);
    }

    #[test]
    fn targets_default_to_available() {
        let file = write_job(
            r#"{ "data_path": "d", "side": "right", "nodemaps": { "1": "a.txt" } }"#,
        );

        assert!(load_job(file.path()).unwrap().exists_target);
    }

    #[test]
    fn rejects_a_missing_field() {
        let file = write_job(r#"{ "side": "right", "nodemaps": { "1": "a.txt" } }"#);

        let err = load_job(file.path()).unwrap_err();
        assert!(err.to_string().contains("data_path"));
    }

    #[test]
    fn rejects_an_unknown_side() {
        let file = write_job(
            r#"{ "data_path": "d", "side": "up", "nodemaps": { "1": "a.txt" } }"#,
        );

        assert!(matches!(
            load_job(file.path()),
            Err(StrainmapError::Config(_))
        ));
    }

    #[test]
    fn rejects_a_non_integer_stage_key() {
        let file = write_job(
            r#"{ "data_path": "d", "side": "right", "nodemaps": { "first": "a.txt" } }"#,
        );

        assert!(matches!(
            load_job(file.path()),
            Err(StrainmapError::Config(_))
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        let file = write_job("{ not json");

        assert!(matches!(
            load_job(file.path()),
            Err(StrainmapError::Parse(_))
        ));
    }
}
