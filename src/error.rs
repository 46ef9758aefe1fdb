use std::fmt::Display;

#[derive(Debug)]
pub enum StrainmapError {
    Config(String),
    FileAccess(String),
    Parse(String),
}

impl Display for StrainmapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (err_name, value) = match self {
            StrainmapError::Config(v) => ("Configuration", v),
            StrainmapError::FileAccess(v) => ("File access", v),
            StrainmapError::Parse(v) => ("Parse", v),
        };

        write!(f, "{} error: {}", err_name, value)
    }
}
