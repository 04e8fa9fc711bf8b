//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable holding the root directory of the software checkout.
pub const SW_ROOT_ENV_VAR: &str = "CTRL_SW_ROOT";

/// Directory, relative to the software root, holding the parameter files.
const PARAMS_DIR: &str = "params";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable ({}) is not set", SW_ROOT_ENV_VAR)]
    SwRootNotSet,

    #[error("Cannot load the parameter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot read the parameter file {0:?}: {1}")]
    DeserialiseError(PathBuf, toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the software from the environment.
pub fn get_sw_root() -> Result<PathBuf, LoadError> {
    std::env::var_os(SW_ROOT_ENV_VAR)
        .map(PathBuf::from)
        .ok_or(LoadError::SwRootNotSet)
}

/// Load a parameter file
///
/// The file path is relative to the `$CTRL_SW_ROOT/params` directory
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    let mut path = get_sw_root()?;
    path.push(PARAMS_DIR);
    path.push(param_file_path);

    load_path(path)
}

/// Load a parameter file from an explicit path.
pub fn load_path<P, F>(path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>,
{
    let path = path.as_ref();

    let params_str =
        read_to_string(path).map_err(|e| LoadError::FileLoadError(path.to_path_buf(), e))?;

    from_toml_str(&params_str).map_err(|e| LoadError::DeserialiseError(path.to_path_buf(), e))
}

/// Parse a parameter struct from a TOML string.
pub fn from_toml_str<P>(params_str: &str) -> Result<P, toml::de::Error>
where
    P: DeserializeOwned,
{
    toml::from_str(params_str)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    struct Gains {
        k_p: f64,
        k_i: f64,
        #[serde(default)]
        k_d: f64,
    }

    #[test]
    fn test_from_toml_str() {
        let gains: Gains = from_toml_str("k_p = 0.86\nk_i = 0.14\n").unwrap();

        assert_eq!(gains.k_p, 0.86);
        assert_eq!(gains.k_i, 0.14);
        assert_eq!(gains.k_d, 0.0);
    }

    #[test]
    fn test_load_path_missing_file() {
        let res: Result<Gains, _> = load_path("/nonexistent/ctrl_params.toml");

        match res {
            Err(LoadError::FileLoadError(p, _)) => {
                assert_eq!(p, PathBuf::from("/nonexistent/ctrl_params.toml"))
            }
            r => panic!("Expected a file load error, got {:?}", r),
        }
    }
}
