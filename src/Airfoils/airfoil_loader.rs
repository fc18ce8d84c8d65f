//! # Airfoil polar files
//!
//! A polar file holds one row per angle of attack:
//! ```text
//! # NACA 4412, Re = 1e5
//! # alpha[deg]   Cl       Cd
//!   -4.0        0.05     0.012
//!    0.0        0.45     0.009
//!    4.0        0.88     0.011
//! ```
//! Columns may be separated by whitespace or commas, `#` starts a comment. Text lines
//! before the first numeric row (XFOIL-style headers) are skipped; extra columns after
//! `Cd` (Cdp, Cm, ...) are ignored.
//!
//! [`AirfoilLibrary`] resolves airfoil names against a directory (`<dir>/<name>.dat`)
//! and keeps one shared instance per name.

use super::polar::{Airfoil, TabulatedPolar};
use crate::BEMT::bemt_error::BemtError;
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parses polar text (see module docs) into a tabulated polar.
pub fn parse_polar(name: &str, content: &str) -> Result<TabulatedPolar, BemtError> {
    let mut alpha = Vec::new();
    let mut cl = Vec::new();
    let mut cd = Vec::new();
    for (line_no, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let numbers: Result<Vec<f64>, _> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| token.parse::<f64>())
            .collect();
        match numbers {
            Ok(row) if row.len() >= 3 => {
                alpha.push(row[0]);
                cl.push(row[1]);
                cd.push(row[2]);
            }
            Ok(row) => {
                return Err(BemtError::AirfoilData {
                    name: name.to_string(),
                    reason: format!(
                        "line {}: expected at least 3 columns (alpha Cl Cd), found {}",
                        line_no + 1,
                        row.len()
                    ),
                });
            }
            Err(_) if alpha.is_empty() => {
                debug!("airfoil {}: skipping header line {}", name, line_no + 1);
            }
            Err(e) => {
                return Err(BemtError::AirfoilData {
                    name: name.to_string(),
                    reason: format!("line {}: {}", line_no + 1, e),
                });
            }
        }
    }
    TabulatedPolar::new(alpha, cl, cd).map_err(|e| match e {
        BemtError::AirfoilData { reason, .. } => BemtError::AirfoilData {
            name: name.to_string(),
            reason,
        },
        other => other,
    })
}

/// Reads a polar file from disk.
pub fn load_polar_file(name: &str, path: &Path) -> Result<TabulatedPolar, BemtError> {
    if !path.exists() {
        return Err(BemtError::AirfoilData {
            name: name.to_string(),
            reason: format!("file '{}' does not exist", path.display()),
        });
    }
    let reader = BufReader::new(File::open(path)?);
    let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
    let polar = parse_polar(name, &lines.join("\n"))?;
    info!(
        "airfoil {}: loaded {} polar points from '{}'",
        name,
        polar.alpha_deg.len(),
        path.display()
    );
    Ok(polar)
}

/// Name -> airfoil cache backed by a directory of polar files.
#[derive(Debug, Clone, Default)]
pub struct AirfoilLibrary {
    pub directory: PathBuf,
    airfoils: HashMap<String, Arc<Airfoil>>,
}

impl AirfoilLibrary {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            airfoils: HashMap::new(),
        }
    }

    /// Registers an airfoil under `name`, replacing any earlier entry.
    pub fn insert(&mut self, name: &str, airfoil: impl Into<Airfoil>) -> Arc<Airfoil> {
        let airfoil = Arc::new(airfoil.into());
        self.airfoils.insert(name.to_string(), Arc::clone(&airfoil));
        airfoil
    }

    /// Returns the airfoil called `name`, reading `<directory>/<name>.dat` on first use.
    pub fn load(&mut self, name: &str) -> Result<Arc<Airfoil>, BemtError> {
        if let Some(airfoil) = self.airfoils.get(name) {
            return Ok(Arc::clone(airfoil));
        }
        let path = self.directory.join(format!("{}.dat", name));
        let polar = load_polar_file(name, &path)?;
        Ok(self.insert(name, polar))
    }

    pub fn len(&self) -> usize {
        self.airfoils.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airfoils.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Airfoils::polar::{ConstantPolar, Polar};
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::tempdir;

    const POLAR: &str = r#"
 XFOIL polar of a test section
 alpha    CL      CD
# comment line
-5.0   -0.10   0.012
 0.0,   0.40,  0.010   # trailing comment
 5.0    0.90   0.014   0.005  -0.08
"#;

    #[test]
    fn parses_headers_comments_and_extra_columns() {
        let polar = parse_polar("test", POLAR).unwrap();
        assert_eq!(polar.alpha_deg, vec![-5.0, 0.0, 5.0]);
        assert_eq!(polar.cl, vec![-0.1, 0.4, 0.9]);
        assert_relative_eq!(polar.cd(2.5f64.to_radians()), 0.012, epsilon = 1e-12);
    }

    #[test]
    fn rejects_short_and_garbled_rows() {
        assert!(parse_polar("short", "0.0 0.4\n").is_err());
        let garbled = "0.0 0.4 0.01\nfive 0.9 0.02\n";
        match parse_polar("garbled", garbled) {
            Err(BemtError::AirfoilData { name, .. }) => assert_eq!(name, "garbled"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(parse_polar("empty", "# nothing here\n").is_err());
    }

    #[test]
    fn library_loads_once_and_shares() {
        let dir = tempdir().unwrap();
        let mut file = File::create(dir.path().join("naca0012.dat")).unwrap();
        file.write_all(POLAR.as_bytes()).unwrap();

        let mut library = AirfoilLibrary::new(dir.path());
        let first = library.load("naca0012").unwrap();
        let second = library.load("naca0012").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(library.len(), 1);
        assert!(library.load("missing").is_err());
    }

    #[test]
    fn library_accepts_registered_airfoils() {
        let mut library = AirfoilLibrary::new("does/not/exist");
        library.insert("flat", ConstantPolar::new(0.5, 0.02));
        let airfoil = library.load("flat").unwrap();
        assert_eq!(airfoil.cl(0.1), 0.5);
    }
}
