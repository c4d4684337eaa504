//! Two-column lookup table loader.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

/// Read a tab-delimited file of (key, value) pairs into an existing map.
///
/// Open failure is non-fatal: a warning is logged and the map is left
/// unmodified. Rows that do not have exactly two columns are silently
/// skipped. Later rows overwrite earlier ones for duplicate keys.
pub fn load_lookup(path: impl AsRef<Path>, map: &mut HashMap<String, String>) {
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "unable to open lookup table file");
            return;
        }
    };

    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "stopped reading lookup table");
                break;
            }
        };

        let mut cols = line.split('\t');
        let (Some(key), Some(value), None) = (cols.next(), cols.next(), cols.next()) else {
            continue;
        };

        map.insert(key.to_string(), value.to_string());
    }
}
