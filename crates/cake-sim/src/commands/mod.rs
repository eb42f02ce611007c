pub mod check;
pub mod divide;
pub mod sample;

use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use cake_core::serde::to_canonical_json_bytes;
use serde::Serialize;

/// Reads a file, or stdin when no path is given.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>, Box<dyn Error>> {
    match path {
        Some(path) => Ok(fs::read(path)?),
        None => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            Ok(data)
        }
    }
}

/// Writes `value` as JSON to `out`, or stdout when no path is given.
pub fn emit<T: Serialize>(
    value: &T,
    pretty: bool,
    out: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        String::from_utf8(to_canonical_json_bytes(value)?)?
    };
    match out {
        Some(path) => fs::write(path, json + "\n")?,
        None => println!("{json}"),
    }
    Ok(())
}
