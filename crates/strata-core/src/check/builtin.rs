use std::{
    fs::{self, File},
    io::Read,
    path::Path,
};

use crate::check::OutputCheck;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Regular file exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistsCheck;

impl OutputCheck for ExistsCheck {
    fn name(&self) -> &str {
        "exists"
    }

    fn check(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok_and(|m| m.is_file())
    }
}

/// Regular file exists and has non-zero size.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyCheck;

impl OutputCheck for NonEmptyCheck {
    fn name(&self) -> &str {
        "non-empty"
    }

    fn check(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() > 0)
    }
}

/// Space-separated numeric table: at least one row, every cell parses as a
/// number, every row has the same column count.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableCheck;

impl OutputCheck for TableCheck {
    fn name(&self) -> &str {
        "table"
    }

    fn check(&self, path: &Path) -> bool {
        let Ok(text) = fs::read_to_string(path) else {
            return false;
        };
        let mut columns = None;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let mut n = 0usize;
            for cell in line.split_whitespace() {
                if cell.parse::<f64>().is_err() {
                    return false;
                }
                n += 1;
            }
            match columns {
                None => columns = Some(n),
                Some(c) if c != n => return false,
                Some(_) => {}
            }
        }
        columns.is_some()
    }
}

/// File starts with the 8-byte PNG signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCheck;

impl OutputCheck for PngCheck {
    fn name(&self) -> &str {
        "png"
    }

    fn check(&self, path: &Path) -> bool {
        let Ok(mut file) = File::open(path) else {
            return false;
        };
        let mut head = [0u8; 8];
        file.read_exact(&mut head).is_ok() && head == PNG_SIGNATURE
    }
}
