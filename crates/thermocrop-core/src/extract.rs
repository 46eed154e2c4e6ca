//! Sources of per-pixel temperature matrices.
//!
//! Decoding a camera's embedded radiometric data is vendor specific, so the
//! pipeline only sees the [`RadiometricExtractor`] trait. The adapters here
//! read matrices that some other tool has already produced.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use ndarray::Array2;
use tracing::{debug, info};

use crate::consts::MATRIX_SNIFF_LINES;
use crate::error::{Result, ThermoError};
use crate::frame::RawThermalMatrix;

/// Produces the sensor-resolution temperature grid (°C) for a thermal image.
///
/// Every failure is reported as [`ThermoError::Extraction`].
pub trait RadiometricExtractor: Send + Sync {
    fn extract(&self, image: &Path) -> Result<RawThermalMatrix>;
}

/// Reads a delimited text matrix stored next to the image, at the image path
/// with its extension replaced.
#[derive(Clone, Debug)]
pub struct MatrixFileExtractor {
    extension: String,
}

impl Default for MatrixFileExtractor {
    fn default() -> Self {
        Self::new("csv")
    }
}

impl MatrixFileExtractor {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn matrix_path(&self, image: &Path) -> PathBuf {
        image.with_extension(&self.extension)
    }
}

impl RadiometricExtractor for MatrixFileExtractor {
    fn extract(&self, image: &Path) -> Result<RawThermalMatrix> {
        let path = self.matrix_path(image);
        let text = std::fs::read_to_string(&path).map_err(|e| {
            ThermoError::Extraction(format!("cannot read matrix {}: {e}", path.display()))
        })?;
        let matrix = parse_matrix(&text)?;
        debug!(
            path = %path.display(),
            width = matrix.width(),
            height = matrix.height(),
            "Loaded radiometric matrix"
        );
        Ok(matrix)
    }
}

/// Runs an external program with the image path as its last argument and
/// parses its standard output as a delimited matrix.
#[derive(Clone, Debug)]
pub struct CommandExtractor {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl RadiometricExtractor for CommandExtractor {
    fn extract(&self, image: &Path) -> Result<RawThermalMatrix> {
        info!(
            program = %self.program.display(),
            image = %image.display(),
            "Running radiometric extractor"
        );
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(image)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ThermoError::Extraction(format!(
                    "dependency unavailable: {} not found",
                    self.program.display()
                )),
                _ => ThermoError::Extraction(format!(
                    "cannot run {}: {e}",
                    self.program.display()
                )),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ThermoError::Extraction(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| ThermoError::Extraction(format!("extractor output is not UTF-8: {e}")))?;
        parse_matrix(&stdout)
    }
}

/// Matrices registered ahead of time, keyed by image path.
#[derive(Clone, Debug, Default)]
pub struct InMemoryExtractor {
    matrices: HashMap<PathBuf, RawThermalMatrix>,
}

impl InMemoryExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, image: impl Into<PathBuf>, matrix: RawThermalMatrix) {
        self.matrices.insert(image.into(), matrix);
    }

    pub fn with(mut self, image: impl Into<PathBuf>, matrix: RawThermalMatrix) -> Self {
        self.insert(image, matrix);
        self
    }
}

impl RadiometricExtractor for InMemoryExtractor {
    fn extract(&self, image: &Path) -> Result<RawThermalMatrix> {
        self.matrices.get(image).cloned().ok_or_else(|| {
            ThermoError::Extraction(format!("no matrix registered for {}", image.display()))
        })
    }
}

/// Parse a delimited temperature matrix.
///
/// Accepts `;`-separated rows with decimal commas (spreadsheet export),
/// tab-separated rows, or plain comma-separated rows. A single-column
/// spreadsheet export has no `;` at all and is recognized by its `0` header.
/// A leading byte-order mark, blank lines, and a header row of column indices
/// `0, 1, 2, ...` are skipped. All rows must have the same length.
pub fn parse_matrix(text: &str) -> Result<RawThermalMatrix> {
    let text = text.trim_start_matches('\u{feff}');
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let Some(first) = lines.first().copied() else {
        return Err(ThermoError::Extraction("matrix is empty".into()));
    };
    let sniffed = &lines[..lines.len().min(MATRIX_SNIFF_LINES)];
    let (delimiter, decimal_comma) = sniff_format(sniffed);

    let data_start = usize::from(is_index_header(first, delimiter));

    let mut values = Vec::new();
    let mut width = None;
    let mut height = 0usize;

    for (line_no, line) in lines[data_start..].iter().enumerate() {
        let mut row_len = 0usize;
        for cell in line.split(delimiter) {
            let cell = cell.trim();
            let parsed = if decimal_comma {
                cell.replace(',', ".").parse::<f64>()
            } else {
                cell.parse::<f64>()
            };
            let value = parsed
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    ThermoError::Extraction(format!(
                        "invalid temperature {cell:?} on data row {}",
                        line_no + 1
                    ))
                })?;
            values.push(value);
            row_len += 1;
        }

        match width {
            None => width = Some(row_len),
            Some(w) if w != row_len => {
                return Err(ThermoError::Extraction(format!(
                    "ragged matrix: data row {} has {row_len} values, expected {w}",
                    line_no + 1
                )));
            }
            Some(_) => {}
        }
        height += 1;
    }

    let width = width.unwrap_or(0);
    if height == 0 || width == 0 {
        return Err(ThermoError::Extraction("matrix has no data rows".into()));
    }

    let data = Array2::from_shape_vec((height, width), values)
        .map_err(|e| ThermoError::Extraction(format!("matrix shape error: {e}")))?;
    Ok(RawThermalMatrix::new(data))
}

/// Render a matrix in the spreadsheet export layout [`parse_matrix`] reads:
/// a header row of column indices, `;` separators and decimal commas.
pub fn format_matrix(data: &Array2<f64>) -> String {
    let mut out = String::new();
    let header: Vec<String> = (0..data.ncols()).map(|i| i.to_string()).collect();
    out.push_str(&header.join(";"));
    out.push('\n');
    for row in data.rows() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string().replace('.', ",")).collect();
        out.push_str(&cells.join(";"));
        out.push('\n');
    }
    out
}

/// Delimiter and decimal separator of a matrix, judged from its first lines.
fn sniff_format(lines: &[&str]) -> (char, bool) {
    if lines.iter().any(|l| l.contains(';')) {
        (';', true)
    } else if lines.iter().any(|l| l.contains('\t')) {
        ('\t', false)
    } else if lines.first().is_some_and(|l| l.trim() == "0") {
        // One column under a `0` header: commas can only be decimal commas.
        (';', true)
    } else {
        (',', false)
    }
}

fn is_index_header(line: &str, delimiter: char) -> bool {
    line.split(delimiter)
        .enumerate()
        .all(|(i, cell)| cell.trim().parse::<usize>().ok() == Some(i))
}
