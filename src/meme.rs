use crate::error::{PrepError, Result};
use crate::types::{PositionFrequencyMatrix, ALPHABET};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

const HEADER_TOKEN: &str = "letter-probability";
const ALENGTH_FIELD: usize = 2;
const WIDTH_FIELD: usize = 5;

/// Uniform row written into the gap of a gapped motif
pub const GAP_ROW: &str = "0.25  0.25  0.25  0.25";

/// Reads the motif width from a `letter-probability matrix:` header.
///
/// The header is split on single spaces and field 5 holds the width, e.g.
/// `letter-probability matrix: alength= 4 w= 8 nsites= 20 E= 0`.
fn parse_width(header: &str) -> Result<usize> {
    let fields: Vec<&str> = header.trim().split(' ').collect();

    if fields.get(ALENGTH_FIELD) == Some(&"alength=") {
        let alength = fields.get(ALENGTH_FIELD + 1).copied().unwrap_or_default();
        if alength.parse::<usize>().ok() != Some(ALPHABET.len()) {
            return Err(PrepError::malformed_matrix(format!(
                "unsupported alphabet length {:?}, expected {}",
                alength,
                ALPHABET.len()
            )));
        }
    }

    let width = fields
        .get(WIDTH_FIELD)
        .ok_or_else(|| PrepError::malformed_matrix(format!("missing motif width in {:?}", header)))?;

    width
        .parse::<usize>()
        .map_err(|e| PrepError::malformed_matrix(format!("invalid motif width {:?}: {}", width, e)))
}

/// Whether a trimmed line closes a matrix block holding `rows` rows so far
fn ends_block(line: &str, rows: usize) -> bool {
    (line.is_empty() && rows > 0) || line.contains("URL") || line.starts_with("MOTIF")
}

/// Parses one matrix row into frequencies in A, C, G, T order
fn parse_row(line: &str, position: usize) -> Result<[f64; 4]> {
    let values = line
        .split_whitespace()
        .map(|field| {
            field.parse::<f64>().map_err(|e| {
                PrepError::malformed_matrix(format!(
                    "row {}: invalid frequency {:?}: {}",
                    position + 1,
                    field,
                    e
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    values.try_into().map_err(|values: Vec<f64>| {
        PrepError::malformed_matrix(format!(
            "row {}: expected {} frequencies, found {}",
            position + 1,
            ALPHABET.len(),
            values.len()
        ))
    })
}

/// Parses the first letter-probability matrix from MEME formatted text
///
/// Lines before the first `letter-probability` header are ignored. The matrix
/// block that follows ends at a blank line, a `URL` line, the next `MOTIF`
/// line or the end of input, and must hold exactly as many rows as the header
/// declares.
///
/// # Errors
/// * `PrepError::MalformedMatrix` - no header, a bad width field, a row without
///   exactly 4 frequencies, an unparseable or negative frequency, or a row
///   count that differs from the declared width
/// * `PrepError::Io` - if reading fails
pub fn parse_pfm<R: BufRead>(reader: R) -> Result<PositionFrequencyMatrix> {
    let mut lines = reader.lines();

    let width = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if line.contains(HEADER_TOKEN) {
                    break parse_width(&line)?;
                }
            }
            None => {
                return Err(PrepError::malformed_matrix(
                    "no letter-probability matrix header found",
                ))
            }
        }
    };

    let mut rows = Vec::with_capacity(width);
    for line in lines {
        let line = line?;
        let line = line.trim();
        if ends_block(line, rows.len()) {
            break;
        }
        if line.is_empty() {
            continue;
        }
        rows.push(parse_row(line, rows.len())?);
    }

    if rows.len() != width {
        return Err(PrepError::malformed_matrix(format!(
            "header declares width {} but {} rows were found",
            width,
            rows.len()
        )));
    }

    debug!(width, "parsed letter-probability matrix");
    PositionFrequencyMatrix::from_rows(rows)
}

/// Reads the first Position Frequency Matrix (PFM) from a MEME format file
///
/// # Arguments
/// * `filename` - Path to the MEME format file to read
///
/// # Errors
/// * `PrepError::Io` - If the file cannot be opened or read
/// * `PrepError::MalformedMatrix` - See [`parse_pfm`]
///
/// # Example
/// ```ignore
/// use genome_prep::meme::read_pfm;
///
/// let pfm = read_pfm("path/to/motif.meme").unwrap();
/// println!("{} positions, consensus {}", pfm.width(), pfm.consensus());
/// ```
pub fn read_pfm<P: AsRef<Path>>(filename: P) -> Result<PositionFrequencyMatrix> {
    let file = File::open(filename)?;
    parse_pfm(BufReader::new(file))
}

/// Rewrites a header so its width field reads `width + gap_size`
fn widen_header(header: &str, gap_size: usize) -> Result<(usize, String)> {
    let width = parse_width(header)?;
    let mut fields: Vec<String> = header.trim().split(' ').map(str::to_string).collect();
    fields[WIDTH_FIELD] = (width + gap_size).to_string();
    Ok((width, fields.join(" ")))
}

fn write_gap_rows<W: Write>(writer: &mut W, gap_size: usize) -> Result<()> {
    for _ in 0..gap_size {
        writeln!(writer, "{}", GAP_ROW)?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum GapState {
    SeekingHeader,
    InMatrix { half: usize, rows: usize },
    Done,
}

/// Turns a continuous motif into a gapped one.
///
/// The first matrix in the input is split in the middle: after the first
/// `width / 2` rows, `gap_size` uniform rows ([`GAP_ROW`]) are inserted and
/// the header width is increased by `gap_size`. Every other line is copied
/// trimmed and newline terminated.
///
/// # Errors
/// * `PrepError::MalformedMatrix` - no header, a bad width field, or a matrix
///   block shorter than half the declared width
/// * `PrepError::Io` - if reading or writing fails
pub fn insert_gap<R: BufRead, W: Write>(reader: R, mut writer: W, gap_size: usize) -> Result<()> {
    let mut state = GapState::SeekingHeader;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        match state {
            GapState::SeekingHeader if line.contains(HEADER_TOKEN) => {
                let (width, header) = widen_header(line, gap_size)?;
                writeln!(writer, "{}", header)?;
                let half = width / 2;
                state = if half == 0 {
                    write_gap_rows(&mut writer, gap_size)?;
                    GapState::Done
                } else {
                    GapState::InMatrix { half, rows: 0 }
                };
                continue;
            }
            GapState::InMatrix { half, rows } => {
                if ends_block(line, rows) {
                    return Err(PrepError::malformed_matrix(format!(
                        "matrix block ended after {} rows, before the gap at row {}",
                        rows, half
                    )));
                }
                if !line.is_empty() {
                    writeln!(writer, "{}", line)?;
                    let rows = rows + 1;
                    state = if rows == half {
                        write_gap_rows(&mut writer, gap_size)?;
                        GapState::Done
                    } else {
                        GapState::InMatrix { half, rows }
                    };
                    continue;
                }
            }
            _ => {}
        }

        writeln!(writer, "{}", line)?;
    }

    match state {
        GapState::Done => Ok(()),
        GapState::SeekingHeader => Err(PrepError::malformed_matrix(
            "no letter-probability matrix header found",
        )),
        GapState::InMatrix { half, rows } => Err(PrepError::malformed_matrix(format!(
            "input ended after {} rows, before the gap at row {}",
            rows, half
        ))),
    }
}

/// Writes a gapped copy of the motif in `input` to `output`. See [`insert_gap`].
pub fn write_gapped_motif<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    gap_size: usize,
) -> Result<()> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);
    insert_gap(reader, &mut writer, gap_size)?;
    writer.flush()?;

    info!(gap_size, "wrote gapped motif");
    Ok(())
}
