use crate::error::{PrepError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Parses a numeric field, reporting the 1-based line on failure
pub(crate) fn parse_field<T>(value: &str, line: usize, what: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| PrepError::malformed_record(line, format!("invalid {} {:?}: {}", what, value, e)))
}

fn is_header(line: &str) -> bool {
    line.starts_with("track") || line.starts_with("browser") || line.starts_with('#')
}

/// Start of the single base at the middle of `[start, end)`.
///
/// For odd lengths this is the centre base; for even lengths it is the base
/// immediately preceding the middle.
pub fn middle_point(start: i64, end: i64) -> i64 {
    let len = end - start;
    if len % 2 == 0 {
        start + (len - 2) / 2
    } else {
        start + (len - 1) / 2
    }
}

/// Replaces every BED region by the 1 bp interval at its middle point
///
/// Track, browser and comment lines are copied verbatim and blank lines are
/// dropped. Columns after `chromEnd` are carried over unchanged.
///
/// # Returns
/// * `Result<usize>` - Number of regions written
///
/// # Errors
/// * `PrepError::MalformedRecord` if a line has fewer than 3 fields or
///   non-integer coordinates
/// * `PrepError::Io` for reading or writing issues
pub fn extract_middle_points<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<usize> {
    let mut regions = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if is_header(&line) {
            writeln!(writer, "{}", line)?;
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split('\t').collect();
        if fields.len() < 3 {
            return Err(PrepError::malformed_record(
                idx + 1,
                format!("expected at least 3 BED fields, found {}", fields.len()),
            ));
        }

        let start: i64 = parse_field(fields[1], idx + 1, "chromStart")?;
        let end: i64 = parse_field(fields[2], idx + 1, "chromEnd")?;
        let middle = middle_point(start, end);

        write!(writer, "{}\t{}\t{}", fields[0], middle, middle + 1)?;
        for extra in &fields[3..] {
            write!(writer, "\t{}", extra)?;
        }
        writeln!(writer)?;
        regions += 1;
    }

    Ok(regions)
}

/// Writes the middle points of every region in the BED file `input` to `output`.
pub fn write_middle_points<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<usize> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);
    let regions = extract_middle_points(reader, &mut writer)?;
    writer.flush()?;

    info!(regions, "extracted region middle points");
    Ok(regions)
}
