use crate::error::{PrepError, Result};
use needletail::parse_fastx_file;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Writes the FASTQ records of `filename` whose sequence is exactly `length`
/// bases long.
///
/// Plain and gzip compressed input are both accepted. Records are written in
/// input order as four lines (`@id`, sequence, `+`, quality).
///
/// # Arguments
/// * `filename` - Path to the FASTQ file to read
/// * `length` - Required read length
/// * `writer` - Destination of the kept records
///
/// # Returns
/// * `Result<usize>` - Number of records written
///
/// # Errors
/// * Returns `PrepError::Fastq` if the input is not valid FASTQ
/// * Returns `PrepError::Io` for file reading or writing issues
pub fn filter_by_length<P: AsRef<Path>, W: Write>(
    filename: P,
    length: usize,
    mut writer: W,
) -> Result<usize> {
    let filename = filename.as_ref();
    if fs::metadata(filename)?.len() == 0 {
        return Ok(0);
    }

    let mut reader = parse_fastx_file(filename).map_err(|e| PrepError::Fastq(e.to_string()))?;
    let mut seen = 0;
    let mut kept = 0;

    while let Some(record) = reader.next() {
        let record = record.map_err(|e| PrepError::Fastq(e.to_string()))?;
        seen += 1;

        let sequence = record.seq();
        if sequence.len() != length {
            continue;
        }

        let quality = record
            .qual()
            .ok_or_else(|| PrepError::Fastq(format!("record {} has no quality scores", seen)))?;

        writer.write_all(b"@")?;
        writer.write_all(record.id())?;
        writer.write_all(b"\n")?;
        writer.write_all(&sequence)?;
        writer.write_all(b"\n+\n")?;
        writer.write_all(quality)?;
        writer.write_all(b"\n")?;
        kept += 1;
    }
    writer.flush()?;

    info!(seen, kept, length, "filtered FASTQ records by length");
    Ok(kept)
}
