use crate::bed::parse_field;
use crate::error::{PrepError, Result};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Length of each half site of a gapped motif
pub const HALF_SITE_LEN: i64 = 8;

const FORWARD_RGB: &str = "255,0,0";
const REVERSE_RGB: &str = "0,0,255";
const MATCH_FIELDS: usize = 6;

/// One tab separated motif match line, as written by FIMO:
/// `motif_id  sequence_name  start  stop  strand  score  ...`
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord<'a> {
    /// 1-based line number in the source file
    pub line: usize,
    pub sequence_name: &'a str,
    pub start: i64,
    pub end: i64,
    pub strand: &'a str,
    /// Kept verbatim so the output carries the input formatting
    pub score: &'a str,
}

impl<'a> MatchRecord<'a> {
    pub fn parse(text: &'a str, line: usize) -> Result<Self> {
        let fields: Vec<&str> = text.trim().split('\t').collect();
        if fields.len() < MATCH_FIELDS {
            return Err(PrepError::malformed_record(
                line,
                format!(
                    "expected at least {} match fields, found {}",
                    MATCH_FIELDS,
                    fields.len()
                ),
            ));
        }

        Ok(Self {
            line,
            sequence_name: fields[1],
            start: parse_field(fields[2], line, "start")?,
            end: parse_field(fields[3], line, "stop")?,
            strand: fields[4],
            score: fields[5],
        })
    }

    pub fn is_forward(&self) -> bool {
        self.strand == "+"
    }
}

/// Resolves matches reported on both strands at the same coordinates.
///
/// Comment lines are copied straight away. The first match at a
/// (sequence, start, stop) triple is held back; when a second one arrives,
/// only one of the two is written: the new line if it is on the `+` strand,
/// the held line otherwise. Matches never seen twice are written at the end in
/// first-seen order.
///
/// # Returns
/// * `Result<usize>` - Number of match lines written
pub fn filter_duplicate_matches<R: BufRead, W: Write>(reader: R, mut writer: W) -> Result<usize> {
    let mut held: Vec<Option<String>> = Vec::new();
    let mut pending: HashMap<(String, i64, i64), usize> = HashMap::new();
    let mut written = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') {
            writeln!(writer, "{}", line)?;
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let (key, forward) = {
            let record = MatchRecord::parse(&line, idx + 1)?;
            (
                (record.sequence_name.to_string(), record.start, record.end),
                record.is_forward(),
            )
        };

        match pending.remove(&key) {
            Some(slot) => {
                let previous = held[slot].take();
                let chosen = if forward { Some(line) } else { previous };
                if let Some(chosen) = chosen {
                    writeln!(writer, "{}", chosen)?;
                    written += 1;
                }
                debug!(line = idx + 1, forward, "resolved duplicate match");
            }
            None => {
                pending.insert(key, held.len());
                held.push(Some(line));
            }
        }
    }

    for line in held.into_iter().flatten() {
        writeln!(writer, "{}", line)?;
        written += 1;
    }

    Ok(written)
}

/// Writes `input` with same-coordinate duplicate matches resolved to `output`.
pub fn write_deduplicated_matches<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> Result<usize> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);
    let written = filter_duplicate_matches(reader, &mut writer)?;
    writer.flush()?;

    info!(written, "filtered duplicate matches");
    Ok(written)
}

/// A 12 column BED record with two blocks, one per half site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bed12 {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub name: String,
    pub score: String,
    pub strand: String,
    pub thick_start: i64,
    pub thick_end: i64,
    pub item_rgb: &'static str,
    pub block_sizes: [i64; 2],
    pub block_starts: [i64; 2],
}

impl fmt::Display for Bed12 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{},{}\t{},{}",
            self.chrom,
            self.start,
            self.end,
            self.name,
            self.score,
            self.strand,
            self.thick_start,
            self.thick_end,
            self.item_rgb,
            self.block_sizes.len(),
            self.block_sizes[0],
            self.block_sizes[1],
            self.block_starts[0],
            self.block_starts[1],
        )
    }
}

/// Converts a gapped motif match inside a nucleosome sequence to genome
/// coordinates.
///
/// The sequence name is expected to be `:` separated with the chromosome in
/// element 3 and the nucleosome range `start-end` in element 4, e.g.
/// `nuc:strong:hg19:chr1:10000-10147`. Match coordinates are 1-based within
/// that nucleosome.
///
/// # Errors
/// * `PrepError::MalformedRecord` if the sequence name lacks the chromosome
///   or range, or if the match is shorter than two half sites
pub fn match_to_bed12(record: &MatchRecord<'_>, gap_length: usize) -> Result<Bed12> {
    let parts: Vec<&str> = record.sequence_name.split(':').collect();
    let (chrom, range) = match (parts.get(3), parts.get(4)) {
        (Some(chrom), Some(range)) => (*chrom, *range),
        _ => {
            return Err(PrepError::malformed_record(
                record.line,
                format!(
                    "sequence name {:?} has no chromosome and nucleosome range",
                    record.sequence_name
                ),
            ))
        }
    };
    let nuc_start: i64 = parse_field(
        range.split('-').next().unwrap_or_default(),
        record.line,
        "nucleosome start",
    )?;

    let gap = record.end - record.start - 2 * HALF_SITE_LEN + 1;
    if gap < 0 {
        return Err(PrepError::malformed_record(
            record.line,
            format!(
                "match {}-{} is shorter than two half sites",
                record.start, record.end
            ),
        ));
    }

    let start = nuc_start + record.start - 1;
    let end = nuc_start + record.end;

    Ok(Bed12 {
        chrom: chrom.to_string(),
        start,
        end,
        name: format!("{}:{}-{}_{}", chrom, start, end, gap_length),
        score: record.score.to_string(),
        strand: record.strand.to_string(),
        thick_start: start,
        thick_end: end,
        item_rgb: if record.is_forward() {
            FORWARD_RGB
        } else {
            REVERSE_RGB
        },
        block_sizes: [HALF_SITE_LEN, HALF_SITE_LEN],
        block_starts: [0, HALF_SITE_LEN + gap],
    })
}

/// Converts every match line to BED12, skipping comment and blank lines.
///
/// # Returns
/// * `Result<usize>` - Number of BED records written
pub fn convert_matches_to_bed<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
    gap_length: usize,
) -> Result<usize> {
    let mut written = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let record = MatchRecord::parse(&line, idx + 1)?;
        writeln!(writer, "{}", match_to_bed12(&record, gap_length)?)?;
        written += 1;
    }

    Ok(written)
}

/// Writes the matches in `input` as BED12 to `output`. See [`match_to_bed12`].
pub fn write_matches_as_bed<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    gap_length: usize,
) -> Result<usize> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);
    let written = convert_matches_to_bed(reader, &mut writer, gap_length)?;
    writer.flush()?;

    info!(written, gap_length, "converted matches to BED");
    Ok(written)
}
