use genome_prep::error::PrepError;
use genome_prep::fastq::filter_by_length;
use std::fs;

#[test]
fn test_filter_by_length() {
    let mut output = Vec::new();
    let kept = filter_by_length("tests/data/reads.fastq", 8, &mut output).unwrap();
    assert_eq!(kept, 2);

    let output = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 8);
    assert!(lines[0].starts_with("@read1"));
    assert_eq!(&lines[1..4], &["ACGTACGT", "+", "IIIIIIII"]);
    assert_eq!(lines[4], "@read3");
    assert_eq!(&lines[5..8], &["TTTTGGGG", "+", "HHHHHHHH"]);
}

#[test]
fn test_filter_by_length_without_matches() {
    let mut output = Vec::new();
    assert_eq!(filter_by_length("tests/data/reads.fastq", 100, &mut output).unwrap(), 0);
    assert!(output.is_empty());

    let mut output = Vec::new();
    assert_eq!(filter_by_length("tests/data/reads.fastq", 6, &mut output).unwrap(), 1);
}

#[test]
fn test_empty_fastq() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.fastq");
    fs::write(&path, "").unwrap();

    let mut output = Vec::new();
    assert_eq!(filter_by_length(&path, 8, &mut output).unwrap(), 0);

    // test file does not exist
    let result = filter_by_length("tests/data/nonexistent.fastq", 8, &mut output);
    assert!(matches!(result, Err(PrepError::Io(_))));
}
