use genome_prep::error::PrepError;
use genome_prep::meme::{insert_gap, parse_pfm, read_pfm, write_gapped_motif, GAP_ROW};
use std::fs;

const HEADER: &str = "letter-probability matrix: alength= 4 w= 4 nsites= 20 E= 0";

fn parse(text: &str) -> Result<genome_prep::types::PositionFrequencyMatrix, PrepError> {
    parse_pfm(text.as_bytes())
}

#[test]
fn test_read_pfm() {
    let pfm = read_pfm("tests/data/palindrome.meme").unwrap();
    assert_eq!(pfm.width(), 4);
    assert_eq!(pfm.consensus(), "ACGT");
    assert_eq!(pfm.row(1)[1], 0.9);

    let pfm = read_pfm("tests/data/half_site.meme").unwrap();
    assert_eq!(pfm.width(), 8);
    assert_eq!(pfm.consensus(), "AACCGGTT");

    // test file does not exist
    assert!(read_pfm("tests/data/nonexistent.meme").is_err());
}

#[test]
fn test_row_count_must_match_width() {
    let result = read_pfm("tests/data/truncated.meme");
    assert!(matches!(result, Err(PrepError::MalformedMatrix(_))));

    let text = format!(
        "{}\n0.9 0.03 0.03 0.04\n0.9 0.03 0.03 0.04\n0.9 0.03 0.03 0.04\n0.9 0.03 0.03 0.04\n0.9 0.03 0.03 0.04\n",
        HEADER
    );
    assert!(matches!(parse(&text), Err(PrepError::MalformedMatrix(_))));
}

#[test]
fn test_row_must_have_four_values() {
    let text = format!(
        "{}\n0.9 0.03 0.03 0.04\n0.9 0.03 0.07\n0.9 0.03 0.03 0.04\n0.9 0.03 0.03 0.04\n",
        HEADER
    );
    assert!(matches!(parse(&text), Err(PrepError::MalformedMatrix(_))));
}

#[test]
fn test_values_must_be_non_negative_numbers() {
    let text = format!(
        "{}\n0.9 0.03 0.03 0.04\n0.9 abc 0.03 0.04\n0.9 0.03 0.03 0.04\n0.9 0.03 0.03 0.04\n",
        HEADER
    );
    assert!(matches!(parse(&text), Err(PrepError::MalformedMatrix(_))));

    let text = format!(
        "{}\n0.9 0.03 0.03 0.04\n0.9 -0.1 0.03 0.04\n0.9 0.03 0.03 0.04\n0.9 0.03 0.03 0.04\n",
        HEADER
    );
    assert!(matches!(parse(&text), Err(PrepError::MalformedMatrix(_))));

    let text = format!(
        "{}\n0.9 0.03 0.03 0.04\n0.9 NaN 0.03 0.04\n0.9 0.03 0.03 0.04\n0.9 0.03 0.03 0.04\n",
        HEADER
    );
    assert!(matches!(parse(&text), Err(PrepError::MalformedMatrix(_))));
}

#[test]
fn test_header_errors() {
    assert!(matches!(
        parse("MEME version 4\n\nMOTIF M1\n"),
        Err(PrepError::MalformedMatrix(_))
    ));
    assert!(matches!(
        parse("letter-probability matrix: alength= 4\n0.25 0.25 0.25 0.25\n"),
        Err(PrepError::MalformedMatrix(_))
    ));
    assert!(matches!(
        parse("letter-probability matrix: alength= 4 w= four nsites= 20\n"),
        Err(PrepError::MalformedMatrix(_))
    ));
    assert!(matches!(
        parse("letter-probability matrix: alength= 20 w= 1 nsites= 20\n0.25 0.25 0.25 0.25\n"),
        Err(PrepError::MalformedMatrix(_))
    ));
}

#[test]
fn test_only_first_matrix_is_read() {
    let text = format!(
        "MOTIF M1\n{}\n0.9 0.03 0.03 0.04\n0.02 0.9 0.05 0.03\n0.05 0.02 0.9 0.03\n0.03 0.04 0.03 0.9\n\
         MOTIF M2\nletter-probability matrix: alength= 4 w= 2 nsites= 20 E= 0\n0.9 0.03 0.03 0.04\n0.9 0.03 0.03 0.04\n",
        HEADER
    );
    let pfm = parse(&text).unwrap();
    assert_eq!(pfm.width(), 4);
    assert_eq!(pfm.consensus(), "ACGT");
}

#[test]
fn test_insert_gap() {
    let input = fs::read_to_string("tests/data/half_site.meme").unwrap();
    let mut output = Vec::new();
    insert_gap(input.as_bytes(), &mut output, 2).unwrap();
    let output = String::from_utf8(output).unwrap();

    let lines: Vec<&str> = output.lines().collect();
    let header = lines
        .iter()
        .position(|l| l.starts_with("letter-probability"))
        .unwrap();
    assert_eq!(
        lines[header],
        "letter-probability matrix: alength= 4 w= 10 nsites= 12 E= 1.2e-05"
    );
    assert_eq!(lines[header + 5], GAP_ROW);
    assert_eq!(lines[header + 6], GAP_ROW);
    assert!(lines[header + 7].starts_with("0.050000"));
    assert!(lines.last().unwrap().starts_with("URL"));

    let gapped = parse(&output).unwrap();
    assert_eq!(gapped.width(), 10);
    assert_eq!(gapped.consensus(), "AACCAAGGTT");
}

#[test]
fn test_insert_gap_keeps_surrounding_lines() {
    let input = fs::read_to_string("tests/data/palindrome.meme").unwrap();
    let mut output = Vec::new();
    insert_gap(input.as_bytes(), &mut output, 0).unwrap();
    let output = String::from_utf8(output).unwrap();

    assert_eq!(output, input);
}

#[test]
fn test_insert_gap_into_single_position_motif() {
    let text = "letter-probability matrix: alength= 4 w= 1 nsites= 20 E= 0\n0.9 0.03 0.03 0.04\n";
    let mut output = Vec::new();
    insert_gap(text.as_bytes(), &mut output, 1).unwrap();

    assert_eq!(
        String::from_utf8(output).unwrap(),
        format!(
            "letter-probability matrix: alength= 4 w= 2 nsites= 20 E= 0\n{}\n0.9 0.03 0.03 0.04\n",
            GAP_ROW
        )
    );
}

#[test]
fn test_insert_gap_requires_matrix() {
    let mut output = Vec::new();
    let result = insert_gap("MEME version 4\n".as_bytes(), &mut output, 3);
    assert!(matches!(result, Err(PrepError::MalformedMatrix(_))));

    let mut output = Vec::new();
    let result = insert_gap(format!("{}\n0.9 0.03 0.03 0.04\n", HEADER).as_bytes(), &mut output, 3);
    assert!(matches!(result, Err(PrepError::MalformedMatrix(_))));
}

#[test]
fn test_write_gapped_motif() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gapped.meme");

    write_gapped_motif("tests/data/half_site.meme", &path, 72).unwrap();

    let gapped = read_pfm(&path).unwrap();
    assert_eq!(gapped.width(), 80);
    assert_eq!(gapped.row(4).to_vec(), vec![0.25; 4]);
    assert_eq!(gapped.row(75).to_vec(), vec![0.25; 4]);
    assert_eq!(&gapped.consensus()[76..], "GGTT");
}
