use crate::error::Result;
use crate::meme::read_pfm;
use crate::types::{complement, PositionFrequencyMatrix, ALPHABET};
use ndarray::ArrayView1;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Column index of the most frequent nucleotide in a matrix row.
///
/// Columns are scanned in A, C, G, T order and only a strictly greater value
/// replaces the current best, so ties resolve to the lowest index.
pub fn dominant_symbol(row: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    for (idx, &value) in row.iter().enumerate().skip(1) {
        if value > row[best] {
            best = idx;
        }
    }
    best
}

/// Decides whether a motif is palindromic under reverse-complement symmetry.
///
/// A motif of width `N` is palindromic iff `N` is even and, for every
/// `i < N / 2`, the dominant nucleotide at position `i` is the complement of
/// the dominant nucleotide at position `N - 1 - i`. Odd widths are never
/// palindromic since only even motifs are considered as homodimer sites.
///
/// # Example
/// ```
/// use genome_prep::palindrome::is_palindromic;
/// use genome_prep::types::PositionFrequencyMatrix;
///
/// let pfm = PositionFrequencyMatrix::from_rows(vec![
///     [0.9, 0.03, 0.03, 0.04],
///     [0.02, 0.9, 0.05, 0.03],
///     [0.05, 0.02, 0.9, 0.03],
///     [0.03, 0.04, 0.03, 0.9],
/// ])
/// .unwrap();
/// assert!(is_palindromic(&pfm));
/// ```
pub fn is_palindromic(matrix: &PositionFrequencyMatrix) -> bool {
    let width = matrix.width();
    if width % 2 != 0 {
        return false;
    }

    (0..width / 2).all(|i| {
        let j = width - 1 - i;
        let top = ALPHABET[dominant_symbol(matrix.row(i))];
        let bottom = ALPHABET[dominant_symbol(matrix.row(j))];
        let paired = complement(top) == Some(bottom);
        if !paired {
            debug!(i, j, %top, %bottom, "positions are not complementary");
        }
        paired
    })
}

/// Copies `input` to `output` byte for byte when the first motif in `input`
/// is palindromic.
///
/// # Returns
/// * `Result<bool>` - `true` if the motif was palindromic and the copy was made
///
/// # Errors
/// * `PrepError::MalformedMatrix` if the motif matrix cannot be decoded
/// * `PrepError::Io` if the input cannot be read or the output written
pub fn copy_if_palindromic<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<bool> {
    let input = input.as_ref();
    let matrix = read_pfm(input)?;
    let palindromic = is_palindromic(&matrix);

    if palindromic {
        fs::copy(input, output.as_ref())?;
    }

    info!(
        width = matrix.width(),
        consensus = %matrix.consensus(),
        palindromic,
        "classified motif"
    );

    Ok(palindromic)
}
