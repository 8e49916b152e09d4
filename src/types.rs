use crate::error::{PrepError, Result};
use crate::palindrome::dominant_symbol;
use ndarray::{Array2, ArrayView1};
use phf::phf_map;

/// Column order of every matrix row
pub const ALPHABET: [char; 4] = ['A', 'C', 'G', 'T'];

/// Watson-Crick pairing over the matrix alphabet
pub static COMPLEMENT: phf::Map<char, char> = phf_map! {
    'A' => 'T',
    'T' => 'A',
    'C' => 'G',
    'G' => 'C',
};

/// Returns the complementary nucleotide, or `None` for symbols outside ACGT.
pub fn complement(symbol: char) -> Option<char> {
    COMPLEMENT.get(&symbol).copied()
}

/// Represents a Position Frequency Matrix (PFM)
///
/// Stored as a `width x 4` array, one row per motif position with columns in
/// [`ALPHABET`] order. Every value is a finite, non-negative frequency; the
/// constructors reject anything else with [`PrepError::MalformedMatrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFrequencyMatrix {
    values: Array2<f64>,
}

impl PositionFrequencyMatrix {
    /// Builds a matrix from rows given in A, C, G, T order.
    ///
    /// # Errors
    /// * `PrepError::MalformedMatrix` if any value is negative, NaN or infinite
    pub fn from_rows(rows: Vec<[f64; 4]>) -> Result<Self> {
        let width = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let values = Array2::from_shape_vec((width, ALPHABET.len()), flat)
            .map_err(|e| PrepError::malformed_matrix(e.to_string()))?;
        Self::try_from_array(values)
    }

    /// Wraps an existing array after checking its shape and values.
    ///
    /// # Errors
    /// * `PrepError::MalformedMatrix` if the array does not have exactly 4
    ///   columns or holds a value that is not a non-negative frequency
    pub fn try_from_array(values: Array2<f64>) -> Result<Self> {
        if values.ncols() != ALPHABET.len() {
            return Err(PrepError::malformed_matrix(format!(
                "expected {} columns per row, found {}",
                ALPHABET.len(),
                values.ncols()
            )));
        }

        if let Some(((row, col), value)) = values
            .indexed_iter()
            .find(|&(_, v)| !v.is_finite() || *v < 0.0)
        {
            return Err(PrepError::malformed_matrix(format!(
                "row {}, column {}: {} is not a non-negative frequency",
                row + 1,
                ALPHABET[col],
                value
            )));
        }

        Ok(Self { values })
    }

    /// Number of motif positions
    pub fn width(&self) -> usize {
        self.values.nrows()
    }

    /// Frequencies at one motif position. Panics if `position >= width()`.
    pub fn row(&self, position: usize) -> ArrayView1<'_, f64> {
        self.values.row(position)
    }

    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.values.rows().into_iter()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Dominant nucleotide of every position, e.g. `"ACGT"`.
    pub fn consensus(&self) -> String {
        self.rows().map(|row| ALPHABET[dominant_symbol(row)]).collect()
    }
}
