//! Preprocessing of motif matrices, BED regions, FASTQ reads and motif match files

pub mod bed;
pub mod error;
pub mod fastq;
pub mod fimo;
pub mod meme;
pub mod palindrome;
pub mod types;
