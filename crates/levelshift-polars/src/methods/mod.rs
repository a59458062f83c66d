//! Implementations of the DataFrame extension trait

mod columns;
mod convert;
mod moments;
