//! Readers and writers for external data formats.
pub mod fortran;
