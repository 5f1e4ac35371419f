//! CSV adapters: unit import and the monthly report export.

pub mod report_writer;
pub mod unidad_reader;
