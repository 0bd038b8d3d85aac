/// This module provides the DSV (CSV, TSV, ...) parser and item reader.
pub mod dsv;
