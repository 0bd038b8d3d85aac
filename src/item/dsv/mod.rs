//! DSV support for decoding delimiter-separated text into typed records.
//!
//! # Module Architecture
//!
//! 1. **Tokenizer**: splits the stream into raw records with the `csv` crate,
//!    honoring double-quote quoting and, unless lazy quotes are enabled,
//!    rejecting stray quotes.
//!
//! 2. **Parser**: resolves the column to field map (from header tags, or by
//!    position) and decodes one row per call into a caller-owned record.
//!
//! 3. **DsvItemReader**: an `ItemReader` over a parser, returning one owned
//!    record per call.
//!
//! Delimiters are chosen directly or by name through a [`Delimiters`] table.
//!
//! # Examples
//!
//! ## Reading rows in place
//!
//! ```
//! use dsv_batch::{dsv_record, Delimiters, ParserBuilder};
//!
//! #[derive(Debug, Default)]
//! struct Person {
//!     name: String,
//!     age: isize,
//!     gender: String,
//!     active: bool,
//! }
//!
//! dsv_record!(Person {
//!     name: String => "name",
//!     age: isize => "age",
//!     gender: String => "gender",
//!     active: bool => "active",
//! });
//!
//! let psv = "\
//! name|age|gender|active
//! alex|10|male|true
//! john|24|male|false
//! ";
//!
//! let mut parser = ParserBuilder::new()
//!     .delimiters(Delimiters::default().with("psv", '|'))
//!     .dsv_type("psv")
//!     .from_reader(psv.as_bytes())
//!     .unwrap();
//!
//! let mut person = Person::default();
//! let mut names = Vec::new();
//! while !parser.next(&mut person).unwrap().is_end_of_stream() {
//!     names.push(person.name.clone());
//! }
//!
//! assert_eq!(names, vec!["alex", "john"]);
//! ```
//!
//! [`Delimiters`]: delimiters::Delimiters

/// Named delimiter table.
pub mod delimiters;

/// Item reader over a parser.
pub mod dsv_reader;

/// Row decoder and its builder.
pub mod parser;

/// Raw record splitting.
pub mod tokenizer;
