use std::{cell::RefCell, fs::File, io::Read, path::Path};

use crate::{
    core::{
        coerce::Normalization,
        item::{ItemReader, ItemReaderResult},
        record::Record,
    },
    error::Result,
    item::dsv::{
        delimiters::Delimiters,
        parser::{Advance, Parser, ParserBuilder},
    },
};

/// A DSV item reader that implements the `ItemReader` trait.
///
/// Each call to [`read`](ItemReader::read) decodes one row into an internal
/// buffer and returns a copy of it.
///
/// # Implementation Details
///
/// - Uses a `RefCell` to provide interior mutability for the parser and the
///   decode buffer, keeping the `read(&self)` signature of `ItemReader`
/// - The buffer starts from `T::default()` and is reused across rows, so a
///   field with no matching column keeps the value of the previous row
///
/// # Examples
///
/// ```
/// use dsv_batch::{dsv_record, DsvItemReaderBuilder, ItemReader};
///
/// #[derive(Debug, Default, Clone)]
/// struct Record {
///     name: String,
///     value: i32,
/// }
///
/// dsv_record!(Record { name: String => "name", value: i32 => "value" });
///
/// let data = "\
/// name,value
/// foo,123
/// bar,456
/// ";
///
/// let reader = DsvItemReaderBuilder::new()
///     .from_reader::<_, Record>(data.as_bytes())
///     .unwrap();
///
/// let record: Record = reader.read().unwrap().unwrap();
/// assert_eq!(record.name, "foo");
/// assert_eq!(record.value, 123);
///
/// let record: Record = reader.read().unwrap().unwrap();
/// assert_eq!(record.name, "bar");
/// assert_eq!(record.value, 456);
///
/// assert!(reader.read().unwrap().is_none());
/// ```
pub struct DsvItemReader<R, T> {
    parser: RefCell<Parser<R, T>>,
    buffer: RefCell<T>,
}

impl<R: Read, T: Record + Default> DsvItemReader<R, T> {
    /// Wraps a configured parser; the decode buffer starts from `T::default()`.
    pub fn new(parser: Parser<R, T>) -> Self {
        Self {
            parser: RefCell::new(parser),
            buffer: RefCell::new(T::default()),
        }
    }

    /// Returns the underlying parser.
    pub fn into_parser(self) -> Parser<R, T> {
        self.parser.into_inner()
    }
}

impl<R: Read, T: Record + Clone> ItemReader<T> for DsvItemReader<R, T> {
    /// Reads the next item from the source.
    ///
    /// # Returns
    /// - `Ok(Some(record))` if a row was decoded
    /// - `Ok(None)` if there are no more rows to read
    /// - `Err(error)` if reading or converting the row failed
    fn read(&self) -> ItemReaderResult<T> {
        let mut parser = self.parser.borrow_mut();
        let mut buffer = self.buffer.borrow_mut();

        match parser.next(&mut buffer)? {
            Advance::Decoded => Ok(Some(buffer.clone())),
            Advance::EndOfStream => Ok(None),
        }
    }
}

/// A builder for configuring DSV item reading.
///
/// Accepts the same options as [`ParserBuilder`]; see its documentation for
/// the defaults.
///
/// # Examples
///
/// ```
/// use dsv_batch::{dsv_record, DsvItemReaderBuilder, ItemReader};
///
/// #[derive(Debug, Default, Clone)]
/// struct Person {
///     name: String,
///     age: u8,
/// }
///
/// dsv_record!(Person { name: String, age: u8 });
///
/// let reader = DsvItemReaderBuilder::new()
///     .dsv_type("tsv")
///     .has_headers(false)
///     .from_reader::<_, Person>("Alice\t30\nBob\t25".as_bytes())
///     .unwrap();
///
/// let mut people: Vec<Person> = Vec::new();
/// while let Some(person) = reader.read().unwrap() {
///     people.push(person);
/// }
///
/// assert_eq!(people.len(), 2);
/// assert_eq!(people[1].name, "Bob");
/// assert_eq!(people[1].age, 25);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DsvItemReaderBuilder {
    parser: ParserBuilder,
}

impl DsvItemReaderBuilder {
    /// Creates a builder with the [`ParserBuilder`] defaults.
    pub fn new() -> Self {
        Self {
            parser: ParserBuilder::new(),
        }
    }

    /// See [`ParserBuilder::delimiter`].
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.parser = self.parser.delimiter(delimiter);
        self
    }

    /// See [`ParserBuilder::dsv_type`].
    pub fn dsv_type(mut self, name: impl Into<String>) -> Self {
        self.parser = self.parser.dsv_type(name);
        self
    }

    pub fn delimiters(mut self, delimiters: Delimiters) -> Self {
        self.parser = self.parser.delimiters(delimiters);
        self
    }

    /// See [`ParserBuilder::has_headers`].
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.parser = self.parser.has_headers(yes);
        self
    }

    pub fn lazy_quotes(mut self, yes: bool) -> Self {
        self.parser = self.parser.lazy_quotes(yes);
        self
    }

    /// See [`ParserBuilder::normalization`].
    pub fn normalization(mut self, normalization: Option<Normalization>) -> Self {
        self.parser = self.parser.normalization(normalization);
        self
    }

    /// Creates a `DsvItemReader` from a reader.
    pub fn from_reader<R: Read, T: Record + Default>(
        self,
        rdr: R,
    ) -> Result<DsvItemReader<R, T>> {
        Ok(DsvItemReader::new(self.parser.from_reader(rdr)?))
    }

    /// Creates a `DsvItemReader` from a file path.
    ///
    /// A file that cannot be opened is reported as
    /// [`DsvError::Io`](crate::DsvError::Io).
    pub fn from_path<P: AsRef<Path>, T: Record + Default>(
        self,
        path: P,
    ) -> Result<DsvItemReader<File, T>> {
        Ok(DsvItemReader::new(self.parser.from_path(path)?))
    }
}
