use std::{fs::File, io::Read, path::Path};

use csv::StringRecord;
use log::{debug, trace};

use crate::{
    core::{
        coerce::{self, Normalization},
        index::{self, FieldIndex},
        record::{Record, Schema},
    },
    error::{DsvError, Result},
    item::dsv::{
        delimiters::{self, Delimiters},
        tokenizer::Tokenizer,
    },
};

/// Outcome of [`Parser::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A row was decoded into the target.
    Decoded,
    /// The stream is exhausted; the target was not touched.
    EndOfStream,
}

impl Advance {
    pub fn is_end_of_stream(self) -> bool {
        self == Advance::EndOfStream
    }
}

/// Row-by-row decoder of delimiter-separated text into a [`Record`].
///
/// The parser never allocates records: every call to [`next`](Parser::next)
/// overwrites the fields of the caller's target in place, so the caller reads
/// or copies the target before asking for the next row.
///
/// # Examples
///
/// ```
/// use dsv_batch::{dsv_record, Advance, Parser};
///
/// #[derive(Debug, Default)]
/// struct Person {
///     name: String,
///     age: isize,
///     gender: String,
///     active: bool,
/// }
///
/// dsv_record!(Person {
///     name: String => "name",
///     age: isize => "age",
///     gender: String => "gender",
///     active: bool => "active",
/// });
///
/// let data = "name,age,gender,active\nalex,10,male,true\n";
/// let mut parser = Parser::csv(data.as_bytes(), false).unwrap();
/// let mut person = Person::default();
///
/// assert_eq!(parser.next(&mut person).unwrap(), Advance::Decoded);
/// assert_eq!(person.name, "alex");
/// assert_eq!(person.age, 10);
/// assert!(person.active);
///
/// assert_eq!(parser.next(&mut person).unwrap(), Advance::EndOfStream);
/// ```
pub struct Parser<R, T> {
    tokenizer: Tokenizer<R>,
    schema: Schema<T>,
    headers: Option<Vec<String>>,
    indices: Vec<FieldIndex>,
    normalization: Option<Normalization>,
    record: StringRecord,
    rows_read: u64,
}

impl<R: Read, T: Record> Parser<R, T> {
    /// Creates a parser reading a header line, with the delimiter looked up
    /// by name in the default [`Delimiters`] table (`"csv"` or `"tsv"`).
    pub fn new(rdr: R, lazy_quotes: bool, dsv_type: &str) -> Result<Self> {
        ParserBuilder::new()
            .dsv_type(dsv_type)
            .lazy_quotes(lazy_quotes)
            .from_reader(rdr)
    }

    /// Same as [`Parser::new`] for input without a header line.
    pub fn without_header(rdr: R, lazy_quotes: bool, dsv_type: &str) -> Result<Self> {
        ParserBuilder::new()
            .dsv_type(dsv_type)
            .lazy_quotes(lazy_quotes)
            .has_headers(false)
            .from_reader(rdr)
    }

    /// Creates a comma-separated parser; the first line is the header.
    ///
    /// # Parameters
    /// - `rdr`: the source of the text
    /// - `lazy_quotes`: keep stray quotes as text instead of failing the row
    ///
    /// # Examples
    ///
    /// ```
    /// use dsv_batch::{dsv_record, Parser};
    ///
    /// #[derive(Default)]
    /// struct City {
    ///     city: String,
    ///     pop: u32,
    /// }
    ///
    /// dsv_record!(City { city: String => "city", pop: u32 => "pop" });
    ///
    /// let mut parser = Parser::csv("pop,city\n42695,Concord\n".as_bytes(), false).unwrap();
    /// let mut city = City::default();
    /// parser.next(&mut city).unwrap();
    ///
    /// assert_eq!(city.city, "Concord");
    /// assert_eq!(city.pop, 42695);
    /// ```
    pub fn csv(rdr: R, lazy_quotes: bool) -> Result<Self> {
        Self::new(rdr, lazy_quotes, "csv")
    }

    /// Creates a tab-separated parser; the first line is the header.
    pub fn tsv(rdr: R, lazy_quotes: bool) -> Result<Self> {
        Self::new(rdr, lazy_quotes, "tsv")
    }

    /// Creates a comma-separated parser for input without a header line.
    ///
    /// Columns are mapped to fields by position; the width of the first row
    /// fixes how many columns are decoded.
    pub fn csv_without_header(rdr: R, lazy_quotes: bool) -> Result<Self> {
        Self::without_header(rdr, lazy_quotes, "csv")
    }

    /// Creates a tab-separated parser for input without a header line.
    pub fn tsv_without_header(rdr: R, lazy_quotes: bool) -> Result<Self> {
        Self::without_header(rdr, lazy_quotes, "tsv")
    }

    fn with_header(
        mut tokenizer: Tokenizer<R>,
        normalization: Option<Normalization>,
    ) -> Result<Self> {
        let mut header = StringRecord::new();
        if !tokenizer.read_record(&mut header)? {
            return Err(DsvError::MissingHeader);
        }

        let headers: Vec<String> = header.iter().map(str::to_string).collect();
        let schema = T::schema();
        let indices = index::resolve(headers.as_slice(), &schema);

        debug!(
            "field index resolved from header: mode={}, columns={}, mapped={}",
            if schema.is_tagged() { "tagged" } else { "positional" },
            indices.len(),
            indices
                .iter()
                .filter(|entry| matches!(entry, FieldIndex::Field(_)))
                .count()
        );

        Ok(Self {
            tokenizer,
            schema,
            headers: Some(headers),
            indices,
            normalization,
            record: header,
            rows_read: 0,
        })
    }

    fn headerless(tokenizer: Tokenizer<R>, normalization: Option<Normalization>) -> Self {
        Self {
            tokenizer,
            schema: T::schema(),
            headers: None,
            indices: Vec::new(),
            normalization,
            record: StringRecord::new(),
            rows_read: 0,
        }
    }

    /// Decodes the next row into `data`.
    ///
    /// Blank records are skipped. At the end of the stream
    /// `Ok(Advance::EndOfStream)` is returned and `data` is left as is.
    ///
    /// Columns without a destination field, and columns past the width the
    /// field index was built for, are ignored; fields they would have
    /// written keep their previous value.
    ///
    /// # Errors
    ///
    /// Read failures are returned unchanged. When a cell cannot be converted
    /// the row is abandoned at that column: fields written by earlier columns
    /// of the same row keep their new values, later ones are untouched.
    pub fn next(&mut self, data: &mut T) -> Result<Advance> {
        loop {
            if !self.tokenizer.read_record(&mut self.record)? {
                debug!("end of stream after {} rows", self.rows_read);
                return Ok(Advance::EndOfStream);
            }
            if !self.record.is_empty() {
                break;
            }
            debug!("skipping blank record at line {}", self.tokenizer.position().line());
        }

        if self.indices.is_empty() {
            self.indices = index::positional(self.record.len());
            debug!(
                "field index resolved from first row: mode=positional, columns={}",
                self.indices.len()
            );
        }

        self.rows_read += 1;

        for (column, raw) in self.record.iter().enumerate() {
            let Some(FieldIndex::Field(index)) = self.indices.get(column).copied() else {
                continue;
            };

            let field = self
                .schema
                .get(index)
                .ok_or(DsvError::FieldIndexOutOfRange {
                    index,
                    len: self.schema.len(),
                })?;

            coerce::coerce(field, column, raw, self.normalization, data)?;
        }

        trace!("row {} decoded ({} columns)", self.rows_read, self.record.len());

        Ok(Advance::Decoded)
    }

    /// Header names, when the parser was built in header mode.
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    /// Column to field map; empty until the first row in headerless mode.
    pub fn field_index(&self) -> &[FieldIndex] {
        &self.indices
    }

    /// Field descriptors of the decode target.
    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    /// Normalization currently applied to string fields.
    pub fn normalization(&self) -> Option<Normalization> {
        self.normalization
    }

    /// Enables or disables normalization of string fields for later rows.
    pub fn set_normalization(&mut self, normalization: Option<Normalization>) {
        self.normalization = normalization;
    }

    /// Number of non-blank rows pulled from the stream, including rows that
    /// failed to decode.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Line number where the next row starts.
    pub fn line(&self) -> u64 {
        self.tokenizer.position().line()
    }
}

#[derive(Debug, Clone)]
enum DelimiterSelector {
    Char(char),
    Named(String),
}

/// A builder for configuring a [`Parser`].
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Delimiter table: [`Delimiters::default`] (`csv`, `tsv`)
/// - Headers: enabled
/// - Lazy quotes: disabled
/// - Normalization: none
///
/// # Examples
///
/// ```
/// use dsv_batch::{dsv_record, Delimiters, Normalization, ParserBuilder, Parser};
///
/// #[derive(Default)]
/// struct Row {
///     name: String,
///     age: isize,
/// }
///
/// dsv_record!(Row { name: String => "name", age: isize => "age" });
///
/// let parser: Parser<_, Row> = ParserBuilder::new()
///     .delimiters(Delimiters::default().with("psv", '|'))
///     .dsv_type("psv")
///     .normalization(Some(Normalization::Nfkc))
///     .from_reader("name|age\nalex|10".as_bytes())
///     .unwrap();
///
/// assert_eq!(parser.headers(), Some(&["name".to_string(), "age".to_string()][..]));
/// ```
#[derive(Debug, Clone)]
pub struct ParserBuilder {
    delimiter: DelimiterSelector,
    delimiters: Delimiters,
    has_headers: bool,
    lazy_quotes: bool,
    normalization: Option<Normalization>,
}

impl Default for ParserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            delimiter: DelimiterSelector::Char(','),
            delimiters: Delimiters::default(),
            has_headers: true,
            lazy_quotes: false,
            normalization: None,
        }
    }

    /// Sets the delimiter character directly.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = DelimiterSelector::Char(delimiter);
        self
    }

    /// Selects the delimiter by name, resolved through the delimiter table
    /// when the parser is built.
    pub fn dsv_type(mut self, name: impl Into<String>) -> Self {
        self.delimiter = DelimiterSelector::Named(name.into());
        self
    }

    /// Replaces the delimiter table used by [`dsv_type`](Self::dsv_type).
    pub fn delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Sets whether the first line holds column names.
    ///
    /// Without headers the columns are mapped to fields by position, using
    /// the width of the first row.
    pub fn has_headers(mut self, yes: bool) -> Self {
        self.has_headers = yes;
        self
    }

    /// Accepts quotes inside unquoted fields instead of failing the row.
    pub fn lazy_quotes(mut self, yes: bool) -> Self {
        self.lazy_quotes = yes;
        self
    }

    /// Sets the Unicode normalization applied to every string field.
    ///
    /// # Parameters
    /// - `normalization`: `None` copies cells unchanged (the default)
    ///
    /// # Examples
    ///
    /// ```
    /// use dsv_batch::{dsv_record, Normalization, Parser, ParserBuilder};
    ///
    /// #[derive(Default)]
    /// struct Name {
    ///     name: String,
    /// }
    ///
    /// dsv_record!(Name { name: String });
    ///
    /// let mut parser: Parser<_, Name> = ParserBuilder::new()
    ///     .has_headers(false)
    ///     .normalization(Some(Normalization::Nfkc))
    ///     .from_reader("\u{FF71}\u{FF9A}\u{FF6F}\u{FF78}\u{FF7D}".as_bytes())
    ///     .unwrap();
    /// let mut name = Name::default();
    /// parser.next(&mut name).unwrap();
    ///
    /// assert_eq!(name.name, "\u{30A2}\u{30EC}\u{30C3}\u{30AF}\u{30B9}");
    /// ```
    pub fn normalization(mut self, normalization: Option<Normalization>) -> Self {
        self.normalization = normalization;
        self
    }

    fn delimiter_byte(&self) -> Result<u8> {
        match &self.delimiter {
            DelimiterSelector::Char(delimiter) => delimiters::delimiter_byte(*delimiter),
            DelimiterSelector::Named(name) => self.delimiters.resolve(name),
        }
    }

    /// Creates a [`Parser`] from a reader.
    ///
    /// In header mode the first line is consumed here.
    ///
    /// # Errors
    ///
    /// Fails with [`DsvError::UnknownDelimiter`] or
    /// [`DsvError::InvalidDelimiter`] before reading anything, and with
    /// [`DsvError::MissingHeader`] when the stream is empty in header mode.
    pub fn from_reader<R: Read, T: Record>(self, rdr: R) -> Result<Parser<R, T>> {
        let delimiter = self.delimiter_byte()?;
        let tokenizer = Tokenizer::new(rdr, delimiter, self.lazy_quotes);

        if self.has_headers {
            Parser::with_header(tokenizer, self.normalization)
        } else {
            Ok(Parser::headerless(tokenizer, self.normalization))
        }
    }

    /// Creates a [`Parser`] reading the file at `path`.
    pub fn from_path<P: AsRef<Path>, T: Record>(self, path: P) -> Result<Parser<File, T>> {
        let delimiter = self.delimiter_byte()?;
        let file = File::open(path)?;
        self.delimiter(delimiter as char).from_reader(file)
    }
}
