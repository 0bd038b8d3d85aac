#![cfg_attr(docsrs, feature(doc_cfg))]
//#![warn(missing_docs)]

/*!
 # DSV Batch

 Decode delimiter-separated values (CSV, TSV, or any single-character
 delimiter) into typed Rust records, one row at a time.

 ## Core Concepts

- **Record:** A destination type describing its fields through a [`Schema`]:
  each field has a value type and, optionally, a tag matched against header
  names. The [`dsv_record!`] macro writes the description for you.
- **Parser:** Reads one row per call to [`Parser::next`] and writes it into a
  record owned by the caller, overwriting the previous row.
- **ItemReader:** An abstraction returning one owned item per call, built on
  top of a parser by [`DsvItemReader`].

 ## Column mapping

- When at least one field declares a tag, header columns are matched to tags
  by exact name; other columns are ignored.
- Otherwise column `i` is written into field `i`. Without a header line the
  mapping is sized from the first row.

 ## Type conversion

| **Field type**                     | **Empty cell** | **Rule**                                       |
|------------------------------------|----------------|------------------------------------------------|
| `String`                           | `""`           | copied, optionally Unicode-normalized          |
| `bool`                             | `false`        | `1 t T TRUE true True` / `0 f F FALSE false False` |
| `i8`..`i64`, `isize`               | `0`            | base 10, range checked                         |
| `u8`..`u64`, `usize`               | `0`            | base 10, no sign, range checked                |
| `f32`, `f64`                       | `0.0`          | `,` removed first, so `1,989.12` is `1989.12`  |
| `Complex32`, `Complex64`           | `0+0i`         | `3634+327i`, `-1.5+17.0i`                      |

 ## Getting Started

```rust
use dsv_batch::{dsv_record, Advance, Parser};

#[derive(Debug, Default)]
struct Person {
    name: String,
    age: isize,
    gender: String,
    active: bool,
}

dsv_record!(Person {
    name: String => "name",
    age: isize => "age",
    gender: String => "gender",
    active: bool => "active",
});

fn main() -> Result<(), dsv_batch::DsvError> {
    let tsv = "name\tage\tgender\tactive\nalex\t10\tmale\ttrue\nsara\t30\tfemale\ttrue\n";

    let mut parser = Parser::tsv(tsv.as_bytes(), false)?;
    let mut person = Person::default();

    while parser.next(&mut person)? == Advance::Decoded {
        println!("{} is {}", person.name, person.age);
    }

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core module: record descriptors, column mapping and type conversion
pub mod core;

/// Error types
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of items readers (DSV parser and reader)
pub mod item;

pub use crate::core::{
    coerce::Normalization,
    index::FieldIndex,
    item::{ItemReader, ItemReaderResult},
    record::{Field, Record, Schema, Slot},
};
pub use item::dsv::{
    delimiters::Delimiters,
    dsv_reader::{DsvItemReader, DsvItemReaderBuilder},
    parser::{Advance, Parser, ParserBuilder},
};
