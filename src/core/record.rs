//! Record shape descriptors.
//!
//! A decode target describes its fields ahead of time through [`Schema`]: an
//! ordered list of [`Field`]s, each carrying the Rust field name, an optional
//! tag matched against header columns, and a typed accessor ([`Slot`]) used to
//! write the coerced value in place.
//!
//! Most records do not need to build a schema by hand; the [`dsv_record!`]
//! macro generates the [`Record`] implementation from a field list.
//!
//! ```
//! use dsv_batch::dsv_record;
//! use dsv_batch::core::record::Record;
//!
//! #[derive(Default)]
//! struct Person {
//!     name: String,
//!     age: u8,
//! }
//!
//! dsv_record!(Person {
//!     name: String => "name",
//!     age: u8 => "age",
//! });
//!
//! let schema = Person::schema();
//! assert_eq!(schema.len(), 2);
//! assert!(schema.is_tagged());
//! assert_eq!(schema.get(1).unwrap().tag_name(), Some("age"));
//! ```
//!
//! [`dsv_record!`]: crate::dsv_record

use num_complex::{Complex32, Complex64};

/// A type whose rows can be decoded from delimiter-separated text.
pub trait Record: Sized {
    /// Returns the ordered field descriptors of this record.
    ///
    /// Called once per parser, at construction.
    fn schema() -> Schema<Self>;
}

/// Typed accessor to one field of a record.
///
/// The variant fixes the semantic type the cell is coerced into.
pub enum Slot<T> {
    Str(fn(&mut T) -> &mut String),
    Bool(fn(&mut T) -> &mut bool),
    I8(fn(&mut T) -> &mut i8),
    I16(fn(&mut T) -> &mut i16),
    I32(fn(&mut T) -> &mut i32),
    I64(fn(&mut T) -> &mut i64),
    Isize(fn(&mut T) -> &mut isize),
    U8(fn(&mut T) -> &mut u8),
    U16(fn(&mut T) -> &mut u16),
    U32(fn(&mut T) -> &mut u32),
    U64(fn(&mut T) -> &mut u64),
    Usize(fn(&mut T) -> &mut usize),
    F32(fn(&mut T) -> &mut f32),
    F64(fn(&mut T) -> &mut f64),
    C64(fn(&mut T) -> &mut Complex32),
    C128(fn(&mut T) -> &mut Complex64),
    /// A declared field the decoder cannot fill, named by its type.
    Unsupported(&'static str),
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slot<T> {}

impl<T> Slot<T> {
    /// Name of the semantic type behind this slot, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Slot::Str(_) => "string",
            Slot::Bool(_) => "bool",
            Slot::I8(_) => "int8",
            Slot::I16(_) => "int16",
            Slot::I32(_) => "int32",
            Slot::I64(_) => "int64",
            Slot::Isize(_) => "int",
            Slot::U8(_) => "uint8",
            Slot::U16(_) => "uint16",
            Slot::U32(_) => "uint32",
            Slot::U64(_) => "uint64",
            Slot::Usize(_) => "uint",
            Slot::F32(_) => "float32",
            Slot::F64(_) => "float64",
            Slot::C64(_) => "complex64",
            Slot::C128(_) => "complex128",
            Slot::Unsupported(name) => *name,
        }
    }
}

impl<T> std::fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slot({})", self.type_name())
    }
}

/// Value types a [`Field`] can point at.
pub trait Coercible: Sized {
    fn slot<T>(accessor: fn(&mut T) -> &mut Self) -> Slot<T>;
}

macro_rules! coercible {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Coercible for $ty {
                fn slot<T>(accessor: fn(&mut T) -> &mut Self) -> Slot<T> {
                    Slot::$variant(accessor)
                }
            }
        )*
    };
}

coercible! {
    String => Str,
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    Complex32 => C64,
    Complex64 => C128,
}

/// Descriptor of one record field.
#[derive(Debug)]
pub struct Field<T> {
    name: &'static str,
    tag: Option<&'static str>,
    slot: Slot<T>,
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> Field<T> {
    /// Creates an untagged field from an explicit slot.
    ///
    /// # Parameters
    /// - `name`: the Rust field name, used in error messages
    /// - `slot`: the accessor writing the converted value
    pub fn new(name: &'static str, slot: Slot<T>) -> Self {
        Self {
            name,
            tag: None,
            slot,
        }
    }

    /// Builds a field from an accessor, picking the slot from the value type.
    ///
    /// ```
    /// use dsv_batch::core::record::Field;
    ///
    /// struct Row {
    ///     count: u32,
    /// }
    ///
    /// let field = Field::<Row>::of::<u32>("count", |row| &mut row.count).tag("n");
    /// assert_eq!(field.slot().type_name(), "uint32");
    /// ```
    pub fn of<V: Coercible>(name: &'static str, accessor: fn(&mut T) -> &mut V) -> Self {
        Self::new(name, V::slot(accessor))
    }

    /// Declares a field whose type cannot be decoded; any row reaching it
    /// fails with [`DsvError::UnsupportedType`](crate::DsvError::UnsupportedType).
    pub fn unsupported(name: &'static str, type_name: &'static str) -> Self {
        Self::new(name, Slot::Unsupported(type_name))
    }

    /// Sets the header name this field is matched against.
    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// The Rust field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The header name this field is matched against, if any.
    pub fn tag_name(&self) -> Option<&'static str> {
        self.tag
    }

    /// The typed accessor of this field.
    pub fn slot(&self) -> Slot<T> {
        self.slot
    }
}

/// Ordered field list of a record.
#[derive(Debug)]
pub struct Schema<T> {
    fields: Vec<Field<T>>,
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Schema<T> {
    /// Creates an empty schema; fields are appended with [`field`](Self::field).
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a field (builder pattern).
    pub fn field(mut self, field: Field<T>) -> Self {
        self.fields.push(field);
        self
    }

    /// Fields in column order.
    pub fn fields(&self) -> &[Field<T>] {
        &self.fields
    }

    /// The field at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&Field<T>> {
        self.fields.get(index)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `true` when at least one field declares a tag.
    pub fn is_tagged(&self) -> bool {
        self.fields.iter().any(|field| field.tag.is_some())
    }
}

/// Implements [`Record`] for a struct from its field list.
///
/// Each entry is `field: Type`, optionally followed by `=> "tag"`. Fields are
/// listed in column order; untagged records are decoded positionally.
///
/// ```
/// use dsv_batch::dsv_record;
///
/// #[derive(Default)]
/// struct Measure {
///     label: String,
///     value: f64,
/// }
///
/// dsv_record!(Measure { label: String, value: f64 });
/// ```
#[macro_export]
macro_rules! dsv_record {
    ($record:ident { $($field:ident : $ty:ty $(=> $tag:literal)?),* $(,)? }) => {
        impl $crate::core::record::Record for $record {
            fn schema() -> $crate::core::record::Schema<Self> {
                $crate::core::record::Schema::new()
                $(
                    .field({
                        let field = $crate::core::record::Field::<$record>::of::<$ty>(
                            stringify!($field),
                            |record: &mut $record| &mut record.$field,
                        );
                        $(let field = field.tag($tag);)?
                        field
                    })
                )*
            }
        }
    };
}
