pub mod common;

use std::{fs::File, io::Write};

use dsv_batch::{
    Advance, Delimiters, DsvError, DsvItemReader, DsvItemReaderBuilder, FieldIndex, ItemReader,
    Normalization, Parser, ParserBuilder, dsv_record,
};
use num_complex::{Complex32, Complex64};
use tempfile::NamedTempFile;

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    name: String,
    age: isize,
    gender: String,
    active: bool,
}

dsv_record!(Person {
    name: String,
    age: isize,
    gender: String,
    active: bool,
});

#[derive(Debug, Default, Clone, PartialEq)]
struct TaggedPerson {
    name: String,
    age: isize,
    gender: String,
    active: bool,
}

dsv_record!(TaggedPerson {
    name: String => "name",
    age: isize => "age",
    gender: String => "gender",
    active: bool => "active",
});

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn expected_people() -> Vec<TaggedPerson> {
    vec![
        TaggedPerson {
            name: "alex".to_string(),
            age: 10,
            gender: "male".to_string(),
            active: true,
        },
        TaggedPerson {
            name: "john".to_string(),
            age: 24,
            gender: "male".to_string(),
            active: false,
        },
        TaggedPerson {
            name: "sara".to_string(),
            age: 30,
            gender: "female".to_string(),
            active: true,
        },
    ]
}

fn drain<R: std::io::Read, T: dsv_batch::Record + Clone>(
    parser: &mut Parser<R, T>,
    target: &mut T,
) -> Result<Vec<T>, DsvError> {
    let mut rows = Vec::new();
    while parser.next(target)? == Advance::Decoded {
        rows.push(target.clone());
    }
    Ok(rows)
}

#[test]
fn tagged_tsv_fixture_is_decoded_in_order() -> Result<(), DsvError> {
    common::init_logger();

    let file = File::open(fixture("people.tsv"))?;
    let mut parser = Parser::tsv(file, false)?;
    let mut person = TaggedPerson::default();

    let people = drain(&mut parser, &mut person)?;

    assert_eq!(people, expected_people());
    assert_eq!(parser.rows_read(), 3);
    Ok(())
}

#[test]
fn tagged_csv_columns_follow_the_header_not_the_struct() -> Result<(), DsvError> {
    let mut parser = ParserBuilder::new().from_path(fixture("people_shuffled.csv"))?;
    let mut person = TaggedPerson::default();

    let people = drain(&mut parser, &mut person)?;

    assert_eq!(people, expected_people());
    assert_eq!(
        parser.field_index(),
        &[
            FieldIndex::Field(3),
            FieldIndex::Field(2),
            FieldIndex::Field(1),
            FieldIndex::Field(0),
        ]
    );
    Ok(())
}

#[test]
fn untagged_csv_is_decoded_by_position() -> Result<(), DsvError> {
    let file = File::open(fixture("people.csv"))?;
    let mut parser = Parser::csv(file, false)?;
    let mut person = Person::default();

    let people = drain(&mut parser, &mut person)?;

    assert_eq!(people.len(), 3);
    assert_eq!(people[1].name, "john");
    assert_eq!(people[1].age, 24);
    assert!(!people[1].active);
    assert_eq!(people[2].gender, "female");
    Ok(())
}

#[test]
fn headerless_tsv_fixture_is_decoded_by_position() -> Result<(), DsvError> {
    let file = File::open(fixture("people_no_header.tsv"))?;
    let mut parser = Parser::tsv_without_header(file, false)?;
    let mut person = Person::default();

    let people = drain(&mut parser, &mut person)?;

    assert_eq!(people.len(), 3);
    assert_eq!(people[0].name, "alex");
    assert_eq!(people[2].age, 30);
    assert!(parser.headers().is_none());
    Ok(())
}

#[test]
fn custom_delimiter_table_enables_psv() -> Result<(), DsvError> {
    common::init_logger();

    let psv =
        "name|age|gender|active\nalex|10|male|true\njohn|24|male|false\nsara|30|female|true\n";
    let mut parser = ParserBuilder::new()
        .delimiters(Delimiters::default().with("psv", '|'))
        .dsv_type("psv")
        .from_reader(psv.as_bytes())?;
    let mut person = TaggedPerson::default();

    assert_eq!(drain(&mut parser, &mut person)?, expected_people());
    Ok(())
}

#[test]
fn delimiter_table_can_be_loaded_from_json() -> Result<(), DsvError> {
    let delimiters: Delimiters =
        serde_json::from_str(r#"{ "csv": ",", "psv": "|" }"#).expect("valid delimiter table");
    let mut parser: Parser<_, TaggedPerson> = ParserBuilder::new()
        .delimiters(delimiters)
        .dsv_type("psv")
        .from_reader("name|age\nsara|30\n".as_bytes())?;
    let mut person = TaggedPerson::default();

    parser.next(&mut person)?;

    assert_eq!(person.name, "sara");
    assert_eq!(person.age, 30);
    Ok(())
}

#[test]
fn strings_are_normalized_when_requested() -> Result<(), DsvError> {
    #[derive(Debug, Default)]
    struct Name {
        name: String,
    }
    dsv_record!(Name { name: String => "name" });

    let data = "name\nｱﾚｯｸｽ\n";

    let mut plain: Parser<_, Name> = Parser::csv(data.as_bytes(), false)?;
    let mut name = Name::default();
    plain.next(&mut name)?;
    assert_eq!(name.name, "ｱﾚｯｸｽ");

    let mut normalized: Parser<_, Name> = ParserBuilder::new()
        .normalization(Some(Normalization::Nfkc))
        .from_reader(data.as_bytes())?;
    normalized.next(&mut name)?;
    assert_eq!(name.name, "アレックス");
    Ok(())
}

#[test]
fn floats_accept_thousands_separators() -> Result<(), DsvError> {
    #[derive(Debug, Default)]
    struct Price {
        label: String,
        single: f32,
        double: f64,
    }
    dsv_record!(Price {
        label: String,
        single: f32,
        double: f64,
    });

    let data = "label\tsingle\tdouble\nbig\t1,989.12\t1,234,567.5\nempty\t\t\n";
    let mut parser = Parser::tsv(data.as_bytes(), false)?;
    let mut price = Price::default();

    parser.next(&mut price)?;
    assert_eq!(price.single, 1989.12_f32);
    assert_eq!(price.double, 1_234_567.5);

    parser.next(&mut price)?;
    assert_eq!(price.label, "empty");
    assert_eq!(price.single, 0.0);
    assert_eq!(price.double, 0.0);
    Ok(())
}

#[test]
fn complex_numbers_are_decoded() -> Result<(), DsvError> {
    #[derive(Debug, Default)]
    struct Signal {
        narrow: Complex32,
        wide: Complex64,
    }
    dsv_record!(Signal {
        narrow: Complex32,
        wide: Complex64,
    });

    let data = "narrow\twide\n3634+327i\t-1.5+17i\n";
    let mut parser = Parser::tsv(data.as_bytes(), false)?;
    let mut signal = Signal::default();

    parser.next(&mut signal)?;

    assert_eq!(signal.narrow, Complex32::new(3634.0, 327.0));
    assert_eq!(signal.wide, Complex64::new(-1.5, 17.0));
    Ok(())
}

#[test]
fn unsigned_fields_reject_signs() -> Result<(), DsvError> {
    #[derive(Debug, Default)]
    struct Counter {
        count: u32,
    }
    dsv_record!(Counter { count: u32 });

    let data = "count\n42\n+5\n-1\n";
    let mut parser = Parser::csv(data.as_bytes(), false)?;
    let mut counter = Counter::default();

    parser.next(&mut counter)?;
    assert_eq!(counter.count, 42);

    assert!(parser.next(&mut counter).is_err_and(|error| error.is_coercion()));
    assert!(parser.next(&mut counter).is_err_and(|error| error.is_coercion()));
    assert_eq!(counter.count, 42);
    Ok(())
}

#[test]
fn headerless_width_comes_from_the_first_row() -> Result<(), DsvError> {
    let data = "alex\t10\njohn\t24\tmale\ttrue\n";
    let mut parser = Parser::tsv_without_header(data.as_bytes(), false)?;
    let mut person = Person::default();

    parser.next(&mut person)?;
    assert_eq!(parser.field_index().len(), 2);

    parser.next(&mut person)?;
    assert_eq!(person.name, "john");
    assert_eq!(person.age, 24);
    assert_eq!(person.gender, "");
    assert!(!person.active);
    Ok(())
}

#[test]
fn blank_lines_are_skipped() -> Result<(), DsvError> {
    let data = "name,age\n\nalex,10\n\n\nsara,30\n";
    let mut parser = Parser::csv(data.as_bytes(), false)?;
    let mut person = TaggedPerson::default();

    let people = drain(&mut parser, &mut person)?;

    assert_eq!(people.len(), 2);
    assert_eq!(people[1].name, "sara");
    Ok(())
}

#[test]
fn fields_without_a_column_keep_their_value() -> Result<(), DsvError> {
    let data = "name,age,nickname\nalex,10,al\n";
    let mut parser = Parser::csv(data.as_bytes(), false)?;
    let mut person = TaggedPerson {
        gender: "unknown".to_string(),
        active: true,
        ..TaggedPerson::default()
    };

    assert_eq!(parser.next(&mut person)?, Advance::Decoded);

    assert_eq!(person.name, "alex");
    assert_eq!(person.age, 10);
    assert_eq!(person.gender, "unknown");
    assert!(person.active);
    assert_eq!(parser.field_index()[2], FieldIndex::Skip);
    Ok(())
}

#[test]
fn tagged_record_ignores_unmatched_headers() -> Result<(), DsvError> {
    let data = "first,second\nalex,10\n";
    let mut parser = Parser::csv(data.as_bytes(), false)?;
    let mut person = TaggedPerson::default();

    assert_eq!(parser.next(&mut person)?, Advance::Decoded);

    assert_eq!(person, TaggedPerson::default());
    Ok(())
}

#[test]
fn end_of_stream_is_stable() -> Result<(), DsvError> {
    let mut parser = Parser::csv("name,age\nalex,10\n".as_bytes(), false)?;
    let mut person = TaggedPerson::default();

    assert_eq!(parser.next(&mut person)?, Advance::Decoded);
    assert_eq!(parser.next(&mut person)?, Advance::EndOfStream);
    assert_eq!(parser.next(&mut person)?, Advance::EndOfStream);
    assert_eq!(person.name, "alex");
    Ok(())
}

#[test]
fn lazy_quotes_keep_stray_quotes() -> Result<(), DsvError> {
    #[derive(Debug, Default)]
    struct Part {
        name: String,
        size: String,
    }
    dsv_record!(Part {
        name: String => "name",
        size: String => "size",
    });

    let data = "name,size\nbolt,3/8\"\n";
    let mut parser = Parser::csv(data.as_bytes(), true)?;
    let mut part = Part::default();

    parser.next(&mut part)?;

    assert_eq!(part.name, "bolt");
    assert_eq!(part.size, "3/8\"");
    Ok(())
}

#[test]
fn quoted_fields_keep_delimiters_and_newlines() -> Result<(), DsvError> {
    let data = "name,gender\n\"Doe, Jane\",\"fe\nmale\"\n";
    let mut parser = Parser::csv(data.as_bytes(), false)?;
    let mut person = TaggedPerson::default();

    parser.next(&mut person)?;

    assert_eq!(person.name, "Doe, Jane");
    assert_eq!(person.gender, "fe\nmale");
    Ok(())
}

#[test]
fn parser_reads_from_a_temporary_file() -> Result<(), DsvError> {
    let mut file = NamedTempFile::new()?;
    write!(file, "name;age\nalex;10\nsara;30\n")?;

    let mut parser = ParserBuilder::new().delimiter(';').from_path(file.path())?;
    let mut person = TaggedPerson::default();

    let people = drain(&mut parser, &mut person)?;

    assert_eq!(people.len(), 2);
    assert_eq!(people[1].age, 30);
    Ok(())
}

#[test]
fn item_reader_returns_owned_rows() -> Result<(), DsvError> {
    common::init_logger();

    let reader: DsvItemReader<_, TaggedPerson> = DsvItemReaderBuilder::new()
        .dsv_type("tsv")
        .from_path(fixture("people.tsv"))?;

    let mut people = Vec::new();
    while let Some(person) = reader.read()? {
        people.push(person);
    }

    assert_eq!(people, expected_people());
    Ok(())
}

#[test]
fn item_reader_without_header() -> Result<(), DsvError> {
    let reader: DsvItemReader<_, Person> = DsvItemReaderBuilder::new()
        .dsv_type("tsv")
        .has_headers(false)
        .from_path(fixture("people_no_header.tsv"))?;

    let first = reader.read()?.expect("first row");
    let second = reader.read()?.expect("second row");

    assert_eq!(first.name, "alex");
    assert_eq!(second.name, "john");
    assert_eq!(reader.into_parser().rows_read(), 2);
    Ok(())
}
