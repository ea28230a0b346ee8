// SPDX-License-Identifier: Apache-2.0

// Example: decoding a nested document into a struct with dispatch chains

use lazyjson::{dispatch, ignore, parse_array, parse_object, BufferContext, ParseError};

#[derive(Debug, Default)]
struct Nested {
    field1: f64,
    field2: bool,
}

#[derive(Debug, Default)]
struct Document {
    field1: i64,
    field2: String,
    nested: Nested,
    array: Vec<i64>,
}

fn main() -> Result<(), ParseError> {
    let json = r#"{ "field1": 42, "array" : [ 1, 2, 3 ], "field2": "asd",
        "nested" : { "field1" : 42.0, "field2" : true, "ignored_field" : 0,
                     "ignored_object" : {"a":[0]} },
        "ignored_array" : [4, 2, {"a":5}, [7]] }"#;
    println!("Input: {json}");

    let mut buffer = json.as_bytes().to_vec();
    let ctx = BufferContext::new(&mut buffer);
    let mut doc = Document::default();

    parse_object(&ctx, |name, value| {
        dispatch(name)
            .on("field1", || value.store_into(&mut doc.field1))
            .on("field2", || value.store_into(&mut doc.field2))
            .on("nested", || {
                parse_object(&ctx, |name, value| {
                    dispatch(name)
                        .on("field1", || value.store_into(&mut doc.nested.field1))
                        .on("field2", || value.store_into(&mut doc.nested.field2))
                        .any(|| ignore(&ctx))
                        .finish()
                        .map(|_| ())
                })
            })
            .on("array", || {
                parse_array(&ctx, |value| {
                    doc.array.push(value.to()?);
                    Ok(())
                })
            })
            .any(|| ignore(&ctx))
            .finish()
            .map(|_| ())
    })?;

    println!("Decoded: {doc:#?}");
    assert_eq!(doc.field1, 42);
    assert_eq!(doc.field2, "asd");
    assert_eq!(doc.array, [1, 2, 3]);
    Ok(())
}
