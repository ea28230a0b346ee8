// SPDX-License-Identifier: Apache-2.0

//! UTF-16 surrogate pairs must decode identically in every context, including when a
//! pair straddles stream chunk boundaries.

use lazyjson::{
    parse_array, parse_object, BufferContext, ChunkReader, ConstBufferContext, Context,
    ErrorReason, ParseError, StreamContext,
};
use test_log::test;

/// Collects field names and string values from a flat object or array.
fn strings<C: Context + ?Sized>(ctx: &C, input: &str) -> Result<Vec<String>, ParseError> {
    let mut out = Vec::new();
    if input.starts_with('{') {
        parse_object(ctx, |name, value| {
            out.push(name.to_string());
            out.push(value.to()?);
            Ok(())
        })?;
    } else {
        parse_array(ctx, |value| {
            out.push(value.to()?);
            Ok(())
        })?;
    }
    Ok(out)
}

/// Runs `input` through every context and checks they all produce `expected`.
fn test_fixture(input: &str, expected: &[&str]) {
    let bytes = input.as_bytes();
    let const_buffer = strings(&ConstBufferContext::new(bytes), input).unwrap();
    assert_eq!(const_buffer, expected, "ConstBufferContext");

    let mut buffer = bytes.to_vec();
    let in_place = strings(&BufferContext::new(&mut buffer), input).unwrap();
    assert_eq!(in_place, expected, "BufferContext");

    for chunk_size in [1, 3, 5, 8, bytes.len()] {
        let ctx = StreamContext::new(ChunkReader::new(bytes, chunk_size));
        let streamed = strings(&ctx, input)
            .unwrap_or_else(|e| panic!("chunk size {chunk_size}: {e}"));
        assert_eq!(streamed, expected, "StreamContext, chunk size {chunk_size}");
    }
}

/// Checks that every context rejects `input` with `reason`.
fn test_error_fixture(input: &str, reason: ErrorReason) {
    let bytes = input.as_bytes();
    let err = strings(&ConstBufferContext::new(bytes), input).unwrap_err();
    assert_eq!(err.reason(), &reason, "ConstBufferContext");

    let mut buffer = bytes.to_vec();
    let err = strings(&BufferContext::new(&mut buffer), input).unwrap_err();
    assert_eq!(err.reason(), &reason, "BufferContext");

    let err = strings(&StreamContext::new(ChunkReader::new(bytes, 2)), input).unwrap_err();
    assert_eq!(err.reason(), &reason, "StreamContext");
}

macro_rules! surrogate_tests {
    ($($name:ident: $input:expr => [$($expected:expr),*];)*) => {
        $(
            paste::paste! {
                #[test]
                fn [<test_ $name>]() {
                    test_fixture($input, &[$($expected),*]);
                }
            }
        )*
    };
}

surrogate_tests! {
    basic_surrogate_pair: r#"["\uD801\uDC37"]"# => ["\u{10437}"];
    musical_clef: r#"["\uD834\uDD1E"]"# => ["\u{1D11E}"];
    multiple_pairs: r#"["\uD801\uDC37\uD834\uDD1E"]"# => ["\u{10437}\u{1D11E}"];
    lowercase_hex: r#"["\ud83d\ude00"]"# => ["\u{1F600}"];
    highest_code_point: r#"["\uDBFF\uDFFF"]"# => ["\u{10FFFF}"];
    pair_in_object_key: r#"{"\uD801\uDC37": "value"}"# => ["\u{10437}", "value"];
    mixed_content: r#"{"text": "Hello \uD801\uDC37 World"}"# => ["text", "Hello \u{10437} World"];
    pairs_in_many_elements: r#"["\uD801\uDC37", "plain", "\uD834\uDD1E!"]"# => ["\u{10437}", "plain", "\u{1D11E}!"];
}

#[test]
fn test_lone_high_surrogate() {
    test_error_fixture(r#"["\uD801"]"#, ErrorReason::ExpectedUtf16LowSurrogate);
    test_error_fixture(r#"["\uD801x"]"#, ErrorReason::ExpectedUtf16LowSurrogate);
    test_error_fixture(r#"["\uD801\t"]"#, ErrorReason::ExpectedUtf16LowSurrogate);
}

#[test]
fn test_lone_low_surrogate() {
    test_error_fixture(r#"["\uDC37"]"#, ErrorReason::InvalidUtf16Character);
}

#[test]
fn test_two_high_surrogates() {
    test_error_fixture(r#"["\uD801\uD801"]"#, ErrorReason::InvalidUtf16Character);
}

#[test]
fn test_truncated_pair() {
    test_error_fixture(r#"["\uD801\uDC"#, ErrorReason::UnterminatedValue);
    test_error_fixture(r#"["\uD801\u"]"#, ErrorReason::InvalidEscapeSequence);
}
