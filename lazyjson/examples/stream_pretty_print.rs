// SPDX-License-Identifier: Apache-2.0

// Example: re-indent a JSON object read from stdin
//
//   echo '{"a": [1, {"b": null}]}' | cargo run --example stream_pretty_print

use lazyjson::{
    parse_array, parse_object, Context, IoReader, ParseError, StreamContext, Value, ValueType,
};

fn quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn print_value(ctx: &dyn Context, value: Value<'_>, depth: usize) -> Result<(), ParseError> {
    match value.value_type() {
        ValueType::Object => print_container(ctx, depth, true),
        ValueType::Array => print_container(ctx, depth, false),
        ValueType::String => {
            print!("{}", quoted(value.raw()));
            Ok(())
        }
        _ => {
            print!("{}", value.raw());
            Ok(())
        }
    }
}

fn print_container(ctx: &dyn Context, depth: usize, object: bool) -> Result<(), ParseError> {
    let indent = "   ".repeat(depth + 1);
    let (open, close) = if object { ('{', '}') } else { ('[', ']') };
    print!("{open}");
    let mut first = true;
    let mut separator = || {
        print!("{}\n{indent}", if first { "" } else { "," });
        first = false;
    };
    if object {
        parse_object(ctx, |name, value| {
            separator();
            print!("{}: ", quoted(name));
            print_value(ctx, value, depth + 1)
        })?;
    } else {
        parse_array(ctx, |value| {
            separator();
            print_value(ctx, value, depth + 1)
        })?;
    }
    if first {
        print!("{close}");
    } else {
        print!("\n{}{close}", "   ".repeat(depth));
    }
    Ok(())
}

fn main() {
    let ctx = StreamContext::new(IoReader(std::io::stdin().lock()));
    if let Err(e) = print_container(&ctx, 0, true) {
        eprintln!("error: {e}");
        if let Some(io_error) = ctx.take_reader_error() {
            eprintln!("caused by: {io_error}");
        }
        std::process::exit(1);
    }
    println!();
}
