//! Tests for the column module

use std::sync::Arc;

use chrono::{TimeZone, Utc};

use super::*;
use crate::config::OverflowPolicy;
use crate::error::column_error;
use crate::index::MemoryIndex;
use crate::interface::{CollectingSink, Literal, RowSlot, SinkValue};
use crate::layout::RowLayout;
use crate::types::{RowAddress, TxnId};

fn single(def: ColumnDef) -> RowLayout {
    RowLayout::builder("t").column(def).build().unwrap()
}

fn truncating(def: ColumnDef) -> RowLayout {
    RowLayout::builder("t")
        .options(CodecOptions::default().with_overflow(OverflowPolicy::Truncate))
        .column(def)
        .build()
        .unwrap()
}

fn error_of(report: &eyre::Report) -> &ColumnError {
    column_error(report).expect("report should carry a ColumnError")
}

fn all_types() -> RowLayout {
    RowLayout::builder("all")
        .column(ColumnDef::new("flag", ColumnType::Boolean))
        .column(ColumnDef::new("tiny", ColumnType::Byte))
        .column(ColumnDef::new("small", ColumnType::Short))
        .column(ColumnDef::new("num", ColumnType::Int))
        .column(ColumnDef::new("big", ColumnType::Long))
        .column(ColumnDef::new("ratio", ColumnType::Double))
        .column(ColumnDef::new("at", ColumnType::Date))
        .column(ColumnDef::identity("seq"))
        .column(ColumnDef::numeric("price", 10, 2))
        .column(ColumnDef::varchar("name", 16))
        .column(ColumnDef::varbinary("raw", 8))
        .column(ColumnDef::binary("hash", 4))
        .column(ColumnDef::blob("doc", 32))
        .build()
        .unwrap()
}

#[test]
fn fixed_types_round_trip_exactly() {
    let layout = all_types();
    let mut row = layout.new_row();
    let col = |name: &str| layout.column_by_name(name).unwrap();

    col("flag").set_boolean(&mut row, 0, true).unwrap();
    col("tiny").set_long(&mut row, 0, -128).unwrap();
    col("small").set_long(&mut row, 0, i16::MAX as i64).unwrap();
    col("num").set_integer(&mut row, 0, i32::MIN).unwrap();
    col("big").set_long(&mut row, 0, 0x0102_0304_0506_0708).unwrap();
    col("ratio").set_double(&mut row, 0, -0.1).unwrap();
    col("seq").set_long(&mut row, 0, 77).unwrap();
    col("price").set_string(&mut row, 0, "-12.34").unwrap();

    let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
    col("at").set_date(&mut row, 0, at).unwrap();

    assert!(col("flag").get_boolean(&row, 0).unwrap());
    assert_eq!(col("tiny").get_long(&row, 0).unwrap(), -128);
    assert_eq!(col("small").get_long(&row, 0).unwrap(), i16::MAX as i64);
    assert_eq!(col("num").get_integer(&row, 0).unwrap(), i32::MIN);
    assert_eq!(col("big").get_long(&row, 0).unwrap(), 0x0102_0304_0506_0708);
    assert_eq!(
        col("ratio").get_double(&row, 0).unwrap().to_bits(),
        (-0.1f64).to_bits()
    );
    assert_eq!(col("seq").get_long(&row, 0).unwrap(), 77);
    assert_eq!(col("price").get_string(&row, 0).unwrap(), "-12.34");
    assert_eq!(col("at").get_date(&row, 0).unwrap(), at);
}

#[test]
fn variable_types_round_trip_exactly() {
    let layout = all_types();
    let mut row = layout.new_row();
    let col = |name: &str| layout.column_by_name(name).unwrap();

    col("name").set_string(&mut row, 0, "héllo €").unwrap();
    col("raw").set_bytes(&mut row, 0, &[0, 1, 0xFF]).unwrap();
    col("hash").set_bytes(&mut row, 0, &[9, 8, 7, 6]).unwrap();
    col("doc").set_bytes(&mut row, 0, b"{}").unwrap();

    assert_eq!(col("name").get_string(&row, 0).unwrap(), "héllo €");
    assert_eq!(col("raw").get_bytes(&row, 0).unwrap(), vec![0, 1, 0xFF]);
    assert_eq!(col("hash").get_bytes(&row, 0).unwrap(), vec![9, 8, 7, 6]);
    assert_eq!(col("doc").get_bytes(&row, 0).unwrap(), b"{}".to_vec());
}

#[test]
fn big_endian_layout_is_stable() {
    let layout = RowLayout::builder("t")
        .column(ColumnDef::new("s", ColumnType::Short))
        .column(ColumnDef::new("i", ColumnType::Int))
        .build()
        .unwrap();
    let mut row = layout.new_row();
    layout.columns()[0].set_long(&mut row, 0, 0x0102).unwrap();
    layout.columns()[1].set_long(&mut row, 0, -2).unwrap();

    assert_eq!(row, vec![0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFE, 0b0000_0011]);
}

#[test]
fn scenario_a_long_min_round_trips() {
    let layout = single(ColumnDef::new("v", ColumnType::Long));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    col.set_long(&mut row, 0, i64::MIN).unwrap();
    assert_eq!(col.get_long(&row, 0).unwrap(), i64::MIN);
    assert_eq!(col.raw_bytes(&row, 0), &[0x80, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(col.get_string(&row, 0).unwrap(), i64::MIN.to_string());
}

#[test]
fn null_invariant_returns_zero_values() {
    let layout = all_types();
    let mut row = vec![0xAAu8; layout.row_size()];
    for col in layout.columns() {
        col.set_null(&mut row, 0);
    }

    for col in layout.columns() {
        assert!(col.is_null(&row, 0), "{}", col.name());
        assert_eq!(col.get_string(&row, 0).unwrap(), "");
        assert_eq!(col.get_integer(&row, 0).unwrap(), 0);
        assert_eq!(col.get_long(&row, 0).unwrap(), 0);
        assert_eq!(col.get_double(&row, 0).unwrap(), 0.0);
        assert!(!col.get_boolean(&row, 0).unwrap());
        assert!(col.get_bytes(&row, 0).unwrap().is_empty());
        assert_eq!(col.get_date(&row, 0).unwrap().timestamp_millis(), 0);
    }
}

#[test]
fn null_bit_toggles_only_its_own_column() {
    let layout = all_types();
    let mut row = layout.new_row();
    let name = layout.column_by_name("name").unwrap();

    name.set_non_null(&mut row, 0);
    let present: Vec<_> = layout
        .columns()
        .iter()
        .filter(|c| !c.is_null(&row, 0))
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(present, vec!["name"]);

    name.set_null(&mut row, 0);
    assert!(layout.columns().iter().all(|c| c.is_null(&row, 0)));
}

#[test]
fn offsets_are_cumulative_lengths() {
    let layout = all_types();
    let mut expected = 0;
    for col in layout.columns() {
        assert_eq!(col.offset(), expected, "{}", col.name());
        expected += col.length();
    }
    assert_eq!(layout.data_size(), expected);
}

#[test]
fn lengths_follow_type_widths() {
    let layout = all_types();
    let lengths: Vec<_> = layout.columns().iter().map(Column::length).collect();
    assert_eq!(lengths, vec![1, 1, 2, 4, 8, 8, 8, 8, 8, 17, 9, 5, 33]);
}

#[test]
fn values_at_nonzero_row_offset() {
    let layout = single(ColumnDef::new("v", ColumnType::Int));
    let col = &layout.columns()[0];
    let size = layout.row_size();
    let mut page = vec![0u8; size * 3];

    col.set_integer(&mut page, size, 11).unwrap();
    col.set_integer(&mut page, 2 * size, 22).unwrap();

    assert!(col.is_null(&page, 0));
    assert_eq!(col.get_integer(&page, size).unwrap(), 11);
    assert_eq!(col.get_integer(&page, 2 * size).unwrap(), 22);
}

#[test]
fn equality_is_null_aware_and_bytewise() {
    let layout = single(ColumnDef::varchar("v", 8));
    let col = &layout.columns()[0];
    let mut a = layout.new_row();
    let mut b = layout.new_row();

    assert!(col.is_equal(&a, 0, &b, 0));

    col.set_string(&mut a, 0, "abc").unwrap();
    assert!(!col.is_equal(&a, 0, &b, 0));

    col.set_string(&mut b, 0, "abcdef").unwrap();
    col.set_string(&mut b, 0, "abc").unwrap();
    assert!(col.is_equal(&a, 0, &b, 0));

    col.set_string(&mut b, 0, "abd").unwrap();
    assert!(!col.is_equal(&a, 0, &b, 0));
}

#[test]
fn scenario_c_short_null_equality() {
    let layout = single(ColumnDef::new("s", ColumnType::Short));
    let col = &layout.columns()[0];
    let mut a = layout.new_row();
    let mut b = layout.new_row();

    assert!(col.is_equal(&a, 0, &b, 0));

    col.set_long(&mut a, 0, 5).unwrap();
    assert!(!col.is_equal(&a, 0, &b, 0));
    assert!(!col.is_equal(&b, 0, &a, 0));

    col.set_long(&mut b, 0, 5).unwrap();
    assert!(col.is_equal(&a, 0, &b, 0));
}

#[test]
fn equality_against_external_values() {
    let layout = single(ColumnDef::varchar("v", 8));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    assert!(!col.is_equal_str(&row, 0, "").unwrap());
    col.set_string(&mut row, 0, "key").unwrap();

    assert!(col.is_equal_str(&row, 0, "key").unwrap());
    assert!(!col.is_equal_str(&row, 0, "ke").unwrap());

    let key = col.raw_bytes(&row, 0).to_vec();
    assert!(col.is_equal_bytes(&row, 0, &key));
    assert!(!col.is_equal_bytes(&row, 0, &key[..3]));
}

#[test]
fn eval_to_buffer_copies_slot_bytes() {
    let layout = single(ColumnDef::new("v", ColumnType::Int));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();
    let mut out = [0u8; 6];

    assert_eq!(col.eval_to_buffer(&row, 0, &mut out, 1).unwrap(), 0);

    col.set_integer(&mut row, 0, 0x0A0B0C0D).unwrap();
    assert_eq!(col.eval_to_buffer(&row, 0, &mut out, 1).unwrap(), 4);
    assert_eq!(out, [0, 0x0A, 0x0B, 0x0C, 0x0D, 0]);

    assert!(col.eval_to_buffer(&row, 0, &mut out, 3).is_err());
}

#[test]
fn eval_to_result_uses_typed_writes() {
    let layout = all_types();
    let mut row = layout.new_row();
    let col = |name: &str| layout.column_by_name(name).unwrap();

    col("flag").set_boolean(&mut row, 0, true).unwrap();
    col("big").set_long(&mut row, 0, -9).unwrap();
    col("ratio").set_double(&mut row, 0, 2.5).unwrap();
    col("price").set_string(&mut row, 0, "3.5").unwrap();
    col("name").set_string(&mut row, 0, "x").unwrap();
    col("raw").set_bytes(&mut row, 0, &[1, 2]).unwrap();

    let mut sink = CollectingSink::new();
    for name in ["flag", "big", "ratio", "price", "name", "raw", "num"] {
        col(name).eval_to_result(3, &row, 0, &mut sink).unwrap();
    }

    assert_eq!(
        sink.into_values(),
        vec![
            SinkValue::Long(1),
            SinkValue::Long(-9),
            SinkValue::Double(2.5),
            SinkValue::Text("3.50".into()),
            SinkValue::Text("x".into()),
            SinkValue::Bytes(vec![1, 2]),
            SinkValue::Null,
        ]
    );
}

#[test]
fn scenario_b_overflow_rejected_by_default() {
    let layout = single(ColumnDef::varchar("v", 10));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    col.set_string(&mut row, 0, "before").unwrap();
    let err = col.set_string(&mut row, 0, "abcdefghijk").unwrap_err();
    assert_eq!(
        error_of(&err),
        &ColumnError::Overflow {
            column: "v".into(),
            capacity: 10,
            required: 11,
        }
    );
    assert_eq!(col.get_string(&row, 0).unwrap(), "before");
}

#[test]
fn scenario_b_truncate_policy_keeps_ten_bytes() {
    let layout = truncating(ColumnDef::varchar("v", 10));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    col.set_string(&mut row, 0, "abcdefghijk").unwrap();
    assert_eq!(col.get_string(&row, 0).unwrap(), "abcdefghij");
    assert_eq!(col.get_bytes(&row, 0).unwrap().len(), 10);
}

#[test]
fn truncation_never_splits_a_character() {
    let layout = truncating(ColumnDef::varchar("v", 5));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    col.set_string(&mut row, 0, "ab€€").unwrap();
    assert_eq!(col.get_string(&row, 0).unwrap(), "ab€");

    col.set_string(&mut row, 0, "a😀").unwrap();
    assert_eq!(col.get_string(&row, 0).unwrap(), "a");
}

#[test]
fn binary_overflow_follows_policy() {
    let strict = single(ColumnDef::varbinary("v", 2));
    let mut row = strict.new_row();
    let err = strict.columns()[0]
        .set_bytes(&mut row, 0, &[1, 2, 3])
        .unwrap_err();
    assert!(matches!(error_of(&err), ColumnError::Overflow { .. }));
    assert!(strict.columns()[0].is_null(&row, 0));

    let lenient = truncating(ColumnDef::varbinary("v", 2));
    let mut row = lenient.new_row();
    lenient.columns()[0]
        .set_bytes(&mut row, 0, &[1, 2, 3])
        .unwrap();
    assert_eq!(lenient.columns()[0].get_bytes(&row, 0).unwrap(), vec![1, 2]);
}

#[test]
fn shorter_value_clears_stale_tail() {
    let layout = single(ColumnDef::varbinary("v", 4));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    col.set_bytes(&mut row, 0, &[7, 7, 7, 7]).unwrap();
    col.set_bytes(&mut row, 0, &[1]).unwrap();
    assert_eq!(col.raw_bytes(&row, 0), &[1, 1, 0, 0, 0]);
}

#[test]
fn binary_pads_to_declared_length() {
    let layout = single(ColumnDef::binary("h", 4));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    col.set_bytes(&mut row, 0, &[0xAB]).unwrap();
    assert_eq!(col.get_bytes(&row, 0).unwrap(), vec![0xAB, 0, 0, 0]);
    assert_eq!(col.get_string(&row, 0).unwrap(), "ab000000");
}

#[test]
fn binary_text_form_is_hex() {
    let layout = single(ColumnDef::varbinary("v", 4));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    col.set_string(&mut row, 0, "00ff10").unwrap();
    assert_eq!(col.get_bytes(&row, 0).unwrap(), vec![0x00, 0xFF, 0x10]);
    assert_eq!(col.get_string(&row, 0).unwrap(), "00ff10");

    let err = col.set_string(&mut row, 0, "xyz").unwrap_err();
    assert!(matches!(error_of(&err), ColumnError::Malformed { .. }));
}

#[test]
fn string_fallback_for_numeric_accessors() {
    let layout = single(ColumnDef::varchar("v", 8));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    col.set_long(&mut row, 0, 42).unwrap();
    assert_eq!(col.get_string(&row, 0).unwrap(), "42");
    assert_eq!(col.get_long(&row, 0).unwrap(), 42);
    assert_eq!(col.get_integer(&row, 0).unwrap(), 42);
    assert_eq!(col.get_double(&row, 0).unwrap(), 42.0);
    assert!(col.get_boolean(&row, 0).unwrap());

    col.set_string(&mut row, 0, "abc").unwrap();
    let err = col.get_long(&row, 0).unwrap_err();
    assert_eq!(
        error_of(&err),
        &ColumnError::Malformed {
            column: "v".into(),
            value: "abc".into(),
            reason: "invalid digit found in string".into(),
        }
    );
}

#[test]
fn unsupported_representations_are_reported() {
    let layout = single(ColumnDef::new("v", ColumnType::Int));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();
    col.set_integer(&mut row, 0, 1).unwrap();

    let err = col.get_bytes(&row, 0).unwrap_err();
    assert_eq!(
        error_of(&err),
        &ColumnError::Unsupported {
            column: "v".into(),
            ty: ColumnType::Int,
            operation: "get_bytes",
        }
    );
    assert!(col.get_date(&row, 0).is_err());
    assert!(col.set_bytes(&mut row, 0, &[1]).is_err());

    let bytes = single(ColumnDef::varbinary("b", 4));
    let mut row = bytes.new_row();
    assert!(bytes.columns()[0].set_long(&mut row, 0, 1).is_err());
}

#[test]
fn narrowing_writes_are_range_checked() {
    let layout = single(ColumnDef::new("s", ColumnType::Short));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    let err = col.set_long(&mut row, 0, 40_000).unwrap_err();
    assert!(matches!(error_of(&err), ColumnError::OutOfRange { .. }));
    assert!(col.is_null(&row, 0));

    assert!(col.set_string(&mut row, 0, "-32769").is_err());
    col.set_string(&mut row, 0, " -32768 ").unwrap();
    assert_eq!(col.get_long(&row, 0).unwrap(), -32768);
}

fn variant(report: &eyre::Report) -> &'static str {
    match error_of(report) {
        ColumnError::Unsupported { .. } => "unsupported",
        ColumnError::Malformed { .. } => "malformed",
        ColumnError::OutOfRange { .. } => "out_of_range",
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn integer_columns_accept_only_exact_doubles() {
    let two_63 = 2f64.powi(63);
    let cases: [(&str, f64, Result<i64, &str>); 11] = [
        ("big", 42.0, Ok(42)),
        ("big", -0.0, Ok(0)),
        ("big", -two_63, Ok(i64::MIN)),
        ("big", two_63, Err("out_of_range")),
        ("big", 1e19, Err("out_of_range")),
        ("big", 1.5, Err("malformed")),
        ("big", f64::INFINITY, Err("malformed")),
        ("big", f64::NAN, Err("malformed")),
        ("seq", two_63, Err("out_of_range")),
        ("small", 32_767.0, Ok(32_767)),
        ("small", 40_000.0, Err("out_of_range")),
    ];

    let layout = all_types();
    for (name, input, expected) in cases {
        let col = layout.column_by_name(name).unwrap();
        let mut row = layout.new_row();
        let outcome = col
            .set_double(&mut row, 0, input)
            .map(|()| col.get_long(&row, 0).unwrap())
            .map_err(|e| variant(&e));
        assert_eq!(outcome, expected, "{name} <- {input}");
        assert_eq!(col.is_null(&row, 0), expected.is_err(), "{name} <- {input}");
    }
}

#[test]
fn double_column_narrows_by_truncation() {
    let two_63 = 2f64.powi(63);
    let cases: [(f64, Result<i32, &str>, Result<i64, &str>); 8] = [
        (-7.9, Ok(-7), Ok(-7)),
        (7.9, Ok(7), Ok(7)),
        (2_147_483_647.5, Ok(i32::MAX), Ok(2_147_483_647)),
        (3e9, Err("out_of_range"), Ok(3_000_000_000)),
        (-two_63, Err("out_of_range"), Ok(i64::MIN)),
        (two_63, Err("out_of_range"), Err("out_of_range")),
        (f64::NEG_INFINITY, Err("out_of_range"), Err("out_of_range")),
        (f64::NAN, Err("out_of_range"), Err("out_of_range")),
    ];

    let layout = all_types();
    let col = layout.column_by_name("ratio").unwrap();
    let mut row = layout.new_row();
    for (stored, as_int, as_long) in cases {
        col.set_double(&mut row, 0, stored).unwrap();
        let int = col.get_integer(&row, 0).map_err(|e| variant(&e));
        let long = col.get_long(&row, 0).map_err(|e| variant(&e));
        assert_eq!(int, as_int, "get_integer of {stored}");
        assert_eq!(long, as_long, "get_long of {stored}");
    }
}

#[test]
fn boolean_column_numeric_views() {
    let layout = all_types();
    let col = layout.column_by_name("flag").unwrap();
    let mut row = layout.new_row();

    col.set_boolean(&mut row, 0, true).unwrap();
    assert_eq!(col.get_integer(&row, 0).unwrap(), 1);
    assert_eq!(col.get_long(&row, 0).unwrap(), 1);
    assert_eq!(col.get_double(&row, 0).unwrap(), 1.0);

    for (input, expected) in [(0, false), (1, true), (-5, true)] {
        col.set_long(&mut row, 0, input).unwrap();
        assert_eq!(col.get_boolean(&row, 0).unwrap(), expected, "{input}");
        assert_eq!(col.raw_bytes(&row, 0), [expected as u8]);
    }

    col.set_double(&mut row, 0, 0.0).unwrap();
    assert!(!col.get_boolean(&row, 0).unwrap());
    let err = col.set_double(&mut row, 0, 2.5).unwrap_err();
    assert_eq!(variant(&err), "malformed");
}

#[test]
fn date_column_rejects_scalar_views() {
    let layout = all_types();
    let col = layout.column_by_name("at").unwrap();
    let mut row = layout.new_row();
    col.set_long(&mut row, 0, 86_400_000).unwrap();

    let reads: [(&str, eyre::Result<()>); 3] = [
        ("get_integer", col.get_integer(&row, 0).map(drop)),
        ("get_double", col.get_double(&row, 0).map(drop)),
        ("get_boolean", col.get_boolean(&row, 0).map(drop)),
    ];
    for (operation, result) in reads {
        let err = result.unwrap_err();
        assert_eq!(
            error_of(&err),
            &ColumnError::Unsupported {
                column: "at".into(),
                ty: ColumnType::Date,
                operation,
            }
        );
    }

    let err = col.set_double(&mut row, 0, 1.0).unwrap_err();
    assert_eq!(variant(&err), "unsupported");
    let err = col.set_boolean(&mut row, 0, true).unwrap_err();
    assert_eq!(variant(&err), "unsupported");

    assert_eq!(col.get_long(&row, 0).unwrap(), 86_400_000);
    assert_eq!(col.get_string(&row, 0).unwrap(), "1970-01-02 00:00:00.000");
}

#[test]
fn numeric_scale_and_precision() {
    let layout = single(ColumnDef::numeric("p", 5, 2));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    col.set_string(&mut row, 0, "123.456").unwrap();
    assert_eq!(col.get_string(&row, 0).unwrap(), "123.46");
    assert_eq!(col.get_long(&row, 0).unwrap(), 123);
    assert_eq!(col.get_double(&row, 0).unwrap(), 123.46);

    col.set_double(&mut row, 0, 1.5).unwrap();
    assert_eq!(col.get_string(&row, 0).unwrap(), "1.50");

    col.set_long(&mut row, 0, 7).unwrap();
    assert_eq!(col.raw_bytes(&row, 0), &700i64.to_be_bytes());

    let err = col.set_string(&mut row, 0, "1000.00").unwrap_err();
    assert!(matches!(error_of(&err), ColumnError::OutOfRange { .. }));
}

#[test]
fn date_text_form() {
    let layout = single(ColumnDef::new("d", ColumnType::Date));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    col.set_string(&mut row, 0, "2024-02-29T13:45:10.25").unwrap();
    assert_eq!(col.get_string(&row, 0).unwrap(), "2024-02-29 13:45:10.250");
    assert_eq!(col.get_long(&row, 0).unwrap(), 1_709_214_310_250);
}

#[test]
fn boolean_text_forms() {
    let layout = single(ColumnDef::new("b", ColumnType::Boolean));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();

    col.set_string(&mut row, 0, "TRUE").unwrap();
    assert_eq!(col.get_string(&row, 0).unwrap(), "true");
    col.set_long(&mut row, 0, 0).unwrap();
    assert!(!col.get_boolean(&row, 0).unwrap());
    assert!(col.set_string(&mut row, 0, "maybe").is_err());
}

#[test]
fn set_evaluates_expression_into_cursor() {
    let layout = all_types();
    let mut row = layout.new_row();
    let col = |name: &str| layout.column_by_name(name).unwrap();

    {
        let mut slot = RowSlot::new(&mut row, 0, TxnId(5));
        col("big").set(&mut slot, &Literal::Long(-3), &()).unwrap();
        col("ratio").set(&mut slot, &Literal::Double(0.5), &()).unwrap();
        col("name").set(&mut slot, &Literal::Text("hi".into()), &()).unwrap();
        col("flag").set(&mut slot, &Literal::Boolean(true), &()).unwrap();
        col("price").set(&mut slot, &Literal::Text("9.99".into()), &()).unwrap();
        col("raw").set(&mut slot, &Literal::Bytes(vec![4, 2]), &()).unwrap();
        col("at").set(&mut slot, &Literal::Long(86_400_000), &()).unwrap();
        assert!(slot.is_dirty());
    }

    assert_eq!(col("big").get_long(&row, 0).unwrap(), -3);
    assert_eq!(col("ratio").get_double(&row, 0).unwrap(), 0.5);
    assert_eq!(col("name").get_string(&row, 0).unwrap(), "hi");
    assert!(col("flag").get_boolean(&row, 0).unwrap());
    assert_eq!(col("price").get_string(&row, 0).unwrap(), "9.99");
    assert_eq!(col("raw").get_bytes(&row, 0).unwrap(), vec![4, 2]);
    assert_eq!(
        col("at").get_string(&row, 0).unwrap(),
        "1970-01-02 00:00:00.000"
    );
}

#[test]
fn set_null_expression() {
    let layout = RowLayout::builder("people")
        .column(ColumnDef::new("id", ColumnType::Int).not_null())
        .column(ColumnDef::varchar("nick", 8))
        .build()
        .unwrap();
    let mut row = layout.new_row();
    layout.columns()[1].set_string(&mut row, 0, "x").unwrap();

    let mut slot = RowSlot::new(&mut row, 0, TxnId(1));
    layout.columns()[1].set(&mut slot, &Literal::Null, &()).unwrap();
    assert!(layout.columns()[1].is_null(slot.buffer(), 0));

    let err = layout.columns()[0]
        .set(&mut slot, &Literal::Null, &())
        .unwrap_err();
    assert_eq!(
        error_of(&err),
        &ColumnError::NullViolation {
            table: "people".into(),
            column: "id".into(),
        }
    );
}

#[test]
fn descriptor_flags() {
    let layout = RowLayout::builder("t")
        .column(ColumnDef::new("id", ColumnType::Long).primary_key())
        .column(ColumnDef::identity("seq"))
        .column(ColumnDef::new("n", ColumnType::Int).auto_increment(100))
        .column(ColumnDef::varchar("s", 4).unique().with_default("'none'"))
        .build()
        .unwrap();
    let [id, seq, n, s] = layout.columns() else {
        panic!("expected four columns");
    };

    assert!(id.is_primary_key() && id.is_unique() && id.is_not_null());
    assert_eq!(id.auto_increment_seed(), None);
    assert_eq!(seq.auto_increment_seed(), Some(1));
    assert_eq!(n.auto_increment_seed(), Some(100));
    assert!(s.is_unique() && !s.is_not_null());
    assert_eq!(s.default_expression(), Some("'none'"));
    assert_eq!(s.capacity(), 4);
    assert_eq!(id.column_type().sql_type(), -5);
}

fn indexed(def: ColumnDef) -> (RowLayout, Arc<MemoryIndex>) {
    let mut layout = single(def);
    let memory = Arc::new(MemoryIndex::new());
    let index: Arc<dyn RowIndex> = memory.clone();
    layout.columns_mut()[0].attach_index(&index).unwrap();
    (layout, memory)
}

#[test]
fn index_mirror_round_trip() {
    let (layout, memory) = indexed(ColumnDef::new("v", ColumnType::Long).unique());
    let col = &layout.columns()[0];
    let mut row = layout.new_row();
    let txn = TxnId(7);
    let addr = RowAddress::new(3, 128);

    col.set_long(&mut row, 0, 99).unwrap();
    col.set_index(txn, &row, 0, addr).unwrap();
    col.validate_index(txn, &row, 0, addr).unwrap();
    assert_eq!(memory.lookup(col.raw_bytes(&row, 0)).unwrap(), Some(addr));

    assert!(col.delete_index(txn, &row, 0, addr).unwrap());
    assert_eq!(memory.lookup(col.raw_bytes(&row, 0)).unwrap(), None);
    assert!(memory.is_empty());
}

#[test]
fn nulls_are_never_indexed() {
    let (layout, memory) = indexed(ColumnDef::new("v", ColumnType::Int));
    let col = &layout.columns()[0];
    let row = layout.new_row();

    col.set_index(TxnId(1), &row, 0, RowAddress::new(1, 0)).unwrap();
    assert!(memory.is_empty());
    col.validate_index(TxnId(1), &row, 0, RowAddress::new(1, 0))
        .unwrap();
}

#[test]
fn unique_columns_reject_duplicate_keys() {
    let (layout, memory) = indexed(ColumnDef::new("v", ColumnType::Int).unique());
    let col = &layout.columns()[0];
    let mut row = layout.new_row();
    col.set_integer(&mut row, 0, 1).unwrap();

    col.set_index(TxnId(1), &row, 0, RowAddress::new(1, 0)).unwrap();
    assert!(col
        .set_index(TxnId(1), &row, 0, RowAddress::new(1, 64))
        .is_err());
    assert_eq!(memory.len(), 1);
}

#[test]
fn non_unique_delete_removes_only_this_row() {
    let (layout, memory) = indexed(ColumnDef::new("v", ColumnType::Int));
    let col = &layout.columns()[0];
    let mut row = layout.new_row();
    col.set_integer(&mut row, 0, 1).unwrap();

    let first = RowAddress::new(1, 0);
    let second = RowAddress::new(1, 64);
    col.set_index(TxnId(1), &row, 0, first).unwrap();
    col.set_index(TxnId(1), &row, 0, second).unwrap();
    assert_eq!(memory.len(), 2);

    assert!(col.delete_index(TxnId(2), &row, 0, first).unwrap());
    assert!(!col.delete_index(TxnId(2), &row, 0, first).unwrap());
    col.validate_index(TxnId(2), &row, 0, second).unwrap();
    assert_eq!(memory.entries().len(), 1);
}

#[test]
fn validate_index_mismatch_is_fatal_corruption() {
    let (layout, _memory) = indexed(ColumnDef::new("v", ColumnType::Short).unique());
    let col = &layout.columns()[0];
    let mut row = layout.new_row();
    col.set_long(&mut row, 0, 0x0102).unwrap();
    col.set_index(TxnId(1), &row, 0, RowAddress::new(1, 0)).unwrap();

    let err = col
        .validate_index(TxnId(1), &row, 0, RowAddress::new(2, 8))
        .unwrap_err();
    let column_err = error_of(&err);
    assert!(column_err.is_fatal());
    assert_eq!(
        column_err,
        &ColumnError::IndexCorruption {
            column: "v".into(),
            key: "[0102]".into(),
            expected: RowAddress::new(2, 8),
            found: RowAddress::new(1, 0).to_string(),
        }
    );

    col.set_long(&mut row, 0, 5).unwrap();
    let err = col
        .validate_index(TxnId(1), &row, 0, RowAddress::new(1, 0))
        .unwrap_err();
    assert!(error_of(&err).is_fatal());
    assert!(err.to_string().contains("no entry"));
}

#[test]
fn short_and_int_share_the_index_path() {
    let (short_layout, short_index) = indexed(ColumnDef::new("s", ColumnType::Short));
    let (int_layout, int_index) = indexed(ColumnDef::new("i", ColumnType::Int));
    let short = &short_layout.columns()[0];
    let int = &int_layout.columns()[0];
    let mut short_row = short_layout.new_row();
    let mut int_row = int_layout.new_row();

    for (n, value) in [-300i64, 7, 0, 12_000].into_iter().enumerate() {
        let addr = RowAddress::new(1, n as u32 * 16);
        short.set_long(&mut short_row, 0, value).unwrap();
        int.set_long(&mut int_row, 0, value).unwrap();
        short.set_index(TxnId(1), &short_row, 0, addr).unwrap();
        int.set_index(TxnId(1), &int_row, 0, addr).unwrap();
        short.validate_index(TxnId(1), &short_row, 0, addr).unwrap();
        int.validate_index(TxnId(1), &int_row, 0, addr).unwrap();
    }

    let short_entries = short_index.entries();
    let int_entries = int_index.entries();
    assert_eq!(short_entries.len(), int_entries.len());
    assert!(short_entries.iter().all(|(key, _)| key.len() == 2));
    assert!(int_entries.iter().all(|(key, _)| key.len() == 4));

    let short_addrs: Vec<_> = short_entries.iter().map(|(_, a)| *a).collect();
    let int_addrs: Vec<_> = int_entries.iter().map(|(_, a)| *a).collect();
    assert_eq!(short_addrs, int_addrs);

    short.set_long(&mut short_row, 0, 7).unwrap();
    int.set_long(&mut int_row, 0, 7).unwrap();
    let addr = RowAddress::new(1, 16);
    assert!(short.delete_index(TxnId(2), &short_row, 0, addr).unwrap());
    assert!(int.delete_index(TxnId(2), &int_row, 0, addr).unwrap());
    assert_eq!(short_index.len(), 3);
    assert_eq!(int_index.len(), 3);
}
