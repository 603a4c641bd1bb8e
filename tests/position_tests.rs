use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use time_scheduler::{Position, Span, SpanKind};

fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

#[test]
fn range_position_reads_back_its_inputs() {
    let t0 = ts(2025, 4, 1, 9, 0);
    let t1 = ts(2025, 4, 3, 17, 0);
    let position = Position::range(1, "red", t0, t1);

    assert_eq!(position.id, 1);
    assert_eq!(position.color, "red");
    assert_eq!(position.from(), Some(t0));
    assert_eq!(position.to(), Some(t1));
    assert_eq!(position.kind(), SpanKind::Range);
}

#[test]
fn offset_position_reads_back_its_inputs() {
    let position = Position::offset(2, "blue", 5.0, 3.0);

    assert_eq!(position.id, 2);
    assert_eq!(position.color, "blue");
    assert_eq!(position.position(), Some(5.0));
    assert_eq!(position.duration(), Some(3.0));
    assert_eq!(position.kind(), SpanKind::Offset);
}

#[test]
fn new_copies_span_unchanged() {
    let span = Span::Offset {
        position: -1.25,
        duration: 0.5,
    };
    let position = Position::new(3, String::from("#00ff00"), span.clone());
    assert_eq!(position.span, span);
}

#[test]
fn degenerate_and_malformed_inputs_are_accepted() {
    let t0 = ts(2025, 4, 1, 9, 0);
    let t1 = ts(2025, 3, 1, 9, 0);

    let empty_range = Position::range(1, "red", t0, t0);
    assert_eq!(empty_range.from(), empty_range.to());

    let inverted = Position::range(2, "red", t0, t1);
    assert_eq!(inverted.to(), Some(t1));
    assert!(inverted.span.length().unwrap() < chrono::Duration::zero());

    let zero = Position::offset(3, "red", 4.0, 0.0);
    assert_eq!(zero.duration(), Some(0.0));

    let negative = Position::offset(4, "", 4.0, -2.0);
    assert_eq!(negative.duration(), Some(-2.0));
    assert_eq!(negative.color, "");
}

#[test]
fn serializes_as_flat_tagged_record() {
    let position = Position::offset(2, "blue", 5.0, 3.0);
    let value = serde_json::to_value(&position).unwrap();
    assert_eq!(
        value,
        json!({"id": 2, "color": "blue", "kind": "offset", "position": 5.0, "duration": 3.0})
    );

    let range = Position::range(1, "red", ts(2025, 1, 1, 0, 0), ts(2025, 1, 2, 0, 0));
    let value = serde_json::to_value(&range).unwrap();
    assert_eq!(value["kind"], json!("range"));
    assert!(value.get("position").is_none());
}

#[test]
fn deserializes_plain_records_including_integer_numbers() {
    let offset: Position = serde_json::from_value(
        json!({"id": 2, "color": "blue", "kind": "offset", "position": 5, "duration": 3}),
    )
    .unwrap();
    assert_eq!(offset, Position::offset(2, "blue", 5.0, 3.0));

    let range: Position = serde_json::from_value(json!({
        "id": 1,
        "color": "red",
        "kind": "range",
        "from": "2025-01-01T00:00:00Z",
        "to": "2025-01-02T12:30:00+02:00"
    }))
    .unwrap();
    assert_eq!(range.from(), Some(ts(2025, 1, 1, 0, 0)));
    assert_eq!(range.to(), Some(ts(2025, 1, 2, 10, 30)));
}

#[test]
fn unknown_kind_fails_to_deserialize() {
    let result: Result<Position, _> = serde_json::from_value(
        json!({"id": 1, "color": "red", "kind": "circle", "position": 1, "duration": 1}),
    );
    assert!(result.is_err());
}

#[test]
fn span_kind_names_parse_back() {
    for kind in [SpanKind::Range, SpanKind::Offset] {
        assert_eq!(SpanKind::parse(kind.as_str()), Some(kind));
        assert_eq!(SpanKind::parse(&kind.to_string()), Some(kind));
    }
    assert_eq!(SpanKind::Range.as_str(), "range");
    assert_eq!(SpanKind::Offset.to_string(), "offset");
    assert_eq!(SpanKind::parse("  Offset "), Some(SpanKind::Offset));
    assert_eq!(SpanKind::parse("RANGE"), Some(SpanKind::Range));
    assert_eq!(SpanKind::parse("circle"), None);
    assert_eq!(SpanKind::parse(""), None);
}
