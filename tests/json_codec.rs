#![cfg(feature = "serde")]

use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use timi::Time;

#[derive(Debug, Serialize, Deserialize)]
struct TimeTestStruct {
    time1: Time,
    time2: Time,
}

fn new_year_2021() -> Time {
    Time::date(2021, 1, 1, 0, 0, 0, 0, &Utc)
}

#[test]
fn marshal_valid_value() {
    assert_eq!(serde_json::to_string(&new_year_2021()).unwrap(), r#""2021-01-01T00:00:00Z""#);
}

#[test]
fn marshal_struct_with_null_field() {
    let value = TimeTestStruct {
        time1: new_year_2021(),
        time2: Time::NULL,
    };

    assert_eq!(
        serde_json::to_string(&value).unwrap(),
        r#"{"time1":"2021-01-01T00:00:00Z","time2":null}"#
    );
}

#[test]
fn unmarshal_struct_cases() {
    let cases = [
        (r#"{"time1":"2021-01-01T00:00:00Z","time2":"2021-01-01T00:00:00Z"}"#, Some(new_year_2021())),
        (r#"{"time1":"2021-01-01T00:00:00Z","time2":null}"#, Some(Time::NULL)),
        (r#"{"time1":"2021-01-01T00:00:00Z","time2":""}"#, None),
        (r#"{"time1":"2021-01-01T00:00:00Z","time2":"null"}"#, None),
    ];

    for (index, (input, expected_time2)) in cases.into_iter().enumerate() {
        let decoded = serde_json::from_str::<TimeTestStruct>(input);

        match expected_time2 {
            Some(expected) => {
                let decoded = decoded.unwrap_or_else(|err| panic!("case {index}: {err}"));
                assert_eq!(decoded.time1, new_year_2021(), "case {index}");
                assert_eq!(decoded.time2, expected, "case {index}");
            }
            None => assert!(decoded.is_err(), "case {index}: expected an error"),
        }
    }
}

#[test]
fn missing_field_decodes_as_null() {
    let decoded: TimeTestStruct = serde_json::from_str(r#"{"time1":"2021-01-01T00:00:00Z"}"#).unwrap();
    assert!(decoded.time2.is_null());
}

#[test]
fn non_string_values_are_rejected() {
    assert!(serde_json::from_str::<Time>("1609459200").is_err());
    assert!(serde_json::from_str::<Time>("true").is_err());
    assert!(serde_json::from_str::<Time>(r#"{"$date":"2021-01-01T00:00:00Z"}"#).is_err());
}

#[test]
fn round_trip_keeps_nanoseconds_and_normalizes_offsets() {
    let time = Time::date(2024, 3, 15, 14, 30, 45, 123_456_789, &Utc);
    let encoded = serde_json::to_string(&time).unwrap();

    assert_eq!(encoded, r#""2024-03-15T14:30:45.123456789Z""#);
    assert_eq!(serde_json::from_str::<Time>(&encoded).unwrap(), time);

    let shifted: Time = serde_json::from_str(r#""2021-01-01T05:30:00+05:30""#).unwrap();
    assert_eq!(shifted, new_year_2021());
    assert_eq!(serde_json::to_string(&shifted).unwrap(), r#""2021-01-01T00:00:00Z""#);
}

#[test]
fn serde_agrees_with_byte_codec() {
    let values = [
        Time::NULL,
        new_year_2021(),
        new_year_2021().add(TimeDelta::milliseconds(250)),
    ];

    for value in values {
        let bytes = value.marshal_json().unwrap();

        assert_eq!(serde_json::to_vec(&value).unwrap(), bytes);
        assert_eq!(Time::unmarshal_json(&bytes).unwrap(), value);
        assert_eq!(serde_json::from_slice::<Time>(&bytes).unwrap(), value);
    }
}

#[test]
fn optional_wrapping_is_not_needed_for_null() {
    let values: Vec<Time> = serde_json::from_str(r#"[null,"2021-01-01T00:00:00Z"]"#).unwrap();
    assert_eq!(values, vec![Time::NULL, new_year_2021()]);
}

#[test]
fn unrepresentable_years_fail_instead_of_writing_garbage() {
    let values = [
        Time::date(10000, 1, 1, 0, 0, 0, 0, &Utc),
        Time::date(-1, 1, 1, 0, 0, 0, 0, &Utc),
        new_year_2021().add(TimeDelta::max_value()),
    ];

    for value in values {
        assert!(value.marshal_json().is_err(), "{value}");
        assert!(value.marshal_text().is_err(), "{value}");
        assert!(serde_json::to_string(&value).is_err(), "{value}");

        let wrapped = TimeTestStruct {
            time1: value,
            time2: Time::NULL,
        };
        assert!(serde_json::to_string(&wrapped).is_err(), "{value}");
    }
}

#[test]
fn boundary_years_round_trip() {
    let values = [
        Time::date(0, 1, 1, 0, 0, 0, 0, &Utc),
        Time::date(9999, 12, 31, 23, 59, 59, 999_999_999, &Utc),
    ];

    for value in values {
        let encoded = serde_json::to_string(&value).unwrap();
        assert_eq!(serde_json::from_str::<Time>(&encoded).unwrap(), value);

        let text = value.marshal_text().unwrap();
        assert_eq!(Time::unmarshal_text(text.as_bytes()).unwrap(), value);
    }
}

#[test]
fn only_uppercase_separator_and_designator_decode() {
    let inputs = [
        r#"{"time1":"2021-01-01 00:00:00Z","time2":null}"#,
        r#"{"time1":"2021-01-01t00:00:00z","time2":null}"#,
        r#"{"time1":"2021-01-01T00:00:00z","time2":null}"#,
    ];

    for input in inputs {
        assert!(serde_json::from_str::<TimeTestStruct>(input).is_err(), "{input}");
    }
}
