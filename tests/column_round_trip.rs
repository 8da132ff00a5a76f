use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use glidercheck::{
    column::{self, Column, ColumnError, ColumnType, Locale, TextMode, Value},
    model::{DailyWeight, GliderCard, GliderType, Record},
};

fn modes() -> [TextMode; 3] {
    [
        TextMode::Neutral,
        TextMode::Aware(Locale::POSIX),
        TextMode::Aware(Locale::CENTRAL_EUROPEAN),
    ]
}

fn round_trip(ty: ColumnType, value: &Value) {
    let column = Column::optional("value", ty);
    for mode in modes() {
        let text = column::render(value, mode);
        let parsed = column::parse(&column, &text, mode)
            .unwrap_or_else(|e| panic!("{mode:?}: '{text}' does not parse: {e}"));
        assert_eq!(&parsed, value, "{mode:?}: '{text}'");
    }
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2100, 1u32..=365)
        .prop_map(|(year, day)| NaiveDate::from_yo_opt(year, day).expect("valid ordinal"))
}

fn time_strategy() -> impl Strategy<Value = NaiveTime> {
    (0u32..86_400).prop_map(|secs| {
        NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).expect("valid seconds")
    })
}

proptest! {
    #[test]
    fn integer_round_trips(v in any::<i64>()) {
        round_trip(ColumnType::Integer, &Value::Integer(v));
    }

    #[test]
    fn decimal_round_trips(mantissa in -10_000_000i64..10_000_000, scale in 0u32..6) {
        round_trip(ColumnType::Decimal, &Value::Decimal(Decimal::new(mantissa, scale)));
    }

    #[test]
    fn boolean_round_trips(v in any::<bool>()) {
        round_trip(ColumnType::Boolean, &Value::Boolean(v));
    }

    #[test]
    fn date_round_trips(d in date_strategy()) {
        round_trip(ColumnType::Date, &Value::Date(d));
    }

    #[test]
    fn time_round_trips(t in time_strategy()) {
        round_trip(ColumnType::Time, &Value::Time(t));
    }

    #[test]
    fn datetime_round_trips(d in date_strategy(), t in time_strategy()) {
        round_trip(ColumnType::DateTime, &Value::DateTime(NaiveDateTime::new(d, t)));
    }

    #[test]
    fn text_round_trips(s in "\\PC{1,40}") {
        round_trip(ColumnType::Text, &Value::Text(s));
    }
}

#[test]
fn absent_values_round_trip_as_empty_text() {
    for ty in [
        ColumnType::Integer,
        ColumnType::Decimal,
        ColumnType::Boolean,
        ColumnType::Date,
        ColumnType::Time,
        ColumnType::DateTime,
        ColumnType::Text,
    ] {
        round_trip(ty, &Value::Null);
    }
}

#[test]
fn neutral_formats_are_fixed() {
    let at = NaiveDate::from_ymd_opt(2024, 7, 3)
        .unwrap()
        .and_hms_opt(9, 5, 0)
        .unwrap();
    assert_eq!(column::render(&Value::DateTime(at), TextMode::Neutral), "2024-07-03 09:05:00");
    assert_eq!(
        column::render(&Value::Date(at.date()), TextMode::Neutral),
        "2024-07-03"
    );
    assert_eq!(
        column::render(&Value::Decimal(Decimal::new(102, 2)), TextMode::Neutral),
        "1.02"
    );
    assert_eq!(column::render(&Value::Boolean(true), TextMode::Neutral), "True");
}

#[test]
fn aware_formats_follow_locale() {
    let date = NaiveDate::from_ymd_opt(2024, 7, 3).unwrap();
    assert_eq!(
        column::render(&Value::Date(date), TextMode::Aware(Locale::POSIX)),
        "07/03/2024"
    );
    assert_eq!(
        column::render(&Value::Date(date), TextMode::Aware(Locale::CENTRAL_EUROPEAN)),
        "03.07.2024"
    );
    assert_eq!(
        column::render(
            &Value::Decimal(Decimal::new(1, 0)),
            TextMode::Aware(Locale::POSIX)
        ),
        "1.000"
    );
}

#[test]
fn booleans_parse_ignoring_case_and_reject_other_text() {
    let column = Column::required("main", ColumnType::Boolean);
    assert_eq!(
        column::parse(&column, "TRUE", TextMode::Neutral).unwrap(),
        Value::Boolean(true)
    );
    assert_eq!(
        column::parse(&column, "false", TextMode::Neutral).unwrap(),
        Value::Boolean(false)
    );
    assert!(matches!(
        column::parse(&column, "yes", TextMode::Neutral),
        Err(ColumnError::Format { .. })
    ));
}

#[test]
fn record_columns_round_trip_through_text() {
    let card = GliderCard {
        id: 7,
        registration: "OK-4321".to_string(),
        competition_number: "X1".to_string(),
        glider_type_id: 1,
        pilot_id: 2,
        organization_id: 3,
        landing_gear: true,
        winglets: false,
        certified_min_seat_weight: Some(70),
        certified_max_seat_weight: Some(110),
        glider_weight: Some(260),
        description: Some("Trailer 12".to_string()),
        ..GliderCard::default()
    };

    for mode in modes() {
        let mut copy = GliderCard::default();
        for column in GliderCard::columns() {
            let text = card.column_as_str(column.name, mode).unwrap();
            if !text.is_empty() {
                copy.str_to_column(column.name, &text, mode).unwrap();
            }
        }
        assert_eq!(copy, card);
    }
}

#[test]
fn invalid_record_text_names_the_column() {
    let mut glider_type = GliderType::default();
    let err = glider_type
        .str_to_column("coefficient", "1.0x", TextMode::Neutral)
        .unwrap_err();
    assert!(matches!(
        &err,
        ColumnError::Format { column, text, .. } if column == "coefficient" && text == "1.0x"
    ));

    let mut daily = DailyWeight::default();
    assert!(matches!(
        daily.str_to_column("weight", "12", TextMode::Neutral),
        Err(ColumnError::UnknownColumn { .. })
    ));
    assert!(matches!(
        daily.str_to_column("date", "", TextMode::Neutral),
        Err(ColumnError::Required { .. })
    ));
}
