//! Scenario tests for PET derivation and series management.
//!
//! Each classification case lists the raw readings a nurse would enter and the ratio
//! and class the form should show.

use pet_series_core::models::{
    LegacyShape, LegacySlot, LegacyTimePoints, MeasurementPayload, ReadingField, TimePoint,
    TimePoints, TransportClass,
};
use pet_series_core::series::{seed_from_legacy, to_legacy_shape, TestSeries};
use pet_series_core::{derive_results, Database, PetSession};

/// A derivation case.
struct RatioCase {
    id: &'static str,
    serum_creatinine_t0: &'static str,
    dialysate_creatinine_t4: &'static str,
    dialysate_glucose_t0: &'static str,
    dialysate_glucose_t4: &'static str,
    expected_creatinine_ratio: &'static str,
    expected_creatinine_class: Option<TransportClass>,
    expected_glucose_ratio: &'static str,
    expected_glucose_class: Option<TransportClass>,
}

fn get_ratio_cases() -> Vec<RatioCase> {
    vec![
        RatioCase {
            id: "creatinine-high",
            serum_creatinine_t0: "2.0",
            dialysate_creatinine_t4: "1.64",
            dialysate_glucose_t0: "",
            dialysate_glucose_t4: "",
            expected_creatinine_ratio: "0.820",
            expected_creatinine_class: Some(TransportClass::High),
            expected_glucose_ratio: "",
            expected_glucose_class: None,
        },
        RatioCase {
            id: "glucose-high-average",
            serum_creatinine_t0: "",
            dialysate_creatinine_t4: "",
            dialysate_glucose_t0: "200",
            dialysate_glucose_t4: "70",
            expected_creatinine_ratio: "",
            expected_creatinine_class: None,
            expected_glucose_ratio: "0.350",
            expected_glucose_class: Some(TransportClass::HighAverage),
        },
        RatioCase {
            id: "creatinine-boundary-0.81",
            serum_creatinine_t0: "1",
            dialysate_creatinine_t4: "0.81",
            dialysate_glucose_t0: "",
            dialysate_glucose_t4: "",
            expected_creatinine_ratio: "0.810",
            expected_creatinine_class: Some(TransportClass::HighAverage),
            expected_glucose_ratio: "",
            expected_glucose_class: None,
        },
        RatioCase {
            id: "creatinine-boundary-0.50",
            serum_creatinine_t0: "2",
            dialysate_creatinine_t4: "1",
            dialysate_glucose_t0: "",
            dialysate_glucose_t4: "",
            expected_creatinine_ratio: "0.500",
            expected_creatinine_class: Some(TransportClass::LowAverage),
            expected_glucose_ratio: "",
            expected_glucose_class: None,
        },
        RatioCase {
            id: "glucose-boundary-0.26",
            serum_creatinine_t0: "",
            dialysate_creatinine_t4: "",
            dialysate_glucose_t0: "100",
            dialysate_glucose_t4: "26",
            expected_creatinine_ratio: "",
            expected_creatinine_class: None,
            expected_glucose_ratio: "0.260",
            expected_glucose_class: Some(TransportClass::HighAverage),
        },
        RatioCase {
            id: "glucose-boundary-0.49",
            serum_creatinine_t0: "",
            dialysate_creatinine_t4: "",
            dialysate_glucose_t0: "100",
            dialysate_glucose_t4: "49",
            expected_creatinine_ratio: "",
            expected_creatinine_class: None,
            expected_glucose_ratio: "0.490",
            expected_glucose_class: Some(TransportClass::LowAverage),
        },
        RatioCase {
            id: "both-low",
            serum_creatinine_t0: "10",
            dialysate_creatinine_t4: "4",
            dialysate_glucose_t0: "200",
            dialysate_glucose_t4: "120",
            expected_creatinine_ratio: "0.400",
            expected_creatinine_class: Some(TransportClass::Low),
            expected_glucose_ratio: "0.600",
            expected_glucose_class: Some(TransportClass::Low),
        },
        RatioCase {
            id: "serum-zero",
            serum_creatinine_t0: "0",
            dialysate_creatinine_t4: "1.64",
            dialysate_glucose_t0: "",
            dialysate_glucose_t4: "",
            expected_creatinine_ratio: "",
            expected_creatinine_class: None,
            expected_glucose_ratio: "",
            expected_glucose_class: None,
        },
        RatioCase {
            id: "glucose-baseline-zero",
            serum_creatinine_t0: "2.0",
            dialysate_creatinine_t4: "1.64",
            dialysate_glucose_t0: "0",
            dialysate_glucose_t4: "70",
            expected_creatinine_ratio: "0.820",
            expected_creatinine_class: Some(TransportClass::High),
            expected_glucose_ratio: "",
            expected_glucose_class: None,
        },
        RatioCase {
            id: "serum-empty",
            serum_creatinine_t0: "",
            dialysate_creatinine_t4: "1.64",
            dialysate_glucose_t0: "200",
            dialysate_glucose_t4: "",
            expected_creatinine_ratio: "",
            expected_creatinine_class: None,
            expected_glucose_ratio: "",
            expected_glucose_class: None,
        },
        RatioCase {
            id: "mid-entry-text",
            serum_creatinine_t0: "2.",
            dialysate_creatinine_t4: "1.6x",
            dialysate_glucose_t0: "200",
            dialysate_glucose_t4: "-",
            expected_creatinine_ratio: "",
            expected_creatinine_class: None,
            expected_glucose_ratio: "",
            expected_glucose_class: None,
        },
    ]
}

#[test]
fn test_ratio_cases() {
    for case in get_ratio_cases() {
        let points = TimePoints::empty()
            .with_reading(TimePoint::T0, ReadingField::SerumCreatinine, case.serum_creatinine_t0)
            .with_reading(
                TimePoint::T4,
                ReadingField::DialysateCreatinine,
                case.dialysate_creatinine_t4,
            )
            .with_reading(TimePoint::T0, ReadingField::DialysateGlucose, case.dialysate_glucose_t0)
            .with_reading(TimePoint::T4, ReadingField::DialysateGlucose, case.dialysate_glucose_t4);

        let results = derive_results(&points);

        assert_eq!(
            results.creatinine_ratio, case.expected_creatinine_ratio,
            "Case {}: creatinine ratio mismatch",
            case.id
        );
        assert_eq!(
            results.creatinine_class, case.expected_creatinine_class,
            "Case {}: creatinine class mismatch",
            case.id
        );
        assert_eq!(
            results.glucose_ratio, case.expected_glucose_ratio,
            "Case {}: glucose ratio mismatch",
            case.id
        );
        assert_eq!(
            results.glucose_class, case.expected_glucose_class,
            "Case {}: glucose class mismatch",
            case.id
        );
    }
}

#[test]
fn test_remove_active_second_of_two() {
    let mut series = TestSeries::new();
    let first = series.add_entry();
    let second = series.add_entry();
    assert_eq!(series.active_id(), Some(second));

    series.remove_entry(second);

    assert_eq!(series.len(), 1);
    assert_eq!(series.active_id(), Some(first));
    let shape = to_legacy_shape(&series);
    assert!(shape.first.data.is_some());
    assert_eq!(shape.second, LegacySlot::empty());
    assert_eq!(shape.third, LegacySlot::empty());
}

#[test]
fn test_fourth_entry_not_in_legacy_record() {
    let mut series = TestSeries::new();
    let ids: Vec<_> = (0..4).map(|_| series.add_entry()).collect();
    for (index, id) in ids.iter().enumerate() {
        series.update_test_date(*id, format!("2024-0{}-01", index + 1));
    }

    assert_eq!(series.len(), 4);
    assert_eq!(series.entries()[3].label(), "Test 4");

    let shape = to_legacy_shape(&series);
    let dates: Vec<&str> = shape.slots().iter().map(|slot| slot.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-01", "2024-02-01", "2024-03-01"]);
}

#[test]
fn test_stale_stored_values_recomputed_on_load() {
    let json = r#"{
        "first": {
            "date": "2023-11-20",
            "data": {
                "date": "2023-11-20",
                "measurements": {
                    "t0": {"dialysateCreatinine": "0.1", "dialysateGlucose": "200", "serumCreatinine": "2.0"},
                    "t1": {"dialysateCreatinine": "0.6", "dialysateGlucose": "150", "serumCreatinine": "2.0"},
                    "t2": {"dialysateCreatinine": "0.9", "dialysateGlucose": "110", "serumCreatinine": "2.0"},
                    "t3": {"dialysateCreatinine": "1.3", "dialysateGlucose": "90", "serumCreatinine": ""},
                    "t4": {"dialysateCreatinine": "1.64", "dialysateGlucose": "70", "serumCreatinine": ""}
                },
                "creatinineRatio": "0.100",
                "glucoseRatio": "0.900",
                "creatinineClass": "Low Transporter",
                "glucoseClass": "Low Transporter"
            }
        },
        "second": {"date": "", "data": null}
    }"#;

    let shape = LegacyShape::from_json(json).unwrap();
    let series = seed_from_legacy(&shape);
    let results = series.entries()[0].measurements().results();

    assert_eq!(results.creatinine_ratio, "0.820");
    assert_eq!(results.creatinine_class, Some(TransportClass::High));
    assert_eq!(results.glucose_ratio, "0.350");
    assert_eq!(results.glucose_class, Some(TransportClass::HighAverage));

    let emitted = to_legacy_shape(&series);
    let data = emitted.first.data.unwrap();
    assert_eq!(data.creatinine_ratio, "0.820");
    assert_eq!(data.measurements, shape.first.data.unwrap().measurements);
}

#[test]
fn test_round_trip_preserves_slots() {
    let mut measurements = LegacyTimePoints::default();
    measurements.t0.serum_creatinine = "1.8".into();
    measurements.t2.dialysate_creatinine = "0.7".into();
    measurements.t4.dialysate_creatinine = "1.2".into();

    let shape = LegacyShape {
        first: LegacySlot {
            date: "2024-01-01".into(),
            data: Some(MeasurementPayload {
                date: "2024-01-01".into(),
                measurements: measurements.clone(),
                ..Default::default()
            }),
        },
        second: LegacySlot {
            date: "2024-06-01".into(),
            data: Some(MeasurementPayload {
                date: "2024-06-01".into(),
                ..Default::default()
            }),
        },
        third: LegacySlot::empty(),
    };

    let emitted = to_legacy_shape(&seed_from_legacy(&shape));

    assert_eq!(emitted.first.date, "2024-01-01");
    assert_eq!(emitted.second.date, "2024-06-01");
    assert_eq!(emitted.third, LegacySlot::empty());
    let first = emitted.first.data.unwrap();
    assert_eq!(first.measurements, measurements);
    assert_eq!(first.creatinine_ratio, "0.667");
    assert_eq!(first.creatinine_class, Some(TransportClass::HighAverage));
}

#[test]
fn test_session_persists_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pet.db");

    {
        let db = Database::open(&path).unwrap();
        let mut session = PetSession::load(&db, "MRN-555").unwrap();
        let id = session.add_entry();
        session.update_test_date(id, "2024-08-08");
        session.update_measurement(id, TimePoint::T0, ReadingField::DialysateGlucose, "200");
        session.update_measurement(id, TimePoint::T4, ReadingField::DialysateGlucose, "70");
        session.save(&db).unwrap();
    }

    let db = Database::open(&path).unwrap();
    let session = PetSession::load(&db, "MRN-555").unwrap();
    assert_eq!(session.series().len(), 1);
    let entry = session.series().active_entry().unwrap();
    assert_eq!(entry.measurements().test_date(), "2024-08-08");
    assert_eq!(entry.measurements().results().glucose_ratio, "0.350");
}
