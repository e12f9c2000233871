//! Scalar and columnar conversion tests.

use proptest::prelude::*;
use serde_json::{Value, json};
use unitconv_core::{
    ColumnConversion, ConvertError, ConverterConfig, DenominatorColumns, NOTE_IDENTITY,
    NOTE_NO_CONVERSION, NOTE_NO_MATCHING_RULE, UnitConverter,
};
use unitconv_model::{UnitKey, UnitMode};
use unitconv_registry::ConversionRegistry;
use unitconv_registry::embedded::UNIT_CONVERSION_SCHEMA;

fn registry() -> ConversionRegistry {
    let config = json!([
        {
            "field_name": "height",
            "units_field_name": "height_units",
            "units": [
                {"unit_label": "cm", "unit_value": 1},
                {"unit_label": "in", "unit_value": 2}
            ],
            "conversion_rules": [
                {"from_unit": "in", "to_unit": "cm", "type": "linear", "multiplier": 2.54, "offset": 0},
                {"from_unit": "cm", "to_unit": "in", "type": "linear", "multiplier": 0.3937007874015748, "offset": 0}
            ],
            "preferred_unit": "cm"
        },
        {
            "field_name": "temp",
            "units_field_name": "temp_units",
            "units": [{"unit_label": "C"}, {"unit_label": "F"}],
            "conversion_rules": [
                {"from_unit": "F", "to_unit": "C", "type": "linear", "multiplier": 0.5555555555555556, "offset": -17.77777777777778},
                {"from_unit": "C", "to_unit": "F", "type": "linear", "multiplier": 1.8, "offset": 32}
            ],
            "preferred_unit": "C"
        },
        {
            "field_name": "dose",
            "units_field_name": "dose_units",
            "units": [
                {"unit_label": "mg/kg", "unit_value": 1},
                {"unit_label": "mg", "unit_value": 2},
                {"unit_label": "milligram", "unit_value": 3}
            ],
            "conversion_rules": [
                {
                    "from_unit": "mg", "to_unit": "mg/kg", "type": "linear_with_denominator",
                    "multiplier": 1, "offset": 0, "denominator_field_name": "weight",
                    "note": "per kg body weight"
                },
                {"from_unit": "milligram", "to_unit": "mg", "type": "none", "note": "alias"}
            ],
            "preferred_unit": "mg/kg"
        }
    ]);
    let schema: Value = serde_json::from_str(UNIT_CONVERSION_SCHEMA).expect("parse schema");
    ConversionRegistry::load(&config, &schema).expect("load registry")
}

fn key(label: &str) -> UnitKey {
    UnitKey::from(label)
}

fn labels(units: &[&str]) -> Vec<Option<UnitKey>> {
    units.iter().map(|unit| Some(key(unit))).collect()
}

#[test]
fn converts_inches_to_centimeters() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);
    let result = converter
        .convert("height", 60.0, &key("in"), &key("cm"), None)
        .expect("convert");
    assert!(result.converted);
    assert_eq!(result.unit, key("cm"));
    assert!((result.value.expect("value") - 152.4).abs() < 1e-9);
}

#[test]
fn same_unit_is_identity() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);
    let result = converter
        .convert("height", 150.0, &key("cm"), &key("cm"), None)
        .expect("convert");
    assert_eq!(result.value, Some(150.0));
    assert!(!result.converted);
    assert_eq!(result.unit, key("cm"));
    assert_eq!(result.note.as_deref(), Some(NOTE_IDENTITY));
}

#[test]
fn undeclared_pair_is_passed_through() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);
    let result = converter
        .convert("dose", 5.0, &key("mg/kg"), &key("mg"), None)
        .expect("convert");
    assert_eq!(result.value, Some(5.0));
    assert!(!result.converted);
    assert_eq!(result.unit, key("mg/kg"));
    assert_eq!(result.note.as_deref(), Some(NOTE_NO_MATCHING_RULE));

    let unknown_field = converter
        .convert("glucose", 5.0, &key("mmol/L"), &key("mg/dL"), None)
        .expect("convert");
    assert_eq!(unknown_field.note.as_deref(), Some(NOTE_NO_MATCHING_RULE));
}

#[test]
fn alias_rule_keeps_value_and_reports_note() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);
    let result = converter
        .convert("dose", 250.0, &key("milligram"), &key("mg"), None)
        .expect("convert");
    assert_eq!(result.value, Some(250.0));
    assert!(!result.converted);
    assert_eq!(result.unit, key("milligram"));
    assert_eq!(result.note.as_deref(), Some("alias"));
}

#[test]
fn denominator_rules() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);

    let converted = converter
        .convert("dose", 500.0, &key("mg"), &key("mg/kg"), Some(50.0))
        .expect("convert");
    assert_eq!(converted.value, Some(10.0));
    assert!(converted.converted);
    assert_eq!(converted.unit, key("mg/kg"));

    let absent = converter
        .convert("dose", 500.0, &key("mg"), &key("mg/kg"), None)
        .expect("convert");
    assert_eq!(absent.value, Some(500.0));
    assert!(!absent.converted);
    assert_eq!(absent.note.as_deref(), Some("per kg body weight"));

    for denominator in [0.0, f64::NAN] {
        let undefined = converter
            .convert("dose", 500.0, &key("mg"), &key("mg/kg"), Some(denominator))
            .expect("convert");
        assert_eq!(undefined.value, None);
        assert!(!undefined.converted);
    }
}

#[test]
fn coded_value_mode_resolves_codes() {
    let registry = registry();
    let converter = UnitConverter::with_config(
        &registry,
        ConverterConfig::default().with_field_mode("height", UnitMode::CodedValue),
    );
    let result = converter
        .convert("height", 10.0, &UnitKey::Code(2), &UnitKey::Code(1), None)
        .expect("convert");
    assert!((result.value.expect("value") - 25.4).abs() < 1e-9);
    assert_eq!(result.unit, UnitKey::Code(1));

    let err = converter
        .convert("height", 10.0, &UnitKey::Code(9), &UnitKey::Code(1), None)
        .unwrap_err();
    assert!(matches!(err, ConvertError::Lookup { ref field_name, .. } if field_name == "height"));
}

#[test]
fn coded_column_passes_through_unknown_source_codes() {
    let registry = registry();
    let converter = UnitConverter::with_config(
        &registry,
        ConverterConfig::default().with_field_mode("height", UnitMode::CodedValue),
    );
    let values = vec![Some(60.0), Some(150.0), Some(10.0)];
    let units = vec![
        Some(UnitKey::Code(2)),
        Some(UnitKey::Code(1)),
        Some(UnitKey::Code(99)),
    ];
    let result = converter
        .convert_column("height", &values, &units, &UnitKey::Code(1), &DenominatorColumns::new())
        .expect("convert column");

    assert!((result.values[0].expect("value") - 152.4).abs() < 1e-9);
    assert_eq!(result.values[1], Some(150.0));
    assert_eq!(result.values[2], Some(10.0));
    assert_eq!(
        result.units,
        vec![
            Some(UnitKey::Code(1)),
            Some(UnitKey::Code(1)),
            Some(UnitKey::Code(99))
        ]
    );
    assert_eq!(result.converted, vec![true, false, false]);
    assert_eq!(result.notes[2].as_deref(), Some(NOTE_NO_CONVERSION));
}

#[test]
fn coded_column_rejects_unknown_target_code() {
    let registry = registry();
    let converter = UnitConverter::with_config(
        &registry,
        ConverterConfig::uniform(UnitMode::CodedValue),
    );
    let err = converter
        .convert_column(
            "height",
            &[Some(60.0)],
            &[Some(UnitKey::Code(2))],
            &UnitKey::Code(42),
            &DenominatorColumns::new(),
        )
        .unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"unit lookup failed for 'height': unit 42 not found");
}

#[test]
fn column_alias_group_keeps_values_and_notes() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);
    let result = converter
        .convert_column(
            "dose",
            &[Some(250.0), Some(5.0)],
            &labels(&["milligram", "mg/kg"]),
            &key("mg"),
            &DenominatorColumns::new(),
        )
        .expect("convert column");
    assert_eq!(result.values, vec![Some(250.0), Some(5.0)]);
    assert_eq!(result.units, labels(&["milligram", "mg/kg"]));
    assert_eq!(result.converted, vec![false, false]);
    assert_eq!(result.notes[0].as_deref(), Some("alias"));
    assert_eq!(result.notes[1].as_deref(), Some(NOTE_NO_CONVERSION));
}

#[test]
fn overflowing_denominator_result_is_undefined() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);
    let result = converter
        .convert("dose", 1e308, &key("mg"), &key("mg/kg"), Some(1e-10))
        .expect("convert");
    assert_eq!(result.value, None);
    assert!(!result.converted);

    let mut denominators = DenominatorColumns::new();
    denominators.insert(key("mg"), vec![Some(1e-10), Some(2.0)]);
    let column = converter
        .convert_column(
            "dose",
            &[Some(1e308), Some(1e308)],
            &labels(&["mg", "mg"]),
            &key("mg/kg"),
            &denominators,
        )
        .expect("convert column");
    assert_eq!(column.values, vec![None, Some(5e307)]);
    assert_eq!(column.converted, vec![false, true]);
}

#[test]
fn column_conversion_groups_by_source_unit() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);
    let values = vec![Some(150.0), Some(60.0), None, Some(70.0), Some(12.0)];
    let units = vec![
        Some(key("cm")),
        Some(key("in")),
        Some(key("in")),
        Some(key("ft")),
        None,
    ];
    let result = converter
        .convert_column("height", &values, &units, &key("cm"), &DenominatorColumns::new())
        .expect("convert column");

    assert_eq!(result.len(), 5);
    assert_eq!(result.values[0], Some(150.0));
    assert!((result.values[1].expect("value") - 152.4).abs() < 1e-9);
    assert_eq!(result.values[2], None);
    assert_eq!(result.values[3], Some(70.0));
    assert_eq!(result.values[4], Some(12.0));

    assert_eq!(
        result.units,
        vec![
            Some(key("cm")),
            Some(key("cm")),
            Some(key("cm")),
            Some(key("ft")),
            None
        ]
    );
    assert_eq!(result.converted, vec![false, true, false, false, false]);
    assert_eq!(result.notes[0].as_deref(), Some(NOTE_NO_CONVERSION));
    assert_eq!(result.notes[3].as_deref(), Some(NOTE_NO_CONVERSION));
    assert_eq!(result.notes[4], None);
    assert_eq!(result.converted_count(), 1);
}

#[test]
fn column_length_mismatch_is_an_error() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);
    let err = converter
        .convert_column(
            "height",
            &[Some(1.0), Some(2.0)],
            &labels(&["cm"]),
            &key("cm"),
            &DenominatorColumns::new(),
        )
        .unwrap_err();
    assert_eq!(err.to_string(), "column 'source_units' has 1 rows, expected 2");
}

#[test]
fn column_denominators_per_source_unit() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);
    let values = vec![Some(500.0), Some(300.0), Some(2.0), Some(100.0)];
    let units = labels(&["mg", "mg", "mg/kg", "mg"]);
    let mut denominators = DenominatorColumns::new();
    denominators.insert(key("mg"), vec![Some(50.0), Some(0.0), Some(80.0), None]);

    let result = converter
        .convert_column("dose", &values, &units, &key("mg/kg"), &denominators)
        .expect("convert column");
    assert_eq!(result.values, vec![Some(10.0), None, Some(2.0), None]);
    assert_eq!(result.converted, vec![true, false, false, false]);
    assert_eq!(result.units, labels(&["mg/kg", "mg/kg", "mg/kg", "mg/kg"]));
    assert_eq!(result.notes[0].as_deref(), Some("per kg body weight"));
}

#[test]
fn missing_denominator_column_is_an_error() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);
    let err = converter
        .convert_column(
            "dose",
            &[Some(500.0)],
            &labels(&["mg"]),
            &key("mg/kg"),
            &DenominatorColumns::new(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ConvertError::MissingDenominatorColumn { ref unit, .. } if *unit == key("mg")
    ));
}

#[test]
fn converter_is_shared_across_threads() {
    let registry = registry();
    let converter = UnitConverter::new(&registry);
    let results: Vec<Option<f64>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let converter = &converter;
                scope.spawn(move || {
                    converter
                        .convert("height", f64::from(i), &key("in"), &key("cm"), None)
                        .expect("convert")
                        .value
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("join"))
            .collect()
    });
    assert_eq!(results.len(), 4);
    assert!((results[3].expect("value") - 7.62).abs() < 1e-9);
}

proptest! {
    #[test]
    fn height_round_trips(value in -1.0e6f64..1.0e6) {
        let registry = registry();
        let converter = UnitConverter::new(&registry);
        let there = converter.convert("height", value, &key("in"), &key("cm"), None).unwrap();
        let back = converter
            .convert("height", there.value.unwrap(), &key("cm"), &key("in"), None)
            .unwrap();
        prop_assert!((back.value.unwrap() - value).abs() <= 1e-9 * value.abs().max(1.0));
    }

    #[test]
    fn temperature_round_trips(value in -500.0f64..500.0) {
        let registry = registry();
        let converter = UnitConverter::new(&registry);
        let there = converter.convert("temp", value, &key("C"), &key("F"), None).unwrap();
        let back = converter
            .convert("temp", there.value.unwrap(), &key("F"), &key("C"), None)
            .unwrap();
        prop_assert!((back.value.unwrap() - value).abs() < 1e-9);
    }

    #[test]
    fn identity_for_every_unit(value in any::<f64>().prop_filter("finite", |v| v.is_finite()),
                               unit in prop::sample::select(vec!["cm", "in", "ft"])) {
        let registry = registry();
        let converter = UnitConverter::new(&registry);
        let result = converter.convert("height", value, &key(unit), &key(unit), None).unwrap();
        prop_assert_eq!(result.value, Some(value));
        prop_assert!(!result.converted);
    }

    #[test]
    fn grouped_column_matches_scalar(values in prop::collection::vec(-1.0e4f64..1.0e4, 0..40),
                                     unit in prop::sample::select(vec!["cm", "in", "ft"])) {
        let registry = registry();
        let converter = UnitConverter::new(&registry);
        let column: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        let units = vec![Some(key(unit)); values.len()];
        let ColumnConversion { values: converted_values, converted, .. } = converter
            .convert_column("height", &column, &units, &key("cm"), &DenominatorColumns::new())
            .unwrap();
        for (idx, value) in values.iter().enumerate() {
            let scalar = converter.convert("height", *value, &key(unit), &key("cm"), None).unwrap();
            prop_assert_eq!(converted_values[idx], scalar.value);
            prop_assert_eq!(converted[idx], scalar.converted);
        }
    }
}
