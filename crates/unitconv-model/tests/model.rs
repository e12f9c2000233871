//! Tests for unitconv-model types.

use proptest::prelude::*;
use unitconv_model::{
    Conversion, ConversionEntry, LinearRule, LinearTransform, ModelError, Unit, UnitSet,
};

fn height_entry() -> ConversionEntry {
    let units = UnitSet::new(vec![Unit::new("cm"), Unit::new("in")]).expect("units");
    let rule = LinearRule::new(
        Unit::new("in"),
        Unit::new("cm"),
        Conversion::Linear(LinearTransform::new(2.54, 0.0)),
    );
    ConversionEntry::new("height", "height_units", units, vec![rule], Unit::new("cm"))
        .expect("entry")
}

#[test]
fn entry_indexes_rules_by_label_pair() {
    let entry = height_entry();
    assert_eq!(entry.field_name(), "height");
    assert_eq!(entry.units_field_name(), "height_units");
    assert_eq!(entry.preferred_unit().label, "cm");
    assert!(entry.rule("in", "cm").is_some());
    assert!(entry.rule("cm", "in").is_none());
    assert_eq!(entry.rule_count(), 1);
}

#[test]
fn rules_share_a_source_without_colliding() {
    let units = UnitSet::new(vec![Unit::new("m"), Unit::new("cm"), Unit::new("in")])
        .expect("units");
    let rule = |from: &str, to: &str, multiplier: f64| {
        LinearRule::new(
            Unit::new(from),
            Unit::new(to),
            Conversion::Linear(LinearTransform::new(multiplier, 0.0)),
        )
    };
    let entry = ConversionEntry::new(
        "height",
        "height_units",
        units,
        vec![rule("in", "m", 0.0254), rule("cm", "m", 0.01), rule("in", "cm", 2.54)],
        Unit::new("m"),
    )
    .expect("entry");

    assert_eq!(entry.rule_count(), 3);
    assert_eq!(
        entry.rule("in", "m").map(|rule| rule.conversion.clone()),
        Some(Conversion::Linear(LinearTransform::new(0.0254, 0.0)))
    );
    assert!(entry.rule("m", "in").is_none());
    assert!(entry.rule("ft", "m").is_none());
    let pairs: Vec<(&str, &str)> = entry
        .rules()
        .map(|rule| (rule.from_unit.label.as_str(), rule.to_unit.label.as_str()))
        .collect();
    assert_eq!(pairs, vec![("cm", "m"), ("in", "cm"), ("in", "m")]);
}

#[test]
fn preferred_unit_must_be_member() {
    let units = UnitSet::new(vec![Unit::new("cm")]).expect("units");
    let err = ConversionEntry::new("height", "height_units", units, vec![], Unit::new("m"))
        .unwrap_err();
    assert_eq!(
        err,
        ModelError::PreferredUnitNotMember {
            field_name: "height".to_string(),
            label: "m".to_string(),
        }
    );
}

#[test]
fn rule_units_must_be_members() {
    let units = UnitSet::new(vec![Unit::new("cm"), Unit::new("in")]).expect("units");
    let rule = LinearRule::new(Unit::new("ft"), Unit::new("cm"), Conversion::None);
    let err = ConversionEntry::new("height", "height_units", units, vec![rule], Unit::new("cm"))
        .unwrap_err();
    assert!(matches!(err, ModelError::RuleUnitNotMember { label, .. } if label == "ft"));
}

#[test]
fn duplicate_rule_pairs_are_rejected() {
    let units = UnitSet::new(vec![Unit::new("cm"), Unit::new("in")]).expect("units");
    let rule = LinearRule::new(
        Unit::new("in"),
        Unit::new("cm"),
        Conversion::Linear(LinearTransform::new(2.54, 0.0)),
    );
    let err = ConversionEntry::new(
        "height",
        "height_units",
        units,
        vec![rule.clone(), rule],
        Unit::new("cm"),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "duplicate conversion rule from 'in' to 'cm'"
    );
}

#[test]
fn duplicate_source_columns_are_rejected() {
    let err = UnitSet::new(vec![
        Unit::new("mg/dL").with_source_column("glucose_mgdl"),
        Unit::new("mmol/L").with_source_column("glucose_mgdl"),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        ModelError::DuplicateUnitAttribute {
            attribute: "unit_field_name",
            value: "glucose_mgdl".to_string(),
        }
    );
}

proptest! {
    #[test]
    fn unit_sets_with_shared_labels_fail(label in "[a-z]{1,6}", first in 0i64..50, second in 50i64..100) {
        let result = UnitSet::new(vec![
            Unit::new(label.clone()).with_coded_value(first),
            Unit::new(label).with_coded_value(second),
        ]);
        prop_assert!(matches!(
            result,
            Err(ModelError::DuplicateUnitAttribute { attribute: "unit_label", .. })
        ), "unexpected result: {:?}", result);
    }

    #[test]
    fn unit_sets_with_shared_codes_fail(code in any::<i64>()) {
        let result = UnitSet::new(vec![
            Unit::new("a").with_coded_value(code),
            Unit::new("b").with_coded_value(code),
        ]);
        prop_assert!(matches!(
            result,
            Err(ModelError::DuplicateUnitAttribute { attribute: "unit_value", .. })
        ), "unexpected result: {:?}", result);
    }
}

#[test]
fn unit_deserializes_from_configuration_names() {
    let unit: Unit = serde_json::from_str(
        r#"{"unit_label": "kg", "unit_value": 1, "unit_field_name": "weight_kg"}"#,
    )
    .expect("deserialize unit");
    assert_eq!(
        unit,
        Unit::new("kg")
            .with_coded_value(1)
            .with_source_column("weight_kg")
    );

    let bare: Unit = serde_json::from_str(r#"{"unit_label": "lb", "unit_value": null}"#)
        .expect("deserialize unit");
    assert_eq!(bare, Unit::new("lb"));
}

#[test]
fn unit_keys_deserialize_from_numbers_and_strings() {
    let keys: Vec<unitconv_model::UnitKey> =
        serde_json::from_str(r#"[1, "cm"]"#).expect("deserialize keys");
    assert_eq!(
        keys,
        vec![
            unitconv_model::UnitKey::Code(1),
            unitconv_model::UnitKey::from("cm")
        ]
    );
}
