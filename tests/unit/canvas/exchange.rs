use super::*;
use crate::canvas::edit::TextPatch;
use crate::canvas::model::{OutputFormat, TextAlign};

fn populated() -> CanvasConfiguration {
    let mut c = CanvasConfiguration::default();
    c.add_background("data:image/png;base64,iVBORw0KGgo=");
    let t = c.add_text();
    c.update_text(
        &t,
        TextPatch {
            font_size: Some(13.5),
            text_align: Some(Some(TextAlign::Right)),
            line_height: Some(Some(1.45)),
            ..Default::default()
        },
    )
    .unwrap();
    c.add_markup();
    c.export.quality = 0.1 + 0.2;
    c
}

#[test]
fn roundtrip_is_structurally_equal() {
    let c = populated();
    let text = serialize(&c).unwrap();
    let back = deserialize(&text).unwrap();
    assert_eq!(back, c);
}

#[test]
fn serialization_is_deterministic() {
    let c = populated();
    assert_eq!(serialize(&c).unwrap(), serialize(&c.clone()).unwrap());
}

#[test]
fn malformed_input_is_a_parse_error() {
    for bad in ["", "{", "[]", r#"{"qr": 5}"#] {
        let err = deserialize(bad).unwrap_err();
        assert!(
            matches!(err, CanvasError::ConfigurationParse(_)),
            "{bad}: {err}"
        );
    }
}

#[test]
fn duplicate_layer_ids_are_rejected() {
    let mut c = populated();
    let dup = c.backgrounds[0].id.clone();
    c.html_modules[0].id = dup.clone();
    let text = serialize(&c).unwrap();
    let err = deserialize(&text).unwrap_err();
    assert!(err.to_string().contains(&dup));
}

#[test]
fn unknown_fields_are_ignored() {
    let mut v = serde_json::to_value(CanvasConfiguration::default()).unwrap();
    v["schemaVersion"] = serde_json::json!(2);
    let back = deserialize(&v.to_string()).unwrap();
    assert_eq!(back, CanvasConfiguration::default());
}

#[test]
fn merge_updates_nested_fields_only() {
    let mut c = populated();
    let texts_before = c.texts.clone();
    merge_json(
        &mut c,
        r#"{"qr": {"content": "hello", "dotsOptions": {"type": "dots"}}, "export": {"format": "jpeg"}}"#,
    )
    .unwrap();
    assert_eq!(c.qr.content, "hello");
    assert_eq!(c.qr.dots_options.color, "#0000ff");
    assert_eq!(c.export.format, OutputFormat::Jpg);
    assert_eq!(c.texts, texts_before);
}

#[test]
fn failed_merge_leaves_configuration_untouched() {
    let mut c = populated();
    let before = c.clone();
    assert!(merge_json(&mut c, r#"{"export": {"width": "wide"}}"#).is_err());
    assert!(merge_json(&mut c, "[1, 2]").is_err());
    assert_eq!(c, before);
}
