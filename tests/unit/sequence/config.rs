use super::*;

fn abc() -> SequenceConfig {
    SequenceConfig::new(
        vec!["a.png".into(), "b.png".into(), "c.png".into()],
        1902.0,
        1080.0,
        ".sticky",
        ".stickyParent",
    )
}

#[test]
fn sequence_len_doubles_with_concat_reverse() {
    let cfg = abc();
    assert_eq!(cfg.forward_len(), 3);
    assert_eq!(cfg.sequence_len(), 3);
    assert_eq!(cfg.with_concat_reverse(true).sequence_len(), 6);
}

#[test]
fn validate_rejects_bad_dimensions_and_padding() {
    abc().validate().unwrap();

    let mut cfg = abc();
    cfg.intrinsic_height = 0.0;
    assert!(cfg.validate().is_err());

    let mut cfg = abc();
    cfg.intrinsic_width = f64::NAN;
    assert!(cfg.validate().is_err());

    assert!(abc().with_padding(-1.0, 0.0).validate().is_err());
    assert!(abc().with_padding(0.0, f64::INFINITY).validate().is_err());
}

#[test]
fn validate_rejects_blank_selectors_and_urls() {
    let mut cfg = abc();
    cfg.scene_selector = "  ".into();
    assert!(cfg.validate().is_err());

    let mut cfg = abc();
    cfg.urls[1] = String::new();
    let err = cfg.validate().unwrap_err().to_string();
    assert!(err.contains("urls[1]"));
}

#[test]
fn empty_url_list_is_valid() {
    let mut cfg = abc();
    cfg.urls.clear();
    cfg.validate().unwrap();
    assert_eq!(cfg.sequence_len(), 0);
}

#[test]
fn json_defaults_optional_fields() {
    let json = r#"{
        "urls": ["a.png"],
        "intrinsic_width": 16,
        "intrinsic_height": 9,
        "surface_selector": ".sticky",
        "scene_selector": ".stickyParent"
    }"#;
    let cfg: SequenceConfig = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.padding_start, 0.0);
    assert_eq!(cfg.padding_end, 0.0);
    assert!(!cfg.concat_reverse);
    assert!(!cfg.wait_for_all);
}

#[test]
fn urls_from_pattern_pads_indices() {
    let urls = SequenceConfig::urls_from_pattern("seq/frame_{index:04}.jpg", 1, 3).unwrap();
    assert_eq!(
        urls,
        vec![
            "seq/frame_0001.jpg",
            "seq/frame_0002.jpg",
            "seq/frame_0003.jpg"
        ]
    );

    let urls = SequenceConfig::urls_from_pattern("{index}.png", 9, 2).unwrap();
    assert_eq!(urls, vec!["9.png", "10.png"]);
}

#[test]
fn urls_from_pattern_rejects_malformed_placeholders() {
    assert!(SequenceConfig::urls_from_pattern("frame.png", 0, 1).is_err());
    assert!(SequenceConfig::urls_from_pattern("frame_{index:xx}.png", 0, 1).is_err());
    assert!(SequenceConfig::urls_from_pattern("frame_{index.png", 0, 1).is_err());
    assert!(SequenceConfig::urls_from_pattern("frame_{indexed}.png", 0, 1).is_err());
    assert!(SequenceConfig::urls_from_pattern("f{index}.png", usize::MAX, 2).is_err());
}

#[test]
fn urls_from_pattern_reaches_the_top_of_the_range() {
    let urls = SequenceConfig::urls_from_pattern("f{index}.png", usize::MAX - 1, 1).unwrap();
    assert_eq!(urls, vec![format!("f{}.png", usize::MAX - 1)]);
}
