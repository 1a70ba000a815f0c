use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ScrollSeqError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ScrollSeqError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        ScrollSeqError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ScrollSeqError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn load_error_names_frame_and_kind() {
    let err = LoadError::new(1, "b.png", LoadErrorKind::Decode, "bad magic");
    let msg = err.to_string();
    assert!(msg.contains("frame 1"));
    assert!(msg.contains("b.png"));
    assert!(msg.contains("decode"));

    let wrapped: ScrollSeqError = err.into();
    assert!(wrapped.to_string().starts_with("load error:"));
}

#[test]
fn layout_error_converts() {
    let err: ScrollSeqError = LayoutError::MissingElement {
        selector: ".scene".to_string(),
    }
    .into();
    assert!(err.to_string().contains("'.scene'"));
}
