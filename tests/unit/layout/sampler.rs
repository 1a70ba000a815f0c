use super::*;

fn cfg() -> SequenceConfig {
    SequenceConfig::new(vec!["a".into()], 16.0, 9.0, ".sticky", ".stickyParent")
}

fn host(surface: (f64, f64), scene_h: f64) -> StaticLayoutHost {
    StaticLayoutHost::new()
        .with_element(".sticky", ElementBox::new(surface.0, surface.1))
        .with_element(".stickyParent", ElementBox::new(1280.0, scene_h))
}

#[test]
fn distance_subtracts_padding() {
    let padded = cfg().with_padding(100.0, 50.0);
    let s = sample(&host((640.0, 360.0), 3000.0), &padded).unwrap();
    assert_eq!(s.animation_distance, 2850.0);
    assert_eq!(s.padding_start, 100.0);
    assert_eq!((s.surface_width, s.surface_height), (640.0, 360.0));
}

#[test]
fn degenerate_distance_clamps_to_one() {
    let padded = cfg().with_padding(300.0, 300.0);
    let s = sample(&host((640.0, 360.0), 500.0), &padded).unwrap();
    assert_eq!(s.animation_distance, 1.0);

    let s = sample(&host((640.0, 360.0), 0.0), &cfg()).unwrap();
    assert_eq!(s.animation_distance, 1.0);
}

#[test]
fn backing_size_scales_by_pixel_ratio() {
    let h = host((640.5, 360.0), 1000.0).with_device_pixel_ratio(2.0);
    let s = sample(&h, &cfg()).unwrap();
    assert_eq!(s.pixel_ratio, 2.0);
    assert_eq!(s.backing_size(), (1281, 720));
    assert_eq!(s.surface_rect(), Rect::new(0.0, 0.0, 640.5, 360.0));
}

#[test]
fn invalid_pixel_ratio_falls_back_to_one() {
    let h = host((10.0, 10.0), 100.0).with_device_pixel_ratio(0.0);
    assert_eq!(sample(&h, &cfg()).unwrap().pixel_ratio, 1.0);
    let h = host((10.0, 10.0), 100.0).with_device_pixel_ratio(f64::NAN);
    assert_eq!(sample(&h, &cfg()).unwrap().pixel_ratio, 1.0);
}

#[test]
fn missing_elements_are_layout_errors() {
    let mut h = host((640.0, 360.0), 1000.0);
    h.remove_element(".stickyParent");
    assert_eq!(
        sample(&h, &cfg()).unwrap_err(),
        LayoutError::MissingElement {
            selector: ".stickyParent".to_string()
        }
    );

    let h = StaticLayoutHost::new().with_element(".stickyParent", ElementBox::new(1.0, 900.0));
    assert!(matches!(
        sample(&h, &cfg()).unwrap_err(),
        LayoutError::MissingElement { selector } if selector == ".sticky"
    ));
}

#[test]
fn unmeasurable_boxes_are_rejected() {
    let h = host((f64::NAN, 360.0), 1000.0);
    assert!(matches!(
        sample(&h, &cfg()).unwrap_err(),
        LayoutError::InvalidMeasurement { .. }
    ));
}

#[test]
fn sampling_is_repeatable() {
    let h = host((640.0, 360.0), 2000.0).with_device_pixel_ratio(1.5);
    let a = sample(&h, &cfg()).unwrap();
    let b = sample(&h, &cfg()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn zero_sized_surface_is_empty() {
    let s = sample(&host((0.0, 360.0), 2000.0), &cfg()).unwrap();
    assert!(s.is_empty_surface());
    assert_eq!(s.backing_size(), (0, 360));
}
