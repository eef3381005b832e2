//! Background model tests: learning a static scene, labelling moving
//! objects and shadows, and refusing frames of another size.

mod common;

use linecount::detection::background::BackgroundModel;

use common::*;

fn trained_model(frames: usize) -> BackgroundModel {
    let mut model = BackgroundModel::new(&BackgroundConfig::default());
    let background = background_frame();
    for _ in 0..frames {
        model.apply(&background).expect("background frame should apply");
    }
    model
}

#[test]
fn test_first_frame_is_all_foreground() {
    let mut model = BackgroundModel::new(&BackgroundConfig::default());
    let mask = model.apply(&background_frame()).unwrap();

    let pixels = (FRAME_WIDTH * FRAME_HEIGHT) as usize;
    assert_eq!(mask.count(MaskLabel::Foreground), pixels);
    assert_eq!(model.geometry(), Some((FRAME_WIDTH, FRAME_HEIGHT)));
}

#[test]
fn test_static_scene_is_learned() {
    let mut model = trained_model(10);
    let mask = model.apply(&background_frame()).unwrap();

    assert_eq!(mask.count(MaskLabel::Foreground), 0);
    assert_eq!(mask.count(MaskLabel::Shadow), 0);
    assert_eq!(model.frames_seen(), 11);
}

#[test]
fn test_moving_object_is_foreground() {
    let mut model = trained_model(10);
    let frame = frame_with_squares(&[(40, 60)], 30, OBJECT);
    let mask = model.apply(&frame).unwrap();

    assert_eq!(mask.count(MaskLabel::Foreground), 900);
    assert_eq!(mask.label(55, 75), MaskLabel::Foreground);
    assert_eq!(mask.label(10, 10), MaskLabel::Background);
}

#[test]
fn test_darkened_background_is_shadow() {
    let mut model = trained_model(10);
    let frame = frame_with_squares(&[(40, 60)], 30, SHADOW);
    let mask = model.apply(&frame).unwrap();

    assert_eq!(mask.count(MaskLabel::Shadow), 900);
    assert_eq!(mask.count(MaskLabel::Foreground), 0);
    assert_eq!(mask.label(55, 75), MaskLabel::Shadow);
}

#[test]
fn test_shadows_are_foreground_when_detection_is_off() {
    let config = BackgroundConfig {
        detect_shadows: false,
        ..BackgroundConfig::default()
    };
    let mut model = BackgroundModel::new(&config);
    for _ in 0..10 {
        model.apply(&background_frame()).unwrap();
    }
    let mask = model.apply(&frame_with_squares(&[(40, 60)], 30, SHADOW)).unwrap();

    assert_eq!(mask.count(MaskLabel::Shadow), 0);
    assert_eq!(mask.count(MaskLabel::Foreground), 900);
}

#[test]
fn test_object_leaving_does_not_leave_a_ghost() {
    let mut model = trained_model(10);
    model.apply(&frame_with_squares(&[(40, 60)], 30, OBJECT)).unwrap();
    let mask = model.apply(&background_frame()).unwrap();

    assert_eq!(mask.count(MaskLabel::Foreground), 0);
}

#[test]
fn test_geometry_mismatch_is_rejected() {
    let mut model = trained_model(3);
    let small = image::RgbImage::new(FRAME_WIDTH / 2, FRAME_HEIGHT);

    let err = model.apply(&small).unwrap_err();
    assert_eq!(
        err,
        CounterError::GeometryMismatch {
            expected: (FRAME_WIDTH, FRAME_HEIGHT),
            actual: (FRAME_WIDTH / 2, FRAME_HEIGHT),
        }
    );
    assert_eq!(model.frames_seen(), 3);

    // The model is still usable with the original geometry
    let mask = model.apply(&background_frame()).unwrap();
    assert_eq!(mask.count(MaskLabel::Foreground), 0);
}

#[test]
fn test_empty_frame_is_rejected() {
    let mut model = BackgroundModel::new(&BackgroundConfig::default());
    let err = model.apply(&image::RgbImage::new(0, 0)).unwrap_err();
    assert_eq!(err, CounterError::EmptyFrame);
    assert_eq!(model.geometry(), None);
}

#[test]
fn test_object_during_warm_up_is_foreground() {
    let mut model = trained_model(2);
    let mask = model.apply(&frame_with_squares(&[(40, 60)], 30, OBJECT)).unwrap();

    assert_eq!(mask.count(MaskLabel::Foreground), 900);
    assert_eq!(mask.count(MaskLabel::Shadow), 0);
}

#[test]
fn test_fast_learning_rate_still_detects_new_objects() {
    let config = BackgroundConfig {
        learning_rate: Some(0.2),
        ..BackgroundConfig::default()
    };
    let mut model = BackgroundModel::new(&config);
    for _ in 0..50 {
        model.apply(&background_frame()).unwrap();
    }

    let mask = model.apply(&frame_with_squares(&[(40, 60)], 30, OBJECT)).unwrap();
    assert_eq!(mask.count(MaskLabel::Foreground), 900);
    assert_eq!(mask.count(MaskLabel::Shadow), 0);

    let mask = model.apply(&frame_with_squares(&[(140, 160)], 30, SHADOW)).unwrap();
    assert_eq!(mask.count(MaskLabel::Shadow), 900);
    assert_eq!(mask.count(MaskLabel::Foreground), 0);
}
