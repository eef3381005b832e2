//! End-to-end counting tests on synthetic frame sequences.

mod common;

use linecount::{FrameSource, SharedSession, VecSource};

use common::*;

const OBJECT_SIZE: u32 = 50;

/// Run ten background frames so the model settles
fn warmed_session(config: CounterConfig) -> CounterSession {
    let mut session = CounterSession::new(config).expect("config should be valid");
    let background = background_frame();
    for _ in 0..10 {
        let report = session.process_frame(&background).unwrap();
        assert!(report.detections.iter().all(|d| !d.counted));
    }
    session
}

/// Top-left corners of a square moving straight down in 8px steps
fn downward_path(x: u32) -> Vec<(u32, u32)> {
    (0..26).map(|k| (x, 40 + 8 * k)).collect()
}

#[test]
fn test_object_crossing_line_is_counted_once() {
    let mut session = warmed_session(test_config());

    let mut counted_frames = Vec::new();
    for (i, corner) in downward_path(95).into_iter().enumerate() {
        let frame = frame_with_squares(&[corner], OBJECT_SIZE, OBJECT);
        let report = session.process_frame(&frame).unwrap();

        assert_eq!(report.detections.len(), 1, "frame {} should hold one detection", i);
        let detection = &report.detections[0];
        assert_eq!(detection.centroid, Point::new(120, corner.1 as i32 + 25));
        if detection.counted {
            counted_frames.push(detection.centroid);
        }
    }

    assert_eq!(counted_frames, vec![Point::new(120, 153)]);
    assert_eq!(session.total_count(), 1);
}

#[test]
fn test_two_objects_side_by_side_are_both_counted() {
    let mut session = warmed_session(test_config());

    let left = downward_path(10);
    let right = downward_path(170);
    for (a, b) in left.into_iter().zip(right) {
        let frame = frame_with_squares(&[a, b], OBJECT_SIZE, OBJECT);
        session.process_frame(&frame).unwrap();
    }

    assert_eq!(session.total_count(), 2);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.history, vec![Point::new(35, 153), Point::new(195, 153)]);
}

#[test]
fn test_total_equals_counted_detections() {
    let mut session = warmed_session(test_config());

    let mut counted = 0u64;
    let mut previous_total = 0;
    for (a, b) in downward_path(10).into_iter().zip(downward_path(170)) {
        let frame = frame_with_squares(&[a, b], OBJECT_SIZE, OBJECT);
        let report = session.process_frame(&frame).unwrap();
        counted += report.newly_counted() as u64;
        assert!(report.total_count >= previous_total);
        previous_total = report.total_count;
    }
    assert_eq!(session.total_count(), counted);
}

#[test]
fn test_shadow_is_never_counted() {
    let mut session = warmed_session(test_config());

    for corner in downward_path(95) {
        let frame = frame_with_squares(&[corner], OBJECT_SIZE, SHADOW);
        let report = session.process_frame(&frame).unwrap();
        assert!(report.detections.is_empty());
        assert!(report.mask.pixels().all(|p| p[0] == 0));
    }
    assert_eq!(session.total_count(), 0);
}

#[test]
fn test_small_object_is_ignored() {
    let mut session = warmed_session(test_config());

    // 14x14 squares have an area of 196, below the 1000 minimum
    for corner in downward_path(95) {
        let frame = frame_with_squares(&[corner], 14, OBJECT);
        let report = session.process_frame(&frame).unwrap();
        assert!(report.detections.is_empty());
    }
    assert_eq!(session.total_count(), 0);
    assert!(session.tracker().history().is_empty());
}

#[test]
fn test_reset_allows_recount() {
    let mut session = warmed_session(test_config());
    for corner in downward_path(95) {
        session.process_frame(&frame_with_squares(&[corner], OBJECT_SIZE, OBJECT)).unwrap();
    }
    assert_eq!(session.total_count(), 1);

    session.reset();
    assert_eq!(session.total_count(), 0);
    assert!(session.snapshot().history.is_empty());

    for corner in downward_path(95) {
        session.process_frame(&frame_with_squares(&[corner], OBJECT_SIZE, OBJECT)).unwrap();
    }
    assert_eq!(session.total_count(), 1);
}

#[test]
fn test_wrong_frame_size_is_rejected_without_state_change() {
    let mut session = warmed_session(test_config());
    let frames_before = session.frames_processed();

    let wrong = image::RgbImage::new(FRAME_WIDTH + 10, FRAME_HEIGHT);
    let err = session.process_frame(&wrong).unwrap_err();
    assert!(matches!(err, CounterError::GeometryMismatch { .. }));
    assert_eq!(session.frames_processed(), frames_before);
    assert_eq!(session.total_count(), 0);
}

#[test]
fn test_invalid_config_is_rejected() {
    let inverted_area = CounterConfig {
        min_area: 5000.0,
        max_area: 1000.0,
        ..CounterConfig::default()
    };
    assert!(matches!(
        CounterSession::new(inverted_area),
        Err(CounterError::InvalidConfig(_))
    ));

    let inverted_ratio = CounterConfig {
        aspect_ratio_range: (3.0, 0.3),
        ..CounterConfig::default()
    };
    assert!(CounterSession::new(inverted_ratio).is_err());

    let zero_history = CounterConfig {
        background: BackgroundConfig {
            history: 0,
            ..BackgroundConfig::default()
        },
        ..CounterConfig::default()
    };
    assert!(CounterSession::new(zero_history).is_err());
}

#[test]
fn test_shared_session_publishes_snapshots() -> anyhow::Result<()> {
    let shared = SharedSession::new(CounterSession::new(test_config())?);

    let mut frames = vec![background_frame(); 10];
    frames.extend(
        downward_path(95)
            .into_iter()
            .map(|corner| frame_with_squares(&[corner], OBJECT_SIZE, OBJECT)),
    );
    let mut source = VecSource::new(frames);

    let reader = shared.clone();
    while let Some(frame) = source.next_frame()? {
        shared.process_frame(&frame)?;
        let seen = reader.snapshot()?;
        assert!(seen.total_count <= 1);
    }
    assert_eq!(reader.total_count()?, 1);

    shared.reset()?;
    let snapshot = reader.snapshot()?;
    assert_eq!(snapshot.total_count, 0);
    assert!(snapshot.history.is_empty());
    Ok(())
}

#[test]
fn test_shared_session_across_threads() -> anyhow::Result<()> {
    let shared = SharedSession::new(CounterSession::new(test_config())?);

    let worker = {
        let shared = shared.clone();
        std::thread::spawn(move || -> anyhow::Result<()> {
            for _ in 0..10 {
                shared.process_frame(&background_frame())?;
            }
            for corner in downward_path(95) {
                shared.process_frame(&frame_with_squares(&[corner], OBJECT_SIZE, OBJECT))?;
            }
            Ok(())
        })
    };

    // Reads never observe a count that goes backwards
    let mut last = 0;
    while !worker.is_finished() {
        let total = shared.total_count()?;
        assert!(total >= last);
        last = total;
    }
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("worker thread panicked"))??;

    assert_eq!(shared.total_count()?, 1);
    Ok(())
}
