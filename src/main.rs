use std::{thread, time::Duration};

use anyhow::{Context, Result};
use crossbeam_channel::bounded;
use indicatif::{ProgressBar, ProgressStyle};
use ragdoll_pose::{
    AngleSet, CameraTick, ControlMode, KernelConfig, Point, PoseCatalog, Session,
    pipeline::{BodyLayout, SyntheticPerformer, latest_frame, start_keypoint_stream},
};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Ticks a pose has to stay above the pass threshold to count as matched.
const HOLD_TO_MATCH: u32 = 30;

fn main() -> Result<()> {
    env_logger::init();

    let mut session = Session::new(KernelConfig::default(), Point::new(400.0, 300.0))?;
    session.set_mode(ControlMode::Camera);

    let performer = routine(session.calibration().required_frames());
    let total_frames = performer.total_frames();
    let (frame_tx, frame_rx) = bounded(4);
    let stream = start_keypoint_stream(performer, frame_tx)?;

    let calibration_bar = calibration_progress_bar(session.calibration().required_frames())?;
    let mut held = 0;
    let mut matched = 0;

    loop {
        let Some(frame) = latest_frame(&frame_rx) else {
            if stream.is_finished() && frame_rx.is_empty() {
                break;
            }
            thread::sleep(FRAME_INTERVAL / 4);
            continue;
        };

        match session.tick_camera(&frame) {
            CameraTick::Calibrating { .. } => {
                calibration_bar.set_position(session.calibration().consecutive_valid_frames() as u64);
                continue;
            }
            CameraTick::Calibrated => {
                calibration_bar.finish_with_message("calibrated");
                continue;
            }
            CameraTick::Updated | CameraTick::Unchanged | CameraTick::Ignored => {}
        }

        if !session.is_success() {
            held = 0;
            continue;
        }
        held += 1;
        if held >= HOLD_TO_MATCH {
            matched += 1;
            log::info!(
                "matched {} (score {:.1})",
                session.target().name,
                session.score()
            );
            held = 0;
            let next = session.next_pose();
            log::info!("next target: {}", next.name);
        }
    }

    stream.stop();
    if !session.calibration().is_calibrated() {
        calibration_bar.abandon_with_message("calibration not completed");
    }
    log::info!(
        "performer played {total_frames} frames; matched {matched} of {} poses",
        session.catalog().count()
    );
    Ok(())
}

/// Holds a T-pose long enough to calibrate, then walks through the camera
/// catalog in order.
fn routine(calibration_frames: u32) -> SyntheticPerformer {
    let performer = SyntheticPerformer::new(BodyLayout::default())
        .with_frame_interval(FRAME_INTERVAL)
        .hold(AngleSet::T_POSE, 0, calibration_frames + 90);

    PoseCatalog::camera()
        .poses()
        .iter()
        .skip(1)
        .fold(performer, |performer, pose| performer.hold(pose.angles, 30, 120))
}

fn calibration_progress_bar(required_frames: u32) -> Result<ProgressBar> {
    let pb = ProgressBar::new(required_frames as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} hold a T-pose [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
    )
    .context("invalid progress template")?
    .progress_chars("=>-");
    pb.set_style(style);
    Ok(pb)
}
