use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::types::PoseFrame;

/// Anything that yields per-frame pose detections: a webcam plus pose
/// estimator, a recording, or the synthetic performer.
pub trait KeypointSource: Send + 'static {
    fn label(&self) -> String;

    /// Acquires the device/model. Runs once on the caller's thread before
    /// any frame is produced, so setup failures surface immediately.
    fn open(&mut self) -> Result<()>;

    /// Blocks until the next frame. `Ok(None)` means the source is finished.
    fn next_frame(&mut self) -> Result<Option<PoseFrame>>;
}

#[derive(Debug)]
pub struct KeypointStream {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl KeypointStream {
    pub fn stop(mut self) {
        self.shutdown();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|handle| handle.is_finished())
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for KeypointStream {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Opens `source` and pumps its frames into `frame_tx` from a dedicated
/// thread. The channel is the only hand-off point, so frames reach the
/// consumer in production order; when the consumer falls behind and the
/// channel is full, new frames are dropped.
pub fn start_keypoint_stream<S: KeypointSource>(
    mut source: S,
    frame_tx: Sender<PoseFrame>,
) -> Result<KeypointStream> {
    let label = source.label();
    // Fail fast before spawning the producer thread.
    source
        .open()
        .with_context(|| format!("failed to open keypoint source {label}"))?;
    log::info!("keypoint source {label} ready");

    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = thread::Builder::new()
        .name("keypoint-source".to_string())
        .spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                let frame = match source.next_frame() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        log::info!("keypoint source {label} finished");
                        break;
                    }
                    Err(err) => {
                        log::warn!("keypoint source {label} read failed: {err:?}");
                        continue;
                    }
                };

                match frame_tx.try_send(frame) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => {
                        log::info!("keypoint consumer gone, stopping {label}");
                        break;
                    }
                }
            }
        })
        .context("failed to spawn keypoint source thread")?;

    Ok(KeypointStream {
        stop,
        handle: Some(handle),
    })
}

/// Non-blocking: drains everything queued and returns the newest frame.
/// Older queued frames are skipped, never reordered.
pub fn latest_frame(frame_rx: &Receiver<PoseFrame>) -> Option<PoseFrame> {
    let mut latest = frame_rx.try_recv().ok()?;
    while let Ok(newer) = frame_rx.try_recv() {
        latest = newer;
    }
    Some(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Keypoint, KeypointName};
    use anyhow::anyhow;
    use crossbeam_channel::bounded;
    use std::time::Duration;

    struct Counter {
        next: u32,
        limit: u32,
    }

    impl KeypointSource for Counter {
        fn label(&self) -> String {
            "counter".to_string()
        }

        fn open(&mut self) -> Result<()> {
            Ok(())
        }

        fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
            if self.next >= self.limit {
                return Ok(None);
            }
            let x = self.next as f32;
            self.next += 1;
            Ok(Some(PoseFrame::new(vec![Keypoint::new(
                KeypointName::Nose,
                x,
                0.0,
                1.0,
            )])))
        }
    }

    struct Broken;

    impl KeypointSource for Broken {
        fn label(&self) -> String {
            "broken".to_string()
        }

        fn open(&mut self) -> Result<()> {
            Err(anyhow!("no camera"))
        }

        fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
            unreachable!("never opened")
        }
    }

    #[test]
    fn test_open_failure_is_reported_before_spawn() {
        let (tx, _rx) = bounded(1);
        let err = start_keypoint_stream(Broken, tx).unwrap_err();
        assert!(format!("{err:#}").contains("no camera"));
    }

    #[test]
    fn test_frames_arrive_in_order() {
        let (tx, rx) = bounded(64);
        let stream = start_keypoint_stream(Counter { next: 0, limit: 50 }, tx).unwrap();

        let mut seen = Vec::new();
        while let Ok(frame) = rx.recv_timeout(Duration::from_secs(2)) {
            seen.push(frame.keypoints[0].x);
        }
        stream.stop();

        assert!(!seen.is_empty());
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_latest_frame_drains_queue() {
        let (tx, rx) = bounded(8);
        for x in 0..3 {
            tx.send(PoseFrame::new(vec![Keypoint::new(
                KeypointName::Nose,
                x as f32,
                0.0,
                1.0,
            )]))
            .unwrap();
        }
        let frame = latest_frame(&rx).unwrap();
        assert_eq!(frame.keypoints[0].x, 2.0);
        assert!(latest_frame(&rx).is_none());
    }
}
