//! Data-flow animation for the neural network diagram.
//!
//! The frame loop runs on its own task and is owned by an [`AnimationHandle`]:
//! the loop lives exactly as long as the handle does.

mod scene;

use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::error::{ForestryErr, Result};

pub use scene::{Canvas, Connection, Frame, Node, Particle, ParticleState, Scene};

/// A running frame loop.
///
/// Dropping the handle cancels the loop; [`AnimationHandle::stop`] also waits
/// for it and hands the scene back.
#[derive(Debug)]
pub struct AnimationHandle {
    frames: watch::Receiver<Frame>,
    cancel: CancellationToken,
    task: Option<JoinHandle<Scene>>,
}

impl AnimationHandle {
    /// Spawns the frame loop on the current tokio runtime.
    ///
    /// # Arguments
    /// * `scene` - The laid out network to animate.
    /// * `frame_interval` - Time between two frames.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn start(mut scene: Scene, frame_interval: Duration) -> Self {
        let (tx, frames) = watch::channel(scene.frame());
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        scene.advance();
                        // no receivers left is not an error
                        let _ = tx.send(scene.frame());
                    }
                }
            }

            log::debug!("animation stopped after {} frames", scene.tick());
            scene
        });

        log::debug!("animation started, frame interval {frame_interval:?}");
        Self {
            frames,
            cancel,
            task: Some(task),
        }
    }

    /// The most recently drawn frame.
    pub fn snapshot(&self) -> Frame {
        self.frames.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Waits until at least `tick` frames have been drawn.
    ///
    /// # Errors
    /// Returns `ForestryErr::AnimationStopped` if the loop ends first.
    pub async fn wait_for_tick(&mut self, tick: u64) -> Result<Frame> {
        loop {
            {
                let frame = self.frames.borrow_and_update();
                if frame.tick >= tick {
                    return Ok(frame.clone());
                }
            }

            self.frames
                .changed()
                .await
                .map_err(|_| ForestryErr::AnimationStopped("frame loop ended".into()))?;
        }
    }

    /// Cancels the loop and returns the scene as it was on the last frame.
    ///
    /// # Errors
    /// Returns `ForestryErr::AnimationStopped` if the loop task panicked or was aborted.
    pub async fn stop(mut self) -> Result<Scene> {
        self.cancel.cancel();
        let task = self
            .task
            .take()
            .ok_or_else(|| ForestryErr::AnimationStopped("already stopped".into()))?;

        task.await
            .map_err(|e| ForestryErr::AnimationStopped(e.to_string()))
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn small_scene() -> Scene {
        let mut rng = StdRng::seed_from_u64(3);
        Scene::build(1, 2, 0.9, Canvas::default(), &mut rng)
    }

    #[tokio::test]
    async fn frames_advance_until_stopped() {
        let mut handle = AnimationHandle::start(small_scene(), Duration::from_millis(1));
        let frame = handle.wait_for_tick(5).await.unwrap();
        assert!(frame.tick >= 5);
        assert!(handle.is_running());

        let scene = handle.stop().await.unwrap();
        assert!(scene.tick() >= 5);
    }

    #[tokio::test]
    async fn dropping_the_handle_ends_the_loop() {
        let handle = AnimationHandle::start(small_scene(), Duration::from_millis(1));
        let mut frames = handle.frames.clone();
        drop(handle);

        // the sender goes away once the task observes the cancellation
        while frames.changed().await.is_ok() {}
    }

    #[tokio::test]
    async fn snapshot_starts_at_the_initial_frame() {
        let handle = AnimationHandle::start(small_scene(), Duration::from_secs(3600));
        let frame = handle.snapshot();
        assert!(frame.tick <= 1);
        assert_eq!(frame.particles.len(), frame.connections.len() * 3);
        handle.stop().await.unwrap();
    }
}
