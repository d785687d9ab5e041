use std::{
    ops::Range,
    sync::{
        Arc,
        mpsc::{Receiver, Sender},
    },
    time::Instant,
};

use log::trace;

use crate::{
    renderer::{RenderInfo, render_rows},
    scene::Scene,
};

/// Request for a worker to render its band.
pub struct Job {
    pub scene: Arc<Scene>,
    pub info: RenderInfo,
    /// Storage for the rendered rows, resized as needed.
    pub pixels: Vec<u8>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Rendering,
    Terminated,
}

/// Renders a fixed band of image rows, one job at a time.
pub struct Worker {
    id: usize,
    band: Range<u32>,
    state: WorkerState,
}

impl Worker {
    pub fn new(id: usize, band: Range<u32>) -> Self {
        Self {
            id,
            band,
            state: WorkerState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Renders the band and hands back the pixels.
    /// The scene handle is released before returning.
    pub fn render_band(&mut self, job: Job) -> Vec<u8> {
        let Job { scene, info, mut pixels } = job;
        self.set_state(WorkerState::Rendering);
        let start = Instant::now();

        pixels.resize(self.band.len() * info.stride(), 0);
        render_rows(&scene, &info, self.band.start, self.band.end, &mut pixels);
        drop(scene);

        trace!(
            "worker{} rendered rows {:?} in {:.2?}",
            self.id,
            self.band,
            start.elapsed()
        );
        self.set_state(WorkerState::Idle);
        pixels
    }

    /// Serves jobs until the job channel is closed.
    pub fn run(mut self, jobs: Receiver<Job>, done: Sender<Vec<u8>>) -> WorkerState {
        while let Ok(job) = jobs.recv() {
            let pixels = self.render_band(job);
            if done.send(pixels).is_err() {
                break;
            }
        }
        self.set_state(WorkerState::Terminated);
        self.state
    }

    fn set_state(&mut self, state: WorkerState) {
        trace!("worker{}: {:?} -> {:?}", self.id, self.state, state);
        self.state = state;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{sync::mpsc, thread};

    use crate::geometry::{Frame, WorldPoint};
    use crate::scene::skybox::SolidSkybox;
    use crate::util::gray;
    use assert2::assert;

    fn job() -> Job {
        let mut scene = Scene::new();
        let world = scene.add_world(Arc::new(SolidSkybox(gray(1.0))));
        Job {
            scene: Arc::new(scene),
            info: RenderInfo::builder()
                .world(world)
                .eye(WorldPoint::origin())
                .frame(Frame::default())
                .width(3)
                .height(10)
                .cast_limit(1)
                .anti_alias(false)
                .build(),
            pixels: Vec::new(),
        }
    }

    #[test]
    fn renders_only_its_band() {
        let mut worker = Worker::new(0, 4..7);
        let job = job();
        let scene = Arc::clone(&job.scene);

        let pixels = worker.render_band(job);

        assert!(pixels.len() == 3 * 3 * 3);
        assert!(pixels.iter().all(|&b| b == 255));
        assert!(worker.state() == WorkerState::Idle);
        assert!(Arc::strong_count(&scene) == 1);
    }

    #[test]
    fn empty_band() {
        let mut worker = Worker::new(0, 5..5);
        assert!(worker.render_band(job()).is_empty());
    }

    #[test]
    fn terminates_when_jobs_close() {
        let (job_sender, job_receiver) = mpsc::channel();
        let (done_sender, done_receiver) = mpsc::channel();
        let handle = thread::spawn(move || Worker::new(1, 0..2).run(job_receiver, done_sender));

        job_sender.send(job()).unwrap();
        assert!(done_receiver.recv().unwrap().len() == 2 * 3 * 3);
        drop(job_sender);

        assert!(handle.join().unwrap() == WorkerState::Terminated);
    }
}
