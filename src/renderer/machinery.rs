use std::{
    mem,
    ops::Range,
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender},
    },
    thread::{self, JoinHandle},
};

use assert2::assert;
use bon::bon;
use log::{debug, warn};

use crate::{
    renderer::{
        PixelBuffer, RenderError, RenderInfo, Renderer, render_rows,
        worker::{Job, Worker},
    },
    scene::Scene,
};

/// Rows `[i * height / count, (i + 1) * height / count)`.
pub fn band(index: usize, count: usize, height: u32) -> Range<u32> {
    let edge = |i: usize| (i as u64 * height as u64 / count as u64) as u32;
    edge(index)..edge(index + 1)
}

/// Renders with a pool of persistent threads, each owning a fixed band of rows.
///
/// A render call hands a job to every worker and waits for all of them to finish.
pub struct TileRenderer {
    height: u32,
    workers: Vec<WorkerHandle>,
}

struct WorkerHandle {
    band: Range<u32>,
    jobs: Option<Sender<Job>>,
    done: Receiver<Vec<u8>>,
    /// Band pixels of the previous render, reused for the next one.
    pixels: Vec<u8>,
    thread: Option<JoinHandle<()>>,
}

#[bon]
impl TileRenderer {
    #[builder]
    pub fn new(
        height: u32,
        #[builder(default = num_cpus::get())] worker_count: usize,
        // Workers are assigned to cores round robin.
        #[builder(default)]
        pin_to_cores: bool,
    ) -> Result<Self, RenderError> {
        assert!(worker_count > 0);

        let cores = if pin_to_cores {
            core_affinity::get_core_ids().unwrap_or_default()
        } else {
            Vec::new()
        };
        if pin_to_cores && cores.is_empty() {
            warn!("CPU list is not available, worker threads will not be pinned");
        }

        let workers = (0..worker_count)
            .map(|worker_id| -> Result<WorkerHandle, RenderError> {
                let band = band(worker_id, worker_count, height);
                let (job_sender, job_receiver) = mpsc::channel();
                let (done_sender, done_receiver) = mpsc::channel();
                let core = (!cores.is_empty()).then(|| cores[worker_id % cores.len()]);

                let worker = Worker::new(worker_id, band.clone());
                let thread = thread::Builder::new()
                    .name(format!("render{worker_id}"))
                    .spawn(move || {
                        if let Some(core) = core {
                            core_affinity::set_for_current(core);
                        }
                        worker.run(job_receiver, done_sender);
                    })?;

                Ok(WorkerHandle {
                    band,
                    jobs: Some(job_sender),
                    done: done_receiver,
                    pixels: Vec::new(),
                    thread: Some(thread),
                })
            })
            .collect::<Result<Vec<_>, RenderError>>()?;

        debug!("Started {worker_count} render workers for {height} rows");

        Ok(TileRenderer { height, workers })
    }
}

impl TileRenderer {
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Renderer for TileRenderer {
    fn render(
        &mut self,
        scene: &Arc<Scene>,
        info: &RenderInfo,
        buffer: &mut PixelBuffer,
    ) -> Result<(), RenderError> {
        info.validate(scene, buffer)?;
        if info.height != self.height {
            return Err(RenderError::HeightMismatch {
                renderer: self.height,
                image: info.height,
            });
        }

        for worker in &mut self.workers {
            let job = Job {
                scene: Arc::clone(scene),
                info: info.clone(),
                pixels: mem::take(&mut worker.pixels),
            };
            worker
                .jobs
                .as_ref()
                .ok_or(RenderError::WorkerLost)?
                .send(job)
                .map_err(|_| RenderError::WorkerLost)?;
        }

        for worker in &mut self.workers {
            let pixels = worker.done.recv().map_err(|_| RenderError::WorkerLost)?;
            buffer
                .rows_mut(worker.band.start, worker.band.end)
                .copy_from_slice(&pixels);
            worker.pixels = pixels;
        }

        Ok(())
    }
}

impl Drop for TileRenderer {
    fn drop(&mut self) {
        for worker in &mut self.workers {
            worker.jobs.take();
        }
        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    warn!("Render worker for rows {:?} panicked", worker.band);
                }
            }
        }
        debug!("Stopped {} render workers", self.workers.len());
    }
}

/// Renders everything in the calling thread.
#[derive(Copy, Clone, Debug, Default)]
pub struct SerialRenderer;

impl Renderer for SerialRenderer {
    fn render(
        &mut self,
        scene: &Arc<Scene>,
        info: &RenderInfo,
        buffer: &mut PixelBuffer,
    ) -> Result<(), RenderError> {
        info.validate(scene, buffer)?;
        render_rows(scene, info, 0, info.height, buffer.rows_mut(0, info.height));
        Ok(())
    }
}
