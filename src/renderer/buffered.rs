use std::{
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender, SyncSender, TryRecvError},
    },
    thread::{self, JoinHandle},
};

use log::{debug, warn};

use crate::{
    renderer::{PixelBuffer, RenderError, RenderInfo, Renderer},
    scene::Scene,
};

struct Request {
    scene: Arc<Scene>,
    info: RenderInfo,
}

type Finished = Result<PixelBuffer, RenderError>;

/// Renders on a background thread, decoupling frame requests from displaying results.
///
/// Three buffers circulate: the front buffer held by the caller, one being rendered
/// and one finished frame waiting to be presented. At most two requested frames are
/// pending at any time.
pub struct BufferedRenderer {
    requests: Option<SyncSender<Request>>,
    ready: Receiver<Finished>,
    recycle: Option<Sender<PixelBuffer>>,
    front: PixelBuffer,
    pending: usize,
    thread: Option<JoinHandle<()>>,
}

impl BufferedRenderer {
    pub fn new<R: Renderer + Send + 'static>(mut renderer: R) -> Result<Self, RenderError> {
        let (request_sender, request_receiver) = mpsc::sync_channel::<Request>(1);
        let (ready_sender, ready_receiver) = mpsc::channel::<Finished>();
        let (recycle_sender, recycle_receiver) = mpsc::channel::<PixelBuffer>();

        for _ in 0..2 {
            recycle_sender
                .send(PixelBuffer::new(0, 0, 3))
                .map_err(|_| RenderError::WorkerLost)?;
        }

        let thread = thread::Builder::new()
            .name("render-buffered".to_string())
            .spawn(move || {
                // Buffer of a failed render, kept for the next request.
                let mut spare = None;
                while let Ok(Request { scene, info }) = request_receiver.recv() {
                    let buffer = match spare.take() {
                        Some(buffer) => buffer,
                        None => match recycle_receiver.recv() {
                            Ok(buffer) => buffer,
                            Err(_) => break,
                        },
                    };
                    let mut buffer = if fits(&buffer, &info) {
                        buffer
                    } else {
                        PixelBuffer::for_info(&info)
                    };

                    let result = renderer.render(&scene, &info, &mut buffer);
                    drop(scene);
                    let frame = match result {
                        Ok(()) => Ok(buffer),
                        Err(error) => {
                            spare = Some(buffer);
                            Err(error)
                        }
                    };
                    if ready_sender.send(frame).is_err() {
                        break;
                    }
                }
                debug!("Buffered render thread finished");
            })?;

        Ok(BufferedRenderer {
            requests: Some(request_sender),
            ready: ready_receiver,
            recycle: Some(recycle_sender),
            front: PixelBuffer::new(0, 0, 3),
            pending: 0,
            thread: Some(thread),
        })
    }

    /// Queues a frame to be rendered.
    ///
    /// With two frames already pending this first waits for the older one and presents it,
    /// otherwise the background thread could run out of buffers.
    pub fn request(&mut self, scene: &Arc<Scene>, info: &RenderInfo) -> Result<(), RenderError> {
        while self.pending >= 2 {
            self.wait_frame()?;
        }
        let request = Request {
            scene: Arc::clone(scene),
            info: info.clone(),
        };
        self.requests
            .as_ref()
            .ok_or(RenderError::WorkerLost)?
            .send(request)
            .map_err(|_| RenderError::WorkerLost)?;
        self.pending += 1;
        Ok(())
    }

    /// Number of requested frames not yet presented or dropped.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Moves the newest finished frame to the front, without blocking.
    /// Older finished frames are skipped. Returns whether the front buffer changed.
    pub fn present(&mut self) -> Result<bool, RenderError> {
        let mut newest = None;
        loop {
            match self.ready.try_recv() {
                Ok(Ok(buffer)) => {
                    self.pending -= 1;
                    if let Some(skipped) = newest.replace(buffer) {
                        self.recycle_buffer(skipped);
                    }
                }
                Ok(Err(error)) => {
                    self.pending -= 1;
                    if let Some(buffer) = newest {
                        self.swap_front(buffer);
                    }
                    return Err(error);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) if self.pending > 0 => {
                    return Err(RenderError::WorkerLost);
                }
                Err(TryRecvError::Disconnected) => break,
            }
        }

        Ok(match newest {
            Some(buffer) => {
                self.swap_front(buffer);
                true
            }
            None => false,
        })
    }

    /// Blocks until the next requested frame is finished and moves it to the front.
    /// Returns immediately if nothing is pending.
    pub fn wait_frame(&mut self) -> Result<(), RenderError> {
        if self.pending == 0 {
            return Ok(());
        }
        let frame = self.ready.recv().map_err(|_| RenderError::WorkerLost)?;
        self.pending -= 1;
        self.swap_front(frame?);
        Ok(())
    }

    /// The frame currently displayed. Never written by the background thread.
    pub fn front(&self) -> &PixelBuffer {
        &self.front
    }

    fn swap_front(&mut self, buffer: PixelBuffer) {
        let previous = std::mem::replace(&mut self.front, buffer);
        self.recycle_buffer(previous);
    }

    fn recycle_buffer(&mut self, buffer: PixelBuffer) {
        if let Some(recycle) = &self.recycle {
            // The thread only stops after the request channel closes.
            let _ = recycle.send(buffer);
        }
    }
}

fn fits(buffer: &PixelBuffer, info: &RenderInfo) -> bool {
    (buffer.width(), buffer.height(), buffer.bytes_per_pixel())
        == (info.width, info.height, info.bytes_per_pixel)
}

impl Drop for BufferedRenderer {
    fn drop(&mut self) {
        self.requests.take();
        self.recycle.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Buffered render thread panicked");
            }
        }
    }
}
