use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::common::{CrioError, PageId, Result, PAGE_SIZE};

use super::DiskManager;

/// A single disk I/O request plus the means to signal its completion.
pub struct DiskRequest {
    page_id: PageId,
    kind: RequestKind,
    completion: std::sync::mpsc::Sender<DiskRequestOutcome>,
}

enum RequestKind {
    Read,
    Write(Box<[u8; PAGE_SIZE]>),
}

/// Outcome of a completed request. Reads hand the filled buffer back to the
/// caller; writes hand back the buffer they supplied.
pub struct DiskRequestOutcome {
    pub success: bool,
    pub buffer: Box<[u8; PAGE_SIZE]>,
}

/// A future-like handle resolved by the worker thread once a request
/// completes.
pub struct DiskRequestFuture {
    rx: std::sync::mpsc::Receiver<DiskRequestOutcome>,
}

impl DiskRequestFuture {
    pub fn wait(self) -> Result<DiskRequestOutcome> {
        self.rx
            .recv()
            .map_err(|e| CrioError::DiskScheduler(format!("worker dropped request: {e}")))
    }
}

impl DiskRequest {
    pub fn read(page_id: PageId) -> (Self, DiskRequestFuture) {
        let (tx, rx) = std::sync::mpsc::channel();
        let req = Self {
            page_id,
            kind: RequestKind::Read,
            completion: tx,
        };
        (req, DiskRequestFuture { rx })
    }

    pub fn write(page_id: PageId, buffer: Box<[u8; PAGE_SIZE]>) -> (Self, DiskRequestFuture) {
        let (tx, rx) = std::sync::mpsc::channel();
        let req = Self {
            page_id,
            kind: RequestKind::Write(buffer),
            completion: tx,
        };
        (req, DiskRequestFuture { rx })
    }
}

enum Message {
    Request(DiskRequest),
    Shutdown,
}

/// DiskScheduler serializes disk I/O on a single background worker thread.
///
/// `schedule` enqueues onto an unbounded channel and never blocks the
/// caller; a request's completion is observed through the `DiskRequestFuture`
/// returned alongside it. Submitting the `Shutdown` sentinel (done
/// automatically on `Drop`) terminates the worker once it drains whatever
/// was queued ahead of the sentinel, preserving FIFO order.
pub struct DiskScheduler {
    disk_manager: Arc<DiskManager>,
    sender: Sender<Message>,
    worker_handle: Option<JoinHandle<()>>,
}

impl DiskScheduler {
    pub fn new(disk_manager: Arc<DiskManager>) -> Self {
        let (sender, receiver) = unbounded::<Message>();
        let dm_clone = Arc::clone(&disk_manager);

        let worker_handle = thread::spawn(move || {
            Self::worker_loop(dm_clone, receiver);
        });

        Self {
            disk_manager,
            sender,
            worker_handle: Some(worker_handle),
        }
    }

    /// Enqueues a request. Never blocks: the channel is unbounded.
    pub fn schedule(&self, request: DiskRequest) -> Result<()> {
        self.sender
            .send(Message::Request(request))
            .map_err(|e| CrioError::DiskScheduler(format!("failed to schedule request: {e}")))
    }

    /// Schedules a read and blocks the calling thread until it completes.
    pub fn schedule_read_sync(&self, page_id: PageId) -> Result<Box<[u8; PAGE_SIZE]>> {
        let (request, future) = DiskRequest::read(page_id);
        self.schedule(request)?;
        let outcome = future.wait()?;
        if !outcome.success {
            return Err(CrioError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("failed to read page {page_id}"),
            )));
        }
        Ok(outcome.buffer)
    }

    /// Schedules a write and blocks the calling thread until it completes.
    pub fn schedule_write_sync(&self, page_id: PageId, data: &[u8; PAGE_SIZE]) -> Result<()> {
        let (request, future) = DiskRequest::write(page_id, Box::new(*data));
        self.schedule(request)?;
        let outcome = future.wait()?;
        if !outcome.success {
            return Err(CrioError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("failed to write page {page_id}"),
            )));
        }
        Ok(())
    }

    fn worker_loop(disk_manager: Arc<DiskManager>, receiver: Receiver<Message>) {
        while let Ok(message) = receiver.recv() {
            match message {
                Message::Request(request) => Self::process_request(&disk_manager, request),
                Message::Shutdown => break,
            }
        }
    }

    fn process_request(disk_manager: &DiskManager, request: DiskRequest) {
        let DiskRequest {
            page_id,
            kind,
            completion,
        } = request;

        let outcome = match kind {
            RequestKind::Read => {
                let mut buffer = Box::new([0u8; PAGE_SIZE]);
                let success = match disk_manager.read_page(page_id, buffer.as_mut_slice()) {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("disk scheduler read of {page_id} failed: {e}");
                        false
                    }
                };
                DiskRequestOutcome { success, buffer }
            }
            RequestKind::Write(buffer) => {
                let success = match disk_manager.write_page(page_id, buffer.as_slice()) {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("disk scheduler write of {page_id} failed: {e}");
                        false
                    }
                };
                DiskRequestOutcome { success, buffer }
            }
        };

        let _ = completion.send(outcome);
    }

    pub fn disk_manager(&self) -> &Arc<DiskManager> {
        &self.disk_manager
    }
}

impl Drop for DiskScheduler {
    fn drop(&mut self) {
        let _ = self.sender.send(Message::Shutdown);
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}
