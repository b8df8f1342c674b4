use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use settings::FrameReadback;

use crate::{Frame, FrameBuffer};

/// Source of frames for readback. Chosen once per surface.
pub trait ReadbackBackend {
    fn name(&self) -> &'static str;

    /// Copy the most recent frame. Returns [`FrameBuffer::empty`] when no
    /// frame is available.
    fn read(&self) -> FrameBuffer;

    /// Handle the renderer uses to hand over frames, if this backend
    /// accepts them.
    fn presenter(&self) -> Option<FramePresenter> {
        None
    }
}

impl fmt::Debug for dyn ReadbackBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadbackBackend").field(&self.name()).finish()
    }
}

/// Pick the backend for a new surface.
///
/// `external` has nothing to read from until the host installs its own
/// backend, so it starts out as the null backend.
pub fn select_backend(mode: FrameReadback) -> Box<dyn ReadbackBackend> {
    match mode {
        FrameReadback::None => Box::new(NullBackend),
        FrameReadback::Software => Box::new(SoftwareBackend::new()),
        FrameReadback::External => {
            tracing::debug!("External readback selected; waiting for the host to install one");
            Box::new(NullBackend)
        }
    }
}

/// Never has a frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl ReadbackBackend for NullBackend {
    fn name(&self) -> &'static str {
        "none"
    }

    fn read(&self) -> FrameBuffer {
        FrameBuffer::empty()
    }
}

/// Keeps the last frame the renderer presented.
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    last: Arc<Mutex<Option<Frame>>>,
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadbackBackend for SoftwareBackend {
    fn name(&self) -> &'static str {
        "software"
    }

    fn read(&self) -> FrameBuffer {
        let last = self.last.lock();
        let Some(frame) = last.as_ref() else {
            tracing::trace!("Readback requested before any frame was presented");
            return FrameBuffer::empty();
        };
        match frame.to_buffer() {
            Ok(buffer) => buffer,
            Err(err) => {
                tracing::warn!("Discarding unreadable frame: {}", err);
                FrameBuffer::empty()
            }
        }
    }

    fn presenter(&self) -> Option<FramePresenter> {
        Some(FramePresenter {
            last: self.last.clone(),
        })
    }
}

/// Cloneable, thread-safe handle for presenting frames to a
/// [`SoftwareBackend`].
#[derive(Debug, Clone)]
pub struct FramePresenter {
    last: Arc<Mutex<Option<Frame>>>,
}

impl FramePresenter {
    /// Replace the last frame.
    pub fn present(&self, frame: Frame) {
        *self.last.lock() = Some(frame);
    }

    /// Forget the last frame, e.g. after the viewport was resized.
    pub fn clear(&self) {
        self.last.lock().take();
    }
}

/// Frames supplied by the host on demand.
pub struct ExternalBackend {
    source: Box<dyn Fn() -> Option<Frame>>,
}

impl ExternalBackend {
    pub fn new(source: impl Fn() -> Option<Frame> + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }
}

impl fmt::Debug for ExternalBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalBackend").finish_non_exhaustive()
    }
}

impl ReadbackBackend for ExternalBackend {
    fn name(&self) -> &'static str {
        "external"
    }

    fn read(&self) -> FrameBuffer {
        let Some(frame) = (self.source)() else {
            return FrameBuffer::empty();
        };
        match frame.to_buffer() {
            Ok(buffer) => buffer,
            Err(err) => {
                tracing::warn!("External frame rejected: {}", err);
                FrameBuffer::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelFormat;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(FrameReadback::None, "none" ; "none")]
    #[test_case(FrameReadback::Software, "software" ; "software")]
    #[test_case(FrameReadback::External, "none" ; "external waits for host")]
    fn selection(mode: FrameReadback, expected: &str) {
        assert_eq!(select_backend(mode).name(), expected);
    }

    #[test]
    fn null_backend_is_empty() {
        assert!(NullBackend.read().is_empty());
        assert!(NullBackend.presenter().is_none());
    }

    #[test]
    fn software_before_first_frame_is_empty() {
        assert!(SoftwareBackend::new().read().is_empty());
    }

    #[test]
    fn software_returns_last_presented_frame() {
        let backend = SoftwareBackend::new();
        let presenter = backend.presenter().unwrap();

        presenter.present(Frame::packed(1, 1, PixelFormat::Bgra, vec![1, 2, 3, 4]));
        presenter.present(Frame::packed(1, 1, PixelFormat::Bgra, vec![5, 6, 7, 8]));
        assert_eq!(backend.read().pixel(0, 0), Some([5, 6, 7, 8]));

        presenter.clear();
        assert!(backend.read().is_empty());
    }

    #[test]
    fn presenter_works_across_threads() {
        let backend = SoftwareBackend::new();
        let presenter = backend.presenter().unwrap();
        std::thread::spawn(move || {
            presenter.present(Frame::packed(2, 1, PixelFormat::Rgba, vec![1, 2, 3, 4, 5, 6, 7, 8]));
        })
        .join()
        .unwrap();
        assert_eq!(backend.read().pixel(1, 0), Some([7, 6, 5, 8]));
    }

    #[test]
    fn software_rejects_bad_frame() {
        let backend = SoftwareBackend::new();
        backend
            .presenter()
            .unwrap()
            .present(Frame::packed(4, 4, PixelFormat::Bgra, vec![0; 3]));
        assert!(backend.read().is_empty());
    }

    #[test]
    fn external_backend_reads_from_host() {
        let backend = ExternalBackend::new(|| Some(Frame::packed(1, 1, PixelFormat::Bgra, vec![1, 1, 1, 1])));
        assert_eq!(backend.read().width(), 1);
        assert!(ExternalBackend::new(|| None).read().is_empty());
    }
}
