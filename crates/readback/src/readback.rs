//! Synchronous readback of the last rendered frame.
//!
//! The renderer presents frames into a backend; the host pulls a packed BGRA
//! copy on demand. Every failure yields [`FrameBuffer::empty`].

mod backend;
mod frame;

pub use backend::{
    select_backend, ExternalBackend, FramePresenter, NullBackend, ReadbackBackend, SoftwareBackend,
};
pub use frame::{Frame, FrameBuffer, FrameError, PixelFormat};
