//! Pixel buffers lent to the host.
//!
//! Every exported buffer is recorded by address until the host returns it,
//! so a double free or a stray pointer is logged and ignored instead of
//! corrupting the heap.

use collections::FxHashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use readback::FrameBuffer;

use crate::handle::TbSurface;
use crate::records::TbPixelData;

/// Outstanding buffers: address to length.
static OUTSTANDING: Lazy<Mutex<FxHashMap<usize, usize>>> =
    Lazy::new(|| Mutex::new(FxHashMap::default()));

fn export(buffer: FrameBuffer) -> TbPixelData {
    let (pixels, width, height, pitch) = buffer.into_raw_parts();
    let Some(pixels) = pixels else {
        return TbPixelData::zeroed();
    };
    let len = pixels.len();
    let ptr = Box::into_raw(pixels).cast::<u8>();
    OUTSTANDING.lock().insert(ptr as usize, len);
    TbPixelData {
        pixels: ptr,
        width,
        height,
        pitch,
    }
}

/// Copy the surface's last rendered frame. The result is zeroed when the
/// surface has no size, its backend has no frame, or the call is made from
/// inside a callback. A non-null buffer must be returned with
/// [`termbridge_free_pixels`].
///
/// # Safety
///
/// `surface` must be null or a live surface handle.
#[no_mangle]
pub unsafe extern "C" fn termbridge_surface_get_pixels(surface: *mut TbSurface) -> TbPixelData {
    let Some(surface) = (unsafe { surface.as_ref() }) else {
        return TbPixelData::zeroed();
    };
    let buffer = unsafe { surface.target().with("surface_get_pixels", FrameBuffer::empty(), |s| s.get_pixels()) };
    export(buffer)
}

/// Release a buffer from [`termbridge_surface_get_pixels`] and zero the
/// record. Freeing a zeroed record, or the same buffer twice, does nothing.
///
/// # Safety
///
/// `data` must be null or point to a writable [`TbPixelData`].
#[no_mangle]
pub unsafe extern "C" fn termbridge_free_pixels(data: *mut TbPixelData) {
    let Some(data) = (unsafe { data.as_mut() }) else {
        return;
    };
    if data.pixels.is_null() {
        return;
    }
    match OUTSTANDING.lock().remove(&(data.pixels as usize)) {
        Some(len) => {
            let slice = std::ptr::slice_from_raw_parts_mut(data.pixels, len);
            drop(unsafe { Box::from_raw(slice) });
        }
        None => tracing::warn!("Pixel buffer {:p} is not outstanding; ignored", data.pixels),
    }
    *data = TbPixelData::zeroed();
}
