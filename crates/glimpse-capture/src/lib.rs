mod acquire;
mod backend;
mod bitmap;
mod capture;
mod crop;
mod error;
mod focus;
mod frame;
mod hotkey;
mod persist;
mod resolve;
mod target;

pub use acquire::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, FrameAcquirer};
pub use backend::{
    DisplayId, DisplayInfo, FrameStream, ProcessId, ScreenSource, StreamFactory, WindowId,
    WindowInfo,
};
pub use bitmap::CapturedBitmap;
pub use capture::{XcapBackend, list_windows};
pub use crop::crop;
pub use error::{CaptureError, HotkeyError, PersistError, ResolutionError};
pub use focus::{FocusControl, SystemFocus};
pub use frame::{Frame, FrameSlot, PixelFormat, StreamConfig};
pub use hotkey::{HotkeyAction, HotkeyManager, parse_binding};
pub use persist::PersistenceSink;
pub use resolve::{primary_display, resolve};
pub use target::CaptureTarget;
