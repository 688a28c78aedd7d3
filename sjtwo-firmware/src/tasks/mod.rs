//! Embassy async tasks
//!
//! Each task runs independently; the button task is woken from the GPIO
//! interrupt through a signal.

pub mod blink;
pub mod button;
pub mod flash_id;

pub use blink::blink_task;
pub use button::{button_task, BUTTON_HANDLER};
pub use flash_id::flash_id_task;
