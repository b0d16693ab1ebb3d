pub mod camera;
pub mod pick;

pub use camera::CameraController;
pub use pick::{pick, FlashFeedback, PickHit, Ray, FLASH_DURATION};
