pub mod frame_grabber;

pub use frame_grabber::grab_frame;
