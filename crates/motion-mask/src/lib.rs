#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use motion_grid as grid;

#[doc(inline)]
pub use motion_imgproc as imgproc;
