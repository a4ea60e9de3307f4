pub mod buffer;
pub mod cursor;
pub mod ring_error;
pub mod tag;

pub use buffer::RingBuffer;
pub use cursor::*;
pub use ring_error::*;
pub use tag::TagSource;
