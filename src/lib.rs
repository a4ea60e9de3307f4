pub mod block;
pub mod ring;
pub mod storage;
