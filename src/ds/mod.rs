pub mod ring_buf;

pub use ring_buf::RingBuf;
