//! Compute backends
//!
//! Only the CPU backend exists. Chunk hashing is short, memory-bound work,
//! so device offload would cost more in transfers than it saves.

pub mod cpu;
