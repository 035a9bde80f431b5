//! Typed operations on [`RedisConnection`](crate::RedisConnection), one file
//! per command group.

mod hashes;
mod keys;
mod server;
mod sets;
mod strings;
mod zsets;
