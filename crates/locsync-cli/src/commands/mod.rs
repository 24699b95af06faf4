pub mod declare;
pub mod diff;
pub mod empty;
pub mod fill;
pub mod init;
pub mod pending;
pub mod promote;
pub mod rebuild;
pub mod seed;
pub mod selfrefs;
pub mod stats;
