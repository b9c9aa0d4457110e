pub mod mutation;
pub mod scheduled;
pub mod stream;
