pub mod review;
pub mod shared;
