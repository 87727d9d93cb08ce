pub mod papers;
pub mod sessions;
