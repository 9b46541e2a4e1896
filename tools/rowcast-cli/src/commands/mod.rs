pub mod check;
pub mod info;
pub mod inspect;
pub mod log;
