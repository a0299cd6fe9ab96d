pub mod fetch;
pub mod inspect;
pub mod rank;
