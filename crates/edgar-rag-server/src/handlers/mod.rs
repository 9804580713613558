pub mod ask;
pub mod companies;
pub mod health;
