pub mod health;
pub mod values;
