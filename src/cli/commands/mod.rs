pub mod networks;
pub mod token;
