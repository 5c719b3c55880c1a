pub mod dates;
pub mod split;
