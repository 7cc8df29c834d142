pub mod chunk;
pub mod classify;
pub mod index;
pub mod search;
pub mod serve;
