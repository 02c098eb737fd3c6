// Domain layer - value types and the interfaces infrastructure implements
pub mod clock;
pub mod errors;
pub mod models;
pub mod repositories;
