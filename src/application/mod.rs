// Application layer - services the event listener and renderer talk to
pub mod dto;
pub mod errors;
pub mod services;
