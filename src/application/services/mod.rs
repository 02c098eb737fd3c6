pub mod conversation_service;
pub mod removal_policy;
