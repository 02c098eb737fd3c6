pub mod memory_conversation_repository;
