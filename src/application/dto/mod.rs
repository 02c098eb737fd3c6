pub mod conversation_dto;
