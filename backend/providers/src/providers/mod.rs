pub mod gemini;
pub mod http;
pub mod mock;
pub mod ollama;
pub mod openrouter;
