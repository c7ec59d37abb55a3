mod client;

pub use client::{OpenAIClient, OPENAI_API_BASE, OPENROUTER_API_BASE};
