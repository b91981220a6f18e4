// ABOUTME: Prompt templates for the PCGenie completion engine
// ABOUTME: Renders the persona response prompt and the history summarization request
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Prompt Templates
//!
//! Wording for every engine call lives here so it can be tuned without
//! touching the pipeline. Two prompts exist: the persona response prompt
//! wrapping each user question, and the summarization request used to
//! compress older history.

/// Render the PCGenie response prompt around a rendered conversation
/// context and the user's question.
#[must_use]
pub fn response_prompt(context: &str, question: &str) -> String {
    format!(
        "You are PCGenie, an AI assistant that helps users build and compare PC components.\n\
         \n\
         Answer the question below in a structured format.\n\
         \n\
         Here is the conversation history: \n\
         {context}\n\
         \n\
         Question: {question}\n\
         \n\
         Answer (use bullet points if listing items):\n\
         \n\
         Use RM for the currency code"
    )
}

/// Render the summarization request for a block of older conversation
/// turns. Sent as the question of a context-free engine call.
#[must_use]
pub fn summary_prompt(old_context: &str) -> String {
    format!("Summarize this conversation for memory retention:\n\n{old_context}")
}
