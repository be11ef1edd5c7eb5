/// Instruction sent as the single user message
pub fn build_prompt(word: &str, context: &str) -> String {
    let context = context.trim();
    let context = if context.is_empty() { word } else { context };

    format!(
        "You are an English-to-Simplified-Chinese dictionary.\n\
         Context: \"{context}\"\n\
         Translate the word \"{word}\" as it is used in the context above.\n\
         Reply with only the most fitting concise Chinese translation. \
         No pinyin, no explanation, no extra punctuation."
    )
}
