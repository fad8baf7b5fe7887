//! Prompts for the three language-model calls.
//!
//! Every prompt lives here so wording changes never touch the gateway's
//! transport or error handling, and unit tests can inspect prompts without a
//! live model.

/// System message for markdown translation.
pub const TRANSLATE_SYSTEM_PROMPT: &str =
    "You are a professional translator specialized in maintaining Markdown formatting.";

/// User message for translating one markdown section into `target_language`.
pub fn translate_prompt(text: &str, target_language: &str) -> String {
    format!(
        r#"You are a professional translator. You MUST translate the following text to {lang}.

CRITICAL REQUIREMENTS:
1. You MUST actually translate the text content to {lang}, not repeat the original
2. Preserve ALL Markdown formatting exactly (headers, links, bold, italic, code blocks, etc.)
3. Only translate the actual text content, not the Markdown syntax
4. Maintain the same structure and formatting
5. If there are code snippets, translate only the comments, not the code itself
6. Return ONLY the translated text in {lang}, no additional explanations
7. If the text is already in {lang}, return it as-is

Text to translate to {lang}:
{text}"#,
        lang = target_language,
        text = text
    )
}

/// System message for code annotation.
pub fn annotate_system_prompt(target_language: &str) -> String {
    format!("You are a coding expert who adds helpful comments in {target_language}.")
}

/// User message asking for comments on `code`, written in `target_language`.
pub fn annotate_prompt(code: &str, target_language: &str) -> String {
    format!(
        r#"You are a coding expert and translator. Analyze the following code and:

CRITICAL REQUIREMENTS:
1. Add detailed, line-by-line comments explaining what the code does
2. Translate any existing comments to {lang}
3. Keep the original code EXACTLY the same - only add/modify comments
4. Write NEW comments in {lang}
5. Use appropriate comment syntax for the programming language (# for Python, // for JavaScript, etc.)
6. Place comments ABOVE the relevant lines or at the end of lines
7. Make comments educational and helpful for understanding
8. IMPORTANT: Do NOT wrap the code in markdown code blocks (```). Return ONLY the commented code.

Code to analyze and add {lang} comments (return ONLY the commented code, no markdown wrapping):
{code}"#,
        lang = target_language,
        code = code
    )
}

/// Text part sent alongside an image to be described.
pub fn describe_prompt(target_language: &str) -> String {
    format!(
        r#"Describe this image in detail in {target_language}.
Provide a comprehensive description that would help someone understand the content and context of the image.
Focus on:
1. Main objects, people, or subjects in the image
2. Setting, background, and environment
3. Colors, composition, and visual elements
4. Any text or important details visible
5. Overall mood or purpose of the image

Provide only the description, no additional text."#
    )
}
