//! Prompt templates and the recipe-title parser.
//!
//! The completion is expected (not guaranteed) to follow the three-field
//! format the prompt asks for: `レシピ名: / 材料: / 作り方:`. Title extraction
//! must stay total no matter what the model actually returns.

/// Label that opens the ingredients section of a well-formed completion.
const INGREDIENTS_LABEL: &str = "材料:";

/// Label that may prefix the recipe name on the first line.
const TITLE_LABEL: &str = "レシピ名:";

/// Sent instead of a recipe whenever a generative call fails.
pub const FALLBACK_MESSAGE: &str =
    "申し訳ありません。レシピの作成中にエラーが発生しました。しばらくしてからもう一度お試しください。";

/// Chef prompt with the user's ingredient text substituted in verbatim.
pub fn recipe_prompt(user_text: &str) -> String {
    format!(
        "あなたはプロの料理人です。\n\
         以下の食材を使って美味しいレシピを1つ考えてください。\n\
         食材: {user_text}\n\
         出力形式：\n\
         レシピ名:\n\
         材料:\n\
         作り方:"
    )
}

/// Prompt for the recipe-photo illustration.
pub fn image_prompt(title: &str) -> String {
    format!("{title}のフォトリアリスティックなイラスト")
}

/// Pulls the recipe name out of a completion.
///
/// Takes everything before the first `材料:`, strips a leading `レシピ名:`
/// label, and trims. If the delimiter is missing the whole completion
/// (trimmed) is the title. Total for every input, including the empty string.
pub fn extract_title(completion: &str) -> &str {
    let head = match completion.split_once(INGREDIENTS_LABEL) {
        Some((head, _)) => head,
        None => completion,
    };
    let head = head.trim();
    head.strip_prefix(TITLE_LABEL).unwrap_or(head).trim()
}
