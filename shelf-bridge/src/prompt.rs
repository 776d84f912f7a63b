//! Prompt composition for the inventory assistant.

/// Everything the prompt needs from one routed interaction.
#[derive(Debug, Clone)]
pub struct PromptContext<'a> {
    /// CSV snippet of the selected products, header included.
    pub context_csv: &'a str,
    pub question: &'a str,
    pub near_expiry_min: i64,
    pub near_expiry_max: i64,
}

/// Build the user prompt sent alongside the system prompt.
///
/// The model is told to stay inside the CSV snippet and is given the
/// configured near-expiry window so its reading matches the router's.
pub fn compose_prompt(ctx: &PromptContext<'_>) -> String {
    // A window reaching below zero deliberately includes expired rows.
    let negatives = if ctx.near_expiry_min >= 0 {
        " and ignore negative values"
    } else {
        ""
    };
    format!(
        "You are a grocery inventory optimization assistant.\n\n\
         Use only the products provided in the CSV snippet. \
         For 'near expiry' questions, treat near-expiry as products with \
         days_to_expire between {min} and {max}{negatives}.\n\n\
         Here is CSV data for relevant products:\n\
         {csv}\n\n\
         User question: {question}\n\n\
         Answer briefly with clear, practical recommendations in markdown, \
         listing specific products when available.",
        min = ctx.near_expiry_min,
        max = ctx.near_expiry_max,
        negatives = negatives,
        csv = ctx.context_csv.trim_end(),
        question = ctx.question.trim(),
    )
}
