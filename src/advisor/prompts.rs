//! Scripted advisor lines for the onboarding phase.

/// Onboarding questions, in order. The first one opens every conversation;
/// the others are the fallback when the webhook has nothing to say.
pub const SCRIPTED_PROMPTS: [&str; 3] = [
    "Bonjour ! Je suis ravi de votre intérêt pour ce produit. Pourriez-vous me dire votre nom ?",
    "Merci ! Où êtes-vous situé(e) ?",
    "Parfait. Avez-vous des questions spécifiques concernant ce produit ?",
];

/// Number of scripted steps before the conversation opens up.
pub const SCRIPTED_STEPS: usize = SCRIPTED_PROMPTS.len();

/// The line that opens a fresh conversation.
pub fn opening_prompt() -> &'static str {
    SCRIPTED_PROMPTS[0]
}

/// The scripted line that follows the answer given at `step`, if any.
pub fn next_prompt(step: usize) -> Option<&'static str> {
    SCRIPTED_PROMPTS.get(step + 1).copied()
}
