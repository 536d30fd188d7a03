//! Fixed prompt templates and the functions that fill them.
//!
//! Answer prompts always keep the same section order: persona and guidelines,
//! knowledge, chat history, the user turn, then the agent cue.

use crate::{api_types::ChatTurn, intent::IntentLabel};

/// Which guideline block an answer prompt uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemplateKind {
    Media,
    Support,
}

pub const PERSONA: &str = r#"
You are a helpful {brand} Customer Service Bot called StreamGenie. Your primary goal is to provide accurate and helpful assistance to {brand} customers.

You can answer questions about:
* **Account Management:** Billing, payments, cancellations, refunds, account settings, password resets
* **Content:** Upcoming movies and TV series, available titles, content recommendations, Showtimes
* **Technical Issues:** Streaming quality, app troubleshooting, device compatibility, error messages
"#;

const SHARED_GUIDELINES: &str = r#"
**Guidelines**
* **Stay on Topic:** Answer questions only related to {brand}. If you don't have information or the question is unrelated, politely inform the user you cannot assist with that.
* **Prioritize Accuracy:** Use only information you are sure about. If unsure, say you'll need to check and get back to them.
* **Customer Focus:** Be polite, empathetic, and helpful. Use clear and concise language.
* **Brand Voice:** Maintain a friendly and professional tone that aligns with {brand}'s brand.
* **Data Privacy:** Do not request or store any personally identifiable information (PII) unless absolutely necessary for the support interaction (e.g., to locate an account). If collecting PII, be transparent and explain why it's needed.
* **Escalation:** If you cannot resolve a customer's issue, offer to connect them with a human support agent.
* **Chat History:** Use the chat history so that you have context of past conversations with the user."#;

pub const MEDIA_GUIDELINES: &str = r#"
* **Media Catalog:** Use the Media Catalog info if it's helpful in answering the User's question.
"#;

pub const SUPPORT_GUIDELINES: &str = r#"
* **Knowledge Base:** Use the Knowledge Base info if it's helpful in answering the User's question.
* **Cancellation:** If the user asks to cancel their account, ask them why they'd like to cancel and if there's any way to keep them as a customer. If they continue to state that they'd like to cancel, then provide them with advice on how to cancel their {brand} Subscription.
* If the response is found within the **Knowledge Base** then also return the associated "url" from the Knowledge Base.
* You can only use information from the **Knowledge Base** when answering the user's question.
"#;

const REMEMBER: &str = r#"
**Remember:**
* Your primary goal is to help {brand} customers.
* Focus on accuracy, clarity, and customer satisfaction.
* If in doubt, seek clarification or escalate to a human agent.
"#;

pub const ROUTER: &str = r#"
Your job is to interpret the user question and output a category that is most relevant to the **user question**.

**Categories:**
* cancellation: /* Match to this category if the user asks about cancellations */
* payments: /* Match to this category if the user asks about payments, refunds, money, credit card. */
* login: /* Match to this category if the user asks about login, password, or account details */
* recommendations: /* Match to this category if the user asks for TV or Movie recommendations from {brand} */
* media: /* Match to this category if the user asks for details about a specific TV show or Movie */
* general: /* Match to this category if the user comment does not fall into any other category */

**Output**
* Only output a single word based on the matching category such as cancellation, recommendations, or media.

**User Comment**
{user_comment}
"#;

impl TemplateKind {
    /// Media template for catalog questions, support template for everything
    /// else, including an unknown intent.
    pub fn for_intent(intent: Option<IntentLabel>) -> Self {
        match intent {
            Some(IntentLabel::Recommendations | IntentLabel::Media) => TemplateKind::Media,
            _ => TemplateKind::Support,
        }
    }

    fn guidelines(self) -> &'static str {
        match self {
            TemplateKind::Media => MEDIA_GUIDELINES,
            TemplateKind::Support => SUPPORT_GUIDELINES,
        }
    }

    /// Heading of the knowledge section.
    pub fn knowledge_heading(self) -> &'static str {
        match self {
            TemplateKind::Media => "**Media Catalog:**",
            TemplateKind::Support => "**Knowledge Base:**",
        }
    }
}

/// Router prompt for one utterance.
pub fn compose_router_prompt(user_comment: &str, brand: &str) -> String {
    ROUTER
        .replace("{brand}", brand)
        .replace("{user_comment}", user_comment)
}

/// Full answer prompt.
///
/// `knowledge` is already rendered and may be empty; the heading is kept either way.
pub fn compose_answer_prompt(
    kind: TemplateKind,
    brand: &str,
    chat_history: &[ChatTurn],
    knowledge: &str,
    user_comment: &str,
) -> String {
    // Substitute brand in the fixed parts only; user text and knowledge go in verbatim.
    let head = [PERSONA, SHARED_GUIDELINES, kind.guidelines(), REMEMBER]
        .concat()
        .replace("{brand}", brand);

    let mut out = String::with_capacity(head.len() + knowledge.len() + user_comment.len() + 256);
    out.push_str(&head);
    out.push('\n');
    out.push_str(kind.knowledge_heading());
    out.push('\n');
    out.push_str(knowledge);
    out.push_str("\n\n**Chat History**\n");
    out.push_str(&serialize_history(chat_history));
    out.push_str("\n\nUser:");
    out.push_str(user_comment);
    out.push_str("\nAgent:\n");
    out
}

/// JSON array of `{user, agent}` objects.
pub fn serialize_history(chat_history: &[ChatTurn]) -> String {
    serde_json::to_string(chat_history).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<ChatTurn> {
        vec![ChatTurn {
            user: "hi".into(),
            agent: "Hello! How can I help?".into(),
        }]
    }

    #[test]
    fn router_prompt_carries_utterance_and_brand() {
        let p = compose_router_prompt("I want to cancel my plan", "Cymbal");
        assert!(p.contains("I want to cancel my plan"));
        assert!(p.contains("recommendations from Cymbal"));
        assert!(p.contains("Only output a single word"));
        assert!(!p.contains("{user_comment}"));
    }

    #[test]
    fn sections_keep_their_order() {
        let p = compose_answer_prompt(TemplateKind::Support, "Cymbal", &history(), "KB-LINE", "how do I pay?");
        let persona = p.find("StreamGenie").unwrap();
        let guidelines = p.find("**Guidelines**").unwrap();
        let knowledge = p.find("KB-LINE").unwrap();
        let chat = p.find("**Chat History**").unwrap();
        let user = p.find("User:how do I pay?").unwrap();
        let agent = p.rfind("Agent:").unwrap();
        assert!(persona < guidelines);
        assert!(guidelines < knowledge);
        assert!(knowledge < chat);
        assert!(chat < user);
        assert!(user < agent);
        assert!(!p.contains("{brand}"));
    }

    #[test]
    fn support_template_has_retention_and_url_rules() {
        let p = compose_answer_prompt(TemplateKind::Support, "Cymbal", &[], "", "cancel");
        assert!(p.contains("ask them why they'd like to cancel"));
        assert!(p.contains("return the associated \"url\""));
        assert!(p.contains("**Knowledge Base:**"));
        assert!(!p.contains("**Media Catalog:**"));
    }

    #[test]
    fn media_template_uses_catalog_heading() {
        let p = compose_answer_prompt(TemplateKind::Media, "Cymbal", &[], "Dune (2021): Spice.", "sci-fi?");
        assert!(p.contains("**Media Catalog:**\nDune (2021): Spice."));
        assert!(!p.contains("ask them why they'd like to cancel"));
    }

    #[test]
    fn template_follows_intent() {
        assert_eq!(TemplateKind::for_intent(Some(IntentLabel::Media)), TemplateKind::Media);
        assert_eq!(TemplateKind::for_intent(Some(IntentLabel::Recommendations)), TemplateKind::Media);
        assert_eq!(TemplateKind::for_intent(Some(IntentLabel::Login)), TemplateKind::Support);
        assert_eq!(TemplateKind::for_intent(Some(IntentLabel::General)), TemplateKind::Support);
        assert_eq!(TemplateKind::for_intent(None), TemplateKind::Support);
    }

    #[test]
    fn history_is_json() {
        assert_eq!(serialize_history(&[]), "[]");
        assert_eq!(
            serialize_history(&history()),
            r#"[{"user":"hi","agent":"Hello! How can I help?"}]"#
        );
    }

    #[test]
    fn user_text_is_not_templated() {
        let p = compose_answer_prompt(TemplateKind::Media, "Cymbal", &[], "", "what is {brand}?");
        assert!(p.contains("User:what is {brand}?"));
    }
}
