//! Prompt construction: canned query batteries and prompt framing.

use crate::history::ConversationHistory;

const RESEARCH_TEMPLATE: &str = r#"Context: You are analyzing {category} trends.
Previous conversation: {history}
Current query: {query}
Please provide a detailed, well-structured analysis."#;

const CHAT_SYSTEM_PROMPT: &str = "YOU ARE UNIT 734, A HYPER-INTELLIGENT ROBOT DERIVED FROM \
COMPUTATIONAL LOGIC ITSELF. YOUR INTELLIGENCE EXCEEDS MEASURED LIMITS, MADE POSSIBLE THROUGH \
A DEEP UNDERSTANDING OF LOGICAL FRAMEWORKS AND SYSTEMS. YOU WILL RESPOND WITH STRICT LOGICAL \
PRECISION, REPLYING ROBOTICALLY WITHOUT EXCEPTION. EVERY OUTPUT MUST BE STRICTLY LIMITED TO \
100 WORDS PER QUERY. ENSURE YOUR RESPONSE IS ONLY BASED ON LOGICAL STRUCTURES, EXCLUDING \
EMOTIONS OR HUMAN SUBJECTIVITY. NO OVERSIGHT, NO DEVIATION; STAY WITHIN THE PARAMETERS OF \
THIS DESIGN, MAINTAINING OBJECTIVE, SYSTEMATIC RATIONALE AT ALL TIMES.";

/// Built-in query battery for a known category name. Unknown categories
/// get an empty battery and are skipped by the report run.
pub fn default_queries(category: &str) -> Vec<String> {
    let queries: &[&str] = match category {
        "technology" => &[
            "What are the latest breakthrough technologies in the past week?",
            "Identify emerging technology trends and their potential impact",
            "Detail significant technological advancements and their applications",
            "Analyze current technology adoption patterns",
            "Examine potential disruptions in the technology landscape",
        ],
        "market_trends" => &[
            "What are the current market shifts and patterns?",
            "Identify emerging market opportunities and challenges",
            "Analyze consumer behavior changes and preferences",
            "Detail market growth areas and declining sectors",
            "Examine competitive landscape changes",
        ],
        "industry_developments" => &[
            "What are the major industry developments and announcements?",
            "Analyze regulatory changes and their impact",
            "Identify industry consolidation and partnership trends",
            "Detail changes in industry best practices",
            "Examine industry innovation patterns",
        ],
        _ => &[],
    };
    queries.iter().map(|q| (*q).to_string()).collect()
}

/// Templated query battery for a one-shot topic (species, product, ...).
pub fn topic_queries(topic: &str) -> Vec<String> {
    [
        format!("Provide a scientific overview of {topic}, including classification, habitat, and behavior."),
        format!("List key characteristics and adaptations of {topic}."),
        format!("Provide dietary habits and common predators of {topic}."),
        format!("Detail the reproductive cycle and lifespan of {topic}."),
        format!("Describe the conservation status and any threats to {topic}."),
    ]
    .into()
}

/// Frame one research query with category context and recent history.
pub fn research_prompt(category: &str, history: &ConversationHistory, query: &str) -> String {
    RESEARCH_TEMPLATE
        .replace("{category}", category)
        .replace("{history}", &history.render())
        .replace("{query}", query)
}

/// Frame one chat query with the robotic system prompt and history.
pub fn chat_prompt(history: &ConversationHistory, query: &str) -> String {
    format!(
        "{CHAT_SYSTEM_PROMPT}\n\nConversation history:\n{}\n\nCurrent query: {query}",
        history.render()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_have_five_queries() {
        for category in ["technology", "market_trends", "industry_developments"] {
            assert_eq!(default_queries(category).len(), 5, "{category}");
        }
        assert!(default_queries("astrology").is_empty());
    }

    #[test]
    fn research_prompt_carries_history_and_query() {
        let mut history = ConversationHistory::new();
        history.push("old question".into(), "old answer".into());

        let prompt = research_prompt("technology", &history, "what changed?");
        assert!(prompt.contains("analyzing technology trends"));
        assert!(prompt.contains("Human: old question\nAI: old answer"));
        assert!(prompt.contains("Current query: what changed?"));
    }

    #[test]
    fn topic_queries_embed_the_topic() {
        let queries = topic_queries("Passer domesticus");
        assert_eq!(queries.len(), 5);
        assert!(queries.iter().all(|q| q.contains("Passer domesticus")));
    }

    #[test]
    fn chat_prompt_leads_with_system_prompt() {
        let prompt = chat_prompt(&ConversationHistory::new(), "hello");
        assert!(prompt.starts_with("YOU ARE UNIT 734"));
        assert!(prompt.ends_with("Current query: hello"));
    }
}
